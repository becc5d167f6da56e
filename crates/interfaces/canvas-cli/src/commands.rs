use anyhow::{anyhow, bail, Context, Result};
use camino::Utf8PathBuf;
use canvas_core::tree::FolderTree;
use canvas_core::Course;
use canvas_infra::{CanvasClient, ClientOptions};
use canvas_persistence::{FileMetadataStore, ManifestState, MetadataStore};
use canvas_pipeline::{
    CoursePlan, CourseSyncEngine, CourseSyncReport, ProgressTracker, SyncOptions, SyncOutcome,
};
use humansize::{format_size, DECIMAL};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;

/// Courses matching `selector` (numeric id or case-insensitive course code),
/// or every course when no selector is given.
pub fn select_courses(courses: Vec<Course>, selector: Option<&str>) -> Result<Vec<Course>> {
    let Some(selector) = selector else {
        return Ok(courses);
    };
    let id = selector.parse::<u64>().ok();
    let selected: Vec<Course> = courses
        .into_iter()
        .filter(|c| Some(c.id) == id || c.course_code.eq_ignore_ascii_case(selector))
        .collect();
    if selected.is_empty() {
        bail!("No accessible course matches '{}'", selector);
    }
    Ok(selected)
}

fn connect(options: ClientOptions) -> Result<Arc<CanvasClient>> {
    let client = CanvasClient::new(options).context("Failed to build HTTP client")?;
    Ok(Arc::new(client))
}

pub async fn cmd_courses(options: ClientOptions) -> Result<Vec<Course>> {
    let client = connect(options)?;
    let courses = client.list_courses().await.context("Failed to list courses")?;

    if courses.is_empty() {
        println!("No courses found.");
        return Ok(courses);
    }

    println!("{:<10} {:<16} {:<40}", "ID", "CODE", "NAME");
    println!("{:-<10} {:-<16} {:-<40}", "", "", "");
    for c in &courses {
        println!("{:<10} {:<16} {:<40}", c.id, c.course_code, c.name);
    }
    Ok(courses)
}

pub async fn cmd_folders(options: ClientOptions, course: String) -> Result<FolderTree> {
    let client = connect(options)?;
    let courses = client.list_courses().await.context("Failed to list courses")?;
    let course = select_courses(courses, Some(&course))?
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("No accessible course matches '{}'", course))?;

    let folders = client
        .list_folders(course.id)
        .await
        .with_context(|| format!("Failed to list folders of {}", course.course_code))?;
    let tree = FolderTree::from_folders(&folders)?;

    println!(":: {} ({} folders)", course.course_code, tree.len());
    for (depth, folder) in tree.walk() {
        println!("{}{}", "  ".repeat(depth), folder.name);
    }
    Ok(tree)
}

pub async fn cmd_check(
    options: ClientOptions,
    course: Option<String>,
    dest: Utf8PathBuf,
) -> Result<Vec<CoursePlan>> {
    println!(":: Checking for new or changed files...");
    println!("   Destination: {}", dest);

    let client = connect(options)?;
    let courses = client.list_courses().await.context("Failed to list courses")?;
    let courses = select_courses(courses, course.as_deref())?;
    let engine = CourseSyncEngine::new(client, SyncOptions::default());
    let store = FileMetadataStore::new();

    let mut plans = Vec::with_capacity(courses.len());
    let mut failed = Vec::new();
    for course in &courses {
        let plan = match engine.plan_course(course, &dest).await {
            Ok(plan) => plan,
            Err(e) => {
                tracing::error!(kind = ?e.kind(), "check of {} failed", course.course_code);
                eprintln!(
                    "   {:<16} failed: {:#}",
                    course.course_code,
                    anyhow::Error::new(e)
                );
                failed.push(course.course_code.clone());
                continue;
            }
        };

        if plan.outcome == SyncOutcome::AccessDenied {
            println!("   {:<16} access denied", plan.course_code);
        } else {
            let metadata = match store.inspect(&plan.root) {
                ManifestState::Missing => "no metadata".to_string(),
                ManifestState::Valid { entries } => format!("{entries} recorded"),
                ManifestState::Corrupt => "metadata unreadable".to_string(),
            };
            let status = if plan.is_up_to_date() {
                "up to date".to_string()
            } else {
                format!(
                    "{} new or changed ({})",
                    plan.pending_files(),
                    format_size(plan.pending_bytes(), DECIMAL)
                )
            };
            println!("   {:<16} {:<32} {}", plan.course_code, status, metadata);
        }
        plans.push(plan);
    }

    if !failed.is_empty() {
        bail!(
            "{} of {} courses failed: {}",
            failed.len(),
            courses.len(),
            failed.join(", ")
        );
    }
    Ok(plans)
}

pub async fn cmd_sync(
    options: ClientOptions,
    course: Option<String>,
    dest: Utf8PathBuf,
    retry_limit: u32,
) -> Result<Vec<CourseSyncReport>> {
    println!(":: Synchronizing...");
    println!("   Destination: {}", dest);

    let client = connect(options)?;
    let courses = client.list_courses().await.context("Failed to list courses")?;
    let courses = select_courses(courses, course.as_deref())?;
    let engine = CourseSyncEngine::new(
        client,
        SyncOptions::default().with_write_retry_limit(retry_limit),
    );

    let style = ProgressStyle::with_template(
        "{prefix:<12} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} files {msg}",
    )?
    .progress_chars("=>-");

    let mut reports = Vec::with_capacity(courses.len());
    let mut failed = Vec::new();
    for course in &courses {
        let pb = ProgressBar::new(0);
        pb.set_style(style.clone());
        pb.set_prefix(course.course_code.clone());

        let (tx, mut rx) = tokio::sync::mpsc::channel(100);
        let sync = async {
            let result = engine.sync_course(course, &dest, Some(&tx)).await;
            drop(tx);
            result
        };
        let progress = async {
            let mut tracker = ProgressTracker::new();
            while let Some(ev) = rx.recv().await {
                tracker.update(ev);
                let snap = tracker.get_snapshot();
                pb.set_length(snap.total_files);
                pb.set_position(snap.downloaded_files);
                let current = snap.current.map(|c| c.name).unwrap_or_default();
                pb.set_message(format!(
                    "{} {}/s {}",
                    format_size(snap.downloaded_bytes, DECIMAL),
                    format_size(snap.speed_bps, DECIMAL),
                    current
                ));
            }
        };
        let (result, ()) = tokio::join!(sync, progress);
        pb.finish_and_clear();

        match result {
            Ok(report) => {
                print_report(&report);
                reports.push(report);
            }
            Err(e) => {
                tracing::error!(kind = ?e.kind(), "sync of {} failed", course.course_code);
                eprintln!(
                    "   {:<16} failed: {:#}",
                    course.course_code,
                    anyhow::Error::new(e)
                );
                failed.push(course.course_code.clone());
            }
        }
    }

    if !failed.is_empty() {
        bail!(
            "{} of {} courses failed: {}",
            failed.len(),
            courses.len(),
            failed.join(", ")
        );
    }
    Ok(reports)
}

fn print_report(report: &CourseSyncReport) {
    match report.outcome {
        SyncOutcome::AccessDenied => {
            println!("   {:<16} skipped (access denied)", report.course_code);
        }
        SyncOutcome::Completed => {
            println!(
                "   {:<16} {} of {} files downloaded ({})",
                report.course_code,
                report.files_downloaded,
                report.files_listed,
                format_size(report.bytes_downloaded, DECIMAL)
            );
            for path in &report.renamed {
                println!("     kept existing file, wrote {}", path);
            }
        }
    }
}
