use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use canvas_core::diff::pending_downloads;
use canvas_core::path_utils::{is_contained, is_safe_file_name, FolderPathResolver};
use canvas_core::{Course, Folder, RemoteFile};
use canvas_infra::{CanvasClient, ConflictSafeWriter, ContentFetcher};
use canvas_persistence::{FileMetadataStore, MetadataStore};
use tokio::sync::mpsc::Sender;
use tracing::{debug, info, warn};

use crate::sync::remote::CourseCatalog;
use crate::sync::{
    CoursePlan, CourseSyncReport, FolderPlan, SyncError, SyncEvent, SyncOptions, SyncOutcome,
};

/// Mirrors one course's file store into `destination_root/<course_code>`.
///
/// Holds no per-course state, so one engine can serve several courses
/// concurrently. Runs against the same destination are not coordinated.
pub struct CourseSyncEngine {
    catalog: Arc<dyn CourseCatalog>,
    writer: ConflictSafeWriter,
    store: Arc<dyn MetadataStore>,
    resolver: FolderPathResolver,
}

impl CourseSyncEngine {
    pub fn new(client: Arc<CanvasClient>, options: SyncOptions) -> Self {
        Self::with_components(
            client.clone(),
            client,
            Arc::new(FileMetadataStore::new()),
            options,
        )
    }

    pub fn with_components(
        catalog: Arc<dyn CourseCatalog>,
        fetcher: Arc<dyn ContentFetcher>,
        store: Arc<dyn MetadataStore>,
        options: SyncOptions,
    ) -> Self {
        Self {
            catalog,
            writer: ConflictSafeWriter::new(fetcher, options.write_retry_limit),
            store,
            resolver: FolderPathResolver::default(),
        }
    }

    pub fn with_resolver(mut self, resolver: FolderPathResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn course_root(course: &Course, destination_root: &Utf8Path) -> Utf8PathBuf {
        destination_root.join(&course.course_code)
    }

    /// `None` when the course refused the folder listing.
    async fn course_folders(&self, course: &Course) -> Result<Option<Vec<Folder>>, SyncError> {
        match self.catalog.list_folders(course.id).await {
            Ok(folders) => Ok(Some(folders)),
            Err(e) if e.is_access_denied() => {
                warn!(
                    "Access denied to files of {} ({}), skipping",
                    course.course_code, course.id
                );
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// The course root, refusing codes that are not a single path component.
    fn checked_course_root(
        course: &Course,
        destination_root: &Utf8Path,
    ) -> Result<Utf8PathBuf, SyncError> {
        if !is_safe_file_name(&course.course_code) {
            return Err(SyncError::UnsafePath {
                name: course.course_code.clone(),
                directory: destination_root.to_path_buf(),
            });
        }
        Ok(Self::course_root(course, destination_root))
    }

    /// Local directory of every folder, in listing order. Fails before
    /// anything is created if one of them resolves outside `root`.
    fn folder_directories(
        &self,
        folders: &[Folder],
        root: &Utf8Path,
    ) -> Result<Vec<Utf8PathBuf>, SyncError> {
        folders
            .iter()
            .map(|folder| {
                let directory = Utf8PathBuf::from(self.resolver.resolve(folder, root.as_str()));
                if is_contained(root, &directory) {
                    Ok(directory)
                } else {
                    Err(SyncError::UnsafePath {
                        name: folder.full_name.clone(),
                        directory: root.to_path_buf(),
                    })
                }
            })
            .collect()
    }

    /// Run one full pass: list, diff, download, then persist the manifest.
    ///
    /// The manifest is written only after every folder succeeded; an error
    /// part way through leaves the stored manifest as it was, and files
    /// already written stay on disk.
    pub async fn sync_course(
        &self,
        course: &Course,
        destination_root: &Utf8Path,
        events: Option<&Sender<SyncEvent>>,
    ) -> Result<CourseSyncReport, SyncError> {
        let root = Self::checked_course_root(course, destination_root)?;
        let Some(folders) = self.course_folders(course).await? else {
            return Ok(CourseSyncReport::new(
                &course.course_code,
                SyncOutcome::AccessDenied,
            ));
        };
        let directories = self.folder_directories(&folders, &root)?;

        let mut manifest = self.store.load(&root);
        let mut report = CourseSyncReport::new(&course.course_code, SyncOutcome::Completed);
        info!(
            "Syncing {} into {} ({} folders)",
            course.course_code,
            root,
            folders.len()
        );

        for (folder, directory) in folders.iter().zip(directories) {
            let files = self.catalog.list_files(folder.id).await?;
            let pending: Vec<_> = pending_downloads(&manifest, &files)
                .into_iter()
                .cloned()
                .collect();
            check_file_names(&pending, &directory)?;

            tokio::fs::create_dir_all(&directory)
                .await
                .map_err(|source| SyncError::Io {
                    path: directory.clone(),
                    source,
                })?;
            report.folders += 1;
            report.files_listed += files.len();
            debug!(
                folder = %folder.full_name,
                listed = files.len(),
                pending = pending.len(),
                "folder diffed"
            );
            notify(
                events,
                SyncEvent::FolderStarted {
                    directory: directory.clone(),
                    files: pending.len(),
                },
            )
            .await;

            for file in pending {
                notify(
                    events,
                    SyncEvent::DownloadStarted {
                        file_id: file.id,
                        name: file.display_name.clone(),
                        size: file.size,
                    },
                )
                .await;

                let target = directory.join(&file.display_name);
                let outcome = self.writer.write(&file.url, &target).await?;
                if outcome.was_renamed() {
                    info!("{} exists, wrote {}", target, outcome.path);
                    report.renamed.push(outcome.path.clone());
                }
                report.files_downloaded += 1;
                report.bytes_downloaded += outcome.bytes;

                notify(
                    events,
                    SyncEvent::DownloadCompleted {
                        file_id: file.id,
                        path: outcome.path,
                        bytes: outcome.bytes,
                    },
                )
                .await;
                manifest.record(file);
            }
        }

        // A course without folders still gets its root and an empty manifest.
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|source| SyncError::Io {
                path: root.clone(),
                source,
            })?;
        self.store.save(&root, &manifest)?;

        info!(
            "Finished {}: {} of {} files downloaded",
            course.course_code, report.files_downloaded, report.files_listed
        );
        Ok(report)
    }

    /// List and diff like `sync_course` but create and write nothing.
    pub async fn plan_course(
        &self,
        course: &Course,
        destination_root: &Utf8Path,
    ) -> Result<CoursePlan, SyncError> {
        let root = Self::checked_course_root(course, destination_root)?;
        let Some(folders) = self.course_folders(course).await? else {
            return Ok(CoursePlan {
                course_code: course.course_code.clone(),
                outcome: SyncOutcome::AccessDenied,
                root,
                folders: Vec::new(),
            });
        };
        let directories = self.folder_directories(&folders, &root)?;

        let manifest = self.store.load(&root);
        let mut plans = Vec::with_capacity(folders.len());
        for (folder, directory) in folders.iter().zip(directories) {
            let files = self.catalog.list_files(folder.id).await?;
            let pending: Vec<_> = pending_downloads(&manifest, &files)
                .into_iter()
                .cloned()
                .collect();
            check_file_names(&pending, &directory)?;
            plans.push(FolderPlan {
                folder_id: folder.id,
                directory,
                listed: files.len(),
                pending,
            });
        }

        Ok(CoursePlan {
            course_code: course.course_code.clone(),
            outcome: SyncOutcome::Completed,
            root,
            folders: plans,
        })
    }
}

/// Every pending name must be a single component, checked before the folder's
/// first write.
fn check_file_names(pending: &[RemoteFile], directory: &Utf8Path) -> Result<(), SyncError> {
    match pending.iter().find(|f| !is_safe_file_name(&f.display_name)) {
        Some(file) => Err(SyncError::UnsafePath {
            name: file.display_name.clone(),
            directory: directory.to_path_buf(),
        }),
        None => Ok(()),
    }
}

async fn notify(events: Option<&Sender<SyncEvent>>, event: SyncEvent) {
    if let Some(tx) = events {
        let _ = tx.send(event).await;
    }
}
