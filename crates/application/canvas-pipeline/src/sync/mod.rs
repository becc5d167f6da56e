use camino::Utf8PathBuf;
use canvas_core::RemoteFile;
use canvas_infra::{NetError, NetErrorKind, WriteError};
use canvas_persistence::StorageError;

pub mod engine;
pub mod remote;

pub use engine::CourseSyncEngine;
pub use remote::CourseCatalog;

#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Total exclusive-create attempts per file, original name included.
    pub write_retry_limit: u32,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            write_retry_limit: canvas_config::DEFAULT_WRITE_RETRY_LIMIT,
        }
    }
}

impl SyncOptions {
    pub fn with_write_retry_limit(mut self, limit: u32) -> Self {
        self.write_retry_limit = canvas_config::clamp_retry_limit(limit);
        self
    }
}

/// Progress notifications emitted while a course is being synced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    FolderStarted {
        directory: Utf8PathBuf,
        /// Files in this folder that will be downloaded.
        files: usize,
    },
    DownloadStarted {
        file_id: u64,
        name: String,
        size: u64,
    },
    DownloadCompleted {
        file_id: u64,
        path: Utf8PathBuf,
        bytes: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Completed,
    /// The folder listing was refused; nothing was touched on disk.
    AccessDenied,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseSyncReport {
    pub course_code: String,
    pub outcome: SyncOutcome,
    pub folders: usize,
    pub files_listed: usize,
    pub files_downloaded: usize,
    pub bytes_downloaded: u64,
    /// Files that landed under a `_vN` name because the original was taken.
    pub renamed: Vec<Utf8PathBuf>,
}

impl CourseSyncReport {
    pub(crate) fn new(course_code: &str, outcome: SyncOutcome) -> Self {
        Self {
            course_code: course_code.to_string(),
            outcome,
            folders: 0,
            files_listed: 0,
            files_downloaded: 0,
            bytes_downloaded: 0,
            renamed: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderPlan {
    pub folder_id: u64,
    pub directory: Utf8PathBuf,
    pub listed: usize,
    pub pending: Vec<RemoteFile>,
}

/// What a sync would do, computed without touching the destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoursePlan {
    pub course_code: String,
    pub outcome: SyncOutcome,
    pub root: Utf8PathBuf,
    pub folders: Vec<FolderPlan>,
}

impl CoursePlan {
    pub fn pending_files(&self) -> usize {
        self.folders.iter().map(|f| f.pending.len()).sum()
    }

    pub fn pending_bytes(&self) -> u64 {
        self.folders
            .iter()
            .flat_map(|f| f.pending.iter())
            .map(|f| f.size)
            .sum()
    }

    pub fn is_up_to_date(&self) -> bool {
        self.pending_files() == 0
    }
}

/// High-level error type for sync operations.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("listing failed: {0}")]
    Net(#[from] NetError),
    #[error(transparent)]
    Write(#[from] WriteError),
    #[error("could not create {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not save metadata: {0}")]
    Storage(#[from] StorageError),
    #[error("{name:?} would escape {directory}")]
    UnsafePath { name: String, directory: Utf8PathBuf },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncErrorKind {
    AccessDenied,
    MalformedPagination,
    Transport,
    NameCollisionExhausted,
    Io,
    Storage,
    UnsafePath,
}

fn net_kind(err: &NetError) -> SyncErrorKind {
    match err.kind() {
        NetErrorKind::AccessDenied => SyncErrorKind::AccessDenied,
        NetErrorKind::Pagination => SyncErrorKind::MalformedPagination,
        NetErrorKind::Transport | NetErrorKind::InvalidUrl => SyncErrorKind::Transport,
    }
}

impl SyncError {
    pub fn kind(&self) -> SyncErrorKind {
        match self {
            SyncError::Net(e) => net_kind(e),
            SyncError::Write(WriteError::Fetch(e)) => net_kind(e),
            SyncError::Write(WriteError::CollisionsExhausted { .. }) => {
                SyncErrorKind::NameCollisionExhausted
            }
            SyncError::Write(WriteError::Io { .. }) | SyncError::Io { .. } => SyncErrorKind::Io,
            SyncError::Storage(_) => SyncErrorKind::Storage,
            SyncError::UnsafePath { .. } => SyncErrorKind::UnsafePath,
        }
    }
}
