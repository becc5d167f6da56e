pub mod sync;
pub mod tracker;

// Re-export core engine components
pub use sync::{
    CourseCatalog, CoursePlan, CourseSyncEngine, CourseSyncReport, FolderPlan, SyncError,
    SyncErrorKind, SyncEvent, SyncOptions, SyncOutcome,
};
pub use tracker::{ProgressTracker, TransferSnapshot};
