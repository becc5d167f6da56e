use camino::Utf8Path;
use canvas_core::SyncManifest;

pub const METADATA_FILENAME: &str = "metadata.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestState {
    Missing,
    Valid { entries: usize },
    Corrupt,
}

/// Durable per-course record of what has already been synced.
pub trait MetadataStore: Send + Sync {
    /// Never fails: a missing or invalid manifest reads as empty.
    fn load(&self, root: &Utf8Path) -> SyncManifest;

    /// Replace the stored manifest with `manifest` in one piece.
    fn save(&self, root: &Utf8Path, manifest: &SyncManifest) -> Result<(), crate::StorageError>;

    fn inspect(&self, root: &Utf8Path) -> ManifestState;
}
