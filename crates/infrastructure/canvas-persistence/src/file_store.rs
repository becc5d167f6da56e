use std::fs;
use std::io::{ErrorKind, Write};

use camino::Utf8Path;
use canvas_core::SyncManifest;

use crate::codec::{decode_manifest, encode_manifest};
use crate::paths::metadata_path;
use crate::{ManifestState, MetadataStore, StorageError};

/// `metadata.json` at the root of each course's destination directory.
#[derive(Debug, Default, Clone)]
pub struct FileMetadataStore;

impl FileMetadataStore {
    pub fn new() -> Self {
        Self
    }

    fn read(&self, root: &Utf8Path) -> Result<SyncManifest, StorageError> {
        let path = metadata_path(root);
        let bytes = match fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(StorageError::Missing),
            Err(e) => return Err(e.into()),
        };
        decode_manifest(&bytes)
    }
}

impl MetadataStore for FileMetadataStore {
    fn load(&self, root: &Utf8Path) -> SyncManifest {
        match self.read(root) {
            Ok(manifest) => {
                tracing::debug!("loaded {} manifest entries from {}", manifest.len(), root);
                manifest
            }
            Err(StorageError::Missing) => {
                tracing::debug!("no manifest under {}, starting fresh", root);
                SyncManifest::new()
            }
            Err(e) => {
                tracing::warn!(
                    "manifest at {} is unreadable, treating every file as new: {}",
                    metadata_path(root),
                    e
                );
                SyncManifest::new()
            }
        }
    }

    fn save(&self, root: &Utf8Path, manifest: &SyncManifest) -> Result<(), StorageError> {
        let path = metadata_path(root);
        let data = encode_manifest(manifest)?;

        let tmp = path.with_extension("json.tmp");
        let mut file = fs::File::create(&tmp)?;
        file.write_all(&data)?;
        file.sync_all()?;
        drop(file);
        fs::rename(&tmp, &path)?;

        tracing::debug!("saved {} manifest entries to {}", manifest.len(), path);
        Ok(())
    }

    fn inspect(&self, root: &Utf8Path) -> ManifestState {
        match self.read(root) {
            Ok(manifest) => ManifestState::Valid {
                entries: manifest.len(),
            },
            Err(StorageError::Missing) => ManifestState::Missing,
            Err(_) => ManifestState::Corrupt,
        }
    }
}
