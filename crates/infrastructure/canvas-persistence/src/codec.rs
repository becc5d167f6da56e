use canvas_core::SyncManifest;

use crate::StorageError;

pub fn encode_manifest(manifest: &SyncManifest) -> Result<Vec<u8>, StorageError> {
    Ok(serde_json::to_vec_pretty(manifest)?)
}

/// Decoding validates every entry: integer keys and complete file records.
pub fn decode_manifest(bytes: &[u8]) -> Result<SyncManifest, StorageError> {
    Ok(serde_json::from_slice(bytes)?)
}
