use crate::{RemoteFile, SyncManifest};

/// True when `live` has never been synced or was updated after the recorded
/// snapshot. An equal or older `updated_at` is considered up to date.
pub fn needs_download(manifest: &SyncManifest, live: &RemoteFile) -> bool {
    match manifest.get(live.id) {
        None => true,
        Some(synced) => synced.updated_at < live.updated_at,
    }
}

/// Select the new-or-changed subset of a folder listing, keeping listing order.
pub fn pending_downloads<'a>(
    manifest: &SyncManifest,
    live: &'a [RemoteFile],
) -> Vec<&'a RemoteFile> {
    live.iter()
        .filter(|file| needs_download(manifest, file))
        .collect()
}
