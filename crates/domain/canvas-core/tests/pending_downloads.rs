use canvas_core::diff::{needs_download, pending_downloads};
use canvas_core::{RemoteFile, SyncManifest, Timestamp};

// --- Helper Functions to build records easily ---

fn ts(s: &str) -> Timestamp {
    s.parse().unwrap()
}

fn make_file(id: u64, updated_at: &str) -> RemoteFile {
    RemoteFile {
        id,
        folder_id: 1070454,
        display_name: format!("file-{id}.pdf"),
        filename: None,
        content_type: Some("application/pdf".into()),
        url: format!("https://canvas.example/files/{id}/download?verifier=x"),
        size: 100,
        created_at: ts("2024-01-01T00:00:00Z"),
        updated_at: ts(updated_at),
    }
}

// --- Tests ---

#[test]
fn unknown_file_is_included() {
    let manifest = SyncManifest::new();
    assert!(needs_download(&manifest, &make_file(7, "2024-01-01T00:00:00Z")));
}

#[test]
fn same_timestamp_is_excluded() {
    let manifest: SyncManifest = [make_file(7, "2024-01-01T00:00:00Z")].into_iter().collect();
    assert!(!needs_download(&manifest, &make_file(7, "2024-01-01T00:00:00Z")));
}

#[test]
fn later_timestamp_is_included() {
    let manifest: SyncManifest = [make_file(7, "2024-01-01T00:00:00Z")].into_iter().collect();
    assert!(needs_download(&manifest, &make_file(7, "2024-01-01T00:00:01Z")));
}

#[test]
fn older_remote_timestamp_is_not_refetched() {
    let manifest: SyncManifest = [make_file(7, "2024-06-01T00:00:00Z")].into_iter().collect();
    assert!(!needs_download(&manifest, &make_file(7, "2024-01-01T00:00:00Z")));
}

#[test]
fn pending_keeps_listing_order() {
    let manifest: SyncManifest = [
        make_file(2, "2024-03-01T00:00:00Z"),
        make_file(3, "2024-03-01T00:00:00Z"),
    ]
    .into_iter()
    .collect();

    let live = vec![
        make_file(9, "2024-03-01T00:00:00Z"),
        make_file(3, "2024-04-01T00:00:00Z"),
        make_file(2, "2024-03-01T00:00:00Z"),
        make_file(1, "2024-03-01T00:00:00Z"),
    ];

    let ids: Vec<u64> = pending_downloads(&manifest, &live)
        .into_iter()
        .map(|f| f.id)
        .collect();
    assert_eq!(ids, vec![9, 3, 1], "new and changed files in listing order");
}
