use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod diff;
pub mod path_utils;
pub mod tree;

pub type Timestamp = DateTime<Utc>;

/// A Canvas course, the top-level scope of one sync pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Course {
    pub id: u64,
    pub name: String,
    pub course_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Folder {
    pub id: u64,
    pub parent_folder_id: Option<u64>,
    pub name: String,
    /// Slash-delimited path starting with the `course files` root segment.
    pub full_name: String,
    pub context_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

/// A file record as returned by `/folders/{id}/files`.
///
/// `url` is pre-authorized and carries a short-lived verifier, so it is only
/// good for the run that listed it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteFile {
    pub id: u64,
    pub folder_id: u64,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(
        rename = "content-type",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub content_type: Option<String>,
    pub url: String,
    pub size: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Last-synced snapshot of every file of one course, keyed by file id.
///
/// Persisted as a flat JSON object whose keys are decimal ids; keys that do
/// not parse as integers are rejected on load.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct SyncManifest {
    entries: BTreeMap<u64, RemoteFile>,
}

impl SyncManifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, file_id: u64) -> Option<&RemoteFile> {
        self.entries.get(&file_id)
    }

    /// Record `file` as synced, replacing any earlier snapshot.
    pub fn record(&mut self, file: RemoteFile) {
        self.entries.insert(file.id, file);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RemoteFile> {
        self.entries.values()
    }
}

impl FromIterator<RemoteFile> for SyncManifest {
    fn from_iter<I: IntoIterator<Item = RemoteFile>>(iter: I) -> Self {
        let mut manifest = SyncManifest::new();
        for file in iter {
            manifest.record(file);
        }
        manifest
    }
}
