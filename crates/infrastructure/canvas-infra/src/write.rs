use camino::{Utf8Path, Utf8PathBuf};
use canvas_core::path_utils::versioned_path;
use std::io::ErrorKind;
use std::sync::Arc;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::net::{ContentFetcher, NetError};

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] NetError),
    #[error("Failed to write file after {attempts} retries: {path}")]
    CollisionsExhausted { attempts: u32, path: Utf8PathBuf },
    #[error("write to {path} failed: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Where the content actually landed.
    pub path: Utf8PathBuf,
    /// 1 when the requested name was free.
    pub attempts: u32,
    pub bytes: u64,
}

impl WriteOutcome {
    pub fn was_renamed(&self) -> bool {
        self.attempts > 1
    }
}

/// Downloads into a fresh file, never overwriting what is already on disk.
///
/// Content is fetched once; name collisions then walk `name_v2.ext`,
/// `name_v3.ext`, ... until `retry_limit` total attempts are used up.
pub struct ConflictSafeWriter {
    fetcher: Arc<dyn ContentFetcher>,
    retry_limit: u32,
}

impl ConflictSafeWriter {
    pub fn new(fetcher: Arc<dyn ContentFetcher>, retry_limit: u32) -> Self {
        Self {
            fetcher,
            retry_limit,
        }
    }

    pub fn retry_limit(&self) -> u32 {
        self.retry_limit
    }

    pub async fn write(
        &self,
        source_url: &str,
        destination: &Utf8Path,
    ) -> Result<WriteOutcome, WriteError> {
        debug!(url = source_url, %destination, "fetching");
        let content = self.fetcher.fetch(source_url).await?;
        create_versioned(destination, &content, self.retry_limit).await
    }
}

/// Exclusive-create `destination` (or the next free versioned sibling) and
/// write `contents` to it.
pub async fn create_versioned(
    destination: &Utf8Path,
    contents: &[u8],
    retry_limit: u32,
) -> Result<WriteOutcome, WriteError> {
    let limit = retry_limit.max(1);
    let mut candidate = destination.to_path_buf();

    for attempt in 1..=limit {
        candidate = versioned_path(destination, attempt);
        let opened = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(candidate.as_std_path())
            .await;

        let mut file = match opened {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!(path = %candidate, attempt, "name taken");
                continue;
            }
            Err(source) => {
                return Err(WriteError::Io {
                    path: candidate,
                    source,
                })
            }
        };

        if let Err(source) = write_all(&mut file, contents).await {
            drop(file);
            // Free the name so the next run does not version around a stub.
            if let Err(e) = tokio::fs::remove_file(candidate.as_std_path()).await {
                warn!(path = %candidate, "could not remove partial file: {e}");
            }
            return Err(WriteError::Io {
                path: candidate,
                source,
            });
        }

        return Ok(WriteOutcome {
            path: candidate,
            attempts: attempt,
            bytes: contents.len() as u64,
        });
    }

    Err(WriteError::CollisionsExhausted {
        attempts: limit,
        path: candidate,
    })
}

async fn write_all(file: &mut tokio::fs::File, contents: &[u8]) -> std::io::Result<()> {
    file.write_all(contents).await?;
    file.flush().await?;
    file.sync_all().await
}
