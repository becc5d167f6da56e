use crate::sync::SyncEvent;
use std::collections::VecDeque;
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveDownload {
    pub file_id: u64,
    pub name: String,
    pub size: u64,
}

#[derive(Debug, Clone)]
pub struct TransferSnapshot {
    pub folders_seen: u64,
    /// Grows as folders are diffed; the final total is only known at the end.
    pub total_files: u64,
    pub downloaded_files: u64,
    pub downloaded_bytes: u64,
    pub speed_bps: u64,
    pub current: Option<ActiveDownload>,
}

/// Folds `SyncEvent`s into counters a progress display can poll.
pub struct ProgressTracker {
    folders_seen: u64,
    total_files: u64,
    downloaded_files: u64,
    downloaded_bytes: u64,
    current: Option<ActiveDownload>,
    last_tick: Instant,
    bytes_since_last_tick: u64,
    speed_bps: u64,
    history: VecDeque<u64>,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            folders_seen: 0,
            total_files: 0,
            downloaded_files: 0,
            downloaded_bytes: 0,
            current: None,
            last_tick: Instant::now(),
            bytes_since_last_tick: 0,
            speed_bps: 0,
            history: VecDeque::new(),
        }
    }

    pub fn update(&mut self, event: SyncEvent) {
        match event {
            SyncEvent::FolderStarted { files, .. } => {
                self.folders_seen += 1;
                self.total_files += files as u64;
            }
            SyncEvent::DownloadStarted {
                file_id,
                name,
                size,
            } => {
                self.current = Some(ActiveDownload {
                    file_id,
                    name,
                    size,
                });
            }
            SyncEvent::DownloadCompleted { file_id, bytes, .. } => {
                if self.current.as_ref().is_some_and(|c| c.file_id == file_id) {
                    self.current = None;
                }
                self.downloaded_files += 1;
                self.downloaded_bytes += bytes;
                self.bytes_since_last_tick += bytes;
            }
        }
    }

    pub fn get_snapshot(&mut self) -> TransferSnapshot {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_tick).as_secs_f64();

        if elapsed >= 0.5 {
            let current_bps = (self.bytes_since_last_tick as f64 / elapsed) as u64;
            self.history.push_back(current_bps);
            if self.history.len() > 5 {
                self.history.pop_front();
            }
            self.speed_bps =
                (self.history.iter().sum::<u64>() as f64 / self.history.len() as f64) as u64;
            self.last_tick = now;
            self.bytes_since_last_tick = 0;
        }

        TransferSnapshot {
            folders_seen: self.folders_seen,
            total_files: self.total_files,
            downloaded_files: self.downloaded_files,
            downloaded_bytes: self.downloaded_bytes,
            speed_bps: self.speed_bps,
            current: self.current.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_follow_events() {
        let mut tracker = ProgressTracker::new();
        tracker.update(SyncEvent::FolderStarted {
            directory: "out/NST2055".into(),
            files: 2,
        });
        tracker.update(SyncEvent::DownloadStarted {
            file_id: 7,
            name: "a.pdf".into(),
            size: 10,
        });

        let snap = tracker.get_snapshot();
        assert_eq!(snap.folders_seen, 1);
        assert_eq!(snap.total_files, 2);
        assert_eq!(snap.current.as_ref().map(|c| c.file_id), Some(7));

        tracker.update(SyncEvent::DownloadCompleted {
            file_id: 7,
            path: "out/NST2055/a.pdf".into(),
            bytes: 10,
        });
        let snap = tracker.get_snapshot();
        assert_eq!(snap.downloaded_files, 1);
        assert_eq!(snap.downloaded_bytes, 10);
        assert!(snap.current.is_none());
    }
}
