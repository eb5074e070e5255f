//! Batch scanning with progress reporting

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::filter::TreeIgnore;

/// Progress information during a scan
#[derive(Debug, Clone)]
pub struct ScanProgress {
    /// Files inspected so far
    pub files_seen: usize,
    /// Files that passed filtering so far
    pub files_yielded: usize,
    /// File most recently yielded
    pub current_file: Option<PathBuf>,
    /// Elapsed time since the scan started
    pub elapsed: Duration,
}

/// Statistics from a completed scan
#[derive(Debug, Clone)]
pub struct ScanStats {
    /// Files inspected
    pub files_seen: usize,
    /// Files that passed filtering
    pub files_yielded: usize,
    /// Files rejected individually
    pub files_ignored: usize,
    /// Directories pruned with their whole subtree
    pub dirs_pruned: usize,
    /// Total scanning time
    pub elapsed: Duration,
    /// Share of inspected files that were rejected
    pub filtering_efficiency: f64,
}

/// Result of a scan
#[derive(Debug)]
pub struct ScanResult {
    /// Allowed files, in traversal order
    pub files: Vec<PathBuf>,
    /// Final statistics
    pub stats: ScanStats,
}

/// Collects every allowed file in one pass, reporting progress on the way
///
/// A convenience driver over [`TreeIgnore::walk`] for callers that want the
/// whole file list plus summary numbers rather than a lazy iterator.
pub struct FilteredScanner<'a> {
    filter: &'a TreeIgnore,
    progress_callback: Option<Box<dyn Fn(&ScanProgress) + 'a>>,
    report_every: usize,
}

impl<'a> FilteredScanner<'a> {
    pub fn new(filter: &'a TreeIgnore) -> Self {
        Self {
            filter,
            progress_callback: None,
            report_every: 100,
        }
    }

    /// Set a progress callback, invoked once per `report_every` yielded
    /// files and once at the end
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ScanProgress) + 'a,
    {
        self.progress_callback = Some(Box::new(callback));
        self
    }

    /// Change how often the progress callback fires
    pub fn report_every(mut self, every: usize) -> Self {
        self.report_every = every.max(1);
        self
    }

    /// Run the scan to completion
    pub fn scan(&self) -> ScanResult {
        let start = Instant::now();
        let mut walk = self.filter.walk();
        let mut files = Vec::new();

        while let Some(path) = walk.next() {
            files.push(path);
            if files.len() % self.report_every == 0 {
                self.report(&ScanProgress {
                    files_seen: walk.files_seen(),
                    files_yielded: walk.files_yielded(),
                    current_file: files.last().cloned(),
                    elapsed: start.elapsed(),
                });
            }
        }

        let elapsed = start.elapsed();
        self.report(&ScanProgress {
            files_seen: walk.files_seen(),
            files_yielded: walk.files_yielded(),
            current_file: None,
            elapsed,
        });

        let files_seen = walk.files_seen();
        let files_yielded = walk.files_yielded();
        let files_ignored = files_seen - files_yielded;
        let stats = ScanStats {
            files_seen,
            files_yielded,
            files_ignored,
            dirs_pruned: walk.dirs_pruned(),
            elapsed,
            filtering_efficiency: if files_seen > 0 {
                (files_ignored as f64 / files_seen as f64) * 100.0
            } else {
                0.0
            },
        };

        ScanResult { files, stats }
    }

    fn report(&self, progress: &ScanProgress) {
        if let Some(callback) = &self.progress_callback {
            callback(progress);
        }
    }
}
