//! Pruning pre-order traversal of allowed files

pub mod scanner;

use std::path::PathBuf;

use walkdir::WalkDir;

use crate::filter::{read_first_line, TreeIgnore};
use crate::rules::rule::MatchContext;

pub use scanner::{FilteredScanner, ScanProgress, ScanResult, ScanStats};

/// Depth-first pre-order iterator over every allowed file under the root
///
/// Directories are checked with the cheap no-content verdict and pruned
/// wholesale when denied, which is also what keeps nested `.gitignore`
/// loading ordered root-to-leaf. Entries whose probe fails are skipped.
/// Each [`TreeIgnore::walk`] call produces a fresh, restartable iterator.
pub struct Walk<'a> {
    filter: &'a TreeIgnore,
    entries: walkdir::IntoIter,
    files_seen: usize,
    files_yielded: usize,
    dirs_pruned: usize,
}

impl<'a> Walk<'a> {
    pub(crate) fn new(filter: &'a TreeIgnore) -> Self {
        let entries = WalkDir::new(filter.root())
            .follow_links(filter.follow_symlinks())
            .into_iter();
        Self {
            filter,
            entries,
            files_seen: 0,
            files_yielded: 0,
            dirs_pruned: 0,
        }
    }

    /// Files inspected so far (allowed or not)
    pub fn files_seen(&self) -> usize {
        self.files_seen
    }

    /// Files yielded so far
    pub fn files_yielded(&self) -> usize {
        self.files_yielded
    }

    /// Directories pruned so far, subtree and all
    pub fn dirs_pruned(&self) -> usize {
        self.dirs_pruned
    }
}

impl Iterator for Walk<'_> {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                // unreadable child: skip it, keep walking
                Err(_) => continue,
            };
            if entry.depth() == 0 {
                continue;
            }
            let Ok(rel) = entry.path().strip_prefix(self.filter.root()) else {
                continue;
            };
            let rel = rel.to_string_lossy().replace('\\', "/");
            let components: Vec<&str> = rel.split('/').collect();
            let set = self.filter.rule_set();

            if entry.file_type().is_dir() {
                let ctx = MatchContext::new(&components, true, None);
                if !set.allowed_unrecursive(&ctx) {
                    self.entries.skip_current_dir();
                    self.dirs_pruned += 1;
                }
                continue;
            }

            self.files_seen += 1;
            let content = if set.requires_content() {
                read_first_line(entry.path())
            } else {
                None
            };
            let ctx = MatchContext::new(&components, false, content.as_deref());
            if set.allowed_unrecursive(&ctx) {
                self.files_yielded += 1;
                return Some(if self.filter.relative() {
                    PathBuf::from(rel)
                } else {
                    entry.into_path()
                });
            }
        }
    }
}
