//! The `TreeIgnore` facade and its builder

use std::env;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use path_clean::PathClean;

use crate::config::global_excludes_path;
use crate::core::error::{Result, TreeIgnoreError};
use crate::pattern::source::PatternSource;
use crate::rules::gitignore::GitignoreGroup;
use crate::rules::set::{Group, RuleSet};
use crate::walk::Walk;

/// Whether gitignore-family sources are consulted
///
/// `Never` disables the global excludes file, the repository exclude file,
/// every `.gitignore` and the implicit `.git` denial. `Auto` and `Always`
/// both consult them — a missing file is an empty one — and differ only in
/// declared intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GitignoreMode {
    #[default]
    Auto,
    Always,
    Never,
}

impl GitignoreMode {
    fn enabled(self) -> bool {
        !matches!(self, GitignoreMode::Never)
    }
}

/// Caller-supplied facts for a point query, to skip redundant probes
///
/// Every field defaults to "unknown, compute it for me".
#[derive(Debug, Clone, Copy, Default)]
pub struct Hints<'a> {
    /// Whether the path is a directory
    pub directory: Option<bool>,
    /// First line of the file's content, for shebang rules
    pub content: Option<&'a str>,
    /// Whether the path exists at all
    pub exists: Option<bool>,
    /// Report directories themselves instead of answering `false` for them
    pub include_directories: bool,
}

/// Builder for [`TreeIgnore`]
///
/// Explicit sources are appended in declaration order, and later sources
/// override earlier ones when both have an opinion about a path. The
/// gitignore hierarchy always comes first, so every declared source can
/// override it.
#[derive(Debug)]
pub struct TreeIgnoreBuilder {
    root: Option<PathBuf>,
    relative: bool,
    follow_symlinks: bool,
    gitignore: GitignoreMode,
    git_global: bool,
    sources: Vec<PatternSource>,
}

impl Default for TreeIgnoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeIgnoreBuilder {
    pub fn new() -> Self {
        Self {
            root: None,
            relative: false,
            follow_symlinks: false,
            gitignore: GitignoreMode::Auto,
            git_global: true,
            sources: Vec::new(),
        }
    }

    /// Root directory of the filter; defaults to the current working
    /// directory
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Yield root-relative paths from [`TreeIgnore::walk`] instead of
    /// absolute ones
    pub fn relative(mut self, relative: bool) -> Self {
        self.relative = relative;
        self
    }

    /// Follow symbolic links when probing and traversing
    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Control whether gitignore-family sources are consulted
    pub fn gitignore(mut self, mode: GitignoreMode) -> Self {
        self.gitignore = mode;
        self
    }

    /// Toggle just the global (per-user) excludes file; on by default
    pub fn git_global(mut self, enabled: bool) -> Self {
        self.git_global = enabled;
        self
    }

    /// Deny-style pattern lines rooted at the filter root
    pub fn ignore_rules<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sources.push(PatternSource::lines(patterns, false));
        self
    }

    /// Allow-style pattern lines rooted at the filter root
    pub fn include_rules<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sources.push(PatternSource::lines(patterns, true));
        self
    }

    /// Deny-style pattern file, rooted at its own directory
    pub fn ignore_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(PatternSource::file(path, false));
        self
    }

    /// Allow-style pattern file, rooted at its own directory
    pub fn include_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(PatternSource::file(path, true));
        self
    }

    /// Append an arbitrary pattern source
    pub fn source(mut self, source: PatternSource) -> Self {
        self.sources.push(source);
        self
    }

    /// Build the filter. Construction is atomic: any configuration error
    /// fails the whole build and no partially-built filter escapes.
    pub fn build(self) -> Result<TreeIgnore> {
        let root = match self.root {
            Some(root) if root.is_absolute() => root.clean(),
            Some(root) => cwd()?.join(root).clean(),
            None => cwd()?,
        };

        let mut groups: Vec<Group> = Vec::new();
        if self.gitignore.enabled() {
            let global = if self.git_global {
                global_excludes_path()
            } else {
                None
            };
            groups.push(Group::Gitignore(GitignoreGroup::new(
                &root,
                global.as_deref(),
            )));
        }
        for source in &self.sources {
            groups.push(Group::Static(source.build(&root)?));
        }

        Ok(TreeIgnore {
            root,
            relative: self.relative,
            follow_symlinks: self.follow_symlinks,
            rule_set: RuleSet::new(groups),
        })
    }
}

/// Decides which paths under a root are allowed under gitignore semantics
///
/// Immutable after construction apart from the gitignore group's lazy-load
/// cache, which is interior-mutable and makes this type `!Sync`: wrap it in
/// a mutex (or keep it on one thread) to share it.
#[derive(Debug)]
pub struct TreeIgnore {
    root: PathBuf,
    relative: bool,
    follow_symlinks: bool,
    rule_set: RuleSet,
}

impl TreeIgnore {
    /// Builder entry point
    pub fn builder() -> TreeIgnoreBuilder {
        TreeIgnoreBuilder::new()
    }

    /// The resolved absolute root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Authoritative point query with all hints defaulted
    pub fn is_allowed(&self, path: impl AsRef<Path>) -> bool {
        self.is_allowed_with(path, Hints::default())
    }

    /// Authoritative point query
    ///
    /// Paths outside the root are never allowed. Probe failures (vanished
    /// file, permission denied, not a directory, symlink loop, name too
    /// long) read as "does not exist" and the query still answers.
    /// Directories answer `false` unless `include_directories` is set.
    pub fn is_allowed_with(&self, path: impl AsRef<Path>, hints: Hints<'_>) -> bool {
        let path = path.as_ref();
        let full = if path.is_absolute() {
            path.to_path_buf().clean()
        } else {
            self.root.join(path).clean()
        };
        let Ok(rel) = full.strip_prefix(&self.root) else {
            return false;
        };
        if rel.as_os_str().is_empty() {
            // the root itself is not a queryable entry
            return false;
        }

        let mut exists = hints.exists;
        let directory = match hints.directory {
            Some(directory) => directory,
            None => match self.probe(&full) {
                Some(is_dir) => {
                    if exists.is_none() {
                        exists = Some(true);
                    }
                    is_dir
                }
                None => {
                    if exists.is_none() {
                        exists = Some(false);
                    }
                    false
                }
            },
        };

        if !hints.include_directories && directory {
            return false;
        }
        let exists = exists.unwrap_or_else(|| self.probe(&full).is_some());
        if !exists {
            return false;
        }

        let rel = rel.to_string_lossy().replace('\\', "/");
        let components: Vec<&str> = rel.split('/').collect();

        let computed;
        let content = if directory {
            None
        } else if hints.content.is_some() {
            hints.content.map(|line| first_line_of(line))
        } else if self.rule_set.requires_content() {
            computed = read_first_line(&full);
            computed.as_deref()
        } else {
            None
        };

        self.rule_set
            .allowed_recursive(&components, directory, content)
    }

    /// Lazy pre-order traversal of every allowed file under the root
    ///
    /// Denied directories are pruned without reading any file content;
    /// each call starts a fresh traversal.
    pub fn walk(&self) -> Walk<'_> {
        Walk::new(self)
    }

    pub(crate) fn rule_set(&self) -> &RuleSet {
        &self.rule_set
    }

    pub(crate) fn relative(&self) -> bool {
        self.relative
    }

    pub(crate) fn follow_symlinks(&self) -> bool {
        self.follow_symlinks
    }

    /// `Some(is_directory)` on success, `None` for any probe failure
    fn probe(&self, full: &Path) -> Option<bool> {
        let metadata = if self.follow_symlinks {
            fs::metadata(full)
        } else {
            fs::symlink_metadata(full)
        };
        metadata.ok().map(|m| m.is_dir())
    }
}

fn cwd() -> Result<PathBuf> {
    env::current_dir().map_err(TreeIgnoreError::WorkingDirectory)
}

/// Callers may hand over more than one line of content; only the first
/// matters to shebang rules.
fn first_line_of(content: &str) -> &str {
    content.lines().next().unwrap_or("")
}

/// First line of a file, or `None` when it cannot be read as text
pub(crate) fn read_first_line(path: &Path) -> Option<String> {
    let file = fs::File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    let mut line = String::new();
    match reader.read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => {
            while line.ends_with('\n') || line.ends_with('\r') {
                line.pop();
            }
            Some(line)
        }
    }
}
