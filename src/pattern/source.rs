//! Pattern sources: one origin of ignore/include rules
//!
//! A source is either an in-memory list of lines or a reference to a
//! pattern file, together with its provenance: the directory the patterns
//! anchor to, whether the source re-includes (allow-style) or excludes
//! (deny-style), and a format hint. Sources are immutable once read and
//! build into one [`RuleGroup`] each.

use std::fs;
use std::path::{Path, PathBuf};

use directories::UserDirs;
use path_clean::PathClean;
use tracing::trace;

use crate::core::error::{Result, TreeIgnoreError};
use crate::pattern::compiler::compile_line;
use crate::rules::group::RuleGroup;
use crate::rules::rule::Rule;

/// How the lines of a source are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceFormat {
    /// The gitignore dialect
    #[default]
    Gitignore,
    /// Argv-style paths: `~`, absolute and `./`-relative lines are expanded
    /// against the source root and re-anchored before compilation. A line
    /// that escapes the filter root compiles to an inert rule.
    ExpandPath,
}

/// One origin of patterns plus its provenance
#[derive(Debug, Clone)]
pub struct PatternSource {
    patterns: Vec<String>,
    from_file: Option<PathBuf>,
    root: Option<PathBuf>,
    allow: bool,
    format: SourceFormat,
}

impl PatternSource {
    /// A source backed by explicit pattern lines
    pub fn lines<I, S>(patterns: I, allow: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns = patterns
            .into_iter()
            .flat_map(|p| {
                let pattern: String = p.into();
                pattern.split('\n').map(str::to_string).collect::<Vec<_>>()
            })
            .collect();
        Self {
            patterns,
            from_file: None,
            root: None,
            allow,
            format: SourceFormat::Gitignore,
        }
    }

    /// A source backed by a pattern file. The file's own directory becomes
    /// the source root unless overridden; a missing file reads as empty.
    pub fn file(path: impl Into<PathBuf>, allow: bool) -> Self {
        Self {
            patterns: Vec::new(),
            from_file: Some(path.into()),
            root: None,
            allow,
            format: SourceFormat::Gitignore,
        }
    }

    /// Override the directory the patterns anchor to
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Set the format hint
    pub fn with_format(mut self, format: SourceFormat) -> Self {
        self.format = format;
        self
    }

    pub fn is_allow(&self) -> bool {
        self.allow
    }

    /// Compile the source into a rule group, anchored relative to
    /// `base_root` (the filter root). Fails only on configuration problems;
    /// unparseable pattern lines degrade silently.
    pub(crate) fn build(&self, base_root: &Path) -> Result<RuleGroup> {
        let source_root = self.resolve_root(base_root)?;

        // Patterns from a source rooted at or above the filter root anchor
        // directly at the filter root; deeper sources get their directory
        // folded into every compiled rule.
        let prefix: Vec<String> = match source_root.strip_prefix(base_root) {
            Ok(rel) => rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect(),
            Err(_) => Vec::new(),
        };

        let lines = self.read_lines(base_root);
        let mut rules: Vec<Rule> = Vec::new();
        for line in &lines {
            match self.format {
                SourceFormat::Gitignore => {
                    rules.extend(compile_line(line, self.allow, &prefix));
                }
                SourceFormat::ExpandPath => match expand_line(line, &source_root, base_root)? {
                    Expanded::Line(expanded) => {
                        // expansion re-anchors at the filter root
                        rules.extend(compile_line(&expanded, self.allow, &[]));
                    }
                    Expanded::OutsideRoot => rules.push(Rule::Unmatchable),
                },
            }
        }
        trace!(
            allow = self.allow,
            rules = rules.len(),
            file = ?self.from_file,
            "built pattern source"
        );
        Ok(RuleGroup::new(rules, self.allow))
    }

    fn resolve_root(&self, base_root: &Path) -> Result<PathBuf> {
        if let Some(root) = &self.root {
            return Ok(absolutize(root, base_root));
        }
        if let Some(file) = &self.from_file {
            let file = absolutize(file, base_root);
            return match file.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => Ok(parent.to_path_buf()),
                _ => Err(TreeIgnoreError::source_root_unresolvable(file)),
            };
        }
        Ok(base_root.to_path_buf())
    }

    fn read_lines(&self, base_root: &Path) -> Vec<String> {
        match &self.from_file {
            Some(file) => {
                let file = absolutize(file, base_root);
                match fs::read_to_string(&file) {
                    Ok(content) => content.lines().map(str::to_string).collect(),
                    Err(_) => Vec::new(),
                }
            }
            None => self.patterns.clone(),
        }
    }
}

fn absolutize(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf().clean()
    } else {
        base.join(path).clean()
    }
}

enum Expanded {
    Line(String),
    OutsideRoot,
}

/// Expand one argv-style line. Lines without a path-like prefix pass
/// through untouched; `~`, absolute and dot-relative lines become patterns
/// anchored at the filter root.
fn expand_line(line: &str, source_root: &Path, base_root: &Path) -> Result<Expanded> {
    if line.is_empty() || line.starts_with('#') {
        return Ok(Expanded::Line(line.to_string()));
    }

    let (negation, body) = match line.strip_prefix('!') {
        Some(rest) => ("!", rest),
        None => ("", line),
    };

    let path_like = body.starts_with('~')
        || body.starts_with('/')
        || body.starts_with("./")
        || body.starts_with("../");
    if !path_like {
        return Ok(Expanded::Line(line.to_string()));
    }

    let dir_marker = if body.ends_with('/') { "/" } else { "" };
    let expanded = if let Some(rest) = body.strip_prefix('~') {
        let home = home_dir().ok_or(TreeIgnoreError::HomeDirectoryNotFound)?;
        home.join(rest.trim_start_matches('/')).clean()
    } else {
        absolutize(Path::new(body), source_root)
    };

    match expanded.strip_prefix(base_root) {
        Ok(rel) if !rel.as_os_str().is_empty() => {
            let rel = rel.to_string_lossy().replace('\\', "/");
            Ok(Expanded::Line(format!("{negation}/{rel}{dir_marker}")))
        }
        _ => Ok(Expanded::OutsideRoot),
    }
}

fn home_dir() -> Option<PathBuf> {
    UserDirs::new().map(|dirs| dirs.home_dir().to_path_buf())
}
