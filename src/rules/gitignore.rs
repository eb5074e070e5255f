//! The gitignore rule group with lazy loading of nested ignore files

use std::cell::RefCell;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::pattern::compiler::compile_line;
use crate::rules::group::{RuleGroup, Verdict};
use crate::rules::rule::{MatchContext, Rule};

/// Deny-style group holding the whole gitignore hierarchy
///
/// Seeded at construction with the implicit `.git` rule, the global excludes
/// file, the repository exclude file and the root `.gitignore`. Nested
/// `.gitignore` files are discovered lazily: before every evaluation the
/// ancestors of the queried path are loaded root-to-leaf, so deeper files
/// land later in the group and win under last-match-wins.
///
/// The loaded set and the rule list are the only mutable state in the crate.
/// Both live behind `RefCell`, which keeps the surrounding filter `!Sync`:
/// sharing one across threads requires external serialization, which is the
/// documented contract.
#[derive(Debug)]
pub struct GitignoreGroup {
    root: PathBuf,
    group: RefCell<RuleGroup>,
    /// Directories whose `.gitignore` has been read, keyed by path relative
    /// to the root (`""` is the root itself). Grows monotonically.
    loaded: RefCell<HashSet<String>>,
}

impl GitignoreGroup {
    /// Build the group for `root`, loading the root-level sources eagerly.
    ///
    /// `global_excludes` is the resolved `core.excludesFile` path, if any.
    pub fn new(root: &Path, global_excludes: Option<&Path>) -> Self {
        let mut rules: Vec<Rule> = Vec::new();

        // `.git` is never part of the result set, at any depth.
        rules.extend(compile_line(".git", false, &[]));

        if let Some(path) = global_excludes {
            append_file_rules(&mut rules, path, &[]);
        }
        append_file_rules(&mut rules, &root.join(".git/info/exclude"), &[]);
        append_file_rules(&mut rules, &root.join(".gitignore"), &[]);

        let mut loaded = HashSet::new();
        loaded.insert(String::new());

        Self {
            root: root.to_path_buf(),
            group: RefCell::new(RuleGroup::new(rules, false)),
            loaded: RefCell::new(loaded),
        }
    }

    /// Evaluate the group for a path, loading ancestor `.gitignore` files
    /// first. This is the single mutation point of the design.
    pub fn verdict(&self, ctx: &MatchContext<'_>) -> Verdict {
        self.ensure_loaded(ctx.components);
        self.group.borrow().verdict(ctx)
    }

    pub fn has_content_rules(&self) -> bool {
        self.group.borrow().has_content_rules()
    }

    /// Load every not-yet-seen ancestor directory of the path, from the
    /// root downward. Idempotent per directory; a missing `.gitignore` is
    /// the same as an empty one.
    fn ensure_loaded(&self, components: &[&str]) {
        if components.len() < 2 {
            return;
        }
        let mut loaded = self.loaded.borrow_mut();
        let mut rel = String::new();
        for depth in 0..components.len() - 1 {
            if depth > 0 {
                rel.push('/');
            }
            rel.push_str(components[depth]);
            if loaded.contains(rel.as_str()) {
                continue;
            }

            let prefix: Vec<String> = components[..=depth]
                .iter()
                .map(|c| c.to_string())
                .collect();
            let path = self.root.join(&rel).join(".gitignore");
            let mut rules = Vec::new();
            append_file_rules(&mut rules, &path, &prefix);
            if !rules.is_empty() {
                debug!(path = %path.display(), rules = rules.len(), "loaded nested ignore file");
                self.group.borrow_mut().extend(rules);
            }
            loaded.insert(rel.clone());
        }
    }

    #[cfg(test)]
    fn loaded_count(&self) -> usize {
        self.loaded.borrow().len()
    }
}

/// Read a pattern file and compile its lines, rooted at `prefix`. A file
/// that does not exist or cannot be read contributes nothing.
fn append_file_rules(rules: &mut Vec<Rule>, path: &Path, prefix: &[String]) {
    let Ok(content) = fs::read_to_string(path) else {
        return;
    };
    for line in content.lines() {
        rules.extend(compile_line(line, false, prefix));
    }
}
