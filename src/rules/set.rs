//! Composition of rule groups into one allowed/denied decision

use crate::rules::gitignore::GitignoreGroup;
use crate::rules::group::{RuleGroup, Verdict};
use crate::rules::rule::MatchContext;

/// One pattern source's group within a set
#[derive(Debug)]
pub enum Group {
    Static(RuleGroup),
    Gitignore(GitignoreGroup),
}

impl Group {
    fn verdict(&self, ctx: &MatchContext<'_>) -> Verdict {
        match self {
            Group::Static(group) => group.verdict(ctx),
            Group::Gitignore(group) => group.verdict(ctx),
        }
    }

    fn has_content_rules(&self) -> bool {
        match self {
            Group::Static(group) => group.has_content_rules(),
            Group::Gitignore(group) => group.has_content_rules(),
        }
    }
}

/// An ordered sequence of rule groups from independent pattern sources
///
/// Groups evaluate in construction order and the verdicts fold left to
/// right: the last group to express an opinion wins, generalizing
/// last-match-wins from pattern lines to whole sources. The gitignore group
/// always sits first, so every explicitly declared source can override the
/// gitignore hierarchy. When no group has an opinion the path is allowed.
#[derive(Debug)]
pub struct RuleSet {
    groups: Vec<Group>,
}

impl RuleSet {
    pub fn new(groups: Vec<Group>) -> Self {
        Self { groups }
    }

    /// Whether any group currently holds a shebang rule, meaning file
    /// queries benefit from a first content line
    pub fn requires_content(&self) -> bool {
        self.groups.iter().any(Group::has_content_rules)
    }

    /// Decide the path itself, without consulting its ancestors. This is
    /// the cheap check traversal uses to prune directories; it never needs
    /// file content for directories.
    pub fn allowed_unrecursive(&self, ctx: &MatchContext<'_>) -> bool {
        let mut allowed = true;
        for group in &self.groups {
            match group.verdict(ctx) {
                Verdict::Allow => allowed = true,
                Verdict::Deny => allowed = false,
                Verdict::NoOpinion => {}
            }
        }
        allowed
    }

    /// Decide the path including ancestor denial: every directory between
    /// the root and the path must itself be allowed. Ancestor checks never
    /// read content.
    pub fn allowed_recursive(
        &self,
        components: &[&str],
        is_dir: bool,
        content: Option<&str>,
    ) -> bool {
        for depth in 1..components.len() {
            let ancestor = MatchContext::new(&components[..depth], true, None);
            if !self.allowed_unrecursive(&ancestor) {
                return false;
            }
        }
        self.allowed_unrecursive(&MatchContext::new(components, is_dir, content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::compiler::compile_line;

    fn static_group(lines: &[&str], allow: bool) -> Group {
        let rules = lines
            .iter()
            .filter_map(|line| compile_line(line, allow, &[]))
            .collect();
        Group::Static(RuleGroup::new(rules, allow))
    }

    fn allowed(set: &RuleSet, path: &str, is_dir: bool) -> bool {
        let comps: Vec<&str> = path.split('/').collect();
        set.allowed_recursive(&comps, is_dir, None)
    }

    #[test]
    fn test_no_groups_allows_everything() {
        let set = RuleSet::new(vec![]);
        assert!(allowed(&set, "anything/at/all.txt", false));
    }

    #[test]
    fn test_independent_deny_sources_combine() {
        let set = RuleSet::new(vec![
            static_group(&["*.log"], false),
            static_group(&["*.swp"], false),
        ]);
        assert!(!allowed(&set, "notes.log", false));
        assert!(!allowed(&set, "notes.swp", false));
        assert!(allowed(&set, "notes.txt", false));
    }

    #[test]
    fn test_later_group_overrides_earlier() {
        let set = RuleSet::new(vec![
            static_group(&["*.log"], false),
            static_group(&["!keep.log"], false),
        ]);
        assert!(!allowed(&set, "debug.log", false));
        assert!(allowed(&set, "keep.log", false));
    }

    #[test]
    fn test_no_opinion_group_is_transparent() {
        let set = RuleSet::new(vec![
            static_group(&["*.log"], false),
            static_group(&[], true),
        ]);
        // the empty allow group must not blanket-deny
        assert!(allowed(&set, "notes.txt", false));
        assert!(!allowed(&set, "debug.log", false));
    }

    #[test]
    fn test_allow_list_denies_everything_else() {
        let set = RuleSet::new(vec![static_group(&["*.rb"], true)]);
        assert!(allowed(&set, "a.rb", false));
        assert!(!allowed(&set, "a.txt", false));
    }

    #[test]
    fn test_ancestor_denial() {
        let set = RuleSet::new(vec![static_group(&["build/"], false)]);
        assert!(!allowed(&set, "build", true));
        // a plain file named build is untouched by the directory-only rule
        assert!(allowed(&set, "build", false));
        // anything under the denied directory is denied on a point query
        assert!(!allowed(&set, "build/out.txt", false));
        assert!(!allowed(&set, "build/deep/nested.o", false));
    }

    #[test]
    fn test_requires_content() {
        let set = RuleSet::new(vec![static_group(&["*.log"], false)]);
        assert!(!set.requires_content());
        let set = RuleSet::new(vec![static_group(&["#!:ruby"], true)]);
        assert!(set.requires_content());
    }
}
