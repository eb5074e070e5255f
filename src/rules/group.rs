//! Ordered rule groups with last-match-wins evaluation

use crate::rules::rule::{MatchContext, Rule};

/// Outcome of evaluating one group for one path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Deny,
    /// No rule in the group matched; the group stays silent
    NoOpinion,
}

/// An ordered sequence of rules sharing one evaluation mode
///
/// Evaluation order is significant: a later rule overrides an earlier one
/// for paths both match. Deny-style groups exclude on match and re-include
/// on negated match; allow-style groups do the inverse and additionally
/// treat "rules present but none matched" as a denial.
#[derive(Debug, Clone)]
pub struct RuleGroup {
    rules: Vec<Rule>,
    allow: bool,
    content_rules: usize,
}

impl RuleGroup {
    pub fn new(rules: Vec<Rule>, allow: bool) -> Self {
        let content_rules = rules.iter().filter(|r| r.is_content_rule()).count();
        Self {
            rules,
            allow,
            content_rules,
        }
    }

    pub fn empty(allow: bool) -> Self {
        Self::new(Vec::new(), allow)
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_allow(&self) -> bool {
        self.allow
    }

    pub fn has_content_rules(&self) -> bool {
        self.content_rules > 0
    }

    /// Append rules, keeping them after everything already present so they
    /// win ties under last-match-wins
    pub fn extend(&mut self, rules: impl IntoIterator<Item = Rule>) {
        for rule in rules {
            if rule.is_content_rule() {
                self.content_rules += 1;
            }
            self.rules.push(rule);
        }
    }

    /// Scan the group for the given path. Scanning runs back to front and
    /// stops at the first hit, which is exactly last-match-wins over the
    /// declared order.
    pub fn verdict(&self, ctx: &MatchContext<'_>) -> Verdict {
        if self.rules.is_empty() {
            return Verdict::NoOpinion;
        }
        for rule in self.rules.iter().rev() {
            if rule.matches(ctx) {
                return if self.allow != rule.negated() {
                    Verdict::Allow
                } else {
                    Verdict::Deny
                };
            }
        }
        if self.allow {
            Verdict::Deny
        } else {
            Verdict::NoOpinion
        }
    }
}
