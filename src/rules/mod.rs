//! Compiled rules, rule groups and their composition
//!
//! The evaluation pipeline: a [`rule::Rule`] answers "does this line match
//! this path", a [`group::RuleGroup`] folds an ordered list of rules under
//! last-match-wins, and a [`set::RuleSet`] folds independent groups into the
//! final allowed/denied verdict. The [`gitignore::GitignoreGroup`] is the
//! one group that grows lazily as traversal discovers nested ignore files.

pub mod gitignore;
pub mod group;
pub mod rule;
pub mod set;

pub use group::{RuleGroup, Verdict};
pub use rule::{MatchContext, Rule};
pub use set::RuleSet;
