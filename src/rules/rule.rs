//! Compiled rule variants and their matching semantics
//!
//! A [`Rule`] is the evaluable form of one pattern line. The variant set is
//! closed: path rules match by component-wise glob comparison, shebang rules
//! match a file's first content line, and [`Rule::Unmatchable`] stands in for
//! anything that failed to compile so callers never need a special case.

use std::fmt;

/// One glob token inside a path segment
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A literal character (escapes already resolved)
    Char(char),
    /// `?` — exactly one character, never `/`
    AnyChar,
    /// `*` — any run of characters, never `/`
    AnyRun,
    /// `[...]` — character class with optional negation and ranges
    Class { negated: bool, ranges: Vec<(char, char)> },
}

/// One path segment of a compiled pattern
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// `**` — zero or more whole path segments
    AnyDirs,
    /// A glob over a single path component
    Literal(Vec<Token>),
}

/// Everything a rule may inspect when deciding a match
///
/// `components` is the queried path relative to the filter root, already
/// split on `/`. `content` is the first line of the file, when the caller
/// has it; rules that need content treat `None` as "not matched".
#[derive(Debug, Clone, Copy)]
pub struct MatchContext<'a> {
    pub components: &'a [&'a str],
    pub is_dir: bool,
    pub content: Option<&'a str>,
}

impl<'a> MatchContext<'a> {
    pub fn new(components: &'a [&'a str], is_dir: bool, content: Option<&'a str>) -> Self {
        Self {
            components,
            is_dir,
            content,
        }
    }

    /// Final path component, or `""` for the root itself
    pub fn basename(&self) -> &str {
        self.components.last().copied().unwrap_or("")
    }
}

/// A compiled path-matching rule
#[derive(Debug, Clone)]
pub struct PathRule {
    /// Compiled segments, including the source directory prefix
    segments: Vec<Segment>,
    /// Re-includes a previously excluded path
    negated: bool,
    /// Matches directories only, never plain files
    dir_only: bool,
    /// Anchored to the pattern's own root rather than any depth below it
    anchored: bool,
    /// Allow-list extension: a matched directory covers its whole subtree,
    /// and directory queries also match ancestors of potential matches so
    /// traversal can reach them
    include_subtree: bool,
    /// The original pattern line, kept for diagnostics
    original: String,
}

impl PathRule {
    pub fn new(
        segments: Vec<Segment>,
        negated: bool,
        dir_only: bool,
        anchored: bool,
        include_subtree: bool,
        original: String,
    ) -> Self {
        Self {
            segments,
            negated,
            dir_only,
            anchored,
            include_subtree,
            original,
        }
    }

    pub fn negated(&self) -> bool {
        self.negated
    }

    pub fn dir_only(&self) -> bool {
        self.dir_only
    }

    pub fn anchored(&self) -> bool {
        self.anchored
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    fn matches(&self, ctx: &MatchContext<'_>) -> bool {
        let exact = (!self.dir_only || ctx.is_dir) && match_full(&self.segments, ctx.components);
        if exact {
            return true;
        }
        if self.include_subtree {
            // The matched prefix of a descendant is necessarily a directory,
            // so the dir_only gate does not apply here.
            if match_descendant(&self.segments, ctx.components) {
                return true;
            }
            if ctx.is_dir && match_under(&self.segments, ctx.components) {
                return true;
            }
        }
        false
    }
}

/// A content rule matching a file's shebang line
#[derive(Debug, Clone)]
pub struct ShebangRule {
    interpreter: String,
    negated: bool,
}

impl ShebangRule {
    pub fn new(interpreter: impl Into<String>, negated: bool) -> Self {
        Self {
            interpreter: interpreter.into(),
            negated,
        }
    }

    pub fn negated(&self) -> bool {
        self.negated
    }

    pub fn interpreter(&self) -> &str {
        &self.interpreter
    }

    fn matches(&self, ctx: &MatchContext<'_>) -> bool {
        if ctx.is_dir {
            return false;
        }
        let Some(line) = ctx.content else {
            // No content supplied means no verdict, never an error.
            return false;
        };
        line.starts_with("#!") && contains_word(line, &self.interpreter)
    }
}

/// The compiled, evaluable form of one pattern line
#[derive(Debug, Clone)]
pub enum Rule {
    Path(PathRule),
    Shebang(ShebangRule),
    /// Produced for malformed patterns; never matches anything
    Unmatchable,
}

impl Rule {
    /// Whether this rule re-includes rather than excludes within its group
    pub fn negated(&self) -> bool {
        match self {
            Rule::Path(r) => r.negated(),
            Rule::Shebang(r) => r.negated(),
            Rule::Unmatchable => false,
        }
    }

    pub fn is_content_rule(&self) -> bool {
        matches!(self, Rule::Shebang(_))
    }

    /// The single evaluation operation over the closed variant set
    pub fn matches(&self, ctx: &MatchContext<'_>) -> bool {
        match self {
            Rule::Path(r) => r.matches(ctx),
            Rule::Shebang(r) => r.matches(ctx),
            Rule::Unmatchable => false,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // original already carries its negation and anchoring markers
            Rule::Path(r) => write!(f, "{}", r.original),
            Rule::Shebang(r) => {
                if r.negated {
                    write!(f, "!#!:{}", r.interpreter)
                } else {
                    write!(f, "#!:{}", r.interpreter)
                }
            }
            Rule::Unmatchable => write!(f, "<unmatchable>"),
        }
    }
}

/// Pattern fully matches the path
fn match_full(segments: &[Segment], comps: &[&str]) -> bool {
    match segments.split_first() {
        None => comps.is_empty(),
        Some((Segment::AnyDirs, rest)) => {
            (0..=comps.len()).any(|i| match_full(rest, &comps[i..]))
        }
        Some((Segment::Literal(tokens), rest)) => match comps.split_first() {
            Some((name, tail)) => match_tokens(tokens, name) && match_full(rest, tail),
            None => false,
        },
    }
}

/// Pattern fully matches a proper prefix of the path, i.e. the path sits
/// inside a directory the pattern matched
fn match_descendant(segments: &[Segment], comps: &[&str]) -> bool {
    match segments.split_first() {
        None => !comps.is_empty(),
        Some((Segment::AnyDirs, rest)) => {
            (0..=comps.len()).any(|i| match_descendant(rest, &comps[i..]))
        }
        Some((Segment::Literal(tokens), rest)) => match comps.split_first() {
            Some((name, tail)) => match_tokens(tokens, name) && match_descendant(rest, tail),
            None => false,
        },
    }
}

/// The path (a directory) could be an ancestor of something the pattern
/// matches. Conservative in the allow direction: every glob segment is
/// assumed able to produce at least one name.
fn match_under(segments: &[Segment], comps: &[&str]) -> bool {
    match segments.split_first() {
        None => false,
        // Once a globstar is reachable, any directory can host a match
        // somewhere below it.
        Some((Segment::AnyDirs, _)) => true,
        Some((Segment::Literal(tokens), rest)) => match comps.split_first() {
            Some((name, tail)) => match_tokens(tokens, name) && match_under(rest, tail),
            None => true,
        },
    }
}

/// Glob comparison of one segment against one path component
fn match_tokens(tokens: &[Token], name: &str) -> bool {
    match tokens.split_first() {
        None => name.is_empty(),
        Some((Token::Char(ch), rest)) => {
            let mut chars = name.chars();
            chars.next() == Some(*ch) && match_tokens(rest, chars.as_str())
        }
        Some((Token::AnyChar, rest)) => {
            let mut chars = name.chars();
            chars.next().is_some() && match_tokens(rest, chars.as_str())
        }
        Some((Token::Class { negated, ranges }, rest)) => {
            let mut chars = name.chars();
            match chars.next() {
                Some(c) => {
                    let inside = ranges.iter().any(|&(lo, hi)| lo <= c && c <= hi);
                    inside != *negated && match_tokens(rest, chars.as_str())
                }
                None => false,
            }
        }
        Some((Token::AnyRun, rest)) => {
            // Try the shortest consumption first, then extend one character
            // at a time.
            if match_tokens(rest, name) {
                return true;
            }
            let mut chars = name.chars();
            while chars.next().is_some() {
                if match_tokens(rest, chars.as_str()) {
                    return true;
                }
            }
            false
        }
    }
}

/// Whole-word containment check for interpreter names
fn contains_word(haystack: &str, word: &str) -> bool {
    if word.is_empty() {
        return false;
    }
    let is_word_char = |c: char| c.is_alphanumeric() || c == '_';
    let mut start = 0;
    while let Some(pos) = haystack[start..].find(word) {
        let at = start + pos;
        let end = at + word.len();
        let before_ok = haystack[..at].chars().next_back().map_or(true, |c| !is_word_char(c));
        let after_ok = haystack[end..].chars().next().map_or(true, |c| !is_word_char(c));
        if before_ok && after_ok {
            return true;
        }
        start = at + haystack[at..].chars().next().map_or(1, char::len_utf8);
    }
    false
}
