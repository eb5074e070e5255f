//! Gitignore-dialect pattern compiler
//!
//! Translates one raw pattern line into a [`Rule`]. Blank lines and comments
//! compile to nothing; anything malformed (unterminated character class,
//! dangling escape) compiles to [`Rule::Unmatchable`] so a broken line never
//! aborts processing and simply never excludes anything.

use tracing::warn;

use crate::rules::rule::{PathRule, Rule, Segment, ShebangRule, Token};

/// Compile one pattern line.
///
/// `allow` marks lines owned by an allow-style (re-include) source, which
/// changes how the compiled rule treats directories and subtrees. `prefix`
/// is the source directory relative to the filter root, split into
/// components; compiled segments are rooted below it.
///
/// Returns `None` for blank lines and comments, `Some` otherwise.
pub fn compile_line(line: &str, allow: bool, prefix: &[String]) -> Option<Rule> {
    let line = line.strip_suffix('\n').unwrap_or(line);
    let line = line.strip_suffix('\r').unwrap_or(line);

    // Shebang rules are spelled `#!:NAME` and take priority over the
    // comment syntax they would otherwise collide with.
    if let Some(body) = line.strip_prefix("#!:") {
        return Some(compile_shebang(body, false, line));
    }
    if let Some(rest) = line.strip_prefix('!') {
        if let Some(body) = rest.strip_prefix("#!:") {
            return Some(compile_shebang(body, true, line));
        }
    }

    // Trailing whitespace is stripped unless the final space is escaped.
    let line = if line.ends_with("\\ ") {
        line
    } else {
        line.trim_end()
    };

    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let original = line.to_string();
    let mut body = line;

    let negated = match body.strip_prefix('!') {
        Some(rest) => {
            body = rest;
            true
        }
        None => false,
    };

    // A trailing unescaped `/` restricts the rule to directories.
    let mut dir_only = false;
    if let Some(rest) = body.strip_suffix('/') {
        dir_only = true;
        // An escaped trailing slash keeps the directory marker but drops
        // the escape.
        body = rest.strip_suffix('\\').unwrap_or(rest);
    }

    let anchored = match body.strip_prefix('/') {
        Some(rest) => {
            body = rest;
            true
        }
        None => body.contains('/'),
    };

    if body.is_empty() {
        warn!(pattern = %original, "pattern has no matchable body, treating as unmatchable");
        return Some(Rule::Unmatchable);
    }

    let mut segments = Vec::new();
    for raw in body.split('/') {
        if raw == "**" {
            // Collapse consecutive globstar segments.
            if segments.last() != Some(&Segment::AnyDirs) {
                segments.push(Segment::AnyDirs);
            }
            continue;
        }
        match tokenize(raw) {
            Ok(tokens) => segments.push(Segment::Literal(tokens)),
            Err(err) => {
                warn!(pattern = %original, error = %err, "pattern failed to compile, treating as unmatchable");
                return Some(Rule::Unmatchable);
            }
        }
    }

    // A trailing `/**` matches everything inside the directory but not the
    // directory itself, so it needs one mandatory extra segment.
    if segments.len() >= 2 && segments.last() == Some(&Segment::AnyDirs) {
        segments.push(Segment::Literal(vec![Token::AnyRun]));
    }

    // Unanchored patterns match at any depth below their root.
    if !anchored && segments.first() != Some(&Segment::AnyDirs) {
        segments.insert(0, Segment::AnyDirs);
    }

    // Root the rule below its source directory.
    if !prefix.is_empty() {
        let mut rooted: Vec<Segment> = prefix
            .iter()
            .map(|name| Segment::Literal(name.chars().map(Token::Char).collect()))
            .collect();
        rooted.extend(segments);
        segments = rooted;
    }

    let include_subtree = allow && !negated;
    Some(Rule::Path(PathRule::new(
        segments,
        negated,
        dir_only,
        anchored,
        include_subtree,
        original,
    )))
}

fn compile_shebang(body: &str, negated: bool, original: &str) -> Rule {
    let interpreter = body.trim();
    if interpreter.is_empty() {
        warn!(pattern = %original, "empty shebang pattern, treating as unmatchable");
        return Rule::Unmatchable;
    }
    Rule::Shebang(ShebangRule::new(interpreter, negated))
}

#[derive(Debug, PartialEq)]
enum GlobError {
    DanglingEscape,
    UnterminatedClass,
    InvalidRange,
}

impl std::fmt::Display for GlobError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GlobError::DanglingEscape => write!(f, "dangling escape"),
            GlobError::UnterminatedClass => write!(f, "unterminated character class"),
            GlobError::InvalidRange => write!(f, "invalid character range"),
        }
    }
}

/// Tokenize one path segment of a pattern
fn tokenize(segment: &str) -> Result<Vec<Token>, GlobError> {
    let mut tokens = Vec::new();
    let mut chars = segment.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(escaped) => tokens.push(Token::Char(escaped)),
                None => return Err(GlobError::DanglingEscape),
            },
            '*' => tokens.push(Token::AnyRun),
            '?' => tokens.push(Token::AnyChar),
            '[' => tokens.push(parse_class(&mut chars)?),
            other => tokens.push(Token::Char(other)),
        }
    }
    Ok(tokens)
}

fn parse_class(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
) -> Result<Token, GlobError> {
    let negated = matches!(chars.peek(), Some('!') | Some('^'));
    if negated {
        chars.next();
    }

    let mut ranges = Vec::new();
    let mut first = true;
    loop {
        let c = chars.next().ok_or(GlobError::UnterminatedClass)?;
        if c == ']' && !first {
            break;
        }
        first = false;
        let lo = if c == '\\' {
            chars.next().ok_or(GlobError::DanglingEscape)?
        } else {
            c
        };
        if chars.peek() == Some(&'-') {
            chars.next();
            match chars.peek() {
                // `[a-]` keeps both the character and the dash as literals
                Some(']') => {
                    ranges.push((lo, lo));
                    ranges.push(('-', '-'));
                }
                None => return Err(GlobError::UnterminatedClass),
                Some(_) => {
                    let next = chars.next().ok_or(GlobError::UnterminatedClass)?;
                    let hi = if next == '\\' {
                        chars.next().ok_or(GlobError::DanglingEscape)?
                    } else {
                        next
                    };
                    if lo > hi {
                        return Err(GlobError::InvalidRange);
                    }
                    ranges.push((lo, hi));
                }
            }
        } else {
            ranges.push((lo, lo));
        }
    }
    Ok(Token::Class { negated, ranges })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::rule::MatchContext;

    fn compile(line: &str) -> Option<Rule> {
        compile_line(line, false, &[])
    }

    fn matches(line: &str, path: &str, is_dir: bool) -> bool {
        // A blank/comment line compiles to no rule, which matches nothing.
        let Some(rule) = compile(line) else {
            return false;
        };
        let comps: Vec<&str> = path.split('/').collect();
        rule.matches(&MatchContext::new(&comps, is_dir, None))
    }

    #[test]
    fn test_blank_and_comment_lines() {
        assert!(compile("").is_none());
        assert!(compile("   ").is_none());
        assert!(compile("# a comment").is_none());
        assert!(compile("#").is_none());
    }

    #[test]
    fn test_escaped_comment_is_a_pattern() {
        assert!(matches("\\#foo", "#foo", false));
        assert!(!matches("# foo", "# foo", false));
    }

    #[test]
    fn test_escaped_negation_is_literal() {
        assert!(matches("\\!important", "!important", false));
        let rule = compile("\\!important").unwrap();
        assert!(!rule.negated());
    }

    #[test]
    fn test_basename_matching_at_any_depth() {
        assert!(matches("months", "months", false));
        assert!(matches("months", "deep/nested/months", false));
        assert!(matches("*.lock", "Cargo.lock", false));
        assert!(matches("*.rs", "src/main.rs", false));
        assert!(!matches("amonths", "months", false));
        assert!(!matches("monthsa", "months", false));
    }

    #[test]
    fn test_anchoring() {
        assert!(matches("/foo", "foo", false));
        assert!(!matches("/foo", "bar/foo", false));
        assert!(matches("foo", "bar/foo", false));
        // an interior slash anchors too
        assert!(matches("src/*.rs", "src/main.rs", false));
        assert!(!matches("src/*.rs", "src/grep/src/main.rs", false));
    }

    #[test]
    fn test_directory_only() {
        assert!(matches("foo/", "foo", true));
        assert!(!matches("foo/", "foo", false));
        assert!(matches("foo/", "xyz/foo", true));
    }

    #[test]
    fn test_globstar_forms() {
        assert!(matches("**/foo", "foo", false));
        assert!(matches("**/foo", "src/foo", false));
        assert!(matches("**/foo/**", "src/foo/bar", false));
        assert!(matches("**/foo/**", "wat/src/foo/bar/baz", false));
        assert!(!matches("**/foo/**", "wat/src/afoo/bar/baz", false));
        assert!(matches("abc/**", "abc/x", false));
        assert!(matches("abc/**", "abc/x/y/z", false));
        assert!(!matches("abc/**", "abc", true));
        assert!(matches("a/**/b", "a/b", false));
        assert!(matches("a/**/b", "a/x/y/b", false));
        assert!(matches("**", "foo.rs", false));
        assert!(matches("**/", "foo/bar", true));
    }

    #[test]
    fn test_single_star_never_crosses_separators() {
        assert!(matches("path1/*", "path1/foo", false));
        assert!(!matches("path1/*", "path1/a/b", false));
        assert!(!matches("path1/*", "path2/path1/foo", false));
    }

    #[test]
    fn test_question_mark() {
        assert!(matches("?at", "cat", false));
        assert!(matches("?at", "hat", false));
        assert!(!matches("?at", "at", false));
        assert!(!matches("?at", "flat", false));
    }

    #[test]
    fn test_character_classes() {
        assert!(matches("[abc].txt", "a.txt", false));
        assert!(!matches("[abc].txt", "d.txt", false));
        assert!(matches("[a-z].txt", "q.txt", false));
        assert!(matches("[!a-z].txt", "1.txt", false));
        assert!(matches("[^a-z].txt", "1.txt", false));
        assert!(!matches("[!a-z].txt", "q.txt", false));
        assert!(matches("[]]x", "]x", false));
        assert!(matches("[a-]", "a", false));
        assert!(matches("[a-]", "-", false));
    }

    #[test]
    fn test_escaped_metacharacters() {
        assert!(matches("\\[", "[", false));
        assert!(matches("\\?", "?", false));
        assert!(matches("\\*", "*", false));
        assert!(matches("\\a", "a", false));
        assert!(!matches("\\*", "anything", false));
    }

    #[test]
    fn test_trailing_whitespace_rules() {
        assert!(matches("node_modules/ ", "node_modules", true));
        assert!(matches("foo\\ ", "foo ", false));
    }

    #[test]
    fn test_malformed_patterns_are_unmatchable() {
        assert!(matches_unmatchable("[abc"));
        assert!(matches_unmatchable("[z-a]"));
        assert!(matches_unmatchable("foo\\"));
        assert!(matches_unmatchable("/"));
    }

    fn matches_unmatchable(line: &str) -> bool {
        matches!(compile(line), Some(Rule::Unmatchable))
    }

    #[test]
    fn test_shebang_lines() {
        let rule = compile_line("#!:ruby", false, &[]).unwrap();
        assert!(rule.is_content_rule());
        assert!(!rule.negated());

        let negated = compile_line("!#!:python", false, &[]).unwrap();
        assert!(negated.is_content_rule());
        assert!(negated.negated());

        assert!(matches!(
            compile_line("#!:", false, &[]),
            Some(Rule::Unmatchable)
        ));
    }

    #[test]
    fn test_source_prefix_roots_the_rule() {
        let prefix = vec!["sub".to_string()];
        let rule = compile_line("/bar", false, &prefix).unwrap();
        let hit = ["sub", "bar"];
        let miss = ["bar"];
        assert!(rule.matches(&MatchContext::new(&hit, false, None)));
        assert!(!rule.matches(&MatchContext::new(&miss, false, None)));

        let unanchored = compile_line("bar", false, &prefix).unwrap();
        let deep = ["sub", "a", "bar"];
        assert!(unanchored.matches(&MatchContext::new(&deep, false, None)));
        assert!(!unanchored.matches(&MatchContext::new(&miss, false, None)));
    }

    #[test]
    fn test_negation_flag() {
        let rule = compile("!keep.log").unwrap();
        assert!(rule.negated());
        let comps = ["keep.log"];
        assert!(rule.matches(&MatchContext::new(&comps, false, None)));
    }
}
