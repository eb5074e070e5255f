//! Integration tests for gitignore semantics through the facade

use anyhow::Result;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use treeignore::TreeIgnore;

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

fn filter_for(root: &Path) -> Result<TreeIgnore> {
    Ok(TreeIgnore::builder().root(root).git_global(false).build()?)
}

#[test]
fn test_last_match_wins_within_one_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    write_file(&root.join(".gitignore"), "*.log\n!keep.log\n")?;
    write_file(&root.join("keep.log"), "kept")?;
    write_file(&root.join("debug.log"), "dropped")?;

    let filter = filter_for(root)?;
    assert!(filter.is_allowed("keep.log"));
    assert!(!filter.is_allowed("debug.log"));
    Ok(())
}

#[test]
fn test_directory_only_pattern_spares_plain_files() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    write_file(&root.join(".gitignore"), "build/\n")?;
    write_file(&root.join("build"), "just a file named build")?;

    let filter = filter_for(root)?;
    assert!(filter.is_allowed("build"));

    // now replace the file with a directory of the same name
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    write_file(&root.join(".gitignore"), "build/\n")?;
    write_file(&root.join("build/out.o"), "object")?;

    let filter = filter_for(root)?;
    assert!(!filter.is_allowed_with(
        "build",
        treeignore::Hints {
            include_directories: true,
            ..Default::default()
        }
    ));
    // denial of the directory extends to everything inside it
    assert!(!filter.is_allowed("build/out.o"));
    Ok(())
}

#[test]
fn test_anchored_vs_unanchored() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    write_file(&root.join(".gitignore"), "/foo\n")?;
    write_file(&root.join("foo"), "top level")?;
    write_file(&root.join("bar/foo"), "nested")?;

    let filter = filter_for(root)?;
    assert!(!filter.is_allowed("foo"));
    assert!(filter.is_allowed("bar/foo"));

    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    write_file(&root.join(".gitignore"), "foo\n")?;
    write_file(&root.join("foo"), "top level")?;
    write_file(&root.join("bar/foo"), "nested")?;

    let filter = filter_for(root)?;
    assert!(!filter.is_allowed("foo"));
    assert!(!filter.is_allowed("bar/foo"));
    Ok(())
}

#[test]
fn test_globstar_crosses_directories() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    write_file(&root.join(".gitignore"), "**/node_modules/**\n")?;
    write_file(&root.join("node_modules/x.js"), "x")?;
    write_file(&root.join("a/b/node_modules/y.js"), "y")?;
    write_file(&root.join("a/b/src.js"), "src")?;

    let filter = filter_for(root)?;
    assert!(!filter.is_allowed("node_modules/x.js"));
    assert!(!filter.is_allowed("a/b/node_modules/y.js"));
    assert!(filter.is_allowed("a/b/src.js"));
    Ok(())
}

#[test]
fn test_repo_exclude_and_gitignore_combine() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    write_file(&root.join(".gitignore"), "*.log\n")?;
    write_file(&root.join(".git/info/exclude"), "*.swp\n")?;
    write_file(&root.join("notes.swp"), "swap")?;
    write_file(&root.join("notes.log"), "log")?;
    write_file(&root.join("notes.txt"), "text")?;

    let filter = filter_for(root)?;
    assert!(!filter.is_allowed("notes.swp"));
    assert!(!filter.is_allowed("notes.log"));
    assert!(filter.is_allowed("notes.txt"));
    Ok(())
}

#[test]
fn test_git_dir_is_always_denied() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    write_file(&root.join(".git/config"), "[core]\n")?;
    write_file(&root.join("src/main.rs"), "fn main() {}")?;

    let filter = filter_for(root)?;
    assert!(!filter.is_allowed(".git/config"));
    assert!(filter.is_allowed("src/main.rs"));
    Ok(())
}

#[test]
fn test_malformed_patterns_are_inert() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    write_file(&root.join(".gitignore"), "[unterminated\n*.log\n")?;
    write_file(&root.join("unterminated"), "u")?;
    write_file(&root.join("app.log"), "l")?;

    let filter = filter_for(root)?;
    // the broken line excludes nothing, the healthy line still works
    assert!(filter.is_allowed("unterminated"));
    assert!(!filter.is_allowed("app.log"));
    Ok(())
}

#[test]
fn test_repeated_queries_are_deterministic() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    write_file(&root.join(".gitignore"), "*.tmp\n!keep.tmp\n")?;
    write_file(&root.join("keep.tmp"), "k")?;
    write_file(&root.join("other.tmp"), "o")?;

    let filter = filter_for(root)?;
    for _ in 0..5 {
        assert!(filter.is_allowed("keep.tmp"));
        assert!(!filter.is_allowed("other.tmp"));
    }
    Ok(())
}

#[test]
fn test_escaped_specials_in_ignore_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    write_file(&root.join(".gitignore"), "\\#hash\n\\!bang\n")?;
    write_file(&root.join("#hash"), "h")?;
    write_file(&root.join("!bang"), "b")?;
    write_file(&root.join("plain"), "p")?;

    let filter = filter_for(root)?;
    assert!(!filter.is_allowed("#hash"));
    assert!(!filter.is_allowed("!bang"));
    assert!(filter.is_allowed("plain"));
    Ok(())
}
