//! Global excludes-file resolution
//!
//! Finds the ignore file git consults for every repository: the
//! `core.excludesFile` setting from `~/.gitconfig`, then from
//! `$XDG_CONFIG_HOME/git/config`, falling back to
//! `$XDG_CONFIG_HOME/git/ignore` (default `~/.config/git/ignore`).

use std::env;
use std::fs;
use std::path::PathBuf;

use directories::UserDirs;

/// Resolve the global excludes-file path for the current environment.
///
/// The returned path is not guaranteed to exist; callers treat a missing
/// file as an empty pattern list.
pub fn global_excludes_path() -> Option<PathBuf> {
    if let Some(path) = config_contents(home_dir()?.join(".gitconfig"))
        .as_deref()
        .and_then(parse_excludes_file)
    {
        return Some(path);
    }
    if let Some(path) = xdg_config_home()
        .and_then(|dir| config_contents(dir.join("git/config")))
        .as_deref()
        .and_then(parse_excludes_file)
    {
        return Some(path);
    }
    xdg_config_home().map(|dir| dir.join("git/ignore"))
}

fn config_contents(path: PathBuf) -> Option<String> {
    fs::read_to_string(path).ok()
}

fn xdg_config_home() -> Option<PathBuf> {
    match env::var_os("XDG_CONFIG_HOME") {
        Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => home_dir().map(|home| home.join(".config")),
    }
}

fn home_dir() -> Option<PathBuf> {
    UserDirs::new().map(|dirs| dirs.home_dir().to_path_buf())
}

/// Extract `core.excludesFile` from key/value config contents. This is a
/// line-level scan, not a full INI parser: it tracks the current section
/// heading and reads the first matching key inside `[core]`.
fn parse_excludes_file(contents: &str) -> Option<PathBuf> {
    let mut in_core = false;
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if line.starts_with('[') {
            in_core = line.eq_ignore_ascii_case("[core]");
            continue;
        }
        if !in_core {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        if key.trim().eq_ignore_ascii_case("excludesfile") {
            let value = value.trim().trim_matches('"');
            if value.is_empty() {
                continue;
            }
            return Some(expand_tilde(value));
        }
    }
    None
}

fn expand_tilde(value: &str) -> PathBuf {
    if value == "~" {
        if let Some(home) = home_dir() {
            return home;
        }
    }
    if let Some(rest) = value.strip_prefix("~/") {
        if let Some(home) = home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(value)
}
