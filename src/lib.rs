//! treeignore - gitignore-semantics path filtering
//!
//! treeignore decides, for any path under a root directory, whether the
//! path is allowed or ignored: it compiles gitignore-dialect patterns from
//! any number of sources (the gitignore hierarchy, explicit allow/deny
//! lists, pattern files, shebang rules) into efficient matchers and composes
//! them with gitignore's precedence rules. Nested `.gitignore` files are
//! discovered lazily, only when a query or traversal actually reaches their
//! directory.
//!
//! # Core Features
//!
//! - **Full gitignore dialect**: anchoring, globstar, negation,
//!   directory-only patterns, character classes, escaping
//! - **Last match wins**: within a source and across sources, the most
//!   recently declared opinion decides
//! - **Lazy hierarchy**: nested ignore files load on first visit and are
//!   cached for the filter's lifetime
//! - **Shebang rules**: `#!:ruby` matches a file's interpreter line instead
//!   of its path
//! - **Fail-open syntax**: a malformed pattern never errors, it just never
//!   matches
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use treeignore::TreeIgnore;
//!
//! let filter = TreeIgnore::builder()
//!     .root("./my-project")
//!     .ignore_rules(["*.log", "!important.log"])
//!     .build()?;
//!
//! if filter.is_allowed("src/main.rs") {
//!     // track the file
//! }
//! for path in filter.walk() {
//!     println!("{}", path.display());
//! }
//! # Ok::<(), treeignore::TreeIgnoreError>(())
//! ```

pub mod config;
pub mod core;
pub mod filter;
pub mod pattern;
pub mod rules;
pub mod walk;

// Re-export commonly used types
pub use crate::core::error::{Result, TreeIgnoreError};

pub use crate::filter::{GitignoreMode, Hints, TreeIgnore, TreeIgnoreBuilder};

pub use crate::pattern::{PatternSource, SourceFormat};

pub use crate::walk::{FilteredScanner, ScanProgress, ScanResult, ScanStats, Walk};

/// Current version of treeignore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
