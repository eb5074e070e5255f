//! Pattern sources and the gitignore-dialect compiler

pub mod compiler;
pub mod source;

pub use source::{PatternSource, SourceFormat};
