//! Environment-level configuration discovery

pub mod excludes;

pub use excludes::global_excludes_path;
