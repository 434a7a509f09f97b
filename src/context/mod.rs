//! Review context assembly.
//!
//! Loads the full contents of changed files so the reviewer sees each file
//! as it stands in the working tree, not just the diff.

pub mod files;

pub use files::read_all;
