//! Change set produced by the change detector.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// File path → file text (or an error placeholder), in change-set order.
pub type FileContentMap = IndexMap<String, String>;

/// Files changed in the current run plus their raw diff text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    /// Changed paths, relative to the repository root, in diff order.
    pub files: Vec<String>,
    /// Raw unified diff text; may be empty.
    pub diff: String,
}

impl ChangeSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// A change set with no files and no diff text.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.diff.is_empty()
    }
}
