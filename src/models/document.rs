use serde::{Deserialize, Serialize};
use std::fmt;

pub const NO_ITEMS_PLACEHOLDER: &str = "_No items to report for this release._";

/// Final Markdown artifact of a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseNotesDocument {
    markdown: String,
    issue_count: usize,
    degraded_count: usize,
}

impl ReleaseNotesDocument {
    pub fn new(markdown: String, issue_count: usize, degraded_count: usize) -> Self {
        Self {
            markdown,
            issue_count,
            degraded_count,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.markdown
    }

    pub fn issue_count(&self) -> usize {
        self.issue_count
    }

    pub fn degraded_count(&self) -> usize {
        self.degraded_count
    }

    /// True for the "no items" placeholder: the run completed but nothing matched.
    pub fn is_empty(&self) -> bool {
        self.issue_count == 0
    }
}

impl fmt::Display for ReleaseNotesDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.markdown)
    }
}
