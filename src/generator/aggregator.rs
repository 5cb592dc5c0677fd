use std::collections::HashSet;
use std::fmt;

use crate::models::{IssueSummary, NO_ITEMS_PLACEHOLDER};

/// Release-notes section an issue type is filed under. Variant order is document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Section {
    Features,
    Improvements,
    Fixes,
    Other,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Features,
        Section::Improvements,
        Section::Fixes,
        Section::Other,
    ];

    pub fn for_issue_type(issue_type: &str) -> Self {
        match issue_type.trim().to_lowercase().as_str() {
            "story" | "feature" | "new feature" | "epic" => Section::Features,
            "improvement" | "enhancement" | "task" | "sub-task" | "subtask" => {
                Section::Improvements
            }
            "bug" | "defect" | "hotfix" | "incident" => Section::Fixes,
            _ => Section::Other,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Features => write!(f, "Features"),
            Section::Improvements => write!(f, "Improvements"),
            Section::Fixes => write!(f, "Fixes"),
            Section::Other => write!(f, "Other"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    issue_base_url: Option<String>,
}

impl Aggregator {
    /// With a base URL, each issue key is rendered as a link to `{base}/{key}`.
    pub fn new(issue_base_url: Option<String>) -> Self {
        Self {
            issue_base_url: issue_base_url
                .map(|url| url.trim().trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty()),
        }
    }

    pub fn aggregate(&self, summaries: &[IssueSummary], header: &str) -> String {
        let mut output = format!("# {}\n\n", header.trim());

        let mut seen = HashSet::new();
        let unique: Vec<&IssueSummary> = summaries
            .iter()
            .filter(|s| seen.insert(s.key.as_str()))
            .collect();

        if unique.is_empty() {
            output.push_str(NO_ITEMS_PLACEHOLDER);
            output.push('\n');
            return output;
        }

        for section in Section::ALL {
            let items: Vec<&&IssueSummary> = unique
                .iter()
                .filter(|s| Section::for_issue_type(&s.issue_type) == section)
                .collect();
            if items.is_empty() {
                continue;
            }

            output.push_str(&format!("## {}\n\n", section));
            for summary in items {
                output.push_str(&format!(
                    "- {}: {}\n",
                    self.citation(&summary.key),
                    single_line(&summary.bullet_text)
                ));
            }
            output.push('\n');
        }

        output.truncate(output.trim_end().len());
        output.push('\n');
        output
    }

    fn citation(&self, key: &str) -> String {
        match &self.issue_base_url {
            Some(base) => format!("[{}]({}/{})", key, base, key),
            None => format!("**{}**", key),
        }
    }
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
