use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One record of a Jira search response. Every field is optional on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawIssue {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub fields: RawIssueFields,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawIssueFields {
    #[serde(default)]
    pub summary: Option<String>,
    /// Plain text (API v2) or an Atlassian Document Format tree (API v3).
    #[serde(default)]
    pub description: Option<Value>,
    #[serde(default)]
    pub issuetype: Option<NamedField>,
    #[serde(default)]
    pub project: Option<ProjectRef>,
    #[serde(default, rename = "fixVersions")]
    pub fix_versions: Vec<NamedField>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamedField {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectRef {
    #[serde(default)]
    pub key: Option<String>,
}

impl RawIssue {
    pub fn project_key(&self) -> Option<&str> {
        self.fields.project.as_ref().and_then(|p| p.key.as_deref())
    }

    pub fn issue_type(&self) -> Option<&str> {
        self.fields.issuetype.as_ref().and_then(|t| t.name.as_deref())
    }

    pub fn fix_version(&self) -> Option<&str> {
        self.fields
            .fix_versions
            .iter()
            .filter_map(|v| v.name.as_deref())
            .find(|v| !v.trim().is_empty())
    }
}

/// The minimal, LLM-friendly view of an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedIssue {
    pub key: String,
    pub project: String,
    pub title: String,
    pub issue_type: String,
    pub fix_version: Option<String>,
    pub raw_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueSummary {
    pub key: String,
    pub project: String,
    pub issue_type: String,
    pub fix_version: Option<String>,
    pub bullet_text: String,
    /// Set when the model never produced usable text and the title was used instead.
    pub degraded: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectGroup {
    pub project_key: String,
    pub fix_version: String,
    pub summaries: Vec<IssueSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectTarget {
    pub project: String,
    pub fix_version: String,
}
