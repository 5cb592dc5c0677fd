pub mod client;
pub mod extractor;
pub mod paginator;
pub mod query;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::RawIssue;

pub use client::JiraClient;
pub use extractor::extract;
pub use query::{FilterExpression, ProjectCatalog};

/// Where the issues of a release come from.
#[async_trait]
pub trait IssueSource: Send + Sync {
    async fn fetch_issues(&self, project: &str, filter: &FilterExpression)
        -> Result<Vec<RawIssue>>;
}
