use std::fmt;
use std::sync::Arc;

use tokio::time::Instant;

use crate::config::PipelineConfig;
use crate::error::Error;
use crate::generator::aggregator::Aggregator;
use crate::generator::orchestrator::MultiProjectOrchestrator;
use crate::generator::priority::ProjectPriority;
use crate::jira::extract;
use crate::llm::{LLMProvider, Summarizer};
use crate::models::{RawIssue, ReleaseNotesDocument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    InvalidRequest,
    TransientProvider,
    /// Tracker or response problems that retrying will not fix (auth, bad query, parse).
    Fetch,
    Publish,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidRequest => write!(f, "invalid request"),
            FailureKind::TransientProvider => write!(f, "provider error"),
            FailureKind::Fetch => write!(f, "fetch error"),
            FailureKind::Publish => write!(f, "publish error"),
        }
    }
}

/// The single error value crossing the pipeline boundary. Never carries partial output.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {reason}")]
pub struct Failure {
    pub kind: FailureKind,
    pub reason: String,
}

impl Failure {
    pub fn new(kind: FailureKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }

    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::new(FailureKind::InvalidRequest, reason)
    }

    pub fn publish(reason: impl Into<String>) -> Self {
        Self::new(FailureKind::Publish, reason)
    }
}

impl From<Error> for Failure {
    fn from(error: Error) -> Self {
        let kind = match &error {
            Error::InvalidRequest(_) | Error::Config(_) => FailureKind::InvalidRequest,
            Error::ConfluenceApi(_) => FailureKind::Publish,
            e if e.is_transient() => FailureKind::TransientProvider,
            _ => FailureKind::Fetch,
        };
        Self::new(kind, error.to_string())
    }
}

/// Sequences extract, summarize-all and aggregate for one run.
pub struct GeneratorPipeline {
    summarizer: Summarizer,
    aggregator: Aggregator,
    orchestrator: MultiProjectOrchestrator,
    config: PipelineConfig,
}

impl GeneratorPipeline {
    pub fn new(llm: Arc<dyn LLMProvider>, config: PipelineConfig, priority: ProjectPriority) -> Self {
        let aggregator = Aggregator::new(config.issue_base_url.clone());
        Self {
            summarizer: Summarizer::new(llm, &config),
            orchestrator: MultiProjectOrchestrator::new(priority, aggregator.clone()),
            aggregator,
            config,
        }
    }

    pub async fn run(
        &self,
        project: &str,
        issues: &[RawIssue],
        fix_version: &str,
    ) -> Result<ReleaseNotesDocument, Failure> {
        let (project, fix_version) = validate(project, fix_version)?;

        let extracted = extract(project, issues);
        let summaries = self.summarizer.summarize_all(&extracted, self.deadline()).await;

        let header = format!("Release Notes - {} - {}", project, fix_version);
        let markdown = self.aggregator.aggregate(&summaries, &header);
        let degraded = summaries.iter().filter(|s| s.degraded).count();

        Ok(ReleaseNotesDocument::new(markdown, summaries.len(), degraded))
    }

    pub async fn run_multiproject(
        &self,
        project: &str,
        issues: &[RawIssue],
        fix_version: &str,
    ) -> Result<ReleaseNotesDocument, Failure> {
        let (project, fix_version) = validate(project, fix_version)?;

        Ok(self
            .orchestrator
            .run_multiproject(&self.summarizer, project, issues, fix_version, self.deadline())
            .await)
    }

    fn deadline(&self) -> Option<Instant> {
        self.config.deadline.map(|timeout| Instant::now() + timeout)
    }
}

fn validate<'a>(project: &'a str, fix_version: &'a str) -> Result<(&'a str, &'a str), Failure> {
    let project = project.trim();
    let fix_version = fix_version.trim();
    if project.is_empty() {
        return Err(Failure::invalid_request("project must not be empty"));
    }
    if fix_version.is_empty() {
        return Err(Failure::invalid_request("fix version must not be empty"));
    }
    Ok((project, fix_version))
}
