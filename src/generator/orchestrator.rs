use std::collections::{BTreeSet, HashSet};

use tokio::time::Instant;

use crate::generator::aggregator::Aggregator;
use crate::generator::priority::ProjectPriority;
use crate::jira::extract;
use crate::llm::Summarizer;
use crate::models::{
    ExtractedIssue, IssueSummary, ProjectGroup, ProjectTarget, RawIssue, ReleaseNotesDocument,
};

const PROJECT_DIVIDER: &str = "\n---\n\n";

/// Builds one document out of issues spread over several projects.
pub struct MultiProjectOrchestrator {
    priority: ProjectPriority,
    aggregator: Aggregator,
}

impl MultiProjectOrchestrator {
    pub fn new(priority: ProjectPriority, aggregator: Aggregator) -> Self {
        Self {
            priority,
            aggregator,
        }
    }

    pub async fn run_multiproject(
        &self,
        summarizer: &Summarizer,
        project_context: &str,
        issues: &[RawIssue],
        requested_fix_version: &str,
        deadline: Option<Instant>,
    ) -> ReleaseNotesDocument {
        let mut extracted = extract(project_context, issues);
        apply_default_fix_version(&mut extracted, requested_fix_version);

        let targets = self.plan_projects(&extracted, requested_fix_version);
        tracing::info!(
            "Generating release notes for {} project(s): {}",
            targets.len(),
            targets
                .iter()
                .map(|t| t.project.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let summaries = summarizer.summarize_all(&extracted, deadline).await;
        let groups = self.group(&summaries, &targets);
        self.compose(&groups, requested_fix_version)
    }

    /// Distinct projects of the issue set, in priority order.
    pub fn plan_projects(
        &self,
        issues: &[ExtractedIssue],
        requested_fix_version: &str,
    ) -> Vec<ProjectTarget> {
        let unique: BTreeSet<&str> = issues.iter().map(|i| i.project.as_str()).collect();
        let mut projects: Vec<String> = unique.into_iter().map(str::to_string).collect();
        self.priority.sort(&mut projects);

        projects
            .into_iter()
            .map(|project| ProjectTarget {
                project,
                fix_version: requested_fix_version.to_string(),
            })
            .collect()
    }

    pub fn group(&self, summaries: &[IssueSummary], targets: &[ProjectTarget]) -> Vec<ProjectGroup> {
        targets
            .iter()
            .map(|target| {
                let mut seen = HashSet::new();
                let members: Vec<IssueSummary> = summaries
                    .iter()
                    .filter(|s| s.project == target.project)
                    .filter(|s| seen.insert(s.key.clone()))
                    .cloned()
                    .collect();
                let fix_version = members
                    .first()
                    .and_then(|s| s.fix_version.clone())
                    .unwrap_or_else(|| target.fix_version.clone());

                ProjectGroup {
                    project_key: target.project.clone(),
                    fix_version,
                    summaries: members,
                }
            })
            .collect()
    }

    pub fn compose(&self, groups: &[ProjectGroup], fix_version: &str) -> ReleaseNotesDocument {
        let title = format!("Release Notes - {}", fix_version.trim());
        if groups.iter().all(|g| g.summaries.is_empty()) {
            return ReleaseNotesDocument::new(self.aggregator.aggregate(&[], &title), 0, 0);
        }

        let blocks: Vec<String> = groups
            .iter()
            .filter(|g| !g.summaries.is_empty())
            .map(|g| {
                let header = format!("{} - {}", g.project_key, g.fix_version);
                self.aggregator.aggregate(&g.summaries, &header)
            })
            .collect();

        let issue_count = groups.iter().map(|g| g.summaries.len()).sum();
        let degraded_count = groups
            .iter()
            .flat_map(|g| g.summaries.iter())
            .filter(|s| s.degraded)
            .count();

        let markdown = format!("# {}\n\n{}", title, blocks.join(PROJECT_DIVIDER));
        ReleaseNotesDocument::new(markdown, issue_count, degraded_count)
    }
}

pub fn apply_default_fix_version(issues: &mut [ExtractedIssue], fix_version: &str) {
    for issue in issues.iter_mut().filter(|i| i.fix_version.is_none()) {
        issue.fix_version = Some(fix_version.to_string());
    }
}
