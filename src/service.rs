use std::fmt;
use std::sync::Arc;

use crate::config::{Config, PipelineConfig};
use crate::confluence::{ConfluenceClient, DocumentSink, PageReceipt, PageRequest};
use crate::dump::DebugDumper;
use crate::error::Result;
use crate::generator::{Failure, FailureKind, GeneratorPipeline};
use crate::jira::{IssueSource, JiraClient, ProjectCatalog};
use crate::llm::ClaudeProvider;
use crate::models::ReleaseNotesDocument;
use crate::retry::RetryPolicy;

pub const STATUS_MESSAGE: &str = "status: The Release Notes Generator is running";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    /// One project (or family) rendered as a single section list.
    SingleProject,
    /// Issues split per project and ordered by project priority.
    MultiProject,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Published {
        project: String,
        fix_version: String,
        receipt: PageReceipt,
    },
    NothingToReport {
        project: String,
        fix_version: String,
    },
    Failed {
        project: String,
        fix_version: String,
        failure: Failure,
    },
}

impl GenerationOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, GenerationOutcome::Failed { .. })
    }
}

impl fmt::Display for GenerationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationOutcome::Published {
                project,
                fix_version,
                ..
            } => write!(
                f,
                "The generation of the release notes Document for the project {} with the release version {} is completed",
                project, fix_version
            ),
            GenerationOutcome::NothingToReport {
                project,
                fix_version,
            } => write!(
                f,
                "No issues found for the project {} with the release version {}; nothing to report",
                project, fix_version
            ),
            GenerationOutcome::Failed {
                project,
                fix_version,
                failure,
            } => match failure.kind {
                FailureKind::Publish => write!(
                    f,
                    "Failed to create Confluence page for the project {} with the release version {}: {}",
                    project, fix_version, failure.reason
                ),
                _ => write!(
                    f,
                    "Failed to generate release notes for the project {} with the release version {}: {}",
                    project, fix_version, failure
                ),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct PublishSettings {
    pub space_key: String,
    pub parent_id: Option<String>,
    pub status: String,
    pub title_prefix: String,
    pub feedback_form_url: Option<String>,
}

impl From<&Config> for PublishSettings {
    fn from(config: &Config) -> Self {
        Self {
            space_key: config.confluence_space_key.clone(),
            parent_id: config.confluence_parent_page_id.clone(),
            status: config.page_status.clone(),
            title_prefix: config.page_title_prefix.clone(),
            feedback_form_url: config.feedback_form_url.clone(),
        }
    }
}

/// Fetches, generates and publishes release notes; every public operation reports a status string.
pub struct ReleaseNotesService {
    source: Arc<dyn IssueSource>,
    sink: Arc<dyn DocumentSink>,
    pipeline: GeneratorPipeline,
    catalog: ProjectCatalog,
    publish: PublishSettings,
    dumper: DebugDumper,
}

impl ReleaseNotesService {
    pub fn new(
        source: Arc<dyn IssueSource>,
        sink: Arc<dyn DocumentSink>,
        pipeline: GeneratorPipeline,
        catalog: ProjectCatalog,
        publish: PublishSettings,
    ) -> Self {
        Self {
            source,
            sink,
            pipeline,
            catalog,
            publish,
            dumper: DebugDumper::disabled(),
        }
    }

    pub fn with_dumper(mut self, dumper: DebugDumper) -> Self {
        self.dumper = dumper;
        self
    }

    pub fn from_config(config: &Config, pipeline_config: PipelineConfig) -> Result<Self> {
        let jira = JiraClient::new(&config.jira_url, &config.jira_email, &config.jira_token)?
            .with_retry_policy(RetryPolicy::from(&pipeline_config));
        let confluence = ConfluenceClient::new(
            &config.confluence_url,
            &config.confluence_email,
            &config.confluence_token,
        )?;
        let llm = ClaudeProvider::new(config.anthropic_api_key.clone(), config.llm_model.clone())?;
        let pipeline = GeneratorPipeline::new(
            Arc::new(llm),
            pipeline_config,
            config.project_priority.clone(),
        );

        Ok(Self::new(
            Arc::new(jira),
            Arc::new(confluence),
            pipeline,
            config.project_catalog.clone(),
            PublishSettings::from(config),
        )
        .with_dumper(DebugDumper::new(config.dump_folder.clone())))
    }

    pub async fn generate_single_project(&self, project: &str, fix_version: &str) -> String {
        tracing::info!(
            "Single-project generation requested for {} {}",
            project,
            fix_version
        );
        self.generate(GenerationMode::SingleProject, project, fix_version)
            .await
            .to_string()
    }

    pub async fn generate_multi_project(&self, project: &str, fix_version: &str) -> String {
        tracing::info!(
            "Multi-project generation requested for {} {}",
            project,
            fix_version
        );
        self.generate(GenerationMode::MultiProject, project, fix_version)
            .await
            .to_string()
    }

    pub async fn generate(
        &self,
        mode: GenerationMode,
        project: &str,
        fix_version: &str,
    ) -> GenerationOutcome {
        let project = project.trim().to_string();
        let fix_version = fix_version.trim().to_string();

        let document = match self.preview(mode, &project, &fix_version).await {
            Ok(document) => document,
            Err(failure) => {
                tracing::error!("Failed to generate release notes: {}", failure);
                return GenerationOutcome::Failed {
                    project,
                    fix_version,
                    failure,
                };
            }
        };

        if document.is_empty() {
            tracing::info!(
                "Nothing to report for {} {}; skipping publication",
                project,
                fix_version
            );
            return GenerationOutcome::NothingToReport {
                project,
                fix_version,
            };
        }

        match self.publish(&project, &fix_version, &document).await {
            Ok(receipt) => {
                tracing::info!(
                    "The generation of the release notes Document for the project {} with the release version {} is completed (page {})",
                    project,
                    fix_version,
                    receipt.id
                );
                GenerationOutcome::Published {
                    project,
                    fix_version,
                    receipt,
                }
            }
            Err(failure) => {
                tracing::error!("Failed to create Confluence page: {}", failure);
                GenerationOutcome::Failed {
                    project,
                    fix_version,
                    failure,
                }
            }
        }
    }

    /// Builds the document without publishing it.
    pub async fn preview(
        &self,
        mode: GenerationMode,
        project: &str,
        fix_version: &str,
    ) -> std::result::Result<ReleaseNotesDocument, Failure> {
        let filter = self.catalog.select_filter(project, fix_version)?;
        let issues = self.source.fetch_issues(project, &filter).await?;
        self.dumper
            .dump_json(&format!("{}_{}_issues.json", project, fix_version), &issues);

        let document = match mode {
            GenerationMode::SingleProject => self.pipeline.run(project, &issues, fix_version).await?,
            GenerationMode::MultiProject => {
                self.pipeline
                    .run_multiproject(project, &issues, fix_version)
                    .await?
            }
        };

        self.dumper.dump_text(
            &format!("{}_{}_release_notes.md", project, fix_version),
            document.as_str(),
        );
        tracing::info!(
            "Generated release notes for {} {}: {} issues ({} degraded)",
            project,
            fix_version,
            document.issue_count(),
            document.degraded_count()
        );
        Ok(document)
    }

    async fn publish(
        &self,
        project: &str,
        fix_version: &str,
        document: &ReleaseNotesDocument,
    ) -> std::result::Result<PageReceipt, Failure> {
        let request = PageRequest {
            space: self.publish.space_key.clone(),
            title: format!(
                "{} - {} - {}",
                self.publish.title_prefix, project, fix_version
            ),
            body_markdown: self.page_body(document),
            parent_id: self.publish.parent_id.clone(),
            status: self.publish.status.clone(),
        };

        self.sink
            .create_page(request)
            .await
            .map_err(|e| Failure::publish(e.to_string()))
    }

    fn page_body(&self, document: &ReleaseNotesDocument) -> String {
        match &self.publish.feedback_form_url {
            Some(url) => format!(
                "{}\n---\n\nQuestions or corrections? [Share your feedback]({})\n",
                document.as_str(),
                url
            ),
            None => document.as_str().to_string(),
        }
    }
}
