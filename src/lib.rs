pub mod config;
pub mod confluence;
pub mod dump;
pub mod error;
pub mod generator;
pub mod jira;
pub mod llm;
pub mod logging;
pub mod models;
pub mod retry;
pub mod service;

pub use config::{Config, PipelineConfig};
pub use confluence::{ConfluenceClient, DocumentSink};
pub use error::{Error, Result};
pub use generator::{Failure, FailureKind, GeneratorPipeline, ProjectPriority};
pub use jira::{IssueSource, JiraClient, ProjectCatalog};
pub use llm::{ClaudeProvider, LLMProvider};
pub use retry::RetryPolicy;
pub use service::{GenerationMode, GenerationOutcome, ReleaseNotesService};
