use crate::error::{Error, Result};
use crate::generator::ProjectPriority;
use crate::jira::ProjectCatalog;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub jira_url: String,
    pub jira_issue_base_url: Option<String>,
    pub jira_email: String,
    pub jira_token: String,
    pub confluence_url: String,
    pub confluence_email: String,
    pub confluence_token: String,
    pub confluence_space_key: String,
    pub confluence_parent_page_id: Option<String>,
    pub page_status: String,
    pub page_title_prefix: String,
    pub anthropic_api_key: String,
    pub llm_model: Option<String>,
    pub dump_folder: Option<PathBuf>,
    pub feedback_form_url: Option<String>,
    pub concurrency_limit: usize,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub generation_timeout_secs: Option<u64>,
    pub project_catalog: ProjectCatalog,
    pub project_priority: ProjectPriority,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from any variable source; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| Error::Config(format!("{} environment variable not set", name)))
        };
        let optional = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let project_catalog = match optional("PROJECT_FAMILIES") {
            Some(families) => ProjectCatalog::parse(&families)?,
            None => ProjectCatalog::default(),
        };

        let project_priority = optional("PROJECT_PRIORITY")
            .map(|v| ProjectPriority::new(v.split(',')))
            .unwrap_or_default();

        Ok(Self {
            jira_url: required("JIRA_URL")?,
            jira_issue_base_url: optional("JIRA_ISSUE_BASE_URL"),
            jira_email: required("JIRA_EMAIL")?,
            jira_token: required("JIRA_TOKEN")?,
            confluence_url: required("CONFLUENCE_URL")?,
            confluence_email: required("CONFLUENCE_EMAIL")?,
            confluence_token: required("CONFLUENCE_TOKEN")?,
            confluence_space_key: optional("CONFLUENCE_SPACE_KEY")
                .unwrap_or_else(|| "ARN".to_string()),
            confluence_parent_page_id: optional("CONFLUENCE_PARENT_PAGE_ID"),
            page_status: optional("PAGE_STATUS").unwrap_or_else(|| "draft".to_string()),
            page_title_prefix: optional("PAGE_TITLE_PREFIX")
                .unwrap_or_else(|| "Release Notes".to_string()),
            anthropic_api_key: required("ANTHROPIC_API_KEY")?,
            llm_model: optional("LLM_MODEL"),
            dump_folder: optional("DUMP_FOLDER").map(PathBuf::from),
            feedback_form_url: optional("FEEDBACK_FORM_URL"),
            concurrency_limit: optional("CONCURRENCY_LIMIT")
                .and_then(|v| v.parse::<usize>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(5),
            max_retries: optional("LLM_MAX_RETRIES")
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),
            retry_delay_ms: optional("LLM_RETRY_DELAY_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(500),
            generation_timeout_secs: optional("GENERATION_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok()),
            project_catalog,
            project_priority,
        })
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub concurrency_limit: usize,
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub deadline: Option<Duration>,
    pub issue_base_url: Option<String>,
    pub show_progress: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: 5,
            max_retries: 3,
            retry_delay: Duration::from_millis(500),
            deadline: None,
            issue_base_url: None,
            show_progress: false,
        }
    }
}

impl From<&Config> for PipelineConfig {
    fn from(config: &Config) -> Self {
        Self {
            concurrency_limit: config.concurrency_limit,
            max_retries: config.max_retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            deadline: config.generation_timeout_secs.map(Duration::from_secs),
            issue_base_url: config.jira_issue_base_url.clone(),
            show_progress: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_vars() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("JIRA_URL", "https://example.atlassian.net"),
            ("JIRA_EMAIL", "bot@example.com"),
            ("JIRA_TOKEN", "jira-token"),
            ("CONFLUENCE_URL", "https://example.atlassian.net/wiki"),
            ("CONFLUENCE_EMAIL", "bot@example.com"),
            ("CONFLUENCE_TOKEN", "confluence-token"),
            ("ANTHROPIC_API_KEY", "sk-test"),
        ])
    }

    fn load(vars: &HashMap<&'static str, &'static str>) -> Result<Config> {
        Config::from_lookup(|name| vars.get(name).map(|v| v.to_string()))
    }

    #[test]
    fn test_defaults() {
        let config = load(&base_vars()).unwrap();
        assert_eq!(config.confluence_space_key, "ARN");
        assert_eq!(config.page_status, "draft");
        assert_eq!(config.concurrency_limit, 5);
        assert_eq!(config.max_retries, 3);
        assert!(config.dump_folder.is_none());
        assert_eq!(config.project_priority.rank("CUU2"), 2);
        assert!(config.project_catalog.family("communicator").is_some());
    }

    #[test]
    fn test_missing_credentials() {
        let mut vars = base_vars();
        vars.remove("JIRA_TOKEN");
        let err = load(&vars).unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("JIRA_TOKEN")));

        let mut vars = base_vars();
        vars.insert("ANTHROPIC_API_KEY", "   ");
        assert!(load(&vars).is_err());
    }

    #[test]
    fn test_overrides() {
        let mut vars = base_vars();
        vars.insert("CONCURRENCY_LIMIT", "0");
        vars.insert("LLM_MAX_RETRIES", "5");
        vars.insert("GENERATION_TIMEOUT_SECS", "90");
        vars.insert("PROJECT_FAMILIES", "Portal=PORT|PADM");
        vars.insert("PROJECT_PRIORITY", "PADM,PORT");
        let config = load(&vars).unwrap();

        assert_eq!(config.concurrency_limit, 5);
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.project_priority.rank("PORT"), 1);
        assert!(config.project_catalog.family("Communicator").is_none());

        let pipeline = PipelineConfig::from(&config);
        assert_eq!(pipeline.deadline, Some(Duration::from_secs(90)));
    }
}
