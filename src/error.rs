use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Rate limit exceeded{}", retry_hint(.0))]
    RateLimited(Option<u64>),

    #[error("Request timed out")]
    Timeout,

    #[error("Provider unavailable (HTTP {0})")]
    ProviderUnavailable(u16),

    #[error("LLM API error: {0}")]
    LLMApi(String),

    #[error("Malformed model output: {0}")]
    MalformedOutput(String),

    #[error("Jira API error: {0}")]
    JiraApi(String),

    #[error("Confluence API error: {0}")]
    ConfluenceApi(String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

fn retry_hint(retry_after: &Option<u64>) -> String {
    match retry_after {
        Some(secs) => format!(", retry after {} seconds", secs),
        None => String::new(),
    }
}

impl Error {
    /// Errors worth another attempt against the same provider.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::RateLimited(_) | Error::Timeout | Error::ProviderUnavailable(_) => true,
            Error::Network(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }

    pub fn is_malformed_output(&self) -> bool {
        matches!(self, Error::MalformedOutput(_))
    }

    pub fn retry_after(&self) -> Option<u64> {
        match self {
            Error::RateLimited(secs) => *secs,
            _ => None,
        }
    }
}
