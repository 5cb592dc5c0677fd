use async_trait::async_trait;
use reqwest::{header, Client};
use std::time::Duration;

use crate::error::Result;
use crate::jira::paginator::Paginator;
use crate::jira::query::FilterExpression;
use crate::jira::IssueSource;
use crate::models::RawIssue;
use crate::retry::RetryPolicy;

const PAGE_SIZE: u32 = 100;

pub struct JiraClient {
    client: Client,
    base_url: String,
    email: String,
    token: String,
    retry: RetryPolicy,
}

impl JiraClient {
    pub fn new(base_url: &str, email: &str, token: &str) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static("relnotes/0.1"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            email: email.to_string(),
            token: token.to_string(),
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub async fn search(&self, jql: &str) -> Result<Vec<RawIssue>> {
        let url = format!("{}/rest/api/3/search", self.base_url);
        let paginator = Paginator::new(&self.client, url, &self.email, &self.token, &self.retry);
        paginator.fetch_all(jql, PAGE_SIZE).await
    }
}

#[async_trait]
impl IssueSource for JiraClient {
    async fn fetch_issues(
        &self,
        project: &str,
        filter: &FilterExpression,
    ) -> Result<Vec<RawIssue>> {
        tracing::info!("Fetching issues for {}: {}", project, filter);
        let issues = self.search(filter.jql()).await?;
        tracing::info!("Fetched {} issues for {}", issues.len(), project);
        Ok(issues)
    }
}
