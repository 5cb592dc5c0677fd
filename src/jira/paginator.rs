use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::RawIssue;
use crate::retry::RetryPolicy;

pub const SEARCH_FIELDS: [&str; 5] = ["summary", "description", "issuetype", "project", "fixVersions"];

#[derive(Serialize)]
struct SearchRequest<'a> {
    jql: &'a str,
    #[serde(rename = "startAt")]
    start_at: u32,
    #[serde(rename = "maxResults")]
    max_results: u32,
    fields: &'a [&'a str],
}

#[derive(Deserialize)]
struct SearchPage {
    #[serde(default)]
    total: u32,
    #[serde(default)]
    issues: Vec<RawIssue>,
}

/// Walks a Jira search result with `startAt` offsets until every issue is collected.
pub struct Paginator<'a> {
    client: &'a Client,
    search_url: String,
    email: &'a str,
    token: &'a str,
    policy: &'a RetryPolicy,
}

impl<'a> Paginator<'a> {
    pub fn new(
        client: &'a Client,
        search_url: String,
        email: &'a str,
        token: &'a str,
        policy: &'a RetryPolicy,
    ) -> Self {
        Self {
            client,
            search_url,
            email,
            token,
            policy,
        }
    }

    pub async fn fetch_all(&self, jql: &str, per_page: u32) -> Result<Vec<RawIssue>> {
        let mut all_issues = Vec::new();
        let mut start_at = 0;

        loop {
            let page = self.fetch_page_with_retry(jql, start_at, per_page).await?;
            let page_len = page.issues.len() as u32;
            all_issues.extend(page.issues);

            start_at += page_len;
            if page_len == 0 || start_at >= page.total {
                break;
            }
        }

        Ok(all_issues)
    }

    async fn fetch_page_with_retry(
        &self,
        jql: &str,
        start_at: u32,
        per_page: u32,
    ) -> Result<SearchPage> {
        let mut backoff = self.policy.backoff();
        let mut failures = 0;

        loop {
            let err = match self.fetch_page(jql, start_at, per_page).await {
                Ok(page) => return Ok(page),
                Err(e) => e,
            };

            failures += 1;
            if !err.is_transient() || failures > self.policy.max_retries {
                return Err(err);
            }

            let delay = self.policy.next_delay(&mut backoff, &err);
            tracing::warn!(
                "Jira search page at startAt={} failed ({}), retry {} in {:?}",
                start_at,
                err,
                failures,
                delay
            );
            tokio::time::sleep(delay).await;
        }
    }

    async fn fetch_page(&self, jql: &str, start_at: u32, per_page: u32) -> Result<SearchPage> {
        let request = SearchRequest {
            jql,
            start_at,
            max_results: per_page,
            fields: &SEARCH_FIELDS,
        };

        tracing::debug!("Searching {} (startAt={})", self.search_url, start_at);
        let response = self
            .client
            .post(&self.search_url)
            .basic_auth(self.email, Some(self.token))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(Error::RateLimited(retry_after));
        }
        if status.is_server_error() {
            return Err(Error::ProviderUnavailable(status.as_u16()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::JiraApi(format!(
                "Search failed: {} - {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::ParseError(format!("Invalid Jira search page: {}", e)))
    }
}
