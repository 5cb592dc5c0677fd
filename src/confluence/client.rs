use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::confluence::storage::markdown_to_storage;
use crate::confluence::{DocumentSink, PageReceipt, PageRequest};
use crate::error::{Error, Result};

pub struct ConfluenceClient {
    client: Client,
    base_url: String,
    email: String,
    token: String,
}

#[derive(Serialize)]
struct CreateContent<'a> {
    #[serde(rename = "type")]
    content_type: &'static str,
    title: &'a str,
    status: &'a str,
    space: SpaceRef<'a>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    ancestors: Vec<AncestorRef<'a>>,
    body: ContentBody,
}

#[derive(Serialize)]
struct SpaceRef<'a> {
    key: &'a str,
}

#[derive(Serialize)]
struct AncestorRef<'a> {
    id: &'a str,
}

#[derive(Serialize)]
struct ContentBody {
    storage: StorageValue,
}

#[derive(Serialize)]
struct StorageValue {
    value: String,
    representation: &'static str,
}

#[derive(Deserialize)]
struct ContentResponse {
    id: String,
    title: String,
    #[serde(rename = "_links", default)]
    links: Option<ContentLinks>,
}

#[derive(Deserialize)]
struct ContentLinks {
    base: Option<String>,
    webui: Option<String>,
}

impl ConfluenceClient {
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
        })
    }
}

#[async_trait]
impl DocumentSink for ConfluenceClient {
    async fn create_page(&self, request: PageRequest) -> Result<PageReceipt> {
        let url = format!("{}/rest/api/content", self.base_url);
        let body = CreateContent {
            content_type: "page",
            title: &request.title,
            status: &request.status,
            space: SpaceRef {
                key: &request.space,
            },
            ancestors: request
                .parent_id
                .as_deref()
                .map(|id| vec![AncestorRef { id }])
                .unwrap_or_default(),
            body: ContentBody {
                storage: StorageValue {
                    value: markdown_to_storage(&request.body_markdown),
                    representation: "storage",
                },
            },
        };

        tracing::info!("Creating Confluence page '{}' in space {}", request.title, request.space);
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.email, Some(&self.token))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::ConfluenceApi(format!(
                "Failed to create page '{}': {} - {}",
                request.title, status, body
            )));
        }

        let created: ContentResponse = response.json().await?;
        let url = created.links.and_then(|links| match (links.base, links.webui) {
            (Some(base), Some(webui)) => Some(format!("{}{}", base, webui)),
            (None, Some(webui)) => Some(webui),
            _ => None,
        });

        Ok(PageReceipt {
            id: created.id,
            title: created.title,
            url,
        })
    }
}
