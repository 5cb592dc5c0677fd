pub mod client;
pub mod storage;

use async_trait::async_trait;

use crate::error::Result;

pub use client::ConfluenceClient;
pub use storage::markdown_to_storage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub space: String,
    pub title: String,
    pub body_markdown: String,
    pub parent_id: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageReceipt {
    pub id: String,
    pub title: String,
    pub url: Option<String>,
}

/// Where finished documents are published.
#[async_trait]
pub trait DocumentSink: Send + Sync {
    async fn create_page(&self, request: PageRequest) -> Result<PageReceipt>;
}
