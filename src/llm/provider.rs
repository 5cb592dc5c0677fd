use async_trait::async_trait;
use crate::error::Result;

#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Sends one prompt and returns the raw text of the model's reply.
    async fn complete(&self, system: &str, prompt: &str) -> Result<String>;
    fn name(&self) -> &str;
}
