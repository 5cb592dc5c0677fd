pub mod provider;
pub mod claude;
pub mod prompts;
pub mod parser;
pub mod summarizer;

pub use provider::LLMProvider;
pub use claude::ClaudeProvider;
pub use summarizer::{fallback_summary, Summarizer, SummaryLedger};
