use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::{Mutex, Semaphore};
use tokio::time::Instant;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::llm::parser::parse_summary;
use crate::llm::prompts::{issue_prompt, SYSTEM_PROMPT};
use crate::llm::provider::LLMProvider;
use crate::models::{ExtractedIssue, IssueSummary};
use crate::retry::RetryPolicy;

/// Keys already handed to the model during one run.
#[derive(Debug, Default)]
pub struct SummaryLedger {
    claimed: Mutex<HashSet<String>>,
}

impl SummaryLedger {
    /// Returns true for the first caller only.
    pub async fn claim(&self, key: &str) -> bool {
        self.claimed.lock().await.insert(key.to_string())
    }
}

pub struct Summarizer {
    llm: Arc<dyn LLMProvider>,
    policy: RetryPolicy,
    concurrency_limit: usize,
    show_progress: bool,
}

impl Summarizer {
    pub fn new(llm: Arc<dyn LLMProvider>, config: &PipelineConfig) -> Self {
        Self {
            llm,
            policy: RetryPolicy::from(config),
            concurrency_limit: config.concurrency_limit.max(1),
            show_progress: config.show_progress,
        }
    }

    /// Always yields a summary: model failures degrade to the issue title.
    pub async fn summarize(&self, issue: &ExtractedIssue) -> IssueSummary {
        match self.request_summary(issue).await {
            Ok(text) => build_summary(issue, text, false),
            Err(e) => {
                tracing::warn!(
                    "Summarization of {} failed via {}, using fallback: {}",
                    issue.key,
                    self.llm.name(),
                    e
                );
                fallback_summary(issue)
            }
        }
    }

    /// Summarizes every unique key once, with bounded concurrency.
    ///
    /// The result keeps the input order of first occurrences. Calls still
    /// running at `deadline` are cancelled and replaced by the fallback.
    pub async fn summarize_all(
        &self,
        issues: &[ExtractedIssue],
        deadline: Option<Instant>,
    ) -> Vec<IssueSummary> {
        let ledger = SummaryLedger::default();
        let semaphore = Semaphore::new(self.concurrency_limit);
        let pb = self.progress_bar(issues.len());

        let tasks = issues.iter().map(|issue| {
            let ledger = &ledger;
            let semaphore = &semaphore;
            let pb = &pb;
            async move {
                if !ledger.claim(&issue.key).await {
                    tracing::debug!("Skipping duplicate issue {}", issue.key);
                    pb.inc(1);
                    return None;
                }

                let work = async {
                    let _permit = semaphore.acquire().await;
                    self.summarize(issue).await
                };
                let summary = match deadline {
                    Some(deadline) => match tokio::time::timeout_at(deadline, work).await {
                        Ok(summary) => summary,
                        Err(_) => {
                            tracing::warn!(
                                "Summarization of {} cancelled by deadline, using fallback",
                                issue.key
                            );
                            fallback_summary(issue)
                        }
                    },
                    None => work.await,
                };

                pb.inc(1);
                Some(summary)
            }
        });

        let summaries: Vec<IssueSummary> = join_all(tasks).await.into_iter().flatten().collect();
        pb.finish_with_message("Summarization complete");

        let degraded = summaries.iter().filter(|s| s.degraded).count();
        tracing::info!(
            "Summarized {} unique issues ({} degraded)",
            summaries.len(),
            degraded
        );
        summaries
    }

    async fn request_summary(&self, issue: &ExtractedIssue) -> Result<String> {
        let prompt = issue_prompt(issue);
        let mut backoff = self.policy.backoff();
        let mut transient_failures = 0;
        let mut malformed_failures = 0;

        loop {
            let err = match self
                .llm
                .complete(SYSTEM_PROMPT, &prompt)
                .await
                .and_then(|raw| parse_summary(&raw))
            {
                Ok(text) => return Ok(text),
                Err(e) => e,
            };

            let retry = if err.is_malformed_output() {
                malformed_failures += 1;
                malformed_failures <= self.policy.malformed_retries
            } else if err.is_transient() {
                transient_failures += 1;
                transient_failures <= self.policy.max_retries
            } else {
                false
            };
            if !retry {
                return Err(err);
            }

            let delay = self.policy.next_delay(&mut backoff, &err);
            tracing::warn!(
                "Attempt {} for {} failed ({}), retrying in {:?}",
                transient_failures + malformed_failures,
                issue.key,
                err,
                delay
            );
            tokio::time::sleep(delay).await;
        }
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} issues")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    }
}

fn build_summary(issue: &ExtractedIssue, text: String, degraded: bool) -> IssueSummary {
    IssueSummary {
        key: issue.key.clone(),
        project: issue.project.clone(),
        issue_type: issue.issue_type.clone(),
        fix_version: issue.fix_version.clone(),
        bullet_text: text,
        degraded,
    }
}

/// Deterministic stand-in built from the issue itself.
pub fn fallback_summary(issue: &ExtractedIssue) -> IssueSummary {
    let title = issue.title.split_whitespace().collect::<Vec<_>>().join(" ");
    let text = if title.is_empty() {
        format!("{} {}", issue.issue_type, issue.key)
    } else {
        title
    };
    build_summary(issue, text, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Replays scripted replies, then repeats the last one.
    struct ScriptedProvider {
        replies: std::sync::Mutex<VecDeque<Result<String>>>,
        calls: AtomicUsize,
        delay: Duration,
    }

    impl ScriptedProvider {
        fn new(replies: Vec<Result<String>>) -> Self {
            Self {
                replies: std::sync::Mutex::new(replies.into()),
                calls: AtomicUsize::new(0),
                delay: Duration::ZERO,
            }
        }
    }

    #[async_trait]
    impl LLMProvider for ScriptedProvider {
        async fn complete(&self, _system: &str, prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            let mut replies = self.replies.lock().unwrap();
            let reply = if replies.len() > 1 {
                replies.pop_front()
            } else {
                replies.front().map(|r| match r {
                    Ok(text) => Ok(text.clone()),
                    Err(_) => Err(Error::Timeout),
                })
            };
            reply.unwrap_or_else(|| Ok(format!("Summary for {}", prompt.len())))
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn instant_config() -> PipelineConfig {
        PipelineConfig {
            retry_delay: Duration::ZERO,
            ..PipelineConfig::default()
        }
    }

    fn issue(key: &str, title: &str) -> ExtractedIssue {
        ExtractedIssue {
            key: key.to_string(),
            project: "BAMA".to_string(),
            title: title.to_string(),
            issue_type: "Bug".to_string(),
            fix_version: None,
            raw_text: String::new(),
        }
    }

    #[tokio::test]
    async fn test_transient_errors_are_retried() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Err(Error::RateLimited(None)),
            Err(Error::ProviderUnavailable(503)),
            Ok("Calls no longer drop on transfer.".to_string()),
        ]));
        let summarizer = Summarizer::new(provider.clone(), &instant_config());

        let summary = summarizer.summarize(&issue("BAMA-1", "Dropped calls")).await;
        assert_eq!(summary.bullet_text, "Calls no longer drop on transfer.");
        assert!(!summary.degraded);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausted_retries_fall_back_to_title() {
        let provider = Arc::new(ScriptedProvider::new(vec![Err(Error::Timeout)]));
        let summarizer = Summarizer::new(provider.clone(), &instant_config());

        let summary = summarizer
            .summarize(&issue("BAMA-2", "  Dropped   calls "))
            .await;
        assert!(summary.degraded);
        assert_eq!(summary.bullet_text, "Dropped calls");
        // first attempt + max_retries
        assert_eq!(provider.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_malformed_output_is_retried_once() {
        let provider = Arc::new(ScriptedProvider::new(vec![Ok("   ".to_string())]));
        let summarizer = Summarizer::new(provider.clone(), &instant_config());

        let summary = summarizer.summarize(&issue("BAMA-3", "")).await;
        assert!(summary.degraded);
        assert_eq!(summary.bullet_text, "Bug BAMA-3");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_permanent_errors_fall_back_immediately() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Err(Error::LLMApi("401".to_string())),
            Ok("unused".to_string()),
        ]));
        let summarizer = Summarizer::new(provider.clone(), &instant_config());

        let summary = summarizer.summarize(&issue("BAMA-4", "Login")).await;
        assert!(summary.degraded);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_summarize_all_dedups_and_keeps_order() {
        let provider = Arc::new(ScriptedProvider::new(vec![Ok("Done.".to_string())]));
        let summarizer = Summarizer::new(provider.clone(), &instant_config());
        let issues = vec![
            issue("BAMA-2", "b"),
            issue("BAMA-1", "a"),
            issue("BAMA-2", "b again"),
        ];

        let summaries = summarizer.summarize_all(&issues, None).await;
        let keys: Vec<_> = summaries.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["BAMA-2", "BAMA-1"]);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_deadline_degrades_instead_of_dropping() {
        let mut provider = ScriptedProvider::new(vec![Ok("Too late.".to_string())]);
        provider.delay = Duration::from_secs(5);
        let summarizer = Summarizer::new(Arc::new(provider), &instant_config());
        let issues = vec![issue("BAMA-9", "Slow issue")];

        let deadline = Instant::now() + Duration::from_millis(20);
        let summaries = summarizer.summarize_all(&issues, Some(deadline)).await;
        assert_eq!(summaries.len(), 1);
        assert!(summaries[0].degraded);
        assert_eq!(summaries[0].bullet_text, "Slow issue");
    }

    #[tokio::test]
    async fn test_ledger_claims_once() {
        let ledger = SummaryLedger::default();
        assert!(ledger.claim("X-1").await);
        assert!(!ledger.claim("X-1").await);
        assert!(ledger.claim("X-2").await);
        assert!(!ledger.claim("X-2").await);
    }
}
