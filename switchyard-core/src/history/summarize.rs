//! History summarizer seam
//!
//! Producing summary markers (trigger heuristics, the summarization model
//! call, caching) belongs to the host; the gateway only invokes it
//! best-effort before a chat stream. The outcome type makes the
//! best-effort contract explicit: failures and skips are consumed by
//! logging, never by control flow.

use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::config::{Config, ProviderConfig};
use crate::protocol::request::ChatRequest;

/// What a summarization attempt did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryOutcome {
    /// The request's history was rewritten around a fresh summary.
    Applied,
    /// Nothing was done; the reason is recorded for logging.
    Skipped(String),
}

/// Everything a summarizer may need for one attempt. The request is
/// mutable: an applied summary rewrites its history in place before
/// translation.
pub struct SummaryContext<'a> {
    pub config: &'a Config,
    pub request: &'a mut ChatRequest,
    pub requested_model: &'a str,
    pub fallback_provider: &'a ProviderConfig,
    pub fallback_model: &'a str,
    pub timeout: Duration,
    pub cancel: CancellationToken,
}

#[async_trait]
pub trait HistorySummarizer: Send + Sync {
    async fn summarize_and_compact(
        &self,
        ctx: SummaryContext<'_>,
    ) -> anyhow::Result<SummaryOutcome>;
}

/// Default summarizer: never summarizes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSummarizer;

#[async_trait]
impl HistorySummarizer for NoopSummarizer {
    async fn summarize_and_compact(
        &self,
        _ctx: SummaryContext<'_>,
    ) -> anyhow::Result<SummaryOutcome> {
        Ok(SummaryOutcome::Skipped("summarizer disabled".to_string()))
    }
}
