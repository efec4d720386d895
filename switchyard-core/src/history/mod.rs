//! History compaction and the summarizer seam
//!
//! Conversation growth is bounded by an in-band protocol: a summarizer
//! (external to this crate) embeds a summary marker in the node stream, and
//! the compaction engine here recognizes the most recent marker, truncates
//! everything before it, and folds the marker into rendered prompt text.

pub mod compact;
pub mod render;
pub mod summarize;

pub use compact::compact_history;
pub use render::render_history_summary;
pub use summarize::{HistorySummarizer, NoopSummarizer, SummaryContext, SummaryOutcome};
