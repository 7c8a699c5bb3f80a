use std::future::Future;

use anyhow::Result;
use reqwest::StatusCode;
use thiserror::Error;

use crate::models::{ChapterCandidate, SegmentStore, Window};

/// Everything a generator needs to propose chapters for one window
#[derive(Debug, Clone)]
pub struct WindowRequest {
    pub window_id: String,
    /// Segment lines rendered as `[start-end] text`
    pub transcript_text: String,
    pub start_time: f64,
    pub end_time: f64,
    /// Advisory upper bound passed through to the generator
    pub max_chapters: usize,
}

impl WindowRequest {
    pub fn from_window(window: &Window, store: &SegmentStore, max_chapters: usize) -> Self {
        Self {
            window_id: window.window_id.clone(),
            transcript_text: store.render_window_text(window.range()),
            start_time: window.start_time,
            end_time: window.end_time,
            max_chapters,
        }
    }
}

/// Source of raw chapter proposals for a single window.
///
/// Implementations are free to be wrong: the pipeline filters, merges, aligns
/// and repairs whatever comes back.
pub trait CandidateGenerator: Send + Sync {
    fn propose(
        &self,
        request: &WindowRequest,
    ) -> impl Future<Output = Result<Vec<ChapterCandidate>>> + Send;
}

/// Outbound failures that carry enough structure to decide on a retry
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("API returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("request timeout after {secs}s")]
    Timeout { secs: u64 },
}

impl GeneratorError {
    /// Rate limits, server errors and timeouts; everything else is permanent
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Status { status, .. } => is_transient_status(*status),
            Self::Timeout { .. } => true,
        }
    }
}

/// 429 and any 5xx (including Anthropic's 529 overloaded)
pub fn is_transient_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}
