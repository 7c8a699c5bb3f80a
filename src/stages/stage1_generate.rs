use anyhow::Result;
use futures_util::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::llm::{CandidateGenerator, RetryConfig, WindowRequest, with_retry};
use crate::models::{ChapterCandidate, SegmentStore, WindowSet};

/// Configuration for Stage 1
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Advisory chapter limit passed to the generator
    pub max_chapters: usize,
    /// Windows in flight at once
    pub max_concurrency: usize,
    /// Backoff and timeout policy around each generator call
    pub retry: RetryConfig,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_chapters: 12,
            max_concurrency: 4,
            retry: RetryConfig::default(),
        }
    }
}

/// Result of Stage 1 processing
#[derive(Debug, Default)]
pub struct Stage1Result {
    /// One batch per successful window, in window order
    pub batches: Vec<Vec<ChapterCandidate>>,
    /// Number of windows sent to the generator
    pub windows_processed: usize,
    /// Windows whose call failed after retries
    pub windows_failed: usize,
    /// Windows that answered with no candidates
    pub windows_empty: usize,
}

impl Stage1Result {
    /// Every window failed, as opposed to some returning nothing
    pub fn all_failed(&self) -> bool {
        self.windows_processed > 0 && self.windows_failed == self.windows_processed
    }

    pub fn candidate_count(&self) -> usize {
        self.batches.iter().map(Vec::len).sum()
    }
}

/// Execute Stage 1: ask the generator for candidates in every window
///
/// Windows are independent, so up to `max_concurrency` calls run at once.
/// A failed window contributes no candidates; all results are collected
/// before returning so the merge stage sees the complete set.
pub async fn execute_stage1<G: CandidateGenerator>(
    generator: &G,
    store: &SegmentStore,
    windows: &WindowSet,
    config: &GenerationConfig,
) -> Stage1Result {
    let requests: Vec<(usize, WindowRequest)> = windows
        .iter()
        .enumerate()
        .map(|(i, w)| (i, WindowRequest::from_window(w, store, config.max_chapters)))
        .collect();
    let windows_processed = requests.len();

    info!(
        "Stage 1: Requesting chapters for {} windows ({} concurrent)",
        windows_processed, config.max_concurrency
    );

    let mut outcomes: Vec<(usize, String, Result<Vec<ChapterCandidate>>)> = stream::iter(requests)
        .map(|(index, request)| async move {
            let outcome = process_window(generator, &request, config).await;
            (index, request.window_id, outcome)
        })
        .buffer_unordered(config.max_concurrency.max(1))
        .collect()
        .await;

    outcomes.sort_by_key(|(index, _, _)| *index);

    let mut result = Stage1Result {
        windows_processed,
        ..Default::default()
    };

    for (_, window_id, outcome) in outcomes {
        match outcome {
            Ok(candidates) if candidates.is_empty() => {
                info!("Window {}: no candidates", window_id);
                result.windows_empty += 1;
            }
            Ok(candidates) => {
                info!("Window {}: {} candidates", window_id, candidates.len());
                result.batches.push(candidates);
            }
            Err(e) => {
                warn!("Window {} failed: {:#}", window_id, e);
                result.windows_failed += 1;
            }
        }
    }

    info!(
        "Stage 1: {} candidates from {} windows ({} failed, {} empty)",
        result.candidate_count(),
        windows_processed,
        result.windows_failed,
        result.windows_empty
    );

    result
}

/// Process a single window
async fn process_window<G: CandidateGenerator>(
    generator: &G,
    request: &WindowRequest,
    config: &GenerationConfig,
) -> Result<Vec<ChapterCandidate>> {
    with_retry(&config.retry, &request.window_id, || generator.propose(request)).await
}
