use tracing::{info, warn};

use crate::error::{ChapterError, Result};
use crate::llm::CandidateGenerator;
use crate::models::{Chapter, ChapterCandidate, SegmentStore, TranscriptSegment, WindowConfig};
use crate::stages::{
    GenerationConfig, MergeConfig, align_chapters, build_windows, drop_empty_chapters,
    enforce_coverage, execute_stage1, merge_candidates,
};

/// Configuration for a full chapter generation run
#[derive(Debug, Clone, Default)]
pub struct ChapterConfig {
    pub window: WindowConfig,
    pub merge: MergeConfig,
    pub generation: GenerationConfig,
}

/// Counters describing how a run went
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChapterReport {
    pub windows_total: usize,
    pub windows_failed: usize,
    pub windows_empty: usize,
    pub candidates_received: usize,
    pub candidates_discarded: usize,
    pub candidates_merged: usize,
    pub gaps_closed: usize,
    pub overlaps_resolved: usize,
    pub empty_chapters_dropped: usize,
}

/// Final chapters plus the report for the run that produced them
#[derive(Debug, Clone)]
pub struct ChapterOutcome {
    pub chapters: Vec<Chapter>,
    pub report: ChapterReport,
}

/// Generate a contiguous chapter list for a transcript
///
/// Windows the transcript, asks `generator` for candidates per window, then
/// merges, aligns and repairs them into a partition of
/// `[segments[0].start, segments[last].end]`.
///
/// Fails on empty or malformed segments, an invalid window configuration,
/// when every window fails, or when no usable candidate comes back at all.
pub async fn generate_chapters<G: CandidateGenerator>(
    generator: &G,
    segments: Vec<TranscriptSegment>,
    config: &ChapterConfig,
) -> Result<ChapterOutcome> {
    let store = SegmentStore::new(segments)?;
    let windows = build_windows(&store, &config.window)?;

    info!(
        "Generating chapters for {} segments ({:.1}s) across {} windows",
        store.len(),
        store.duration(),
        windows.total_windows()
    );

    let stage1 = execute_stage1(generator, &store, &windows, &config.generation).await;
    if stage1.all_failed() {
        return Err(ChapterError::AllWindowsFailed {
            windows: stage1.windows_processed,
        });
    }

    let mut outcome = reconcile_candidates(&stage1.batches, &store, &config.merge)?;
    outcome.report.windows_total = stage1.windows_processed;
    outcome.report.windows_failed = stage1.windows_failed;
    outcome.report.windows_empty = stage1.windows_empty;

    let max_chapters = config.generation.max_chapters;
    if outcome.chapters.len() > max_chapters {
        warn!(
            "Produced {} chapters, above the advisory limit of {}",
            outcome.chapters.len(),
            max_chapters
        );
    }

    info!(
        "Generated {} chapters ({} candidates, {} discarded, {} windows failed)",
        outcome.chapters.len(),
        outcome.report.candidates_received,
        outcome.report.candidates_discarded,
        outcome.report.windows_failed
    );

    Ok(outcome)
}

/// Turn raw candidate batches into final chapters (merge, align, coverage)
///
/// Returns `NoChapters` when no candidate survives validation, so an empty
/// list is never reported as success.
pub fn reconcile_candidates(
    batches: &[Vec<ChapterCandidate>],
    store: &SegmentStore,
    merge_config: &MergeConfig,
) -> Result<ChapterOutcome> {
    let merged = merge_candidates(batches, merge_config);
    if merged.chapters.is_empty() {
        return Err(ChapterError::NoChapters {
            windows: batches.len(),
        });
    }

    let aligned = align_chapters(&merged.chapters, store);
    let coverage = enforce_coverage(&aligned, store);

    let before = coverage.chapters.len();
    let chapters = drop_empty_chapters(coverage.chapters);
    let empty_chapters_dropped = before - chapters.len();

    Ok(ChapterOutcome {
        chapters,
        report: ChapterReport {
            candidates_received: merged.candidates_received,
            candidates_discarded: merged.candidates_discarded,
            candidates_merged: merged.candidates_merged,
            gaps_closed: coverage.gaps_closed,
            overlaps_resolved: coverage.overlaps_resolved,
            empty_chapters_dropped,
            ..Default::default()
        },
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use anyhow::anyhow;

    use super::*;
    use crate::llm::WindowRequest;

    /// Replies from a fixed table keyed by window id; unknown windows fail
    struct ScriptedGenerator {
        replies: HashMap<String, Vec<ChapterCandidate>>,
    }

    impl ScriptedGenerator {
        fn new(replies: Vec<(&str, Vec<ChapterCandidate>)>) -> Self {
            Self {
                replies: replies
                    .into_iter()
                    .map(|(id, c)| (id.to_string(), c))
                    .collect(),
            }
        }
    }

    impl CandidateGenerator for ScriptedGenerator {
        async fn propose(&self, request: &WindowRequest) -> anyhow::Result<Vec<ChapterCandidate>> {
            self.replies
                .get(&request.window_id)
                .cloned()
                .ok_or_else(|| anyhow!("invalid reply for {}", request.window_id))
        }
    }

    /// Twelve 10s segments spanning 0-120s
    fn segments() -> Vec<TranscriptSegment> {
        (0..12)
            .map(|i| {
                TranscriptSegment::new(i, i as f64 * 10.0, (i + 1) as f64 * 10.0, format!("line {}", i))
            })
            .collect()
    }

    fn config() -> ChapterConfig {
        ChapterConfig {
            window: WindowConfig {
                window_size: 6,
                overlap: 2,
            },
            ..Default::default()
        }
    }

    fn assert_partition(chapters: &[Chapter], segments: &[TranscriptSegment]) {
        assert_eq!(chapters[0].start_time, segments[0].start);
        assert_eq!(chapters[chapters.len() - 1].end_time, segments[segments.len() - 1].end);
        for pair in chapters.windows(2) {
            assert_eq!(pair[0].end_time, pair[1].start_time);
            assert!(pair[0].start_time < pair[1].start_time);
        }
        for chapter in chapters {
            assert!(chapter.start_time < chapter.end_time);
        }
    }

    #[tokio::test]
    async fn test_overlapping_windows_reconcile_into_partition() {
        let generator = ScriptedGenerator::new(vec![
            (
                "w_0",
                vec![
                    ChapterCandidate::new("Intro", 1.0, Some(28.0)),
                    ChapterCandidate::new("Setup", 31.0, Some(55.0)),
                ],
            ),
            (
                "w_1",
                vec![
                    ChapterCandidate::new("Project setup", 36.0, Some(62.0)),
                    ChapterCandidate::new("Core ideas", 64.0, None),
                ],
            ),
            ("w_2", vec![ChapterCandidate::new("Wrap-up", 96.0, Some(118.0))]),
        ]);

        let outcome = generate_chapters(&generator, segments(), &config()).await.unwrap();
        let chapters = &outcome.chapters;

        assert_partition(chapters, &segments());
        let names: Vec<&str> = chapters.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Intro", "Project setup", "Core ideas", "Wrap-up"]);
        assert_eq!(
            chapters.iter().map(|c| (c.start_time, c.end_time)).collect::<Vec<_>>(),
            vec![(0.0, 30.0), (30.0, 60.0), (60.0, 110.0), (110.0, 120.0)]
        );
        assert_eq!(outcome.report.windows_total, 3);
        assert_eq!(outcome.report.candidates_merged, 1);
    }

    #[tokio::test]
    async fn test_inner_boundaries_are_segment_starts() {
        let generator = ScriptedGenerator::new(vec![
            ("w_0", vec![ChapterCandidate::new("A", 3.3, Some(47.1))]),
            ("w_1", vec![ChapterCandidate::new("B", 52.9, Some(77.7))]),
            ("w_2", vec![ChapterCandidate::new("C", 81.4, Some(200.0))]),
        ]);
        let outcome = generate_chapters(&generator, segments(), &config()).await.unwrap();

        let starts: Vec<f64> = segments().iter().map(|s| s.start).collect();
        for pair in outcome.chapters.windows(2) {
            assert!(starts.contains(&pair[0].end_time));
        }
        assert_partition(&outcome.chapters, &segments());
    }

    #[tokio::test]
    async fn test_one_failed_window_still_succeeds() {
        let generator = ScriptedGenerator::new(vec![
            ("w_0", vec![ChapterCandidate::new("Opening", 0.0, Some(40.0))]),
            ("w_2", vec![ChapterCandidate::new("Closing", 90.0, None)]),
        ]);
        let outcome = generate_chapters(&generator, segments(), &config()).await.unwrap();

        assert_eq!(outcome.report.windows_failed, 1);
        assert_eq!(outcome.chapters.len(), 2);
        assert_partition(&outcome.chapters, &segments());
    }

    #[tokio::test]
    async fn test_zero_candidates_everywhere_is_an_error() {
        let generator = ScriptedGenerator::new(vec![("w_0", vec![]), ("w_1", vec![]), ("w_2", vec![])]);
        let result = generate_chapters(&generator, segments(), &config()).await;

        assert!(matches!(result, Err(ChapterError::NoChapters { .. })));
    }

    #[tokio::test]
    async fn test_only_malformed_candidates_is_an_error() {
        let generator = ScriptedGenerator::new(vec![
            ("w_0", vec![ChapterCandidate::default()]),
            ("w_1", vec![]),
            ("w_2", vec![ChapterCandidate::new("", 12.0, None)]),
        ]);
        let result = generate_chapters(&generator, segments(), &config()).await;

        assert!(matches!(result, Err(ChapterError::NoChapters { .. })));
    }

    #[tokio::test]
    async fn test_all_windows_failing_is_an_error() {
        let generator = ScriptedGenerator::new(vec![]);
        let result = generate_chapters(&generator, segments(), &config()).await;

        assert!(matches!(
            result,
            Err(ChapterError::AllWindowsFailed { windows: 3 })
        ));
    }

    #[tokio::test]
    async fn test_empty_segments_rejected_before_windowing() {
        let generator = ScriptedGenerator::new(vec![]);
        let result = generate_chapters(&generator, vec![], &config()).await;

        assert!(matches!(result, Err(ChapterError::EmptySegments)));
    }

    #[tokio::test]
    async fn test_invalid_window_config_rejected() {
        let generator = ScriptedGenerator::new(vec![]);
        let mut config = config();
        config.window.overlap = 6;
        let result = generate_chapters(&generator, segments(), &config).await;

        assert!(matches!(result, Err(ChapterError::InvalidWindowConfig(_))));
    }

    #[test]
    fn test_contained_proposal_is_dropped() {
        let store = SegmentStore::new(segments()).unwrap();
        let batches = vec![vec![
            ChapterCandidate::new("Long", 0.0, Some(80.0)),
            ChapterCandidate::new("Inner", 30.0, Some(50.0)),
            ChapterCandidate::new("Tail", 80.0, Some(120.0)),
        ]];
        let outcome = reconcile_candidates(&batches, &store, &MergeConfig::default()).unwrap();

        let names: Vec<&str> = outcome.chapters.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Long", "Tail"]);
        assert_eq!(outcome.report.empty_chapters_dropped, 1);
        assert_partition(&outcome.chapters, store.segments());
    }

    #[test]
    fn test_single_segment_transcript() {
        let store = SegmentStore::new(vec![TranscriptSegment::new(0, 2.0, 9.0, "hi")]).unwrap();
        let batches = vec![vec![ChapterCandidate::new("Hello", 4.0, None)]];
        let outcome = reconcile_candidates(&batches, &store, &MergeConfig::default()).unwrap();

        assert_eq!(outcome.chapters, vec![Chapter::new("Hello", 2.0, 9.0)]);
    }
}
