use tracing::{debug, info};

use crate::models::{Chapter, ChapterCandidate};

/// Configuration for Stage 2 merging
#[derive(Debug, Clone)]
pub struct MergeConfig {
    /// Candidates whose starts are closer than this (seconds) collapse into one chapter
    pub merge_threshold_seconds: f64,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            merge_threshold_seconds: 10.0,
        }
    }
}

/// Result of Stage 2 merging
#[derive(Debug, Clone, Default)]
pub struct MergeResult {
    /// Merged chapters ordered by start time (unaligned, not yet gap-free)
    pub chapters: Vec<Chapter>,
    /// Number of candidates across all batches
    pub candidates_received: usize,
    /// Candidates dropped for a missing name or start
    pub candidates_discarded: usize,
    /// Candidates folded into an earlier chapter
    pub candidates_merged: usize,
}

/// Execute Stage 2: merge candidate batches from every window
///
/// 1. Flattens all batches and drops candidates without a name or start
/// 2. Stable-sorts by start time
/// 3. Folds each candidate into the last accepted chapter when their starts
///    are within the threshold, keeping the longer name and the later end
pub fn merge_candidates(batches: &[Vec<ChapterCandidate>], config: &MergeConfig) -> MergeResult {
    let candidates_received: usize = batches.iter().map(Vec::len).sum();

    let mut valid: Vec<(f64, &ChapterCandidate)> = batches
        .iter()
        .flatten()
        .filter_map(|c| c.valid_start().map(|start| (start, c)))
        .collect();
    let candidates_discarded = candidates_received - valid.len();

    // sort_by is stable, so equal starts keep their batch order
    valid.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut chapters: Vec<Chapter> = Vec::new();
    let mut candidates_merged = 0;

    for (start, candidate) in valid {
        let end = candidate.end_or_default(start);

        let near_last = chapters
            .last_mut()
            .filter(|last| (start - last.start_time).abs() < config.merge_threshold_seconds);

        if let Some(last) = near_last {
            if candidate.name.chars().count() > last.name.chars().count() {
                last.name = candidate.name.clone();
            }
            last.end_time = last.end_time.max(end);
            candidates_merged += 1;
        } else {
            chapters.push(Chapter::new(candidate.name.clone(), start, end));
        }
    }

    if candidates_discarded > 0 {
        debug!("Stage 2: discarded {} malformed candidates", candidates_discarded);
    }
    info!(
        "Stage 2: {} candidates merged into {} chapters",
        candidates_received - candidates_discarded,
        chapters.len()
    );

    MergeResult {
        chapters,
        candidates_received,
        candidates_discarded,
        candidates_merged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn merge(batches: &[Vec<ChapterCandidate>]) -> Vec<Chapter> {
        merge_candidates(batches, &MergeConfig::default()).chapters
    }

    #[test]
    fn test_longer_name_wins_within_threshold() {
        let batches = vec![
            vec![ChapterCandidate::new("Intro", 0.0, Some(30.0))],
            vec![ChapterCandidate::new("Introduction", 3.0, Some(35.0))],
        ];
        assert_eq!(merge(&batches), vec![Chapter::new("Introduction", 0.0, 35.0)]);
    }

    #[test]
    fn test_equal_length_name_keeps_existing() {
        let batches = vec![vec![
            ChapterCandidate::new("Alpha", 0.0, Some(20.0)),
            ChapterCandidate::new("Omega", 5.0, Some(10.0)),
        ]];
        assert_eq!(merge(&batches), vec![Chapter::new("Alpha", 0.0, 20.0)]);
    }

    #[test]
    fn test_exact_threshold_starts_new_chapter() {
        let batches = vec![vec![
            ChapterCandidate::new("First", 0.0, Some(10.0)),
            ChapterCandidate::new("Second", 10.0, Some(20.0)),
        ]];
        assert_eq!(merge(&batches).len(), 2);
    }

    #[test]
    fn test_compares_against_last_accepted_start() {
        // 8s and 16s: 8 folds into 0, 16 is 16s from 0 so it stands alone
        let batches = vec![vec![
            ChapterCandidate::new("A", 0.0, Some(8.0)),
            ChapterCandidate::new("B", 8.0, Some(16.0)),
            ChapterCandidate::new("C", 16.0, Some(30.0)),
        ]];
        let chapters = merge(&batches);
        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[0], Chapter::new("A", 0.0, 16.0));
        assert_eq!(chapters[1].start_time, 16.0);
    }

    #[test]
    fn test_missing_end_defaults_to_sixty_seconds() {
        let batches = vec![vec![ChapterCandidate::new("Only", 12.0, None)]];
        assert_eq!(merge(&batches), vec![Chapter::new("Only", 12.0, 72.0)]);
    }

    #[test]
    fn test_drops_malformed_candidates() {
        let batches = vec![vec![
            ChapterCandidate::new("", 0.0, Some(10.0)),
            ChapterCandidate {
                name: "No start".to_string(),
                start_time: None,
                end_time: Some(5.0),
            },
            ChapterCandidate::new("Kept", 40.0, Some(60.0)),
        ]];
        let result = merge_candidates(&batches, &MergeConfig::default());

        assert_eq!(result.candidates_received, 3);
        assert_eq!(result.candidates_discarded, 2);
        assert_eq!(result.chapters, vec![Chapter::new("Kept", 40.0, 60.0)]);
    }

    #[test]
    fn test_order_independent_across_batches() {
        let a = vec![
            ChapterCandidate::new("Opening", 0.0, Some(50.0)),
            ChapterCandidate::new("Middle", 50.0, Some(100.0)),
        ];
        let b = vec![ChapterCandidate::new("Closing remarks", 100.0, Some(140.0))];

        let forward = merge(&[a.clone(), b.clone()]);
        let backward = merge(&[b, a]);
        assert_eq!(forward, backward);
        assert_eq!(forward.len(), 3);
    }

    #[test]
    fn test_merging_duplicated_input_is_idempotent() {
        let batch = vec![
            ChapterCandidate::new("Intro", 0.0, Some(30.0)),
            ChapterCandidate::new("Basics", 31.0, Some(70.0)),
            ChapterCandidate::new("The basics", 36.0, None),
            ChapterCandidate::new("Deep dive", 90.0, Some(150.0)),
        ];
        let once = merge(&[batch.clone()]);
        let twice = merge(&[batch.clone(), batch]);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_custom_threshold() {
        let batches = vec![vec![
            ChapterCandidate::new("A", 0.0, Some(20.0)),
            ChapterCandidate::new("B", 15.0, Some(40.0)),
        ]];
        let config = MergeConfig {
            merge_threshold_seconds: 20.0,
        };
        assert_eq!(merge_candidates(&batches, &config).chapters.len(), 1);
    }
}
