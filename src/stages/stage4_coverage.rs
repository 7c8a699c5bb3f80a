use tracing::debug;

use crate::models::{Chapter, SegmentStore};

/// Result of Stage 4 coverage repair
#[derive(Debug, Clone, Default)]
pub struct CoverageResult {
    /// Contiguous chapters spanning the whole transcript
    pub chapters: Vec<Chapter>,
    /// Gaps closed by extending the earlier chapter
    pub gaps_closed: usize,
    /// Overlaps resolved by moving the later chapter's start
    pub overlaps_resolved: usize,
}

/// Execute Stage 4: force the chapters into a gap-free partition of the transcript
///
/// 1. Clamps boundaries into the transcript span and pins the first start and
///    the last end to the transcript extremes
/// 2. Stable-sorts by start time and re-pins, since sorting can change which
///    chapter is first or last
/// 3. Sweeps adjacent pairs: a gap extends the earlier chapter, an overlap
///    moves the later chapter's start up to the earlier chapter's end
///
/// No chapter is removed here, so the output count equals the input count and
/// an empty input yields an empty output.
pub fn enforce_coverage(chapters: &[Chapter], store: &SegmentStore) -> CoverageResult {
    if chapters.is_empty() {
        return CoverageResult::default();
    }

    let video_start = store.start_time();
    let video_end = store.end_time();

    let mut chapters: Vec<Chapter> = chapters
        .iter()
        .map(|c| Chapter {
            name: c.name.clone(),
            start_time: c.start_time.clamp(video_start, video_end),
            end_time: c.end_time.clamp(video_start, video_end),
        })
        .collect();

    pin_extremes(&mut chapters, video_start, video_end);
    chapters.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
    pin_extremes(&mut chapters, video_start, video_end);

    let mut gaps_closed = 0;
    let mut overlaps_resolved = 0;

    for i in 0..chapters.len() - 1 {
        let current_end = chapters[i].end_time;
        let next_start = chapters[i + 1].start_time;

        if next_start > current_end {
            chapters[i].end_time = next_start;
            gaps_closed += 1;
        } else if next_start < current_end {
            let next = &mut chapters[i + 1];
            next.start_time = current_end;
            next.end_time = next.end_time.max(current_end);
            overlaps_resolved += 1;
        }
    }

    debug!(
        "Stage 4: {} chapters, {} gaps closed, {} overlaps resolved",
        chapters.len(),
        gaps_closed,
        overlaps_resolved
    );

    CoverageResult {
        chapters,
        gaps_closed,
        overlaps_resolved,
    }
}

fn pin_extremes(chapters: &mut [Chapter], video_start: f64, video_end: f64) {
    if let Some(first) = chapters.first_mut() {
        first.start_time = video_start;
    }
    if let Some(last) = chapters.last_mut() {
        last.end_time = video_end;
    }
}

/// Drop chapters that coverage repair collapsed to zero length.
///
/// A zero-length chapter shares both boundaries with its neighbours, so
/// removing it keeps the list contiguous.
pub fn drop_empty_chapters(chapters: Vec<Chapter>) -> Vec<Chapter> {
    if chapters.len() <= 1 {
        return chapters;
    }
    let kept: Vec<Chapter> = chapters
        .iter()
        .filter(|c| c.end_time > c.start_time)
        .cloned()
        .collect();
    if kept.is_empty() {
        // Only reachable when the transcript span itself is zero
        return chapters.into_iter().take(1).collect();
    }
    kept
}
