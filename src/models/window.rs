use std::ops::Range;

use serde::{Deserialize, Serialize};

use super::SegmentStore;

/// Configuration for window generation
#[derive(Debug, Clone)]
pub struct WindowConfig {
    /// Number of segments per window
    pub window_size: usize,
    /// Number of segments shared between consecutive windows
    pub overlap: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            window_size: 15,
            overlap: 5,
        }
    }
}

impl WindowConfig {
    /// How far the window start advances between consecutive windows
    pub fn stride(&self) -> usize {
        self.window_size.saturating_sub(self.overlap)
    }
}

/// A contiguous run of segments submitted together to the candidate generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Window {
    /// Identifier for this window (`w_<n>`)
    pub window_id: String,
    /// Index of the first segment in this window
    pub start_idx: usize,
    /// One past the index of the last segment in this window
    pub end_idx: usize,
    /// Start of the first segment in seconds
    pub start_time: f64,
    /// End of the last segment in seconds
    pub end_time: f64,
}

impl Window {
    pub fn new(index: usize, range: Range<usize>, store: &SegmentStore) -> Self {
        let segments = store.segments();
        Self {
            window_id: format!("w_{}", index),
            start_idx: range.start,
            end_idx: range.end,
            start_time: segments[range.start].start,
            end_time: segments[range.end - 1].end,
        }
    }

    pub fn range(&self) -> Range<usize> {
        self.start_idx..self.end_idx
    }

    /// Number of segments in this window
    pub fn segment_count(&self) -> usize {
        self.end_idx - self.start_idx
    }

    /// Duration of this window in seconds
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// Result of window generation
#[derive(Debug, Clone, Default)]
pub struct WindowSet {
    /// All generated windows, in transcript order
    pub windows: Vec<Window>,
}

impl WindowSet {
    /// Total number of windows
    pub fn total_windows(&self) -> usize {
        self.windows.len()
    }

    /// Number of distinct segment indices reached by at least one window
    pub fn covered_segment_count(&self) -> usize {
        let mut covered = 0;
        let mut next_uncovered = 0;
        for window in &self.windows {
            let start = window.start_idx.max(next_uncovered);
            if window.end_idx > start {
                covered += window.end_idx - start;
                next_uncovered = window.end_idx;
            }
        }
        covered
    }

    pub fn iter(&self) -> impl Iterator<Item = &Window> {
        self.windows.iter()
    }
}
