use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::{ChapterError, Result};

/// A single timestamped unit of transcript text, as written by the transcription step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Segment identifier assigned upstream
    pub id: i64,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    /// Transcript text for this segment
    pub text: String,
}

impl TranscriptSegment {
    pub fn new(id: i64, start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            id,
            start,
            end,
            text: text.into(),
        }
    }

    /// Duration of this segment in seconds
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Ordered, immutable sequence of segments for one source.
///
/// Construction validates ordering, so every query below can rely on
/// non-decreasing `start` values and at least one segment.
#[derive(Debug, Clone)]
pub struct SegmentStore {
    segments: Vec<TranscriptSegment>,
}

impl SegmentStore {
    pub fn new(segments: Vec<TranscriptSegment>) -> Result<Self> {
        if segments.is_empty() {
            return Err(ChapterError::EmptySegments);
        }

        for (index, segment) in segments.iter().enumerate() {
            if !segment.start.is_finite() || !segment.end.is_finite() {
                return Err(ChapterError::invalid_segment(index, "non-finite timestamp"));
            }
            if segment.start < 0.0 {
                return Err(ChapterError::invalid_segment(
                    index,
                    format!("negative start {}", segment.start),
                ));
            }
            if segment.end <= segment.start {
                return Err(ChapterError::invalid_segment(
                    index,
                    format!("end {} is not after start {}", segment.end, segment.start),
                ));
            }
        }

        if let Some(index) = segments
            .windows(2)
            .position(|pair| pair[1].start < pair[0].start)
        {
            return Err(ChapterError::invalid_segment(
                index + 1,
                format!(
                    "start {} precedes previous start {}",
                    segments[index + 1].start,
                    segments[index].start
                ),
            ));
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[TranscriptSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn find_by_id(&self, id: i64) -> Option<&TranscriptSegment> {
        self.segments.iter().find(|s| s.id == id)
    }

    /// Start of the first segment
    pub fn start_time(&self) -> f64 {
        self.segments[0].start
    }

    /// End of the last segment
    pub fn end_time(&self) -> f64 {
        self.segments[self.segments.len() - 1].end
    }

    /// Total span covered by the transcript in seconds
    pub fn duration(&self) -> f64 {
        self.end_time() - self.start_time()
    }

    /// The last segment starting at or before `time`
    pub fn segment_at(&self, time: f64) -> Option<&TranscriptSegment> {
        let idx = self.segments.partition_point(|s| s.start <= time);
        idx.checked_sub(1).map(|i| &self.segments[i])
    }

    /// The segment start closest to `time`; ties go to the earlier segment.
    pub fn nearest_start(&self, time: f64) -> f64 {
        let idx = self.segments.partition_point(|s| s.start < time);

        let after = self.segments.get(idx).map(|s| s.start);
        let before = idx.checked_sub(1).map(|i| self.segments[i].start);

        match (before, after) {
            (Some(b), Some(a)) => {
                if (time - b).abs() <= (a - time).abs() {
                    b
                } else {
                    a
                }
            }
            (Some(b), None) => b,
            (None, Some(a)) => a,
            // partition_point over a non-empty slice always yields a neighbour
            (None, None) => self.start_time(),
        }
    }

    /// Render a range of segments as `[start-end] text` lines
    pub fn render_window_text(&self, range: Range<usize>) -> String {
        self.segments[range]
            .iter()
            .map(|s| format!("[{:.2}-{:.2}] {}", s.start, s.end, s.text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
