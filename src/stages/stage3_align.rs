use tracing::debug;

use crate::models::{Chapter, SegmentStore};

/// Snap a timestamp to the start of the nearest segment
pub fn align_time(time: f64, store: &SegmentStore) -> f64 {
    store.nearest_start(time)
}

/// Execute Stage 3: snap every chapter boundary onto a segment start
///
/// Both boundaries snap to segment *starts*, so an end that falls
/// mid-segment can move earlier than proposed.
pub fn align_chapters(chapters: &[Chapter], store: &SegmentStore) -> Vec<Chapter> {
    let aligned: Vec<Chapter> = chapters
        .iter()
        .map(|chapter| Chapter {
            name: chapter.name.clone(),
            start_time: align_time(chapter.start_time, store),
            end_time: align_time(chapter.end_time, store),
        })
        .collect();

    let moved = chapters
        .iter()
        .zip(&aligned)
        .filter(|(before, after)| before != after)
        .count();
    debug!("Stage 3: aligned {} chapters ({} moved)", aligned.len(), moved);

    aligned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TranscriptSegment;

    fn store() -> SegmentStore {
        let segments = [0.0, 4.2, 11.8, 20.0, 33.3]
            .iter()
            .enumerate()
            .map(|(i, &s)| TranscriptSegment::new(i as i64, s, s + 3.0, "x"))
            .collect();
        SegmentStore::new(segments).unwrap()
    }

    #[test]
    fn test_align_time_nearest_start() {
        let store = store();
        assert_eq!(align_time(5.0, &store), 4.2);
        assert_eq!(align_time(10.0, &store), 11.8);
        assert_eq!(align_time(-3.0, &store), 0.0);
        assert_eq!(align_time(500.0, &store), 33.3);
    }

    #[test]
    fn test_aligned_boundaries_are_segment_starts() {
        let store = store();
        let chapters = vec![
            Chapter::new("A", 1.0, 15.0),
            Chapter::new("B", 17.0, 31.0),
            Chapter::new("C", 31.0, 90.0),
        ];
        let aligned = align_chapters(&chapters, &store);
        let starts: Vec<f64> = store.segments().iter().map(|s| s.start).collect();

        for chapter in &aligned {
            assert!(starts.contains(&chapter.start_time));
            assert!(starts.contains(&chapter.end_time));
        }
        assert_eq!(aligned[0], Chapter::new("A", 0.0, 11.8));
        assert_eq!(aligned[2].end_time, 33.3);
    }
}
