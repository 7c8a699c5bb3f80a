use std::path::Path;

use crate::error::{ChapterError, Result};
use crate::models::{SegmentStore, TranscriptSegment};

/// Parse a segments JSON file (`[{id, start, end, text}, ...]`)
pub fn parse_segments_file(path: &Path) -> Result<Vec<TranscriptSegment>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ChapterError::io(format!("reading {:?}", path), e))?;
    parse_segments_json(&content)
}

/// Parse a segments JSON string
pub fn parse_segments_json(json: &str) -> Result<Vec<TranscriptSegment>> {
    serde_json::from_str(json).map_err(|e| ChapterError::json("parsing transcript segments", e))
}

/// Parse and validate a segments file in one step
pub fn load_segment_store(path: &Path) -> Result<SegmentStore> {
    SegmentStore::new(parse_segments_file(path)?)
}
