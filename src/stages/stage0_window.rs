use tracing::debug;

use crate::error::{ChapterError, Result};
use crate::models::{SegmentStore, Window, WindowConfig, WindowSet};

/// Check a window configuration before it can drive the sliding loop
pub fn validate_window_config(config: &WindowConfig) -> Result<()> {
    if config.window_size == 0 {
        return Err(ChapterError::InvalidWindowConfig(
            "window_size must be positive".to_string(),
        ));
    }
    if config.overlap >= config.window_size {
        return Err(ChapterError::InvalidWindowConfig(format!(
            "overlap ({}) must be smaller than window_size ({})",
            config.overlap, config.window_size
        )));
    }
    Ok(())
}

/// Execute Stage 0: split the segments into overlapping, size-bounded windows
///
/// Short transcripts become a single window. Longer ones are covered by a
/// window of `window_size` segments that advances by `window_size - overlap`
/// until its right edge reaches the last segment.
pub fn build_windows(store: &SegmentStore, config: &WindowConfig) -> Result<WindowSet> {
    validate_window_config(config)?;

    let total = store.len();
    if total <= config.window_size {
        return Ok(WindowSet {
            windows: vec![Window::new(0, 0..total, store)],
        });
    }

    let mut windows = Vec::new();
    let mut start_idx = 0;

    while start_idx < total {
        let end_idx = (start_idx + config.window_size).min(total);
        windows.push(Window::new(windows.len(), start_idx..end_idx, store));

        if end_idx >= total {
            break;
        }
        start_idx = end_idx - config.overlap;
    }

    debug!(
        "Built {} windows over {} segments (size {}, overlap {})",
        windows.len(),
        total,
        config.window_size,
        config.overlap
    );

    Ok(WindowSet { windows })
}
