use thiserror::Error;

/// Pipeline-level failures surfaced to the caller.
///
/// Stage-local problems (a malformed candidate, a single failed window) are
/// absorbed inside the pipeline and only show up in logs and counts.
#[derive(Debug, Error)]
pub enum ChapterError {
    #[error("transcript has no segments")]
    EmptySegments,

    #[error("invalid segment at index {index}: {reason}")]
    InvalidSegment { index: usize, reason: String },

    #[error("invalid window configuration: {0}")]
    InvalidWindowConfig(String),

    #[error("no chapters could be generated: all {windows} windows failed")]
    AllWindowsFailed { windows: usize },

    #[error("no chapters could be generated: {windows} windows returned no usable candidates")]
    NoChapters { windows: usize },

    #[error("I/O error while {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error while {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ChapterError {
    pub(crate) fn invalid_segment(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidSegment {
            index,
            reason: reason.into(),
        }
    }

    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ChapterError>;
