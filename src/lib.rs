pub mod error;
pub mod io;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod stages;

pub use error::ChapterError;
pub use io::{HumanChapters, load_segment_store, parse_segments_file, parse_segments_json};
pub use llm::{
    AnthropicClient, AnthropicConfig, CandidateGenerator, GeneratorError, RetryConfig, WindowRequest,
};
pub use models::{
    Chapter, ChapterCandidate, ChapterFile, SegmentStore, TranscriptSegment, Window, WindowConfig,
    WindowSet,
};
pub use pipeline::{ChapterConfig, ChapterOutcome, ChapterReport, generate_chapters};
pub use stages::{
    GenerationConfig, MergeConfig, align_chapters, align_time, build_windows, enforce_coverage,
    merge_candidates,
};
