use serde::{Deserialize, Serialize};

/// Length assumed for a candidate that does not say where it ends
pub const DEFAULT_CHAPTER_SECONDS: f64 = 60.0;

/// An unvalidated chapter proposal from one window.
///
/// Fields are optional because the generator output is untrusted; the merge
/// stage drops candidates without a name or start.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChapterCandidate {
    #[serde(rename = "chapter_name", alias = "name", alias = "title", default)]
    pub name: String,
    #[serde(default)]
    pub start_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<f64>,
}

impl ChapterCandidate {
    pub fn new(name: impl Into<String>, start_time: f64, end_time: Option<f64>) -> Self {
        Self {
            name: name.into(),
            start_time: Some(start_time),
            end_time,
        }
    }

    /// Start time when the candidate is usable: non-empty name and a finite start
    pub fn valid_start(&self) -> Option<f64> {
        if self.name.trim().is_empty() {
            return None;
        }
        self.start_time.filter(|t| t.is_finite())
    }

    /// End time, falling back to a fixed length after the start
    pub fn end_or_default(&self, start_time: f64) -> f64 {
        self.end_time
            .filter(|t| t.is_finite())
            .unwrap_or(start_time + DEFAULT_CHAPTER_SECONDS)
    }
}

/// A named time range in the final chapter list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    #[serde(rename = "chapter_name")]
    pub name: String,
    pub start_time: f64,
    pub end_time: f64,
}

impl Chapter {
    pub fn new(name: impl Into<String>, start_time: f64, end_time: f64) -> Self {
        Self {
            name: name.into(),
            start_time,
            end_time,
        }
    }
}

/// Persisted chapter artifact: `{"chapters": [...]}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChapterFile {
    pub chapters: Vec<Chapter>,
}
