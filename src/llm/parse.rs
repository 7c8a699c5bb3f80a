use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::ChapterCandidate;

/// Why a generator reply could not be read as a chapter list
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("no JSON object or array found in response")]
    NoJson,
    #[error("invalid JSON in response: {0}")]
    InvalidJson(String),
    #[error("response JSON has no chapter list")]
    MissingChapters,
}

/// Parse a free-text generator reply into chapter candidates
///
/// Accepts a bare JSON document, or JSON embedded in prose or a markdown
/// code fence. Individual entries that are not objects are skipped; entries
/// with missing fields are kept for the merge stage to discard.
pub fn parse_chapter_response(raw: &str) -> Result<Vec<ChapterCandidate>, ParseError> {
    let trimmed = raw.trim();

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return parse_chapter_value(&value);
    }

    let mut last_error = None;
    for span in [
        outer_span(trimmed, '{', '}'),
        outer_span(trimmed, '[', ']'),
    ]
    .into_iter()
    .flatten()
    {
        let parsed = serde_json::from_str::<Value>(span)
            .map_err(|e| ParseError::InvalidJson(e.to_string()))
            .and_then(|value| parse_chapter_value(&value));
        match parsed {
            Ok(candidates) => return Ok(candidates),
            Err(e) => last_error = Some(e),
        }
    }

    Err(last_error.unwrap_or(ParseError::NoJson))
}

/// Read chapter candidates out of an already-decoded JSON value
pub fn parse_chapter_value(value: &Value) -> Result<Vec<ChapterCandidate>, ParseError> {
    let entries = match value {
        Value::Object(map) => match map.get("chapters") {
            Some(Value::Array(entries)) => entries,
            _ => return Err(ParseError::MissingChapters),
        },
        Value::Array(entries) => entries,
        _ => return Err(ParseError::MissingChapters),
    };

    Ok(entries
        .iter()
        .filter_map(Value::as_object)
        .map(candidate_from_object)
        .collect())
}

/// First `open` through last `close`, inclusive
fn outer_span(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

fn candidate_from_object(object: &Map<String, Value>) -> ChapterCandidate {
    let name = ["chapter_name", "name", "title"]
        .iter()
        .find_map(|key| object.get(*key).and_then(Value::as_str))
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    ChapterCandidate {
        name,
        start_time: object.get("start_time").and_then(parse_seconds),
        end_time: object.get("end_time").and_then(parse_seconds),
    }
}

/// Seconds from a JSON number, a numeric string, or an `mm:ss` / `hh:mm:ss` timestamp
fn parse_seconds(value: &Value) -> Option<f64> {
    let seconds = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => parse_timestamp(s.trim())?,
        _ => return None,
    };
    seconds.is_finite().then_some(seconds)
}

fn parse_timestamp(s: &str) -> Option<f64> {
    let s = s.strip_suffix('s').unwrap_or(s);
    if let Ok(seconds) = s.parse::<f64>() {
        return Some(seconds);
    }

    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return None;
    }
    parts.iter().try_fold(0.0, |acc, part| {
        let value = part.parse::<f64>().ok().filter(|v| *v >= 0.0)?;
        Some(acc * 60.0 + value)
    })
}
