use std::io::Write;
use std::path::Path;

use crate::error::{ChapterError, Result};
use crate::models::{Chapter, ChapterFile};

impl ChapterFile {
    pub fn new(chapters: Vec<Chapter>) -> Self {
        Self { chapters }
    }

    /// Write to a JSON file, creating the parent directory if needed
    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| ChapterError::io(format!("creating {:?}", parent), e))?;
        }
        let file = std::fs::File::create(path)
            .map_err(|e| ChapterError::io(format!("creating {:?}", path), e))?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| ChapterError::json("writing chapters", e))
    }

    /// Read a previously written chapter file
    pub fn read_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ChapterError::io(format!("reading {:?}", path), e))?;
        serde_json::from_str(&content).map_err(|e| ChapterError::json("parsing chapters", e))
    }
}

/// Human-readable chapter listing
pub struct HumanChapters<'a> {
    chapters: &'a [Chapter],
}

impl<'a> HumanChapters<'a> {
    pub fn new(chapters: &'a [Chapter]) -> Self {
        Self { chapters }
    }

    /// One numbered line per chapter with its time range
    pub fn format(&self) -> String {
        let mut output = String::new();

        for (i, chapter) in self.chapters.iter().enumerate() {
            output.push_str(&format!(
                "{:>2}. [{} - {}] {}\n",
                i + 1,
                format_timestamp(chapter.start_time),
                format_timestamp(chapter.end_time),
                chapter.name
            ));
        }

        output
    }

    /// Write to a text file
    pub fn write_file(&self, path: &Path) -> Result<()> {
        let mut file = std::fs::File::create(path)
            .map_err(|e| ChapterError::io(format!("creating {:?}", path), e))?;
        write!(file, "{}", self.format())
            .map_err(|e| ChapterError::io(format!("writing {:?}", path), e))
    }
}

/// Format seconds as MM:SS.mmm
pub fn format_timestamp(seconds: f64) -> String {
    let ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let secs = ms / 1000;
    let millis = ms % 1000;
    format!("{:02}:{:02}.{:03}", secs / 60, secs % 60, millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "00:00.000");
        assert_eq!(format_timestamp(1.5), "00:01.500");
        assert_eq!(format_timestamp(65.0), "01:05.000");
        assert_eq!(format_timestamp(3661.5), "61:01.500");
    }

    #[test]
    fn test_human_format() {
        let chapters = vec![
            Chapter::new("Intro", 0.0, 50.0),
            Chapter::new("Sorting", 50.0, 125.25),
        ];
        let text = HumanChapters::new(&chapters).format();

        assert_eq!(
            text,
            " 1. [00:00.000 - 00:50.000] Intro\n 2. [00:50.000 - 02:05.250] Sorting\n"
        );
    }

    #[test]
    fn test_write_and_read_chapter_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("chapters.json");
        let file = ChapterFile::new(vec![Chapter::new("Intro", 0.0, 42.0)]);

        file.write_json(&path).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["chapters"][0]["chapter_name"], "Intro");
        assert_eq!(ChapterFile::read_json(&path).unwrap(), file);
    }
}
