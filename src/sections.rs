//! Delimiter-separated section reader for the report text files.
//!
//! The schedule data files alternate activity text and comment text,
//! separated by `======` lines. `read_sections` validates the count and
//! hands back the two interleaved halves.

use std::fs;
use std::path::Path;

use itertools::Itertools;
use thiserror::Error;
use tracing::info;

const DELIMITER: &str = "======";

#[derive(Debug, Error)]
pub enum SectionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("expected {expected} sections for {days} days, found {found}")]
    CountMismatch {
        days: usize,
        expected: usize,
        found: usize,
    },
}

/// Split the file on the delimiter into `(contents, comments)`.
///
/// The file must hold exactly two sections per day: even positions are the
/// day's activity, odd positions the matching comment.
pub fn read_sections(path: &Path, total_days: usize) -> Result<(Vec<String>, Vec<String>), SectionError> {
    let full_text = fs::read_to_string(path)?;
    let sections = split_sections(&full_text);

    let expected = total_days * 2;
    if sections.len() != expected {
        return Err(SectionError::CountMismatch {
            days: total_days,
            expected,
            found: sections.len(),
        });
    }

    let (contents, comments) = interleave_split(sections);
    info!(
        "read {} day sections from {}",
        contents.len(),
        path.display()
    );
    Ok((contents, comments))
}

fn split_sections(full_text: &str) -> Vec<String> {
    full_text
        .split(DELIMITER)
        .map(str::trim)
        .filter(|section| !section.is_empty())
        .map(str::to_string)
        .collect()
}

fn interleave_split(sections: Vec<String>) -> (Vec<String>, Vec<String>) {
    sections.into_iter().tuples().map(|(content, comment)| (content, comment)).unzip()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_splits_into_interleaved_halves() {
        let file = write_file(
            "day1 work\n======\nday1 comment\n======\nday2 work\n======\nday2 comment\n",
        );

        let (contents, comments) = read_sections(file.path(), 2).unwrap();
        assert_eq!(contents, vec!["day1 work", "day2 work"]);
        assert_eq!(comments, vec!["day1 comment", "day2 comment"]);
    }

    #[test]
    fn test_trims_and_drops_empty_sections() {
        let file = write_file("======\n  a  \n======\n\n======\nb\n======");

        let (contents, comments) = read_sections(file.path(), 1).unwrap();
        assert_eq!(contents, vec!["a"]);
        assert_eq!(comments, vec!["b"]);
    }

    #[test]
    fn test_count_mismatch_is_error() {
        let file = write_file("a\n======\nb\n======\nc\n");

        let err = read_sections(file.path(), 2).unwrap_err();
        assert!(matches!(
            err,
            SectionError::CountMismatch {
                days: 2,
                expected: 4,
                found: 3,
            }
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = read_sections(Path::new("does/not/exist.txt"), 1).unwrap_err();
        assert!(matches!(err, SectionError::Io(_)));
    }
}
