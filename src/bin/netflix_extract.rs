//! Week 12: pull the Japanese titles out of the Netflix open dataset
//! (CSV in, JSON out).
//!
//! Finds the needed columns from the header row, keeps the rows whose
//! country field matches, and writes `{title, type, duration}` records.

use std::error::Error;
use std::fs;
use std::path::Path;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use deskwork::logging;

const INPUT_CSV: &str = "./input/netflix_titles.csv";
const OUTPUT_DIR: &str = "./output";
const OUTPUT_JSON: &str = "japanese_titles.json";
const COUNTRY_PATTERN: &str = "Japan";

#[derive(Debug, Error)]
enum ExtractError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("input CSV is empty")]
    EmptyInput,

    #[error("required column missing from header: {0}")]
    MissingColumn(&'static str),
}

/// One record of the JSON output.
#[derive(Debug, Serialize, PartialEq, Eq)]
struct TitleRecord {
    title: String,
    #[serde(rename = "type")]
    kind: String,
    duration: String,
}

/// Positions of the columns we care about.
#[derive(Debug, Clone, Copy)]
struct ColumnIndices {
    country: usize,
    title: usize,
    kind: usize,
    duration: usize,
}

fn find_column(header: &csv::StringRecord, name: &'static str) -> Result<usize, ExtractError> {
    header
        .iter()
        .position(|field| field == name)
        .ok_or(ExtractError::MissingColumn(name))
}

fn column_indices(header: &csv::StringRecord) -> Result<ColumnIndices, ExtractError> {
    Ok(ColumnIndices {
        country: find_column(header, "country")?,
        title: find_column(header, "title")?,
        kind: find_column(header, "type")?,
        duration: find_column(header, "duration")?,
    })
}

/// Filter the body rows by country match.
fn extract_matching(
    rows: &[csv::StringRecord],
    indices: ColumnIndices,
    country: &Regex,
) -> Vec<TitleRecord> {
    let mut results = Vec::new();
    for row in rows {
        // short rows in the open data are skipped, not an error
        let Some(country_value) = row.get(indices.country) else {
            continue;
        };
        if country.is_match(country_value) {
            results.push(TitleRecord {
                title: row.get(indices.title).unwrap_or("").to_string(),
                kind: row.get(indices.kind).unwrap_or("").to_string(),
                duration: row.get(indices.duration).unwrap_or("").to_string(),
            });
        }
    }
    debug!("matched {} rows", results.len());
    results
}

fn run_analysis(input_csv: &Path, output_json: &Path) -> Result<usize, ExtractError> {
    let mut reader = csv::Reader::from_path(input_csv)?;
    let header = reader.headers()?.clone();
    let rows: Vec<csv::StringRecord> = reader.records().collect::<Result<_, _>>()?;

    if rows.is_empty() {
        warn!("{} has no data rows", input_csv.display());
        return Err(ExtractError::EmptyInput);
    }

    let indices = column_indices(&header)?;
    let country = Regex::new(COUNTRY_PATTERN).expect("fixed pattern compiles");
    let matched = extract_matching(&rows, indices, &country);

    if let Some(parent) = output_json.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(&matched)?;
    fs::write(output_json, json)?;

    info!(
        "analysis done: {} matching titles -> {}",
        matched.len(),
        output_json.display()
    );
    Ok(matched.len())
}

fn main() -> Result<(), Box<dyn Error>> {
    logging::setup();

    let output_path = Path::new(OUTPUT_DIR).join(OUTPUT_JSON);
    let count = run_analysis(Path::new(INPUT_CSV), &output_path)?;
    println!("Extracted {count} titles into {}", output_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    const SAMPLE: &str = "\
show_id,type,title,country,duration
s1,Movie,Your Name,Japan,106 min
s2,TV Show,Some Drama,United States,2 Seasons
s3,Movie,Joint Work,\"Japan, France\",95 min
s4,Movie,No Country,,90 min
";

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_extracts_japanese_titles() {
        let csv_file = write_csv(SAMPLE);
        let dir = tempdir().unwrap();
        let out = dir.path().join("out.json");

        let count = run_analysis(csv_file.path(), &out).unwrap();
        assert_eq!(count, 2);

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(json[0]["title"], "Your Name");
        assert_eq!(json[0]["type"], "Movie");
        assert_eq!(json[0]["duration"], "106 min");
        assert_eq!(json[1]["title"], "Joint Work");
    }

    #[test]
    fn test_empty_body_is_error() {
        let csv_file = write_csv("show_id,type,title,country,duration\n");
        let dir = tempdir().unwrap();
        let out = dir.path().join("out.json");

        let err = run_analysis(csv_file.path(), &out).unwrap_err();
        assert!(matches!(err, ExtractError::EmptyInput));
    }

    #[test]
    fn test_missing_column_is_error() {
        let csv_file = write_csv("show_id,name\ns1,x\n");
        let dir = tempdir().unwrap();
        let out = dir.path().join("out.json");

        let err = run_analysis(csv_file.path(), &out).unwrap_err();
        assert!(matches!(err, ExtractError::MissingColumn("country")));
    }

    #[test]
    fn test_no_matches_writes_empty_array() {
        let csv_file = write_csv("show_id,type,title,country,duration\ns1,Movie,X,Brazil,90 min\n");
        let dir = tempdir().unwrap();
        let out = dir.path().join("out.json");

        let count = run_analysis(csv_file.path(), &out).unwrap();
        assert_eq!(count, 0);
        assert_eq!(fs::read_to_string(&out).unwrap().trim(), "[]");
    }
}
