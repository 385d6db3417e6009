//! CSV-backed worksheet with A1-style cell addressing.
//!
//! The spreadsheet exercises edit report templates cell by cell
//! (`ws["E3"] = ...`); this model keeps that shape on top of the `csv`
//! crate. One file is one sheet.

use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum WorksheetError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid cell reference: {0:?}")]
    BadCellRef(String),

    #[error("template not found: {0}")]
    TemplateNotFound(String),
}

/// Zero-based (row, column) pair parsed from an A1-style reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

/// Parse `"E3"` into row 2, column 4. Column letters are case-insensitive
/// and may span multiple letters (`AA`, `AB`, ...).
pub fn parse_cell_ref(reference: &str) -> Result<CellRef, WorksheetError> {
    let letters: String = reference.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
    let digits = &reference[letters.len()..];

    if letters.is_empty() || digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(WorksheetError::BadCellRef(reference.to_string()));
    }

    let mut col = 0usize;
    for c in letters.chars() {
        col = col * 26 + (c.to_ascii_uppercase() as usize - 'A' as usize + 1);
    }
    let row: usize = digits
        .parse()
        .map_err(|_| WorksheetError::BadCellRef(reference.to_string()))?;
    if row == 0 {
        return Err(WorksheetError::BadCellRef(reference.to_string()));
    }

    Ok(CellRef {
        row: row - 1,
        col: col - 1,
    })
}

/// Format a zero-based (row, col) back into an A1 reference.
pub fn format_cell_ref(cell: CellRef) -> String {
    let mut col = cell.col + 1;
    let mut letters = String::new();
    while col > 0 {
        let rem = (col - 1) % 26;
        letters.insert(0, (b'A' + rem as u8) as char);
        col = (col - 1) / 26;
    }
    format!("{}{}", letters, cell.row + 1)
}

/// One sheet: a ragged grid of string cells read from and written to CSV.
#[derive(Debug, Clone, Default)]
pub struct Worksheet {
    rows: Vec<Vec<String>>,
}

impl Worksheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a sheet from a CSV file. The file may be ragged; rows keep
    /// their original width until a write extends them.
    pub fn load(path: &Path) -> Result<Self, WorksheetError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        info!("worksheet loaded: {} ({} rows)", path.display(), rows.len());
        Ok(Self { rows })
    }

    pub fn save(&self, path: &Path) -> Result<(), WorksheetError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut writer = csv::WriterBuilder::new().flexible(true).from_path(path)?;
        // Pad to a rectangle so empty rows survive the round trip.
        let width = self.rows.iter().map(Vec::len).max().unwrap_or(0).max(1);
        let mut padded;
        for row in &self.rows {
            padded = row.clone();
            padded.resize(width, String::new());
            writer.write_record(&padded)?;
        }
        writer.flush()?;
        info!("worksheet saved: {}", path.display());
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    /// Read a cell by A1 reference; cells outside the grid read as empty.
    pub fn cell(&self, reference: &str) -> Result<&str, WorksheetError> {
        let cell = parse_cell_ref(reference)?;
        Ok(self
            .rows
            .get(cell.row)
            .and_then(|row| row.get(cell.col))
            .map(String::as_str)
            .unwrap_or(""))
    }

    /// Write a cell by A1 reference, growing the grid as needed.
    pub fn set_cell(
        &mut self,
        reference: &str,
        value: impl Into<String>,
    ) -> Result<(), WorksheetError> {
        let cell = parse_cell_ref(reference)?;
        let value = value.into();

        if self.rows.len() <= cell.row {
            self.rows.resize(cell.row + 1, Vec::new());
        }
        let row = &mut self.rows[cell.row];
        if row.len() <= cell.col {
            row.resize(cell.col + 1, String::new());
        }

        debug!("cell {reference} <- {value:?}");
        row[cell.col] = value;
        Ok(())
    }
}

/// Duplicate a template sheet before editing it (the `shutil.copy` step of
/// the original workflow).
pub fn copy_template(template: &Path, output: &Path) -> Result<(), WorksheetError> {
    if !template.exists() {
        return Err(WorksheetError::TemplateNotFound(
            template.display().to_string(),
        ));
    }
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(template, output)?;
    info!("template copied: {} -> {}", template.display(), output.display());
    Ok(())
}
