//! Structured document model saved as Markdown.
//!
//! Stands in for the word-processor exercises: headings, paragraphs,
//! bullet/numbered lists, tables and image references, plus the template
//! substitution pass over paragraphs and table cells.

use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::{debug, info};

use crate::placeholder::PlaceholderMap;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("heading level must be 1..=6, got {0}")]
    BadHeadingLevel(u8),

    #[error("table cell out of range: row {row}, col {col}")]
    CellOutOfRange { row: usize, col: usize },

    #[error("table must have at least one row and one column")]
    EmptyTable,
}

/// One block-level element of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, text: String },
    Paragraph(String),
    BulletList(Vec<String>),
    NumberedList(Vec<String>),
    Table(Table),
    Image { alt: String, path: String },
}

/// Rectangular cell grid; the first row is rendered as the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(rows: usize, cols: usize) -> Result<Self, DocumentError> {
        if rows == 0 || cols == 0 {
            return Err(DocumentError::EmptyTable);
        }
        Ok(Self {
            rows: vec![vec![String::new(); cols]; rows],
        })
    }

    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    pub fn cols(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(col)).map(String::as_str)
    }

    pub fn set_cell(
        &mut self,
        row: usize,
        col: usize,
        value: impl Into<String>,
    ) -> Result<(), DocumentError> {
        let cell = self
            .rows
            .get_mut(row)
            .and_then(|r| r.get_mut(col))
            .ok_or(DocumentError::CellOutOfRange { row, col })?;
        *cell = value.into();
        Ok(())
    }
}

/// An in-memory document built block by block and saved as Markdown.
#[derive(Debug, Clone, Default)]
pub struct Document {
    blocks: Vec<Block>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn add_heading(&mut self, text: impl Into<String>, level: u8) -> Result<(), DocumentError> {
        if !(1..=6).contains(&level) {
            return Err(DocumentError::BadHeadingLevel(level));
        }
        self.blocks.push(Block::Heading {
            level,
            text: text.into(),
        });
        Ok(())
    }

    pub fn add_paragraph(&mut self, text: impl Into<String>) {
        self.blocks.push(Block::Paragraph(text.into()));
    }

    pub fn add_bullet_list(&mut self, items: Vec<String>) {
        self.blocks.push(Block::BulletList(items));
    }

    pub fn add_numbered_list(&mut self, items: Vec<String>) {
        self.blocks.push(Block::NumberedList(items));
    }

    /// Add an empty `rows` x `cols` table and return a handle to it.
    pub fn add_table(&mut self, rows: usize, cols: usize) -> Result<&mut Table, DocumentError> {
        let table = Table::new(rows, cols)?;
        self.blocks.push(Block::Table(table));
        match self.blocks.last_mut() {
            Some(Block::Table(table)) => Ok(table),
            _ => unreachable!("table was just pushed"),
        }
    }

    pub fn add_image(&mut self, alt: impl Into<String>, path: impl Into<String>) {
        self.blocks.push(Block::Image {
            alt: alt.into(),
            path: path.into(),
        });
    }

    /// Texts of headings and paragraphs, in document order.
    pub fn extract_text(&self) -> Vec<String> {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                Block::Heading { text, .. } => Some(text.clone()),
                Block::Paragraph(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Substitution pass over paragraphs and table cells.
    ///
    /// Returns the number of blocks that changed. List items and headings
    /// are left alone; the form templates only put tokens in body text and
    /// tables.
    pub fn apply_placeholders(&mut self, map: &PlaceholderMap) -> usize {
        let mut changed = 0;
        for block in &mut self.blocks {
            match block {
                Block::Paragraph(text) => {
                    let (new_text, replaced) = map.apply_to_text(text);
                    if replaced {
                        *text = new_text;
                        changed += 1;
                    }
                }
                Block::Table(table) => {
                    let mut any = false;
                    for row in &mut table.rows {
                        for cell in row {
                            let (new_cell, replaced) = map.apply_to_text(cell);
                            if replaced {
                                *cell = new_cell;
                                any = true;
                            }
                        }
                    }
                    if any {
                        changed += 1;
                    }
                }
                _ => {}
            }
        }
        debug!("placeholder pass touched {changed} blocks");
        changed
    }

    /// Render to Markdown.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        for block in &self.blocks {
            match block {
                Block::Heading { level, text } => {
                    out.push_str(&"#".repeat(*level as usize));
                    out.push(' ');
                    out.push_str(text);
                    out.push('\n');
                }
                Block::Paragraph(text) => {
                    out.push_str(text);
                    out.push('\n');
                }
                Block::BulletList(items) => {
                    for item in items {
                        out.push_str("- ");
                        out.push_str(item);
                        out.push('\n');
                    }
                }
                Block::NumberedList(items) => {
                    for (i, item) in items.iter().enumerate() {
                        out.push_str(&format!("{}. {}\n", i + 1, item));
                    }
                }
                Block::Table(table) => {
                    for (i, row) in table.rows.iter().enumerate() {
                        out.push_str("| ");
                        out.push_str(&row.join(" | "));
                        out.push_str(" |\n");
                        if i == 0 {
                            out.push_str(&format!("|{}\n", " --- |".repeat(table.cols())));
                        }
                    }
                }
                Block::Image { alt, path } => {
                    out.push_str(&format!("![{alt}]({path})\n"));
                }
            }
            out.push('\n');
        }
        out
    }

    pub fn save(&self, path: &Path) -> Result<(), DocumentError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_markdown())?;
        info!("document saved: {}", path.display());
        Ok(())
    }

    /// Parse a Markdown file back into blocks.
    ///
    /// Line-oriented and limited to the constructs this model emits; the
    /// course templates never go beyond them.
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let text = fs::read_to_string(path)?;
        let mut doc = Document::new();
        let mut bullets: Vec<String> = Vec::new();
        let mut numbered: Vec<String> = Vec::new();
        let mut table_rows: Vec<Vec<String>> = Vec::new();

        for line in text.lines() {
            let trimmed = line.trim_end();

            if let Some(row) = parse_table_row(trimmed) {
                flush_lists(&mut doc, &mut bullets, &mut numbered);
                if !is_separator_row(&row) {
                    table_rows.push(row);
                }
                continue;
            }
            flush_table(&mut doc, &mut table_rows);

            if trimmed.is_empty() {
                flush_lists(&mut doc, &mut bullets, &mut numbered);
            } else if let Some(rest) = trimmed.strip_prefix("- ") {
                bullets.push(rest.to_string());
            } else if let Some((alt, img_path)) = parse_image(trimmed) {
                flush_lists(&mut doc, &mut bullets, &mut numbered);
                doc.add_image(alt, img_path);
            } else if let Some((level, heading)) = parse_heading(trimmed) {
                flush_lists(&mut doc, &mut bullets, &mut numbered);
                doc.add_heading(heading, level)?;
            } else if let Some(item) = parse_numbered_item(trimmed) {
                numbered.push(item);
            } else {
                flush_lists(&mut doc, &mut bullets, &mut numbered);
                doc.add_paragraph(trimmed);
            }
        }
        flush_lists(&mut doc, &mut bullets, &mut numbered);
        flush_table(&mut doc, &mut table_rows);

        info!("document loaded: {} ({} blocks)", path.display(), doc.blocks.len());
        Ok(doc)
    }
}

fn parse_heading(line: &str) -> Option<(u8, String)> {
    let level = line.bytes().take_while(|&b| b == b'#').count();
    if !(1..=6).contains(&level) {
        return None;
    }
    let rest = line[level..].strip_prefix(' ')?;
    Some((level as u8, rest.to_string()))
}

fn parse_numbered_item(line: &str) -> Option<String> {
    let dot = line.find(". ")?;
    if line[..dot].chars().all(|c| c.is_ascii_digit()) && dot > 0 {
        Some(line[dot + 2..].to_string())
    } else {
        None
    }
}

fn parse_image(line: &str) -> Option<(String, String)> {
    let rest = line.strip_prefix("![")?;
    let close = rest.find("](")?;
    let alt = &rest[..close];
    let path = rest[close + 2..].strip_suffix(')')?;
    Some((alt.to_string(), path.to_string()))
}

fn parse_table_row(line: &str) -> Option<Vec<String>> {
    let inner = line.strip_prefix('|')?.strip_suffix('|')?;
    Some(inner.split('|').map(|cell| cell.trim().to_string()).collect())
}

fn is_separator_row(row: &[String]) -> bool {
    !row.is_empty() && row.iter().all(|cell| cell.chars().all(|c| c == '-') && !cell.is_empty())
}

fn flush_lists(doc: &mut Document, bullets: &mut Vec<String>, numbered: &mut Vec<String>) {
    if !bullets.is_empty() {
        doc.add_bullet_list(std::mem::take(bullets));
    }
    if !numbered.is_empty() {
        doc.add_numbered_list(std::mem::take(numbered));
    }
}

fn flush_table(doc: &mut Document, rows: &mut Vec<Vec<String>>) {
    if rows.is_empty() {
        return;
    }
    let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut table = Table {
        rows: std::mem::take(rows),
    };
    for row in &mut table.rows {
        row.resize(cols, String::new());
    }
    doc.blocks.push(Block::Table(table));
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn demo_document() -> Document {
        let mut doc = Document::new();
        doc.add_heading("Weekly Exercise", 1).unwrap();
        doc.add_paragraph("First paragraph");
        doc.add_bullet_list(vec!["apple".into(), "orange".into()]);
        doc.add_numbered_list(vec!["spring".into(), "summer".into()]);
        let table = doc.add_table(2, 2).unwrap();
        table.set_cell(0, 0, "name").unwrap();
        table.set_cell(0, 1, "grade").unwrap();
        table.set_cell(1, 0, "Taro").unwrap();
        table.set_cell(1, 1, "2nd").unwrap();
        doc.add_image("logo", "input/logo.png");
        doc
    }

    #[test]
    fn test_markdown_rendering() {
        let markdown = demo_document().to_markdown();

        assert!(markdown.contains("# Weekly Exercise"));
        assert!(markdown.contains("- apple"));
        assert!(markdown.contains("1. spring"));
        assert!(markdown.contains("2. summer"));
        assert!(markdown.contains("| name | grade |"));
        assert!(markdown.contains("| --- | --- |"));
        assert!(markdown.contains("![logo](input/logo.png)"));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join("demo.md");
        let original = demo_document();
        original.save(&path).unwrap();

        let loaded = Document::load(&path).unwrap();
        assert_eq!(loaded.blocks(), original.blocks());
    }

    #[test]
    fn test_extract_text_order() {
        let texts = demo_document().extract_text();
        assert_eq!(texts, vec!["Weekly Exercise", "First paragraph"]);
    }

    #[test]
    fn test_heading_level_validated() {
        let mut doc = Document::new();
        assert!(matches!(
            doc.add_heading("bad", 7),
            Err(DocumentError::BadHeadingLevel(7))
        ));
    }

    #[test]
    fn test_cell_out_of_range() {
        let mut table = Table::new(2, 2).unwrap();
        assert!(matches!(
            table.set_cell(5, 0, "x"),
            Err(DocumentError::CellOutOfRange { row: 5, col: 0 })
        ));
    }

    #[test]
    fn test_placeholders_in_paragraph_and_table() {
        let mut doc = Document::new();
        doc.add_paragraph("Room: {use_room}");
        let table = doc.add_table(1, 2).unwrap();
        table.set_cell(0, 0, "{member_name_1}").unwrap();
        table.set_cell(0, 1, "untouched").unwrap();

        let mut map = PlaceholderMap::new();
        map.insert("{use_room}", "G1-205");
        map.insert("{member_name_1}", "Taro Yamada");

        let changed = doc.apply_placeholders(&map);
        assert_eq!(changed, 2);

        match &doc.blocks()[0] {
            Block::Paragraph(text) => assert_eq!(text, "Room: G1-205"),
            other => panic!("unexpected block: {other:?}"),
        }
        match &doc.blocks()[1] {
            Block::Table(table) => {
                assert_eq!(table.cell(0, 0), Some("Taro Yamada"));
                assert_eq!(table.cell(0, 1), Some("untouched"));
            }
            other => panic!("unexpected block: {other:?}"),
        }
    }

    #[test]
    fn test_placeholders_skip_headings() {
        let mut doc = Document::new();
        doc.add_heading("{use_room}", 1).unwrap();

        let mut map = PlaceholderMap::new();
        map.insert("{use_room}", "G1-205");

        assert_eq!(doc.apply_placeholders(&map), 0);
        assert_eq!(doc.extract_text(), vec!["{use_room}"]);
    }
}
