//! Week 9: build a document with headings, lists, a table and an image,
//! save it under ./output, then read it back and print its text.

use std::error::Error;
use std::path::Path;

use colored::Colorize;
use deskwork::document::Document;
use deskwork::logging;
use tracing::info;

const OUTPUT_DIR: &str = "./output";
const OUTPUT_DOC: &str = "output.md";
const INPUT_IMAGE: &str = "./input/rust_logo.png";

/// Assemble the demo document: one of every block type.
fn build_demo_document() -> Result<Document, Box<dyn Error>> {
    let mut doc = Document::new();

    doc.add_heading("Programming Exercises 2", 1)?;
    doc.add_paragraph("The first paragraph.");
    doc.add_paragraph("This exercise writes every block type into one document.");

    doc.add_bullet_list(vec!["apple".into(), "orange".into(), "banana".into()]);
    doc.add_numbered_list(vec![
        "spring".into(),
        "summer".into(),
        "autumn".into(),
        "winter".into(),
    ]);

    // 4 rows x 3 cols with a header row, same shape as the roster handout
    let table = doc.add_table(4, 3)?;
    let header = ["name", "grade", "mail address"];
    for (col, text) in header.iter().enumerate() {
        table.set_cell(0, col, *text)?;
    }
    let body = [
        ["Taro Yamada", "2nd", "taro@example.ac.jp"],
        ["Hanako Sato", "3rd", "hanako@example.ac.jp"],
        ["Ichiro Suzuki", "1st", "ichiro@example.ac.jp"],
    ];
    for (i, row) in body.iter().enumerate() {
        for (j, value) in row.iter().enumerate() {
            table.set_cell(i + 1, j, *value)?;
        }
    }

    doc.add_paragraph("An image goes below.");
    doc.add_image("rust logo", INPUT_IMAGE);

    Ok(doc)
}

fn main() -> Result<(), Box<dyn Error>> {
    logging::setup();

    let output_path = Path::new(OUTPUT_DIR).join(OUTPUT_DOC);
    let document = build_demo_document()?;
    document.save(&output_path)?;
    info!("document written: {}", output_path.display());

    // Read the file back and show its text, like the extraction exercise.
    let loaded = Document::load(&output_path)?;
    println!("{}", format!("--- text of {} ---", output_path.display()).bold());
    for line in loaded.extract_text() {
        println!("{line}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use deskwork::document::Block;
    use tempfile::tempdir;

    #[test]
    fn test_demo_document_has_all_block_types() {
        let doc = build_demo_document().unwrap();
        let blocks = doc.blocks();

        assert!(blocks.iter().any(|b| matches!(b, Block::Heading { .. })));
        assert!(blocks.iter().any(|b| matches!(b, Block::BulletList(_))));
        assert!(blocks.iter().any(|b| matches!(b, Block::NumberedList(_))));
        assert!(blocks.iter().any(|b| matches!(b, Block::Table(_))));
        assert!(blocks.iter().any(|b| matches!(b, Block::Image { .. })));
    }

    #[test]
    fn test_table_header_row() {
        let doc = build_demo_document().unwrap();
        let table = doc
            .blocks()
            .iter()
            .find_map(|b| match b {
                Block::Table(table) => Some(table),
                _ => None,
            })
            .unwrap();

        assert_eq!(table.rows(), 4);
        assert_eq!(table.cell(0, 0), Some("name"));
        assert_eq!(table.cell(3, 2), Some("ichiro@example.ac.jp"));
    }

    #[test]
    fn test_saved_text_is_extractable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("demo.md");
        build_demo_document().unwrap().save(&path).unwrap();

        let texts = Document::load(&path).unwrap().extract_text();
        assert_eq!(texts[0], "Programming Exercises 2");
        assert!(texts.contains(&"An image goes below.".to_string()));
    }
}
