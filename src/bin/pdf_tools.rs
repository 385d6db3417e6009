//! Week 19: PDF chores.
//!
//! Three small jobs on the handout PDFs: report page count and document
//! info, split a PDF into one file per page, and merge every PDF in a
//! directory (sorted by file name) into one. As a bonus the first page of
//! the merged file is rotated a quarter turn.

use std::collections::BTreeMap;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use lopdf::{dictionary, Document, Object, ObjectId};
use thiserror::Error;
use tracing::{debug, info};

use deskwork::logging;

const INPUT_PDF: &str = "./input/handout.pdf";
const PARTS_DIR: &str = "./output/pdf_parts";
const MERGED_PDF: &str = "./output/merged.pdf";

#[derive(Debug, Error)]
enum PdfError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("{0} contains no pages")]
    NoPages(PathBuf),

    #[error("no PDF files found under {0}")]
    EmptyDirectory(PathBuf),

    #[error("page {0} does not exist")]
    PageNotFound(u32),
}

#[derive(Debug, Default, PartialEq, Eq)]
struct PdfMetadata {
    page_count: usize,
    title: Option<String>,
    author: Option<String>,
}

fn info_field(doc: &Document, key: &[u8]) -> Option<String> {
    let info_id = doc.trailer.get(b"Info").ok()?.as_reference().ok()?;
    let info = doc.get_dictionary(info_id).ok()?;
    match info.get(key).ok()? {
        Object::String(raw, _) => Some(String::from_utf8_lossy(raw).into_owned()),
        _ => None,
    }
}

/// Page count plus Title/Author from the document info dictionary.
fn read_metadata(doc: &Document) -> PdfMetadata {
    PdfMetadata {
        page_count: doc.get_pages().len(),
        title: info_field(doc, b"Title"),
        author: info_field(doc, b"Author"),
    }
}

/// Write each page of `input_pdf` to its own file under `parts_dir`,
/// named `<stem>_page_<n>.pdf`. Returns the written paths in page order.
fn split_pdf(input_pdf: &Path, parts_dir: &Path) -> Result<Vec<PathBuf>, PdfError> {
    let source = Document::load(input_pdf)?;
    let page_numbers: Vec<u32> = source.get_pages().keys().copied().collect();
    if page_numbers.is_empty() {
        return Err(PdfError::NoPages(input_pdf.to_path_buf()));
    }

    fs::create_dir_all(parts_dir)?;
    let stem = input_pdf
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());

    let mut written = Vec::new();
    for &keep in &page_numbers {
        let mut part = source.clone();
        let drop: Vec<u32> = page_numbers.iter().copied().filter(|&n| n != keep).collect();
        part.delete_pages(&drop);
        part.prune_objects();

        let target = parts_dir.join(format!("{stem}_page_{keep}.pdf"));
        part.save(&target)?;
        debug!("wrote {}", target.display());
        written.push(target);
    }
    info!("split {} into {} parts", input_pdf.display(), written.len());
    Ok(written)
}

/// The /Type name of a dictionary or stream object, if it has one.
fn structural_type(object: &Object) -> Option<&[u8]> {
    let dict = match object {
        Object::Dictionary(dict) => dict,
        Object::Stream(stream) => &stream.dict,
        _ => return None,
    };
    dict.get(b"Type").ok()?.as_name().ok()
}

/// Merge documents in order into a single new document.
fn merge_documents(documents: Vec<Document>) -> Result<Document, PdfError> {
    let mut max_id = 1;
    let mut all_pages: Vec<(ObjectId, Object)> = Vec::new();
    let mut all_objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

    for mut doc in documents {
        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        for (_, object_id) in doc.get_pages() {
            let page = doc.get_object(object_id)?.to_owned();
            all_pages.push((object_id, page));
        }
        all_objects.extend(doc.objects);
    }

    let mut merged = Document::with_version("1.5");

    // carry over everything except the structural nodes, which are rebuilt
    for (object_id, object) in all_objects {
        match structural_type(&object) {
            Some(b"Page") | Some(b"Pages") | Some(b"Catalog") | Some(b"Outlines") => {}
            _ => {
                merged.objects.insert(object_id, object);
            }
        }
    }

    let pages_id = (max_id, 0);
    for (object_id, object) in &all_pages {
        if let Object::Dictionary(dict) = object {
            let mut page = dict.clone();
            page.set("Parent", pages_id);
            merged.objects.insert(*object_id, Object::Dictionary(page));
        }
    }

    let kids: Vec<Object> = all_pages.iter().map(|(id, _)| Object::Reference(*id)).collect();
    merged.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => kids.len() as i64,
            "Kids" => kids,
        }),
    );

    let catalog_id = (max_id + 1, 0);
    merged.objects.insert(
        catalog_id,
        Object::Dictionary(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        }),
    );
    merged.trailer.set("Root", catalog_id);
    merged.max_id = max_id + 1;

    merged.renumber_objects();
    merged.compress();
    Ok(merged)
}

/// Merge every `.pdf` under `dir`, sorted by file name.
fn merge_directory(dir: &Path) -> Result<Document, PdfError> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "pdf"))
        .collect();
    paths.sort();

    if paths.is_empty() {
        return Err(PdfError::EmptyDirectory(dir.to_path_buf()));
    }

    let mut documents = Vec::with_capacity(paths.len());
    for path in &paths {
        debug!("merging {}", path.display());
        documents.push(Document::load(path)?);
    }
    let merged = merge_documents(documents)?;
    info!("merged {} files from {}", paths.len(), dir.display());
    Ok(merged)
}

/// Add a quarter turn to page `page_number`.
fn rotate_page(doc: &mut Document, page_number: u32) -> Result<(), PdfError> {
    let page_id = *doc
        .get_pages()
        .get(&page_number)
        .ok_or(PdfError::PageNotFound(page_number))?;
    let page = doc.get_object_mut(page_id)?.as_dict_mut()?;

    let current = page.get(b"Rotate").and_then(|o| o.as_i64()).unwrap_or(0);
    page.set("Rotate", (current + 90) % 360);
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    logging::setup();

    let input = Path::new(INPUT_PDF);
    let doc = Document::load(input)?;
    let metadata = read_metadata(&doc);
    println!("{}: {} pages", input.display(), metadata.page_count);
    println!("  title : {}", metadata.title.as_deref().unwrap_or("(none)"));
    println!("  author: {}", metadata.author.as_deref().unwrap_or("(none)"));

    let parts = split_pdf(input, Path::new(PARTS_DIR))?;
    println!("Split into {} parts under {PARTS_DIR}", parts.len());

    let mut merged = merge_directory(Path::new(PARTS_DIR))?;
    rotate_page(&mut merged, 1)?;
    if let Some(parent) = Path::new(MERGED_PDF).parent() {
        fs::create_dir_all(parent)?;
    }
    merged.save(MERGED_PDF)?;
    println!("Merged copy (page 1 rotated) written: {MERGED_PDF}");
    Ok(())
}
