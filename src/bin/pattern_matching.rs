//! Week 6: regular expressions.
//!
//! Part 1 demonstrates first-match / all-matches / masked substitution on
//! sample texts; part 2 scans a long text file and saves the mail
//! addresses and phone numbers it finds.

use std::error::Error;
use std::fs;
use std::path::Path;

use colored::Colorize;
use regex::Regex;
use tracing::info;

use deskwork::logging;

const DATE_PATTERN: &str = r"(20\d{2})/(0[1-9]|1[0-2])/(0[1-9]|[12]\d|3[01])";
const TIME_PATTERN: &str = r"([01]\d|2[0-3]):([0-5]\d)";
const MAIL_PATTERN: &str = r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}";
const PHONE_PATTERN: &str = r"0\d{1,4}-?\d{1,4}-?\d{4}";

const INPUT_TXT: &str = "./input/long_text.txt";
const OUTPUT_DIR: &str = "./output";
const OUTPUT_TXT: &str = "contacts.txt";
const MASK: &str = "*MASK*";

// =============================================================================
// Part 1: pattern demo
// =============================================================================

/// Show the three basic operations for one pattern against one text.
fn detect_pattern(regex: &Regex, text: &str, mask: &str) {
    println!("{}", "--- first match ---".bold());
    if let Some(found) = regex.find(text) {
        println!("find(): {}", found.as_str());
    } else {
        println!("find(): no match");
    }

    let all: Vec<&str> = regex.find_iter(text).map(|m| m.as_str()).collect();
    println!("{}", "--- all matches ---".bold());
    println!("find_iter(): {all:?}");

    let masked = regex.replace_all(text, mask);
    println!("{}", "--- substitution ---".bold());
    println!("replace_all(): {text} -> {masked}");
}

fn run_demo() -> Result<(), Box<dyn Error>> {
    let samples = [
        ("date", DATE_PATTERN, "Today is 2025/09/11. Tomorrow is 2025/09/12."),
        ("time", TIME_PATTERN, "Snack time is at 15:00."),
        ("mail", MAIL_PATTERN, "Send it to taro@example.ac.jp please."),
        ("phone", PHONE_PATTERN, "Call 010-2345-6789 for details."),
    ];

    for (label, pattern, text) in samples {
        println!("\n{}", format!("=== {label} check ===").bold());
        let regex = Regex::new(pattern)?;
        detect_pattern(&regex, text, MASK);
    }
    Ok(())
}

// =============================================================================
// Part 2: extract and save contacts
// =============================================================================

/// All non-overlapping matches of `pattern` in `text`.
fn find_all(pattern: &str, text: &str) -> Result<Vec<String>, Box<dyn Error>> {
    let regex = Regex::new(pattern)?;
    Ok(regex.find_iter(text).map(|m| m.as_str().to_string()).collect())
}

/// Write mails first, then phones, one per line.
fn save_contacts(
    output_txt: &Path,
    mails: &[String],
    phones: &[String],
) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = output_txt.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut body = String::new();
    for mail in mails {
        body.push_str(mail);
        body.push('\n');
    }
    for phone in phones {
        body.push_str(phone);
        body.push('\n');
    }
    fs::write(output_txt, body)?;
    info!(
        "saved {} mails and {} phones to {}",
        mails.len(),
        phones.len(),
        output_txt.display()
    );
    Ok(())
}

fn extract_and_save(input_txt: &Path, output_txt: &Path) -> Result<(), Box<dyn Error>> {
    let text = fs::read_to_string(input_txt)?;
    let mails = find_all(MAIL_PATTERN, &text)?;
    let phones = find_all(PHONE_PATTERN, &text)?;
    save_contacts(output_txt, &mails, &phones)
}

fn main() -> Result<(), Box<dyn Error>> {
    logging::setup();

    run_demo()?;

    let output_path = Path::new(OUTPUT_DIR).join(OUTPUT_TXT);
    extract_and_save(Path::new(INPUT_TXT), &output_path)?;
    println!("\nSaved extracted contacts: {}", output_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn test_date_pattern_bounds() {
        let regex = Regex::new(DATE_PATTERN).unwrap();
        assert!(regex.is_match("2025/09/11"));
        assert!(regex.is_match("2031/12/31"));
        assert!(!regex.is_match("2025/13/01"));
        assert!(!regex.is_match("2025/00/10"));
        assert!(!regex.is_match("1999/09/11"));
    }

    #[test]
    fn test_time_pattern_bounds() {
        let regex = Regex::new(TIME_PATTERN).unwrap();
        assert!(regex.is_match("00:00"));
        assert!(regex.is_match("23:59"));
        assert!(!regex.is_match("24:00"));
    }

    #[test]
    fn test_mail_extraction() {
        let found = find_all(MAIL_PATTERN, "a: taro@example.ac.jp, b: hana.ko@mail.example.com").unwrap();
        assert_eq!(found, vec!["taro@example.ac.jp", "hana.ko@mail.example.com"]);
    }

    #[test]
    fn test_phone_extraction_variants() {
        let found = find_all(PHONE_PATTERN, "010-2345-6789 or 0123456789").unwrap();
        assert_eq!(found, vec!["010-2345-6789", "0123456789"]);
    }

    #[test]
    fn test_extract_and_save_layout() {
        let mut input = NamedTempFile::new().unwrap();
        write!(
            input,
            "Contact taro@example.ac.jp or 010-2345-6789.\nAlso hana@example.com."
        )
        .unwrap();

        let dir = tempdir().unwrap();
        let out = dir.path().join("contacts.txt");
        extract_and_save(input.path(), &out).unwrap();

        let saved = fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = saved.lines().collect();
        // mails first, then phones
        assert_eq!(
            lines,
            vec!["taro@example.ac.jp", "hana@example.com", "010-2345-6789"]
        );
    }

    #[test]
    fn test_no_matches_writes_empty_file() {
        let mut input = NamedTempFile::new().unwrap();
        write!(input, "nothing to find here").unwrap();

        let dir = tempdir().unwrap();
        let out = dir.path().join("contacts.txt");
        extract_and_save(input.path(), &out).unwrap();

        assert_eq!(fs::read_to_string(&out).unwrap(), "");
    }
}
