//! Week 11: fill in the internship training report sheets.
//!
//! Loads the 3-day and 5-day report templates (one CSV sheet per format),
//! writes the info cells and the day-by-day schedule taken from the
//! delimiter-separated data files, saves the results and snapshots the
//! output directory.

use std::error::Error;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use deskwork::dates;
use deskwork::logging;
use deskwork::sections;
use deskwork::snapshot;
use deskwork::worksheet::{copy_template, Worksheet};
use tracing::info;

const INPUT_DIR: &str = "./input";
const OUTPUT_DIR: &str = "./output";
const SNAPSHOT_DIR: &str = "./snapshots";

const DEPARTMENT: &str = "Management Systems Engineering";
const COMPANY: &str = "XXX Co., Ltd.";
const SITE: &str = "Yurihonjo Office";
const STUDENT_NAME: &str = "Kai Yoshida";
const STUDENT_ADDRESS: &str = "84-4 Ebinokuchi, Tsuchiya";

/// Column E holds the left info block, column W the right one; entries go
/// down every other row starting at row 3.
fn insert_training_info(
    ws: &mut Worksheet,
    base_date: NaiveDate,
    days_delta: i64,
) -> Result<(), Box<dyn Error>> {
    let e_column = [
        DEPARTMENT.to_string(),
        COMPANY.to_string(),
        SITE.to_string(),
        dates::training_period(base_date, days_delta),
    ];
    let w_column = [STUDENT_NAME.to_string(), STUDENT_ADDRESS.to_string()];

    let mut row = 3;
    for value in &e_column {
        ws.set_cell(&format!("E{row}"), value.clone())?;
        row += 2;
    }
    let mut row = 3;
    for value in &w_column {
        ws.set_cell(&format!("W{row}"), value.clone())?;
        row += 2;
    }
    Ok(())
}

/// Schedule block: one row per day with date, activity and comment in
/// columns B, C and D starting at row 12.
fn insert_schedule(
    ws: &mut Worksheet,
    date_list: &[String],
    contents: &[String],
    comments: &[String],
) -> Result<(), Box<dyn Error>> {
    if date_list.len() != contents.len() || contents.len() != comments.len() {
        return Err(format!(
            "schedule lists disagree: {} dates, {} contents, {} comments",
            date_list.len(),
            contents.len(),
            comments.len()
        )
        .into());
    }

    for (i, ((date, content), comment)) in date_list
        .iter()
        .zip(contents.iter())
        .zip(comments.iter())
        .enumerate()
    {
        let row = 12 + i;
        ws.set_cell(&format!("B{row}"), date.clone())?;
        ws.set_cell(&format!("C{row}"), content.clone())?;
        ws.set_cell(&format!("D{row}"), comment.clone())?;
    }
    Ok(())
}

/// The short report only fills the info block.
fn make_three_day_report(save_dir: &Path, base_date: NaiveDate) -> Result<PathBuf, Box<dyn Error>> {
    let template = Path::new(INPUT_DIR).join("training_report_3day_format.csv");
    let save_path = save_dir.join("training_report_3day.csv");
    copy_template(&template, &save_path)?;

    let mut ws = Worksheet::load(&save_path)?;
    insert_training_info(&mut ws, base_date, 3)?;
    ws.save(&save_path)?;

    info!("3-day report written: {}", save_path.display());
    Ok(save_path)
}

/// The full report adds the schedule, the summary and the message cells.
fn make_five_day_report(
    save_dir: &Path,
    txt_path: &Path,
    base_date: NaiveDate,
) -> Result<PathBuf, Box<dyn Error>> {
    let template = Path::new(INPUT_DIR).join("training_report_5day_format.csv");
    let save_path = save_dir.join("training_report_5day.csv");
    copy_template(&template, &save_path)?;

    let mut ws = Worksheet::load(&save_path)?;
    insert_training_info(&mut ws, base_date, 5)?;

    let day_labels = dates::date_list(base_date - chrono::Duration::days(4), 5);
    let (contents, comments) = sections::read_sections(txt_path, 5)?;
    insert_schedule(&mut ws, &day_labels, &contents, &comments)?;

    let summary = "Five days of shadowing the development flow and basic \
testing work. The emphasis on readability and maintainability was a surprise \
compared to lecture programming.";
    let message = "Ask questions early; the engineers expect students not to \
know things, and the office atmosphere is something you only get on site.";
    ws.set_cell("C20", summary)?;
    ws.set_cell("C22", message)?;
    ws.save(&save_path)?;

    info!("5-day report written: {}", save_path.display());
    Ok(save_path)
}

fn main() -> Result<(), Box<dyn Error>> {
    logging::setup();

    let save_dir = Path::new(OUTPUT_DIR);
    std::fs::create_dir_all(save_dir)?;

    let base_date = Local::now().date_naive();
    make_three_day_report(save_dir, base_date)?;

    let txt_path = Path::new(INPUT_DIR).join("report_data_5day.txt");
    make_five_day_report(save_dir, &txt_path, base_date)?;

    let snapshot_dir = snapshot::make_snapshot(save_dir, Path::new(SNAPSHOT_DIR))?;
    println!("Reports saved; snapshot at {}", snapshot_dir.display());
    Ok(())
}
