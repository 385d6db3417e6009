//! Week 8: fill in the room-use application form.
//!
//! Copies the form template, asks for the member roster on the console,
//! builds the placeholder maps (dates, members, gender totals) and
//! substitutes them into the document's paragraphs and table cells.

use std::error::Error;
use std::fs;
use std::io::{BufRead, Write};
use std::path::Path;

use chrono::Local;
use deskwork::document::Document;
use deskwork::logging;
use deskwork::placeholder::{self, Member, PlaceholderMap, Roster, MAX_MEMBERS};
use deskwork::prompt;
use tracing::{error, info};

const TEMPLATE_DOC: &str = "./input/application_form_template.md";
const OUTPUT_DIR: &str = "./output";
const OUTPUT_DOC: &str = "application_form.md";

const ROOMS: [&str; 2] = ["G1-205", "D603"];

/// Ask for the roster on the console: headline fields, then one block of
/// questions per member.
fn ask_roster<R: BufRead, W: Write>(reader: &mut R, writer: &mut W) -> Result<Roster, Box<dyn Error>> {
    let total = loop {
        let n = prompt::input_int(reader, writer, &format!("How many members (max {MAX_MEMBERS})? "))?;
        if (1..=MAX_MEMBERS as i64).contains(&n) {
            break n as usize;
        }
        writeln!(writer, "Between 1 and {MAX_MEMBERS}, please.")?;
    };

    let phone = prompt::input_str(reader, writer, "Representative phone number: ")?;
    let room = prompt::input_menu(reader, writer, "Which room will you use?", &ROOMS)?;

    let mut members = Vec::with_capacity(total);
    for n in 1..=total {
        let id = prompt::input_str(reader, writer, &format!("Member {n} student id: "))?;
        let name = prompt::input_str(reader, writer, &format!("Member {n} name: "))?;
        let age = prompt::input_int(reader, writer, &format!("Member {n} age: "))?;
        let gender = prompt::input_menu(
            reader,
            writer,
            &format!("Member {n} gender:"),
            &["male", "female"],
        )?;
        members.push(Member {
            id,
            name,
            age: age.to_string(),
            gender,
        });
    }

    Ok(Roster {
        room,
        phone,
        members,
    })
}

/// Date map + roster map + gender totals, merged into one.
fn build_placeholders(roster: &Roster) -> PlaceholderMap {
    let mut map = placeholder::date_map(Local::now().date_naive());
    map.extend(placeholder::member_map(roster));
    placeholder::add_gender_totals(&mut map);
    map
}

/// Copy the template, run the substitution pass, save the result.
fn fill_form(template: &Path, output: &Path, map: &PlaceholderMap) -> Result<(), Box<dyn Error>> {
    if !template.exists() {
        error!("form template not found: {}", template.display());
        return Err(format!("template not found: {}", template.display()).into());
    }
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(template, output)?;
    info!("template copied: {} -> {}", template.display(), output.display());

    let mut document = Document::load(output)?;
    let changed = document.apply_placeholders(map);
    document.save(output)?;
    info!("form filled: {changed} blocks updated");
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    logging::setup();

    let mut stdin = std::io::stdin().lock();
    let mut stdout = std::io::stdout();
    let roster = ask_roster(&mut stdin, &mut stdout)?;
    let map = build_placeholders(&roster);

    let output_path = Path::new(OUTPUT_DIR).join(OUTPUT_DOC);
    fill_form(Path::new(TEMPLATE_DOC), &output_path, &map)?;

    println!("Saved the filled form: {}", output_path.display());
    Ok(())
}
