//! Week 13: push this machine's CPU/RAM profile onto the VM dashboard.
//!
//! Copies the dashboard template to a sheet named `user@host` and writes
//! the merged static info down column C, one entry every other row.

use std::env;
use std::error::Error;
use std::path::{Path, PathBuf};

use tracing::info;

use deskwork::hostinfo;
use deskwork::logging;
use deskwork::worksheet::{copy_template, Worksheet};

const TEMPLATE_SHEET: &str = "./input/vm_dashboard_template.csv";
const OUTPUT_DIR: &str = "./output";
const FIRST_ROW: usize = 5;
const ROW_STEP: usize = 2;

/// Login name and host name, from the environment with quiet fallbacks.
fn read_user_and_host() -> (String, String) {
    let user = env::var("USER")
        .or_else(|_| env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());
    let host = env::var("HOSTNAME").unwrap_or_else(|_| "localhost".to_string());
    (user, host)
}

/// User/host rows first, then the CPU and RAM facts.
fn merge_static_info() -> Result<Vec<(String, String)>, Box<dyn Error>> {
    let (user, host) = read_user_and_host();
    let mut merged = vec![
        ("user".to_string(), user),
        ("host".to_string(), host),
    ];
    merged.extend(hostinfo::collect_static_info()?);
    info!("merged static info: {} entries", merged.len());
    Ok(merged)
}

/// Values go down column C at rows 5, 7, 9, ... with their labels in B.
fn insert_static_info(
    ws: &mut Worksheet,
    entries: &[(String, String)],
) -> Result<(), Box<dyn Error>> {
    let mut row = FIRST_ROW;
    for (label, value) in entries {
        ws.set_cell(&format!("B{row}"), label.clone())?;
        ws.set_cell(&format!("C{row}"), value.clone())?;
        row += ROW_STEP;
    }
    Ok(())
}

fn update_dashboard(
    template: &Path,
    output_dir: &Path,
    entries: &[(String, String)],
) -> Result<PathBuf, Box<dyn Error>> {
    let user = entries
        .iter()
        .find(|(label, _)| label == "user")
        .map(|(_, v)| v.as_str())
        .unwrap_or("unknown");
    let host = entries
        .iter()
        .find(|(label, _)| label == "host")
        .map(|(_, v)| v.as_str())
        .unwrap_or("localhost");

    let sheet_path = output_dir.join(format!("{user}@{host}.csv"));
    copy_template(template, &sheet_path)?;

    let mut ws = Worksheet::load(&sheet_path)?;
    insert_static_info(&mut ws, entries)?;
    ws.save(&sheet_path)?;

    info!("dashboard sheet updated: {}", sheet_path.display());
    Ok(sheet_path)
}

fn main() -> Result<(), Box<dyn Error>> {
    logging::setup();

    let entries = merge_static_info()?;
    for (label, value) in &entries {
        println!("{label:>16}: {value}");
    }

    let sheet = update_dashboard(Path::new(TEMPLATE_SHEET), Path::new(OUTPUT_DIR), &entries)?;
    println!("Dashboard sheet written: {}", sheet.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn sample_entries() -> Vec<(String, String)> {
        vec![
            ("user".to_string(), "kai".to_string()),
            ("host".to_string(), "vm01".to_string()),
            ("cpu_brand".to_string(), "TestCPU 3000".to_string()),
            ("ram_total_gib".to_string(), "15.63".to_string()),
        ]
    }

    #[test]
    fn test_insert_layout_skips_every_other_row() {
        let mut ws = Worksheet::new();
        insert_static_info(&mut ws, &sample_entries()).unwrap();

        assert_eq!(ws.cell("B5").unwrap(), "user");
        assert_eq!(ws.cell("C5").unwrap(), "kai");
        assert_eq!(ws.cell("C7").unwrap(), "vm01");
        assert_eq!(ws.cell("C9").unwrap(), "TestCPU 3000");
        assert_eq!(ws.cell("C11").unwrap(), "15.63");
        assert_eq!(ws.cell("C6").unwrap(), "");
    }

    #[test]
    fn test_update_dashboard_names_sheet_after_user_and_host() {
        let dir = tempdir().unwrap();
        let template = dir.path().join("template.csv");
        fs::write(&template, "VM Dashboard\n").unwrap();

        let sheet = update_dashboard(&template, dir.path(), &sample_entries()).unwrap();

        assert_eq!(sheet.file_name().unwrap(), "kai@vm01.csv");
        let ws = Worksheet::load(&sheet).unwrap();
        assert_eq!(ws.cell("A1").unwrap(), "VM Dashboard");
        assert_eq!(ws.cell("C9").unwrap(), "TestCPU 3000");
    }

    #[test]
    fn test_user_and_host_have_fallbacks() {
        let (user, host) = read_user_and_host();
        assert!(!user.is_empty());
        assert!(!host.is_empty());
    }
}
