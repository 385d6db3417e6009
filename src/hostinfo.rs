//! CPU and RAM readers for the dashboard exercise.
//!
//! Static facts (vendor, brand, core counts, memory totals) come from
//! `/proc` and `num_cpus`; dynamic facts are the usage percentages at call
//! time. Parsers take the text as input so tests can feed fixtures.

use std::fs;
use std::path::Path;

use regex::Regex;
use thiserror::Error;
use tracing::debug;

const CPUINFO_PATH: &str = "/proc/cpuinfo";
const MEMINFO_PATH: &str = "/proc/meminfo";

#[derive(Debug, Error)]
pub enum HostInfoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("field not found in {source_file}: {field}")]
    MissingField {
        source_file: &'static str,
        field: &'static str,
    },
}

/// Static CPU facts.
#[derive(Debug, Clone, PartialEq)]
pub struct CpuInfo {
    pub vendor: String,
    pub brand: String,
    pub machine_type: String,
    pub logical_cores: usize,
    pub physical_cores: usize,
}

/// Memory totals in GiB plus point-in-time usage.
#[derive(Debug, Clone, PartialEq)]
pub struct RamInfo {
    pub total_gib: f64,
    pub swap_total_gib: f64,
    pub used_percent: f64,
}

/// Round bytes to GiB with two decimals.
pub fn bytes_to_gib(bytes: u64) -> f64 {
    (bytes as f64 / (1024u64.pow(3) as f64) * 100.0).round() / 100.0
}

/// Read CPU facts from `/proc/cpuinfo`.
pub fn read_cpu_info() -> Result<CpuInfo, HostInfoError> {
    let text = fs::read_to_string(Path::new(CPUINFO_PATH))?;
    parse_cpu_info(&text)
}

pub fn parse_cpu_info(cpuinfo: &str) -> Result<CpuInfo, HostInfoError> {
    let vendor = first_field(cpuinfo, "vendor_id").ok_or(HostInfoError::MissingField {
        source_file: CPUINFO_PATH,
        field: "vendor_id",
    })?;
    let brand = first_field(cpuinfo, "model name").ok_or(HostInfoError::MissingField {
        source_file: CPUINFO_PATH,
        field: "model name",
    })?;

    let info = CpuInfo {
        vendor,
        brand,
        machine_type: std::env::consts::ARCH.to_string(),
        logical_cores: num_cpus::get(),
        physical_cores: num_cpus::get_physical(),
    };
    debug!("cpu info: {info:?}");
    Ok(info)
}

/// Read memory facts from `/proc/meminfo`.
pub fn read_ram_info() -> Result<RamInfo, HostInfoError> {
    let text = fs::read_to_string(Path::new(MEMINFO_PATH))?;
    parse_ram_info(&text)
}

pub fn parse_ram_info(meminfo: &str) -> Result<RamInfo, HostInfoError> {
    let total_kb = kb_field(meminfo, "MemTotal").ok_or(HostInfoError::MissingField {
        source_file: MEMINFO_PATH,
        field: "MemTotal",
    })?;
    let available_kb = kb_field(meminfo, "MemAvailable").ok_or(HostInfoError::MissingField {
        source_file: MEMINFO_PATH,
        field: "MemAvailable",
    })?;
    let swap_total_kb = kb_field(meminfo, "SwapTotal").unwrap_or(0);

    let used_kb = total_kb.saturating_sub(available_kb);
    let used_percent = if total_kb == 0 {
        0.0
    } else {
        (used_kb as f64 / total_kb as f64 * 1000.0).round() / 10.0
    };

    let info = RamInfo {
        total_gib: bytes_to_gib(total_kb * 1024),
        swap_total_gib: bytes_to_gib(swap_total_kb * 1024),
        used_percent,
    };
    debug!("ram info: {info:?}");
    Ok(info)
}

/// Ordered key/value rows for the dashboard sheet.
pub fn collect_static_info() -> Result<Vec<(String, String)>, HostInfoError> {
    let cpu = read_cpu_info()?;
    let ram = read_ram_info()?;

    Ok(vec![
        ("cpu_vendor".into(), cpu.vendor),
        ("cpu_brand".into(), cpu.brand),
        ("machine_type".into(), cpu.machine_type),
        ("logical_cores".into(), cpu.logical_cores.to_string()),
        ("physical_cores".into(), cpu.physical_cores.to_string()),
        ("ram_total_gib".into(), format!("{:.2}", ram.total_gib)),
        (
            "swap_total_gib".into(),
            format!("{:.2}", ram.swap_total_gib),
        ),
    ])
}

pub fn collect_dynamic_info() -> Result<Vec<(String, String)>, HostInfoError> {
    let ram = read_ram_info()?;
    Ok(vec![(
        "ram_used_percent".into(),
        format!("{:.1}", ram.used_percent),
    )])
}

fn first_field(text: &str, field: &str) -> Option<String> {
    // e.g. "model name\t: AMD Ryzen 7 5800X"
    let pattern = Regex::new(&format!(r"(?m)^{}\s*:\s*(.+)$", regex::escape(field))).ok()?;
    pattern
        .captures(text)
        .map(|caps| caps[1].trim().to_string())
}

fn kb_field(text: &str, field: &str) -> Option<u64> {
    let pattern = Regex::new(&format!(r"(?m)^{}:\s*(\d+)\s*kB", regex::escape(field))).ok()?;
    pattern.captures(text)?[1].parse().ok()
}
