//! Timestamped directory snapshots with a checksum manifest.
//!
//! Several exercises finish by archiving their output directory. The
//! snapshot copies every file into `snapshot_YYYYMMDD_HHMMSS/` and writes a
//! `MANIFEST.txt` of SHA-256 checksums so a snapshot can be verified later.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

pub const MANIFEST_NAME: &str = "MANIFEST.txt";

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("snapshot source not found: {0}")]
    SourceNotFound(String),
}

/// Copy `data_dir` into a fresh timestamped directory under
/// `snapshot_root` and write the manifest. Returns the snapshot path.
pub fn make_snapshot(data_dir: &Path, snapshot_root: &Path) -> Result<PathBuf, SnapshotError> {
    if !data_dir.is_dir() {
        return Err(SnapshotError::SourceNotFound(
            data_dir.display().to_string(),
        ));
    }

    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    let snapshot_dir = snapshot_root.join(format!("snapshot_{stamp}"));
    fs::create_dir_all(&snapshot_dir)?;
    info!("creating snapshot: {}", snapshot_dir.display());

    let mut manifest = String::new();
    for entry in WalkDir::new(data_dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(data_dir)
            .expect("walkdir stays under data_dir");
        let destination = snapshot_dir.join(relative);
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(entry.path(), &destination)?;

        let digest = file_sha256(entry.path())?;
        manifest.push_str(&format!("{digest}  {}\n", relative.display()));
        debug!("archived {}", relative.display());
    }

    fs::write(snapshot_dir.join(MANIFEST_NAME), manifest)?;
    info!("snapshot complete: {}", snapshot_dir.display());
    Ok(snapshot_dir)
}

/// Hex SHA-256 of a file's contents.
pub fn file_sha256(path: &Path) -> Result<String, SnapshotError> {
    let bytes = fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let digest = hasher.finalize();
    Ok(digest.iter().map(|b| format!("{b:02x}")).collect())
}

/// Re-hash every manifest entry; returns the relative paths that no longer
/// match (missing or changed files).
pub fn verify_snapshot(snapshot_dir: &Path) -> Result<Vec<String>, SnapshotError> {
    let manifest = fs::read_to_string(snapshot_dir.join(MANIFEST_NAME))?;
    let mut mismatches = Vec::new();

    for line in manifest.lines() {
        let Some((expected, relative)) = line.split_once("  ") else {
            continue;
        };
        let path = snapshot_dir.join(relative);
        match file_sha256(&path) {
            Ok(actual) if actual == expected => {}
            _ => mismatches.push(relative.to_string()),
        }
    }

    Ok(mismatches)
}
