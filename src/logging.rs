//! Console + rotating-file logging setup shared by every exercise binary.
//!
//! Call [`setup`] once at the top of `main`. Repeat calls are no-ops, so
//! library tests and binaries can both call it freely.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use serde::Deserialize;
use tracing_subscriber::fmt::writer::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_MAX_BYTES: u64 = 10 * 1024 * 1024;
const DEFAULT_MAX_FILES: u32 = 5;
const CONFIG_PATH: &str = "config/logging.toml";

static INIT: OnceLock<()> = OnceLock::new();

/// Logging options, overridable from `config/logging.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub path: PathBuf,
    pub max_bytes: u64,
    pub max_files: u32,
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("deskwork.log"),
            max_bytes: DEFAULT_MAX_BYTES,
            max_files: DEFAULT_MAX_FILES,
            level: "info".to_string(),
        }
    }
}

impl LogConfig {
    /// Read the config file, falling back to defaults when it is missing
    /// or malformed. A broken logging config must never stop an exercise.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(text) => toml::from_str(&text).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }
}

/// Size-based rotation by rename: `app.log` -> `app.log.1` -> `app.log.2` ...
/// The oldest file past `max_files` falls off the end.
pub fn rotate_if_needed(path: &Path, max_bytes: u64, max_files: u32) -> io::Result<()> {
    if !path.exists() {
        return Ok(());
    }
    if fs::metadata(path)?.len() < max_bytes {
        return Ok(());
    }

    for idx in (1..max_files).rev() {
        let src = rotated_path(path, idx);
        let dst = rotated_path(path, idx + 1);
        if src.exists() {
            let _ = fs::rename(&src, &dst);
        }
    }
    let _ = fs::rename(path, rotated_path(path, 1));
    Ok(())
}

fn rotated_path(path: &Path, idx: u32) -> PathBuf {
    PathBuf::from(format!("{}.{}", path.display(), idx))
}

/// Append-only writer that rotates before each write.
///
/// Opening the file per write is deliberate: these are short-lived teaching
/// binaries, and it keeps the writer trivially shareable between layers.
#[derive(Clone)]
pub struct RotatingWriter {
    inner: Arc<Mutex<RotatingTarget>>,
}

struct RotatingTarget {
    path: PathBuf,
    max_bytes: u64,
    max_files: u32,
}

impl RotatingWriter {
    pub fn new(path: PathBuf, max_bytes: u64, max_files: u32) -> Self {
        Self {
            inner: Arc::new(Mutex::new(RotatingTarget {
                path,
                max_bytes,
                max_files,
            })),
        }
    }
}

impl Write for RotatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let target = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer lock poisoned"))?;
        rotate_if_needed(&target.path, target.max_bytes, target.max_files)?;
        if let Some(parent) = target.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&target.path)?;
        file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for RotatingWriter {
    type Writer = RotatingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Initialize tracing with the defaults from `config/logging.toml`.
pub fn setup() {
    setup_with(LogConfig::load(Path::new(CONFIG_PATH)));
}

/// Initialize tracing: console layer plus a rotating file layer.
///
/// Level comes from `DESKWORK_LOG` when set, otherwise from the config.
/// Safe to call multiple times; only the first call installs a subscriber.
pub fn setup_with(config: LogConfig) {
    if INIT.get().is_some() {
        return;
    }

    let filter = EnvFilter::try_from_env("DESKWORK_LOG")
        .unwrap_or_else(|_| EnvFilter::new(config.level.clone()));

    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(io::stderr);
    let file_writer = RotatingWriter::new(config.path, config.max_bytes, config.max_files);
    let file = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(file_writer);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init();
    let _ = INIT.set(());
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_rotate_skips_small_file() {
        let dir = tempdir().unwrap();
        let log = dir.path().join("app.log");
        fs::write(&log, "tiny").unwrap();

        rotate_if_needed(&log, 1024, 3).unwrap();

        assert!(log.exists());
        assert!(!rotated_path(&log, 1).exists());
    }

    #[test]
    fn test_rotate_renames_full_file() {
        let dir = tempdir().unwrap();
        let log = dir.path().join("app.log");
        fs::write(&log, "0123456789").unwrap();

        rotate_if_needed(&log, 5, 3).unwrap();

        assert!(!log.exists());
        assert_eq!(fs::read_to_string(rotated_path(&log, 1)).unwrap(), "0123456789");
    }

    #[test]
    fn test_rotate_shifts_chain() {
        let dir = tempdir().unwrap();
        let log = dir.path().join("app.log");
        fs::write(&log, "current!!").unwrap();
        fs::write(rotated_path(&log, 1), "older").unwrap();
        fs::write(rotated_path(&log, 2), "oldest").unwrap();

        rotate_if_needed(&log, 5, 3).unwrap();

        assert_eq!(fs::read_to_string(rotated_path(&log, 1)).unwrap(), "current!!");
        assert_eq!(fs::read_to_string(rotated_path(&log, 2)).unwrap(), "older");
        assert_eq!(fs::read_to_string(rotated_path(&log, 3)).unwrap(), "oldest");
    }

    #[test]
    fn test_rotating_writer_appends() {
        let dir = tempdir().unwrap();
        let log = dir.path().join("app.log");
        let mut writer = RotatingWriter::new(log.clone(), 1024, 3);

        writer.write_all(b"first\n").unwrap();
        writer.write_all(b"second\n").unwrap();

        assert_eq!(fs::read_to_string(&log).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn test_config_defaults_when_missing() {
        let config = LogConfig::load(Path::new("does/not/exist.toml"));
        assert_eq!(config.max_files, DEFAULT_MAX_FILES);
        assert_eq!(config.level, "info");
    }

    #[test]
    fn test_config_parses_overrides() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logging.toml");
        fs::write(&path, "level = \"debug\"\nmax_files = 9\n").unwrap();

        let config = LogConfig::load(&path);
        assert_eq!(config.level, "debug");
        assert_eq!(config.max_files, 9);
        assert_eq!(config.max_bytes, DEFAULT_MAX_BYTES);
    }
}
