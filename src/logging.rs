use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

pub fn log_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("buzzread")
}

fn open_log(dir: &Path) -> Result<(PathBuf, File)> {
    fs::create_dir_all(dir).with_context(|| format!("creating log dir {}", dir.display()))?;
    let path = dir.join("buzzread.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    Ok((path, file))
}

/// Install the global subscriber, writing to a file since the terminal
/// belongs to the TUI. `RUST_LOG` takes precedence over `level`.
pub fn init(level: &str) -> Result<PathBuf> {
    let (path, file) = open_log(&log_dir())?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("buzzread={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing log subscriber: {e}"))?;

    tracing::info!(path = %path.display(), "logging started");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_log_creates_dir_and_appends() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let (path, _) = open_log(&nested).unwrap();
        assert!(path.exists());
        fs::write(&path, "one\n").unwrap();
        let (_, mut file) = open_log(&nested).unwrap();
        std::io::Write::write_all(&mut file, b"two\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    }
}
