use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{Error, Result};

pub const DEFAULT_LOG_FILE: &str = "flappy-pinch.log";

/// The game owns the terminal, so logs go to a file instead.
pub fn default_log_path() -> PathBuf {
    std::env::temp_dir().join(DEFAULT_LOG_FILE)
}

fn open_log(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(Error::from)
}

/// Install the global subscriber, appending to `path`. Filtered by
/// `RUST_LOG`, `info` when unset.
pub fn init(path: &Path) -> Result<()> {
    let file = open_log(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_thread_names(true),
        )
        .init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_path_is_in_temp_dir() {
        let path = default_log_path();
        assert!(path.starts_with(std::env::temp_dir()));
        assert!(path.ends_with(DEFAULT_LOG_FILE));
    }

    #[test]
    fn open_log_appends() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.log");
        writeln!(open_log(&path).unwrap(), "one").unwrap();
        writeln!(open_log(&path).unwrap(), "two").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn open_log_reports_bad_path() {
        let err = open_log(Path::new("/no/such/dir/game.log")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
