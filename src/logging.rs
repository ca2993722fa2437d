//! Logging setup for the binary.
//!
//! The terminal belongs to the TUI, so records go to a file. `RUST_LOG`
//! overrides the verbosity picked on the command line.

use std::fs::{self, OpenOptions};
use std::path::Path;

use env_logger::{Builder, Env, Target};

use crate::error::{Error, Result};

/// Filter for a `-v` count: 0=warn, 1=info, 2=debug, 3+=trace.
pub fn level_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Append log records to `log_file`, creating parent directories.
pub fn init_logging(verbosity: u8, log_file: &Path) -> Result<()> {
    if let Some(parent) = log_file.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)?;

    Builder::from_env(Env::default().default_filter_or(level_filter(verbosity)))
        .target(Target::Pipe(Box::new(file)))
        .try_init()
        .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))?;

    log::info!("logging to {}", log_file.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(level_filter(0), "warn");
        assert_eq!(level_filter(1), "info");
        assert_eq!(level_filter(2), "debug");
        assert_eq!(level_filter(9), "trace");
    }

    #[test]
    fn unwritable_log_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, b"x").unwrap();

        // a regular file cannot be a parent directory
        let result = init_logging(0, &blocker.join("clackr.log"));
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
