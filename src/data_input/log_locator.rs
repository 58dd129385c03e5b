// src/data_input/log_locator.rs

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use log::debug;

use crate::constants::LOG_FILE_EXTENSION;
use crate::data_input::error::{Error, Result};

/// Which filesystem timestamp decides "latest".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SelectionPolicy {
    /// Creation time, falling back to modification time where the platform
    /// does not record it.
    #[default]
    Created,
    Modified,
}

impl SelectionPolicy {
    fn timestamp(self, path: &Path) -> Result<SystemTime> {
        let metadata = fs::metadata(path)?;
        let t = match self {
            SelectionPolicy::Created => metadata.created().or_else(|_| metadata.modified())?,
            SelectionPolicy::Modified => metadata.modified()?,
        };
        Ok(t)
    }
}

/// Picks the latest entry under `policy`. Among equal maxima the last one
/// listed wins; listing order is platform-defined.
fn latest_by(entries: Vec<PathBuf>, policy: SelectionPolicy) -> Result<Option<PathBuf>> {
    let mut best: Option<(SystemTime, PathBuf)> = None;
    for path in entries {
        let t = policy.timestamp(&path)?;
        match &best {
            Some((best_t, _)) if t < *best_t => {}
            _ => best = Some((t, path)),
        }
    }
    Ok(best.map(|(_, p)| p))
}

/// Latest subdirectory of `root`.
pub fn find_latest_run_dir(root: &Path, policy: SelectionPolicy) -> Result<PathBuf> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(root)? {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    debug!("{} run directories under '{}'", dirs.len(), root.display());
    latest_by(dirs, policy)?.ok_or_else(|| Error::NoRunDirectory(root.to_path_buf()))
}

/// Latest `.ulg` file directly inside `dir`.
pub fn find_latest_log_file(dir: &Path, policy: SelectionPolicy) -> Result<PathBuf> {
    let mut logs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_log = path.is_file()
            && path.extension().and_then(|e| e.to_str()) == Some(LOG_FILE_EXTENSION);
        if is_log {
            logs.push(path);
        }
    }
    debug!("{} log files in '{}'", logs.len(), dir.display());
    latest_by(logs, policy)?.ok_or_else(|| Error::NoLogFile(dir.to_path_buf()))
}

/// Newest log of the newest run below `root` (`<root>/<run>/*.ulg`).
pub fn find_latest_log(root: &Path, policy: SelectionPolicy) -> Result<PathBuf> {
    let run_dir = find_latest_run_dir(root, policy)?;
    find_latest_log_file(&run_dir, policy)
}
