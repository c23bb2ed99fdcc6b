//! Platform data directory and home-relative path helpers.

use std::env::consts::OS;
use std::env::var;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const APP_NAME: &str = "hours";

/// Platform data directory for hours' own files (configuration).
#[derive(Clone, Debug)]
pub struct DataStorage {
    base_path: PathBuf,
}

impl Default for DataStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl DataStorage {
    pub fn new() -> Self {
        let base_path = match OS {
            "windows" => var("LOCALAPPDATA").unwrap_or_else(|_| ".".into()),
            "macos" => home_dir_string() + "/Library/Application Support",
            _ => home_dir_string() + "/.local/share",
        };
        let base_path = Path::new(&base_path).join(APP_NAME);

        Self { base_path }
    }

    /// Path of `file_name` inside the data directory, creating the directory if needed.
    pub fn get_path(&self, file_name: &str) -> io::Result<PathBuf> {
        if !self.base_path.exists() {
            fs::create_dir_all(&self.base_path)?;
        }
        Ok(self.base_path.join(file_name))
    }
}

fn home_dir_string() -> String {
    var("HOME").unwrap_or_else(|_| ".".into())
}

/// The process owner's home directory, `.` when unknown.
pub fn home_dir() -> PathBuf {
    let home = match OS {
        "windows" => var("USERPROFILE").or_else(|_| var("HOME")),
        _ => var("HOME"),
    };
    PathBuf::from(home.unwrap_or_else(|_| ".".into()))
}

/// Expands a leading `~/` against `home`.
pub fn expand_tilde(path: &str, home: &Path) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => home.join(rest),
        None if path == "~" => home.to_path_buf(),
        None => PathBuf::from(path),
    }
}
