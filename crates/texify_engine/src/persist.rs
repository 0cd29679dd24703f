use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::Builder;
use texify_logging::texify_debug;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PersistError {
    #[error("download directory unusable: {0}")]
    OutputDir(String),
    #[error("invalid file name '{0}'")]
    InvalidName(String),
    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for PersistError {
    fn from(err: std::io::Error) -> Self {
        PersistError::Io(err.to_string())
    }
}

/// Creates `dir` when missing; fails when it exists but is not a directory.
pub fn ensure_download_dir(dir: &Path) -> Result<(), PersistError> {
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(PersistError::OutputDir(format!(
            "{} is not a directory",
            dir.display()
        ))),
        Err(_) => fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string())),
    }
}

/// Saves downloaded artifacts into one directory.
///
/// Each save goes through a hidden temp file in the same directory and is
/// renamed into place, so readers never observe a half-written `.tex` or
/// `.pdf`. A save under an existing name replaces it.
pub struct DownloadWriter {
    dir: PathBuf,
}

impl DownloadWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, PersistError> {
        if !is_plain_file_name(filename) {
            return Err(PersistError::InvalidName(filename.to_string()));
        }
        ensure_download_dir(&self.dir)?;

        let mut staged = Builder::new()
            .prefix(".texify-")
            .suffix(".part")
            .tempfile_in(&self.dir)
            .map_err(|e| PersistError::OutputDir(e.to_string()))?;
        staged.write_all(bytes)?;
        staged.as_file_mut().sync_all()?;

        let target = self.dir.join(filename);
        staged.persist(&target).map_err(|e| PersistError::from(e.error))?;
        texify_debug!("Wrote {} bytes to {:?}", bytes.len(), target);
        Ok(target)
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}
