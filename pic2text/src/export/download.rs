use std::io::Write;
use std::path::PathBuf;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::config::ExportConfig;
use crate::error::{Pic2TextError, Result};

/// Somewhere a finished text file can be handed to the user.
pub trait DownloadSink: Send + Sync {
    /// Delivers `contents` as `file_name` and returns where it ended up.
    fn deliver(&self, file_name: &str, contents: &[u8]) -> Result<PathBuf>;
}

/// Saves downloads into a directory. Content is staged in a temporary file
/// next to the target and only renamed into place once fully written; a
/// failed write leaves nothing behind.
#[derive(Debug, Clone)]
pub struct DirectoryDownloads {
    dir: PathBuf,
}

impl DirectoryDownloads {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_config(config: &ExportConfig) -> Self {
        Self::new(config.download_dir.clone())
    }
}

/// Keeps the file inside the download directory.
fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            other => other,
        })
        .collect()
}

impl DownloadSink for DirectoryDownloads {
    fn deliver(&self, file_name: &str, contents: &[u8]) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            Pic2TextError::Download(format!("Cannot create {}: {e}", self.dir.display()))
        })?;

        let target = self.dir.join(sanitize_file_name(file_name));

        let mut staged = NamedTempFile::new_in(&self.dir)
            .map_err(|e| Pic2TextError::Download(format!("Failed to stage download: {e}")))?;
        staged
            .write_all(contents)
            .and_then(|_| staged.flush())
            .map_err(|e| Pic2TextError::Download(format!("Failed to write download: {e}")))?;

        staged.persist(&target).map_err(|e| {
            Pic2TextError::Download(format!("Failed to save {}: {}", target.display(), e.error))
        })?;

        debug!(path = %target.display(), bytes = contents.len(), "Download saved");
        Ok(target)
    }
}
