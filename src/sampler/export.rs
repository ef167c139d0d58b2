//! # File Export
//!
//! Sink for "save these bytes as a named file".

use bytes::Bytes;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{DashboardError, Result};

/// MIME type of exported sweep logs
pub const CSV_MIME_TYPE: &str = "text/csv";

/// Accepts a payload to be saved under a file name
#[cfg_attr(test, mockall::automock)]
pub trait FileExport: Send {
    fn export(&mut self, data: Bytes, filename: &str, mime_type: &str) -> Result<()>;
}

/// Writes exports into a directory on the local filesystem
#[derive(Debug, Clone)]
pub struct DirectoryExport {
    dir: PathBuf,
}

impl DirectoryExport {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FileExport for DirectoryExport {
    fn export(&mut self, data: Bytes, filename: &str, mime_type: &str) -> Result<()> {
        // Names come from our own counter, but never let one escape the directory
        if filename.is_empty() || filename.contains(['/', '\\']) || filename == ".." {
            return Err(DashboardError::Export(format!("Invalid export file name: {:?}", filename)));
        }

        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(filename);
        fs::write(&path, &data)?;

        info!("Exported {} bytes ({}) to {}", data.len(), mime_type, path.display());
        Ok(())
    }
}
