//! Per-invocation state threaded through the lifecycle hooks

use std::path::PathBuf;

use tempfile::TempDir;
use tracing::debug;

use crate::error::Result;

/// A private `.npmrc` holding registry credentials for one run.
///
/// The file lives in a temporary directory that is removed on drop.
#[derive(Debug, Default)]
pub struct NpmrcFile {
    dir: Option<TempDir>,
    written: bool,
}

impl NpmrcFile {
    /// Path of the file, creating the directory and an empty file on first use
    pub fn path(&mut self) -> Result<PathBuf> {
        if let Some(dir) = &self.dir {
            return Ok(dir.path().join(".npmrc"));
        }

        let dir = tempfile::Builder::new().prefix("tandem-npmrc").tempdir()?;
        let path = dir.path().join(".npmrc");
        std::fs::write(&path, "")?;
        debug!(path = %path.display(), "created session npmrc");
        self.dir = Some(dir);
        Ok(path)
    }

    /// Path of the file if it was created
    pub fn existing_path(&self) -> Option<PathBuf> {
        self.dir.as_ref().map(|d| d.path().join(".npmrc"))
    }

    /// Whether credentials were already written
    pub fn is_written(&self) -> bool {
        self.written
    }

    /// Write `content` unless the file was already written this session
    pub fn write_once(&mut self, content: &str) -> Result<bool> {
        if self.written {
            debug!("session npmrc already written, keeping it");
            return Ok(false);
        }
        let path = self.path()?;
        std::fs::write(&path, content)?;
        self.written = true;
        Ok(true)
    }
}

/// State of one release invocation
#[derive(Debug, Default)]
pub struct ReleaseSession {
    /// Conditions were verified successfully
    pub verified: bool,
    /// Session credentials file
    pub npmrc: NpmrcFile,
}

impl ReleaseSession {
    /// Create a fresh session
    pub fn new() -> Self {
        Self::default()
    }

    /// Path of the session npmrc, created on demand
    pub fn npmrc_path(&mut self) -> Result<PathBuf> {
        self.npmrc.path()
    }
}
