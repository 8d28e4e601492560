//! File path utilities for organizing data files.
//!
//! This module provides a centralized way to manage paths for everything the
//! tools persist (cached character lists, rendered reports, logs).

use std::path::{Path, PathBuf};

/// File path manager for data files
#[derive(Debug, Clone)]
pub struct DataPaths {
    root: PathBuf,
}

impl DataPaths {
    /// Create a new DataPaths with the given root directory
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Get the root data directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    // ========== Cache ==========

    /// Get the character cache directory
    pub fn cache_dir(&self) -> PathBuf {
        self.root.join("cache")
    }

    // ========== Reports ==========

    /// Get the report output directory
    pub fn reports_dir(&self) -> PathBuf {
        self.root.join("reports")
    }

    // ========== Logs ==========

    /// Get logs directory
    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    // ========== Utility Methods ==========

    /// Create all necessary directories
    pub fn create_dirs(&self) -> std::io::Result<()> {
        let dirs = vec![self.cache_dir(), self.reports_dir(), self.logs_dir()];

        for dir in dirs {
            std::fs::create_dir_all(&dir)?;
        }

        Ok(())
    }
}

/// Sanitize filename by removing/replacing invalid characters.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}
