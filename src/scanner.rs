//! Directory scanning.
//!
//! Lists the regular files directly inside a directory. Subdirectories are
//! never descended into, and a missing directory is reported as an error
//! rather than as an empty listing.

use crate::config::CompiledFilters;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Reasons a directory could not be scanned.
#[derive(Debug)]
pub enum ScanError {
    /// The directory does not exist.
    NotFound { path: PathBuf },
    /// The path exists but is not a directory.
    NotADirectory { path: PathBuf },
    /// The directory exists but could not be listed.
    Unreadable { path: PathBuf, source: io::Error },
}

impl ScanError {
    /// The path that failed to scan.
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound { path } | Self::NotADirectory { path } | Self::Unreadable { path, .. } => {
                path
            }
        }
    }
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { path } => write!(f, "Folder '{}' does not exist", path.display()),
            Self::NotADirectory { path } => {
                write!(f, "'{}' is not a directory", path.display())
            }
            Self::Unreadable { path, source } => {
                write!(f, "Could not read folder '{}': {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ScanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Unreadable { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Lists files in a single directory level, applying filters.
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    filters: CompiledFilters,
}

impl Scanner {
    /// Creates a scanner that applies the given filters.
    pub fn new(filters: CompiledFilters) -> Self {
        Self { filters }
    }

    /// Returns the regular files directly inside `directory`, joined with
    /// it and sorted by file name.
    ///
    /// Symlinks are followed, so a link to a file counts as a file while a
    /// link to a directory or a dangling link is skipped.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use foldersort::scanner::Scanner;
    /// use std::path::Path;
    ///
    /// match Scanner::default().scan(Path::new("./test_folder")) {
    ///     Ok(files) => println!("found {} files", files.len()),
    ///     Err(e) => eprintln!("{}", e),
    /// }
    /// ```
    pub fn scan(&self, directory: &Path) -> Result<Vec<PathBuf>, ScanError> {
        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                let err = classify_read_error(directory, e);
                error!("Error scanning folder {}: {}", directory.display(), err);
                return Err(err);
            }
        };

        let mut files = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("skipping unreadable entry in {}: {}", directory.display(), e);
                    continue;
                }
            };
            let path = entry.path();
            let is_file = fs::metadata(&path).map(|m| m.is_file()).unwrap_or(false);
            if !is_file {
                continue;
            }
            if !self.filters.should_include(&path) {
                debug!("filtered out {}", path.display());
                continue;
            }
            files.push(path);
        }

        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        info!(
            "Scanned folder: {}, found {} files",
            directory.display(),
            files.len()
        );
        Ok(files)
    }
}

fn classify_read_error(directory: &Path, source: io::Error) -> ScanError {
    let path = directory.to_path_buf();
    match fs::metadata(directory) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => ScanError::NotFound { path },
        Ok(meta) if !meta.is_dir() => ScanError::NotADirectory { path },
        _ => ScanError::Unreadable { path, source },
    }
}

/// Scans with no filters applied.
pub fn scan(directory: &Path) -> Result<Vec<PathBuf>, ScanError> {
    Scanner::default().scan(directory)
}
