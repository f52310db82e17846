//! Conflict-free destination naming.
//!
//! When a destination is taken, candidates `stem_1.ext`, `stem_2.ext`, ...
//! are probed in order and the first free one is used. Probing stops after a
//! configurable number of attempts.

use crate::config::DEFAULT_MAX_PROBES;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Errors from destination resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Every candidate up to the probe limit was taken.
    Exhausted { path: PathBuf, probes: u32 },
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exhausted { path, probes } => write!(
                f,
                "no free name for {} after {} attempts",
                path.display(),
                probes
            ),
        }
    }
}

impl std::error::Error for ResolveError {}

/// Finds non-colliding destination paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DestinationResolver {
    max_probes: u32,
}

impl DestinationResolver {
    /// Creates a resolver that tries at most `max_probes` suffixes.
    pub fn new(max_probes: u32) -> Self {
        Self {
            max_probes: max_probes.max(1),
        }
    }

    pub fn max_probes(&self) -> u32 {
        self.max_probes
    }

    /// Returns `destination` if it is free, otherwise the first free
    /// `<stem>_<n><.ext>` with `n` counting up from 1.
    ///
    /// This only checks existence; the caller must still refuse to clobber
    /// when it moves, since the path can be taken in between.
    ///
    /// # Examples
    ///
    /// ```
    /// use foldersort::resolver::DestinationResolver;
    /// use std::path::Path;
    ///
    /// let resolver = DestinationResolver::default();
    /// let free = resolver.resolve(Path::new("/no/such/dir/a.jpg")).unwrap();
    /// assert_eq!(free, Path::new("/no/such/dir/a.jpg"));
    /// ```
    pub fn resolve(&self, destination: &Path) -> Result<PathBuf, ResolveError> {
        if !path_taken(destination) {
            return Ok(destination.to_path_buf());
        }

        for counter in 1..=self.max_probes {
            let candidate = suffixed(destination, counter);
            if !path_taken(&candidate) {
                debug!(
                    "{} is taken, using {}",
                    destination.display(),
                    candidate.display()
                );
                return Ok(candidate);
            }
        }

        Err(ResolveError::Exhausted {
            path: destination.to_path_buf(),
            probes: self.max_probes,
        })
    }
}

impl Default for DestinationResolver {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PROBES)
    }
}

/// Dangling symlinks count as taken.
fn path_taken(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

/// Builds `<stem>_<counter><.ext>` next to `path`.
fn suffixed(path: &Path, counter: u32) -> PathBuf {
    let mut name = OsString::new();
    if let Some(stem) = path.file_stem() {
        name.push(stem);
    }
    name.push(format!("_{}", counter));
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }
    path.with_file_name(name)
}
