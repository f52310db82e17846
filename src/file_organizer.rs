/// Moving classified files into category folders.
///
/// This module creates category subdirectories inside the base directory,
/// relocates each classified file into its folder without overwriting
/// anything, and records one `OperationRecord` per file. In dry-run mode the
/// same records are produced and nothing on disk changes.
use crate::classifier::Classification;
use crate::file_category::Category;
use crate::resolver::{DestinationResolver, ResolveError};
use indicatif::ProgressBar;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Outcome of a single file operation.
///
/// A record starts `Pending` and is finalized exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationStatus {
    Pending,
    DryRun,
    Success,
    Error(String),
}

impl OperationStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::DryRun => f.write_str("dry-run"),
            Self::Success => f.write_str("success"),
            Self::Error(detail) => write!(f, "error: {}", detail),
        }
    }
}

/// Audit entry for one file of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRecord {
    /// RFC 3339 local time at which the record was created.
    pub timestamp: String,
    pub filename: String,
    pub original_path: PathBuf,
    /// Resolved destination, or the intended one if resolution failed.
    pub new_path: PathBuf,
    pub category: Category,
    /// Size read before the move; 0 if the file had vanished.
    pub size_bytes: u64,
    pub status: OperationStatus,
}

impl OperationRecord {
    fn pending(original_path: &Path, new_path: PathBuf, category: Category) -> Self {
        Self {
            timestamp: chrono::Local::now().to_rfc3339(),
            filename: original_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            original_path: original_path.to_path_buf(),
            new_path,
            category,
            size_bytes: fs::metadata(original_path).map(|m| m.len()).unwrap_or(0),
            status: OperationStatus::Pending,
        }
    }

    fn complete(mut self, status: OperationStatus) -> Self {
        debug_assert_eq!(self.status, OperationStatus::Pending);
        self.status = status;
        self
    }
}

/// Errors that can occur while organizing a single file.
#[derive(Debug)]
pub enum OrganizeError {
    /// Failed to create a category directory.
    DirectoryCreationFailed {
        path: PathBuf,
        source: io::Error,
    },
    /// Failed to move a file to its category directory.
    FileMoveFailure {
        source: PathBuf,
        destination: PathBuf,
        source_error: io::Error,
    },
    /// No free destination name was found.
    NoFreeDestination(ResolveError),
}

impl fmt::Display for OrganizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DirectoryCreationFailed { path, source } => {
                write!(
                    f,
                    "Failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::FileMoveFailure {
                source,
                destination,
                source_error,
            } => {
                write!(
                    f,
                    "Failed to move {} to {}: {}",
                    source.display(),
                    destination.display(),
                    source_error
                )
            }
            Self::NoFreeDestination(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for OrganizeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::DirectoryCreationFailed { source, .. } => Some(source),
            Self::FileMoveFailure { source_error, .. } => Some(source_error),
            Self::NoFreeDestination(e) => Some(e),
        }
    }
}

/// Result type for file organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// What a dry run would do with a category folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderPlan {
    pub category: Category,
    pub path: PathBuf,
    pub already_exists: bool,
}

/// Moves classified files into category subdirectories.
#[derive(Debug, Clone, Copy)]
pub struct FileOrganizer {
    resolver: DestinationResolver,
    dry_run: bool,
}

impl FileOrganizer {
    pub fn new(resolver: DestinationResolver, dry_run: bool) -> Self {
        Self { resolver, dry_run }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Organizes every classified file under `base_path`.
    ///
    /// Records come back in category order, then classification order
    /// within a category. A failure on one file is recorded and the batch
    /// carries on.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use foldersort::classifier::Classification;
    /// use foldersort::file_category::FileMapper;
    /// use foldersort::file_organizer::FileOrganizer;
    /// use foldersort::resolver::DestinationResolver;
    /// use std::path::Path;
    ///
    /// let base = Path::new("./test_folder");
    /// let files = foldersort::scanner::scan(base).unwrap_or_default();
    /// let classification = Classification::classify(&files, &FileMapper::default());
    /// let organizer = FileOrganizer::new(DestinationResolver::default(), true);
    /// for record in organizer.organize(&classification, base) {
    ///     println!("{} -> {} ({})", record.filename, record.new_path.display(), record.status);
    /// }
    /// ```
    pub fn organize(&self, classification: &Classification, base_path: &Path) -> Vec<OperationRecord> {
        self.organize_with_progress(classification, base_path, &ProgressBar::hidden())
    }

    /// Same as [`organize`](Self::organize), advancing `progress` once per file.
    pub fn organize_with_progress(
        &self,
        classification: &Classification,
        base_path: &Path,
        progress: &ProgressBar,
    ) -> Vec<OperationRecord> {
        let mut records = Vec::with_capacity(classification.total_files());

        for (category, files) in classification.iter() {
            let category_path = base_path.join(category.dir_name());

            if !self.dry_run
                && let Err(e) = Self::create_category_dir(&category_path)
            {
                error!("{}", e);
            }

            for file in files {
                let record = self.process_file(file, category, &category_path);
                progress.set_message(record.filename.clone());
                progress.inc(1);
                records.push(record);
            }
        }

        records
    }

    /// Reports which category folders a run would create.
    pub fn plan_folders(classification: &Classification, base_path: &Path) -> Vec<FolderPlan> {
        classification
            .categories()
            .map(|category| {
                let path = base_path.join(category.dir_name());
                let already_exists = path.is_dir();
                FolderPlan {
                    category,
                    path,
                    already_exists,
                }
            })
            .collect()
    }

    fn create_category_dir(path: &Path) -> OrganizeResult<()> {
        fs::create_dir_all(path).map_err(|e| OrganizeError::DirectoryCreationFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        info!("Created folder: {}", path.display());
        Ok(())
    }

    fn process_file(&self, file: &Path, category: Category, category_path: &Path) -> OperationRecord {
        let intended = match file.file_name() {
            Some(name) => category_path.join(name),
            None => category_path.to_path_buf(),
        };
        let record = OperationRecord::pending(file, intended.clone(), category);

        let destination = match self.resolver.resolve(&intended) {
            Ok(destination) => destination,
            Err(e) => {
                let err = OrganizeError::NoFreeDestination(e);
                error!("Failed to move {}: {}", file.display(), err);
                return record.complete(OperationStatus::Error(err.to_string()));
            }
        };
        let mut record = OperationRecord {
            new_path: destination,
            ..record
        };

        if self.dry_run {
            info!(
                "[DRY RUN] Would move: {} → {}",
                file.display(),
                record.new_path.display()
            );
            return record.complete(OperationStatus::DryRun);
        }

        match self.move_without_clobbering(file, &record.new_path) {
            Ok(final_path) => {
                info!("Moved: {} → {}", file.display(), final_path.display());
                record.new_path = final_path;
                record.complete(OperationStatus::Success)
            }
            Err(e) => {
                error!("Failed to move {}: {}", file.display(), e);
                record.complete(OperationStatus::Error(e.to_string()))
            }
        }
    }

    /// Moves `source` to `destination`, picking the next free name whenever
    /// the destination turns out to be taken at move time.
    fn move_without_clobbering(&self, source: &Path, destination: &Path) -> OrganizeResult<PathBuf> {
        let mut target = destination.to_path_buf();
        for _ in 0..self.resolver.max_probes() {
            match relocate(source, &target) {
                Ok(()) => return Ok(target),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    warn!(
                        "{} appeared before the move, resolving again",
                        target.display()
                    );
                    target = self
                        .resolver
                        .resolve(destination)
                        .map_err(OrganizeError::NoFreeDestination)?;
                }
                Err(e) => {
                    return Err(OrganizeError::FileMoveFailure {
                        source: source.to_path_buf(),
                        destination: target,
                        source_error: e,
                    });
                }
            }
        }
        Err(OrganizeError::NoFreeDestination(ResolveError::Exhausted {
            path: destination.to_path_buf(),
            probes: self.resolver.max_probes(),
        }))
    }
}

/// Moves a file, failing with `AlreadyExists` instead of overwriting.
///
/// A hard link claims the destination atomically; the source is unlinked
/// afterwards. Filesystems without hard links fall back to rename after a
/// last existence check, and cross-device moves to copy and delete.
fn relocate(source: &Path, destination: &Path) -> io::Result<()> {
    match fs::hard_link(source, destination) {
        Ok(()) => {
            if let Err(e) = fs::remove_file(source) {
                let _ = fs::remove_file(destination);
                return Err(e);
            }
            Ok(())
        }
        Err(e) if matches!(e.kind(), io::ErrorKind::AlreadyExists | io::ErrorKind::NotFound) => Err(e),
        Err(e) => {
            debug!(
                "hard link to {} failed ({}), falling back to rename",
                destination.display(),
                e
            );
            rename_without_clobbering(source, destination)
        }
    }
}

/// Rename used where hard links are unavailable. Refuses to replace an
/// existing destination, though the check and the rename are not atomic.
fn rename_without_clobbering(source: &Path, destination: &Path) -> io::Result<()> {
    if destination.symlink_metadata().is_ok() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "destination already exists",
        ));
    }
    match fs::rename(source, destination) {
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => copy_then_remove(source, destination),
        other => other,
    }
}

fn copy_then_remove(source: &Path, destination: &Path) -> io::Result<()> {
    fs::copy(source, destination)?;
    fs::remove_file(source)
}
