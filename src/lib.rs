//! foldersort - sort the files of a directory into category subfolders
//!
//! This library scans a directory, classifies each file by extension,
//! moves files into per-category folders without overwriting anything, and
//! writes a CSV report of what was done. Dry runs produce the same report
//! without touching the filesystem.

pub mod classifier;
pub mod cli;
pub mod config;
pub mod file_category;
pub mod file_organizer;
pub mod logging;
pub mod output;
pub mod report;
pub mod resolver;
pub mod scanner;

pub use classifier::Classification;
pub use config::{CompiledFilters, Config, ConfigError};
pub use file_category::{Category, FileMapper};
pub use file_organizer::{FileOrganizer, OperationRecord, OperationStatus};
pub use resolver::{DestinationResolver, ResolveError};
pub use scanner::{ScanError, Scanner};

pub use cli::{RunOptions, RunOutcome, run};
