//! Command-line interface for foldersort.
//!
//! This module handles:
//! - Argument definitions and merging them with the configuration file
//! - Orchestrating scan, classification, moves and reporting
//! - Mapping run outcomes to exit codes

use crate::classifier::Classification;
use crate::config::{self, Config, ConfigError};
use crate::file_organizer::{FileOrganizer, OperationRecord};
use crate::output::OutputFormatter;
use crate::report::{self, RunSummary};
use crate::resolver::DestinationResolver;
use crate::scanner::{ScanError, Scanner};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Automatically organize files by type.
#[derive(Debug, Parser)]
#[command(
    name = "foldersort",
    version,
    about,
    after_help = "Examples:\n  foldersort --folder ~/Downloads --dry-run\n  foldersort --folder ~/Desktop --report my-report.csv"
)]
pub struct Args {
    /// Folder to organize [default: ./test_folder]
    #[arg(long, value_name = "DIR")]
    pub folder: Option<PathBuf>,

    /// Show what would happen without moving files
    #[arg(long)]
    pub dry_run: bool,

    /// Output report path [default: ./reports/report.csv]
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log file [default: organizer.log]
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,

    /// Exit non-zero when the folder is unavailable or a move fails
    #[arg(long)]
    pub strict: bool,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub folder: PathBuf,
    pub dry_run: bool,
    pub report_path: PathBuf,
    pub log_file: PathBuf,
    pub max_probes: u32,
}

impl RunOptions {
    /// Options with the built-in defaults for everything but the folder.
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            dry_run: false,
            report_path: PathBuf::from(config::DEFAULT_REPORT),
            log_file: PathBuf::from(config::DEFAULT_LOG_FILE),
            max_probes: config::DEFAULT_MAX_PROBES,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn report_path(mut self, report_path: impl Into<PathBuf>) -> Self {
        self.report_path = report_path.into();
        self
    }

    /// Merges CLI flags over configuration values over defaults.
    pub fn resolve(args: &Args, config: &Config) -> Result<Self, ConfigError> {
        let settings = &config.organizer;
        let folder = args
            .folder
            .clone()
            .or_else(|| settings.folder.clone())
            .unwrap_or_else(|| PathBuf::from(config::DEFAULT_FOLDER));

        Ok(Self {
            folder: std::path::absolute(&folder).unwrap_or(folder),
            dry_run: args.dry_run,
            report_path: args
                .report
                .clone()
                .or_else(|| settings.report.clone())
                .unwrap_or_else(|| PathBuf::from(config::DEFAULT_REPORT)),
            log_file: args
                .log_file
                .clone()
                .or_else(|| settings.log_file.clone())
                .unwrap_or_else(|| PathBuf::from(config::DEFAULT_LOG_FILE)),
            max_probes: config.max_probes()?,
        })
    }
}

/// Errors that stop a run before any file is touched.
#[derive(Debug)]
pub enum RunError {
    Config(ConfigError),
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(e) => write!(f, "Error loading configuration: {}", e),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
        }
    }
}

impl From<ConfigError> for RunError {
    fn from(error: ConfigError) -> Self {
        Self::Config(error)
    }
}

/// Everything a completed run produced.
#[derive(Debug)]
pub struct RunReport {
    pub classification: Classification,
    pub operations: Vec<OperationRecord>,
    pub summary: RunSummary,
    /// Where the CSV report was written, if it was.
    pub report_path: Option<PathBuf>,
    /// Why the CSV report could not be written, if it could not.
    pub report_error: Option<String>,
}

/// How a run ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// The folder was missing, not a directory, or unreadable.
    DirectoryUnavailable(ScanError),
    /// The folder had no files to organize.
    NothingToOrganize,
    Completed(RunReport),
}

impl RunOutcome {
    /// Process exit code. Without `strict`, every outcome exits 0.
    pub fn exit_code(&self, strict: bool) -> u8 {
        if !strict {
            return 0;
        }
        match self {
            Self::DirectoryUnavailable(_) => 2,
            Self::NothingToOrganize => 0,
            Self::Completed(report) => {
                if report.summary.has_failures() || report.report_error.is_some() {
                    1
                } else {
                    0
                }
            }
        }
    }
}

/// Runs one organize pass over `options.folder`.
///
/// # Examples
///
/// ```no_run
/// use foldersort::cli::{RunOptions, run};
/// use foldersort::config::Config;
///
/// let options = RunOptions::new("./test_folder").dry_run(true);
/// match run(&options, &Config::default()) {
///     Ok(outcome) => std::process::exit(outcome.exit_code(false).into()),
///     Err(e) => eprintln!("{}", e),
/// }
/// ```
pub fn run(options: &RunOptions, config: &Config) -> Result<RunOutcome, RunError> {
    let mapper = config.file_mapper()?;
    let scanner = Scanner::new(config.compile_filters()?);
    let base_path = options.folder.as_path();

    OutputFormatter::banner();
    if options.dry_run {
        OutputFormatter::dry_run_notice("No files will be moved");
    }

    OutputFormatter::info(&format!("\nScanning: {}", base_path.display()));
    let files = match scanner.scan(base_path) {
        Ok(files) => files,
        Err(e) => {
            OutputFormatter::error(&format!("Error: {}", e));
            return Ok(RunOutcome::DirectoryUnavailable(e));
        }
    };

    if files.is_empty() {
        OutputFormatter::plain("\nNo files found in this folder!");
        info!("Nothing to organize in {}", base_path.display());
        return Ok(RunOutcome::NothingToOrganize);
    }
    OutputFormatter::plain(&format!("Found {} files", files.len()));

    let classification = Classification::classify(&files, &mapper);
    let organizer = FileOrganizer::new(DestinationResolver::new(options.max_probes), options.dry_run);

    let operations = if options.dry_run {
        OutputFormatter::folder_plan(&FileOrganizer::plan_folders(&classification, base_path));
        OutputFormatter::header("Preview");
        let operations = organizer.organize(&classification, base_path);
        for op in &operations {
            OutputFormatter::dry_run_notice(&format!(
                "Would move: {} → {}",
                op.filename,
                relative_to(&op.new_path, base_path).display()
            ));
        }
        operations
    } else {
        OutputFormatter::header("Organizing files");
        let progress = OutputFormatter::create_progress_bar(classification.total_files() as u64);
        let operations = organizer.organize_with_progress(&classification, base_path, &progress);
        progress.finish_and_clear();
        for op in operations.iter().filter(|op| op.status.is_error()) {
            OutputFormatter::error(&format!("{}: {}", op.filename, op.status));
        }
        operations
    };

    let summary = RunSummary::from_run(&classification, &operations, options.dry_run);
    OutputFormatter::summary(&summary);

    let (report_path, report_error) = match report::write_report(&operations, &options.report_path) {
        Ok(0) => (None, None),
        Ok(_) => {
            OutputFormatter::success(&format!("Report saved: {}", options.report_path.display()));
            (Some(options.report_path.clone()), None)
        }
        Err(e) => {
            OutputFormatter::error(&format!("Error saving report: {}", e));
            (None, Some(e.to_string()))
        }
    };

    if options.dry_run {
        OutputFormatter::plain("\nRun without --dry-run to actually organize files");
    } else if summary.has_failures() {
        warn!("{} of {} files could not be moved", summary.failed, summary.total_files);
        OutputFormatter::warning("Some files could not be organized. Please review errors above.");
    } else {
        OutputFormatter::success("Done! Your files are organized!");
    }

    Ok(RunOutcome::Completed(RunReport {
        classification,
        operations,
        summary,
        report_path,
        report_error,
    }))
}

fn relative_to<'a>(path: &'a Path, base: &Path) -> &'a Path {
    path.strip_prefix(base).unwrap_or(path)
}
