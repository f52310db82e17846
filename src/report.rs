//! CSV reporting and run summaries.

use crate::classifier::Classification;
use crate::file_category::Category;
use crate::file_organizer::OperationRecord;
use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::Path;
use tracing::{error, info};

/// Column order of the report, matching the header row.
pub const REPORT_HEADER: [&str; 7] = [
    "timestamp",
    "filename",
    "original_path",
    "new_path",
    "category",
    "size_bytes",
    "status",
];

#[derive(Serialize)]
struct ReportRow<'a> {
    timestamp: &'a str,
    filename: &'a str,
    original_path: String,
    new_path: String,
    category: &'static str,
    size_bytes: u64,
    status: String,
}

impl<'a> From<&'a OperationRecord> for ReportRow<'a> {
    fn from(record: &'a OperationRecord) -> Self {
        Self {
            timestamp: &record.timestamp,
            filename: &record.filename,
            original_path: record.original_path.to_string_lossy().into_owned(),
            new_path: record.new_path.to_string_lossy().into_owned(),
            category: record.category.dir_name(),
            size_bytes: record.size_bytes,
            status: record.status.to_string(),
        }
    }
}

#[derive(Debug)]
pub enum ReportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl Display for ReportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(error) => write!(f, "io error: {}", error),
            Self::Csv(error) => write!(f, "csv error: {}", error),
        }
    }
}

impl std::error::Error for ReportError {}

impl From<std::io::Error> for ReportError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error)
    }
}

impl From<csv::Error> for ReportError {
    fn from(error: csv::Error) -> Self {
        Self::Csv(error)
    }
}

/// Writes `operations` to `report_path` as CSV and returns the number of
/// rows written.
///
/// The parent directory is created when missing. An empty operation list
/// writes no file at all.
pub fn write_report(operations: &[OperationRecord], report_path: &Path) -> Result<usize, ReportError> {
    if operations.is_empty() {
        info!("No operations to report, skipping {}", report_path.display());
        return Ok(0);
    }

    let result = write_rows(operations, report_path);
    match &result {
        Ok(rows) => info!("Report saved: {} ({} rows)", report_path.display(), rows),
        Err(e) => error!("Error generating report {}: {}", report_path.display(), e),
    }
    result
}

fn write_rows(operations: &[OperationRecord], report_path: &Path) -> Result<usize, ReportError> {
    if let Some(parent) = report_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(report_path)?;
    for record in operations {
        writer.serialize(ReportRow::from(record))?;
    }
    writer.flush()?;
    Ok(operations.len())
}

/// Counts describing a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub dry_run: bool,
    pub total_files: usize,
    /// Files per category, in category order; empty categories omitted.
    pub by_category: Vec<(Category, usize)>,
    pub successful: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn from_run(classification: &Classification, operations: &[OperationRecord], dry_run: bool) -> Self {
        Self {
            dry_run,
            total_files: classification.total_files(),
            by_category: classification
                .iter()
                .map(|(category, files)| (category, files.len()))
                .collect(),
            successful: operations.iter().filter(|op| op.status.is_success()).count(),
            failed: operations.iter().filter(|op| op.status.is_error()).count(),
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}
