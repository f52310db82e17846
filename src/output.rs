//! Console output and styling.
//!
//! All human-facing printing goes through `OutputFormatter`. None of it is
//! meant to be parsed; the CSV report is the machine-readable artifact.

use crate::file_organizer::FolderPlan;
use crate::report::RunSummary;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

const RULE_WIDTH: usize = 50;

/// Styled console output.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// ```no_run
    /// use foldersort::output::OutputFormatter;
    /// OutputFormatter::success("Files organized");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red to stderr.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn plain(message: &str) {
        println!("{}", message);
    }

    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    fn rule() {
        println!("{}", "=".repeat(RULE_WIDTH));
    }

    /// Prints the program banner.
    pub fn banner() {
        println!();
        Self::rule();
        println!("{}", format!("FOLDERSORT v{}", env!("CARGO_PKG_VERSION")).bold());
        Self::rule();
    }

    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Creates a progress bar for file moves.
    ///
    /// Falls back to the default bar style if the template is rejected.
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(style);
        pb
    }

    /// Lists the folders a dry run would create.
    pub fn folder_plan(plan: &[FolderPlan]) {
        Self::header("Category folders");
        for folder in plan {
            if folder.already_exists {
                println!("  Already exists: {}/", folder.category);
            } else {
                Self::dry_run_notice(&format!("Would create: {}/", folder.category));
            }
        }
    }

    /// Prints the per-category table and, for live runs, move outcomes.
    pub fn summary(summary: &RunSummary) {
        println!();
        Self::rule();
        println!("{}", "SUMMARY".bold());
        Self::rule();

        let max_category_len = summary
            .by_category
            .iter()
            .map(|(category, _)| category.dir_name().len())
            .max()
            .unwrap_or(0)
            .max(8);

        println!(
            "{:<width$} | {}",
            "Category".bold(),
            "Files".bold(),
            width = max_category_len
        );
        println!("{}", "-".repeat(max_category_len + 10));
        for (category, count) in &summary.by_category {
            println!(
                "{:<width$} | {} {}",
                category.dir_name(),
                count.to_string().green(),
                plural(*count),
                width = max_category_len
            );
        }
        println!("{}", "-".repeat(max_category_len + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            summary.total_files.to_string().green().bold(),
            plural(summary.total_files),
            width = max_category_len
        );

        if !summary.dry_run {
            println!();
            Self::success(&format!("Successfully moved: {}", summary.successful));
            if summary.has_failures() {
                Self::error(&format!("Failed: {}", summary.failed));
            }
        }
        Self::rule();
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}
