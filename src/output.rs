//! Output formatting and the activity log.
//!
//! [`OutputFormatter`] owns all styled terminal output. [`ActivityLog`] is the
//! status sink for a sorting run: every line it receives is appended to the
//! log file with a timestamp and, unless the run is quiet, echoed to the
//! terminal.

use crate::sorter::SortOutcome;
use colored::*;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// Timestamp layout of every log line.
pub const LOG_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Manages all CLI output with consistent styling and formatting.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use autosorter::output::OutputFormatter;
    /// OutputFormatter::error("Config file not found: config.json");
    /// ```
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", message.yellow());
    }

    /// Prints one sorting outcome with the style that fits its kind.
    pub fn outcome(outcome: &SortOutcome) {
        let message = outcome.to_string();
        match outcome {
            SortOutcome::Moved { .. } => Self::success(&message),
            SortOutcome::Planned { .. } => Self::dry_run_notice(&message),
            SortOutcome::Failed { .. } => Self::error(&message),
            SortOutcome::EmptyDirectory => Self::info(&message),
        }
    }

    /// Prints a summary table with file counts by category.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use autosorter::output::OutputFormatter;
    /// use std::collections::HashMap;
    ///
    /// let mut counts = HashMap::new();
    /// counts.insert("Docs".to_string(), 15);
    /// counts.insert("Images".to_string(), 8);
    /// OutputFormatter::summary_table(&counts, 23);
    /// ```
    pub fn summary_table(category_counts: &HashMap<String, usize>, total_files: usize) {
        Self::header("SUMMARY");

        let mut categories: Vec<_> = category_counts.iter().collect();
        categories.sort_by_key(|&(name, _)| name);

        let max_category_len = categories
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(0)
            .max(8); // "Category"

        println!(
            "{:<width$} | {}",
            "Category".bold(),
            "Files".bold(),
            width = max_category_len
        );
        println!("{}", "-".repeat(max_category_len + 10));

        for (category, count) in &categories {
            println!(
                "{:<width$} | {} {}",
                category,
                count.to_string().green(),
                plural(**count),
                width = max_category_len
            );
        }

        println!("{}", "-".repeat(max_category_len + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_files.to_string().green().bold(),
            plural(total_files),
            width = max_category_len
        );
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}

/// Counts moved or planned files per category.
pub fn category_counts<'a, I>(outcomes: I) -> HashMap<String, usize>
where
    I: IntoIterator<Item = &'a SortOutcome>,
{
    let mut counts = HashMap::new();
    for category in outcomes.into_iter().filter_map(SortOutcome::category) {
        *counts.entry(category.to_string()).or_insert(0) += 1;
    }
    counts
}

/// Append-only activity log, optionally mirrored to the terminal.
pub struct ActivityLog<W: Write> {
    writer: W,
    quiet: bool,
}

impl ActivityLog<File> {
    /// Opens `path` for appending, creating it if needed.
    pub fn open(path: &Path, quiet: bool) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(file, quiet))
    }
}

impl<W: Write> ActivityLog<W> {
    pub fn new(writer: W, quiet: bool) -> Self {
        Self { writer, quiet }
    }

    /// Records a plain status line.
    pub fn log(&mut self, message: &str) -> io::Result<()> {
        if !self.quiet {
            OutputFormatter::plain(message);
        }
        self.append(message)
    }

    /// Records a sorting outcome, styled on the terminal.
    pub fn record(&mut self, outcome: &SortOutcome) -> io::Result<()> {
        if !self.quiet {
            OutputFormatter::outcome(outcome);
        }
        self.append(&outcome.to_string())
    }

    fn append(&mut self, message: &str) -> io::Result<()> {
        let timestamp = chrono::Local::now().format(LOG_TIMESTAMP_FORMAT);
        writeln!(self.writer, "{} - {}", timestamp, message)?;
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
