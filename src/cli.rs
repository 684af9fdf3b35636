//! Command-line interface module for autosorter.
//!
//! This module handles all CLI-related functionality including:
//! - Argument parsing
//! - Resolving defaults (download directory, config and log paths) once
//! - Running a sorting pass and writing its outcomes to the activity log
//! - Mapping failures to exit codes

use crate::config::{ConfigError, RuleSet};
use crate::output::{ActivityLog, OutputFormatter, category_counts};
use crate::sorter::{DirectorySorter, SortError, SortReport};
use clap::Parser;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

pub const DEFAULT_CONFIG_FILE: &str = "config.json";
pub const DEFAULT_LOG_FILE: &str = "autosorter.log";

/// Sort the files of a directory into subfolders by extension.
#[derive(Debug, Parser)]
#[command(name = "autosorter", version, about)]
pub struct Cli {
    /// Directory to sort (defaults to the current user's Downloads folder)
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Rules file mapping category names to extensions (JSON, or TOML for *.toml)
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Log file that every action is appended to
    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    pub log: PathBuf,

    /// Only show what would be moved, without touching any file
    #[arg(long)]
    pub dry_run: bool,

    /// Do not print to the terminal; the log file is still written
    #[arg(long)]
    pub quiet: bool,
}

/// Fully resolved options for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub target_dir: PathBuf,
    pub config_path: PathBuf,
    pub log_path: PathBuf,
    pub dry_run: bool,
    pub quiet: bool,
}

impl RunOptions {
    /// Resolves parsed arguments against the given home directory.
    pub fn resolve(cli: Cli, home: Option<PathBuf>) -> Self {
        let target_dir = cli
            .path
            .unwrap_or_else(|| default_download_dir(home.as_deref()));

        Self {
            target_dir,
            config_path: cli.config,
            log_path: cli.log,
            dry_run: cli.dry_run,
            quiet: cli.quiet,
        }
    }

    /// Resolves parsed arguments against the process environment.
    pub fn from_env(cli: Cli) -> Self {
        Self::resolve(cli, home_dir())
    }
}

/// The current user's home directory, from `HOME` or `USERPROFILE`.
pub fn home_dir() -> Option<PathBuf> {
    ["HOME", "USERPROFILE"]
        .iter()
        .filter_map(std::env::var_os)
        .find(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// `<home>/Downloads`, or a relative `Downloads` without a home directory.
pub fn default_download_dir(home: Option<&Path>) -> PathBuf {
    match home {
        Some(home) => home.join("Downloads"),
        None => PathBuf::from("Downloads"),
    }
}

/// Fatal errors of a run.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Sort(SortError),
    /// The log file could not be opened or written.
    Log { path: PathBuf, source: io::Error },
}

impl AppError {
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Config(_) => 2,
            AppError::Sort(_) => 3,
            AppError::Log { .. } => 4,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Config(e) => write!(f, "{}", e),
            AppError::Sort(e) => write!(f, "{}", e),
            AppError::Log { path, source } => {
                write!(f, "Could not write log file {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for AppError {}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::Config(e)
    }
}

impl From<SortError> for AppError {
    fn from(e: SortError) -> Self {
        AppError::Sort(e)
    }
}

/// The result of a completed run.
#[derive(Debug)]
pub struct RunReport {
    pub sort: SortReport,
    /// Outcomes that could not be appended to the log file.
    pub log_failures: usize,
}

impl RunReport {
    /// 0 when everything was moved and logged, 1 when some moves failed,
    /// 4 when some log lines could not be written.
    pub fn exit_code(&self) -> u8 {
        if self.sort.has_failures() {
            1
        } else if self.log_failures > 0 {
            4
        } else {
            0
        }
    }
}

/// Loads the rules, runs one sorting pass and logs every outcome as it happens.
///
/// Rules are loaded and the log file is opened before any file is touched, so
/// a fatal error leaves the target directory as it was. The log and rules
/// files are never sorted, even when they live in the target directory. A
/// failed log write is reported on stderr and does not stop the pass.
///
/// # Examples
///
/// ```no_run
/// use autosorter::cli::{run, RunOptions};
/// use std::path::PathBuf;
///
/// let options = RunOptions {
///     target_dir: PathBuf::from("/home/me/Downloads"),
///     config_path: PathBuf::from("config.json"),
///     log_path: PathBuf::from("autosorter.log"),
///     dry_run: true,
///     quiet: false,
/// };
/// match run(&options) {
///     Ok(report) => println!("{} entries processed", report.sort.outcomes.len()),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run(options: &RunOptions) -> Result<RunReport, AppError> {
    let rules = RuleSet::load(&options.config_path)?;

    let log_error = |source: io::Error| AppError::Log {
        path: options.log_path.clone(),
        source,
    };
    let mut log = ActivityLog::open(&options.log_path, options.quiet).map_err(log_error)?;

    if !options.quiet {
        print_banner(options);
    }

    let mut log_failures = 0;
    let sort = DirectorySorter::new(&rules)
        .exclude(&options.log_path)
        .exclude(&options.config_path)
        .run_with(&options.target_dir, options.dry_run, |outcome| {
            if let Err(e) = log.record(outcome) {
                log_failures += 1;
                OutputFormatter::error(&log_error(e).to_string());
            }
        })?;

    if !options.quiet {
        print_summary(&sort, options.dry_run);
    }

    Ok(RunReport { sort, log_failures })
}

/// Runs the CLI with already-parsed arguments and returns the process exit code.
///
/// See [`RunReport::exit_code`] and [`AppError::exit_code`].
pub fn run_cli(cli: Cli) -> ExitCode {
    let options = RunOptions::from_env(cli);
    match run(&options) {
        Ok(report) => ExitCode::from(report.exit_code()),
        Err(e) => {
            OutputFormatter::error(&e.to_string());
            ExitCode::from(e.exit_code())
        }
    }
}

fn print_banner(options: &RunOptions) {
    OutputFormatter::header("=== AutoSorter ===");
    OutputFormatter::plain(&format!(
        "Target directory: {}",
        options.target_dir.display()
    ));
    if options.dry_run {
        OutputFormatter::dry_run_notice("Mode: DRY RUN (files will not be moved)");
    }
    OutputFormatter::plain("==================");
}

fn print_summary(report: &SortReport, dry_run: bool) {
    let counts = category_counts(&report.outcomes);
    let total: usize = counts.values().sum();
    if total > 0 {
        OutputFormatter::summary_table(&counts, total);
    }

    let failures = report.failures();
    if failures > 0 {
        OutputFormatter::warning(&format!(
            "{} file(s) could not be moved. See the log for details.",
            failures
        ));
    }

    if dry_run {
        OutputFormatter::dry_run_notice("Dry run complete. No files were modified.");
    }
    OutputFormatter::plain("Done.");
}
