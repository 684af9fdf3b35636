//! autosorter - sort a directory's files into category folders by extension
//!
//! This library loads extension rules from a configuration file, classifies
//! file names against them, and moves files into per-category subfolders
//! without ever overwriting an existing file. Every action is reported as a
//! [`SortOutcome`] and appended to a timestamped activity log.

pub mod cli;
pub mod config;
pub mod file_category;
pub mod file_organizer;
pub mod output;
pub mod sorter;

pub use config::{ConfigError, RuleSet};
pub use file_category::{FALLBACK_CATEGORY, classify};
pub use file_organizer::{FileOrganizer, OrganizeError};
pub use sorter::{DirectorySorter, SortError, SortOutcome, SortReport};

pub use cli::{RunOptions, RunReport, run};
