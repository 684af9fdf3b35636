//! One sorting pass over a directory.
//!
//! The sorter looks at the immediate entries of a target directory, classifies
//! every regular file, and moves it into `target/<category>/`. Each entry gets
//! its own [`SortOutcome`]; a file that cannot be moved is reported and the
//! pass carries on with the next one.

use crate::config::RuleSet;
use crate::file_category::classify;
use crate::file_organizer::FileOrganizer;
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Errors that stop a pass before any file is touched.
#[derive(Debug)]
pub enum SortError {
    /// The target path is missing or is not a directory.
    NotADirectory(PathBuf),
    /// The target directory could not be listed.
    ReadDirFailed { path: PathBuf, source: io::Error },
}

impl fmt::Display for SortError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortError::NotADirectory(path) => write!(f, "Not a directory: {}", path.display()),
            SortError::ReadDirFailed { path, source } => {
                write!(f, "Error reading directory {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for SortError {}

/// What happened to one entry during a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortOutcome {
    /// The file was moved. `destination` is relative to the target directory.
    Moved {
        name: String,
        category: String,
        destination: PathBuf,
    },
    /// Dry run: where the file would go.
    Planned {
        name: String,
        category: String,
        destination: PathBuf,
    },
    /// The file could not be moved and was left in place.
    Failed { name: String, reason: String },
    /// The target directory held no regular file to sort.
    EmptyDirectory,
}

impl SortOutcome {
    /// The category this outcome counts towards, if any.
    pub fn category(&self) -> Option<&str> {
        match self {
            SortOutcome::Moved { category, .. } | SortOutcome::Planned { category, .. } => {
                Some(category)
            }
            SortOutcome::Failed { .. } | SortOutcome::EmptyDirectory => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, SortOutcome::Failed { .. })
    }
}

impl fmt::Display for SortOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOutcome::Moved {
                name, destination, ..
            } => write!(f, "Moved: {} → {}", name, destination.display()),
            SortOutcome::Planned {
                name, destination, ..
            } => write!(f, "[DRY RUN] {} → {}", name, destination.display()),
            SortOutcome::Failed { name, reason } => write!(f, "Error moving {}: {}", name, reason),
            SortOutcome::EmptyDirectory => write!(f, "No files found. Directory is empty."),
        }
    }
}

/// Everything a pass produced, in processing order.
#[derive(Debug, Default)]
pub struct SortReport {
    pub outcomes: Vec<SortOutcome>,
    /// Entries left alone because they are not regular files.
    pub skipped: usize,
}

impl SortReport {
    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failure()).count()
    }

    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(SortOutcome::is_failure)
    }
}

/// A directory entry seen during one pass.
#[derive(Debug, Clone)]
struct FileEntry {
    name: OsString,
    path: PathBuf,
    is_file: bool,
}

impl FileEntry {
    fn from_dir_entry(entry: &fs::DirEntry) -> Self {
        // file_type() does not follow symlinks, so links are never regular files.
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);

        Self {
            name: entry.file_name(),
            path: entry.path(),
            is_file,
        }
    }

    fn display_name(&self) -> String {
        self.name.to_string_lossy().into_owned()
    }
}

/// Runs sorting passes with a fixed rule set.
pub struct DirectorySorter<'a> {
    rules: &'a RuleSet,
    excluded: Vec<PathBuf>,
}

impl<'a> DirectorySorter<'a> {
    pub fn new(rules: &'a RuleSet) -> Self {
        Self {
            rules,
            excluded: Vec::new(),
        }
    }

    /// Leaves `path` in place even if it is a file inside the target directory.
    ///
    /// Used for the tool's own log and rules files.
    pub fn exclude(mut self, path: &Path) -> Self {
        self.excluded
            .push(fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf()));
        self
    }

    fn is_excluded(&self, path: &Path) -> bool {
        !self.excluded.is_empty()
            && fs::canonicalize(path).is_ok_and(|canonical| self.excluded.contains(&canonical))
    }

    /// Sorts the immediate entries of `target_dir`.
    ///
    /// Equivalent to [`run_with`](Self::run_with) without an observer.
    pub fn run(&self, target_dir: &Path, dry_run: bool) -> Result<SortReport, SortError> {
        self.run_with(target_dir, dry_run, |_| {})
    }

    /// Sorts the immediate entries of `target_dir`, handing every outcome to
    /// `on_outcome` as soon as it happens.
    ///
    /// Entries are processed in file-name order. Directories, symlinks and
    /// special files are skipped, which also leaves category folders from a
    /// previous run alone. In dry-run mode nothing on disk is changed.
    ///
    /// # Errors
    ///
    /// Returns `SortError::NotADirectory` if `target_dir` is missing or not a
    /// directory, and `SortError::ReadDirFailed` if it cannot be listed.
    /// Per-file failures are never returned here; they become
    /// [`SortOutcome::Failed`] entries in the report. When no regular file
    /// was found the report holds a single [`SortOutcome::EmptyDirectory`].
    pub fn run_with<F>(
        &self,
        target_dir: &Path,
        dry_run: bool,
        mut on_outcome: F,
    ) -> Result<SortReport, SortError>
    where
        F: FnMut(&SortOutcome),
    {
        if !target_dir.is_dir() {
            return Err(SortError::NotADirectory(target_dir.to_path_buf()));
        }

        let mut entries = fs::read_dir(target_dir)
            .and_then(|entries| entries.collect::<io::Result<Vec<_>>>())
            .map_err(|e| SortError::ReadDirFailed {
                path: target_dir.to_path_buf(),
                source: e,
            })?;
        entries.sort_by_key(|entry| entry.file_name());

        let mut report = SortReport::default();
        for entry in entries.iter().map(FileEntry::from_dir_entry) {
            if !entry.is_file || self.is_excluded(&entry.path) {
                report.skipped += 1;
                continue;
            }
            let outcome = self.process_entry(target_dir, &entry, dry_run);
            on_outcome(&outcome);
            report.outcomes.push(outcome);
        }

        if report.outcomes.is_empty() {
            on_outcome(&SortOutcome::EmptyDirectory);
            report.outcomes.push(SortOutcome::EmptyDirectory);
        }

        Ok(report)
    }

    fn process_entry(&self, target_dir: &Path, entry: &FileEntry, dry_run: bool) -> SortOutcome {
        let name = entry.display_name();
        let category = classify(&entry.name, self.rules).to_string();
        let destination_dir = target_dir.join(&category);

        let result = if dry_run {
            FileOrganizer::simulate(&destination_dir, &entry.name)
        } else {
            FileOrganizer::relocate(&entry.path, &destination_dir, &entry.name)
        };

        match result {
            Ok(final_path) => {
                let destination = relative_to(&final_path, target_dir);
                if dry_run {
                    SortOutcome::Planned {
                        name,
                        category,
                        destination,
                    }
                } else {
                    SortOutcome::Moved {
                        name,
                        category,
                        destination,
                    }
                }
            }
            Err(e) => SortOutcome::Failed {
                name,
                reason: e.to_string(),
            },
        }
    }
}

fn relative_to(path: &Path, base: &Path) -> PathBuf {
    path.strip_prefix(base)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| path.to_path_buf())
}
