/// Conflict-safe relocation of files into category directories.
///
/// Moving never overwrites: when the destination name is taken, a numbered
/// suffix is inserted before the extension (`report (1).pdf`, `report (2).pdf`,
/// ...) until a free name is found.
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Upper bound on `name (n).ext` candidates tried before giving up.
pub const MAX_DISAMBIGUATION_ATTEMPTS: u32 = 10_000;

/// Errors that can occur while relocating a file.
#[derive(Debug)]
pub enum OrganizeError {
    /// Failed to create a category directory.
    DirectoryCreationFailed { path: PathBuf, source: io::Error },
    /// Failed to move a file to its category directory.
    FileMoveFailure {
        source: PathBuf,
        destination: PathBuf,
        source_error: io::Error,
    },
    /// Every candidate name up to the attempt limit already exists.
    NameCollisionExhausted { destination: PathBuf, attempts: u32 },
}

impl std::fmt::Display for OrganizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
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
            Self::NameCollisionExhausted {
                destination,
                attempts,
            } => {
                write!(
                    f,
                    "No free name for {} after {} attempts",
                    destination.display(),
                    attempts
                )
            }
        }
    }
}

impl std::error::Error for OrganizeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::DirectoryCreationFailed { source, .. } => Some(source),
            Self::FileMoveFailure { source_error, .. } => Some(source_error),
            Self::NameCollisionExhausted { .. } => None,
        }
    }
}

/// Result type for file organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Moves files into destination directories without clobbering existing ones.
pub struct FileOrganizer;

impl FileOrganizer {
    /// Moves `source` into `destination_dir` under `destination_name`, or under
    /// a disambiguated name if that one is already taken.
    ///
    /// The destination directory is created (recursively) if it is missing.
    /// Returns the path the file actually ended up at.
    ///
    /// The free-name check and the move are not atomic; a file created
    /// concurrently at the chosen name can still collide.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use autosorter::file_organizer::FileOrganizer;
    /// use std::path::Path;
    ///
    /// let result = FileOrganizer::relocate(
    ///     Path::new("/home/me/Downloads/photo.jpg"),
    ///     Path::new("/home/me/Downloads/Images"),
    ///     "photo.jpg",
    /// );
    ///
    /// match result {
    ///     Ok(path) => println!("Moved to {}", path.display()),
    ///     Err(e) => eprintln!("Move failed: {}", e),
    /// }
    /// ```
    pub fn relocate<N: AsRef<OsStr>>(
        source: &Path,
        destination_dir: &Path,
        destination_name: N,
    ) -> OrganizeResult<PathBuf> {
        fs::create_dir_all(destination_dir).map_err(|e| {
            OrganizeError::DirectoryCreationFailed {
                path: destination_dir.to_path_buf(),
                source: e,
            }
        })?;

        let destination = Self::available_path(destination_dir, destination_name.as_ref())?;

        move_file(source, &destination).map_err(|e| OrganizeError::FileMoveFailure {
            source: source.to_path_buf(),
            destination: destination.clone(),
            source_error: e,
        })?;

        Ok(destination)
    }

    /// Computes where [`relocate`](Self::relocate) would put the file, without
    /// creating directories or moving anything.
    pub fn simulate<N: AsRef<OsStr>>(
        destination_dir: &Path,
        destination_name: N,
    ) -> OrganizeResult<PathBuf> {
        Self::available_path(destination_dir, destination_name.as_ref())
    }

    /// Finds the first name in `name`, `stem (1).ext`, `stem (2).ext`, ...
    /// that does not exist in `dir`.
    fn available_path(dir: &Path, name: &OsStr) -> OrganizeResult<PathBuf> {
        let candidate = dir.join(name);
        if !path_taken(&candidate) {
            return Ok(candidate);
        }

        let (stem, extension) = split_name(name);
        for counter in 1..=MAX_DISAMBIGUATION_ATTEMPTS {
            let mut numbered = stem.clone();
            numbered.push(format!(" ({})", counter));
            numbered.push(&extension);
            let candidate = dir.join(numbered);
            if !path_taken(&candidate) {
                return Ok(candidate);
            }
        }

        Err(OrganizeError::NameCollisionExhausted {
            destination: dir.join(name),
            attempts: MAX_DISAMBIGUATION_ATTEMPTS,
        })
    }
}

// Dangling symlinks still occupy the name.
fn path_taken(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Splits a file name into stem and extension, keeping the dot with the
/// extension. Leading dots belong to the stem, so `.hidden` has no extension.
/// Names need not be valid UTF-8.
pub fn split_name(name: &OsStr) -> (OsString, OsString) {
    let bytes = name.as_encoded_bytes();
    let leading_dots = bytes.iter().take_while(|&&b| b == b'.').count();
    match bytes[leading_dots..].iter().rposition(|&b| b == b'.') {
        Some(index) => {
            let (stem, extension) = bytes.split_at(leading_dots + index);
            (from_encoded(stem), from_encoded(extension))
        }
        None => (name.to_os_string(), OsString::new()),
    }
}

fn from_encoded(bytes: &[u8]) -> OsString {
    // SAFETY: `bytes` comes from `OsStr::as_encoded_bytes` and is split only
    // next to an ASCII '.', which is a valid boundary for the encoding.
    unsafe { OsStr::from_encoded_bytes_unchecked(bytes) }.to_os_string()
}

/// Renames `source` to `destination`, falling back to copy-then-delete when
/// the two paths are on different filesystems.
fn move_file(source: &Path, destination: &Path) -> io::Result<()> {
    match fs::rename(source, destination) {
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            copy_then_remove(source, destination)
        }
        result => result,
    }
}

fn copy_then_remove(source: &Path, destination: &Path) -> io::Result<()> {
    if let Err(e) = fs::copy(source, destination) {
        let _ = fs::remove_file(destination);
        return Err(e);
    }
    fs::remove_file(source)
}
