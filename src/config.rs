//! Sorting rules and their configuration file.
//!
//! A rule set maps a category name (the subfolder files are moved into) to the
//! list of file extensions that belong to it. Rules are loaded once per run and
//! never change afterwards.
//!
//! # Configuration File Format
//!
//! The default format is JSON, a single object of category to extensions:
//!
//! ```json
//! {"Images": ["jpg", "png"], "Docs": ["pdf", ".docx"]}
//! ```
//!
//! A file whose name ends in `.toml` is read as TOML with the same shape:
//!
//! ```toml
//! Images = ["jpg", "png"]
//! Docs = ["pdf", ".docx"]
//! ```
//!
//! Extensions are lower-cased and a single leading `.` is stripped. The order
//! of categories in the file matters: when an extension is listed under two
//! categories, the one written first wins.

use serde::de::{self, Deserialize, Deserializer, MapAccess, Visitor};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Errors that can occur while loading sorting rules.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    ConfigNotFound(PathBuf),
    /// The file is not a mapping of category name to a list of extensions.
    ConfigParseError {
        /// The configuration file that failed to parse.
        path: PathBuf,
        /// The parser's description of the problem.
        reason: String,
    },
    /// The file exists but could not be read.
    IoError { path: PathBuf, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ConfigNotFound(path) => {
                write!(f, "Config file not found: {}", path.display())
            }
            ConfigError::ConfigParseError { path, reason } => {
                write!(f, "Invalid config file {}: {}", path.display(), reason)
            }
            ConfigError::IoError { path, reason } => {
                write!(f, "Could not read config file {}: {}", path.display(), reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Supported on-disk formats for the rules file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    /// Picks the format from the file extension. Anything but `.toml` is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Json,
        }
    }
}

/// An ordered, immutable mapping from category name to file extensions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    categories: Vec<CategoryRule>,
}

/// The extensions that send a file into one category folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRule {
    pub name: String,
    pub extensions: Vec<String>,
}

impl CategoryRule {
    /// Returns true if `extension` (already lower-cased) belongs to this category.
    pub fn contains(&self, extension: &str) -> bool {
        self.extensions.iter().any(|ext| ext == extension)
    }
}

impl RuleSet {
    /// Loads a rule set from a configuration file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ConfigNotFound` if the file does not exist.
    /// Returns `ConfigError::ConfigParseError` if the content is not a mapping
    /// of strings to arrays of strings.
    /// Returns `ConfigError::IoError` if the file cannot be read.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Self::parse(&content, ConfigFormat::from_path(path)).map_err(|reason| {
            ConfigError::ConfigParseError {
                path: path.to_path_buf(),
                reason,
            }
        })
    }

    /// Parses rules from configuration text in the given format.
    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self, String> {
        match format {
            ConfigFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            ConfigFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        }
    }

    /// Builds a rule set from `(category, extensions)` pairs, normalizing every
    /// extension the same way a configuration file would.
    ///
    /// # Examples
    ///
    /// ```
    /// use autosorter::config::RuleSet;
    ///
    /// let rules = RuleSet::from_pairs([("Images", vec!["JPG", ".png"])]);
    /// let images = rules.categories().next().unwrap();
    /// assert_eq!(images.extensions, vec!["jpg", "png"]);
    /// ```
    pub fn from_pairs<I, N, E, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, E)>,
        N: Into<String>,
        E: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut rules = Self::default();
        for (name, extensions) in pairs {
            rules.insert(
                name.into(),
                extensions
                    .into_iter()
                    .map(|ext| normalize_extension(ext.as_ref()))
                    .collect(),
            );
        }
        rules
    }

    /// Iterates the categories in configuration order.
    pub fn categories(&self) -> impl Iterator<Item = &CategoryRule> {
        self.categories.iter()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    // A repeated key replaces the earlier extensions but keeps its position.
    fn insert(&mut self, name: String, extensions: Vec<String>) {
        match self.categories.iter_mut().find(|rule| rule.name == name) {
            Some(rule) => rule.extensions = extensions,
            None => self.categories.push(CategoryRule { name, extensions }),
        }
    }
}

/// Checks that a category name can be used as a single folder inside the
/// target directory.
pub fn validate_category_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("category name must not be empty".to_string());
    }
    if name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(format!(
            "category name '{}' must be a plain folder name without path separators",
            name
        ));
    }
    Ok(())
}

/// Lower-cases an extension and strips one leading dot.
///
/// Only a single dot is removed, so `..txt` becomes `.txt`.
pub fn normalize_extension(extension: &str) -> String {
    let lowered = extension.to_lowercase();
    match lowered.strip_prefix('.') {
        Some(stripped) => stripped.to_string(),
        None => lowered,
    }
}

impl<'de> Deserialize<'de> for RuleSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(RuleSetVisitor)
    }
}

struct RuleSetVisitor;

impl<'de> Visitor<'de> for RuleSetVisitor {
    type Value = RuleSet;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a mapping of category names to lists of extensions")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut rules = RuleSet::default();
        while let Some((name, extensions)) = map.next_entry::<String, Vec<String>>()? {
            validate_category_name(&name).map_err(<A::Error as de::Error>::custom)?;
            rules.insert(
                name,
                extensions
                    .iter()
                    .map(|ext| normalize_extension(ext))
                    .collect(),
            );
        }
        Ok(rules)
    }
}
