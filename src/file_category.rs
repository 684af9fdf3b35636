/// File classification by extension.
///
/// This module maps a file name to the category folder it belongs in, using
/// the extension after the last dot and a loaded [`RuleSet`].
///
/// # Examples
///
/// ```
/// use autosorter::config::RuleSet;
/// use autosorter::file_category::classify;
///
/// let rules = RuleSet::from_pairs([("Images", vec!["jpg"]), ("Archives", vec!["gz"])]);
/// assert_eq!(classify("photo.JPG", &rules), "Images");
/// assert_eq!(classify("archive.tar.gz", &rules), "Archives");
/// assert_eq!(classify("README", &rules), "Others");
/// ```
use crate::config::RuleSet;
use std::ffi::OsStr;

/// Category for files that no rule claims.
pub const FALLBACK_CATEGORY: &str = "Others";

/// Returns the lower-cased extension used for classification.
///
/// Names without a dot and dotfiles (names starting with `.`) have no
/// extension, even if they contain later dots. Only the part after the last
/// dot has to be valid UTF-8; a name like `photo\xff.jpg` still yields `jpg`.
pub fn extension_of<S: AsRef<OsStr> + ?Sized>(file_name: &S) -> Option<String> {
    let bytes = file_name.as_ref().as_encoded_bytes();
    if bytes.first() == Some(&b'.') {
        return None;
    }
    let dot = bytes.iter().rposition(|&b| b == b'.')?;
    std::str::from_utf8(&bytes[dot + 1..])
        .ok()
        .map(str::to_lowercase)
}

/// Returns the category folder name for `file_name`.
///
/// Categories are checked in configuration order and the first one listing
/// the extension wins. Files without a matching rule, or whose extension is
/// not valid UTF-8, go to [`FALLBACK_CATEGORY`].
pub fn classify<'a, S: AsRef<OsStr> + ?Sized>(file_name: &S, rules: &'a RuleSet) -> &'a str {
    let Some(extension) = extension_of(file_name) else {
        return FALLBACK_CATEGORY;
    };

    rules
        .categories()
        .find(|rule| rule.contains(&extension))
        .map(|rule| rule.name.as_str())
        .unwrap_or(FALLBACK_CATEGORY)
}
