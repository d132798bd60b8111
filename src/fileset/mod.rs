//! Glob expansion for target sources and headers.
//!
//! Patterns are resolved relative to the project root and use the `glob`
//! crate's syntax, including `**` for recursive matches. Matched paths are
//! reported relative to the root with `/` separators so the generated
//! Makefile is independent of where the generator ran.

use std::collections::BTreeSet;

use camino::{Utf8Path, Utf8PathBuf};
use glob::{MatchOptions, Pattern, glob_with};
use tracing::debug;

use crate::error::{BuildPlanError, Result};

mod dirs;
mod object_path;
mod walk;

pub use dirs::{RootDirs, ensure_directories};
pub use object_path::{OBJECT_EXTENSION, object_path};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Expand every pattern under `root` and return the union of the matches.
///
/// A pattern that matches nothing contributes nothing. Directories matched
/// by a pattern are skipped. Matches are inspected through [`RootDirs`], so
/// relative patterns cannot reach outside `root`.
///
/// # Errors
///
/// Returns [`BuildPlanError::InvalidPattern`] for a malformed pattern and
/// [`BuildPlanError::Filesystem`] when a directory cannot be read, a match
/// is not valid UTF-8 or a relative pattern escapes `root`.
///
/// # Examples
///
/// ```
/// use makegraph::fileset;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dir = tempfile::tempdir()?;
/// std::fs::create_dir_all(dir.path().join("src"))?;
/// std::fs::write(dir.path().join("src/a.c"), "")?;
/// let root = camino::Utf8Path::from_path(dir.path()).ok_or("non-UTF-8 temp dir")?;
/// let found = fileset::expand(root, ["src/*.c", "missing/*.c"])?;
/// assert_eq!(found.into_iter().collect::<Vec<_>>(), vec!["src/a.c"]);
/// # Ok(()) }
/// ```
pub fn expand<I, S>(root: &Utf8Path, patterns: I) -> Result<BTreeSet<Utf8PathBuf>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut matched = BTreeSet::new();
    let mut handles = RootDirs::new(root);
    for pattern in patterns {
        let raw = pattern.as_ref();
        let found = expand_one(root, raw, &mut handles)?;
        debug!(pattern = raw, matches = found.len(), "expanded glob pattern");
        matched.extend(found);
    }
    Ok(matched)
}

fn expand_one(root: &Utf8Path, raw: &str, handles: &mut RootDirs<'_>) -> Result<Vec<Utf8PathBuf>> {
    Pattern::new(raw).map_err(|e| invalid_pattern(raw, &e))?;
    let anchored = anchor(root, raw);
    let entries = glob_with(&anchored, MATCH_OPTIONS).map_err(|e| invalid_pattern(raw, &e))?;
    let mut paths = Vec::new();
    for entry in entries {
        if let Some(path) = walk::process_glob_entry(entry, root, handles)? {
            paths.push(path);
        }
    }
    Ok(paths)
}

/// Join a relative pattern onto the escaped root so metacharacters in the
/// root directory name are matched literally.
fn anchor(root: &Utf8Path, raw: &str) -> String {
    if Utf8Path::new(raw).is_absolute() || root.as_str().is_empty() {
        return raw.to_owned();
    }
    let escaped = Pattern::escape(root.as_str());
    let trimmed = escaped.trim_end_matches('/');
    format!("{trimmed}/{raw}")
}

fn invalid_pattern(raw: &str, err: &glob::PatternError) -> BuildPlanError {
    BuildPlanError::InvalidPattern {
        pattern: raw.to_owned(),
        detail: err.msg.to_owned(),
    }
}
