//! Filtering and normalisation of individual glob matches.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::fs::Metadata;

use super::RootDirs;
use crate::error::{BuildPlanError, Result};

pub(super) type GlobEntryResult = std::result::Result<std::path::PathBuf, glob::GlobError>;

/// Turn a raw glob entry into a root-relative UTF-8 file path.
///
/// Returns `Ok(None)` for matches that are not regular files.
pub(super) fn process_glob_entry(
    entry: GlobEntryResult,
    root: &Utf8Path,
    handles: &mut RootDirs<'_>,
) -> Result<Option<Utf8PathBuf>> {
    match entry {
        Ok(path) => {
            let utf_path = Utf8PathBuf::try_from(path).map_err(|err| {
                let lossy = err.as_path().to_string_lossy().into_owned();
                BuildPlanError::filesystem(
                    lossy,
                    io::Error::new(io::ErrorKind::InvalidData, "glob matched a non-UTF-8 path"),
                )
            })?;
            let relative = relative_to(root, &utf_path);
            let metadata = fetch_metadata(handles, &relative, &utf_path)?;
            if !metadata.is_file() {
                return Ok(None);
            }
            Ok(Some(relative))
        }
        Err(e) => {
            let path = Utf8PathBuf::from(e.path().to_string_lossy().into_owned());
            Err(BuildPlanError::filesystem(path, e.into_error()))
        }
    }
}

fn fetch_metadata(
    handles: &mut RootDirs<'_>,
    path: &Utf8Path,
    matched: &Utf8Path,
) -> Result<Metadata> {
    let (dir, relative) = handles.locate(path)?;
    dir.metadata(relative)
        .map_err(|err| BuildPlanError::filesystem(matched, err))
}

fn relative_to(root: &Utf8Path, path: &Utf8Path) -> Utf8PathBuf {
    let stripped = if root.as_str().is_empty() {
        path
    } else {
        path.strip_prefix(root).unwrap_or(path)
    };
    Utf8PathBuf::from(stripped.as_str().replace('\\', "/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/work/proj", "/work/proj/src/a.c", "src/a.c")]
    #[case(".", "./src/a.c", "src/a.c")]
    #[case("", "src/a.c", "src/a.c")]
    #[case("/elsewhere", "/work/src/a.c", "/work/src/a.c")]
    fn relative_to_strips_root(#[case] root: &str, #[case] path: &str, #[case] expected: &str) {
        let actual = relative_to(Utf8Path::new(root), Utf8Path::new(path));
        assert_eq!(actual, Utf8PathBuf::from(expected));
    }

    #[cfg(unix)]
    #[test]
    fn process_glob_entry_rejects_non_utf8_paths() {
        use std::ffi::OsString;
        use std::os::unix::ffi::OsStringExt;

        let path = std::path::PathBuf::from(OsString::from_vec(b"bad\xFF".to_vec()));
        let root = Utf8Path::new(".");
        let err = process_glob_entry(Ok(path), root, &mut RootDirs::new(root))
            .expect_err("non-UTF-8 path should be rejected");
        assert!(matches!(err, BuildPlanError::Filesystem { .. }), "got {err:?}");
    }
}
