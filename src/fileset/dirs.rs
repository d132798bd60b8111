//! Capability-based directory handles rooted at the project.
//!
//! Every filesystem access below the project root goes through a
//! `cap_std::fs_utf8::Dir`. Relative paths resolve against the project root;
//! absolute paths resolve against `/`.

use camino::Utf8Path;
use cap_std::{ambient_authority, fs_utf8::Dir};

use crate::error::{BuildPlanError, Result};

/// Lazily opened handles for the project root and the filesystem root.
#[derive(Debug)]
pub struct RootDirs<'r> {
    root: &'r Utf8Path,
    project: Option<Dir>,
    system: Option<Dir>,
}

impl<'r> RootDirs<'r> {
    /// Handles for `root`; nothing is opened until first use.
    #[must_use]
    pub const fn new(root: &'r Utf8Path) -> Self {
        Self {
            root,
            project: None,
            system: None,
        }
    }

    /// Directory handle and handle-relative path for `path`.
    ///
    /// The relative path is `.` when `path` names the handle's own directory.
    ///
    /// # Errors
    ///
    /// Returns [`BuildPlanError::Filesystem`] when the directory cannot be
    /// opened.
    pub fn locate<'p>(&mut self, path: &'p Utf8Path) -> Result<(&Dir, &'p Utf8Path)> {
        if path.is_absolute() {
            let stripped = path.as_str().trim_start_matches(['/', '\\']);
            let relative = if stripped.is_empty() { "." } else { stripped };
            let dir = open_cached(&mut self.system, Utf8Path::new("/"))?;
            return Ok((dir, Utf8Path::new(relative)));
        }
        let root = if self.root.as_str().is_empty() {
            Utf8Path::new(".")
        } else {
            self.root
        };
        let dir = open_cached(&mut self.project, root)?;
        let relative = if path.as_str().is_empty() {
            Utf8Path::new(".")
        } else {
            path
        };
        Ok((dir, relative))
    }

    /// Create `path` and its parents.
    ///
    /// # Errors
    ///
    /// Returns [`BuildPlanError::Filesystem`] when a directory cannot be
    /// opened or created.
    pub fn create_dir_all(&mut self, path: &Utf8Path) -> Result<()> {
        let full = self.root.join(path);
        let (dir, relative) = self.locate(path)?;
        if relative.as_str() == "." {
            return Ok(());
        }
        dir.create_dir_all(relative)
            .map_err(|err| BuildPlanError::filesystem(full, err))
    }
}

/// Create every directory in `dirs` (and their parents) beneath `root`.
///
/// Existing directories are left untouched, so calling this repeatedly is
/// harmless. Absolute entries are created from the filesystem root.
///
/// # Errors
///
/// Returns [`BuildPlanError::Filesystem`] when `root` cannot be opened or a
/// directory cannot be created.
pub fn ensure_directories<'a, I>(root: &Utf8Path, dirs: I) -> Result<()>
where
    I: IntoIterator<Item = &'a Utf8Path>,
{
    let mut handles = RootDirs::new(root);
    for dir in dirs {
        if dir.as_str().is_empty() {
            continue;
        }
        handles.create_dir_all(dir)?;
        tracing::debug!(directory = %dir, "ensured directory exists");
    }
    Ok(())
}

fn open_cached<'c>(slot: &'c mut Option<Dir>, path: &Utf8Path) -> Result<&'c Dir> {
    if slot.is_none() {
        let opened = Dir::open_ambient_dir(path, ambient_authority())
            .map_err(|err| BuildPlanError::filesystem(path, err))?;
        *slot = Some(opened);
    }
    slot.as_ref().ok_or_else(|| {
        BuildPlanError::filesystem(
            path,
            std::io::Error::other("directory handle unavailable after opening"),
        )
    })
}
