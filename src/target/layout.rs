//! Directory conventions shared by every target of a project.

use camino::Utf8PathBuf;

/// Where sources are found and where outputs go.
///
/// `root` anchors glob patterns and directory creation. `build_dir` and
/// `obj_dir` are written into the Makefile verbatim, so they are normally
/// relative to `root`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Project root directory.
    pub root: Utf8PathBuf,
    /// Directory receiving linked artifacts.
    pub build_dir: Utf8PathBuf,
    /// Directory receiving object files.
    pub obj_dir: Utf8PathBuf,
    /// Suffix appended to executable names.
    pub exe_suffix: String,
}

impl Layout {
    /// Default build directory name.
    pub const BUILD_DIR: &'static str = "build";
    /// Object directory name inside the build directory.
    pub const OBJ_SUBDIR: &'static str = "obj";

    /// Conventional layout rooted at `root`: `build/` and `build/obj/`.
    #[must_use]
    pub fn rooted(root: impl Into<Utf8PathBuf>) -> Self {
        let build_dir = Utf8PathBuf::from(Self::BUILD_DIR);
        let obj_dir = build_dir.join(Self::OBJ_SUBDIR);
        Self {
            root: root.into(),
            build_dir,
            obj_dir,
            exe_suffix: std::env::consts::EXE_SUFFIX.to_owned(),
        }
    }

    /// Replace the build directory; the object directory follows it.
    #[must_use]
    pub fn with_build_dir(mut self, build_dir: impl Into<Utf8PathBuf>) -> Self {
        self.build_dir = build_dir.into();
        self.obj_dir = self.build_dir.join(Self::OBJ_SUBDIR);
        self
    }

    /// Replace the object directory.
    #[must_use]
    pub fn with_obj_dir(mut self, obj_dir: impl Into<Utf8PathBuf>) -> Self {
        self.obj_dir = obj_dir.into();
        self
    }

    /// Replace the executable suffix.
    #[must_use]
    pub fn with_exe_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.exe_suffix = suffix.into();
        self
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::rooted(".")
    }
}
