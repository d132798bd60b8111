//! Version stamping.
//!
//! The project version comes from the manifest. Debug builds additionally
//! carry a build counter as a pre-release component (`0.1.0-7`), persisted
//! between runs by a [`BuildCounter`]. The generator only consumes the final
//! string through [`crate::flags::version_flag`].

use camino::Utf8PathBuf;
use semver::{Prerelease, Version};
use tracing::{debug, warn};

use crate::error::{BuildPlanError, Result};
use crate::fileset::RootDirs;
use crate::flags::BuildMode;
use crate::target::Layout;

/// Source of monotonically increasing build numbers.
pub trait BuildCounter {
    /// Advance the counter and return the new value.
    fn next_build(&mut self) -> u64;
}

/// A counter persisted as a decimal number in a small file.
///
/// The file is read and written through a [`RootDirs`] handle anchored at
/// the project root. A missing or unreadable file counts as zero. Failing to
/// save the new value is logged and otherwise ignored, since the counter
/// only decorates the version string.
#[derive(Debug, Clone)]
pub struct BumpFile {
    root: Utf8PathBuf,
    path: Utf8PathBuf,
}

impl BumpFile {
    /// File name used inside the build directory.
    pub const FILE_NAME: &'static str = "bump";

    /// Use the counter stored at `path`, resolved against `root`.
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>, path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            root: root.into(),
            path: path.into(),
        }
    }

    /// Use `<build_dir>/bump` of `layout`.
    #[must_use]
    pub fn in_build_dir(layout: &Layout) -> Self {
        Self::new(&layout.root, layout.build_dir.join(Self::FILE_NAME))
    }

    /// Location of the counter file.
    #[must_use]
    pub fn path(&self) -> Utf8PathBuf {
        self.root.join(&self.path)
    }

    fn read(&self) -> u64 {
        let mut handles = RootDirs::new(&self.root);
        handles
            .locate(&self.path)
            .ok()
            .and_then(|(dir, relative)| dir.read_to_string(relative).ok())
            .and_then(|text| text.trim().parse().ok())
            .unwrap_or(0)
    }

    fn write(&self, value: u64) -> Result<()> {
        let mut handles = RootDirs::new(&self.root);
        if let Some(parent) = self.path.parent().filter(|p| !p.as_str().is_empty()) {
            handles.create_dir_all(parent)?;
        }
        let (dir, relative) = handles.locate(&self.path)?;
        dir.write(relative, value.to_string())
            .map_err(|err| BuildPlanError::filesystem(self.path(), err))
    }
}

impl BuildCounter for BumpFile {
    fn next_build(&mut self) -> u64 {
        let next = self.read().saturating_add(1);
        if let Err(err) = self.write(next) {
            warn!(path = %self.path(), error = %err, "failed to save build counter");
        }
        debug!(path = %self.path(), build = next, "advanced build counter");
        next
    }
}

/// Version string for `mode`.
///
/// The counter is always advanced so the persisted number keeps increasing
/// across mixed debug and release runs; only debug builds show it.
///
/// # Examples
///
/// ```
/// use makegraph::flags::BuildMode;
/// use makegraph::version::{BuildCounter, stamp};
///
/// struct Fixed;
/// impl BuildCounter for Fixed {
///     fn next_build(&mut self) -> u64 { 7 }
/// }
///
/// let base = semver::Version::new(0, 1, 0);
/// assert_eq!(stamp(&base, BuildMode::Debug, &mut Fixed), "0.1.0-7");
/// assert_eq!(stamp(&base, BuildMode::Release, &mut Fixed), "0.1.0");
/// ```
pub fn stamp(base: &Version, mode: BuildMode, counter: &mut impl BuildCounter) -> String {
    let build = counter.next_build();
    match mode {
        BuildMode::Release => base.to_string(),
        BuildMode::Debug => {
            let mut stamped = base.clone();
            match Prerelease::new(&build.to_string()) {
                Ok(pre) => stamped.pre = pre,
                Err(err) => warn!(error = %err, "build counter is not a valid pre-release"),
            }
            stamped.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result, ensure};
    use camino::Utf8Path;
    use std::fs;
    use tempfile::tempdir;

    fn bump_in(dir: &tempfile::TempDir) -> Result<BumpFile> {
        let root = Utf8Path::from_path(dir.path()).context("UTF-8 temp dir")?;
        Ok(BumpFile::in_build_dir(&Layout::rooted(root)))
    }

    #[test]
    fn counter_starts_at_one_and_persists() -> Result<()> {
        let dir = tempdir()?;
        let mut counter = bump_in(&dir)?;
        ensure!(counter.next_build() == 1, "first build should be 1");
        ensure!(counter.next_build() == 2, "second build should be 2");
        let stored = fs::read_to_string(counter.path())?;
        ensure!(stored == "2", "unexpected stored value {stored:?}");
        Ok(())
    }

    #[test]
    fn unreadable_counter_restarts() -> Result<()> {
        let dir = tempdir()?;
        let mut counter = bump_in(&dir)?;
        fs::create_dir_all(dir.path().join("build"))?;
        fs::write(counter.path(), "not a number")?;
        ensure!(counter.next_build() == 1, "garbage should count as zero");
        Ok(())
    }

    #[test]
    fn release_stamp_still_advances_counter() -> Result<()> {
        let dir = tempdir()?;
        let mut counter = bump_in(&dir)?;
        let base = Version::new(1, 2, 3);
        ensure!(stamp(&base, BuildMode::Release, &mut counter) == "1.2.3");
        ensure!(stamp(&base, BuildMode::Debug, &mut counter) == "1.2.3-2");
        Ok(())
    }

    #[test]
    fn absolute_build_dir_is_honoured() -> Result<()> {
        let project = tempdir()?;
        let elsewhere = tempdir()?;
        let root = Utf8Path::from_path(project.path()).context("UTF-8 temp dir")?;
        let out = Utf8Path::from_path(elsewhere.path()).context("UTF-8 temp dir")?;
        let layout = Layout::rooted(root).with_build_dir(out.join("nested/build"));
        let mut counter = BumpFile::in_build_dir(&layout);
        ensure!(counter.next_build() == 1);
        ensure!(fs::read_to_string(out.join("nested/build/bump"))? == "1");
        Ok(())
    }
}
