//! Build targets: named nodes of the dependency graph.
//!
//! A [`Target`] owns its sources (mapped to object files), headers, compiler
//! flags, include paths and the names of the targets it depends on. Targets
//! are created through [`crate::registry::Registry`], which enforces name
//! uniqueness.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::fileset;

mod layout;

pub use layout::Layout;

/// The flavour of a target, which decides its default artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// Objects meant to be linked into other targets; produces no artifact.
    Library,
    /// A linked program named after the target.
    Executable,
}

impl TargetKind {
    /// Artifact names a target of this kind produces by default.
    #[must_use]
    pub fn default_artifacts(self, name: &str, layout: &Layout) -> BTreeSet<String> {
        match self {
            Self::Library => BTreeSet::new(),
            Self::Executable => BTreeSet::from([format!("{name}{}", layout.exe_suffix)]),
        }
    }
}

/// Anything that can name a dependency: a target name or a target itself.
pub trait DependencyRef {
    /// Name of the referenced target.
    fn dependency_name(&self) -> &str;
}

impl DependencyRef for str {
    fn dependency_name(&self) -> &str {
        self
    }
}

impl DependencyRef for String {
    fn dependency_name(&self) -> &str {
        self
    }
}

impl DependencyRef for Target {
    fn dependency_name(&self) -> &str {
        &self.name
    }
}

impl<T: DependencyRef + ?Sized> DependencyRef for &T {
    fn dependency_name(&self) -> &str {
        (**self).dependency_name()
    }
}

/// A named unit of the build graph.
#[derive(Debug, Clone)]
pub struct Target {
    name: String,
    kind: TargetKind,
    layout: Arc<Layout>,
    artifacts: BTreeSet<String>,
    sources: BTreeMap<Utf8PathBuf, Utf8PathBuf>,
    headers: BTreeSet<Utf8PathBuf>,
    cflags: Vec<String>,
    includes: Vec<String>,
    dependencies: IndexSet<String>,
}

impl Target {
    pub(crate) fn new(kind: TargetKind, name: impl Into<String>, layout: Arc<Layout>) -> Self {
        let target_name = name.into();
        let artifacts = kind.default_artifacts(&target_name, &layout);
        Self {
            name: target_name,
            kind,
            layout,
            artifacts,
            sources: BTreeMap::new(),
            headers: BTreeSet::new(),
            cflags: Vec::new(),
            includes: Vec::new(),
            dependencies: IndexSet::new(),
        }
    }

    /// Unique name of the target.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Library or executable.
    #[must_use]
    pub const fn kind(&self) -> TargetKind {
        self.kind
    }

    /// Bare artifact file names.
    #[must_use]
    pub const fn artifacts(&self) -> &BTreeSet<String> {
        &self.artifacts
    }

    /// Source path to object path mapping.
    #[must_use]
    pub const fn sources(&self) -> &BTreeMap<Utf8PathBuf, Utf8PathBuf> {
        &self.sources
    }

    /// Headers that trigger a rebuild of this target's objects.
    #[must_use]
    pub const fn headers(&self) -> &BTreeSet<Utf8PathBuf> {
        &self.headers
    }

    /// Target-specific compiler flags in first-seen order.
    #[must_use]
    pub fn cflags(&self) -> &[String] {
        &self.cflags
    }

    /// Include search paths in first-seen order.
    #[must_use]
    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    /// Names of directly required targets in declaration order.
    #[must_use]
    pub const fn dependencies(&self) -> &IndexSet<String> {
        &self.dependencies
    }

    /// Expand `patterns` and map every match to its object path.
    ///
    /// `skip` leading components are dropped from each source path before it
    /// is placed under the object directory; see [`fileset::object_path`].
    ///
    /// # Errors
    ///
    /// Propagates [`fileset::expand`] failures.
    pub fn add_sources_glob<I, S>(&mut self, patterns: I, skip: usize) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let found = fileset::expand(&self.layout.root, patterns)?;
        for source in found {
            let object = fileset::object_path(&self.layout.obj_dir, &source, skip);
            self.sources.insert(source, object);
        }
        Ok(self)
    }

    /// Expand `patterns` into the header set.
    ///
    /// # Errors
    ///
    /// Propagates [`fileset::expand`] failures.
    pub fn add_headers_glob<I, S>(&mut self, patterns: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let found = fileset::expand(&self.layout.root, patterns)?;
        self.headers.extend(found);
        Ok(self)
    }

    /// Add one source path without glob expansion.
    ///
    /// The path is taken as given, relative to the project root, and need not
    /// exist yet.
    pub fn add_source(&mut self, source: impl Into<Utf8PathBuf>, skip: usize) -> &mut Self {
        let path = source.into();
        let object = fileset::object_path(&self.layout.obj_dir, &path, skip);
        self.sources.insert(path, object);
        self
    }

    /// Add header paths without glob expansion.
    pub fn add_headers<I, P>(&mut self, headers: I) -> &mut Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Utf8PathBuf>,
    {
        self.headers.extend(headers.into_iter().map(Into::into));
        self
    }

    /// Append include paths that are not already present.
    pub fn add_includes<I, S>(&mut self, paths: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        push_unique(&mut self.includes, paths);
        self
    }

    /// Append compiler flags that are not already present.
    pub fn add_flags<I, S>(&mut self, flags: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        push_unique(&mut self.cflags, flags);
        self
    }

    /// Record dependencies on other targets, by name or by reference.
    pub fn add_dependencies<I, D>(&mut self, deps: I) -> &mut Self
    where
        I: IntoIterator<Item = D>,
        D: DependencyRef,
    {
        for dep in deps {
            let name = dep.dependency_name();
            if !self.dependencies.contains(name) {
                self.dependencies.insert(name.to_owned());
            }
        }
        self
    }

    /// Artifact names joined onto the build directory.
    #[must_use]
    pub fn artifact_paths(&self) -> BTreeSet<Utf8PathBuf> {
        self.artifacts
            .iter()
            .map(|artifact| self.layout.build_dir.join(artifact))
            .collect()
    }

    /// Object paths of every source, sorted.
    #[must_use]
    pub fn object_paths(&self) -> BTreeSet<&Utf8Path> {
        self.sources.values().map(Utf8PathBuf::as_path).collect()
    }

    /// Distinct parent directories of the object paths.
    #[must_use]
    pub fn object_directories(&self) -> BTreeSet<&Utf8Path> {
        self.sources
            .values()
            .filter_map(|object| object.parent())
            .collect()
    }

    /// Create every object directory this target writes into.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::BuildPlanError::Filesystem`] when a directory
    /// cannot be created.
    pub fn ensure_object_directories(&self) -> Result<()> {
        fileset::ensure_directories(&self.layout.root, self.object_directories())
    }
}

fn push_unique<I, S>(list: &mut Vec<String>, items: I)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    for item in items {
        let value = item.into();
        if !list.contains(&value) {
            list.push(value);
        }
    }
}
