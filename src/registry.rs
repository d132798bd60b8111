//! The target registry: every target of one generation run, by name.
//!
//! The registry is an explicit value rather than process-wide state, so a
//! generator can be driven repeatedly (in tests, say) without leftovers from
//! an earlier run. It is mutated while targets are declared and only read
//! while the Makefile is emitted.

use std::sync::Arc;

use camino::{Utf8Component, Utf8Path};
use indexmap::IndexMap;
use itertools::Itertools;
use tracing::debug;

use crate::error::{BuildPlanError, Result};
use crate::target::{Layout, Target, TargetKind};

/// Goals every generated Makefile defines; no target may take these names.
pub const RESERVED_GOALS: &[&str] = &["all", "default"];

/// Name-indexed collection of targets in registration order.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    layout: Arc<Layout>,
    targets: IndexMap<String, Target>,
}

impl Registry {
    /// Create an empty registry whose targets share `layout`.
    #[must_use]
    pub fn new(layout: Layout) -> Self {
        Self {
            layout: Arc::new(layout),
            targets: IndexMap::new(),
        }
    }

    /// Directory conventions used by every target.
    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Declare a new target and return it for further configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BuildPlanError::DuplicateTargetName`] when `name` is already
    /// taken; the existing target is left untouched.
    /// [`BuildPlanError::ReservedTargetName`] rejects [`RESERVED_GOALS`], and
    /// [`BuildPlanError::ArtifactShadowsTarget`] rejects a target whose
    /// artifact would be built by a rule named after the target itself.
    ///
    /// # Examples
    ///
    /// ```
    /// use makegraph::registry::Registry;
    /// use makegraph::target::{Layout, TargetKind};
    ///
    /// let mut registry = Registry::new(Layout::default());
    /// registry.declare(TargetKind::Library, "core").unwrap();
    /// assert!(registry.declare(TargetKind::Executable, "core").is_err());
    /// assert_eq!(registry.len(), 1);
    /// ```
    pub fn declare(&mut self, kind: TargetKind, name: &str) -> Result<&mut Target> {
        if RESERVED_GOALS.contains(&name) {
            return Err(BuildPlanError::ReservedTargetName {
                name: name.to_owned(),
            });
        }
        if self.targets.contains_key(name) {
            return Err(BuildPlanError::DuplicateTargetName {
                name: name.to_owned(),
            });
        }
        let target = Target::new(kind, name, Arc::clone(&self.layout));
        if let Some(artifact) = target
            .artifact_paths()
            .into_iter()
            .find(|artifact| goal_name(artifact) == name)
        {
            return Err(BuildPlanError::ArtifactShadowsTarget {
                name: name.to_owned(),
                artifact,
            });
        }
        debug!(target_name = name, ?kind, "declared target");
        let entry = self.targets.entry(name.to_owned()).or_insert(target);
        Ok(entry)
    }

    /// Declare a library target.
    ///
    /// # Errors
    ///
    /// See [`Registry::declare`].
    pub fn library(&mut self, name: &str) -> Result<&mut Target> {
        self.declare(TargetKind::Library, name)
    }

    /// Declare an executable target.
    ///
    /// # Errors
    ///
    /// See [`Registry::declare`].
    pub fn executable(&mut self, name: &str) -> Result<&mut Target> {
        self.declare(TargetKind::Executable, name)
    }

    /// Look up a target by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Target> {
        self.targets.get(name)
    }

    /// Look up a dependency of `dependent`, failing when it is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`BuildPlanError::UnresolvedDependency`] when `name` is not
    /// registered.
    pub fn resolve(&self, dependent: &str, name: &str) -> Result<&Target> {
        self.targets
            .get(name)
            .ok_or_else(|| BuildPlanError::UnresolvedDependency {
                target: dependent.to_owned(),
                dependency: name.to_owned(),
            })
    }

    /// Iterate over targets in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Target> {
        self.targets.values()
    }

    /// Target names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.targets.keys().map(String::as_str)
    }

    /// Targets sorted by name.
    #[must_use]
    pub fn sorted(&self) -> Vec<&Target> {
        let mut targets: Vec<&Target> = self.targets.values().collect();
        targets.sort_by(|a, b| a.name().cmp(b.name()));
        targets
    }

    /// Number of registered targets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether no target has been declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Create the object directories of every target.
    ///
    /// # Errors
    ///
    /// Returns [`BuildPlanError::Filesystem`] when a directory cannot be
    /// created.
    pub fn ensure_object_directories(&self) -> Result<()> {
        for target in self.targets.values() {
            target.ensure_object_directories()?;
        }
        Ok(())
    }
}

/// The goal `make` matches for `path`; `./` components are dropped.
fn goal_name(path: &Utf8Path) -> String {
    path.components()
        .filter(|component| *component != Utf8Component::CurDir)
        .map(|component| component.as_str())
        .join("/")
}
