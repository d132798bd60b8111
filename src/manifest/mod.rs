//! Manifest loading and registry construction.
//!
//! A manifest is parsed with `serde-saphyr` and then replayed against a fresh
//! [`Registry`]: each [`TargetSpec`] becomes a declared target whose globs
//! are expanded relative to the project root.

use std::fs;

use camino::Utf8Path;
use tracing::debug;

use crate::ast::{ProjectManifest, TargetSpec};
use crate::error::{BuildPlanError, Result};
use crate::registry::Registry;
use crate::target::Layout;

/// Default manifest file name.
pub const DEFAULT_MANIFEST: &str = "makegraph.yml";

/// Parse manifest text; `name` labels errors.
///
/// # Errors
///
/// Returns [`BuildPlanError::Manifest`] when the YAML is malformed or does
/// not match the schema.
pub fn from_str_named(yaml: &str, name: &str) -> Result<ProjectManifest> {
    serde_saphyr::from_str(yaml).map_err(|err| BuildPlanError::Manifest {
        name: name.to_owned(),
        message: err.to_string(),
    })
}

/// Parse manifest text.
///
/// # Errors
///
/// See [`from_str_named`].
pub fn from_str(yaml: &str) -> Result<ProjectManifest> {
    from_str_named(yaml, DEFAULT_MANIFEST)
}

/// Load a manifest from `path`.
///
/// # Errors
///
/// Returns [`BuildPlanError::Filesystem`] when the file cannot be read and
/// [`BuildPlanError::Manifest`] when it cannot be parsed.
pub fn from_path(path: &Utf8Path) -> Result<ProjectManifest> {
    let data = fs::read_to_string(path).map_err(|err| BuildPlanError::filesystem(path, err))?;
    from_str_named(&data, path.as_str())
}

/// Directory layout described by `manifest`, rooted at `root`.
#[must_use]
pub fn layout(manifest: &ProjectManifest, root: &Utf8Path) -> Layout {
    let mut layout = Layout::rooted(root);
    if let Some(build_dir) = &manifest.build_dir {
        layout = layout.with_build_dir(build_dir.clone());
    }
    if let Some(obj_dir) = &manifest.obj_dir {
        layout = layout.with_obj_dir(obj_dir.clone());
    }
    layout
}

/// Declare every target of `manifest` in a new registry.
///
/// # Errors
///
/// Returns [`BuildPlanError::DuplicateTargetName`] for repeated names and
/// propagates glob expansion failures.
pub fn build_registry(manifest: &ProjectManifest, root: &Utf8Path) -> Result<Registry> {
    let mut registry = Registry::new(layout(manifest, root));
    for spec in &manifest.targets {
        declare(&mut registry, spec)?;
    }
    debug!(
        project = %manifest.project,
        targets = registry.len(),
        "registry populated from manifest"
    );
    Ok(registry)
}

fn declare(registry: &mut Registry, spec: &TargetSpec) -> Result<()> {
    let target = registry.declare(spec.kind, &spec.name)?;
    target
        .add_sources_glob(&spec.sources, spec.object_skip)?
        .add_headers_glob(&spec.headers)?
        .add_includes(spec.includes.iter().cloned())
        .add_flags(spec.cflags.iter().cloned())
        .add_dependencies(&spec.dependencies);
    Ok(())
}

#[cfg(test)]
mod tests;
