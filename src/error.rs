//! Error taxonomy for build-plan construction and Makefile emission.
//!
//! Every variant is fatal: the generator never retries and never writes a
//! partial Makefile once one of these has been raised.

// The `unused_assignments` lint fires on miette/thiserror derive expansions in
// some toolchains only, so `#[expect]` cannot be used here.
// FIXME(rust-lang/rust#130021): remove once upstream is fixed.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

/// Errors raised while declaring targets or generating the Makefile.
#[derive(Debug, Error, Diagnostic)]
pub enum BuildPlanError {
    /// A target name was registered twice.
    #[error("target '{name}' is already declared")]
    #[diagnostic(
        code(makegraph::registry::duplicate_target),
        help("target names must be unique within a project")
    )]
    DuplicateTargetName {
        /// The colliding target name.
        name: String,
    },

    /// A target name collides with a goal the generated Makefile defines.
    #[error("target name '{name}' is reserved")]
    #[diagnostic(
        code(makegraph::registry::reserved_name),
        help("`all` and `default` are generated goals; rename the target")
    )]
    ReservedTargetName {
        /// The rejected target name.
        name: String,
    },

    /// A target's artifact path is the same make goal as the target itself.
    #[error("artifact '{artifact}' of target '{name}' is the target's own goal")]
    #[diagnostic(
        code(makegraph::registry::artifact_shadows_target),
        help("choose a build_dir other than the project root")
    )]
    ArtifactShadowsTarget {
        /// Target producing the artifact.
        name: String,
        /// The offending artifact path.
        artifact: Utf8PathBuf,
    },

    /// A dependency names a target that was never registered.
    #[error("target '{target}' depends on unknown target '{dependency}'")]
    #[diagnostic(code(makegraph::graph::unresolved_dependency))]
    UnresolvedDependency {
        /// Target declaring the dependency.
        target: String,
        /// The missing dependency name.
        dependency: String,
    },

    /// Target dependencies form a cycle.
    #[error("circular dependency between targets: {}", .cycle.join(" -> "))]
    #[diagnostic(code(makegraph::graph::circular_dependency))]
    CircularDependency {
        /// Cycle path, starting and ending at the same target.
        cycle: Vec<String>,
    },

    /// A glob pattern failed to parse.
    #[error("invalid glob pattern '{pattern}': {detail}")]
    #[diagnostic(code(makegraph::fileset::invalid_pattern))]
    InvalidPattern {
        /// Pattern as supplied by the caller.
        pattern: String,
        /// Parser message describing the problem.
        detail: String,
    },

    /// Reading a directory listing, creating a directory or writing a file
    /// failed.
    #[error("filesystem operation failed for '{path}'")]
    #[diagnostic(code(makegraph::fs))]
    Filesystem {
        /// Path involved in the failing operation.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The project manifest could not be parsed.
    #[error("manifest '{name}' is invalid: {message}")]
    #[diagnostic(
        code(makegraph::manifest::parse),
        help("check the manifest against the documented schema")
    )]
    Manifest {
        /// Display name of the manifest (usually its path).
        name: String,
        /// Parser message.
        message: String,
    },
}

impl BuildPlanError {
    /// Wrap an [`std::io::Error`] with the path it concerns.
    pub fn filesystem(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }
}

/// Result alias used across the crate.
pub type Result<T, E = BuildPlanError> = std::result::Result<T, E>;
