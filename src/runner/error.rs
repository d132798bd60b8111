//! Error types for the runner module.

// Scoped suppression for version-dependent lint false positives from
// miette/thiserror derive macros.
// FIXME(rust-lang/rust#130021): remove once upstream is fixed.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use std::path::PathBuf;
use std::process::ExitStatus;

use miette::Diagnostic;
use thiserror::Error;

/// Errors raised while running the external `make`.
#[derive(Debug, Error, Diagnostic)]
pub enum RunnerError {
    /// The executable could not be started.
    #[error("failed to start '{}'", .program.display())]
    #[diagnostic(
        code(makegraph::runner::spawn),
        help("install make or pass --make with the path to a compatible executable")
    )]
    Spawn {
        /// Program that failed to start.
        program: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// `make` ran but reported failure.
    #[error("'{}' exited with {status}", .program.display())]
    #[diagnostic(code(makegraph::runner::make_failed))]
    MakeFailed {
        /// Program that failed.
        program: PathBuf,
        /// Exit status reported by the process.
        status: ExitStatus,
    },
}

impl RunnerError {
    /// Exit code to forward to the caller, when the process reported one.
    #[must_use]
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::MakeFailed { status, .. } => status.code(),
            Self::Spawn { .. } => None,
        }
    }
}
