//! Invocation of the external `make` executor.

use std::path::Path;
use std::process::Command;

use camino::Utf8Path;
use tracing::info;

use super::RunnerError;

/// Everything needed to run `make` on a generated Makefile.
#[derive(Debug, Clone, Copy)]
pub struct MakeInvocation<'a> {
    /// Executable to run.
    pub program: &'a Path,
    /// Working directory (the project root).
    pub directory: &'a Utf8Path,
    /// Generated Makefile.
    pub makefile: &'a Utf8Path,
    /// Parallelism hint passed as `-j<N>`.
    pub jobs: usize,
    /// Pass `-B` to rebuild everything.
    pub always_make: bool,
    /// Goals to build; empty means the Makefile's default goal.
    pub goals: &'a [String],
}

impl MakeInvocation<'_> {
    /// Arguments passed to the program, in order.
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if self.always_make {
            args.push("-B".to_owned());
        }
        args.push(format!("-j{}", self.jobs));
        args.push("-f".to_owned());
        // Unresolvable paths are passed through for `make` to report.
        let makefile = self
            .makefile
            .canonicalize_utf8()
            .unwrap_or_else(|_| self.makefile.to_path_buf());
        args.push(makefile.into_string());
        args.push("--no-print-directory".to_owned());
        args.extend(self.goals.iter().cloned());
        args
    }
}

/// Run `make` with inherited standard streams and wait for it.
///
/// # Errors
///
/// Returns [`RunnerError::Spawn`] when the program cannot be started and
/// [`RunnerError::MakeFailed`] when it exits unsuccessfully.
pub fn run_make(invocation: &MakeInvocation<'_>) -> Result<(), RunnerError> {
    let args = invocation.args();
    let mut cmd = Command::new(invocation.program);
    cmd.current_dir(invocation.directory).args(&args);
    info!(
        "Running command: {} {}",
        invocation.program.display(),
        args.join(" ")
    );
    let status = cmd.status().map_err(|source| RunnerError::Spawn {
        program: invocation.program.to_path_buf(),
        source,
    })?;
    if status.success() {
        Ok(())
    } else {
        Err(RunnerError::MakeFailed {
            program: invocation.program.to_path_buf(),
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_follow_make_conventions() {
        let goals = vec!["test".to_owned()];
        let invocation = MakeInvocation {
            program: Path::new("make"),
            directory: Utf8Path::new("."),
            makefile: Utf8Path::new("/does/not/exist/Makefile"),
            jobs: 4,
            always_make: true,
            goals: &goals,
        };
        assert_eq!(
            invocation.args(),
            [
                "-B",
                "-j4",
                "-f",
                "/does/not/exist/Makefile",
                "--no-print-directory",
                "test"
            ]
        );
    }

    #[test]
    fn args_omit_force_by_default() {
        let invocation = MakeInvocation {
            program: Path::new("make"),
            directory: Utf8Path::new("."),
            makefile: Utf8Path::new("missing.mk"),
            jobs: 1,
            always_make: false,
            goals: &[],
        };
        assert_eq!(
            invocation.args(),
            ["-j1", "-f", "missing.mk", "--no-print-directory"]
        );
    }
}
