//! Fake `make` executables for end-to-end tests.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A fake `make` script and the file it records its arguments in.
#[derive(Debug)]
pub struct FakeMake {
    _dir: TempDir,
    /// Path to the executable script.
    pub program: PathBuf,
    /// File receiving one argument per line on every run.
    pub log: PathBuf,
}

impl FakeMake {
    /// Arguments recorded by the last run, one per line.
    ///
    /// # Errors
    ///
    /// Returns an error when the script has not run yet.
    pub fn recorded_args(&self) -> Result<Vec<String>> {
        let text = fs::read_to_string(&self.log)
            .with_context(|| format!("read fake make log {}", self.log.display()))?;
        Ok(text.lines().map(str::to_owned).collect())
    }
}

/// Make a script file executable on Unix platforms.
#[cfg(unix)]
fn make_script_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = fs::metadata(path)
        .with_context(|| format!("read metadata {}", path.display()))?
        .permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms)
        .with_context(|| format!("set permissions {}", path.display()))?;
    Ok(())
}

#[cfg(not(unix))]
fn make_script_executable(_path: &Path) -> Result<()> {
    Ok(())
}

/// Create a fake `make` that logs its arguments and exits with `exit_code`.
///
/// The script also fails with status `2` when the file after `-f` does not
/// exist, mirroring how a real `make` reacts to a missing Makefile.
///
/// # Errors
///
/// Returns an error if the script cannot be written.
pub fn fake_make(exit_code: i32) -> Result<FakeMake> {
    let dir = TempDir::new().context("fake_make: create temp dir")?;
    let program = dir.path().join("make");
    let log = dir.path().join("make.args");
    let mut file = File::create(&program)
        .with_context(|| format!("fake_make: create script {}", program.display()))?;
    writeln!(
        file,
        concat!(
            "#!/bin/sh\n",
            ": > '{log}'\n",
            "for arg in \"$@\"; do printf '%s\\n' \"$arg\" >> '{log}'; done\n",
            "while [ $# -gt 0 ]; do\n",
            "  if [ \"$1\" = \"-f\" ] && [ ! -f \"$2\" ]; then exit 2; fi\n",
            "  shift\n",
            "done\n",
            "exit {code}"
        ),
        log = log.display(),
        code = exit_code,
    )
    .with_context(|| format!("fake_make: write script {}", program.display()))?;
    drop(file);
    make_script_executable(&program)?;
    Ok(FakeMake {
        _dir: dir,
        program,
        log,
    })
}
