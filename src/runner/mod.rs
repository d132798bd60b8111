//! CLI execution and command dispatch logic.
//!
//! This module keeps `main` minimal by providing a single entry point that
//! loads the manifest, generates the Makefile, writes it atomically and, for
//! `build`, hands it to `make`.

use std::io::{self, Write};

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, info};

use crate::cli::{BuildArgs, Cli, Commands};
use crate::error::BuildPlanError;
use crate::fileset::RootDirs;
use crate::flags;
use crate::make_gen::{self, MakefileSettings};
use crate::manifest;
use crate::version::{self, BumpFile};

mod error;
mod process;

pub use error::RunnerError;
pub use process::{MakeInvocation, run_make};

/// Makefile name used when `--emit` is not given.
pub const DEFAULT_MAKEFILE: &str = "Makefile";

/// Execute the parsed [`Cli`] commands.
///
/// # Errors
///
/// Returns an error if the manifest cannot be loaded, generation fails, the
/// Makefile cannot be written or `make` fails.
pub fn run(cli: &Cli) -> Result<()> {
    let root = cli.project_dir();
    let command = cli
        .command
        .clone()
        .unwrap_or_else(|| Commands::Build(BuildArgs::default()));
    match command {
        Commands::Build(args) => {
            let makefile = generate_makefile(cli, &root)?;
            let relative = args
                .emit
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_MAKEFILE));
            write_atomically(&root, &relative, &makefile)?;
            let path = root.join(&relative);
            let invocation = MakeInvocation {
                program: &args.make,
                directory: &root,
                makefile: &path,
                jobs: cli.jobs_or_default(),
                always_make: args.always_make,
                goals: &args.targets,
            };
            run_make(&invocation)?;
            Ok(())
        }
        Commands::Manifest { file } => {
            let makefile = generate_makefile(cli, &root)?;
            if file.as_str() == "-" {
                let mut stdout = io::stdout().lock();
                stdout
                    .write_all(makefile.as_bytes())
                    .context("write Makefile to stdout")?;
                stdout.flush().context("flush stdout")?;
            } else {
                write_atomically(&root, &file, &makefile)?;
            }
            Ok(())
        }
    }
}

/// Generate the Makefile text for the manifest referenced by `cli`.
///
/// Object directories are created once generation has succeeded.
///
/// # Errors
///
/// Returns an error if the manifest cannot be loaded or the graph is
/// invalid.
pub fn generate_makefile(cli: &Cli, root: &Utf8Path) -> Result<String> {
    let manifest_path = root.join(&cli.file);
    let manifest = manifest::from_path(&manifest_path)
        .with_context(|| format!("loading manifest at {manifest_path}"))?;
    let manifest_json = serde_json::to_string_pretty(&manifest).context("serialising manifest")?;
    debug!("manifest:\n{manifest_json}");

    let registry = manifest::build_registry(&manifest, root).context("declaring targets")?;
    let layout = registry.layout();
    let mut counter = BumpFile::in_build_dir(layout);
    let version = version::stamp(&manifest.version, cli.mode(), &mut counter);
    info!(project = %manifest.project, %version, "generating Makefile");

    let cflags = flags::compose(cli.mode(), &cli.bundles(), &manifest.cflags, &version);
    let mut ldflags = cli.linkage().flags();
    ldflags.extend(&manifest.ldflags);
    let mut settings = MakefileSettings::new(cflags, ldflags);
    if let Some(goal) = &manifest.default {
        settings = settings.with_default_goal(goal.clone(), manifest.run_default);
    }

    let makefile = make_gen::generate(&registry, &settings).context("generating Makefile")?;
    registry
        .ensure_object_directories()
        .context("creating object directories")?;
    Ok(makefile)
}

/// Write `content` to `path` under `root`.
///
/// Missing parent directories are created first. The text goes to a
/// temporary file beside the destination, which is then renamed into place
/// so `make` never sees a half-written Makefile.
///
/// # Errors
///
/// Returns [`BuildPlanError::Filesystem`] if a directory or the file cannot
/// be written.
pub fn write_atomically(
    root: &Utf8Path,
    path: &Utf8Path,
    content: &str,
) -> Result<(), BuildPlanError> {
    let parent = path.parent().filter(|parent| !parent.as_str().is_empty());
    if let Some(parent) = parent {
        RootDirs::new(root).create_dir_all(parent)?;
    }
    let dir = parent.map_or_else(|| root.to_path_buf(), |parent| root.join(parent));
    let destination = root.join(path);
    let mut tmp = tempfile::Builder::new()
        .prefix(".makegraph.")
        .suffix(".mk")
        .tempfile_in(&dir)
        .map_err(|err| BuildPlanError::filesystem(dir.clone(), err))?;
    tmp.write_all(content.as_bytes())
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|err| BuildPlanError::filesystem(tmp.path().to_string_lossy().into_owned(), err))?;
    tmp.persist(&destination)
        .map_err(|err| BuildPlanError::filesystem(destination.clone(), err.error))?;
    info!(path = %destination, "generated Makefile");
    Ok(())
}

#[cfg(test)]
mod tests;
