//! Command line interface definition using clap.
//!
//! This module defines the [`Cli`] structure and its subcommands. Global
//! options select the flag profile; the subcommand decides whether `make`
//! is invoked after the Makefile is written.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

use crate::flags::{BuildMode, FlagBundle, Linkage};
use crate::manifest::DEFAULT_MANIFEST;

/// Maximum number of jobs accepted by the CLI.
const MAX_JOBS: usize = 64;

fn parse_jobs(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("{s} is not a valid number"))?;
    if (1..=MAX_JOBS).contains(&value) {
        Ok(value)
    } else {
        Err(format!("jobs must be between 1 and {MAX_JOBS}"))
    }
}

/// Generate a Makefile from declared C targets and run `make` on it.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the project manifest, relative to the project directory.
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_MANIFEST)]
    pub file: Utf8PathBuf,

    /// Project directory; globs, outputs and `make` are resolved against it.
    #[arg(short = 'C', long, value_name = "DIR")]
    pub directory: Option<Utf8PathBuf>,

    /// Number of parallel jobs passed to `make` (default: half the CPUs).
    #[arg(short, long, value_name = "N", value_parser = parse_jobs)]
    pub jobs: Option<usize>,

    /// Enable verbose logging output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Build with release flags and the plain version number.
    #[arg(long)]
    pub release: bool,

    /// Add the developer warning bundle.
    #[arg(long)]
    pub developer: bool,

    /// Link executables dynamically.
    #[arg(short = 'r', long)]
    pub dynamic: bool,

    /// Optional subcommand to execute; defaults to `build` when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Parse command-line arguments, providing `build` as the default command.
    #[must_use]
    pub fn parse_with_default() -> Self {
        Self::parse().with_default_command()
    }

    /// Apply the default command if none was specified.
    #[must_use]
    pub fn with_default_command(mut self) -> Self {
        if self.command.is_none() {
            self.command = Some(Commands::Build(BuildArgs::default()));
        }
        self
    }

    /// Selected optimisation profile.
    #[must_use]
    pub const fn mode(&self) -> BuildMode {
        if self.release {
            BuildMode::Release
        } else {
            BuildMode::Debug
        }
    }

    /// Selected optional flag bundles.
    #[must_use]
    pub fn bundles(&self) -> Vec<FlagBundle> {
        if self.developer {
            vec![FlagBundle::Developer]
        } else {
            Vec::new()
        }
    }

    /// Selected linkage.
    #[must_use]
    pub const fn linkage(&self) -> Linkage {
        if self.dynamic {
            Linkage::Dynamic
        } else {
            Linkage::Static
        }
    }

    /// Job count handed to `make`.
    #[must_use]
    pub fn jobs_or_default(&self) -> usize {
        self.jobs.unwrap_or_else(|| {
            let cpus = std::thread::available_parallelism().map_or(1, NonZeroUsize::get);
            (cpus / 2).max(1)
        })
    }

    /// Project directory, `.` when not given.
    #[must_use]
    pub fn project_dir(&self) -> Utf8PathBuf {
        self.directory
            .clone()
            .unwrap_or_else(|| Utf8PathBuf::from("."))
    }
}

/// Arguments accepted by the `build` command.
#[derive(Debug, Args, PartialEq, Eq, Clone)]
pub struct BuildArgs {
    /// Consider every target out of date (`make -B`).
    #[arg(short = 'B', long)]
    pub always_make: bool,

    /// Write the Makefile to this path instead of `Makefile`.
    #[arg(long, value_name = "FILE")]
    pub emit: Option<Utf8PathBuf>,

    /// The `make` executable to run.
    #[arg(long, value_name = "PROGRAM", default_value = "make")]
    pub make: PathBuf,

    /// Goals passed to `make`; its default goal when empty.
    pub targets: Vec<String>,
}

impl Default for BuildArgs {
    fn default() -> Self {
        Self {
            always_make: false,
            emit: None,
            make: PathBuf::from("make"),
            targets: Vec::new(),
        }
    }
}

/// Available top-level commands.
#[derive(Debug, Subcommand, PartialEq, Eq, Clone)]
pub enum Commands {
    /// Write the Makefile and run `make` (the default).
    Build(BuildArgs),

    /// Write the Makefile without running `make`.
    Manifest {
        /// Output path for the Makefile; `-` writes to standard output.
        #[arg(value_name = "FILE")]
        file: Utf8PathBuf,
    },
}
