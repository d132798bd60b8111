//! Makefile generator.
//!
//! This module linearises a [`Registry`] into the Makefile consumed by
//! `make`. Targets are visited in name order and every target's block is
//! preceded by the blocks of its transitive dependencies; a single emitted
//! set spans the whole run, so each block appears exactly once. Identical
//! input always yields byte-identical output.

use std::collections::{BTreeSet, HashSet};
use std::fmt::{self, Display, Formatter};

use camino::{Utf8Path, Utf8PathBuf};
use itertools::Itertools;
use tracing::debug;

use crate::error::Result;
use crate::fileset::OBJECT_EXTENSION;
use crate::flags::{CompilerFlags, LinkFlags};
use crate::graph;
use crate::registry::Registry;
use crate::target::{Layout, Target};

/// Heading written at the top of every generated file.
pub const HEADING: &str = "# AUTOGENERATED FILE; DO NOT MODIFY (use `makegraph` instead)";

/// Source suffix handled by the generic compilation rule.
pub const SOURCE_EXTENSION: &str = "c";

const COMPILE_RECIPE: &str = "\t$(CC) $< $(CFLAGS) $(EXTRA_CFLAGS) $(INCLUDES) -c -o $@";
const LINK_RECIPE: &str = "\t$(CC) $(CFLAGS) $(LDFLAGS) -o $@ $^";

/// Global variables and goals written before the target blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MakefileSettings {
    /// Merged compiler flags.
    pub cflags: CompilerFlags,
    /// Merged link flags, in order.
    pub ldflags: LinkFlags,
    /// Target built by `make` without arguments; `all` when unset.
    pub default_goal: Option<String>,
    /// Run the default goal's artifacts after building them.
    pub run_default: bool,
}

impl MakefileSettings {
    /// Settings with the given flags and `all` as the default goal.
    #[must_use]
    pub fn new(cflags: CompilerFlags, ldflags: LinkFlags) -> Self {
        Self {
            cflags,
            ldflags,
            default_goal: None,
            run_default: false,
        }
    }

    /// Build `goal` by default, optionally running its artifacts.
    #[must_use]
    pub fn with_default_goal(mut self, goal: impl Into<String>, run: bool) -> Self {
        self.default_goal = Some(goal.into());
        self.run_default = run;
        self
    }
}

/// Generate the Makefile text for `registry`.
///
/// The registry is validated first, so no text is produced for an invalid
/// graph.
///
/// # Errors
///
/// Returns [`crate::error::BuildPlanError::UnresolvedDependency`] when a
/// dependency or the default goal names an unknown target and
/// [`crate::error::BuildPlanError::CircularDependency`] when dependencies
/// form a cycle.
pub fn generate(registry: &Registry, settings: &MakefileSettings) -> Result<String> {
    graph::validate(registry)?;
    let default_goal = settings
        .default_goal
        .as_deref()
        .map(|goal| registry.resolve("default", goal))
        .transpose()?;

    let mut out = Preamble {
        registry,
        settings,
        default_goal,
    }
    .to_string();

    let mut emitter = Emitter {
        registry,
        emitted: HashSet::new(),
        out: &mut out,
    };
    for target in registry.sorted() {
        emitter.emit(target)?;
    }
    Ok(out)
}

struct Emitter<'r, 'o> {
    registry: &'r Registry,
    emitted: HashSet<&'r str>,
    out: &'o mut String,
}

impl<'r> Emitter<'r, '_> {
    fn emit(&mut self, target: &'r Target) -> Result<()> {
        if !self.emitted.insert(target.name()) {
            return Ok(());
        }
        let deps = graph::sorted_dependencies(self.registry, target)?;
        for &dep in &deps {
            self.emit(dep)?;
        }
        debug!(
            target_name = target.name(),
            dependencies = deps.len(),
            "emitting target block"
        );
        let block = TargetBlock {
            layout: self.registry.layout(),
            target,
            deps: &deps,
        };
        self.out.push_str(&block.to_string());
        Ok(())
    }
}

/// Variables, goals and the generic compilation rule.
struct Preamble<'a> {
    registry: &'a Registry,
    settings: &'a MakefileSettings,
    default_goal: Option<&'a Target>,
}

impl Display for Preamble<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let includes: BTreeSet<String> = self
            .registry
            .iter()
            .flat_map(Target::includes)
            .map(|inc| format!("-I{inc}"))
            .collect();
        let headers: BTreeSet<&Utf8Path> = self
            .registry
            .iter()
            .flat_map(|target| target.headers().iter().map(Utf8PathBuf::as_path))
            .collect();
        let names = self.registry.names().join(" ");

        writeln!(f, "{HEADING}")?;
        writeln!(f, "CFLAGS+={}", self.settings.cflags)?;
        writeln!(f, "LDFLAGS+={}", self.settings.ldflags)?;
        writeln!(f, "INCLUDES+={}", includes.iter().join(" "))?;
        writeln!(f)?;
        writeln!(f, ".PHONY: default all{}", spaced(&names))?;
        match self.default_goal {
            Some(goal) => {
                writeln!(f, "default: {}", goal.name())?;
                if self.settings.run_default {
                    for artifact in goal.artifact_paths() {
                        let prefix = if artifact.is_relative() { "./" } else { "" };
                        writeln!(f, "\t{prefix}{artifact}")?;
                    }
                }
            }
            None => writeln!(f, "default: all")?,
        }
        writeln!(f)?;
        writeln!(f, "all:{}", spaced(&names))?;
        writeln!(f)?;
        writeln!(f, "HEADERS={}", headers.iter().join(" "))?;
        writeln!(
            f,
            "{obj}/%.{OBJECT_EXTENSION}: %.{SOURCE_EXTENSION} $(HEADERS)",
            obj = self.registry.layout().obj_dir
        )?;
        writeln!(f, "{COMPILE_RECIPE}")
    }
}

/// One target's variables and link rules.
struct TargetBlock<'a> {
    layout: &'a Layout,
    target: &'a Target,
    deps: &'a [&'a Target],
}

impl TargetBlock<'_> {
    /// `$(<name>_<suffix>)` for the target followed by its dependencies.
    fn var_refs(&self, suffix: &str) -> String {
        std::iter::once(self.target.name())
            .chain(self.deps.iter().map(|dep| dep.name()))
            .map(|name| format!("$({name}_{suffix})"))
            .join(" ")
    }

    /// Objects the generic `%.o: %.c` rule cannot build get explicit rules.
    fn write_remapped_objects(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (source, object) in self.target.sources() {
            if follows_pattern(self.layout, source, object) {
                continue;
            }
            writeln!(f, "{object}: {source} $(HEADERS)")?;
            writeln!(f, "{COMPILE_RECIPE}")?;
        }
        Ok(())
    }
}

impl Display for TargetBlock<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = self.target.name();
        let artifacts = self.target.artifact_paths();
        let objects = self.target.object_paths().iter().join(" ");
        let headers = self.target.headers().iter().join(" ");
        let cflags = self.target.cflags().join(" ");

        writeln!(f)?;
        writeln!(f, "### TARGET: {name}")?;
        if !artifacts.is_empty() {
            writeln!(f)?;
            writeln!(f, "{name}: {}", artifacts.iter().join(" "))?;
        }
        writeln!(f)?;
        writeln!(f, "{name}_OBJECTS ={}", spaced(&objects))?;
        writeln!(f, "$({name}_OBJECTS): EXTRA_CFLAGS :={}", spaced(&cflags))?;
        writeln!(f)?;
        writeln!(f, "{name}_HEADERS ={}", spaced(&headers))?;
        writeln!(f, "$({name}_OBJECTS): {}", self.var_refs("HEADERS"))?;
        self.write_remapped_objects(f)?;
        writeln!(f)?;
        let inputs = self.var_refs("OBJECTS");
        for artifact in &artifacts {
            writeln!(f, "{artifact}: {inputs}")?;
            writeln!(f, "{LINK_RECIPE}")?;
        }
        Ok(())
    }
}

fn follows_pattern(layout: &Layout, source: &Utf8Path, object: &Utf8Path) -> bool {
    source.extension() == Some(SOURCE_EXTENSION)
        && source.is_relative()
        && layout.obj_dir.join(source.with_extension(OBJECT_EXTENSION)) == object
}

/// `value` prefixed with a space, or nothing when empty.
fn spaced(value: &str) -> String {
    if value.is_empty() {
        String::new()
    } else {
        format!(" {value}")
    }
}
