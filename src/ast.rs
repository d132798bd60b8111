//! Project manifest structures.
//!
//! These types mirror the YAML schema of a `makegraph.yml` file and are
//! deserialised with `serde-saphyr`.
//!
//! ```rust
//! use makegraph::ast::ProjectManifest;
//! use makegraph::target::TargetKind;
//!
//! let yaml = "project: demo\nversion: 0.1.0\ntargets:\n  - name: demo\n    kind: executable\n    sources: [main.c]\n";
//! let manifest: ProjectManifest = serde_saphyr::from_str(yaml).expect("parse");
//! assert_eq!(manifest.targets[0].kind, TargetKind::Executable);
//! ```

use camino::Utf8PathBuf;
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::target::TargetKind;

/// Top-level manifest.
///
/// ```yaml
/// project: seadragon
/// version: 0.1.0
/// default: test
/// run_default: true
/// targets:
///   - name: seadragon
///     kind: library
///     sources: ["src/**/*.c"]
///     headers: ["src/**/*.h"]
///   - name: test
///     kind: executable
///     sources: [test/main.c]
///     includes: [src/]
///     dependencies: [seadragon]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectManifest {
    /// Project name, used in logs.
    pub project: String,

    /// Semantic version compiled into the sources.
    pub version: Version,

    /// Directory receiving linked artifacts; `build` by default.
    #[serde(default)]
    pub build_dir: Option<Utf8PathBuf>,

    /// Directory receiving object files; `<build_dir>/obj` by default.
    #[serde(default)]
    pub obj_dir: Option<Utf8PathBuf>,

    /// Extra compiler flags applied to every object.
    #[serde(default)]
    pub cflags: Vec<String>,

    /// Extra link flags appended after the linkage flags.
    #[serde(default)]
    pub ldflags: Vec<String>,

    /// Target built by a bare `make`.
    #[serde(default)]
    pub default: Option<String>,

    /// Run the default target's artifacts after building them.
    #[serde(default)]
    pub run_default: bool,

    /// Declared targets.
    pub targets: Vec<TargetSpec>,
}

/// A target declaration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TargetSpec {
    /// Unique target name.
    pub name: String,

    /// Library or executable.
    pub kind: TargetKind,

    /// Glob patterns selecting source files.
    #[serde(default)]
    pub sources: Vec<String>,

    /// Leading source path components dropped when deriving object paths.
    #[serde(default)]
    pub object_skip: usize,

    /// Glob patterns selecting headers.
    #[serde(default)]
    pub headers: Vec<String>,

    /// Include search paths.
    #[serde(default)]
    pub includes: Vec<String>,

    /// Target-specific compiler flags.
    #[serde(default)]
    pub cflags: Vec<String>,

    /// Names of targets that must be built first.
    #[serde(default)]
    pub dependencies: Vec<String>,
}
