//! Compiler and linker flag aggregation.
//!
//! [`CompilerFlags`] is a set: merging is a union and the rendered order is
//! sorted. [`LinkFlags`] is a sequence: merging concatenates and nothing is
//! reordered or collapsed.

use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};

use itertools::Itertools;

/// Warnings and feature macros applied to every compilation.
pub const DEFAULT_FLAGS: &[&str] = &["-Wall", "-pedantic", "-D_POSIX_C_SOURCE=200809L"];
/// Language standard.
pub const STANDARD_FLAGS: &[&str] = &["-std=c99"];
/// Flags added in [`BuildMode::Debug`].
pub const DEBUG_FLAGS: &[&str] = &["-g", "-Og", "-D_DEBUG"];
/// Flags added in [`BuildMode::Release`].
pub const RELEASE_FLAGS: &[&str] = &["-O2"];
/// The opt-in [`FlagBundle::Developer`] set.
pub const DEVELOPER_FLAGS: &[&str] = &[
    "-Werror",
    "-Wextra",
    "-Wno-error=reorder",
    "-Wno-error=pedantic",
    "-Wno-error=unused-parameter",
    "-Wno-error=missing-field-initializers",
    "-Wno-error=deprecated-declarations",
    "-pedantic",
    "-march=native",
    "-mtune=native",
    "-falign-functions=32",
];
/// Link flags used for every linkage.
pub const BASE_LDFLAGS: &[&str] = &[];
/// Link flags for [`Linkage::Static`], placed before [`BASE_LDFLAGS`].
pub const STATIC_LDFLAGS: &[&str] = &["-static", "-static-libgcc"];
/// Name of the macro carrying the project version.
pub const VERSION_MACRO: &str = "PROJECT_VERSION";

/// Optimisation profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BuildMode {
    /// Debug information, light optimisation; the version carries the build
    /// counter.
    #[default]
    Debug,
    /// Optimised build with the plain version.
    Release,
}

impl BuildMode {
    /// Flags contributed by this mode.
    #[must_use]
    pub const fn flags(self) -> &'static [&'static str] {
        match self {
            Self::Debug => DEBUG_FLAGS,
            Self::Release => RELEASE_FLAGS,
        }
    }
}

/// Optional flag sets a user can opt into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlagBundle {
    /// Warnings as errors with a handful of exemptions, tuned for the host
    /// CPU.
    Developer,
}

impl FlagBundle {
    /// Flags contributed by this bundle.
    #[must_use]
    pub const fn flags(self) -> &'static [&'static str] {
        match self {
            Self::Developer => DEVELOPER_FLAGS,
        }
    }
}

/// How executables are linked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Linkage {
    /// Fully static executables.
    #[default]
    Static,
    /// Dynamically linked executables.
    Dynamic,
}

impl Linkage {
    /// Link flags for this linkage, in the order they must be passed.
    #[must_use]
    pub fn flags(self) -> LinkFlags {
        let mut flags = LinkFlags::default();
        if self == Self::Static {
            flags.extend(STATIC_LDFLAGS.iter().copied());
        }
        flags.extend(BASE_LDFLAGS.iter().copied());
        flags
    }
}

/// Unordered, de-duplicated compiler flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilerFlags(BTreeSet<String>);

impl CompilerFlags {
    /// Union `flags` into the set.
    pub fn merge<I, S>(&mut self, flags: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0.extend(flags.into_iter().map(Into::into));
        self
    }

    /// Whether `flag` is present.
    #[must_use]
    pub fn contains(&self, flag: &str) -> bool {
        self.0.contains(flag)
    }

    /// Flags in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of distinct flags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for CompilerFlags {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut flags = Self::default();
        flags.merge(iter);
        flags
    }
}

impl Display for CompilerFlags {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().join(" "))
    }
}

/// Ordered link flags; duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkFlags(Vec<String>);

impl LinkFlags {
    /// Append `flags` after the existing ones.
    pub fn extend<I, S>(&mut self, flags: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0.extend(flags.into_iter().map(Into::into));
        self
    }

    /// Flags in the order they were added.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl<S: Into<String>> FromIterator<S> for LinkFlags {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut flags = Self::default();
        flags.extend(iter);
        flags
    }
}

impl Display for LinkFlags {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().join(" "))
    }
}

/// The `-D` flag defining [`VERSION_MACRO`].
#[must_use]
pub fn version_flag(version: &str) -> String {
    format!("-D{VERSION_MACRO}={version}")
}

/// Merge every compiler flag source into one set.
///
/// The result holds [`DEFAULT_FLAGS`], [`STANDARD_FLAGS`], the mode's flags,
/// every selected bundle, `user` flags and the version definition.
///
/// # Examples
///
/// ```
/// use makegraph::flags::{BuildMode, compose};
///
/// let flags = compose(BuildMode::Release, &[], ["-fno-common"], "1.0.0");
/// assert!(flags.contains("-O2"));
/// assert!(flags.contains("-fno-common"));
/// assert!(flags.contains("-DPROJECT_VERSION=1.0.0"));
/// ```
#[must_use]
pub fn compose<I, S>(mode: BuildMode, bundles: &[FlagBundle], user: I, version: &str) -> CompilerFlags
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut flags: CompilerFlags = DEFAULT_FLAGS.iter().copied().collect();
    flags.merge(STANDARD_FLAGS.iter().copied());
    flags.merge(mode.flags().iter().copied());
    for bundle in bundles {
        flags.merge(bundle.flags().iter().copied());
    }
    flags.merge(user);
    flags.merge([version_flag(version)]);
    flags
}
