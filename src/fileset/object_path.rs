//! Mapping from source paths to object-file paths.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};

/// Extension given to compiled objects.
pub const OBJECT_EXTENSION: &str = "o";

/// Derive the object path for `source`.
///
/// The extension is replaced with [`OBJECT_EXTENSION`], the first `skip`
/// components are dropped and the remainder is joined under `obj_dir`. Root
/// and `.` components never count towards `skip`, and the file name itself is
/// always kept so two sources cannot collapse onto the object directory.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use makegraph::fileset::object_path;
///
/// let obj = Utf8Path::new("build/obj");
/// assert_eq!(object_path(obj, Utf8Path::new("src/foo/bar.c"), 1), "build/obj/foo/bar.o");
/// assert_eq!(object_path(obj, Utf8Path::new("src/foo/bar.c"), 0), "build/obj/src/foo/bar.o");
/// ```
#[must_use]
pub fn object_path(obj_dir: &Utf8Path, source: &Utf8Path, skip: usize) -> Utf8PathBuf {
    let renamed = source.with_extension(OBJECT_EXTENSION);
    let parts: Vec<&str> = renamed
        .components()
        .filter_map(|component| match component {
            Utf8Component::Normal(part) => Some(part),
            Utf8Component::ParentDir => Some(".."),
            Utf8Component::Prefix(_) | Utf8Component::RootDir | Utf8Component::CurDir => None,
        })
        .collect();
    let keep_from = skip.min(parts.len().saturating_sub(1));
    let mut out = obj_dir.to_path_buf();
    for part in parts.iter().skip(keep_from) {
        out.push(part);
    }
    out
}
