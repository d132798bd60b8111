//! Tests for Makefile generation through the runner.

use super::*;
use anyhow::ensure;
use clap::Parser;
use std::fs;
use tempfile::TempDir;

fn project() -> Result<(TempDir, Utf8PathBuf)> {
    let dir = tempfile::tempdir()?;
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
        .map_err(|p| anyhow::anyhow!("non-UTF-8 temp dir {}", p.display()))?;
    fs::create_dir_all(root.join("src"))?;
    fs::write(root.join("src/lib.c"), "")?;
    fs::write(root.join("main.c"), "")?;
    fs::write(
        root.join(manifest::DEFAULT_MANIFEST),
        concat!(
            "project: demo\n",
            "version: 2.0.0\n",
            "ldflags: [-lm]\n",
            "targets:\n",
            "  - name: core\n",
            "    kind: library\n",
            "    sources: [\"src/*.c\"]\n",
            "  - name: app\n",
            "    kind: executable\n",
            "    sources: [main.c]\n",
            "    dependencies: [core]\n",
        ),
    )?;
    Ok((dir, root))
}

#[test]
fn release_makefile_carries_plain_version_and_ordered_ldflags() -> Result<()> {
    let (_dir, root) = project()?;
    let cli = Cli::try_parse_from(["makegraph", "--release"])?;
    let makefile = generate_makefile(&cli, &root)?;
    ensure!(makefile.contains("-DPROJECT_VERSION=2.0.0 "), "version flag missing:\n{makefile}");
    ensure!(makefile.contains("LDFLAGS+=-static -static-libgcc -lm\n"));
    ensure!(root.join("build/obj/src").is_dir(), "object directory not created");
    Ok(())
}

#[test]
fn debug_makefile_carries_build_counter() -> Result<()> {
    let (_dir, root) = project()?;
    let cli = Cli::try_parse_from(["makegraph", "-r"])?;
    let first = generate_makefile(&cli, &root)?;
    let second = generate_makefile(&cli, &root)?;
    ensure!(first.contains("-DPROJECT_VERSION=2.0.0-1"), "first run:\n{first}");
    ensure!(second.contains("-DPROJECT_VERSION=2.0.0-2"), "second run:\n{second}");
    ensure!(first.contains("LDFLAGS+=-lm\n"));
    Ok(())
}

#[test]
fn missing_manifest_is_reported() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
        .map_err(|p| anyhow::anyhow!("non-UTF-8 temp dir {}", p.display()))?;
    let cli = Cli::try_parse_from(["makegraph"])?;
    let err = generate_makefile(&cli, &root).expect_err("manifest is missing");
    ensure!(
        err.to_string().contains("loading manifest"),
        "unexpected error {err:#}"
    );
    Ok(())
}

#[test]
fn write_atomically_replaces_existing_file() -> Result<()> {
    let (_dir, root) = project()?;
    let path = Utf8Path::new("out.mk");
    write_atomically(&root, path, "first\n")?;
    write_atomically(&root, path, "second\n")?;
    ensure!(fs::read_to_string(root.join(path))? == "second\n");
    let leftovers = fs::read_dir(&root)?
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().starts_with(".makegraph."))
        .count();
    ensure!(leftovers == 0, "temporary files left behind");
    Ok(())
}

#[test]
fn invalid_graph_writes_nothing() -> Result<()> {
    let (_dir, root) = project()?;
    fs::write(
        root.join(manifest::DEFAULT_MANIFEST),
        "project: demo\nversion: 1.0.0\ntargets:\n  - name: app\n    kind: executable\n    dependencies: [ghost]\n",
    )?;
    let cli = Cli::try_parse_from(["makegraph", "-C", root.as_str(), "manifest", "out.mk"])?;
    ensure!(run(&cli).is_err(), "unresolved dependency should fail");
    ensure!(!root.join("out.mk").exists());
    Ok(())
}

#[test]
fn write_atomically_creates_missing_parents() -> Result<()> {
    let (_dir, root) = project()?;
    write_atomically(&root, Utf8Path::new("gen/nested/out.mk"), "rules\n")?;
    ensure!(fs::read_to_string(root.join("gen/nested/out.mk"))? == "rules\n");
    Ok(())
}
