//! Tests for manifest parsing and registry construction.

use super::*;
use crate::target::TargetKind;
use anyhow::{Context, Result, ensure};
use camino::Utf8PathBuf;
use rstest::rstest;

const SEADRAGON: &str = r#"
project: seadragon
version: 0.1.0
default: test
run_default: true
targets:
  - name: seadragon
    kind: library
    sources: ["src/**/*.c"]
    headers: ["src/**/*.h"]
  - name: test
    kind: executable
    sources: [test/main.c]
    headers: [test/test.h]
    includes: [src/]
    dependencies: [seadragon]
"#;

#[test]
fn parses_project_manifest() -> Result<()> {
    let manifest = from_str(SEADRAGON)?;
    ensure!(manifest.project == "seadragon");
    ensure!(manifest.version == semver::Version::new(0, 1, 0));
    ensure!(manifest.default.as_deref() == Some("test"));
    ensure!(manifest.run_default);
    let test = manifest.targets.get(1).context("second target")?;
    ensure!(test.kind == TargetKind::Executable);
    ensure!(test.dependencies == ["seadragon"]);
    ensure!(test.object_skip == 0);
    Ok(())
}

#[rstest]
#[case("project: x\nversion: 0.1.0\ntargets: []\nsurprise: 1\n")]
#[case("project: x\nversion: not-a-version\ntargets: []\n")]
#[case("project: x\nversion: 0.1.0\ntargets:\n  - name: a\n    kind: plugin\n")]
fn rejects_invalid_manifests(#[case] yaml: &str) {
    let err = from_str(yaml).expect_err("manifest should be rejected");
    assert!(matches!(err, BuildPlanError::Manifest { .. }), "got {err:?}");
}

#[test]
fn layout_honours_directory_overrides() -> Result<()> {
    let manifest = from_str("project: x\nversion: 1.0.0\nbuild_dir: out\ntargets: []\n")?;
    let derived = layout(&manifest, Utf8Path::new("/proj"));
    ensure!(derived.build_dir == "out");
    ensure!(derived.obj_dir == "out/obj");
    ensure!(derived.root == "/proj");
    Ok(())
}

#[test]
fn build_registry_expands_globs() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
        .map_err(|p| anyhow::anyhow!("non-UTF-8 temp dir {}", p.display()))?;
    for file in ["src/a.c", "src/util/b.c", "src/a.h", "test/main.c", "test/test.h"] {
        let path = root.join(file);
        std::fs::create_dir_all(path.parent().context("parent")?)?;
        std::fs::write(&path, "")?;
    }
    let registry = build_registry(&from_str(SEADRAGON)?, &root)?;
    let lib = registry.get("seadragon").context("library declared")?;
    ensure!(lib.sources().len() == 2, "unexpected sources {:?}", lib.sources());
    ensure!(
        lib.sources().get(Utf8Path::new("src/util/b.c"))
            == Some(&Utf8PathBuf::from("build/obj/src/util/b.o"))
    );
    ensure!(lib.headers().contains(Utf8Path::new("src/a.h")));
    let test = registry.get("test").context("executable declared")?;
    ensure!(test.includes() == ["src/"]);
    ensure!(test.dependencies().contains("seadragon"));
    Ok(())
}

#[test]
fn duplicate_manifest_targets_fail() {
    let yaml = "project: x\nversion: 0.1.0\ntargets:\n  - name: a\n    kind: library\n  - name: a\n    kind: executable\n";
    let manifest = from_str(yaml).expect("parse");
    let err = build_registry(&manifest, Utf8Path::new(".")).expect_err("duplicate");
    assert!(matches!(err, BuildPlanError::DuplicateTargetName { .. }), "got {err:?}");
}

#[rstest]
#[case("project: x\nversion: 1.0.0\ntargets:\n  - name: all\n    kind: library\n")]
#[case("project: x\nversion: 1.0.0\nbuild_dir: .\ntargets:\n  - name: app\n    kind: executable\n")]
fn self_referential_goals_are_rejected(#[case] yaml: &str) -> Result<()> {
    let manifest = from_str(yaml)?;
    let err = build_registry(&manifest, Utf8Path::new("/nonexistent"))
        .expect_err("goal would depend on itself");
    ensure!(
        matches!(
            err,
            BuildPlanError::ReservedTargetName { .. } | BuildPlanError::ArtifactShadowsTarget { .. }
        ),
        "got {err:?}"
    );
    Ok(())
}
