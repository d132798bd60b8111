//! End-to-end tests for planning a build through the public API.
//!
//! A manifest is loaded from a temporary project, turned into a registry and
//! rendered as a Makefile without invoking the binary.

use anyhow::{Context, Result, ensure};
use makegraph::error::BuildPlanError;
use makegraph::flags::{self, BuildMode, Linkage};
use makegraph::make_gen::{self, MakefileSettings};
use makegraph::{graph, manifest};
use rstest::{fixture, rstest};
use test_support::ProjectTree;

#[fixture]
fn seadragon() -> ProjectTree {
    let tree = ProjectTree::with_files(&[
        "src/seadragon.c",
        "src/util/list.c",
        "src/seadragon.h",
        "test/main.c",
        "test/test.h",
    ])
    .expect("create project tree");
    let manifest = std::fs::read_to_string("tests/data/seadragon.yml").expect("read fixture");
    tree.write("makegraph.yml", &manifest).expect("write manifest");
    tree
}

fn render(tree: &ProjectTree) -> Result<String> {
    let parsed = manifest::from_path(&tree.root().join("makegraph.yml"))?;
    let registry = manifest::build_registry(&parsed, tree.root())?;
    let cflags = flags::compose(BuildMode::Release, &[], &parsed.cflags, "0.1.0");
    let settings = MakefileSettings::new(cflags, Linkage::Dynamic.flags())
        .with_default_goal("test", parsed.run_default);
    Ok(make_gen::generate(&registry, &settings)?)
}

#[rstest]
fn library_block_precedes_dependent_executable(seadragon: ProjectTree) -> Result<()> {
    let makefile = render(&seadragon)?;
    let lib = makefile
        .find("### TARGET: seadragon\n")
        .context("library block")?;
    let exe = makefile.find("### TARGET: test\n").context("executable block")?;
    ensure!(lib < exe);
    ensure!(makefile.contains("build/test: $(test_OBJECTS) $(seadragon_OBJECTS)\n"));
    ensure!(makefile.contains("$(test_OBJECTS): $(test_HEADERS) $(seadragon_HEADERS)\n"));
    Ok(())
}

#[rstest]
fn skipped_prefixes_get_explicit_compile_rules(seadragon: ProjectTree) -> Result<()> {
    let makefile = render(&seadragon)?;
    ensure!(makefile.contains("build/obj/util/list.o: src/util/list.c $(HEADERS)\n"));
    ensure!(makefile.contains("build/obj/seadragon.o: src/seadragon.c $(HEADERS)\n"));
    ensure!(
        !makefile.contains("build/obj/test/main.o: test/main.c"),
        "pattern-compatible objects use the generic rule"
    );
    Ok(())
}

#[rstest]
fn preamble_collects_headers_includes_and_flags(seadragon: ProjectTree) -> Result<()> {
    let makefile = render(&seadragon)?;
    ensure!(makefile.contains("HEADERS=src/seadragon.h test/test.h\n"), "{makefile}");
    ensure!(makefile.contains("INCLUDES+=-Isrc/\n"), "{makefile}");
    let cflags = makefile
        .lines()
        .find(|line| line.starts_with("CFLAGS+="))
        .context("CFLAGS line")?;
    ensure!(cflags.contains("-DSEADRAGON") && cflags.contains("-DPROJECT_VERSION=0.1.0"));
    ensure!(makefile.contains("LDFLAGS+=\n"), "dynamic linkage adds no flags");
    Ok(())
}

#[rstest]
fn output_is_stable_across_runs(seadragon: ProjectTree) -> Result<()> {
    ensure!(render(&seadragon)? == render(&seadragon)?);
    Ok(())
}

#[test]
fn unknown_dependency_is_reported_by_name() -> Result<()> {
    let tree = ProjectTree::with_files(&["main.c"])?;
    let parsed = manifest::from_str(
        "project: x\nversion: 1.0.0\ntargets:\n  - name: app\n    kind: executable\n    sources: [main.c]\n    dependencies: [missing]\n",
    )?;
    let registry = manifest::build_registry(&parsed, tree.root())?;
    let err = graph::validate(&registry).expect_err("dangling dependency");
    ensure!(
        matches!(
            &err,
            BuildPlanError::UnresolvedDependency { target, dependency }
                if target == "app" && dependency == "missing"
        ),
        "got {err:?}"
    );
    Ok(())
}
