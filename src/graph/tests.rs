//! Tests for dependency closure and validation.

use super::*;
use crate::target::Layout;
use rstest::{fixture, rstest};

fn declare(registry: &mut Registry, name: &str, deps: &[&str]) {
    registry
        .library(name)
        .expect("declare target")
        .add_dependencies(deps.iter().copied());
}

#[fixture]
fn diamond() -> Registry {
    let mut registry = Registry::new(Layout::default());
    declare(&mut registry, "a", &["b", "c"]);
    declare(&mut registry, "b", &["d"]);
    declare(&mut registry, "c", &["d"]);
    declare(&mut registry, "d", &[]);
    registry
}

fn closure_names(registry: &Registry, name: &str) -> Vec<String> {
    let target = registry.get(name).expect("target registered");
    transitive_dependencies(registry, target)
        .expect("closure")
        .keys()
        .map(|key| (*key).to_owned())
        .collect()
}

#[rstest]
fn diamond_visits_shared_dependency_once(diamond: Registry) {
    let names = closure_names(&diamond, "a");
    assert_eq!(names, ["b", "d", "c"]);
    assert_eq!(names.iter().filter(|n| *n == "d").count(), 1);
}

#[rstest]
fn leaf_has_empty_closure(diamond: Registry) {
    assert!(closure_names(&diamond, "d").is_empty());
}

#[rstest]
fn sorted_dependencies_orders_by_name(diamond: Registry) {
    let a = diamond.get("a").expect("a");
    let names: Vec<&str> = sorted_dependencies(&diamond, a)
        .expect("sorted")
        .into_iter()
        .map(Target::name)
        .collect();
    assert_eq!(names, ["b", "c", "d"]);
}

#[test]
fn closure_terminates_on_cycles() {
    let mut registry = Registry::new(Layout::default());
    declare(&mut registry, "a", &["b"]);
    declare(&mut registry, "b", &["c"]);
    declare(&mut registry, "c", &["a"]);
    assert_eq!(closure_names(&registry, "a"), ["b", "c", "a"]);
}

#[test]
fn closure_reports_unresolved_dependency() {
    let mut registry = Registry::new(Layout::default());
    declare(&mut registry, "a", &["b"]);
    declare(&mut registry, "b", &["missing"]);
    let a = registry.get("a").expect("a");
    let err = transitive_dependencies(&registry, a).expect_err("missing dependency");
    assert!(
        matches!(
            err,
            BuildPlanError::UnresolvedDependency { ref target, ref dependency }
                if target == "b" && dependency == "missing"
        ),
        "got {err:?}"
    );
}

#[rstest]
fn validate_accepts_diamond(diamond: Registry) {
    assert!(validate(&diamond).is_ok());
}

#[test]
fn validate_rejects_cycles() {
    let mut registry = Registry::new(Layout::default());
    declare(&mut registry, "x", &["y"]);
    declare(&mut registry, "y", &["x"]);
    let err = validate(&registry).expect_err("cycle");
    match err {
        BuildPlanError::CircularDependency { cycle } => assert_eq!(cycle, ["x", "y", "x"]),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn validate_reports_unresolved_before_cycles() {
    let mut registry = Registry::new(Layout::default());
    declare(&mut registry, "x", &["y", "ghost"]);
    declare(&mut registry, "y", &["x"]);
    let err = validate(&registry).expect_err("unresolved");
    assert!(
        matches!(err, BuildPlanError::UnresolvedDependency { .. }),
        "got {err:?}"
    );
}
