//! Dependency closure and graph validation.
//!
//! [`transitive_dependencies`] walks declared dependencies depth-first and
//! collects every reachable target once. [`validate`] is run before emission
//! and rejects unknown dependency names and dependency cycles.

use indexmap::IndexMap;

use crate::error::{BuildPlanError, Result};
use crate::registry::Registry;
use crate::target::Target;

mod cycle;

/// Every target reachable from `target`, keyed by name, in discovery order.
///
/// Traversal follows each target's dependencies in declaration order. The
/// accumulator doubles as the visited set, so a target reachable along
/// several paths is visited once and the walk terminates even on cyclic
/// declarations. `target` itself is only included when a cycle leads back to
/// it.
///
/// # Errors
///
/// Returns [`BuildPlanError::UnresolvedDependency`] when a reachable target
/// names a dependency that is not registered.
///
/// # Examples
///
/// ```
/// use makegraph::{graph, registry::Registry, target::Layout};
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut registry = Registry::new(Layout::default());
/// registry.library("d")?;
/// registry.library("b")?.add_dependencies(["d"]);
/// registry.library("c")?.add_dependencies(["d"]);
/// registry.executable("a")?.add_dependencies(["b", "c"]);
///
/// let a = registry.get("a").ok_or("a missing")?;
/// let closure = graph::transitive_dependencies(&registry, a)?;
/// assert_eq!(closure.keys().copied().collect::<Vec<_>>(), ["b", "d", "c"]);
/// # Ok(()) }
/// ```
pub fn transitive_dependencies<'r>(
    registry: &'r Registry,
    target: &Target,
) -> Result<IndexMap<&'r str, &'r Target>> {
    let mut acc = IndexMap::new();
    collect(registry, target, &mut acc)?;
    Ok(acc)
}

fn collect<'r>(
    registry: &'r Registry,
    target: &Target,
    acc: &mut IndexMap<&'r str, &'r Target>,
) -> Result<()> {
    for name in target.dependencies() {
        if acc.contains_key(name.as_str()) {
            continue;
        }
        let dep = registry.resolve(target.name(), name)?;
        acc.insert(dep.name(), dep);
        collect(registry, dep, acc)?;
    }
    Ok(())
}

/// Transitive dependencies of `target` sorted by name.
///
/// # Errors
///
/// See [`transitive_dependencies`].
pub fn sorted_dependencies<'r>(registry: &'r Registry, target: &Target) -> Result<Vec<&'r Target>> {
    let mut deps: Vec<&Target> = transitive_dependencies(registry, target)?
        .into_values()
        .collect();
    deps.sort_by(|a, b| a.name().cmp(b.name()));
    Ok(deps)
}

/// Check that every dependency resolves and that no cycle exists.
///
/// Unknown names are reported before cycles, in registration order.
///
/// # Errors
///
/// Returns [`BuildPlanError::UnresolvedDependency`] or
/// [`BuildPlanError::CircularDependency`].
pub fn validate(registry: &Registry) -> Result<()> {
    for target in registry.iter() {
        for dep in target.dependencies() {
            registry.resolve(target.name(), dep)?;
        }
    }
    if let Some(cycle) = cycle::find_cycle(registry) {
        return Err(BuildPlanError::CircularDependency { cycle });
    }
    Ok(())
}

#[cfg(test)]
mod tests;
