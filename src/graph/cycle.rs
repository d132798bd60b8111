//! Cycle detection over target dependency names.

use std::collections::HashMap;

use crate::registry::Registry;

/// Tracks the visitation state of a node during cycle detection.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum VisitState {
    Visiting,
    Visited,
}

/// Return the first cycle found, rotated to start at its smallest name.
///
/// Targets are examined in name order so the reported cycle is stable.
/// Unknown dependency names are ignored; [`super::validate`] reports those
/// separately.
pub(super) fn find_cycle(registry: &Registry) -> Option<Vec<String>> {
    let mut detector = CycleDetector::new(registry);
    for target in registry.sorted() {
        if detector.is_visited(target.name()) {
            continue;
        }
        if let Some(found) = detector.visit(target.name()) {
            return Some(found);
        }
    }
    None
}

struct CycleDetector<'a> {
    registry: &'a Registry,
    stack: Vec<&'a str>,
    states: HashMap<&'a str, VisitState>,
}

impl<'a> CycleDetector<'a> {
    fn new(registry: &'a Registry) -> Self {
        Self {
            registry,
            stack: Vec::new(),
            states: HashMap::new(),
        }
    }

    fn is_visited(&self, node: &str) -> bool {
        matches!(self.states.get(node), Some(VisitState::Visited))
    }

    fn visit(&mut self, node: &'a str) -> Option<Vec<String>> {
        match self.states.get(node) {
            Some(VisitState::Visited) => return None,
            Some(VisitState::Visiting) => {
                let idx = self.stack.iter().position(|n| *n == node).unwrap_or_else(|| {
                    debug_assert!(false, "visiting node must be on the stack");
                    0
                });
                let mut cycle: Vec<String> = self
                    .stack
                    .iter()
                    .skip(idx)
                    .map(|n| (*n).to_owned())
                    .collect();
                cycle.push(node.to_owned());
                return Some(canonicalize_cycle(cycle));
            }
            None => {
                self.states.insert(node, VisitState::Visiting);
            }
        }

        self.stack.push(node);

        if let Some(target) = self.registry.get(node) {
            for dep in target.dependencies() {
                let Some(resolved) = self.registry.get(dep) else {
                    tracing::debug!(
                        missing = %dep,
                        dependent = node,
                        "skipping unknown dependency during cycle detection",
                    );
                    continue;
                };
                if let Some(cycle) = self.visit(resolved.name()) {
                    return Some(cycle);
                }
            }
        }

        self.stack.pop();
        self.states.insert(node, VisitState::Visited);
        None
    }
}

fn canonicalize_cycle(mut cycle: Vec<String>) -> Vec<String> {
    if cycle.len() < 2 {
        return cycle;
    }
    let len = cycle.len() - 1;
    let start = cycle
        .iter()
        .take(len)
        .enumerate()
        .min_by(|(_, a), (_, b)| a.cmp(b))
        .map_or(0, |(idx, _)| idx);
    let (prefix, suffix) = cycle.split_at_mut(len);
    prefix.rotate_left(start);
    if let (Some(first), Some(slot)) = (prefix.first().cloned(), suffix.first_mut()) {
        slot.clone_from(&first);
    }
    cycle
}
