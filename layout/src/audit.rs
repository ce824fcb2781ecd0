//! Consistency audit of a layout document.
//!
//! Checks the invariants that tie the three collections together: geometry
//! exists exactly for top-level components, parent links point at real
//! components, ids are unique, and the parent forest has no cycles.

#[cfg(test)]
#[path = "audit_test.rs"]
mod audit_test;

use std::collections::{BTreeSet, HashSet};

use crate::doc::{ComponentId, LayoutDocument};

/// One broken invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    #[error("duplicate component id {0}")]
    DuplicateId(ComponentId),
    #[error("duplicate geometry record for {0}")]
    DuplicateGeometry(ComponentId),
    #[error("nested component {0} has a geometry record")]
    GeometryForNested(ComponentId),
    #[error("top-level component {0} has no geometry record")]
    MissingGeometry(ComponentId),
    #[error("geometry record {0} has no component")]
    OrphanGeometry(ComponentId),
    #[error("parent link {child} -> {parent} references a missing component")]
    DanglingParent { child: ComponentId, parent: ComponentId },
    #[error("component {0} is part of a parent cycle")]
    ParentCycle(ComponentId),
}

/// Every invariant violation in `doc`. Empty means consistent.
#[must_use]
pub fn audit(doc: &LayoutDocument) -> Vec<Violation> {
    let mut out = Vec::new();

    let mut ids: HashSet<&ComponentId> = HashSet::new();
    for c in &doc.components {
        if !ids.insert(&c.id) {
            out.push(Violation::DuplicateId(c.id.clone()));
        }
    }

    let mut placed: HashSet<&ComponentId> = HashSet::new();
    for rec in &doc.layout {
        if !placed.insert(&rec.i) {
            out.push(Violation::DuplicateGeometry(rec.i.clone()));
        }
        if !ids.contains(&rec.i) {
            out.push(Violation::OrphanGeometry(rec.i.clone()));
        } else if doc.container_parents.contains_key(&rec.i) {
            out.push(Violation::GeometryForNested(rec.i.clone()));
        }
    }

    for c in &doc.components {
        if !doc.container_parents.contains_key(&c.id) && !placed.contains(&c.id) {
            out.push(Violation::MissingGeometry(c.id.clone()));
        }
    }

    for (child, parent) in &doc.container_parents {
        if !ids.contains(child) || !ids.contains(parent) {
            out.push(Violation::DanglingParent { child: child.clone(), parent: parent.clone() });
        }
    }

    for id in cycle_members(doc) {
        out.push(Violation::ParentCycle(id));
    }

    out
}

fn cycle_members(doc: &LayoutDocument) -> BTreeSet<ComponentId> {
    let mut members = BTreeSet::new();
    for start in doc.container_parents.keys() {
        let mut seen: HashSet<&ComponentId> = HashSet::new();
        let mut cursor = doc.container_parents.get(start);
        while let Some(id) = cursor {
            if id == start {
                members.insert(start.clone());
                break;
            }
            if !seen.insert(id) {
                break;
            }
            cursor = doc.container_parents.get(id);
        }
    }
    members
}
