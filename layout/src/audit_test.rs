use super::*;
use crate::block::{BlockKind, BlockProps};
use crate::doc::{Component, GeometryRecord, Placement};

fn component(id: &str, kind: BlockKind) -> Component {
    Component::new(ComponentId::new(id), BlockProps::defaults(kind))
}

fn record(id: &str) -> GeometryRecord {
    GeometryRecord::new(ComponentId::new(id), Placement::new(0, 0, 2, 2))
}

fn link(doc: &mut LayoutDocument, child: &str, parent: &str) {
    doc.container_parents.insert(ComponentId::new(child), ComponentId::new(parent));
}

fn consistent_doc() -> LayoutDocument {
    let mut doc = LayoutDocument {
        layout: vec![record("item-1"), record("item-2")],
        components: vec![
            component("item-1", BlockKind::Text),
            component("item-2", BlockKind::Container),
            component("item-3", BlockKind::Button),
        ],
        ..LayoutDocument::default()
    };
    link(&mut doc, "item-3", "item-2");
    doc
}

#[test]
fn empty_document_is_consistent() {
    assert!(audit(&LayoutDocument::default()).is_empty());
}

#[test]
fn nested_document_is_consistent() {
    assert!(audit(&consistent_doc()).is_empty());
}

#[test]
fn reports_geometry_for_nested() {
    let mut doc = consistent_doc();
    doc.layout.push(record("item-3"));
    assert_eq!(audit(&doc), vec![Violation::GeometryForNested(ComponentId::new("item-3"))]);
}

#[test]
fn reports_missing_geometry() {
    let mut doc = consistent_doc();
    doc.layout.retain(|r| r.i.as_str() != "item-1");
    assert_eq!(audit(&doc), vec![Violation::MissingGeometry(ComponentId::new("item-1"))]);
}

#[test]
fn reports_orphan_geometry() {
    let mut doc = consistent_doc();
    doc.layout.push(record("item-9"));
    assert_eq!(audit(&doc), vec![Violation::OrphanGeometry(ComponentId::new("item-9"))]);
}

#[test]
fn reports_duplicates() {
    let mut doc = consistent_doc();
    doc.components.push(component("item-1", BlockKind::Text));
    doc.layout.push(record("item-2"));
    let violations = audit(&doc);
    assert!(violations.contains(&Violation::DuplicateId(ComponentId::new("item-1"))));
    assert!(violations.contains(&Violation::DuplicateGeometry(ComponentId::new("item-2"))));
}

#[test]
fn reports_dangling_parent() {
    let mut doc = consistent_doc();
    link(&mut doc, "item-1", "item-7");
    doc.layout.retain(|r| r.i.as_str() != "item-1");
    assert_eq!(
        audit(&doc),
        vec![Violation::DanglingParent { child: ComponentId::new("item-1"), parent: ComponentId::new("item-7") }]
    );
}

#[test]
fn reports_cycle_members() {
    let mut doc = consistent_doc();
    doc.layout.retain(|r| r.i.as_str() != "item-2");
    link(&mut doc, "item-2", "item-3");
    let violations = audit(&doc);
    assert!(violations.contains(&Violation::ParentCycle(ComponentId::new("item-2"))));
    assert!(violations.contains(&Violation::ParentCycle(ComponentId::new("item-3"))));
    assert!(!violations.contains(&Violation::ParentCycle(ComponentId::new("item-1"))));
}

#[test]
fn violation_messages_name_the_id() {
    let msg = Violation::GeometryForNested(ComponentId::new("item-3")).to_string();
    assert!(msg.contains("item-3"));
}
