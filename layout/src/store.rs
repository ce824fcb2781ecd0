//! The layout store: single owner of components, geometry, nesting and
//! selection.
//!
//! DESIGN
//! ======
//! All state lives in one `LayoutDocument` plus the id counter and the
//! selection. Views never hold writable copies; they read through the
//! accessors below and re-read when a subscribed [`StoreEvent`] arrives.
//!
//! Invariants kept by every operation:
//! - a geometry record exists iff its component has no parent
//!   (`update_layout` is trusted and not re-checked);
//! - removing a component removes its whole subtree;
//! - the parent forest never gains a cycle through `set_component_parent`;
//! - the selection never points at a component removed by this store.
//!
//! Operations never panic. Stale ids are logged and ignored; rejected
//! operations return a [`LayoutError`] and leave the store untouched.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::audit::{Violation, audit};
use crate::block::BlockProps;
use crate::consts::FIRST_ID;
use crate::doc::{Component, ComponentId, GeometryRecord, LayoutDocument, Placement};
use crate::error::LayoutError;
use crate::event::{Listener, Listeners, StoreEvent, SubscriptionId};
use crate::notify::{Notice, Notifier, TracingNotifier};
use crate::palette::{DragPayload, PaletteItem};

// =============================================================================
// TYPES
// =============================================================================

/// Counts reported after a successful import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub components: usize,
    pub top_level: usize,
    pub nested: usize,
    pub next_id: u64,
}

/// A component with its grid placement (top-level only) and nested children.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode<'a> {
    pub component: &'a Component,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement: Option<&'a Placement>,
    pub children: Vec<TreeNode<'a>>,
}

pub struct LayoutStore {
    doc: LayoutDocument,
    next_id: u64,
    selected: Option<ComponentId>,
    listeners: Listeners,
    notifier: Box<dyn Notifier>,
}

impl fmt::Debug for LayoutStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutStore")
            .field("doc", &self.doc)
            .field("next_id", &self.next_id)
            .field("selected", &self.selected)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl Default for LayoutStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutStore {
    /// Empty store that reports notices to the `tracing` log.
    #[must_use]
    pub fn new() -> Self {
        Self::with_notifier(Box::new(TracingNotifier))
    }

    /// Empty store with a custom notification sink.
    #[must_use]
    pub fn with_notifier(notifier: Box<dyn Notifier>) -> Self {
        Self {
            doc: LayoutDocument::default(),
            next_id: FIRST_ID,
            selected: None,
            listeners: Listeners::default(),
            notifier,
        }
    }

    /// Swap the notification sink.
    pub fn set_notifier(&mut self, notifier: Box<dyn Notifier>) {
        self.notifier = notifier;
    }

    // =========================================================================
    // SUBSCRIPTIONS
    // =========================================================================

    /// Register a listener called after every mutation.
    pub fn subscribe(&mut self, listener: Listener) -> SubscriptionId {
        self.listeners.subscribe(listener)
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }

    // =========================================================================
    // ADD
    // =========================================================================

    /// Create a component and select it.
    ///
    /// Top-level components (`parent == None`) get a geometry record built
    /// from `placement`; nested ones get a parent link and no geometry, and
    /// `placement` is ignored. The parent is not required to exist.
    pub fn add_component(
        &mut self,
        props: BlockProps,
        placement: Placement,
        parent: Option<ComponentId>,
    ) -> ComponentId {
        let id = ComponentId::from_counter(self.next_id);
        let kind = props.kind();

        self.doc.components.push(Component::new(id.clone(), props));
        match &parent {
            None => self.doc.layout.push(GeometryRecord::new(id.clone(), placement)),
            Some(p) => {
                if !self.contains(p.as_str()) {
                    warn!(%id, parent = %p, "adding component under unknown parent");
                }
                self.doc.container_parents.insert(id.clone(), p.clone());
            }
        }
        self.next_id = self.next_id.saturating_add(1);
        self.selected = Some(id.clone());

        debug!(%id, %kind, nested = parent.is_some(), "component added");
        self.notifier.notify(&Notice::success(format!("Added {kind} component")));
        self.listeners.emit(&StoreEvent::ComponentAdded { id: id.clone(), parent });
        id
    }

    /// Create a component from a palette drag payload.
    pub fn add_from_payload(
        &mut self,
        payload: &DragPayload,
        placement: Placement,
        parent: Option<ComponentId>,
    ) -> ComponentId {
        self.add_component(payload.default_props.clone(), placement, parent)
    }

    // =========================================================================
    // UPDATE
    // =========================================================================

    /// Replace the whole top-level geometry list, as recomputed by the grid
    /// engine after a drag or resize. Records are accepted as given.
    pub fn update_layout(&mut self, records: Vec<GeometryRecord>) {
        debug!(records = records.len(), "layout replaced");
        self.doc.layout = records;
        self.listeners.emit(&StoreEvent::LayoutUpdated);
    }

    /// Shallow-merge `partial` into a component's props.
    ///
    /// Returns `Ok(false)` when no component has `id`; the update is dropped
    /// with a warning so late edits against deleted components stay harmless.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::InvalidProps`] when the merged props no longer
    /// fit the component's kind. The component is left unchanged.
    pub fn update_component(&mut self, id: &str, partial: &Map<String, Value>) -> Result<bool, LayoutError> {
        let Some(component) = self.doc.components.iter_mut().find(|c| c.id.as_str() == id) else {
            warn!(%id, "update for unknown component ignored");
            return Ok(false);
        };

        let merged = component
            .props
            .merged(partial)
            .map_err(|source| LayoutError::InvalidProps { id: component.id.clone(), source })?;
        if merged == component.props {
            return Ok(true);
        }
        component.props = merged;

        let id = component.id.clone();
        self.listeners.emit(&StoreEvent::ComponentUpdated { id });
        Ok(true)
    }

    /// Overwrite the selection. The id is not checked; a selection that
    /// names no component reads as "nothing selected".
    pub fn select_item(&mut self, id: Option<ComponentId>) {
        self.selected = id.clone();
        self.listeners.emit(&StoreEvent::SelectionChanged { selected: id });
    }

    // =========================================================================
    // REMOVE
    // =========================================================================

    /// Remove a component together with every descendant.
    ///
    /// Geometry records and parent links of the removed ids go with them, and
    /// the selection is cleared if it pointed at any of them. Returns the
    /// removed ids, target first; empty when `id` is unknown.
    pub fn remove_component(&mut self, id: &str) -> Vec<ComponentId> {
        let known = self.contains(id)
            || self.doc.layout.iter().any(|r| r.i.as_str() == id)
            || self.doc.container_parents.contains_key(id);
        if !known {
            warn!(%id, "remove for unknown component ignored");
            return Vec::new();
        }

        let mut removed = vec![ComponentId::new(id)];
        removed.extend(self.descendants(id));
        let doomed: HashSet<&str> = removed.iter().map(ComponentId::as_str).collect();

        self.doc.components.retain(|c| !doomed.contains(c.id.as_str()));
        self.doc.layout.retain(|r| !doomed.contains(r.i.as_str()));
        self.doc
            .container_parents
            .retain(|child, parent| !doomed.contains(child.as_str()) && !doomed.contains(parent.as_str()));

        let selection_cleared = self.selected.as_ref().is_some_and(|s| doomed.contains(s.as_str()));
        if selection_cleared {
            self.selected = None;
        }

        debug!(%id, count = removed.len(), selection_cleared, "components removed");
        let message = if removed.len() == 1 {
            "Component removed".to_string()
        } else {
            format!("Removed {} components", removed.len())
        };
        self.notifier.notify(&Notice::success(message));
        self.listeners.emit(&StoreEvent::ComponentsRemoved { ids: removed.clone(), selection_cleared });
        removed
    }

    /// Clear everything back to the initial empty state.
    pub fn reset_layout(&mut self) {
        self.doc = LayoutDocument::default();
        self.next_id = FIRST_ID;
        self.selected = None;

        info!("layout reset");
        self.notifier.notify(&Notice::success("Layout reset successfully"));
        self.listeners.emit(&StoreEvent::Reset);
    }

    // =========================================================================
    // IMPORT / EXPORT
    // =========================================================================

    /// Export as deterministic, pretty-printed JSON with `layout`,
    /// `components` and `containerParents`, in that order.
    #[must_use]
    pub fn get_layout_json(&self) -> String {
        self.doc.to_json_pretty()
    }

    /// Replace the store from exported JSON.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Parse`], [`LayoutError::MissingField`],
    /// [`LayoutError::Shape`] or [`LayoutError::IdOutOfRange`]; on any error
    /// the store is unchanged and an error notice is sent.
    pub fn set_layout_from_json(&mut self, text: &str) -> Result<ImportSummary, LayoutError> {
        match LayoutDocument::parse(text).and_then(|doc| self.load_document(doc)) {
            Ok(summary) => Ok(summary),
            Err(e) => {
                warn!(error = %e, code = e.error_code(), "layout import rejected");
                self.notifier.notify(&Notice::error(format!("Failed to import layout: {e}")));
                Err(e)
            }
        }
    }

    /// Replace the store with an already-decoded document. The id counter is
    /// recomputed from the imported ids and the selection is cleared.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::IdOutOfRange`] when the document's ids leave no
    /// room for new ones; the store is unchanged.
    pub fn load_document(&mut self, doc: LayoutDocument) -> Result<ImportSummary, LayoutError> {
        self.next_id = doc.next_counter()?;
        self.doc = doc;
        self.selected = None;

        let summary = ImportSummary {
            components: self.doc.components.len(),
            top_level: self.doc.layout.len(),
            nested: self.doc.container_parents.len(),
            next_id: self.next_id,
        };
        info!(components = summary.components, next_id = summary.next_id, "layout imported");
        self.notifier.notify(&Notice::success("Layout imported successfully"));
        self.listeners.emit(&StoreEvent::Imported { components: summary.components });
        Ok(summary)
    }

    // =========================================================================
    // NESTING
    // =========================================================================

    /// Parent of `id`, or `None` for top-level (and unknown) components.
    #[must_use]
    pub fn get_component_parent(&self, id: &str) -> Option<&ComponentId> {
        self.doc.container_parents.get(id)
    }

    /// Direct children of `parent`, in insertion order.
    #[must_use]
    pub fn get_child_components(&self, parent: &str) -> Vec<&Component> {
        self.doc
            .components
            .iter()
            .filter(|c| self.doc.container_parents.get(c.id.as_str()).is_some_and(|p| p.as_str() == parent))
            .collect()
    }

    /// Every component below `id`, in insertion order. Terminates on cyclic
    /// links in imported documents.
    #[must_use]
    pub fn descendants(&self, id: &str) -> Vec<ComponentId> {
        let mut seen: HashSet<&str> = HashSet::from([id]);
        let mut frontier = vec![id];
        while let Some(current) = frontier.pop() {
            for child in self.get_child_components(current) {
                if seen.insert(child.id.as_str()) {
                    frontier.push(child.id.as_str());
                }
            }
        }
        self.doc
            .components
            .iter()
            .filter(|c| c.id.as_str() != id && seen.contains(c.id.as_str()))
            .map(|c| c.id.clone())
            .collect()
    }

    /// Move `child` under `parent`, or back to the top level with `None`.
    ///
    /// Geometry follows the move: nesting drops the child's geometry record,
    /// promoting appends one below the lowest block using the kind's palette
    /// size.
    ///
    /// # Errors
    ///
    /// - [`LayoutError::UnknownComponent`] if either id is not in the store.
    /// - [`LayoutError::SelfParent`] if `parent == child`.
    /// - [`LayoutError::ParentCycle`] if `parent` is a descendant of `child`.
    pub fn set_component_parent(&mut self, child: &str, parent: Option<&str>) -> Result<(), LayoutError> {
        let Some(kind) = self.component(child).map(Component::kind) else {
            return Err(LayoutError::UnknownComponent(ComponentId::new(child)));
        };
        let child_id = ComponentId::new(child);

        match parent {
            Some(p) => {
                if !self.contains(p) {
                    return Err(LayoutError::UnknownComponent(ComponentId::new(p)));
                }
                if p == child {
                    return Err(LayoutError::SelfParent(child_id));
                }
                if self.descendants(child).iter().any(|d| d.as_str() == p) {
                    return Err(LayoutError::ParentCycle { child: child_id, parent: ComponentId::new(p) });
                }
                self.doc.layout.retain(|r| r.i.as_str() != child);
                self.doc.container_parents.insert(child_id.clone(), ComponentId::new(p));
            }
            None => {
                self.doc.container_parents.remove(child);
                if self.geometry(child).is_none() {
                    let item = PaletteItem::for_kind(kind);
                    let placement = Placement::new(0, self.grid_bottom(), item.default_w, item.default_h)
                        .with_min(Some(item.min_w), Some(item.min_h));
                    self.doc.layout.push(GeometryRecord::new(child_id.clone(), placement));
                }
            }
        }

        debug!(child = %child_id, parent = ?parent, "component reparented");
        self.listeners.emit(&StoreEvent::ParentChanged { child: child_id, parent: parent.map(ComponentId::new) });
        Ok(())
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    #[must_use]
    pub fn components(&self) -> &[Component] {
        &self.doc.components
    }

    #[must_use]
    pub fn layout(&self) -> &[GeometryRecord] {
        &self.doc.layout
    }

    #[must_use]
    pub fn parents(&self) -> &BTreeMap<ComponentId, ComponentId> {
        &self.doc.container_parents
    }

    #[must_use]
    pub fn component(&self, id: &str) -> Option<&Component> {
        self.doc.components.iter().find(|c| c.id.as_str() == id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.component(id).is_some()
    }

    #[must_use]
    pub fn geometry(&self, id: &str) -> Option<&GeometryRecord> {
        self.doc.layout.iter().find(|r| r.i.as_str() == id)
    }

    /// The raw selection, which may name a component that no longer exists.
    #[must_use]
    pub fn selected(&self) -> Option<&ComponentId> {
        self.selected.as_ref()
    }

    /// The selected component, or `None` if nothing (or a missing id) is selected.
    #[must_use]
    pub fn selected_component(&self) -> Option<&Component> {
        self.selected.as_ref().and_then(|id| self.component(id.as_str()))
    }

    /// Counter value the next added component will use.
    #[must_use]
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.doc.components.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.doc.components.is_empty()
    }

    /// Read-only view of the whole document.
    #[must_use]
    pub fn document(&self) -> &LayoutDocument {
        &self.doc
    }

    /// Owned copy of the document for views that render asynchronously.
    #[must_use]
    pub fn snapshot(&self) -> LayoutDocument {
        self.doc.clone()
    }

    /// Invariant violations in the current state.
    #[must_use]
    pub fn audit(&self) -> Vec<Violation> {
        audit(&self.doc)
    }

    /// Components arranged as a tree for rendering.
    ///
    /// Roots are components without a parent or whose parent is missing, in
    /// insertion order. Components only reachable through a cycle are left out.
    #[must_use]
    pub fn component_tree(&self) -> Vec<TreeNode<'_>> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut roots = Vec::new();
        for c in &self.doc.components {
            let parent = self.get_component_parent(c.id.as_str());
            if parent.is_none_or(|p| !self.contains(p.as_str())) && seen.insert(c.id.as_str()) {
                roots.push(self.tree_node(c, &mut seen));
            }
        }
        roots
    }

    fn tree_node<'a>(&'a self, component: &'a Component, seen: &mut HashSet<&'a str>) -> TreeNode<'a> {
        let mut children = Vec::new();
        for child in self.get_child_components(component.id.as_str()) {
            if seen.insert(child.id.as_str()) {
                children.push(self.tree_node(child, seen));
            }
        }
        TreeNode { component, placement: self.geometry(component.id.as_str()).map(|r| &r.placement), children }
    }

    /// First free row below every top-level block.
    fn grid_bottom(&self) -> u32 {
        self.doc.layout.iter().map(|r| r.placement.bottom()).max().unwrap_or(0)
    }
}
