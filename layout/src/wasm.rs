//! Browser binding for the layout store.
//!
//! `LayoutBuilder` wraps a [`LayoutStore`] for the JS host. Structured
//! arguments cross the boundary as JSON strings; errors come back as JS
//! `Error` objects whose message carries the error code.
//!
//! The binding never calls into JS while it holds the builder. Store events
//! and notices are queued during each call, and the host drains them with
//! [`LayoutBuilder::take_changes`] once the call has returned. Views can then
//! re-read state freely: by that point the builder is no longer borrowed.

#[cfg(test)]
#[path = "wasm_test.rs"]
mod wasm_test;

use std::cell::RefCell;
use std::rc::Rc;
use std::str::FromStr;

use serde::Serialize;
use serde_json::{Map, Value};
use wasm_bindgen::prelude::*;

use crate::block::{BlockKind, BlockProps};
use crate::doc::{ComponentId, GeometryRecord, Placement};
use crate::error::LayoutError;
use crate::event::StoreEvent;
use crate::notify::{Notice, Notifier};
use crate::palette::{DragPayload, GridConfig, palette};
use crate::store::LayoutStore;

fn js_err(e: &LayoutError) -> JsValue {
    js_sys::Error::new(&format!("{}: {e}", e.error_code())).into()
}

fn js_decode_err(what: &str, e: &serde_json::Error) -> JsValue {
    js_sys::Error::new(&format!("E_ARGUMENT: invalid {what}: {e}")).into()
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

// =============================================================
// Outbox
// =============================================================

/// Everything the store reported since the last drain.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct Changes {
    pub events: Vec<StoreEvent>,
    pub notices: Vec<Notice>,
}

/// Shared queue filled by the store's listener and notifier.
#[derive(Clone, Default)]
pub(crate) struct Outbox {
    pending: Rc<RefCell<Changes>>,
}

impl Outbox {
    /// Route `store`'s events and notices into this outbox.
    pub(crate) fn attach(&self, store: &mut LayoutStore) {
        let sink = Rc::clone(&self.pending);
        store.subscribe(Box::new(move |event| sink.borrow_mut().events.push(event.clone())));
        store.set_notifier(Box::new(self.clone()));
    }

    pub(crate) fn take(&self) -> Changes {
        std::mem::take(&mut *self.pending.borrow_mut())
    }
}

impl Notifier for Outbox {
    fn notify(&self, notice: &Notice) {
        self.pending.borrow_mut().notices.push(notice.clone());
    }
}

// =============================================================
// Builder
// =============================================================

/// The layout store as seen from JavaScript.
#[wasm_bindgen]
pub struct LayoutBuilder {
    store: LayoutStore,
    grid: GridConfig,
    outbox: Outbox,
}

impl Default for LayoutBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl LayoutBuilder {
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> Self {
        let mut store = LayoutStore::new();
        let outbox = Outbox::default();
        outbox.attach(&mut store);
        Self { store, grid: GridConfig::default(), outbox }
    }

    /// Drain queued events and notices as `{ events, notices }` JSON.
    ///
    /// Call after each mutating method; both lists are empty when nothing
    /// changed.
    #[must_use]
    pub fn take_changes(&self) -> String {
        to_json(&self.outbox.take())
    }

    /// Palette entries as a JSON array of drag payloads.
    #[must_use]
    pub fn palette_json(&self) -> String {
        let payloads: Vec<DragPayload> = palette().iter().map(|item| item.payload()).collect();
        to_json(&payloads)
    }

    /// Add a component from explicit kind, placement JSON and props JSON.
    ///
    /// # Errors
    ///
    /// Rejects unknown kinds and undecodable placement or props.
    pub fn add_component(
        &mut self,
        kind: &str,
        placement_json: &str,
        props_json: &str,
        parent: Option<String>,
    ) -> Result<String, JsValue> {
        let kind = BlockKind::from_str(kind)
            .map_err(|e| JsValue::from(js_sys::Error::new(&format!("E_ARGUMENT: {e}"))))?;
        let placement: Placement =
            serde_json::from_str(placement_json).map_err(|e| js_decode_err("placement", &e))?;
        let props_value: Value = serde_json::from_str(props_json).map_err(|e| js_decode_err("props", &e))?;
        let props = BlockProps::from_value(kind, props_value).map_err(|e| js_decode_err("props", &e))?;
        let id = self.store.add_component(props, placement, parent.map(ComponentId::from));
        Ok(id.to_string())
    }

    /// Handle a palette drop at a pixel point relative to the grid.
    ///
    /// # Errors
    ///
    /// Rejects an undecodable payload.
    pub fn drop_payload(&mut self, payload_json: &str, px: f64, py: f64, parent: Option<String>) -> Result<String, JsValue> {
        let payload: DragPayload = serde_json::from_str(payload_json).map_err(|e| js_decode_err("payload", &e))?;
        let placement = payload.placement_at_point(px, py, &self.grid);
        let id = self.store.add_from_payload(&payload, placement, parent.map(ComponentId::from));
        Ok(id.to_string())
    }

    /// Accept the grid engine's recomputed top-level layout.
    ///
    /// # Errors
    ///
    /// Rejects JSON that is not an array of geometry records.
    pub fn update_layout(&mut self, layout_json: &str) -> Result<(), JsValue> {
        let records: Vec<GeometryRecord> =
            serde_json::from_str(layout_json).map_err(|e| js_decode_err("layout", &e))?;
        self.store.update_layout(records);
        Ok(())
    }

    /// Merge a props object into a component. Returns false for unknown ids.
    ///
    /// # Errors
    ///
    /// Rejects non-object JSON and props that do not fit the component's kind.
    pub fn update_component(&mut self, id: &str, partial_json: &str) -> Result<bool, JsValue> {
        let partial: Map<String, Value> =
            serde_json::from_str(partial_json).map_err(|e| js_decode_err("props", &e))?;
        self.store.update_component(id, &partial).map_err(|e| js_err(&e))
    }

    /// Remove a component and its descendants. Returns the removed ids as JSON.
    pub fn remove_component(&mut self, id: &str) -> String {
        to_json(&self.store.remove_component(id))
    }

    pub fn select_item(&mut self, id: Option<String>) {
        self.store.select_item(id.map(ComponentId::from));
    }

    /// Id of the selected component, if it still exists.
    #[must_use]
    pub fn selected_id(&self) -> Option<String> {
        self.store.selected_component().map(|c| c.id.to_string())
    }

    /// The selected component as JSON, for the inspector.
    #[must_use]
    pub fn selected_component_json(&self) -> Option<String> {
        self.store.selected_component().map(to_json)
    }

    #[must_use]
    pub fn get_layout_json(&self) -> String {
        self.store.get_layout_json()
    }

    /// # Errors
    ///
    /// Returns the parse or structure error; the store is unchanged.
    pub fn set_layout_from_json(&mut self, text: &str) -> Result<(), JsValue> {
        self.store.set_layout_from_json(text).map(|_| ()).map_err(|e| js_err(&e))
    }

    pub fn reset_layout(&mut self) {
        self.store.reset_layout();
    }

    #[must_use]
    pub fn get_component_parent(&self, id: &str) -> Option<String> {
        self.store.get_component_parent(id).map(ToString::to_string)
    }

    /// Direct children as a JSON array of components.
    #[must_use]
    pub fn get_child_components(&self, parent: &str) -> String {
        to_json(&self.store.get_child_components(parent))
    }

    /// # Errors
    ///
    /// Rejects unknown ids, self-nesting and cycles.
    pub fn set_component_parent(&mut self, child: &str, parent: Option<String>) -> Result<(), JsValue> {
        self.store.set_component_parent(child, parent.as_deref()).map_err(|e| js_err(&e))
    }

    /// Nested component tree as JSON, for the canvas renderer.
    #[must_use]
    pub fn component_tree_json(&self) -> String {
        to_json(&self.store.component_tree())
    }
}
