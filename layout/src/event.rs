//! Change events and the subscriber list.
//!
//! Views subscribe to the store instead of holding authoritative copies.
//! Each mutating store operation emits exactly one [`StoreEvent`] after the
//! state change is complete, so a listener always observes a consistent store
//! when it re-reads.

use serde::Serialize;

use crate::doc::ComponentId;

/// What changed in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StoreEvent {
    /// A component was created and selected.
    ComponentAdded { id: ComponentId, parent: Option<ComponentId> },
    /// The top-level geometry list was replaced.
    LayoutUpdated,
    /// A component's props were merged.
    ComponentUpdated { id: ComponentId },
    /// A component and its descendants were removed.
    ComponentsRemoved { ids: Vec<ComponentId>, selection_cleared: bool },
    SelectionChanged { selected: Option<ComponentId> },
    /// A component moved between top-level and nested, or between parents.
    ParentChanged { child: ComponentId, parent: Option<ComponentId> },
    /// The whole store was replaced from a document.
    Imported { components: usize },
    Reset,
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u32);

impl SubscriptionId {
    #[must_use]
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Callback invoked for every store event.
pub type Listener = Box<dyn FnMut(&StoreEvent)>;

#[derive(Default)]
pub(crate) struct Listeners {
    next: u32,
    entries: Vec<(SubscriptionId, Listener)>,
}

impl Listeners {
    pub(crate) fn subscribe(&mut self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next);
        self.next = self.next.wrapping_add(1);
        self.entries.push((id, listener));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(sid, _)| *sid != id);
        self.entries.len() != before
    }

    pub(crate) fn emit(&mut self, event: &StoreEvent) {
        for (_, listener) in &mut self.entries {
            listener(event);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
