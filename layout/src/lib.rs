//! Layout state model for the grid page builder.
//!
//! Users drag blocks from a palette onto a 12-column grid, resize and nest
//! them, edit their props, and export the result as JSON. This crate owns the
//! state behind all of that: one [`store::LayoutStore`] holding components,
//! top-level geometry, parent links and the selection, and keeping them
//! consistent under any sequence of UI-driven mutations. Rendering, gesture
//! capture and the grid reflow engine live in the host and talk to the store
//! through its operations and change events.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`store`] | The layout store and its operations |
//! | [`doc`] | Ids, geometry records, components, and the JSON document |
//! | [`block`] | Block kinds and typed per-kind props |
//! | [`palette`] | Palette entries, drag payloads, drop placement |
//! | [`event`] | Change events and subscriptions |
//! | [`notify`] | Notification sink for user-facing notices |
//! | [`audit`] | Invariant checks over a document |
//! | [`error`] | Error taxonomy |
//! | [`wasm`] | `wasm-bindgen` wrapper for the browser host |
//! | [`consts`] | Shared constants (id prefix, grid size, JSON keys) |

pub mod audit;
pub mod block;
pub mod consts;
pub mod doc;
pub mod error;
pub mod event;
pub mod notify;
pub mod palette;
pub mod store;
pub mod wasm;

pub use block::{BlockKind, BlockProps};
pub use doc::{Component, ComponentId, GeometryRecord, LayoutDocument, Placement};
pub use error::LayoutError;
pub use store::LayoutStore;
