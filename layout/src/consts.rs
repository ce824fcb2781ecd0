//! Shared constants for the layout crate.

// ── Ids ─────────────────────────────────────────────────────────

/// Prefix of every minted component id (`item-1`, `item-2`, ...).
pub const ID_PREFIX: &str = "item-";

/// First value of the id counter in an empty store.
pub const FIRST_ID: u64 = 1;

/// Largest counter value ever minted (2^53 - 1, the largest integer a JS
/// number holds exactly). Imports whose ids leave no room below it are
/// rejected.
pub const MAX_COUNTER: u64 = (1 << 53) - 1;

// ── Grid ────────────────────────────────────────────────────────

/// Number of columns on the canvas grid.
pub const GRID_COLUMNS: u32 = 12;

/// Pixel size of one cell when converting a drop point into grid cells.
pub const DROP_CELL_PX: f64 = 100.0;

// ── Export ──────────────────────────────────────────────────────

/// Top-level key holding the geometry records.
pub const KEY_LAYOUT: &str = "layout";

/// Top-level key holding the component list.
pub const KEY_COMPONENTS: &str = "components";
