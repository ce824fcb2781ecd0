//! Palette entries and the drag payload they hand to a drop target.
//!
//! A palette item knows a kind's default span and minimum size; the drag
//! payload adds the kind's default props. Dropping converts the pointer
//! position into a grid cell and clamps the block inside the grid.

#[cfg(test)]
#[path = "palette_test.rs"]
mod palette_test;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::block::{BlockKind, BlockProps};
use crate::consts::{DROP_CELL_PX, GRID_COLUMNS};
use crate::doc::Placement;

/// Grid dimensions used to turn drop points into placements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridConfig {
    /// Number of columns; placements never extend past the last one.
    pub columns: u32,
    /// Pixel size of one cell for drop-point conversion.
    pub cell_px: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { columns: GRID_COLUMNS, cell_px: DROP_CELL_PX }
    }
}

impl GridConfig {
    /// Cell under a drop point given in pixels relative to the grid's top-left.
    /// Points above or left of the grid map to row/column 0.
    #[must_use]
    pub fn cell_at(&self, px: f64, py: f64) -> (u32, u32) {
        (to_cell(px, self.cell_px), to_cell(py, self.cell_px))
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_cell(p: f64, cell_px: f64) -> u32 {
    if !p.is_finite() || cell_px <= 0.0 || p <= 0.0 {
        return 0;
    }
    (p / cell_px).floor().min(f64::from(u32::MAX)) as u32
}

/// A draggable entry in the component palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteItem {
    pub kind: BlockKind,
    pub title: &'static str,
    pub default_w: u32,
    pub default_h: u32,
    pub min_w: u32,
    pub min_h: u32,
}

impl PaletteItem {
    /// The palette entry for `kind`.
    #[must_use]
    pub fn for_kind(kind: BlockKind) -> Self {
        let (title, default_w, default_h, min_w, min_h) = match kind {
            BlockKind::Text => ("Text", 6, 2, 2, 1),
            BlockKind::Heading => ("Heading", 6, 1, 2, 1),
            BlockKind::Card => ("Card", 4, 4, 3, 3),
            BlockKind::Button => ("Button", 2, 1, 2, 1),
            BlockKind::Image => ("Image", 4, 4, 2, 2),
            BlockKind::Divider => ("Divider", 12, 1, 2, 1),
            BlockKind::Spacer => ("Spacer", 12, 1, 1, 1),
            BlockKind::Table => ("Table", 6, 4, 3, 3),
            BlockKind::Chart => ("Chart", 6, 4, 4, 3),
            BlockKind::Container => ("Container", 6, 6, 3, 3),
        };
        Self { kind, title, default_w, default_h, min_w, min_h }
    }

    /// Payload carried from this item to the drop target.
    #[must_use]
    pub fn payload(&self) -> DragPayload {
        DragPayload {
            kind: self.kind,
            default_props: BlockProps::defaults(self.kind),
            default_w: self.default_w,
            default_h: self.default_h,
            min_w: Some(self.min_w),
            min_h: Some(self.min_h),
        }
    }
}

/// All palette entries in display order.
#[must_use]
pub fn palette() -> Vec<PaletteItem> {
    BlockKind::ALL.into_iter().map(PaletteItem::for_kind).collect()
}

/// In-memory drag payload: `{ type, defaultProps, defaultW, defaultH, minW, minH }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPayload", into = "RawPayload")]
pub struct DragPayload {
    pub kind: BlockKind,
    pub default_props: BlockProps,
    pub default_w: u32,
    pub default_h: u32,
    pub min_w: Option<u32>,
    pub min_h: Option<u32>,
}

impl DragPayload {
    /// Placement for a drop on cell `(col, row)`, clamped so the block fits
    /// inside `grid.columns`.
    #[must_use]
    pub fn placement_at(&self, col: u32, row: u32, grid: &GridConfig) -> Placement {
        let w = self.default_w.clamp(1, grid.columns.max(1));
        let x = col.min(grid.columns.saturating_sub(w));
        Placement::new(x, row, w, self.default_h.max(1)).with_min(self.min_w, self.min_h)
    }

    /// Placement for a drop at a pixel point relative to the grid.
    #[must_use]
    pub fn placement_at_point(&self, px: f64, py: f64, grid: &GridConfig) -> Placement {
        let (col, row) = grid.cell_at(px, py);
        self.placement_at(col, row, grid)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPayload {
    #[serde(rename = "type")]
    kind: BlockKind,
    #[serde(default)]
    default_props: Value,
    default_w: u32,
    default_h: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    min_w: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    min_h: Option<u32>,
}

impl TryFrom<RawPayload> for DragPayload {
    type Error = serde_json::Error;

    fn try_from(raw: RawPayload) -> Result<Self, Self::Error> {
        Ok(Self {
            kind: raw.kind,
            default_props: BlockProps::from_value(raw.kind, raw.default_props)?,
            default_w: raw.default_w,
            default_h: raw.default_h,
            min_w: raw.min_w,
            min_h: raw.min_h,
        })
    }
}

impl From<DragPayload> for RawPayload {
    fn from(p: DragPayload) -> Self {
        Self {
            kind: p.kind,
            default_props: p.default_props.to_value(),
            default_w: p.default_w,
            default_h: p.default_h,
            min_w: p.min_w,
            min_h: p.min_h,
        }
    }
}
