//! Document model: component ids, grid geometry, components, and the JSON
//! layout document.
//!
//! `LayoutDocument` is the exact shape written by export and accepted by
//! import. The store keeps the same three collections internally, so export
//! is a plain serialization and import is a parse plus structural checks.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::block::{BlockKind, BlockProps};
use crate::consts::{FIRST_ID, ID_PREFIX, KEY_COMPONENTS, KEY_LAYOUT, MAX_COUNTER};
use crate::error::LayoutError;

// =============================================================
// Ids
// =============================================================

/// Identifier of a placed component, normally `item-<N>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(String);

impl ComponentId {
    /// Wrap an arbitrary id string (imported documents may carry any shape).
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Mint the id for counter value `n`.
    #[must_use]
    pub fn from_counter(n: u64) -> Self {
        Self(format!("{ID_PREFIX}{n}"))
    }

    /// Numeric suffix of an `item-<N>` id; `None` for any other shape.
    #[must_use]
    pub fn counter(&self) -> Option<u64> {
        let digits = self.0.strip_prefix(ID_PREFIX)?;
        match digits.parse::<u64>() {
            Ok(n) => Some(n),
            Err(_) => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ComponentId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ComponentId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for ComponentId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

// =============================================================
// Geometry
// =============================================================

/// Grid cell position and span, plus optional resize clamps and flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    /// Column of the left edge.
    pub x: u32,
    /// Row of the top edge.
    pub y: u32,
    /// Span in columns.
    pub w: u32,
    /// Span in rows.
    pub h: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_w: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_w: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_h: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_h: Option<u32>,
    /// Pinned: neither draggable nor resizable, and other items flow around it.
    #[serde(rename = "static", default, skip_serializing_if = "Option::is_none")]
    pub is_static: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_draggable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_resizable: Option<bool>,
}

impl Placement {
    #[must_use]
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h, ..Self::default() }
    }

    /// Attach minimum-size resize clamps.
    #[must_use]
    pub fn with_min(mut self, min_w: Option<u32>, min_h: Option<u32>) -> Self {
        self.min_w = min_w;
        self.min_h = min_h;
        self
    }

    /// First row below this placement.
    #[must_use]
    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.h)
    }
}

/// Grid placement of one top-level component. `i` is the owning component id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeometryRecord {
    pub i: ComponentId,
    #[serde(flatten)]
    pub placement: Placement,
}

impl GeometryRecord {
    #[must_use]
    pub fn new(i: ComponentId, placement: Placement) -> Self {
        Self { i, placement }
    }
}

// =============================================================
// Components
// =============================================================

/// One placed block: its id and its kind-tagged properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawComponent", into = "RawComponent")]
pub struct Component {
    pub id: ComponentId,
    pub props: BlockProps,
}

impl Component {
    #[must_use]
    pub fn new(id: ComponentId, props: BlockProps) -> Self {
        Self { id, props }
    }

    #[must_use]
    pub fn kind(&self) -> BlockKind {
        self.props.kind()
    }
}

/// Wire shape of a component: `{ "id", "type", "props" }`.
#[derive(Serialize, Deserialize)]
struct RawComponent {
    id: ComponentId,
    #[serde(rename = "type")]
    kind: BlockKind,
    #[serde(default)]
    props: Value,
}

impl TryFrom<RawComponent> for Component {
    type Error = serde_json::Error;

    fn try_from(raw: RawComponent) -> Result<Self, Self::Error> {
        let props = BlockProps::from_value(raw.kind, raw.props)?;
        Ok(Self { id: raw.id, props })
    }
}

impl From<Component> for RawComponent {
    fn from(c: Component) -> Self {
        Self { id: c.id, kind: c.props.kind(), props: c.props.to_value() }
    }
}

// =============================================================
// Document
// =============================================================

/// The exported layout: geometry, components, and nesting links.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDocument {
    /// Geometry of top-level components, in insertion order.
    pub layout: Vec<GeometryRecord>,
    /// Every component, top-level and nested, in insertion order.
    pub components: Vec<Component>,
    /// Nested child id → parent id. Missing keys mean top-level.
    #[serde(default, deserialize_with = "parents_skipping_null")]
    pub container_parents: BTreeMap<ComponentId, ComponentId>,
}

impl LayoutDocument {
    /// Parse and structurally check an exported document.
    ///
    /// # Errors
    ///
    /// - [`LayoutError::Parse`] when `text` is not JSON.
    /// - [`LayoutError::MissingField`] when `layout` or `components` is absent
    ///   or not an array.
    /// - [`LayoutError::Shape`] when an entry does not decode.
    pub fn parse(text: &str) -> Result<Self, LayoutError> {
        let value: Value = serde_json::from_str(text).map_err(LayoutError::Parse)?;
        for key in [KEY_LAYOUT, KEY_COMPONENTS] {
            if !value.get(key).is_some_and(Value::is_array) {
                return Err(LayoutError::MissingField(key));
            }
        }
        serde_json::from_value(value).map_err(LayoutError::Shape)
    }

    /// Serialize as pretty-printed JSON with fixed field order.
    #[must_use]
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Id counter value that cannot collide with any component in the document.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::IdOutOfRange`] when the largest `item-<N>` id
    /// leaves no room below [`MAX_COUNTER`] for new ids.
    pub fn next_counter(&self) -> Result<u64, LayoutError> {
        let highest = self
            .components
            .iter()
            .filter_map(|c| c.id.counter().map(|n| (n, &c.id)))
            .max_by_key(|(n, _)| *n);
        let Some((n, id)) = highest else {
            return Ok(FIRST_ID);
        };
        match n.checked_add(1) {
            Some(next) if next <= MAX_COUNTER => Ok(next),
            _ => Err(LayoutError::IdOutOfRange(id.clone())),
        }
    }
}

/// `containerParents` may be absent, `null`, or hold `null` values; all of
/// those mean "top-level".
fn parents_skipping_null<'de, D>(deserializer: D) -> Result<BTreeMap<ComponentId, ComponentId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<ComponentId, Option<ComponentId>>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(child, parent)| parent.map(|p| (child, p)))
        .collect())
}
