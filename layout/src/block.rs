//! Block kinds and their strongly-typed property records.
//!
//! Every placed component carries a [`BlockProps`] value: a tagged union with
//! one record per [`BlockKind`]. Records are `camelCase` on the wire, fill
//! missing keys from their defaults, and keep any key they do not recognise in
//! an `extra` map so that the property bag stays open for renderers that know
//! more than this crate does.
//!
//! Partial edits arrive as a JSON object and are applied by
//! [`BlockProps::merged`], which performs a shallow merge at the JSON level and
//! then re-decodes the result into the same kind's record.

#[cfg(test)]
#[path = "block_test.rs"]
mod block_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// The closed set of block types a palette can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Text,
    Heading,
    Card,
    Button,
    Image,
    Divider,
    Spacer,
    Table,
    Chart,
    /// Hosts other components; its children are laid out by its own flow.
    Container,
}

impl BlockKind {
    /// Every kind, in palette order.
    pub const ALL: [BlockKind; 10] = [
        Self::Text,
        Self::Heading,
        Self::Card,
        Self::Button,
        Self::Image,
        Self::Divider,
        Self::Spacer,
        Self::Table,
        Self::Chart,
        Self::Container,
    ];

    /// Wire name of the kind (`"text"`, `"chart"`, ...).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Heading => "heading",
            Self::Card => "card",
            Self::Button => "button",
            Self::Image => "image",
            Self::Divider => "divider",
            Self::Spacer => "spacer",
            Self::Table => "table",
            Self::Chart => "chart",
            Self::Container => "container",
        }
    }

    /// Whether components of this kind are meant to host children.
    #[must_use]
    pub fn is_container(self) -> bool {
        matches!(self, Self::Container)
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known [`BlockKind`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown block kind: {0}")]
pub struct UnknownKind(pub String);

impl FromStr for BlockKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

// =============================================================
// Enumerated prop values
// =============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingLevel {
    H1,
    #[default]
    H2,
    H3,
    H4,
    H5,
    H6,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonVariant {
    #[default]
    Default,
    Destructive,
    Outline,
    Secondary,
    Ghost,
    Link,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonSize {
    #[default]
    Default,
    Sm,
    Lg,
    Icon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Bar,
    Line,
}

// =============================================================
// Per-kind records
// =============================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextProps {
    pub text: String,
    /// Text color class, e.g. `"text-primary"`.
    pub color: String,
    /// Text size class, e.g. `"text-lg"`.
    pub size: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for TextProps {
    fn default() -> Self {
        Self {
            text: "Lorem ipsum dolor sit amet, consectetur adipiscing elit. Nullam in dui mauris.".into(),
            color: "text-foreground".into(),
            size: "text-base".into(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeadingProps {
    pub text: String,
    pub level: HeadingLevel,
    pub color: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for HeadingProps {
    fn default() -> Self {
        Self {
            text: "Heading".into(),
            level: HeadingLevel::H2,
            color: "text-foreground".into(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CardProps {
    pub title: String,
    pub content: String,
    pub has_header: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for CardProps {
    fn default() -> Self {
        Self {
            title: "Card Title".into(),
            content: "Card content goes here".into(),
            has_header: true,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ButtonProps {
    pub text: String,
    pub variant: ButtonVariant,
    pub size: ButtonSize,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for ButtonProps {
    fn default() -> Self {
        Self {
            text: "Button".into(),
            variant: ButtonVariant::Default,
            size: ButtonSize::Default,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageProps {
    pub src: String,
    pub alt: String,
    /// CSS aspect ratio, e.g. `"16/9"`.
    pub aspect_ratio: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for ImageProps {
    fn default() -> Self {
        Self {
            src: "https://source.unsplash.com/random/800x600/?minimal".into(),
            alt: "Image".into(),
            aspect_ratio: "16/9".into(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DividerProps {
    pub orientation: Orientation,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpacerProps {
    /// CSS height, e.g. `"2rem"`.
    pub height: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for SpacerProps {
    fn default() -> Self {
        Self { height: "2rem".into(), extra: Map::new() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableProps {
    pub rows: u32,
    pub columns: u32,
    pub headers: Vec<String>,
    /// Row-major cell text.
    pub data: Vec<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for TableProps {
    fn default() -> Self {
        let headers = (1..=3).map(|c| format!("Header {c}")).collect();
        let data = (1..=3)
            .map(|r| (1..=3).map(|c| format!("Cell {r}-{c}")).collect())
            .collect();
        Self { rows: 3, columns: 3, headers, data, extra: Map::new() }
    }
}

/// One series of a chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
    /// Styling keys such as `backgroundColor`, kept for export.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChartProps {
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    pub data: ChartData,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for ChartProps {
    fn default() -> Self {
        let labels = ["Jan", "Feb", "Mar", "Apr", "May", "Jun"].map(String::from).to_vec();
        Self {
            chart_type: ChartType::Bar,
            data: ChartData {
                labels,
                datasets: vec![
                    Dataset { label: "Dataset 1".into(), data: vec![12.0, 19.0, 3.0, 5.0, 2.0, 3.0], extra: Map::new() },
                    Dataset { label: "Dataset 2".into(), data: vec![2.0, 3.0, 20.0, 5.0, 1.0, 4.0], extra: Map::new() },
                ],
                extra: Map::new(),
            },
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContainerProps {
    /// Background class, e.g. `"bg-muted/30"`.
    pub background: String,
    pub border: bool,
    /// Padding class, e.g. `"p-4"`.
    pub padding: String,
    pub rounded: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for ContainerProps {
    fn default() -> Self {
        Self {
            background: "bg-muted/30".into(),
            border: true,
            padding: "p-4".into(),
            rounded: true,
            extra: Map::new(),
        }
    }
}

// =============================================================
// Tagged union
// =============================================================

/// Properties of one component, tagged by its kind.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockProps {
    Text(TextProps),
    Heading(HeadingProps),
    Card(CardProps),
    Button(ButtonProps),
    Image(ImageProps),
    Divider(DividerProps),
    Spacer(SpacerProps),
    Table(TableProps),
    Chart(ChartProps),
    Container(ContainerProps),
}

impl BlockProps {
    /// Default properties for a freshly dropped block of `kind`.
    #[must_use]
    pub fn defaults(kind: BlockKind) -> Self {
        match kind {
            BlockKind::Text => Self::Text(TextProps::default()),
            BlockKind::Heading => Self::Heading(HeadingProps::default()),
            BlockKind::Card => Self::Card(CardProps::default()),
            BlockKind::Button => Self::Button(ButtonProps::default()),
            BlockKind::Image => Self::Image(ImageProps::default()),
            BlockKind::Divider => Self::Divider(DividerProps::default()),
            BlockKind::Spacer => Self::Spacer(SpacerProps::default()),
            BlockKind::Table => Self::Table(TableProps::default()),
            BlockKind::Chart => Self::Chart(ChartProps::default()),
            BlockKind::Container => Self::Container(ContainerProps::default()),
        }
    }

    /// The kind tag of this value.
    #[must_use]
    pub fn kind(&self) -> BlockKind {
        match self {
            Self::Text(_) => BlockKind::Text,
            Self::Heading(_) => BlockKind::Heading,
            Self::Card(_) => BlockKind::Card,
            Self::Button(_) => BlockKind::Button,
            Self::Image(_) => BlockKind::Image,
            Self::Divider(_) => BlockKind::Divider,
            Self::Spacer(_) => BlockKind::Spacer,
            Self::Table(_) => BlockKind::Table,
            Self::Chart(_) => BlockKind::Chart,
            Self::Container(_) => BlockKind::Container,
        }
    }

    /// Decode a raw props bag for `kind`. `null` yields the kind's defaults.
    ///
    /// # Errors
    ///
    /// Returns the decode error when `value` is not an object or a known
    /// field holds a value of the wrong shape.
    pub fn from_value(kind: BlockKind, value: Value) -> Result<Self, serde_json::Error> {
        if value.is_null() {
            return Ok(Self::defaults(kind));
        }
        Ok(match kind {
            BlockKind::Text => Self::Text(serde_json::from_value(value)?),
            BlockKind::Heading => Self::Heading(serde_json::from_value(value)?),
            BlockKind::Card => Self::Card(serde_json::from_value(value)?),
            BlockKind::Button => Self::Button(serde_json::from_value(value)?),
            BlockKind::Image => Self::Image(serde_json::from_value(value)?),
            BlockKind::Divider => Self::Divider(serde_json::from_value(value)?),
            BlockKind::Spacer => Self::Spacer(serde_json::from_value(value)?),
            BlockKind::Table => Self::Table(serde_json::from_value(value)?),
            BlockKind::Chart => Self::Chart(serde_json::from_value(value)?),
            BlockKind::Container => Self::Container(serde_json::from_value(value)?),
        })
    }

    /// The props as a JSON object.
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }

    /// Shallow-merge `partial` over these props and re-decode.
    ///
    /// Keys in `partial` overwrite, other keys are kept, and a `null` value
    /// drops the key so the field falls back to its default.
    ///
    /// # Errors
    ///
    /// Returns the decode error when the merged bag no longer fits the kind.
    pub fn merged(&self, partial: &Map<String, Value>) -> Result<Self, serde_json::Error> {
        let mut bag = match self.to_value() {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        for (k, v) in partial {
            if v.is_null() {
                bag.remove(k);
            } else {
                bag.insert(k.clone(), v.clone());
            }
        }
        Self::from_value(self.kind(), Value::Object(bag))
    }

    /// Short human-readable caption: the text, title or alt of the block.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Text(p) => Some(&p.text),
            Self::Heading(p) => Some(&p.text),
            Self::Card(p) => Some(&p.title),
            Self::Button(p) => Some(&p.text),
            Self::Image(p) => Some(&p.alt),
            Self::Divider(_) | Self::Spacer(_) | Self::Table(_) | Self::Chart(_) | Self::Container(_) => None,
        }
    }
}

impl Serialize for BlockProps {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(p) => p.serialize(serializer),
            Self::Heading(p) => p.serialize(serializer),
            Self::Card(p) => p.serialize(serializer),
            Self::Button(p) => p.serialize(serializer),
            Self::Image(p) => p.serialize(serializer),
            Self::Divider(p) => p.serialize(serializer),
            Self::Spacer(p) => p.serialize(serializer),
            Self::Table(p) => p.serialize(serializer),
            Self::Chart(p) => p.serialize(serializer),
            Self::Container(p) => p.serialize(serializer),
        }
    }
}
