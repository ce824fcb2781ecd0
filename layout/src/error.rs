//! Error taxonomy for store operations.
//!
//! Stale references (updating, selecting or removing an id that no longer
//! exists) are not errors: the store logs them and does nothing. Everything
//! below is a rejected operation that leaves the store unchanged.

use crate::doc::ComponentId;

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    /// Import text is not valid JSON.
    #[error("invalid JSON: {0}")]
    Parse(#[source] serde_json::Error),
    /// Import JSON lacks a required top-level array.
    #[error("missing or non-array field `{0}`")]
    MissingField(&'static str),
    /// Import JSON has the right fields but an entry does not decode.
    #[error("malformed layout document: {0}")]
    Shape(#[source] serde_json::Error),
    /// An imported `item-<N>` id is too large for new ids to follow it.
    #[error("component id {0} leaves no room for new ids")]
    IdOutOfRange(ComponentId),
    /// A reparent referenced an id that is not in the store.
    #[error("component not found: {0}")]
    UnknownComponent(ComponentId),
    /// A component cannot be its own parent.
    #[error("component {0} cannot be nested inside itself")]
    SelfParent(ComponentId),
    /// The proposed parent already sits below the child in the tree.
    #[error("nesting {child} inside {parent} would create a cycle")]
    ParentCycle { child: ComponentId, parent: ComponentId },
    /// Merged props no longer match the component's kind.
    #[error("invalid props for {id}: {source}")]
    InvalidProps {
        id: ComponentId,
        #[source]
        source: serde_json::Error,
    },
}

impl LayoutError {
    /// Stable machine-readable code for hosts that map errors to UI copy.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Parse(_) => "E_PARSE",
            Self::MissingField(_) => "E_STRUCTURE",
            Self::Shape(_) => "E_SHAPE",
            Self::IdOutOfRange(_) => "E_ID_RANGE",
            Self::UnknownComponent(_) => "E_UNKNOWN_COMPONENT",
            Self::SelfParent(_) => "E_SELF_PARENT",
            Self::ParentCycle { .. } => "E_PARENT_CYCLE",
            Self::InvalidProps { .. } => "E_INVALID_PROPS",
        }
    }
}
