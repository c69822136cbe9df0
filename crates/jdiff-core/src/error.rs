use thiserror::Error;

use crate::diff::DiffNode;

/// Errors that can occur while ingesting external documents into
/// [`Value`](crate::Value).
#[derive(Debug, Error)]
pub enum IngestError {
    /// The provided JSON input was invalid.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The provided YAML input was invalid.
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// YAML mappings may only carry string or integer keys.
    #[error("unsupported YAML mapping key: {found}")]
    YamlKey {
        /// A description of the offending key.
        found: String,
    },
    /// YAML tags have no counterpart in the value domain.
    #[error("unsupported YAML tag: {tag}")]
    YamlTag {
        /// The tag identifier encountered in the document.
        tag: String,
    },
}

/// Errors surfaced by [`diff`](crate::diff()) and the stream comparisons.
///
/// Every variant carries the best-effort partial tree built before the
/// failure, so callers can still render what is known.
///
/// ```
/// # use jdiff_core::{diff, Value};
/// let lhs = Value::from_json_str("1")?;
/// let rhs = Value::from_json_str("2")?;
/// assert!(diff(&lhs, &rhs).is_ok());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Error)]
pub enum DiffError {
    /// One of the compared values contains circular references.
    #[error("circular references not supported")]
    Cyclic {
        /// The tree built up to (and including) the offending position.
        partial: DiffNode,
    },
    /// A stream produced an error other than end-of-input.
    #[error("stream read failed: {source}")]
    Stream {
        /// The underlying stream failure.
        source: StreamError,
        /// The tree built from the values paired before the failure.
        partial: DiffNode,
    },
}

impl DiffError {
    /// Borrows the partial diff tree built before the failure.
    #[must_use]
    pub fn partial(&self) -> &DiffNode {
        match self {
            Self::Cyclic { partial } | Self::Stream { partial, .. } => partial,
        }
    }

    /// Consumes the error, returning the partial diff tree.
    #[must_use]
    pub fn into_partial(self) -> DiffNode {
        match self {
            Self::Cyclic { partial } | Self::Stream { partial, .. } => partial,
        }
    }
}

/// Error returned by the side accessors on [`DiffNode`](crate::DiffNode)
/// variants that do not carry the requested side.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SideError {
    /// The node does not carry a left-hand side.
    #[error("{node} does not carry a left-hand side")]
    LhsNotSupported {
        /// The variant name of the offending node.
        node: &'static str,
    },
    /// The node does not carry a right-hand side.
    #[error("{node} does not carry a right-hand side")]
    RhsNotSupported {
        /// The variant name of the offending node.
        node: &'static str,
    },
}

/// Errors produced while pulling values from a [`Stream`](crate::Stream).
#[derive(Debug, Error)]
pub enum StreamError {
    /// A document in the stream failed to parse.
    #[error("invalid JSON document in stream: {0}")]
    Json(#[from] serde_json::Error),
    /// A buffered value failed to ingest.
    #[error(transparent)]
    Ingest(#[from] IngestError),
}

/// Error reported when a path string does not match the grammar.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid path at offset {offset}: {reason}")]
pub struct PathParseError {
    /// Byte offset of the first unexpected character.
    pub offset: usize,
    /// What the parser expected.
    pub reason: &'static str,
}

/// Errors reported when navigating a value along a parsed path.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NavigateError {
    /// An index part was applied to a value that is not a sequence.
    #[error("cannot index into a {found}")]
    NotSequence {
        /// Type label of the value found instead.
        found: &'static str,
    },
    /// A key part was applied to a value that is not a mapping.
    #[error("cannot look up a key in a {found}")]
    NotMapping {
        /// Type label of the value found instead.
        found: &'static str,
    },
    /// An index part exceeded the sequence length.
    #[error("index {index} out of bounds for sequence of length {len}")]
    OutOfBounds {
        /// The requested index.
        index: usize,
        /// The actual sequence length.
        len: usize,
    },
    /// The path descends through a null value.
    #[error("cannot descend into null")]
    Nil,
    /// A key part is incompatible with the mapping's key kind.
    #[error("key {key:?} does not match the mapping's key type")]
    KeyType {
        /// The offending key.
        key: String,
    },
    /// The addressed key is absent from the mapping.
    #[error("no value at key {key:?}")]
    InvalidAccess {
        /// The missing key.
        key: String,
    },
}

/// Errors reported while constructing [`DiffOptions`](crate::DiffOptions).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptionsError {
    /// Sort keys must be non-empty strings.
    #[error("sort keys must be non-empty strings")]
    EmptySortKey,
}

/// Errors reported by the [`Builder`](crate::Builder).
#[derive(Debug, Error)]
pub enum BuildError {
    /// A supplied path failed to parse.
    #[error(transparent)]
    Path(#[from] PathParseError),
    /// `add` targeted a position that already holds a recorded change.
    #[error("cannot add value at {path:?}: position already holds {node}")]
    AddOccupied {
        /// The targeted path.
        path: String,
        /// The variant name of the occupying node.
        node: &'static str,
    },
    /// `delete` targeted a position that already holds a recorded change.
    #[error("cannot delete value at {path:?}: position already holds {node}")]
    DeleteOccupied {
        /// The targeted path.
        path: String,
        /// The variant name of the occupying node.
        node: &'static str,
    },
    /// The path descends through a position occupied by a non-container.
    #[error("cannot descend into {node} at {path:?}")]
    Descend {
        /// The targeted path.
        path: String,
        /// The variant name of the node blocking the descent.
        node: &'static str,
    },
}
