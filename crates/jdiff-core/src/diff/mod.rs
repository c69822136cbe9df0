//! The diff engine and the diff-tree data model.
//!
//! [`diff`] compares two [`Value`]s and produces a tree of [`DiffNode`]s
//! mirroring the shape of the inputs. The tree can be transformed with
//! [`walk`], rendered with [`DiffNode::string_indent`], flattened with
//! [`report`], or synthesised from scratch with a [`Builder`].

mod builder;
mod mapping;
mod report;
mod scalar;
mod sequence;
mod stream;
mod visited;
mod walk;

pub use builder::{Builder, ValueDiffers, ValueExcess, ValueMissing};
pub use mapping::{MapExcess, MapMissing, MappingDiff};
pub use report::report;
pub use scalar::{Scalar, Types};
pub use sequence::{SeqExcess, SeqMissing, SequenceDiff};
pub use stream::{
    diff_streams, validate_stream, JsonStream, OnceStream, Stream, StreamDiff, StreamExcess,
    StreamMissing,
};
pub use walk::walk;

use std::fmt;

use crate::{path, DiffError, DiffOptions, OutputStyle, SideError, StreamError, Value};
use visited::Visited;

/// The semantic category of a diff node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiffKind {
    /// The two sides are of incompatible kinds.
    TypesDiffer,
    /// The two sides are of the same kind but hold different content.
    ContentDiffer,
    /// The two sides are structurally equal.
    Identical,
    /// The node cannot be categorised (never produced by the engine).
    Invalid,
}

impl fmt::Display for DiffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypesDiffer => f.write_str("types differ"),
            Self::ContentDiffer => f.write_str("content differ"),
            Self::Identical => f.write_str("identical"),
            Self::Invalid => f.write_str("invalid type"),
        }
    }
}

/// One node of a diff tree.
///
/// Container variants own their children; [`kind`](Self::kind) is always
/// recomputed from the current children, so replacements made by [`walk`]
/// are reflected immediately.
#[derive(Clone, Debug, PartialEq)]
pub enum DiffNode {
    /// Two comparable primitives.
    Scalar(Scalar),
    /// Two sides of incompatible kinds.
    Types(Types),
    /// Two mappings compared key by key.
    Mapping(MappingDiff),
    /// A key present in the left-hand side only.
    MapMissing(MapMissing),
    /// A key present in the right-hand side only.
    MapExcess(MapExcess),
    /// Two sequences compared element by element.
    Sequence(SequenceDiff),
    /// An element present in the left-hand side only.
    SeqMissing(SeqMissing),
    /// An element present in the right-hand side only.
    SeqExcess(SeqExcess),
    /// Two streams compared value by value.
    Stream(StreamDiff),
    /// A stream value present in the left-hand side only.
    StreamMissing(StreamMissing),
    /// A stream value present in the right-hand side only.
    StreamExcess(StreamExcess),
    /// A recorded replacement, produced by the [`Builder`].
    ValueDiffers(ValueDiffers),
    /// A recorded deletion, produced by the [`Builder`].
    ValueMissing(ValueMissing),
    /// A recorded insertion, produced by the [`Builder`].
    ValueExcess(ValueExcess),
    /// A sentinel erasing a subtree from kinds, renders and reports.
    Ignore,
}

impl DiffNode {
    /// Returns the semantic category of this node.
    ///
    /// Container kinds are computed from the children on every call.
    #[must_use]
    pub fn kind(&self) -> DiffKind {
        match self {
            Self::Scalar(n) => n.kind(),
            Self::Types(_) => DiffKind::TypesDiffer,
            Self::Mapping(n) => n.kind(),
            Self::Sequence(n) => n.kind(),
            Self::Stream(n) => n.kind(),
            Self::MapMissing(_)
            | Self::MapExcess(_)
            | Self::SeqMissing(_)
            | Self::SeqExcess(_)
            | Self::StreamMissing(_)
            | Self::StreamExcess(_)
            | Self::ValueDiffers(_)
            | Self::ValueMissing(_)
            | Self::ValueExcess(_) => DiffKind::ContentDiffer,
            Self::Ignore => DiffKind::Identical,
        }
    }

    /// Returns the flat pre-rendered segments of this node.
    ///
    /// Joining the segments with newlines yields the same text as
    /// [`string_indent`](Self::string_indent) with an empty key, no prefix
    /// and the default style.
    #[must_use]
    pub fn strings(&self) -> Vec<String> {
        match self {
            Self::Scalar(n) => n.strings(),
            Self::Types(n) => n.strings(),
            Self::Mapping(n) => n.strings(),
            Self::Sequence(n) => n.strings(),
            Self::Stream(n) => n.strings(),
            Self::MapMissing(n) => vec![deleted_string(n.value())],
            Self::SeqMissing(n) => vec![deleted_string(n.value())],
            Self::StreamMissing(n) => vec![deleted_string(n.value())],
            Self::ValueMissing(n) => vec![deleted_string(n.value())],
            Self::MapExcess(n) => vec![inserted_string(n.value())],
            Self::SeqExcess(n) => vec![inserted_string(n.value())],
            Self::StreamExcess(n) => vec![inserted_string(n.value())],
            Self::ValueExcess(n) => vec![inserted_string(n.value())],
            Self::ValueDiffers(n) => n.strings(),
            Self::Ignore => Vec::new(),
        }
    }

    /// Renders this node as indented text.
    ///
    /// `key` is the rendered accessor of this node within its parent
    /// (empty at the root); `prefix` is the accumulated indentation.
    #[must_use]
    pub fn string_indent(&self, key: &str, prefix: &str, style: &OutputStyle) -> String {
        match self {
            Self::Scalar(n) => n.string_indent(key, prefix, style),
            Self::Types(n) => n.string_indent(key, prefix, style),
            Self::Mapping(n) => n.string_indent(key, prefix, style),
            Self::Sequence(n) => n.string_indent(key, prefix, style),
            Self::Stream(n) => n.string_indent(key, prefix, style),
            Self::MapMissing(n) => deleted_line(key, prefix, style, n.value()),
            Self::SeqMissing(n) => deleted_line(key, prefix, style, n.value()),
            Self::StreamMissing(n) => deleted_line(key, prefix, style, n.value()),
            Self::ValueMissing(n) => deleted_line(key, prefix, style, n.value()),
            Self::MapExcess(n) => inserted_line(key, prefix, style, n.value()),
            Self::SeqExcess(n) => inserted_line(key, prefix, style, n.value()),
            Self::StreamExcess(n) => inserted_line(key, prefix, style, n.value()),
            Self::ValueExcess(n) => inserted_line(key, prefix, style, n.value()),
            Self::ValueDiffers(n) => n.string_indent(key, prefix, style),
            Self::Ignore => String::new(),
        }
    }

    /// Returns the left-hand side value carried by this node.
    ///
    /// Fails with [`SideError::LhsNotSupported`] on variants that only carry
    /// the right-hand side (excesses) or no value at all (`Ignore`).
    pub fn lhs(&self) -> Result<Value, SideError> {
        match self {
            Self::Scalar(n) => Ok(n.lhs().clone()),
            Self::Types(n) => Ok(n.lhs().clone()),
            Self::Mapping(n) => Ok(n.lhs().clone()),
            Self::Sequence(n) => Ok(n.lhs().clone()),
            Self::Stream(n) => Ok(n.lhs_value()),
            Self::ValueDiffers(n) => Ok(n.lhs().clone()),
            Self::MapMissing(n) => Ok(n.value().clone()),
            Self::SeqMissing(n) => Ok(n.value().clone()),
            Self::StreamMissing(n) => Ok(n.value().clone()),
            Self::ValueMissing(n) => Ok(n.value().clone()),
            other => Err(SideError::LhsNotSupported { node: other.variant_name() }),
        }
    }

    /// Returns the right-hand side value carried by this node.
    ///
    /// Fails with [`SideError::RhsNotSupported`] on variants that only carry
    /// the left-hand side (missings) or no value at all (`Ignore`).
    pub fn rhs(&self) -> Result<Value, SideError> {
        match self {
            Self::Scalar(n) => Ok(n.rhs().clone()),
            Self::Types(n) => Ok(n.rhs().clone()),
            Self::Mapping(n) => Ok(n.rhs().clone()),
            Self::Sequence(n) => Ok(n.rhs().clone()),
            Self::Stream(n) => Ok(n.rhs_value()),
            Self::ValueDiffers(n) => Ok(n.rhs().clone()),
            Self::MapExcess(n) => Ok(n.value().clone()),
            Self::SeqExcess(n) => Ok(n.value().clone()),
            Self::StreamExcess(n) => Ok(n.value().clone()),
            Self::ValueExcess(n) => Ok(n.value().clone()),
            other => Err(SideError::RhsNotSupported { node: other.variant_name() }),
        }
    }

    /// Whether this node records a right-side-only element or key.
    #[must_use]
    pub fn is_excess(&self) -> bool {
        matches!(
            self,
            Self::MapExcess(_) | Self::SeqExcess(_) | Self::StreamExcess(_) | Self::ValueExcess(_)
        )
    }

    /// Whether this node records a left-side-only element or key.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(
            self,
            Self::MapMissing(_)
                | Self::SeqMissing(_)
                | Self::StreamMissing(_)
                | Self::ValueMissing(_)
        )
    }

    /// Whether this node compares two primitives.
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::Scalar(_))
    }

    /// Whether this node records a kind mismatch.
    #[must_use]
    pub fn is_types(&self) -> bool {
        matches!(self, Self::Types(_))
    }

    /// Whether this node is the ignore sentinel.
    #[must_use]
    pub fn is_ignore(&self) -> bool {
        matches!(self, Self::Ignore)
    }

    /// Whether this node compares two mappings.
    #[must_use]
    pub fn is_mapping(&self) -> bool {
        matches!(self, Self::Mapping(_))
    }

    /// Whether this node compares two sequences.
    #[must_use]
    pub fn is_sequence(&self) -> bool {
        matches!(self, Self::Sequence(_))
    }

    /// Whether this node compares two streams.
    #[must_use]
    pub fn is_stream(&self) -> bool {
        matches!(self, Self::Stream(_))
    }

    pub(crate) fn is_container(&self) -> bool {
        matches!(self, Self::Mapping(_) | Self::Sequence(_) | Self::Stream(_))
    }

    pub(crate) fn variant_name(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Types(_) => "types",
            Self::Mapping(_) => "mapping",
            Self::MapMissing(_) => "map-missing",
            Self::MapExcess(_) => "map-excess",
            Self::Sequence(_) => "sequence",
            Self::SeqMissing(_) => "sequence-missing",
            Self::SeqExcess(_) => "sequence-excess",
            Self::Stream(_) => "stream",
            Self::StreamMissing(_) => "stream-missing",
            Self::StreamExcess(_) => "stream-excess",
            Self::ValueDiffers(_) => "value-differs",
            Self::ValueMissing(_) => "value-missing",
            Self::ValueExcess(_) => "value-excess",
            Self::Ignore => "ignore",
        }
    }

    pub(crate) fn child_count(&self) -> usize {
        match self {
            Self::Mapping(n) => n.entries().len(),
            Self::Sequence(n) => n.children().len(),
            Self::Stream(n) => n.children().len(),
            _ => 0,
        }
    }

    pub(crate) fn child(&self, index: usize) -> &DiffNode {
        match self {
            Self::Mapping(n) => &n.entries()[index].1,
            Self::Sequence(n) => &n.children()[index],
            Self::Stream(n) => &n.children()[index],
            other => unreachable!("{} nodes have no children", other.variant_name()),
        }
    }

    pub(crate) fn child_mut(&mut self, index: usize) -> &mut DiffNode {
        match self {
            Self::Mapping(n) => n.child_mut(index),
            Self::Sequence(n) => n.child_mut(index),
            Self::Stream(n) => n.child_mut(index),
            other => unreachable!("{} nodes have no children", other.variant_name()),
        }
    }

    /// The rendered accessor leading to child `index`: `.key` for mappings,
    /// `[idx]` for sequences and streams, with `idx` taken from the original
    /// left-hand indices.
    pub(crate) fn child_path_segment(&self, index: usize) -> String {
        match self {
            Self::Mapping(n) => format!(".{}", path::escape_key(&n.entries()[index].0)),
            Self::Sequence(n) => format!("[{}]", n.original_indices()[index]),
            Self::Stream(n) => format!("[{}]", n.original_indices()[index]),
            other => unreachable!("{} nodes have no children", other.variant_name()),
        }
    }
}

/// Failure cause carried through the recursive descent, attached to the
/// partial tree at the API boundary.
#[derive(Debug)]
pub(crate) enum Fault {
    Cyclic,
    Stream(StreamError),
}

impl Fault {
    pub(crate) fn attach(self, partial: DiffNode) -> DiffError {
        match self {
            Self::Cyclic => DiffError::Cyclic { partial },
            Self::Stream(source) => DiffError::Stream { source, partial },
        }
    }
}

/// Compares two values with the default options.
///
/// ```
/// use jdiff_core::{diff, DiffKind, Value};
///
/// let lhs = Value::from_json_str("{\"a\": 42}")?;
/// let rhs = Value::from_json_str("{\"a\": 21}")?;
/// let d = diff(&lhs, &rhs)?;
/// assert_eq!(d.kind(), DiffKind::ContentDiffer);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn diff(lhs: &Value, rhs: &Value) -> Result<DiffNode, DiffError> {
    diff_with(lhs, rhs, &DiffOptions::default())
}

/// Compares two values.
///
/// On failure the error carries the best-effort partial tree: cyclic
/// references short-circuit the descent for the offending subtree only.
pub fn diff_with(
    lhs: &Value,
    rhs: &Value,
    options: &DiffOptions,
) -> Result<DiffNode, DiffError> {
    let mut visited = Visited::default();
    let (node, fault) = diff_value(lhs, rhs, &mut visited, options);
    match fault {
        None => Ok(node),
        Some(fault) => Err(fault.attach(node)),
    }
}

pub(crate) fn diff_value(
    lhs: &Value,
    rhs: &Value,
    visited: &mut Visited,
    options: &DiffOptions,
) -> (DiffNode, Option<Fault>) {
    match (lhs, rhs) {
        (Value::Sequence(_), Value::Sequence(_)) => {
            if visited.push(lhs, rhs).is_err() {
                tracing::debug!("cyclic reference detected while diffing sequences");
                visited.pop(lhs, rhs);
                return (types_node(lhs, rhs), Some(Fault::Cyclic));
            }
            let out = sequence::diff_sequences(lhs, rhs, visited, options);
            visited.pop(lhs, rhs);
            out
        }
        (Value::Mapping(_), Value::Mapping(_)) => {
            if visited.push(lhs, rhs).is_err() {
                tracing::debug!("cyclic reference detected while diffing mappings");
                visited.pop(lhs, rhs);
                return (types_node(lhs, rhs), Some(Fault::Cyclic));
            }
            let out = mapping::diff_mappings(lhs, rhs, visited, options);
            visited.pop(lhs, rhs);
            out
        }
        _ if lhs.is_scalar() && rhs.is_scalar() => {
            if matches!(lhs, Value::Null) != matches!(rhs, Value::Null) {
                (types_node(lhs, rhs), None)
            } else {
                (DiffNode::Scalar(Scalar::new(lhs.clone(), rhs.clone())), None)
            }
        }
        _ => (types_node(lhs, rhs), None),
    }
}

fn types_node(lhs: &Value, rhs: &Value) -> DiffNode {
    DiffNode::Types(Types::new(lhs.clone(), rhs.clone()))
}

pub(crate) fn deleted_string(v: &Value) -> String {
    format!("- {} {v}", v.type_name())
}

pub(crate) fn inserted_string(v: &Value) -> String {
    format!("+ {} {v}", v.type_name())
}

pub(crate) fn unchanged_string(v: &Value) -> String {
    format!("  {} {v}", v.type_name())
}

pub(crate) fn deleted_line(key: &str, prefix: &str, style: &OutputStyle, v: &Value) -> String {
    format!("-{prefix}{key}{}", style.red(v))
}

pub(crate) fn inserted_line(key: &str, prefix: &str, style: &OutputStyle, v: &Value) -> String {
    format!("+{prefix}{key}{}", style.green(v))
}

pub(crate) fn unchanged_line(key: &str, prefix: &str, style: &OutputStyle, v: &Value) -> String {
    format!(" {prefix}{key}{}", style.plain(v))
}

pub(crate) fn replaced_lines(
    key: &str,
    prefix: &str,
    style: &OutputStyle,
    lhs: &Value,
    rhs: &Value,
) -> String {
    format!(
        "{}{}{}",
        deleted_line(key, prefix, style, lhs),
        style.separator(),
        inserted_line(key, prefix, style, rhs),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json(s: &str) -> Value {
        Value::from_json_str(s).expect("test document should parse")
    }

    #[test]
    fn identical_scalars() {
        let d = diff(&json("42"), &json("42")).unwrap();
        assert_eq!(d.kind(), DiffKind::Identical);
        assert!(d.is_scalar());
    }

    #[test]
    fn differing_scalars() {
        let d = diff(&json("42"), &json("21")).unwrap();
        assert_eq!(d.kind(), DiffKind::ContentDiffer);
    }

    #[test]
    fn int_and_float_types_differ() {
        let d = diff(&json("8"), &json("9.0")).unwrap();
        assert_eq!(d.kind(), DiffKind::TypesDiffer);
    }

    #[test]
    fn both_null_is_identical() {
        let d = diff(&Value::Null, &Value::Null).unwrap();
        assert_eq!(d.kind(), DiffKind::Identical);
        assert!(d.is_scalar());
    }

    #[test]
    fn one_null_is_a_type_mismatch() {
        let d = diff(&Value::Null, &json("42")).unwrap();
        assert_eq!(d.kind(), DiffKind::TypesDiffer);
        assert!(d.is_types());
    }

    #[test]
    fn scalar_against_container_is_a_type_mismatch() {
        let d = diff(&json("42"), &json("[42]")).unwrap();
        assert_eq!(d.kind(), DiffKind::TypesDiffer);
        assert!(d.is_types());
    }

    #[test]
    fn side_accessors_report_unsupported_sides() {
        let d = diff(&json("[1]"), &json("[1, 2]")).unwrap();
        let DiffNode::Sequence(seq) = &d else { panic!("expected sequence") };
        let excess = &seq.children()[1];
        assert!(excess.is_excess());
        assert!(excess.rhs().is_ok());
        assert!(matches!(excess.lhs(), Err(SideError::LhsNotSupported { .. })));

        assert!(matches!(DiffNode::Ignore.lhs(), Err(SideError::LhsNotSupported { .. })));
        assert!(matches!(DiffNode::Ignore.rhs(), Err(SideError::RhsNotSupported { .. })));
    }

    #[test]
    fn ignore_reports_identical() {
        assert_eq!(DiffNode::Ignore.kind(), DiffKind::Identical);
        assert!(DiffNode::Ignore.strings().is_empty());
        assert_eq!(DiffNode::Ignore.string_indent("", "", &OutputStyle::default()), "");
    }

    #[test]
    fn cyclic_values_are_reported_not_followed() {
        use std::collections::BTreeMap;

        let m1 = Value::mapping(BTreeMap::new());
        let m2 = Value::mapping(BTreeMap::new());
        let Value::Mapping(inner1) = &m1 else { unreachable!() };
        let Value::Mapping(inner2) = &m2 else { unreachable!() };
        inner2.borrow_mut().insert(crate::Key::Int(0), m1.clone());
        inner1.borrow_mut().insert(crate::Key::Int(0), m2.clone());

        let err = diff(&m1, &m2).unwrap_err();
        assert!(matches!(err, DiffError::Cyclic { .. }));
        assert_eq!(err.partial().kind(), DiffKind::ContentDiffer);
    }

    #[test]
    fn strings_match_joined_indent_render() {
        let d = diff(&json("{\"a\": 1, \"b\": [1, 2]}"), &json("{\"a\": 2, \"b\": [1, 2]}"))
            .unwrap();
        let style = OutputStyle::default().with_show_types(true).with_indent("");
        let joined = d.strings().join("\n");
        let indented = d.string_indent("", "", &style);
        // Same line count and the same leading markers.
        assert_eq!(joined.lines().count(), indented.lines().count());
    }
}
