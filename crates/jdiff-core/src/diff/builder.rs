use super::{replaced_lines, MappingDiff, SequenceDiff};
use super::{deleted_string, inserted_string, DiffNode};
use crate::path::{Path, PathPart};
use crate::{BuildError, Key, OutputStyle, Value};

/// Constructs a synthetic diff tree from a sequence of recorded additions
/// and deletions.
///
/// The first error sticks: later calls become no-ops and `build` reports it.
///
/// ```
/// use jdiff_core::{Builder, DiffKind, Value};
///
/// let d = Builder::new()
///     .delete(".a", Value::from_json_str("42")?)
///     .add(".a", Value::from_json_str("41")?)
///     .add(".b[1]", Value::from_json_str("true")?)
///     .build()?;
/// assert_eq!(d.kind(), DiffKind::ContentDiffer);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Default)]
pub struct Builder {
    root: Option<DiffNode>,
    err: Option<BuildError>,
}

impl Builder {
    /// Creates a builder with nothing recorded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `value` as inserted at `path`.
    ///
    /// Adding over a previously deleted position upgrades the record to a
    /// replacement; adding over any other record is an error.
    #[must_use]
    pub fn add(mut self, path: &str, value: Value) -> Self {
        if self.err.is_some() {
            return self;
        }
        match Path::parse(path) {
            Err(err) => self.err = Some(err.into()),
            Ok(parsed) => {
                match add_at(self.root.take(), parsed.parts(), value, path) {
                    Ok(node) => self.root = Some(node),
                    Err(err) => self.err = Some(err),
                }
            }
        }
        self
    }

    /// Records `value` as deleted at `path`.
    #[must_use]
    pub fn delete(mut self, path: &str, value: Value) -> Self {
        if self.err.is_some() {
            return self;
        }
        match Path::parse(path) {
            Err(err) => self.err = Some(err.into()),
            Ok(parsed) => {
                match delete_at(self.root.take(), parsed.parts(), value, path) {
                    Ok(node) => self.root = Some(node),
                    Err(err) => self.err = Some(err),
                }
            }
        }
        self
    }

    /// Returns the recorded tree, or `Ignore` if nothing was recorded.
    pub fn build(self) -> Result<DiffNode, BuildError> {
        if let Some(err) = self.err {
            return Err(err);
        }
        Ok(self.root.unwrap_or(DiffNode::Ignore))
    }
}

fn add_at(
    slot: Option<DiffNode>,
    parts: &[PathPart],
    value: Value,
    full_path: &str,
) -> Result<DiffNode, BuildError> {
    let Some((first, rest)) = parts.split_first() else {
        return match slot {
            None => Ok(DiffNode::ValueExcess(ValueExcess { value })),
            Some(DiffNode::ValueMissing(missing)) => {
                Ok(DiffNode::ValueDiffers(ValueDiffers { lhs: missing.value, rhs: value }))
            }
            Some(occupied) => Err(BuildError::AddOccupied {
                path: full_path.to_owned(),
                node: occupied.variant_name(),
            }),
        };
    };
    let node = slot.unwrap_or_else(|| empty_container(first));
    descend(node, first, rest, value, full_path, Operation::Add)
}

fn delete_at(
    slot: Option<DiffNode>,
    parts: &[PathPart],
    value: Value,
    full_path: &str,
) -> Result<DiffNode, BuildError> {
    let Some((first, rest)) = parts.split_first() else {
        return match slot {
            None => Ok(DiffNode::ValueMissing(ValueMissing { value })),
            Some(occupied) => Err(BuildError::DeleteOccupied {
                path: full_path.to_owned(),
                node: occupied.variant_name(),
            }),
        };
    };
    let node = slot.unwrap_or_else(|| empty_container(first));
    descend(node, first, rest, value, full_path, Operation::Delete)
}

#[derive(Clone, Copy)]
enum Operation {
    Add,
    Delete,
}

fn descend(
    node: DiffNode,
    first: &PathPart,
    rest: &[PathPart],
    value: Value,
    full_path: &str,
    operation: Operation,
) -> Result<DiffNode, BuildError> {
    match (node, first) {
        (DiffNode::Mapping(mut mapping), PathPart::Key(key)) => {
            let key = Key::Str(key.clone());
            let child_slot =
                mapping.remove_entry(&key).filter(|child| !child.is_ignore());
            let child = apply(child_slot, rest, value, full_path, operation)?;
            mapping.insert_entry(key, child);
            Ok(DiffNode::Mapping(mapping))
        }
        (DiffNode::Sequence(mut sequence), PathPart::Index(index)) => {
            sequence.ensure_len(index + 1);
            let existing = sequence.take_child(*index);
            let child_slot = (!existing.is_ignore()).then_some(existing);
            let child = apply(child_slot, rest, value, full_path, operation)?;
            sequence.set_child(*index, child);
            Ok(DiffNode::Sequence(sequence))
        }
        (other, _) => {
            Err(BuildError::Descend { path: full_path.to_owned(), node: other.variant_name() })
        }
    }
}

fn apply(
    slot: Option<DiffNode>,
    parts: &[PathPart],
    value: Value,
    full_path: &str,
    operation: Operation,
) -> Result<DiffNode, BuildError> {
    match operation {
        Operation::Add => add_at(slot, parts, value, full_path),
        Operation::Delete => delete_at(slot, parts, value, full_path),
    }
}

fn empty_container(part: &PathPart) -> DiffNode {
    match part {
        PathPart::Key(_) => DiffNode::Mapping(MappingDiff::empty()),
        PathPart::Index(_) => DiffNode::Sequence(SequenceDiff::empty()),
    }
}

/// A recorded replacement: a deletion later upgraded by an addition.
#[derive(Clone, Debug, PartialEq)]
pub struct ValueDiffers {
    lhs: Value,
    rhs: Value,
}

impl ValueDiffers {
    /// The deleted value.
    #[must_use]
    pub fn lhs(&self) -> &Value {
        &self.lhs
    }

    /// The added value.
    #[must_use]
    pub fn rhs(&self) -> &Value {
        &self.rhs
    }

    pub(crate) fn strings(&self) -> Vec<String> {
        vec![deleted_string(&self.lhs), inserted_string(&self.rhs)]
    }

    pub(crate) fn string_indent(&self, key: &str, prefix: &str, style: &OutputStyle) -> String {
        replaced_lines(key, prefix, style, &self.lhs, &self.rhs)
    }
}

/// A recorded deletion.
#[derive(Clone, Debug, PartialEq)]
pub struct ValueMissing {
    value: Value,
}

impl ValueMissing {
    /// The deleted value.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// A recorded insertion.
#[derive(Clone, Debug, PartialEq)]
pub struct ValueExcess {
    value: Value,
}

impl ValueExcess {
    /// The inserted value.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{report, DiffKind};

    fn json(s: &str) -> Value {
        Value::from_json_str(s).expect("test document should parse")
    }

    #[test]
    fn empty_builder_yields_ignore() {
        let d = Builder::new().build().unwrap();
        assert!(d.is_ignore());
        assert_eq!(d.kind(), DiffKind::Identical);
    }

    #[test]
    fn add_at_root_records_an_excess() {
        let d = Builder::new().add("", json("42")).build().unwrap();
        assert_eq!(d, DiffNode::ValueExcess(ValueExcess { value: json("42") }));
        assert_eq!(d.rhs().unwrap(), json("42"));
    }

    #[test]
    fn delete_then_add_upgrades_to_a_replacement() {
        let d = Builder::new()
            .delete(".a", json("42"))
            .add(".a", json("41"))
            .build()
            .unwrap();
        let lines = report(&d, &OutputStyle::default());
        assert_eq!(lines, ["- .a: 42\n+ .a: 41"]);
    }

    #[test]
    fn paths_create_intermediate_containers() {
        let d = Builder::new().add(".a[1].b", json("true")).build().unwrap();
        let DiffNode::Mapping(m) = &d else { panic!("expected mapping root") };
        let DiffNode::Sequence(seq) = &m.entries()[0].1 else { panic!("expected sequence") };
        assert!(seq.children()[0].is_ignore());
        let DiffNode::Mapping(inner) = &seq.children()[1] else { panic!("expected mapping") };
        assert!(inner.entries()[0].1.is_excess());
        assert_eq!(d.kind(), DiffKind::ContentDiffer);
    }

    #[test]
    fn sequences_extend_with_ignore_placeholders() {
        let d = Builder::new().add("[2]", json("9")).build().unwrap();
        let DiffNode::Sequence(seq) = &d else { panic!("expected sequence") };
        assert_eq!(seq.children().len(), 3);
        assert!(seq.children()[0].is_ignore());
        assert!(seq.children()[1].is_ignore());
        assert!(seq.children()[2].is_excess());
        assert_eq!(seq.original_indices(), [0, 1, 2]);
    }

    #[test]
    fn re_adding_a_position_is_an_error() {
        let err = Builder::new()
            .add(".a", json("1"))
            .add(".a", json("2"))
            .build()
            .unwrap_err();
        assert!(matches!(err, BuildError::AddOccupied { .. }));
    }

    #[test]
    fn re_deleting_a_position_is_an_error() {
        let err = Builder::new()
            .delete(".a", json("1"))
            .delete(".a", json("2"))
            .build()
            .unwrap_err();
        assert!(matches!(err, BuildError::DeleteOccupied { .. }));
    }

    #[test]
    fn descending_through_a_leaf_is_an_error() {
        let err = Builder::new()
            .add(".a", json("1"))
            .add(".a.b", json("2"))
            .build()
            .unwrap_err();
        assert!(matches!(err, BuildError::Descend { .. }));
    }

    #[test]
    fn invalid_paths_stick_as_the_first_error() {
        let err = Builder::new()
            .add(".a[", json("1"))
            .add(".b", json("2"))
            .build()
            .unwrap_err();
        assert!(matches!(err, BuildError::Path(_)));
    }

    #[test]
    fn mixed_records_render_like_engine_output() {
        let d = Builder::new()
            .delete(".gone", json("1"))
            .add(".fresh", json("2"))
            .build()
            .unwrap();
        let lines = report(&d, &OutputStyle::default());
        assert_eq!(lines, ["+ .fresh: 2", "- .gone: 1"]);
    }
}
