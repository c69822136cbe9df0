use std::collections::BTreeMap;

use super::visited::Visited;
use super::{diff_value, unchanged_string, DiffNode, Fault};
use crate::{path, DiffKind, DiffOptions, Key, OutputStyle, Value};

/// Comparison of two mappings, keyed by the union of both key sets.
///
/// Entries are kept sorted by their rendered key, so rendering, walking and
/// reporting all share one deterministic order.
#[derive(Clone, Debug, PartialEq)]
pub struct MappingDiff {
    entries: Vec<(Key, DiffNode)>,
    lhs: Value,
    rhs: Value,
    keys_differ: bool,
}

impl MappingDiff {
    /// The compared entries, ordered by rendered key.
    #[must_use]
    pub fn entries(&self) -> &[(Key, DiffNode)] {
        &self.entries
    }

    /// The left-hand side mapping.
    #[must_use]
    pub fn lhs(&self) -> &Value {
        &self.lhs
    }

    /// The right-hand side mapping.
    #[must_use]
    pub fn rhs(&self) -> &Value {
        &self.rhs
    }

    pub(crate) fn empty() -> Self {
        Self {
            entries: Vec::new(),
            lhs: Value::mapping(BTreeMap::new()),
            rhs: Value::mapping(BTreeMap::new()),
            keys_differ: false,
        }
    }

    pub(crate) fn kind(&self) -> DiffKind {
        if self.keys_differ {
            return DiffKind::TypesDiffer;
        }
        if self.entries.iter().any(|(_, d)| d.kind() != DiffKind::Identical) {
            DiffKind::ContentDiffer
        } else {
            DiffKind::Identical
        }
    }

    pub(crate) fn child_mut(&mut self, index: usize) -> &mut DiffNode {
        &mut self.entries[index].1
    }

    pub(crate) fn remove_entry(&mut self, key: &Key) -> Option<DiffNode> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub(crate) fn insert_entry(&mut self, key: Key, node: DiffNode) {
        let rendered = path::escape_key(&key);
        let index = self
            .entries
            .partition_point(|(k, _)| path::escape_key(k) <= rendered);
        self.entries.insert(index, (key, node));
    }

    pub(crate) fn strings(&self) -> Vec<String> {
        match self.kind() {
            DiffKind::Identical => vec![unchanged_string(&self.lhs)],
            DiffKind::TypesDiffer => {
                vec![super::deleted_string(&self.lhs), super::inserted_string(&self.rhs)]
            }
            _ => {
                let mut out = vec!["{".to_owned()];
                for (key, child) in &self.entries {
                    for line in child.strings() {
                        out.push(format!("{key}: {line}"));
                    }
                }
                out.push("}".to_owned());
                out
            }
        }
    }

    pub(crate) fn string_indent(&self, key: &str, prefix: &str, style: &OutputStyle) -> String {
        match self.kind() {
            DiffKind::Identical => super::unchanged_line(key, prefix, style, &self.lhs),
            DiffKind::TypesDiffer => {
                super::replaced_lines(key, prefix, style, &self.lhs, &self.rhs)
            }
            _ => {
                let open = if style.json {
                    format!(" {prefix}{key}{{")
                } else {
                    format!(" {prefix}{key}{}map[", style.type_prefix(&self.lhs))
                };
                let close = if style.json {
                    format!(" {prefix}}}")
                } else {
                    format!(" {prefix}]")
                };
                let child_prefix = format!("{prefix}{}", style.indent);
                let children: Vec<String> = self
                    .entries
                    .iter()
                    .map(|(k, child)| {
                        child.string_indent(
                            &format!("{}: ", path::escape_key(k)),
                            &child_prefix,
                            style,
                        )
                    })
                    .filter(|s| !s.is_empty())
                    .collect();
                format!("{open}\n{}\n{close}", children.join(style.separator()))
            }
        }
    }
}

/// A key present in the left-hand side only.
#[derive(Clone, Debug, PartialEq)]
pub struct MapMissing {
    value: Value,
}

impl MapMissing {
    pub(crate) fn new(value: Value) -> Self {
        Self { value }
    }

    /// The value recorded under the missing key.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// A key present in the right-hand side only.
#[derive(Clone, Debug, PartialEq)]
pub struct MapExcess {
    value: Value,
}

impl MapExcess {
    pub(crate) fn new(value: Value) -> Self {
        Self { value }
    }

    /// The value recorded under the excess key.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }
}

pub(super) fn diff_mappings(
    lhs: &Value,
    rhs: &Value,
    visited: &mut Visited,
    options: &DiffOptions,
) -> (DiffNode, Option<Fault>) {
    let (Value::Mapping(lmap), Value::Mapping(rmap)) = (lhs, rhs) else {
        unreachable!("diff_mappings requires two mappings")
    };
    let lmap = lmap.borrow();
    let rmap = rmap.borrow();

    if let (Some(lk), Some(rk)) = (uniform_key_kind(&lmap), uniform_key_kind(&rmap)) {
        if lk != rk {
            let node = DiffNode::Mapping(MappingDiff {
                entries: Vec::new(),
                lhs: lhs.clone(),
                rhs: rhs.clone(),
                keys_differ: true,
            });
            return (node, None);
        }
    }

    let mut keys: Vec<Key> = lmap.keys().cloned().collect();
    keys.extend(rmap.keys().filter(|k| !lmap.contains_key(k)).cloned());
    keys.sort_by_cached_key(path::escape_key);

    let mut entries = Vec::with_capacity(keys.len());
    for key in keys {
        match (lmap.get(&key), rmap.get(&key)) {
            (Some(lv), Some(rv)) => {
                let (child, fault) = diff_value(lv, rv, visited, options);
                entries.push((key, child));
                if fault.is_some() {
                    let node = DiffNode::Mapping(MappingDiff {
                        entries,
                        lhs: lhs.clone(),
                        rhs: rhs.clone(),
                        keys_differ: false,
                    });
                    return (node, fault);
                }
            }
            (Some(lv), None) => {
                entries.push((key, DiffNode::MapMissing(MapMissing::new(lv.clone()))));
            }
            (None, Some(rv)) => {
                entries.push((key, DiffNode::MapExcess(MapExcess::new(rv.clone()))));
            }
            (None, None) => unreachable!("key came from the union of both mappings"),
        }
    }

    let node = DiffNode::Mapping(MappingDiff {
        entries,
        lhs: lhs.clone(),
        rhs: rhs.clone(),
        keys_differ: false,
    });
    (node, None)
}

fn uniform_key_kind(map: &BTreeMap<Key, Value>) -> Option<&'static str> {
    let mut kinds = map.keys().map(Key::type_name);
    let first = kinds.next()?;
    kinds.all(|k| k == first).then_some(first)
}
