use std::cmp::Ordering;

use chrono::DateTime;

use super::visited::Visited;
use super::{diff_value, DiffNode, Fault};
use crate::{DiffKind, DiffOptions, Key, OutputStyle, SequenceStrategy, Value};

/// Comparison of two sequences, one child per aligned position.
#[derive(Clone, Debug, PartialEq)]
pub struct SequenceDiff {
    children: Vec<DiffNode>,
    indices: Vec<usize>,
    lhs: Value,
    rhs: Value,
}

impl SequenceDiff {
    /// The aligned children.
    #[must_use]
    pub fn children(&self) -> &[DiffNode] {
        &self.children
    }

    /// For each child, the left-hand index to report; for an excess, the
    /// position in the left-hand side where it would insert.
    #[must_use]
    pub fn original_indices(&self) -> &[usize] {
        &self.indices
    }

    /// The left-hand side sequence.
    #[must_use]
    pub fn lhs(&self) -> &Value {
        &self.lhs
    }

    /// The right-hand side sequence.
    #[must_use]
    pub fn rhs(&self) -> &Value {
        &self.rhs
    }

    pub(crate) fn empty() -> Self {
        Self {
            children: Vec::new(),
            indices: Vec::new(),
            lhs: Value::sequence(Vec::new()),
            rhs: Value::sequence(Vec::new()),
        }
    }

    pub(crate) fn kind(&self) -> DiffKind {
        if self.children.iter().any(|d| d.kind() != DiffKind::Identical) {
            DiffKind::ContentDiffer
        } else {
            DiffKind::Identical
        }
    }

    pub(crate) fn child_mut(&mut self, index: usize) -> &mut DiffNode {
        &mut self.children[index]
    }

    /// Extends the children with `Ignore` placeholders up to `len`.
    pub(crate) fn ensure_len(&mut self, len: usize) {
        while self.children.len() < len {
            self.indices.push(self.children.len());
            self.children.push(DiffNode::Ignore);
        }
    }

    pub(crate) fn take_child(&mut self, index: usize) -> DiffNode {
        std::mem::replace(&mut self.children[index], DiffNode::Ignore)
    }

    pub(crate) fn set_child(&mut self, index: usize, node: DiffNode) {
        self.children[index] = node;
    }

    pub(crate) fn strings(&self) -> Vec<String> {
        match self.kind() {
            DiffKind::Identical => vec![super::unchanged_string(&self.lhs)],
            _ => {
                let mut out = vec!["[".to_owned()];
                for child in &self.children {
                    out.extend(child.strings());
                }
                out.push("]".to_owned());
                out
            }
        }
    }

    pub(crate) fn string_indent(&self, key: &str, prefix: &str, style: &OutputStyle) -> String {
        match self.kind() {
            DiffKind::Identical => super::unchanged_line(key, prefix, style, &self.lhs),
            _ => {
                let open = if style.json {
                    format!(" {prefix}{key}[")
                } else {
                    format!(" {prefix}{key}{}[", style.type_prefix(&self.lhs))
                };
                let child_prefix = format!("{prefix}{}", style.indent);
                let children: Vec<String> = self
                    .children
                    .iter()
                    .map(|child| child.string_indent("", &child_prefix, style))
                    .filter(|s| !s.is_empty())
                    .collect();
                format!(
                    "{open}\n{}\n {prefix}]",
                    children.join(style.separator()),
                )
            }
        }
    }
}

/// An element present in the left-hand side only.
#[derive(Clone, Debug, PartialEq)]
pub struct SeqMissing {
    value: Value,
}

impl SeqMissing {
    pub(crate) fn new(value: Value) -> Self {
        Self { value }
    }

    /// The missing element.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// An element present in the right-hand side only.
#[derive(Clone, Debug, PartialEq)]
pub struct SeqExcess {
    value: Value,
}

impl SeqExcess {
    pub(crate) fn new(value: Value) -> Self {
        Self { value }
    }

    /// The excess element.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }
}

pub(super) fn diff_sequences(
    lhs: &Value,
    rhs: &Value,
    visited: &mut Visited,
    options: &DiffOptions,
) -> (DiffNode, Option<Fault>) {
    let (Value::Sequence(litems), Value::Sequence(ritems)) = (lhs, rhs) else {
        unreachable!("diff_sequences requires two sequences")
    };
    let mut left: Vec<Value> = litems.borrow().clone();
    let mut right: Vec<Value> = ritems.borrow().clone();

    if let Some(keys) = options.sort_keys() {
        sort_by_keys(&mut left, &mut right, keys);
    }

    match options.strategy() {
        SequenceStrategy::Positional => positional(lhs, rhs, &left, &right, visited, options),
        SequenceStrategy::Lcs => lcs_align(lhs, rhs, &left, &right, visited, options),
    }
}

fn positional(
    lhs: &Value,
    rhs: &Value,
    left: &[Value],
    right: &[Value],
    visited: &mut Visited,
    options: &DiffOptions,
) -> (DiffNode, Option<Fault>) {
    let count = left.len().max(right.len());
    let mut children = Vec::with_capacity(count);
    let mut indices = Vec::with_capacity(count);

    for i in 0..count {
        indices.push(i);
        match (left.get(i), right.get(i)) {
            (Some(lv), Some(rv)) => {
                let (child, fault) = diff_value(lv, rv, visited, options);
                children.push(child);
                if fault.is_some() {
                    return (sequence_node(children, indices, lhs, rhs), fault);
                }
            }
            (Some(lv), None) => {
                children.push(DiffNode::SeqMissing(SeqMissing::new(lv.clone())));
            }
            (None, Some(rv)) => {
                children.push(DiffNode::SeqExcess(SeqExcess::new(rv.clone())));
            }
            (None, None) => unreachable!("index below max of both lengths"),
        }
    }

    (sequence_node(children, indices, lhs, rhs), None)
}

fn lcs_align(
    lhs: &Value,
    rhs: &Value,
    left: &[Value],
    right: &[Value],
    visited: &mut Visited,
    options: &DiffOptions,
) -> (DiffNode, Option<Fault>) {
    let matches = lcs_matches(left, right);
    let mut children = Vec::new();
    let mut indices = Vec::new();
    let mut a = 0;
    let mut b = 0;

    for (ma, mb) in matches {
        while a < ma {
            indices.push(a);
            children.push(DiffNode::SeqMissing(SeqMissing::new(left[a].clone())));
            a += 1;
        }
        while b < mb {
            indices.push(a);
            children.push(DiffNode::SeqExcess(SeqExcess::new(right[b].clone())));
            b += 1;
        }
        let (child, fault) = diff_value(&left[a], &right[b], visited, options);
        indices.push(a);
        children.push(child);
        a += 1;
        b += 1;
        if fault.is_some() {
            return (sequence_node(children, indices, lhs, rhs), fault);
        }
    }
    while a < left.len() {
        indices.push(a);
        children.push(DiffNode::SeqMissing(SeqMissing::new(left[a].clone())));
        a += 1;
    }
    while b < right.len() {
        indices.push(a);
        children.push(DiffNode::SeqExcess(SeqExcess::new(right[b].clone())));
        b += 1;
    }

    (sequence_node(children, indices, lhs, rhs), None)
}

fn sequence_node(
    children: Vec<DiffNode>,
    indices: Vec<usize>,
    lhs: &Value,
    rhs: &Value,
) -> DiffNode {
    DiffNode::Sequence(SequenceDiff {
        children,
        indices,
        lhs: lhs.clone(),
        rhs: rhs.clone(),
    })
}

/// Matched index pairs of a longest common subsequence, in order.
///
/// Element equality is structural, which coincides with "a recursive diff
/// reports identical" for acyclic values.
fn lcs_matches(left: &[Value], right: &[Value]) -> Vec<(usize, usize)> {
    let n = left.len();
    let m = right.len();
    let mut table = vec![vec![0usize; m + 1]; n + 1];
    for (i, lv) in left.iter().enumerate() {
        for (j, rv) in right.iter().enumerate() {
            table[i + 1][j + 1] = if lv == rv {
                table[i][j] + 1
            } else {
                table[i][j + 1].max(table[i + 1][j])
            };
        }
    }

    let mut matches = Vec::with_capacity(table[n][m]);
    let mut i = n;
    let mut j = m;
    while i > 0 && j > 0 {
        if left[i - 1] == right[j - 1] {
            matches.push((i - 1, j - 1));
            i -= 1;
            j -= 1;
        } else if table[i - 1][j] >= table[i][j - 1] {
            i -= 1;
        } else {
            j -= 1;
        }
    }
    matches.reverse();
    matches
}

fn sort_by_keys(left: &mut [Value], right: &mut [Value], keys: &[String]) {
    let all_mappings =
        left.iter().chain(right.iter()).all(|v| matches!(v, Value::Mapping(_)));
    if !all_mappings {
        tracing::debug!("sort-by-keys skipped: not all elements are mappings");
        return;
    }
    left.sort_by(|a, b| compare_by_keys(a, b, keys));
    right.sort_by(|a, b| compare_by_keys(a, b, keys));
}

fn compare_by_keys(a: &Value, b: &Value, keys: &[String]) -> Ordering {
    for key in keys {
        let ordering = match (mapping_lookup(a, key), mapping_lookup(b, key)) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(av), Some(bv)) => generic_cmp(&av, &bv),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn mapping_lookup(v: &Value, key: &str) -> Option<Value> {
    let Value::Mapping(entries) = v else { return None };
    let entries = entries.borrow();
    if let Some(found) = entries.get(&Key::Str(key.to_owned())) {
        return Some(found.clone());
    }
    key.parse::<i64>().ok().and_then(|n| entries.get(&Key::Int(n)).cloned())
}

/// Generic cross-kind comparison used by the sort pre-pass: numeric order
/// for numbers, RFC-3339-then-lexicographic for strings, kind rank otherwise.
fn generic_cmp(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            x.as_f64().partial_cmp(&y.as_f64()).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => compare_strings(x, y),
        _ => kind_rank(a).cmp(&kind_rank(b)),
    }
}

fn compare_strings(x: &str, y: &str) -> Ordering {
    match (DateTime::parse_from_rfc3339(x), DateTime::parse_from_rfc3339(y)) {
        (Ok(dx), Ok(dy)) => dx.cmp(&dy),
        _ => x.cmp(y),
    }
}

fn kind_rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Sequence(_) => 4,
        Value::Mapping(_) => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{diff, diff_with};

    fn json(s: &str) -> Value {
        Value::from_json_str(s).expect("test document should parse")
    }

    #[test]
    fn positional_pairing_produces_max_len_children() {
        let d = diff(&json("[1,2,3]"), &json("[4,5]")).unwrap();
        let DiffNode::Sequence(seq) = &d else { panic!("expected sequence") };
        assert_eq!(seq.children().len(), 3);
        assert_eq!(seq.original_indices(), [0, 1, 2]);
        assert_eq!(seq.children()[0].kind(), DiffKind::ContentDiffer);
        assert_eq!(seq.children()[1].kind(), DiffKind::ContentDiffer);
        assert!(seq.children()[2].is_missing());
    }

    #[test]
    fn lcs_with_no_common_elements_lists_all_edits() {
        let options = DiffOptions::default().with_strategy(SequenceStrategy::Lcs);
        let d = diff_with(&json("[1,2,3]"), &json("[4,5]"), &options).unwrap();
        let DiffNode::Sequence(seq) = &d else { panic!("expected sequence") };
        let shapes: Vec<&str> = seq
            .children()
            .iter()
            .map(|c| if c.is_missing() { "-" } else { "+" })
            .collect();
        assert_eq!(shapes, ["-", "-", "-", "+", "+"]);
        assert_eq!(seq.original_indices(), [0, 1, 2, 3, 3]);
    }

    #[test]
    fn lcs_keeps_matched_elements_aligned() {
        let options = DiffOptions::default().with_strategy(SequenceStrategy::Lcs);
        let d = diff_with(&json("[1,2,3]"), &json("[1,3]"), &options).unwrap();
        let DiffNode::Sequence(seq) = &d else { panic!("expected sequence") };
        assert_eq!(seq.children().len(), 3);
        assert_eq!(seq.children()[0].kind(), DiffKind::Identical);
        assert!(seq.children()[1].is_missing());
        assert_eq!(seq.children()[2].kind(), DiffKind::Identical);
        assert_eq!(seq.original_indices(), [0, 1, 2]);
    }

    #[test]
    fn lcs_insertions_follow_their_anchor() {
        let options = DiffOptions::default().with_strategy(SequenceStrategy::Lcs);
        let d = diff_with(&json("[1,3]"), &json("[1,2,3]"), &options).unwrap();
        let DiffNode::Sequence(seq) = &d else { panic!("expected sequence") };
        assert_eq!(seq.children().len(), 3);
        assert!(seq.children()[1].is_excess());
        assert_eq!(seq.original_indices(), [0, 1, 1]);
    }

    #[test]
    fn sort_by_keys_realigns_mapping_elements() {
        let lhs = json("[{\"id\": 2, \"v\": \"b\"}, {\"id\": 1, \"v\": \"a\"}]");
        let rhs = json("[{\"id\": 1, \"v\": \"a\"}, {\"id\": 2, \"v\": \"b\"}]");
        let options = DiffOptions::default().with_sort_keys(["id"]).unwrap();
        let d = diff_with(&lhs, &rhs, &options).unwrap();
        assert_eq!(d.kind(), DiffKind::Identical);
    }

    #[test]
    fn sort_by_keys_skips_mixed_sequences() {
        let lhs = json("[{\"id\": 2}, 1]");
        let rhs = json("[1, {\"id\": 2}]");
        let options = DiffOptions::default().with_sort_keys(["id"]).unwrap();
        let d = diff_with(&lhs, &rhs, &options).unwrap();
        assert_eq!(d.kind(), DiffKind::ContentDiffer);
    }

    #[test]
    fn sort_by_keys_understands_timestamps() {
        // Offset-shifted timestamps order by instant, not by text.
        let lhs = json(
            "[{\"t\": \"2021-01-01T10:00:00+02:00\"}, {\"t\": \"2021-01-01T09:30:00+00:00\"}]",
        );
        let rhs = json(
            "[{\"t\": \"2021-01-01T10:00:00+02:00\"}, {\"t\": \"2021-01-01T09:30:00+00:00\"}]",
        );
        let options = DiffOptions::default().with_sort_keys(["t"]).unwrap();
        let d = diff_with(&lhs, &rhs, &options).unwrap();
        assert_eq!(d.kind(), DiffKind::Identical);
    }

    #[test]
    fn generic_cmp_orders_across_kinds() {
        assert_eq!(generic_cmp(&Value::Null, &json("true")), Ordering::Less);
        assert_eq!(generic_cmp(&json("2"), &json("10")), Ordering::Less);
        assert_eq!(generic_cmp(&json("\"b\""), &json("\"a\"")), Ordering::Greater);
        assert_eq!(
            generic_cmp(
                &json("\"2021-01-01T10:00:00+02:00\""),
                &json("\"2021-01-01T09:30:00+00:00\""),
            ),
            Ordering::Less,
        );
    }
}
