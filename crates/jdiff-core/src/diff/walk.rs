use super::DiffNode;

/// Walks a diff tree depth-first in pre-order, transforming it in place.
///
/// The callback receives the parent (absent at the root), the current node
/// and the rendered path from the root (empty at the root). Returning
/// `Ok(Some(node))` substitutes the current node and continues into the
/// substitute's children; `Ok(None)` keeps the node; an `Err` aborts the
/// whole walk. The (possibly replaced) root is handed back to the caller.
///
/// ```
/// use jdiff_core::{diff, walk, DiffKind, DiffNode, Value};
///
/// let lhs = Value::from_json_str("{\"a\": 42, \"b\": [1, 2]}")?;
/// let rhs = Value::from_json_str("{\"a\": 42, \"b\": [1, 2], \"extra\": \"y\"}")?;
/// let d = diff(&lhs, &rhs)?;
/// assert_eq!(d.kind(), DiffKind::ContentDiffer);
///
/// let pruned = walk(d, |_, node, _| {
///     if node.is_excess() {
///         Ok::<_, std::convert::Infallible>(Some(DiffNode::Ignore))
///     } else {
///         Ok(None)
///     }
/// })?;
/// assert_eq!(pruned.kind(), DiffKind::Identical);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn walk<F, E>(diff: DiffNode, mut f: F) -> Result<DiffNode, E>
where
    F: FnMut(Option<&DiffNode>, &DiffNode, &str) -> Result<Option<DiffNode>, E>,
{
    let mut root = diff;
    if let Some(replacement) = f(None, &root, "")? {
        root = replacement;
    }
    walk_children(&mut root, "", &mut f)?;
    Ok(root)
}

fn walk_children<F, E>(node: &mut DiffNode, path: &str, f: &mut F) -> Result<(), E>
where
    F: FnMut(Option<&DiffNode>, &DiffNode, &str) -> Result<Option<DiffNode>, E>,
{
    for index in 0..node.child_count() {
        let child_path = format!("{path}{}", node.child_path_segment(index));
        if let Some(replacement) = f(Some(node), node.child(index), &child_path)? {
            *node.child_mut(index) = replacement;
        }
        walk_children(node.child_mut(index), &child_path, f)?;
    }
    Ok(())
}
