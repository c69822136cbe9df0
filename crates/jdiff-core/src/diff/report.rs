use super::DiffNode;
use crate::{DiffKind, OutputStyle};

/// Flattens a diff tree into one report entry per differing leaf.
///
/// Container nodes are not reported themselves; their differing leaves are,
/// each formatted as `<±> <path>: <value>`. A replaced leaf contributes a
/// `-` and a `+` line in a single entry. The style is projected through
/// [`OutputStyle::for_report`], so JSON container shapes never apply here.
///
/// ```
/// use jdiff_core::{diff, report, OutputStyle, Value};
///
/// let lhs = Value::from_json_str("{\"a\": 42, \"b\": [1, 2], \"c\": \"abc\"}")?;
/// let rhs = Value::from_json_str("{\"a\": 21, \"b\": [1, 2, 3], \"c\": \"abc\"}")?;
/// let d = diff(&lhs, &rhs)?;
/// let lines = report(&d, &OutputStyle::default().with_show_types(true));
/// assert_eq!(lines, ["- .a: int 42\n+ .a: int 21", "+ .b[2]: int 3"]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[must_use]
pub fn report(diff: &DiffNode, style: &OutputStyle) -> Vec<String> {
    let style = style.for_report();
    let mut lines = Vec::new();
    collect(diff, "", &style, &mut lines);
    lines
}

fn collect(node: &DiffNode, path: &str, style: &OutputStyle, lines: &mut Vec<String>) {
    match node.kind() {
        DiffKind::Identical => {}
        DiffKind::TypesDiffer => {
            lines.push(node.string_indent(&format!(" {path}: "), "", style));
        }
        DiffKind::ContentDiffer | DiffKind::Invalid => {
            if node.is_container() {
                for index in 0..node.child_count() {
                    let child_path = format!("{path}{}", node.child_path_segment(index));
                    collect(node.child(index), &child_path, style, lines);
                }
            } else {
                lines.push(node.string_indent(&format!(" {path}: "), "", style));
            }
        }
    }
}
