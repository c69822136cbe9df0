use std::convert::Infallible;

use jdiff_core::{
    diff, diff_with, report, walk, Builder, DiffKind, DiffNode, DiffOptions, OutputStyle,
    SequenceStrategy, Value,
};

fn json(s: &str) -> Value {
    Value::from_json_str(s).expect("test document should parse")
}

#[test]
fn kinds_for_representative_pairs() {
    for (lhs, rhs, expected) in [
        ("42", "42", DiffKind::Identical),
        ("42", "21", DiffKind::ContentDiffer),
        ("8", "9.0", DiffKind::TypesDiffer),
        ("\"abc\"", "\"abc\"", DiffKind::Identical),
        ("null", "null", DiffKind::Identical),
        ("null", "0", DiffKind::TypesDiffer),
        ("[1, 2]", "[1, 2]", DiffKind::Identical),
        ("[1, 2]", "[1, 3]", DiffKind::ContentDiffer),
        ("[1, 2]", "{\"a\": 1}", DiffKind::TypesDiffer),
        ("{\"a\": [1]}", "{\"a\": [1]}", DiffKind::Identical),
        ("{\"a\": [1]}", "{\"a\": [2]}", DiffKind::ContentDiffer),
        ("{}", "{}", DiffKind::Identical),
        ("[]", "[]", DiffKind::Identical),
    ] {
        let d = diff(&json(lhs), &json(rhs)).expect("diff succeeds");
        assert_eq!(d.kind(), expected, "{lhs} vs {rhs}");
    }
}

#[test]
fn mapping_replace_report_with_types() {
    let lhs = json("{\"a\": 42, \"b\": [1, 2], \"c\": \"abc\"}");
    let rhs = json("{\"a\": 21, \"b\": [1, 2, 3], \"c\": \"abc\"}");
    let d = diff(&lhs, &rhs).expect("diff succeeds");
    let lines = report(&d, &OutputStyle::default().with_show_types(true));
    assert_eq!(lines.join("\n"), "- .a: int 42\n+ .a: int 21\n+ .b[2]: int 3");
}

#[test]
fn numeric_kind_mismatch_is_reported_once() {
    let d = diff(&json("{\"type\": 8}"), &json("{\"type\": 9.0}")).expect("diff succeeds");
    let lines = report(&d, &OutputStyle::default().with_show_types(true));
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("type"));
    assert!(lines[0].contains("int 8"));
    assert!(lines[0].contains("float 9"));

    let DiffNode::Mapping(m) = &d else { panic!("expected mapping") };
    assert_eq!(m.entries()[0].1.kind(), DiffKind::TypesDiffer);
}

#[test]
fn positional_and_lcs_strategies_shape_the_same_inputs_differently() {
    let lhs = json("[1, 2, 3]");
    let rhs = json("[4, 5]");

    let d = diff(&lhs, &rhs).expect("diff succeeds");
    let DiffNode::Sequence(seq) = &d else { panic!("expected sequence") };
    assert_eq!(seq.children().len(), 3);
    assert!(seq.children()[2].is_missing());

    let options = DiffOptions::default().with_strategy(SequenceStrategy::Lcs);
    let d = diff_with(&lhs, &rhs, &options).expect("diff succeeds");
    let DiffNode::Sequence(seq) = &d else { panic!("expected sequence") };
    assert_eq!(seq.children().len(), 5);
    assert!(seq.children()[..3].iter().all(DiffNode::is_missing));
    assert!(seq.children()[3..].iter().all(DiffNode::is_excess));
}

#[test]
fn ignoring_every_excess_leaves_one_difference() {
    let lhs = json("{\"a\": 42, \"b\": [1, 2], \"keep\": \"x\"}");
    let rhs = json("{\"a\": 41, \"b\": [1, 2], \"keep\": \"x\", \"extra\": \"y\"}");
    let d = diff(&lhs, &rhs).expect("diff succeeds");

    let pruned = walk(d, |_, node, _| {
        if node.is_excess() {
            Ok::<_, Infallible>(Some(DiffNode::Ignore))
        } else {
            Ok(None)
        }
    })
    .expect("infallible");

    let mut differing = Vec::new();
    let _ = walk(pruned, |_, node, path| {
        if !node.is_mapping() && !node.is_sequence() && node.kind() != DiffKind::Identical {
            differing.push(path.to_owned());
        }
        Ok::<_, Infallible>(None)
    })
    .expect("infallible");
    assert_eq!(differing, [".a"]);
}

#[test]
fn builder_output_reports_like_engine_output() {
    let built = Builder::new()
        .delete(".a", json("42"))
        .add(".a", json("21"))
        .add(".b[2]", json("3"))
        .build()
        .expect("build succeeds");

    let lhs = json("{\"a\": 42, \"b\": [1, 2]}");
    let rhs = json("{\"a\": 21, \"b\": [1, 2, 3]}");
    let engine = diff(&lhs, &rhs).expect("diff succeeds");

    let style = OutputStyle::default();
    assert_eq!(report(&built, &style), report(&engine, &style));
}

#[test]
fn partial_tree_survives_a_cyclic_failure() {
    use std::collections::BTreeMap;

    let m1 = Value::mapping(BTreeMap::new());
    let m2 = Value::mapping(BTreeMap::new());
    let Value::Mapping(inner1) = &m1 else { unreachable!() };
    let Value::Mapping(inner2) = &m2 else { unreachable!() };
    inner2.borrow_mut().insert(jdiff_core::Key::Int(0), m1.clone());
    inner1.borrow_mut().insert(jdiff_core::Key::Int(0), m2.clone());

    let err = diff(&m1, &m2).expect_err("cycle should be detected");
    assert!(matches!(err, jdiff_core::DiffError::Cyclic { .. }));
    assert_eq!(err.partial().kind(), DiffKind::ContentDiffer);
}

#[test]
fn yaml_and_json_documents_diff_together() {
    let lhs = Value::from_yaml_str("a: 1\nb:\n  - x\n").expect("yaml parses");
    let rhs = json("{\"a\": 1, \"b\": [\"x\"]}");
    let d = diff(&lhs, &rhs).expect("diff succeeds");
    assert_eq!(d.kind(), DiffKind::Identical);
}
