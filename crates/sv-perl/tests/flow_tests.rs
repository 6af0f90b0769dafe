use std::str::FromStr;

use sv_perl::{
    ConditionKind, Error, FileOptions, Kind, Print, RoutineOptions, Signal, SignalHandler,
    SourceTree, Value,
};

fn script() -> SourceTree {
    SourceTree::new(FileOptions::script("test"))
}

#[test]
fn condition_discriminants_round_trip() {
    for kind in [ConditionKind::If, ConditionKind::Elif, ConditionKind::Else] {
        assert_eq!(ConditionKind::from_str(kind.as_str()).expect("round trip"), kind);
    }
}

#[test]
fn unknown_condition_discriminants_fail_before_rendering() {
    let err = ConditionKind::from_str("unless").unwrap_err();
    assert!(matches!(err, Error::UnknownCondition(kind) if kind == "unless"));
}

#[test]
fn condition_expressions_are_sanitized() {
    let mut tree = script();
    let root = tree.root();
    let condition = tree.condition(ConditionKind::If, "$x == 1;\n");
    tree.add(condition, Print::line("\"ok\"")).expect("add print");
    tree.add(root, condition).expect("add condition");

    let rendered = tree.render().expect("render");
    assert!(rendered.contains("if ($x == 1) {"));
}

#[test]
fn condition_from_a_value_tests_unwrap_equals_true() {
    let mut tree = script();
    let root = tree.root();
    let flag = Value::boolean("flag", true);
    tree.add(root, flag.clone()).expect("add flag");
    let condition = tree.condition(ConditionKind::If, &flag);
    tree.add(condition, Print::line("\"on\"")).expect("add print");
    tree.add(root, condition).expect("add condition");

    let rendered = tree.render().expect("render");
    assert!(rendered.contains("if ($flag->valueOf() == 1) {"));
}

#[test]
fn elif_and_else_render_their_discriminant() {
    let mut tree = script();
    let root = tree.root();
    let branch = tree.condition(ConditionKind::Elif, "$y");
    tree.add(branch, Print::line("\"other\"")).expect("add print");
    tree.add(root, branch).expect("add branch");

    let rendered = tree.render().expect("render");
    assert!(rendered.contains("elif ($y) {"));
}

#[test]
fn while_rejects_non_container_values() {
    let mut tree = script();
    let text = Value::string("text", "nope");
    let err = tree.while_over(&text).unwrap_err();
    assert!(matches!(err, Error::UnsupportedIterable(kind) if kind == "string"));
}

#[test]
fn while_body_stays_live_after_attachment() {
    let mut tree = script();
    let root = tree.root();
    let numbers = Value::array("numbers", Kind::Integer, vec![1.into(), 2.into()]);
    tree.add(root, numbers.clone()).expect("add array");
    let while_loop = tree.while_over(&numbers).expect("while");
    tree.add(root, while_loop).expect("attach first");
    tree.add(while_loop.body(), Print::line("\"late\"")).expect("grow after attach");

    let rendered = tree.render().expect("render");
    assert!(rendered.contains("print(\"late\".\"\\n\");\n"));
}

#[test]
fn signals_round_trip_and_reject_unknown_names() {
    for signal in Signal::ALL {
        assert_eq!(Signal::from_str(signal.as_str()).expect("round trip"), signal);
    }
    let err = Signal::from_str("KILL").unwrap_err();
    assert!(matches!(err, Error::InvalidSignal(name) if name == "KILL"));
}

#[test]
fn signal_handlers_must_be_routines() {
    let mut tree = script();
    let not_a_routine = tree.condition(ConditionKind::If, "$x");
    let err = SignalHandler::new(&tree, Signal::Hup, not_a_routine).unwrap_err();
    assert!(matches!(err, Error::InvalidHandler));
}

#[test]
fn named_handlers_render_into_the_signal_table() {
    let mut tree = script();
    let root = tree.root();
    let cleanup = tree.routine(RoutineOptions::named("cleanup"));
    tree.add(cleanup, Print::line("\"bye\"")).expect("add print");
    let binding = SignalHandler::new(&tree, Signal::Die, cleanup).expect("binding");
    tree.add(root, binding).expect("add binding");

    let rendered = tree.render().expect("render");
    assert!(rendered.contains("$SIG{DIE} = sub cleanup {"));
}

#[test]
fn evaluation_catch_branch_is_fixed() {
    let mut tree = script();
    let root = tree.root();
    let eval = tree.evaluation().expect("evaluation");
    tree.add(eval, Print::line("\"try\"")).expect("add body");
    tree.add(root, eval).expect("add eval");

    let rendered = tree.render().expect("render");
    assert!(rendered.contains("eval {"));
    assert!(rendered.contains("if ($@) {\n  print($@.\"\\n\");\n};\n"));
}

#[test]
fn process_fragments_render() {
    assert_eq!(sv_perl::process::exit(0), "exit(0);\n");
    assert_eq!(sv_perl::process::argv(), "stdlib::array->new(@ARGV)");
}
