use pretty_assertions::assert_eq;

use crate::ast::{
    ConditionKind, Dependency, Name, Print, ReturnStatement, RoutineOptions, Signal, SignalHandler,
    Value,
};
use crate::registry::Kind;
use crate::tree::{FileOptions, SourceTree};

fn script() -> SourceTree {
    SourceTree::new(FileOptions::script("test"))
}

#[test]
fn renders_default_header() {
    let tree = script();
    let rendered = tree.render().expect("render");

    assert!(rendered.starts_with("use strict;\n"));
    assert!(rendered.contains("use warnings;\n"));
    assert!(rendered.contains("use stdlib::util;\n"));
    assert!(rendered.contains("use stdlib::string;\n"));
    assert!(rendered.contains("use stdlib::hashmap;\n"));
}

#[test]
fn hoists_late_dependencies_to_the_front() {
    let mut tree = script();
    let root = tree.root();
    tree.add(root, Value::string("greeting", "hello"))
        .expect("add value");
    tree.add(root, Dependency::bare("POSIX")).expect("add dependency");

    let rendered = tree.render().expect("render");
    assert!(rendered.starts_with("use POSIX;\n"));
    assert!(rendered.contains("my $greeting = stdlib::string->new(\"hello\");\n"));
}

#[test]
fn renders_condition_block() {
    let mut tree = script();
    let root = tree.root();
    let condition = tree.condition(ConditionKind::If, "$x == 1");
    tree.add(condition, Print::line("\"yes\"")).expect("add print");
    tree.add(root, condition).expect("add condition");

    let rendered = tree.render().expect("render");
    assert!(rendered.contains("if ($x == 1) {\n  print(\"yes\".\"\\n\");\n};\n"));
}

#[test]
fn renders_routine_with_bulk_destructure() {
    let mut tree = script();
    let root = tree.root();
    let routine = tree.routine(RoutineOptions::named("greet").with_params(["who"]));
    tree.add(routine, ReturnStatement::single("\"hi \".$who"))
        .expect("add return");
    tree.add(root, routine).expect("add routine");

    let rendered = tree.render().expect("render");
    assert!(rendered.contains("sub greet {\n  my ($who) = @_;\n  return \"hi \".$who;\n};\n"));
}

#[test]
fn renders_shift_bindings() {
    let mut tree = script();
    let routine = tree.routine(
        RoutineOptions::named("pair")
            .with_params(["left", "right"])
            .shifting(true),
    );
    tree.add(routine, ReturnStatement::single("$left"))
        .expect("add return");
    let root = tree.root();
    tree.add(root, routine).expect("add routine");

    let rendered = tree.render().expect("render");
    assert!(rendered.contains("my $left = shift;\n"));
    assert!(rendered.contains("my $right = shift;\n"));
}

#[test]
fn renders_anonymous_routine_keyword() {
    let mut tree = script();
    let routine = tree.routine(RoutineOptions::anonymous());
    tree.add(routine, ReturnStatement::single("1")).expect("add return");
    let root = tree.root();
    tree.add(root, routine).expect("add routine");

    let rendered = tree.render().expect("render");
    assert!(rendered.contains("sub {\n  return 1;\n};\n"));
}

#[test]
fn renders_while_over_array() {
    let mut tree = script();
    let root = tree.root();
    let numbers = Value::array("numbers", Kind::Integer, vec![1.into(), 10.into(), 15.into()]);
    tree.add(root, numbers.clone()).expect("add array");
    let while_loop = tree.while_over(&numbers).expect("while");
    tree.add(while_loop.body(), Print::line("$element->valueOf()"))
        .expect("add print");
    tree.add(root, while_loop).expect("add loop");

    let rendered = tree.render().expect("render");
    assert!(rendered.contains("my $i = stdlib::integer->new(0);\n"));
    assert!(rendered.contains("my $len = $numbers->size();\n"));
    assert!(rendered.contains("while ($i < $len) {"));
    assert!(rendered.contains("my $element = $numbers->get($i->valueOf());\n"));
    assert_eq!(rendered.matches("$i->add(1);").count(), 1);
}

#[test]
fn renders_while_over_map() {
    let mut tree = script();
    let root = tree.root();
    let settings = Value::map("settings", Kind::Scalar, vec![("debug".to_string(), 1.into())]);
    tree.add(root, settings.clone()).expect("add map");
    let while_loop = tree.while_over(&settings).expect("while");
    tree.add(root, while_loop).expect("add loop");

    let rendered = tree.render().expect("render");
    assert!(rendered.contains("my $keys = $settings->keys();\n"));
    assert!(rendered.contains("my $len = $keys->size();\n"));
    assert!(rendered.contains("my $key = $keys->get($i->valueOf());\n"));
    assert!(rendered.contains("my $value = $settings->get($key);\n"));
    assert_eq!(rendered.matches("$i->add(1);").count(), 1);
}

#[test]
fn renders_eval_with_fixed_catch() {
    let mut tree = script();
    let root = tree.root();
    let eval = tree.evaluation().expect("evaluation");
    tree.add(eval, Value::string("message", "hello world!"))
        .expect("add value");
    tree.add(root, eval).expect("add eval");

    let rendered = tree.render().expect("render");
    assert!(rendered.contains(
        "eval {\n  my $message = stdlib::string->new(\"hello world!\");\n};\nif ($@) {\n  print($@.\"\\n\");\n};\n"
    ));
}

#[test]
fn renders_signal_binding() {
    let mut tree = script();
    let root = tree.root();
    let handler = tree.routine(RoutineOptions::anonymous());
    tree.add(handler, Print::line("\"caught\"")).expect("add print");
    let binding = SignalHandler::new(&tree, Signal::Int, handler).expect("binding");
    tree.add(root, binding).expect("add binding");

    let rendered = tree.render().expect("render");
    assert!(rendered.contains("$SIG{INT} = sub {\n  print(\"caught\".\"\\n\");\n};\n"));
}

#[test]
fn renders_module_trailer() {
    let mut tree = SourceTree::new(FileOptions::module("lib"));
    tree.set_package("my.package").expect("set package");

    let rendered = tree.render().expect("render");
    assert!(rendered.contains("package my::package;\n"));
    assert!(rendered.ends_with("1;\n"));
}

#[test]
fn empty_nested_block_renders_empty() {
    let mut tree = script();
    let root = tree.root();
    let block = tree.expr();
    tree.add(root, block).expect("add block");

    let before = tree.render().expect("render");
    let baseline = script().render().expect("render");
    assert_eq!(before, baseline);
}

#[test]
fn indents_one_level_per_nesting() {
    let mut tree = script();
    let root = tree.root();
    let outer = tree.condition(ConditionKind::If, "$a");
    let inner = tree.condition(ConditionKind::If, "$b");
    tree.add(inner, Print::line("\"deep\"")).expect("add print");
    tree.add(outer, inner).expect("nest");
    tree.add(root, outer).expect("add outer");

    let rendered = tree.render().expect("render");
    assert!(rendered.contains("if ($a) {\n  if ($b) {\n    print(\"deep\".\"\\n\");\n  };\n};\n"));
}

#[test]
fn breakline_emits_bare_newline() {
    let mut tree = script();
    let root = tree.root();
    tree.breakline(root);
    tree.add(root, Value::integer("x", 1)).expect("add value");

    let rendered = tree.render().expect("render");
    assert!(rendered.contains("\n\nmy $x = stdlib::integer->new(1);\n"));
}

#[test]
fn value_from_anonymous_routine_invokes_inline() {
    let mut tree = script();
    let routine = tree.routine(RoutineOptions::anonymous());
    tree.add(
        routine,
        ReturnStatement::single(Value::new(Kind::Integer, Name::Anonymous, crate::ast::Literal::Int(4))),
    )
    .expect("add return");
    let value = Value::from_routine(&tree, Kind::Integer, "x", routine).expect("value");
    let root = tree.root();
    tree.add(root, value).expect("add value");

    let rendered = tree.render().expect("render");
    assert!(rendered.contains("my $x = sub {\n  return stdlib::integer->new(4);\n}->();\n"));
}
