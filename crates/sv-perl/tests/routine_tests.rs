use pretty_assertions::assert_eq;
use sv_perl::{
    FileOptions, Kind, Name, ReturnExpr, ReturnStatement, RoutineOptions, SourceTree, Value,
};

fn script() -> SourceTree {
    SourceTree::new(FileOptions::script("test"))
}

#[test]
fn named_routine_renders_with_return_exactly_once() {
    let mut tree = script();
    let root = tree.root();
    let routine = tree.routine(RoutineOptions::named("greet").with_params(["who"]));
    tree.add(routine, ReturnStatement::single("\"hi \".$who"))
        .expect("close");
    tree.add(root, routine).expect("add routine");

    let rendered = tree.render().expect("render");
    assert!(rendered.contains("sub greet {\n  my ($who) = @_;\n  return \"hi \".$who;\n};\n"));
    assert_eq!(rendered.matches("return ").count(), 1);
}

#[test]
fn routine_names_normalize_to_one_space_before_the_brace() {
    let mut tree = script();
    let root = tree.root();
    let routine = tree.routine(RoutineOptions::named("padded "));
    tree.add(routine, ReturnStatement::single("0")).expect("close");
    tree.add(root, routine).expect("add routine");

    let rendered = tree.render().expect("render");
    assert!(rendered.contains("sub padded {\n"));
    assert!(!rendered.contains("sub padded  {"));
}

#[test]
fn single_parameter_shift_binding() {
    let mut tree = script();
    let routine = tree.routine(RoutineOptions::named("one").with_params(["only"]).shifting(true));
    tree.add(routine, ReturnStatement::single("$only")).expect("close");
    let root = tree.root();
    tree.add(root, routine).expect("add routine");

    let rendered = tree.render().expect("render");
    assert!(rendered.contains("sub one {\n  my $only = shift;\n  return $only;\n};\n"));
}

#[test]
fn parameterless_routines_carry_no_binding_prolog() {
    let mut tree = script();
    let routine = tree.routine(RoutineOptions::named("nop"));
    tree.add(routine, ReturnStatement::single("1")).expect("close");
    let root = tree.root();
    tree.add(root, routine).expect("add routine");

    let rendered = tree.render().expect("render");
    assert!(rendered.contains("sub nop {\n  return 1;\n};\n"));
    assert!(!rendered.contains("@_"));
}

#[test]
fn multiple_returns_render_a_tuple_and_record_types() {
    let mut tree = script();
    let routine = tree.routine(RoutineOptions::named("pair"));
    let left = Value::integer("left", 1);
    tree.add(routine, left.clone()).expect("add left");
    tree.add(
        routine,
        ReturnStatement::multiple(vec![ReturnExpr::from(left), ReturnExpr::from("$raw")]),
    )
    .expect("close");

    let data = tree.routine_data(routine).expect("routine");
    let ret = data.ret().expect("recorded");
    assert!(ret.multiple);
    assert_eq!(ret.types.len(), 2);
    assert_eq!(ret.types[0].canonical(), Some("stdlib::integer"));
    assert_eq!(ret.types[1].canonical(), None);

    let root = tree.root();
    tree.add(root, routine).expect("add routine");
    let rendered = tree.render().expect("render");
    assert!(rendered.contains("return ($left,$raw);\n"));
}

#[test]
fn returning_a_named_value_renders_its_binding() {
    let mut tree = script();
    let routine = tree.routine(RoutineOptions::named("fetch"));
    let result = Value::string("result", "done");
    tree.add(routine, result.clone()).expect("add value");
    tree.add(routine, ReturnStatement::single(result)).expect("close");
    let root = tree.root();
    tree.add(root, routine).expect("add routine");

    let rendered = tree.render().expect("render");
    assert!(rendered.contains("my $result = stdlib::string->new(\"done\");\n"));
    assert!(rendered.contains("return $result;\n"));
}

#[test]
fn returning_an_anonymous_value_inlines_its_construction() {
    let mut tree = script();
    let routine = tree.routine(RoutineOptions::named("make"));
    tree.add(
        routine,
        ReturnStatement::single(Value::new(
            Kind::Integer,
            Name::Anonymous,
            sv_perl::Literal::Int(7),
        )),
    )
    .expect("close");
    let root = tree.root();
    tree.add(root, routine).expect("add routine");

    let rendered = tree.render().expect("render");
    assert!(rendered.contains("return stdlib::integer->new(7);\n"));
}
