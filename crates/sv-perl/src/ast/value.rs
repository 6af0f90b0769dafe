use itertools::Itertools;
use sv_core::error::Error;
use sv_core::printer::escape_string;
use sv_core::{bail, common_enum, common_struct, Result};

use crate::registry::{Kind, TypeRegistry, SCALAR_CAST};
use crate::tree::{BlockId, SourceTree};

common_enum! {
    /// Binding name of a node. Anonymous nodes render without the
    /// `my $name = ` assignment head.
    pub enum Name {
        Anonymous,
        Named(String),
    }
}

impl Name {
    pub fn display(&self) -> &str {
        match self {
            Name::Anonymous => "anonymous",
            Name::Named(name) => name,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Name::Anonymous)
    }
}

impl Default for Name {
    fn default() -> Self {
        Name::Anonymous
    }
}

impl From<&str> for Name {
    fn from(name: &str) -> Self {
        Name::Named(name.to_string())
    }
}

impl From<String> for Name {
    fn from(name: String) -> Self {
        Name::Named(name)
    }
}

impl From<Option<&str>> for Name {
    fn from(name: Option<&str>) -> Self {
        match name {
            Some(name) => Name::Named(name.to_string()),
            None => Name::Anonymous,
        }
    }
}

common_enum! {
    /// Literal payload of a value constructor.
    pub enum Literal {
        Str(String),
        Int(i64),
        Float(f64),
        Bool(bool),
        List(Vec<Literal>),
        Object(Vec<(String, Literal)>),
        Raw(String),
        Undef,
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::Str(value.to_string())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Literal::Str(value)
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Literal::Int(value)
    }
}

impl From<i32> for Literal {
    fn from(value: i32) -> Self {
        Literal::Int(value as i64)
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Literal::Float(value)
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Literal::Bool(value)
    }
}

impl From<Vec<Literal>> for Literal {
    fn from(values: Vec<Literal>) -> Self {
        Literal::List(values)
    }
}

/// Render a literal in argument position.
fn literal_atom(literal: &Literal) -> String {
    match literal {
        Literal::Str(value) => format!("\"{}\"", escape_string(value)),
        Literal::Int(value) => value.to_string(),
        Literal::Float(value) => value.to_string(),
        Literal::Bool(value) => if *value { "1" } else { "0" }.to_string(),
        Literal::List(values) => format!("({})", values.iter().map(literal_atom).join(",")),
        Literal::Object(entries) => assoc_literal(entries),
        Literal::Raw(value) => value.clone(),
        Literal::Undef => "undef".to_string(),
    }
}

/// Render an object literal as an associative literal, keys in insertion
/// order.
fn assoc_literal(entries: &[(String, Literal)]) -> String {
    format!(
        "{{{}}}",
        entries
            .iter()
            .map(|(key, value)| format!("{} => {}", key, literal_atom(value)))
            .join(",")
    )
}

common_struct! {
    /// One pre-rendered argument of a method call. Value arguments render as
    /// their unwrap expression, anything else passes through verbatim.
    pub struct MethodArg {
        rendered: String,
    }
}

impl MethodArg {
    pub fn raw(rendered: impl Into<String>) -> Self {
        Self {
            rendered: rendered.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.rendered
    }
}

impl From<&Value> for MethodArg {
    fn from(value: &Value) -> Self {
        Self::raw(value.unwrap_inline())
    }
}

impl From<&str> for MethodArg {
    fn from(value: &str) -> Self {
        Self::raw(value)
    }
}

impl From<String> for MethodArg {
    fn from(value: String) -> Self {
        Self::raw(value)
    }
}

impl From<i64> for MethodArg {
    fn from(value: i64) -> Self {
        Self::raw(value.to_string())
    }
}

impl From<f64> for MethodArg {
    fn from(value: f64) -> Self {
        Self::raw(value.to_string())
    }
}

impl From<bool> for MethodArg {
    fn from(value: bool) -> Self {
        Self::raw(if value { "1" } else { "0" })
    }
}

common_struct! {
    /// A bound method-call expression, `$target->method(args)`.
    pub struct MethodCall {
        target: String,
        method: String,
        args: Vec<String>,
    }
}

impl MethodCall {
    pub(crate) fn new(target: String, method: String, args: Vec<MethodArg>) -> Self {
        Self {
            target,
            method,
            args: args.into_iter().map(|arg| arg.rendered).collect(),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn render(&self) -> String {
        format!("{};\n", self.render_inline())
    }

    pub fn render_inline(&self) -> String {
        format!("${}->{}({})", self.target, self.method, self.args.iter().join(","))
    }
}

common_struct! {
    /// Snapshot of a closed routine used as a constructing value. The call
    /// expression is captured when the value is created; closed routines can
    /// no longer change.
    pub struct RoutineRef {
        name: Name,
        call: String,
    }
}

common_enum! {
    /// What a value node is constructed from.
    pub enum Construct {
        Literal(Literal),
        Value(Box<Value>),
        Routine(RoutineRef),
        Method(MethodCall),
    }
}

impl From<Literal> for Construct {
    fn from(literal: Literal) -> Self {
        Construct::Literal(literal)
    }
}

impl From<Value> for Construct {
    fn from(value: Value) -> Self {
        Construct::Value(Box::new(value))
    }
}

impl From<MethodCall> for Construct {
    fn from(call: MethodCall) -> Self {
        Construct::Method(call)
    }
}

common_struct! {
    /// A named, typed unit of the generated program. Construction text is
    /// rendered eagerly when the value is admitted into a block.
    pub struct Value {
        kind: Kind,
        canonical: String,
        name: Name,
        element_kind: Kind,
        construct: Construct,
        cast_scalar: bool,
    }
}

impl Value {
    /// Registry-driven constructor: resolves the symbolic kind name and the
    /// optional element kind, failing on unregistered names.
    pub fn create(
        registry: &TypeRegistry,
        kind: &str,
        name: impl Into<Name>,
        element_kind: Option<&str>,
        construct: impl Into<Construct>,
    ) -> Result<Value> {
        let spec = registry.resolve(kind)?;
        let element_kind = match element_kind {
            Some(element) => registry.resolve(element)?.kind,
            None => Kind::Scalar,
        };
        Ok(Value {
            kind: spec.kind,
            canonical: spec.canonical.clone(),
            name: name.into(),
            element_kind,
            construct: construct.into(),
            cast_scalar: false,
        })
    }

    /// Built-in kind constructor.
    pub fn new(kind: Kind, name: impl Into<Name>, construct: impl Into<Construct>) -> Value {
        Value {
            kind,
            canonical: kind.canonical().to_string(),
            name: name.into(),
            element_kind: Kind::Scalar,
            construct: construct.into(),
            cast_scalar: false,
        }
    }

    pub fn string(name: impl Into<Name>, value: impl Into<String>) -> Value {
        Value::new(Kind::String, name, Literal::Str(value.into()))
    }

    pub fn integer(name: impl Into<Name>, value: i64) -> Value {
        Value::new(Kind::Integer, name, Literal::Int(value))
    }

    pub fn boolean(name: impl Into<Name>, value: bool) -> Value {
        Value::new(Kind::Boolean, name, Literal::Bool(value))
    }

    pub fn scalar(name: impl Into<Name>, value: impl Into<Literal>) -> Value {
        Value::new(Kind::Scalar, name, value.into())
    }

    pub fn array(name: impl Into<Name>, element_kind: Kind, items: Vec<Literal>) -> Value {
        let mut value = Value::new(Kind::Array, name, Literal::List(items));
        value.element_kind = element_kind;
        value
    }

    pub fn map(name: impl Into<Name>, element_kind: Kind, entries: Vec<(String, Literal)>) -> Value {
        let mut value = Value::new(Kind::Map, name, Literal::Object(entries));
        value.element_kind = element_kind;
        value
    }

    pub fn hash(name: impl Into<Name>, entries: Vec<(String, Literal)>) -> Value {
        Value::new(Kind::Hash, name, Literal::Object(entries))
    }

    /// A value bound to the result of a method call, `my $x = $y->size();`.
    pub fn from_method(kind: Kind, name: impl Into<Name>, call: MethodCall) -> Value {
        Value::new(kind, name, call)
    }

    /// A value bound to the result of a routine invocation. The routine must
    /// already be closed with a return statement; its recorded return shape
    /// is checked against the target kind.
    pub fn from_routine(
        tree: &SourceTree,
        kind: Kind,
        name: impl Into<Name>,
        routine: BlockId,
    ) -> Result<Value> {
        let Some(data) = tree.routine_data(routine) else {
            bail!("constructing values from a block that is not a routine");
        };
        let display = data.display().to_string();
        let Some(ret) = data.ret() else {
            return Err(Error::UnterminatedRoutine(display));
        };
        if kind != Kind::Array && ret.multiple {
            return Err(Error::ArityMismatch {
                routine: display,
                kind: kind.symbol().to_string(),
            });
        }
        let mut cast_scalar = false;
        if kind != Kind::Array {
            let returned = ret.single_type();
            let target = kind.canonical();
            match returned.canonical() {
                Some(found) if kind.is_bare_scalar() && SCALAR_CAST.contains(&found) => {
                    cast_scalar = true;
                }
                Some(found) if found == target => {}
                other => {
                    return Err(Error::TypeMismatch {
                        routine: display,
                        expected: target.to_string(),
                        found: other.unwrap_or("any").to_string(),
                    });
                }
            }
        }
        let call = if data.name().is_anonymous() {
            format!("{}->()", tree.inline_sub(routine)?)
        } else {
            format!("{}()", display)
        };
        Ok(Value {
            kind,
            canonical: kind.canonical().to_string(),
            name: name.into(),
            element_kind: Kind::Scalar,
            construct: Construct::Routine(RoutineRef {
                name: data.name().clone(),
                call,
            }),
            cast_scalar,
        })
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn display_name(&self) -> &str {
        self.name.display()
    }

    pub fn is_anonymous(&self) -> bool {
        self.name.is_anonymous()
    }

    pub fn element_kind(&self) -> Kind {
        self.element_kind
    }

    /// Whether assignment from a boxed primitive into this bare scalar
    /// inserts the implicit `->valueOf()` unwrap.
    pub fn casts_scalar(&self) -> bool {
        self.cast_scalar
    }

    /// Unbound method-call expression against this value.
    pub fn method(&self, name: impl Into<String>, args: Vec<MethodArg>) -> MethodCall {
        MethodCall::new(self.display_name().to_string(), name.into(), args)
    }

    /// The inline unwrap expression: containers clone, everything else
    /// extracts the underlying scalar.
    pub(crate) fn unwrap_inline(&self) -> String {
        if self.kind.is_container() {
            format!("${}->clone()", self.display_name())
        } else {
            format!("${}->valueOf()", self.display_name())
        }
    }

    fn assign_head(&self) -> String {
        if self.is_anonymous() {
            String::new()
        } else {
            format!("my ${} = ", self.display_name())
        }
    }

    /// Render the construction statement for this value. Called once, when
    /// the value is admitted into a block.
    pub fn render_construction(&self) -> Result<String> {
        self.render_with(false)
    }

    fn render_with(&self, inline: bool) -> Result<String> {
        let terminator = if inline { "" } else { ";\n" };
        let head = self.assign_head();
        let rendered = match &self.construct {
            Construct::Value(source) => format!(
                "{head}{}->new({}){terminator}",
                self.canonical,
                source.unwrap_inline()
            ),
            Construct::Routine(routine) => {
                let cast = if self.cast_scalar { "->valueOf()" } else { "" };
                format!("{head}{}{cast}{terminator}", routine.call)
            }
            Construct::Method(call) => {
                if inline {
                    format!("{head}{}", call.render_inline())
                } else {
                    format!("{head}{}", call.render())
                }
            }
            Construct::Literal(literal) => {
                return self.render_literal(literal, inline);
            }
        };
        Ok(rendered)
    }

    fn render_literal(&self, literal: &Literal, inline: bool) -> Result<String> {
        let terminator = if inline { "" } else { ";\n" };
        let head = self.assign_head();
        let canonical = &self.canonical;
        let rendered = match (self.kind, literal) {
            (Kind::String, Literal::Str(value)) => {
                format!("{head}{canonical}->new(\"{}\"){terminator}", escape_string(value))
            }
            (Kind::Scalar, Literal::Str(value)) => {
                format!("{head}\"{}\"{terminator}", escape_string(value))
            }
            (Kind::Scalar, Literal::Int(value)) => format!("{head}{value}{terminator}"),
            (Kind::Scalar, Literal::Float(value)) => format!("{head}{value}{terminator}"),
            (Kind::Scalar, Literal::Raw(value)) => format!("{head}{value}{terminator}"),
            (Kind::Scalar, Literal::Undef) => format!("{head}undef{terminator}"),
            (Kind::Scalar, other) => {
                bail!("invalid literal for a scalar value: {:?}", other)
            }
            (Kind::Hash, Literal::Object(entries)) => {
                format!("{head}{}{terminator}", assoc_literal(entries))
            }
            (Kind::Hash, other) => {
                bail!("hash values require an object literal, got {:?}", other)
            }
            (Kind::Map, Literal::Object(entries)) => {
                let body = if self.element_kind != Kind::Scalar {
                    let entries: Vec<String> = entries
                        .iter()
                        .map(|(key, value)| {
                            let nested =
                                Value::new(self.element_kind, Name::Anonymous, value.clone())
                                    .render_with(true)?;
                            Ok(format!("{} => {}", key, nested))
                        })
                        .collect::<Result<_>>()?;
                    format!("{{{}}}", entries.join(","))
                } else {
                    assoc_literal(entries)
                };
                format!("{head}{canonical}->new({body}){terminator}")
            }
            (Kind::Map, Literal::Undef) => format!("{head}{canonical}->new(){terminator}"),
            (Kind::Map, other) => {
                bail!("map values require an object literal, got {:?}", other)
            }
            (Kind::Array, Literal::List(items)) => {
                let items: Vec<String> = if self.element_kind != Kind::Scalar {
                    items
                        .iter()
                        .map(|item| {
                            Value::new(self.element_kind, Name::Anonymous, item.clone())
                                .render_with(true)
                        })
                        .collect::<Result<_>>()?
                } else {
                    items.iter().map(literal_atom).collect()
                };
                format!("{head}{canonical}->new({}){terminator}", items.join(","))
            }
            (Kind::Array, Literal::Undef) => format!("{head}{canonical}->new(){terminator}"),
            (Kind::Array, other) => {
                bail!("array values require a list literal, got {:?}", other)
            }
            (_, literal) => {
                format!("{head}{canonical}->new({}){terminator}", literal_atom(literal))
            }
        };
        Ok(rendered)
    }

    fn guard(&self, allowed: &[Kind], method: &str) -> Result<()> {
        if allowed.contains(&self.kind) {
            Ok(())
        } else {
            Err(Error::UnknownMethod {
                kind: self.kind.symbol().to_string(),
                method: method.to_string(),
            })
        }
    }

    pub fn value_of(&self) -> Result<MethodCall> {
        self.guard(&[Kind::String, Kind::Integer, Kind::Boolean], "valueOf")?;
        Ok(self.method("valueOf", vec![]))
    }

    pub fn freeze(&self) -> Result<MethodCall> {
        self.guard(
            &[Kind::String, Kind::Integer, Kind::Array, Kind::Map],
            "freeze",
        )?;
        Ok(self.method("freeze", vec![]))
    }

    pub fn cloned(&self) -> Result<MethodCall> {
        self.guard(&[Kind::String, Kind::Array, Kind::Map], "clone")?;
        Ok(self.method("clone", vec![]))
    }

    pub fn length(&self) -> Result<MethodCall> {
        self.guard(&[Kind::String, Kind::Integer], "length")?;
        Ok(self.method("length", vec![]))
    }

    pub fn is_equal(&self, other: impl Into<MethodArg>) -> Result<MethodCall> {
        self.guard(&[Kind::String], "isEqual")?;
        Ok(self.method("isEqual", vec![other.into()]))
    }

    pub fn substr(&self, start: i64, end: i64) -> Result<MethodCall> {
        self.guard(&[Kind::String], "substr")?;
        Ok(self.method("substr", vec![start.into(), end.into()]))
    }

    pub fn char_at(&self, index: i64) -> Result<MethodCall> {
        self.guard(&[Kind::String], "charAt")?;
        Ok(self.method("charAt", vec![index.into()]))
    }

    pub fn repeat(&self, count: i64) -> Result<MethodCall> {
        self.guard(&[Kind::String], "repeat")?;
        Ok(self.method("repeat", vec![count.into()]))
    }

    pub fn contains(&self, needle: impl Into<MethodArg>) -> Result<MethodCall> {
        self.guard(&[Kind::String], "contains")?;
        Ok(self.method("contains", vec![needle.into()]))
    }

    pub fn split(&self, separator: impl Into<MethodArg>) -> Result<MethodCall> {
        self.guard(&[Kind::String], "split")?;
        Ok(self.method("split", vec![separator.into()]))
    }

    pub fn trim(&self) -> Result<MethodCall> {
        self.guard(&[Kind::String], "trim")?;
        Ok(self.method("trim", vec![]))
    }

    pub fn to_lower_case(&self) -> Result<MethodCall> {
        self.guard(&[Kind::String], "toLowerCase")?;
        Ok(self.method("toLowerCase", vec![]))
    }

    pub fn to_upper_case(&self) -> Result<MethodCall> {
        self.guard(&[Kind::String], "toUpperCase")?;
        Ok(self.method("toUpperCase", vec![]))
    }

    pub fn add(&self, value: impl Into<MethodArg>) -> Result<MethodCall> {
        self.guard(&[Kind::Integer], "add")?;
        Ok(self.method("add", vec![value.into()]))
    }

    pub fn sub(&self, value: impl Into<MethodArg>) -> Result<MethodCall> {
        self.guard(&[Kind::Integer], "sub")?;
        Ok(self.method("sub", vec![value.into()]))
    }

    pub fn mul(&self, value: impl Into<MethodArg>) -> Result<MethodCall> {
        self.guard(&[Kind::Integer], "mul")?;
        Ok(self.method("mul", vec![value.into()]))
    }

    pub fn div(&self, value: impl Into<MethodArg>) -> Result<MethodCall> {
        self.guard(&[Kind::Integer], "div")?;
        Ok(self.method("div", vec![value.into()]))
    }

    pub fn get(&self, key: impl Into<MethodArg>) -> Result<MethodCall> {
        self.guard(&[Kind::Array, Kind::Map], "get")?;
        Ok(self.method("get", vec![key.into()]))
    }

    pub fn set(&self, key: impl Into<MethodArg>, value: impl Into<MethodArg>) -> Result<MethodCall> {
        self.guard(&[Kind::Map], "set")?;
        Ok(self.method("set", vec![key.into(), value.into()]))
    }

    pub fn size(&self) -> Result<MethodCall> {
        self.guard(&[Kind::Array, Kind::Map], "size")?;
        Ok(self.method("size", vec![]))
    }

    pub fn keys(&self) -> Result<MethodCall> {
        self.guard(&[Kind::Map], "keys")?;
        Ok(self.method("keys", vec![]))
    }

    pub fn values(&self) -> Result<MethodCall> {
        self.guard(&[Kind::Map], "values")?;
        Ok(self.method("values", vec![]))
    }

    pub fn clear(&self) -> Result<MethodCall> {
        self.guard(&[Kind::Map], "clear")?;
        Ok(self.method("clear", vec![]))
    }

    pub fn delete(&self, key: impl Into<MethodArg>) -> Result<MethodCall> {
        self.guard(&[Kind::Map], "delete")?;
        Ok(self.method("delete", vec![key.into()]))
    }

    /// `$container->forEach(sub { ... })` with an inlined routine body.
    pub fn for_each(&self, tree: &SourceTree, routine: BlockId) -> Result<MethodCall> {
        self.guard(&[Kind::Array, Kind::Map], "forEach")?;
        if tree.routine_data(routine).is_none() {
            bail!("forEach expects a routine block");
        }
        let inlined = tree.inline_sub(routine)?;
        Ok(self.method("forEach", vec![MethodArg::raw(inlined)]))
    }
}
