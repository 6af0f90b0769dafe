use itertools::Itertools;
use sv_core::{common_enum, common_struct, Result};

use crate::ast::value::{Name, Value};

common_struct! {
    /// Construction options for a routine block.
    pub struct RoutineOptions {
        pub name: Name,
        pub params: Vec<String>,
        pub shifting: bool,
    }
}

impl RoutineOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Name::Named(name.into()),
            params: Vec::new(),
            shifting: false,
        }
    }

    pub fn anonymous() -> Self {
        Self {
            name: Name::Anonymous,
            params: Vec::new(),
            shifting: false,
        }
    }

    pub fn with_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn shifting(mut self, shifting: bool) -> Self {
        self.shifting = shifting;
        self
    }
}

impl Default for RoutineOptions {
    fn default() -> Self {
        Self::anonymous()
    }
}

common_struct! {
    /// The argument-binding prolog installed at the top of a routine body:
    /// one bulk destructure, or one shift per parameter.
    pub struct ArgumentBinding {
        value: String,
    }
}

impl ArgumentBinding {
    pub fn new(params: &[String], shifting: bool) -> Self {
        let value = if params.is_empty() {
            String::new()
        } else if shifting {
            params
                .iter()
                .map(|param| format!("my ${param} = shift;\n"))
                .collect()
        } else {
            format!(
                "my ({}) = @_;\n",
                params.iter().map(|param| format!("${param}")).join(",")
            )
        };
        Self { value }
    }

    pub fn render(&self) -> &str {
        &self.value
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

common_enum! {
    /// Declared type of one returned element.
    pub enum ReturnTy {
        Canonical(String),
        Any,
    }
}

impl ReturnTy {
    pub fn canonical(&self) -> Option<&str> {
        match self {
            ReturnTy::Canonical(name) => Some(name),
            ReturnTy::Any => None,
        }
    }
}

common_struct! {
    /// Return shape recorded on a routine once it closes.
    pub struct ReturnInfo {
        pub multiple: bool,
        pub types: Vec<ReturnTy>,
    }
}

impl ReturnInfo {
    pub fn single_type(&self) -> &ReturnTy {
        static ANY: ReturnTy = ReturnTy::Any;
        self.types.first().unwrap_or(&ANY)
    }
}

common_struct! {
    /// State a routine block carries on top of the generic block data.
    pub struct RoutineData {
        name: Name,
        ret: Option<ReturnInfo>,
    }
}

impl RoutineData {
    pub(crate) fn new(name: Name) -> Self {
        Self { name, ret: None }
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn display(&self) -> &str {
        self.name.display()
    }

    pub fn ret(&self) -> Option<&ReturnInfo> {
        self.ret.as_ref()
    }

    pub(crate) fn set_ret(&mut self, ret: ReturnInfo) {
        self.ret = Some(ret);
    }

    /// `sub <name> ` with exactly one space before the opening brace.
    pub fn header(&self) -> String {
        match &self.name {
            Name::Anonymous => "sub ".to_string(),
            Name::Named(name) => format!("sub {} ", name.trim_end()),
        }
    }
}

common_enum! {
    /// One returned expression: a value node or a raw fragment.
    pub enum ReturnExpr {
        Value(Value),
        Raw(String),
    }
}

impl From<Value> for ReturnExpr {
    fn from(value: Value) -> Self {
        ReturnExpr::Value(value)
    }
}

impl From<&str> for ReturnExpr {
    fn from(raw: &str) -> Self {
        ReturnExpr::Raw(raw.to_string())
    }
}

impl From<String> for ReturnExpr {
    fn from(raw: String) -> Self {
        ReturnExpr::Raw(raw)
    }
}

common_struct! {
    /// A terminating return. Admitting one into a routine renders it, closes
    /// the routine, and records the return arity and types.
    pub struct ReturnStatement {
        exprs: Vec<ReturnExpr>,
        multiple: bool,
    }
}

impl ReturnStatement {
    pub fn single(expr: impl Into<ReturnExpr>) -> Self {
        Self {
            exprs: vec![expr.into()],
            multiple: false,
        }
    }

    pub fn multiple(exprs: Vec<ReturnExpr>) -> Self {
        Self {
            exprs,
            multiple: true,
        }
    }

    pub fn is_multiple(&self) -> bool {
        self.multiple
    }

    pub(crate) fn render(&self) -> Result<String> {
        if self.multiple {
            let parts: Vec<String> = self
                .exprs
                .iter()
                .map(|expr| match expr {
                    ReturnExpr::Value(value) => format!("${}", value.display_name()),
                    ReturnExpr::Raw(raw) => raw.clone(),
                })
                .collect();
            return Ok(format!("return ({});\n", parts.join(",")));
        }
        match self.exprs.first() {
            None => Ok("return;\n".to_string()),
            Some(ReturnExpr::Raw(raw)) => Ok(format!("return {};\n", raw)),
            Some(ReturnExpr::Value(value)) => {
                if value.is_anonymous() {
                    Ok(format!("return {}", value.render_construction()?))
                } else {
                    Ok(format!("return ${};\n", value.display_name()))
                }
            }
        }
    }

    pub(crate) fn info(&self) -> ReturnInfo {
        ReturnInfo {
            multiple: self.multiple,
            types: self
                .exprs
                .iter()
                .map(|expr| match expr {
                    ReturnExpr::Value(value) => ReturnTy::Canonical(value.canonical().to_string()),
                    ReturnExpr::Raw(_) => ReturnTy::Any,
                })
                .collect(),
        }
    }
}
