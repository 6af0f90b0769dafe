use std::str::FromStr;

use sv_core::error::Error;
use sv_core::{common_enum, common_struct, Result};

use crate::ast::value::Value;
use crate::tree::{BlockId, SourceTree};

common_enum! {
    /// Discriminant of a condition block.
    #[derive(Copy, Eq, Hash)]
    pub enum ConditionKind {
        If,
        Elif,
        Else,
    }
}

impl ConditionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionKind::If => "if",
            ConditionKind::Elif => "elif",
            ConditionKind::Else => "else",
        }
    }
}

impl std::fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConditionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "if" => Ok(ConditionKind::If),
            "elif" => Ok(ConditionKind::Elif),
            "else" => Ok(ConditionKind::Else),
            other => Err(Error::UnknownCondition(other.to_string())),
        }
    }
}

common_struct! {
    /// Sanitized boolean expression of a condition block. Statement
    /// terminators and newlines are stripped, nothing more.
    pub struct CondExpr {
        expr: String,
    }
}

impl CondExpr {
    pub fn as_str(&self) -> &str {
        &self.expr
    }
}

impl From<&str> for CondExpr {
    fn from(expr: &str) -> Self {
        Self {
            expr: expr.replace(';', "").replace('\n', ""),
        }
    }
}

impl From<String> for CondExpr {
    fn from(expr: String) -> Self {
        CondExpr::from(expr.as_str())
    }
}

impl From<&Value> for CondExpr {
    fn from(value: &Value) -> Self {
        Self {
            expr: format!("${}->valueOf() == 1", value.display_name()),
        }
    }
}

common_enum! {
    /// Signals a handler routine can be bound to.
    #[derive(Copy, Eq, Hash)]
    pub enum Signal {
        Chld,
        Die,
        Int,
        Alrm,
        Hup,
    }
}

impl Signal {
    pub const ALL: [Signal; 5] = [
        Signal::Chld,
        Signal::Die,
        Signal::Int,
        Signal::Alrm,
        Signal::Hup,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Chld => "CHLD",
            Signal::Die => "DIE",
            Signal::Int => "INT",
            Signal::Alrm => "ALRM",
            Signal::Hup => "HUP",
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Signal {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "CHLD" => Ok(Signal::Chld),
            "DIE" => Ok(Signal::Die),
            "INT" => Ok(Signal::Int),
            "ALRM" => Ok(Signal::Alrm),
            "HUP" => Ok(Signal::Hup),
            other => Err(Error::InvalidSignal(other.to_string())),
        }
    }
}

common_struct! {
    /// Binding of a handler routine into the signal table. Rendering is
    /// deferred so the routine can keep growing until the final pass.
    pub struct SignalHandler {
        signal: Signal,
        routine: BlockId,
    }
}

impl SignalHandler {
    pub fn new(tree: &SourceTree, signal: Signal, handler: BlockId) -> Result<Self> {
        if tree.routine_data(handler).is_none() {
            return Err(Error::InvalidHandler);
        }
        Ok(Self {
            signal,
            routine: handler,
        })
    }

    pub fn signal(&self) -> Signal {
        self.signal
    }

    pub fn routine(&self) -> BlockId {
        self.routine
    }
}

common_struct! {
    /// A `print(...)` statement.
    pub struct Print {
        message: String,
        newline: bool,
    }
}

impl Print {
    pub fn new(message: impl Into<PrintArg>, newline: bool) -> Self {
        Self {
            message: message.into().rendered,
            newline,
        }
    }

    /// Print followed by a newline.
    pub fn line(message: impl Into<PrintArg>) -> Self {
        Self::new(message, true)
    }

    pub fn render(&self) -> String {
        let newline = if self.newline { "\\n" } else { "" };
        if self.message.is_empty() {
            format!("print(\"{newline}\");\n")
        } else {
            format!("print({}.\"{newline}\");\n", self.message)
        }
    }
}

common_struct! {
    /// Message argument of [`Print`]: raw fragments pass through verbatim,
    /// values print their unwrapped form.
    pub struct PrintArg {
        rendered: String,
    }
}

impl From<&str> for PrintArg {
    fn from(raw: &str) -> Self {
        Self {
            rendered: raw.to_string(),
        }
    }
}

impl From<String> for PrintArg {
    fn from(raw: String) -> Self {
        Self { rendered: raw }
    }
}

impl From<&Value> for PrintArg {
    fn from(value: &Value) -> Self {
        Self {
            rendered: value.unwrap_inline(),
        }
    }
}
