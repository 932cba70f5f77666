//! Expression nodes

use super::stmt::Block;

/// Binary operator kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOpKind {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Modulo,
    Concat,
    GreaterThan,
    GreaterOrEqual,
    LessThan,
    LessOrEqual,
    Equal,
    NotEqual,
    And,
    Or,
}

impl BinaryOpKind {
    /// The source text of the operator
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            BinaryOpKind::Add => "+",
            BinaryOpKind::Subtract => "-",
            BinaryOpKind::Multiply => "*",
            BinaryOpKind::Divide => "/",
            BinaryOpKind::Power => "^",
            BinaryOpKind::Modulo => "%",
            BinaryOpKind::Concat => "..",
            BinaryOpKind::GreaterThan => ">",
            BinaryOpKind::GreaterOrEqual => ">=",
            BinaryOpKind::LessThan => "<",
            BinaryOpKind::LessOrEqual => "<=",
            BinaryOpKind::Equal => "==",
            BinaryOpKind::NotEqual => "~=",
            BinaryOpKind::And => "and",
            BinaryOpKind::Or => "or",
        }
    }

    /// Look up the operator for a token text
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let kind = match symbol {
            "+" => BinaryOpKind::Add,
            "-" => BinaryOpKind::Subtract,
            "*" => BinaryOpKind::Multiply,
            "/" => BinaryOpKind::Divide,
            "^" => BinaryOpKind::Power,
            "%" => BinaryOpKind::Modulo,
            ".." => BinaryOpKind::Concat,
            ">" => BinaryOpKind::GreaterThan,
            ">=" => BinaryOpKind::GreaterOrEqual,
            "<" => BinaryOpKind::LessThan,
            "<=" => BinaryOpKind::LessOrEqual,
            "==" => BinaryOpKind::Equal,
            "~=" => BinaryOpKind::NotEqual,
            "and" => BinaryOpKind::And,
            "or" => BinaryOpKind::Or,
            _ => return None,
        };
        Some(kind)
    }
}

/// Unary operator kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOpKind {
    /// `-value`
    Negate,
    /// `not value`
    Invert,
    /// `#table`
    Length,
}

impl UnaryOpKind {
    /// The source text of the operator, including the trailing space for `not`
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            UnaryOpKind::Negate => "-",
            UnaryOpKind::Invert => "not ",
            UnaryOpKind::Length => "#",
        }
    }

    /// Look up the operator for a token text
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "-" => Some(UnaryOpKind::Negate),
            "not" => Some(UnaryOpKind::Invert),
            "#" => Some(UnaryOpKind::Length),
            _ => None,
        }
    }
}

/// A Lua expression.
///
/// Structural equality (`PartialEq`) is used by the printer to recognize
/// method-call sugar, where the callee's table must match the first argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Variable(Variable),
    Nil,
    Varargs,
    Bool(bool),
    Unary(UnaryExpr),
    Binary(BinaryExpr),
    String(StringLiteral),
    Number(NumberLiteral),
    Long(LongLiteral),
    Access(TableAccess),
    Call(FunctionCall),
    Table(TableConstructor),
    Function(FunctionDefinition),
}

/// Variable expression (`some_var`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
}

/// Unary operation (`not a`, `-a`, `#t`). Always printed parenthesized.
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub op: UnaryOpKind,
    pub operand: Box<Expr>,
}

/// Binary operation. Always printed parenthesized.
///
/// The parser favors combining the left side for operations of equal
/// precedence, so `a + b + c` always parses as `((a + b) + c)` even though
/// `(a + (b + c))` would be mathematically equivalent (but not necessarily
/// equivalent in Lua, given metatables).
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub op: BinaryOpKind,
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
}

/// String literal. `value` holds the decoded text with all escape sequences
/// interpreted; the printer re-escapes on output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringLiteral {
    pub value: String,
}

/// Number literal. The value is always an `f64`. If `hex` is set the value
/// is converted to an integer and written in hex.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberLiteral {
    pub value: f64,
    pub hex: bool,
}

impl NumberLiteral {
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Self { value, hex: false }
    }
}

/// LuaJIT 64-bit integer literal (`123LL`, `0x123LL`). Only produced when
/// the `enable_extended_long_literals` setting is on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongLiteral {
    pub value: i64,
    pub hex: bool,
}

/// Table access (`t.key`, `t[expr]`). Usable on any Lua value, not just
/// tables, due to metatables. The printer uses dot-style sugar when the
/// index is a string literal that is a valid identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct TableAccess {
    pub table: Box<Expr>,
    pub index: Box<Expr>,
}

/// Function call, usable as both expression and statement.
///
/// If `truncate_returns` is set, the call is printed surrounded by
/// parentheses so the expression yields only the first return value. The
/// parser sets it for parenthesized calls and clears it again wherever the
/// surrounding context truncates anyway (access, call, unary or binary
/// position).
///
/// Method-style calls (`obj:name(...)`) parse into this node with the callee
/// being a [`TableAccess`] and the receiver prepended to `arguments`.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub callee: Box<Expr>,
    pub arguments: Vec<Expr>,
    pub truncate_returns: bool,
}

/// Table constructor expression.
#[derive(Debug, Clone, PartialEq)]
pub struct TableConstructor {
    pub entries: Vec<TableEntry>,
}

/// One entry of a table constructor.
///
/// `key` is `None` only for a sequential entry parsed with the
/// `autofill_sequential_table_keys` setting off. If `explicit_key` is set
/// the key is always emitted, even when it matches the running sequential
/// index.
#[derive(Debug, Clone, PartialEq)]
pub struct TableEntry {
    pub key: Option<Expr>,
    pub value: Expr,
    pub explicit_key: bool,
}

/// Function definition, usable as both expression and statement. Parameter
/// names are plain strings. A trailing `...` sets `varargs` instead of
/// appearing as a parameter.
///
/// Named definitions (`function a.b:c() end`) are represented as an
/// [`Assignment`](super::Assignment) of a `FunctionDefinition`; the colon
/// form synthesizes a leading `self` parameter and sets `implicit_self`,
/// which the printer uses to restore the method syntax.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDefinition {
    pub parameters: Vec<String>,
    pub body: Block,
    pub varargs: bool,
    pub implicit_self: bool,
}
