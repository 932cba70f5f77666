//! Statement nodes

use super::expr::{Expr, FunctionCall, TableAccess, Variable};

/// A Lua statement
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// A function call in statement position
    Call(FunctionCall),
    Assignment(Assignment),
    Break,
    Return(Return),
    /// A standalone `do ... end` block
    Do(Block),
    If(If),
    While(While),
    Repeat(Repeat),
    NumericFor(NumericFor),
    GenericFor(GenericFor),
}

/// An expression that may appear on the left side of an assignment
#[derive(Debug, Clone, PartialEq)]
pub enum AssignTarget {
    Variable(Variable),
    Access(TableAccess),
}

/// A list of statements. `top_level` marks the root block of a parsed
/// program, which is never wrapped in `do ... end` when printed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub top_level: bool,
}

impl Block {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

/// A single `if`/`elseif` arm: condition plus body. Not a standalone
/// statement; see [`If`].
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalBlock {
    pub condition: Expr,
    pub body: Block,
}

/// If statement with optional `elseif` arms and `else` block
#[derive(Debug, Clone, PartialEq)]
pub struct If {
    pub main: ConditionalBlock,
    pub elseifs: Vec<ConditionalBlock>,
    pub else_block: Option<Block>,
}

/// While statement
#[derive(Debug, Clone, PartialEq)]
pub struct While {
    pub condition: Expr,
    pub body: Block,
}

/// Repeat statement; the condition is checked after the body
#[derive(Debug, Clone, PartialEq)]
pub struct Repeat {
    pub condition: Expr,
    pub body: Block,
}

/// Return statement with zero or more values
#[derive(Debug, Clone, PartialEq)]
pub struct Return {
    pub values: Vec<Expr>,
}

/// Assignment statement. Lua allows multiple targets and values on either
/// side. This node also represents named function definitions
/// (`function name() end`, `local function name() end`), which the printer
/// restores to the named syntax when the shape allows it.
///
/// A *local declaration* (`local a, b`) is an `is_local` assignment whose
/// values are either absent or all `nil` with matching counts; it is a
/// derived property of the current field state, never stored. If
/// `force_explicit_nil` is set the declaration shorthand is suppressed and
/// missing values are printed as explicit `nil`s.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub is_local: bool,
    pub force_explicit_nil: bool,
    pub targets: Vec<AssignTarget>,
    pub values: Vec<Expr>,
}

impl Assignment {
    /// Whether this assignment prints as a bare local declaration
    /// (`local a, b` with no `=` list).
    #[must_use]
    pub fn is_local_declaration(&self) -> bool {
        if self.force_explicit_nil {
            return false;
        }
        if !self.is_local {
            return false;
        }
        if self.values.is_empty() {
            return true;
        }
        self.targets.len() == self.values.len()
            && self.values.iter().all(|v| matches!(v, Expr::Nil))
    }
}

/// Numeric for statement. `step` is optional in source and defaults to 1;
/// with the `autofill_numeric_for_step` setting on, a missing step parses as
/// a literal `1`. A step of literal `1` is elided when printing.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericFor {
    pub variable: String,
    pub start: Expr,
    pub end: Expr,
    pub step: Option<Expr>,
    pub body: Block,
}

/// Generic for statement (`for k, v in pairs(t) do ... end`)
#[derive(Debug, Clone, PartialEq)]
pub struct GenericFor {
    pub variables: Vec<String>,
    pub iterator: Expr,
    pub body: Block,
}
