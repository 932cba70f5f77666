//! AST node types for Lua source
//!
//! Expressions and statements are two sum types with struct payloads.
//! Printing lives in [`pretty`], traversal in [`visit`].

mod expr;
pub mod pretty;
mod stmt;
pub mod visit;

pub use expr::{
    BinaryExpr, BinaryOpKind, Expr, FunctionCall, FunctionDefinition, LongLiteral, NumberLiteral,
    StringLiteral, TableAccess, TableConstructor, TableEntry, UnaryExpr, UnaryOpKind, Variable,
};
pub use stmt::{
    AssignTarget, Assignment, Block, ConditionalBlock, GenericFor, If, NumericFor, Repeat, Return,
    Stmt, While,
};
