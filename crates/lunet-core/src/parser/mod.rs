//! Recursive descent parser for Lua source
//!
//! Expressions are parsed in three layers: primary (literals, variables,
//! table constructors, function definitions), secondary (one leading unary
//! operator plus postfix access, method and call chains) and complex
//! (precedence climbing over binary operators). Statements dispatch on the
//! leading keyword, with assignments recovered from an already-parsed
//! expression when an `=` or `,` follows.

// Numeric literals are stored as f64 even when sourced from integers.
#![allow(clippy::cast_precision_loss)]

mod error;
mod operators;

pub use error::{ParseError, ParseErrorKind};

use serde::{Deserialize, Serialize};

use crate::ast::{
    AssignTarget, Assignment, BinaryExpr, BinaryOpKind, Block, ConditionalBlock, Expr,
    FunctionCall, FunctionDefinition, GenericFor, If, LongLiteral, NumberLiteral, NumericFor,
    Repeat, Return, Stmt, StringLiteral, TableAccess, TableConstructor, TableEntry, UnaryExpr,
    UnaryOpKind, Variable, While,
};
use crate::lexer::{Token, TokenKind, Tokenizer};
use crate::{Error, Result};

/// Settings which control certain behavior of the parser.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Fill in number keys for sequential table constructor entries (ones
    /// written without a key). If this is off, [`TableEntry::key`] is `None`
    /// for such entries; if on, it is never `None`.
    pub autofill_sequential_table_keys: bool,

    /// Fill in a `nil` for every target of a bare local declaration
    /// (`local a, b`). If this is off, the assignment's value list stays
    /// empty; if on, it always matches the target list in length.
    pub autofill_local_nil_values: bool,

    /// Fill in a literal `1` step for numeric `for` statements that do not
    /// spell one out.
    pub autofill_numeric_for_step: bool,

    /// Parse LuaJIT long literals (`123LL`, `0x123LL`) into
    /// [`LongLiteral`] nodes. With this off the `LL` suffix is a syntax
    /// error.
    pub enable_extended_long_literals: bool,

    /// Reject quirks that stock Lua refuses but this parser can represent,
    /// such as indexing or calling a string literal without parentheses.
    pub maintain_legacy_syntax_error_compat: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            autofill_sequential_table_keys: true,
            autofill_local_nil_values: true,
            autofill_numeric_for_step: true,
            enable_extended_long_literals: true,
            maintain_legacy_syntax_error_compat: false,
        }
    }
}

/// A binary operator usable in the current position, resolved from the
/// operator table.
#[derive(Debug, Clone, Copy)]
struct BinaryOperator {
    kind: BinaryOpKind,
    precedence: u8,
    right_associative: bool,
}

fn binary_expr(op: BinaryOpKind, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary(BinaryExpr {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    })
}

/// A parenthesized call keeps its truncation marker only while parentheses
/// are the outermost context; any further use truncates on its own.
fn clear_truncate(expr: &mut Expr) {
    if let Expr::Call(call) = expr {
        call.truncate_returns = false;
    }
}

fn target_to_expr(target: AssignTarget) -> Expr {
    match target {
        AssignTarget::Variable(variable) => Expr::Variable(variable),
        AssignTarget::Access(access) => Expr::Access(access),
    }
}

fn binds_tighter(lookahead: BinaryOperator, op: BinaryOperator) -> bool {
    if lookahead.right_associative {
        lookahead.precedence == op.precedence
    } else {
        lookahead.precedence > op.precedence
    }
}

/// Streaming parser over a [`Tokenizer`].
pub struct Parser<'src> {
    tokenizer: Tokenizer<'src>,
    settings: Settings,
    current: Token,
}

impl<'src> Parser<'src> {
    /// Create a parser over the given source text
    pub fn new(source: &'src str, settings: Settings) -> Result<Self> {
        let mut tokenizer = Tokenizer::new(source);
        let current = tokenizer.next_token()?;
        Ok(Self {
            tokenizer,
            settings,
            current,
        })
    }

    /// Parse a whole program: statements until end of input.
    pub fn parse_program(&mut self) -> Result<Block> {
        let mut statements = Vec::new();
        while !self.current.is_eof() {
            statements.push(self.parse_statement()?);
        }
        Ok(Block {
            statements,
            top_level: true,
        })
    }

    /// Parse a single expression
    pub fn parse_expression(&mut self) -> Result<Expr> {
        let expr = self.parse_secondary()?;
        self.parse_complex(expr, 0)
    }

    /// Parse a single statement, consuming any trailing semicolons
    pub fn parse_statement(&mut self) -> Result<Stmt> {
        let stmt = self.parse_primary_statement()?;
        self.skip_semicolons()?;
        Ok(stmt)
    }

    /// Fail unless the whole input has been consumed
    pub fn expect_end_of_input(&self) -> Result<()> {
        if self.current.is_eof() {
            Ok(())
        } else {
            Err(self.expected("end of input", &self.current))
        }
    }

    fn advance(&mut self) -> Result<()> {
        self.current = self.tokenizer.next_token()?;
        Ok(())
    }

    fn peek(&mut self) -> Result<Token> {
        Ok(self.tokenizer.peek_token()?)
    }

    fn error(&self, kind: ParseErrorKind) -> Error {
        Error::Parse(ParseError {
            kind,
            region: self.current.region,
        })
    }

    fn expected(&self, expected: &'static str, token: &Token) -> Error {
        Error::Parse(ParseError {
            kind: ParseErrorKind::UnexpectedToken {
                found: token.describe(),
                expected,
            },
            region: token.region,
        })
    }

    fn skip_semicolons(&mut self) -> Result<()> {
        while self.current.is_punctuation(";") {
            self.advance()?;
        }
        Ok(())
    }

    fn unary_operator(&self) -> Option<UnaryOpKind> {
        if self.current.kind != TokenKind::Punctuation {
            return None;
        }
        operators::lookup(&self.current.text).and_then(|op| op.unary)
    }

    /// Resolve the current token as a binary operator. A token that is in
    /// the operator table but has no binary form (`not`, `#`) is an error,
    /// since we only look while in operand-follows position.
    fn binary_operator(&self) -> Result<Option<BinaryOperator>> {
        if self.current.kind != TokenKind::Punctuation {
            return Ok(None);
        }
        let Some(op) = operators::lookup(&self.current.text) else {
            return Ok(None);
        };
        let Some(kind) = op.binary else {
            return Err(self.expected("binary operator", &self.current));
        };
        Ok(Some(BinaryOperator {
            kind,
            precedence: op.precedence,
            right_associative: op.right_associative,
        }))
    }

    fn parse_variable(&mut self) -> Result<Variable> {
        if self.current.kind != TokenKind::Identifier {
            return Err(self.expected("identifier", &self.current));
        }
        let name = self.current.text.clone();
        self.advance()?;
        Ok(Variable { name })
    }

    fn parse_string_literal(&mut self) -> Result<StringLiteral> {
        if self.current.kind != TokenKind::QuotedString {
            return Err(self.expected("quoted string", &self.current));
        }
        let value = self.current.text.clone();
        self.advance()?;
        Ok(StringLiteral { value })
    }

    fn parse_number_literal(&mut self) -> Result<NumberLiteral> {
        if self.current.kind != TokenKind::Number {
            return Err(self.expected("number", &self.current));
        }
        let text = self.current.text.clone();

        if let Some(digits) = text.strip_prefix("0x") {
            let value = i64::from_str_radix(digits, 16)
                .map_err(|_| self.error(ParseErrorKind::MalformedHexNumber(text.clone())))?;
            self.advance()?;
            return Ok(NumberLiteral {
                value: value as f64,
                hex: true,
            });
        }

        let value: f64 = text
            .parse()
            .map_err(|_| self.error(ParseErrorKind::MalformedNumber(text.clone())))?;
        self.advance()?;
        Ok(NumberLiteral::new(value))
    }

    fn parse_long_literal(&mut self) -> Result<LongLiteral> {
        if self.current.kind != TokenKind::Number {
            return Err(self.expected("long number", &self.current));
        }
        let text = self.current.text.clone();

        let (value, hex) = if let Some(digits) = text.strip_prefix("0x") {
            let value = i64::from_str_radix(digits, 16)
                .map_err(|_| self.error(ParseErrorKind::MalformedHexNumber(text.clone())))?;
            (value, true)
        } else {
            let value = text
                .parse()
                .map_err(|_| self.error(ParseErrorKind::MalformedNumber(text.clone())))?;
            (value, false)
        };

        self.advance()?;
        if !self.current.is_identifier("LL") {
            return Err(self.expected("'LL' suffix", &self.current));
        }
        self.advance()?;
        Ok(LongLiteral { value, hex })
    }

    /// Parse one access step: `.name`, `[expr]` or, when permitted, `:name`
    /// for method calls.
    fn parse_table_access(&mut self, table: Expr, allow_colon: bool) -> Result<TableAccess> {
        if self.current.is_punctuation(".") || (allow_colon && self.current.is_punctuation(":")) {
            self.advance()?;
            if self.current.kind != TokenKind::Identifier {
                return Err(self.expected("identifier", &self.current));
            }
            let index = Expr::String(StringLiteral {
                value: self.current.text.clone(),
            });
            self.advance()?;
            return Ok(TableAccess {
                table: Box::new(table),
                index: Box::new(index),
            });
        }

        if self.current.is_punctuation("[") {
            self.advance()?;
            let index = self.parse_expression()?;
            if !self.current.is_punctuation("]") {
                return Err(self.expected("closing bracket", &self.current));
            }
            self.advance()?;
            return Ok(TableAccess {
                table: Box::new(table),
                index: Box::new(index),
            });
        }

        Err(self.expected("table access", &self.current))
    }

    /// Parse a parenthesized argument list. A method-call receiver, if any,
    /// becomes the first argument.
    fn parse_call(&mut self, callee: Expr, receiver: Option<Expr>) -> Result<FunctionCall> {
        if !self.current.is_punctuation("(") {
            return Err(self.expected("start of argument list", &self.current));
        }
        self.advance()?;

        let mut arguments = Vec::new();
        if let Some(receiver) = receiver {
            arguments.push(receiver);
        }

        if !self.current.is_punctuation(")") {
            arguments.push(self.parse_expression()?);
        }

        while self.current.is_punctuation(",") {
            self.advance()?;
            arguments.push(self.parse_expression()?);
            if !self.current.is_punctuation(",") && !self.current.is_punctuation(")") {
                return Err(self.expected("comma or end of argument list", &self.current));
            }
        }
        if !self.current.is_punctuation(")") {
            return Err(self.expected("end of argument list", &self.current));
        }
        self.advance()?;

        Ok(FunctionCall {
            callee: Box::new(callee),
            arguments,
            truncate_returns: false,
        })
    }

    fn parse_table_entry(&mut self) -> Result<TableEntry> {
        if self.current.kind == TokenKind::Identifier {
            if self.peek()?.is_punctuation("=") {
                // { a = ... }
                let key = Expr::String(StringLiteral {
                    value: self.current.text.clone(),
                });
                self.advance()?;
                self.advance()?;
                let value = self.parse_expression()?;
                return Ok(TableEntry {
                    key: Some(key),
                    value,
                    explicit_key: true,
                });
            }
            // { a } - the sequential key is filled in by the caller
            let value = self.parse_expression()?;
            return Ok(TableEntry {
                key: None,
                value,
                explicit_key: false,
            });
        }

        if self.current.is_punctuation("[") {
            // { [expr] = ... }
            self.advance()?;
            let key = self.parse_expression()?;
            if !self.current.is_punctuation("]") {
                return Err(self.expected("end of key", &self.current));
            }
            self.advance()?;
            if !self.current.is_punctuation("=") {
                return Err(self.expected("assignment", &self.current));
            }
            self.advance()?;
            let value = self.parse_expression()?;
            return Ok(TableEntry {
                key: Some(key),
                value,
                explicit_key: true,
            });
        }

        // { expr }
        Ok(TableEntry {
            key: None,
            value: self.parse_expression()?,
            explicit_key: false,
        })
    }

    fn parse_table_constructor(&mut self) -> Result<TableConstructor> {
        if !self.current.is_punctuation("{") {
            return Err(self.expected("table constructor", &self.current));
        }
        self.advance()?;

        let mut entries: Vec<TableEntry> = Vec::new();
        let mut seq_idx = 1i64;

        if !self.current.is_punctuation("}") {
            let mut entry = self.parse_table_entry()?;
            self.autofill_key(&mut entry, &mut seq_idx);
            entries.push(entry);
        }

        while self.current.is_punctuation(",") {
            self.advance()?;
            if self.current.is_punctuation("}") {
                break; // trailing comma
            }
            let mut entry = self.parse_table_entry()?;
            self.autofill_key(&mut entry, &mut seq_idx);
            entries.push(entry);
            if !self.current.is_punctuation(",") && !self.current.is_punctuation("}") {
                return Err(self.expected("comma or end of entry list", &self.current));
            }
        }

        if !self.current.is_punctuation("}") {
            return Err(self.expected("end of entry list", &self.current));
        }
        self.advance()?;

        Ok(TableConstructor { entries })
    }

    fn autofill_key(&self, entry: &mut TableEntry, seq_idx: &mut i64) {
        if self.settings.autofill_sequential_table_keys && entry.key.is_none() {
            entry.key = Some(Expr::Number(NumberLiteral::new(*seq_idx as f64)));
            *seq_idx += 1;
        }
    }

    /// Parse a function definition. Named definitions hand over parsing at
    /// the parameter list (`start_from_params`); the colon form synthesizes
    /// a leading `self` parameter.
    fn parse_function_definition(
        &mut self,
        start_from_params: bool,
        implicit_self: bool,
    ) -> Result<FunctionDefinition> {
        if !start_from_params {
            if !self.current.is_punctuation("function") {
                return Err(self.expected("function", &self.current));
            }
            self.advance()?;
        }

        if !self.current.is_punctuation("(") {
            return Err(self.expected("start of argument name list", &self.current));
        }
        self.advance()?;

        let mut varargs = false;
        let mut parameters = Vec::new();

        if implicit_self {
            parameters.push("self".to_string());
        }

        if !self.current.is_punctuation(")") {
            if self.current.is_punctuation("...") {
                varargs = true;
                self.advance()?;
            } else {
                if self.current.kind != TokenKind::Identifier {
                    return Err(self.expected("identifier", &self.current));
                }
                parameters.push(self.current.text.clone());
                self.advance()?;
            }
        }

        while self.current.is_punctuation(",") {
            self.advance()?;
            if self.current.is_punctuation("...") {
                varargs = true;
                self.advance()?;
                break;
            }
            if self.current.kind != TokenKind::Identifier {
                return Err(self.expected("identifier", &self.current));
            }
            parameters.push(self.current.text.clone());
            self.advance()?;
        }

        if !self.current.is_punctuation(")") {
            return Err(self.expected("end of argument name list", &self.current));
        }
        self.advance()?;

        self.skip_semicolons()?;
        let statements = self.parse_statements_until(&["end"], "'end' keyword")?;
        self.advance()?;

        Ok(FunctionDefinition {
            parameters,
            body: Block {
                statements,
                top_level: false,
            },
            varargs,
            implicit_self,
        })
    }

    /// Primary expression: does not depend on any other expression.
    fn parse_primary(&mut self) -> Result<Expr> {
        match self.current.kind {
            TokenKind::Identifier => Ok(Expr::Variable(self.parse_variable()?)),
            TokenKind::QuotedString => Ok(Expr::String(self.parse_string_literal()?)),
            TokenKind::Number => {
                if self.settings.enable_extended_long_literals && self.peek()?.is_identifier("LL") {
                    Ok(Expr::Long(self.parse_long_literal()?))
                } else {
                    Ok(Expr::Number(self.parse_number_literal()?))
                }
            }
            TokenKind::Punctuation => match self.current.text.as_str() {
                "{" => Ok(Expr::Table(self.parse_table_constructor()?)),
                "..." => {
                    self.advance()?;
                    Ok(Expr::Varargs)
                }
                "nil" => {
                    self.advance()?;
                    Ok(Expr::Nil)
                }
                "true" => {
                    self.advance()?;
                    Ok(Expr::Bool(true))
                }
                "false" => {
                    self.advance()?;
                    Ok(Expr::Bool(false))
                }
                "function" => Ok(Expr::Function(self.parse_function_definition(false, false)?)),
                _ => Err(self.expected("expression", &self.current)),
            },
            _ => Err(self.expected("expression", &self.current)),
        }
    }

    fn check_string_sugar(&self, expr: &Expr, calling: bool) -> Result<()> {
        if self.settings.maintain_legacy_syntax_error_compat && matches!(expr, Expr::String(_)) {
            let kind = if calling {
                ParseErrorKind::StringCall
            } else {
                ParseErrorKind::StringIndex
            };
            return Err(self.error(kind));
        }
        Ok(())
    }

    /// Secondary expression: depends on (alters the value of) one
    /// expression. At most one leading unary operator is accepted; it wraps
    /// the whole postfix chain, so `-a.b(c)` negates the call result.
    fn parse_secondary(&mut self) -> Result<Expr> {
        let unary = self.unary_operator();
        if unary.is_some() {
            self.advance()?;
        }

        let mut expr;
        if self.current.is_punctuation("(") {
            self.advance()?;
            expr = self.parse_expression()?;
            if !self.current.is_punctuation(")") {
                return Err(self.expected("closing parenthesis", &self.current));
            }
            self.advance()?;
            if let Expr::Call(call) = &mut expr {
                call.truncate_returns = true;
            }
        } else {
            expr = self.parse_primary()?;
        }

        while self.current.is_punctuation(".") || self.current.is_punctuation("[") {
            clear_truncate(&mut expr);
            self.check_string_sugar(&expr, false)?;
            expr = Expr::Access(self.parse_table_access(expr, false)?);
        }

        while self.current.is_punctuation(":") {
            clear_truncate(&mut expr);
            self.check_string_sugar(&expr, false)?;
            let receiver = expr.clone();
            let access = self.parse_table_access(expr, true)?;
            expr = Expr::Call(self.parse_call(Expr::Access(access), Some(receiver))?);
        }

        if self.current.is_punctuation("(") {
            clear_truncate(&mut expr);
            self.check_string_sugar(&expr, true)?;
            expr = Expr::Call(self.parse_call(expr, None)?);
        } else if self.current.is_punctuation("{") {
            clear_truncate(&mut expr);
            self.check_string_sugar(&expr, true)?;
            let table = self.parse_table_constructor()?;
            expr = Expr::Call(FunctionCall {
                callee: Box::new(expr),
                arguments: vec![Expr::Table(table)],
                truncate_returns: false,
            });
        } else if self.current.kind == TokenKind::QuotedString {
            clear_truncate(&mut expr);
            self.check_string_sugar(&expr, true)?;
            let argument = Expr::String(self.parse_string_literal()?);
            expr = Expr::Call(FunctionCall {
                callee: Box::new(expr),
                arguments: vec![argument],
                truncate_returns: false,
            });
        }

        if let Some(op) = unary {
            clear_truncate(&mut expr);
            expr = Expr::Unary(UnaryExpr {
                op,
                operand: Box::new(expr),
            });
        }

        Ok(expr)
    }

    /// Complex expression: depends on (alters the value of) two
    /// expressions. Precedence climbing; operands of equal precedence
    /// combine to the left unless the operator is right-associative.
    fn parse_complex(&mut self, mut lhs: Expr, min_prec: u8) -> Result<Expr> {
        let Some(mut lookahead) = self.binary_operator()? else {
            return Ok(lhs);
        };
        // No truncation marker needed, the operation truncates anyway.
        clear_truncate(&mut lhs);

        while lookahead.precedence >= min_prec {
            let op = lookahead;
            self.advance()?;
            let mut rhs = self.parse_secondary()?;
            clear_truncate(&mut rhs);
            match self.binary_operator()? {
                None => return Ok(binary_expr(op.kind, lhs, rhs)),
                Some(next) => lookahead = next,
            }

            while binds_tighter(lookahead, op) {
                rhs = self.parse_complex(rhs, lookahead.precedence)?;
                match self.binary_operator()? {
                    None => return Ok(binary_expr(op.kind, lhs, rhs)),
                    Some(next) => lookahead = next,
                }
            }

            lhs = binary_expr(op.kind, lhs, rhs);
        }

        Ok(lhs)
    }

    /// Collect statements until one of the stop keywords, which is left in
    /// place for the caller. Hitting end of input instead is an error.
    fn parse_statements_until(
        &mut self,
        stops: &[&str],
        missing: &'static str,
    ) -> Result<Vec<Stmt>> {
        let mut statements = Vec::new();
        loop {
            if stops.iter().any(|stop| self.current.is_punctuation(stop)) {
                return Ok(statements);
            }
            if self.current.is_eof() {
                return Err(self.expected(missing, &self.current));
            }
            statements.push(self.parse_statement()?);
        }
    }

    fn is_block_terminator(&self) -> bool {
        self.current.is_eof()
            || self.current.is_punctuation("end")
            || self.current.is_punctuation("else")
            || self.current.is_punctuation("elseif")
            || self.current.is_punctuation("until")
            || self.current.is_punctuation(";")
    }

    fn parse_return(&mut self) -> Result<Return> {
        self.advance()?;

        let mut values = Vec::new();
        if !self.is_block_terminator() {
            values.push(self.parse_expression()?);
            while self.current.is_punctuation(",") {
                self.advance()?;
                values.push(self.parse_expression()?);
            }
        }

        Ok(Return { values })
    }

    fn parse_if(&mut self) -> Result<If> {
        self.advance()?;
        let condition = self.parse_expression()?;
        if !self.current.is_punctuation("then") {
            return Err(self.expected("'then' keyword", &self.current));
        }
        self.advance()?;

        let arms = &["else", "elseif", "end"];
        let statements = self.parse_statements_until(arms, "'end' keyword")?;
        let main = ConditionalBlock {
            condition,
            body: Block {
                statements,
                top_level: false,
            },
        };

        let mut elseifs = Vec::new();
        while self.current.is_punctuation("elseif") {
            self.advance()?;
            let condition = self.parse_expression()?;
            if !self.current.is_punctuation("then") {
                return Err(self.expected("'then' keyword", &self.current));
            }
            self.advance()?;
            let statements = self.parse_statements_until(arms, "'end' keyword")?;
            elseifs.push(ConditionalBlock {
                condition,
                body: Block {
                    statements,
                    top_level: false,
                },
            });
        }

        let mut else_block = None;
        if self.current.is_punctuation("else") {
            self.advance()?;
            let statements = self.parse_statements_until(&["end"], "'end' keyword")?;
            else_block = Some(Block {
                statements,
                top_level: false,
            });
        }

        if !self.current.is_punctuation("end") {
            return Err(self.expected("'end' keyword", &self.current));
        }
        self.advance()?;

        Ok(If {
            main,
            elseifs,
            else_block,
        })
    }

    fn parse_while(&mut self) -> Result<While> {
        self.advance()?;
        let condition = self.parse_expression()?;
        if !self.current.is_punctuation("do") {
            return Err(self.expected("'do' keyword", &self.current));
        }
        self.advance()?;
        self.skip_semicolons()?;

        let statements = self.parse_statements_until(&["end"], "'end' keyword")?;
        self.advance()?;

        Ok(While {
            condition,
            body: Block {
                statements,
                top_level: false,
            },
        })
    }

    fn parse_repeat(&mut self) -> Result<Repeat> {
        self.advance()?;
        self.skip_semicolons()?;

        let statements = self.parse_statements_until(&["until"], "'until' keyword")?;
        self.advance()?;
        let condition = self.parse_expression()?;

        Ok(Repeat {
            condition,
            body: Block {
                statements,
                top_level: false,
            },
        })
    }

    /// Parse a `do ... end` block
    fn parse_do_block(&mut self) -> Result<Block> {
        if !self.current.is_punctuation("do") {
            return Err(self.expected("block", &self.current));
        }
        self.advance()?;
        self.skip_semicolons()?;

        let statements = self.parse_statements_until(&["end"], "'end' keyword")?;
        self.advance()?;

        Ok(Block {
            statements,
            top_level: false,
        })
    }

    fn parse_generic_for(&mut self) -> Result<GenericFor> {
        if self.current.kind != TokenKind::Identifier {
            return Err(self.expected("identifier", &self.current));
        }
        let mut variables = vec![self.current.text.clone()];
        self.advance()?;

        while self.current.is_punctuation(",") {
            self.advance()?;
            if self.current.kind != TokenKind::Identifier {
                return Err(self.expected("identifier", &self.current));
            }
            variables.push(self.current.text.clone());
            self.advance()?;
        }

        if !self.current.is_punctuation("in") {
            return Err(self.expected("'in' keyword", &self.current));
        }
        self.advance()?;

        let iterator = self.parse_expression()?;
        let body = self.parse_do_block()?;

        Ok(GenericFor {
            variables,
            iterator,
            body,
        })
    }

    fn parse_numeric_for(&mut self) -> Result<NumericFor> {
        if self.current.kind != TokenKind::Identifier {
            return Err(self.expected("identifier", &self.current));
        }
        let variable = self.current.text.clone();
        self.advance()?;

        if !self.current.is_punctuation("=") {
            return Err(self.expected("assignment", &self.current));
        }
        self.advance()?;

        let start = self.parse_expression()?;
        if !self.current.is_punctuation(",") {
            return Err(self.expected("end point expression", &self.current));
        }
        self.advance()?;
        let end = self.parse_expression()?;

        let mut step = None;
        if self.current.is_punctuation(",") {
            self.advance()?;
            step = Some(self.parse_expression()?);
        }
        if step.is_none() && self.settings.autofill_numeric_for_step {
            step = Some(Expr::Number(NumberLiteral::new(1.0)));
        }

        let body = self.parse_do_block()?;

        Ok(NumericFor {
            variable,
            start,
            end,
            step,
            body,
        })
    }

    fn parse_for(&mut self) -> Result<Stmt> {
        self.advance()?;
        let peek = self.peek()?;
        if peek.is_punctuation(",") || peek.is_punctuation("in") {
            Ok(Stmt::GenericFor(self.parse_generic_for()?))
        } else {
            Ok(Stmt::NumericFor(self.parse_numeric_for()?))
        }
    }

    fn assignable(&self, expr: Expr, start_token: &Token) -> Result<AssignTarget> {
        match expr {
            Expr::Variable(variable) => Ok(AssignTarget::Variable(variable)),
            Expr::Access(access) => Ok(AssignTarget::Access(access)),
            _ => Err(self.expected("assignable expression", start_token)),
        }
    }

    /// Parse the rest of an assignment from an already-read first target.
    /// `certain` is set when the statement is known to be an assignment
    /// (after `local`), which permits the bare declaration form.
    fn parse_full_assignment(
        &mut self,
        certain: bool,
        start: Expr,
        start_token: &Token,
    ) -> Result<Assignment> {
        let mut targets = vec![self.assignable(start, start_token)?];

        while self.current.is_punctuation(",") {
            self.advance()?;
            let expr = self.parse_expression()?;
            targets.push(self.assignable(expr, start_token)?);
        }

        if certain && !self.current.is_punctuation("=") {
            // Local declaration without values
            let values = if self.settings.autofill_local_nil_values {
                vec![Expr::Nil; targets.len()]
            } else {
                Vec::new()
            };
            return Ok(Assignment {
                is_local: true,
                force_explicit_nil: false,
                targets,
                values,
            });
        }

        self.parse_assignment(targets)
    }

    fn parse_assignment(&mut self, targets: Vec<AssignTarget>) -> Result<Assignment> {
        if !self.current.is_punctuation("=") {
            return Err(self.expected("assignment", &self.current));
        }
        self.advance()?;

        let mut values = vec![self.parse_expression()?];
        while self.current.is_punctuation(",") {
            self.advance()?;
            values.push(self.parse_expression()?);
        }

        Ok(Assignment {
            is_local: false,
            force_explicit_nil: false,
            targets,
            values,
        })
    }

    /// Parse `function name.path:method(...) ... end` into an assignment of
    /// a function definition.
    fn parse_named_function(&mut self) -> Result<Assignment> {
        self.advance()?;
        if self.current.kind != TokenKind::Identifier {
            return Err(self.expected("identifier", &self.current));
        }
        let mut target = AssignTarget::Variable(Variable {
            name: self.current.text.clone(),
        });
        self.advance()?;

        while self.current.is_punctuation(".") {
            self.advance()?;
            if self.current.kind != TokenKind::Identifier {
                return Err(self.expected("identifier", &self.current));
            }
            target = AssignTarget::Access(TableAccess {
                table: Box::new(target_to_expr(target)),
                index: Box::new(Expr::String(StringLiteral {
                    value: self.current.text.clone(),
                })),
            });
            self.advance()?;
        }

        let mut is_method = false;
        if self.current.is_punctuation(":") {
            is_method = true;
            self.advance()?;
            if self.current.kind != TokenKind::Identifier {
                return Err(self.expected("identifier", &self.current));
            }
            target = AssignTarget::Access(TableAccess {
                table: Box::new(target_to_expr(target)),
                index: Box::new(Expr::String(StringLiteral {
                    value: self.current.text.clone(),
                })),
            });
            self.advance()?;
        }

        let func = self.parse_function_definition(true, is_method)?;
        Ok(Assignment {
            is_local: false,
            force_explicit_nil: false,
            targets: vec![target],
            values: vec![Expr::Function(func)],
        })
    }

    fn parse_primary_statement(&mut self) -> Result<Stmt> {
        if self.current.is_punctuation("break") {
            self.advance()?;
            return Ok(Stmt::Break);
        }
        if self.current.is_punctuation("return") {
            return Ok(Stmt::Return(self.parse_return()?));
        }
        if self.current.is_punctuation("if") {
            return Ok(Stmt::If(self.parse_if()?));
        }
        if self.current.is_punctuation("while") {
            return Ok(Stmt::While(self.parse_while()?));
        }
        if self.current.is_punctuation("function") {
            return Ok(Stmt::Assignment(self.parse_named_function()?));
        }
        if self.current.is_punctuation("repeat") {
            return Ok(Stmt::Repeat(self.parse_repeat()?));
        }
        if self.current.is_punctuation("for") {
            return self.parse_for();
        }
        if self.current.is_punctuation("do") {
            return Ok(Stmt::Do(self.parse_do_block()?));
        }

        if self.current.is_punctuation("local") {
            self.advance()?;
            if self.current.is_punctuation("function") {
                let mut assignment = self.parse_named_function()?;
                assignment.is_local = true;
                return Ok(Stmt::Assignment(assignment));
            }
            let start_token = self.current.clone();
            let start = self.parse_expression()?;
            let mut assignment = self.parse_full_assignment(true, start, &start_token)?;
            assignment.is_local = true;
            return Ok(Stmt::Assignment(assignment));
        }

        let start_token = self.current.clone();
        let expr = self.parse_expression()?;

        if self.current.is_punctuation("=") || self.current.is_punctuation(",") {
            let assignment = self.parse_full_assignment(false, expr, &start_token)?;
            return Ok(Stmt::Assignment(assignment));
        }

        if let Expr::Call(call) = expr {
            return Ok(Stmt::Call(call));
        }

        Err(self.expected("statement", &start_token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::pretty::ToLua;

    fn parse(source: &str) -> Block {
        parse_with(Settings::default(), source)
    }

    fn parse_with(settings: Settings, source: &str) -> Block {
        Parser::new(source, settings)
            .unwrap()
            .parse_program()
            .unwrap()
    }

    fn expr(source: &str) -> Expr {
        let mut parser = Parser::new(source, Settings::default()).unwrap();
        let expr = parser.parse_expression().unwrap();
        parser.expect_end_of_input().unwrap();
        expr
    }

    fn reprint(source: &str) -> String {
        parse(source).to_lua_one_line()
    }

    fn parse_err(source: &str) -> Error {
        Parser::new(source, Settings::default())
            .unwrap()
            .parse_program()
            .unwrap_err()
    }

    fn parse_kind(source: &str) -> ParseErrorKind {
        match parse_err(source) {
            Error::Parse(err) => err.kind,
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn bare_variables() {
        assert_eq!(expr("abc"), Expr::Variable(Variable { name: "abc".into() }));
        assert_eq!(reprint("return x"), "return x");
        assert_eq!(reprint("a = b"), "a = b");
    }

    #[test]
    fn addition() {
        assert_eq!(expr("abc + def").to_lua(), "(abc + def)");
    }

    #[test]
    fn precedence() {
        assert_eq!(expr("a + b * c").to_lua(), "(a + (b * c))");
        assert_eq!(expr("(a + b) * c").to_lua(), "((a + b) * c)");
    }

    #[test]
    fn right_associative_operators() {
        assert_eq!(
            expr("a + b * c ^ d ^ e .. f .. g").to_lua(),
            "((a + ((b * c) ^ (d ^ e))) .. (f .. g))"
        );
    }

    #[test]
    fn redundant_parentheses_are_structural_only() {
        assert_eq!(
            expr("((a + ((b * c) ^ (d ^ e))) .. (f .. g))"),
            expr("a + b * c ^ d ^ e .. f .. g")
        );
    }

    #[test]
    fn left_deep_chains() {
        assert_eq!(expr("a + b + c").to_lua(), "((a + b) + c)");
        assert_eq!(expr("a .. b .. c").to_lua(), "(a .. (b .. c))");
    }

    #[test]
    fn unary_operators() {
        assert_eq!(expr("a + -b + -(a + b)").to_lua(), "((a + (-b)) + (-(a + b)))");
        assert_eq!(expr("a + not b or c").to_lua(), "((a + (not b)) or c)");
        assert_eq!(expr("#t").to_lua(), "(#t)");
    }

    #[test]
    fn unary_wraps_postfix_chain() {
        assert_eq!(expr("-a.b(c)").to_lua(), "(-a.b(c))");
    }

    #[test]
    fn table_access() {
        assert_eq!(expr("a.b.c").to_lua(), "a.b.c");
        assert_eq!(
            expr("a[\"not identifier\"] + a.e").to_lua(),
            "(a[\"not identifier\"] + a.e)"
        );
        assert_eq!(expr("a[1 + 2]").to_lua(), "a[(1 + 2)]");
    }

    #[test]
    fn method_calls() {
        assert_eq!(expr("a:test(\"hello\")").to_lua(), "a:test(\"hello\")");
        assert_eq!(expr("a:b():c()").to_lua(), "a:b():c()");
    }

    #[test]
    fn method_call_receiver_is_first_argument() {
        let Expr::Call(call) = expr("a:test()") else {
            panic!("expected call");
        };
        assert_eq!(call.arguments, vec![Expr::Variable(Variable { name: "a".into() })]);
    }

    #[test]
    fn call_sugar() {
        assert_eq!(expr("f{1, 2}").to_lua_one_line(), "f({ 1, 2 })");
        assert_eq!(expr("f\"hi\"").to_lua(), "f(\"hi\")");
    }

    #[test]
    fn anonymous_function() {
        assert_eq!(
            expr("function(a, b) break end").to_lua_one_line(),
            "function(a, b) break end"
        );
        assert_eq!(expr("function(...) end").to_lua(), "function(...) end");
        assert_eq!(
            expr("function(a, ...) end").to_lua(),
            "function(a, ...) end"
        );
    }

    #[test]
    fn long_literals() {
        assert_eq!(expr("123LL"), Expr::Long(LongLiteral { value: 123, hex: false }));
        assert_eq!(expr("123LL").to_lua(), "123LL");
        assert_eq!(expr("0x12LL").to_lua(), "0x0012LL");
    }

    #[test]
    fn long_literals_disabled() {
        let settings = Settings {
            enable_extended_long_literals: false,
            ..Settings::default()
        };
        let err = Parser::new("return 123LL", settings)
            .unwrap()
            .parse_program()
            .unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn hex_numbers() {
        assert_eq!(
            expr("0x123"),
            Expr::Number(NumberLiteral {
                value: 291.0,
                hex: true
            })
        );
        assert_eq!(expr("0x123").to_lua(), "0x123");
    }

    #[test]
    fn malformed_numbers() {
        assert_eq!(
            parse_kind("return 1..2"),
            ParseErrorKind::MalformedNumber("1..2".into())
        );
        assert_eq!(
            parse_kind("return 0x"),
            ParseErrorKind::MalformedHexNumber("0x".into())
        );
    }

    #[test]
    fn string_sugar_compat_errors() {
        let settings = Settings {
            maintain_legacy_syntax_error_compat: true,
            ..Settings::default()
        };
        let err = Parser::new("return \"ok\":match(\"ok\")", settings)
            .unwrap()
            .parse_program()
            .unwrap_err();
        let Error::Parse(err) = err else {
            panic!("expected parse error");
        };
        assert_eq!(err.kind, ParseErrorKind::StringIndex);
        assert_eq!(err.region.start_offset, 11);
    }

    #[test]
    fn string_sugar_without_compat() {
        // Both shapes parse to the same tree, so both print the bare form
        assert_eq!(expr("\"ok\":match(\"ok\")").to_lua(), "\"ok\":match(\"ok\")");
        assert_eq!(expr("(\"ok\"):match(\"ok\")").to_lua(), "\"ok\":match(\"ok\")");
    }

    #[test]
    fn truncated_call_parentheses() {
        assert_eq!(expr("(f())").to_lua(), "(f())");
        assert_eq!(expr("(f()) + 1").to_lua(), "(f() + 1)");
        assert_eq!(expr("(f()).x").to_lua(), "f().x");
        assert_eq!(reprint("local a = (f())"), "local a = (f())");
        assert_eq!(reprint("local a = f()"), "local a = f()");
    }

    #[test]
    fn while_statement() {
        assert_eq!(reprint("while true do break end"), "while true do break end");
    }

    #[test]
    fn if_statement() {
        assert_eq!(
            reprint("if 3 + 3 then break elseif 2 + 2 then break else break end"),
            "if (3 + 3) then break elseif (2 + 2) then break else break end"
        );
    }

    #[test]
    fn repeat_statement() {
        assert_eq!(reprint("repeat break until x"), "repeat break until x");
    }

    #[test]
    fn do_statement() {
        assert_eq!(reprint("do break end"), "do break end");
    }

    #[test]
    fn assignments() {
        assert_eq!(reprint("a, b = 3 * 3, 2"), "a, b = (3 * 3), 2");
        assert_eq!(reprint("local a, b = \"a\", \"b\""), "local a, b = \"a\", \"b\"");
        assert_eq!(reprint("a.b[1] = 2"), "a.b[1] = 2");
    }

    #[test]
    fn local_declaration() {
        let block = parse("local a, b");
        let Stmt::Assignment(assign) = &block.statements[0] else {
            panic!("expected assignment");
        };
        assert_eq!(assign.values, vec![Expr::Nil, Expr::Nil]);
        assert!(assign.is_local_declaration());
        assert_eq!(reprint("local a, b"), "local a, b");

        let settings = Settings {
            autofill_local_nil_values: false,
            ..Settings::default()
        };
        let block = parse_with(settings, "local a, b");
        let Stmt::Assignment(assign) = &block.statements[0] else {
            panic!("expected assignment");
        };
        assert!(assign.values.is_empty());
        assert!(assign.is_local_declaration());
    }

    #[test]
    fn named_functions() {
        assert_eq!(
            reprint("function test(a, b) print(a) print(b) end"),
            "function test(a, b) print(a) print(b) end"
        );
        assert_eq!(
            reprint("local function test() break end"),
            "local function test() break end"
        );
        assert_eq!(
            reprint("function a.b.c:m(x) break end"),
            "function a.b.c:m(x) break end"
        );
    }

    #[test]
    fn method_definition_gets_self() {
        let block = parse("function a:m() break end");
        let Stmt::Assignment(assign) = &block.statements[0] else {
            panic!("expected assignment");
        };
        let Expr::Function(func) = &assign.values[0] else {
            panic!("expected function");
        };
        assert_eq!(func.parameters, vec!["self".to_string()]);
        assert!(func.implicit_self);
    }

    #[test]
    fn function_assignment_normalizes_to_named() {
        assert_eq!(
            reprint("local f = function() break end"),
            "local function f() break end"
        );
    }

    #[test]
    fn tables() {
        assert_eq!(reprint("t = {}"), "t = {}");
        assert_eq!(reprint("t = { 123 }"), "t = { 123 }");
        assert_eq!(reprint("t = { a = 123 }"), "t = { a = 123 }");
        assert_eq!(reprint("t = { [1 + 2] = 123 }"), "t = { [(1 + 2)] = 123 }");
        assert_eq!(expr("{1, 2}").to_lua(), "{\n    1,\n    2\n}");
    }

    #[test]
    fn table_sequential_keys() {
        // Explicit keys interleave with the running sequential index
        assert_eq!(
            expr("{1, [5] = 2, 3}").to_lua_one_line(),
            "{ 1, [5] = 2, 3 }"
        );
        assert_eq!(
            expr("{[1] = 1, [2] = 2}").to_lua_one_line(),
            "{ [1] = 1, [2] = 2 }"
        );
    }

    #[test]
    fn table_trailing_comma() {
        let Expr::Table(table) = expr("{1, 2,}") else {
            panic!("expected table");
        };
        assert_eq!(table.entries.len(), 2);
    }

    #[test]
    fn table_autofill_disabled() {
        let settings = Settings {
            autofill_sequential_table_keys: false,
            ..Settings::default()
        };
        let block = parse_with(settings, "t = {1, 2}");
        let Stmt::Assignment(assign) = &block.statements[0] else {
            panic!("expected assignment");
        };
        let Expr::Table(table) = &assign.values[0] else {
            panic!("expected table");
        };
        assert!(table.entries.iter().all(|entry| entry.key.is_none()));
    }

    #[test]
    fn numeric_for() {
        let block = parse("for i = 1, 10 do break end");
        let Stmt::NumericFor(stmt) = &block.statements[0] else {
            panic!("expected numeric for");
        };
        assert_eq!(stmt.step, Some(Expr::Number(NumberLiteral::new(1.0))));
        assert_eq!(reprint("for i = 1, 10 do break end"), "for i = 1, 10 do break end");
        assert_eq!(
            reprint("for i = 1, 10, 2 do break end"),
            "for i = 1, 10, 2 do break end"
        );

        let settings = Settings {
            autofill_numeric_for_step: false,
            ..Settings::default()
        };
        let block = parse_with(settings, "for i = 1, 10 do break end");
        let Stmt::NumericFor(stmt) = &block.statements[0] else {
            panic!("expected numeric for");
        };
        assert_eq!(stmt.step, None);
    }

    #[test]
    fn generic_for() {
        assert_eq!(
            reprint("for k, v in pairs(t) do break end"),
            "for k, v in pairs(t) do break end"
        );
    }

    #[test]
    fn empty_returns() {
        assert_eq!(reprint("return"), "return");
        assert_eq!(reprint("return;"), "return");
        assert_eq!(reprint("if x then return end"), "if x then return end");
        assert_eq!(
            reprint("if x then return else return end"),
            "if x then return else return end"
        );
        assert_eq!(reprint("repeat return until x"), "repeat return until x");
        assert_eq!(reprint("return 1, 2"), "return 1, 2");
    }

    #[test]
    fn semicolons_between_statements() {
        let block = parse("a = 1; b = 2;");
        assert_eq!(block.statements.len(), 2);
    }

    #[test]
    fn missing_end_is_an_error() {
        assert!(matches!(parse_err("while true do break"), Error::Parse(_)));
        assert!(matches!(parse_err("if x then break"), Error::Parse(_)));
        assert!(matches!(parse_err("function f() break"), Error::Parse(_)));
        assert!(matches!(parse_err("repeat break"), Error::Parse(_)));
    }

    #[test]
    fn statement_errors() {
        let Error::Parse(err) = parse_err("a") else {
            panic!("expected parse error");
        };
        assert_eq!(err.region.start_offset, 0);
        assert!(matches!(
            err.kind,
            ParseErrorKind::UnexpectedToken {
                expected: "statement",
                ..
            }
        ));

        assert!(matches!(
            parse_kind("f() = 1"),
            ParseErrorKind::UnexpectedToken {
                expected: "assignable expression",
                ..
            }
        ));
    }

    #[test]
    fn unary_only_operator_in_binary_position() {
        assert!(matches!(
            parse_kind("return a not b"),
            ParseErrorKind::UnexpectedToken {
                expected: "binary operator",
                ..
            }
        ));
    }
}
