//! Printing of AST nodes back to Lua source
//!
//! Output is idiomatically minimal rather than byte-faithful: parentheses
//! not implied by tree structure are dropped, and sugar (dot access,
//! method-style calls, named functions, sequential table entries, default
//! steps, bare local declarations) is restored wherever the tree shape
//! allows. Binary and unary operations always print parenthesized, so
//! evaluation order is visible and stable under reparse.

// Literal values are compared and narrowed exactly when printing.
#![allow(clippy::float_cmp, clippy::cast_possible_truncation)]

use super::expr::{
    Expr, FunctionCall, FunctionDefinition, NumberLiteral, TableAccess, TableConstructor,
    TableEntry,
};
use super::stmt::{
    AssignTarget, Assignment, Block, ConditionalBlock, GenericFor, If, NumericFor, Repeat, Return,
    Stmt, While,
};
use crate::lexer::is_valid_identifier;

/// Default indentation: 4 spaces
const INDENT: &str = "    ";

/// An indentation-aware output sink.
///
/// `write_line` starts a fresh line at the current indent depth; in
/// one-line mode it degrades to a single space instead. The indent depth
/// is floored at zero.
#[derive(Debug)]
pub struct IndentWriter {
    out: String,
    indent: usize,
    one_line: bool,
}

impl IndentWriter {
    /// Create a writer producing multi-line output
    #[must_use]
    pub fn new() -> Self {
        Self {
            out: String::new(),
            indent: 0,
            one_line: false,
        }
    }

    /// Create a writer that renders every line break as a single space
    #[must_use]
    pub fn one_line() -> Self {
        Self {
            out: String::new(),
            indent: 0,
            one_line: true,
        }
    }

    pub fn write(&mut self, s: &str) {
        self.out.push_str(s);
    }

    pub fn write_line(&mut self) {
        if self.one_line {
            self.out.push(' ');
            return;
        }
        self.out.push('\n');
        for _ in 0..self.indent {
            self.out.push_str(INDENT);
        }
    }

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    pub fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    /// Consume the writer, returning the rendered output
    #[must_use]
    pub fn finish(self) -> String {
        self.out
    }
}

impl Default for IndentWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Rendering of an AST node as Lua source
pub trait ToLua {
    /// Write this node to the given sink
    fn write(&self, w: &mut IndentWriter);

    /// Render as multi-line source
    fn to_lua(&self) -> String {
        let mut w = IndentWriter::new();
        self.write(&mut w);
        w.finish()
    }

    /// Render on a single line
    fn to_lua_one_line(&self) -> String {
        let mut w = IndentWriter::one_line();
        self.write(&mut w);
        w.finish()
    }
}

impl ToLua for Expr {
    fn write(&self, w: &mut IndentWriter) {
        match self {
            Expr::Variable(var) => w.write(&var.name),
            Expr::Nil => w.write("nil"),
            Expr::Varargs => w.write("..."),
            Expr::Bool(value) => w.write(if *value { "true" } else { "false" }),
            Expr::Unary(unary) => {
                w.write("(");
                w.write(unary.op.as_str());
                unary.operand.write(w);
                w.write(")");
            }
            Expr::Binary(binary) => {
                w.write("(");
                binary.lhs.write(w);
                w.write(" ");
                w.write(binary.op.as_str());
                w.write(" ");
                binary.rhs.write(w);
                w.write(")");
            }
            Expr::String(lit) => quote_string(w, &lit.value),
            Expr::Number(num) => write_number(w, num),
            Expr::Long(long) => {
                // Negative values have no reparsable hex form, print decimal
                if long.hex && long.value >= 0 {
                    w.write(&format!("0x{:04X}LL", long.value));
                } else {
                    w.write(&format!("{}LL", long.value));
                }
            }
            Expr::Access(access) => write_access(access, w),
            Expr::Call(call) => write_call(call, w),
            Expr::Table(table) => write_table(table, w),
            Expr::Function(func) => write_function(func, w, false),
        }
    }
}

impl ToLua for Stmt {
    fn write(&self, w: &mut IndentWriter) {
        match self {
            Stmt::Call(call) => write_call(call, w),
            Stmt::Assignment(assign) => write_assignment(assign, w),
            Stmt::Break => w.write("break"),
            Stmt::Return(ret) => write_return(ret, w),
            Stmt::Do(block) => write_block(block, w, true),
            Stmt::If(stmt) => write_if(stmt, w),
            Stmt::While(stmt) => write_while(stmt, w),
            Stmt::Repeat(stmt) => write_repeat(stmt, w),
            Stmt::NumericFor(stmt) => write_numeric_for(stmt, w),
            Stmt::GenericFor(stmt) => write_generic_for(stmt, w),
        }
    }
}

impl ToLua for Block {
    fn write(&self, w: &mut IndentWriter) {
        write_block(self, w, true);
    }
}

impl ToLua for AssignTarget {
    fn write(&self, w: &mut IndentWriter) {
        match self {
            AssignTarget::Variable(var) => w.write(&var.name),
            AssignTarget::Access(access) => write_access(access, w),
        }
    }
}

impl ToLua for ConditionalBlock {
    fn write(&self, w: &mut IndentWriter) {
        write_conditional(self, w);
    }
}

impl ToLua for TableEntry {
    fn write(&self, w: &mut IndentWriter) {
        write_entry(self, w, false);
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_lua())
    }
}

impl std::fmt::Display for Stmt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_lua())
    }
}

impl std::fmt::Display for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_lua())
    }
}

/// Emit a double-quoted string. Control characters get their named escapes,
/// other non-printable ASCII gets 3-digit decimal escapes; anything above
/// ASCII passes through untouched.
fn quote_string(w: &mut IndentWriter, value: &str) {
    let mut s = String::with_capacity(value.len() + 2);
    s.push('"');
    for c in value.chars() {
        match c {
            '\n' => s.push_str("\\n"),
            '\t' => s.push_str("\\t"),
            '\r' => s.push_str("\\r"),
            '\x07' => s.push_str("\\a"),
            '\x08' => s.push_str("\\b"),
            '\x0c' => s.push_str("\\f"),
            '\x0b' => s.push_str("\\v"),
            '\\' => s.push_str("\\\\"),
            '"' => s.push_str("\\\""),
            c if (' '..='~').contains(&c) || c as u32 > 128 => s.push(c),
            c => s.push_str(&format!("\\{:03}", c as u32)),
        }
    }
    s.push('"');
    w.write(&s);
}

fn write_number(w: &mut IndentWriter, num: &NumberLiteral) {
    if num.hex {
        w.write(&format!("0x{:X}", num.value as i64));
    } else {
        w.write(&format!("{}", num.value));
    }
}

fn is_literal_one(expr: &Expr) -> bool {
    matches!(expr, Expr::Number(num) if num.value == 1.0)
}

fn write_access(access: &TableAccess, w: &mut IndentWriter) {
    if let Expr::String(lit) = &*access.index {
        if is_valid_identifier(&lit.value) {
            write_access_base(&access.table, w);
            w.write(".");
            w.write(&lit.value);
            return;
        }
    }
    write_access_base(&access.table, w);
    w.write("[");
    access.index.write(w);
    w.write("]");
}

// A string literal base must be parenthesized; `"x".y` is not valid syntax.
fn write_access_base(table: &Expr, w: &mut IndentWriter) {
    let needs_parens = matches!(table, Expr::String(_));
    if needs_parens {
        w.write("(");
    }
    table.write(w);
    if needs_parens {
        w.write(")");
    }
}

fn write_call(call: &FunctionCall, w: &mut IndentWriter) {
    if call.truncate_returns {
        w.write("(");
    }

    match method_sugar(call) {
        Some((obj, method)) => write_method_call(call, obj, method, w),
        None => write_generic_call(call, w),
    }

    if call.truncate_returns {
        w.write(")");
    }
}

/// Method-style output (`obj:name(...)`) applies when the callee is a table
/// access whose table structurally equals the first argument and whose
/// index is an identifier-valid string.
fn method_sugar(call: &FunctionCall) -> Option<(&Expr, &str)> {
    let Expr::Access(access) = &*call.callee else {
        return None;
    };
    let first = call.arguments.first()?;
    if *access.table != *first {
        return None;
    }
    match &*access.index {
        Expr::String(lit) if is_valid_identifier(&lit.value) => {
            Some((&access.table, &lit.value))
        }
        _ => None,
    }
}

fn write_method_call(call: &FunctionCall, obj: &Expr, method: &str, w: &mut IndentWriter) {
    write_callee(obj, w);
    w.write(":");
    w.write(method);
    w.write("(");
    for (i, arg) in call.arguments.iter().skip(1).enumerate() {
        if i > 0 {
            w.write(", ");
        }
        arg.write(w);
    }
    w.write(")");
}

fn write_generic_call(call: &FunctionCall, w: &mut IndentWriter) {
    write_callee(&call.callee, w);
    w.write("(");
    for (i, arg) in call.arguments.iter().enumerate() {
        if i > 0 {
            w.write(", ");
        }
        arg.write(w);
    }
    w.write(")");
}

// An anonymous function in callee position needs wrapping parentheses.
fn write_callee(callee: &Expr, w: &mut IndentWriter) {
    let needs_parens = matches!(callee, Expr::Function(_));
    if needs_parens {
        w.write("(");
    }
    callee.write(w);
    if needs_parens {
        w.write(")");
    }
}

fn write_table(table: &TableConstructor, w: &mut IndentWriter) {
    if table.entries.is_empty() {
        w.write("{}");
        return;
    }

    if let [entry] = table.entries.as_slice() {
        w.write("{ ");
        let skip_key = !entry.explicit_key
            && entry.key.as_ref().is_some_and(is_literal_one);
        write_entry(entry, w, skip_key);
        w.write(" }");
        return;
    }

    // The running sequential index advances only across entries whose key it
    // elides, so explicit keys in between keep later elisions honest.
    let mut seq_idx = 1i64;

    w.write("{");
    w.indent();
    for (i, entry) in table.entries.iter().enumerate() {
        w.write_line();

        let is_sequential = !entry.explicit_key
            && entry
                .key
                .as_ref()
                .is_some_and(|key| matches!(key, Expr::Number(num) if num.value == seq_idx as f64));
        if is_sequential {
            seq_idx += 1;
        }

        write_entry(entry, w, is_sequential);
        if i < table.entries.len() - 1 {
            w.write(",");
        }
    }
    w.dedent();
    w.write_line();
    w.write("}");
}

fn write_entry(entry: &TableEntry, w: &mut IndentWriter, skip_key: bool) {
    let Some(key) = &entry.key else {
        entry.value.write(w);
        return;
    };
    if skip_key {
        entry.value.write(w);
        return;
    }

    if let Expr::String(lit) = key {
        if is_valid_identifier(&lit.value) {
            w.write(&lit.value);
            w.write(" = ");
            entry.value.write(w);
            return;
        }
    }

    w.write("[");
    key.write(w);
    w.write("]");
    w.write(" = ");
    entry.value.write(w);
}

fn write_function(func: &FunctionDefinition, w: &mut IndentWriter, from_named: bool) {
    if !from_named {
        w.write("function");
    }
    w.write("(");

    // Named method syntax re-implies the leading self parameter.
    let skip = usize::from(func.implicit_self && from_named);
    let mut emitted = 0;
    for param in func.parameters.iter().skip(skip) {
        if emitted > 0 {
            w.write(", ");
        }
        w.write(param);
        emitted += 1;
    }
    if func.varargs {
        if emitted > 0 {
            w.write(", ");
        }
        w.write("...");
    }
    w.write(")");

    if func.body.is_empty() {
        w.write(" ");
    } else {
        w.indent();
        w.write_line();
        write_block(&func.body, w, false);
        w.dedent();
        w.write_line();
    }
    w.write("end");
}

fn write_block(block: &Block, w: &mut IndentWriter, alone: bool) {
    let alone = alone && !block.top_level;

    if alone {
        w.write("do");
        w.indent();
        w.write_line();
    }
    for (i, stmt) in block.statements.iter().enumerate() {
        stmt.write(w);
        if i < block.statements.len() - 1 {
            w.write_line();
        }
    }
    if alone {
        w.dedent();
        w.write_line();
        w.write("end");
    }
}

fn write_return(ret: &Return, w: &mut IndentWriter) {
    w.write("return");
    if !ret.values.is_empty() {
        w.write(" ");
    }
    for (i, value) in ret.values.iter().enumerate() {
        if i > 0 {
            w.write(", ");
        }
        value.write(w);
    }
}

fn write_conditional(cond: &ConditionalBlock, w: &mut IndentWriter) {
    w.write("if ");
    cond.condition.write(w);
    w.write(" then");
    w.indent();
    w.write_line();
    write_block(&cond.body, w, false);
    w.dedent();
    w.write_line();
}

fn write_if(stmt: &If, w: &mut IndentWriter) {
    write_conditional(&stmt.main, w);
    for elseif in &stmt.elseifs {
        // "else" + "if ..." fuses into "elseif ..."
        w.write("else");
        write_conditional(elseif, w);
    }
    if let Some(else_block) = &stmt.else_block {
        w.write("else");
        w.indent();
        w.write_line();
        write_block(else_block, w, false);
        w.dedent();
        w.write_line();
    }
    w.write("end");
}

fn write_while(stmt: &While, w: &mut IndentWriter) {
    w.write("while ");
    stmt.condition.write(w);
    w.write(" do");
    w.indent();
    w.write_line();
    write_block(&stmt.body, w, false);
    w.dedent();
    w.write_line();
    w.write("end");
}

fn write_repeat(stmt: &Repeat, w: &mut IndentWriter) {
    w.write("repeat");
    w.indent();
    w.write_line();
    write_block(&stmt.body, w, false);
    w.dedent();
    w.write_line();
    w.write("until ");
    stmt.condition.write(w);
}

fn write_numeric_for(stmt: &NumericFor, w: &mut IndentWriter) {
    w.write("for ");
    w.write(&stmt.variable);
    w.write(" = ");
    stmt.start.write(w);
    w.write(", ");
    stmt.end.write(w);
    if let Some(step) = &stmt.step {
        if !is_literal_one(step) {
            w.write(", ");
            step.write(w);
        }
    }
    w.write(" do");
    w.indent();
    w.write_line();
    write_block(&stmt.body, w, false);
    w.dedent();
    w.write_line();
    w.write("end");
}

fn write_generic_for(stmt: &GenericFor, w: &mut IndentWriter) {
    w.write("for ");
    for (i, name) in stmt.variables.iter().enumerate() {
        if i > 0 {
            w.write(", ");
        }
        w.write(name);
    }
    w.write(" in ");
    stmt.iterator.write(w);
    w.write(" do");
    w.indent();
    w.write_line();
    write_block(&stmt.body, w, false);
    w.dedent();
    w.write_line();
    w.write("end");
}

fn write_assignment(assign: &Assignment, w: &mut IndentWriter) {
    if assign.is_local {
        w.write("local ");
    }

    if assign.targets.len() == 1 && assign.values.len() == 1 {
        if let Expr::Function(func) = &assign.values[0] {
            match &assign.targets[0] {
                AssignTarget::Variable(var) if is_valid_identifier(&var.name) => {
                    write_named_function(&var.name, func, w);
                    return;
                }
                AssignTarget::Access(access) => {
                    if let Some(name) = identifier_access_chain(access, func.implicit_self) {
                        write_named_function(&name, func, w);
                        return;
                    }
                }
                AssignTarget::Variable(_) => {}
            }
        }
    }

    write_generic_assignment(assign, w);
}

fn write_named_function(name: &str, func: &FunctionDefinition, w: &mut IndentWriter) {
    w.write("function ");
    w.write(name);
    write_function(func, w, true);
}

fn write_generic_assignment(assign: &Assignment, w: &mut IndentWriter) {
    // A local declaration never prints named-function style; that shape
    // always carries an assigned value.
    for (i, target) in assign.targets.iter().enumerate() {
        if i > 0 {
            w.write(", ");
        }
        target.write(w);
    }

    if assign.is_local_declaration() {
        return;
    }

    w.write(" = ");
    for (i, value) in assign.values.iter().enumerate() {
        if i > 0 {
            w.write(", ");
        }
        value.write(w);
    }

    if assign.force_explicit_nil && assign.values.len() < assign.targets.len() {
        if !assign.values.is_empty() {
            w.write(", ");
        }
        let fill = assign.targets.len() - assign.values.len();
        for i in 0..fill {
            w.write("nil");
            if i < fill - 1 {
                w.write(", ");
            }
        }
    }
}

/// Render a target chain like `a.b.c` (or `a.b:c` for a method definition)
/// if every link is an identifier-valid string key over variables; any other
/// shape disqualifies the named-function sugar.
fn identifier_access_chain(access: &TableAccess, method_style: bool) -> Option<String> {
    let mut s = String::new();
    if chain_into(access, &mut s, method_style) {
        Some(s)
    } else {
        None
    }
}

fn chain_into(access: &TableAccess, s: &mut String, method_top: bool) -> bool {
    match &*access.table {
        Expr::Access(inner) => {
            if !chain_into(inner, s, false) {
                return false;
            }
        }
        Expr::Variable(var) => s.push_str(&var.name),
        _ => return false,
    }

    s.push(if method_top { ':' } else { '.' });

    match &*access.index {
        Expr::String(lit) if is_valid_identifier(&lit.value) => {
            s.push_str(&lit.value);
            true
        }
        _ => false,
    }
}
