//! AST traversal
//!
//! [`Visitor`] offers one hook per node kind with empty defaults; `accept`
//! dispatches the hook for a node and then descends pre-order. [`VisitMut`]
//! is the coarser mutable counterpart used for rewriting: overriding
//! `visit_expr_mut` and delegating to [`walk_expr_mut`] visits every
//! expression in the tree with the ability to replace it wholesale.

use super::expr::{
    BinaryExpr, Expr, FunctionCall, FunctionDefinition, LongLiteral, NumberLiteral, StringLiteral,
    TableAccess, TableConstructor, TableEntry, UnaryExpr, Variable,
};
use super::stmt::{
    AssignTarget, Assignment, Block, ConditionalBlock, GenericFor, If, NumericFor, Repeat, Return,
    Stmt, While,
};

/// Read-only visitor with a hook per node kind
#[allow(unused_variables)]
pub trait Visitor {
    fn visit_variable(&mut self, node: &Variable) {}
    fn visit_nil(&mut self) {}
    fn visit_varargs(&mut self) {}
    fn visit_bool(&mut self, value: bool) {}
    fn visit_unary(&mut self, node: &UnaryExpr) {}
    fn visit_binary(&mut self, node: &BinaryExpr) {}
    fn visit_string(&mut self, node: &StringLiteral) {}
    fn visit_number(&mut self, node: &NumberLiteral) {}
    fn visit_long(&mut self, node: &LongLiteral) {}
    fn visit_access(&mut self, node: &TableAccess) {}
    fn visit_call(&mut self, node: &FunctionCall) {}
    fn visit_table(&mut self, node: &TableConstructor) {}
    fn visit_table_entry(&mut self, node: &TableEntry) {}
    fn visit_break(&mut self) {}
    fn visit_return(&mut self, node: &Return) {}
    fn visit_block(&mut self, node: &Block) {}
    fn visit_conditional(&mut self, node: &ConditionalBlock) {}
    fn visit_if(&mut self, node: &If) {}
    fn visit_while(&mut self, node: &While) {}
    fn visit_repeat(&mut self, node: &Repeat) {}
    fn visit_function(&mut self, node: &FunctionDefinition) {}
    fn visit_assignment(&mut self, node: &Assignment) {}
    fn visit_numeric_for(&mut self, node: &NumericFor) {}
    fn visit_generic_for(&mut self, node: &GenericFor) {}
}

impl Expr {
    /// Dispatch this node's hook, then descend pre-order
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        match self {
            Expr::Variable(node) => visitor.visit_variable(node),
            Expr::Nil => visitor.visit_nil(),
            Expr::Varargs => visitor.visit_varargs(),
            Expr::Bool(value) => visitor.visit_bool(*value),
            Expr::Unary(node) => {
                visitor.visit_unary(node);
                node.operand.accept(visitor);
            }
            Expr::Binary(node) => {
                visitor.visit_binary(node);
                node.lhs.accept(visitor);
                node.rhs.accept(visitor);
            }
            Expr::String(node) => visitor.visit_string(node),
            Expr::Number(node) => visitor.visit_number(node),
            Expr::Long(node) => visitor.visit_long(node),
            Expr::Access(node) => {
                visitor.visit_access(node);
                node.table.accept(visitor);
                node.index.accept(visitor);
            }
            Expr::Call(node) => {
                visitor.visit_call(node);
                node.callee.accept(visitor);
                for arg in &node.arguments {
                    arg.accept(visitor);
                }
            }
            Expr::Table(node) => {
                visitor.visit_table(node);
                for entry in &node.entries {
                    entry.accept(visitor);
                }
            }
            Expr::Function(node) => {
                visitor.visit_function(node);
                node.body.accept(visitor);
            }
        }
    }
}

impl TableEntry {
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        visitor.visit_table_entry(self);
        if let Some(key) = &self.key {
            key.accept(visitor);
        }
        self.value.accept(visitor);
    }
}

impl AssignTarget {
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        match self {
            AssignTarget::Variable(node) => visitor.visit_variable(node),
            AssignTarget::Access(node) => {
                visitor.visit_access(node);
                node.table.accept(visitor);
                node.index.accept(visitor);
            }
        }
    }
}

impl ConditionalBlock {
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        visitor.visit_conditional(self);
        self.condition.accept(visitor);
        self.body.accept(visitor);
    }
}

impl Block {
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        visitor.visit_block(self);
        for stmt in &self.statements {
            stmt.accept(visitor);
        }
    }
}

impl Stmt {
    /// Dispatch this node's hook, then descend pre-order
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        match self {
            Stmt::Call(node) => {
                visitor.visit_call(node);
                node.callee.accept(visitor);
                for arg in &node.arguments {
                    arg.accept(visitor);
                }
            }
            Stmt::Assignment(node) => {
                visitor.visit_assignment(node);
                for target in &node.targets {
                    target.accept(visitor);
                }
                for value in &node.values {
                    value.accept(visitor);
                }
            }
            Stmt::Break => visitor.visit_break(),
            Stmt::Return(node) => {
                visitor.visit_return(node);
                for value in &node.values {
                    value.accept(visitor);
                }
            }
            Stmt::Do(node) => node.accept(visitor),
            Stmt::If(node) => {
                visitor.visit_if(node);
                node.main.accept(visitor);
                for elseif in &node.elseifs {
                    elseif.accept(visitor);
                }
                if let Some(else_block) = &node.else_block {
                    else_block.accept(visitor);
                }
            }
            Stmt::While(node) => {
                visitor.visit_while(node);
                node.condition.accept(visitor);
                node.body.accept(visitor);
            }
            Stmt::Repeat(node) => {
                visitor.visit_repeat(node);
                node.body.accept(visitor);
                node.condition.accept(visitor);
            }
            Stmt::NumericFor(node) => {
                visitor.visit_numeric_for(node);
                node.start.accept(visitor);
                node.end.accept(visitor);
                if let Some(step) = &node.step {
                    step.accept(visitor);
                }
                node.body.accept(visitor);
            }
            Stmt::GenericFor(node) => {
                visitor.visit_generic_for(node);
                node.iterator.accept(visitor);
                node.body.accept(visitor);
            }
        }
    }
}

/// Mutable traversal for tree rewriting. Override a hook to inspect or
/// replace nodes; call the matching `walk_*` function to keep descending.
pub trait VisitMut {
    fn visit_expr_mut(&mut self, expr: &mut Expr) {
        walk_expr_mut(self, expr);
    }

    fn visit_stmt_mut(&mut self, stmt: &mut Stmt) {
        walk_stmt_mut(self, stmt);
    }

    fn visit_block_mut(&mut self, block: &mut Block) {
        walk_block_mut(self, block);
    }

    fn visit_target_mut(&mut self, target: &mut AssignTarget) {
        walk_target_mut(self, target);
    }
}

pub fn walk_expr_mut<V: VisitMut + ?Sized>(visitor: &mut V, expr: &mut Expr) {
    match expr {
        Expr::Variable(_)
        | Expr::Nil
        | Expr::Varargs
        | Expr::Bool(_)
        | Expr::String(_)
        | Expr::Number(_)
        | Expr::Long(_) => {}
        Expr::Unary(node) => visitor.visit_expr_mut(&mut node.operand),
        Expr::Binary(node) => {
            visitor.visit_expr_mut(&mut node.lhs);
            visitor.visit_expr_mut(&mut node.rhs);
        }
        Expr::Access(node) => {
            visitor.visit_expr_mut(&mut node.table);
            visitor.visit_expr_mut(&mut node.index);
        }
        Expr::Call(node) => {
            visitor.visit_expr_mut(&mut node.callee);
            for arg in &mut node.arguments {
                visitor.visit_expr_mut(arg);
            }
        }
        Expr::Table(node) => {
            for entry in &mut node.entries {
                if let Some(key) = &mut entry.key {
                    visitor.visit_expr_mut(key);
                }
                visitor.visit_expr_mut(&mut entry.value);
            }
        }
        Expr::Function(node) => visitor.visit_block_mut(&mut node.body),
    }
}

pub fn walk_stmt_mut<V: VisitMut + ?Sized>(visitor: &mut V, stmt: &mut Stmt) {
    match stmt {
        Stmt::Call(node) => {
            visitor.visit_expr_mut(&mut node.callee);
            for arg in &mut node.arguments {
                visitor.visit_expr_mut(arg);
            }
        }
        Stmt::Assignment(node) => {
            for target in &mut node.targets {
                visitor.visit_target_mut(target);
            }
            for value in &mut node.values {
                visitor.visit_expr_mut(value);
            }
        }
        Stmt::Break => {}
        Stmt::Return(node) => {
            for value in &mut node.values {
                visitor.visit_expr_mut(value);
            }
        }
        Stmt::Do(node) => visitor.visit_block_mut(node),
        Stmt::If(node) => {
            visitor.visit_expr_mut(&mut node.main.condition);
            visitor.visit_block_mut(&mut node.main.body);
            for elseif in &mut node.elseifs {
                visitor.visit_expr_mut(&mut elseif.condition);
                visitor.visit_block_mut(&mut elseif.body);
            }
            if let Some(else_block) = &mut node.else_block {
                visitor.visit_block_mut(else_block);
            }
        }
        Stmt::While(node) => {
            visitor.visit_expr_mut(&mut node.condition);
            visitor.visit_block_mut(&mut node.body);
        }
        Stmt::Repeat(node) => {
            visitor.visit_block_mut(&mut node.body);
            visitor.visit_expr_mut(&mut node.condition);
        }
        Stmt::NumericFor(node) => {
            visitor.visit_expr_mut(&mut node.start);
            visitor.visit_expr_mut(&mut node.end);
            if let Some(step) = &mut node.step {
                visitor.visit_expr_mut(step);
            }
            visitor.visit_block_mut(&mut node.body);
        }
        Stmt::GenericFor(node) => {
            visitor.visit_expr_mut(&mut node.iterator);
            visitor.visit_block_mut(&mut node.body);
        }
    }
}

pub fn walk_block_mut<V: VisitMut + ?Sized>(visitor: &mut V, block: &mut Block) {
    for stmt in &mut block.statements {
        visitor.visit_stmt_mut(stmt);
    }
}

pub fn walk_target_mut<V: VisitMut + ?Sized>(visitor: &mut V, target: &mut AssignTarget) {
    match target {
        AssignTarget::Variable(_) => {}
        AssignTarget::Access(node) => {
            visitor.visit_expr_mut(&mut node.table);
            visitor.visit_expr_mut(&mut node.index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::pretty::ToLua;
    use crate::ast::{BinaryOpKind, FunctionCall};

    fn var(name: &str) -> Expr {
        Expr::Variable(Variable { name: name.into() })
    }

    #[test]
    fn visitor_counts_variables() {
        struct Counter(usize);
        impl Visitor for Counter {
            fn visit_variable(&mut self, _node: &Variable) {
                self.0 += 1;
            }
        }

        let expr = Expr::Binary(BinaryExpr {
            op: BinaryOpKind::Add,
            lhs: Box::new(var("a")),
            rhs: Box::new(Expr::Call(FunctionCall {
                callee: Box::new(var("f")),
                arguments: vec![var("b"), Expr::Nil],
                truncate_returns: false,
            })),
        });

        let mut counter = Counter(0);
        expr.accept(&mut counter);
        assert_eq!(counter.0, 3);
    }

    #[test]
    fn visit_mut_renames_variables() {
        struct Rename;
        impl VisitMut for Rename {
            fn visit_expr_mut(&mut self, expr: &mut Expr) {
                if let Expr::Variable(var) = expr {
                    if var.name == "old" {
                        var.name = "new".into();
                    }
                }
                walk_expr_mut(self, expr);
            }
        }

        let mut stmt = Stmt::Return(Return {
            values: vec![Expr::Binary(BinaryExpr {
                op: BinaryOpKind::Concat,
                lhs: Box::new(var("old")),
                rhs: Box::new(var("other")),
            })],
        });

        Rename.visit_stmt_mut(&mut stmt);
        assert_eq!(stmt.to_lua(), "return (new .. other)");
    }
}
