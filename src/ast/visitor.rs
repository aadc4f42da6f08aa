//! Double-dispatch traversal over the AST.
//!
//! A [`Visitor`] has one callback per concrete node kind. Nodes dispatch to
//! the matching callback through `accept`; the `match` inside `accept` is
//! exhaustive, so adding a node kind forces every visitor to handle it.

use crate::ast::{BinOp, Expr, FunctionDecl, Program, Statement};

pub trait Visitor {
    type Output;

    fn visit_program(&mut self, program: &Program) -> Self::Output;

    // Statements
    fn visit_hotkey_binding(&mut self, hotkey: &Expr, action: &Statement) -> Self::Output;
    fn visit_block(&mut self, statements: &[Statement]) -> Self::Output;
    fn visit_expression_statement(&mut self, expr: &Expr) -> Self::Output;
    fn visit_let(&mut self, name: &str, value: Option<&Expr>) -> Self::Output;
    fn visit_if(
        &mut self,
        condition: &Expr,
        consequence: &Statement,
        alternative: Option<&Statement>,
    ) -> Self::Output;
    fn visit_while(&mut self, condition: &Expr, body: &Statement) -> Self::Output;
    fn visit_return(&mut self, value: Option<&Expr>) -> Self::Output;
    fn visit_function(&mut self, decl: &FunctionDecl) -> Self::Output;

    // Expressions
    fn visit_identifier(&mut self, name: &str) -> Self::Output;
    fn visit_number(&mut self, value: f64) -> Self::Output;
    fn visit_string(&mut self, value: &str) -> Self::Output;
    fn visit_hotkey(&mut self, text: &str) -> Self::Output;
    fn visit_binary(&mut self, left: &Expr, op: BinOp, right: &Expr) -> Self::Output;
    fn visit_call(&mut self, callee: &Expr, args: &[Expr]) -> Self::Output;
    fn visit_member(&mut self, object: &Expr, property: &Expr) -> Self::Output;
    fn visit_pipeline(&mut self, stages: &[Expr]) -> Self::Output;
}

impl Program {
    pub fn accept<V: Visitor>(&self, visitor: &mut V) -> V::Output {
        visitor.visit_program(self)
    }
}

impl Statement {
    pub fn accept<V: Visitor>(&self, visitor: &mut V) -> V::Output {
        match self {
            Statement::HotkeyBinding { hotkey, action, .. } => {
                visitor.visit_hotkey_binding(hotkey, action)
            }
            Statement::Block(statements) => visitor.visit_block(statements),
            Statement::Expression(expr) => visitor.visit_expression_statement(expr),
            Statement::Let { name, value } => visitor.visit_let(name, value.as_ref()),
            Statement::If {
                condition,
                consequence,
                alternative,
            } => visitor.visit_if(condition, consequence, alternative.as_deref()),
            Statement::While { condition, body } => visitor.visit_while(condition, body),
            Statement::Return(value) => visitor.visit_return(value.as_ref()),
            Statement::Function(decl) => visitor.visit_function(decl),
        }
    }
}

impl Expr {
    pub fn accept<V: Visitor>(&self, visitor: &mut V) -> V::Output {
        match self {
            Expr::Identifier(name) => visitor.visit_identifier(name),
            Expr::Number(value) => visitor.visit_number(*value),
            Expr::String(value) => visitor.visit_string(value),
            Expr::Hotkey(text) => visitor.visit_hotkey(text),
            Expr::Binary { left, op, right } => visitor.visit_binary(left, *op, right),
            Expr::Call { callee, args } => visitor.visit_call(callee, args),
            Expr::Member { object, property } => visitor.visit_member(object, property),
            Expr::Pipeline(stages) => visitor.visit_pipeline(stages),
        }
    }
}
