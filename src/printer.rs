//! Structural string rendering of syntax trees.
//!
//! Every node renders as `Kind(children)`, in either a compact single-line
//! form or a pretty form where lists place one element per line with 2-space
//! indentation. Rendering never mutates the tree, so printing the same node
//! twice gives the same text.
//!
//! # Examples
//!
//! ```
//! use hotkey_lang::parser::parse_source;
//! use hotkey_lang::printer::to_ast_string;
//!
//! let program = parse_source("F1 => send \"hi\"").unwrap();
//! assert_eq!(
//!     to_ast_string(&program),
//!     "Program([HotkeyBinding(Hotkey(F1) => ExpressionStatement(Call(Identifier(send), [String(\"hi\")])))])"
//! );
//! ```

use crate::ast::{BinOp, Expr, FunctionDecl, Program, Statement, Visitor};
use std::fmt;

pub struct AstPrinter {
    pretty: bool,
    depth: usize,
}

impl AstPrinter {
    pub fn new(pretty: bool) -> Self {
        AstPrinter { pretty, depth: 0 }
    }

    fn indent(&self, level: usize) -> String {
        "  ".repeat(level)
    }

    fn list<T>(&mut self, items: &[T], render: impl Fn(&mut Self, &T) -> String) -> String {
        if items.is_empty() {
            return "[]".to_string();
        }

        if self.pretty {
            self.depth += 1;
            let mut rendered = Vec::with_capacity(items.len());
            for item in items {
                let text = render(self, item);
                rendered.push(format!("{}{}", self.indent(self.depth), text));
            }
            self.depth -= 1;
            format!("[\n{}\n{}]", rendered.join(",\n"), self.indent(self.depth))
        } else {
            let rendered: Vec<String> = items.iter().map(|item| render(self, item)).collect();
            format!("[{}]", rendered.join(", "))
        }
    }

    fn statements(&mut self, statements: &[Statement]) -> String {
        self.list(statements, |p, s| s.accept(p))
    }

    fn expressions(&mut self, exprs: &[Expr]) -> String {
        self.list(exprs, |p, e| e.accept(p))
    }
}

impl Visitor for AstPrinter {
    type Output = String;

    fn visit_program(&mut self, program: &Program) -> String {
        format!("Program({})", self.statements(&program.statements))
    }

    fn visit_hotkey_binding(&mut self, hotkey: &Expr, action: &Statement) -> String {
        format!(
            "HotkeyBinding({} => {})",
            hotkey.accept(self),
            action.accept(self)
        )
    }

    fn visit_block(&mut self, statements: &[Statement]) -> String {
        format!("Block({})", self.statements(statements))
    }

    fn visit_expression_statement(&mut self, expr: &Expr) -> String {
        format!("ExpressionStatement({})", expr.accept(self))
    }

    fn visit_let(&mut self, name: &str, value: Option<&Expr>) -> String {
        match value {
            Some(value) => format!("Let({} = {})", name, value.accept(self)),
            None => format!("Let({})", name),
        }
    }

    fn visit_if(
        &mut self,
        condition: &Expr,
        consequence: &Statement,
        alternative: Option<&Statement>,
    ) -> String {
        let condition = condition.accept(self);
        let consequence = consequence.accept(self);
        match alternative {
            Some(alt) => format!("If({}, {}, else {})", condition, consequence, alt.accept(self)),
            None => format!("If({}, {})", condition, consequence),
        }
    }

    fn visit_while(&mut self, condition: &Expr, body: &Statement) -> String {
        format!("While({}, {})", condition.accept(self), body.accept(self))
    }

    fn visit_return(&mut self, value: Option<&Expr>) -> String {
        match value {
            Some(value) => format!("Return({})", value.accept(self)),
            None => "Return()".to_string(),
        }
    }

    fn visit_function(&mut self, decl: &FunctionDecl) -> String {
        format!(
            "Function({}({}), {})",
            decl.name,
            decl.params.join(", "),
            decl.body.accept(self)
        )
    }

    fn visit_identifier(&mut self, name: &str) -> String {
        format!("Identifier({})", name)
    }

    fn visit_number(&mut self, value: f64) -> String {
        format!("Number({})", value)
    }

    fn visit_string(&mut self, value: &str) -> String {
        format!("String({:?})", value)
    }

    fn visit_hotkey(&mut self, text: &str) -> String {
        format!("Hotkey({})", text)
    }

    fn visit_binary(&mut self, left: &Expr, op: BinOp, right: &Expr) -> String {
        format!("Binary({} {} {})", left.accept(self), op, right.accept(self))
    }

    fn visit_call(&mut self, callee: &Expr, args: &[Expr]) -> String {
        format!("Call({}, {})", callee.accept(self), self.expressions(args))
    }

    fn visit_member(&mut self, object: &Expr, property: &Expr) -> String {
        format!("Member({}.{})", object.accept(self), property.accept(self))
    }

    fn visit_pipeline(&mut self, stages: &[Expr]) -> String {
        format!("Pipeline({})", self.expressions(stages))
    }
}

/// Compact structural form of a program.
pub fn to_ast_string(program: &Program) -> String {
    program.accept(&mut AstPrinter::new(false))
}

/// Pretty structural form of a program.
pub fn to_ast_string_pretty(program: &Program) -> String {
    program.accept(&mut AstPrinter::new(true))
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.accept(&mut AstPrinter::new(false)))
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.accept(&mut AstPrinter::new(false)))
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.accept(&mut AstPrinter::new(false)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_compact() {
        let expr = Expr::pipeline(vec![
            Expr::member("clipboard", "out"),
            Expr::member("text", "upper"),
        ]);
        assert_eq!(
            expr.to_string(),
            "Pipeline([Member(Identifier(clipboard).Identifier(out)), Member(Identifier(text).Identifier(upper))])"
        );
    }

    #[test]
    fn test_pretty_block() {
        let program = Program::new(vec![Statement::Block(vec![
            Statement::Expression(Expr::identifier("a")),
            Statement::Expression(Expr::Number(1.5)),
        ])]);
        assert_eq!(
            to_ast_string_pretty(&program),
            "Program([\n  Block([\n    ExpressionStatement(Identifier(a)),\n    ExpressionStatement(Number(1.5))\n  ])\n])"
        );
    }

    #[test]
    fn test_empty_lists() {
        assert_eq!(Statement::Block(vec![]).to_string(), "Block([])");
        assert_eq!(to_ast_string(&Program::default()), "Program([])");
    }
}
