//! Double-dispatch traversal of the AST
//!
//! [`ExprVisitor`] has one method per expression kind and [`StmtVisitor`] one
//! per statement kind. `accept` on a node calls the method for its kind, so a
//! consumer implements both traits and never matches on nodes itself.
//!
//! [`Printer`] is the visitor used by the CLI and the tests. It renders
//! expressions as prefix terms, `2 + 3 * 4` becoming `+(2, *(3, 4))`, and
//! statements in a single-line source-like form.

use crate::parser::ast::*;

pub trait ExprVisitor {
    type Output;

    fn visit_binary(&mut self, op: BinOp, left: &Expr, right: &Expr) -> Self::Output;
    fn visit_literal(&mut self, literal: &Literal) -> Self::Output;
    fn visit_identifier(&mut self, name: &str) -> Self::Output;
    fn visit_array_access(&mut self, access: &ElementAccess) -> Self::Output;
    fn visit_unary(&mut self, op: UnaryOp, operand: &Expr) -> Self::Output;
    fn visit_call(&mut self, call: &Call) -> Self::Output;
}

pub trait StmtVisitor {
    type Output;

    fn visit_declaration(&mut self, name: &str, ty: &Type, init: Option<&Expr>) -> Self::Output;
    fn visit_assign(&mut self, name: &str, value: &Expr) -> Self::Output;
    fn visit_array_assign(&mut self, target: &ElementAccess, value: &Expr) -> Self::Output;
    fn visit_return(&mut self, value: Option<&Expr>) -> Self::Output;
    fn visit_if(&mut self, condition: &Expr, then_branch: &Stmt, else_branch: Option<&Stmt>) -> Self::Output;
    fn visit_while(&mut self, condition: &Expr, body: &Stmt) -> Self::Output;
    fn visit_composite(&mut self, statements: &[Stmt]) -> Self::Output;
    fn visit_builtin(&mut self, kind: Builtin, args: &[Expr]) -> Self::Output;
    fn visit_call_stmt(&mut self, call: &Call) -> Self::Output;
}

impl Expr {
    pub fn accept<V: ExprVisitor>(&self, visitor: &mut V) -> V::Output {
        match self {
            Expr::Binary { op, left, right } => visitor.visit_binary(*op, left, right),
            Expr::Literal(literal) => visitor.visit_literal(literal),
            Expr::Identifier(name) => visitor.visit_identifier(name),
            Expr::ArrayAccess(access) => visitor.visit_array_access(access),
            Expr::Unary { op, operand } => visitor.visit_unary(*op, operand),
            Expr::Call(call) => visitor.visit_call(call),
        }
    }
}

impl Stmt {
    pub fn accept<V: StmtVisitor>(&self, visitor: &mut V) -> V::Output {
        match self {
            Stmt::Declaration { name, ty, init } => visitor.visit_declaration(name, ty, init.as_ref()),
            Stmt::Assign { name, value } => visitor.visit_assign(name, value),
            Stmt::ArrayAssign { target, value } => visitor.visit_array_assign(target, value),
            Stmt::Return(value) => visitor.visit_return(value.as_ref()),
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => visitor.visit_if(condition, then_branch, else_branch.as_deref()),
            Stmt::While { condition, body } => visitor.visit_while(condition, body),
            Stmt::Composite(statements) => visitor.visit_composite(statements),
            Stmt::Builtin { kind, args } => visitor.visit_builtin(*kind, args),
            Stmt::Call(call) => visitor.visit_call_stmt(call),
        }
    }
}

/// Renders nodes as text
#[derive(Debug, Default)]
pub struct Printer;

impl Printer {
    pub fn expr(expr: &Expr) -> String {
        expr.accept(&mut Printer)
    }

    pub fn stmt(stmt: &Stmt) -> String {
        stmt.accept(&mut Printer)
    }

    pub fn function(function: &Function) -> String {
        let params = function
            .params
            .iter()
            .map(|p| format!("{}: {}", p.name, p.ty))
            .collect::<Vec<_>>()
            .join(", ");
        let ret = function
            .return_type
            .as_ref()
            .map(|ty| format!(" -> {ty}"))
            .unwrap_or_default();
        format!(
            "func {}({}){}: {}",
            function.name,
            params,
            ret,
            Printer::stmt(&function.body)
        )
    }

    /// One function per line.
    pub fn program(program: &Program) -> String {
        program
            .functions
            .iter()
            .map(|f| Printer::function(f) + "\n")
            .collect()
    }

    fn list(&mut self, exprs: &[Expr]) -> String {
        exprs
            .iter()
            .map(|e| e.accept(self))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn access(&mut self, access: &ElementAccess) -> String {
        let mut out = access.name.clone();
        for index in &access.indices {
            out.push('[');
            out.push_str(&index.accept(self));
            out.push(']');
        }
        out
    }
}

fn literal(value: &Literal) -> String {
    match value {
        Literal::Int(v) => v.to_string(),
        Literal::Float(v) => format!("{v:?}"),
        Literal::Bool(v) => v.to_string(),
        Literal::String(s) => format!("{s:?}"),
        Literal::Array(items) => {
            let items = items.iter().map(literal).collect::<Vec<_>>().join(", ");
            format!("[{items}]")
        }
    }
}

impl ExprVisitor for Printer {
    type Output = String;

    fn visit_binary(&mut self, op: BinOp, left: &Expr, right: &Expr) -> String {
        format!("{}({}, {})", op.symbol(), left.accept(self), right.accept(self))
    }

    fn visit_literal(&mut self, value: &Literal) -> String {
        literal(value)
    }

    fn visit_identifier(&mut self, name: &str) -> String {
        name.to_string()
    }

    fn visit_array_access(&mut self, access: &ElementAccess) -> String {
        self.access(access)
    }

    fn visit_unary(&mut self, op: UnaryOp, operand: &Expr) -> String {
        format!("{}({})", op.symbol(), operand.accept(self))
    }

    fn visit_call(&mut self, call: &Call) -> String {
        format!("{}({})", call.name, self.list(&call.args))
    }
}

impl StmtVisitor for Printer {
    type Output = String;

    fn visit_declaration(&mut self, name: &str, ty: &Type, init: Option<&Expr>) -> String {
        match init {
            Some(init) => format!("var {name}: {ty} = {};", init.accept(self)),
            None => format!("var {name}: {ty};"),
        }
    }

    fn visit_assign(&mut self, name: &str, value: &Expr) -> String {
        format!("{name} = {};", value.accept(self))
    }

    fn visit_array_assign(&mut self, target: &ElementAccess, value: &Expr) -> String {
        format!("{} = {};", self.access(target), value.accept(self))
    }

    fn visit_return(&mut self, value: Option<&Expr>) -> String {
        match value {
            Some(value) => format!("return {};", value.accept(self)),
            None => "return;".to_string(),
        }
    }

    fn visit_if(&mut self, condition: &Expr, then_branch: &Stmt, else_branch: Option<&Stmt>) -> String {
        let mut out = format!("if ({}) {}", condition.accept(self), then_branch.accept(self));
        if let Some(else_branch) = else_branch {
            out.push_str(" else ");
            out.push_str(&else_branch.accept(self));
        }
        out
    }

    fn visit_while(&mut self, condition: &Expr, body: &Stmt) -> String {
        format!("while ({}) {}", condition.accept(self), body.accept(self))
    }

    fn visit_composite(&mut self, statements: &[Stmt]) -> String {
        let mut out = String::from("{");
        for stmt in statements {
            out.push(' ');
            out.push_str(&stmt.accept(self));
        }
        out.push_str(" }");
        out
    }

    fn visit_builtin(&mut self, kind: Builtin, args: &[Expr]) -> String {
        let name = match kind {
            Builtin::Print => "print",
            Builtin::Scan => "scan",
        };
        format!("{name}({});", self.list(args))
    }

    fn visit_call_stmt(&mut self, call: &Call) -> String {
        format!("{}({});", call.name, self.list(&call.args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(v: i64) -> Expr {
        Expr::Literal(Literal::Int(v))
    }

    fn binary(op: BinOp, left: Expr, right: Expr) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[test]
    fn test_expression_terms() {
        let expr = binary(BinOp::Add, int(2), binary(BinOp::Mul, int(3), int(4)));
        assert_eq!(Printer::expr(&expr), "+(2, *(3, 4))");

        let expr = Expr::Unary {
            op: UnaryOp::Not,
            operand: Box::new(Expr::ArrayAccess(ElementAccess {
                name: "a".to_string(),
                indices: vec![int(1), Expr::Identifier("i".to_string())],
            })),
        };
        assert_eq!(Printer::expr(&expr), "!(a[1][i])");
    }

    #[test]
    fn test_literals() {
        let expr = Expr::Literal(Literal::Array(vec![
            Literal::Float(1.0),
            Literal::String("hi\n".to_string()),
            Literal::Bool(false),
        ]));
        assert_eq!(Printer::expr(&expr), r#"[1.0, "hi\n", false]"#);

        let nested = Expr::Literal(Literal::Array(vec![
            Literal::Int(1),
            Literal::Array(vec![Literal::Int(2), Literal::Array(vec![])]),
        ]));
        assert_eq!(Printer::expr(&nested), "[1, [2, []]]");
    }

    #[test]
    fn test_statements() {
        let stmt = Stmt::If {
            condition: Expr::Identifier("x".to_string()),
            then_branch: Box::new(Stmt::Composite(vec![Stmt::Return(None)])),
            else_branch: Some(Box::new(Stmt::Builtin {
                kind: Builtin::Print,
                args: vec![int(1), int(2)],
            })),
        };
        assert_eq!(Printer::stmt(&stmt), "if (x) { return; } else print(1, 2);");
    }

    #[test]
    fn test_function() {
        let function = Function {
            return_type: Some(Type::new(BaseType::Int).with_array()),
            name: "f".to_string(),
            params: vec![Param {
                name: "n".to_string(),
                ty: Type::new(BaseType::Float),
            }],
            body: Stmt::Composite(vec![]),
        };
        assert_eq!(Printer::function(&function), "func f(n: Float) -> Int[]: { }");
    }

    /// Counts nodes; checks that dispatch reaches every child.
    struct Counter;

    impl ExprVisitor for Counter {
        type Output = usize;

        fn visit_binary(&mut self, _: BinOp, left: &Expr, right: &Expr) -> usize {
            1 + left.accept(self) + right.accept(self)
        }
        fn visit_literal(&mut self, _: &Literal) -> usize {
            1
        }
        fn visit_identifier(&mut self, _: &str) -> usize {
            1
        }
        fn visit_array_access(&mut self, access: &ElementAccess) -> usize {
            1 + access.indices.iter().map(|e| e.accept(self)).sum::<usize>()
        }
        fn visit_unary(&mut self, _: UnaryOp, operand: &Expr) -> usize {
            1 + operand.accept(self)
        }
        fn visit_call(&mut self, call: &Call) -> usize {
            1 + call.args.iter().map(|e| e.accept(self)).sum::<usize>()
        }
    }

    #[test]
    fn test_custom_visitor() {
        let expr = binary(
            BinOp::Sub,
            Expr::Call(Call {
                name: "f".to_string(),
                args: vec![int(1), int(2)],
            }),
            Expr::Unary {
                op: UnaryOp::Neg,
                operand: Box::new(int(3)),
            },
        );
        assert_eq!(expr.accept(&mut Counter), 6);
    }
}
