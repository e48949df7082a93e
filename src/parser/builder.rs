//! AST assembly from action events
//!
//! The builder is a handful of operand stacks. Each action handler pops a fixed
//! set of operands and pushes the node it builds, so a subtree is complete by
//! the time the action closing its production fires:
//!
//! ```text
//! Expr -> <Expr> Plus <Expr> {binary_add}      pops right, pops left, pushes +(left, right)
//! Stmt -> LeftCurly {open_block} ... {close_block}   opens a list, fills it, drains it
//! ```
//!
//! The grammar guarantees every pop finds an operand of the right kind. When
//! it does not, the grammar and the handlers disagree, which is a [`Defect`]
//! of the wiring and never a user-facing error.

use thiserror::Error;

use crate::parser::actions::{ActionContext, ActionRegistry};
use crate::parser::ast::*;
use crate::parser::lexer::TokenValue;

/// Internal-consistency failures: a grammar accepted by the table compiler
/// and its handlers do not agree.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Defect {
    #[error("action '{action}' popped the empty {stack} stack")]
    StackUnderflow { action: String, stack: &'static str },
    #[error("action '{action}' expected {expected} on top of its stack")]
    WrongKind { action: String, expected: &'static str },
    #[error("action '{action}' expected to follow {expected} token")]
    WrongToken { action: String, expected: &'static str },
    #[error("{count} item(s) left on the {stack} stack after accept")]
    Leftover { stack: &'static str, count: usize },
    #[error("action '{action}' reached without a handler")]
    Unwired { action: String },
    #[error("step {step} returned with an empty address stack")]
    ReturnWithoutCaller { step: usize },
    #[error("accept reached with {depth} pending return address(es)")]
    UnbalancedAccept { depth: usize },
    #[error("branch to step {index} outside the table")]
    StepOutOfRange { index: usize },
}

fn pop<T>(stack: &mut Vec<T>, ctx: &ActionContext<'_>, name: &'static str) -> Result<T, Defect> {
    stack.pop().ok_or_else(|| Defect::StackUnderflow {
        action: ctx.action.to_string(),
        stack: name,
    })
}

fn wrong_kind(ctx: &ActionContext<'_>, expected: &'static str) -> Defect {
    Defect::WrongKind {
        action: ctx.action.to_string(),
        expected,
    }
}

fn leftover(stack: &'static str, count: usize) -> Result<(), Defect> {
    match count {
        0 => Ok(()),
        count => Err(Defect::Leftover { stack, count }),
    }
}

/// Operand stacks for one parse.
#[derive(Debug, Default)]
pub struct AstBuilder {
    exprs: Vec<Expr>,
    stmts: Vec<Stmt>,
    types: Vec<Type>,
    /// One list per open call or builtin argument list
    args: Vec<Vec<Expr>>,
    /// One list per open array literal
    array_items: Vec<Vec<Literal>>,
    /// One list per open block
    blocks: Vec<Vec<Stmt>>,
    params: Vec<Param>,
    functions: Vec<Function>,
    init: Option<Expr>,
    return_value: Option<Expr>,
    return_type: Option<Type>,
}

impl AstBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain after accepting a program.
    pub fn finish_program(mut self) -> Result<Program, Defect> {
        let functions = std::mem::take(&mut self.functions);
        self.ensure_drained()?;
        log::debug!("built program with {} function(s)", functions.len());
        Ok(Program { functions })
    }

    /// Drain after accepting a single statement.
    pub fn finish_statement(mut self) -> Result<Stmt, Defect> {
        let stmt = self.stmts.pop().ok_or(Defect::StackUnderflow {
            action: "finish_statement".to_string(),
            stack: "statement",
        })?;
        self.ensure_drained()?;
        leftover("function", self.functions.len())?;
        Ok(stmt)
    }

    /// Drain after accepting a single expression.
    pub fn finish_expression(mut self) -> Result<Expr, Defect> {
        let expr = self.exprs.pop().ok_or(Defect::StackUnderflow {
            action: "finish_expression".to_string(),
            stack: "expression",
        })?;
        self.ensure_drained()?;
        leftover("function", self.functions.len())?;
        Ok(expr)
    }

    /// Everything except the function list must be empty.
    fn ensure_drained(&self) -> Result<(), Defect> {
        leftover("expression", self.exprs.len())?;
        leftover("statement", self.stmts.len())?;
        leftover("type", self.types.len())?;
        leftover("argument", self.args.len())?;
        leftover("array item", self.array_items.len())?;
        leftover("block", self.blocks.len())?;
        leftover("parameter", self.params.len())?;
        leftover("initializer", usize::from(self.init.is_some()))?;
        leftover("return value", usize::from(self.return_value.is_some()))?;
        leftover("return type", usize::from(self.return_type.is_some()))
    }

    fn pop_expr(&mut self, ctx: &ActionContext<'_>) -> Result<Expr, Defect> {
        pop(&mut self.exprs, ctx, "expression")
    }

    fn pop_stmt(&mut self, ctx: &ActionContext<'_>) -> Result<Stmt, Defect> {
        pop(&mut self.stmts, ctx, "statement")
    }

    fn pop_type(&mut self, ctx: &ActionContext<'_>) -> Result<Type, Defect> {
        pop(&mut self.types, ctx, "type")
    }

    fn pop_args(&mut self, ctx: &ActionContext<'_>) -> Result<Vec<Expr>, Defect> {
        pop(&mut self.args, ctx, "argument")
    }

    /// Pop an expression that must be a bare identifier.
    fn pop_name(&mut self, ctx: &ActionContext<'_>) -> Result<String, Defect> {
        match self.pop_expr(ctx)? {
            Expr::Identifier(name) => Ok(name),
            _ => Err(wrong_kind(ctx, "an identifier")),
        }
    }

    fn pop_access(&mut self, ctx: &ActionContext<'_>) -> Result<ElementAccess, Defect> {
        match self.pop_expr(ctx)? {
            Expr::ArrayAccess(access) => Ok(access),
            _ => Err(wrong_kind(ctx, "an element access")),
        }
    }

    fn token_value<'c>(ctx: &ActionContext<'c>, expected: &'static str) -> Result<&'c TokenValue, Defect> {
        ctx.previous
            .and_then(|token| token.value.as_ref())
            .ok_or_else(|| Defect::WrongToken {
                action: ctx.action.to_string(),
                expected,
            })
    }

    // Expressions

    fn push_identifier(&mut self, ctx: &ActionContext<'_>) -> Result<(), Defect> {
        match Self::token_value(ctx, "an identifier")? {
            TokenValue::Name(name) => self.exprs.push(Expr::Identifier(name.clone())),
            _ => return Err(wrong_token(ctx, "an identifier")),
        }
        Ok(())
    }

    fn push_literal(&mut self, ctx: &ActionContext<'_>) -> Result<(), Defect> {
        let literal = match Self::token_value(ctx, "a literal")? {
            TokenValue::Int(v) => Literal::Int(*v),
            TokenValue::Float(v) => Literal::Float(*v),
            TokenValue::Str(s) => Literal::String(s.clone()),
            TokenValue::Name(_) => return Err(wrong_token(ctx, "a literal")),
        };
        self.exprs.push(Expr::Literal(literal));
        Ok(())
    }

    fn push_bool(&mut self, value: bool) -> Result<(), Defect> {
        self.exprs.push(Expr::Literal(Literal::Bool(value)));
        Ok(())
    }

    fn binary(&mut self, ctx: &ActionContext<'_>, op: BinOp) -> Result<(), Defect> {
        let right = self.pop_expr(ctx)?;
        let left = self.pop_expr(ctx)?;
        self.exprs.push(Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        });
        Ok(())
    }

    fn unary(&mut self, ctx: &ActionContext<'_>, op: UnaryOp) -> Result<(), Defect> {
        let operand = self.pop_expr(ctx)?;
        self.exprs.push(Expr::Unary {
            op,
            operand: Box::new(operand),
        });
        Ok(())
    }

    fn open_args(&mut self, _: &ActionContext<'_>) -> Result<(), Defect> {
        self.args.push(Vec::new());
        Ok(())
    }

    fn push_arg(&mut self, ctx: &ActionContext<'_>) -> Result<(), Defect> {
        let arg = self.pop_expr(ctx)?;
        let list = self.args.last_mut().ok_or_else(|| Defect::StackUnderflow {
            action: ctx.action.to_string(),
            stack: "argument",
        })?;
        list.push(arg);
        Ok(())
    }

    fn call(&mut self, ctx: &ActionContext<'_>) -> Result<Call, Defect> {
        let args = self.pop_args(ctx)?;
        let name = self.pop_name(ctx)?;
        Ok(Call { name, args })
    }

    fn call_expr(&mut self, ctx: &ActionContext<'_>) -> Result<(), Defect> {
        let call = self.call(ctx)?;
        self.exprs.push(Expr::Call(call));
        Ok(())
    }

    fn index_access(&mut self, ctx: &ActionContext<'_>) -> Result<(), Defect> {
        let index = self.pop_expr(ctx)?;
        let name = self.pop_name(ctx)?;
        self.exprs.push(Expr::ArrayAccess(ElementAccess {
            name,
            indices: vec![index],
        }));
        Ok(())
    }

    fn extra_index(&mut self, ctx: &ActionContext<'_>) -> Result<(), Defect> {
        let index = self.pop_expr(ctx)?;
        let mut access = self.pop_access(ctx)?;
        access.indices.push(index);
        self.exprs.push(Expr::ArrayAccess(access));
        Ok(())
    }

    fn open_array(&mut self, _: &ActionContext<'_>) -> Result<(), Defect> {
        self.array_items.push(Vec::new());
        Ok(())
    }

    fn push_array_item(&mut self, ctx: &ActionContext<'_>) -> Result<(), Defect> {
        let Expr::Literal(item) = self.pop_expr(ctx)? else {
            return Err(wrong_kind(ctx, "a literal"));
        };
        let items = self.array_items.last_mut().ok_or_else(|| Defect::StackUnderflow {
            action: ctx.action.to_string(),
            stack: "array item",
        })?;
        items.push(item);
        Ok(())
    }

    fn array_literal(&mut self, ctx: &ActionContext<'_>) -> Result<(), Defect> {
        let items = pop(&mut self.array_items, ctx, "array item")?;
        self.exprs.push(Expr::Literal(Literal::Array(items)));
        Ok(())
    }

    // Types

    fn push_type(&mut self, base: BaseType) -> Result<(), Defect> {
        self.types.push(Type::new(base));
        Ok(())
    }

    fn type_array(&mut self, ctx: &ActionContext<'_>) -> Result<(), Defect> {
        let ty = self.pop_type(ctx)?;
        self.types.push(ty.with_array());
        Ok(())
    }

    // Statements

    fn if_stmt(&mut self, ctx: &ActionContext<'_>) -> Result<(), Defect> {
        let then_branch = self.pop_stmt(ctx)?;
        let condition = self.pop_expr(ctx)?;
        self.stmts.push(Stmt::If {
            condition,
            then_branch: Box::new(then_branch),
            else_branch: None,
        });
        Ok(())
    }

    fn else_clause(&mut self, ctx: &ActionContext<'_>) -> Result<(), Defect> {
        let branch = self.pop_stmt(ctx)?;
        match self.stmts.last_mut() {
            Some(Stmt::If { else_branch, .. }) if else_branch.is_none() => {
                *else_branch = Some(Box::new(branch));
                Ok(())
            }
            Some(_) => Err(wrong_kind(ctx, "an if statement without else")),
            None => Err(Defect::StackUnderflow {
                action: ctx.action.to_string(),
                stack: "statement",
            }),
        }
    }

    fn while_stmt(&mut self, ctx: &ActionContext<'_>) -> Result<(), Defect> {
        let body = self.pop_stmt(ctx)?;
        let condition = self.pop_expr(ctx)?;
        self.stmts.push(Stmt::While {
            condition,
            body: Box::new(body),
        });
        Ok(())
    }

    fn init_expr(&mut self, ctx: &ActionContext<'_>) -> Result<(), Defect> {
        self.init = Some(self.pop_expr(ctx)?);
        Ok(())
    }

    fn var_decl(&mut self, ctx: &ActionContext<'_>) -> Result<(), Defect> {
        let ty = self.pop_type(ctx)?;
        let name = self.pop_name(ctx)?;
        let init = self.init.take();
        self.stmts.push(Stmt::Declaration { name, ty, init });
        Ok(())
    }

    fn assign_stmt(&mut self, ctx: &ActionContext<'_>) -> Result<(), Defect> {
        let value = self.pop_expr(ctx)?;
        let name = self.pop_name(ctx)?;
        self.stmts.push(Stmt::Assign { name, value });
        Ok(())
    }

    fn index_assign_stmt(&mut self, ctx: &ActionContext<'_>) -> Result<(), Defect> {
        let value = self.pop_expr(ctx)?;
        let target = self.pop_access(ctx)?;
        self.stmts.push(Stmt::ArrayAssign { target, value });
        Ok(())
    }

    fn return_expr(&mut self, ctx: &ActionContext<'_>) -> Result<(), Defect> {
        self.return_value = Some(self.pop_expr(ctx)?);
        Ok(())
    }

    fn return_stmt(&mut self, _: &ActionContext<'_>) -> Result<(), Defect> {
        self.stmts.push(Stmt::Return(self.return_value.take()));
        Ok(())
    }

    fn open_block(&mut self, _: &ActionContext<'_>) -> Result<(), Defect> {
        self.blocks.push(Vec::new());
        Ok(())
    }

    fn block_item(&mut self, ctx: &ActionContext<'_>) -> Result<(), Defect> {
        let stmt = self.pop_stmt(ctx)?;
        let block = self.blocks.last_mut().ok_or_else(|| Defect::StackUnderflow {
            action: ctx.action.to_string(),
            stack: "block",
        })?;
        block.push(stmt);
        Ok(())
    }

    fn close_block(&mut self, ctx: &ActionContext<'_>) -> Result<(), Defect> {
        let block = pop(&mut self.blocks, ctx, "block")?;
        self.stmts.push(Stmt::Composite(block));
        Ok(())
    }

    fn builtin(&mut self, ctx: &ActionContext<'_>, kind: Builtin) -> Result<(), Defect> {
        let args = self.pop_args(ctx)?;
        self.stmts.push(Stmt::Builtin { kind, args });
        Ok(())
    }

    fn call_stmt(&mut self, ctx: &ActionContext<'_>) -> Result<(), Defect> {
        let call = self.call(ctx)?;
        self.stmts.push(Stmt::Call(call));
        Ok(())
    }

    // Functions

    fn param(&mut self, ctx: &ActionContext<'_>) -> Result<(), Defect> {
        let ty = self.pop_type(ctx)?;
        let name = self.pop_name(ctx)?;
        self.params.push(Param { name, ty });
        Ok(())
    }

    fn return_type(&mut self, ctx: &ActionContext<'_>) -> Result<(), Defect> {
        self.return_type = Some(self.pop_type(ctx)?);
        Ok(())
    }

    fn function(&mut self, ctx: &ActionContext<'_>) -> Result<(), Defect> {
        let body = self.pop_stmt(ctx)?;
        let return_type = self.return_type.take();
        let params = std::mem::take(&mut self.params);
        let name = self.pop_name(ctx)?;
        log::debug!("function '{}' with {} parameter(s)", name, params.len());
        self.functions.push(Function {
            return_type,
            name,
            params,
            body,
        });
        Ok(())
    }
}

fn wrong_token(ctx: &ActionContext<'_>, expected: &'static str) -> Defect {
    Defect::WrongToken {
        action: ctx.action.to_string(),
        expected,
    }
}

/// Handlers for every action used by the Yolang grammars.
pub fn registry() -> ActionRegistry<AstBuilder> {
    let mut r = ActionRegistry::new();
    r.register("push_identifier", AstBuilder::push_identifier)
        .register("push_int", AstBuilder::push_literal)
        .register("push_float", AstBuilder::push_literal)
        .register("push_string", AstBuilder::push_literal)
        .register("push_true", |b, _| b.push_bool(true))
        .register("push_false", |b, _| b.push_bool(false));

    r.register("binary_or", |b, ctx| b.binary(ctx, BinOp::Or))
        .register("binary_and", |b, ctx| b.binary(ctx, BinOp::And))
        .register("binary_eq", |b, ctx| b.binary(ctx, BinOp::Eq))
        .register("binary_ne", |b, ctx| b.binary(ctx, BinOp::Ne))
        .register("binary_lt", |b, ctx| b.binary(ctx, BinOp::Lt))
        .register("binary_le", |b, ctx| b.binary(ctx, BinOp::Le))
        .register("binary_gt", |b, ctx| b.binary(ctx, BinOp::Gt))
        .register("binary_ge", |b, ctx| b.binary(ctx, BinOp::Ge))
        .register("binary_add", |b, ctx| b.binary(ctx, BinOp::Add))
        .register("binary_sub", |b, ctx| b.binary(ctx, BinOp::Sub))
        .register("binary_mul", |b, ctx| b.binary(ctx, BinOp::Mul))
        .register("binary_div", |b, ctx| b.binary(ctx, BinOp::Div))
        .register("binary_mod", |b, ctx| b.binary(ctx, BinOp::Mod))
        .register("unary_minus", |b, ctx| b.unary(ctx, UnaryOp::Neg))
        .register("unary_plus", |b, ctx| b.unary(ctx, UnaryOp::Plus))
        .register("unary_not", |b, ctx| b.unary(ctx, UnaryOp::Not));

    r.register("open_args", AstBuilder::open_args)
        .register("push_arg", AstBuilder::push_arg)
        .register("call_expr", AstBuilder::call_expr)
        .register("index_access", AstBuilder::index_access)
        .register("extra_index", AstBuilder::extra_index)
        .register("open_array", AstBuilder::open_array)
        .register("push_array_item", AstBuilder::push_array_item)
        .register("array_literal", AstBuilder::array_literal);

    r.register("type_int", |b, _| b.push_type(BaseType::Int))
        .register("type_float", |b, _| b.push_type(BaseType::Float))
        .register("type_bool", |b, _| b.push_type(BaseType::Bool))
        .register("type_string", |b, _| b.push_type(BaseType::String))
        .register("type_array", AstBuilder::type_array);

    r.register("if_stmt", AstBuilder::if_stmt)
        .register("else_clause", AstBuilder::else_clause)
        .register("while_stmt", AstBuilder::while_stmt)
        .register("init_expr", AstBuilder::init_expr)
        .register("var_decl", AstBuilder::var_decl)
        .register("assign_stmt", AstBuilder::assign_stmt)
        .register("index_assign_stmt", AstBuilder::index_assign_stmt)
        .register("return_expr", AstBuilder::return_expr)
        .register("return_stmt", AstBuilder::return_stmt)
        .register("open_block", AstBuilder::open_block)
        .register("block_item", AstBuilder::block_item)
        .register("close_block", AstBuilder::close_block)
        .register("print_stmt", |b, ctx| b.builtin(ctx, Builtin::Print))
        .register("scan_stmt", |b, ctx| b.builtin(ctx, Builtin::Scan))
        .register("call_stmt", AstBuilder::call_stmt);

    r.register("param", AstBuilder::param)
        .register("return_type", AstBuilder::return_type)
        .register("function", AstBuilder::function);
    r
}
