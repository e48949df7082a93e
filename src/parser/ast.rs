// AST (Abstract Syntax Tree) definitions for Yolang programs
//
// Every node exclusively owns its children. Identifiers are plain names; name
// resolution happens in a later phase.

/// Base types of the language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseType {
    Int,
    Float,
    Bool,
    String,
}

/// Type representation: a base type wrapped in zero or more array levels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Type {
    pub base: BaseType,
    pub depth: usize, // 0 = scalar, 1 = T[], 2 = T[][], etc.
}

impl Type {
    pub fn new(base: BaseType) -> Self {
        Type { base, depth: 0 }
    }

    pub fn with_array(mut self) -> Self {
        self.depth += 1;
        self
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.base)?;
        for _ in 0..self.depth {
            write!(f, "[]")?;
        }
        Ok(())
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Logical
    Or,
    And,
    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Or => "||",
            BinOp::And => "&&",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,  // -x
    Plus, // +x
    Not,  // !x
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Not => "!",
        }
    }
}

/// Literal value; exactly one tag is active
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Bool(bool),
    String(String),
    Array(Vec<Literal>),
}

/// `name[i][j]`
#[derive(Debug, Clone, PartialEq)]
pub struct ElementAccess {
    pub name: String,
    pub indices: Vec<Expr>,
}

/// `name(args)`, used both as an expression and as a statement
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub name: String,
    pub args: Vec<Expr>,
}

/// Expressions
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Literal(Literal),
    Identifier(String),
    ArrayAccess(ElementAccess),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Call(Call),
}

/// Built-in I/O statements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Print,
    Scan,
}

/// Statements
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Declaration {
        name: String,
        ty: Type,
        init: Option<Expr>,
    },
    Assign {
        name: String,
        value: Expr,
    },
    ArrayAssign {
        target: ElementAccess,
        value: Expr,
    },
    Return(Option<Expr>),
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
    },
    Composite(Vec<Stmt>),
    Builtin {
        kind: Builtin,
        args: Vec<Expr>,
    },
    Call(Call),
}

/// Function parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub ty: Type,
}

/// Function definition
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub return_type: Option<Type>,
    pub name: String,
    pub params: Vec<Param>,
    pub body: Stmt,
}

/// Top-level program
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub functions: Vec<Function>,
}
