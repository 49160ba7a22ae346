//! Abstract Syntax Tree definitions for Quill
//!
//! Represents the structure of programs after parsing.

use crate::token::Span;

/// Expression nodes
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Integer literal: 42, -7
    Int { value: i64, span: Span },

    /// String literal: "hello"
    Str { value: String, span: Span },

    /// Boolean literal: true, false
    Bool { value: bool, span: Span },

    /// The null object reference
    Null { span: Span },

    /// The current object: me
    Me { span: Span },

    /// Parameter or field reference: foo
    Ident { name: String, span: Span },

    /// Binary operation: (+ a b)
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
        span: Span,
    },

    /// Unary operation: (! x)
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        span: Span,
    },

    /// Instantiation: (new Point)
    New { class: String, span: Span },

    /// Method call: (call target name args...)
    Call(Box<CallExpr>),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Int { span, .. } => *span,
            Expr::Str { span, .. } => *span,
            Expr::Bool { span, .. } => *span,
            Expr::Null { span } => *span,
            Expr::Me { span } => *span,
            Expr::Ident { span, .. } => *span,
            Expr::Binary { span, .. } => *span,
            Expr::Unary { span, .. } => *span,
            Expr::New { span, .. } => *span,
            Expr::Call(call) => call.span,
        }
    }
}

/// Shared by the call expression and the call statement
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub target: Expr,
    pub method: String,
    pub args: Vec<Expr>,
    pub span: Span,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add, // +
    Sub, // -
    Mul, // *
    Div, // /
    Mod, // %
    Lt,  // <
    Gt,  // >
    Le,  // <=
    Ge,  // >=
    Eq,  // ==
    Ne,  // !=
    And, // &
    Or,  // |
}

impl BinaryOp {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let op = match symbol {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "%" => BinaryOp::Mod,
            "<" => BinaryOp::Lt,
            ">" => BinaryOp::Gt,
            "<=" => BinaryOp::Le,
            ">=" => BinaryOp::Ge,
            "==" => BinaryOp::Eq,
            "!=" => BinaryOp::Ne,
            "&" => BinaryOp::And,
            "|" => BinaryOp::Or,
            _ => return None,
        };
        Some(op)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::And => "&",
            BinaryOp::Or => "|",
        }
    }
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not, // !
}

/// Which coercion an input statement applies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Int,
    Str,
}

/// Statement nodes
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// (print expr...)
    Print { args: Vec<Expr>, span: Span },

    /// (inputi field) / (inputs field)
    Input {
        kind: InputKind,
        field: String,
        span: Span,
    },

    /// (call target name args...) with the result discarded
    Call(Box<CallExpr>),

    /// (if cond then [else])
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
        span: Span,
    },

    /// (while cond body)
    While {
        condition: Expr,
        body: Box<Stmt>,
        span: Span,
    },

    /// (return [expr])
    Return { value: Option<Expr>, span: Span },

    /// (begin stmt...)
    Begin { stmts: Vec<Stmt>, span: Span },

    /// (set name expr)
    Set {
        name: String,
        value: Expr,
        span: Span,
    },
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Print { span, .. } => *span,
            Stmt::Input { span, .. } => *span,
            Stmt::Call(call) => call.span,
            Stmt::If { span, .. } => *span,
            Stmt::While { span, .. } => *span,
            Stmt::Return { span, .. } => *span,
            Stmt::Begin { span, .. } => *span,
            Stmt::Set { span, .. } => *span,
        }
    }
}

/// (field name default)
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: String,
    pub default: Expr,
    pub span: Span,
}

/// (method name (params...) body)
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub name: String,
    pub params: Vec<String>,
    pub body: Stmt,
    pub span: Span,
}

/// (class name members...), members kept in declaration order
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: String,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<MethodDecl>,
    pub span: Span,
}

/// A complete program
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub classes: Vec<ClassDecl>,
}

impl Program {
    pub fn new(classes: Vec<ClassDecl>) -> Self {
        Self { classes }
    }
}
