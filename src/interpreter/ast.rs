//! Abstract Syntax Tree node types
//!
//! The AST is fully owned and serde-serializable so a parsed program can be
//! dumped as JSON (`minic ast`) or moved into a coroutine carrier thread.

use serde::{Deserialize, Serialize};

/// A complete parsed program: function declarations plus top-level
/// (global) variable declarations, in source order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    pub functions: Vec<FunDecl>,
    /// Top-level declarations; always `Stmt::Declare`.
    pub globals: Vec<Stmt>,
}

impl Program {
    /// Look up a function declaration by name.
    pub fn function(&self, name: &str) -> Option<&FunDecl> {
        self.functions.iter().find(|f| f.name == name)
    }
}

/// A function declaration.
///
/// Type names are parsed and recorded but the evaluator is dynamically
/// checked; they carry no runtime semantics beyond documentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunDecl {
    pub name: String,
    pub ret_type: String,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Param {
    pub ty: String,
    pub name: String,
}

/// Statement AST node
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Stmt {
    Declare {
        ty: String,
        name: String,
        init: Option<Expr>,
    },
    Assign {
        name: String,
        expr: Expr,
    },
    If {
        test: Expr,
        then_body: Vec<Stmt>,
        else_body: Option<Vec<Stmt>>,
    },
    While {
        test: Expr,
        body: Vec<Stmt>,
    },
    Return {
        value: Option<Expr>,
    },
    Expr {
        expr: Expr,
    },
    /// Yield a value to the driver; valid only inside a coroutine body.
    Suspend {
        expr: Expr,
    },
    /// Step a coroutine forward; the expression must evaluate to a handle.
    Resume {
        expr: Expr,
    },
}

/// Expression AST node
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Expr {
    LitInt { v: i64 },
    LitFloat { v: f64 },
    LitStr { v: String },
    LitNull,
    Ident { name: String },
    Unary { op: UnOp, operand: Box<Expr> },
    Binary { op: BinOp, left: Box<Expr>, right: Box<Expr> },
    Call { callee: String, args: Vec<Expr> },
    /// Coroutine constructor: captures the callee and its argument
    /// expressions; arguments are evaluated eagerly at construction, the
    /// body is not entered.
    CoAwait { callee: String, args: Vec<Expr> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
}
