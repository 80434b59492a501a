//! PEST-based parser for the minic language
//!
//! Produces the AST in [`super::ast`]. The grammar lives in `minic.pest`;
//! this module is the builder layer that maps pest pairs onto AST nodes.

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use super::ast::{BinOp, Expr, FunDecl, Param, Program, Stmt, UnOp};

#[derive(Parser)]
#[grammar = "interpreter/minic.pest"]
struct MinicParser;

/* ===================== Error Types ===================== */

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("syntax error: {0}")]
    PestError(String),
    #[error("invalid program: {0}")]
    BuildError(String),
}

impl From<pest::error::Error<Rule>> for ParseError {
    fn from(err: pest::error::Error<Rule>) -> Self {
        ParseError::PestError(err.to_string())
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

/* ===================== Public API ===================== */

/// Parse a minic source string into a [`Program`].
pub fn parse_program(source: &str) -> ParseResult<Program> {
    let mut pairs = MinicParser::parse(Rule::program, source)?;
    let program = pairs.next().unwrap();

    let mut functions = Vec::new();
    let mut globals = Vec::new();

    for item in program.into_inner() {
        match item.as_rule() {
            Rule::function => functions.push(build_function(item)?),
            Rule::global_decl => globals.push(build_global_decl(item)?),
            Rule::EOI => {}
            other => {
                return Err(ParseError::BuildError(format!(
                    "unexpected top-level rule: {:?}",
                    other
                )))
            }
        }
    }

    Ok(Program { functions, globals })
}

/* ===================== AST Builder ===================== */

fn build_function(pair: Pair<Rule>) -> ParseResult<FunDecl> {
    // function = { type_name ~ identifier ~ "(" ~ param_list? ~ ")" ~ block }
    let mut inner = pair.into_inner();

    let ret_type = build_type_name(inner.next().unwrap());
    let name = inner.next().unwrap().as_str().to_string();

    let next = inner.next().unwrap();
    let (params, block_pair) = if next.as_rule() == Rule::param_list {
        let params = build_param_list(next)?;
        (params, inner.next().unwrap())
    } else {
        (vec![], next)
    };

    let body = build_block(block_pair)?;

    Ok(FunDecl {
        name,
        ret_type,
        params,
        body,
    })
}

fn build_param_list(pair: Pair<Rule>) -> ParseResult<Vec<Param>> {
    pair.into_inner()
        .map(|param_pair| {
            // param = { type_name ~ identifier }
            let mut inner = param_pair.into_inner();
            let ty = build_type_name(inner.next().unwrap());
            let name = inner.next().unwrap().as_str().to_string();
            Ok(Param { ty, name })
        })
        .collect()
}

fn build_global_decl(pair: Pair<Rule>) -> ParseResult<Stmt> {
    // global_decl = { type_name ~ identifier ~ ("=" ~ expression)? ~ ";" }
    let mut inner = pair.into_inner();
    let ty = build_type_name(inner.next().unwrap());
    let name = inner.next().unwrap().as_str().to_string();
    let init = inner.next().map(build_expression).transpose()?;
    Ok(Stmt::Declare { ty, name, init })
}

fn build_type_name(pair: Pair<Rule>) -> String {
    // type_name = { base_type ~ star? }
    let mut inner = pair.into_inner();
    let base = inner.next().unwrap().as_str().to_string();
    match inner.next() {
        Some(_) => format!("{} *", base),
        None => base,
    }
}

fn build_block(pair: Pair<Rule>) -> ParseResult<Vec<Stmt>> {
    // block = { "{" ~ statement* ~ "}" }
    pair.into_inner().map(build_statement).collect()
}

/// Inner pairs of a rule with the keyword tokens stripped. Keyword rules
/// are atomic, so they show up as pairs of their own.
fn inner_nodes<'i>(pair: Pair<'i, Rule>) -> impl Iterator<Item = Pair<'i, Rule>> {
    pair.into_inner().filter(|p| {
        !matches!(
            p.as_rule(),
            Rule::if_kw
                | Rule::else_kw
                | Rule::while_kw
                | Rule::return_kw
                | Rule::suspend_kw
                | Rule::resume_kw
                | Rule::co_await_kw
        )
    })
}

fn build_statement(pair: Pair<Rule>) -> ParseResult<Stmt> {
    match pair.as_rule() {
        Rule::statement => {
            let inner = pair.into_inner().next().unwrap();
            build_statement(inner)
        }
        Rule::declare_stmt => {
            let mut inner = pair.into_inner();
            let ty = build_type_name(inner.next().unwrap());
            let name = inner.next().unwrap().as_str().to_string();
            let init = inner.next().map(build_expression).transpose()?;
            Ok(Stmt::Declare { ty, name, init })
        }
        Rule::assign_stmt => {
            let mut inner = pair.into_inner();
            let name = inner.next().unwrap().as_str().to_string();
            let expr = build_expression(inner.next().unwrap())?;
            Ok(Stmt::Assign { name, expr })
        }
        Rule::if_stmt => {
            let mut inner = inner_nodes(pair);
            let test = build_expression(inner.next().unwrap())?;
            let then_body = build_block(inner.next().unwrap())?;
            let else_body = match inner.next() {
                None => None,
                // `else if` re-enters here as a single nested If statement
                Some(p) if p.as_rule() == Rule::if_stmt => Some(vec![build_statement(p)?]),
                Some(p) => Some(build_block(p)?),
            };
            Ok(Stmt::If {
                test,
                then_body,
                else_body,
            })
        }
        Rule::while_stmt => {
            let mut inner = inner_nodes(pair);
            let test = build_expression(inner.next().unwrap())?;
            let body = build_block(inner.next().unwrap())?;
            Ok(Stmt::While { test, body })
        }
        Rule::return_stmt => {
            let value = inner_nodes(pair).next().map(build_expression).transpose()?;
            Ok(Stmt::Return { value })
        }
        Rule::suspend_stmt => {
            let expr = build_expression(inner_nodes(pair).next().unwrap())?;
            Ok(Stmt::Suspend { expr })
        }
        Rule::resume_stmt => {
            let expr = build_expression(inner_nodes(pair).next().unwrap())?;
            Ok(Stmt::Resume { expr })
        }
        Rule::expr_stmt => {
            let expr = build_expression(pair.into_inner().next().unwrap())?;
            Ok(Stmt::Expr { expr })
        }
        other => Err(ParseError::BuildError(format!(
            "unexpected statement rule: {:?}",
            other
        ))),
    }
}

fn build_expression(pair: Pair<Rule>) -> ParseResult<Expr> {
    match pair.as_rule() {
        Rule::expression => build_expression(pair.into_inner().next().unwrap()),

        // Binary precedence levels all share the `lhs ~ (op ~ rhs)*` shape
        // and fold left-associatively.
        Rule::logic_or
        | Rule::logic_and
        | Rule::equality
        | Rule::comparison
        | Rule::term
        | Rule::factor => build_binary_chain(pair),

        Rule::unary => {
            let mut inner = pair.into_inner();
            let first = inner.next().unwrap();
            if first.as_rule() == Rule::un_op {
                let op = match first.as_str() {
                    "-" => UnOp::Neg,
                    _ => UnOp::Not,
                };
                let operand = build_expression(inner.next().unwrap())?;
                Ok(Expr::Unary {
                    op,
                    operand: Box::new(operand),
                })
            } else {
                build_expression(first)
            }
        }

        Rule::primary => build_expression(pair.into_inner().next().unwrap()),

        Rule::co_await_expr => {
            // co_await_expr = { co_await_kw ~ call_expr }
            let call = inner_nodes(pair).next().unwrap();
            let (callee, args) = build_call_parts(call)?;
            Ok(Expr::CoAwait { callee, args })
        }

        Rule::call_expr => {
            let (callee, args) = build_call_parts(pair)?;
            Ok(Expr::Call { callee, args })
        }

        Rule::literal => build_expression(pair.into_inner().next().unwrap()),

        Rule::int_lit => {
            let raw = pair.as_str();
            let v = raw.parse::<i64>().map_err(|e| {
                ParseError::BuildError(format!("failed to parse integer '{}': {}", raw, e))
            })?;
            Ok(Expr::LitInt { v })
        }

        Rule::float_lit => {
            let raw = pair.as_str();
            let v = raw.parse::<f64>().map_err(|e| {
                ParseError::BuildError(format!("failed to parse float '{}': {}", raw, e))
            })?;
            Ok(Expr::LitFloat { v })
        }

        Rule::string_lit => {
            let content = pair.into_inner().next().unwrap();
            Ok(Expr::LitStr {
                v: unescape(content.as_str()),
            })
        }

        Rule::null_lit => Ok(Expr::LitNull),

        Rule::identifier => Ok(Expr::Ident {
            name: pair.as_str().to_string(),
        }),

        other => Err(ParseError::BuildError(format!(
            "unexpected expression rule: {:?}",
            other
        ))),
    }
}

fn build_binary_chain(pair: Pair<Rule>) -> ParseResult<Expr> {
    let mut inner = pair.into_inner();
    let mut expr = build_expression(inner.next().unwrap())?;

    while let Some(op_pair) = inner.next() {
        let op = build_binop(op_pair.as_str())?;
        let rhs = build_expression(inner.next().unwrap())?;
        expr = Expr::Binary {
            op,
            left: Box::new(expr),
            right: Box::new(rhs),
        };
    }

    Ok(expr)
}

fn build_binop(op: &str) -> ParseResult<BinOp> {
    Ok(match op {
        "+" => BinOp::Add,
        "-" => BinOp::Sub,
        "*" => BinOp::Mul,
        "/" => BinOp::Div,
        "%" => BinOp::Mod,
        "==" => BinOp::Eq,
        "!=" => BinOp::Ne,
        "<" => BinOp::Lt,
        ">" => BinOp::Gt,
        "<=" => BinOp::Le,
        ">=" => BinOp::Ge,
        "&&" => BinOp::And,
        "||" => BinOp::Or,
        other => {
            return Err(ParseError::BuildError(format!(
                "unknown binary operator: {}",
                other
            )))
        }
    })
}

fn build_call_parts(pair: Pair<Rule>) -> ParseResult<(String, Vec<Expr>)> {
    // call_expr = { identifier ~ "(" ~ arg_list? ~ ")" }
    let mut inner = pair.into_inner();
    let callee = inner.next().unwrap().as_str().to_string();
    let args = match inner.next() {
        Some(arg_list) => arg_list
            .into_inner()
            .map(build_expression)
            .collect::<ParseResult<Vec<_>>>()?,
        None => vec![],
    };
    Ok((callee, args))
}

/// Resolve C-style escape sequences in a string literal body.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
