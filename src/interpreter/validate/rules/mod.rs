mod duplicate_function;
mod suspend_placement;
mod unknown_function;

pub use duplicate_function::DuplicateFunctionRule;
pub use suspend_placement::SuspendPlacementRule;
pub use unknown_function::UnknownFunctionRule;

use crate::interpreter::ast::{Expr, Stmt};

/// Walk every statement in a body, depth first.
pub(crate) fn walk_stmts<'a>(body: &'a [Stmt], visit: &mut impl FnMut(&'a Stmt)) {
    for stmt in body {
        visit(stmt);
        match stmt {
            Stmt::If {
                then_body,
                else_body,
                ..
            } => {
                walk_stmts(then_body, visit);
                if let Some(else_body) = else_body {
                    walk_stmts(else_body, visit);
                }
            }
            Stmt::While { body, .. } => walk_stmts(body, visit),
            _ => {}
        }
    }
}

/// Walk every expression reachable from a body, depth first.
pub(crate) fn walk_exprs<'a>(body: &'a [Stmt], visit: &mut impl FnMut(&'a Expr)) {
    walk_stmts(body, &mut |stmt| {
        let roots: Vec<&Expr> = match stmt {
            Stmt::Declare { init: Some(e), .. } => vec![e],
            Stmt::Declare { init: None, .. } => vec![],
            Stmt::Assign { expr, .. } => vec![expr],
            Stmt::If { test, .. } => vec![test],
            Stmt::While { test, .. } => vec![test],
            Stmt::Return { value: Some(e) } => vec![e],
            Stmt::Return { value: None } => vec![],
            Stmt::Expr { expr } => vec![expr],
            Stmt::Suspend { expr } => vec![expr],
            Stmt::Resume { expr } => vec![expr],
        };
        for root in roots {
            walk_expr_tree(root, visit);
        }
    });
}

fn walk_expr_tree<'a>(expr: &'a Expr, visit: &mut impl FnMut(&'a Expr)) {
    visit(expr);
    match expr {
        Expr::Unary { operand, .. } => walk_expr_tree(operand, visit),
        Expr::Binary { left, right, .. } => {
            walk_expr_tree(left, visit);
            walk_expr_tree(right, visit);
        }
        Expr::Call { args, .. } | Expr::CoAwait { args, .. } => {
            for arg in args {
                walk_expr_tree(arg, visit);
            }
        }
        _ => {}
    }
}
