//! Tree-walking evaluator
//!
//! One [`Interpreter`] exists per execution context: the main thread gets
//! one, and every coroutine carrier thread gets its own. They all share a
//! single [`Globals`], which holds the function table, global variables, the
//! output sink, and the coroutine registry.

use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Mutex};

use crate::coroutine::handoff::CarrierLink;
use crate::coroutine::Registry;
use crate::interpreter::ast::{BinOp, Expr, FunDecl, Program, Stmt, UnOp};
use crate::interpreter::env::Env;
use crate::interpreter::errors::{RuntimeError, RuntimeResult};
use crate::interpreter::stdlib;
use crate::interpreter::values::Value;

/* ===================== Shared State ===================== */

/// Tunables for a program run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Stack size for each coroutine carrier thread.
    pub carrier_stack_bytes: usize,
}

impl Default for RunOptions {
    fn default() -> RunOptions {
        RunOptions {
            carrier_stack_bytes: 512 * 1024,
        }
    }
}

/// State shared by the main interpreter and every carrier thread.
pub struct Globals {
    pub functions: HashMap<String, FunDecl>,
    pub variables: Mutex<HashMap<String, Value>>,
    pub coroutines: Registry,
    pub carrier_stack_bytes: usize,
    out: Mutex<Box<dyn Write + Send>>,
}

impl Globals {
    pub fn new(
        functions: HashMap<String, FunDecl>,
        out: Box<dyn Write + Send>,
        options: RunOptions,
    ) -> Globals {
        Globals {
            functions,
            variables: Mutex::new(HashMap::new()),
            coroutines: Registry::new(),
            carrier_stack_bytes: options.carrier_stack_bytes,
            out: Mutex::new(out),
        }
    }

    pub fn write_output(&self, bytes: &[u8]) -> RuntimeResult<()> {
        let mut out = self.out.lock().expect("output lock poisoned");
        out.write_all(bytes)
            .and_then(|_| out.flush())
            .map_err(|e| RuntimeError::Io(e.to_string()))
    }
}

/* ===================== Interpreter ===================== */

/// How a statement sequence ended.
enum Flow {
    Normal,
    Return(Value),
}

pub struct Interpreter {
    globals: Arc<Globals>,
    env: Env,
    /// Present only on carrier threads; `suspend` needs it.
    link: Option<CarrierLink>,
}

impl Interpreter {
    pub fn new(globals: Arc<Globals>) -> Interpreter {
        Interpreter {
            globals,
            env: Env::new(),
            link: None,
        }
    }

    /// Interpreter for a carrier thread, wired to its handoff channel.
    pub fn with_link(globals: Arc<Globals>, link: CarrierLink) -> Interpreter {
        Interpreter {
            globals,
            env: Env::new(),
            link: Some(link),
        }
    }

    pub fn into_link(self) -> Option<CarrierLink> {
        self.link
    }

    /// Run a function body to completion with a fresh local environment.
    pub fn call_function(&mut self, decl: &FunDecl, args: Vec<Value>) -> RuntimeResult<Value> {
        if args.len() != decl.params.len() {
            return Err(RuntimeError::ArityMismatch {
                name: decl.name.clone(),
                expected: decl.params.len(),
                got: args.len(),
            });
        }

        let mut frame = Env::new();
        for (param, arg) in decl.params.iter().zip(args) {
            frame.declare(&param.name, arg);
        }

        let saved = std::mem::replace(&mut self.env, frame);
        let result = self.exec_body(&decl.body);
        self.env = saved;

        match result? {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::Null),
        }
    }

    fn exec_body(&mut self, body: &[Stmt]) -> RuntimeResult<Flow> {
        for stmt in body {
            if let Flow::Return(v) = self.exec_stmt(stmt)? {
                return Ok(Flow::Return(v));
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_block(&mut self, body: &[Stmt]) -> RuntimeResult<Flow> {
        self.env.push_scope();
        let flow = self.exec_body(body);
        self.env.pop_scope();
        flow
    }

    fn exec_stmt(&mut self, stmt: &Stmt) -> RuntimeResult<Flow> {
        match stmt {
            Stmt::Declare { name, init, .. } => {
                let value = match init {
                    Some(expr) => self.eval(expr)?,
                    None => Value::Null,
                };
                self.env.declare(name, value);
                Ok(Flow::Normal)
            }
            Stmt::Assign { name, expr } => {
                let value = self.eval(expr)?;
                if self.env.assign(name, value.clone()) {
                    return Ok(Flow::Normal);
                }
                let mut globals = self
                    .globals
                    .variables
                    .lock()
                    .expect("globals lock poisoned");
                match globals.get_mut(name) {
                    Some(slot) => {
                        *slot = value;
                        Ok(Flow::Normal)
                    }
                    None => Err(RuntimeError::UnknownVariable(name.clone())),
                }
            }
            Stmt::If {
                test,
                then_body,
                else_body,
            } => {
                if self.eval(test)?.is_truthy() {
                    self.exec_block(then_body)
                } else if let Some(else_body) = else_body {
                    self.exec_block(else_body)
                } else {
                    Ok(Flow::Normal)
                }
            }
            Stmt::While { test, body } => {
                while self.eval(test)?.is_truthy() {
                    if let Flow::Return(v) = self.exec_block(body)? {
                        return Ok(Flow::Return(v));
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::Return { value } => {
                let v = match value {
                    Some(expr) => self.eval(expr)?,
                    None => Value::Null,
                };
                Ok(Flow::Return(v))
            }
            Stmt::Expr { expr } => {
                self.eval(expr)?;
                Ok(Flow::Normal)
            }
            Stmt::Suspend { expr } => {
                let value = self.eval(expr)?;
                let link = self
                    .link
                    .as_ref()
                    .ok_or(RuntimeError::SuspendOutsideCoroutine)?;
                link.yield_value(value)?;
                Ok(Flow::Normal)
            }
            Stmt::Resume { expr } => {
                match self.eval(expr)? {
                    Value::Handle { v } => self.globals.coroutines.resume(v)?,
                    _ => return Err(RuntimeError::InvalidHandle),
                }
                Ok(Flow::Normal)
            }
        }
    }

    fn eval(&mut self, expr: &Expr) -> RuntimeResult<Value> {
        match expr {
            Expr::LitInt { v } => Ok(Value::int(*v)),
            Expr::LitFloat { v } => Ok(Value::float(*v)),
            Expr::LitStr { v } => Ok(Value::str(v.clone())),
            Expr::LitNull => Ok(Value::Null),
            Expr::Ident { name } => self.lookup(name),
            Expr::Unary { op, operand } => {
                let v = self.eval(operand)?;
                self.eval_unary(*op, v)
            }
            Expr::Binary { op, left, right } => self.eval_binary(*op, left, right),
            Expr::Call { callee, args } => {
                let args = self.eval_args(args)?;
                self.call(callee, args)
            }
            Expr::CoAwait { callee, args } => {
                // Arguments are evaluated eagerly on the caller's thread;
                // only the body itself is deferred to the first resume.
                let args = self.eval_args(args)?;
                if stdlib::is_builtin(callee) {
                    return Err(RuntimeError::NotCallable(callee.clone()));
                }
                let decl = self
                    .globals
                    .functions
                    .get(callee)
                    .cloned()
                    .ok_or_else(|| RuntimeError::UnknownFunction(callee.clone()))?;
                let handle = self
                    .globals
                    .coroutines
                    .create(&self.globals, decl, args)?;
                Ok(Value::Handle { v: handle })
            }
        }
    }

    fn eval_args(&mut self, args: &[Expr]) -> RuntimeResult<Vec<Value>> {
        args.iter().map(|arg| self.eval(arg)).collect()
    }

    fn lookup(&self, name: &str) -> RuntimeResult<Value> {
        if let Some(v) = self.env.get(name) {
            return Ok(v.clone());
        }
        let globals = self
            .globals
            .variables
            .lock()
            .expect("globals lock poisoned");
        globals
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::UnknownVariable(name.to_string()))
    }

    fn call(&mut self, callee: &str, args: Vec<Value>) -> RuntimeResult<Value> {
        if let Some(decl) = self.globals.functions.get(callee).cloned() {
            return self.call_function(&decl, args);
        }
        if stdlib::is_builtin(callee) {
            return stdlib::call(&self.globals, callee, args);
        }
        Err(RuntimeError::UnknownFunction(callee.to_string()))
    }

    fn eval_unary(&self, op: UnOp, v: Value) -> RuntimeResult<Value> {
        match (op, v) {
            (UnOp::Neg, Value::Int { v }) => Ok(Value::int(v.wrapping_neg())),
            (UnOp::Neg, Value::Float { v }) => Ok(Value::float(-v)),
            (UnOp::Neg, other) => Err(RuntimeError::TypeError(format!(
                "cannot negate {}",
                other.type_name()
            ))),
            (UnOp::Not, v) => Ok(Value::bool(!v.is_truthy())),
        }
    }

    fn eval_binary(&mut self, op: BinOp, left: &Expr, right: &Expr) -> RuntimeResult<Value> {
        // Short-circuit forms never evaluate the right operand eagerly.
        match op {
            BinOp::And => {
                let l = self.eval(left)?;
                if !l.is_truthy() {
                    return Ok(Value::bool(false));
                }
                let r = self.eval(right)?;
                return Ok(Value::bool(r.is_truthy()));
            }
            BinOp::Or => {
                let l = self.eval(left)?;
                if l.is_truthy() {
                    return Ok(Value::bool(true));
                }
                let r = self.eval(right)?;
                return Ok(Value::bool(r.is_truthy()));
            }
            _ => {}
        }

        let l = self.eval(left)?;
        let r = self.eval(right)?;

        // Integer arithmetic wraps on overflow, two's-complement style.
        match op {
            BinOp::Add => match (l, r) {
                (Value::Int { v: a }, Value::Int { v: b }) => Ok(Value::int(a.wrapping_add(b))),
                (Value::Str { v: a }, Value::Str { v: b }) => Ok(Value::str(a + &b)),
                (a, b) => numeric_op(a, b, "+", |x, y| x + y),
            },
            BinOp::Sub => int_or_float(l, r, "-", |a, b| a.wrapping_sub(b), |a, b| a - b),
            BinOp::Mul => int_or_float(l, r, "*", |a, b| a.wrapping_mul(b), |a, b| a * b),
            BinOp::Div => match (l, r) {
                (Value::Int { v: _ }, Value::Int { v: 0 }) => Err(RuntimeError::DivisionByZero),
                (Value::Int { v: a }, Value::Int { v: b }) => Ok(Value::int(a.wrapping_div(b))),
                (a, b) => numeric_op(a, b, "/", |x, y| x / y),
            },
            BinOp::Mod => match (l, r) {
                (Value::Int { v: _ }, Value::Int { v: 0 }) => Err(RuntimeError::DivisionByZero),
                (Value::Int { v: a }, Value::Int { v: b }) => Ok(Value::int(a.wrapping_rem(b))),
                (a, b) => Err(RuntimeError::TypeError(format!(
                    "cannot apply % to {} and {}",
                    a.type_name(),
                    b.type_name()
                ))),
            },
            BinOp::Eq => Ok(Value::bool(values_equal(&l, &r))),
            BinOp::Ne => Ok(Value::bool(!values_equal(&l, &r))),
            BinOp::Lt => compare(l, r, "<", |o| o == std::cmp::Ordering::Less),
            BinOp::Gt => compare(l, r, ">", |o| o == std::cmp::Ordering::Greater),
            BinOp::Le => compare(l, r, "<=", |o| o != std::cmp::Ordering::Greater),
            BinOp::Ge => compare(l, r, ">=", |o| o != std::cmp::Ordering::Less),
            BinOp::And | BinOp::Or => unreachable!("handled above"),
        }
    }
}

/* ===================== Operator Helpers ===================== */

fn as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Int { v } => Some(*v as f64),
        Value::Float { v } => Some(*v),
        _ => None,
    }
}

fn numeric_op(l: Value, r: Value, sym: &str, f: impl Fn(f64, f64) -> f64) -> RuntimeResult<Value> {
    match (as_f64(&l), as_f64(&r)) {
        (Some(a), Some(b)) => Ok(Value::float(f(a, b))),
        _ => Err(RuntimeError::TypeError(format!(
            "cannot apply {} to {} and {}",
            sym,
            l.type_name(),
            r.type_name()
        ))),
    }
}

fn int_or_float(
    l: Value,
    r: Value,
    sym: &str,
    fi: impl Fn(i64, i64) -> i64,
    ff: impl Fn(f64, f64) -> f64,
) -> RuntimeResult<Value> {
    match (l, r) {
        (Value::Int { v: a }, Value::Int { v: b }) => Ok(Value::int(fi(a, b))),
        (a, b) => numeric_op(a, b, sym, ff),
    }
}

fn values_equal(l: &Value, r: &Value) -> bool {
    match (l, r) {
        // Cross-numeric comparison promotes to float.
        (Value::Int { .. } | Value::Float { .. }, Value::Int { .. } | Value::Float { .. }) => {
            match (as_f64(l), as_f64(r)) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            }
        }
        _ => l == r,
    }
}

fn compare(
    l: Value,
    r: Value,
    sym: &str,
    pred: impl Fn(std::cmp::Ordering) -> bool,
) -> RuntimeResult<Value> {
    let ord = match (&l, &r) {
        (Value::Str { v: a }, Value::Str { v: b }) => Some(a.cmp(b)),
        _ => match (as_f64(&l), as_f64(&r)) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => None,
        },
    };
    match ord {
        Some(o) => Ok(Value::bool(pred(o))),
        None => Err(RuntimeError::TypeError(format!(
            "cannot apply {} to {} and {}",
            sym,
            l.type_name(),
            r.type_name()
        ))),
    }
}

/* ===================== Entry Point ===================== */

/// Execute a parsed program: bind globals, then run `main`.
///
/// Coroutines still suspended when `main` returns are torn down without
/// running any further script code.
pub fn run_program(
    program: &Program,
    out: Box<dyn Write + Send>,
    options: RunOptions,
) -> RuntimeResult<Value> {
    let functions: HashMap<String, FunDecl> = program
        .functions
        .iter()
        .map(|f| (f.name.clone(), f.clone()))
        .collect();

    let globals = Arc::new(Globals::new(functions, out, options));
    let result = run_main(&globals, program);

    // Disconnect leftover carriers before the shared state unwinds, so no
    // thread outlives the run.
    globals.coroutines.shutdown();

    result
}

fn run_main(globals: &Arc<Globals>, program: &Program) -> RuntimeResult<Value> {
    let mut interp = Interpreter::new(Arc::clone(globals));

    // Global declarations run top to bottom on the main thread before main.
    for stmt in &program.globals {
        if let Stmt::Declare { name, init, .. } = stmt {
            let value = match init {
                Some(expr) => interp.eval(expr)?,
                None => Value::Null,
            };
            globals
                .variables
                .lock()
                .expect("globals lock poisoned")
                .insert(name.clone(), value);
        }
    }

    let main = globals
        .functions
        .get("main")
        .cloned()
        .ok_or_else(|| RuntimeError::UnknownFunction("main".to_string()))?;

    interp.call_function(&main, vec![])
}
