//! Built-in functions
//!
//! A deliberately small printf-family surface, enough for the scripts this
//! language is aimed at. Builtins write through the shared output sink so
//! tests can capture what a script prints.

use std::sync::Arc;

use crate::interpreter::errors::{RuntimeError, RuntimeResult};
use crate::interpreter::eval::Globals;
use crate::interpreter::values::Value;

const BUILTINS: &[&str] = &["printf", "print"];

pub fn is_builtin(name: &str) -> bool {
    BUILTINS.contains(&name)
}

pub fn call(globals: &Arc<Globals>, name: &str, args: Vec<Value>) -> RuntimeResult<Value> {
    match name {
        "printf" => printf(globals, args),
        "print" => print(globals, args),
        _ => Err(RuntimeError::UnknownFunction(name.to_string())),
    }
}

/// `printf(fmt, ...)` with a subset of C conversions: %d, %f, %s, %%.
/// Returns the number of bytes written, like the C function.
fn printf(globals: &Arc<Globals>, args: Vec<Value>) -> RuntimeResult<Value> {
    let mut args = args.into_iter();
    let fmt = match args.next() {
        Some(Value::Str { v }) => v,
        Some(other) => {
            return Err(RuntimeError::TypeError(format!(
                "printf format must be a string, got {}",
                other.type_name()
            )))
        }
        None => {
            return Err(RuntimeError::ArityMismatch {
                name: "printf".to_string(),
                expected: 1,
                got: 0,
            })
        }
    };

    let mut out = String::new();
    let mut chars = fmt.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('%') => out.push('%'),
            Some('d') => match args.next() {
                Some(Value::Int { v }) => out.push_str(&v.to_string()),
                Some(Value::Float { v }) => out.push_str(&(v as i64).to_string()),
                Some(Value::Bool { v }) => out.push_str(if v { "1" } else { "0" }),
                Some(other) => {
                    return Err(RuntimeError::TypeError(format!(
                        "%d expects a number, got {}",
                        other.type_name()
                    )))
                }
                None => {
                    return Err(RuntimeError::TypeError(
                        "printf: not enough arguments for format".to_string(),
                    ))
                }
            },
            Some('f') => match args.next() {
                Some(Value::Float { v }) => out.push_str(&format!("{:.6}", v)),
                Some(Value::Int { v }) => out.push_str(&format!("{:.6}", v as f64)),
                Some(other) => {
                    return Err(RuntimeError::TypeError(format!(
                        "%f expects a number, got {}",
                        other.type_name()
                    )))
                }
                None => {
                    return Err(RuntimeError::TypeError(
                        "printf: not enough arguments for format".to_string(),
                    ))
                }
            },
            Some('s') => match args.next() {
                Some(v) => out.push_str(&v.to_string()),
                None => {
                    return Err(RuntimeError::TypeError(
                        "printf: not enough arguments for format".to_string(),
                    ))
                }
            },
            Some(other) => {
                return Err(RuntimeError::TypeError(format!(
                    "printf: unsupported conversion %{}",
                    other
                )))
            }
            None => out.push('%'),
        }
    }

    globals.write_output(out.as_bytes())?;
    Ok(Value::int(out.len() as i64))
}

/// `print(value)`: display the value followed by a newline.
fn print(globals: &Arc<Globals>, args: Vec<Value>) -> RuntimeResult<Value> {
    let mut out = String::new();
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&arg.to_string());
    }
    out.push('\n');
    globals.write_output(out.as_bytes())?;
    Ok(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::eval::{Globals, RunOptions};
    use std::sync::Mutex;

    fn test_globals() -> (Arc<Globals>, Arc<Mutex<Vec<u8>>>) {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let sink = crate::interpreter::tests::helpers::SharedBuf(Arc::clone(&buf));
        let globals = Arc::new(Globals::new(
            Default::default(),
            Box::new(sink),
            RunOptions::default(),
        ));
        (globals, buf)
    }

    #[test]
    fn printf_formats_conversions() {
        let (globals, buf) = test_globals();
        let n = printf(
            &globals,
            vec![
                Value::str("x=%d y=%f s=%s %%\n"),
                Value::int(3),
                Value::float(1.5),
                Value::str("hi"),
            ],
        )
        .unwrap();
        let written = String::from_utf8(buf.lock().unwrap().clone()).unwrap();
        assert_eq!(written, "x=3 y=1.500000 s=hi %\n");
        assert_eq!(n, Value::int(written.len() as i64));
    }

    #[test]
    fn printf_rejects_non_string_format() {
        let (globals, _) = test_globals();
        assert!(matches!(
            printf(&globals, vec![Value::int(1)]),
            Err(RuntimeError::TypeError(_))
        ));
    }
}
