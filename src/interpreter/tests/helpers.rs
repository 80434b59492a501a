use std::io::Write;
use std::sync::{Arc, Mutex};

use crate::interpreter::errors::RuntimeResult;
use crate::interpreter::eval::{run_program, RunOptions};
use crate::interpreter::parser::parse_program;
use crate::interpreter::values::Value;

/// A clonable in-memory sink so tests can read back what a script printed.
pub struct SharedBuf(pub Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().expect("test buffer poisoned").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Parse and run a script, returning the result of `main` plus everything
/// the script printed.
pub fn run_source(source: &str) -> (RuntimeResult<Value>, String) {
    let program = parse_program(source).expect("test source failed to parse");
    let buf = Arc::new(Mutex::new(Vec::new()));
    let sink = SharedBuf(Arc::clone(&buf));
    let result = run_program(&program, Box::new(sink), RunOptions::default());
    let output = String::from_utf8(buf.lock().expect("test buffer poisoned").clone())
        .expect("script output was not utf-8");
    (result, output)
}
