// File: src/interpreter/output.rs
//
// Output channel for print statements.
//
// Printed values go either straight to stdout (the default) or into an
// in-memory buffer that the host reads back, which is how the test runner and
// the integration tests observe a program's output.

use super::value::Value;
use std::cell::RefCell;
use std::io::{self, ErrorKind, Write};
use std::rc::Rc;

/// Where print statements send their values
#[derive(Debug, Clone, Default)]
pub enum Output {
    /// One value per line on stdout
    #[default]
    Stdout,
    /// Append to a shared buffer
    Capture(CapturedOutput),
}

impl Output {
    /// Emit one printed value
    pub fn emit(&self, value: &Value) {
        match self {
            Output::Stdout => write_line(&mut io::stdout().lock(), value),
            Output::Capture(buffer) => buffer.push(value.clone()),
        }
    }
}

/// A closed reader (`sprout run x.sp | head`) is not an error for the program
fn write_line(out: &mut impl Write, value: &Value) {
    match writeln!(out, "{}", value) {
        Ok(()) => {}
        Err(err) if err.kind() == ErrorKind::BrokenPipe => {}
        Err(err) => tracing::warn!(%err, "failed to write printed value"),
    }
}

/// Handle to the values printed into an `Output::Capture` buffer, in print order
#[derive(Debug, Clone, Default)]
pub struct CapturedOutput {
    values: Rc<RefCell<Vec<Value>>>,
}

impl CapturedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, value: Value) {
        self.values.borrow_mut().push(value);
    }

    /// Every value printed so far
    pub fn values(&self) -> Vec<Value> {
        self.values.borrow().clone()
    }

    /// Printed values rendered the way stdout would show them
    pub fn lines(&self) -> Vec<String> {
        self.values.borrow().iter().map(ToString::to_string).collect()
    }

    pub fn clear(&self) {
        self.values.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_preserves_order() {
        let captured = CapturedOutput::new();
        let output = Output::Capture(captured.clone());

        output.emit(&Value::Number(1.0));
        output.emit(&Value::Bool(true));
        output.emit(&Value::Number(2.5));

        assert_eq!(captured.values(), vec![Value::Number(1.0), Value::Bool(true), Value::Number(2.5)]);
        assert_eq!(captured.lines(), vec!["1", "true", "2.5"]);

        captured.clear();
        assert!(captured.values().is_empty());
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::from(ErrorKind::BrokenPipe))
        }
    }

    #[test]
    fn test_write_to_closed_pipe_does_not_panic() {
        write_line(&mut ClosedPipe, &Value::Number(1.0));
        write_line(&mut ClosedPipe, &Value::Bool(false));
    }

    #[test]
    fn test_write_line_formats_like_display() {
        let mut buffer = Vec::new();
        write_line(&mut buffer, &Value::Number(2.5));
        write_line(&mut buffer, &Value::Bool(true));
        assert_eq!(String::from_utf8(buffer).unwrap(), "2.5\ntrue\n");
    }
}
