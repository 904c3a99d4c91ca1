// File: src/interpreter/control_flow.rs
//
// Control flow signals for statement execution.
//
// Executing a statement either completes normally or hits a `return`, which
// has to unwind through any enclosing if/while blocks up to the function call
// that is being evaluated. Carrying it as a value keeps errors and returns apart.

use super::value::Value;

/// How a statement (or a block of statements) finished
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Flow {
    /// Normal execution, continue to the next statement
    Normal,
    /// A return statement ran; stop and hand the value to the caller
    Return(Value),
}
