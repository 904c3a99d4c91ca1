// File: src/interpreter/value.rs
//
// Runtime value types for the Sprout language.
// A value is a number, a boolean, or a function. Kinds never convert into
// each other implicitly; every operator checks the kinds it receives.

use crate::ast::Stmt;
use serde::ser::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// A function value created by evaluating a function literal
#[derive(Debug)]
pub struct Function {
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
    /// Non-root bindings visible where the literal was evaluated, copied by value
    pub captured: HashMap<String, Value>,
}

/// Runtime values
#[derive(Debug, Clone)]
pub enum Value {
    Number(f64),
    Bool(bool),
    Function(Rc<Function>),
}

impl Value {
    /// Kind name used in type error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Bool(_) => "boolean",
            Value::Function(_) => "function",
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// `===` semantics: different kinds are never equal, functions compare by identity
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.strict_equals(other)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// Formats a number the way the language prints it: integral values without
/// a fractional part, infinities spelled out
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n == f64::INFINITY {
        "Infinity".to_string()
    } else if n == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        // -0 prints as 0
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Function(func) => write!(f, "<function({})>", func.params.join(", ")),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            // JSON has no infinities or NaN, so those go out as their printed form
            Value::Number(n) if n.is_finite() => serializer.serialize_f64(*n),
            Value::Number(n) => serializer.serialize_str(&format_number(*n)),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Function(_) => serializer.serialize_str(&self.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn function(params: &[&str]) -> Value {
        Value::Function(Rc::new(Function {
            params: params.iter().map(|p| p.to_string()).collect(),
            body: Vec::new(),
            captured: HashMap::new(),
        }))
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(Value::Number(4.0).to_string(), "4");
        assert_eq!(Value::Number(-0.0).to_string(), "0");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Number(f64::INFINITY).to_string(), "Infinity");
        assert_eq!(Value::Number(f64::NEG_INFINITY).to_string(), "-Infinity");
        assert_eq!(Value::Number(f64::NAN).to_string(), "NaN");
        assert_eq!(Value::Bool(false).to_string(), "false");
        assert_eq!(function(&["a", "b"]).to_string(), "<function(a, b)>");
    }

    #[test]
    fn test_strict_equality_never_crosses_kinds() {
        assert!(Value::Number(1.0).strict_equals(&Value::Number(1.0)));
        assert!(!Value::Number(1.0).strict_equals(&Value::Bool(true)));
        assert!(!Value::Bool(false).strict_equals(&Value::Number(0.0)));
        assert!(!Value::Number(f64::NAN).strict_equals(&Value::Number(f64::NAN)));
    }

    #[test]
    fn test_functions_compare_by_identity() {
        let f = function(&["a"]);
        let g = function(&["a"]);
        assert!(f.strict_equals(&f.clone()));
        assert!(!f.strict_equals(&g));
    }

    #[test]
    fn test_serialize_to_json() {
        let values = vec![Value::Number(3.0), Value::Bool(true), Value::Number(f64::INFINITY)];
        assert_eq!(serde_json::to_string(&values).unwrap(), r#"[3.0,true,"Infinity"]"#);
    }
}
