// File: src/ast.rs
//
// Abstract Syntax Tree (AST) definitions for the Sprout language.
// Defines the structure of parsed Sprout programs.
//
// Expressions (Expr) represent values and computations, while Statements (Stmt)
// represent actions and control flow. Both are closed sum types so the
// interpreter's dispatch is checked for completeness by the compiler.
//
// The serde attributes give the AST a JSON shape tagged by `kind`, so programs
// produced by an external parser can be loaded without going through
// `crate::parser`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary operators understood by the evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOperator {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
    #[serde(rename = "&&")]
    And,
    #[serde(rename = "||")]
    Or,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = "<")]
    Less,
    #[serde(rename = "===")]
    StrictEq,
}

impl BinaryOperator {
    /// Source spelling of the operator
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::And => "&&",
            BinaryOperator::Or => "||",
            BinaryOperator::Greater => ">",
            BinaryOperator::Less => "<",
            BinaryOperator::StrictEq => "===",
        }
    }

    /// Maps a source spelling back to the operator
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(BinaryOperator::Add),
            "-" => Some(BinaryOperator::Sub),
            "*" => Some(BinaryOperator::Mul),
            "/" => Some(BinaryOperator::Div),
            "&&" => Some(BinaryOperator::And),
            "||" => Some(BinaryOperator::Or),
            ">" => Some(BinaryOperator::Greater),
            "<" => Some(BinaryOperator::Less),
            "===" => Some(BinaryOperator::StrictEq),
            _ => None,
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Represents an expression in Sprout - something that evaluates to a value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Expr {
    Number {
        value: f64,
    },
    Boolean {
        value: bool,
    },
    Variable {
        name: String,
    },
    #[serde(rename = "operator")]
    Binary {
        operator: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Function {
        parameters: Vec<String>,
        body: Vec<Stmt>,
    },
    Call {
        callee: String,
        arguments: Vec<Expr>,
    },
    /// Any `kind` tag this version does not recognise
    #[serde(other)]
    Unknown,
}

impl Expr {
    pub fn number(value: f64) -> Self {
        Expr::Number { value }
    }

    pub fn boolean(value: bool) -> Self {
        Expr::Boolean { value }
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Expr::Variable { name: name.into() }
    }

    pub fn binary(operator: BinaryOperator, left: Expr, right: Expr) -> Self {
        Expr::Binary { operator, left: Box::new(left), right: Box::new(right) }
    }

    pub fn function(parameters: Vec<String>, body: Vec<Stmt>) -> Self {
        Expr::Function { parameters, body }
    }

    pub fn call(callee: impl Into<String>, arguments: Vec<Expr>) -> Self {
        Expr::Call { callee: callee.into(), arguments }
    }
}

/// Represents a statement in Sprout - an action with no value of its own
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Stmt {
    /// `let name = expression;` - declares in the innermost scope only
    Let {
        name: String,
        expression: Expr,
    },
    /// `name = expression;` - updates the nearest existing binding
    Assignment {
        name: String,
        expression: Expr,
    },
    If {
        test: Expr,
        #[serde(rename = "truePart")]
        true_part: Vec<Stmt>,
        #[serde(rename = "falsePart")]
        false_part: Vec<Stmt>,
    },
    While {
        test: Expr,
        body: Vec<Stmt>,
    },
    Print {
        expression: Expr,
    },
    Expression {
        expression: Expr,
    },
    Return {
        expression: Expr,
    },
    /// Any `kind` tag this version does not recognise
    #[serde(other)]
    Unknown,
}

impl Stmt {
    pub fn let_(name: impl Into<String>, expression: Expr) -> Self {
        Stmt::Let { name: name.into(), expression }
    }

    pub fn assign(name: impl Into<String>, expression: Expr) -> Self {
        Stmt::Assignment { name: name.into(), expression }
    }

    pub fn if_(test: Expr, true_part: Vec<Stmt>, false_part: Vec<Stmt>) -> Self {
        Stmt::If { test, true_part, false_part }
    }

    pub fn while_(test: Expr, body: Vec<Stmt>) -> Self {
        Stmt::While { test, body }
    }

    pub fn print(expression: Expr) -> Self {
        Stmt::Print { expression }
    }

    pub fn expression(expression: Expr) -> Self {
        Stmt::Expression { expression }
    }

    pub fn return_(expression: Expr) -> Self {
        Stmt::Return { expression }
    }

    /// The `kind` tag this statement carries in JSON
    pub fn kind_name(&self) -> &'static str {
        match self {
            Stmt::Let { .. } => "let",
            Stmt::Assignment { .. } => "assignment",
            Stmt::If { .. } => "if",
            Stmt::While { .. } => "while",
            Stmt::Print { .. } => "print",
            Stmt::Expression { .. } => "expression",
            Stmt::Return { .. } => "return",
            Stmt::Unknown => "unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_statement_json_uses_kind_tags() {
        let json = r#"[
            {"kind": "let", "name": "x", "expression": {"kind": "number", "value": 1}},
            {"kind": "if", "test": {"kind": "boolean", "value": true},
             "truePart": [{"kind": "assignment", "name": "x",
                           "expression": {"kind": "operator", "operator": "+",
                                          "left": {"kind": "variable", "name": "x"},
                                          "right": {"kind": "number", "value": 2}}}],
             "falsePart": []}
        ]"#;
        let program: Vec<Stmt> = serde_json::from_str(json).unwrap();

        assert_eq!(
            program,
            vec![
                Stmt::let_("x", Expr::number(1.0)),
                Stmt::if_(
                    Expr::boolean(true),
                    vec![Stmt::assign(
                        "x",
                        Expr::binary(BinaryOperator::Add, Expr::variable("x"), Expr::number(2.0)),
                    )],
                    vec![],
                ),
            ]
        );
    }

    #[test]
    fn test_unrecognised_kinds_become_unknown() {
        let stmt: Stmt = serde_json::from_str(r#"{"kind": "invalid"}"#).unwrap();
        assert_eq!(stmt, Stmt::Unknown);

        let expr: Expr = serde_json::from_str(r#"{"kind": "invalid"}"#).unwrap();
        assert_eq!(expr, Expr::Unknown);
    }

    #[test]
    fn test_call_and_function_fields() {
        let json = r#"{"kind": "call", "callee": "f",
                       "arguments": [{"kind": "function", "parameters": ["a"], "body": []}]}"#;
        let expr: Expr = serde_json::from_str(json).unwrap();
        assert_eq!(expr, Expr::call("f", vec![Expr::function(vec!["a".to_string()], vec![])]));
    }

    #[test]
    fn test_operator_symbols_round_trip() {
        for symbol in ["+", "-", "*", "/", "&&", "||", ">", "<", "==="] {
            let op = BinaryOperator::from_symbol(symbol).unwrap();
            assert_eq!(op.symbol(), symbol);
        }
        assert_eq!(BinaryOperator::from_symbol("=="), None);
    }
}
