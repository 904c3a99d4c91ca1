// File: src/interpreter/operators.rs
//
// Binary operator semantics on already-evaluated operands.
//
// Short-circuiting lives in the interpreter, which decides whether the right
// operand is evaluated at all. Once both operands exist, the rules here apply.

use super::value::Value;
use crate::ast::BinaryOperator;
use crate::errors::{RuntimeError, TypeError};

/// Apply `op` to two evaluated operands
pub fn evaluate_binary(op: BinaryOperator, left: &Value, right: &Value) -> Result<Value, RuntimeError> {
    match op {
        BinaryOperator::And | BinaryOperator::Or => {
            let l = logical_left_operand(op, left)?;
            Ok(short_circuit(op, l).unwrap_or_else(|| right.clone()))
        }
        BinaryOperator::Add => {
            let (a, b) = arithmetic_operands(left, right)?;
            Ok(Value::Number(a + b))
        }
        BinaryOperator::Sub => {
            let (a, b) = arithmetic_operands(left, right)?;
            Ok(Value::Number(a - b))
        }
        BinaryOperator::Mul => {
            let (a, b) = arithmetic_operands(left, right)?;
            Ok(Value::Number(a * b))
        }
        BinaryOperator::Div => {
            let (a, b) = arithmetic_operands(left, right)?;
            // -0 counts as zero too
            if b == 0.0 {
                return Err(RuntimeError::DivisionByZero);
            }
            Ok(Value::Number(a / b))
        }
        BinaryOperator::Greater => {
            let (a, b) = comparison_operands(left, right)?;
            Ok(Value::Bool(a > b))
        }
        BinaryOperator::Less => {
            let (a, b) = comparison_operands(left, right)?;
            Ok(Value::Bool(a < b))
        }
        BinaryOperator::StrictEq => Ok(Value::Bool(left.strict_equals(right))),
    }
}

/// The left operand of `&&`/`||` must be a boolean
pub fn logical_left_operand(op: BinaryOperator, left: &Value) -> Result<bool, RuntimeError> {
    left.as_bool()
        .ok_or_else(|| TypeError::LogicalOperand { operator: op, found: left.kind() }.into())
}

/// The result of `&&`/`||` if the left operand alone decides it
pub fn short_circuit(op: BinaryOperator, left: bool) -> Option<Value> {
    match (op, left) {
        (BinaryOperator::And, false) => Some(Value::Bool(false)),
        (BinaryOperator::Or, true) => Some(Value::Bool(true)),
        _ => None,
    }
}

fn arithmetic_operands(left: &Value, right: &Value) -> Result<(f64, f64), RuntimeError> {
    match (left.as_number(), right.as_number()) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(TypeError::Arithmetic { left: left.kind(), right: right.kind() }.into()),
    }
}

fn comparison_operands(left: &Value, right: &Value) -> Result<(f64, f64), RuntimeError> {
    match (left.as_number(), right.as_number()) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(TypeError::Comparison { left: left.kind(), right: right.kind() }.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use BinaryOperator::*;

    fn num(n: f64) -> Value {
        Value::Number(n)
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(evaluate_binary(Add, &num(2.0), &num(3.0)), Ok(num(5.0)));
        assert_eq!(evaluate_binary(Sub, &num(2.0), &num(3.0)), Ok(num(-1.0)));
        assert_eq!(evaluate_binary(Mul, &num(2.0), &num(3.0)), Ok(num(6.0)));
        assert_eq!(evaluate_binary(Div, &num(3.0), &num(2.0)), Ok(num(1.5)));
    }

    #[test]
    fn test_division_by_either_zero() {
        assert_eq!(evaluate_binary(Div, &num(1.0), &num(0.0)), Err(RuntimeError::DivisionByZero));
        assert_eq!(evaluate_binary(Div, &num(1.0), &num(-0.0)), Err(RuntimeError::DivisionByZero));
    }

    #[test]
    fn test_type_check_precedes_zero_check() {
        assert_eq!(
            evaluate_binary(Div, &Value::Bool(true), &num(0.0)),
            Err(TypeError::Arithmetic { left: "boolean", right: "number" }.into())
        );
    }

    #[test]
    fn test_comparison_requires_numbers() {
        assert_eq!(evaluate_binary(Less, &num(1.0), &num(2.0)), Ok(Value::Bool(true)));
        assert_eq!(evaluate_binary(Greater, &num(1.0), &num(2.0)), Ok(Value::Bool(false)));
        assert_eq!(
            evaluate_binary(Greater, &num(1.0), &Value::Bool(true)),
            Err(TypeError::Comparison { left: "number", right: "boolean" }.into())
        );
    }

    #[test]
    fn test_logical_right_operand_is_not_checked() {
        assert_eq!(evaluate_binary(And, &Value::Bool(true), &num(7.0)), Ok(num(7.0)));
        assert_eq!(evaluate_binary(Or, &Value::Bool(false), &num(7.0)), Ok(num(7.0)));
        assert_eq!(evaluate_binary(Or, &Value::Bool(true), &num(7.0)), Ok(Value::Bool(true)));
        assert_eq!(
            evaluate_binary(And, &num(1.0), &Value::Bool(true)),
            Err(TypeError::LogicalOperand { operator: And, found: "number" }.into())
        );
    }

    #[test]
    fn test_strict_equality_never_fails() {
        assert_eq!(evaluate_binary(StrictEq, &num(5.0), &num(5.0)), Ok(Value::Bool(true)));
        assert_eq!(evaluate_binary(StrictEq, &num(1.0), &Value::Bool(true)), Ok(Value::Bool(false)));
    }
}
