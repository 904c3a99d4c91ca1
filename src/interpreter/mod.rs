// File: src/interpreter/mod.rs
//
// Tree-walking interpreter for the Sprout language.
// Executes Sprout programs by traversing the Abstract Syntax Tree (AST).
//
// The interpreter maintains an environment (a stack of scope frames), evaluates
// expressions to produce values, and executes statements to perform actions:
// - Variable declaration and assignment with block scoping
// - Short-circuit && and ||, strict operand kind checks on every operator
// - if/else and while, each block running in its own scope
// - print through a configurable output channel
// - Function literals, calls and return
//
// Every failure is a RuntimeError that aborts the run; nothing is recovered.

mod control_flow;
mod environment;
mod operators;
mod output;
mod test_runner;
mod value;

pub use environment::{Environment, Frame, State};
pub use operators::evaluate_binary;
pub use output::{CapturedOutput, Output};
pub use test_runner::{transcript, ScriptResult, SnapshotRunner, TestReport};
pub use value::{format_number, Function, Value};

use control_flow::Flow;

use crate::ast::{BinaryOperator, Expr, Stmt};
use crate::errors::{Aborted, ConditionSite, RuntimeError};
use crate::stack::ensure_sufficient_stack;
use std::rc::Rc;

/// How many calls may be active at once before a run fails with
/// `RecursionLimit`
pub const DEFAULT_MAX_CALL_DEPTH: usize = 50_000;

/// Runs `program` in a fresh interpreter, printing to stdout.
///
/// Returns the root frame's bindings, or the error that stopped the run
/// together with the bindings as they were at that point.
pub fn run(program: &[Stmt]) -> Result<State, Aborted> {
    Interpreter::new().run(program)
}

/// Main interpreter that executes Sprout programs
#[derive(Debug)]
pub struct Interpreter {
    env: Environment,
    output: Output,
    call_depth: usize,
    max_call_depth: usize,
    /// Names in scope where the last error was raised, recorded before the
    /// failing blocks are popped
    failure_scope: Option<Vec<String>>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Interpreter {
            env: Environment::new(),
            output: Output::default(),
            call_depth: 0,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            failure_scope: None,
        }
    }
}

impl Interpreter {
    /// Creates a new interpreter with an empty root frame, printing to stdout
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an interpreter over an existing environment
    pub fn with_env(env: Environment) -> Self {
        Interpreter { env, ..Self::default() }
    }

    /// Limits how deeply calls may nest
    pub fn set_max_call_depth(&mut self, depth: usize) {
        self.max_call_depth = depth;
    }

    /// Redirects print statements into a fresh buffer and returns a handle to it
    pub fn capture_output(&mut self) -> CapturedOutput {
        let captured = CapturedOutput::new();
        self.output = Output::Capture(captured.clone());
        captured
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// The root frame's bindings
    pub fn state(&self) -> State {
        self.env.root_state()
    }

    /// Drops every binding, keeping the output channel
    pub fn reset(&mut self) {
        self.env = Environment::new();
        self.call_depth = 0;
        self.failure_scope = None;
    }

    /// Names that were in scope where the last error was raised. Falls back
    /// to what is visible now when nothing was recorded.
    pub fn take_failure_scope(&mut self) -> Vec<String> {
        self.failure_scope.take().unwrap_or_else(|| self.env.visible_names())
    }

    fn note_failure_scope(&mut self) {
        if self.failure_scope.is_none() {
            self.failure_scope = Some(self.env.visible_names());
        }
    }

    /// Executes top-level statements in order against the root frame.
    ///
    /// Bindings already present in the root frame (from earlier runs or from
    /// `with_env`) stay visible. Use the free function `run` for an isolated run.
    #[tracing::instrument(level = "debug", skip_all, fields(statements = program.len()))]
    pub fn run(&mut self, program: &[Stmt]) -> Result<State, Aborted> {
        self.failure_scope = None;
        for stmt in program {
            if let Err(error) = self.execute(stmt) {
                tracing::debug!(%error, "run aborted");
                let visible = self.take_failure_scope();
                return Err(Aborted { error, state: self.state(), visible });
            }
        }
        let state = self.state();
        tracing::debug!(bindings = state.len(), "run finished");
        Ok(state)
    }

    /// Executes one statement against the current frame
    pub fn execute(&mut self, stmt: &Stmt) -> Result<(), RuntimeError> {
        self.exec_stmt(stmt).map(|_| ())
    }

    /// Executes one statement for an interactive session. Expression
    /// statements hand back their value (a call without `return` gives None).
    pub fn execute_interactive(&mut self, stmt: &Stmt) -> Result<Option<Value>, RuntimeError> {
        self.failure_scope = None;
        match stmt {
            Stmt::Expression { expression } => self.eval_discardable(expression),
            _ => self.execute(stmt).map(|_| None),
        }
    }

    /// Evaluates an expression against the current frame
    pub fn eval_expr(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        ensure_sufficient_stack(|| self.eval_node(expr))
    }

    fn eval_node(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Number { value } => Ok(Value::Number(*value)),
            Expr::Boolean { value } => Ok(Value::Bool(*value)),
            Expr::Variable { name } => self
                .env
                .get(name)
                .cloned()
                .ok_or_else(|| RuntimeError::UndefinedVariable(name.clone())),
            Expr::Binary { operator, left, right } => self.eval_binary(*operator, left, right),
            Expr::Function { parameters, body } => Ok(Value::Function(Rc::new(Function {
                params: parameters.clone(),
                body: body.clone(),
                captured: self.env.capture_locals(),
            }))),
            Expr::Call { callee, arguments } => self
                .call_function(callee, arguments)?
                .ok_or_else(|| RuntimeError::MissingReturnValue(callee.clone())),
            Expr::Unknown => Err(RuntimeError::UnknownExpression),
        }
    }

    fn eval_binary(&mut self, op: BinaryOperator, left: &Expr, right: &Expr) -> Result<Value, RuntimeError> {
        let left_value = self.eval_expr(left)?;

        if matches!(op, BinaryOperator::And | BinaryOperator::Or) {
            let l = operators::logical_left_operand(op, &left_value)?;
            if let Some(result) = operators::short_circuit(op, l) {
                return Ok(result);
            }
            return self.eval_expr(right);
        }

        let right_value = self.eval_expr(right)?;
        evaluate_binary(op, &left_value, &right_value)
    }

    /// Evaluates an expression whose value may be thrown away, so a call
    /// that returns nothing is fine here
    fn eval_discardable(&mut self, expr: &Expr) -> Result<Option<Value>, RuntimeError> {
        match expr {
            Expr::Call { callee, arguments } => self.call_function(callee, arguments),
            _ => self.eval_expr(expr).map(Some),
        }
    }

    fn eval_condition(&mut self, test: &Expr, site: ConditionSite) -> Result<bool, RuntimeError> {
        let value = self.eval_expr(test)?;
        value.as_bool().ok_or(RuntimeError::NonBooleanCondition { site, found: value.kind() })
    }

    /// Calls the function bound to `callee`.
    ///
    /// The body runs with the frames [root, captured bindings, parameters]; the
    /// caller's block frames are set aside for the duration of the call and put
    /// back afterwards, whether the call succeeds or not.
    fn call_function(&mut self, callee: &str, arguments: &[Expr]) -> Result<Option<Value>, RuntimeError> {
        let function = match self.env.get(callee) {
            Some(Value::Function(function)) => Rc::clone(function),
            Some(_) => return Err(RuntimeError::NotCallable(callee.to_string())),
            None => return Err(RuntimeError::UndefinedVariable(callee.to_string())),
        };

        if function.params.len() != arguments.len() {
            return Err(RuntimeError::ArityMismatch {
                name: callee.to_string(),
                expected: function.params.len(),
                found: arguments.len(),
            });
        }

        let mut params = Frame::with_capacity(arguments.len());
        for (param, argument) in function.params.iter().zip(arguments) {
            let value = self.eval_expr(argument)?;
            params.insert(param.clone(), value);
        }

        if self.call_depth >= self.max_call_depth {
            return Err(RuntimeError::RecursionLimit(self.max_call_depth));
        }

        tracing::debug!(function = callee, depth = self.call_depth + 1, "call");

        let caller_locals = self.env.suspend_locals();
        self.env.push_frame(function.captured.clone());
        self.env.push_frame(params);
        self.call_depth += 1;

        let result = self.exec_stmts(&function.body);
        if result.is_err() {
            self.note_failure_scope();
        }

        self.call_depth -= 1;
        self.env.restore_locals(caller_locals);

        match result? {
            Flow::Return(value) => Ok(Some(value)),
            Flow::Normal => Ok(None),
        }
    }

    fn exec_stmt(&mut self, stmt: &Stmt) -> Result<Flow, RuntimeError> {
        ensure_sufficient_stack(|| self.exec_node(stmt))
    }

    fn exec_node(&mut self, stmt: &Stmt) -> Result<Flow, RuntimeError> {
        tracing::trace!(kind = stmt.kind_name(), depth = self.env.depth(), "execute");

        match stmt {
            Stmt::Let { name, expression } => {
                if self.env.is_declared_locally(name) {
                    return Err(RuntimeError::DuplicateDeclaration(name.clone()));
                }
                let value = self.eval_expr(expression)?;
                self.env.define(name.clone(), value);
                Ok(Flow::Normal)
            }
            Stmt::Assignment { name, expression } => {
                let Some(index) = self.env.resolve(name) else {
                    return Err(RuntimeError::AssignmentToUndeclared(name.clone()));
                };
                // Evaluating the right side never changes which frames exist
                // below `index`, so the slot found above is still the right one.
                let value = self.eval_expr(expression)?;
                self.env.set_at(index, name.clone(), value);
                Ok(Flow::Normal)
            }
            Stmt::If { test, true_part, false_part } => {
                let branch = if self.eval_condition(test, ConditionSite::If)? {
                    true_part
                } else {
                    false_part
                };
                self.exec_block(branch)
            }
            Stmt::While { test, body } => {
                let mut iterations: u64 = 0;
                while self.eval_condition(test, ConditionSite::While)? {
                    // Each iteration gets its own scope
                    if let Flow::Return(value) = self.exec_block(body)? {
                        return Ok(Flow::Return(value));
                    }
                    iterations += 1;
                }
                tracing::trace!(iterations, "while finished");
                Ok(Flow::Normal)
            }
            Stmt::Print { expression } => {
                let value = self.eval_expr(expression)?;
                self.output.emit(&value);
                Ok(Flow::Normal)
            }
            Stmt::Expression { expression } => {
                self.eval_discardable(expression)?;
                Ok(Flow::Normal)
            }
            Stmt::Return { expression } => {
                if self.call_depth == 0 {
                    return Err(RuntimeError::ReturnOutsideFunction);
                }
                let value = self.eval_expr(expression)?;
                Ok(Flow::Return(value))
            }
            Stmt::Unknown => Err(RuntimeError::UnknownStatement),
        }
    }

    /// Runs statements in a fresh child scope, discarding it afterwards
    fn exec_block(&mut self, stmts: &[Stmt]) -> Result<Flow, RuntimeError> {
        self.env.push_scope();
        let result = self.exec_stmts(stmts);
        if result.is_err() {
            self.note_failure_scope();
        }
        self.env.pop_scope();
        result
    }

    /// Runs statements in order in the current scope, stopping at the first return
    fn exec_stmts(&mut self, stmts: &[Stmt]) -> Result<Flow, RuntimeError> {
        for stmt in stmts {
            if let Flow::Return(value) = self.exec_stmt(stmt)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BinaryOperator::*;
    use crate::errors::TypeError;
    use pretty_assertions::assert_eq;

    fn num(n: f64) -> Expr {
        Expr::number(n)
    }

    fn var(name: &str) -> Expr {
        Expr::variable(name)
    }

    fn interp_with(bindings: &[(&str, Value)]) -> Interpreter {
        Interpreter::with_env(Environment::with_bindings(
            bindings.iter().map(|(k, v)| (k.to_string(), v.clone())),
        ))
    }

    #[test]
    fn test_evaluates_multiplication_with_a_variable() {
        let mut interp = interp_with(&[("x", Value::Number(10.0))]);
        let result = interp.eval_expr(&Expr::binary(Mul, var("x"), num(2.0)));
        assert_eq!(result, Ok(Value::Number(20.0)));
    }

    #[test]
    fn test_and_skips_right_operand_when_left_is_false() {
        let mut interp = interp_with(&[("x", Value::Bool(false))]);
        let expr = Expr::binary(And, var("x"), Expr::binary(Div, num(1.0), num(0.0)));
        assert_eq!(interp.eval_expr(&expr), Ok(Value::Bool(false)));
    }

    #[test]
    fn test_or_skips_right_operand_when_left_is_true() {
        let mut interp = Interpreter::new();
        let expr = Expr::binary(Or, Expr::boolean(true), var("missing"));
        assert_eq!(interp.eval_expr(&expr), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_logical_right_operand_errors_surface_when_reached() {
        let mut interp = Interpreter::new();
        let expr = Expr::binary(And, Expr::boolean(true), Expr::binary(Div, num(1.0), num(0.0)));
        assert_eq!(interp.eval_expr(&expr), Err(RuntimeError::DivisionByZero));
    }

    #[test]
    fn test_logical_left_operand_must_be_boolean() {
        let mut interp = interp_with(&[("x", Value::Number(1.0))]);
        assert_eq!(
            interp.eval_expr(&Expr::binary(And, var("x"), num(2.0))),
            Err(TypeError::LogicalOperand { operator: And, found: "number" }.into())
        );
    }

    #[test]
    fn test_left_operand_is_evaluated_before_right() {
        let mut interp = Interpreter::new();
        let expr = Expr::binary(Add, var("first"), var("second"));
        assert_eq!(interp.eval_expr(&expr), Err(RuntimeError::UndefinedVariable("first".into())));
    }

    #[test]
    fn test_unknown_nodes_are_rejected() {
        let mut interp = Interpreter::new();
        assert_eq!(interp.eval_expr(&Expr::Unknown), Err(RuntimeError::UnknownExpression));
        assert_eq!(interp.execute(&Stmt::Unknown), Err(RuntimeError::UnknownStatement));
    }

    #[test]
    fn test_assignment_to_undeclared_variable() {
        let mut interp = interp_with(&[("x", Value::Number(10.0))]);
        assert_eq!(
            interp.execute(&Stmt::assign("y", num(5.0))),
            Err(RuntimeError::AssignmentToUndeclared("y".into()))
        );
    }

    #[test]
    fn test_duplicate_declaration_is_checked_before_evaluating() {
        let mut interp = interp_with(&[("x", Value::Number(5.0))]);
        // The right side would fail, but the duplicate is reported first
        assert_eq!(
            interp.execute(&Stmt::let_("x", var("missing"))),
            Err(RuntimeError::DuplicateDeclaration("x".into()))
        );
    }

    #[test]
    fn test_if_branch_declarations_do_not_escape() {
        let mut interp = Interpreter::new();
        interp
            .execute(&Stmt::if_(
                Expr::boolean(true),
                vec![Stmt::let_("x", num(1.0))],
                vec![Stmt::let_("x", num(0.0))],
            ))
            .unwrap();
        assert!(interp.state().is_empty());
        assert_eq!(interp.env().depth(), 1);
    }

    #[test]
    fn test_else_branch_updates_outer_variable() {
        let mut interp = interp_with(&[("x", Value::Number(1.0))]);
        interp
            .execute(&Stmt::if_(Expr::boolean(false), vec![], vec![Stmt::assign("x", num(99.0))]))
            .unwrap();
        assert_eq!(interp.state().get("x"), Some(&Value::Number(99.0)));
    }

    #[test]
    fn test_if_condition_must_be_boolean() {
        let mut interp = Interpreter::new();
        assert_eq!(
            interp.execute(&Stmt::if_(num(1.0), vec![], vec![])),
            Err(RuntimeError::NonBooleanCondition { site: ConditionSite::If, found: "number" })
        );
    }

    #[test]
    fn test_failing_block_still_pops_its_scope() {
        let mut interp = Interpreter::new();
        let stmt = Stmt::while_(
            Expr::boolean(true),
            vec![Stmt::let_("y", num(1.0)), Stmt::print(var("nope"))],
        );
        assert!(interp.execute(&stmt).is_err());
        assert_eq!(interp.env().depth(), 1);
    }

    #[test]
    fn test_print_goes_to_output_channel() {
        let mut interp = interp_with(&[("x", Value::Number(1.0))]);
        let captured = interp.capture_output();
        interp.execute(&Stmt::print(var("x"))).unwrap();
        interp.execute(&Stmt::print(Expr::binary(Less, var("x"), num(0.0)))).unwrap();
        assert_eq!(captured.values(), vec![Value::Number(1.0), Value::Bool(false)]);
    }

    #[test]
    fn test_print_of_undefined_variable_fails() {
        let mut interp = Interpreter::new();
        assert_eq!(
            interp.execute(&Stmt::print(var("x"))),
            Err(RuntimeError::UndefinedVariable("x".into()))
        );
    }

    #[test]
    fn test_top_level_return_is_rejected() {
        let mut interp = Interpreter::new();
        assert_eq!(interp.execute(&Stmt::return_(num(1.0))), Err(RuntimeError::ReturnOutsideFunction));
    }

    #[test]
    fn test_run_reports_partial_state() {
        let program = vec![
            Stmt::let_("a", num(1.0)),
            Stmt::let_("b", Expr::binary(Div, var("a"), num(0.0))),
            Stmt::let_("c", num(3.0)),
        ];
        let aborted = run(&program).unwrap_err();
        assert_eq!(aborted.error, RuntimeError::DivisionByZero);
        assert_eq!(aborted.state.keys().collect::<Vec<_>>(), vec!["a"]);
    }

    #[test]
    fn test_interactive_call_without_return_gives_nothing() {
        let mut interp = Interpreter::new();
        interp.execute(&Stmt::let_("f", Expr::function(vec![], vec![]))).unwrap();
        assert_eq!(interp.execute_interactive(&Stmt::expression(Expr::call("f", vec![]))), Ok(None));
        assert_eq!(
            interp.execute_interactive(&Stmt::expression(num(2.0))),
            Ok(Some(Value::Number(2.0)))
        );
        assert_eq!(
            interp.eval_expr(&Expr::call("f", vec![])),
            Err(RuntimeError::MissingReturnValue("f".into()))
        );
    }
}
