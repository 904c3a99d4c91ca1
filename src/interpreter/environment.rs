// File: src/interpreter/environment.rs
//
// Lexical scoping environment for variable management in the Sprout interpreter.
// Implements a stack of scopes where inner scopes shadow outer scopes.

use super::value::Value;
use std::collections::{BTreeMap, HashMap};

/// One lexical scope's bindings
pub type Frame = HashMap<String, Value>;

/// Snapshot of a frame's bindings, ordered by name
pub type State = BTreeMap<String, Value>;

/// Variable storage using lexical scoping
///
/// The Environment maintains a stack of scopes (Vec<HashMap>). Index 0 is the
/// root frame of the program; each entry's parent is the entry before it.
/// Lookups search from the innermost scope (end of Vec) outward, which gives
/// block scoping with shadowing. Frames only ever live between a matching
/// `push_scope`/`pop_scope` pair, so nothing outlives the block that created it.
///
/// # Examples
///
/// ```
/// use sprout::interpreter::{Environment, Value};
///
/// let mut env = Environment::new();
/// env.define("x".to_string(), Value::Number(10.0)); // root scope
///
/// env.push_scope(); // enter a block
/// env.define("x".to_string(), Value::Number(20.0)); // shadows outer x
/// assert_eq!(env.get("x"), Some(&Value::Number(20.0)));
///
/// env.pop_scope(); // leave the block
/// assert_eq!(env.get("x"), Some(&Value::Number(10.0)));
/// ```
#[derive(Clone, Debug)]
pub struct Environment {
    scopes: Vec<Frame>,
}

impl Environment {
    /// Create a new environment with a single, empty root scope
    pub fn new() -> Self {
        Environment { scopes: vec![Frame::new()] }
    }

    /// Create an environment whose root scope starts with the given bindings
    pub fn with_bindings<I>(bindings: I) -> Self
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        Environment { scopes: vec![bindings.into_iter().collect()] }
    }

    /// Number of live scopes, the root included
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Push a new scope onto the stack (entering a block)
    pub fn push_scope(&mut self) {
        self.scopes.push(Frame::new());
        tracing::trace!(depth = self.scopes.len(), "push scope");
    }

    /// Pop the innermost scope from the stack (leaving a block).
    /// The root scope is never popped.
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
            tracing::trace!(depth = self.scopes.len(), "pop scope");
        }
    }

    /// Get a variable, searching from inner to outer scopes
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Index of the innermost scope holding `name`
    pub fn resolve(&self, name: &str) -> Option<usize> {
        self.scopes.iter().rposition(|scope| scope.contains_key(name))
    }

    /// Whether `name` is bound in the innermost scope (outer scopes are not checked)
    pub fn is_declared_locally(&self, name: &str) -> bool {
        self.scopes.last().is_some_and(|scope| scope.contains_key(name))
    }

    /// Define a variable in the current (innermost) scope
    pub fn define(&mut self, name: String, value: Value) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, value);
        }
    }

    /// Overwrite `name` in the scope at `index`, as returned by `resolve`
    pub fn set_at(&mut self, index: usize, name: String, value: Value) {
        if let Some(scope) = self.scopes.get_mut(index) {
            scope.insert(name, value);
        }
    }

    /// The root scope's bindings, ordered by name
    pub fn root_state(&self) -> State {
        self.scopes
            .first()
            .map(|root| root.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default()
    }

    /// Every name visible from the innermost scope, sorted and deduplicated
    pub fn visible_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.scopes.iter().flat_map(|scope| scope.keys().cloned()).collect();
        names.sort();
        names.dedup();
        names
    }

    /// Flattened copy of every non-root binding, inner scopes winning over outer ones
    pub fn capture_locals(&self) -> Frame {
        let mut captured = Frame::new();
        for scope in self.scopes.iter().skip(1) {
            for (name, value) in scope {
                captured.insert(name.clone(), value.clone());
            }
        }
        captured
    }

    /// Detach every scope above the root, leaving only the root in place
    pub fn suspend_locals(&mut self) -> Vec<Frame> {
        self.scopes.split_off(1)
    }

    /// Drop whatever scopes sit above the root and put `locals` back
    pub fn restore_locals(&mut self, locals: Vec<Frame>) {
        self.scopes.truncate(1);
        self.scopes.extend(locals);
    }

    /// Push a prepared frame (used for call frames)
    pub fn push_frame(&mut self, frame: Frame) {
        self.scopes.push(frame);
        tracing::trace!(depth = self.scopes.len(), "push frame");
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
