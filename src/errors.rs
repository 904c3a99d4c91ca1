// File: src/errors.rs
//
// Error handling and reporting for the Sprout language.
// Provides the typed error taxonomy raised by the lexer, parser and
// interpreter, plus a pretty-printed Diagnostic used by the CLI and REPL.

use crate::ast::BinaryOperator;
use crate::interpreter::State;
use colored::Colorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Source location information for tracking where code appears in a file
#[derive(Debug, Clone, PartialEq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
    pub file: Option<String>,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column, file: None }
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(ref file) = self.file {
            write!(f, "{}:{}:{}", file, self.line, self.column)
        } else {
            write!(f, "{}:{}", self.line, self.column)
        }
    }
}

/// A lexing or parsing failure
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message} at {location}")]
pub struct SyntaxError {
    pub message: String,
    pub location: SourceLocation,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, location: SourceLocation) -> Self {
        Self { message: message.into(), location }
    }
}

/// Which construct's test expression failed the boolean check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionSite {
    If,
    While,
}

impl fmt::Display for ConditionSite {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConditionSite::If => write!(f, "if"),
            ConditionSite::While => write!(f, "while"),
        }
    }
}

/// Operand kind mismatches, carrying the offending kind names
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("Left operand of {operator} must be boolean, got {found}")]
    LogicalOperand { operator: BinaryOperator, found: &'static str },
    #[error("Arithmetic operations require numbers, got {left} and {right}")]
    Arithmetic { left: &'static str, right: &'static str },
    #[error("Comparison operations require numbers, got {left} and {right}")]
    Comparison { left: &'static str, right: &'static str },
}

/// Errors raised while evaluating a program. Every one of them aborts the run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("Undefined variable: {0}")]
    UndefinedVariable(String),
    #[error("Duplicate variable declaration: {0}")]
    DuplicateDeclaration(String),
    #[error("Assignment to undeclared variable: {0}")]
    AssignmentToUndeclared(String),
    #[error(transparent)]
    TypeError(#[from] TypeError),
    #[error("Division by zero")]
    DivisionByZero,
    #[error("{site} condition must evaluate to a boolean, got {found}")]
    NonBooleanCondition { site: ConditionSite, found: &'static str },
    #[error("Unknown expression type")]
    UnknownExpression,
    #[error("Unknown statement type")]
    UnknownStatement,
    #[error("{0} is not a function")]
    NotCallable(String),
    #[error("Function {name} expects {expected} argument(s), got {found}")]
    ArityMismatch { name: String, expected: usize, found: usize },
    #[error("Function {0} did not return a value")]
    MissingReturnValue(String),
    #[error("return outside of a function")]
    ReturnOutsideFunction,
    #[error("Maximum call depth of {0} exceeded")]
    RecursionLimit(usize),
}

impl RuntimeError {
    /// Short heading used when the error is rendered as a Diagnostic
    pub fn label(&self) -> &'static str {
        match self {
            RuntimeError::UndefinedVariable(_) => "Undefined Variable",
            RuntimeError::DuplicateDeclaration(_) => "Duplicate Declaration",
            RuntimeError::AssignmentToUndeclared(_) => "Assignment To Undeclared",
            RuntimeError::TypeError(_) => "Type Error",
            RuntimeError::DivisionByZero => "Division By Zero",
            RuntimeError::NonBooleanCondition { .. } => "Non-Boolean Condition",
            RuntimeError::UnknownExpression => "Unknown Expression",
            RuntimeError::UnknownStatement => "Unknown Statement",
            RuntimeError::NotCallable(_)
            | RuntimeError::ArityMismatch { .. }
            | RuntimeError::MissingReturnValue(_)
            | RuntimeError::ReturnOutsideFunction => "Call Error",
            RuntimeError::RecursionLimit(_) => "Recursion Limit",
        }
    }

    /// The variable name the error is about, if it concerns a missing binding
    pub fn missing_name(&self) -> Option<&str> {
        match self {
            RuntimeError::UndefinedVariable(name) | RuntimeError::AssignmentToUndeclared(name) => {
                Some(name)
            }
            _ => None,
        }
    }
}

/// A run that stopped on a RuntimeError, with the root bindings as they were
/// when it stopped
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{error}")]
pub struct Aborted {
    #[source]
    pub error: RuntimeError,
    pub state: State,
    /// Every name in scope where the error was raised, block locals included
    pub visible: Vec<String>,
}

/// Failures while turning a file into a program
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error("invalid AST document: {0}")]
    Json(#[from] serde_json::Error),
}

/// A structured, colored error report for terminal output
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub kind: String,
    pub message: String,
    pub location: Option<SourceLocation>,
    pub source_line: Option<String>,
    pub suggestion: Option<String>,
    pub help: Option<String>,
    pub note: Option<String>,
}

impl Diagnostic {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            location: None,
            source_line: None,
            suggestion: None,
            help: None,
            note: None,
        }
    }

    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_source(mut self, source_line: String) -> Self {
        self.source_line = Some(source_line);
        self
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestion = Some(suggestion);
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Builds a report for a syntax error, quoting the offending line of `source`
    pub fn syntax(error: &SyntaxError, source: &str) -> Self {
        let mut diagnostic =
            Self::new("Syntax Error", error.message.clone()).with_location(error.location.clone());
        if let Some(line) = source.lines().nth(error.location.line.saturating_sub(1)) {
            diagnostic = diagnostic.with_source(line.to_string());
        }
        diagnostic
    }

    /// Builds a report for a runtime error. `visible` are the names in scope
    /// when the run stopped, used for "Did you mean" suggestions.
    pub fn runtime(error: &RuntimeError, visible: &[String]) -> Self {
        let mut diagnostic = Self::new(error.label(), error.to_string());

        if let Some(name) = error.missing_name() {
            if let Some(candidate) = find_closest_match(name, visible) {
                diagnostic = diagnostic.with_suggestion(candidate.to_string());
            }
        }

        match error {
            RuntimeError::DuplicateDeclaration(_) => {
                diagnostic.with_help("drop `let` to assign to the existing variable")
            }
            RuntimeError::AssignmentToUndeclared(_) => {
                diagnostic.with_help("declare the variable with `let` before assigning to it")
            }
            RuntimeError::RecursionLimit(_) => {
                diagnostic.with_help("check that the recursion has a reachable base case")
            }
            RuntimeError::UnknownExpression | RuntimeError::UnknownStatement => {
                diagnostic.with_note("the AST contains a node kind this interpreter does not know")
            }
            _ => diagnostic,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}: {}", self.kind.red().bold(), self.message.bold())?;

        if let Some(ref location) = self.location {
            let location_str = format!("  --> {}", location);
            writeln!(f, "{}", location_str.bright_blue())?;

            if let Some(ref source) = self.source_line {
                writeln!(f, "   {}", "|".bright_blue())?;
                writeln!(
                    f,
                    "{} {} {}",
                    format!("{:3}", location.line).bright_blue(),
                    "|".bright_blue(),
                    source
                )?;
                writeln!(
                    f,
                    "   {} {}{}",
                    "|".bright_blue(),
                    " ".repeat(location.column.saturating_sub(1)),
                    "^".red().bold()
                )?;
                writeln!(f, "   {}", "|".bright_blue())?;
            }
        }

        if let Some(ref help) = self.help {
            writeln!(f, "   {} {}", "=".bright_yellow(), format!("help: {}", help).bright_yellow())?;
        }

        if let Some(ref suggestion) = self.suggestion {
            writeln!(
                f,
                "   {} {}",
                "=".bright_green(),
                format!("Did you mean '{}'?", suggestion).bright_green()
            )?;
        }

        if let Some(ref note) = self.note {
            writeln!(f, "   {} {}", "=".bright_cyan(), format!("note: {}", note).bright_cyan())?;
        }

        Ok(())
    }
}

/// Computes the Levenshtein distance between two strings
/// Used for "Did you mean?" suggestions
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();

    if s1_chars.is_empty() {
        return s2_chars.len();
    }
    if s2_chars.is_empty() {
        return s1_chars.len();
    }

    // Single rolling row instead of the full matrix
    let mut previous: Vec<usize> = (0..=s2_chars.len()).collect();
    let mut current = vec![0; s2_chars.len() + 1];

    for (i, a) in s1_chars.iter().enumerate() {
        current[0] = i + 1;
        for (j, b) in s2_chars.iter().enumerate() {
            let cost = usize::from(a != b);
            current[j + 1] = (previous[j + 1] + 1).min(current[j] + 1).min(previous[j] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[s2_chars.len()]
}

/// Find the closest match from a list of candidates using Levenshtein distance
/// Returns None if no candidate is within distance 2 or the target itself is listed
pub fn find_closest_match<'a>(target: &str, candidates: &'a [String]) -> Option<&'a str> {
    let mut best_match = None;
    let mut best_distance = usize::MAX;

    for candidate in candidates {
        let distance = levenshtein_distance(target, candidate);
        if distance == 0 {
            return None;
        }
        if distance <= 2 && distance < best_distance {
            best_distance = distance;
            best_match = Some(candidate.as_str());
        }
    }

    best_match
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_distance() {
        assert_eq!(levenshtein_distance("", "abc"), 3);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("count", "count"), 0);
        assert_eq!(levenshtein_distance("cnt", "count"), 2);
    }

    #[test]
    fn test_closest_match_prefers_smallest_distance() {
        let names = vec!["total".to_string(), "totals".to_string(), "x".to_string()];
        assert_eq!(find_closest_match("totl", &names), Some("total"));
        assert_eq!(find_closest_match("banana", &names), None);
    }

    #[test]
    fn test_runtime_messages() {
        let err = RuntimeError::from(TypeError::Arithmetic { left: "boolean", right: "number" });
        assert_eq!(err.to_string(), "Arithmetic operations require numbers, got boolean and number");

        let err = RuntimeError::NonBooleanCondition { site: ConditionSite::While, found: "number" };
        assert_eq!(err.to_string(), "while condition must evaluate to a boolean, got number");

        let err = RuntimeError::from(TypeError::LogicalOperand {
            operator: BinaryOperator::Or,
            found: "number",
        });
        assert_eq!(err.to_string(), "Left operand of || must be boolean, got number");
    }

    #[test]
    fn test_runtime_diagnostic_suggests_close_name() {
        colored::control::set_override(false);
        let visible = vec!["counter".to_string()];
        let diagnostic =
            Diagnostic::runtime(&RuntimeError::UndefinedVariable("countr".into()), &visible);

        assert_eq!(diagnostic.suggestion.as_deref(), Some("counter"));
        let rendered = diagnostic.to_string();
        assert!(rendered.starts_with("Undefined Variable: Undefined variable: countr"));
        assert!(rendered.contains("Did you mean 'counter'?"));
    }

    #[test]
    fn test_syntax_diagnostic_points_at_column() {
        colored::control::set_override(false);
        let error = SyntaxError::new("Expected ';'", SourceLocation::new(2, 5));
        let rendered = Diagnostic::syntax(&error, "let x = 1;\nx = 2\n").to_string();

        assert!(rendered.contains("  --> 2:5"));
        assert!(rendered.contains("  2 | x = 2"));
        assert!(rendered.contains("|     ^"));
    }
}
