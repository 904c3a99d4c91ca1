// File: src/lib.rs
//
// Library interface for the Sprout interpreter.
// Exposes modules for integration testing and external use, plus the loader
// that turns a file on disk into a program.

pub mod ast;
pub mod config;
pub mod errors;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod repl;
mod stack;

use ast::Stmt;
use errors::LoadError;
use std::fs;
use std::path::Path;

/// How a program file is encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Sprout source text
    Script,
    /// A JSON array of statements in the `kind`-tagged AST shape
    JsonAst,
}

/// Reads the text of a program file
pub fn read_source(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Io { path: path.to_path_buf(), source })
}

/// Parses already-read text in the given format
pub fn parse_source(source: &str, format: SourceFormat) -> Result<Vec<Stmt>, LoadError> {
    let program: Vec<Stmt> = match format {
        SourceFormat::Script => parser::parse_program(source)?,
        SourceFormat::JsonAst => serde_json::from_str(source)?,
    };
    tracing::debug!(?format, statements = program.len(), "program parsed");
    Ok(program)
}
