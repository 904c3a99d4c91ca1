// File: src/lexer.rs
//
// Lexical analyzer (tokenizer) for the Sprout language.
// Converts source code text into a stream of tokens for parsing.
//
// Supports:
// - Keywords: let, if, else, while, print, return, function
// - Identifiers, numbers (`12`, `3.5`, `Infinity`) and booleans
// - Operators: + - * / < > = === && ||
// - Punctuation: ( ) { } , ;
// - Comments starting with # or // until end of line

use crate::errors::{SourceLocation, SyntaxError};

/// Words that can never be used as names
pub const KEYWORDS: &[&str] = &["let", "if", "else", "while", "print", "return", "function"];

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Identifier(String),
    Number(f64),
    Bool(bool),
    Operator(String),
    Punctuation(char),
    Keyword(String),
    Eof,
}

impl TokenKind {
    /// How the token reads in an error message
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Identifier(name) => format!("identifier '{}'", name),
            TokenKind::Number(n) => format!("number {}", crate::interpreter::format_number(*n)),
            TokenKind::Bool(b) => format!("'{}'", b),
            TokenKind::Operator(op) => format!("'{}'", op),
            TokenKind::Punctuation(c) => format!("'{}'", c),
            TokenKind::Keyword(k) => format!("keyword '{}'", k),
            TokenKind::Eof => "end of input".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

/// Tokenizes Sprout source code into a vector of tokens ending with `Eof`.
///
/// Processes the input character by character, recognizing keywords,
/// identifiers, numbers, operators, and punctuation. Anything else is a
/// SyntaxError pointing at the offending character.
pub fn tokenize(source: &str) -> Result<Vec<Token>, SyntaxError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0;
    let mut line = 1;
    let mut col = 1;

    while let Some(&c) = chars.get(pos) {
        let start_col = col;
        let next = chars.get(pos + 1).copied();

        match c {
            ' ' | '\t' | '\r' => {
                pos += 1;
                col += 1;
            }
            '\n' => {
                pos += 1;
                line += 1;
                col = 1;
            }
            '#' => {
                while chars.get(pos).is_some_and(|&ch| ch != '\n') {
                    pos += 1;
                }
            }
            '/' if next == Some('/') => {
                while chars.get(pos).is_some_and(|&ch| ch != '\n') {
                    pos += 1;
                }
            }
            '0'..='9' => {
                let mut num = String::new();
                while let Some(&ch) = chars.get(pos).filter(|ch| ch.is_ascii_digit()) {
                    num.push(ch);
                    pos += 1;
                    col += 1;
                }
                if chars.get(pos) == Some(&'.') {
                    if !chars.get(pos + 1).is_some_and(|ch| ch.is_ascii_digit()) {
                        return Err(SyntaxError::new(
                            "Expected digits after decimal point",
                            SourceLocation::new(line, col),
                        ));
                    }
                    num.push('.');
                    pos += 1;
                    col += 1;
                    while let Some(&ch) = chars.get(pos).filter(|ch| ch.is_ascii_digit()) {
                        num.push(ch);
                        pos += 1;
                        col += 1;
                    }
                }
                let parsed = num.parse::<f64>().map_err(|_| {
                    SyntaxError::new(format!("Invalid number '{}'", num), SourceLocation::new(line, start_col))
                })?;
                tokens.push(Token { kind: TokenKind::Number(parsed), line, column: start_col });
            }
            'a'..='z' | 'A'..='Z' | '_' => {
                let mut ident = String::new();
                while let Some(&ch) = chars.get(pos).filter(|ch| ch.is_ascii_alphanumeric() || **ch == '_') {
                    ident.push(ch);
                    pos += 1;
                    col += 1;
                }

                let kind = match ident.as_str() {
                    "true" => TokenKind::Bool(true),
                    "false" => TokenKind::Bool(false),
                    "Infinity" => TokenKind::Number(f64::INFINITY),
                    word if KEYWORDS.contains(&word) => TokenKind::Keyword(ident),
                    _ => TokenKind::Identifier(ident),
                };
                tokens.push(Token { kind, line, column: start_col });
            }
            '=' => {
                if next == Some('=') {
                    if chars.get(pos + 2) != Some(&'=') {
                        return Err(SyntaxError::new(
                            "Unexpected '==', equality is written '==='",
                            SourceLocation::new(line, start_col),
                        ));
                    }
                    pos += 3;
                    col += 3;
                    tokens.push(Token { kind: TokenKind::Operator("===".into()), line, column: start_col });
                } else {
                    pos += 1;
                    col += 1;
                    tokens.push(Token { kind: TokenKind::Operator("=".into()), line, column: start_col });
                }
            }
            '&' | '|' => {
                if next != Some(c) {
                    return Err(SyntaxError::new(
                        format!("Unexpected '{}', did you mean '{}{}'?", c, c, c),
                        SourceLocation::new(line, start_col),
                    ));
                }
                pos += 2;
                col += 2;
                tokens.push(Token { kind: TokenKind::Operator(format!("{}{}", c, c)), line, column: start_col });
            }
            '+' | '-' | '*' | '/' | '<' | '>' => {
                pos += 1;
                col += 1;
                tokens.push(Token { kind: TokenKind::Operator(c.to_string()), line, column: start_col });
            }
            '(' | ')' | '{' | '}' | ',' | ';' => {
                pos += 1;
                col += 1;
                tokens.push(Token { kind: TokenKind::Punctuation(c), line, column: start_col });
            }
            _ => {
                return Err(SyntaxError::new(
                    format!("Unexpected character '{}'", c),
                    SourceLocation::new(line, start_col),
                ));
            }
        }
    }

    tokens.push(Token { kind: TokenKind::Eof, line, column: col });

    Ok(tokens)
}
