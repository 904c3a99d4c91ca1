// File: src/parser.rs
//
// Recursive descent parser for the Sprout language.
// Transforms a sequence of tokens into an Abstract Syntax Tree (AST).
//
// The parser implements a traditional recursive descent parsing strategy with
// operator precedence for expressions. It supports:
// - Variable declarations (let) and assignments
// - Control flow (if/else, while) with braced blocks
// - print and return statements, expression statements
// - Function literals and calls
//
// Precedence from loosest to tightest: ||, &&, comparison (=== < >),
// additive (+ -), multiplicative (* /). Every level is left-associative.
//
// The parser uses a single-token lookahead (two for assignments) and stops at
// the first error instead of trying to recover. Nesting of expressions and
// blocks is capped at MAX_NESTING_DEPTH.

use crate::ast::{BinaryOperator, Expr, Stmt};
use crate::errors::{SourceLocation, SyntaxError};
use crate::lexer::{tokenize, Token, TokenKind};
use crate::stack::ensure_sufficient_stack;

/// Deepest allowed nesting of parenthesized expressions, call arguments and blocks
pub const MAX_NESTING_DEPTH: usize = 1000;

/// Parses a whole program
pub fn parse_program(source: &str) -> Result<Vec<Stmt>, SyntaxError> {
    Parser::new(tokenize(source)?).parse()
}

/// Parses a single expression, optionally followed by one `;`
pub fn parse_expression(source: &str) -> Result<Expr, SyntaxError> {
    let mut parser = Parser::new(tokenize(source)?);
    let expr = parser.parse_expr()?;
    if parser.check_punct(';') {
        parser.advance();
    }
    if !matches!(parser.peek(), TokenKind::Eof) {
        return Err(parser.error_here("Expected end of expression"));
    }
    Ok(expr)
}

/// Parser maintains position in token stream and provides methods to parse statements and expressions
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    /// Creates a new parser from a vector of tokens
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0, depth: 0 }
    }

    /// Peek at the current token without consuming it
    fn peek(&self) -> &TokenKind {
        self.tokens.get(self.pos).map(|t| &t.kind).unwrap_or(&TokenKind::Eof)
    }

    /// Peek one token past the current one
    fn peek_next(&self) -> &TokenKind {
        self.tokens.get(self.pos + 1).map(|t| &t.kind).unwrap_or(&TokenKind::Eof)
    }

    /// Consume and return the current token, then advance to the next
    fn advance(&mut self) -> TokenKind {
        let tok = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn location(&self) -> SourceLocation {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(Token::location)
            .unwrap_or_else(|| SourceLocation::new(1, 1))
    }

    /// An error at the current token: "`message`, found <token>"
    fn error_here(&self, message: &str) -> SyntaxError {
        SyntaxError::new(format!("{}, found {}", message, self.peek().describe()), self.location())
    }

    /// Runs one nested parse step, failing once nesting gets too deep
    fn nested<T>(
        &mut self,
        what: &str,
        parse: impl FnOnce(&mut Self) -> Result<T, SyntaxError>,
    ) -> Result<T, SyntaxError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(SyntaxError::new(format!("{} nested too deeply", what), self.location()));
        }
        self.depth += 1;
        let result = ensure_sufficient_stack(|| parse(self));
        self.depth -= 1;
        result
    }

    fn check_punct(&self, c: char) -> bool {
        matches!(self.peek(), TokenKind::Punctuation(p) if *p == c)
    }

    fn check_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), TokenKind::Keyword(k) if k == keyword)
    }

    fn check_operator(&self, op: &str) -> bool {
        matches!(self.peek(), TokenKind::Operator(o) if o == op)
    }

    fn expect_punct(&mut self, c: char, context: &str) -> Result<(), SyntaxError> {
        if self.check_punct(c) {
            self.advance();
            Ok(())
        } else {
            Err(self.error_here(&format!("Expected '{}' {}", c, context)))
        }
    }

    fn expect_identifier(&mut self, what: &str) -> Result<String, SyntaxError> {
        match self.peek() {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            TokenKind::Keyword(k) => Err(SyntaxError::new(
                format!("'{}' is a keyword and cannot be used as a {}", k, what),
                self.location(),
            )),
            _ => Err(self.error_here(&format!("Expected {}", what))),
        }
    }

    /// Parse the entire token stream into a vector of statements
    pub fn parse(&mut self) -> Result<Vec<Stmt>, SyntaxError> {
        let mut stmts = Vec::new();
        while !matches!(self.peek(), TokenKind::Eof) {
            stmts.push(self.parse_stmt()?);
        }
        Ok(stmts)
    }

    fn parse_stmt(&mut self) -> Result<Stmt, SyntaxError> {
        match self.peek() {
            TokenKind::Keyword(k) if k == "let" => self.parse_let(),
            TokenKind::Keyword(k) if k == "if" => self.parse_if(),
            TokenKind::Keyword(k) if k == "while" => self.parse_while(),
            TokenKind::Keyword(k) if k == "print" => self.parse_print(),
            TokenKind::Keyword(k) if k == "return" => {
                self.advance();
                let expression = self.parse_expr()?;
                self.expect_punct(';', "after return value")?;
                Ok(Stmt::Return { expression })
            }
            TokenKind::Identifier(_) if matches!(self.peek_next(), TokenKind::Operator(op) if op == "=") => {
                let name = self.expect_identifier("variable name")?;
                self.advance(); // =
                let expression = self.parse_expr()?;
                self.expect_punct(';', "after assignment")?;
                Ok(Stmt::Assignment { name, expression })
            }
            _ => {
                let expression = self.parse_expr()?;
                self.expect_punct(';', "after expression")?;
                Ok(Stmt::Expression { expression })
            }
        }
    }

    fn parse_let(&mut self) -> Result<Stmt, SyntaxError> {
        self.advance(); // let
        let name = self.expect_identifier("variable name")?;
        if !self.check_operator("=") {
            return Err(self.error_here("Expected '=' after variable name"));
        }
        self.advance(); // =
        let expression = self.parse_expr()?;
        self.expect_punct(';', "after declaration")?;
        Ok(Stmt::Let { name, expression })
    }

    fn parse_if(&mut self) -> Result<Stmt, SyntaxError> {
        self.advance(); // if
        let test = self.parse_condition("if")?;
        let true_part = self.parse_block()?;

        let false_part = if self.check_keyword("else") {
            self.advance(); // else
            if self.check_keyword("if") {
                vec![self.nested("Block", Self::parse_if)?]
            } else {
                self.parse_block()?
            }
        } else {
            Vec::new()
        };

        Ok(Stmt::If { test, true_part, false_part })
    }

    fn parse_while(&mut self) -> Result<Stmt, SyntaxError> {
        self.advance(); // while
        let test = self.parse_condition("while")?;
        let body = self.parse_block()?;
        Ok(Stmt::While { test, body })
    }

    fn parse_print(&mut self) -> Result<Stmt, SyntaxError> {
        self.advance(); // print
        self.expect_punct('(', "after print")?;
        let expression = self.parse_expr()?;
        self.expect_punct(')', "to close print")?;
        self.expect_punct(';', "after print")?;
        Ok(Stmt::Print { expression })
    }

    /// `( expr )` after if/while
    fn parse_condition(&mut self, keyword: &str) -> Result<Expr, SyntaxError> {
        self.expect_punct('(', &format!("after {}", keyword))?;
        let test = self.parse_expr()?;
        self.expect_punct(')', &format!("to close {} condition", keyword))?;
        Ok(test)
    }

    /// `{ stmt* }`
    fn parse_block(&mut self) -> Result<Vec<Stmt>, SyntaxError> {
        self.nested("Block", Self::parse_block_body)
    }

    fn parse_block_body(&mut self) -> Result<Vec<Stmt>, SyntaxError> {
        self.expect_punct('{', "to open block")?;
        let mut body = Vec::new();
        while !self.check_punct('}') && !matches!(self.peek(), TokenKind::Eof) {
            body.push(self.parse_stmt()?);
        }
        self.expect_punct('}', "to close block")?;
        Ok(body)
    }

    pub fn parse_expr(&mut self) -> Result<Expr, SyntaxError> {
        self.nested("Expression", Self::parse_or)
    }

    fn parse_or(&mut self) -> Result<Expr, SyntaxError> {
        self.parse_left_assoc(&["||"], Self::parse_and)
    }

    fn parse_and(&mut self) -> Result<Expr, SyntaxError> {
        self.parse_left_assoc(&["&&"], Self::parse_comparison)
    }

    fn parse_comparison(&mut self) -> Result<Expr, SyntaxError> {
        self.parse_left_assoc(&["===", "<", ">"], Self::parse_additive)
    }

    fn parse_additive(&mut self) -> Result<Expr, SyntaxError> {
        self.parse_left_assoc(&["+", "-"], Self::parse_multiplicative)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, SyntaxError> {
        self.parse_left_assoc(&["*", "/"], Self::parse_primary)
    }

    /// One precedence level: `operand (op operand)*`, folded to the left
    fn parse_left_assoc(
        &mut self,
        ops: &[&str],
        operand: fn(&mut Self) -> Result<Expr, SyntaxError>,
    ) -> Result<Expr, SyntaxError> {
        let mut left = operand(self)?;

        loop {
            let operator = match self.peek() {
                TokenKind::Operator(op) if ops.contains(&op.as_str()) => BinaryOperator::from_symbol(op),
                _ => None,
            };
            let Some(operator) = operator else {
                break;
            };
            self.advance();
            let right = operand(self)?;
            left = Expr::binary(operator, left, right);
        }

        Ok(left)
    }

    fn parse_primary(&mut self) -> Result<Expr, SyntaxError> {
        match self.peek().clone() {
            TokenKind::Number(n) => {
                self.advance();
                Ok(Expr::number(n))
            }
            // A sign directly in front of a literal is part of the literal
            TokenKind::Operator(op) if op == "-" || op == "+" => {
                self.advance();
                match self.peek() {
                    TokenKind::Number(n) => {
                        let value = if op == "-" { -*n } else { *n };
                        self.advance();
                        Ok(Expr::number(value))
                    }
                    _ => Err(self.error_here(&format!("Expected a number after '{}'", op))),
                }
            }
            TokenKind::Bool(b) => {
                self.advance();
                Ok(Expr::boolean(b))
            }
            TokenKind::Identifier(name) => {
                self.advance();
                if self.check_punct('(') {
                    let arguments = self.parse_arguments()?;
                    Ok(Expr::Call { callee: name, arguments })
                } else {
                    Ok(Expr::Variable { name })
                }
            }
            TokenKind::Keyword(k) if k == "function" => self.parse_function(),
            TokenKind::Punctuation('(') => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect_punct(')', "to close parenthesized expression")?;
                Ok(expr)
            }
            _ => Err(self.error_here("Expected an expression")),
        }
    }

    /// `( expr (, expr)* )` - no trailing comma
    fn parse_arguments(&mut self) -> Result<Vec<Expr>, SyntaxError> {
        self.advance(); // (
        let mut args = Vec::new();
        if self.check_punct(')') {
            self.advance();
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            if self.check_punct(',') {
                self.advance();
            } else {
                self.expect_punct(')', "to close argument list")?;
                return Ok(args);
            }
        }
    }

    /// `function ( params ) { body }`
    fn parse_function(&mut self) -> Result<Expr, SyntaxError> {
        self.advance(); // function
        self.expect_punct('(', "after function")?;
        let mut parameters: Vec<String> = Vec::new();
        if !self.check_punct(')') {
            loop {
                let location = self.location();
                let param = self.expect_identifier("parameter name")?;
                if parameters.contains(&param) {
                    return Err(SyntaxError::new(format!("Duplicate parameter name '{}'", param), location));
                }
                parameters.push(param);
                if self.check_punct(',') {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect_punct(')', "to close parameter list")?;
        let body = self.parse_block()?;
        Ok(Expr::Function { parameters, body })
    }
}
