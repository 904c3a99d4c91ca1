// File: src/repl.rs
//
// Interactive REPL (Read-Eval-Print Loop) for the Sprout language.
// Provides an interactive shell with:
// - Multi-line input while braces or parentheses are left open
// - Command history with up/down arrow navigation
// - Special commands (:help, :clear, :quit, :vars, :reset)
// - Persistent root bindings across inputs
// - Echo of bare expression values

use crate::errors::Diagnostic;
use crate::interpreter::{Interpreter, Value};
use crate::parser;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// REPL session that maintains interpreter state and handles user interaction
pub struct Repl {
    interpreter: Interpreter,
    editor: DefaultEditor,
}

impl Repl {
    /// Creates a new REPL session with a fresh interpreter
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let editor = DefaultEditor::new()?;
        Ok(Repl { interpreter: Interpreter::new(), editor })
    }

    fn show_banner(&self) {
        println!(
            "{} {}",
            "Sprout".bright_green().bold(),
            format!("v{} interactive shell", env!("CARGO_PKG_VERSION")).bright_cyan()
        );
        println!(
            "  Use {} for commands or {} to leave. Open braces continue on the next line.",
            ":help".bright_yellow(),
            ":quit".bright_yellow()
        );
        println!();
    }

    /// Starts the REPL loop
    pub fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.show_banner();

        let mut buffer = String::new();

        loop {
            let prompt = if buffer.is_empty() {
                "sprout> ".bright_green().to_string()
            } else {
                "   ...> ".bright_blue().to_string()
            };

            match self.editor.readline(&prompt) {
                Ok(line) => {
                    let _ = self.editor.add_history_entry(line.as_str());

                    // Commands are only recognised at the start of an input
                    if buffer.is_empty() && line.trim().starts_with(':') {
                        if self.handle_command(line.trim()) {
                            continue;
                        }
                        break;
                    }

                    buffer.push_str(&line);
                    buffer.push('\n');

                    if is_input_complete(&buffer) {
                        self.eval_input(&buffer);
                        buffer.clear();
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("{}", "^C (input discarded, :quit to exit)".bright_yellow());
                    buffer.clear();
                }
                Err(ReadlineError::Eof) => {
                    println!("{}", "Goodbye!".bright_cyan());
                    break;
                }
                Err(err) => return Err(err.into()),
            }
        }

        Ok(())
    }

    /// Handles special REPL commands starting with ':'
    /// Returns true to continue REPL, false to quit
    fn handle_command(&mut self, cmd: &str) -> bool {
        match cmd {
            ":help" | ":h" => {
                self.show_help();
                true
            }
            ":quit" | ":q" | ":exit" => {
                println!("{}", "Goodbye!".bright_cyan());
                false
            }
            ":clear" | ":c" => {
                print!("\x1B[2J\x1B[1;1H");
                self.show_banner();
                true
            }
            ":vars" | ":v" => {
                self.show_variables();
                true
            }
            ":reset" | ":r" => {
                self.interpreter.reset();
                println!("{}", "✓ Environment reset".bright_green());
                true
            }
            _ => {
                println!(
                    "{} Unknown command: {}. Type {} for available commands.",
                    "Error:".bright_red(),
                    cmd.bright_yellow(),
                    ":help".bright_yellow()
                );
                true
            }
        }
    }

    fn show_help(&self) {
        println!();
        println!("{}", "REPL Commands:".bright_cyan().bold());
        println!("  {}{}  Display this help message", ":help".bright_yellow(), " or :h ".dimmed());
        println!("  {}{}  Exit the REPL", ":quit".bright_yellow(), " or :q ".dimmed());
        println!("  {}{} Clear the screen", ":clear".bright_yellow(), " or :c ".dimmed());
        println!("  {}{}  Show top-level variables", ":vars".bright_yellow(), " or :v ".dimmed());
        println!("  {}{} Forget every variable", ":reset".bright_yellow(), " or :r ".dimmed());
        println!();
        println!("{}", "Examples:".bright_cyan().bold());
        println!("  {}", "sprout> let x = 42;".dimmed());
        println!("  {}", "sprout> let double = function(n) {".dimmed());
        println!("  {}", "   ...>   return n * 2;".dimmed());
        println!("  {}", "   ...> };".dimmed());
        println!("  {}", "sprout> double(x);".dimmed());
        println!("  {}", "=> 84".dimmed());
        println!();
    }

    fn show_variables(&self) {
        let state = self.interpreter.state();
        if state.is_empty() {
            println!("  {}", "(no variables defined)".dimmed());
            return;
        }
        for (name, value) in &state {
            println!("  {} = {}", name.bright_yellow(), format_value(value));
        }
    }

    /// Parses and runs one complete input, echoing expression values
    fn eval_input(&mut self, input: &str) {
        if input.trim().is_empty() {
            return;
        }

        let program = match parser::parse_program(input) {
            Ok(program) => program,
            Err(err) => {
                eprint!("{}", Diagnostic::syntax(&err, input));
                return;
            }
        };

        for stmt in &program {
            match self.interpreter.execute_interactive(stmt) {
                Ok(Some(value)) => println!("{} {}", "=>".bright_blue(), format_value(&value)),
                Ok(None) => {}
                Err(err) => {
                    let visible = self.interpreter.take_failure_scope();
                    eprint!("{}", Diagnostic::runtime(&err, &visible));
                    // Statements after the failing one are not run
                    return;
                }
            }
        }
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Number(_) => value.to_string().bright_white().to_string(),
        Value::Bool(_) => value.to_string().bright_magenta().to_string(),
        Value::Function(_) => value.to_string().bright_cyan().to_string(),
    }
}

/// Returns true once every `{` and `(` in `input` has been closed.
/// Comments are skipped; an excess closer counts as complete so the parser
/// gets to report it.
pub fn is_input_complete(input: &str) -> bool {
    let mut depth: i64 = 0;

    for line in input.lines() {
        let code = strip_comment(line);
        for ch in code.chars() {
            match ch {
                '{' | '(' => depth += 1,
                '}' | ')' => depth -= 1,
                _ => {}
            }
        }
    }

    depth <= 0
}

fn strip_comment(line: &str) -> &str {
    let cut = [line.find('#'), line.find("//")].into_iter().flatten().min();
    match cut {
        Some(idx) => &line[..idx],
        None => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_delimiters_continue_input() {
        assert!(is_input_complete("let x = 1;"));
        assert!(is_input_complete(""));
        assert!(!is_input_complete("while (x < 3) {"));
        assert!(!is_input_complete("print(\n"));
        assert!(is_input_complete("if (a) {\n  print(1);\n}\n"));
    }

    #[test]
    fn test_comments_do_not_count() {
        assert!(is_input_complete("let x = 1; # {"));
        assert!(is_input_complete("let x = 1; // ("));
        assert!(!is_input_complete("let f = function() { // }"));
    }

    #[test]
    fn test_stray_closer_is_handed_to_the_parser() {
        assert!(is_input_complete("}"));
    }
}
