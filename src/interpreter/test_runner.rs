// File: src/interpreter/test_runner.rs
//
// Snapshot test runner for Sprout scripts.
//
// Every `*.sp` script in a directory runs in a fresh interpreter with its print
// output captured. The transcript (printed lines, then an `error:` line if the
// run stopped early) is compared against the sibling `*.out` file. Missing
// snapshots are written on first run; `update` rewrites all of them.

use super::Interpreter;
use crate::parser;
use colored::Colorize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// File extension of Sprout scripts
pub const SCRIPT_EXTENSION: &str = "sp";
/// File extension of expected-output snapshots
pub const SNAPSHOT_EXTENSION: &str = "out";

/// Runs every script of a directory against its snapshot
pub struct SnapshotRunner {
    dir: PathBuf,
    update: bool,
}

/// Result from checking a single script
#[derive(Clone, Debug)]
pub struct ScriptResult {
    pub path: PathBuf,
    pub passed: bool,
    pub expected: String,
    pub actual: String,
    pub snapshot_written: bool,
    pub duration_ms: u128,
}

impl SnapshotRunner {
    pub fn new(dir: impl Into<PathBuf>, update: bool) -> Self {
        SnapshotRunner { dir: dir.into(), update }
    }

    /// Script paths in the directory, sorted by name
    pub fn collect_scripts(&self) -> io::Result<Vec<PathBuf>> {
        let mut scripts: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == SCRIPT_EXTENSION))
            .collect();
        scripts.sort();
        Ok(scripts)
    }

    /// Run all scripts and return a report
    pub fn run_all(&self) -> io::Result<TestReport> {
        let start_time = Instant::now();
        let mut results = Vec::new();

        for path in self.collect_scripts()? {
            results.push(self.run_script(&path)?);
        }

        let passed = results.iter().filter(|r| r.passed).count();
        Ok(TestReport {
            total: results.len(),
            passed,
            failed: results.len() - passed,
            duration_ms: start_time.elapsed().as_millis(),
            results,
        })
    }

    /// Run one script and compare its transcript with the snapshot
    pub fn run_script(&self, path: &Path) -> io::Result<ScriptResult> {
        let start_time = Instant::now();
        let source = fs::read_to_string(path)?;
        let actual = transcript(&source);
        let snapshot_path = path.with_extension(SNAPSHOT_EXTENSION);

        let (expected, snapshot_written) = if snapshot_path.exists() && !self.update {
            (fs::read_to_string(&snapshot_path)?.trim_end().to_string(), false)
        } else {
            fs::write(&snapshot_path, format!("{}\n", actual))?;
            tracing::debug!(snapshot = %snapshot_path.display(), "snapshot written");
            (actual.clone(), true)
        };

        Ok(ScriptResult {
            path: path.to_path_buf(),
            passed: actual == expected,
            expected,
            actual,
            snapshot_written,
            duration_ms: start_time.elapsed().as_millis(),
        })
    }
}

/// Runs `source` with captured output and renders what it printed, one value
/// per line, followed by the failure if the program did not finish
pub fn transcript(source: &str) -> String {
    let program = match parser::parse_program(source) {
        Ok(program) => program,
        Err(err) => return format!("syntax error: {}", err),
    };

    let mut interp = Interpreter::new();
    let captured = interp.capture_output();
    let outcome = interp.run(&program);

    let mut lines = captured.lines();
    if let Err(aborted) = outcome {
        lines.push(format!("error: {}", aborted.error));
    }
    lines.join("\n")
}

/// Summary report of a snapshot run
#[derive(Debug)]
pub struct TestReport {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u128,
    pub results: Vec<ScriptResult>,
}

impl TestReport {
    /// Print the report to stdout with colored output
    pub fn print(&self, verbose: bool) {
        for result in &self.results {
            if result.passed {
                if verbose || result.snapshot_written {
                    let note = if result.snapshot_written { " (snapshot written)" } else { "" };
                    println!(
                        "  {} {} ({}ms){}",
                        "✓".green().bold(),
                        result.path.display().to_string().green(),
                        result.duration_ms,
                        note.dimmed()
                    );
                }
            } else {
                println!("  {} {}", "✗".red().bold(), result.path.display().to_string().red());
                println!("    {}\n{}", "Expected:".bold(), indent(&result.expected));
                println!("    {}\n{}", "Got:".bold(), indent(&result.actual));
            }
        }

        println!(
            "\nScripts: {} total, {} passed, {} failed ({}ms)",
            self.total,
            self.passed.to_string().green().bold(),
            self.failed.to_string().red().bold(),
            self.duration_ms
        );
    }

    /// Get exit code (0 for success, 1 for failure)
    pub fn exit_code(&self) -> i32 {
        if self.failed == 0 {
            0
        } else {
            1
        }
    }
}

fn indent(text: &str) -> String {
    text.lines().map(|line| format!("      {}", line)).collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_lists_prints_then_error() {
        let out = transcript("let x = 1; print(x); print(x < 2); print(x / 0); print(5);");
        assert_eq!(out, "1\ntrue\nerror: Division by zero");
    }

    #[test]
    fn test_transcript_reports_syntax_errors() {
        assert!(transcript("let = 4;").starts_with("syntax error: "));
    }

    #[test]
    fn test_runner_writes_then_checks_snapshots() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("count.sp"), "let i = 0; while (i < 3) { print(i); i = i + 1; }").unwrap();
        fs::write(dir.path().join("notes.txt"), "not a script").unwrap();

        let runner = SnapshotRunner::new(dir.path(), false);
        let first = runner.run_all().unwrap();
        assert_eq!(first.total, 1);
        assert!(first.results[0].snapshot_written);
        assert_eq!(fs::read_to_string(dir.path().join("count.out")).unwrap(), "0\n1\n2\n");

        let second = runner.run_all().unwrap();
        assert_eq!(second.exit_code(), 0);
        assert!(!second.results[0].snapshot_written);
    }

    #[test]
    fn test_runner_flags_mismatch_and_update_fixes_it() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.sp"), "print(1 + 1);").unwrap();
        fs::write(dir.path().join("a.out"), "3\n").unwrap();

        let report = SnapshotRunner::new(dir.path(), false).run_all().unwrap();
        assert_eq!(report.failed, 1);
        assert_eq!(report.exit_code(), 1);
        assert_eq!(report.results[0].actual, "2");

        let updated = SnapshotRunner::new(dir.path(), true).run_all().unwrap();
        assert_eq!(updated.failed, 0);
        assert_eq!(fs::read_to_string(dir.path().join("a.out")).unwrap(), "2\n");
    }
}
