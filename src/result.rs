//! Result collectors
//!
//! [`TextTestResult`] records outcomes and writes the classic per-test
//! markers. [`ProgressTestResult`] wraps it and, on an interactive stream in
//! dots mode, redraws a single fixed-width status line as each test starts.

use std::fmt;
use std::io::{self, Write};

use tracing::debug;

use crate::test_model::{ExecutionState, TestId, Verbosity};

/// Width of the progress line, excluding the carriage return and separator
pub const PROGRESS_WIDTH: usize = 73;

/// Hooks the run loop calls around every test
pub trait TestResult {
    fn start_test(&mut self, id: &TestId);
    fn add_success(&mut self, id: &TestId);
    fn add_failure(&mut self, id: &TestId, details: String);
    fn add_error(&mut self, id: &TestId, details: String);
    fn add_skip(&mut self, id: &TestId, reason: String);
    fn stop_test(&mut self, _id: &TestId) {}

    /// Ask the run loop not to start another test
    fn stop(&mut self);
    fn should_stop(&self) -> bool;

    fn state(&self) -> ExecutionState;

    /// Write the collected error and failure reports
    fn print_errors(&mut self) -> std::io::Result<()>;

    fn stream(&mut self) -> &mut dyn Write;
}

/// Base collector writing `.`/`F`/`E`/`s` markers or `... ok` lines
pub struct TextTestResult<W: Write> {
    stream: W,
    verbosity: Verbosity,
    fail_fast: bool,
    should_stop: bool,
    state: ExecutionState,
    errors: Vec<(TestId, String)>,
    failures: Vec<(TestId, String)>,
    skipped: Vec<(TestId, String)>,
    /// First failed progress write, reported by `print_errors`
    write_error: Option<io::Error>,
}

impl<W: Write> TextTestResult<W> {
    pub fn new(stream: W, verbosity: Verbosity, fail_fast: bool) -> Self {
        Self {
            stream,
            verbosity,
            fail_fast,
            should_stop: false,
            state: ExecutionState::default(),
            errors: Vec::new(),
            failures: Vec::new(),
            skipped: Vec::new(),
            write_error: None,
        }
    }

    pub fn dots(&self) -> bool {
        self.verbosity == Verbosity::Dots
    }

    pub fn errors(&self) -> &[(TestId, String)] {
        &self.errors
    }

    pub fn failures(&self) -> &[(TestId, String)] {
        &self.failures
    }

    pub fn skipped(&self) -> &[(TestId, String)] {
        &self.skipped
    }

    pub fn into_inner(self) -> W {
        self.stream
    }

    /// Write and flush progress output; the run continues past a failed write
    fn write_live(&mut self, args: fmt::Arguments<'_>) {
        let written = self.stream.write_fmt(args).and_then(|()| self.stream.flush());
        if let Err(e) = written {
            debug!(error = %e, "progress write failed");
            self.write_error.get_or_insert(e);
        }
    }

    fn write_marker(&mut self, dot: &str, verbose: &str) {
        match self.verbosity {
            Verbosity::Dots => self.write_live(format_args!("{dot}")),
            Verbosity::Verbose => self.write_live(format_args!("{verbose}\n")),
        }
    }

    fn print_error_list(&mut self, flavour: &str, errors: &[(TestId, String)]) -> std::io::Result<()> {
        for (id, details) in errors {
            writeln!(self.stream, "{}", "=".repeat(70))?;
            writeln!(self.stream, "{flavour}: {id}")?;
            writeln!(self.stream, "{}", "-".repeat(70))?;
            writeln!(self.stream, "{}", details.trim_end())?;
            writeln!(self.stream)?;
        }
        Ok(())
    }
}

impl<W: Write> TestResult for TextTestResult<W> {
    fn start_test(&mut self, id: &TestId) {
        self.state.run += 1;
        if self.verbosity == Verbosity::Verbose {
            self.write_live(format_args!("{id} ... "));
        }
    }

    fn add_success(&mut self, _id: &TestId) {
        self.write_marker(".", "ok");
    }

    fn add_failure(&mut self, id: &TestId, details: String) {
        self.state.failures += 1;
        self.failures.push((id.clone(), details));
        self.write_marker("F", "FAIL");
        if self.fail_fast {
            self.stop();
        }
    }

    fn add_error(&mut self, id: &TestId, details: String) {
        self.state.errors += 1;
        self.errors.push((id.clone(), details));
        self.write_marker("E", "ERROR");
        if self.fail_fast {
            self.stop();
        }
    }

    fn add_skip(&mut self, id: &TestId, reason: String) {
        self.state.skipped += 1;
        let verbose = format!("skipped '{reason}'");
        self.skipped.push((id.clone(), reason));
        self.write_marker("s", &verbose);
    }

    fn stop(&mut self) {
        self.should_stop = true;
    }

    fn should_stop(&self) -> bool {
        self.should_stop
    }

    fn state(&self) -> ExecutionState {
        self.state
    }

    fn print_errors(&mut self) -> std::io::Result<()> {
        if let Some(e) = self.write_error.take() {
            return Err(e);
        }
        if self.dots() {
            writeln!(self.stream)?;
        }
        let errors = std::mem::take(&mut self.errors);
        let failures = std::mem::take(&mut self.failures);
        let printed = self
            .print_error_list("ERROR", &errors)
            .and_then(|()| self.print_error_list("FAIL", &failures));
        self.errors = errors;
        self.failures = failures;
        printed
    }

    fn stream(&mut self) -> &mut dyn Write {
        &mut self.stream
    }
}

/// Collector that knows the suite size and draws a live status line
pub struct ProgressTestResult<W: Write> {
    inner: TextTestResult<W>,
    total_tests: usize,
    interactive: bool,
}

impl<W: Write> ProgressTestResult<W> {
    pub fn new(inner: TextTestResult<W>, total_tests: usize, interactive: bool) -> Self {
        Self {
            inner,
            total_tests,
            interactive,
        }
    }

    pub fn inner(&self) -> &TextTestResult<W> {
        &self.inner
    }

    pub fn into_inner(self) -> TextTestResult<W> {
        self.inner
    }

    /// The padded status line for the test that just started
    pub fn status_line(&self, id: &TestId) -> String {
        let state = self.inner.state;
        let message = format!(
            "{}/{} finished - E[{}] F[{}] s[{}] - {}",
            state.run,
            self.total_tests,
            state.errors,
            state.failures,
            state.skipped,
            id.short()
        );
        let truncated: String = message.chars().take(PROGRESS_WIDTH).collect();
        format!("{truncated:<PROGRESS_WIDTH$}")
    }
}

impl<W: Write> TestResult for ProgressTestResult<W> {
    fn start_test(&mut self, id: &TestId) {
        self.inner.start_test(id);
        if self.interactive && self.inner.dots() {
            let line = self.status_line(id);
            self.inner.write_live(format_args!("\r{line} - "));
        }
    }

    fn add_success(&mut self, id: &TestId) {
        self.inner.add_success(id);
    }

    fn add_failure(&mut self, id: &TestId, details: String) {
        self.inner.add_failure(id, details);
    }

    fn add_error(&mut self, id: &TestId, details: String) {
        self.inner.add_error(id, details);
    }

    fn add_skip(&mut self, id: &TestId, reason: String) {
        self.inner.add_skip(id, reason);
    }

    fn stop_test(&mut self, id: &TestId) {
        self.inner.stop_test(id);
    }

    fn stop(&mut self) {
        self.inner.stop();
    }

    fn should_stop(&self) -> bool {
        self.inner.should_stop()
    }

    fn state(&self) -> ExecutionState {
        ExecutionState {
            total_tests: self.total_tests,
            ..self.inner.state()
        }
    }

    fn print_errors(&mut self) -> std::io::Result<()> {
        self.inner.print_errors()
    }

    fn stream(&mut self) -> &mut dyn Write {
        self.inner.stream()
    }
}
