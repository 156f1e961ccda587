//! Test runner module
//!
//! Executes a built suite one test at a time, in suite order, and writes
//! the final report.

use std::io::Write;
use std::time::{Duration, Instant};

use colored::Colorize;
use tracing::{debug, warn};

use crate::engine::Engine;
use crate::interrupt::Interrupt;
use crate::result::TestResult;
use crate::test_model::{ExecutionState, Outcome, RunConfiguration, Suite};

/// Sequential runner over an [`Engine`]
pub struct TextTestRunner<'a, E: Engine + ?Sized> {
    engine: &'a E,
    interrupt: Interrupt,
    colored: bool,
}

impl<'a, E: Engine + ?Sized> TextTestRunner<'a, E> {
    pub fn new(engine: &'a E, interrupt: Interrupt) -> Self {
        Self {
            engine,
            interrupt,
            colored: false,
        }
    }

    /// Colour the final verdict
    pub fn with_color(mut self, colored: bool) -> Self {
        self.colored = colored;
        self
    }

    /// Run every leaf until done, stopped by fail-fast, or interrupted
    pub fn run<R: TestResult + ?Sized>(
        &self,
        suite: &Suite,
        config: &RunConfiguration,
        result: &mut R,
    ) -> std::io::Result<ExecutionState> {
        let start = Instant::now();

        for id in suite.leaves() {
            if self.interrupt.requested() {
                result.stop();
            }
            if result.should_stop() {
                debug!(next = %id, "not starting further tests");
                break;
            }

            result.start_test(id);
            match self.engine.run_test(id, config) {
                Outcome::Pass => result.add_success(id),
                Outcome::Failure(details) => result.add_failure(id, details),
                Outcome::Error(details) => result.add_error(id, details),
                Outcome::Skip(reason) => result.add_skip(id, reason),
            }
            result.stop_test(id);
        }

        if self.interrupt.requested() {
            warn!("test run interrupted");
        }

        result.print_errors()?;
        let state = result.state();
        self.write_summary(result.stream(), &state, start.elapsed())?;
        Ok(state)
    }

    fn write_summary(&self, out: &mut dyn Write, state: &ExecutionState, elapsed: Duration) -> std::io::Result<()> {
        writeln!(out, "{}", "-".repeat(70))?;
        let plural = if state.run == 1 { "" } else { "s" };
        writeln!(out, "Ran {} test{} in {:.3}s", state.run, plural, elapsed.as_secs_f64())?;
        writeln!(out)?;

        let verdict = verdict(state);
        if !self.colored {
            writeln!(out, "{verdict}")?;
        } else if state.was_successful() {
            writeln!(out, "{}", verdict.green().bold())?;
        } else {
            writeln!(out, "{}", verdict.red().bold())?;
        }
        out.flush()
    }
}

/// `OK`, `OK (skipped=2)`, `FAILED (failures=1, errors=2)`...
pub fn verdict(state: &ExecutionState) -> String {
    let mut infos = Vec::new();
    if state.failures > 0 {
        infos.push(format!("failures={}", state.failures));
    }
    if state.errors > 0 {
        infos.push(format!("errors={}", state.errors));
    }
    if state.skipped > 0 {
        infos.push(format!("skipped={}", state.skipped));
    }

    let head = if state.was_successful() { "OK" } else { "FAILED" };
    if infos.is_empty() {
        head.to_string()
    } else {
        format!("{head} ({})", infos.join(", "))
    }
}
