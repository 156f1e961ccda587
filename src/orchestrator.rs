//! The `test` command
//!
//! Drives one invocation from capability check to exit status:
//! resolve names, then either list the catalog, list a built suite, or run
//! it with progress reporting.

use std::io::Write;

use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::engine::{Availability, Engine};
use crate::error::{Error, Result};
use crate::interrupt::Interrupt;
use crate::logging::LogHandle;
use crate::resolver::{resolve_all, Namespace};
use crate::result::{ProgressTestResult, TextTestResult};
use crate::suite::{build_suite, flatten, write_names};
use crate::test_model::{RunConfiguration, Verbosity};
use crate::test_runner::TextTestRunner;

/// Where listings and run reports are written
pub struct Streams<'w> {
    /// Listings
    pub out: &'w mut dyn Write,
    /// Progress, markers and the final report
    pub report: &'w mut dyn Write,
    /// Whether `report` is a terminal
    pub interactive: bool,
}

pub struct TestCommand<'a, E: Engine + ?Sized, C: Catalog + ?Sized> {
    engine: &'a E,
    catalog: &'a C,
    namespace: &'a Namespace,
    interrupt: Interrupt,
    logs: Option<&'a LogHandle>,
}

impl<'a, E: Engine + ?Sized, C: Catalog + ?Sized> TestCommand<'a, E, C> {
    pub fn new(engine: &'a E, catalog: &'a C, namespace: &'a Namespace) -> Self {
        Self {
            engine,
            catalog,
            namespace,
            interrupt: Interrupt::new(),
            logs: None,
        }
    }

    /// Stop request shared with the Ctrl-C listener
    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    /// Logging to silence during verbose runs
    pub fn with_logs(mut self, logs: &'a LogHandle) -> Self {
        self.logs = Some(logs);
        self
    }

    /// Run the command; returns the process exit status
    pub fn execute(&self, config: &RunConfiguration, args: &[String], streams: Streams<'_>) -> Result<i32> {
        if let Availability::Missing { component, reason } = self.engine.availability() {
            return Err(Error::DependencyMissing { component, reason });
        }

        let catalog = self.catalog.known_module_names();

        if config.list_only && args.is_empty() {
            write_names(streams.out, &catalog.iter().collect::<Vec<_>>())?;
            return Ok(0);
        }

        let ids = resolve_all(self.namespace, &catalog, args);
        debug!(ids = ?ids.iter().map(|id| id.as_str()).collect::<Vec<_>>(), "resolved");

        let suite = build_suite(self.engine, &ids, config)?;

        if config.list_only {
            write_names(streams.out, &flatten(&suite, self.namespace))?;
            return Ok(0);
        }

        let total_tests = suite.count_test_cases();
        info!(total_tests, verbosity = config.verbosity.level(), "running tests");

        let _quiet = match (config.verbosity, self.logs) {
            (Verbosity::Verbose, Some(logs)) => Some(logs.quiet()),
            _ => None,
        };

        let mut result = ProgressTestResult::new(
            TextTestResult::new(streams.report, config.verbosity, config.fail_fast),
            total_tests,
            streams.interactive,
        );
        let state = TextTestRunner::new(self.engine, self.interrupt.clone())
            .with_color(streams.interactive)
            .run(&suite, config, &mut result)?;

        Ok(state.exit_code())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::engine::fake::FakeEngine;
    use crate::test_model::Outcome;

    fn catalog() -> BTreeSet<String> {
        ["cp", "mv"].iter().map(|s| s.to_string()).collect()
    }

    fn engine() -> FakeEngine {
        FakeEngine::new()
            .module(
                "tests.test_cp",
                &[
                    ("TestCp.test_streaming", Outcome::Pass),
                    ("TestCp.test_noclobber", Outcome::Pass),
                    ("TestCpRemote.test_upload", Outcome::Failure("upload failed".to_string())),
                ],
            )
            .module("tests.test_mv", &[("TestMv.test_moving", Outcome::Pass)])
            .integration("tests.test_cp.TestCpRemote.test_upload")
    }

    struct Captured {
        code: Result<i32>,
        out: String,
        report: String,
    }

    fn execute(engine: &FakeEngine, config: RunConfiguration, args: &[&str]) -> Captured {
        let namespace = Namespace::default();
        let catalog = catalog();
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let mut out = Vec::new();
        let mut report = Vec::new();

        let code = TestCommand::new(engine, &catalog, &namespace).execute(
            &config,
            &args,
            Streams {
                out: &mut out,
                report: &mut report,
                interactive: false,
            },
        );

        Captured {
            code,
            out: String::from_utf8(out).unwrap(),
            report: String::from_utf8(report).unwrap(),
        }
    }

    fn list() -> RunConfiguration {
        RunConfiguration {
            list_only: true,
            ..RunConfiguration::default()
        }
    }

    #[test]
    fn test_missing_dependency_is_fatal() {
        let engine = engine().missing("cargo");
        let captured = execute(&engine, list(), &[]);

        assert!(matches!(captured.code, Err(Error::DependencyMissing { .. })));
        assert!(captured.out.is_empty());
        assert!(engine.loaded.borrow().is_empty());
    }

    #[test]
    fn test_list_catalog_without_building() {
        let engine = engine();
        let captured = execute(&engine, list(), &[]);

        assert_eq!(captured.code.unwrap(), 0);
        assert_eq!(captured.out, "Found 2 test names:\n  cp\n  mv\n");
        assert!(engine.loaded.borrow().is_empty());
    }

    #[test]
    fn test_list_suite_for_arguments() {
        let engine = engine();
        let captured = execute(&engine, list(), &["cp"]);

        assert_eq!(captured.code.unwrap(), 0);
        assert_eq!(
            captured.out,
            "Found 3 test names:\n  cp.TestCp.test_noclobber\n  cp.TestCp.test_streaming\n  cp.TestCpRemote.test_upload\n"
        );
        assert!(engine.executed.borrow().is_empty());
    }

    #[test]
    fn test_list_is_idempotent() {
        let engine = engine();
        let first = execute(&engine, list(), &["mv", "cp.TestCp"]);
        let second = execute(&engine, list(), &["mv", "cp.TestCp"]);
        assert_eq!(first.out, second.out);
        assert!(first.out.starts_with("Found 3 test names:\n"));
    }

    #[test]
    fn test_import_failure_runs_nothing() {
        let engine = engine();
        let captured = execute(&engine, RunConfiguration::default(), &["mv", "cp.TestNope"]);

        let err = captured.code.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid test argument name: module 'tests.test_cp' has no attribute 'TestNope'"
        );
        assert!(engine.executed.borrow().is_empty());
    }

    #[test]
    fn test_full_catalog_run() {
        let engine = engine();
        let captured = execute(&engine, RunConfiguration::default(), &[]);

        assert_eq!(captured.code.unwrap(), 1);
        assert_eq!(*engine.loaded.borrow(), vec!["tests.test_cp", "tests.test_mv"]);
        assert_eq!(engine.executed.borrow().len(), 4);
        assert!(captured.report.contains("FAIL: tests.test_cp.TestCpRemote.test_upload"));
        assert!(captured.out.is_empty());
    }

    #[test]
    fn test_unit_only_reaches_the_engine() {
        let engine = engine();
        let config = RunConfiguration {
            unit_only: true,
            verbosity: Verbosity::Verbose,
            ..RunConfiguration::default()
        };
        let captured = execute(&engine, config, &["cp"]);

        assert_eq!(captured.code.unwrap(), 0);
        assert!(captured
            .report
            .contains("tests.test_cp.TestCpRemote.test_upload ... skipped 'integration test'\n"));
        assert!(captured.report.ends_with("OK (skipped=1)\n"));
    }

    #[test]
    fn test_passing_selection_exits_zero() {
        let engine = engine();
        let captured = execute(&engine, RunConfiguration::default(), &["cp.TestCp.test_streaming", "mv"]);

        assert_eq!(captured.code.unwrap(), 0);
        assert_eq!(
            *engine.executed.borrow(),
            vec!["tests.test_cp.TestCp.test_streaming", "tests.test_mv.TestMv.test_moving"]
        );
        assert!(captured.report.starts_with("..\n"));
    }

    #[test]
    fn test_fail_fast_stops_the_command() {
        let engine = FakeEngine::new().module(
            "tests.test_cp",
            &[
                ("T.t1", Outcome::Pass),
                ("T.t2", Outcome::Error("crashed".to_string())),
                ("T.t3", Outcome::Pass),
            ],
        );
        let config = RunConfiguration {
            fail_fast: true,
            ..RunConfiguration::default()
        };
        let captured = execute(&engine, config, &["cp"]);

        assert_eq!(captured.code.unwrap(), 1);
        assert_eq!(engine.executed.borrow().len(), 2);
        assert!(captured.report.contains("FAILED (errors=1)"));
    }
}
