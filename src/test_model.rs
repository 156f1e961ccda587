//! Test model definitions
//!
//! Core data structures for test identifiers, the suite tree, per-test
//! outcomes and the run configuration threaded through every stage.

use std::fmt;

use tracing::level_filters::LevelFilter;

/// Dotted test identifier, `module[.class[.method]]`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TestId(String);

impl TestId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The last two dot components (e.g. `TestCp.test_streaming`)
    pub fn short(&self) -> &str {
        match self.0.rmatch_indices('.').nth(1) {
            Some((idx, _)) => &self.0[idx + 1..],
            None => &self.0,
        }
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }
}

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TestId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A node in the suite tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suite {
    /// Ordered children, in discovery order
    Composite { name: String, children: Vec<Suite> },
    /// One runnable test
    Leaf(TestId),
}

impl Suite {
    pub fn composite(name: impl Into<String>, children: Vec<Suite>) -> Self {
        Suite::Composite {
            name: name.into(),
            children,
        }
    }

    pub fn leaf(id: impl Into<String>) -> Self {
        Suite::Leaf(TestId::new(id))
    }

    /// Number of leaves beneath this node
    pub fn count_test_cases(&self) -> usize {
        self.leaves().count()
    }

    /// Leaves in execution order (depth first, children left to right)
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves { stack: vec![self] }
    }
}

/// Deep trees are taken apart with an explicit stack rather than recursion
impl Drop for Suite {
    fn drop(&mut self) {
        let Suite::Composite { children, .. } = self else {
            return;
        };
        let mut stack = std::mem::take(children);
        while let Some(mut node) = stack.pop() {
            if let Suite::Composite { children, .. } = &mut node {
                stack.append(children);
            }
        }
    }
}

/// Iterator over the leaves of a suite in execution order
pub struct Leaves<'a> {
    stack: Vec<&'a Suite>,
}

impl<'a> Iterator for Leaves<'a> {
    type Item = &'a TestId;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            match node {
                Suite::Leaf(id) => return Some(id),
                Suite::Composite { children, .. } => self.stack.extend(children.iter().rev()),
            }
        }
        None
    }
}

/// Outcome of running a single test
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Pass,
    /// Assertion failure, with the captured report
    Failure(String),
    /// The test could not be run to a verdict
    Error(String),
    Skip(String),
}

/// Counters for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionState {
    pub total_tests: usize,
    pub run: usize,
    pub errors: usize,
    pub failures: usize,
    pub skipped: usize,
}

impl ExecutionState {
    pub fn new(total_tests: usize) -> Self {
        Self {
            total_tests,
            ..Self::default()
        }
    }

    pub fn was_successful(&self) -> bool {
        self.errors == 0 && self.failures == 0
    }

    pub fn exit_code(&self) -> i32 {
        if self.was_successful() {
            0
        } else {
            1
        }
    }
}

/// How much per-test output the collector writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// One marker character per test, plus the live progress line
    #[default]
    Dots,
    /// One `<id> ... ok` line per test
    Verbose,
}

impl Verbosity {
    /// Dots while INFO (or anything more verbose) is enabled, verbose otherwise
    pub fn from_threshold(threshold: LevelFilter) -> Self {
        if threshold >= LevelFilter::INFO {
            Verbosity::Dots
        } else {
            Verbosity::Verbose
        }
    }

    pub fn level(&self) -> u8 {
        match self {
            Verbosity::Dots => 1,
            Verbosity::Verbose => 2,
        }
    }
}

/// Options for one `test` invocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunConfiguration {
    /// Only run unit-style tests
    pub unit_only: bool,
    /// Stop on first failure or error
    pub fail_fast: bool,
    /// List instead of running
    pub list_only: bool,
    pub verbosity: Verbosity,
}
