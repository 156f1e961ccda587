//! Execution engine seam
//!
//! The orchestrator never loads or runs tests itself. It asks an [`Engine`]
//! to check its runtime dependency, to load one identifier into a suite
//! sub-tree, and to run one leaf to an [`Outcome`].

use crate::error::LoadError;
use crate::test_model::{Outcome, RunConfiguration, Suite, TestId};

/// Result of the startup capability check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    Available,
    Missing { component: String, reason: String },
}

pub trait Engine {
    /// Check that whatever the engine shells out to is present
    fn availability(&self) -> Availability;

    /// Load a module, class or single test into a suite sub-tree
    fn load(&self, id: &TestId, config: &RunConfiguration) -> Result<Suite, LoadError>;

    /// Run one test; blocks until it finishes
    fn run_test(&self, id: &TestId, config: &RunConfiguration) -> Outcome;
}
