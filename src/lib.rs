//! suitectl - cargo integration test orchestrator
//!
//! Resolves short test names against a catalog of `tests/test_*.rs`
//! targets, then lists or runs the matching libtest tests one at a time:
//! - Name resolution (`cp`, `cp.copy.test_streaming`, fully qualified ids)
//! - Suite listing with `-l`
//! - Live single-line progress while running
//! - Fail-fast and graceful Ctrl-C

pub mod cargo_engine;
pub mod catalog;
pub mod config;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod interrupt;
pub mod logging;
pub mod orchestrator;
pub mod resolver;
pub mod result;
pub mod suite;
pub mod test_model;
pub mod test_runner;

pub use cargo_engine::CargoEngine;
pub use catalog::{Catalog, TestDirCatalog};
pub use engine::{Availability, Engine};
pub use error::{Error, LoadError};
pub use orchestrator::{Streams, TestCommand};
pub use resolver::Namespace;
pub use test_model::{ExecutionState, Outcome, RunConfiguration, Suite, TestId, Verbosity};
