//! Suite building and listing

use std::io::Write;

use tracing::{debug, info};

use crate::engine::Engine;
use crate::error::Result;
use crate::resolver::Namespace;
use crate::test_model::{RunConfiguration, Suite, TestId};

/// Load every identifier into one root suite, in the given order
///
/// The first identifier the engine cannot load aborts the build.
pub fn build_suite<E: Engine + ?Sized>(engine: &E, ids: &[TestId], config: &RunConfiguration) -> Result<Suite> {
    let mut children = Vec::with_capacity(ids.len());
    for id in ids {
        let child = engine.load(id, config)?;
        debug!(%id, tests = child.count_test_cases(), "loaded");
        children.push(child);
    }

    let suite = Suite::composite("", children);
    info!(ids = ids.len(), tests = suite.count_test_cases(), "built test suite");
    Ok(suite)
}

/// Sorted, deduplicated leaf identifiers with the namespace prefix removed
pub fn flatten(suite: &Suite, namespace: &Namespace) -> Vec<String> {
    let mut stack = vec![suite];
    let mut names = Vec::new();

    while let Some(node) = stack.pop() {
        match node {
            Suite::Composite { children, .. } => stack.extend(children.iter()),
            Suite::Leaf(id) => names.push(namespace.strip(id.as_str()).to_string()),
        }
    }

    names.sort();
    names.dedup();
    names
}

/// `Found <N> test names:` followed by one indented name per line
pub fn write_names<W: Write + ?Sized, S: AsRef<str>>(out: &mut W, names: &[S]) -> std::io::Result<()> {
    writeln!(out, "Found {} test names:", names.len())?;
    for name in names {
        writeln!(out, "  {}", name.as_ref())?;
    }
    Ok(())
}
