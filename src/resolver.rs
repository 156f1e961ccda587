//! Name resolution
//!
//! Turns the names given on the command line into fully qualified test
//! identifiers. `cp` becomes `tests.test_cp`, `cp.TestCp.test_streaming`
//! becomes `tests.test_cp.TestCp.test_streaming`, and anything whose head is
//! not in the catalog is passed through as an already qualified identifier.

use std::collections::BTreeSet;

use tracing::debug;

use crate::test_model::TestId;

/// Package prefix and per-module marker shared by every catalog module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    pub package: String,
    pub marker: String,
}

impl Namespace {
    pub fn new(package: &str, marker: &str) -> Self {
        Self {
            package: package.to_string(),
            marker: marker.to_string(),
        }
    }

    /// The text placed in front of a catalog name, e.g. `tests.test_`
    pub fn prefix(&self) -> String {
        if self.package.is_empty() {
            self.marker.clone()
        } else {
            format!("{}.{}", self.package, self.marker)
        }
    }

    pub fn qualify(&self, name: &str) -> TestId {
        TestId::new(format!("{}{}", self.prefix(), name))
    }

    /// Removes the prefix once, for display
    pub fn strip<'a>(&self, id: &'a str) -> &'a str {
        id.strip_prefix(self.prefix().as_str()).unwrap_or(id)
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self::new("tests", "test_")
    }
}

/// Resolve a single argument against the catalog
pub fn resolve(namespace: &Namespace, catalog: &BTreeSet<String>, arg: &str) -> TestId {
    let head = arg.split('.').next().unwrap_or(arg);

    if catalog.contains(arg) || catalog.contains(head) {
        let id = namespace.qualify(arg);
        debug!(%arg, %id, "resolved catalog name");
        id
    } else {
        debug!(%arg, "passing through as a qualified identifier");
        TestId::new(arg)
    }
}

/// Resolve every argument, or the whole catalog when there are none
pub fn resolve_all(namespace: &Namespace, catalog: &BTreeSet<String>, args: &[String]) -> Vec<TestId> {
    if args.is_empty() {
        return catalog.iter().map(|name| namespace.qualify(name)).collect();
    }
    args.iter().map(|arg| resolve(namespace, catalog, arg)).collect()
}
