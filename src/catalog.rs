//! Test catalog
//!
//! The catalog is the set of short module names a user can pass to
//! `suitectl test`. A test file `tests/test_cp.rs` contributes `cp`.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Supplies the known short test-module names
pub trait Catalog {
    fn known_module_names(&self) -> BTreeSet<String>;
}

impl Catalog for BTreeSet<String> {
    fn known_module_names(&self) -> BTreeSet<String> {
        self.clone()
    }
}

/// Catalog backed by `<dir>/<marker><name>.rs` and `<dir>/<marker><name>/main.rs`
pub struct TestDirCatalog {
    dir: PathBuf,
    marker: String,
}

impl TestDirCatalog {
    pub fn new(dir: &Path, marker: &str) -> Self {
        Self {
            dir: dir.to_path_buf(),
            marker: marker.to_string(),
        }
    }

    fn glob_names(&self, pattern: &str, names: &mut BTreeSet<String>, name_of: fn(&Path) -> Option<&str>) {
        let entries = match glob::glob(pattern) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(%pattern, error = %e, "invalid test file pattern");
                return;
            }
        };

        for path in entries.filter_map(|entry| entry.ok()) {
            if let Some(name) = name_of(&path).and_then(|stem| stem.strip_prefix(self.marker.as_str())) {
                if !name.is_empty() {
                    names.insert(name.to_string());
                }
            }
        }
    }
}

impl Catalog for TestDirCatalog {
    fn known_module_names(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        let dir = glob::Pattern::escape(&self.dir.to_string_lossy());
        let marker = glob::Pattern::escape(&self.marker);

        self.glob_names(
            &format!("{dir}/{marker}*.rs"),
            &mut names,
            |path| path.file_stem().and_then(|s| s.to_str()),
        );
        self.glob_names(
            &format!("{dir}/{marker}*/main.rs"),
            &mut names,
            |path| path.parent().and_then(|p| p.file_name()).and_then(|s| s.to_str()),
        );

        debug!(dir = %self.dir.display(), count = names.len(), "scanned test catalog");
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_scans_files_and_directories() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("test_mv.rs"), "").unwrap();
        fs::write(dir.path().join("test_cp.rs"), "").unwrap();
        fs::write(dir.path().join("helpers.rs"), "").unwrap();
        fs::write(dir.path().join("test_.rs"), "").unwrap();
        fs::create_dir(dir.path().join("test_ls")).unwrap();
        fs::write(dir.path().join("test_ls").join("main.rs"), "").unwrap();
        fs::create_dir(dir.path().join("test_empty")).unwrap();

        let catalog = TestDirCatalog::new(dir.path(), "test_");
        let names: Vec<String> = catalog.known_module_names().into_iter().collect();
        assert_eq!(names, vec!["cp", "ls", "mv"]);
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        let catalog = TestDirCatalog::new(&dir.path().join("nope"), "test_");
        assert!(catalog.known_module_names().is_empty());
    }
}
