//! Cargo libtest engine
//!
//! A test module is an integration-test target (`tests/test_cp.rs`), and a
//! leaf is one libtest test inside it. The identifier
//! `tests.test_cp.copy.test_streaming` addresses the test
//! `copy::test_streaming` of target `test_cp`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Mutex;

use tracing::{debug, trace};

use crate::discovery::{last_lines, list_target_tests, target_exists};
use crate::engine::{Availability, Engine};
use crate::error::LoadError;
use crate::test_model::{Outcome, RunConfiguration, Suite, TestId};

pub struct CargoEngine {
    cargo: String,
    project_dir: PathBuf,
    tests_dir: PathBuf,
    package: String,
    extra_args: Vec<String>,
    unit_only_env: String,
    listings: Mutex<HashMap<String, Vec<String>>>,
}

impl CargoEngine {
    pub fn new(cargo: &str, project_dir: &Path, tests_dir: &Path, package: &str) -> Self {
        Self {
            cargo: cargo.to_string(),
            project_dir: project_dir.to_path_buf(),
            tests_dir: tests_dir.to_path_buf(),
            package: package.to_string(),
            extra_args: Vec::new(),
            unit_only_env: "SUITECTL_UNIT_ONLY".to_string(),
            listings: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    pub fn with_unit_only_env(mut self, name: &str) -> Self {
        self.unit_only_env = name.to_string();
        self
    }

    /// Split an identifier into its target and libtest path segments
    fn split<'a>(&self, id: &'a TestId) -> Option<(&'a str, Vec<&'a str>)> {
        let rest = if self.package.is_empty() {
            id.as_str()
        } else {
            id.as_str().strip_prefix(self.package.as_str())?.strip_prefix('.')?
        };
        let mut segments = rest.split('.');
        let target = segments.next().filter(|t| !t.is_empty())?;
        Some((target, segments.collect()))
    }

    fn module_id(&self, target: &str) -> String {
        if self.package.is_empty() {
            target.to_string()
        } else {
            format!("{}.{}", self.package, target)
        }
    }

    /// Cached `--list` output for one target
    fn listing(&self, target: &str) -> Result<Vec<String>, LoadError> {
        let mut listings = self.listings.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(tests) = listings.get(target) {
            return Ok(tests.clone());
        }
        let tests = list_target_tests(&self.cargo, &self.project_dir, &self.extra_args, target)?;
        listings.insert(target.to_string(), tests.clone());
        Ok(tests)
    }

    fn command(&self, config: &RunConfiguration) -> Command {
        let mut cmd = Command::new(&self.cargo);
        cmd.current_dir(&self.project_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if config.unit_only {
            cmd.env(&self.unit_only_env, "1");
        }
        // Keep the terminal's Ctrl-C away from the running test
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }
        cmd
    }
}

impl Engine for CargoEngine {
    fn availability(&self) -> Availability {
        match Command::new(&self.cargo).arg("--version").output() {
            Ok(output) if output.status.success() => {
                debug!(version = %String::from_utf8_lossy(&output.stdout).trim(), "found cargo");
                Availability::Available
            }
            Ok(output) => Availability::Missing {
                component: self.cargo.clone(),
                reason: format!("`{} --version` exited with {}", self.cargo, output.status),
            },
            Err(e) => Availability::Missing {
                component: self.cargo.clone(),
                reason: e.to_string(),
            },
        }
    }

    fn load(&self, id: &TestId, _config: &RunConfiguration) -> Result<Suite, LoadError> {
        let (target, filter) = self
            .split(id)
            .ok_or_else(|| LoadError::new(format!("No module named '{id}'")))?;
        let module = self.module_id(target);

        if !target_exists(&self.tests_dir, target) {
            return Err(LoadError::new(format!("No module named '{module}'")));
        }

        let mut root = Suite::composite(module.as_str(), Vec::new());
        let mut matched = 0;
        for name in self.listing(target)? {
            let path: Vec<&str> = name.split("::").collect();
            if path.len() < filter.len() || path[..filter.len()] != filter[..] {
                continue;
            }
            let leaf = TestId::new(format!("{module}.{}", path.join(".")));
            insert_leaf(&mut root, &path[..path.len() - 1], leaf);
            matched += 1;
        }

        if matched == 0 && !filter.is_empty() {
            return Err(LoadError::new(format!(
                "module '{module}' has no attribute '{}'",
                filter.join(".")
            )));
        }

        debug!(%id, tests = matched, "loaded target");
        Ok(root)
    }

    fn run_test(&self, id: &TestId, config: &RunConfiguration) -> Outcome {
        let Some((target, path)) = self.split(id) else {
            return Outcome::Error(format!("'{id}' is not a test in {}", self.package));
        };
        let name = path.join("::");

        let output = self
            .command(config)
            .args(["test", "--test", target])
            .args(&self.extra_args)
            .args(["--", "--exact", name.as_str(), "--test-threads=1"])
            .output();

        let output = match output {
            Ok(output) => output,
            Err(e) => return Outcome::Error(format!("Failed to spawn {}: {e}", self.cargo)),
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        trace!(%id, %stdout, "test output");

        match parse_outcome(&stdout, &name) {
            Some(outcome) => outcome,
            None => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Outcome::Error(format!(
                    "no result for {name} (cargo exited with {})\n{}",
                    output.status,
                    last_lines(&stderr, 20)
                ))
            }
        }
    }
}

/// Place a leaf under nested composites named after its module path
fn insert_leaf(root: &mut Suite, modules: &[&str], leaf: TestId) {
    let mut current = root;
    for module in modules {
        let Suite::Composite { children, .. } = current else {
            return;
        };
        let idx = match children
            .iter()
            .position(|c| matches!(c, Suite::Composite { name, .. } if name == module))
        {
            Some(idx) => idx,
            None => {
                children.push(Suite::composite(*module, Vec::new()));
                children.len() - 1
            }
        };
        current = &mut children[idx];
    }
    if let Suite::Composite { children, .. } = current {
        children.push(Suite::Leaf(leaf));
    }
}

/// Find the verdict for `name` in libtest output
///
/// ```text
/// test copy::test_streaming ... FAILED
///
/// failures:
///
/// ---- copy::test_streaming stdout ----
/// thread 'copy::test_streaming' panicked at tests/test_cp.rs:10:5:
/// ...
/// ```
fn parse_outcome(stdout: &str, name: &str) -> Option<Outcome> {
    let line_prefix = format!("test {name} ... ");
    let status = stdout
        .lines()
        .find_map(|line| line.strip_prefix(line_prefix.as_str()))?
        .trim();

    if status == "ok" {
        Some(Outcome::Pass)
    } else if status == "FAILED" {
        Some(Outcome::Failure(failure_details(stdout, name)))
    } else if let Some(reason) = status.strip_prefix("ignored") {
        let reason = reason.trim_start_matches(',').trim();
        Some(Outcome::Skip(if reason.is_empty() { "ignored".to_string() } else { reason.to_string() }))
    } else {
        None
    }
}

/// The captured `---- <name> stdout ----` section
fn failure_details(stdout: &str, name: &str) -> String {
    let header = format!("---- {name} stdout ----");
    let mut details = Vec::new();
    let mut capturing = false;

    for line in stdout.lines() {
        if line == header {
            capturing = true;
            continue;
        }
        if capturing {
            if line == "failures:" || line.starts_with("---- ") {
                break;
            }
            details.push(line);
        }
    }

    let details = details.join("\n");
    if details.trim().is_empty() {
        format!("{name} failed")
    } else {
        details.trim_end().to_string()
    }
}
