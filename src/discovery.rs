//! Test discovery module
//!
//! Lists the tests of one integration-test target by parsing the output of
//! `cargo test --test <target> -- --list`.

use std::path::Path;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::LoadError;

/// Whether `tests/<target>.rs` or `tests/<target>/main.rs` exists
pub fn target_exists(tests_dir: &Path, target: &str) -> bool {
    tests_dir.join(format!("{target}.rs")).is_file() || tests_dir.join(target).join("main.rs").is_file()
}

/// Run `cargo test --test <target> -- --list` and return the libtest names
pub fn list_target_tests(cargo: &str, project_dir: &Path, extra_args: &[String], target: &str) -> Result<Vec<String>, LoadError> {
    debug!(%target, "listing tests");

    let output = Command::new(cargo)
        .args(["test", "--test", target])
        .args(extra_args)
        .args(["--", "--list"])
        .current_dir(project_dir)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| LoadError::new(format!("Failed to execute {cargo} test --list: {e}")))?;

    let stdout = String::from_utf8_lossy(&output.stdout);

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(LoadError::new(format!(
            "cannot import '{target}': {}",
            last_lines(&stderr, 20).trim()
        )));
    }

    Ok(parse_test_list(&stdout))
}

/// Parse the output of `cargo test -- --list`
///
/// Output format:
/// ```text
/// module::submodule::test_name: test
/// other::test_name: test
/// bench_name: bench
///
/// 2 tests, 1 benchmark
/// ```
pub fn parse_test_list(output: &str) -> Vec<String> {
    let mut tests = Vec::new();

    for line in output.lines() {
        let line = line.trim();

        if line.is_empty() {
            continue;
        }

        if let Some((name, kind)) = line.rsplit_once(": ") {
            if kind.trim() == "test" {
                tests.push(name.to_string());
            }
        }
    }

    tests
}

/// The last `n` lines of `text`
pub fn last_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    lines[lines.len().saturating_sub(n)..].join("\n")
}
