use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::resolver::Namespace;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub project: Project,
    #[serde(default)]
    pub tests: Tests,
    #[serde(default)]
    pub engine: EngineConfig,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Project {
    /// Cargo project directory, relative to the config file
    #[serde(default = "default_project_dir")]
    pub dir: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Tests {
    /// Directory holding the `test_<name>.rs` targets, relative to the project
    #[serde(default = "default_tests_dir")]
    pub dir: PathBuf,
    /// Package prefix of every resolved identifier
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// File name prefix marking a test module
    #[serde(default = "default_marker")]
    pub marker: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Cargo executable
    #[serde(default = "default_cargo")]
    pub cargo: String,
    /// Extra arguments for `cargo test`, before `--`
    #[serde(default)]
    pub args: Vec<String>,
    /// Set to `1` in test processes when running with `-u`
    #[serde(default = "default_unit_only_env")]
    pub unit_only_env: String,
}

fn default_project_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_tests_dir() -> PathBuf {
    PathBuf::from("tests")
}

fn default_namespace() -> String {
    "tests".to_string()
}

fn default_marker() -> String {
    "test_".to_string()
}

fn default_cargo() -> String {
    "cargo".to_string()
}

fn default_unit_only_env() -> String {
    "SUITECTL_UNIT_ONLY".to_string()
}

impl Default for Project {
    fn default() -> Self {
        Self {
            dir: default_project_dir(),
        }
    }
}

impl Default for Tests {
    fn default() -> Self {
        Self {
            dir: default_tests_dir(),
            namespace: default_namespace(),
            marker: default_marker(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cargo: default_cargo(),
            args: Vec::new(),
            unit_only_env: default_unit_only_env(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.tests.marker.is_empty() {
            anyhow::bail!("tests.marker must not be empty");
        }
        if self.tests.namespace.contains(|c: char| c != '.' && !c.is_alphanumeric() && c != '_') {
            anyhow::bail!("tests.namespace '{}' is not a dotted name", self.tests.namespace);
        }
        if self.engine.cargo.is_empty() {
            anyhow::bail!("engine.cargo must not be empty");
        }

        Ok(())
    }

    pub fn namespace(&self) -> Namespace {
        Namespace::new(&self.tests.namespace, &self.tests.marker)
    }

    /// Project directory, resolved against `base_dir`
    pub fn project_dir(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(&self.project.dir)
    }

    pub fn tests_dir(&self, base_dir: &Path) -> PathBuf {
        self.project_dir(base_dir).join(&self.tests.dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[project]
dir = "core"

[tests]
namespace = "gslib.tests"

[engine]
args = ["--features", "mock"]
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.project.dir, PathBuf::from("core"));
        assert_eq!(config.tests.dir, PathBuf::from("tests"));
        assert_eq!(config.namespace(), Namespace::new("gslib.tests", "test_"));
        assert_eq!(config.engine.args, vec!["--features", "mock"]);
        assert_eq!(config.engine.cargo, "cargo");
        assert_eq!(config.engine.unit_only_env, "SUITECTL_UNIT_ONLY");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.namespace(), Namespace::default());
        assert_eq!(config.tests_dir(Path::new("/work")), PathBuf::from("/work/./tests"));
    }

    #[test]
    fn test_load_rejects_bad_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("suitectl.toml");

        fs::write(&path, "[tests]\nmarker = \"\"\n").unwrap();
        assert!(Config::load(&path).is_err());

        fs::write(&path, "[tests]\nnamespace = \"gs lib\"\n").unwrap();
        assert!(Config::load(&path).is_err());

        fs::write(&path, "[test]\nnamespace = \"x\"\n").unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
