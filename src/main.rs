use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use suitectl::config::Config;
use suitectl::interrupt::Interrupt;
use suitectl::logging::{level_for_flags, LogHandle};
use suitectl::{CargoEngine, RunConfiguration, Streams, TestCommand, TestDirCatalog, Verbosity};

const CONFIG_FILE: &str = "suitectl.toml";

const TEST_HELP: &str = "\
Runs the integration tests of a cargo project, one test at a time.

Each test module is a file tests/test_<name>.rs (or tests/test_<name>/main.rs),
and <name> is what you pass to this command:

  suitectl test              run every test module
  suitectl test -u           run unit tests only
  suitectl test -f           stop at the first failure
  suitectl test cp mv        run the tests in tests/test_cp.rs and tests/test_mv.rs
  suitectl test -l           list the available test modules
  suitectl test -l cp        list the tests in the cp module

A module name may be followed by a libtest path, dotted instead of '::':

  suitectl test cp.copy                  every test in mod copy of test_cp
  suitectl test cp.copy.test_streaming   a single test

Pass -d to see debugging output; while logging is at warn or quieter (-q)
each test is reported on its own line.";

#[derive(Parser)]
#[command(name = "suitectl")]
#[command(about = "Resolve, list and run cargo integration tests with live progress")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file (default: suitectl.toml, if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    debug: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "debug")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run or list tests
    #[command(long_about = TEST_HELP)]
    Test {
        /// Only run unit tests
        #[arg(short)]
        u: bool,

        /// Exit on first test failure
        #[arg(short)]
        f: bool,

        /// List available tests
        #[arg(short)]
        l: bool,

        /// Test modules, classes or single tests
        names: Vec<String>,
    },
}

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();

    let logs = LogHandle::init(level_for_flags(cli.debug, cli.quiet))?;
    let (config, base_dir) = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Test { u, f, l, names } => {
            let run_config = RunConfiguration {
                unit_only: u,
                fail_fast: f,
                list_only: l,
                verbosity: Verbosity::from_threshold(logs.threshold()),
            };
            cmd_test(&config, &base_dir, &logs, &run_config, &names)
        }
    }
}

/// An explicit `-c` file must exist; the default file is optional
fn load_config(path: Option<&Path>) -> Result<(Config, PathBuf)> {
    let (path, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(CONFIG_FILE), false),
    };

    if !required && !path.exists() {
        let cwd = std::env::current_dir().context("Could not determine the current directory")?;
        return Ok((Config::default(), cwd));
    }

    // Canonicalize config path to get absolute path, then get parent
    let path = std::fs::canonicalize(&path)
        .with_context(|| format!("Could not find config file: {}", path.display()))?;
    let base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let config = Config::load(&path).with_context(|| format!("Could not load {}", path.display()))?;
    Ok((config, base_dir))
}

fn cmd_test(
    config: &Config,
    base_dir: &Path,
    logs: &LogHandle,
    run_config: &RunConfiguration,
    names: &[String],
) -> Result<i32> {
    let project_dir = config.project_dir(base_dir);
    let tests_dir = config.tests_dir(base_dir);
    let namespace = config.namespace();

    let engine = CargoEngine::new(&config.engine.cargo, &project_dir, &tests_dir, &namespace.package)
        .with_args(config.engine.args.clone())
        .with_unit_only_env(&config.engine.unit_only_env);
    let catalog = TestDirCatalog::new(&tests_dir, &namespace.marker);

    let interrupt = Interrupt::new();
    if !run_config.list_only {
        interrupt.install()?;
    }

    let stdout = std::io::stdout();
    // Unlocked, so the Ctrl-C listener can still write between reports
    let mut report = std::io::stderr();
    let interactive = report.is_terminal();

    let code = TestCommand::new(&engine, &catalog, &namespace)
        .with_interrupt(interrupt)
        .with_logs(logs)
        .execute(
            run_config,
            names,
            Streams {
                out: &mut stdout.lock(),
                report: &mut report,
                interactive,
            },
        )?;

    Ok(code)
}
