use mdfuzz_core::config::{HarnessConfig, ReportFormat};
use mdfuzz_core::dispatcher::Dispatcher;
use mdfuzz_core::executor::{ExecutionStatus, Executor, ReplayExecutor};
use mdfuzz_core::oracle::{CrashOracle, Oracle};
use mdfuzz_core::registry::REGISTRY;
use mdfuzz_core::seeds::seed_corpus;
use mdfuzz_core::target::MarkdownRenderer;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Markdown renderer fuzzing harness tools", long_about = None)]
struct Cli {
    #[clap(short, long, value_parser, global = true)]
    config_file: Option<PathBuf>,
    /// Enable debug logging (overridden by RUST_LOG).
    #[clap(short, long, global = true)]
    verbose: bool,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the registry: selector byte, case name, payload type, profile.
    Cases,
    /// Write one seed input per registry entry.
    Seed {
        #[clap(short, long)]
        out: PathBuf,
    },
    /// Replay saved inputs (files or directories) and report crashes.
    Replay {
        paths: Vec<PathBuf>,
        #[clap(long)]
        json: bool,
        #[clap(long)]
        stop_on_first_crash: bool,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<PathBuf>) -> Result<HarnessConfig, anyhow::Error> {
    match path {
        Some(config_path) => {
            info!("Loading configuration from specified path: {config_path:?}");
            HarnessConfig::load_from_file(&config_path)
        }
        None => {
            let default_config_path = PathBuf::from("mdfuzz.toml");
            if default_config_path.exists() {
                info!("No config file specified via CLI, loading default: {default_config_path:?}");
                HarnessConfig::load_from_file(&default_config_path)
            } else {
                info!(
                    "No config file specified and default 'mdfuzz.toml' not found, \
                     using built-in defaults."
                );
                Ok(HarnessConfig::default())
            }
        }
    }
}

fn list_cases() {
    println!("{:>3}  {:<20} {:<8} profile", "sel", "name", "payload");
    for (selector, case) in REGISTRY.iter().enumerate() {
        println!(
            "{:>3}  {:<20} {:<8} {}",
            selector, case.name, case.payload, case.profile
        );
    }
}

fn write_seeds(out: &Path) -> Result<(), anyhow::Error> {
    std::fs::create_dir_all(out)
        .with_context(|| format!("Failed to create seed directory {out:?}"))?;
    let seeds = seed_corpus();
    for seed in &seeds {
        let path = out.join(&seed.name);
        std::fs::write(&path, &seed.data)
            .with_context(|| format!("Failed to write seed {path:?}"))?;
    }
    info!("Wrote {} seeds to {out:?}", seeds.len());
    Ok(())
}

fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>, anyhow::Error> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            let mut entries = Vec::new();
            for entry in std::fs::read_dir(path)
                .with_context(|| format!("Failed to read directory {path:?}"))?
            {
                let file_path = entry?.path();
                if file_path.is_file() {
                    entries.push(file_path);
                }
            }
            entries.sort();
            files.extend(entries);
        } else {
            warn!("Skipping {path:?}: not a file or directory");
        }
    }
    Ok(files)
}

fn replay(
    config: &HarnessConfig,
    paths: Vec<PathBuf>,
    format: ReportFormat,
    stop_on_first_crash: bool,
) -> Result<(), anyhow::Error> {
    let paths = if paths.is_empty() {
        config.replay.inputs.clone()
    } else {
        paths
    };
    let inputs = collect_inputs(&paths)?;
    if inputs.is_empty() {
        anyhow::bail!("No inputs to replay");
    }

    let dispatcher = Dispatcher::new(MarkdownRenderer::new(), config.decoder.limits());
    let mut executor = ReplayExecutor::new(&dispatcher);
    let oracle = CrashOracle::with_cases(dispatcher.cases());

    // The default hook would print every caught panic on top of our report.
    std::panic::set_hook(Box::new(|_| {}));

    let start_time = Instant::now();
    let mut crashes = 0;
    for path in &inputs {
        let data = std::fs::read(path).with_context(|| format!("Failed to read input {path:?}"))?;
        let status = executor.execute_sync(&data);
        let report = oracle.examine(&data, &status);

        match format {
            ReportFormat::Json => {
                let line = serde_json::json!({
                    "path": path,
                    "status": status_label(&status),
                    "report": report,
                });
                println!("{line}");
            }
            ReportFormat::Text => match &report {
                Some(bug) => println!(
                    "CRASH {} case={} hash={} : {}",
                    path.display(),
                    bug.case.unwrap_or("?"),
                    bug.input_hash,
                    bug.description
                ),
                None => println!("{:<10} {}", status_label(&status), path.display()),
            },
        }

        if report.is_some() {
            crashes += 1;
            if stop_on_first_crash {
                break;
            }
        }
    }
    let _ = std::panic::take_hook();

    info!(
        "Replayed {} inputs in {:.2?}, {} crashes",
        inputs.len(),
        start_time.elapsed(),
        crashes
    );
    if crashes > 0 {
        anyhow::bail!("{crashes} crashing input(s) found");
    }
    Ok(())
}

fn status_label(status: &ExecutionStatus) -> &'static str {
    match status {
        ExecutionStatus::Ok => "ok",
        ExecutionStatus::Skipped => "skipped",
        ExecutionStatus::Suppressed(_) => "suppressed",
        ExecutionStatus::Crash(_) => "crash",
    }
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config_file)?;

    match cli.command {
        Command::Cases => list_cases(),
        Command::Seed { out } => write_seeds(&out)?,
        Command::Replay {
            paths,
            json,
            stop_on_first_crash,
        } => {
            let format = if json {
                ReportFormat::Json
            } else {
                config.replay.report_format
            };
            let stop = stop_on_first_crash || config.replay.stop_on_first_crash;
            replay(&config, paths, format, stop)?;
        }
    }
    Ok(())
}
