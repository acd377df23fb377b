//! VitalPulse CLI entry point

use anyhow::{Context, Result};
use std::sync::Arc;
use std::thread;
use vitalpulse::config::cli::Cli;
use vitalpulse::config::{self, Config};
use vitalpulse::dispatch::{self, StdinCommands};
use vitalpulse::group::ProcessGroup;
use vitalpulse::output::{ResultSink, StdoutSink};

fn main() -> Result<()> {
    println!("VitalPulse v{}", env!("CARGO_PKG_VERSION"));
    println!("Distributed patient vitals processing");
    println!();

    // Parse CLI arguments
    let cli = Cli::parse_args();
    cli.validate()?;

    // Build configuration (TOML file merged with CLI overrides)
    let config = build_config(&cli)?;
    config::validate_config(&config).context("Configuration validation failed")?;

    // Display configuration
    print_configuration(&config);

    if cli.dry_run {
        println!();
        println!("Dry run mode - configuration validated successfully");
        return Ok(());
    }

    run_group(config)
}

/// Build configuration from CLI arguments and optional TOML file
fn build_config(cli: &Cli) -> Result<Config> {
    let base = if let Some(ref path) = cli.config {
        config::toml::parse_toml_file(path)?
    } else {
        Config::default()
    };

    Ok(config::toml::merge_cli_with_config(cli, base))
}

/// Print configuration summary
fn print_configuration(config: &Config) {
    println!("Configuration:");
    println!("  Group:");
    println!("    Processes: {}", config.group.processes);
    println!("  Generator:");
    println!("    Patients: {}", config.generator.patients);
    match config.generator.seed {
        Some(seed) => println!("    Seed: {} (fixed)", seed),
        None => println!("    Seed: wall-clock"),
    }
    if let Some(ref path) = config.output.json_output {
        println!("  Output:");
        println!("    JSON report: {}", path.display());
    }
}

/// Launch the member group and drive the session to completion
///
/// Worker ranks run on their own named threads; the coordinator rank runs on
/// the main thread because it owns stdin. All ranks execute the same
/// dispatch loop.
fn run_group(config: Config) -> Result<()> {
    let config = Arc::new(config);
    let sink: Arc<dyn ResultSink> = Arc::new(StdoutSink);
    let debug = config.output.debug;

    let mut members = ProcessGroup::new(config.group.processes);
    let coordinator = members.remove(0);

    let mut handles = Vec::new();
    for member in members {
        let config = Arc::clone(&config);
        let sink = Arc::clone(&sink);
        let rank = member.rank();

        let handle = thread::Builder::new()
            .name(format!("rank-{}", rank))
            .spawn(move || dispatch::run_member(member, &config, None, sink))
            .with_context(|| format!("Failed to spawn thread for rank {}", rank))?;

        if debug {
            eprintln!("DEBUG: Spawned rank-{}", rank);
        }
        handles.push(handle);
    }

    let mut commands = StdinCommands;
    let coordinator_result =
        dispatch::run_member(coordinator, &config, Some(&mut commands), Arc::clone(&sink));

    // Join every worker before reporting. A coordinator failure tears the
    // group down through channel disconnects, so the joins complete.
    let mut worker_error = None;
    let mut worker_panicked = false;
    for handle in handles {
        match handle.join() {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                if worker_error.is_none() {
                    worker_error = Some(err);
                }
            }
            Err(_) => worker_panicked = true,
        }
    }

    if debug {
        eprintln!("DEBUG: All ranks joined");
    }

    coordinator_result?;
    if let Some(err) = worker_error {
        return Err(err);
    }
    if worker_panicked {
        anyhow::bail!("Worker thread panicked");
    }

    Ok(())
}
