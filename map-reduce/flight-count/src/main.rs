// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

mod airport;
mod args;
mod config;
mod flight_counter;
mod flight_record;
mod generator;

use airport::{parse_airports, Airport};
use anyhow::{Context, Result};
use args::Args;
use clap::Parser;
use config::Config;
use flight_counter::{count_flights, render};
use flight_record::departure;
use map_reduce_core::{Mapper, Orchestrator};
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose >= 2)
        .init();
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Reads the inputs named on the command line, generating whatever is missing
fn load_inputs(args: &Args, config: &Config) -> Result<(Vec<Airport>, Vec<String>)> {
    let mut rng = rand::rng();

    let airports = match &args.airports {
        Some(path) => parse_airports(&read_file(path)?)
            .with_context(|| format!("invalid airport list {}", path.display()))?,
        None if args.input.is_none() => {
            generator::generate_airports(&mut rng, config.synthetic.num_airports)
        }
        None => Vec::new(),
    };

    let records = match &args.input {
        Some(path) => read_file(path)?.lines().map(str::to_string).collect(),
        None => {
            info!(
                records = config.synthetic.num_records,
                airports = airports.len(),
                "generating synthetic flight records"
            );
            generator::generate_records(&mut rng, &airports, &config.synthetic)
        }
    };

    Ok((airports, records))
}

#[tokio::main]
async fn main() -> Result<()> {
    let start_time = Instant::now();
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = Config::load_or_default(&args.config)?;
    config.apply_overrides(&args);
    info!(
        parallelism = config.mapper.parallelism,
        timeout_ms = ?config.mapper.task_timeout_ms,
        policy = ?config.mapper.failure_policy,
        "configuration loaded"
    );

    let (airports, records) = load_inputs(&args, &config)?;

    let mapper: Mapper =
        Mapper::new(config.mapper.clone()).context("invalid mapper configuration")?;
    let orchestrator = Orchestrator::new(mapper);
    let cancel_token = orchestrator.cancellation_token();

    // Setup Ctrl+C handler
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Ctrl+C received, initiating shutdown");
            cancel_token.cancel();
        }
    });

    let output = orchestrator
        .run(records, departure)
        .await
        .context("flight count job failed")?;

    for failure in &output.failures {
        warn!(%failure, "record rejected");
    }
    let rejected: Vec<String> = output.failures.iter().map(ToString::to_string).collect();
    let counts = count_flights(&output.groups);

    print!("{}", render(&counts, &airports, &rejected));

    info!(
        airports = counts.len(),
        skipped = output.filtered,
        rejected = rejected.len(),
        elapsed = ?start_time.elapsed(),
        "flight count complete"
    );
    Ok(())
}
