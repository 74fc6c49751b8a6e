// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about = "Counts departing flights per airport", long_about = None)]
pub struct Args {
    /// JSON configuration file
    #[arg(short, long, default_value = "config.json")]
    pub config: PathBuf,

    /// Flight records to process; synthetic records are generated when omitted
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Reference airport list (`name,code,latitude,longitude`) used to name
    /// airports and report the ones without departures
    #[arg(short, long)]
    pub airports: Option<PathBuf>,

    /// Overrides the configured number of concurrent map units
    #[arg(short, long)]
    pub parallelism: Option<usize>,

    /// Overrides the configured per-record time limit
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Abort on the first malformed record instead of reporting it
    #[arg(long)]
    pub fail_fast: bool,

    /// Overrides the configured number of synthetic records
    #[arg(short, long)]
    pub records: Option<usize>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
