// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::args::Args;
use map_reduce_core::{FailurePolicy, MapperConfig};
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Shape of the synthetic data set used when no input file is given
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    pub num_records: usize,
    pub num_airports: usize,
    pub num_flights: usize,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            num_records: 10_000,
            num_airports: 30,
            num_flights: 500,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mapper: MapperConfig,
    pub synthetic: SyntheticConfig,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigLoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigLoadError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads the file if it exists, otherwise falls back to defaults
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigLoadError> {
        match Self::load(path) {
            Err(ConfigLoadError::Read { source, .. })
                if source.kind() == io::ErrorKind::NotFound =>
            {
                warn!(path = %path.display(), "config file not found, using defaults");
                Ok(Self::default())
            }
            result => result,
        }
    }

    pub fn apply_overrides(&mut self, args: &Args) {
        if let Some(parallelism) = args.parallelism {
            self.mapper.parallelism = parallelism;
        }
        if let Some(timeout_ms) = args.timeout_ms {
            self.mapper.task_timeout_ms = Some(timeout_ms);
        }
        if args.fail_fast {
            self.mapper.failure_policy = FailurePolicy::FailFast;
        }
        if let Some(records) = args.records {
            self.synthetic.num_records = records;
        }
    }
}
