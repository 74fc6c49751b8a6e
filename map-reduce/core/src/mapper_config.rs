// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_PARALLELISM: usize = 4;

/// What the mapper does when a transform fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Abort the batch on the first failure and cancel outstanding units
    FailFast,
    /// Keep going and report failures next to the produced pairs
    #[default]
    Collect,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("parallelism must be at least 1")]
    ZeroParallelism,
    #[error("task timeout must be greater than zero")]
    ZeroTimeout,
}

/// Mapper settings, injected at construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Maximum number of transform invocations running at once
    pub parallelism: usize,
    /// Per-unit time limit; `None` waits indefinitely
    pub task_timeout_ms: Option<u64>,
    pub failure_policy: FailurePolicy,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            parallelism: DEFAULT_PARALLELISM,
            task_timeout_ms: None,
            failure_policy: FailurePolicy::default(),
        }
    }
}

impl MapperConfig {
    pub fn with_parallelism(parallelism: usize) -> Self {
        Self {
            parallelism,
            ..Self::default()
        }
    }

    pub fn task_timeout(&self) -> Option<Duration> {
        self.task_timeout_ms.map(Duration::from_millis)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.parallelism == 0 {
            return Err(ConfigError::ZeroParallelism);
        }
        if self.task_timeout_ms == Some(0) {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let config: MapperConfig = serde_json::from_str(r#"{"parallelism": 8}"#).unwrap();
        assert_eq!(config.parallelism, 8);
        assert_eq!(config.task_timeout(), None);
        assert_eq!(config.failure_policy, FailurePolicy::Collect);
    }

    #[test]
    fn test_failure_policy_uses_snake_case() {
        let config: MapperConfig =
            serde_json::from_str(r#"{"failure_policy": "fail_fast", "task_timeout_ms": 250}"#)
                .unwrap();
        assert_eq!(config.failure_policy, FailurePolicy::FailFast);
        assert_eq!(config.task_timeout(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        assert_eq!(
            MapperConfig::with_parallelism(0).validate(),
            Err(ConfigError::ZeroParallelism)
        );

        let config = MapperConfig {
            task_timeout_ms: Some(0),
            ..MapperConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroTimeout));
        assert!(MapperConfig::default().validate().is_ok());
    }
}
