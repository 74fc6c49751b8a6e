// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::mapper_config::ConfigError;
use std::sync::Arc;
use std::time::Duration;

/// Why a single unit of work failed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FailureCause<E> {
    /// The transform returned an error
    #[error("{0}")]
    Transform(#[source] E),
    /// The transform panicked
    #[error("transform panicked: {0}")]
    Panicked(String),
    /// The unit exceeded the configured task timeout
    #[error("timed out after {0:?}")]
    TimedOut(Duration),
}

/// A failed unit of work, attributed to the item it was scheduled for
#[derive(Debug, Clone, thiserror::Error)]
#[error("transform failed for item #{index} {item:?}: {cause}")]
pub struct TransformFailure<I, E> {
    index: usize,
    item: Arc<I>,
    #[source]
    cause: FailureCause<E>,
}

impl<I, E> TransformFailure<I, E> {
    pub(crate) fn new(index: usize, item: Arc<I>, cause: FailureCause<E>) -> Self {
        Self { index, item, cause }
    }

    /// Position of the item in the input sequence
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn item(&self) -> &I {
        &self.item
    }

    pub fn cause(&self) -> &FailureCause<E> {
        &self.cause
    }
}

/// Batch-level failure of a map run
#[derive(Debug, thiserror::Error)]
pub enum MapError<I, E> {
    /// First failure under `FailurePolicy::FailFast`
    #[error("{0}")]
    Transform(#[from] TransformFailure<I, E>),
    /// The batch was cancelled or lost a worker before every unit finished
    #[error("map batch interrupted after {completed} of {scheduled} units completed")]
    Interrupted { completed: usize, scheduled: usize },
    /// The batch was never started because its settings were invalid
    #[error("invalid mapper config: {0}")]
    InvalidConfig(#[from] ConfigError),
}
