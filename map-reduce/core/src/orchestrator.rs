// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::map_error::{MapError, TransformFailure};
use crate::mapper::Mapper;
use crate::shuffler::{ShuffleError, Shuffler};
use crate::tokio_runtime::TokioRuntime;
use crate::worker_runtime::WorkerRuntime;
use crate::{Group, ShuffleKey, Transform};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Groups ready for a reduce stage, plus what the map phase could not process
#[derive(Debug)]
pub struct JobOutput<I, K, V, E> {
    pub groups: Vec<Group<K, V>>,
    pub failures: Vec<TransformFailure<I, E>>,
    pub filtered: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum JobError<I, E> {
    #[error("map phase failed: {0}")]
    Map(#[from] MapError<I, E>),
    #[error("shuffle phase failed: {0}")]
    Shuffle(#[from] ShuffleError),
}

/// Orchestrator coordinates the map and shuffle phases
/// The shuffle only starts once every map unit has finished
pub struct Orchestrator<R: WorkerRuntime = TokioRuntime> {
    mapper: Mapper<R>,
    shuffler: Shuffler,
}

impl<R: WorkerRuntime> Orchestrator<R> {
    pub fn new(mapper: Mapper<R>) -> Self {
        Self {
            mapper,
            shuffler: Shuffler::new(),
        }
    }

    pub fn mapper(&self) -> &Mapper<R> {
        &self.mapper
    }

    /// Returns a clone of the cancellation token for external control
    pub fn cancellation_token(&self) -> CancellationToken {
        self.mapper.cancellation_token()
    }

    /// Runs the map phase, crosses the barrier, then shuffles the results
    pub async fn run<I, T>(
        &self,
        items: Vec<I>,
        transform: T,
    ) -> Result<JobOutput<I, T::Key, T::Value, T::Error>, JobError<I, T::Error>>
    where
        I: Send + Sync + 'static,
        T: Transform<I>,
        T::Key: ShuffleKey + Send + 'static,
        T::Value: Send + 'static,
        T::Error: Send + 'static,
    {
        info!(items = items.len(), "map phase started");
        let output = self.mapper.run(items, transform).await?;
        let filtered = output.filtered();
        let (pairs, failures) = output.into_parts();
        info!(
            pairs = pairs.len(),
            failures = failures.len(),
            "map phase completed"
        );

        let groups = self.shuffler.execute(pairs)?;
        info!(groups = groups.len(), "shuffle phase completed");

        Ok(JobOutput {
            groups,
            failures,
            filtered,
        })
    }
}
