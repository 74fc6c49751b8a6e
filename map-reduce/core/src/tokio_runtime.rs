// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::worker_runtime::{panic_message, JoinFailure, WorkerRuntime};
use std::future::Future;
use tokio::task::{JoinError, JoinHandle};

/// Runs units of work on tokio's blocking thread pool
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioRuntime;

impl WorkerRuntime for TokioRuntime {
    type Handle<T: Send + 'static> = JoinHandle<T>;

    fn spawn<F, T>(f: F) -> Self::Handle<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        tokio::task::spawn_blocking(f)
    }

    fn join<T: Send + 'static>(
        handle: Self::Handle<T>,
    ) -> impl Future<Output = Result<T, JoinFailure>> + Send {
        async move { handle.await.map_err(JoinFailure::from) }
    }
}

impl From<JoinError> for JoinFailure {
    fn from(err: JoinError) -> Self {
        match err.try_into_panic() {
            Ok(payload) => JoinFailure::Panicked(panic_message(payload.as_ref())),
            Err(_) => JoinFailure::Aborted,
        }
    }
}
