// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::worker_runtime::{panic_message, JoinFailure, WorkerRuntime};
use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread;
use tokio::sync::oneshot;

/// Runs every unit of work on its own OS thread
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRuntime;

impl WorkerRuntime for ThreadRuntime {
    type Handle<T: Send + 'static> = oneshot::Receiver<thread::Result<T>>;

    fn spawn<F, T>(f: F) -> Self::Handle<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        thread::spawn(move || {
            let result = catch_unwind(AssertUnwindSafe(f));
            // Receiver gone means the batch no longer wants this result
            let _ = tx.send(result);
        });
        rx
    }

    fn join<T: Send + 'static>(
        handle: Self::Handle<T>,
    ) -> impl Future<Output = Result<T, JoinFailure>> + Send {
        async move {
            match handle.await {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(payload)) => Err(JoinFailure::Panicked(panic_message(payload.as_ref()))),
                Err(_) => Err(JoinFailure::Aborted),
            }
        }
    }
}
