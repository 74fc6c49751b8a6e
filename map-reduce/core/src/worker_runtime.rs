// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::any::Any;
use std::future::Future;

/// Why a unit of work produced no value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JoinFailure {
    #[error("worker panicked: {0}")]
    Panicked(String),
    #[error("worker was aborted before it finished")]
    Aborted,
}

/// Trait for abstracting where a unit of work executes (blocking pool, threads)
pub trait WorkerRuntime: Send + Sync + 'static {
    type Handle<T: Send + 'static>: Send;

    /// Start a unit of work
    fn spawn<F, T>(f: F) -> Self::Handle<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static;

    /// Wait for the unit of work to finish and hand back its value
    fn join<T: Send + 'static>(
        handle: Self::Handle<T>,
    ) -> impl Future<Output = Result<T, JoinFailure>> + Send;
}

/// Renders a caught panic payload as text
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
