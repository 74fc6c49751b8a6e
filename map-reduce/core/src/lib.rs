// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Single-process map and shuffle phases of MapReduce.
//!
//! A [`Mapper`] applies a [`Transform`] to every item of a batch with a
//! bounded number of concurrent units of work and waits for all of them.
//! The [`Shuffler`] then groups the produced [`Pair`]s by key and sorts the
//! groups, ready for a reduce stage supplied by the caller.

mod pair;
pub use pair::{Group, Pair};

mod shuffle_key;
pub use shuffle_key::ShuffleKey;

pub mod shuffler;
pub use shuffler::{shuffle, ShuffleError, Shuffler};

mod transform;
pub use transform::Transform;

pub mod worker_runtime;
pub use worker_runtime::{JoinFailure, WorkerRuntime};

pub mod tokio_runtime;
pub use tokio_runtime::TokioRuntime;

pub mod thread_runtime;
pub use thread_runtime::ThreadRuntime;

mod mapper_config;
pub use mapper_config::{ConfigError, FailurePolicy, MapperConfig, DEFAULT_PARALLELISM};

mod map_error;
pub use map_error::{FailureCause, MapError, TransformFailure};

pub mod mapper;
pub use mapper::{run_map, MapOutput, Mapper};

pub mod orchestrator;
pub use orchestrator::{JobError, JobOutput, Orchestrator};
