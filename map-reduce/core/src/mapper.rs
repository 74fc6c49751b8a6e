// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::map_error::{FailureCause, MapError, TransformFailure};
use crate::mapper_config::{ConfigError, FailurePolicy, MapperConfig};
use crate::tokio_runtime::TokioRuntime;
use crate::worker_runtime::{JoinFailure, WorkerRuntime};
use crate::{Pair, Transform};
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// What a unit of work reports back to the collecting loop
enum UnitResult<K, V, E> {
    Emitted(Option<Pair<K, V>>),
    Failed(FailureCause<E>),
    Aborted,
}

struct UnitOutcome<I, K, V, E> {
    index: usize,
    item: Arc<I>,
    result: UnitResult<K, V, E>,
}

/// Everything a finished map batch produced
///
/// `pairs` follows completion order, not input order.
#[derive(Debug)]
pub struct MapOutput<I, K, V, E> {
    pairs: Vec<Pair<K, V>>,
    failures: Vec<TransformFailure<I, E>>,
    filtered: usize,
}

impl<I, K, V, E> MapOutput<I, K, V, E> {
    fn empty() -> Self {
        Self {
            pairs: Vec::new(),
            failures: Vec::new(),
            filtered: 0,
        }
    }

    pub fn pairs(&self) -> &[Pair<K, V>] {
        &self.pairs
    }

    /// Failed items, only populated under `FailurePolicy::Collect`
    pub fn failures(&self) -> &[TransformFailure<I, E>] {
        &self.failures
    }

    /// Number of items the transform filtered out
    pub fn filtered(&self) -> usize {
        self.filtered
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn into_pairs(self) -> Vec<Pair<K, V>> {
        self.pairs
    }

    pub fn into_parts(self) -> (Vec<Pair<K, V>>, Vec<TransformFailure<I, E>>) {
        (self.pairs, self.failures)
    }
}

/// Applies a transform to every item of a batch with bounded parallelism
///
/// Each call to [`Mapper::run`] builds its own pool of units, waits for all of
/// them, and tears the pool down before returning. Nothing is shared between
/// batches except the cancellation token.
pub struct Mapper<R: WorkerRuntime = TokioRuntime> {
    config: MapperConfig,
    cancellation_token: CancellationToken,
    _runtime: PhantomData<R>,
}

impl Mapper<TokioRuntime> {
    pub fn with_parallelism(parallelism: usize) -> Result<Self, ConfigError> {
        Self::new(MapperConfig::with_parallelism(parallelism))
    }
}

impl<R: WorkerRuntime> Mapper<R> {
    pub fn new(config: MapperConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            cancellation_token: CancellationToken::new(),
            _runtime: PhantomData,
        })
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Returns a clone of the cancellation token for external control
    /// Cancelling it interrupts the running batch and every later one
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    /// Runs one map batch and waits for every unit of work to finish
    ///
    /// A slot is held from the moment a transform is handed to the runtime
    /// until the transform returns, so a unit abandoned on timeout still
    /// counts against the parallelism until its work is done.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn run<I, T>(
        &self,
        items: Vec<I>,
        transform: T,
    ) -> Result<MapOutput<I, T::Key, T::Value, T::Error>, MapError<I, T::Error>>
    where
        I: Send + Sync + 'static,
        T: Transform<I>,
        T::Key: Send + 'static,
        T::Value: Send + 'static,
        T::Error: Send + 'static,
    {
        let total = items.len();
        let parallelism = self.config.parallelism;
        info!(items = total, parallelism, "map batch started");

        let permits = parallelism.min(Semaphore::MAX_PERMITS).min(u32::MAX as usize);
        let slots = Arc::new(Semaphore::new(permits));
        let transform = Arc::new(transform);
        let batch_token = self.cancellation_token.child_token();

        let mut pending = items.into_iter().enumerate().peekable();
        let mut units: JoinSet<Option<UnitOutcome<I, T::Key, T::Value, T::Error>>> =
            JoinSet::new();
        let mut scheduled = 0;
        let mut completed = 0;
        let mut output = MapOutput::empty();

        // Collect finished units first, then hand a free slot to the next item
        loop {
            let has_pending = pending.peek().is_some();
            if !has_pending && units.is_empty() {
                break;
            }

            tokio::select! {
                biased;
                _ = self.cancellation_token.cancelled() => {
                    return Err(interrupt(&batch_token, &mut units, completed, scheduled));
                }
                Some(joined) = units.join_next() => {
                    // A supervising task that panicked or never reported
                    let Ok(Some(outcome)) = joined else {
                        return Err(interrupt(&batch_token, &mut units, completed, scheduled));
                    };

                    match outcome.result {
                        UnitResult::Emitted(Some(pair)) => output.pairs.push(pair),
                        UnitResult::Emitted(None) => output.filtered += 1,
                        UnitResult::Failed(cause) => {
                            warn!(index = outcome.index, "map unit failed");
                            let failure = TransformFailure::new(outcome.index, outcome.item, cause);
                            if self.config.failure_policy == FailurePolicy::FailFast {
                                teardown(&batch_token, &mut units);
                                return Err(MapError::Transform(failure));
                            }
                            output.failures.push(failure);
                        }
                        UnitResult::Aborted => {
                            return Err(interrupt(&batch_token, &mut units, completed, scheduled));
                        }
                    }
                    completed += 1;
                }
                acquired = Arc::clone(&slots).acquire_owned(), if has_pending => {
                    let (Ok(slot), Some((index, item))) = (acquired, pending.next()) else {
                        return Err(interrupt(&batch_token, &mut units, completed, scheduled));
                    };
                    self.dispatch(index, item, slot, &transform, &batch_token, &mut units);
                    scheduled += 1;
                }
            }
        }

        // Units abandoned on timeout may still be running; wait for their slots
        let drained = tokio::select! {
            biased;
            _ = self.cancellation_token.cancelled() => false,
            all = slots.acquire_many(permits as u32) => all.is_ok(),
        };
        if !drained {
            return Err(interrupt(&batch_token, &mut units, completed, scheduled));
        }

        info!(
            pairs = output.pairs.len(),
            filtered = output.filtered,
            failures = output.failures.len(),
            "map batch finished"
        );
        Ok(output)
    }

    fn dispatch<I, T>(
        &self,
        index: usize,
        item: I,
        slot: OwnedSemaphorePermit,
        transform: &Arc<T>,
        batch_token: &CancellationToken,
        units: &mut JoinSet<Option<UnitOutcome<I, T::Key, T::Value, T::Error>>>,
    ) where
        I: Send + Sync + 'static,
        T: Transform<I>,
        T::Key: Send + 'static,
        T::Value: Send + 'static,
        T::Error: Send + 'static,
    {
        let item = Arc::new(item);
        let transform = Arc::clone(transform);
        let token = batch_token.clone();
        let timeout = self.config.task_timeout();
        debug!(index, "map unit scheduled");

        units.spawn(async move {
            if token.is_cancelled() {
                return None;
            }

            let work_item = Arc::clone(&item);
            let handle = R::spawn(move || {
                // Released only when the transform itself returns
                let _slot = slot;
                transform.apply(&work_item)
            });

            let result = tokio::select! {
                _ = token.cancelled() => return None,
                result = await_unit::<R, T::Key, T::Value, T::Error>(handle, timeout) => result,
            };

            debug!(index, "map unit completed");
            Some(UnitOutcome {
                index,
                item,
                result,
            })
        });
    }
}

async fn await_unit<R, K, V, E>(
    handle: R::Handle<Result<Option<Pair<K, V>>, E>>,
    timeout: Option<Duration>,
) -> UnitResult<K, V, E>
where
    R: WorkerRuntime,
    K: Send + 'static,
    V: Send + 'static,
    E: Send + 'static,
{
    let joined = match timeout {
        Some(limit) => match tokio::time::timeout(limit, R::join(handle)).await {
            Ok(joined) => joined,
            Err(_) => return UnitResult::Failed(FailureCause::TimedOut(limit)),
        },
        None => R::join(handle).await,
    };

    match joined {
        Ok(Ok(emitted)) => UnitResult::Emitted(emitted),
        Ok(Err(err)) => UnitResult::Failed(FailureCause::Transform(err)),
        Err(JoinFailure::Panicked(message)) => UnitResult::Failed(FailureCause::Panicked(message)),
        Err(JoinFailure::Aborted) => UnitResult::Aborted,
    }
}

fn teardown<T: 'static>(batch_token: &CancellationToken, units: &mut JoinSet<T>) {
    batch_token.cancel();
    units.abort_all();
}

fn interrupt<I, E, T: 'static>(
    batch_token: &CancellationToken,
    units: &mut JoinSet<T>,
    completed: usize,
    scheduled: usize,
) -> MapError<I, E> {
    teardown(batch_token, units);
    warn!(completed, scheduled, "map batch interrupted");
    MapError::Interrupted {
        completed,
        scheduled,
    }
}

/// Runs a single batch with the default runtime and the given parallelism
pub async fn run_map<I, T>(
    items: Vec<I>,
    transform: T,
    parallelism: usize,
) -> Result<MapOutput<I, T::Key, T::Value, T::Error>, MapError<I, T::Error>>
where
    I: Send + Sync + 'static,
    T: Transform<I>,
    T::Key: Send + 'static,
    T::Value: Send + 'static,
    T::Error: Send + 'static,
{
    let mapper = Mapper::with_parallelism(parallelism)?;
    mapper.run(items, transform).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thread_runtime::ThreadRuntime;
    use std::collections::HashSet;
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[derive(Debug, PartialEq, thiserror::Error)]
    #[error("cannot map {0}")]
    struct BadItem(String);

    fn length_or_skip(
        item: &&'static str,
    ) -> Result<Option<Pair<&'static str, usize>>, Infallible> {
        if *item == "skip" {
            return Ok(None);
        }
        Ok(Some(Pair::new(*item, item.len())))
    }

    fn reject_bad(item: &&'static str) -> Result<Option<Pair<&'static str, usize>>, BadItem> {
        if *item == "bad" {
            return Err(BadItem(item.to_string()));
        }
        Ok(Some(Pair::new(*item, 1)))
    }

    fn as_set<K: Clone + Eq + std::hash::Hash, V: Clone + Eq + std::hash::Hash>(
        pairs: &[Pair<K, V>],
    ) -> HashSet<(K, V)> {
        pairs
            .iter()
            .map(|pair| (pair.key().clone(), pair.value().clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_filtered_items_are_dropped() {
        let output = run_map(vec!["x", "skip", "y"], length_or_skip, 2)
            .await
            .unwrap();

        assert_eq!(as_set(output.pairs()), HashSet::from([("x", 1), ("y", 1)]));
        assert_eq!(output.filtered(), 1);
        assert!(output.is_complete());
    }

    #[tokio::test]
    async fn test_empty_batch_returns_empty_output() {
        let output = run_map(Vec::<&'static str>::new(), length_or_skip, 3)
            .await
            .unwrap();
        assert!(output.pairs().is_empty());
        assert_eq!(output.filtered(), 0);
    }

    #[tokio::test]
    async fn test_result_count_is_independent_of_parallelism() {
        let items: Vec<&'static str> = vec!["a", "skip", "bb", "ccc", "skip", "dddd", "e"];

        for parallelism in 1..=items.len() {
            let output = run_map(items.clone(), length_or_skip, parallelism)
                .await
                .unwrap();
            assert_eq!(output.pairs().len(), 5, "parallelism {}", parallelism);
            assert_eq!(output.filtered(), 2);
        }
    }

    #[tokio::test]
    async fn test_collect_policy_keeps_successes_and_names_failed_item() {
        let output = run_map(vec!["ok1", "bad", "ok2"], reject_bad, 2)
            .await
            .unwrap();

        assert_eq!(
            as_set(output.pairs()),
            HashSet::from([("ok1", 1), ("ok2", 1)])
        );
        assert_eq!(output.failures().len(), 1);

        let failure = &output.failures()[0];
        assert_eq!(failure.index(), 1);
        assert_eq!(*failure.item(), "bad");
        assert_eq!(
            failure.cause(),
            &FailureCause::Transform(BadItem("bad".to_string()))
        );
        assert_eq!(
            failure.to_string(),
            "transform failed for item #1 \"bad\": cannot map bad"
        );
    }

    #[tokio::test]
    async fn test_fail_fast_aborts_batch() {
        let config = MapperConfig {
            parallelism: 1,
            failure_policy: FailurePolicy::FailFast,
            ..MapperConfig::default()
        };
        let mapper: Mapper = Mapper::new(config).unwrap();

        let err = mapper
            .run(vec!["ok1", "bad", "ok2"], reject_bad)
            .await
            .unwrap_err();

        match err {
            MapError::Transform(failure) => assert_eq!(*failure.item(), "bad"),
            other => panic!("Expected transform failure, got {}", other),
        }
    }

    #[tokio::test]
    async fn test_parallelism_bound_is_respected() {
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (running_in, peak_in) = (running.clone(), peak.clone());

        let transform = move |item: &usize| -> Result<Option<Pair<usize, usize>>, Infallible> {
            let now = running_in.fetch_add(1, Ordering::SeqCst) + 1;
            peak_in.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(15));
            running_in.fetch_sub(1, Ordering::SeqCst);
            Ok(Some(Pair::new(*item % 3, *item)))
        };

        let output = run_map((0..24).collect::<Vec<usize>>(), transform, 3).await.unwrap();

        assert_eq!(output.pairs().len(), 24);
        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(running.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_panicking_transform_is_reported() {
        let transform = |item: &u32| -> Result<Option<Pair<u32, u32>>, Infallible> {
            if *item == 7 {
                panic!("item {} is cursed", item);
            }
            Ok(Some(Pair::new(*item, *item)))
        };

        let output = run_map(vec![1u32, 7, 9], transform, 2).await.unwrap();

        assert_eq!(output.pairs().len(), 2);
        let failure = &output.failures()[0];
        assert_eq!(*failure.item(), 7);
        assert_eq!(
            failure.cause(),
            &FailureCause::Panicked("item 7 is cursed".to_string())
        );
    }

    #[tokio::test]
    async fn test_slow_unit_times_out() {
        let config = MapperConfig {
            parallelism: 2,
            task_timeout_ms: Some(20),
            ..MapperConfig::default()
        };
        let mapper: Mapper = Mapper::new(config).unwrap();
        let transform = |item: &u64| -> Result<Option<Pair<u64, ()>>, Infallible> {
            thread::sleep(Duration::from_millis(*item));
            Ok(Some(Pair::new(*item, ())))
        };

        let output = mapper.run(vec![0u64, 400], transform).await.unwrap();

        assert_eq!(output.pairs(), &[Pair::new(0, ())]);
        let failure = &output.failures()[0];
        assert_eq!(*failure.item(), 400);
        assert_eq!(
            failure.cause(),
            &FailureCause::TimedOut(Duration::from_millis(20))
        );
    }

    #[tokio::test]
    async fn test_timed_out_units_keep_their_slot() {
        let config = MapperConfig {
            parallelism: 2,
            task_timeout_ms: Some(10),
            ..MapperConfig::default()
        };
        let mapper: Mapper = Mapper::new(config).unwrap();
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (running_in, peak_in) = (running.clone(), peak.clone());

        let transform = move |item: &u32| -> Result<Option<Pair<u32, u32>>, Infallible> {
            let now = running_in.fetch_add(1, Ordering::SeqCst) + 1;
            peak_in.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(60));
            running_in.fetch_sub(1, Ordering::SeqCst);
            Ok(Some(Pair::new(*item, *item)))
        };

        let output = mapper
            .run((0..6).collect::<Vec<u32>>(), transform)
            .await
            .unwrap();

        assert_eq!(output.failures().len(), 6);
        assert!(output.pairs().is_empty());
        assert!(peak.load(Ordering::SeqCst) <= 2);
        assert_eq!(running.load(Ordering::SeqCst), 0);
    }

    /// Runtime that cannot start any unit of work
    struct ExhaustedRuntime;

    impl WorkerRuntime for ExhaustedRuntime {
        type Handle<T: Send + 'static> = PhantomData<fn() -> T>;

        fn spawn<F, T>(_f: F) -> Self::Handle<T>
        where
            F: FnOnce() -> T + Send + 'static,
            T: Send + 'static,
        {
            panic!("no threads left");
        }

        fn join<T: Send + 'static>(
            _handle: Self::Handle<T>,
        ) -> impl std::future::Future<Output = Result<T, JoinFailure>> + Send {
            async { Err(JoinFailure::Aborted) }
        }
    }

    #[tokio::test]
    async fn test_dead_unit_task_interrupts_batch() {
        let mapper: Mapper<ExhaustedRuntime> =
            Mapper::new(MapperConfig::with_parallelism(2)).unwrap();
        let transform = |item: &u8| -> Result<Option<Pair<u8, u8>>, Infallible> {
            Ok(Some(Pair::new(*item, *item)))
        };

        let finished = tokio::time::timeout(
            Duration::from_secs(2),
            mapper.run(vec![1u8, 2, 3], transform),
        )
        .await;

        match finished {
            Ok(Err(MapError::Interrupted { completed, .. })) => assert_eq!(completed, 0),
            Ok(other) => panic!("Expected interruption, got {:?}", other.map(|o| o.pairs().len())),
            Err(_) => panic!("Batch hung after its unit task died"),
        }
    }

    #[tokio::test]
    async fn test_cancelled_mapper_reports_interruption() {
        let mapper = Mapper::with_parallelism(2).unwrap();
        mapper.cancellation_token().cancel();

        let err = mapper
            .run(vec!["x", "y"], length_or_skip)
            .await
            .unwrap_err();

        assert!(matches!(err, MapError::Interrupted { completed: 0, .. }));
    }

    #[tokio::test]
    async fn test_cancellation_during_batch_interrupts_it() {
        let mapper = Mapper::with_parallelism(1).unwrap();
        let token = mapper.cancellation_token();
        let transform = |item: &u32| -> Result<Option<Pair<u32, u32>>, Infallible> {
            thread::sleep(Duration::from_millis(30));
            Ok(Some(Pair::new(*item, *item)))
        };

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(45)).await;
            token.cancel();
        });

        let err = mapper.run((0..50).collect::<Vec<u32>>(), transform).await.unwrap_err();

        match err {
            MapError::Interrupted {
                completed,
                scheduled,
            } => {
                assert!(completed < 50);
                assert!(scheduled <= 50);
            }
            other => panic!("Expected interruption, got {}", other),
        }
    }

    #[tokio::test]
    async fn test_thread_runtime_runs_batch() {
        let mapper: Mapper<ThreadRuntime> = Mapper::new(MapperConfig::with_parallelism(2)).unwrap();

        let output = mapper
            .run(vec!["ok1", "bad", "ok2", "skip"], reject_bad)
            .await
            .unwrap();

        assert_eq!(output.pairs().len(), 3);
        assert_eq!(output.failures().len(), 1);
    }

    #[tokio::test]
    async fn test_zero_parallelism_is_rejected() {
        let err = run_map(vec!["x"], length_or_skip, 0).await.unwrap_err();
        assert!(matches!(
            err,
            MapError::InvalidConfig(ConfigError::ZeroParallelism)
        ));
    }
}
