// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::Pair;

/// Per-item map function applied by the mapper
///
/// `Ok(None)` filters the item out of the batch. An `Err` is reported as a
/// failure of that item and never silently dropped.
pub trait Transform<I>: Send + Sync + 'static {
    type Key;
    type Value;
    type Error;

    fn apply(&self, item: &I) -> Result<Option<Pair<Self::Key, Self::Value>>, Self::Error>;
}

impl<F, I, K, V, E> Transform<I> for F
where
    F: Fn(&I) -> Result<Option<Pair<K, V>>, E> + Send + Sync + 'static,
{
    type Key = K;
    type Value = V;
    type Error = E;

    fn apply(&self, item: &I) -> Result<Option<Pair<K, V>>, E> {
        (self)(item)
    }
}
