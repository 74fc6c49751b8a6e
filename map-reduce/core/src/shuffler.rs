// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{Group, Pair, ShuffleKey};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShuffleError {
    /// A pair carried a key that cannot be grouped or ordered
    #[error("malformed key {key} in pair #{index}: {reason}")]
    MalformedKey {
        index: usize,
        key: String,
        reason: &'static str,
    },
}

/// Groups mapped pairs by key and sorts the groups by key
/// Runs sequentially, after the map barrier has been crossed
#[derive(Debug, Default, Clone, Copy)]
pub struct Shuffler;

impl Shuffler {
    pub fn new() -> Self {
        Self
    }

    pub fn execute<K, V>(&self, pairs: Vec<Pair<K, V>>) -> Result<Vec<Group<K, V>>, ShuffleError>
    where
        K: ShuffleKey,
    {
        shuffle(pairs)
    }
}

/// Shuffles a flat, unordered pair sequence into key-sorted groups
///
/// Every key is checked before any grouping starts. Within a group, values
/// keep the order in which their pairs appear in `pairs`.
pub fn shuffle<K, V>(pairs: Vec<Pair<K, V>>) -> Result<Vec<Group<K, V>>, ShuffleError>
where
    K: ShuffleKey,
{
    for (index, pair) in pairs.iter().enumerate() {
        if let Err(reason) = pair.key().check() {
            return Err(ShuffleError::MalformedKey {
                index,
                key: format!("{:?}", pair.key()),
                reason,
            });
        }
    }

    let input_len = pairs.len();
    let mut grouped: HashMap<K, Vec<V>> = HashMap::new();
    for pair in pairs {
        let (key, value) = pair.into_parts();
        grouped.entry(key).or_default().push(value);
    }

    let mut output: Vec<Group<K, V>> = grouped
        .into_iter()
        .map(|(key, values)| Pair::new(key, values))
        .collect();

    // Keys are unique here, so an unstable sort is still deterministic
    output.sort_unstable_by(|a, b| a.key().cmp(b.key()));

    debug!(pairs = input_len, groups = output.len(), "shuffle complete");
    Ok(output)
}
