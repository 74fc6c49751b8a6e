// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use serde::{Deserialize, Serialize};

/// Key/value tuple exchanged between the map and shuffle phases
/// Fields are fixed at construction; there are no setters
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pair<K, V> {
    key: K,
    value: V,
}

/// Shuffle output unit: a key with every value emitted for it
pub type Group<K, V> = Pair<K, Vec<V>>;

impl<K, V> Pair<K, V> {
    pub fn new(key: K, value: V) -> Self {
        Self { key, value }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn into_parts(self) -> (K, V) {
        (self.key, self.value)
    }
}

impl<K, V> From<(K, V)> for Pair<K, V> {
    fn from((key, value): (K, V)) -> Self {
        Self::new(key, value)
    }
}

impl<K, V> From<Pair<K, V>> for (K, V) {
    fn from(pair: Pair<K, V>) -> Self {
        pair.into_parts()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_from_tuple_and_back() {
        let pair: Pair<&str, i32> = ("LHR", 3).into();
        assert_eq!(pair.key(), &"LHR");
        assert_eq!(pair.value(), &3);

        let (key, value): (&str, i32) = pair.into();
        assert_eq!((key, value), ("LHR", 3));
    }

    #[test]
    fn test_pair_serializes_as_key_value_object() {
        let pair = Pair::new("JFK".to_string(), vec![1, 2]);
        let json = serde_json::to_string(&pair).unwrap();
        assert_eq!(json, r#"{"key":"JFK","value":[1,2]}"#);
    }
}
