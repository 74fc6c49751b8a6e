// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::fmt::Debug;
use std::hash::Hash;

/// Keys accepted by the shuffler
///
/// Besides a total order and hashing, a key can report itself as malformed
/// (for example a missing `Option` key). The shuffler checks every key up
/// front and refuses the whole input on the first malformed one.
pub trait ShuffleKey: Ord + Hash + Debug {
    /// Returns the reason this key cannot be grouped, if any
    fn check(&self) -> Result<(), &'static str> {
        Ok(())
    }
}

macro_rules! well_formed_keys {
    ($($ty:ty),* $(,)?) => {
        $(impl ShuffleKey for $ty {})*
    };
}

well_formed_keys!(
    String, Box<str>, char, bool, (), u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128,
    isize,
);

impl ShuffleKey for &str {}

impl<T: ShuffleKey> ShuffleKey for Option<T> {
    fn check(&self) -> Result<(), &'static str> {
        match self {
            Some(key) => key.check(),
            None => Err("key is missing"),
        }
    }
}

impl<T: ShuffleKey> ShuffleKey for Vec<T> {
    fn check(&self) -> Result<(), &'static str> {
        self.iter().try_for_each(ShuffleKey::check)
    }
}

impl<A: ShuffleKey, B: ShuffleKey> ShuffleKey for (A, B) {
    fn check(&self) -> Result<(), &'static str> {
        self.0.check()?;
        self.1.check()
    }
}

impl<A: ShuffleKey, B: ShuffleKey, C: ShuffleKey> ShuffleKey for (A, B, C) {
    fn check(&self) -> Result<(), &'static str> {
        self.0.check()?;
        self.1.check()?;
        self.2.check()
    }
}
