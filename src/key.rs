//! Key projection onto code units and the polynomial bucket hash

use std::{borrow::Cow, num::NonZeroUsize};

/// Multiplier applied to the running hash before each code unit is added
pub const HASH_PRIME: u64 = 7;

/// Starting value of the running hash
pub const HASH_SEED: u64 = 0;

/// A key that can be hashed as a sequence of code units.
///
/// Strings project onto their UTF-16 code units and byte strings onto their bytes. Owned and
/// borrowed forms of the same key must yield the same sequence, otherwise a lookup through
/// [`Borrow`](std::borrow::Borrow) would address a different bucket than the insert did.
pub trait CodeUnits {
    /// Returns the code units of the key in order
    fn code_units(&self) -> impl Iterator<Item = u32> + '_;
}

impl CodeUnits for str {
    fn code_units(&self) -> impl Iterator<Item = u32> + '_ {
        self.encode_utf16().map(u32::from)
    }
}

impl CodeUnits for String {
    fn code_units(&self) -> impl Iterator<Item = u32> + '_ {
        self.as_str().code_units()
    }
}

impl CodeUnits for Box<str> {
    fn code_units(&self) -> impl Iterator<Item = u32> + '_ {
        (**self).code_units()
    }
}

impl CodeUnits for Cow<'_, str> {
    fn code_units(&self) -> impl Iterator<Item = u32> + '_ {
        self.as_ref().code_units()
    }
}

impl CodeUnits for [u8] {
    fn code_units(&self) -> impl Iterator<Item = u32> + '_ {
        self.iter().copied().map(u32::from)
    }
}

impl CodeUnits for Vec<u8> {
    fn code_units(&self) -> impl Iterator<Item = u32> + '_ {
        self.as_slice().code_units()
    }
}

impl<T: CodeUnits + ?Sized> CodeUnits for &T {
    fn code_units(&self) -> impl Iterator<Item = u32> + '_ {
        (**self).code_units()
    }
}

/// Maps `key` to a bucket index in `0..capacity`.
///
/// Each code unit is folded in as `hash = (HASH_PRIME * hash + unit) mod capacity`, starting
/// from [`HASH_SEED`]. The running value is reduced at every step, so the intermediate product
/// never exceeds `7 * capacity + u32::MAX` and fits in a `u128` for any capacity.
#[must_use]
#[allow(clippy::arithmetic_side_effects, clippy::cast_possible_truncation)]
pub fn polynomial_index<Q: CodeUnits + ?Sized>(key: &Q, capacity: NonZeroUsize) -> usize {
    let modulus = capacity.get() as u128;
    let hash = key.code_units().fold(u128::from(HASH_SEED) % modulus, |hash, unit| {
        (u128::from(HASH_PRIME) * hash + u128::from(unit)) % modulus
    });

    // reduced modulo a `usize`, so it always fits back into one
    hash as usize
}
