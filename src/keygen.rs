// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Sortable unique keys for ordered child insertion (push-ID style).
//!
//! Keys are 20 characters: 8 encoding the millisecond timestamp, then 12
//! random digits, all drawn from a 64-character alphabet whose ASCII order
//! matches its digit order. Lexicographic comparison of keys therefore
//! matches chronological order, and a same-millisecond collision is
//! resolved by incrementing the previous random suffix, keeping keys
//! strictly increasing from a single generator.
//!
//! Clock and randomness are injectable so tests can drive a deterministic
//! clock and seeded digits.

use parking_lot::Mutex;
use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::FireDbError;

/// Digit alphabet, ascending ASCII: `-`, `0-9`, `A-Z`, `_`, `a-z`.
pub const PUSH_ALPHABET: &[u8; 64] =
    b"-0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";

/// Generated key length: 8 time characters + 12 random characters.
pub const KEY_LEN: usize = 20;

const TIME_DIGITS: usize = 8;
const RANDOM_DIGITS: usize = 12;

/// Millisecond clock source.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> u64;
}

/// Wall clock.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

struct GeneratorState {
    last_millis: Option<u64>,
    digits: [u8; RANDOM_DIGITS],
    rng: Box<dyn RngCore + Send>,
}

/// Process-local generator of sortable unique keys.
///
/// The duplicate-millisecond state is guarded by one mutex; concurrent
/// callers on the same generator keep the monotonicity guarantee.
pub struct KeyGenerator {
    clock: Box<dyn Clock>,
    state: Mutex<GeneratorState>,
}

impl KeyGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self::with_parts(Box::new(SystemClock), SmallRng::from_entropy())
    }

    /// Build a generator with an explicit clock and RNG.
    #[must_use]
    pub fn with_parts(clock: Box<dyn Clock>, rng: impl RngCore + Send + 'static) -> Self {
        Self {
            clock,
            state: Mutex::new(GeneratorState {
                last_millis: None,
                digits: [0; RANDOM_DIGITS],
                rng: Box::new(rng),
            }),
        }
    }

    /// Generate the next key.
    ///
    /// Keys from one generator are strictly increasing under a
    /// non-decreasing clock. Fails with
    /// [`FireDbError::KeyspaceExhausted`] if a single millisecond consumes
    /// every suffix, which requires 64^12 calls.
    pub fn generate(&self) -> Result<String, FireDbError> {
        let now = self.clock.now_millis();
        let mut guard = self.state.lock();
        let state = &mut *guard;

        if state.last_millis == Some(now) {
            increment(&mut state.digits)?;
        } else {
            for digit in state.digits.iter_mut() {
                *digit = state.rng.gen_range(0..64) as u8;
            }
        }
        state.last_millis = Some(now);

        let mut key = String::with_capacity(KEY_LEN);
        let mut remaining = now;
        let mut time_digits = [0u8; TIME_DIGITS];
        for digit in time_digits.iter_mut().rev() {
            *digit = (remaining % 64) as u8;
            remaining /= 64;
        }
        for digit in time_digits {
            key.push(PUSH_ALPHABET[digit as usize] as char);
        }
        for digit in state.digits {
            key.push(PUSH_ALPHABET[digit as usize] as char);
        }
        Ok(key)
    }
}

impl Default for KeyGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Add one to the base-64 suffix, carrying from the least significant digit.
fn increment(digits: &mut [u8; RANDOM_DIGITS]) -> Result<(), FireDbError> {
    for digit in digits.iter_mut().rev() {
        if *digit < 63 {
            *digit += 1;
            return Ok(());
        }
        *digit = 0;
    }
    Err(FireDbError::KeyspaceExhausted)
}
