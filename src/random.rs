//! Random sampling used to pick chain routes.
//!
//! The orchestrator only sees the [`RandomSource`] trait, so tests can swap in
//! a seeded or scripted source without touching routing logic.

use crate::error::ChainError;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

pub trait RandomSource {
    /// Returns `x` with `lo <= x <= hi`, each value equally likely.
    ///
    /// Fails with [`ChainError::InvalidRange`] if `hi < lo`.
    fn uniform_int(&mut self, lo: usize, hi: usize) -> Result<usize, ChainError>;

    /// Fisher-Yates shuffle in place. Every permutation is equally likely
    /// provided `uniform_int` is uniform.
    fn shuffle<T>(&mut self, items: &mut [T]) -> Result<(), ChainError>
    where
        Self: Sized,
    {
        let len = items.len();
        for i in 0..len {
            let j = self.uniform_int(i, len - 1)?;
            items.swap(i, j);
        }
        Ok(())
    }
}

/// [`RandomSource`] backed by any `rand` generator.
#[derive(Debug, Clone)]
pub struct Random<R = StdRng> {
    rng: R,
}

impl Random<StdRng> {
    /// Generator seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic generator for reproducible routes.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> Random<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> RandomSource for Random<R> {
    fn uniform_int(&mut self, lo: usize, hi: usize) -> Result<usize, ChainError> {
        if hi < lo {
            return Err(ChainError::InvalidRange { lo, hi });
        }
        Ok(self.rng.gen_range(lo..=hi))
    }
}

/// Generate a translation id: 16 random bytes as 32 lowercase hex characters.
///
/// Uniqueness against already-stored ids is the caller's job.
pub fn generate_translation_id<R: RngCore + ?Sized>(rng: &mut R) -> String {
    let mut bytes = [0u8; 16];
    rng.fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
