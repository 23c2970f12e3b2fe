//! Deterministic RNG wrapper and seed-derivation helpers.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};
use siphasher::sip::SipHasher13;
use std::hash::Hasher;

/// Deterministic RNG handle used for initial-condition perturbations.
///
/// The handle is a thin wrapper around `StdRng`. A master `seed: u64` must be
/// provided by the caller and the handle lives only as long as the call that
/// owns it. Substreams are derived by hashing `(master_seed, substream_id)`
/// with SipHash-1-3 configured with fixed zero keys.
#[derive(Debug, Clone)]
pub struct RngHandle {
    rng: StdRng,
}

impl RngHandle {
    /// Creates a new RNG handle from a master seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Draws one standard normal sample.
    pub fn standard_normal(&mut self) -> f64 {
        StandardNormal.sample(&mut self.rng)
    }

    /// Draws `len` independent standard normal samples.
    pub fn standard_normal_vec(&mut self, len: usize) -> Vec<f64> {
        (0..len).map(|_| self.standard_normal()).collect()
    }
}

/// Derives the deterministic seed for a specific substream.
pub fn derive_substream_seed(master_seed: u64, substream: u64) -> u64 {
    let mut hasher = SipHasher13::new_with_keys(0, 0);
    hasher.write_u64(master_seed);
    hasher.write_u64(substream);
    hasher.finish()
}
