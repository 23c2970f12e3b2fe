#![deny(missing_docs)]
#![doc = "Core error, seeding and serialization types shared by the coherence-gradient crates."]

pub mod errors;
pub mod rng;
pub mod serde;

pub use errors::{CgcError, ErrorInfo};
pub use rng::{derive_substream_seed, RngHandle};
pub use crate::serde::{from_json_slice, stable_hash_string, to_canonical_json_bytes};

/// Dense real coherence vector (Ψ) evolved by a propagator.
pub type StateVector = nalgebra::DVector<f64>;

/// Dense real square matrix used for propagators (T∞) and their powers.
pub type Matrix = nalgebra::DMatrix<f64>;

/// Returns `true` when every entry of the slice is finite.
pub fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|value| value.is_finite())
}
