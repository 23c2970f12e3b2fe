#![deny(missing_docs)]

//! Propagator construction and trajectory evolution.

pub mod builder;
pub mod evolve;

pub use builder::{build, build_for_dim, Propagator, PropagatorSpec};
pub use evolve::{evolve, evolve_pair, perturb, Trajectory};
