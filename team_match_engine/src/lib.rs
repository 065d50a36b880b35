#![forbid(unsafe_code)]

//! Team composition match-score kernel.
//!
//! Pure and deterministic: no I/O, no clocks, no randomness, integer
//! fixed-point math only. Identical inputs always produce identical
//! results and identical canonical hashes.

/// Scoring model version. Bump whenever factor semantics change.
pub const ENGINE_VERSION: u32 = 1;

pub mod arithmetic;
pub mod domain;
pub mod error;
pub mod reference;
pub mod distribution;
pub mod factors;
pub mod gaps;
pub mod invariants;
pub mod hashing;
pub mod engine;

pub use error::EngineError;
