#![forbid(unsafe_code)]

//! Team Match: Runtime
//!
//! Wraps the pure scoring kernel with configuration loading, the
//! membership store seam, what-if simulation sessions and score drift
//! reporting.
//!
//! No scoring logic lives here; every number is computed by the kernel.

pub mod config;
pub mod store;
pub mod scoring;
pub mod drift;
pub mod session;
