//! Test utilities
//!
//! Fixtures and manual port implementations for unit tests. Services are
//! usually tested against the in-memory adapters; the mocks here add failure
//! injection and call recording on top. `mockall` mocks are generated for
//! `CallableFunctions` directly on the port.

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
