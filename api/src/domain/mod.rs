//! Domain layer
//!
//! Contains pure business logic with no external dependencies.
//! - `entities`: Domain models representing clubs and what they own
//! - `permissions`: Role derivation and the access decision table
//! - `ports`: Trait definitions for external dependencies

pub mod entities;
pub mod permissions;
pub mod ports;
