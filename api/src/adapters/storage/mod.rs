//! Object storage adapter

pub mod local;

pub use local::LocalObjectStorage;
