//! Adapters layer
//!
//! Implementations of port traits for external systems.

pub mod functions;
pub mod memory;
pub mod preferences;
pub mod storage;

pub use functions::{FunctionsBackend, HttpCallableFunctions, InProcessFunctions};
pub use memory::{
    InMemoryClubRepository, InMemoryEventRepository, InMemoryGroupRepository,
    InMemoryPersonRepository, InMemoryTrainingRepository, InMemoryUserRepository, MemoryStore,
};
pub use preferences::JsonFilePreferencesStore;
pub use storage::LocalObjectStorage;
