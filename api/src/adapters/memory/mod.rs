//! In-memory document store
//!
//! One repository per collection, each keeping documents in a map and
//! publishing every write to a change feed so `watch` listeners see it.

pub mod changes;
pub mod club_repo;
pub mod event_repo;
pub mod group_repo;
pub mod person_repo;
pub mod training_repo;
pub mod user_repo;

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub use club_repo::InMemoryClubRepository;
pub use event_repo::InMemoryEventRepository;
pub use group_repo::InMemoryGroupRepository;
pub use person_repo::InMemoryPersonRepository;
pub use training_repo::InMemoryTrainingRepository;
pub use user_repo::InMemoryUserRepository;

use crate::error::DomainError;

/// All collections of one backend instance
#[derive(Clone, Default)]
pub struct MemoryStore {
    pub clubs: Arc<InMemoryClubRepository>,
    pub groups: Arc<InMemoryGroupRepository>,
    pub trainings: Arc<InMemoryTrainingRepository>,
    pub events: Arc<InMemoryEventRepository>,
    pub persons: Arc<InMemoryPersonRepository>,
    pub users: Arc<InMemoryUserRepository>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, DomainError> {
    lock.read()
        .map_err(|_| DomainError::Database("collection lock poisoned".to_string()))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, DomainError> {
    lock.write()
        .map_err(|_| DomainError::Database("collection lock poisoned".to_string()))
}

fn not_found(kind: &str, id: impl std::fmt::Display) -> DomainError {
    DomainError::NotFound(format!("{} {} not found", kind, id))
}
