//! Domain ports (traits)
//!
//! Port traits define interfaces that the domain layer requires.
//! Adapters provide concrete implementations of these traits.

pub mod functions;
pub mod preferences;
pub mod repositories;
pub mod storage;

#[cfg(test)]
pub use functions::MockCallableFunctions;
pub use functions::{CallableFunctions, InviteCode};
pub use preferences::PreferencesStore;
pub use repositories::{
    ClubRepository, EventRepository, GroupRepository, PersonRepository, TrainingRepository,
    UserRepository,
};
pub use storage::{ObjectStorage, ProfileImage};
