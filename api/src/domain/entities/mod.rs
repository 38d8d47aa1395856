//! Domain entities
//!
//! Pure domain models for clubs and everything a club owns.
//! Documents serialize with camelCase field names, matching the collection layout
//! (`clubs`, `clubs/{id}/groups`, `clubs/{id}/groups/{id}/trainings`, `clubs/{id}/events`,
//! `persons`, `users`).

/// Declares a string-backed document identifier.
macro_rules! document_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, ::serde::Serialize, ::serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new() -> Self {
                Self(::uuid::Uuid::new_v4().simple().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

pub mod club;
pub mod event;
pub mod group;
pub mod person;
pub mod preferences;
pub mod training;
pub mod user;

pub use club::{Club, ClubId, NewClub};
pub use event::{Event, EventId, EventStatus, NewEvent};
pub use group::{dedup_ids, Group, GroupId, NewGroup, Roster};
pub use person::{NewPerson, Person, PersonId, Sex};
pub use preferences::{DateFormat, Preferences, ThemeMode, TimeFormat};
pub use training::{NewTraining, Training, TrainingId};
pub use user::{NewUser, User, UserId};
