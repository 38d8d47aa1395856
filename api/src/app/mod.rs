//! Application layer
//!
//! Contains use cases and service orchestration.
//! Services check roles and invariants, then delegate to the ports.

pub mod account_service;
pub mod club_service;
pub mod event_service;
pub mod group_service;
pub mod person_service;
pub mod selection_service;
pub mod statistics;
pub mod subscriptions;
pub mod training_service;

pub use account_service::{hash_api_key, AccountService};
pub use club_service::ClubService;
pub use event_service::{EventDetails, EventService};
pub use group_service::GroupService;
pub use person_service::{PersonDetails, PersonService};
pub use selection_service::{ClubSnapshot, DisplaySettings, SelectionService};
pub use statistics::MemberAttendance;
pub use training_service::TrainingService;
