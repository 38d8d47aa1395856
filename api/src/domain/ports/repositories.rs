//! Repository port traits
//!
//! One repository per document collection. Implementations are provided by
//! adapters (e.g. the in-memory document store). Child collections are always
//! addressed through their parent ids. List fields are changed one element
//! at a time so concurrent writers never overwrite each other.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;

use crate::domain::entities::{
    Club, ClubId, Event, EventId, EventStatus, Group, GroupId, NewClub, NewEvent, NewGroup,
    NewPerson, NewTraining, NewUser, Person, PersonId, Training, TrainingId, User, UserId,
};
use crate::error::DomainError;

/// Live view of one document: the current snapshot first, then every change.
/// `None` means the document does not exist (or was deleted).
pub type DocumentStream<T> = BoxStream<'static, Result<Option<T>, DomainError>>;

/// Repository for `clubs`
#[async_trait]
pub trait ClubRepository: Send + Sync {
    async fn find_by_id(&self, id: &ClubId) -> Result<Option<Club>, DomainError>;

    async fn find_by_invite_code(&self, code: &str) -> Result<Option<Club>, DomainError>;

    /// Clubs where the person is in `member_ids`
    async fn find_by_member(&self, person_id: &PersonId) -> Result<Vec<Club>, DomainError>;

    /// Create a club; the owner becomes its first admin and member
    async fn create(&self, club: &NewClub) -> Result<Club, DomainError>;

    async fn update_name(&self, id: &ClubId, name: &str) -> Result<(), DomainError>;

    /// Add a member; `false` if the person already was one
    async fn add_member(&self, id: &ClubId, person_id: &PersonId) -> Result<bool, DomainError>;

    /// Remove a member together with any admin rights
    async fn remove_member(&self, id: &ClubId, person_id: &PersonId) -> Result<(), DomainError>;

    async fn add_admin(&self, id: &ClubId, person_id: &PersonId) -> Result<(), DomainError>;

    async fn remove_admin(&self, id: &ClubId, person_id: &PersonId) -> Result<(), DomainError>;

    async fn update_invite_code(
        &self,
        id: &ClubId,
        code: Option<&str>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<(), DomainError>;

    async fn update_image_url(&self, id: &ClubId, url: &str) -> Result<(), DomainError>;

    async fn delete(&self, id: &ClubId) -> Result<(), DomainError>;

    /// Real-time listener on a single club document
    fn watch(&self, id: &ClubId) -> DocumentStream<Club>;
}

/// Repository for `clubs/{id}/groups`
#[async_trait]
pub trait GroupRepository: Send + Sync {
    async fn find_by_id(
        &self,
        club_id: &ClubId,
        id: &GroupId,
    ) -> Result<Option<Group>, DomainError>;

    async fn find_by_club(&self, club_id: &ClubId) -> Result<Vec<Group>, DomainError>;

    async fn create(&self, group: &NewGroup) -> Result<Group, DomainError>;

    async fn update_name(
        &self,
        club_id: &ClubId,
        id: &GroupId,
        name: &str,
    ) -> Result<(), DomainError>;

    async fn update_members(
        &self,
        club_id: &ClubId,
        id: &GroupId,
        member_ids: &[PersonId],
    ) -> Result<(), DomainError>;

    async fn update_trainers(
        &self,
        club_id: &ClubId,
        id: &GroupId,
        trainer_ids: &[PersonId],
    ) -> Result<(), DomainError>;

    async fn delete(&self, club_id: &ClubId, id: &GroupId) -> Result<(), DomainError>;

    async fn delete_by_club(&self, club_id: &ClubId) -> Result<(), DomainError>;
}

/// Repository for `clubs/{id}/groups/{id}/trainings`
#[async_trait]
pub trait TrainingRepository: Send + Sync {
    async fn find_by_id(
        &self,
        club_id: &ClubId,
        group_id: &GroupId,
        id: &TrainingId,
    ) -> Result<Option<Training>, DomainError>;

    async fn find_by_group(
        &self,
        club_id: &ClubId,
        group_id: &GroupId,
    ) -> Result<Vec<Training>, DomainError>;

    async fn create(&self, training: &NewTraining) -> Result<Training, DomainError>;

    async fn update_notes(
        &self,
        club_id: &ClubId,
        group_id: &GroupId,
        id: &TrainingId,
        notes: &str,
    ) -> Result<(), DomainError>;

    /// Add or remove one attendee and return the stored training
    async fn set_attended(
        &self,
        club_id: &ClubId,
        group_id: &GroupId,
        id: &TrainingId,
        person_id: &PersonId,
        attended: bool,
    ) -> Result<Training, DomainError>;

    async fn delete(
        &self,
        club_id: &ClubId,
        group_id: &GroupId,
        id: &TrainingId,
    ) -> Result<(), DomainError>;

    async fn delete_by_group(&self, club_id: &ClubId, group_id: &GroupId)
        -> Result<(), DomainError>;
}

/// Repository for `clubs/{id}/events`
#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn find_by_id(
        &self,
        club_id: &ClubId,
        id: &EventId,
    ) -> Result<Option<Event>, DomainError>;

    async fn find_by_club(&self, club_id: &ClubId) -> Result<Vec<Event>, DomainError>;

    async fn create(&self, event: &NewEvent) -> Result<Event, DomainError>;

    /// Replace title, description, location, start and invitees
    async fn update(&self, event: &Event) -> Result<(), DomainError>;

    async fn update_status(
        &self,
        club_id: &ClubId,
        id: &EventId,
        person_id: &PersonId,
        status: EventStatus,
    ) -> Result<(), DomainError>;

    async fn delete(&self, club_id: &ClubId, id: &EventId) -> Result<(), DomainError>;

    async fn delete_by_club(&self, club_id: &ClubId) -> Result<(), DomainError>;
}

/// Repository for `persons`
#[async_trait]
pub trait PersonRepository: Send + Sync {
    async fn find_by_id(&self, id: &PersonId) -> Result<Option<Person>, DomainError>;

    async fn find_by_ids(&self, ids: &[PersonId]) -> Result<Vec<Person>, DomainError>;

    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<Person>, DomainError>;

    async fn create(&self, person: &NewPerson) -> Result<Person, DomainError>;

    /// Replace name, year of birth and sex
    async fn update(&self, person: &Person) -> Result<(), DomainError>;

    async fn add_club(&self, id: &PersonId, club_id: &ClubId) -> Result<(), DomainError>;

    async fn remove_club(&self, id: &PersonId, club_id: &ClubId) -> Result<(), DomainError>;

    async fn update_image_url(&self, id: &PersonId, url: &str) -> Result<(), DomainError>;

    /// Real-time listener on a single person document
    fn watch(&self, id: &PersonId) -> DocumentStream<Person>;
}

/// Repository for `users`
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    async fn find_by_api_key_hash(&self, hash: &str) -> Result<Option<User>, DomainError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    async fn create(&self, user: &NewUser) -> Result<User, DomainError>;

    async fn update_email_verified(&self, id: &UserId, verified: bool)
        -> Result<(), DomainError>;

    async fn update_last_login(&self, id: &UserId, at: DateTime<Utc>) -> Result<(), DomainError>;
}
