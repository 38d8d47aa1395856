//! Callable functions adapters
//!
//! `FunctionsBackend` picks the remote HTTP client when a functions URL is
//! configured and the in-process implementation otherwise.

pub mod http_client;
pub mod in_process;

use async_trait::async_trait;

pub use http_client::HttpCallableFunctions;
pub use in_process::InProcessFunctions;

use crate::domain::entities::{ClubId, GroupId, PersonId, UserId};
use crate::domain::ports::{CallableFunctions, InviteCode};
use crate::error::CallableError;

pub enum FunctionsBackend {
    InProcess(InProcessFunctions),
    Http(HttpCallableFunctions),
}

impl FunctionsBackend {
    fn inner(&self) -> &dyn CallableFunctions {
        match self {
            FunctionsBackend::InProcess(f) => f,
            FunctionsBackend::Http(f) => f,
        }
    }
}

#[async_trait]
impl CallableFunctions for FunctionsBackend {
    async fn join_club_with_code(
        &self,
        invite_code: &str,
        person_id: &PersonId,
    ) -> Result<ClubId, CallableError> {
        self.inner().join_club_with_code(invite_code, person_id).await
    }

    async fn generate_club_invite_code(
        &self,
        club_id: &ClubId,
    ) -> Result<InviteCode, CallableError> {
        self.inner().generate_club_invite_code(club_id).await
    }

    async fn disable_club_invite_code(&self, club_id: &ClubId) -> Result<(), CallableError> {
        self.inner().disable_club_invite_code(club_id).await
    }

    async fn delete_club(&self, club_id: &ClubId) -> Result<(), CallableError> {
        self.inner().delete_club(club_id).await
    }

    async fn delete_group(
        &self,
        club_id: &ClubId,
        group_id: &GroupId,
    ) -> Result<(), CallableError> {
        self.inner().delete_group(club_id, group_id).await
    }

    async fn send_notification_to_persons(
        &self,
        person_ids: &[PersonId],
        title: &str,
        body: &str,
    ) -> Result<(), CallableError> {
        self.inner()
            .send_notification_to_persons(person_ids, title, body)
            .await
    }

    async fn update_email_verified_status(&self, user_id: &UserId) -> Result<(), CallableError> {
        self.inner().update_email_verified_status(user_id).await
    }

    async fn update_last_login_at(&self, user_id: &UserId) -> Result<(), CallableError> {
        self.inner().update_last_login_at(user_id).await
    }
}
