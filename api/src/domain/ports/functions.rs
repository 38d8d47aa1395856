//! Callable server function port
//!
//! Operations the backend performs on our behalf, usually because they touch
//! several collections at once or must run with elevated rights (cascading
//! deletes, invite-code redemption).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{ClubId, GroupId, PersonId, UserId};
use crate::error::CallableError;

/// A freshly generated club invite code and the end of its validity window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteCode {
    pub invite_code: String,
    pub expires_at: DateTime<Utc>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CallableFunctions: Send + Sync {
    /// `joinClubWithCode`: add the person to the club owning the code
    async fn join_club_with_code(
        &self,
        invite_code: &str,
        person_id: &PersonId,
    ) -> Result<ClubId, CallableError>;

    /// `generateClubInviteCode`: the server picks the code and its expiry
    async fn generate_club_invite_code(&self, club_id: &ClubId)
        -> Result<InviteCode, CallableError>;

    /// `disableClubInviteCode`
    async fn disable_club_invite_code(&self, club_id: &ClubId) -> Result<(), CallableError>;

    /// `deleteClub`: cascades to groups, trainings and events
    async fn delete_club(&self, club_id: &ClubId) -> Result<(), CallableError>;

    /// `deleteGroup`: cascades to trainings
    async fn delete_group(&self, club_id: &ClubId, group_id: &GroupId)
        -> Result<(), CallableError>;

    /// `sendNotificationToPersons`
    async fn send_notification_to_persons(
        &self,
        person_ids: &[PersonId],
        title: &str,
        body: &str,
    ) -> Result<(), CallableError>;

    /// `updateEmailVerifiedStatus`
    async fn update_email_verified_status(&self, user_id: &UserId) -> Result<(), CallableError>;

    /// `updateLastLoginAt`
    async fn update_last_login_at(&self, user_id: &UserId) -> Result<(), CallableError>;
}
