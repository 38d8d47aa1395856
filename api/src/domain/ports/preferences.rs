//! Local preference persistence port

use async_trait::async_trait;

use crate::domain::entities::{Preferences, UserId};
use crate::error::DomainError;

#[async_trait]
pub trait PreferencesStore: Send + Sync {
    /// Stored preferences, or defaults when nothing was saved yet
    async fn load(&self, user_id: &UserId) -> Result<Preferences, DomainError>;

    async fn save(&self, user_id: &UserId, preferences: &Preferences) -> Result<(), DomainError>;
}
