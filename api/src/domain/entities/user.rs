//! User account entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

document_id!(
    /// Unique identifier for a user account
    UserId
);

/// An authenticated account. Persons are owned by users.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    #[serde(default, skip_serializing)]
    pub api_key_hash: String,
    #[serde(default)]
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Data needed to create a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub api_key_hash: String,
}
