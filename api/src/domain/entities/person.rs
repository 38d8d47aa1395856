//! Person domain entity
//!
//! A person is a club participant. One user account may own several persons
//! (for example a parent managing their children).

use serde::{Deserialize, Serialize};

use super::club::ClubId;
use super::user::UserId;

document_id!(
    /// Unique identifier for a person
    PersonId
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sex {
    Male,
    Female,
    Other,
}

/// A person participating in clubs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: PersonId,
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub year_of_birth: Option<i32>,
    pub sex: Sex,
    #[serde(default)]
    pub club_ids: Vec<ClubId>,
    #[serde(default)]
    pub person_img_url: Option<String>,
}

impl Person {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Data needed to create a new person
#[derive(Debug, Clone)]
pub struct NewPerson {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub year_of_birth: Option<i32>,
    pub sex: Sex,
}
