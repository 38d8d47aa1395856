//! Group domain entity
//!
//! A training group inside a club. Every trainer of a group must also be one of
//! its members; operations that would break this are rejected, never repaired.

use serde::{Deserialize, Serialize};

use super::club::ClubId;
use super::person::PersonId;
use crate::error::ValidationError;

document_id!(
    /// Unique identifier for a group
    GroupId
);

/// A training group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: GroupId,
    pub club_id: ClubId,
    pub name: String,
    #[serde(default)]
    pub member_ids: Vec<PersonId>,
    #[serde(default)]
    pub trainer_ids: Vec<PersonId>,
}

impl Group {
    pub fn is_member(&self, person_id: &PersonId) -> bool {
        self.member_ids.contains(person_id)
    }

    pub fn is_trainer(&self, person_id: &PersonId) -> bool {
        self.trainer_ids.contains(person_id)
    }

    /// Trainers that remain valid if the member list were replaced by `members`
    pub fn trainers_within(&self, members: &[PersonId]) -> Vec<PersonId> {
        self.trainer_ids
            .iter()
            .filter(|id| members.contains(id))
            .cloned()
            .collect()
    }
}

/// Data needed to create a new group
#[derive(Debug, Clone)]
pub struct NewGroup {
    pub club_id: ClubId,
    pub name: String,
    pub member_ids: Vec<PersonId>,
    pub trainer_ids: Vec<PersonId>,
}

/// Remove duplicates, keeping the first occurrence of each id
pub fn dedup_ids(ids: Vec<PersonId>) -> Vec<PersonId> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

/// Member and trainer lists of one group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    pub member_ids: Vec<PersonId>,
    pub trainer_ids: Vec<PersonId>,
}

impl Roster {
    /// Deduplicate both lists and require `trainer_ids ⊆ member_ids`
    pub fn validated(self) -> Result<Self, ValidationError> {
        let member_ids = dedup_ids(self.member_ids);
        let trainer_ids = dedup_ids(self.trainer_ids);
        if !trainer_ids.iter().all(|t| member_ids.contains(t)) {
            return Err(ValidationError::TrainersNotMembers);
        }
        Ok(Self {
            member_ids,
            trainer_ids,
        })
    }
}
