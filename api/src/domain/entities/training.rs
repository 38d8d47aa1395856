//! Training domain entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::club::ClubId;
use super::group::GroupId;
use super::person::PersonId;

document_id!(
    /// Unique identifier for a training
    TrainingId
);

/// A single training session of a group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Training {
    pub id: TrainingId,
    pub club_id: ClubId,
    pub group_id: GroupId,
    pub start_date_time: DateTime<Utc>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub attended_person_ids: Vec<PersonId>,
}

impl Training {
    /// A training starting exactly now still counts as upcoming
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.start_date_time >= now
    }

    pub fn attended(&self, person_id: &PersonId) -> bool {
        self.attended_person_ids.contains(person_id)
    }
}

/// Data needed to create a new training
#[derive(Debug, Clone)]
pub struct NewTraining {
    pub club_id: ClubId,
    pub group_id: GroupId,
    pub start_date_time: DateTime<Utc>,
    pub notes: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn upcoming_boundary() {
        let now = Utc::now();
        let mut training = Training {
            id: TrainingId::new(),
            club_id: ClubId::new(),
            group_id: GroupId::new(),
            start_date_time: now,
            notes: String::new(),
            attended_person_ids: vec![],
        };
        assert!(training.is_upcoming(now));

        training.start_date_time = now - Duration::minutes(1);
        assert!(!training.is_upcoming(now));
    }
}
