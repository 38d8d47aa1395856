//! Event domain entity
//!
//! Club events (seminars, gradings, competitions) with per-person responses.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::club::ClubId;
use super::person::PersonId;

document_id!(
    /// Unique identifier for an event
    EventId
);

/// A person's response to an event invitation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    NoResponse,
    Accepted,
    Declined,
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventStatus::NoResponse => write!(f, "NO_RESPONSE"),
            EventStatus::Accepted => write!(f, "ACCEPTED"),
            EventStatus::Declined => write!(f, "DECLINED"),
        }
    }
}

impl std::str::FromStr for EventStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "NO_RESPONSE" => Ok(EventStatus::NoResponse),
            "ACCEPTED" => Ok(EventStatus::Accepted),
            "DECLINED" => Ok(EventStatus::Declined),
            _ => Err(format!("Unknown event status: {}", s)),
        }
    }
}

/// A club event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub club_id: ClubId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    pub start_date_time: DateTime<Utc>,
    #[serde(default)]
    pub invited_person_ids: Vec<PersonId>,
    #[serde(default)]
    pub status: BTreeMap<PersonId, EventStatus>,
}

impl Event {
    pub fn can_respond(&self, person_id: &PersonId) -> bool {
        self.invited_person_ids.contains(person_id)
    }

    pub fn status_of(&self, person_id: &PersonId) -> EventStatus {
        self.status
            .get(person_id)
            .copied()
            .unwrap_or(EventStatus::NoResponse)
    }
}

/// Data needed to create a new event
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub club_id: ClubId,
    pub title: String,
    pub description: String,
    pub location: String,
    pub start_date_time: DateTime<Utc>,
    pub invited_person_ids: Vec<PersonId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_display_and_parse() {
        assert_eq!(EventStatus::NoResponse.to_string(), "NO_RESPONSE");
        assert_eq!(
            "accepted".parse::<EventStatus>().unwrap(),
            EventStatus::Accepted
        );
        assert!("maybe".parse::<EventStatus>().is_err());
    }

    #[test]
    fn only_invited_can_respond() {
        let event = Event {
            id: EventId::new(),
            club_id: ClubId::new(),
            title: "Grading".to_string(),
            description: String::new(),
            location: "Main hall".to_string(),
            start_date_time: Utc::now(),
            invited_person_ids: vec![PersonId::from("a")],
            status: BTreeMap::new(),
        };
        assert!(event.can_respond(&PersonId::from("a")));
        assert!(!event.can_respond(&PersonId::from("b")));
        assert_eq!(event.status_of(&PersonId::from("a")), EventStatus::NoResponse);
    }

    #[test]
    fn status_map_serializes_with_person_keys() {
        let mut status = BTreeMap::new();
        status.insert(PersonId::from("p1"), EventStatus::Declined);
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["p1"], "DECLINED");
    }
}
