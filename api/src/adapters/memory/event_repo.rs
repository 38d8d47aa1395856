//! In-memory adapter for EventRepository

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;

use super::{not_found, read, write};
use crate::domain::entities::{ClubId, Event, EventId, EventStatus, NewEvent, PersonId};
use crate::domain::ports::EventRepository;
use crate::error::DomainError;

#[derive(Default)]
pub struct InMemoryEventRepository {
    events: RwLock<HashMap<EventId, Event>>,
}

impl InMemoryEventRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with an event
    pub fn with_event(self, event: Event) -> Self {
        if let Ok(mut events) = self.events.write() {
            events.insert(event.id.clone(), event);
        }
        self
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn find_by_id(
        &self,
        club_id: &ClubId,
        id: &EventId,
    ) -> Result<Option<Event>, DomainError> {
        Ok(read(&self.events)?
            .get(id)
            .filter(|e| &e.club_id == club_id)
            .cloned())
    }

    async fn find_by_club(&self, club_id: &ClubId) -> Result<Vec<Event>, DomainError> {
        let mut events: Vec<Event> = read(&self.events)?
            .values()
            .filter(|e| &e.club_id == club_id)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.start_date_time);
        Ok(events)
    }

    async fn create(&self, new_event: &NewEvent) -> Result<Event, DomainError> {
        let status: BTreeMap<PersonId, EventStatus> = new_event
            .invited_person_ids
            .iter()
            .map(|id| (id.clone(), EventStatus::NoResponse))
            .collect();
        let event = Event {
            id: EventId::new(),
            club_id: new_event.club_id.clone(),
            title: new_event.title.clone(),
            description: new_event.description.clone(),
            location: new_event.location.clone(),
            start_date_time: new_event.start_date_time,
            invited_person_ids: new_event.invited_person_ids.clone(),
            status,
        };
        write(&self.events)?.insert(event.id.clone(), event.clone());
        Ok(event)
    }

    async fn update(&self, event: &Event) -> Result<(), DomainError> {
        let mut events = write(&self.events)?;
        match events.get_mut(&event.id) {
            Some(stored) if stored.club_id == event.club_id => {
                stored.title = event.title.clone();
                stored.description = event.description.clone();
                stored.location = event.location.clone();
                stored.start_date_time = event.start_date_time;
                stored.invited_person_ids = event.invited_person_ids.clone();
                stored.status = event.status.clone();
                Ok(())
            }
            _ => Err(not_found("Event", &event.id)),
        }
    }

    async fn update_status(
        &self,
        club_id: &ClubId,
        id: &EventId,
        person_id: &PersonId,
        status: EventStatus,
    ) -> Result<(), DomainError> {
        let mut events = write(&self.events)?;
        match events.get_mut(id) {
            Some(event) if &event.club_id == club_id => {
                event.status.insert(person_id.clone(), status);
                Ok(())
            }
            _ => Err(not_found("Event", id)),
        }
    }

    async fn delete(&self, club_id: &ClubId, id: &EventId) -> Result<(), DomainError> {
        let mut events = write(&self.events)?;
        match events.get(id) {
            Some(event) if &event.club_id == club_id => {
                events.remove(id);
                Ok(())
            }
            _ => Err(not_found("Event", id)),
        }
    }

    async fn delete_by_club(&self, club_id: &ClubId) -> Result<(), DomainError> {
        write(&self.events)?.retain(|_, e| &e.club_id != club_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn create_seeds_no_response_for_invitees() {
        let repo = InMemoryEventRepository::new();
        let event = repo
            .create(&NewEvent {
                club_id: ClubId::from("c"),
                title: "Seminar".to_string(),
                description: String::new(),
                location: String::new(),
                start_date_time: Utc::now(),
                invited_person_ids: vec![PersonId::from("a"), PersonId::from("b")],
            })
            .await
            .unwrap();

        assert_eq!(event.status.len(), 2);
        assert_eq!(event.status_of(&PersonId::from("b")), EventStatus::NoResponse);

        repo.update_status(
            &event.club_id,
            &event.id,
            &PersonId::from("b"),
            EventStatus::Accepted,
        )
        .await
        .unwrap();
        let stored = repo
            .find_by_id(&event.club_id, &event.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status_of(&PersonId::from("b")), EventStatus::Accepted);
    }
}
