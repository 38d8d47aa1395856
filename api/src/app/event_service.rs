//! Event service
//!
//! Club events and invitee responses. Invitees are notified through the
//! `sendNotificationToPersons` callable; a failed notification never fails
//! the write that triggered it.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::entities::{
    dedup_ids, Club, ClubId, Event, EventId, EventStatus, NewEvent, PersonId,
};
use crate::domain::ports::{CallableFunctions, ClubRepository, EventRepository};
use crate::error::{AppError, ValidationError};

/// Editable fields of an event
#[derive(Debug, Clone)]
pub struct EventDetails {
    pub title: String,
    pub description: String,
    pub location: String,
    pub start_date_time: DateTime<Utc>,
    pub invited_person_ids: Vec<PersonId>,
}

/// Service for managing club events
pub struct EventService<CR, ER, F>
where
    CR: ClubRepository,
    ER: EventRepository,
    F: CallableFunctions,
{
    clubs: Arc<CR>,
    events: Arc<ER>,
    functions: Arc<F>,
}

impl<CR, ER, F> EventService<CR, ER, F>
where
    CR: ClubRepository,
    ER: EventRepository,
    F: CallableFunctions,
{
    pub fn new(clubs: Arc<CR>, events: Arc<ER>, functions: Arc<F>) -> Self {
        Self {
            clubs,
            events,
            functions,
        }
    }

    /// Create an event and notify its invitees (club admins only)
    pub async fn create_event(
        &self,
        actor: &PersonId,
        club_id: &ClubId,
        details: EventDetails,
    ) -> Result<Event, AppError> {
        self.load_administered(actor, club_id).await?;

        let title = details.title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }

        let event = self
            .events
            .create(&NewEvent {
                club_id: club_id.clone(),
                title: title.to_string(),
                description: details.description,
                location: details.location,
                start_date_time: details.start_date_time,
                invited_person_ids: dedup_ids(details.invited_person_ids),
            })
            .await?;

        tracing::info!(
            club_id = %club_id,
            event_id = %event.id,
            invited = event.invited_person_ids.len(),
            "Event created"
        );
        self.notify(&event.invited_person_ids, &event.title, "You have been invited to an event")
            .await;
        Ok(event)
    }

    /// Replace an event's details.
    ///
    /// Responses of persons who stay invited are kept; newly invited persons
    /// start at NO_RESPONSE and are notified.
    pub async fn update_event(
        &self,
        actor: &PersonId,
        club_id: &ClubId,
        event_id: &EventId,
        details: EventDetails,
    ) -> Result<Event, AppError> {
        self.load_administered(actor, club_id).await?;
        let current = self.load_event(club_id, event_id).await?;

        let title = details.title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }

        let invited_person_ids = dedup_ids(details.invited_person_ids);
        let status: BTreeMap<PersonId, EventStatus> = invited_person_ids
            .iter()
            .map(|id| (id.clone(), current.status_of(id)))
            .collect();
        let newly_invited: Vec<PersonId> = invited_person_ids
            .iter()
            .filter(|id| !current.can_respond(id))
            .cloned()
            .collect();

        let event = Event {
            id: current.id,
            club_id: current.club_id,
            title: title.to_string(),
            description: details.description,
            location: details.location,
            start_date_time: details.start_date_time,
            invited_person_ids,
            status,
        };
        self.events.update(&event).await?;

        if !newly_invited.is_empty() {
            self.notify(&newly_invited, &event.title, "You have been invited to an event")
                .await;
        }
        Ok(event)
    }

    pub async fn delete_event(
        &self,
        actor: &PersonId,
        club_id: &ClubId,
        event_id: &EventId,
    ) -> Result<(), AppError> {
        self.load_administered(actor, club_id).await?;
        self.load_event(club_id, event_id).await?;
        self.events.delete(club_id, event_id).await?;
        tracing::info!(club_id = %club_id, event_id = %event_id, "Event deleted");
        Ok(())
    }

    /// All events of a club, soonest first (club members only)
    pub async fn list_events(
        &self,
        actor: &PersonId,
        club_id: &ClubId,
    ) -> Result<Vec<Event>, AppError> {
        let club = self.load_club(club_id).await?;
        if !club.is_member(actor) {
            return Err(AppError::forbidden("Not a member of this club"));
        }

        let mut events = self.events.find_by_club(club_id).await?;
        events.sort_by_key(|e| e.start_date_time);
        Ok(events)
    }

    /// Accept or decline an invitation on behalf of the actor
    pub async fn respond(
        &self,
        actor: &PersonId,
        club_id: &ClubId,
        event_id: &EventId,
        status: EventStatus,
    ) -> Result<Event, AppError> {
        if status == EventStatus::NoResponse {
            return Err(AppError::BadRequest(
                "Response must be ACCEPTED or DECLINED".to_string(),
            ));
        }

        let mut event = self.load_event(club_id, event_id).await?;
        if !event.can_respond(actor) {
            return Err(ValidationError::NotInvited.into());
        }

        self.events
            .update_status(club_id, event_id, actor, status)
            .await?;
        event.status.insert(actor.clone(), status);
        tracing::debug!(event_id = %event_id, person_id = %actor, %status, "Event response");
        Ok(event)
    }

    async fn notify(&self, person_ids: &[PersonId], title: &str, body: &str) {
        if person_ids.is_empty() {
            return;
        }
        if let Err(e) = self
            .functions
            .send_notification_to_persons(person_ids, title, body)
            .await
        {
            tracing::warn!(error = %e, recipients = person_ids.len(), "Failed to send notification");
        }
    }

    async fn load_club(&self, club_id: &ClubId) -> Result<Club, AppError> {
        self.clubs
            .find_by_id(club_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Club {}", club_id)))
    }

    async fn load_administered(&self, actor: &PersonId, club_id: &ClubId) -> Result<Club, AppError> {
        let club = self.load_club(club_id).await?;
        if !club.is_admin(actor) {
            return Err(AppError::forbidden("Only club admins can manage events"));
        }
        Ok(club)
    }

    async fn load_event(&self, club_id: &ClubId, event_id: &EventId) -> Result<Event, AppError> {
        self.events
            .find_by_id(club_id, event_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Event {}", event_id)))
    }
}
