//! Event handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::app::EventDetails;
use crate::auth::ActingPerson;
use crate::domain::entities::{ClubId, Event, EventId, EventStatus, PersonId};
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    pub start_date_time: DateTime<Utc>,
    #[serde(default)]
    pub invited_person_ids: Vec<String>,
}

impl From<EventRequest> for EventDetails {
    fn from(request: EventRequest) -> Self {
        Self {
            title: request.title,
            description: request.description,
            location: request.location,
            start_date_time: request.start_date_time,
            invited_person_ids: request
                .invited_person_ids
                .into_iter()
                .map(PersonId::from)
                .collect(),
        }
    }
}

/// POST /clubs/:club_id/events
pub async fn create_event(
    State(state): State<AppState>,
    acting: ActingPerson,
    Path(club_id): Path<String>,
    Json(request): Json<EventRequest>,
) -> Result<(StatusCode, Json<Event>), AppError> {
    let event = state
        .event_service
        .create_event(acting.id(), &ClubId::from(club_id), request.into())
        .await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// GET /clubs/:club_id/events
pub async fn list_events(
    State(state): State<AppState>,
    acting: ActingPerson,
    Path(club_id): Path<String>,
) -> Result<Json<Vec<Event>>, AppError> {
    let events = state
        .event_service
        .list_events(acting.id(), &ClubId::from(club_id))
        .await?;
    Ok(Json(events))
}

/// PUT /clubs/:club_id/events/:event_id
pub async fn update_event(
    State(state): State<AppState>,
    acting: ActingPerson,
    Path((club_id, event_id)): Path<(String, String)>,
    Json(request): Json<EventRequest>,
) -> Result<Json<Event>, AppError> {
    let event = state
        .event_service
        .update_event(
            acting.id(),
            &ClubId::from(club_id),
            &EventId::from(event_id),
            request.into(),
        )
        .await?;
    Ok(Json(event))
}

/// DELETE /clubs/:club_id/events/:event_id
pub async fn delete_event(
    State(state): State<AppState>,
    acting: ActingPerson,
    Path((club_id, event_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    state
        .event_service
        .delete_event(acting.id(), &ClubId::from(club_id), &EventId::from(event_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct RespondRequest {
    pub status: EventStatus,
}

/// POST /clubs/:club_id/events/:event_id/response
pub async fn respond(
    State(state): State<AppState>,
    acting: ActingPerson,
    Path((club_id, event_id)): Path<(String, String)>,
    Json(request): Json<RespondRequest>,
) -> Result<Json<Event>, AppError> {
    let event = state
        .event_service
        .respond(
            acting.id(),
            &ClubId::from(club_id),
            &EventId::from(event_id),
            request.status,
        )
        .await?;
    Ok(Json(event))
}
