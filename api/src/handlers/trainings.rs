//! Training and attendance handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::auth::ActingPerson;
use crate::domain::entities::{ClubId, GroupId, PersonId, Training, TrainingId};
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTrainingRequest {
    pub start_date_time: DateTime<Utc>,
    #[serde(default)]
    pub notes: String,
}

/// POST /clubs/:club_id/groups/:group_id/trainings
pub async fn create_training(
    State(state): State<AppState>,
    acting: ActingPerson,
    Path((club_id, group_id)): Path<(String, String)>,
    Json(request): Json<CreateTrainingRequest>,
) -> Result<(StatusCode, Json<Training>), AppError> {
    let training = state
        .training_service
        .create_training(
            acting.id(),
            &ClubId::from(club_id),
            &GroupId::from(group_id),
            request.start_date_time,
            &request.notes,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(training)))
}

/// GET /clubs/:club_id/groups/:group_id/trainings
pub async fn list_trainings(
    State(state): State<AppState>,
    acting: ActingPerson,
    Path((club_id, group_id)): Path<(String, String)>,
) -> Result<Json<Vec<Training>>, AppError> {
    let trainings = state
        .training_service
        .list_trainings(acting.id(), &ClubId::from(club_id), &GroupId::from(group_id))
        .await?;
    Ok(Json(trainings))
}

/// GET /clubs/:club_id/groups/:group_id/trainings/:training_id
pub async fn get_training(
    State(state): State<AppState>,
    acting: ActingPerson,
    Path((club_id, group_id, training_id)): Path<(String, String, String)>,
) -> Result<Json<Training>, AppError> {
    let training = state
        .training_service
        .get_training(
            acting.id(),
            &ClubId::from(club_id),
            &GroupId::from(group_id),
            &TrainingId::from(training_id),
        )
        .await?;
    Ok(Json(training))
}

#[derive(Debug, Deserialize)]
pub struct NotesRequest {
    pub notes: String,
}

/// PATCH /clubs/:club_id/groups/:group_id/trainings/:training_id
pub async fn update_notes(
    State(state): State<AppState>,
    acting: ActingPerson,
    Path((club_id, group_id, training_id)): Path<(String, String, String)>,
    Json(request): Json<NotesRequest>,
) -> Result<Json<Training>, AppError> {
    let training = state
        .training_service
        .update_notes(
            acting.id(),
            &ClubId::from(club_id),
            &GroupId::from(group_id),
            &TrainingId::from(training_id),
            &request.notes,
        )
        .await?;
    Ok(Json(training))
}

/// DELETE /clubs/:club_id/groups/:group_id/trainings/:training_id
pub async fn delete_training(
    State(state): State<AppState>,
    acting: ActingPerson,
    Path((club_id, group_id, training_id)): Path<(String, String, String)>,
) -> Result<StatusCode, AppError> {
    state
        .training_service
        .delete_training(
            acting.id(),
            &ClubId::from(club_id),
            &GroupId::from(group_id),
            &TrainingId::from(training_id),
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct AttendanceRequest {
    pub attended: bool,
}

/// PUT /clubs/:club_id/groups/:group_id/trainings/:training_id/attendance/:person_id
pub async fn set_attendance(
    State(state): State<AppState>,
    acting: ActingPerson,
    Path((club_id, group_id, training_id, person_id)): Path<(String, String, String, String)>,
    Json(request): Json<AttendanceRequest>,
) -> Result<Json<Training>, AppError> {
    let training = state
        .training_service
        .set_attendance(
            acting.id(),
            &ClubId::from(club_id),
            &GroupId::from(group_id),
            &TrainingId::from(training_id),
            &PersonId::from(person_id),
            request.attended,
        )
        .await?;
    Ok(Json(training))
}
