//! Club handlers
//!
//! Club lifecycle, admins, membership, invite codes and statistics.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ImageUpload;
use crate::app::MemberAttendance;
use crate::auth::ActingPerson;
use crate::domain::entities::{Club, ClubId, PersonId};
use crate::domain::ports::InviteCode;
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ClubNameRequest {
    pub name: String,
}

/// POST /clubs
pub async fn create_club(
    State(state): State<AppState>,
    acting: ActingPerson,
    Json(request): Json<ClubNameRequest>,
) -> Result<(StatusCode, Json<Club>), AppError> {
    let club = state
        .club_service
        .create_club(acting.id(), &request.name)
        .await?;
    Ok((StatusCode::CREATED, Json(club)))
}

/// GET /clubs
///
/// Clubs the acting person is a member of.
pub async fn list_my_clubs(
    State(state): State<AppState>,
    acting: ActingPerson,
) -> Result<Json<Vec<Club>>, AppError> {
    Ok(Json(state.club_service.list_my_clubs(acting.id()).await?))
}

/// GET /clubs/:club_id
pub async fn get_club(
    State(state): State<AppState>,
    acting: ActingPerson,
    Path(club_id): Path<String>,
) -> Result<Json<Club>, AppError> {
    let club = state
        .club_service
        .get_club(acting.id(), &ClubId::from(club_id))
        .await?;
    Ok(Json(club))
}

/// PATCH /clubs/:club_id
pub async fn rename_club(
    State(state): State<AppState>,
    acting: ActingPerson,
    Path(club_id): Path<String>,
    Json(request): Json<ClubNameRequest>,
) -> Result<Json<Club>, AppError> {
    let club = state
        .club_service
        .rename_club(acting.id(), &ClubId::from(club_id), &request.name)
        .await?;
    Ok(Json(club))
}

/// DELETE /clubs/:club_id
pub async fn delete_club(
    State(state): State<AppState>,
    acting: ActingPerson,
    Path(club_id): Path<String>,
) -> Result<StatusCode, AppError> {
    state
        .club_service
        .delete_club(acting.id(), &ClubId::from(club_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IsAdminResponse {
    pub is_admin: bool,
}

/// GET /clubs/:club_id/is-admin
pub async fn is_admin(
    State(state): State<AppState>,
    acting: ActingPerson,
    Path(club_id): Path<String>,
) -> Result<Json<IsAdminResponse>, AppError> {
    let is_admin = state
        .club_service
        .is_admin(acting.id(), &ClubId::from(club_id))
        .await?;
    Ok(Json(IsAdminResponse { is_admin }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRef {
    pub person_id: String,
}

/// POST /clubs/:club_id/admins
pub async fn promote_admin(
    State(state): State<AppState>,
    acting: ActingPerson,
    Path(club_id): Path<String>,
    Json(request): Json<PersonRef>,
) -> Result<Json<Club>, AppError> {
    let club = state
        .club_service
        .promote_admin(
            acting.id(),
            &ClubId::from(club_id),
            &PersonId::from(request.person_id),
        )
        .await?;
    Ok(Json(club))
}

/// DELETE /clubs/:club_id/admins/:person_id
pub async fn demote_admin(
    State(state): State<AppState>,
    acting: ActingPerson,
    Path((club_id, person_id)): Path<(String, String)>,
) -> Result<Json<Club>, AppError> {
    let club = state
        .club_service
        .demote_admin(acting.id(), &ClubId::from(club_id), &PersonId::from(person_id))
        .await?;
    Ok(Json(club))
}

/// DELETE /clubs/:club_id/members/:person_id
pub async fn remove_member(
    State(state): State<AppState>,
    acting: ActingPerson,
    Path((club_id, person_id)): Path<(String, String)>,
) -> Result<Json<Club>, AppError> {
    let club = state
        .club_service
        .remove_member(acting.id(), &ClubId::from(club_id), &PersonId::from(person_id))
        .await?;
    Ok(Json(club))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    pub invite_code: String,
}

/// POST /clubs/join
pub async fn join_club(
    State(state): State<AppState>,
    acting: ActingPerson,
    Json(request): Json<JoinRequest>,
) -> Result<Json<Club>, AppError> {
    let club = state
        .club_service
        .join_club(acting.id(), &request.invite_code)
        .await?;
    Ok(Json(club))
}

/// POST /clubs/:club_id/invite-code
pub async fn generate_invite_code(
    State(state): State<AppState>,
    acting: ActingPerson,
    Path(club_id): Path<String>,
) -> Result<Json<InviteCode>, AppError> {
    let code = state
        .club_service
        .generate_invite_code(acting.id(), &ClubId::from(club_id))
        .await?;
    Ok(Json(code))
}

/// DELETE /clubs/:club_id/invite-code
pub async fn disable_invite_code(
    State(state): State<AppState>,
    acting: ActingPerson,
    Path(club_id): Path<String>,
) -> Result<StatusCode, AppError> {
    state
        .club_service
        .disable_invite_code(acting.id(), &ClubId::from(club_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
pub struct ImageResponse {
    pub url: String,
}

/// PUT /clubs/:club_id/image
pub async fn upload_club_image(
    State(state): State<AppState>,
    acting: ActingPerson,
    Path(club_id): Path<String>,
    Json(upload): Json<ImageUpload>,
) -> Result<Json<ImageResponse>, AppError> {
    let url = state
        .club_service
        .upload_club_image(acting.id(), &ClubId::from(club_id), upload.decode()?)
        .await?;
    Ok(Json(ImageResponse { url }))
}

/// Query parameters for attendance statistics
#[derive(Debug, Default, Deserialize)]
pub struct StatisticsQuery {
    /// Only count trainings starting at or after this instant
    pub since: Option<DateTime<Utc>>,
}

/// GET /clubs/:club_id/statistics
pub async fn club_statistics(
    State(state): State<AppState>,
    acting: ActingPerson,
    Path(club_id): Path<String>,
    Query(query): Query<StatisticsQuery>,
) -> Result<Json<Vec<MemberAttendance>>, AppError> {
    let stats = state
        .training_service
        .club_statistics(acting.id(), &ClubId::from(club_id), query.since)
        .await?;
    Ok(Json(stats))
}
