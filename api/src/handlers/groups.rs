//! Group handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use super::clubs::StatisticsQuery;
use crate::app::MemberAttendance;
use crate::auth::ActingPerson;
use crate::domain::entities::{ClubId, Group, GroupId, PersonId};
use crate::error::AppError;
use crate::AppState;

fn person_ids(ids: Vec<String>) -> Vec<PersonId> {
    ids.into_iter().map(PersonId::from).collect()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupRequest {
    pub name: String,
    #[serde(default)]
    pub member_ids: Vec<String>,
    #[serde(default)]
    pub trainer_ids: Vec<String>,
}

/// POST /clubs/:club_id/groups
pub async fn create_group(
    State(state): State<AppState>,
    acting: ActingPerson,
    Path(club_id): Path<String>,
    Json(request): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<Group>), AppError> {
    let group = state
        .group_service
        .create_group(
            acting.id(),
            &ClubId::from(club_id),
            &request.name,
            person_ids(request.member_ids),
            person_ids(request.trainer_ids),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(group)))
}

/// GET /clubs/:club_id/groups
///
/// Admins see every group, everyone else the groups they belong to.
pub async fn list_groups(
    State(state): State<AppState>,
    acting: ActingPerson,
    Path(club_id): Path<String>,
) -> Result<Json<Vec<Group>>, AppError> {
    let groups = state
        .group_service
        .list_visible_groups(acting.id(), &ClubId::from(club_id))
        .await?;
    Ok(Json(groups))
}

/// GET /clubs/:club_id/groups/:group_id
pub async fn get_group(
    State(state): State<AppState>,
    acting: ActingPerson,
    Path((club_id, group_id)): Path<(String, String)>,
) -> Result<Json<Group>, AppError> {
    let group = state
        .group_service
        .get_group(acting.id(), &ClubId::from(club_id), &GroupId::from(group_id))
        .await?;
    Ok(Json(group))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupAccessResponse {
    pub is_admin: bool,
    pub is_trainer: bool,
    pub is_member: bool,
    pub can_view_group: bool,
    pub can_manage_group: bool,
    pub can_delete_group: bool,
    pub can_create_training: bool,
    pub can_edit_training: bool,
}

/// GET /clubs/:club_id/groups/:group_id/access
///
/// The acting person's derived roles and permissions for the group.
pub async fn group_access(
    State(state): State<AppState>,
    acting: ActingPerson,
    Path((club_id, group_id)): Path<(String, String)>,
) -> Result<Json<GroupAccessResponse>, AppError> {
    let access = state
        .group_service
        .access(acting.id(), &ClubId::from(club_id), &GroupId::from(group_id))
        .await?;
    Ok(Json(GroupAccessResponse {
        is_admin: access.is_admin,
        is_trainer: access.is_trainer,
        is_member: access.is_member,
        can_view_group: access.can_view_group(),
        can_manage_group: access.can_manage_group(),
        can_delete_group: access.can_delete_group(),
        can_create_training: access.can_create_training(),
        can_edit_training: access.can_edit_training(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct RenameGroupRequest {
    pub name: String,
}

/// PATCH /clubs/:club_id/groups/:group_id
pub async fn rename_group(
    State(state): State<AppState>,
    acting: ActingPerson,
    Path((club_id, group_id)): Path<(String, String)>,
    Json(request): Json<RenameGroupRequest>,
) -> Result<Json<Group>, AppError> {
    let group = state
        .group_service
        .update_group_name(
            acting.id(),
            &ClubId::from(club_id),
            &GroupId::from(group_id),
            &request.name,
        )
        .await?;
    Ok(Json(group))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembersRequest {
    pub member_ids: Vec<String>,
}

/// PUT /clubs/:club_id/groups/:group_id/members
pub async fn update_members(
    State(state): State<AppState>,
    acting: ActingPerson,
    Path((club_id, group_id)): Path<(String, String)>,
    Json(request): Json<MembersRequest>,
) -> Result<Json<Group>, AppError> {
    let group = state
        .group_service
        .update_group_members(
            acting.id(),
            &ClubId::from(club_id),
            &GroupId::from(group_id),
            person_ids(request.member_ids),
        )
        .await?;
    Ok(Json(group))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainersRequest {
    pub trainer_ids: Vec<String>,
}

/// PUT /clubs/:club_id/groups/:group_id/trainers
pub async fn update_trainers(
    State(state): State<AppState>,
    acting: ActingPerson,
    Path((club_id, group_id)): Path<(String, String)>,
    Json(request): Json<TrainersRequest>,
) -> Result<Json<Group>, AppError> {
    let group = state
        .group_service
        .update_group_trainers(
            acting.id(),
            &ClubId::from(club_id),
            &GroupId::from(group_id),
            person_ids(request.trainer_ids),
        )
        .await?;
    Ok(Json(group))
}

/// DELETE /clubs/:club_id/groups/:group_id
pub async fn delete_group(
    State(state): State<AppState>,
    acting: ActingPerson,
    Path((club_id, group_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    state
        .group_service
        .delete_group(acting.id(), &ClubId::from(club_id), &GroupId::from(group_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /clubs/:club_id/groups/:group_id/statistics
pub async fn group_statistics(
    State(state): State<AppState>,
    acting: ActingPerson,
    Path((club_id, group_id)): Path<(String, String)>,
    Query(query): Query<StatisticsQuery>,
) -> Result<Json<Vec<MemberAttendance>>, AppError> {
    let stats = state
        .training_service
        .group_statistics(
            acting.id(),
            &ClubId::from(club_id),
            &GroupId::from(group_id),
            query.since,
        )
        .await?;
    Ok(Json(stats))
}
