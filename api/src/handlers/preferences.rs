//! Preference and selection handlers

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::app::DisplaySettings;
use crate::auth::ActingPerson;
use crate::domain::entities::{Club, ClubId, DateFormat, Preferences, ThemeMode, TimeFormat, User};
use crate::error::AppError;
use crate::AppState;

/// GET /me/preferences
pub async fn get_preferences(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<Preferences>, AppError> {
    Ok(Json(state.selection_service.preferences(&user.id).await?))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePreferencesRequest {
    pub theme_mode: Option<ThemeMode>,
    pub date_format: Option<DateFormat>,
    pub time_format: Option<TimeFormat>,
}

/// PATCH /me/preferences
///
/// Only the provided display settings change.
pub async fn update_preferences(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdatePreferencesRequest>,
) -> Result<Json<Preferences>, AppError> {
    let settings = DisplaySettings {
        theme_mode: request.theme_mode,
        date_format: request.date_format,
        time_format: request.time_format,
    };
    let preferences = state
        .selection_service
        .update_display(&user.id, settings)
        .await?;
    Ok(Json(preferences))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectClubRequest {
    pub club_id: String,
}

/// PUT /me/selection
///
/// Select a club for the acting person, who also becomes the selected person.
pub async fn select_club(
    State(state): State<AppState>,
    acting: ActingPerson,
    Json(request): Json<SelectClubRequest>,
) -> Result<Json<Preferences>, AppError> {
    let preferences = state
        .selection_service
        .select_club(&acting.user.id, acting.id(), &ClubId::from(request.club_id))
        .await?;
    Ok(Json(preferences))
}

#[derive(Debug, Serialize)]
pub struct SelectedClubResponse {
    pub club: Option<Club>,
}

/// GET /me/selected-club
pub async fn selected_club(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<SelectedClubResponse>, AppError> {
    let club = state.selection_service.await_selected_club(&user.id).await?;
    Ok(Json(SelectedClubResponse { club }))
}
