//! Account handlers
//!
//! Registration and the authenticated user's own account.

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{Person, User};
use crate::error::AppError;
use crate::AppState;

/// Request body for account registration
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user: User,
    /// API key for all further calls (Authorization: Bearer <api_key>)
    pub api_key: String,
    pub message: String,
}

/// POST /accounts
///
/// Register an account. The API key is only shown once.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let (user, api_key) = state.account_service.register(&request.email).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user,
            api_key,
            message: "Save this API key - it won't be shown again. \
                      Create a person next with POST /persons."
                .to_string(),
        }),
    ))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub user: User,
    pub persons: Vec<Person>,
}

/// GET /me
pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<MeResponse>, AppError> {
    let persons = state.person_service.list_my_persons(&user.id).await?;
    Ok(Json(MeResponse { user, persons }))
}

/// POST /me/email-verified
pub async fn mark_email_verified(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<User>, AppError> {
    let user = state.account_service.mark_email_verified(&user.id).await?;
    Ok(Json(user))
}
