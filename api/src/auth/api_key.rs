//! API key authentication middleware

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};

use crate::error::{AppError, AuthError};
use crate::AppState;

/// Extract the API key from the Authorization header
fn extract_api_key(request: &Request<Body>) -> Option<&str> {
    request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|key| !key.is_empty())
}

/// Authentication middleware
///
/// Validates the API key and injects the User into request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let api_key = extract_api_key(&request).ok_or(AuthError::MissingCredentials)?;

    let user = state
        .account_service
        .find_by_api_key(api_key)
        .await?
        .ok_or(AuthError::InvalidApiKey)?;

    // Record the login (fire and forget, failures are logged by the service)
    let user_id = user.id.clone();
    let account_service = state.account_service.clone();
    tokio::spawn(async move {
        account_service.touch_last_login(&user_id).await;
    });

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}
