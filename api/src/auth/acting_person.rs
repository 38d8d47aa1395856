//! Acting person extractor
//!
//! A user acts through one of their persons, named by the `X-Person-Id`
//! header. Requires `auth_middleware` to have run first.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::domain::entities::{Person, PersonId, User};
use crate::error::{AppError, AuthError};
use crate::AppState;

pub const PERSON_HEADER: &str = "X-Person-Id";

/// The authenticated user and the person they act as
#[derive(Debug, Clone)]
pub struct ActingPerson {
    pub user: User,
    pub person: Person,
}

impl ActingPerson {
    pub fn id(&self) -> &PersonId {
        &self.person.id
    }
}

#[async_trait]
impl FromRequestParts<AppState> for ActingPerson {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<User>()
            .cloned()
            .ok_or(AuthError::MissingCredentials)?;

        let person_id = parts
            .headers
            .get(PERSON_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(AuthError::MissingPerson)?;

        let person = state
            .person_service
            .acting_person(&user.id, &PersonId::from(person_id))
            .await?;

        Ok(Self { user, person })
    }
}
