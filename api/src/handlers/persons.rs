//! Person handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

use super::ImageUpload;
use crate::app::PersonDetails;
use crate::auth::ActingPerson;
use crate::domain::entities::{ClubId, Person, PersonId, Sex, User};
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRequest {
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub year_of_birth: Option<i32>,
    pub sex: Sex,
}

impl From<PersonRequest> for PersonDetails {
    fn from(request: PersonRequest) -> Self {
        Self {
            first_name: request.first_name,
            last_name: request.last_name,
            year_of_birth: request.year_of_birth,
            sex: request.sex,
        }
    }
}

/// POST /persons
pub async fn create_person(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(request): Json<PersonRequest>,
) -> Result<(StatusCode, Json<Person>), AppError> {
    let person = state
        .person_service
        .create_person(&user.id, request.into())
        .await?;
    Ok((StatusCode::CREATED, Json(person)))
}

/// GET /persons
pub async fn list_my_persons(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<Person>>, AppError> {
    Ok(Json(state.person_service.list_my_persons(&user.id).await?))
}

/// PATCH /persons/:person_id
pub async fn update_person(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(person_id): Path<String>,
    Json(request): Json<PersonRequest>,
) -> Result<Json<Person>, AppError> {
    let person = state
        .person_service
        .update_person(&user.id, &PersonId::from(person_id), request.into())
        .await?;
    Ok(Json(person))
}

/// PUT /persons/:person_id/image
pub async fn upload_person_image(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(person_id): Path<String>,
    Json(upload): Json<ImageUpload>,
) -> Result<Json<Person>, AppError> {
    let person = state
        .person_service
        .upload_person_image(&user.id, &PersonId::from(person_id), upload.decode()?)
        .await?;
    Ok(Json(person))
}

/// GET /clubs/:club_id/persons
pub async fn list_club_persons(
    State(state): State<AppState>,
    acting: ActingPerson,
    Path(club_id): Path<String>,
) -> Result<Json<Vec<Person>>, AppError> {
    let persons = state
        .person_service
        .list_club_persons(acting.id(), &ClubId::from(club_id))
        .await?;
    Ok(Json(persons))
}
