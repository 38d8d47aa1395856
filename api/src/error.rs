//! Unified error types for the Dojo API
//!
//! This module defines error types for each layer:
//! - `DomainError`: storage-level errors shared by every port
//! - `ValidationError`: rejected input and broken entity invariants
//! - `ClubError`: club membership failures, including the invite-code join table
//! - `AuthError`: authentication and acting-person failures
//! - `CallableError`: raw failure of a callable server function
//! - `AppError`: application layer errors (wraps the above for HTTP responses)

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Domain layer errors - storage and lookup failures
#[derive(Debug, Clone, Error)]
pub enum DomainError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Entity already exists: {0}")]
    AlreadyExists(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Input and invariant violations. Nothing is written when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("All trainers must also be members")]
    TrainersNotMembers,

    #[error("Name must not be empty")]
    EmptyName,

    #[error("Training must not start in the past")]
    TrainingInPast,

    #[error("Unsupported image extension: {0}")]
    InvalidImageExtension(String),

    #[error("Person is not invited to this event")]
    NotInvited,

    #[error("Person is not a member of this club")]
    NotClubMember,
}

/// Club membership errors surfaced to the client
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClubError {
    #[error("Already a member of this club")]
    AlreadyMember,

    #[error("Invite code has expired")]
    InviteCodeExpired,

    #[error("Invalid invite code")]
    InvalidInviteCode,

    #[error("Not signed in")]
    Unauthenticated,

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Network error, please try again")]
    NetworkError,

    /// The backend failed without saying why; may or may not be transient
    #[error("The server could not complete the request")]
    AmbiguousBackend,

    #[error("Unknown error")]
    UnknownError,

    #[error("Only the club owner can do this")]
    NotOwner,
}

/// Authentication errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Missing credentials")]
    MissingCredentials,

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Missing acting person header")]
    MissingPerson,

    #[error("Person does not belong to this account")]
    PersonNotOwned,
}

/// Status codes reported by callable server functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FunctionsErrorCode {
    Ok,
    Cancelled,
    Unknown,
    InvalidArgument,
    DeadlineExceeded,
    NotFound,
    AlreadyExists,
    PermissionDenied,
    ResourceExhausted,
    FailedPrecondition,
    Aborted,
    OutOfRange,
    Unimplemented,
    Internal,
    Unavailable,
    DataLoss,
    Unauthenticated,
}

impl FunctionsErrorCode {
    const ALL: [FunctionsErrorCode; 17] = [
        FunctionsErrorCode::Ok,
        FunctionsErrorCode::Cancelled,
        FunctionsErrorCode::Unknown,
        FunctionsErrorCode::InvalidArgument,
        FunctionsErrorCode::DeadlineExceeded,
        FunctionsErrorCode::NotFound,
        FunctionsErrorCode::AlreadyExists,
        FunctionsErrorCode::PermissionDenied,
        FunctionsErrorCode::ResourceExhausted,
        FunctionsErrorCode::FailedPrecondition,
        FunctionsErrorCode::Aborted,
        FunctionsErrorCode::OutOfRange,
        FunctionsErrorCode::Unimplemented,
        FunctionsErrorCode::Internal,
        FunctionsErrorCode::Unavailable,
        FunctionsErrorCode::DataLoss,
        FunctionsErrorCode::Unauthenticated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FunctionsErrorCode::Ok => "OK",
            FunctionsErrorCode::Cancelled => "CANCELLED",
            FunctionsErrorCode::Unknown => "UNKNOWN",
            FunctionsErrorCode::InvalidArgument => "INVALID_ARGUMENT",
            FunctionsErrorCode::DeadlineExceeded => "DEADLINE_EXCEEDED",
            FunctionsErrorCode::NotFound => "NOT_FOUND",
            FunctionsErrorCode::AlreadyExists => "ALREADY_EXISTS",
            FunctionsErrorCode::PermissionDenied => "PERMISSION_DENIED",
            FunctionsErrorCode::ResourceExhausted => "RESOURCE_EXHAUSTED",
            FunctionsErrorCode::FailedPrecondition => "FAILED_PRECONDITION",
            FunctionsErrorCode::Aborted => "ABORTED",
            FunctionsErrorCode::OutOfRange => "OUT_OF_RANGE",
            FunctionsErrorCode::Unimplemented => "UNIMPLEMENTED",
            FunctionsErrorCode::Internal => "INTERNAL",
            FunctionsErrorCode::Unavailable => "UNAVAILABLE",
            FunctionsErrorCode::DataLoss => "DATA_LOSS",
            FunctionsErrorCode::Unauthenticated => "UNAUTHENTICATED",
        }
    }

    /// Status implied by a bare HTTP response without an error body
    pub fn from_http_status(status: u16) -> Self {
        match status {
            200..=299 => FunctionsErrorCode::Ok,
            400 => FunctionsErrorCode::InvalidArgument,
            401 => FunctionsErrorCode::Unauthenticated,
            403 => FunctionsErrorCode::PermissionDenied,
            404 => FunctionsErrorCode::NotFound,
            409 => FunctionsErrorCode::Aborted,
            429 => FunctionsErrorCode::ResourceExhausted,
            499 => FunctionsErrorCode::Cancelled,
            500 => FunctionsErrorCode::Internal,
            501 => FunctionsErrorCode::Unimplemented,
            503 => FunctionsErrorCode::Unavailable,
            504 => FunctionsErrorCode::DeadlineExceeded,
            _ => FunctionsErrorCode::Unknown,
        }
    }
}

impl std::fmt::Display for FunctionsErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FunctionsErrorCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|code| code.as_str() == upper)
            .ok_or_else(|| format!("Unknown functions error code: {}", s))
    }
}

/// Failure returned by a callable server function
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct CallableError {
    pub code: FunctionsErrorCode,
    pub message: String,
}

impl CallableError {
    pub fn new(code: FunctionsErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl ClubError {
    /// Status codes of `joinClubWithCode` mapped to join failures.
    ///
    /// INTERNAL, UNKNOWN and DATA_LOSS are not assumed to be network failures;
    /// they surface as `AmbiguousBackend`.
    pub fn from_join_failure(e: CallableError) -> Self {
        match e.code {
            FunctionsErrorCode::AlreadyExists => ClubError::AlreadyMember,
            FunctionsErrorCode::FailedPrecondition => ClubError::InviteCodeExpired,
            FunctionsErrorCode::NotFound | FunctionsErrorCode::InvalidArgument => {
                ClubError::InvalidInviteCode
            }
            FunctionsErrorCode::Unauthenticated => ClubError::Unauthenticated,
            FunctionsErrorCode::PermissionDenied => ClubError::PermissionDenied,
            code => ClubError::from_transport(code),
        }
    }

    fn from_transport(code: FunctionsErrorCode) -> Self {
        match code {
            FunctionsErrorCode::Unavailable
            | FunctionsErrorCode::DeadlineExceeded
            | FunctionsErrorCode::Cancelled => ClubError::NetworkError,
            FunctionsErrorCode::Internal
            | FunctionsErrorCode::Unknown
            | FunctionsErrorCode::DataLoss => ClubError::AmbiguousBackend,
            _ => ClubError::UnknownError,
        }
    }
}

/// Status codes of every other callable, mapped to plain HTTP semantics
impl From<CallableError> for AppError {
    fn from(e: CallableError) -> Self {
        match e.code {
            FunctionsErrorCode::NotFound => AppError::NotFound(e.message),
            FunctionsErrorCode::PermissionDenied => AppError::Forbidden(e.message),
            FunctionsErrorCode::InvalidArgument | FunctionsErrorCode::OutOfRange => {
                AppError::BadRequest(e.message)
            }
            FunctionsErrorCode::AlreadyExists => {
                AppError::Domain(DomainError::AlreadyExists(e.message))
            }
            FunctionsErrorCode::FailedPrecondition | FunctionsErrorCode::Aborted => {
                AppError::Domain(DomainError::Conflict(e.message))
            }
            FunctionsErrorCode::Unauthenticated => AppError::Club(ClubError::Unauthenticated),
            code => AppError::Club(ClubError::from_transport(code)),
        }
    }
}

/// Application layer errors - used by HTTP handlers
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Club(#[from] ClubError),

    #[error("{0}")]
    Auth(#[from] AuthError),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn forbidden(msg: impl Into<String>) -> Self {
        AppError::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }
}

/// Error response body for JSON responses
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Domain(DomainError::NotFound(msg)) => {
                (StatusCode::NOT_FOUND, "Not found", Some(msg.clone()))
            }
            AppError::Domain(DomainError::AlreadyExists(msg)) => {
                (StatusCode::CONFLICT, "Already exists", Some(msg.clone()))
            }
            AppError::Domain(DomainError::Validation(msg)) => (
                StatusCode::BAD_REQUEST,
                "Validation error",
                Some(msg.clone()),
            ),
            AppError::Domain(DomainError::Conflict(msg)) => {
                (StatusCode::CONFLICT, "Conflict", Some(msg.clone()))
            }
            AppError::Domain(DomainError::Database(msg)) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    None,
                )
            }
            AppError::Domain(DomainError::Internal(msg)) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    None,
                )
            }
            AppError::Validation(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Validation error",
                Some(e.to_string()),
            ),
            AppError::Club(e) => {
                let status = match e {
                    ClubError::AlreadyMember => StatusCode::CONFLICT,
                    ClubError::InviteCodeExpired => StatusCode::GONE,
                    ClubError::InvalidInviteCode => StatusCode::BAD_REQUEST,
                    ClubError::Unauthenticated => StatusCode::UNAUTHORIZED,
                    ClubError::PermissionDenied | ClubError::NotOwner => StatusCode::FORBIDDEN,
                    ClubError::NetworkError => StatusCode::SERVICE_UNAVAILABLE,
                    ClubError::AmbiguousBackend | ClubError::UnknownError => {
                        tracing::warn!(error = %e, "Backend function failed");
                        StatusCode::BAD_GATEWAY
                    }
                };
                (status, "Club error", Some(e.to_string()))
            }
            AppError::Auth(e) => {
                let status = match e {
                    AuthError::PersonNotOwned => StatusCode::FORBIDDEN,
                    _ => StatusCode::UNAUTHORIZED,
                };
                (status, "Unauthorized", Some(e.to_string()))
            }
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "Bad request", Some(msg.clone()))
            }
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "Forbidden", Some(msg.clone())),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "Not found", Some(msg.clone())),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error.to_string(),
            details,
        });

        (status, body).into_response()
    }
}
