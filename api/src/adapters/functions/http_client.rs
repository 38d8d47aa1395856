//! HTTP client for remotely deployed callable functions
//!
//! Wire protocol: `POST {base_url}/{name}` with body `{"data": ...}`.
//! Success responses carry `{"result": ...}`, failures carry
//! `{"error": {"status": "<CODE>", "message": "..."}}`.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use urlencoding::encode;

use crate::domain::entities::{ClubId, GroupId, PersonId, UserId};
use crate::domain::ports::{CallableFunctions, InviteCode};
use crate::error::{CallableError, FunctionsErrorCode};

/// Implementation of the callable functions port over HTTP
pub struct HttpCallableFunctions {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpCallableFunctions {
    pub fn new(base_url: String, token: Option<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn function_url(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, encode(name))
    }

    async fn call<D, R>(&self, name: &str, data: D) -> Result<R, CallableError>
    where
        D: Serialize + Send,
        R: DeserializeOwned,
    {
        let mut request = self
            .http
            .post(self.function_url(name))
            .json(&CallableRequest { data });
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        // Connection, timeout and body failures never reached the function
        let response = request.send().await.map_err(|e| {
            tracing::warn!(function = name, error = %e, "Callable transport failure");
            CallableError::new(FunctionsErrorCode::Unavailable, e.to_string())
        })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| CallableError::new(FunctionsErrorCode::Unavailable, e.to_string()))?;

        let envelope: CallableResponse = match serde_json::from_slice(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(CallableError::new(
                    FunctionsErrorCode::from_http_status(status.as_u16()),
                    String::from_utf8_lossy(&body).into_owned(),
                ))
            }
            Err(e) => {
                return Err(CallableError::new(
                    FunctionsErrorCode::Internal,
                    format!("malformed response from {}: {}", name, e),
                ))
            }
        };

        if let Some(error) = envelope.error {
            let code = error
                .status
                .parse()
                .unwrap_or_else(|_| FunctionsErrorCode::from_http_status(status.as_u16()));
            return Err(CallableError::new(code, error.message));
        }

        if !status.is_success() {
            return Err(CallableError::new(
                FunctionsErrorCode::from_http_status(status.as_u16()),
                format!("{} returned {}", name, status),
            ));
        }

        serde_json::from_value(envelope.result).map_err(|e| {
            CallableError::new(
                FunctionsErrorCode::Internal,
                format!("unexpected result from {}: {}", name, e),
            )
        })
    }
}

#[derive(Serialize)]
struct CallableRequest<D> {
    data: D,
}

#[derive(Deserialize)]
struct CallableResponse {
    #[serde(default)]
    result: serde_json::Value,
    #[serde(default)]
    error: Option<CallableErrorBody>,
}

#[derive(Deserialize)]
struct CallableErrorBody {
    status: String,
    #[serde(default)]
    message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JoinClubRequest<'a> {
    invite_code: &'a str,
    person_id: &'a PersonId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JoinClubResponse {
    club_id: ClubId,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClubRequest<'a> {
    club_id: &'a ClubId,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GroupRequest<'a> {
    club_id: &'a ClubId,
    group_id: &'a GroupId,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NotificationRequest<'a> {
    person_ids: &'a [PersonId],
    title: &'a str,
    body: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UserRequest<'a> {
    user_id: &'a UserId,
}

#[async_trait]
impl CallableFunctions for HttpCallableFunctions {
    async fn join_club_with_code(
        &self,
        invite_code: &str,
        person_id: &PersonId,
    ) -> Result<ClubId, CallableError> {
        let response: JoinClubResponse = self
            .call(
                "joinClubWithCode",
                JoinClubRequest {
                    invite_code,
                    person_id,
                },
            )
            .await?;
        Ok(response.club_id)
    }

    async fn generate_club_invite_code(
        &self,
        club_id: &ClubId,
    ) -> Result<InviteCode, CallableError> {
        self.call("generateClubInviteCode", ClubRequest { club_id })
            .await
    }

    async fn disable_club_invite_code(&self, club_id: &ClubId) -> Result<(), CallableError> {
        self.call("disableClubInviteCode", ClubRequest { club_id })
            .await
    }

    async fn delete_club(&self, club_id: &ClubId) -> Result<(), CallableError> {
        self.call("deleteClub", ClubRequest { club_id }).await
    }

    async fn delete_group(
        &self,
        club_id: &ClubId,
        group_id: &GroupId,
    ) -> Result<(), CallableError> {
        self.call("deleteGroup", GroupRequest { club_id, group_id })
            .await
    }

    async fn send_notification_to_persons(
        &self,
        person_ids: &[PersonId],
        title: &str,
        body: &str,
    ) -> Result<(), CallableError> {
        self.call(
            "sendNotificationToPersons",
            NotificationRequest {
                person_ids,
                title,
                body,
            },
        )
        .await
    }

    async fn update_email_verified_status(&self, user_id: &UserId) -> Result<(), CallableError> {
        self.call("updateEmailVerifiedStatus", UserRequest { user_id })
            .await
    }

    async fn update_last_login_at(&self, user_id: &UserId) -> Result<(), CallableError> {
        self.call("updateLastLoginAt", UserRequest { user_id })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Path, http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    /// Serve a fake functions backend on an ephemeral port
    async fn spawn_backend() -> String {
        async fn handle(Path(name): Path<String>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
            match name.as_str() {
                "joinClubWithCode" => match body["data"]["inviteCode"].as_str() {
                    Some("EXPIRED1") => (
                        StatusCode::BAD_REQUEST,
                        Json(json!({"error": {"status": "FAILED_PRECONDITION", "message": "expired"}})),
                    ),
                    Some("CRASH001") => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({"error": {"status": "INTERNAL", "message": "internal"}})),
                    ),
                    _ => (
                        StatusCode::OK,
                        Json(json!({"result": {"clubId": "club-42"}})),
                    ),
                },
                "disableClubInviteCode" => (StatusCode::OK, Json(json!({"result": null}))),
                _ => (StatusCode::SERVICE_UNAVAILABLE, Json(json!({}))),
            }
        }

        let app = Router::new().route("/:name", post(handle));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn join_returns_club_id() {
        let client = HttpCallableFunctions::new(spawn_backend().await, None);
        let club_id = client
            .join_club_with_code("GOODCODE", &PersonId::from("p1"))
            .await
            .unwrap();
        assert_eq!(club_id, ClubId::from("club-42"));
    }

    #[tokio::test]
    async fn error_envelope_carries_status_code() {
        let client = HttpCallableFunctions::new(spawn_backend().await, None);

        let err = client
            .join_club_with_code("EXPIRED1", &PersonId::from("p1"))
            .await
            .unwrap_err();
        assert_eq!(err.code, FunctionsErrorCode::FailedPrecondition);

        let err = client
            .join_club_with_code("CRASH001", &PersonId::from("p1"))
            .await
            .unwrap_err();
        assert_eq!(err.code, FunctionsErrorCode::Internal);
    }

    #[tokio::test]
    async fn null_result_is_unit() {
        let client = HttpCallableFunctions::new(spawn_backend().await, None);
        client
            .disable_club_invite_code(&ClubId::from("c"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn bare_http_status_is_mapped() {
        let client = HttpCallableFunctions::new(spawn_backend().await, None);
        let err = client.delete_club(&ClubId::from("c")).await.unwrap_err();
        assert_eq!(err.code, FunctionsErrorCode::Unavailable);
    }

    #[tokio::test]
    async fn connection_failure_is_unavailable() {
        // Nothing listens on port 9 (discard) in the test environment
        let client = HttpCallableFunctions::new("http://127.0.0.1:9".to_string(), None);
        let err = client
            .update_last_login_at(&UserId::from("u"))
            .await
            .unwrap_err();
        assert_eq!(err.code, FunctionsErrorCode::Unavailable);
    }
}
