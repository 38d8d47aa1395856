//! Account service
//!
//! Handles user registration and API-key authentication.

use std::sync::Arc;

use rand::Rng;
use sha2::{Digest, Sha256};

use crate::domain::entities::{NewUser, User, UserId};
use crate::domain::ports::{CallableFunctions, UserRepository};
use crate::error::AppError;

/// Service for managing user accounts
pub struct AccountService<UR, F>
where
    UR: UserRepository,
    F: CallableFunctions,
{
    users: Arc<UR>,
    functions: Arc<F>,
}

impl<UR, F> AccountService<UR, F>
where
    UR: UserRepository,
    F: CallableFunctions,
{
    pub fn new(users: Arc<UR>, functions: Arc<F>) -> Self {
        Self { users, functions }
    }

    /// Register a new account
    ///
    /// Returns (user, api_key) - the key is only shown once
    pub async fn register(&self, email: &str) -> Result<(User, String), AppError> {
        let email = email.trim();
        if email.is_empty() || email.len() > 254 || !email.contains('@') {
            return Err(AppError::BadRequest("A valid email is required".to_string()));
        }

        let api_key = generate_api_key();
        let user = self
            .users
            .create(&NewUser {
                email: email.to_string(),
                api_key_hash: hash_api_key(&api_key),
            })
            .await?;

        tracing::info!(user_id = %user.id, "Account registered");
        Ok((user, api_key))
    }

    /// Find the account an API key belongs to
    pub async fn find_by_api_key(&self, api_key: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .find_by_api_key_hash(&hash_api_key(api_key))
            .await?)
    }

    pub async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, AppError> {
        Ok(self.users.find_by_id(id).await?)
    }

    /// Record a login through `updateLastLoginAt`; failures are only logged
    pub async fn touch_last_login(&self, user_id: &UserId) {
        if let Err(e) = self.functions.update_last_login_at(user_id).await {
            tracing::warn!(user_id = %user_id, error = %e, "Failed to update last login");
        }
    }

    /// Mark the account's email as verified through `updateEmailVerifiedStatus`
    pub async fn mark_email_verified(&self, user_id: &UserId) -> Result<User, AppError> {
        self.functions
            .update_email_verified_status(user_id)
            .await?;

        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {}", user_id)))
    }
}

/// Generate a random API key
fn generate_api_key() -> String {
    let mut rng = rand::thread_rng();
    let bytes: Vec<u8> = (0..32).map(|_| rng.gen()).collect();
    format!("sk-{}", hex::encode(bytes))
}

/// Hash an API key for storage
pub fn hash_api_key(api_key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(api_key.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryUserRepository;
    use crate::error::{CallableError, ClubError, DomainError, FunctionsErrorCode};
    use crate::domain::ports::MockCallableFunctions;
    use crate::test_utils::test_user;

    fn service(functions: MockCallableFunctions) -> AccountService<InMemoryUserRepository, MockCallableFunctions> {
        AccountService::new(Arc::new(InMemoryUserRepository::new()), Arc::new(functions))
    }

    #[test]
    fn api_key_shape() {
        let key = generate_api_key();
        assert!(key.starts_with("sk-"));
        assert_eq!(key.len(), 3 + 64);
        assert_ne!(key, generate_api_key());
    }

    #[test]
    fn hash_is_stable_hex() {
        let hash = hash_api_key("sk-test");
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_api_key("sk-test"));
        assert_ne!(hash, hash_api_key("sk-other"));
    }

    #[tokio::test]
    async fn registered_key_authenticates() {
        let service = service(MockCallableFunctions::new());

        let (user, api_key) = service.register("sensei@dojo.test").await.unwrap();
        assert_ne!(user.api_key_hash, api_key);

        let found = service.find_by_api_key(&api_key).await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));
        assert!(service.find_by_api_key("sk-wrong").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_and_invalid_emails_rejected() {
        let service = service(MockCallableFunctions::new());
        service.register("a@dojo.test").await.unwrap();

        let err = service.register("A@DOJO.TEST").await.unwrap_err();
        assert!(matches!(err, AppError::Domain(DomainError::AlreadyExists(_))));

        let err = service.register("not-an-email").await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn last_login_failure_is_swallowed() {
        let mut functions = MockCallableFunctions::new();
        functions
            .expect_update_last_login_at()
            .times(1)
            .returning(|_| Err(CallableError::new(FunctionsErrorCode::Unavailable, "down")));
        let service = service(functions);

        service.touch_last_login(&UserId::from("u1")).await;
    }

    #[tokio::test]
    async fn email_verification_maps_callable_errors() {
        let mut functions = MockCallableFunctions::new();
        functions
            .expect_update_email_verified_status()
            .returning(|_| Err(CallableError::new(FunctionsErrorCode::Unauthenticated, "no")));
        let service = service(functions);

        let err = service
            .mark_email_verified(&UserId::from("u1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Club(ClubError::Unauthenticated)));
    }

    #[tokio::test]
    async fn email_verification_returns_current_account() {
        let mut functions = MockCallableFunctions::new();
        functions
            .expect_update_email_verified_status()
            .times(2)
            .returning(|_| Ok(()));
        let users = InMemoryUserRepository::new().with_user(test_user("u1", "sensei@dojo.test"));
        let service = AccountService::new(Arc::new(users), Arc::new(functions));

        let user = service.mark_email_verified(&UserId::from("u1")).await.unwrap();
        assert_eq!(user.email, "sensei@dojo.test");

        let err = service
            .mark_email_verified(&UserId::from("ghost"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
