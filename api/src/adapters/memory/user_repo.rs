//! In-memory adapter for UserRepository

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{not_found, read, write};
use crate::domain::entities::{NewUser, User, UserId};
use crate::domain::ports::UserRepository;
use crate::error::DomainError;

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, user: User) -> Self {
        if let Ok(mut users) = self.users.write() {
            users.insert(user.id.clone(), user);
        }
        self
    }

    fn modify<F>(&self, id: &UserId, change: F) -> Result<(), DomainError>
    where
        F: FnOnce(&mut User),
    {
        let mut users = write(&self.users)?;
        let user = users.get_mut(id).ok_or_else(|| not_found("User", id))?;
        change(user);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        Ok(read(&self.users)?.get(id).cloned())
    }

    async fn find_by_api_key_hash(&self, hash: &str) -> Result<Option<User>, DomainError> {
        Ok(read(&self.users)?
            .values()
            .find(|u| u.api_key_hash == hash)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        Ok(read(&self.users)?
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create(&self, new_user: &NewUser) -> Result<User, DomainError> {
        let mut users = write(&self.users)?;
        if users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&new_user.email))
        {
            return Err(DomainError::AlreadyExists(format!(
                "User with email '{}' already exists",
                new_user.email
            )));
        }
        let user = User {
            id: UserId::new(),
            email: new_user.email.clone(),
            api_key_hash: new_user.api_key_hash.clone(),
            email_verified: false,
            created_at: Utc::now(),
            last_login_at: None,
        };
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn update_email_verified(
        &self,
        id: &UserId,
        verified: bool,
    ) -> Result<(), DomainError> {
        self.modify(id, |u| u.email_verified = verified)
    }

    async fn update_last_login(&self, id: &UserId, at: DateTime<Utc>) -> Result<(), DomainError> {
        self.modify(id, |u| u.last_login_at = Some(at))
    }
}
