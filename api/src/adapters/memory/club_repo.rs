//! In-memory adapter for ClubRepository

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::changes::ChangeFeed;
use super::{not_found, read, write};
use crate::domain::entities::{Club, ClubId, NewClub, PersonId};
use crate::domain::ports::repositories::DocumentStream;
use crate::domain::ports::ClubRepository;
use crate::error::DomainError;

#[derive(Default)]
pub struct InMemoryClubRepository {
    clubs: RwLock<HashMap<ClubId, Club>>,
    feed: ChangeFeed<ClubId, Club>,
}

impl InMemoryClubRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with a club
    pub fn with_club(self, club: Club) -> Self {
        if let Ok(mut clubs) = self.clubs.write() {
            clubs.insert(club.id.clone(), club);
        }
        self
    }

    /// Apply `change` to a stored club under the write lock and notify listeners
    fn modify<F, R>(&self, id: &ClubId, change: F) -> Result<R, DomainError>
    where
        F: FnOnce(&mut Club) -> R,
    {
        let (result, snapshot) = {
            let mut clubs = write(&self.clubs)?;
            let club = clubs.get_mut(id).ok_or_else(|| not_found("Club", id))?;
            let result = change(club);
            (result, club.clone())
        };
        self.feed.publish(id.clone(), Some(snapshot));
        Ok(result)
    }
}

#[async_trait]
impl ClubRepository for InMemoryClubRepository {
    async fn find_by_id(&self, id: &ClubId) -> Result<Option<Club>, DomainError> {
        Ok(read(&self.clubs)?.get(id).cloned())
    }

    async fn find_by_invite_code(&self, code: &str) -> Result<Option<Club>, DomainError> {
        Ok(read(&self.clubs)?
            .values()
            .find(|c| c.invite_code.as_deref() == Some(code))
            .cloned())
    }

    async fn find_by_member(&self, person_id: &PersonId) -> Result<Vec<Club>, DomainError> {
        let mut clubs: Vec<Club> = read(&self.clubs)?
            .values()
            .filter(|c| c.is_member(person_id))
            .cloned()
            .collect();
        clubs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(clubs)
    }

    async fn create(&self, new_club: &NewClub) -> Result<Club, DomainError> {
        let club = Club {
            id: ClubId::new(),
            name: new_club.name.clone(),
            owner_id: new_club.owner_id.clone(),
            admin_ids: vec![new_club.owner_id.clone()],
            member_ids: vec![new_club.owner_id.clone()],
            invite_code: None,
            invite_code_expires_at: None,
            club_img_url: None,
        };
        write(&self.clubs)?.insert(club.id.clone(), club.clone());
        self.feed.publish(club.id.clone(), Some(club.clone()));
        Ok(club)
    }

    async fn update_name(&self, id: &ClubId, name: &str) -> Result<(), DomainError> {
        self.modify(id, |club| club.name = name.to_string())
    }

    async fn add_member(&self, id: &ClubId, person_id: &PersonId) -> Result<bool, DomainError> {
        self.modify(id, |club| {
            if club.is_member(person_id) {
                return false;
            }
            club.member_ids.push(person_id.clone());
            true
        })
    }

    async fn remove_member(&self, id: &ClubId, person_id: &PersonId) -> Result<(), DomainError> {
        self.modify(id, |club| {
            club.member_ids.retain(|m| m != person_id);
            club.admin_ids.retain(|a| a != person_id);
        })
    }

    async fn add_admin(&self, id: &ClubId, person_id: &PersonId) -> Result<(), DomainError> {
        self.modify(id, |club| {
            if !club.admin_ids.contains(person_id) {
                club.admin_ids.push(person_id.clone());
            }
        })
    }

    async fn remove_admin(&self, id: &ClubId, person_id: &PersonId) -> Result<(), DomainError> {
        self.modify(id, |club| club.admin_ids.retain(|a| a != person_id))
    }

    async fn update_invite_code(
        &self,
        id: &ClubId,
        code: Option<&str>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<(), DomainError> {
        self.modify(id, |club| {
            club.invite_code = code.map(str::to_string);
            club.invite_code_expires_at = expires_at;
        })
    }

    async fn update_image_url(&self, id: &ClubId, url: &str) -> Result<(), DomainError> {
        self.modify(id, |club| club.club_img_url = Some(url.to_string()))
    }

    async fn delete(&self, id: &ClubId) -> Result<(), DomainError> {
        let removed = write(&self.clubs)?.remove(id);
        if removed.is_none() {
            return Err(not_found("Club", id));
        }
        self.feed.publish(id.clone(), None);
        Ok(())
    }

    fn watch(&self, id: &ClubId) -> DocumentStream<Club> {
        self.feed
            .watch(id.clone(), || Ok(read(&self.clubs)?.get(id).cloned()))
    }
}
