//! Manual port implementations for tests
//!
//! Collections themselves are covered by the in-memory adapters; these cover
//! failure injection and call recording.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::domain::entities::{ClubId, Group, GroupId, NewGroup, PersonId, Preferences, UserId};
use crate::domain::ports::{GroupRepository, ObjectStorage, PreferencesStore};
use crate::error::DomainError;

// ============================================================================
// Group repository with failure injection
// ============================================================================

/// Holds a single group and can be told to fail member writes
pub struct FailingGroupRepository {
    group: RwLock<Group>,
    fail_member_writes: bool,
    trainer_writes: RwLock<usize>,
}

impl FailingGroupRepository {
    pub fn new(group: Group) -> Self {
        Self {
            group: RwLock::new(group),
            fail_member_writes: false,
            trainer_writes: RwLock::new(0),
        }
    }

    pub fn failing_member_writes(mut self) -> Self {
        self.fail_member_writes = true;
        self
    }

    /// The group as currently stored
    pub fn snapshot(&self) -> Group {
        self.group.read().unwrap().clone()
    }

    pub fn trainer_writes(&self) -> usize {
        *self.trainer_writes.read().unwrap()
    }
}

#[async_trait]
impl GroupRepository for FailingGroupRepository {
    async fn find_by_id(
        &self,
        _club_id: &ClubId,
        id: &GroupId,
    ) -> Result<Option<Group>, DomainError> {
        let group = self.group.read().unwrap();
        Ok((&group.id == id).then(|| group.clone()))
    }

    async fn find_by_club(&self, club_id: &ClubId) -> Result<Vec<Group>, DomainError> {
        let group = self.group.read().unwrap();
        Ok(if &group.club_id == club_id {
            vec![group.clone()]
        } else {
            vec![]
        })
    }

    async fn create(&self, _group: &NewGroup) -> Result<Group, DomainError> {
        Err(DomainError::Internal("not supported".to_string()))
    }

    async fn update_name(
        &self,
        _club_id: &ClubId,
        _id: &GroupId,
        name: &str,
    ) -> Result<(), DomainError> {
        self.group.write().unwrap().name = name.to_string();
        Ok(())
    }

    async fn update_members(
        &self,
        _club_id: &ClubId,
        _id: &GroupId,
        member_ids: &[PersonId],
    ) -> Result<(), DomainError> {
        if self.fail_member_writes {
            return Err(DomainError::Database("member write rejected".to_string()));
        }
        self.group.write().unwrap().member_ids = member_ids.to_vec();
        Ok(())
    }

    async fn update_trainers(
        &self,
        _club_id: &ClubId,
        _id: &GroupId,
        trainer_ids: &[PersonId],
    ) -> Result<(), DomainError> {
        *self.trainer_writes.write().unwrap() += 1;
        self.group.write().unwrap().trainer_ids = trainer_ids.to_vec();
        Ok(())
    }

    async fn delete(&self, _club_id: &ClubId, _id: &GroupId) -> Result<(), DomainError> {
        Ok(())
    }

    async fn delete_by_club(&self, _club_id: &ClubId) -> Result<(), DomainError> {
        Ok(())
    }
}

// ============================================================================
// Recording Object Storage
// ============================================================================

#[derive(Default)]
pub struct RecordingObjectStorage {
    objects: Arc<RwLock<Vec<(String, usize)>>>,
}

impl RecordingObjectStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paths written so far, in order
    pub fn paths(&self) -> Vec<String> {
        self.objects
            .read()
            .unwrap()
            .iter()
            .map(|(path, _)| path.clone())
            .collect()
    }
}

#[async_trait]
impl ObjectStorage for RecordingObjectStorage {
    async fn put(
        &self,
        path: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<String, DomainError> {
        self.objects
            .write()
            .unwrap()
            .push((path.to_string(), bytes.len()));
        Ok(format!("https://files.test/{}", path))
    }
}

// ============================================================================
// In-Memory Preferences Store
// ============================================================================

#[derive(Default)]
pub struct InMemoryPreferencesStore {
    preferences: Arc<RwLock<HashMap<UserId, Preferences>>>,
}

impl InMemoryPreferencesStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PreferencesStore for InMemoryPreferencesStore {
    async fn load(&self, user_id: &UserId) -> Result<Preferences, DomainError> {
        let preferences = self.preferences.read().unwrap();
        Ok(preferences.get(user_id).cloned().unwrap_or_default())
    }

    async fn save(&self, user_id: &UserId, preferences: &Preferences) -> Result<(), DomainError> {
        self.preferences
            .write()
            .unwrap()
            .insert(user_id.clone(), preferences.clone());
        Ok(())
    }
}
