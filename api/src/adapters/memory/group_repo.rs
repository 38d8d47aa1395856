//! In-memory adapter for GroupRepository

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::{not_found, read, write};
use crate::domain::entities::{ClubId, Group, GroupId, NewGroup, PersonId};
use crate::domain::ports::GroupRepository;
use crate::error::DomainError;

#[derive(Default)]
pub struct InMemoryGroupRepository {
    groups: RwLock<HashMap<GroupId, Group>>,
}

impl InMemoryGroupRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with a group
    pub fn with_group(self, group: Group) -> Self {
        if let Ok(mut groups) = self.groups.write() {
            groups.insert(group.id.clone(), group);
        }
        self
    }

    fn modify<F>(&self, club_id: &ClubId, id: &GroupId, change: F) -> Result<(), DomainError>
    where
        F: FnOnce(&mut Group),
    {
        let mut groups = write(&self.groups)?;
        match groups.get_mut(id) {
            Some(group) if &group.club_id == club_id => {
                change(group);
                Ok(())
            }
            _ => Err(not_found("Group", id)),
        }
    }
}

#[async_trait]
impl GroupRepository for InMemoryGroupRepository {
    async fn find_by_id(
        &self,
        club_id: &ClubId,
        id: &GroupId,
    ) -> Result<Option<Group>, DomainError> {
        Ok(read(&self.groups)?
            .get(id)
            .filter(|g| &g.club_id == club_id)
            .cloned())
    }

    async fn find_by_club(&self, club_id: &ClubId) -> Result<Vec<Group>, DomainError> {
        let mut groups: Vec<Group> = read(&self.groups)?
            .values()
            .filter(|g| &g.club_id == club_id)
            .cloned()
            .collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(groups)
    }

    async fn create(&self, new_group: &NewGroup) -> Result<Group, DomainError> {
        let group = Group {
            id: GroupId::new(),
            club_id: new_group.club_id.clone(),
            name: new_group.name.clone(),
            member_ids: new_group.member_ids.clone(),
            trainer_ids: new_group.trainer_ids.clone(),
        };
        write(&self.groups)?.insert(group.id.clone(), group.clone());
        Ok(group)
    }

    async fn update_name(
        &self,
        club_id: &ClubId,
        id: &GroupId,
        name: &str,
    ) -> Result<(), DomainError> {
        self.modify(club_id, id, |g| g.name = name.to_string())
    }

    async fn update_members(
        &self,
        club_id: &ClubId,
        id: &GroupId,
        member_ids: &[PersonId],
    ) -> Result<(), DomainError> {
        self.modify(club_id, id, |g| g.member_ids = member_ids.to_vec())
    }

    async fn update_trainers(
        &self,
        club_id: &ClubId,
        id: &GroupId,
        trainer_ids: &[PersonId],
    ) -> Result<(), DomainError> {
        self.modify(club_id, id, |g| g.trainer_ids = trainer_ids.to_vec())
    }

    async fn delete(&self, club_id: &ClubId, id: &GroupId) -> Result<(), DomainError> {
        let mut groups = write(&self.groups)?;
        match groups.get(id) {
            Some(group) if &group.club_id == club_id => {
                groups.remove(id);
                Ok(())
            }
            _ => Err(not_found("Group", id)),
        }
    }

    async fn delete_by_club(&self, club_id: &ClubId) -> Result<(), DomainError> {
        write(&self.groups)?.retain(|_, g| &g.club_id != club_id);
        Ok(())
    }
}
