//! Group service
//!
//! Group creation, roster and name changes, deletion and visibility. Every
//! write that touches `member_ids` or `trainer_ids` is validated against the
//! trainers-are-members rule before anything is persisted.

use std::sync::Arc;

use crate::domain::entities::{
    dedup_ids, Club, ClubId, Group, GroupId, NewGroup, PersonId, Roster,
};
use crate::domain::permissions::{visible_groups, GroupAccess};
use crate::domain::ports::{CallableFunctions, ClubRepository, GroupRepository};
use crate::error::{AppError, ValidationError};

/// Service for managing training groups
pub struct GroupService<CR, GR, F>
where
    CR: ClubRepository,
    GR: GroupRepository,
    F: CallableFunctions,
{
    clubs: Arc<CR>,
    groups: Arc<GR>,
    functions: Arc<F>,
}

impl<CR, GR, F> GroupService<CR, GR, F>
where
    CR: ClubRepository,
    GR: GroupRepository,
    F: CallableFunctions,
{
    pub fn new(clubs: Arc<CR>, groups: Arc<GR>, functions: Arc<F>) -> Self {
        Self {
            clubs,
            groups,
            functions,
        }
    }

    /// Create a group (club admins only)
    pub async fn create_group(
        &self,
        actor: &PersonId,
        club_id: &ClubId,
        name: &str,
        member_ids: Vec<PersonId>,
        trainer_ids: Vec<PersonId>,
    ) -> Result<Group, AppError> {
        let club = self.load_club(club_id).await?;
        if !club.is_admin(actor) {
            return Err(AppError::forbidden("Only club admins can create groups"));
        }

        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }

        let roster = Roster {
            member_ids,
            trainer_ids,
        }
        .validated()?;

        let group = self
            .groups
            .create(&NewGroup {
                club_id: club_id.clone(),
                name: name.to_string(),
                member_ids: roster.member_ids,
                trainer_ids: roster.trainer_ids,
            })
            .await?;

        tracing::info!(club_id = %club_id, group_id = %group.id, "Group created");
        Ok(group)
    }

    /// Groups the actor may see: all of them for admins, otherwise their own
    pub async fn list_visible_groups(
        &self,
        actor: &PersonId,
        club_id: &ClubId,
    ) -> Result<Vec<Group>, AppError> {
        let club = self.load_club(club_id).await?;
        let groups = self.groups.find_by_club(club_id).await?;
        Ok(visible_groups(actor, &club, groups))
    }

    pub async fn get_group(
        &self,
        actor: &PersonId,
        club_id: &ClubId,
        group_id: &GroupId,
    ) -> Result<Group, AppError> {
        let (club, group) = self.load(club_id, group_id).await?;
        if !GroupAccess::resolve(actor, &club, &group).can_view_group() {
            return Err(AppError::forbidden("Not a member of this group"));
        }
        Ok(group)
    }

    /// The actor's derived roles for one group
    pub async fn access(
        &self,
        actor: &PersonId,
        club_id: &ClubId,
        group_id: &GroupId,
    ) -> Result<GroupAccess, AppError> {
        let (club, group) = self.load(club_id, group_id).await?;
        Ok(GroupAccess::resolve(actor, &club, &group))
    }

    /// Replace the member list.
    ///
    /// Trainers that are no longer members are dropped from `trainer_ids`
    /// as part of the same update.
    pub async fn update_group_members(
        &self,
        actor: &PersonId,
        club_id: &ClubId,
        group_id: &GroupId,
        member_ids: Vec<PersonId>,
    ) -> Result<Group, AppError> {
        let group = self.load_managed(actor, club_id, group_id).await?;
        replace_group_members(self.groups.as_ref(), &group, dedup_ids(member_ids)).await
    }

    /// Replace the trainer list; every trainer must already be a member
    pub async fn update_group_trainers(
        &self,
        actor: &PersonId,
        club_id: &ClubId,
        group_id: &GroupId,
        trainer_ids: Vec<PersonId>,
    ) -> Result<Group, AppError> {
        let mut group = self.load_managed(actor, club_id, group_id).await?;

        let roster = Roster {
            member_ids: group.member_ids.clone(),
            trainer_ids,
        }
        .validated()?;

        self.groups
            .update_trainers(club_id, group_id, &roster.trainer_ids)
            .await?;
        group.trainer_ids = roster.trainer_ids;
        Ok(group)
    }

    pub async fn update_group_name(
        &self,
        actor: &PersonId,
        club_id: &ClubId,
        group_id: &GroupId,
        name: &str,
    ) -> Result<Group, AppError> {
        let mut group = self.load_managed(actor, club_id, group_id).await?;

        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }

        self.groups.update_name(club_id, group_id, name).await?;
        group.name = name.to_string();
        Ok(group)
    }

    /// Delete a group and its trainings (club admins only).
    ///
    /// The cascade runs server-side through the `deleteGroup` callable.
    pub async fn delete_group(
        &self,
        actor: &PersonId,
        club_id: &ClubId,
        group_id: &GroupId,
    ) -> Result<(), AppError> {
        let (club, group) = self.load(club_id, group_id).await?;
        if !GroupAccess::resolve(actor, &club, &group).can_delete_group() {
            return Err(AppError::forbidden("Only club admins can delete groups"));
        }

        self.functions.delete_group(club_id, group_id).await?;

        tracing::info!(club_id = %club_id, group_id = %group_id, "Group deleted");
        Ok(())
    }

    async fn load_club(&self, club_id: &ClubId) -> Result<Club, AppError> {
        self.clubs
            .find_by_id(club_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Club {}", club_id)))
    }

    async fn load(&self, club_id: &ClubId, group_id: &GroupId) -> Result<(Club, Group), AppError> {
        let club = self.load_club(club_id).await?;
        let group = self
            .groups
            .find_by_id(club_id, group_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Group {}", group_id)))?;
        Ok((club, group))
    }

    async fn load_managed(
        &self,
        actor: &PersonId,
        club_id: &ClubId,
        group_id: &GroupId,
    ) -> Result<Group, AppError> {
        let (club, group) = self.load(club_id, group_id).await?;
        if !GroupAccess::resolve(actor, &club, &group).can_manage_group() {
            return Err(AppError::forbidden(
                "Only club admins and group trainers can manage this group",
            ));
        }
        Ok(group)
    }
}

/// Persist a new member list for `group`, keeping trainers within it.
///
/// When the new list drops a trainer, the trimmed trainer list is written
/// first and the member list second, so stored trainers are a subset of stored
/// members after each step. If the member write fails the trainer list is
/// restored.
pub(crate) async fn replace_group_members<GR>(
    groups: &GR,
    group: &Group,
    member_ids: Vec<PersonId>,
) -> Result<Group, AppError>
where
    GR: GroupRepository + ?Sized,
{
    let trainer_ids = group.trainers_within(&member_ids);
    let trainers_changed = trainer_ids != group.trainer_ids;

    if trainers_changed {
        groups
            .update_trainers(&group.club_id, &group.id, &trainer_ids)
            .await?;
        tracing::debug!(
            group_id = %group.id,
            removed = group.trainer_ids.len() - trainer_ids.len(),
            "Dropped trainers leaving the group"
        );
    }

    if let Err(e) = groups
        .update_members(&group.club_id, &group.id, &member_ids)
        .await
    {
        if trainers_changed {
            if let Err(rollback) = groups
                .update_trainers(&group.club_id, &group.id, &group.trainer_ids)
                .await
            {
                tracing::error!(
                    group_id = %group.id,
                    error = %rollback,
                    "Failed to restore trainers after member update failed"
                );
            }
        }
        return Err(e.into());
    }

    Ok(Group {
        member_ids,
        trainer_ids,
        ..group.clone()
    })
}
