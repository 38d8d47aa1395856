//! Training service
//!
//! Trainings, notes, attendance and attendance statistics for a group.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::app::statistics::{attendance_statistics, MemberAttendance};
use crate::domain::entities::{
    Club, ClubId, Group, GroupId, NewTraining, PersonId, Training, TrainingId,
};
use crate::domain::permissions::GroupAccess;
use crate::domain::ports::{ClubRepository, GroupRepository, TrainingRepository};
use crate::error::{AppError, ValidationError};

/// Allowed clock skew for a training scheduled to start "now"
const START_GRACE_SECS: i64 = 60;

/// Service for managing trainings
pub struct TrainingService<CR, GR, TR>
where
    CR: ClubRepository,
    GR: GroupRepository,
    TR: TrainingRepository,
{
    clubs: Arc<CR>,
    groups: Arc<GR>,
    trainings: Arc<TR>,
}

/// A group and the actor's roles in it
struct Scope {
    group: Group,
    access: GroupAccess,
}

impl<CR, GR, TR> TrainingService<CR, GR, TR>
where
    CR: ClubRepository,
    GR: GroupRepository,
    TR: TrainingRepository,
{
    pub fn new(clubs: Arc<CR>, groups: Arc<GR>, trainings: Arc<TR>) -> Self {
        Self {
            clubs,
            groups,
            trainings,
        }
    }

    /// Schedule a training (admins and group trainers)
    pub async fn create_training(
        &self,
        actor: &PersonId,
        club_id: &ClubId,
        group_id: &GroupId,
        start_date_time: DateTime<Utc>,
        notes: &str,
    ) -> Result<Training, AppError> {
        let scope = self.scope(actor, club_id, group_id).await?;
        if !scope.access.can_create_training() {
            return Err(AppError::forbidden(
                "Only club admins and group trainers can create trainings",
            ));
        }
        if start_date_time < Utc::now() - Duration::seconds(START_GRACE_SECS) {
            return Err(ValidationError::TrainingInPast.into());
        }

        let training = self
            .trainings
            .create(&NewTraining {
                club_id: club_id.clone(),
                group_id: group_id.clone(),
                start_date_time,
                notes: notes.to_string(),
            })
            .await?;

        tracing::info!(
            group_id = %group_id,
            training_id = %training.id,
            start = %training.start_date_time,
            "Training created"
        );
        Ok(training)
    }

    /// Trainings of a group, earliest first
    pub async fn list_trainings(
        &self,
        actor: &PersonId,
        club_id: &ClubId,
        group_id: &GroupId,
    ) -> Result<Vec<Training>, AppError> {
        let scope = self.scope(actor, club_id, group_id).await?;
        if !scope.access.can_view_group() {
            return Err(AppError::forbidden("Not a member of this group"));
        }

        let mut trainings = self.trainings.find_by_group(club_id, group_id).await?;
        trainings.sort_by_key(|t| t.start_date_time);
        Ok(trainings)
    }

    pub async fn get_training(
        &self,
        actor: &PersonId,
        club_id: &ClubId,
        group_id: &GroupId,
        training_id: &TrainingId,
    ) -> Result<Training, AppError> {
        let scope = self.scope(actor, club_id, group_id).await?;
        if !scope.access.can_view_group() {
            return Err(AppError::forbidden("Not a member of this group"));
        }
        self.load_training(club_id, group_id, training_id).await
    }

    pub async fn update_notes(
        &self,
        actor: &PersonId,
        club_id: &ClubId,
        group_id: &GroupId,
        training_id: &TrainingId,
        notes: &str,
    ) -> Result<Training, AppError> {
        let scope = self.scope(actor, club_id, group_id).await?;
        if !scope.access.can_edit_training() {
            return Err(AppError::forbidden(
                "Only club admins and group trainers can edit trainings",
            ));
        }

        let mut training = self.load_training(club_id, group_id, training_id).await?;
        self.trainings
            .update_notes(club_id, group_id, training_id, notes)
            .await?;
        training.notes = notes.to_string();
        Ok(training)
    }

    pub async fn delete_training(
        &self,
        actor: &PersonId,
        club_id: &ClubId,
        group_id: &GroupId,
        training_id: &TrainingId,
    ) -> Result<(), AppError> {
        let scope = self.scope(actor, club_id, group_id).await?;
        if !scope.access.can_edit_training() {
            return Err(AppError::forbidden(
                "Only club admins and group trainers can delete trainings",
            ));
        }

        self.load_training(club_id, group_id, training_id).await?;
        self.trainings.delete(club_id, group_id, training_id).await?;
        tracing::info!(training_id = %training_id, "Training deleted");
        Ok(())
    }

    /// Mark `target` as attended or not.
    ///
    /// Setting the current value again is a no-op. Attendance of persons
    /// outside the group's members is allowed but logged.
    pub async fn set_attendance(
        &self,
        actor: &PersonId,
        club_id: &ClubId,
        group_id: &GroupId,
        training_id: &TrainingId,
        target: &PersonId,
        attended: bool,
    ) -> Result<Training, AppError> {
        let scope = self.scope(actor, club_id, group_id).await?;
        let training = self.load_training(club_id, group_id, training_id).await?;

        if !scope
            .access
            .can_toggle_attendance(actor, target, &training, Utc::now())
        {
            return Err(AppError::forbidden(
                "Not allowed to change attendance for this training",
            ));
        }

        if training.attended(target) == attended {
            return Ok(training);
        }

        if attended && !scope.group.is_member(target) {
            tracing::warn!(
                group_id = %group_id,
                training_id = %training_id,
                person_id = %target,
                "Recording attendance for a person outside the group"
            );
        }

        Ok(self
            .trainings
            .set_attended(club_id, group_id, training_id, target, attended)
            .await?)
    }

    /// Attendance of the group's members over its past trainings
    pub async fn group_statistics(
        &self,
        actor: &PersonId,
        club_id: &ClubId,
        group_id: &GroupId,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<MemberAttendance>, AppError> {
        let scope = self.scope(actor, club_id, group_id).await?;
        if !scope.access.can_manage_group() {
            return Err(AppError::forbidden(
                "Only club admins and group trainers can view statistics",
            ));
        }

        let trainings = self.trainings.find_by_group(club_id, group_id).await?;
        Ok(attendance_statistics(
            &scope.group.member_ids,
            &trainings,
            since,
            Utc::now(),
        ))
    }

    /// Attendance of all club members over every group's past trainings (admins only)
    pub async fn club_statistics(
        &self,
        actor: &PersonId,
        club_id: &ClubId,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<MemberAttendance>, AppError> {
        let club = self.load_club(club_id).await?;
        if !club.is_admin(actor) {
            return Err(AppError::forbidden("Only club admins can view club statistics"));
        }

        let mut trainings = Vec::new();
        for group in self.groups.find_by_club(club_id).await? {
            trainings.extend(self.trainings.find_by_group(club_id, &group.id).await?);
        }
        Ok(attendance_statistics(
            &club.member_ids,
            &trainings,
            since,
            Utc::now(),
        ))
    }

    async fn load_club(&self, club_id: &ClubId) -> Result<Club, AppError> {
        self.clubs
            .find_by_id(club_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Club {}", club_id)))
    }

    async fn scope(
        &self,
        actor: &PersonId,
        club_id: &ClubId,
        group_id: &GroupId,
    ) -> Result<Scope, AppError> {
        let club = self.load_club(club_id).await?;
        let group = self
            .groups
            .find_by_id(club_id, group_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Group {}", group_id)))?;
        let access = GroupAccess::resolve(actor, &club, &group);
        Ok(Scope { group, access })
    }

    async fn load_training(
        &self,
        club_id: &ClubId,
        group_id: &GroupId,
        training_id: &TrainingId,
    ) -> Result<Training, AppError> {
        self.trainings
            .find_by_id(club_id, group_id, training_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Training {}", training_id)))
    }
}
