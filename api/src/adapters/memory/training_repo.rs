//! In-memory adapter for TrainingRepository

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::{not_found, read, write};
use crate::domain::entities::{ClubId, GroupId, NewTraining, PersonId, Training, TrainingId};
use crate::domain::ports::TrainingRepository;
use crate::error::DomainError;

#[derive(Default)]
pub struct InMemoryTrainingRepository {
    trainings: RwLock<HashMap<TrainingId, Training>>,
}

fn belongs_to(training: &Training, club_id: &ClubId, group_id: &GroupId) -> bool {
    &training.club_id == club_id && &training.group_id == group_id
}

impl InMemoryTrainingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with a training
    pub fn with_training(self, training: Training) -> Self {
        if let Ok(mut trainings) = self.trainings.write() {
            trainings.insert(training.id.clone(), training);
        }
        self
    }

    fn modify<F, R>(
        &self,
        club_id: &ClubId,
        group_id: &GroupId,
        id: &TrainingId,
        change: F,
    ) -> Result<R, DomainError>
    where
        F: FnOnce(&mut Training) -> R,
    {
        let mut trainings = write(&self.trainings)?;
        match trainings.get_mut(id) {
            Some(training) if belongs_to(training, club_id, group_id) => Ok(change(training)),
            _ => Err(not_found("Training", id)),
        }
    }
}

#[async_trait]
impl TrainingRepository for InMemoryTrainingRepository {
    async fn find_by_id(
        &self,
        club_id: &ClubId,
        group_id: &GroupId,
        id: &TrainingId,
    ) -> Result<Option<Training>, DomainError> {
        Ok(read(&self.trainings)?
            .get(id)
            .filter(|t| belongs_to(t, club_id, group_id))
            .cloned())
    }

    async fn find_by_group(
        &self,
        club_id: &ClubId,
        group_id: &GroupId,
    ) -> Result<Vec<Training>, DomainError> {
        let mut trainings: Vec<Training> = read(&self.trainings)?
            .values()
            .filter(|t| belongs_to(t, club_id, group_id))
            .cloned()
            .collect();
        trainings.sort_by_key(|t| t.start_date_time);
        Ok(trainings)
    }

    async fn create(&self, new_training: &NewTraining) -> Result<Training, DomainError> {
        let training = Training {
            id: TrainingId::new(),
            club_id: new_training.club_id.clone(),
            group_id: new_training.group_id.clone(),
            start_date_time: new_training.start_date_time,
            notes: new_training.notes.clone(),
            attended_person_ids: vec![],
        };
        write(&self.trainings)?.insert(training.id.clone(), training.clone());
        Ok(training)
    }

    async fn update_notes(
        &self,
        club_id: &ClubId,
        group_id: &GroupId,
        id: &TrainingId,
        notes: &str,
    ) -> Result<(), DomainError> {
        self.modify(club_id, group_id, id, |t| t.notes = notes.to_string())
    }

    async fn set_attended(
        &self,
        club_id: &ClubId,
        group_id: &GroupId,
        id: &TrainingId,
        person_id: &PersonId,
        attended: bool,
    ) -> Result<Training, DomainError> {
        self.modify(club_id, group_id, id, |t| {
            if attended {
                if !t.attended(person_id) {
                    t.attended_person_ids.push(person_id.clone());
                }
            } else {
                t.attended_person_ids.retain(|p| p != person_id);
            }
            t.clone()
        })
    }

    async fn delete(
        &self,
        club_id: &ClubId,
        group_id: &GroupId,
        id: &TrainingId,
    ) -> Result<(), DomainError> {
        let mut trainings = write(&self.trainings)?;
        match trainings.get(id) {
            Some(training) if belongs_to(training, club_id, group_id) => {
                trainings.remove(id);
                Ok(())
            }
            _ => Err(not_found("Training", id)),
        }
    }

    async fn delete_by_group(
        &self,
        club_id: &ClubId,
        group_id: &GroupId,
    ) -> Result<(), DomainError> {
        write(&self.trainings)?.retain(|_, t| !belongs_to(t, club_id, group_id));
        Ok(())
    }
}
