//! Callable functions executed in-process against the in-memory store
//!
//! Reproduces the server-side behavior of each callable, including the status
//! codes the client maps to domain errors.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rand::Rng;

use crate::adapters::memory::MemoryStore;
use crate::domain::entities::{ClubId, GroupId, PersonId, UserId};
use crate::domain::ports::{
    CallableFunctions, ClubRepository, EventRepository, GroupRepository, InviteCode,
    PersonRepository, TrainingRepository, UserRepository,
};
use crate::error::{CallableError, DomainError, FunctionsErrorCode};

/// Characters without look-alikes (no 0/O, 1/I/L)
const INVITE_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";
const INVITE_CODE_LEN: usize = 8;

pub struct InProcessFunctions {
    store: MemoryStore,
    invite_code_ttl: Duration,
}

impl InProcessFunctions {
    pub fn new(store: MemoryStore, invite_code_ttl: Duration) -> Self {
        Self {
            store,
            invite_code_ttl,
        }
    }
}

fn generate_invite_code() -> String {
    let mut rng = rand::thread_rng();
    (0..INVITE_CODE_LEN)
        .map(|_| INVITE_ALPHABET[rng.gen_range(0..INVITE_ALPHABET.len())] as char)
        .collect()
}

fn internal(e: DomainError) -> CallableError {
    match e {
        DomainError::NotFound(msg) => CallableError::new(FunctionsErrorCode::NotFound, msg),
        other => CallableError::new(FunctionsErrorCode::Internal, other.to_string()),
    }
}

#[async_trait]
impl CallableFunctions for InProcessFunctions {
    async fn join_club_with_code(
        &self,
        invite_code: &str,
        person_id: &PersonId,
    ) -> Result<ClubId, CallableError> {
        let club = self
            .store
            .clubs
            .find_by_invite_code(invite_code)
            .await
            .map_err(internal)?
            .ok_or_else(|| {
                CallableError::new(FunctionsErrorCode::NotFound, "Invite code not found")
            })?;

        if !club.has_active_invite_code(Utc::now()) {
            return Err(CallableError::new(
                FunctionsErrorCode::FailedPrecondition,
                "Invite code has expired",
            ));
        }

        if club.is_member(person_id) {
            return Err(CallableError::new(
                FunctionsErrorCode::AlreadyExists,
                "Person is already a member",
            ));
        }

        self.store
            .persons
            .find_by_id(person_id)
            .await
            .map_err(internal)?
            .ok_or_else(|| CallableError::new(FunctionsErrorCode::NotFound, "Person not found"))?;

        // a concurrent join may have landed since the lookup
        let added = self
            .store
            .clubs
            .add_member(&club.id, person_id)
            .await
            .map_err(internal)?;
        if !added {
            return Err(CallableError::new(
                FunctionsErrorCode::AlreadyExists,
                "Person is already a member",
            ));
        }

        self.store
            .persons
            .add_club(person_id, &club.id)
            .await
            .map_err(internal)?;

        tracing::info!(club_id = %club.id, person_id = %person_id, "Person joined club");
        Ok(club.id)
    }

    async fn generate_club_invite_code(
        &self,
        club_id: &ClubId,
    ) -> Result<InviteCode, CallableError> {
        let code = generate_invite_code();
        let expires_at = Utc::now() + self.invite_code_ttl;
        self.store
            .clubs
            .update_invite_code(club_id, Some(code.as_str()), Some(expires_at))
            .await
            .map_err(internal)?;
        Ok(InviteCode {
            invite_code: code,
            expires_at,
        })
    }

    async fn disable_club_invite_code(&self, club_id: &ClubId) -> Result<(), CallableError> {
        self.store
            .clubs
            .update_invite_code(club_id, None, None)
            .await
            .map_err(internal)
    }

    async fn delete_club(&self, club_id: &ClubId) -> Result<(), CallableError> {
        let club = self
            .store
            .clubs
            .find_by_id(club_id)
            .await
            .map_err(internal)?
            .ok_or_else(|| CallableError::new(FunctionsErrorCode::NotFound, "Club not found"))?;

        let groups = self
            .store
            .groups
            .find_by_club(club_id)
            .await
            .map_err(internal)?;
        for group in &groups {
            self.store
                .trainings
                .delete_by_group(club_id, &group.id)
                .await
                .map_err(internal)?;
        }
        self.store
            .groups
            .delete_by_club(club_id)
            .await
            .map_err(internal)?;
        self.store
            .events
            .delete_by_club(club_id)
            .await
            .map_err(internal)?;

        let members = self
            .store
            .persons
            .find_by_ids(&club.member_ids)
            .await
            .map_err(internal)?;
        for person in members {
            self.store
                .persons
                .remove_club(&person.id, club_id)
                .await
                .map_err(internal)?;
        }

        self.store.clubs.delete(club_id).await.map_err(internal)?;
        tracing::info!(club_id = %club_id, groups = groups.len(), "Club deleted");
        Ok(())
    }

    async fn delete_group(
        &self,
        club_id: &ClubId,
        group_id: &GroupId,
    ) -> Result<(), CallableError> {
        self.store
            .trainings
            .delete_by_group(club_id, group_id)
            .await
            .map_err(internal)?;
        self.store
            .groups
            .delete(club_id, group_id)
            .await
            .map_err(internal)
    }

    async fn send_notification_to_persons(
        &self,
        person_ids: &[PersonId],
        title: &str,
        body: &str,
    ) -> Result<(), CallableError> {
        tracing::info!(
            recipients = person_ids.len(),
            title = %title,
            body = %body,
            "Notification sent"
        );
        Ok(())
    }

    async fn update_email_verified_status(&self, user_id: &UserId) -> Result<(), CallableError> {
        self.store
            .users
            .update_email_verified(user_id, true)
            .await
            .map_err(internal)
    }

    async fn update_last_login_at(&self, user_id: &UserId) -> Result<(), CallableError> {
        self.store
            .users
            .update_last_login(user_id, Utc::now())
            .await
            .map_err(internal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{NewClub, NewGroup, NewPerson, NewTraining, Sex};

    async fn seeded() -> (InProcessFunctions, MemoryStore, ClubId, PersonId) {
        let store = MemoryStore::new();
        let owner = store
            .persons
            .create(&NewPerson {
                user_id: UserId::from("u1"),
                first_name: "Kano".to_string(),
                last_name: "Jigoro".to_string(),
                year_of_birth: Some(1860),
                sex: Sex::Male,
            })
            .await
            .unwrap();
        let club = store
            .clubs
            .create(&NewClub {
                name: "Kodokan".to_string(),
                owner_id: owner.id.clone(),
            })
            .await
            .unwrap();
        store
            .persons
            .add_club(&owner.id, &club.id)
            .await
            .unwrap();
        let functions = InProcessFunctions::new(store.clone(), Duration::hours(24));
        (functions, store, club.id, owner.id)
    }

    async fn new_person(store: &MemoryStore) -> PersonId {
        store
            .persons
            .create(&NewPerson {
                user_id: UserId::from("u2"),
                first_name: "Student".to_string(),
                last_name: "One".to_string(),
                year_of_birth: None,
                sex: Sex::Female,
            })
            .await
            .unwrap()
            .id
    }

    #[test]
    fn invite_codes_use_unambiguous_alphabet() {
        let code = generate_invite_code();
        assert_eq!(code.len(), INVITE_CODE_LEN);
        assert!(code.bytes().all(|b| INVITE_ALPHABET.contains(&b)));
    }

    #[tokio::test]
    async fn join_with_generated_code() {
        let (functions, store, club_id, _) = seeded().await;
        let student = new_person(&store).await;
        let code = functions.generate_club_invite_code(&club_id).await.unwrap();

        let joined = functions
            .join_club_with_code(&code.invite_code, &student)
            .await
            .unwrap();
        assert_eq!(joined, club_id);

        let club = store.clubs.find_by_id(&club_id).await.unwrap().unwrap();
        assert!(club.is_member(&student));
        let person = store.persons.find_by_id(&student).await.unwrap().unwrap();
        assert_eq!(person.club_ids, vec![club_id]);
    }

    #[tokio::test]
    async fn join_status_codes() {
        let (functions, store, club_id, owner) = seeded().await;
        let student = new_person(&store).await;

        let err = functions
            .join_club_with_code("UNKNOWN1", &student)
            .await
            .unwrap_err();
        assert_eq!(err.code, FunctionsErrorCode::NotFound);

        let code = functions.generate_club_invite_code(&club_id).await.unwrap();
        let err = functions
            .join_club_with_code(&code.invite_code, &owner)
            .await
            .unwrap_err();
        assert_eq!(err.code, FunctionsErrorCode::AlreadyExists);

        store
            .clubs
            .update_invite_code(
                &club_id,
                Some(code.invite_code.as_str()),
                Some(Utc::now() - Duration::minutes(5)),
            )
            .await
            .unwrap();
        let err = functions
            .join_club_with_code(&code.invite_code, &student)
            .await
            .unwrap_err();
        assert_eq!(err.code, FunctionsErrorCode::FailedPrecondition);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn simultaneous_joins_both_land() {
        let (functions, store, club_id, _) = seeded().await;
        let functions = std::sync::Arc::new(functions);
        let first = new_person(&store).await;
        let second = new_person(&store).await;
        let code = functions.generate_club_invite_code(&club_id).await.unwrap();

        let joins: Vec<_> = [first.clone(), second.clone()]
            .into_iter()
            .map(|person| {
                let functions = functions.clone();
                let code = code.invite_code.clone();
                tokio::spawn(async move { functions.join_club_with_code(&code, &person).await })
            })
            .collect();
        for join in joins {
            join.await.unwrap().unwrap();
        }

        let club = store.clubs.find_by_id(&club_id).await.unwrap().unwrap();
        assert!(club.is_member(&first));
        assert!(club.is_member(&second));
        assert_eq!(club.member_ids.len(), 3);
    }

    #[tokio::test]
    async fn disabled_code_cannot_be_redeemed() {
        let (functions, store, club_id, _) = seeded().await;
        let student = new_person(&store).await;
        let code = functions.generate_club_invite_code(&club_id).await.unwrap();
        functions.disable_club_invite_code(&club_id).await.unwrap();

        let err = functions
            .join_club_with_code(&code.invite_code, &student)
            .await
            .unwrap_err();
        assert_eq!(err.code, FunctionsErrorCode::NotFound);
    }

    #[tokio::test]
    async fn delete_club_cascades() {
        let (functions, store, club_id, owner) = seeded().await;
        let group = store
            .groups
            .create(&NewGroup {
                club_id: club_id.clone(),
                name: "Kids".to_string(),
                member_ids: vec![owner.clone()],
                trainer_ids: vec![],
            })
            .await
            .unwrap();
        store
            .trainings
            .create(&NewTraining {
                club_id: club_id.clone(),
                group_id: group.id.clone(),
                start_date_time: Utc::now(),
                notes: String::new(),
            })
            .await
            .unwrap();

        functions.delete_club(&club_id).await.unwrap();

        assert!(store.clubs.find_by_id(&club_id).await.unwrap().is_none());
        assert!(store.groups.find_by_club(&club_id).await.unwrap().is_empty());
        assert!(store
            .trainings
            .find_by_group(&club_id, &group.id)
            .await
            .unwrap()
            .is_empty());
        let person = store.persons.find_by_id(&owner).await.unwrap().unwrap();
        assert!(person.club_ids.is_empty());

        let err = functions.delete_club(&club_id).await.unwrap_err();
        assert_eq!(err.code, FunctionsErrorCode::NotFound);
    }
}
