//! Person service
//!
//! Persons belong to a user account; a user acts through one of their persons.

use std::sync::Arc;

use crate::domain::entities::{ClubId, NewPerson, Person, PersonId, Sex, UserId};
use crate::domain::ports::{ClubRepository, ObjectStorage, PersonRepository, ProfileImage};
use crate::error::{AppError, AuthError, ValidationError};

/// Editable fields of a person
#[derive(Debug, Clone)]
pub struct PersonDetails {
    pub first_name: String,
    pub last_name: String,
    pub year_of_birth: Option<i32>,
    pub sex: Sex,
}

impl PersonDetails {
    fn validated(self) -> Result<Self, ValidationError> {
        let first_name = self.first_name.trim().to_string();
        if first_name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(Self {
            first_name,
            last_name: self.last_name.trim().to_string(),
            ..self
        })
    }
}

/// Service for managing persons
pub struct PersonService<PR, CR, S>
where
    PR: PersonRepository,
    CR: ClubRepository,
    S: ObjectStorage,
{
    persons: Arc<PR>,
    clubs: Arc<CR>,
    storage: Arc<S>,
}

impl<PR, CR, S> PersonService<PR, CR, S>
where
    PR: PersonRepository,
    CR: ClubRepository,
    S: ObjectStorage,
{
    pub fn new(persons: Arc<PR>, clubs: Arc<CR>, storage: Arc<S>) -> Self {
        Self {
            persons,
            clubs,
            storage,
        }
    }

    pub async fn create_person(
        &self,
        user_id: &UserId,
        details: PersonDetails,
    ) -> Result<Person, AppError> {
        let details = details.validated()?;
        let person = self
            .persons
            .create(&NewPerson {
                user_id: user_id.clone(),
                first_name: details.first_name,
                last_name: details.last_name,
                year_of_birth: details.year_of_birth,
                sex: details.sex,
            })
            .await?;

        tracing::info!(user_id = %user_id, person_id = %person.id, "Person created");
        Ok(person)
    }

    pub async fn list_my_persons(&self, user_id: &UserId) -> Result<Vec<Person>, AppError> {
        Ok(self.persons.find_by_user(user_id).await?)
    }

    /// The person `user_id` acts as; unknown persons and persons of other users look the same
    pub async fn acting_person(
        &self,
        user_id: &UserId,
        person_id: &PersonId,
    ) -> Result<Person, AppError> {
        match self.persons.find_by_id(person_id).await? {
            Some(person) if &person.user_id == user_id => Ok(person),
            _ => Err(AuthError::PersonNotOwned.into()),
        }
    }

    pub async fn update_person(
        &self,
        user_id: &UserId,
        person_id: &PersonId,
        details: PersonDetails,
    ) -> Result<Person, AppError> {
        let details = details.validated()?;
        let mut person = self.acting_person(user_id, person_id).await?;

        person.first_name = details.first_name;
        person.last_name = details.last_name;
        person.year_of_birth = details.year_of_birth;
        person.sex = details.sex;
        self.persons.update(&person).await?;
        Ok(person)
    }

    /// Members of a club (visible to its members only)
    pub async fn list_club_persons(
        &self,
        actor: &PersonId,
        club_id: &ClubId,
    ) -> Result<Vec<Person>, AppError> {
        let club = self
            .clubs
            .find_by_id(club_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Club {}", club_id)))?;
        if !club.is_member(actor) {
            return Err(AppError::forbidden("Not a member of this club"));
        }
        Ok(self.persons.find_by_ids(&club.member_ids).await?)
    }

    /// Store a profile image for one of the user's persons and link it
    pub async fn upload_person_image(
        &self,
        user_id: &UserId,
        person_id: &PersonId,
        image: ProfileImage,
    ) -> Result<Person, AppError> {
        let mut person = self.acting_person(user_id, person_id).await?;

        let path = image.person_path(person_id);
        let content_type = image.content_type();
        let url = self.storage.put(&path, image.bytes, content_type).await?;
        self.persons.update_image_url(person_id, &url).await?;

        person.person_img_url = Some(url);
        Ok(person)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryClubRepository, InMemoryPersonRepository};
    use crate::test_utils::{pid, test_club, test_person, RecordingObjectStorage};

    type TestService =
        PersonService<InMemoryPersonRepository, InMemoryClubRepository, RecordingObjectStorage>;

    fn setup() -> (TestService, Arc<RecordingObjectStorage>) {
        let persons = InMemoryPersonRepository::new()
            .with_person(test_person("alice", "u1"))
            .with_person(test_person("kid", "u1"))
            .with_person(test_person("bob", "u2"));
        let club = test_club("club", "alice", &["alice"], &["alice", "bob"]);
        let storage = Arc::new(RecordingObjectStorage::new());
        let service = PersonService::new(
            Arc::new(persons),
            Arc::new(InMemoryClubRepository::new().with_club(club)),
            storage.clone(),
        );
        (service, storage)
    }

    fn details(first: &str) -> PersonDetails {
        PersonDetails {
            first_name: first.to_string(),
            last_name: "Tanaka".to_string(),
            year_of_birth: Some(1990),
            sex: Sex::Female,
        }
    }

    #[tokio::test]
    async fn acting_person_must_belong_to_user() {
        let (service, _) = setup();
        let user = UserId::from("u1");

        assert!(service.acting_person(&user, &pid("kid")).await.is_ok());

        for person in ["bob", "ghost"] {
            let err = service.acting_person(&user, &pid(person)).await.unwrap_err();
            assert!(matches!(err, AppError::Auth(AuthError::PersonNotOwned)));
        }
    }

    #[tokio::test]
    async fn create_and_list_for_user() {
        let (service, _) = setup();
        let user = UserId::from("u3");

        let person = service.create_person(&user, details("  Yuki ")).await.unwrap();
        assert_eq!(person.first_name, "Yuki");
        assert_eq!(person.user_id, user);

        let mine = service.list_my_persons(&user).await.unwrap();
        assert_eq!(mine, vec![person]);

        let err = service.create_person(&user, details(" ")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ValidationError::EmptyName)));
    }

    #[tokio::test]
    async fn update_only_by_owning_user() {
        let (service, _) = setup();

        let updated = service
            .update_person(&UserId::from("u1"), &pid("kid"), details("Kenji"))
            .await
            .unwrap();
        assert_eq!(updated.full_name(), "Kenji Tanaka");

        let err = service
            .update_person(&UserId::from("u2"), &pid("kid"), details("Nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Auth(AuthError::PersonNotOwned)));
    }

    #[tokio::test]
    async fn club_persons_visible_to_members() {
        let (service, _) = setup();
        let club = ClubId::from("club");

        let persons = service.list_club_persons(&pid("bob"), &club).await.unwrap();
        assert_eq!(persons.len(), 2);

        let err = service
            .list_club_persons(&pid("kid"), &club)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn upload_sets_image_url() {
        let (service, storage) = setup();
        let image = ProfileImage::new("jpg", vec![0xff, 0xd8]).unwrap();

        let person = service
            .upload_person_image(&UserId::from("u1"), &pid("kid"), image)
            .await
            .unwrap();

        assert_eq!(storage.paths(), vec!["persons/kid/profile.jpg".to_string()]);
        assert!(person.person_img_url.is_some());
    }
}
