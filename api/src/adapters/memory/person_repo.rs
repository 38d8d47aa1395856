//! In-memory adapter for PersonRepository

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::changes::ChangeFeed;
use super::{not_found, read, write};
use crate::domain::entities::{ClubId, NewPerson, Person, PersonId, UserId};
use crate::domain::ports::repositories::DocumentStream;
use crate::domain::ports::PersonRepository;
use crate::error::DomainError;

#[derive(Default)]
pub struct InMemoryPersonRepository {
    persons: RwLock<HashMap<PersonId, Person>>,
    feed: ChangeFeed<PersonId, Person>,
}

impl InMemoryPersonRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with a person
    pub fn with_person(self, person: Person) -> Self {
        if let Ok(mut persons) = self.persons.write() {
            persons.insert(person.id.clone(), person);
        }
        self
    }

    fn modify<F>(&self, id: &PersonId, change: F) -> Result<(), DomainError>
    where
        F: FnOnce(&mut Person),
    {
        let snapshot = {
            let mut persons = write(&self.persons)?;
            let person = persons.get_mut(id).ok_or_else(|| not_found("Person", id))?;
            change(person);
            person.clone()
        };
        self.feed.publish(id.clone(), Some(snapshot));
        Ok(())
    }
}

#[async_trait]
impl PersonRepository for InMemoryPersonRepository {
    async fn find_by_id(&self, id: &PersonId) -> Result<Option<Person>, DomainError> {
        Ok(read(&self.persons)?.get(id).cloned())
    }

    async fn find_by_ids(&self, ids: &[PersonId]) -> Result<Vec<Person>, DomainError> {
        let persons = read(&self.persons)?;
        Ok(ids.iter().filter_map(|id| persons.get(id).cloned()).collect())
    }

    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<Person>, DomainError> {
        let mut persons: Vec<Person> = read(&self.persons)?
            .values()
            .filter(|p| &p.user_id == user_id)
            .cloned()
            .collect();
        persons.sort_by(|a, b| a.full_name().cmp(&b.full_name()));
        Ok(persons)
    }

    async fn create(&self, new_person: &NewPerson) -> Result<Person, DomainError> {
        let person = Person {
            id: PersonId::new(),
            user_id: new_person.user_id.clone(),
            first_name: new_person.first_name.clone(),
            last_name: new_person.last_name.clone(),
            year_of_birth: new_person.year_of_birth,
            sex: new_person.sex,
            club_ids: vec![],
            person_img_url: None,
        };
        write(&self.persons)?.insert(person.id.clone(), person.clone());
        self.feed.publish(person.id.clone(), Some(person.clone()));
        Ok(person)
    }

    async fn update(&self, person: &Person) -> Result<(), DomainError> {
        self.modify(&person.id, |stored| {
            stored.first_name = person.first_name.clone();
            stored.last_name = person.last_name.clone();
            stored.year_of_birth = person.year_of_birth;
            stored.sex = person.sex;
        })
    }

    async fn add_club(&self, id: &PersonId, club_id: &ClubId) -> Result<(), DomainError> {
        self.modify(id, |p| {
            if !p.club_ids.contains(club_id) {
                p.club_ids.push(club_id.clone());
            }
        })
    }

    async fn remove_club(&self, id: &PersonId, club_id: &ClubId) -> Result<(), DomainError> {
        self.modify(id, |p| p.club_ids.retain(|c| c != club_id))
    }

    async fn update_image_url(&self, id: &PersonId, url: &str) -> Result<(), DomainError> {
        self.modify(id, |p| p.person_img_url = Some(url.to_string()))
    }

    fn watch(&self, id: &PersonId) -> DocumentStream<Person> {
        self.feed
            .watch(id.clone(), || Ok(read(&self.persons)?.get(id).cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_person;

    #[tokio::test]
    async fn club_links_are_added_once_and_removed() {
        let repo = InMemoryPersonRepository::new().with_person(test_person("p", "u"));
        let id = PersonId::from("p");

        repo.add_club(&id, &ClubId::from("a")).await.unwrap();
        repo.add_club(&id, &ClubId::from("b")).await.unwrap();
        repo.add_club(&id, &ClubId::from("a")).await.unwrap();
        let person = repo.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(person.club_ids, vec![ClubId::from("a"), ClubId::from("b")]);

        repo.remove_club(&id, &ClubId::from("a")).await.unwrap();
        let person = repo.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(person.club_ids, vec![ClubId::from("b")]);
    }
}
