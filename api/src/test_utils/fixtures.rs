//! Test fixtures
//!
//! Factory functions for creating test data with sensible defaults.
//! Ids are short readable strings so assertions stay legible.

use chrono::{DateTime, Utc};

use crate::domain::entities::{
    Club, ClubId, Group, GroupId, Person, PersonId, Sex, Training, TrainingId, User, UserId,
};

pub fn pid(id: &str) -> PersonId {
    PersonId::from(id)
}

fn pids(ids: &[&str]) -> Vec<PersonId> {
    ids.iter().map(|id| pid(id)).collect()
}

/// Create a club with explicit owner, admins and members
pub fn test_club(id: &str, owner: &str, admins: &[&str], members: &[&str]) -> Club {
    Club {
        id: ClubId::from(id),
        name: format!("{} dojo", id),
        owner_id: pid(owner),
        admin_ids: pids(admins),
        member_ids: pids(members),
        invite_code: None,
        invite_code_expires_at: None,
        club_img_url: None,
    }
}

pub fn test_group(club_id: &str, id: &str, members: &[&str], trainers: &[&str]) -> Group {
    Group {
        id: GroupId::from(id),
        club_id: ClubId::from(club_id),
        name: format!("Group {}", id),
        member_ids: pids(members),
        trainer_ids: pids(trainers),
    }
}

/// Create a person owned by `user_id`, not yet in any club
pub fn test_person(id: &str, user_id: &str) -> Person {
    Person {
        id: pid(id),
        user_id: UserId::from(user_id),
        first_name: id.to_string(),
        last_name: "Tester".to_string(),
        year_of_birth: Some(1995),
        sex: Sex::Other,
        club_ids: vec![],
        person_img_url: None,
    }
}

pub fn test_training(
    club_id: &str,
    group_id: &str,
    id: &str,
    start: DateTime<Utc>,
    attended: &[&str],
) -> Training {
    Training {
        id: TrainingId::from(id),
        club_id: ClubId::from(club_id),
        group_id: GroupId::from(group_id),
        start_date_time: start,
        notes: String::new(),
        attended_person_ids: pids(attended),
    }
}

pub fn test_user(id: &str, email: &str) -> User {
    User {
        id: UserId::from(id),
        email: email.to_string(),
        api_key_hash: format!("hash-{}", id),
        email_verified: false,
        created_at: Utc::now(),
        last_login_at: None,
    }
}
