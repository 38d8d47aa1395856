//! Club domain entity
//!
//! A club owns its groups and events. The owner is fixed at creation and is the
//! only person allowed to delete the club.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::person::PersonId;

document_id!(
    /// Unique identifier for a club
    ClubId
);

/// A martial-arts club
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Club {
    pub id: ClubId,
    pub name: String,
    pub owner_id: PersonId,
    #[serde(default)]
    pub admin_ids: Vec<PersonId>,
    #[serde(default)]
    pub member_ids: Vec<PersonId>,
    #[serde(default)]
    pub invite_code: Option<String>,
    #[serde(default)]
    pub invite_code_expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub club_img_url: Option<String>,
}

impl Club {
    /// Admin status comes from `admin_ids` only; ownership does not imply it
    pub fn is_admin(&self, person_id: &PersonId) -> bool {
        self.admin_ids.contains(person_id)
    }

    pub fn is_owner(&self, person_id: &PersonId) -> bool {
        &self.owner_id == person_id
    }

    pub fn is_member(&self, person_id: &PersonId) -> bool {
        self.member_ids.contains(person_id)
    }

    /// Whether the club currently has an invite code that can still be redeemed
    pub fn has_active_invite_code(&self, now: DateTime<Utc>) -> bool {
        match (&self.invite_code, self.invite_code_expires_at) {
            (Some(_), Some(expires_at)) => expires_at >= now,
            _ => false,
        }
    }
}

/// Data needed to create a new club
#[derive(Debug, Clone)]
pub struct NewClub {
    pub name: String,
    pub owner_id: PersonId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn make_club() -> Club {
        Club {
            id: ClubId::from("club-1"),
            name: "Shodan Dojo".to_string(),
            owner_id: PersonId::from("owner"),
            admin_ids: vec![PersonId::from("admin")],
            member_ids: vec![
                PersonId::from("owner"),
                PersonId::from("admin"),
                PersonId::from("student"),
            ],
            invite_code: None,
            invite_code_expires_at: None,
            club_img_url: None,
        }
    }

    #[test]
    fn owner_is_not_implicitly_admin() {
        let club = make_club();
        assert!(club.is_owner(&PersonId::from("owner")));
        assert!(!club.is_admin(&PersonId::from("owner")));
        assert!(club.is_admin(&PersonId::from("admin")));
    }

    #[test]
    fn membership() {
        let club = make_club();
        assert!(club.is_member(&PersonId::from("student")));
        assert!(!club.is_member(&PersonId::from("stranger")));
    }

    #[test]
    fn invite_code_activity() {
        let now = Utc::now();
        let mut club = make_club();
        assert!(!club.has_active_invite_code(now));

        club.invite_code = Some("ABCD2345".to_string());
        club.invite_code_expires_at = Some(now + Duration::hours(1));
        assert!(club.has_active_invite_code(now));

        club.invite_code_expires_at = Some(now - Duration::seconds(1));
        assert!(!club.has_active_invite_code(now));
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(make_club()).unwrap();
        assert_eq!(json["ownerId"], "owner");
        assert_eq!(json["adminIds"][0], "admin");
        assert!(json.get("inviteCodeExpiresAt").is_some());
    }
}
