//! Role-based access rules for groups, trainings and attendance
//!
//! Roles are derived, never stored:
//! - admin: the person is in `club.admin_ids`
//! - trainer: the person is in `group.trainer_ids`
//! - member: the person is in `group.member_ids`
//!
//! | Role            | view | manage | delete | trainings | own attendance  | others' attendance |
//! |-----------------|------|--------|--------|-----------|-----------------|--------------------|
//! | club admin      | yes  | yes    | yes    | yes       | yes             | yes                |
//! | group trainer   | yes  | yes    | no     | yes       | yes             | yes                |
//! | group member    | yes  | no     | no     | no        | upcoming only   | no                 |
//! | anyone else     | no   | no     | no     | no        | no              | no                 |

use chrono::{DateTime, Utc};

use super::entities::{Club, Group, PersonId, Training};

/// A person's standing relative to one group of a club
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GroupAccess {
    pub is_admin: bool,
    pub is_trainer: bool,
    pub is_member: bool,
}

impl GroupAccess {
    pub fn resolve(person_id: &PersonId, club: &Club, group: &Group) -> Self {
        Self {
            is_admin: club.is_admin(person_id),
            is_trainer: group.is_trainer(person_id),
            is_member: group.is_member(person_id),
        }
    }

    pub fn can_view_group(&self) -> bool {
        self.is_admin || self.is_member
    }

    /// Edit members, trainers and name
    pub fn can_manage_group(&self) -> bool {
        self.is_admin || self.is_trainer
    }

    pub fn can_delete_group(&self) -> bool {
        self.is_admin
    }

    pub fn can_create_training(&self) -> bool {
        self.can_manage_group()
    }

    pub fn can_edit_training(&self) -> bool {
        self.can_manage_group()
    }

    /// Whether `actor` may set or clear `target`'s attendance on `training`.
    ///
    /// Admins and trainers may always toggle anyone. Plain members may only toggle
    /// themselves, and only while the training has not started.
    pub fn can_toggle_attendance(
        &self,
        actor: &PersonId,
        target: &PersonId,
        training: &Training,
        now: DateTime<Utc>,
    ) -> bool {
        if self.can_manage_group() {
            return true;
        }
        self.is_member && actor == target && training.is_upcoming(now)
    }
}

/// Groups a person may see: every group for admins, otherwise the groups they belong to
pub fn visible_groups(person_id: &PersonId, club: &Club, groups: Vec<Group>) -> Vec<Group> {
    if club.is_admin(person_id) {
        return groups;
    }
    groups
        .into_iter()
        .filter(|g| g.is_member(person_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{ClubId, GroupId, TrainingId};
    use chrono::Duration;

    fn pid(s: &str) -> PersonId {
        PersonId::from(s)
    }

    fn club() -> Club {
        Club {
            id: ClubId::from("club"),
            name: "Club".to_string(),
            owner_id: pid("owner"),
            admin_ids: vec![pid("admin")],
            member_ids: vec![pid("owner"), pid("admin"), pid("trainer"), pid("member")],
            invite_code: None,
            invite_code_expires_at: None,
            club_img_url: None,
        }
    }

    fn group(name: &str, members: &[&str], trainers: &[&str]) -> Group {
        Group {
            id: GroupId::from(name),
            club_id: ClubId::from("club"),
            name: name.to_string(),
            member_ids: members.iter().map(|s| pid(s)).collect(),
            trainer_ids: trainers.iter().map(|s| pid(s)).collect(),
        }
    }

    fn training_at(start: DateTime<Utc>) -> Training {
        Training {
            id: TrainingId::new(),
            club_id: ClubId::from("club"),
            group_id: GroupId::from("g"),
            start_date_time: start,
            notes: String::new(),
            attended_person_ids: vec![],
        }
    }

    #[test]
    fn decision_table_rows() {
        let club = club();
        let g = group("g", &["trainer", "member"], &["trainer"]);

        let admin = GroupAccess::resolve(&pid("admin"), &club, &g);
        assert!(admin.can_view_group());
        assert!(admin.can_manage_group());
        assert!(admin.can_delete_group());
        assert!(admin.can_create_training());

        let trainer = GroupAccess::resolve(&pid("trainer"), &club, &g);
        assert!(trainer.can_view_group());
        assert!(trainer.can_manage_group());
        assert!(!trainer.can_delete_group());
        assert!(trainer.can_edit_training());

        let member = GroupAccess::resolve(&pid("member"), &club, &g);
        assert!(member.can_view_group());
        assert!(!member.can_manage_group());
        assert!(!member.can_delete_group());
        assert!(!member.can_create_training());

        let stranger = GroupAccess::resolve(&pid("owner"), &club, &g);
        assert!(!stranger.can_view_group());
        assert!(!stranger.can_manage_group());
    }

    #[test]
    fn privileged_toggle_is_unconditional() {
        let club = club();
        let g = group("g", &["trainer", "member"], &["trainer"]);
        let now = Utc::now();
        let past = training_at(now - Duration::days(3));

        let trainer = GroupAccess::resolve(&pid("trainer"), &club, &g);
        assert!(trainer.can_toggle_attendance(&pid("trainer"), &pid("member"), &past, now));

        let admin = GroupAccess::resolve(&pid("admin"), &club, &g);
        assert!(admin.can_toggle_attendance(&pid("admin"), &pid("member"), &past, now));
    }

    #[test]
    fn member_toggle_is_self_and_upcoming_only() {
        let club = club();
        let g = group("g", &["trainer", "member", "other"], &["trainer"]);
        let now = Utc::now();
        let upcoming = training_at(now + Duration::hours(2));
        let past = training_at(now - Duration::hours(2));
        let member = GroupAccess::resolve(&pid("member"), &club, &g);

        assert!(member.can_toggle_attendance(&pid("member"), &pid("member"), &upcoming, now));
        assert!(!member.can_toggle_attendance(&pid("member"), &pid("member"), &past, now));
        assert!(!member.can_toggle_attendance(&pid("member"), &pid("other"), &upcoming, now));
    }

    #[test]
    fn non_member_cannot_toggle() {
        let club = club();
        let g = group("g", &["member"], &[]);
        let now = Utc::now();
        let upcoming = training_at(now + Duration::hours(2));
        let outsider = GroupAccess::resolve(&pid("owner"), &club, &g);
        assert!(!outsider.can_toggle_attendance(&pid("owner"), &pid("owner"), &upcoming, now));
    }

    #[test]
    fn visible_groups_by_role() {
        let club = club();
        let groups = vec![
            group("kids", &["member"], &[]),
            group("adults", &["trainer"], &["trainer"]),
            group("comp", &["member", "trainer"], &["trainer"]),
        ];

        let all = visible_groups(&pid("admin"), &club, groups.clone());
        assert_eq!(all.len(), 3);

        let mine: Vec<_> = visible_groups(&pid("member"), &club, groups.clone())
            .into_iter()
            .map(|g| g.name)
            .collect();
        assert_eq!(mine, vec!["kids".to_string(), "comp".to_string()]);

        assert!(visible_groups(&pid("owner"), &club, groups).is_empty());
    }
}
