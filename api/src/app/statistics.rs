//! Attendance statistics
//!
//! Pure aggregation over past trainings; nothing is persisted.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::{PersonId, Training};

/// Attendance of one member over the counted trainings
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberAttendance {
    pub person_id: PersonId,
    pub attended: usize,
    pub total_trainings: usize,
    /// attended / total_trainings, 0.0 when there were no trainings
    pub attendance_rate: f64,
}

/// Compute per-member attendance over the trainings that started before `now`
/// and, if given, not before `since`.
///
/// Sorted by rate, highest first. Ties keep the order of `member_ids`.
pub fn attendance_statistics(
    member_ids: &[PersonId],
    trainings: &[Training],
    since: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Vec<MemberAttendance> {
    let counted: Vec<&Training> = trainings
        .iter()
        .filter(|t| t.start_date_time < now)
        .filter(|t| since.map_or(true, |cutoff| t.start_date_time >= cutoff))
        .collect();
    let total = counted.len();

    let mut stats: Vec<MemberAttendance> = member_ids
        .iter()
        .map(|person_id| {
            let attended = counted.iter().filter(|t| t.attended(person_id)).count();
            let attendance_rate = if total == 0 {
                0.0
            } else {
                attended as f64 / total as f64
            };
            MemberAttendance {
                person_id: person_id.clone(),
                attended,
                total_trainings: total,
                attendance_rate,
            }
        })
        .collect();

    // Stable sort keeps member order for equal rates
    stats.sort_by(|a, b| b.attendance_rate.total_cmp(&a.attendance_rate));
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{ClubId, GroupId, TrainingId};
    use chrono::Duration;

    fn pid(s: &str) -> PersonId {
        PersonId::from(s)
    }

    fn training(start: DateTime<Utc>, attended: &[&str]) -> Training {
        Training {
            id: TrainingId::new(),
            club_id: ClubId::from("c"),
            group_id: GroupId::from("g"),
            start_date_time: start,
            notes: String::new(),
            attended_person_ids: attended.iter().map(|s| pid(s)).collect(),
        }
    }

    #[test]
    fn no_trainings_gives_zero_rate() {
        let stats = attendance_statistics(&[pid("a"), pid("b")], &[], None, Utc::now());
        assert_eq!(stats.len(), 2);
        assert!(stats.iter().all(|s| s.attendance_rate == 0.0 && s.total_trainings == 0));
    }

    #[test]
    fn rates_are_sorted_descending() {
        let now = Utc::now();
        let trainings = vec![
            training(now - Duration::days(3), &["a", "b"]),
            training(now - Duration::days(2), &["b"]),
            training(now - Duration::days(1), &["b", "c"]),
            training(now - Duration::days(4), &[]),
        ];

        let stats = attendance_statistics(&[pid("a"), pid("b"), pid("c")], &trainings, None, now);

        let order: Vec<_> = stats.iter().map(|s| s.person_id.as_str().to_string()).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
        assert_eq!(stats[0].attended, 3);
        assert_eq!(stats[0].total_trainings, 4);
        assert!((stats[0].attendance_rate - 0.75).abs() < f64::EPSILON);
        assert!(stats.iter().all(|s| (0.0..=1.0).contains(&s.attendance_rate)));
    }

    #[test]
    fn future_trainings_and_cutoff_are_excluded() {
        let now = Utc::now();
        let trainings = vec![
            training(now - Duration::days(30), &["a"]),
            training(now - Duration::days(2), &[]),
            training(now + Duration::days(1), &["a"]),
        ];

        let stats = attendance_statistics(
            &[pid("a")],
            &trainings,
            Some(now - Duration::days(7)),
            now,
        );
        assert_eq!(stats[0].total_trainings, 1);
        assert_eq!(stats[0].attended, 0);
        assert_eq!(stats[0].attendance_rate, 0.0);
    }

    #[test]
    fn ties_keep_member_order() {
        let now = Utc::now();
        let trainings = vec![training(now - Duration::days(1), &["x", "y"])];
        let stats = attendance_statistics(&[pid("y"), pid("x")], &trainings, None, now);
        assert_eq!(stats[0].person_id, pid("y"));
        assert_eq!(stats[1].person_id, pid("x"));
    }
}
