use chrono::{NaiveDate, NaiveDateTime};

use pact_types::{LogStatus, Pact, PactLog, PactStatus, UserId};

/// Resolve a pact's status for one user and day, purely from the logs and
/// the clock — nothing here mutates state.
///
/// The most recent log for `(pact, user, as_of)` is authoritative: greatest
/// `completed_at`, later slice position breaking ties. With no log at all,
/// a deadline that has already passed is an implicit failure; this
/// inference is never persisted.
///
/// `frequency` deliberately does not change the evaluation; weekly and
/// one-time pacts get the same daily-deadline rule.
pub fn resolve(
    pact: &Pact,
    logs: &[PactLog],
    user: UserId,
    as_of: NaiveDate,
    now: NaiveDateTime,
) -> PactStatus {
    let latest = logs
        .iter()
        .enumerate()
        .filter(|(_, l)| l.pact_id == pact.id && l.user_id == user && l.date == as_of)
        .max_by_key(|(i, l)| (l.completed_at, *i))
        .map(|(_, l)| l);

    if let Some(log) = latest {
        return match log.status {
            LogStatus::Completed => PactStatus::Completed,
            LogStatus::Failed => PactStatus::Failed,
        };
    }

    let deadline_instant = as_of.and_time(pact.deadline.time());
    if now > deadline_instant {
        PactStatus::Failed
    } else {
        PactStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, Utc};
    use pact_types::{Assignee, Deadline, Frequency, ProofType};
    use uuid::Uuid;

    fn pact_with_deadline(deadline: &str) -> Pact {
        Pact {
            id: Uuid::new_v4(),
            title: "evening run".into(),
            description: None,
            frequency: Frequency::Daily,
            assigned_to: Assignee::Both,
            proof_type: ProofType::Checkbox,
            deadline: deadline.parse::<Deadline>().unwrap(),
            max_fail_count: 3,
            punishment: "plank minute".into(),
            reward: "dessert".into(),
            color: None,
            start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            created_at: Utc::now(),
        }
    }

    fn log(pact: &Pact, date: NaiveDate, status: LogStatus, recorded: chrono::DateTime<Utc>) -> PactLog {
        PactLog {
            id: Uuid::new_v4(),
            pact_id: pact.id,
            user_id: UserId::UserA,
            date,
            status,
            completed_at: Some(recorded),
            proof_type: None,
            proof_url: None,
            note: None,
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 15).unwrap()
    }

    #[test]
    fn pending_before_deadline_failed_after() {
        let pact = pact_with_deadline("18:00");

        let just_before = day().and_hms_opt(17, 59, 0).unwrap();
        assert_eq!(resolve(&pact, &[], UserId::UserA, day(), just_before), PactStatus::Pending);

        let after = day().and_hms_opt(19, 0, 0).unwrap();
        assert_eq!(resolve(&pact, &[], UserId::UserA, day(), after), PactStatus::Failed);
    }

    #[test]
    fn at_the_deadline_is_still_pending() {
        let pact = pact_with_deadline("18:00");
        let exactly = day().and_hms_opt(18, 0, 0).unwrap();
        assert_eq!(resolve(&pact, &[], UserId::UserA, day(), exactly), PactStatus::Pending);
    }

    #[test]
    fn logged_completion_beats_the_clock() {
        let pact = pact_with_deadline("18:00");
        let logs = vec![log(&pact, day(), LogStatus::Completed, Utc::now())];
        let late = day().and_hms_opt(23, 0, 0).unwrap();
        assert_eq!(resolve(&pact, &logs, UserId::UserA, day(), late), PactStatus::Completed);
    }

    #[test]
    fn latest_log_supersedes_earlier_ones() {
        let pact = pact_with_deadline("18:00");
        let t0 = Utc::now();
        let logs = vec![
            log(&pact, day(), LogStatus::Failed, t0),
            log(&pact, day(), LogStatus::Completed, t0 + Duration::minutes(5)),
        ];
        let now = day().and_hms_opt(12, 0, 0).unwrap();
        assert_eq!(resolve(&pact, &logs, UserId::UserA, day(), now), PactStatus::Completed);
    }

    #[test]
    fn equal_timestamps_fall_back_to_insertion_order() {
        let pact = pact_with_deadline("18:00");
        let t0 = Utc::now();
        let logs = vec![
            log(&pact, day(), LogStatus::Completed, t0),
            log(&pact, day(), LogStatus::Failed, t0),
        ];
        let now = day().and_hms_opt(12, 0, 0).unwrap();
        assert_eq!(resolve(&pact, &logs, UserId::UserA, day(), now), PactStatus::Failed);
    }

    #[test]
    fn other_users_and_days_are_ignored() {
        let pact = pact_with_deadline("18:00");
        let mut other_user = log(&pact, day(), LogStatus::Completed, Utc::now());
        other_user.user_id = UserId::UserB;
        let yesterday = log(&pact, day() - Duration::days(1), LogStatus::Completed, Utc::now());

        let after = day().and_hms_opt(20, 0, 0).unwrap();
        assert_eq!(
            resolve(&pact, &[other_user, yesterday], UserId::UserA, day(), after),
            PactStatus::Failed
        );
    }
}
