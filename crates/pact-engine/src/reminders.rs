use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use crate::sync::SyncCoordinator;
use pact_types::{Notice, NoticeSender, Pact, PactLog, UserId};

/// How long before the deadline the reminder window opens.
const REMINDER_WINDOW_MINUTES: i64 = 30;

/// One-shot notification flags, keyed by `(pact, day)` so a new day starts
/// clean without any explicit reset.
#[derive(Debug, Default)]
pub struct ReminderFlags {
    reminded: HashSet<(Uuid, NaiveDate)>,
    auto_fail_notified: HashSet<(Uuid, NaiveDate)>,
}

impl ReminderFlags {
    /// Drop keys older than yesterday so the sets stay bounded.
    fn prune(&mut self, today: NaiveDate) {
        let cutoff = today - Duration::days(1);
        self.reminded.retain(|(_, day)| *day >= cutoff);
        self.auto_fail_notified.retain(|(_, day)| *day >= cutoff);
    }
}

/// One scheduler tick: decide which notices are due right now.
///
/// A pact gets at most one reminder (inside the half-hour window before its
/// deadline) and at most one missed notice (once the deadline passes) per
/// day. Only pacts with no log yet for today are considered; an explicit
/// completion or failure silences both. The missed notice writes no log —
/// the passed deadline is already an implicit failure at read time.
pub fn evaluate_tick(
    flags: &mut ReminderFlags,
    pacts: &[Pact],
    logs: &[PactLog],
    user: UserId,
    now: NaiveDateTime,
) -> Vec<Notice> {
    let today = now.date();
    flags.prune(today);

    let mut due = Vec::new();
    for pact in pacts {
        if !pact.assigned_to.includes(user) || !pact.is_active_on(today) {
            continue;
        }
        let has_log = logs
            .iter()
            .any(|l| l.pact_id == pact.id && l.user_id == user && l.date == today);
        if has_log {
            continue;
        }

        let deadline = today.and_time(pact.deadline.time());
        let window_start = deadline - Duration::minutes(REMINDER_WINDOW_MINUTES);
        let key = (pact.id, today);

        if now >= window_start && now < deadline && flags.reminded.insert(key) {
            due.push(Notice::reminder(pact));
        }
        if now >= deadline && flags.auto_fail_notified.insert(key) {
            due.push(Notice::missed(pact));
        }
    }
    due
}

/// Handle for the polling task; tied to the active-user lifecycle.
pub struct ReminderHandle {
    task: JoinHandle<()>,
}

impl ReminderHandle {
    /// Stop polling. Nothing is in flight between ticks, so abort is safe.
    pub fn stop(self) {
        self.task.abort();
        info!("Reminder scheduler stopped");
    }
}

/// Spawn the reminder poll loop for the active user. Each tick reads a
/// state snapshot, evaluates, and emits due notices; it never blocks on
/// network I/O. The loop also exits when the notice receiver is dropped.
pub fn spawn_reminders(
    coordinator: Arc<SyncCoordinator>,
    user: UserId,
    notices: NoticeSender,
    poll: std::time::Duration,
) -> ReminderHandle {
    let task = tokio::spawn(async move {
        let mut flags = ReminderFlags::default();
        let mut interval = tokio::time::interval(poll);
        info!("Reminder scheduler started for {} (every {:?})", user, poll);

        loop {
            interval.tick().await;

            let state = match coordinator.snapshot() {
                Ok(state) => state,
                Err(e) => {
                    warn!("Reminder tick skipped: {}", e);
                    continue;
                }
            };

            let now = chrono::Local::now().naive_local();
            for notice in evaluate_tick(&mut flags, &state.pacts, &state.logs, user, now) {
                if notices.send(notice).is_err() {
                    return;
                }
            }
        }
    });
    ReminderHandle { task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pact_types::{Assignee, Deadline, Frequency, LogStatus, ProofType, Severity};

    fn pact(deadline: &str, assigned_to: Assignee) -> Pact {
        Pact {
            id: Uuid::new_v4(),
            title: "do the dishes".into(),
            description: None,
            frequency: Frequency::Daily,
            assigned_to,
            proof_type: ProofType::Checkbox,
            deadline: deadline.parse::<Deadline>().unwrap(),
            max_fail_count: 3,
            punishment: "trash duty".into(),
            reward: "pick the movie".into(),
            color: None,
            start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            created_at: Utc::now(),
        }
    }

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 15)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn reminder_fires_once_in_the_window() {
        let mut flags = ReminderFlags::default();
        let pacts = vec![pact("18:00", Assignee::Both)];

        let first = evaluate_tick(&mut flags, &pacts, &[], UserId::UserA, at(17, 35));
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].severity, Severity::Warning);

        // Second tick inside the same window: nothing.
        let second = evaluate_tick(&mut flags, &pacts, &[], UserId::UserA, at(17, 50));
        assert!(second.is_empty());
    }

    #[test]
    fn no_reminder_before_the_window() {
        let mut flags = ReminderFlags::default();
        let pacts = vec![pact("18:00", Assignee::Both)];
        assert!(evaluate_tick(&mut flags, &pacts, &[], UserId::UserA, at(17, 0)).is_empty());
    }

    #[test]
    fn missed_notice_fires_once_after_the_deadline() {
        let mut flags = ReminderFlags::default();
        let pacts = vec![pact("18:00", Assignee::Both)];

        let first = evaluate_tick(&mut flags, &pacts, &[], UserId::UserA, at(18, 1));
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].severity, Severity::Error);

        let second = evaluate_tick(&mut flags, &pacts, &[], UserId::UserA, at(18, 30));
        assert!(second.is_empty());
    }

    #[test]
    fn a_logged_pact_stays_silent() {
        let mut flags = ReminderFlags::default();
        let pacts = vec![pact("18:00", Assignee::Both)];
        let logs = vec![PactLog {
            id: Uuid::new_v4(),
            pact_id: pacts[0].id,
            user_id: UserId::UserA,
            date: NaiveDate::from_ymd_opt(2026, 8, 15).unwrap(),
            status: LogStatus::Completed,
            completed_at: Some(Utc::now()),
            proof_type: None,
            proof_url: None,
            note: None,
        }];

        assert!(evaluate_tick(&mut flags, &pacts, &logs, UserId::UserA, at(17, 45)).is_empty());
        assert!(evaluate_tick(&mut flags, &pacts, &logs, UserId::UserA, at(19, 0)).is_empty());
    }

    #[test]
    fn partner_only_pacts_are_ignored() {
        let mut flags = ReminderFlags::default();
        let pacts = vec![pact("18:00", Assignee::UserB)];
        assert!(evaluate_tick(&mut flags, &pacts, &[], UserId::UserA, at(17, 45)).is_empty());
    }

    #[test]
    fn skipping_the_window_still_yields_the_missed_notice() {
        let mut flags = ReminderFlags::default();
        let pacts = vec![pact("18:00", Assignee::Both)];

        // First tick lands after the deadline: no reminder, one missed.
        let due = evaluate_tick(&mut flags, &pacts, &[], UserId::UserA, at(20, 0));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].severity, Severity::Error);
    }

    #[test]
    fn a_new_day_resets_the_flags() {
        let mut flags = ReminderFlags::default();
        let pacts = vec![pact("18:00", Assignee::Both)];

        assert_eq!(evaluate_tick(&mut flags, &pacts, &[], UserId::UserA, at(17, 45)).len(), 1);

        let next_day = at(17, 45) + Duration::days(1);
        assert_eq!(evaluate_tick(&mut flags, &pacts, &[], UserId::UserA, next_day).len(), 1);
    }

    #[test]
    fn future_start_date_is_not_evaluated() {
        let mut flags = ReminderFlags::default();
        let mut p = pact("18:00", Assignee::Both);
        p.start_date = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();

        assert!(evaluate_tick(&mut flags, &[p], &[], UserId::UserA, at(17, 45)).is_empty());
    }
}
