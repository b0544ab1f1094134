use chrono::{Duration, NaiveDate};
use std::collections::{BTreeSet, HashSet};
use uuid::Uuid;

use pact_types::{LogStatus, Pact, PactLog, Streak, UserId, UserSummary};

/// Per-pact streak figures for one user, derived from the unordered log
/// collection. Days are de-duplicated by `date`; two logs on the same day
/// count once. `total` counts completed logs, not distinct days.
pub fn streak_for(pact_id: Uuid, user: UserId, logs: &[PactLog], today: NaiveDate) -> Streak {
    let completed: Vec<&PactLog> = logs
        .iter()
        .filter(|l| l.pact_id == pact_id && l.user_id == user && l.status == LogStatus::Completed)
        .collect();

    // BTreeSet dedupes and sorts in one go.
    let days: Vec<NaiveDate> = completed
        .iter()
        .map(|l| l.date)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .rev()
        .collect();
    let (current, longest) = runs(&days, today);

    Streak {
        current,
        longest,
        total: completed.len() as u32,
    }
}

/// Pact-agnostic aggregate across all of a user's completed logs. Unlike
/// the per-pact path this orders by the `completed_at` recording timestamp,
/// then reduces to distinct days for the run walk. `total_pacts` counts the
/// user's pacts active today.
pub fn summary_for(
    user: UserId,
    logs: &[PactLog],
    pacts: &[Pact],
    today: NaiveDate,
) -> UserSummary {
    let mut completed: Vec<&PactLog> = logs
        .iter()
        .filter(|l| l.user_id == user && l.status == LogStatus::Completed)
        .collect();
    completed.sort_by_key(|l| l.completed_at);

    // Distinct days, keeping the recency order; a day logged twice with
    // another day's log recorded in between must still appear once.
    let mut seen = HashSet::new();
    let days: Vec<NaiveDate> = completed
        .iter()
        .rev()
        .map(|l| l.date)
        .filter(|day| seen.insert(*day))
        .collect();
    let (current_streak, longest_streak) = runs(&days, today);

    let total_pacts = pacts
        .iter()
        .filter(|p| p.assigned_to.includes(user) && p.is_active_on(today))
        .count() as u32;

    UserSummary {
        current_streak,
        longest_streak,
        total_pacts,
        total_completed: completed.len() as u32,
    }
}

/// Walk a descending list of distinct days and return `(current, longest)`
/// consecutive runs. The newest run only counts as current when its newest
/// day is today or yesterday; an older run is history, not a live streak.
fn runs(days: &[NaiveDate], today: NaiveDate) -> (u32, u32) {
    let Some(&newest) = days.first() else {
        return (0, 0);
    };

    let mut longest = 1u32;
    let mut run = 1u32;
    let mut newest_run = 0u32;
    let mut closed_newest = false;

    for pair in days.windows(2) {
        if pair[0] - pair[1] == Duration::days(1) {
            run += 1;
        } else {
            if !closed_newest {
                newest_run = run;
                closed_newest = true;
            }
            longest = longest.max(run);
            run = 1;
        }
    }
    if !closed_newest {
        newest_run = run;
    }
    longest = longest.max(run);

    let current = if newest >= today - Duration::days(1) {
        newest_run
    } else {
        0
    };
    (current, longest)
}
