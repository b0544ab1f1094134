pub mod reminders;
pub mod status;
pub mod streaks;
pub mod sync;

pub use reminders::{ReminderHandle, spawn_reminders};
pub use status::resolve;
pub use streaks::{streak_for, summary_for};
pub use sync::{AppState, SyncCoordinator};
