pub mod models;
pub mod notices;

pub use models::{
    Assignee, Deadline, Frequency, LogStatus, NewLog, NewPact, Pact, PactLog, PactStatus,
    ProofType, Streak, User, UserId, UserSummary,
};
pub use notices::{Notice, NoticeSender, Severity};
