use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The two fixed identities of an installation. Pacts are shared between
/// exactly these two users; there are no arbitrary accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserId {
    #[serde(rename = "user_a")]
    UserA,
    #[serde(rename = "user_b")]
    UserB,
}

impl UserId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserA => "user_a",
            Self::UserB => "user_b",
        }
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub avatar: Option<String>,
}

/// Who a pact applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Assignee {
    #[serde(rename = "user_a")]
    UserA,
    #[serde(rename = "user_b")]
    UserB,
    #[serde(rename = "both")]
    Both,
}

impl Assignee {
    pub fn includes(&self, user: UserId) -> bool {
        match self {
            Self::UserA => user == UserId::UserA,
            Self::UserB => user == UserId::UserB,
            Self::Both => true,
        }
    }
}

/// How often a pact recurs. Status evaluation currently applies the same
/// daily-deadline rule to all three variants; weekly and one-time pacts are
/// modeled but not scheduled differently yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Frequency {
    Daily,
    Weekly,
    OneTime,
}

/// What counts as proof of completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProofType {
    Checkbox,
    Text,
    Image,
}

/// A recurring daily deadline, stored and exchanged as `"HH:MM"`.
/// Construction validates the 24h time; an invalid string never becomes
/// a stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Deadline(NaiveTime);

impl Deadline {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    pub fn time(&self) -> NaiveTime {
        self.0
    }
}

impl std::str::FromStr for Deadline {
    type Err = DeadlineParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveTime::parse_from_str(s, "%H:%M")
            .map(Self)
            .map_err(|_| DeadlineParseError(s.to_string()))
    }
}

impl std::fmt::Display for Deadline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl TryFrom<String> for Deadline {
    type Error = DeadlineParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Deadline> for String {
    fn from(d: Deadline) -> String {
        d.to_string()
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid deadline {0:?}: expected HH:MM")]
pub struct DeadlineParseError(String);

/// A shared commitment between the two users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pact {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub frequency: Frequency,
    pub assigned_to: Assignee,
    pub proof_type: ProofType,
    pub deadline: Deadline,
    pub max_fail_count: u32,
    pub punishment: String,
    pub reward: String,
    pub color: Option<String>,
    /// The pact is invisible to "today's pacts" queries before this date.
    pub start_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Pact {
    /// Whether the pact has started by the given date.
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.start_date <= date
    }
}

/// Creation payload; the repository assigns the id and fills defaults.
#[derive(Debug, Clone)]
pub struct NewPact {
    pub title: String,
    pub description: Option<String>,
    pub frequency: Frequency,
    pub assigned_to: Assignee,
    pub proof_type: ProofType,
    pub deadline: Deadline,
    pub max_fail_count: u32,
    pub punishment: String,
    pub reward: String,
    pub color: Option<String>,
    /// Defaults to today when omitted.
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStatus {
    Completed,
    Failed,
}

/// An append-only completion/failure event for one pact, user and day.
///
/// Logs are never updated in place. Several may exist for the same
/// `(pact_id, user_id, date)`; readers take the most recent as
/// authoritative, all are kept for history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PactLog {
    pub id: Uuid,
    pub pact_id: Uuid,
    pub user_id: UserId,
    /// The day this log applies to, not the moment it was recorded.
    pub date: NaiveDate,
    pub status: LogStatus,
    pub completed_at: Option<DateTime<Utc>>,
    pub proof_type: Option<ProofType>,
    pub proof_url: Option<String>,
    pub note: Option<String>,
}

/// Log creation payload; the repository assigns id and timestamp.
#[derive(Debug, Clone)]
pub struct NewLog {
    pub pact_id: Uuid,
    pub user_id: UserId,
    pub date: NaiveDate,
    pub status: LogStatus,
    pub proof_type: Option<ProofType>,
    pub proof_url: Option<String>,
    pub note: Option<String>,
}

/// A pact's resolved status for one user and day. Derived at read time,
/// never stored; `Failed` may be an implicit inference from a passed
/// deadline with no log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PactStatus {
    Pending,
    Completed,
    Failed,
}

/// Derived per-pact streak figures, recomputed on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Streak {
    pub current: u32,
    pub longest: u32,
    pub total: u32,
}

/// Pact-agnostic aggregate for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserSummary {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_pacts: u32,
    pub total_completed: u32,
}
