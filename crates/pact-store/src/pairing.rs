use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::record::{Record, RecordStore, WriteOutcome};
use pact_types::UserId;

/// A short code one user shares so the other device can pair to them.
///
/// Codes currently never expire and are not single-use; anyone who learns a
/// code can claim it indefinitely. Known gap, left open deliberately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairingCode {
    pub code: String,
    pub issued_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl Record for PairingCode {
    const COLLECTION: &'static str = "pairing_codes";

    fn id(&self) -> String {
        self.code.clone()
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PairingError {
    #[error("pairing code must not be empty")]
    Empty,
    #[error("unknown pairing code")]
    Unknown,
    #[error("pairing storage error: {0}")]
    Storage(String),
}

const CODE_LEN: usize = 6;
// No 0/O, 1/I/L — codes get read out loud.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

fn generate_code<R: Rng>(rng: &mut R) -> String {
    (0..CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Issue a fresh code on behalf of `user` and persist it.
pub async fn issue(
    store: &RecordStore,
    user: UserId,
) -> anyhow::Result<(PairingCode, WriteOutcome)> {
    let code = PairingCode {
        code: generate_code(&mut rand::rng()),
        issued_by: user,
        created_at: Utc::now(),
    };
    let outcome = store.write(&code).await?;
    info!("Issued pairing code for {}", user);
    Ok((code, outcome))
}

/// Resolve a code back to its issuing user by exact string match.
/// Validation happens before any storage access.
pub async fn claim(store: &RecordStore, code: &str) -> Result<UserId, PairingError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(PairingError::Empty);
    }

    let codes: Vec<PairingCode> = store
        .read_all()
        .await
        .map_err(|e| PairingError::Storage(e.to_string()))?;
    codes
        .iter()
        .find(|c| c.code == code)
        .map(|c| c.issued_by)
        .ok_or(PairingError::Unknown)
}
