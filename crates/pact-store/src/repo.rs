use anyhow::Result;
use chrono::{Local, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::record::{RecordStore, WriteOutcome};
use pact_types::{NewLog, NewPact, Pact, PactLog};

/// Typed CRUD for pacts and their logs over the `RecordStore`.
///
/// Owns id generation and default-field population; everything else is
/// delegated. Ids are v4 UUIDs, so uniqueness is statistical, not enforced.
pub struct PactRepository {
    store: Arc<RecordStore>,
}

impl PactRepository {
    pub fn new(store: Arc<RecordStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Turn a creation payload into a full pact: fresh id, `created_at` now,
    /// `start_date` today unless given.
    pub fn materialize(&self, new: NewPact) -> Pact {
        Pact {
            id: Uuid::new_v4(),
            title: new.title,
            description: new.description,
            frequency: new.frequency,
            assigned_to: new.assigned_to,
            proof_type: new.proof_type,
            deadline: new.deadline,
            max_fail_count: new.max_fail_count,
            punishment: new.punishment,
            reward: new.reward,
            color: new.color,
            start_date: new.start_date.unwrap_or_else(|| Local::now().date_naive()),
            created_at: Utc::now(),
        }
    }

    /// Turn a log payload into a full log. `completed_at` records the moment
    /// of entry for both statuses; it is what orders same-day logs.
    pub fn materialize_log(&self, new: NewLog) -> PactLog {
        PactLog {
            id: Uuid::new_v4(),
            pact_id: new.pact_id,
            user_id: new.user_id,
            date: new.date,
            status: new.status,
            completed_at: Some(Utc::now()),
            proof_type: new.proof_type,
            proof_url: new.proof_url,
            note: new.note,
        }
    }

    pub async fn create(&self, new: NewPact) -> Result<(Pact, WriteOutcome)> {
        let pact = self.materialize(new);
        let outcome = self.store.write(&pact).await?;
        Ok((pact, outcome))
    }

    pub async fn save_pact(&self, pact: &Pact) -> Result<WriteOutcome> {
        self.store.write(pact).await
    }

    /// Remove the pact and cascade to every log that references it. A log
    /// removal that only lands locally degrades the outcome; the local
    /// mirror is never left with orphaned logs.
    pub async fn delete(&self, pact_id: Uuid) -> Result<WriteOutcome> {
        let mut outcome = self.store.remove::<Pact>(&pact_id.to_string()).await?;

        let logs: Vec<PactLog> = self.store.read_all().await?;
        for log in logs.iter().filter(|l| l.pact_id == pact_id) {
            let removed = self.store.remove::<PactLog>(&log.id.to_string()).await?;
            outcome = outcome.merge(removed);
        }
        Ok(outcome)
    }

    pub async fn list_pacts(&self) -> Result<Vec<Pact>> {
        self.store.read_all().await
    }

    pub async fn get(&self, pact_id: Uuid) -> Result<Option<Pact>> {
        Ok(self
            .list_pacts()
            .await?
            .into_iter()
            .find(|p| p.id == pact_id))
    }

    pub async fn list_logs(&self) -> Result<Vec<PactLog>> {
        self.store.read_all().await
    }

    pub async fn record_log(&self, new: NewLog) -> Result<(PactLog, WriteOutcome)> {
        let log = self.materialize_log(new);
        let outcome = self.store.write(&log).await?;
        Ok((log, outcome))
    }

    pub async fn save_log(&self, log: &PactLog) -> Result<WriteOutcome> {
        self.store.write(log).await
    }
}
