use anyhow::{Result, anyhow};
use std::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use pact_store::{PactRepository, WriteOutcome};
use pact_types::{NewLog, NewPact, Notice, NoticeSender, Pact, PactLog};

/// The single shared in-memory state every view derives from. Mutated only
/// under the coordinator's write lock, in one read-modify-write per call.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub pacts: Vec<Pact>,
    pub logs: Vec<PactLog>,
}

/// Optimistic-update orchestrator over the repository.
///
/// Every mutation applies to in-memory state first, then attempts the
/// persistence call. A remote failure is reported as a sync-warning notice
/// and the in-memory state is never rolled back — no mutation is ever lost
/// locally. There is no retry queue; `refresh` is the implicit retry.
pub struct SyncCoordinator {
    repo: PactRepository,
    state: RwLock<AppState>,
    notices: NoticeSender,
}

impl SyncCoordinator {
    pub fn new(repo: PactRepository, notices: NoticeSender) -> Self {
        Self {
            repo,
            state: RwLock::new(AppState::default()),
            notices,
        }
    }

    pub fn repo(&self) -> &PactRepository {
        &self.repo
    }

    /// Full re-read of both collections, replacing in-memory state. When
    /// the remote is reachable this also pushes its view into the mirror.
    pub async fn refresh(&self) -> Result<()> {
        let pacts = self.repo.list_pacts().await?;
        let logs = self.repo.list_logs().await?;
        info!("Refreshed state: {} pacts, {} logs", pacts.len(), logs.len());

        let mut state = self.write_state()?;
        *state = AppState { pacts, logs };
        Ok(())
    }

    pub fn snapshot(&self) -> Result<AppState> {
        Ok(self
            .state
            .read()
            .map_err(|e| anyhow!("state lock poisoned: {e}"))?
            .clone())
    }

    pub async fn create_pact(&self, new: NewPact) -> Result<Pact> {
        let pact = self.repo.materialize(new);
        self.write_state()?.pacts.push(pact.clone());

        let outcome = self.repo.save_pact(&pact).await?;
        self.report(outcome, "The new pact");
        Ok(pact)
    }

    pub async fn update_pact(&self, pact: Pact) -> Result<()> {
        {
            let mut state = self.write_state()?;
            match state.pacts.iter_mut().find(|p| p.id == pact.id) {
                Some(existing) => *existing = pact.clone(),
                None => state.pacts.push(pact.clone()),
            }
        }

        let outcome = self.repo.save_pact(&pact).await?;
        self.report(outcome, "The pact update");
        Ok(())
    }

    pub async fn delete_pact(&self, pact_id: Uuid) -> Result<()> {
        {
            let mut state = self.write_state()?;
            state.pacts.retain(|p| p.id != pact_id);
            // Cascade in memory to match the repository's cascade.
            state.logs.retain(|l| l.pact_id != pact_id);
        }

        let outcome = self.repo.delete(pact_id).await?;
        self.report(outcome, "The pact deletion");
        Ok(())
    }

    /// Record a completion or failure event for a day.
    pub async fn record_log(&self, new: NewLog) -> Result<PactLog> {
        let log = self.repo.materialize_log(new);
        self.write_state()?.logs.push(log.clone());

        let outcome = self.repo.save_log(&log).await?;
        self.report(outcome, "The check-in");
        Ok(log)
    }

    fn write_state(&self) -> Result<std::sync::RwLockWriteGuard<'_, AppState>> {
        self.state
            .write()
            .map_err(|e| anyhow!("state lock poisoned: {e}"))
    }

    fn report(&self, outcome: WriteOutcome, what: &str) {
        if let WriteOutcome::LocalOnly(reason) = outcome {
            warn!("{} was saved locally only: {}", what, reason);
            let _ = self.notices.send(Notice::sync_warning(what));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pact_store::{LocalMirror, RecordStore};
    use pact_types::{Assignee, Deadline, Frequency, LogStatus, ProofType, Severity, UserId};
    use std::sync::Arc;
    use tokio::sync::mpsc;

    async fn coordinator() -> (SyncCoordinator, mpsc::UnboundedReceiver<Notice>) {
        let dir = std::env::temp_dir().join(format!("pact-engine-test-{}", Uuid::new_v4()));
        let mirror = LocalMirror::open(dir).await.unwrap();
        let repo = PactRepository::new(Arc::new(RecordStore::new(None, mirror)));
        let (tx, rx) = mpsc::unbounded_channel();
        (SyncCoordinator::new(repo, tx), rx)
    }

    fn new_pact(title: &str) -> NewPact {
        NewPact {
            title: title.into(),
            description: None,
            frequency: Frequency::Daily,
            assigned_to: Assignee::Both,
            proof_type: ProofType::Checkbox,
            deadline: "19:00".parse::<Deadline>().unwrap(),
            max_fail_count: 3,
            punishment: "no coffee".into(),
            reward: "coffee".into(),
            color: None,
            start_date: None,
        }
    }

    #[tokio::test]
    async fn create_is_visible_immediately_and_warns_when_offline() {
        let (coord, mut rx) = coordinator().await;

        let pact = coord.create_pact(new_pact("call grandma")).await.unwrap();

        let state = coord.snapshot().unwrap();
        assert_eq!(state.pacts.len(), 1);
        assert_eq!(state.pacts[0].id, pact.id);

        // Offline store means LocalOnly, which must warn but not roll back.
        let notice = rx.try_recv().unwrap();
        assert_eq!(notice.severity, Severity::Warning);
        assert_eq!(coord.snapshot().unwrap().pacts.len(), 1);
    }

    #[tokio::test]
    async fn delete_cascades_in_memory_and_on_disk() {
        let (coord, _rx) = coordinator().await;
        let pact = coord.create_pact(new_pact("water plants")).await.unwrap();
        coord
            .record_log(NewLog {
                pact_id: pact.id,
                user_id: UserId::UserA,
                date: NaiveDate::from_ymd_opt(2026, 8, 15).unwrap(),
                status: LogStatus::Completed,
                proof_type: None,
                proof_url: None,
                note: None,
            })
            .await
            .unwrap();

        coord.delete_pact(pact.id).await.unwrap();

        let state = coord.snapshot().unwrap();
        assert!(state.pacts.is_empty());
        assert!(state.logs.is_empty());

        // The persisted mirror agrees after a full refresh.
        coord.refresh().await.unwrap();
        let state = coord.snapshot().unwrap();
        assert!(state.pacts.is_empty());
        assert!(state.logs.is_empty());
    }

    #[tokio::test]
    async fn refresh_loads_what_was_persisted() {
        let (coord, _rx) = coordinator().await;
        coord.create_pact(new_pact("read 20 pages")).await.unwrap();
        coord.create_pact(new_pact("no sugar")).await.unwrap();

        // Wipe memory, then rebuild from the store.
        {
            let mut state = coord.write_state().unwrap();
            *state = AppState::default();
        }
        coord.refresh().await.unwrap();
        assert_eq!(coord.snapshot().unwrap().pacts.len(), 2);
    }

    #[tokio::test]
    async fn update_replaces_the_pact_in_place() {
        let (coord, _rx) = coordinator().await;
        let mut pact = coord.create_pact(new_pact("gym")).await.unwrap();

        pact.title = "gym before work".into();
        coord.update_pact(pact.clone()).await.unwrap();

        let state = coord.snapshot().unwrap();
        assert_eq!(state.pacts.len(), 1);
        assert_eq!(state.pacts[0].title, "gym before work");
    }
}
