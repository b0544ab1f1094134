use anyhow::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::mirror::LocalMirror;
use crate::remote::{RemoteClient, RemoteError};

/// A persistable entity: lives in a named collection, keyed by string id.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync {
    const COLLECTION: &'static str;

    fn id(&self) -> String;
}

impl Record for pact_types::Pact {
    const COLLECTION: &'static str = "pacts";

    fn id(&self) -> String {
        self.id.to_string()
    }
}

impl Record for pact_types::PactLog {
    const COLLECTION: &'static str = "pact_logs";

    fn id(&self) -> String {
        self.id.to_string()
    }
}

/// How a mutation landed. `LocalOnly` is degraded success, not failure:
/// the local mirror holds the data and the next full read retries the sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Synced,
    LocalOnly(String),
}

impl WriteOutcome {
    pub fn synced(&self) -> bool {
        matches!(self, Self::Synced)
    }

    /// Combine outcomes of a multi-record mutation; any LocalOnly dominates.
    pub fn merge(self, other: WriteOutcome) -> WriteOutcome {
        match self {
            Self::Synced => other,
            local_only => local_only,
        }
    }
}

/// Dual-backend persistence primitive.
///
/// Writes go to the remote first when one is configured, and to the local
/// mirror **regardless of the remote outcome** — every mutation is locally
/// durable and the caller's perceived success never depends on the network.
/// Reads prefer the remote and overwrite the mirror with its result; any
/// remote error falls back to the mirror silently.
///
/// Remote failures surface as `WriteOutcome::LocalOnly`, never as `Err`.
/// The only `Err` from this type is a local I/O failure.
pub struct RecordStore {
    remote: Option<RemoteClient>,
    mirror: LocalMirror,
}

impl RecordStore {
    pub fn new(remote: Option<RemoteClient>, mirror: LocalMirror) -> Self {
        Self { remote, mirror }
    }

    pub fn remote(&self) -> Option<&RemoteClient> {
        self.remote.as_ref()
    }

    pub async fn read_all<T: Record>(&self) -> Result<Vec<T>> {
        if let Some(remote) = &self.remote {
            match fetch_remote::<T>(remote).await {
                Ok(items) => {
                    // Remote is authoritative for reads when reachable.
                    self.mirror.replace_all(&items).await?;
                    return Ok(items);
                }
                Err(e) => {
                    warn!(
                        "Remote read of {} failed ({}); serving local mirror",
                        T::COLLECTION,
                        e
                    );
                }
            }
        }
        self.mirror.read_all().await
    }

    pub async fn write<T: Record>(&self, item: &T) -> Result<WriteOutcome> {
        let outcome = match &self.remote {
            Some(remote) => {
                let body = serde_json::to_value(item)?;
                match remote.upsert(T::COLLECTION, &item.id(), &body).await {
                    Ok(()) => WriteOutcome::Synced,
                    Err(e) => {
                        warn!("Remote write to {} failed: {}", T::COLLECTION, e);
                        WriteOutcome::LocalOnly(e.to_string())
                    }
                }
            }
            None => WriteOutcome::LocalOnly("remote not configured".into()),
        };
        self.mirror.upsert(item).await?;
        Ok(outcome)
    }

    pub async fn remove<T: Record>(&self, id: &str) -> Result<WriteOutcome> {
        let outcome = match &self.remote {
            Some(remote) => match remote.remove(T::COLLECTION, id).await {
                Ok(()) => WriteOutcome::Synced,
                Err(e) => {
                    warn!("Remote delete from {} failed: {}", T::COLLECTION, e);
                    WriteOutcome::LocalOnly(e.to_string())
                }
            },
            None => WriteOutcome::LocalOnly("remote not configured".into()),
        };
        self.mirror.remove::<T>(id).await?;
        Ok(outcome)
    }
}

async fn fetch_remote<T: Record>(remote: &RemoteClient) -> Result<Vec<T>, RemoteError> {
    let rows = remote.select(T::COLLECTION).await?;
    rows.into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<T>, _>>()
        .map_err(Into::into)
}
