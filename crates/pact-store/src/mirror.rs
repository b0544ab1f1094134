use anyhow::Result;
use std::path::PathBuf;
use tokio::fs;
use tracing::{info, warn};

use crate::record::Record;

/// Always-on local persistence: one JSON-serialized array per collection at
/// `{dir}/{collection}.json`, read on boot and rewritten on every mutation.
///
/// A missing file is an empty collection. Unparseable persisted JSON is the
/// one corruption case; it is recovered by resetting that collection to
/// empty, never by crashing.
pub struct LocalMirror {
    dir: PathBuf,
}

impl LocalMirror {
    pub async fn open(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir).await?;
        info!("Local mirror directory: {}", dir.display());
        Ok(Self { dir })
    }

    fn path(&self, collection: &str) -> PathBuf {
        self.dir.join(format!("{collection}.json"))
    }

    pub async fn read_all<T: Record>(&self) -> Result<Vec<T>> {
        let path = self.path(T::COLLECTION);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_slice(&bytes) {
            Ok(items) => Ok(items),
            Err(e) => {
                warn!(
                    "Local mirror for {} is corrupt ({}); resetting collection to empty",
                    T::COLLECTION,
                    e
                );
                // Rewrite so the corruption does not resurface on next boot.
                self.replace_all::<T>(&[]).await?;
                Ok(Vec::new())
            }
        }
    }

    /// Overwrite the whole collection, e.g. with an authoritative remote read.
    pub async fn replace_all<T: Record>(&self, items: &[T]) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(items)?;
        fs::write(self.path(T::COLLECTION), bytes).await?;
        Ok(())
    }

    /// Insert or replace one item by id.
    pub async fn upsert<T: Record>(&self, item: &T) -> Result<()> {
        let mut items = self.read_all::<T>().await?;
        match items.iter_mut().find(|i| i.id() == item.id()) {
            Some(existing) => *existing = item.clone(),
            None => items.push(item.clone()),
        }
        self.replace_all(&items).await
    }

    /// Remove one item by id. Removing an absent id is a no-op.
    pub async fn remove<T: Record>(&self, id: &str) -> Result<()> {
        let mut items = self.read_all::<T>().await?;
        items.retain(|i| i.id() != id);
        self.replace_all(&items).await
    }
}
