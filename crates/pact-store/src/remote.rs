use serde_json::Value;
use tracing::debug;

/// Connection settings for the remote record service. Constructed by the
/// application from its config; there is no ambient global client.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub base_url: String,
    pub api_key: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("remote request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("remote returned {status} for {path}")]
    Status { status: u16, path: String },
    #[error("remote payload malformed: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Client for the generic remote record service: per-collection CRUD keyed
/// by string id, plus blob upload for image proofs.
///
/// Errors from this client never reach `RecordStore` callers; the store
/// turns them into degraded-success outcomes.
pub struct RemoteClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RemoteClient {
    pub fn new(config: RemoteConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Fetch every record in a collection.
    pub async fn select(&self, collection: &str) -> Result<Vec<Value>, RemoteError> {
        let path = format!("records/{collection}");
        let resp = self
            .http
            .get(self.url(&path))
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(RemoteError::Status {
                status: resp.status().as_u16(),
                path,
            });
        }
        let rows: Vec<Value> = resp.json().await?;
        debug!("Fetched {} rows from remote {}", rows.len(), collection);
        Ok(rows)
    }

    /// Insert or replace one record. The service upserts on id.
    pub async fn upsert(&self, collection: &str, id: &str, body: &Value) -> Result<(), RemoteError> {
        let path = format!("records/{collection}/{id}");
        let resp = self
            .http
            .put(self.url(&path))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(RemoteError::Status {
                status: resp.status().as_u16(),
                path,
            });
        }
        Ok(())
    }

    /// Delete one record. An already-gone record is not an error.
    pub async fn remove(&self, collection: &str, id: &str) -> Result<(), RemoteError> {
        let path = format!("records/{collection}/{id}");
        let resp = self
            .http
            .delete(self.url(&path))
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        if !resp.status().is_success() && resp.status().as_u16() != 404 {
            return Err(RemoteError::Status {
                status: resp.status().as_u16(),
                path,
            });
        }
        Ok(())
    }

    /// Upload a binary blob (image proof) and return its public URL.
    pub async fn upload_blob(
        &self,
        name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, RemoteError> {
        let path = format!("blobs/{name}");
        let resp = self
            .http
            .post(self.url(&path))
            .bearer_auth(&self.api_key)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(RemoteError::Status {
                status: resp.status().as_u16(),
                path,
            });
        }
        #[derive(serde::Deserialize)]
        struct BlobResponse {
            url: String,
        }
        let body: BlobResponse = resp.json().await?;
        Ok(body.url)
    }

    /// Connectivity probe for the periodic watcher.
    pub async fn ping(&self) -> bool {
        match self.http.get(self.url("health")).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }
}
