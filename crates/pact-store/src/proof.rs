use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tracing::warn;

use crate::record::RecordStore;

/// Store an image proof and return a URL for the log's `proof_url`.
///
/// Tries the remote blob endpoint for a public URL; on any remote failure
/// (or no remote configured) the bytes are inlined as a data URL so the
/// proof stays representable offline.
pub async fn store_proof(
    store: &RecordStore,
    file_name: &str,
    bytes: Vec<u8>,
    content_type: &str,
) -> String {
    if let Some(remote) = store.remote() {
        match remote.upload_blob(file_name, bytes.clone(), content_type).await {
            Ok(url) => return url,
            Err(e) => warn!("Proof upload failed ({}); inlining as data URL", e),
        }
    }
    data_url(&bytes, content_type)
}

fn data_url(bytes: &[u8], content_type: &str) -> String {
    format!("data:{};base64,{}", content_type, STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mirror::LocalMirror;
    use crate::testutil::scratch_dir;

    #[tokio::test]
    async fn offline_proof_becomes_data_url() {
        let mirror = LocalMirror::open(scratch_dir()).await.unwrap();
        let store = RecordStore::new(None, mirror);

        let url = store_proof(&store, "proof.png", vec![0x89, 0x50, 0x4e, 0x47], "image/png").await;
        assert_eq!(url, "data:image/png;base64,iVBORw==");
    }
}
