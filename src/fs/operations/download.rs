//! Download operations.

use std::path::Path;

use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use super::utils::normalize_path;
use crate::api::StreamResponse;
use crate::client::DataClient;
use crate::content::Content;
use crate::error::{DataError, Result};
use crate::fs::node::Oid;

impl DataClient {
    /// Download the object at `remote_path` to `local_path`.
    ///
    /// The body is written to a temporary file `.gmtmp.<oid>` next to the
    /// target and renamed into place once complete, so an interrupted
    /// download never leaves a truncated file at `local_path`.
    ///
    /// # Returns
    /// Number of bytes written
    pub async fn download_file<P: AsRef<Path>>(&mut self, remote_path: &str, local_path: P) -> Result<u64> {
        let target_path = local_path.as_ref();
        let oid = self.require(remote_path).await?;
        let response = self.transport.stream(&oid).await?;

        let parent_dir = target_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let temp_path = parent_dir.join(format!(".gmtmp.{}", oid));

        match finish_download(response, &temp_path, target_path).await {
            Ok(written) => {
                info!(remote = remote_path, local = %target_path.display(), bytes = written, "download complete");
                Ok(written)
            }
            Err(e) => {
                let _ = tokio::fs::remove_file(&temp_path).await;
                Err(e)
            }
        }
    }

    /// Read the whole object at `remote_path` into memory.
    pub async fn read_bytes(&mut self, remote_path: &str) -> Result<Vec<u8>> {
        let oid = self.require(remote_path).await?;
        let response = self.transport.stream(&oid).await?;
        collect_body(response).await.map(|(_, bytes)| bytes)
    }

    /// Fetch the object at `remote_path` and decode it by its content type.
    ///
    /// Undecodable content comes back as [`Content::Unsupported`] rather than
    /// an error.
    pub async fn fetch_content(&mut self, remote_path: &str) -> Result<Content> {
        let oid = self.require(remote_path).await?;
        let response = self.transport.stream(&oid).await?;
        let (content_type, bytes) = collect_body(response).await?;
        debug!(path = remote_path, content_type = ?content_type, size = bytes.len(), "decoding content");
        Ok(Content::decode(content_type.as_deref(), bytes))
    }

    async fn require(&mut self, remote_path: &str) -> Result<Oid> {
        let path = normalize_path(remote_path);
        match self.find(&path).await? {
            Some(oid) => Ok(oid),
            None => Err(DataError::NotFound(path)),
        }
    }
}

/// Write the body to `temp_path`, then move it over `target_path`.
async fn finish_download(response: StreamResponse, temp_path: &Path, target_path: &Path) -> Result<u64> {
    let written = write_body(response, temp_path).await?;
    tokio::fs::rename(temp_path, target_path).await?;
    Ok(written)
}

async fn write_body(response: StreamResponse, temp_path: &Path) -> Result<u64> {
    let mut file = tokio::fs::File::create(temp_path).await?;
    let mut body = response.body;
    let mut written = 0u64;
    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(written)
}

async fn collect_body(response: StreamResponse) -> Result<(Option<String>, Vec<u8>)> {
    let mut body = response.body;
    let mut bytes = Vec::new();
    while let Some(chunk) = body.next().await {
        bytes.extend_from_slice(&chunk?);
    }
    Ok((response.content_type, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WriteOptions;
    use crate::fs::testing::FakeStore;
    use serde_json::json;

    async fn client_for(store: &FakeStore) -> DataClient {
        DataClient::with_transport(Box::new(store.clone()))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_download_file_renames_into_place() {
        let store = FakeStore::new(json!({"label": "P0"}));
        let world = store.add_dir(&Oid::root(), "world");
        let file = store.add_file(&world, "notes.txt", b"hello, world");
        let mut client = client_for(&store).await;

        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("notes.txt");
        let written = client.download_file("/world/notes.txt", &target).await.unwrap();

        assert_eq!(written, 12);
        assert_eq!(std::fs::read(&target).unwrap(), b"hello, world");
        assert!(!dir.path().join(format!(".gmtmp.{}", file)).exists());
    }

    #[tokio::test]
    async fn test_failed_rename_removes_temp_file() {
        let store = FakeStore::new(json!({"label": "P0"}));
        let file = store.add_file(&Oid::root(), "notes.txt", b"hello");
        let mut client = client_for(&store).await;

        // A non-empty directory cannot be replaced by a file
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("occupied");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("keep.txt"), b"x").unwrap();

        let err = client.download_file("/notes.txt", &target).await.unwrap_err();
        assert!(matches!(err, DataError::Io(_)));
        assert!(!dir.path().join(format!(".gmtmp.{}", file)).exists());
        assert!(target.join("keep.txt").exists());
    }

    #[tokio::test]
    async fn test_download_missing_path() {
        let store = FakeStore::new(json!({"label": "P0"}));
        let mut client = client_for(&store).await;
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out");

        let err = client.download_file("/nope.txt", &target).await.unwrap_err();
        assert!(matches!(err, DataError::NotFound(p) if p == "/nope.txt"));
        assert!(!target.exists());
        assert_eq!(store.calls().stream, 0);
    }

    #[tokio::test]
    async fn test_read_bytes_after_upload() {
        let store = FakeStore::new(json!({"label": "P0"}));
        let mut client = client_for(&store).await;
        client
            .upload_bytes(b"round trip payload".to_vec(), "/a/b.bin", &WriteOptions::default())
            .await
            .unwrap();

        let bytes = client.read_bytes("/a/b.bin").await.unwrap();
        assert_eq!(bytes, b"round trip payload");
    }

    #[tokio::test]
    async fn test_fetch_content_json() {
        let store = FakeStore::new(json!({"label": "P0"}));
        let mut client = client_for(&store).await;
        client
            .upload_bytes(br#"{"k": [1, 2]}"#.to_vec(), "/data.json", &WriteOptions::default())
            .await
            .unwrap();

        match client.fetch_content("/data.json").await.unwrap() {
            Content::Json(value) => assert_eq!(value["k"][1], 2),
            other => panic!("expected json, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_content_unsupported() {
        let store = FakeStore::new(json!({"label": "P0"}));
        let mut client = client_for(&store).await;
        client
            .upload_bytes(
                vec![0u8, 1, 2, 3],
                "/blob",
                &WriteOptions::new().with_mimetype("application/x-custom"),
            )
            .await
            .unwrap();

        match client.fetch_content("/blob").await.unwrap() {
            Content::Unsupported { content_type, bytes } => {
                assert_eq!(content_type.as_deref(), Some("application/x-custom"));
                assert_eq!(bytes, vec![0u8, 1, 2, 3]);
            }
            other => panic!("expected unsupported, got {:?}", other),
        }
    }
}
