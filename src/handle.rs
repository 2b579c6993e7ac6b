//! Actor front-end that lets many tasks share one [`DataClient`].

use std::path::{Path, PathBuf};

use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::api::Transport;
use crate::client::DataClient;
use crate::config::{ClientConfig, WriteOptions};
use crate::content::Content;
use crate::error::{DataError, Result};
use crate::fs::{MetadataRecord, Oid, PartTarget};

/// Cloneable handle to a client running on its own task.
///
/// Commands are handled one at a time, so check-then-create sequences
/// (directory creation, part numbering) never interleave between callers.
#[derive(Clone, Debug)]
pub struct ClientHandle {
    tx: mpsc::Sender<ClientCommand>,
}

enum ClientCommand {
    GetSelf {
        reply: oneshot::Sender<Result<String>>,
    },
    Refresh {
        reply: oneshot::Sender<Result<()>>,
    },
    Find {
        path: String,
        reply: oneshot::Sender<Result<Option<Oid>>>,
    },
    EnsureDirectory {
        path: String,
        options: WriteOptions,
        reply: oneshot::Sender<Result<Oid>>,
    },
    CreateMeta {
        target: String,
        options: WriteOptions,
        local_hint: Option<String>,
        reply: oneshot::Sender<Result<MetadataRecord>>,
    },
    NextPart {
        logical_path: String,
        options: WriteOptions,
        reply: oneshot::Sender<Result<PartTarget>>,
    },
    UploadFile {
        local: PathBuf,
        remote: String,
        options: WriteOptions,
        reply: oneshot::Sender<Result<Oid>>,
    },
    UploadBytes {
        data: Vec<u8>,
        remote: String,
        options: WriteOptions,
        reply: oneshot::Sender<Result<Oid>>,
    },
    AppendFile {
        local: PathBuf,
        logical_path: String,
        options: WriteOptions,
        reply: oneshot::Sender<Result<Oid>>,
    },
    AppendData {
        data: Vec<u8>,
        logical_path: String,
        options: WriteOptions,
        reply: oneshot::Sender<Result<Oid>>,
    },
    DownloadFile {
        remote: String,
        local: PathBuf,
        reply: oneshot::Sender<Result<u64>>,
    },
    ReadBytes {
        remote: String,
        reply: oneshot::Sender<Result<Vec<u8>>>,
    },
    FetchContent {
        remote: String,
        reply: oneshot::Sender<Result<Content>>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

struct ClientActor {
    client: DataClient,
    rx: mpsc::Receiver<ClientCommand>,
}

impl ClientHandle {
    pub async fn connect(config: &ClientConfig) -> Result<Self> {
        let client = DataClient::connect(config).await?;
        Ok(ClientActor::spawn(client))
    }

    pub async fn with_transport(transport: Box<dyn Transport>) -> Result<Self> {
        let client = DataClient::with_transport(transport).await?;
        Ok(ClientActor::spawn(client))
    }

    /// Move an existing client onto its own task.
    pub fn spawn(client: DataClient) -> Self {
        ClientActor::spawn(client)
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<R>>) -> ClientCommand,
    ) -> Result<R> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(build(tx))
            .await
            .map_err(|_| DataError::ClientStopped)?;
        rx.await.map_err(|_| DataError::ClientStopped)?
    }

    pub async fn get_self(&self) -> Result<String> {
        self.request(|reply| ClientCommand::GetSelf { reply }).await
    }

    pub async fn refresh(&self) -> Result<()> {
        self.request(|reply| ClientCommand::Refresh { reply }).await
    }

    pub async fn find(&self, path: &str) -> Result<Option<Oid>> {
        self.request(|reply| ClientCommand::Find {
            path: path.to_string(),
            reply,
        })
        .await
    }

    pub async fn ensure_directory(&self, path: &str, options: &WriteOptions) -> Result<Oid> {
        self.request(|reply| ClientCommand::EnsureDirectory {
            path: path.to_string(),
            options: options.clone(),
            reply,
        })
        .await
    }

    pub async fn create_meta(
        &self,
        target: &str,
        options: &WriteOptions,
        local_hint: Option<&str>,
    ) -> Result<MetadataRecord> {
        self.request(|reply| ClientCommand::CreateMeta {
            target: target.to_string(),
            options: options.clone(),
            local_hint: local_hint.map(str::to_string),
            reply,
        })
        .await
    }

    pub async fn next_part(&self, logical_path: &str, options: &WriteOptions) -> Result<PartTarget> {
        self.request(|reply| ClientCommand::NextPart {
            logical_path: logical_path.to_string(),
            options: options.clone(),
            reply,
        })
        .await
    }

    pub async fn upload_file<P: AsRef<Path>>(
        &self,
        local: P,
        remote: &str,
        options: &WriteOptions,
    ) -> Result<Oid> {
        self.request(|reply| ClientCommand::UploadFile {
            local: local.as_ref().to_path_buf(),
            remote: remote.to_string(),
            options: options.clone(),
            reply,
        })
        .await
    }

    pub async fn upload_bytes(
        &self,
        data: impl Into<Vec<u8>>,
        remote: &str,
        options: &WriteOptions,
    ) -> Result<Oid> {
        self.request(|reply| ClientCommand::UploadBytes {
            data: data.into(),
            remote: remote.to_string(),
            options: options.clone(),
            reply,
        })
        .await
    }

    pub async fn append_file<P: AsRef<Path>>(
        &self,
        local: P,
        logical_path: &str,
        options: &WriteOptions,
    ) -> Result<Oid> {
        self.request(|reply| ClientCommand::AppendFile {
            local: local.as_ref().to_path_buf(),
            logical_path: logical_path.to_string(),
            options: options.clone(),
            reply,
        })
        .await
    }

    pub async fn append_data(
        &self,
        data: impl Into<Vec<u8>>,
        logical_path: &str,
        options: &WriteOptions,
    ) -> Result<Oid> {
        self.request(|reply| ClientCommand::AppendData {
            data: data.into(),
            logical_path: logical_path.to_string(),
            options: options.clone(),
            reply,
        })
        .await
    }

    pub async fn download_file<P: AsRef<Path>>(&self, remote: &str, local: P) -> Result<u64> {
        self.request(|reply| ClientCommand::DownloadFile {
            remote: remote.to_string(),
            local: local.as_ref().to_path_buf(),
            reply,
        })
        .await
    }

    pub async fn read_bytes(&self, remote: &str) -> Result<Vec<u8>> {
        self.request(|reply| ClientCommand::ReadBytes {
            remote: remote.to_string(),
            reply,
        })
        .await
    }

    pub async fn fetch_content(&self, remote: &str) -> Result<Content> {
        self.request(|reply| ClientCommand::FetchContent {
            remote: remote.to_string(),
            reply,
        })
        .await
    }

    /// Stop the worker task once queued commands are done.
    pub async fn shutdown(&self) {
        let (tx, rx) = oneshot::channel();
        let _ = self.tx.send(ClientCommand::Shutdown { reply: tx }).await;
        let _ = rx.await;
    }
}

impl ClientActor {
    fn spawn(client: DataClient) -> ClientHandle {
        let (tx, rx) = mpsc::channel(64);
        let actor = ClientActor { client, rx };
        tokio::spawn(actor.run());
        ClientHandle { tx }
    }

    async fn run(mut self) {
        while let Some(cmd) = self.rx.recv().await {
            if self.handle_command(cmd).await {
                break;
            }
        }
        debug!("client actor stopped");
    }

    async fn handle_command(&mut self, cmd: ClientCommand) -> bool {
        let client = &mut self.client;
        match cmd {
            ClientCommand::GetSelf { reply } => {
                let _ = reply.send(client.get_self().await);
            }
            ClientCommand::Refresh { reply } => {
                let _ = reply.send(client.refresh().await);
            }
            ClientCommand::Find { path, reply } => {
                let _ = reply.send(client.find(&path).await);
            }
            ClientCommand::EnsureDirectory {
                path,
                options,
                reply,
            } => {
                let _ = reply.send(client.ensure_directory(&path, &options).await);
            }
            ClientCommand::CreateMeta {
                target,
                options,
                local_hint,
                reply,
            } => {
                let res = client
                    .create_meta(&target, &options, local_hint.as_deref())
                    .await;
                let _ = reply.send(res);
            }
            ClientCommand::NextPart {
                logical_path,
                options,
                reply,
            } => {
                let _ = reply.send(client.next_part(&logical_path, &options).await);
            }
            ClientCommand::UploadFile {
                local,
                remote,
                options,
                reply,
            } => {
                let _ = reply.send(client.upload_file(&local, &remote, &options).await);
            }
            ClientCommand::UploadBytes {
                data,
                remote,
                options,
                reply,
            } => {
                let _ = reply.send(client.upload_bytes(data, &remote, &options).await);
            }
            ClientCommand::AppendFile {
                local,
                logical_path,
                options,
                reply,
            } => {
                let res = client.append_file(&local, &logical_path, &options).await;
                let _ = reply.send(res);
            }
            ClientCommand::AppendData {
                data,
                logical_path,
                options,
                reply,
            } => {
                let res = client.append_data(data, &logical_path, &options).await;
                let _ = reply.send(res);
            }
            ClientCommand::DownloadFile {
                remote,
                local,
                reply,
            } => {
                let _ = reply.send(client.download_file(&remote, &local).await);
            }
            ClientCommand::ReadBytes { remote, reply } => {
                let _ = reply.send(client.read_bytes(&remote).await);
            }
            ClientCommand::FetchContent { remote, reply } => {
                let _ = reply.send(client.fetch_content(&remote).await);
            }
            ClientCommand::Shutdown { reply } => {
                let _ = reply.send(());
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::testing::FakeStore;
    use futures::future::join_all;
    use serde_json::json;

    #[tokio::test]
    async fn test_concurrent_appends_get_distinct_parts() {
        let store = FakeStore::new(json!({"label": "P0"}));
        let handle = ClientHandle::with_transport(Box::new(store.clone()))
            .await
            .unwrap();

        let options = WriteOptions::default();
        let writes = (0..5).map(|i| {
            let handle = handle.clone();
            let options = options.clone();
            async move {
                handle
                    .append_data(format!("line {}\n", i), "/logs/events", &options)
                    .await
            }
        });
        for result in join_all(writes).await {
            result.unwrap();
        }

        let container = store.oid_of("/logs/events").unwrap();
        assert_eq!(
            store.children(&container),
            vec!["aaa", "aab", "aac", "aad", "aae"]
        );
    }

    #[tokio::test]
    async fn test_concurrent_ensure_creates_once() {
        let store = FakeStore::new(json!({"label": "P0"}));
        let handle = ClientHandle::with_transport(Box::new(store.clone()))
            .await
            .unwrap();

        let options = WriteOptions::default();
        let calls = (0..4).map(|_| handle.ensure_directory("/shared/dir", &options));
        let oids: Vec<Oid> = join_all(calls)
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .collect();

        assert!(oids.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(store.written().len(), 2);
    }

    #[tokio::test]
    async fn test_requests_after_shutdown_fail() {
        let store = FakeStore::new(json!({}));
        let handle = ClientHandle::with_transport(Box::new(store)).await.unwrap();
        assert!(handle.get_self().await.is_ok());

        handle.shutdown().await;
        assert!(matches!(
            handle.find("/x").await,
            Err(DataError::ClientStopped)
        ));
    }
}
