//! GM Data API client and the transport seam the core is written against.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::Body;
use tokio_util::io::ReaderStream;
use tracing::debug;

use super::types::{Blob, BlobData, ListEntry, NodeProps, StreamResponse, WriteResult};
use crate::config::ClientConfig;
use crate::error::{DataError, Result};
use crate::fs::{MetadataRecord, Oid};
use crate::http::HttpClient;

/// Remote calls the path/oid reconciliation core depends on.
///
/// Every call is a single request/response; implementations perform no
/// retries of their own.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Description of the caller's credential token (`GET /self`).
    async fn whoami(&self) -> Result<String>;

    /// Direct children of a directory (`GET /list/{oid}/`).
    async fn list(&self, oid: &Oid) -> Result<Vec<ListEntry>>;

    /// Properties of a single node (`GET /props/{oid}`).
    async fn props(&self, oid: &Oid) -> Result<NodeProps>;

    /// Submit metadata records with an optional payload (`POST /write`).
    ///
    /// Results come back in the order the records were submitted.
    async fn write(&self, records: &[MetadataRecord], blob: Option<Blob>) -> Result<Vec<WriteResult>>;

    /// Raw content of a file (`GET /stream/{oid}`).
    async fn stream(&self, oid: &Oid) -> Result<StreamResponse>;
}

/// HTTP implementation of [`Transport`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: HttpClient,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Arguments
    /// * `base_url` - URL that GM Data lives at
    /// * `identity` - Optional `USER_DN` sent with every request
    pub fn new(base_url: &str, identity: Option<&str>) -> Self {
        Self {
            http: HttpClient::new(base_url, identity),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.base_url, config.identity.as_deref())
    }
}

#[async_trait]
impl Transport for ApiClient {
    async fn whoami(&self) -> Result<String> {
        debug!("GET /self");
        self.http.get_text("/self").await
    }

    async fn list(&self, oid: &Oid) -> Result<Vec<ListEntry>> {
        debug!(%oid, "GET /list");
        self.http.get_json(&format!("/list/{}/", oid)).await
    }

    async fn props(&self, oid: &Oid) -> Result<NodeProps> {
        debug!(%oid, "GET /props");
        self.http.get_json(&format!("/props/{}", oid)).await
    }

    async fn write(&self, records: &[MetadataRecord], blob: Option<Blob>) -> Result<Vec<WriteResult>> {
        let meta = serde_json::to_string(records)?;
        debug!(meta = %meta, has_blob = blob.is_some(), "POST /write");

        let mut form = Form::new().text("meta", meta);
        if let Some(blob) = blob {
            form = form.part("blob", blob_part(blob).await?);
        }

        let body = self.http.post_multipart("/write", form).await?;
        debug!(response = %body, "write response");

        let results: Vec<WriteResult> = serde_json::from_str(&body)?;
        if results.len() != records.len() {
            return Err(DataError::InvalidResponse(format!(
                "write returned {} results for {} records",
                results.len(),
                records.len()
            )));
        }
        Ok(results)
    }

    async fn stream(&self, oid: &Oid) -> Result<StreamResponse> {
        debug!(%oid, "GET /stream");
        let response = self.http.get(&format!("/stream/{}", oid)).await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(DataError::from))
            .boxed();
        Ok(StreamResponse { content_type, body })
    }
}

async fn blob_part(blob: Blob) -> Result<Part> {
    let part = match blob.data {
        BlobData::Bytes(data) => Part::bytes(data),
        BlobData::File(path) => {
            let file = tokio::fs::File::open(&path).await?;
            let len = file.metadata().await?.len();
            Part::stream_with_length(Body::wrap_stream(ReaderStream::new(file)), len)
        }
    };
    Ok(part.file_name(blob.filename).mime_str(&blob.mimetype)?)
}
