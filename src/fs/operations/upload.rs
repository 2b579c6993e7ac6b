//! Upload and append operations.

use std::path::Path;

use tracing::{debug, info};

use super::utils::{base_name, guess_mimetype, normalize_path, DEFAULT_MIMETYPE};
use crate::api::Blob;
use crate::client::DataClient;
use crate::config::WriteOptions;
use crate::error::{DataError, Result};
use crate::fs::node::{MetadataRecord, Oid};

impl DataClient {
    /// Upload a local file to `remote_path`.
    ///
    /// Updates the object if it already exists, otherwise creates it (and
    /// any missing parent directories). The file is streamed, not buffered.
    ///
    /// # Example
    /// ```no_run
    /// use gmdata::{ClientConfig, DataClient, WriteOptions};
    ///
    /// # async fn example() -> gmdata::Result<()> {
    /// let mut client = DataClient::connect(&ClientConfig::new("http://localhost:8181")).await?;
    /// let oid = client
    ///     .upload_file("report.csv", "/reports/2024/report.csv", &WriteOptions::default())
    ///     .await?;
    /// println!("uploaded as {}", oid);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn upload_file<P: AsRef<Path>>(
        &mut self,
        local_path: P,
        remote_path: &str,
        options: &WriteOptions,
    ) -> Result<Oid> {
        let local = local_path.as_ref();
        let metadata = tokio::fs::metadata(local).await?;
        if !metadata.is_file() {
            return Err(DataError::InvalidPath(local.display().to_string()));
        }
        let filename = local
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| DataError::InvalidPath(local.display().to_string()))?;

        debug!(local = %local.display(), remote = remote_path, "uploading file");
        let hint = local.to_string_lossy().into_owned();
        let record = self.create_meta(remote_path, options, Some(hint.as_str())).await?;

        let mimetype = blob_mimetype(&record, &filename);
        let blob = Blob::file(filename, mimetype, local.to_path_buf());
        self.write_and_record(remote_path, record, blob).await
    }

    /// Upload an in-memory payload to `remote_path`.
    pub async fn upload_bytes(
        &mut self,
        data: impl Into<Vec<u8>>,
        remote_path: &str,
        options: &WriteOptions,
    ) -> Result<Oid> {
        let record = self.create_meta(remote_path, options, None).await?;
        let remote = normalize_path(remote_path);
        let filename = base_name(&remote).to_string();
        let mimetype = blob_mimetype(&record, &filename);
        let blob = Blob::bytes(filename, mimetype, data.into());
        self.write_and_record(&remote, record, blob).await
    }

    /// Append a local file to a logical multi-part file.
    pub async fn append_file<P: AsRef<Path>>(
        &mut self,
        local_path: P,
        logical_path: &str,
        options: &WriteOptions,
    ) -> Result<Oid> {
        let target = self.next_part(logical_path, options).await?;
        info!(logical = logical_path, part = %target.part, "appending file");
        self.upload_file(local_path, &target.path, options).await
    }

    /// Append in-memory data to a logical multi-part file.
    ///
    /// The part's mimetype is guessed from the logical path unless given.
    pub async fn append_data(
        &mut self,
        data: impl Into<Vec<u8>>,
        logical_path: &str,
        options: &WriteOptions,
    ) -> Result<Oid> {
        let target = self.next_part(logical_path, options).await?;
        info!(logical = logical_path, part = %target.part, "appending data");

        let mut part_options = options.clone();
        if part_options.mimetype.is_none() {
            part_options.mimetype = guess_mimetype(logical_path);
        }
        self.upload_bytes(data, &target.path, &part_options).await
    }

    async fn write_and_record(
        &mut self,
        remote_path: &str,
        record: MetadataRecord,
        blob: Blob,
    ) -> Result<Oid> {
        let oid = self.write_one(record, Some(blob)).await?;
        info!(path = remote_path, %oid, "write complete");
        self.hierarchy.record(remote_path, oid.clone());
        Ok(oid)
    }
}

fn blob_mimetype(record: &MetadataRecord, filename: &str) -> String {
    record
        .mimetype
        .clone()
        .or_else(|| guess_mimetype(filename))
        .unwrap_or_else(|| DEFAULT_MIMETYPE.to_string())
}
