//! Recursive directory creation.

use tracing::{debug, info};

use super::utils::{base_name, normalize_path, parent_path};
use crate::client::DataClient;
use crate::config::WriteOptions;
use crate::error::Result;
use crate::fs::node::{MetadataRecord, Oid};

impl DataClient {
    /// Make sure the directory at `path` exists, creating missing ancestors.
    ///
    /// Ancestors that have to be created inherit policy and security from
    /// their own parent. `options` only applies to the directory at `path`
    /// itself, so a policy can be scoped to one folder without touching the
    /// folders above it.
    ///
    /// Directories created before a failing write are left in place; calling
    /// again picks up where it stopped.
    ///
    /// # Returns
    /// Oid of the directory at `path`
    pub async fn ensure_directory(&mut self, path: &str, options: &WriteOptions) -> Result<Oid> {
        let path = normalize_path(path);
        if let Some(oid) = self.find(&path).await? {
            return Ok(oid);
        }
        self.create_missing(&path, options).await
    }

    /// Create `path` and any missing ancestors.
    ///
    /// The caller must have just missed `path` through [`DataClient::find`],
    /// which leaves the cache freshly populated; ancestors are therefore
    /// checked with plain lookups.
    pub(crate) async fn create_missing(&mut self, path: &str, options: &WriteOptions) -> Result<Oid> {
        let mut missing = vec![path.to_string()];
        let mut current = parent_path(path);
        let mut parent_oid = loop {
            if let Some(oid) = self.hierarchy.lookup(&current) {
                break oid;
            }
            debug!(path = %current, "ancestor missing");
            missing.push(current.clone());
            current = parent_path(&current);
        };

        let inherit = WriteOptions::default();
        while let Some(dir) = missing.pop() {
            let dir_options = if missing.is_empty() { options } else { &inherit };
            parent_oid = self.create_directory(&dir, &parent_oid, dir_options).await?;
        }
        Ok(parent_oid)
    }

    async fn create_directory(
        &mut self,
        path: &str,
        parent_oid: &Oid,
        options: &WriteOptions,
    ) -> Result<Oid> {
        let (object_policy, security) = self
            .inherited_attributes(path, parent_oid, options)
            .await?;

        let record = MetadataRecord::directory(
            base_name(path),
            parent_oid.clone(),
            object_policy,
            security,
        );
        info!(path, parent = %parent_oid, "creating directory");
        let oid = self.write_one(record, None).await?;
        self.hierarchy.record(path, oid.clone());
        Ok(oid)
    }
}
