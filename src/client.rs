//! Client context owning the transport and the hierarchy cache.

use tracing::error;

use crate::api::{ApiClient, Blob, Transport};
use crate::config::ClientConfig;
use crate::error::{DataError, Result};
use crate::fs::{HierarchyCache, MetadataRecord, Oid};

/// GM Data client.
///
/// Path-based operations translate into oid-based calls through the cached
/// hierarchy. Mutating operations take `&mut self`, so one client never runs
/// two structural changes at once; share it between tasks through
/// [`crate::ClientHandle`].
pub struct DataClient {
    pub(crate) transport: Box<dyn Transport>,
    pub(crate) hierarchy: HierarchyCache,
}

impl DataClient {
    /// Connect over HTTP and populate the hierarchy from the root.
    ///
    /// # Example
    /// ```no_run
    /// use gmdata::{ClientConfig, DataClient};
    ///
    /// # async fn example() -> gmdata::Result<()> {
    /// let config = ClientConfig::new("http://localhost:8181").with_identity("CN=alice");
    /// let mut client = DataClient::connect(&config).await?;
    /// if let Some(oid) = client.find("/world/notes.txt").await? {
    ///     println!("notes live at oid {}", oid);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(config: &ClientConfig) -> Result<Self> {
        Self::with_transport(Box::new(ApiClient::from_config(config))).await
    }

    /// Build a client over any transport and populate the hierarchy.
    pub async fn with_transport(transport: Box<dyn Transport>) -> Result<Self> {
        let mut client = Self {
            transport,
            hierarchy: HierarchyCache::new(),
        };
        if let Err(e) = client.refresh().await {
            error!("Could not populate hierarchy, check the base URL: {}", e);
            return Err(e);
        }
        Ok(client)
    }

    /// The cached hierarchy.
    pub fn hierarchy(&self) -> &HierarchyCache {
        &self.hierarchy
    }

    /// Description of the caller's credential token, as returned by `/self`.
    pub async fn get_self(&self) -> Result<String> {
        self.transport.whoami().await
    }

    /// Repopulate the whole hierarchy from the root.
    pub async fn refresh(&mut self) -> Result<()> {
        self.hierarchy
            .populate(self.transport.as_ref(), &Oid::root())
            .await?;
        Ok(())
    }

    /// Find the oid of `path`, repopulating once on a cache miss.
    ///
    /// # Returns
    /// `None` if the path does not exist yet
    pub async fn find(&mut self, path: &str) -> Result<Option<Oid>> {
        self.hierarchy.resolve(self.transport.as_ref(), path).await
    }

    /// Write one record and return the oid the store assigned to it.
    pub(crate) async fn write_one(&self, record: MetadataRecord, blob: Option<Blob>) -> Result<Oid> {
        self.transport
            .write(std::slice::from_ref(&record), blob)
            .await?
            .into_iter()
            .next()
            .map(|result| result.oid)
            .ok_or_else(|| DataError::InvalidResponse("write returned no results".to_string()))
    }
}

impl std::fmt::Debug for DataClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataClient")
            .field("hierarchy", &self.hierarchy)
            .finish_non_exhaustive()
    }
}
