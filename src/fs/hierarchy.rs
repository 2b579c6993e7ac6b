//! Path to oid cache mirroring the remote directory tree.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use super::node::Oid;
use super::operations::utils::{join_path, normalize_path};
use crate::api::Transport;
use crate::error::Result;

/// Best-effort mapping from normalized absolute path to oid.
///
/// The store is the source of truth; entries can go stale when the tree is
/// changed elsewhere. A lookup miss is answered by [`HierarchyCache::resolve`]
/// with one full repopulation before the path is declared absent.
#[derive(Debug, Clone, Default)]
pub struct HierarchyCache {
    entries: HashMap<String, Oid>,
}

impl HierarchyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached paths, not counting the root.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached oid for `path`, without touching the network.
    ///
    /// The root path always maps to the root oid.
    pub fn lookup(&self, path: &str) -> Option<Oid> {
        let path = normalize_path(path);
        if path == "/" {
            return Some(Oid::root());
        }
        self.entries.get(&path).cloned()
    }

    /// Insert or overwrite the oid for `path`.
    pub fn record(&mut self, path: &str, oid: Oid) {
        let path = normalize_path(path);
        debug!(path = %path, %oid, "recording hierarchy entry");
        self.entries.insert(path, oid);
    }

    /// Cached paths in no particular order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Walk the remote tree below `root` and replace the cache with it.
    ///
    /// The previous contents are kept if any listing fails.
    ///
    /// # Returns
    /// Number of entries discovered
    pub async fn populate(&mut self, transport: &dyn Transport, root: &Oid) -> Result<usize> {
        let mut entries = HashMap::new();
        let mut visited = HashSet::new();
        let mut pending = vec![("/".to_string(), root.clone())];

        while let Some((dir_path, dir_oid)) = pending.pop() {
            // Guard against cycles in a malformed tree
            if !visited.insert(dir_oid.clone()) {
                warn!(path = %dir_path, oid = %dir_oid, "directory already visited, skipping");
                continue;
            }
            for entry in transport.list(&dir_oid).await? {
                let child_path = join_path(&dir_path, &entry.name);
                if !entry.is_file() {
                    pending.push((child_path.clone(), entry.oid.clone()));
                }
                entries.insert(child_path, entry.oid);
            }
        }

        info!(entries = entries.len(), "hierarchy populated");
        self.entries = entries;
        Ok(self.entries.len())
    }

    /// Cached oid for `path`, repopulating from the root once on a miss.
    ///
    /// # Returns
    /// `None` if the path does not exist yet
    pub async fn resolve(&mut self, transport: &dyn Transport, path: &str) -> Result<Option<Oid>> {
        if let Some(oid) = self.lookup(path) {
            return Ok(Some(oid));
        }

        debug!(path, "hierarchy miss, repopulating");
        self.populate(transport, &Oid::root()).await?;

        let found = self.lookup(path);
        if found.is_none() {
            debug!(path, "not found after repopulation");
        }
        Ok(found)
    }
}
