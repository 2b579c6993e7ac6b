//! Next-part resolution for append-only multi-part files.
//!
//! The store has no append; a logical file is a directory whose children
//! are immutable parts named `aaa`, `aab`, ... in write order.

use tracing::{debug, warn};

use super::utils::{join_path, normalize_path, parent_path};
use crate::client::DataClient;
use crate::config::WriteOptions;
use crate::error::{DataError, Result};
use crate::fs::node::Oid;
use crate::fs::sequence::{increment, is_part_name, FIRST_PART};

/// Where the next part of a logical file goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartTarget {
    /// Oid of the directory holding the parts.
    pub container: Oid,
    /// Part name, e.g. `aab`.
    pub part: String,
    /// Full path of the part to write.
    pub path: String,
}

impl PartTarget {
    fn new(container_path: &str, container: Oid, part: String) -> Self {
        Self {
            path: join_path(container_path, &part),
            container,
            part,
        }
    }
}

/// Part name a listed file contributes, ignoring any extension.
fn part_stem(name: &str) -> &str {
    name.split('.').next().unwrap_or(name)
}

impl DataClient {
    /// Determine the next part to write for `logical_path`.
    ///
    /// - Unknown path: a directory is created there (with `options` applied
    ///   to it) and the first part is `aaa`.
    /// - Existing file: its parent directory is the container, which keeps
    ///   files written before the multi-part scheme appendable.
    /// - Existing directory: the greatest part name among its file children
    ///   is incremented, or `aaa` if there are none.
    ///
    /// Appends must be serialized per logical path for the names to stay
    /// strictly increasing; [`crate::ClientHandle`] does that.
    pub async fn next_part(&mut self, logical_path: &str, options: &WriteOptions) -> Result<PartTarget> {
        let logical = normalize_path(logical_path);

        let oid = match self.find(&logical).await? {
            Some(oid) => oid,
            None => {
                debug!(path = %logical, "logical file does not exist yet");
                let container = self.create_missing(&logical, options).await?;
                return Ok(PartTarget::new(&logical, container, FIRST_PART.to_string()));
            }
        };

        let props = self.transport.props(&oid).await?;
        let (container_path, container) = if props.is_file() {
            warn!(path = %logical, "logical path is a plain file, appending next to it");
            let parent = props.parent_oid.ok_or_else(|| {
                DataError::InvalidResponse(format!("props for {} carry no parentoid", logical))
            })?;
            (parent_path(&logical), parent)
        } else {
            (logical.clone(), oid)
        };

        let entries = self.transport.list(&container).await?;
        let latest = entries
            .iter()
            .filter(|entry| entry.is_file())
            .map(|entry| part_stem(&entry.name))
            .filter(|stem| is_part_name(stem))
            .max();

        let part = match latest {
            Some(last) => increment(last)?,
            None => FIRST_PART.to_string(),
        };
        debug!(path = %logical, part = %part, "next part");
        Ok(PartTarget::new(&container_path, container, part))
    }
}
