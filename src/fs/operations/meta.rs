//! Metadata construction for writes: create vs. update, and inheritance.

use serde_json::Map;
use tracing::debug;

use super::utils::{base_name, guess_mimetype, normalize_path, parent_path, DEFAULT_MIMETYPE};
use crate::api::NodeProps;
use crate::client::DataClient;
use crate::config::WriteOptions;
use crate::error::{DataError, Result};
use crate::fs::node::{Action, MetadataRecord, ObjectPolicy, Oid};

impl DataClient {
    /// Build the metadata record for writing to `target`.
    ///
    /// If `target` exists the record updates it: the node's current props are
    /// kept and the supplied policy, security and mimetype are laid over them.
    /// Otherwise the record creates a new file under the target's parent,
    /// creating the parent directory if needed, and inherits policy and
    /// security from that parent unless supplied.
    ///
    /// # Arguments
    /// * `target` - Destination path in GM Data
    /// * `options` - Explicit policy, security and mimetype
    /// * `local_hint` - Local filename used to guess the mimetype of a new file
    pub async fn create_meta(
        &mut self,
        target: &str,
        options: &WriteOptions,
        local_hint: Option<&str>,
    ) -> Result<MetadataRecord> {
        let target = normalize_path(target);
        if target == "/" {
            return Err(DataError::InvalidPath(target));
        }

        if let Some(oid) = self.find(&target).await? {
            debug!(path = %target, %oid, "found existing object, updating");
            let props = self.transport.props(&oid).await?;
            return update_record(props, &target, options);
        }

        let parent = parent_path(&target);
        let parent_oid = match self.hierarchy.lookup(&parent) {
            Some(oid) => oid,
            None => {
                let dir_options = WriteOptions {
                    object_policy: options.object_policy.clone(),
                    ..WriteOptions::default()
                };
                self.create_missing(&parent, &dir_options).await?
            }
        };
        debug!(path = %target, parent = %parent_oid, "creating new object");

        let mimetype = options
            .mimetype
            .clone()
            .or_else(|| local_hint.and_then(guess_mimetype))
            .or_else(|| guess_mimetype(&target))
            .unwrap_or_else(|| DEFAULT_MIMETYPE.to_string());

        let (object_policy, security) = self
            .inherited_attributes(&target, &parent_oid, options)
            .await?;

        Ok(MetadataRecord::new_file(
            base_name(&target),
            parent_oid,
            object_policy,
            mimetype,
            security,
        ))
    }

    /// Policy and security for a new child of `parent_oid`.
    ///
    /// Supplied values win. The parent's props are only fetched when
    /// something has to be inherited.
    pub(crate) async fn inherited_attributes(
        &self,
        path: &str,
        parent_oid: &Oid,
        options: &WriteOptions,
    ) -> Result<(ObjectPolicy, Option<String>)> {
        if let (Some(policy), Some(security)) = (&options.object_policy, &options.security) {
            return Ok((policy.clone(), Some(security.clone())));
        }

        let parent = self.transport.props(parent_oid).await?;
        let object_policy = match &options.object_policy {
            Some(policy) => policy.clone(),
            None => {
                debug!(path, parent = %parent_oid, "inheriting object policy");
                parent
                    .object_policy
                    .ok_or_else(|| DataError::PolicyResolution(path.to_string()))?
            }
        };
        let security = options.security.clone().or(parent.security);
        Ok((object_policy, security))
    }
}

fn update_record(props: NodeProps, target: &str, options: &WriteOptions) -> Result<MetadataRecord> {
    let is_file = props.is_file();
    let parent_oid = props.parent_oid.ok_or_else(|| {
        DataError::InvalidResponse(format!("props for {} carry no parentoid", target))
    })?;
    let object_policy = options
        .object_policy
        .clone()
        .or(props.object_policy)
        .ok_or_else(|| DataError::PolicyResolution(target.to_string()))?;

    let mut extra = props.extra;
    if let Some(oid) = props.oid {
        extra.insert("oid".to_string(), serde_json::Value::String(oid.to_string()));
    }

    Ok(MetadataRecord {
        action: Action::Update,
        name: props.name.unwrap_or_else(|| base_name(target).to_string()),
        parent_oid,
        is_file,
        object_policy,
        mimetype: options.mimetype.clone().or(props.mimetype),
        security: options.security.clone().or(props.security),
        extra: Map::new(),
    }
    .with_extra(extra))
}
