//! Node identifiers, policies and the metadata record sent with every write.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{DataError, Result};

/// Object ID of the root directory.
pub const ROOT_OID: &str = "1";

/// Opaque object identifier assigned by the store.
///
/// The store hands these out as either JSON strings or integers; both
/// normalize to the same textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Oid(String);

impl Oid {
    pub fn new(oid: impl Into<String>) -> Self {
        Self(oid.into())
    }

    /// The root directory's oid.
    pub fn root() -> Self {
        Self(ROOT_OID.to_string())
    }

    pub fn is_root(&self) -> bool {
        self.0 == ROOT_OID
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Oid {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<u64> for Oid {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl<'de> Deserialize<'de> for Oid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawOid {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match RawOid::deserialize(deserializer)? {
            RawOid::Text(s) => Oid(s),
            RawOid::Number(n) => Oid(n.to_string()),
        })
    }
}

/// Access-control structure attached to a node.
///
/// Opaque to this client: it is read from a parent or an existing node and
/// passed through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectPolicy(Value);

impl ObjectPolicy {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for ObjectPolicy {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Policies given as structured text are parsed as JSON.
impl FromStr for ObjectPolicy {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self(serde_json::from_str(s)?))
    }
}

/// Write action understood by `/write`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    #[serde(rename = "C")]
    Create,
    #[serde(rename = "U")]
    Update,
}

/// One metadata record, built fresh for a single write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub action: Action,
    pub name: String,
    #[serde(rename = "parentoid")]
    pub parent_oid: Oid,
    #[serde(rename = "isFile")]
    pub is_file: bool,
    #[serde(rename = "objectpolicy")]
    pub object_policy: ObjectPolicy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mimetype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<String>,
    /// Fields carried over from an existing node's props on update.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Keys [`MetadataRecord`] serializes itself; never allowed in `extra`.
pub const RECORD_KEYS: &[&str] = &[
    "action",
    "name",
    "parentoid",
    "isFile",
    "objectpolicy",
    "mimetype",
    "security",
];

impl MetadataRecord {
    /// Carry `fields` over into the record.
    ///
    /// Keys the record writes itself are dropped, otherwise the stale value
    /// would be serialized a second time next to the real one.
    pub fn with_extra(mut self, mut fields: Map<String, Value>) -> Self {
        for key in RECORD_KEYS {
            fields.remove(*key);
        }
        self.extra.extend(fields);
        self
    }

    /// Record asserting a directory under `parent_oid`.
    ///
    /// Directory writes always use [`Action::Update`]; the store treats them
    /// as an upsert.
    pub fn directory(
        name: impl Into<String>,
        parent_oid: Oid,
        object_policy: ObjectPolicy,
        security: Option<String>,
    ) -> Self {
        Self {
            action: Action::Update,
            name: name.into(),
            parent_oid,
            is_file: false,
            object_policy,
            mimetype: None,
            security,
            extra: Map::new(),
        }
    }

    /// Record creating a new file under `parent_oid`.
    pub fn new_file(
        name: impl Into<String>,
        parent_oid: Oid,
        object_policy: ObjectPolicy,
        mimetype: impl Into<String>,
        security: Option<String>,
    ) -> Self {
        Self {
            action: Action::Create,
            name: name.into(),
            parent_oid,
            is_file: true,
            object_policy,
            mimetype: Some(mimetype.into()),
            security,
            extra: Map::new(),
        }
    }
}
