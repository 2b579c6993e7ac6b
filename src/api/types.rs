//! Wire types exchanged with the GM Data REST endpoints.

use std::path::PathBuf;

use bytes::Bytes;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::fs::{ObjectPolicy, Oid};

/// A flag the store marks by presence; an explicit `false` also counts as unset.
fn flag_set(flag: &Option<Value>) -> bool {
    !matches!(flag, None | Some(Value::Bool(false)))
}

/// One child returned by `GET /list/{oid}/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListEntry {
    pub name: String,
    pub oid: Oid,
    /// Absent for directories.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isfile: Option<Value>,
}

impl ListEntry {
    pub fn is_file(&self) -> bool {
        flag_set(&self.isfile)
    }
}

/// Node properties returned by `GET /props/{oid}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeProps {
    #[serde(default)]
    pub oid: Option<Oid>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "parentoid")]
    pub parent_oid: Option<Oid>,
    #[serde(default)]
    pub isfile: Option<Value>,
    #[serde(default, rename = "objectpolicy")]
    pub object_policy: Option<ObjectPolicy>,
    #[serde(default)]
    pub security: Option<String>,
    #[serde(default)]
    pub mimetype: Option<String>,
    /// Every other field the store reported.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NodeProps {
    pub fn is_file(&self) -> bool {
        flag_set(&self.isfile)
    }
}

/// Per-record result of `POST /write`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteResult {
    pub oid: Oid,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Source of a blob's bytes.
#[derive(Debug, Clone)]
pub enum BlobData {
    Bytes(Vec<u8>),
    /// Streamed from a local file at send time.
    File(PathBuf),
}

/// File content attached to a write as the `blob` multipart field.
#[derive(Debug, Clone)]
pub struct Blob {
    pub filename: String,
    pub mimetype: String,
    pub data: BlobData,
}

impl Blob {
    pub fn bytes(filename: impl Into<String>, mimetype: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            mimetype: mimetype.into(),
            data: BlobData::Bytes(data),
        }
    }

    pub fn file(filename: impl Into<String>, mimetype: impl Into<String>, path: PathBuf) -> Self {
        Self {
            filename: filename.into(),
            mimetype: mimetype.into(),
            data: BlobData::File(path),
        }
    }
}

/// Chunked body of a download.
pub type ByteStream = BoxStream<'static, Result<Bytes>>;

/// Response of `GET /stream/{oid}`.
pub struct StreamResponse {
    /// Value of the `Content-Type` header, if the store sent one.
    pub content_type: Option<String>,
    pub body: ByteStream,
}

impl std::fmt::Debug for StreamResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamResponse")
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}
