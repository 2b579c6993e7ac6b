//! In-memory store used by the unit tests in place of a GM Data server.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;
use serde_json::{json, Value};

use crate::api::{Blob, BlobData, ListEntry, NodeProps, StreamResponse, Transport, WriteResult};
use crate::error::{DataError, Result};
use crate::fs::node::{Action, MetadataRecord, ObjectPolicy, Oid, ROOT_OID};

/// Chunk size of streamed content; small so tests see several chunks.
const CHUNK: usize = 4;

#[derive(Debug, Clone)]
pub(crate) struct FakeNode {
    pub name: String,
    pub parent: Option<Oid>,
    pub is_file: bool,
    pub object_policy: Option<ObjectPolicy>,
    pub security: Option<String>,
    pub mimetype: Option<String>,
    pub content: Vec<u8>,
    pub children: Vec<Oid>,
    /// Last action applied, echoed back by `props` like the real store does.
    pub action: Action,
    pub tstamp: String,
}

/// Number of transport calls made, per endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct CallCounts {
    pub whoami: usize,
    pub list: usize,
    pub props: usize,
    pub write: usize,
    pub stream: usize,
}

#[derive(Debug)]
struct State {
    nodes: BTreeMap<String, FakeNode>,
    next_oid: u64,
    clock: u64,
    calls: CallCounts,
    written: Vec<MetadataRecord>,
    fail_lists: bool,
    writes_left: usize,
}

impl State {
    fn node(&self, oid: &Oid) -> Result<&FakeNode> {
        self.nodes
            .get(oid.as_str())
            .ok_or_else(|| DataError::HttpError(404))
    }

    fn child_named(&self, parent: &Oid, name: &str) -> Option<Oid> {
        let parent = self.nodes.get(parent.as_str())?;
        parent
            .children
            .iter()
            .find(|oid| self.nodes[oid.as_str()].name == name)
            .cloned()
    }

    fn tick(&mut self) -> String {
        self.clock += 1;
        format!("{:x}", 0x16a0 + self.clock)
    }

    fn insert(&mut self, parent: &Oid, mut node: FakeNode) -> Oid {
        node.tstamp = self.tick();
        let oid = Oid::from(self.next_oid);
        self.next_oid += 1;
        self.nodes
            .get_mut(parent.as_str())
            .expect("parent node exists")
            .children
            .push(oid.clone());
        self.nodes.insert(oid.to_string(), node);
        oid
    }
}

/// Shared handle to an in-memory tree; clones see the same state.
#[derive(Debug, Clone)]
pub(crate) struct FakeStore {
    state: Arc<Mutex<State>>,
}

impl FakeStore {
    /// Empty tree whose root carries `root_policy`.
    pub fn new(root_policy: Value) -> Self {
        Self::build(Some(ObjectPolicy::new(root_policy)), None)
    }

    pub fn with_security(root_policy: Value, security: &str) -> Self {
        Self::build(Some(ObjectPolicy::new(root_policy)), Some(security.to_string()))
    }

    /// Root without an object policy, so nothing can be inherited.
    pub fn without_policy() -> Self {
        Self::build(None, None)
    }

    fn build(object_policy: Option<ObjectPolicy>, security: Option<String>) -> Self {
        let root = FakeNode {
            name: String::new(),
            parent: None,
            is_file: false,
            object_policy,
            security,
            mimetype: None,
            content: Vec::new(),
            children: Vec::new(),
            action: Action::Create,
            tstamp: String::new(),
        };
        let mut nodes = BTreeMap::new();
        nodes.insert(ROOT_OID.to_string(), root);
        Self {
            state: Arc::new(Mutex::new(State {
                nodes,
                next_oid: 100,
                clock: 0,
                calls: CallCounts::default(),
                written: Vec::new(),
                fail_lists: false,
                writes_left: usize::MAX,
            })),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().expect("fake store lock poisoned")
    }

    pub fn add_dir(&self, parent: &Oid, name: &str) -> Oid {
        self.add_node(parent, name, false, None, None, &[])
    }

    pub fn add_dir_with_policy(
        &self,
        parent: &Oid,
        name: &str,
        policy: Value,
        security: Option<&str>,
    ) -> Oid {
        self.add_node(
            parent,
            name,
            false,
            Some(ObjectPolicy::new(policy)),
            security.map(str::to_string),
            &[],
        )
    }

    pub fn add_file(&self, parent: &Oid, name: &str, content: &[u8]) -> Oid {
        self.add_node(parent, name, true, None, None, content)
    }

    pub fn add_file_with(
        &self,
        parent: &Oid,
        name: &str,
        content: &[u8],
        policy: Value,
        security: &str,
    ) -> Oid {
        self.add_node(
            parent,
            name,
            true,
            Some(ObjectPolicy::new(policy)),
            Some(security.to_string()),
            content,
        )
    }

    fn add_node(
        &self,
        parent: &Oid,
        name: &str,
        is_file: bool,
        object_policy: Option<ObjectPolicy>,
        security: Option<String>,
        content: &[u8],
    ) -> Oid {
        let node = FakeNode {
            name: name.to_string(),
            parent: Some(parent.clone()),
            is_file,
            object_policy,
            security,
            mimetype: None,
            content: content.to_vec(),
            children: Vec::new(),
            action: Action::Create,
            tstamp: String::new(),
        };
        self.lock().insert(parent, node)
    }

    /// Oid at `path`, walking the stored tree directly.
    pub fn oid_of(&self, path: &str) -> Option<Oid> {
        let state = self.lock();
        let mut current = Oid::root();
        for name in path.split('/').filter(|s| !s.is_empty()) {
            current = state.child_named(&current, name)?;
        }
        Some(current)
    }

    pub fn node(&self, oid: &Oid) -> FakeNode {
        self.lock().nodes[oid.as_str()].clone()
    }

    /// Child names of `oid` in creation order.
    pub fn children(&self, oid: &Oid) -> Vec<String> {
        let state = self.lock();
        state.nodes[oid.as_str()]
            .children
            .iter()
            .map(|child| state.nodes[child.as_str()].name.clone())
            .collect()
    }

    pub fn calls(&self) -> CallCounts {
        self.lock().calls.clone()
    }

    /// Records accepted by successful writes, in order.
    pub fn written(&self) -> Vec<MetadataRecord> {
        self.lock().written.clone()
    }

    /// Make every listing fail with 503.
    pub fn fail_lists(&self, fail: bool) {
        self.lock().fail_lists = fail;
    }

    /// Accept `count` more writes, then fail each with 500.
    pub fn fail_writes_after(&self, count: usize) {
        self.lock().writes_left = count;
    }
}

async fn blob_content(blob: Blob) -> Result<Vec<u8>> {
    match blob.data {
        BlobData::Bytes(bytes) => Ok(bytes),
        BlobData::File(path) => Ok(tokio::fs::read(path).await?),
    }
}

#[async_trait]
impl Transport for FakeStore {
    async fn whoami(&self) -> Result<String> {
        self.lock().calls.whoami += 1;
        Ok(json!({"label": "fake", "values": {"email": ["tester@example.com"]}}).to_string())
    }

    async fn list(&self, oid: &Oid) -> Result<Vec<ListEntry>> {
        let mut state = self.lock();
        state.calls.list += 1;
        if state.fail_lists {
            return Err(DataError::HttpError(503));
        }
        let node = state.node(oid)?;
        Ok(node
            .children
            .iter()
            .map(|child| {
                let child_node = &state.nodes[child.as_str()];
                ListEntry {
                    name: child_node.name.clone(),
                    oid: child.clone(),
                    isfile: child_node.is_file.then_some(Value::Bool(true)),
                }
            })
            .collect())
    }

    async fn props(&self, oid: &Oid) -> Result<NodeProps> {
        let mut state = self.lock();
        state.calls.props += 1;
        let node = state.node(oid)?;
        Ok(NodeProps {
            oid: Some(oid.clone()),
            name: Some(node.name.clone()),
            parent_oid: node.parent.clone(),
            isfile: node.is_file.then_some(Value::Bool(true)),
            object_policy: node.object_policy.clone(),
            security: node.security.clone(),
            mimetype: node.mimetype.clone(),
            extra: json!({
                "action": node.action,
                "isFile": node.is_file,
                "tstamp": node.tstamp,
                "size": node.content.len(),
            })
            .as_object()
            .cloned()
            .unwrap_or_default(),
        })
    }

    async fn write(&self, records: &[MetadataRecord], blob: Option<Blob>) -> Result<Vec<WriteResult>> {
        let content = match blob {
            Some(blob) => Some(blob_content(blob).await?),
            None => None,
        };

        let mut state = self.lock();
        state.calls.write += 1;
        if state.writes_left == 0 {
            return Err(DataError::HttpError(500));
        }
        state.writes_left -= 1;

        let mut results = Vec::with_capacity(records.len());
        for record in records {
            state.node(&record.parent_oid)?;
            let existing = state.child_named(&record.parent_oid, &record.name);
            let oid = match (record.action, existing) {
                (Action::Create, Some(_)) => return Err(DataError::HttpError(409)),
                (Action::Update, Some(oid)) => {
                    let tstamp = state.tick();
                    let node = state.nodes.get_mut(oid.as_str()).expect("listed child exists");
                    node.object_policy = Some(record.object_policy.clone());
                    node.security = record.security.clone();
                    node.mimetype = record.mimetype.clone();
                    node.action = Action::Update;
                    node.tstamp = tstamp;
                    if let Some(content) = &content {
                        node.content = content.clone();
                    }
                    oid
                }
                (_, None) => {
                    let node = FakeNode {
                        name: record.name.clone(),
                        parent: Some(record.parent_oid.clone()),
                        is_file: record.is_file,
                        object_policy: Some(record.object_policy.clone()),
                        security: record.security.clone(),
                        mimetype: record.mimetype.clone(),
                        content: content.clone().unwrap_or_default(),
                        children: Vec::new(),
                        action: record.action,
                        tstamp: String::new(),
                    };
                    state.insert(&record.parent_oid, node)
                }
            };
            state.written.push(record.clone());
            results.push(WriteResult {
                oid,
                extra: Default::default(),
            });
        }
        Ok(results)
    }

    async fn stream(&self, oid: &Oid) -> Result<StreamResponse> {
        let mut state = self.lock();
        state.calls.stream += 1;
        let node = state.node(oid)?;
        if !node.is_file {
            return Err(DataError::HttpError(400));
        }
        let chunks: Vec<Result<Bytes>> = node
            .content
            .chunks(CHUNK)
            .map(|chunk| Ok(Bytes::copy_from_slice(chunk)))
            .collect();
        Ok(StreamResponse {
            content_type: node.mimetype.clone(),
            body: Box::pin(stream::iter(chunks)),
        })
    }
}
