//! # gmdata
//!
//! Rust client library for the GM Data hierarchical object store.
//!
//! ## Features
//!
//! - **Path addressing**: GM Data only knows numeric object ids (oids); the
//!   client keeps a cached path to oid map and repopulates it on a miss.
//! - **Directory trees**: `ensure_directory` creates missing ancestors
//!   top-down, inheriting object policy and security from each parent.
//! - **Uploads**:
//!   - Create-or-update writes built by `create_meta`.
//!   - Streamed file uploads and in-memory payloads.
//! - **Append-only files**: a logical file is a directory of immutable parts
//!   named `aaa`, `aab`, ... and `append_file` / `append_data` add the next one.
//! - **Downloads**: to disk, into memory, or decoded by content type.
//!
//! Mutating operations take `&mut DataClient`. To share one client between
//! tasks, wrap it in a [`ClientHandle`], which runs it on its own task and
//! handles one command at a time.
//!
//! ## Example
//!
//! ```no_run
//! use gmdata::{ClientConfig, ClientHandle, WriteOptions};
//!
//! # async fn example() -> gmdata::Result<()> {
//! let config = ClientConfig::new("http://localhost:8181").with_identity("CN=alice");
//! let client = ClientHandle::connect(&config).await?;
//!
//! println!("connected as {}", client.get_self().await?);
//!
//! let options = WriteOptions::new().with_policy_text(r#"{"label": "everybody"}"#)?;
//! client.ensure_directory("/world/alice", &options).await?;
//! client.upload_file("notes.txt", "/world/alice/notes.txt", &WriteOptions::default()).await?;
//! client.append_data("started\n", "/world/alice/events.log", &WriteOptions::default()).await?;
//!
//! client.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod content;
pub mod error;
pub mod fs;
pub mod handle;
pub mod http;
pub mod logging;

// Re-export commonly used types
pub use api::{ApiClient, Transport};
pub use client::DataClient;
pub use config::{ClientConfig, WriteOptions};
pub use content::Content;
pub use error::{DataError, Result};
pub use fs::{Action, HierarchyCache, MetadataRecord, ObjectPolicy, Oid, PartTarget};
pub use handle::ClientHandle;
pub use logging::{init_logging, LoggingConfig};
