//! GM Data API client and wire types.

pub mod client;
pub mod types;

pub use client::{ApiClient, Transport};
pub use types::{Blob, BlobData, ByteStream, ListEntry, NodeProps, StreamResponse, WriteResult};
