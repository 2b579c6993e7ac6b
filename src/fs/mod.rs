//! Remote tree model: oids, metadata records, the hierarchy cache and the
//! path-based operations built on top of them.

pub mod hierarchy;
pub mod node;
pub(crate) mod operations;
pub mod sequence;
#[cfg(test)]
pub(crate) mod testing;

pub use hierarchy::HierarchyCache;
pub use node::{Action, MetadataRecord, ObjectPolicy, Oid, ROOT_OID};
pub use operations::PartTarget;
