//! Path-based operations split into focused modules.

mod download;
mod meta;
mod parts;
mod tree;
mod upload;
pub(crate) mod utils;

pub use parts::PartTarget;
