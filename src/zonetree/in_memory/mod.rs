//! An in-memory backing store for [`Zone`]s.
//!
//! Zone content is versioned: every committed [`WriteZone`] creates a new
//! version, while snapshots opened earlier keep seeing the version they
//! were opened with until they are dropped.
//!
//! [`Zone`]: super::Zone
mod builder;
mod nodes;
mod read;
mod versioned;
mod write;

#[cfg(test)]
mod tests;

pub use builder::{FinalizeError, ZoneBuilder};
pub use nodes::ZoneApex;
pub use read::ReadZone;
pub use versioned::Version;
pub use write::WriteZone;
