//! Authoritative zone data.
//!
//! A [`ZoneTree`] holds the [`Zone`]s we are authoritative for. Zone
//! content is reached through the [`ZoneStore`] trait, which hands out
//! [`ZoneSnapshot`]s: fixed views of the zone that are unaffected by later
//! changes. The [`in_memory`] module provides a versioned implementation.

mod error;
mod traits;
mod tree;
mod types;
mod zone;

pub mod in_memory;

pub use self::error::{StoreError, ZoneTreeModificationError};
pub use self::traits::{NodeCursor, ZoneSnapshot, ZoneStore};
pub use self::tree::ZoneTree;
pub use self::types::{Rrset, SharedRrset, ZoneKey};
pub use self::zone::Zone;
