//! In-memory multi-attribute index containers
//!
//! Two independent containers over the same data model:
//!
//! - [`MultiIndex`]: one value -> bucket map per declared field
//! - [`CompositeIndex`]: a trie keyed by an ordered tuple of fields
//!
//! # Design Principles
//!
//! - Identity membership: records are owned by the container and addressed
//!   by [`ItemId`], never compared structurally
//! - Typed keys: fields are `Record::Field` selectors, so an undeclared or
//!   misspelled attribute is a compile error or a construction error
//! - Fail soft: lookups on unknown fields or values return empty results
//! - Single-threaded: no internal locking, callers serialize access
//!
//! # Re-indexing policy
//!
//! `MultiIndex::readd` re-files a member under its current values.
//! `CompositeIndex::readd` is a no-op. The asymmetry is intentional.

mod bucket;
mod composite;
mod config;
mod errors;
mod key;
mod multi;
mod record;
mod stats;

pub use bucket::{AttributeIndex, Bucket};
pub use composite::CompositeIndex;
pub use config::IndexConfig;
pub use errors::{ErrorSeverity, IndexError, IndexErrorCode, IndexResult};
pub use key::IndexKey;
pub use multi::MultiIndex;
pub use record::{FieldName, ItemId, Record};
pub use stats::IndexStats;
