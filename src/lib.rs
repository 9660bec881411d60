//! aeroindex - Deterministic in-memory multi-attribute index containers
//!
//! Store arbitrary records and retrieve subsets by attribute value instead
//! of scanning. See [`index`] for the containers and [`observability`] for
//! log control.

pub mod index;
pub mod observability;

pub use index::{
    CompositeIndex, FieldName, IndexConfig, IndexError, IndexKey, IndexResult, ItemId,
    MultiIndex, Record,
};
