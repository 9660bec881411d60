//! Index configuration
//!
//! Lets a host declare indexed attributes by name (e.g. from a JSON file)
//! instead of by typed selector. Names are resolved against the record
//! type once, at construction, so a typo is a configuration error rather
//! than an index that silently returns nothing.

use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use super::errors::{IndexError, IndexResult};
use super::record::FieldName;

/// Declared attribute list plus container options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Attribute names, in key order
    pub fields: Vec<String>,

    /// Emit TRACE events for every add/remove/reindex.
    #[serde(default)]
    pub log_mutations: bool,
}

impl IndexConfig {
    /// Create a config for the given attribute names
    pub fn new<S: Into<String>>(fields: impl IntoIterator<Item = S>) -> Self {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            log_mutations: false,
        }
    }

    /// Enable mutation logging
    pub fn with_mutation_logging(mut self) -> Self {
        self.log_mutations = true;
        self
    }

    /// Parse a config from JSON.
    pub fn from_json(json: &str) -> IndexResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| IndexError::config_invalid(format!("malformed index config: {}", e)))
    }

    /// Validate for a flat collection: at least one field, no duplicates.
    pub fn validate_flat(&self) -> IndexResult<()> {
        if self.fields.is_empty() {
            return Err(IndexError::config_invalid(
                "flat index requires at least one field",
            ));
        }
        check_unique(&self.fields)
    }

    /// Validate for a composite index: no duplicates, empty allowed.
    pub fn validate_composite(&self) -> IndexResult<()> {
        check_unique(&self.fields)
    }

    /// Resolve every configured name to a typed selector.
    pub fn resolve<F: FieldName>(&self) -> IndexResult<Vec<F>> {
        self.fields
            .iter()
            .map(|name| F::from_name(name).ok_or_else(|| IndexError::unknown_field(name.as_str())))
            .collect()
    }
}

/// Reject duplicate entries in a declared key list.
pub(crate) fn check_unique<T: Eq + Hash + Debug>(fields: &[T]) -> IndexResult<()> {
    let mut seen = HashSet::with_capacity(fields.len());
    for field in fields {
        if !seen.insert(field) {
            return Err(IndexError::config_invalid(format!(
                "field {:?} declared more than once",
                field
            )));
        }
    }
    Ok(())
}
