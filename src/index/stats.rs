//! Passive container counters
//!
//! Counters are observational only and never influence container behavior.

/// Mutation counters for one container instance.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IndexStats {
    /// Number of new members added
    pub adds: u64,
    /// Number of members removed
    pub removes: u64,
    /// Number of existing members re-indexed in place
    pub reindexes: u64,
    /// Number of buckets dropped because they became empty
    pub buckets_pruned: u64,
    /// Number of clear() calls
    pub clears: u64,
}

impl IndexStats {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }
}
