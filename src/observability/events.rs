//! Observable container events
//!
//! Events are explicit and typed.

use std::fmt;

use super::logger::Severity;

/// Observable events emitted by index containers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Container constructed
    IndexCreated,
    /// Construction rejected (bad key list or unknown field)
    IndexConfigRejected,
    /// Container cleared back to empty
    IndexCleared,

    // Mutations
    /// New member added
    ItemAdded,
    /// Member removed
    ItemRemoved,
    /// Existing member re-indexed against its current values
    ItemReindexed,
    /// Duplicate add ignored
    ItemReaddIgnored,
    /// Bucket dropped after its last member left
    BucketPruned,
}

impl Event {
    /// Returns the event name as logged
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::IndexCreated => "INDEX_CREATED",
            Event::IndexConfigRejected => "INDEX_CONFIG_REJECTED",
            Event::IndexCleared => "INDEX_CLEARED",
            Event::ItemAdded => "ITEM_ADDED",
            Event::ItemRemoved => "ITEM_REMOVED",
            Event::ItemReindexed => "ITEM_REINDEXED",
            Event::ItemReaddIgnored => "ITEM_READD_IGNORED",
            Event::BucketPruned => "BUCKET_PRUNED",
        }
    }

    /// Severity this event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::IndexCreated | Event::IndexCleared => Severity::Info,
            Event::IndexConfigRejected => Severity::Warn,
            Event::ItemAdded
            | Event::ItemRemoved
            | Event::ItemReindexed
            | Event::ItemReaddIgnored
            | Event::BucketPruned => Severity::Trace,
        }
    }

    /// Returns true for per-mutation events
    pub fn is_mutation(&self) -> bool {
        self.severity() == Severity::Trace
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
