//! Record identity and attribute access
//!
//! Containers never compare records structurally. A record becomes a member
//! by being moved into a container, which hands back an `ItemId`; that id is
//! the record's identity for as long as it stays a member.

use std::fmt;
use std::hash::Hash;

use super::key::IndexKey;

/// Stable identity handle for a container member.
///
/// Ids are assigned in increasing order and never reused by the container
/// that issued them, so ascending id order is insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId(u64);

impl ItemId {
    pub(crate) fn new(raw: u64) -> Self {
        ItemId(raw)
    }

    /// Returns the raw id value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A record type that can be stored in an index container.
///
/// `Field` enumerates the attributes a container may be keyed on, which
/// keeps invalid keys out at compile time.
///
/// ```ignore
/// #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
/// enum UserField { Id, Name }
///
/// impl Record for User {
///     type Field = UserField;
///     fn key(&self, field: UserField) -> IndexKey {
///         match field {
///             UserField::Id => self.id.into(),
///             UserField::Name => self.name.as_str().into(),
///         }
///     }
/// }
/// ```
pub trait Record {
    /// Attribute selector
    type Field: Copy + Eq + Hash + fmt::Debug;

    /// Current value of `field` on this record
    fn key(&self, field: Self::Field) -> IndexKey;

    /// Values of `fields`, in order
    fn key_tuple(&self, fields: &[Self::Field]) -> Vec<IndexKey> {
        fields.iter().map(|f| self.key(*f)).collect()
    }
}

/// Mapping between attribute selectors and their external names.
///
/// Needed only when a container is built from an `IndexConfig`.
pub trait FieldName: Sized {
    /// Resolve a configured name, `None` if the record has no such attribute
    fn from_name(name: &str) -> Option<Self>;

    /// External name of this attribute
    fn name(&self) -> &'static str;
}
