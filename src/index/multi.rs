//! Flat multi-index collection
//!
//! Keeps a membership table plus one independent value -> bucket index per
//! declared attribute.
//!
//! # API
//!
//! - `add(record)` - Insert a new member, returns its `ItemId`
//! - `readd(id)` - Re-index an existing member against its current values
//! - `remove(id)` / `remove_by(field, key)` - Drop members
//! - `get_by(field, key)` - Exact match lookup on one attribute
//! - `index_keys(field)` - Distinct values currently indexed
//! - `filter(pred)` - Linear scan in insertion order
//!
//! # Invariants
//!
//! - Every member sits in exactly one bucket per declared field
//! - Buckets are never left empty
//! - Unknown fields and values yield empty results, never errors

use std::collections::{BTreeMap, HashMap};

use super::bucket::AttributeIndex;
use super::config::{check_unique, IndexConfig};
use super::errors::{IndexError, IndexResult};
use super::key::IndexKey;
use super::record::{FieldName, ItemId, Record};
use super::stats::IndexStats;
use crate::observability::{log_event_with_fields, Event, Logger, Severity};

/// A member record plus the keys it is currently indexed under.
#[derive(Debug)]
struct Entry<R> {
    record: R,
    /// One key per declared field, same order as `MultiIndex::fields`
    placement: Vec<IndexKey>,
}

/// Flat multi-index collection over records of type `R`.
#[derive(Debug)]
pub struct MultiIndex<R: Record> {
    /// Declared fields, fixed at construction
    fields: Vec<R::Field>,

    /// Membership table, ascending id = insertion order
    items: BTreeMap<ItemId, Entry<R>>,

    /// Secondary indexes (field -> value -> bucket)
    indexes: HashMap<R::Field, AttributeIndex>,

    next_id: u64,
    log_mutations: bool,
    stats: IndexStats,
}

impl<R: Record> MultiIndex<R> {
    /// Creates an empty collection indexed on `fields`.
    ///
    /// Rejects an empty field list and duplicate fields.
    pub fn new(fields: Vec<R::Field>) -> IndexResult<Self> {
        Self::build(fields, false)
    }

    fn build(fields: Vec<R::Field>, log_mutations: bool) -> IndexResult<Self> {
        let checked = if fields.is_empty() {
            Err(IndexError::config_invalid(
                "flat index requires at least one field",
            ))
        } else {
            check_unique(&fields)
        };
        if let Err(err) = checked {
            log_event_with_fields(
                Event::IndexConfigRejected,
                &[("kind", "flat"), ("reason", err.message().as_str())],
            );
            return Err(err);
        }

        let indexes = fields
            .iter()
            .map(|field| (*field, AttributeIndex::new()))
            .collect();

        log_event_with_fields(
            Event::IndexCreated,
            &[("kind", "flat"), ("fields", format!("{:?}", fields).as_str())],
        );

        Ok(Self {
            fields,
            items: BTreeMap::new(),
            indexes,
            next_id: 0,
            log_mutations,
            stats: IndexStats::new(),
        })
    }

    /// Add a new member. Always succeeds.
    ///
    /// Records are members by identity: adding two records with equal
    /// attribute values yields two distinct members.
    pub fn add(&mut self, record: R) -> ItemId {
        let id = ItemId::new(self.next_id);
        self.next_id += 1;

        let placement = record.key_tuple(&self.fields);
        Self::index_entry(&mut self.indexes, &self.fields, id, &placement);
        self.items.insert(id, Entry { record, placement });

        self.stats.adds += 1;
        self.trace(Event::ItemAdded, id);
        id
    }

    /// Re-add an existing member.
    ///
    /// The member is pulled out of every bucket it currently occupies
    /// (pruning emptied buckets) and re-indexed against its current
    /// attribute values. Returns false if `id` is not a member.
    pub fn readd(&mut self, id: ItemId) -> bool {
        let Some(entry) = self.items.get_mut(&id) else {
            return false;
        };

        let pruned = Self::unindex_entry(&mut self.indexes, &self.fields, id, &entry.placement);
        entry.placement = entry.record.key_tuple(&self.fields);
        Self::index_entry(&mut self.indexes, &self.fields, id, &entry.placement);

        self.stats.reindexes += 1;
        self.note_pruned(pruned);
        self.trace(Event::ItemReindexed, id);
        true
    }

    /// Remove a member. No-op returning `None` if `id` is not a member.
    pub fn remove(&mut self, id: ItemId) -> Option<R> {
        let entry = self.items.remove(&id)?;
        let pruned = Self::unindex_entry(&mut self.indexes, &self.fields, id, &entry.placement);

        self.stats.removes += 1;
        self.note_pruned(pruned);
        self.trace(Event::ItemRemoved, id);
        Some(entry.record)
    }

    /// Remove every member whose `field` equals `key`.
    ///
    /// Goes through `remove` per member so every other field's index is
    /// updated too. Returns the removed records in insertion order.
    pub fn remove_by(&mut self, field: R::Field, key: &IndexKey) -> Vec<R> {
        self.ids_by(field, key)
            .into_iter()
            .filter_map(|id| self.remove(id))
            .collect()
    }

    /// Ids of members whose `field` equals `key`, in insertion order.
    ///
    /// Empty if `field` is not declared or no member has that value.
    pub fn ids_by(&self, field: R::Field, key: &IndexKey) -> Vec<ItemId> {
        self.indexes
            .get(&field)
            .map(|index| index.lookup_eq(key))
            .unwrap_or_default()
    }

    /// Members whose `field` equals `key`, in insertion order.
    pub fn get_by(&self, field: R::Field, key: &IndexKey) -> Vec<&R> {
        let Some(bucket) = self.indexes.get(&field).and_then(|index| index.bucket(key)) else {
            return Vec::new();
        };
        bucket
            .iter()
            .filter_map(|id| self.items.get(&id).map(|entry| &entry.record))
            .collect()
    }

    /// Every distinct value currently indexed for `field`, sorted.
    pub fn index_keys(&self, field: R::Field) -> Vec<IndexKey> {
        self.indexes
            .get(&field)
            .map(AttributeIndex::keys)
            .unwrap_or_default()
    }

    /// Linear scan over all members in insertion order.
    pub fn filter<P>(&self, mut predicate: P) -> Vec<&R>
    where
        P: FnMut(&R) -> bool,
    {
        self.items
            .values()
            .map(|entry| &entry.record)
            .filter(|record| predicate(*record))
            .collect()
    }

    /// Drop every member and every bucket.
    ///
    /// Ids issued before the clear are never reissued.
    pub fn clear(&mut self) {
        self.items.clear();
        for index in self.indexes.values_mut() {
            index.clear();
        }
        self.stats.clears += 1;
        log_event_with_fields(Event::IndexCleared, &[("kind", "flat")]);
    }

    /// Current member count
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if there are no members
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns true if `id` is a current member
    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains_key(&id)
    }

    /// Member record by id
    pub fn get(&self, id: ItemId) -> Option<&R> {
        self.items.get(&id).map(|entry| &entry.record)
    }

    /// Mutable access to a member record.
    ///
    /// Changing an indexed attribute leaves the member filed under its old
    /// values until `readd(id)` is called.
    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut R> {
        self.items.get_mut(&id).map(|entry| &mut entry.record)
    }

    /// Members with their ids, in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (ItemId, &R)> + '_ {
        self.items.iter().map(|(id, entry)| (*id, &entry.record))
    }

    /// Declared fields, in declaration order
    pub fn fields(&self) -> &[R::Field] {
        &self.fields
    }

    /// Mutation counters
    pub fn stats(&self) -> &IndexStats {
        &self.stats
    }

    fn index_entry(
        indexes: &mut HashMap<R::Field, AttributeIndex>,
        fields: &[R::Field],
        id: ItemId,
        placement: &[IndexKey],
    ) {
        for (field, key) in fields.iter().zip(placement) {
            if let Some(index) = indexes.get_mut(field) {
                index.insert(key.clone(), id);
            }
        }
    }

    /// Returns the number of buckets pruned
    fn unindex_entry(
        indexes: &mut HashMap<R::Field, AttributeIndex>,
        fields: &[R::Field],
        id: ItemId,
        placement: &[IndexKey],
    ) -> u64 {
        let mut pruned = 0;
        for (field, key) in fields.iter().zip(placement) {
            if let Some(index) = indexes.get_mut(field) {
                if index.remove(key, id) {
                    pruned += 1;
                }
            }
        }
        pruned
    }

    fn note_pruned(&mut self, pruned: u64) {
        if pruned == 0 {
            return;
        }
        self.stats.buckets_pruned += pruned;
        if self.log_mutations && Logger::enabled(Severity::Trace) {
            log_event_with_fields(Event::BucketPruned, &[("count", pruned.to_string().as_str())]);
        }
    }

    fn trace(&self, event: Event, id: ItemId) {
        if self.log_mutations && Logger::enabled(Severity::Trace) {
            log_event_with_fields(event, &[("id", id.to_string().as_str()), ("kind", "flat")]);
        }
    }
}

impl<R> MultiIndex<R>
where
    R: Record,
    R::Field: FieldName,
{
    /// Build from a name-based config, resolving names against `R::Field`.
    pub fn from_config(config: &IndexConfig) -> IndexResult<Self> {
        let fields = config
            .validate_flat()
            .and_then(|_| config.resolve::<R::Field>())
            .inspect_err(|err| {
                log_event_with_fields(
                    Event::IndexConfigRejected,
                    &[("kind", "flat"), ("reason", err.message().as_str())],
                );
            })?;
        Self::build(fields, config.log_mutations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::errors::IndexErrorCode;
    use crate::observability::capture_logs;

    #[derive(Debug, Clone, PartialEq)]
    struct User {
        id: i64,
        name: String,
        team: Option<String>,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum UserField {
        Id,
        Name,
        Team,
    }

    impl Record for User {
        type Field = UserField;

        fn key(&self, field: UserField) -> IndexKey {
            match field {
                UserField::Id => self.id.into(),
                UserField::Name => self.name.as_str().into(),
                UserField::Team => self.team.as_deref().into(),
            }
        }
    }

    impl FieldName for UserField {
        fn from_name(name: &str) -> Option<Self> {
            match name {
                "id" => Some(UserField::Id),
                "name" => Some(UserField::Name),
                "team" => Some(UserField::Team),
                _ => None,
            }
        }

        fn name(&self) -> &'static str {
            match self {
                UserField::Id => "id",
                UserField::Name => "name",
                UserField::Team => "team",
            }
        }
    }

    fn user(id: i64, name: &str) -> User {
        User {
            id,
            name: name.to_string(),
            team: None,
        }
    }

    fn users() -> MultiIndex<User> {
        MultiIndex::new(vec![UserField::Id, UserField::Name]).unwrap()
    }

    #[test]
    fn test_add_and_get_by() {
        let mut index = users();
        index.add(user(1, "Alice"));

        let found = index.get_by(UserField::Id, &IndexKey::from_int(1));
        assert_eq!(found, vec![&user(1, "Alice")]);
        assert_eq!(
            index.get_by(UserField::Id, &IndexKey::from(1.0f64)),
            vec![&user(1, "Alice")]
        );
        assert!(index
            .get_by(UserField::Name, &IndexKey::from_string("Bob"))
            .is_empty());

        index.remove_by(UserField::Name, &IndexKey::from_string("Alice"));
        assert_eq!(index.len(), 0);
    }

    #[test]
    fn test_equal_records_are_distinct_members() {
        let mut index = users();
        let a = index.add(user(1, "Alice"));
        let b = index.add(user(1, "Alice"));

        assert_ne!(a, b);
        assert_eq!(index.len(), 2);
        assert_eq!(index.ids_by(UserField::Id, &IndexKey::from_int(1)), vec![a, b]);

        index.remove(a);
        assert_eq!(index.ids_by(UserField::Id, &IndexKey::from_int(1)), vec![b]);
    }

    #[test]
    fn test_undeclared_field_is_empty() {
        let mut index = users();
        let mut u = user(1, "Alice");
        u.team = Some("core".to_string());
        index.add(u);

        assert!(index
            .get_by(UserField::Team, &IndexKey::from_string("core"))
            .is_empty());
        assert!(index.index_keys(UserField::Team).is_empty());
        assert!(index
            .remove_by(UserField::Team, &IndexKey::from_string("core"))
            .is_empty());
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_remove_non_member_is_noop() {
        let mut index = users();
        let id = index.add(user(1, "Alice"));
        assert!(index.remove(id).is_some());

        assert!(index.remove(id).is_none());
        assert_eq!(index.len(), 0);
        assert_eq!(index.stats().removes, 1);
    }

    #[test]
    fn test_remove_prunes_buckets() {
        let mut index = users();
        let a = index.add(user(1, "Alice"));
        index.add(user(2, "Alice"));

        index.remove(a);
        assert_eq!(index.index_keys(UserField::Id), vec![IndexKey::from_int(2)]);
        assert_eq!(
            index.index_keys(UserField::Name),
            vec![IndexKey::from_string("Alice")]
        );
        assert_eq!(index.stats().buckets_pruned, 1);
    }

    #[test]
    fn test_readd_reindexes_after_mutation() {
        let mut index = users();
        let id = index.add(user(1, "Alice"));

        index.get_mut(id).unwrap().name = "Alicia".to_string();

        // Stale until re-added
        assert_eq!(
            index.ids_by(UserField::Name, &IndexKey::from_string("Alice")),
            vec![id]
        );

        assert!(index.readd(id));
        assert!(index
            .get_by(UserField::Name, &IndexKey::from_string("Alice"))
            .is_empty());
        assert_eq!(
            index.ids_by(UserField::Name, &IndexKey::from_string("Alicia")),
            vec![id]
        );
        assert_eq!(
            index.index_keys(UserField::Name),
            vec![IndexKey::from_string("Alicia")]
        );
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_readd_non_member() {
        let mut index = users();
        let id = index.add(user(1, "Alice"));
        index.remove(id);
        assert!(!index.readd(id));
    }

    #[test]
    fn test_remove_after_mutation_without_readd() {
        let mut index = users();
        let id = index.add(user(1, "Alice"));
        index.get_mut(id).unwrap().id = 99;

        let removed = index.remove(id).unwrap();
        assert_eq!(removed.id, 99);
        assert!(index.index_keys(UserField::Id).is_empty());
        assert!(index.index_keys(UserField::Name).is_empty());
    }

    #[test]
    fn test_filter_insertion_order() {
        let mut index = users();
        index.add(user(3, "Carol"));
        index.add(user(1, "Alice"));
        index.add(user(2, "Bob"));

        let names: Vec<_> = index
            .filter(|u| u.id != 1)
            .into_iter()
            .map(|u| u.name.as_str())
            .collect();
        assert_eq!(names, vec!["Carol", "Bob"]);
        assert_eq!(index.filter(|_| true).len(), index.len());
    }

    #[test]
    fn test_clear() {
        let mut index = users();
        let old = index.add(user(1, "Alice"));
        index.add(user(2, "Bob"));

        index.clear();
        assert!(index.is_empty());
        assert!(index.index_keys(UserField::Id).is_empty());
        assert!(!index.contains(old));

        let new = index.add(user(1, "Alice"));
        assert_ne!(old, new);
        assert_eq!(index.stats().clears, 1);
    }

    #[test]
    fn test_constructor_rejects_bad_fields() {
        let err = MultiIndex::<User>::new(vec![]).unwrap_err();
        assert_eq!(err.code(), IndexErrorCode::IndexConfigInvalid);

        let err = MultiIndex::<User>::new(vec![UserField::Id, UserField::Id]).unwrap_err();
        assert_eq!(err.code(), IndexErrorCode::IndexConfigInvalid);
    }

    #[test]
    fn test_from_config() {
        let config = IndexConfig::from_json(r#"{"fields": ["team"], "log_mutations": true}"#)
            .unwrap();
        let mut index = MultiIndex::<User>::from_config(&config).unwrap();
        assert_eq!(index.fields(), &[UserField::Team]);

        let id = index.add(user(1, "Alice"));
        assert_eq!(index.ids_by(UserField::Team, &IndexKey::Absent), vec![id]);

        let err = MultiIndex::<User>::from_config(&IndexConfig::new(["id", "email"]))
            .unwrap_err();
        assert_eq!(err.code(), IndexErrorCode::IndexUnknownField);
    }

    fn event_names(lines: &[serde_json::Value]) -> Vec<&str> {
        lines.iter().filter_map(|line| line["event"].as_str()).collect()
    }

    fn rename_cycle(index: &mut MultiIndex<User>) {
        let id = index.add(user(1, "Alice"));
        index.get_mut(id).unwrap().name = "Alicia".to_string();
        index.readd(id);
        index.remove(id);
    }

    #[test]
    fn test_mutation_events_logged_at_trace() {
        let config = IndexConfig::new(["id", "name"]).with_mutation_logging();
        let lines = capture_logs(Severity::Trace, || {
            let mut index = MultiIndex::<User>::from_config(&config).unwrap();
            rename_cycle(&mut index);
        });

        assert_eq!(
            event_names(&lines),
            vec![
                "INDEX_CREATED",
                "ITEM_ADDED",
                "BUCKET_PRUNED",
                "ITEM_REINDEXED",
                "BUCKET_PRUNED",
                "ITEM_REMOVED",
            ]
        );
        // Re-index empties both the id=1 and name=Alice buckets
        assert_eq!(lines[2]["count"], "2");
        assert_eq!(lines[1]["id"], "#0");
        assert_eq!(lines[1]["severity"], "TRACE");
    }

    #[test]
    fn test_mutation_events_silent_without_flag() {
        let lines = capture_logs(Severity::Trace, || {
            let mut index = users();
            rename_cycle(&mut index);
        });

        assert_eq!(event_names(&lines), vec!["INDEX_CREATED"]);
    }

    #[test]
    fn test_mutation_events_filtered_by_threshold() {
        let config = IndexConfig::new(["id"]).with_mutation_logging();
        let lines = capture_logs(Severity::Info, || {
            let mut index = MultiIndex::<User>::from_config(&config).unwrap();
            rename_cycle(&mut index);
            index.clear();
        });

        assert_eq!(event_names(&lines), vec!["INDEX_CREATED", "INDEX_CLEARED"]);
    }
}
