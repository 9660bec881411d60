//! Composite (ordered multi-key) index
//!
//! Members are filed in a trie: one level per declared field, in
//! declaration order, ending in a bucket of members that share the exact
//! value tuple. With no declared fields the trie is a single bucket
//! holding every member.
//!
//! # Invariants
//!
//! - Exactly one root-to-bucket path per member
//! - Buckets are never left empty
//! - Branches emptied by a removal are pruned, so an emptied index has
//!   the same shape as a fresh one
//! - `readd` never moves a member

use std::collections::{BTreeMap, HashMap};

use super::bucket::Bucket;
use super::config::{check_unique, IndexConfig};
use super::errors::IndexResult;
use super::key::IndexKey;
use super::record::{FieldName, ItemId, Record};
use super::stats::IndexStats;
use crate::observability::{log_event_with_fields, Event, Logger, Severity};

/// Trie node: a value map for the next field, or a terminal bucket.
#[derive(Debug)]
enum Node {
    Branch(HashMap<IndexKey, Node>),
    Leaf(Bucket),
}

/// What a removal walk did on the way back up.
#[derive(Debug, Default, Clone, Copy)]
struct Removal {
    removed: bool,
    bucket_pruned: bool,
}

impl Node {
    /// Fresh node for a path with `depth` keys still to consume
    fn empty(depth: usize) -> Self {
        if depth == 0 {
            Node::Leaf(Bucket::new())
        } else {
            Node::Branch(HashMap::new())
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Node::Branch(children) => children.is_empty(),
            Node::Leaf(bucket) => bucket.is_empty(),
        }
    }

    fn insert(&mut self, keys: &[IndexKey], id: ItemId) {
        match self {
            Node::Leaf(bucket) => {
                bucket.insert(id);
            }
            Node::Branch(children) => {
                let Some((first, rest)) = keys.split_first() else {
                    return;
                };
                children
                    .entry(first.clone())
                    .or_insert_with(|| Node::empty(rest.len()))
                    .insert(rest, id);
            }
        }
    }

    fn remove(&mut self, keys: &[IndexKey], id: ItemId) -> Removal {
        match self {
            Node::Leaf(bucket) => Removal {
                removed: bucket.remove(id),
                bucket_pruned: false,
            },
            Node::Branch(children) => {
                let Some((first, rest)) = keys.split_first() else {
                    return Removal::default();
                };
                let Some(child) = children.get_mut(first) else {
                    return Removal::default();
                };

                let mut outcome = child.remove(rest, id);
                if child.is_empty() {
                    if matches!(child, Node::Leaf(_)) {
                        outcome.bucket_pruned = true;
                    }
                    children.remove(first);
                }
                outcome
            }
        }
    }

    fn find(&self, keys: &[IndexKey]) -> Option<&Bucket> {
        match self {
            Node::Leaf(bucket) => keys.is_empty().then_some(bucket),
            Node::Branch(children) => {
                let (first, rest) = keys.split_first()?;
                children.get(first)?.find(rest)
            }
        }
    }

    fn count(&self) -> usize {
        match self {
            Node::Leaf(_) => 1,
            Node::Branch(children) => 1 + children.values().map(Node::count).sum::<usize>(),
        }
    }
}

/// A member record plus the tuple it was filed under.
#[derive(Debug)]
struct Entry<R> {
    record: R,
    path: Vec<IndexKey>,
}

/// Exact-match index on an ordered tuple of fields.
#[derive(Debug)]
pub struct CompositeIndex<R: Record> {
    fields: Vec<R::Field>,
    items: BTreeMap<ItemId, Entry<R>>,
    root: Node,
    next_id: u64,
    log_mutations: bool,
    stats: IndexStats,
}

impl<R: Record> CompositeIndex<R> {
    /// Creates an empty index keyed on `fields`, in order.
    ///
    /// An empty list is allowed and yields a single-bucket index.
    /// Duplicate fields are rejected.
    pub fn new(fields: Vec<R::Field>) -> IndexResult<Self> {
        Self::build(fields, false)
    }

    fn build(fields: Vec<R::Field>, log_mutations: bool) -> IndexResult<Self> {
        if let Err(err) = check_unique(&fields) {
            log_event_with_fields(
                Event::IndexConfigRejected,
                &[("kind", "composite"), ("reason", err.message().as_str())],
            );
            return Err(err);
        }

        log_event_with_fields(
            Event::IndexCreated,
            &[
                ("kind", "composite"),
                ("fields", format!("{:?}", fields).as_str()),
            ],
        );

        Ok(Self {
            root: Node::empty(fields.len()),
            fields,
            items: BTreeMap::new(),
            next_id: 0,
            log_mutations,
            stats: IndexStats::new(),
        })
    }

    /// Add a new member, filing it under its current field values.
    pub fn add(&mut self, record: R) -> ItemId {
        let id = ItemId::new(self.next_id);
        self.next_id += 1;

        let path = record.key_tuple(&self.fields);
        self.root.insert(&path, id);
        self.items.insert(id, Entry { record, path });

        self.stats.adds += 1;
        self.trace(Event::ItemAdded, id);
        id
    }

    /// Re-add an existing member: a no-op.
    ///
    /// Unlike `MultiIndex::readd`, this never re-files the member, so a
    /// member mutated through `get_mut` stays reachable only under the
    /// tuple it was added with. Always returns false.
    pub fn readd(&mut self, id: ItemId) -> bool {
        if self.items.contains_key(&id) {
            self.trace(Event::ItemReaddIgnored, id);
        }
        false
    }

    /// Remove a member. No-op returning `None` if `id` is not a member.
    pub fn remove(&mut self, id: ItemId) -> Option<R> {
        let entry = self.items.remove(&id)?;
        let outcome = self.root.remove(&entry.path, id);
        debug_assert!(outcome.removed, "member {} missing from its path", id);

        self.stats.removes += 1;
        if outcome.bucket_pruned {
            self.stats.buckets_pruned += 1;
            self.trace(Event::BucketPruned, id);
        }
        self.trace(Event::ItemRemoved, id);
        Some(entry.record)
    }

    /// Ids of members whose full tuple equals `keys`, in insertion order.
    ///
    /// `keys` must supply one value per declared field; anything else
    /// finds nothing.
    pub fn find_ids(&self, keys: &[IndexKey]) -> Vec<ItemId> {
        if keys.len() != self.fields.len() {
            return Vec::new();
        }
        self.root.find(keys).map(Bucket::to_vec).unwrap_or_default()
    }

    /// Members whose full tuple equals `keys`, in insertion order.
    pub fn find(&self, keys: &[IndexKey]) -> Vec<&R> {
        self.find_ids(keys)
            .into_iter()
            .filter_map(|id| self.get(id))
            .collect()
    }

    /// Members sharing `probe`'s tuple over the declared fields.
    pub fn find_like(&self, probe: &R) -> Vec<&R> {
        self.find(&probe.key_tuple(&self.fields))
    }

    /// Drop every member and reset the trie.
    pub fn clear(&mut self) {
        self.items.clear();
        self.root = Node::empty(self.fields.len());
        self.stats.clears += 1;
        log_event_with_fields(Event::IndexCleared, &[("kind", "composite")]);
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
    /// The member stays filed under the tuple it was added with.
    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut R> {
        self.items.get_mut(&id).map(|entry| &mut entry.record)
    }

    /// Members with their ids, in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (ItemId, &R)> + '_ {
        self.items.iter().map(|(id, entry)| (*id, &entry.record))
    }

    /// Declared fields, in key order
    pub fn fields(&self) -> &[R::Field] {
        &self.fields
    }

    /// Mutation counters
    pub fn stats(&self) -> &IndexStats {
        &self.stats
    }

    /// Number of trie nodes, root included
    pub fn node_count(&self) -> usize {
        self.root.count()
    }

    fn trace(&self, event: Event, id: ItemId) {
        if self.log_mutations && Logger::enabled(Severity::Trace) {
            log_event_with_fields(
                event,
                &[("id", id.to_string().as_str()), ("kind", "composite")],
            );
        }
    }
}

impl<R> CompositeIndex<R>
where
    R: Record,
    R::Field: FieldName,
{
    /// Build from a name-based config, resolving names against `R::Field`.
    pub fn from_config(config: &IndexConfig) -> IndexResult<Self> {
        let fields = config
            .validate_composite()
            .and_then(|_| config.resolve::<R::Field>())
            .inspect_err(|err| {
                log_event_with_fields(
                    Event::IndexConfigRejected,
                    &[("kind", "composite"), ("reason", err.message().as_str())],
                );
            })?;
        Self::build(fields, config.log_mutations)
    }
}
