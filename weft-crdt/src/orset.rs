//! Observed-Remove Set (OR-Set / Add-Wins Set).
//!
//! Every add stamps a unique tag; a remove names exactly the tags the
//! remover has observed. A value is present while it has at least one live
//! tag, so a remove concurrent with a fresh add leaves the value present
//! (add-wins semantics). Removes that arrive before their adds are absorbed
//! by the tombstone registry.
//!
//! Use cases:
//! - Document collections, tags on a document
//! - Membership lists edited from several peers

use crate::{Tombstones, ViewOptions};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::hash::Hash;
use tracing::trace;
use weft_types::Tag;

/// Wire message for a set mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SetOp<T> {
    /// Insert `value` under a fresh `tag`.
    Add { tag: Tag, value: T },
    /// Kill the named add-tags of `value`.
    Remove {
        value: T,
        /// The observed add-tags to kill; a bare tag is accepted on decode.
        #[serde(with = "one_or_many")]
        tags: Vec<Tag>,
    },
}

/// Serializes tag lists plainly but accepts a single bare tag on decode, for
/// peers that send `"tags": "t1"`-style singletons.
mod one_or_many {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use weft_types::Tag;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(Tag),
        Many(Vec<Tag>),
    }

    pub fn serialize<S: Serializer>(tags: &Vec<Tag>, serializer: S) -> Result<S::Ok, S::Error> {
        tags.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Tag>, D::Error> {
        Ok(match OneOrMany::deserialize(deserializer)? {
            OneOrMany::One(tag) => vec![tag],
            OneOrMany::Many(tags) => tags,
        })
    }
}

/// An Observed-Remove Set.
///
/// Maps each value to the set of live tags that added it; a value is in the
/// set while that tag-set is non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "T: Serialize",
    deserialize = "T: Deserialize<'de> + Eq + Hash"
))]
pub struct ORSet<T>
where
    T: Eq + Hash,
{
    elements: HashMap<T, BTreeSet<Tag>>,
    tombstones: Tombstones<Tag>,
}

impl<T> ORSet<T>
where
    T: Eq + Hash + Clone,
{
    /// Creates a set with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(ViewOptions::default())
    }

    /// Creates a set with explicit options.
    #[must_use]
    pub fn with_options(options: ViewOptions) -> Self {
        Self {
            elements: HashMap::new(),
            tombstones: Tombstones::new(!options.no_tombstones),
        }
    }

    /// Adds a value locally under `tag`.
    ///
    /// Applies the add to this replica and returns the operation to
    /// broadcast. The same value can be added repeatedly under distinct
    /// tags.
    pub fn add(&mut self, tag: Tag, value: T) -> SetOp<T> {
        let op = SetOp::Add { tag, value };
        self.apply(op.clone());
        op
    }

    /// Removes a value locally, killing every add-tag observed for it.
    ///
    /// Concurrent adds under tags this replica has not seen survive — that
    /// is the observed-remove contract. Returns the operation to broadcast;
    /// its tag list is empty when the value was absent.
    pub fn remove(&mut self, value: &T) -> SetOp<T> {
        let tags: Vec<Tag> = self
            .elements
            .get(value)
            .map(|live| live.iter().cloned().collect())
            .unwrap_or_default();
        let op = SetOp::Remove {
            value: value.clone(),
            tags,
        };
        self.apply(op.clone());
        op
    }

    /// Removes specific add-tags of a value.
    ///
    /// The targeted form of [`remove`](Self::remove), for hosts tracking
    /// observation themselves. Returns the operation to broadcast.
    pub fn remove_tags(&mut self, tags: &[Tag], value: &T) -> SetOp<T> {
        let op = SetOp::Remove {
            value: value.clone(),
            tags: tags.to_vec(),
        };
        self.apply(op.clone());
        op
    }

    /// Applies a mutation received from another replica.
    ///
    /// An add whose tag is already tombstoned is stale and ignored; a
    /// remove tombstones its tags even when the adds have not arrived yet.
    pub fn apply(&mut self, op: SetOp<T>) {
        match op {
            SetOp::Add { tag, value } => {
                if self.tombstones.contains(&tag) {
                    trace!(tag = %tag, "set add suppressed by tombstone");
                    return;
                }
                self.elements.entry(value).or_default().insert(tag);
            }
            SetOp::Remove { value, tags } => {
                if let Some(live) = self.elements.get_mut(&value) {
                    for tag in &tags {
                        live.remove(tag);
                    }
                    if live.is_empty() {
                        self.elements.remove(&value);
                    }
                }
                for tag in tags {
                    self.tombstones.kill(tag);
                }
            }
        }
    }

    /// Returns true if the set contains the value.
    #[must_use]
    pub fn contains(&self, value: &T) -> bool {
        self.elements.contains_key(value)
    }

    /// Live add-tags for a value, sorted; empty if the value is absent.
    #[must_use]
    pub fn tags(&self, value: &T) -> Vec<Tag> {
        self.elements
            .get(value)
            .map(|live| live.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of present values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns true if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Iterates `(value, live tags)` pairs, ordered by each value's
    /// smallest live tag.
    ///
    /// With time-ordered tags this is insertion order, and it is
    /// deterministic across replicas either way.
    pub fn iter(&self) -> impl Iterator<Item = (&T, &BTreeSet<Tag>)> {
        let mut entries: Vec<_> = self.elements.iter().collect();
        entries.sort_by(|a, b| a.1.first().cmp(&b.1.first()));
        entries.into_iter()
    }

    /// Present values, in the order of [`iter`](Self::iter).
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().map(|(value, _)| value.clone()).collect()
    }

    /// Read-only view of the killed tags, for host-level GC decisions.
    #[must_use]
    pub fn tombstones(&self) -> &Tombstones<Tag> {
        &self.tombstones
    }

    /// Drops the tombstones the predicate rejects.
    ///
    /// Only safe once every replica has acknowledged the removals.
    pub fn gc_tombstones(&mut self, keep: impl FnMut(&Tag) -> bool) {
        self.tombstones.retain(keep);
    }
}

impl<T> Default for ORSet<T>
where
    T: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for ORSet<T>
where
    T: Eq + Hash + Clone,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        for item in iter {
            set.add(Tag::mint(), item);
        }
        set
    }
}
