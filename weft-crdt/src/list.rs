//! Ordered list over Logoot positional tags.
//!
//! Values live in a map sorted by positional tag, so every replica sees the
//! same order without coordination. New positions come from
//! [`List::between`], which always finds room between any two neighbors,
//! growing the identifier one coordinate deeper only when the integers
//! leave none.
//!
//! Use cases:
//! - Shared outlines, playlists, kanban columns
//! - Any sequence edited from several peers where index-based addressing
//!   would race

use crate::{ListOptions, Tombstones};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::trace;
use weft_types::{PositionalTag, SiteId};

/// Wire message for a list mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ListOp<T> {
    /// Insert `value` at the minted position `tag`.
    Insert { tag: PositionalTag, value: T },
    /// Delete the entry at `tag`.
    Remove { tag: PositionalTag },
}

fn entropy_rng() -> StdRng {
    StdRng::from_entropy()
}

/// Serializes the entry map as a sequence of `(tag, value)` pairs; positional
/// tags are structured values and cannot be object keys in formats like JSON.
mod entries_serde {
    use super::*;
    use serde::ser::SerializeSeq;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S, T: Serialize>(
        entries: &BTreeMap<PositionalTag, T>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(entries.len()))?;
        for pair in entries {
            seq.serialize_element(&pair)?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D, T: Deserialize<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<PositionalTag, T>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let pairs = Vec::<(PositionalTag, T)>::deserialize(deserializer)?;
        Ok(pairs.into_iter().collect())
    }
}

/// An ordered list view.
///
/// The tiebreaking RNG is not part of the replicated state: a loaded
/// replica re-seeds, which only affects which positions it mints next,
/// never how existing entries order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(serialize = "T: Serialize", deserialize = "T: Deserialize<'de>"))]
pub struct List<T> {
    #[serde(with = "entries_serde")]
    entries: BTreeMap<PositionalTag, T>,
    tombstones: Tombstones<PositionalTag>,
    site: Option<SiteId>,
    #[serde(skip, default = "entropy_rng")]
    rng: StdRng,
}

impl<T: Clone> List<T> {
    /// Creates a list with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(ListOptions::default())
    }

    /// Creates a list with explicit options.
    #[must_use]
    pub fn with_options(options: ListOptions) -> Self {
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            entries: BTreeMap::new(),
            tombstones: Tombstones::new(!options.no_tombstones),
            site: options.site,
            rng,
        }
    }

    /// Mints a positional tag strictly between `lo` and `hi`.
    ///
    /// `None` on either side denotes the virtual minimum or maximum, so
    /// `between(None, None)` positions into an empty list and
    /// `between(last, None)` appends. Uses the view's configured site (when
    /// any) and RNG as tiebreakers; the tag is not inserted until the host
    /// calls [`insert`](Self::insert) with it.
    pub fn between(
        &mut self,
        lo: Option<&PositionalTag>,
        hi: Option<&PositionalTag>,
    ) -> PositionalTag {
        PositionalTag::between(lo, hi, self.site.as_ref(), &mut self.rng)
    }

    /// Inserts a value locally at a minted position.
    ///
    /// Applies the insert to this replica and returns the operation to
    /// broadcast. Duplicate tags are idempotent.
    pub fn insert(&mut self, tag: PositionalTag, value: T) -> ListOp<T> {
        let op = ListOp::Insert { tag, value };
        self.apply(op.clone());
        op
    }

    /// Deletes the entry at `tag` locally.
    ///
    /// Returns the operation to broadcast. Removing an absent tag still
    /// records the tombstone, so a late insert cannot resurrect it.
    pub fn remove(&mut self, tag: &PositionalTag) -> ListOp<T> {
        let op = ListOp::Remove { tag: tag.clone() };
        self.apply(op.clone());
        op
    }

    /// Applies a mutation received from another replica.
    ///
    /// An insert whose tag is already tombstoned is stale and ignored.
    pub fn apply(&mut self, op: ListOp<T>) {
        match op {
            ListOp::Insert { tag, value } => {
                if self.tombstones.contains(&tag) {
                    trace!(tag = %tag, "list insert suppressed by tombstone");
                    return;
                }
                self.entries.entry(tag).or_insert(value);
            }
            ListOp::Remove { tag } => {
                self.entries.remove(&tag);
                self.tombstones.kill(tag);
            }
        }
    }

    /// The positional tag at a 0-based index in sorted order, or `None`
    /// outside `[0, len)`.
    #[must_use]
    pub fn tag_at(&self, index: usize) -> Option<&PositionalTag> {
        self.entries.keys().nth(index)
    }

    /// The value at a positional tag.
    #[must_use]
    pub fn get(&self, tag: &PositionalTag) -> Option<&T> {
        self.entries.get(tag)
    }

    /// The value at a 0-based index in sorted order.
    #[must_use]
    pub fn get_at(&self, index: usize) -> Option<&T> {
        self.entries.values().nth(index)
    }

    /// The sorted index of a positional tag, if present.
    #[must_use]
    pub fn index_of(&self, tag: &PositionalTag) -> Option<usize> {
        self.entries.keys().position(|t| t == tag)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(tag, value)` entries in tag order.
    pub fn iter(&self) -> impl Iterator<Item = (&PositionalTag, &T)> {
        self.entries.iter()
    }

    /// Values in tag order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.entries.values().cloned().collect()
    }

    /// Read-only view of the killed tags, for host-level GC decisions.
    #[must_use]
    pub fn tombstones(&self) -> &Tombstones<PositionalTag> {
        &self.tombstones
    }

    /// Drops the tombstones the predicate rejects.
    ///
    /// Only safe once every replica has acknowledged the removals.
    pub fn gc_tombstones(&mut self, keep: impl FnMut(&PositionalTag) -> bool) {
        self.tombstones.retain(keep);
    }
}

impl<T: Clone> Default for List<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialEq> PartialEq for List<T> {
    fn eq(&self, other: &Self) -> bool {
        // Equality is over replicated state only; the site and RNG are
        // local minting configuration.
        self.entries == other.entries && self.tombstones == other.tombstones
    }
}
