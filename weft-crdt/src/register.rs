//! Multi-value register over a causal tag DAG.
//!
//! Each write names the tags it has observed (`previous_tags`) and stamps a
//! fresh tag of its own, forming a DAG edge "this write is causally after
//! those". Once every message is delivered, the live tags are exactly the
//! ones never named in any `previous_tags` — a fact independent of delivery
//! order, so replicas converge. Sequential writes behave last-writer-wins;
//! concurrent writes leave several live tags and [`Register::value`]
//! projects a deterministic one.
//!
//! Use cases:
//! - Single-value properties (a document title, a profile field)
//! - Any field where concurrent writes should surface rather than silently
//!   clobber each other

use crate::{Tombstones, ViewOptions};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::trace;
use weft_types::Tag;

/// Wire message for a register write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterOp<T> {
    /// Tags this write supersedes — everything the writer had observed.
    pub previous_tags: Vec<Tag>,
    /// Fresh tag identifying this write.
    pub tag: Tag,
    /// The written value.
    pub value: T,
}

/// A last-writer-wins register with multi-value concurrent semantics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Register<T> {
    live: BTreeMap<Tag, T>,
    tombstones: Tombstones<Tag>,
}

impl<T: Clone> Register<T> {
    /// Creates a register with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(ViewOptions::default())
    }

    /// Creates a register with explicit options.
    #[must_use]
    pub fn with_options(options: ViewOptions) -> Self {
        Self {
            live: BTreeMap::new(),
            tombstones: Tombstones::new(!options.no_tombstones),
        }
    }

    /// Writes a value locally, superseding the `previous` tags.
    ///
    /// Applies the write to this replica and returns the operation to
    /// broadcast. Pass the current [`tags`](Self::tags) as `previous` for
    /// last-writer-wins behavior; pass fewer to leave siblings live.
    pub fn set(&mut self, previous: &[Tag], tag: Tag, value: T) -> RegisterOp<T> {
        let op = RegisterOp {
            previous_tags: previous.to_vec(),
            tag,
            value,
        };
        self.apply(op.clone());
        op
    }

    /// Applies a write received from another replica.
    ///
    /// A write whose own tag is already tombstoned is stale — a later write
    /// superseding it has been seen — and is ignored entirely.
    pub fn apply(&mut self, op: RegisterOp<T>) {
        if self.tombstones.contains(&op.tag) {
            trace!(tag = %op.tag, "register write suppressed by tombstone");
            return;
        }
        for prev in op.previous_tags {
            self.live.remove(&prev);
            self.tombstones.kill(prev);
        }
        self.live.insert(op.tag, op.value);
    }

    /// Live tags, in sorted order.
    #[must_use]
    pub fn tags(&self) -> Vec<Tag> {
        self.live.keys().cloned().collect()
    }

    /// The current value: the value under the smallest live tag.
    ///
    /// With sequential writes this is simply the latest one; after
    /// concurrent writes it is a deterministic pick among the siblings (the
    /// full set stays observable through [`values`](Self::values)).
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        self.live.values().next()
    }

    /// All concurrently live values, in tag order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.live.values()
    }

    /// Live `(tag, value)` entries in tag order.
    pub fn iter(&self) -> impl Iterator<Item = (&Tag, &T)> {
        self.live.iter()
    }

    /// Number of live tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Returns true if nothing is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Read-only view of the killed tags, for host-level GC decisions.
    #[must_use]
    pub fn tombstones(&self) -> &Tombstones<Tag> {
        &self.tombstones
    }

    /// Drops the tombstones the predicate rejects.
    ///
    /// Only safe once every replica has acknowledged the superseding writes.
    pub fn gc_tombstones(&mut self, keep: impl FnMut(&Tag) -> bool) {
        self.tombstones.retain(keep);
    }
}

impl<T: Clone> Default for Register<T> {
    fn default() -> Self {
        Self::new()
    }
}
