//! Tombstone registry shared by the tombstoned views.
//!
//! Every mutation consults the registry before treating a tag as a birth
//! tag: once a tag is killed it can never resurrect its entry. That single
//! rule is what lets add/remove pairs commute under reordering and
//! duplication — a remove delivered before its add leaves a tombstone that
//! swallows the add when it finally arrives.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The set of tags a view has killed.
///
/// Grows without bound while tracking is on; the host decides when it is
/// safe to forget (see [`retain`](Self::retain)).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tombstones<T: Ord> {
    dead: BTreeSet<T>,
    tracking: bool,
}

impl<T: Ord> Tombstones<T> {
    /// Creates a registry. With `tracking` off, kills are not recorded and
    /// [`contains`](Self::contains) never gates anything.
    #[must_use]
    pub fn new(tracking: bool) -> Self {
        Self {
            dead: BTreeSet::new(),
            tracking,
        }
    }

    /// Records a killed tag.
    pub fn kill(&mut self, tag: T) {
        if self.tracking {
            self.dead.insert(tag);
        }
    }

    /// Returns true if the tag has been killed.
    #[must_use]
    pub fn contains(&self, tag: &T) -> bool {
        self.dead.contains(tag)
    }

    /// Number of recorded tombstones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dead.len()
    }

    /// Returns true if no tombstones are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dead.is_empty()
    }

    /// Iterates the dead tags in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.dead.iter()
    }

    /// Drops the tombstones the predicate rejects.
    ///
    /// Garbage collection hook. Only safe once every replica has
    /// acknowledged the removals: a dropped tombstone can no longer suppress
    /// a late add.
    pub fn retain(&mut self, keep: impl FnMut(&T) -> bool) {
        self.dead.retain(keep);
    }
}
