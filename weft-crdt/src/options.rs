//! View configuration records.

use serde::{Deserialize, Serialize};
use weft_types::SiteId;

/// Options accepted by every view constructor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewOptions {
    /// Disables tombstone tracking entirely.
    ///
    /// Saves the unbounded dead-tag memory, at a price: delivery must then
    /// be causally ordered, because a remove arriving before its add is
    /// forgotten and the late add resurrects the entry.
    #[serde(default)]
    pub no_tombstones: bool,
}

/// Options for the list view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListOptions {
    /// Disables tombstone tracking (see [`ViewOptions::no_tombstones`]).
    #[serde(default)]
    pub no_tombstones: bool,
    /// Site identifier appended to minted positions as a tiebreaker.
    ///
    /// Distinct sites make concurrent `between` results distinct with
    /// certainty instead of overwhelming probability, at the cost of longer
    /// identifiers.
    #[serde(default)]
    pub site: Option<SiteId>,
    /// Seed for the tiebreaking RNG; entropy-seeded when absent.
    ///
    /// Minted positions depend on it, ordering never does. Mainly useful to
    /// make cross-replica tests deterministic.
    #[serde(default)]
    pub seed: Option<u64>,
}
