//! Convergent replicated views for weft.
//!
//! This crate provides four view types for peers that broadcast small
//! operation messages over a reliable but unordered transport:
//!
//! - [`Register<T>`] — last-writer-wins register over a causal tag DAG,
//!   multi-value under concurrent writes
//! - [`ORSet<T>`] — Observed-Remove Set with tag-tracked add/remove causality
//! - [`List<T>`] — ordered list over Logoot positional tags
//! - [`Text`] — diff-based text buffer (best-effort merge; see its docs)
//!
//! Register, set, and list are operation-based CRDTs: local mutators return
//! the operation message to broadcast, remote messages go through `apply`,
//! and any delivery order of the same operations yields the same state.
//! Duplicate delivery is a no-op, and late or reordered delivery is absorbed
//! by per-view tombstone tracking (configurable via [`ViewOptions`]). Text
//! is the documented exception: diffs are applied verbatim, so truly
//! concurrent edits may diverge.

mod list;
mod options;
mod orset;
mod register;
mod text;
mod tombstones;

pub use list::{List, ListOp};
pub use options::{ListOptions, ViewOptions};
pub use orset::{ORSet, SetOp};
pub use register::{Register, RegisterOp};
pub use text::{Diff, Hunk, Text, TextOp};
pub use tombstones::Tombstones;
