//! Diff-based text buffer.
//!
//! Holds a plain string and exchanges edits as deterministic edit scripts:
//! retain / insert / delete hunks counted in Unicode scalar values, produced
//! by a Myers shortest-edit-script walk.
//!
//! Unlike the other views this is **not** a true CRDT: a diff computed
//! against one state is applied verbatim to whatever state the receiving
//! replica has, so truly concurrent edits can diverge. The contract is
//! best-effort merge — hosts that need convergent text should put a sequence
//! CRDT behind this surface. Length-mismatched diffs never fail: hunks are
//! clamped to the text that is actually there.

use crate::ViewOptions;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One step of an edit script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hunk {
    /// Keep the next `n` characters of the current text.
    Retain(usize),
    /// Emit a string.
    Insert(String),
    /// Drop the next `n` characters of the current text.
    Delete(usize),
}

/// An ordered edit script.
///
/// Against the text it was computed from, retain and delete lengths sum to
/// the old length and retain and insert lengths to the new one; applying it
/// reproduces the target exactly. Lengths count Unicode scalar values.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diff(Vec<Hunk>);

impl Diff {
    /// Creates a diff from hunks.
    #[must_use]
    pub fn new(hunks: Vec<Hunk>) -> Self {
        Self(hunks)
    }

    /// Returns the hunks in application order.
    #[must_use]
    pub fn hunks(&self) -> &[Hunk] {
        &self.0
    }

    /// Returns true if the script has no hunks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Hunk>> for Diff {
    fn from(hunks: Vec<Hunk>) -> Self {
        Self(hunks)
    }
}

/// Wire message for a text update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextOp {
    /// The edit script to apply.
    pub diff: Diff,
}

/// A diff-based text view.
///
/// See the module docs for the concurrency caveat: diffs are applied
/// verbatim, best-effort.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Text {
    current: String,
}

impl Text {
    /// Creates an empty text view.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a text view with explicit options.
    ///
    /// Accepts the common options record for a uniform factory surface;
    /// text has no tags, so the tombstone setting has no effect.
    #[must_use]
    pub fn with_options(_options: ViewOptions) -> Self {
        Self::new()
    }

    /// The current text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.current
    }

    /// Length in Unicode scalar values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.current.chars().count()
    }

    /// Returns true if the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Computes the edit script from the current text to `target`.
    ///
    /// Deterministic for a given (current, target) pair, so every replica
    /// at the same state produces the same script.
    #[must_use]
    pub fn diff(&self, target: &str) -> Diff {
        let a: Vec<char> = self.current.chars().collect();
        let b: Vec<char> = target.chars().collect();
        Diff(shortest_edit_script(&a, &b))
    }

    /// Applies an edit script to the current text.
    ///
    /// Hunks that run past the end of the buffer are clamped to what is
    /// there; input the script never consumed is retained. Applying a diff
    /// to the text it was computed from yields the target exactly.
    pub fn update(&mut self, diff: &Diff) {
        let chars: Vec<char> = self.current.chars().collect();
        let mut out = String::with_capacity(self.current.len());
        let mut cursor = 0usize;
        for hunk in diff.hunks() {
            match hunk {
                Hunk::Retain(n) => {
                    let end = cursor.saturating_add(*n).min(chars.len());
                    out.extend(&chars[cursor..end]);
                    cursor = end;
                }
                Hunk::Delete(n) => {
                    cursor = cursor.saturating_add(*n).min(chars.len());
                }
                Hunk::Insert(s) => out.push_str(s),
            }
        }
        out.extend(&chars[cursor..]);
        self.current = out;
    }

    /// Replaces the text locally, returning the operation to broadcast.
    ///
    /// Shorthand for diffing against `target` and applying the result.
    pub fn set(&mut self, target: &str) -> TextOp {
        let diff = self.diff(target);
        self.update(&diff);
        TextOp { diff }
    }

    /// Applies an update received from another replica.
    pub fn apply(&mut self, op: TextOp) {
        self.update(&op.diff);
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.current)
    }
}

enum Step {
    Retain,
    Insert(char),
    Delete,
}

/// Myers O(ND) shortest edit script between two character sequences.
fn shortest_edit_script(a: &[char], b: &[char]) -> Vec<Hunk> {
    let n = a.len() as isize;
    let m = b.len() as isize;
    let max = n + m;
    if max == 0 {
        return Vec::new();
    }

    // Forward pass: v[k + max] holds the furthest x on diagonal k; trace
    // snapshots v before each depth for the backward walk.
    let offset = max;
    let width = (2 * max + 1) as usize;
    let mut v = vec![0isize; width];
    let mut trace: Vec<Vec<isize>> = Vec::new();
    'search: for d in 0..=max {
        trace.push(v.clone());
        let mut k = -d;
        while k <= d {
            let idx = (k + offset) as usize;
            let mut x = if k == -d || (k != d && v[idx - 1] < v[idx + 1]) {
                v[idx + 1]
            } else {
                v[idx - 1] + 1
            };
            let mut y = x - k;
            while x < n && y < m && a[x as usize] == b[y as usize] {
                x += 1;
                y += 1;
            }
            v[idx] = x;
            if x >= n && y >= m {
                break 'search;
            }
            k += 2;
        }
    }

    // Backward walk from (n, m), emitting steps newest-first.
    let mut steps: Vec<Step> = Vec::new();
    let mut x = n;
    let mut y = m;
    for d in (0..trace.len()).rev() {
        let v = &trace[d];
        let d = d as isize;
        let k = x - y;
        let idx = (k + offset) as usize;
        let from_above = k == -d || (k != d && v[idx - 1] < v[idx + 1]);
        let prev_k = if from_above { k + 1 } else { k - 1 };
        let prev_x = v[(prev_k + offset) as usize];
        let prev_y = prev_x - prev_k;
        while x > prev_x && y > prev_y {
            steps.push(Step::Retain);
            x -= 1;
            y -= 1;
        }
        if d > 0 {
            if from_above {
                steps.push(Step::Insert(b[(y - 1) as usize]));
                y -= 1;
            } else {
                steps.push(Step::Delete);
                x -= 1;
            }
        }
    }

    // Reverse into application order, coalescing runs into hunks.
    let mut hunks: Vec<Hunk> = Vec::new();
    for step in steps.into_iter().rev() {
        match step {
            Step::Retain => {
                if let Some(Hunk::Retain(n)) = hunks.last_mut() {
                    *n += 1;
                } else {
                    hunks.push(Hunk::Retain(1));
                }
            }
            Step::Insert(c) => {
                if let Some(Hunk::Insert(s)) = hunks.last_mut() {
                    s.push(c);
                } else {
                    hunks.push(Hunk::Insert(c.to_string()));
                }
            }
            Step::Delete => {
                if let Some(Hunk::Delete(n)) = hunks.last_mut() {
                    *n += 1;
                } else {
                    hunks.push(Hunk::Delete(1));
                }
            }
        }
    }
    hunks
}
