//! Logoot positional tags.
//!
//! A positional tag is an ordered sequence of `(integer, site)` coordinates,
//! compared lexicographically. The tag space is dense: [`PositionalTag::between`]
//! can always mint a tag strictly between any two others, growing one
//! coordinate deeper only when the integers at the current depth leave no
//! room.
//!
//! The byte encoding is canonical and order-preserving: comparing two
//! encodings lexicographically gives the same answer as comparing the
//! decoded tags, so storage backends can sort tags without decoding them.

use crate::{Error, Result, SiteId};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Virtual minimum coordinate; also the padding for exhausted sequences.
const MIN_INT: u64 = 0;
/// Virtual maximum coordinate; range upper bounds are exclusive, so this
/// integer is never minted and cannot collide with a real coordinate.
const MAX_INT: u64 = u64::MAX;

const POSITION_MARKER: u8 = 0x01;
const SITE_ABSENT: u8 = 0x00;
const SITE_PRESENT: u8 = 0x01;
const SITE_TERMINATOR: u8 = 0x00;
const SITE_ESCAPE: u8 = 0xFF;

/// One coordinate of a positional tag.
///
/// Ordered by integer, then by site; an absent site sorts below any present
/// one. Integer ties across replicas are broken by their distinct sites.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    int: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    site: Option<SiteId>,
}

impl Position {
    /// Creates a coordinate.
    #[must_use]
    pub const fn new(int: u64, site: Option<SiteId>) -> Self {
        Self { int, site }
    }

    /// Returns the integer component.
    #[must_use]
    pub const fn int(&self) -> u64 {
        self.int
    }

    /// Returns the site tiebreaker, if any.
    #[must_use]
    pub fn site(&self) -> Option<&SiteId> {
        self.site.as_ref()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.site {
            Some(site) => write!(f, "{}:{}", self.int, site),
            None => write!(f, "{}", self.int),
        }
    }
}

/// A Logoot positional identifier.
///
/// Tags compare lexicographically over their coordinates, so a `BTreeMap`
/// keyed by tags holds list entries in their shared order. Two distinct tags
/// are never equal; concurrent mints are kept distinct by the site
/// tiebreaker (or, without sites, by 64-bit random integers).
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PositionalTag(Vec<Position>);

impl PositionalTag {
    /// Creates a tag from its coordinates.
    #[must_use]
    pub fn new(positions: Vec<Position>) -> Self {
        Self(positions)
    }

    /// Returns the coordinate sequence.
    #[must_use]
    pub fn positions(&self) -> &[Position] {
        &self.0
    }

    /// Mints a tag strictly between `lo` and `hi`.
    ///
    /// `None` on either side denotes the virtual minimum or maximum. The
    /// result carries `site` (when given) as the tiebreaker on its final
    /// coordinate; without a site, the 64-bit random integer itself keeps
    /// concurrent mints distinct with overwhelming probability.
    ///
    /// Walks the bounds coordinate by coordinate. Where the integers leave
    /// room, a fresh integer strictly between them finishes the tag; where
    /// they don't, the low bound's coordinate is kept and the walk descends
    /// one level deeper, so identifier length grows only under sustained
    /// insertion pressure at one spot.
    ///
    /// # Panics
    ///
    /// If the bounds are not strictly ordered, or `hi` is the immediate
    /// successor of `lo` (only constructible by hand; minted tags always
    /// leave room below them).
    #[must_use]
    pub fn between(
        lo: Option<&Self>,
        hi: Option<&Self>,
        site: Option<&SiteId>,
        rng: &mut impl Rng,
    ) -> Self {
        if let (Some(a), Some(b)) = (lo, hi) {
            assert!(a < b, "between: lower bound must sort before upper bound");
        }

        let pad = Position::new(MIN_INT, None);
        let mut prefix: Vec<Position> = Vec::new();
        let mut hi_unbounded = hi.is_none();
        let mut depth = 0;
        loop {
            let lo_pos = lo
                .and_then(|t| t.0.get(depth))
                .cloned()
                .unwrap_or_else(|| pad.clone());
            let hi_pos = if hi_unbounded {
                None
            } else {
                hi.and_then(|t| t.0.get(depth))
            };
            let hi_int = if hi_unbounded {
                MAX_INT
            } else {
                hi_pos.map_or(MIN_INT, Position::int)
            };

            if hi_int > lo_pos.int.saturating_add(1) {
                let int = rng.gen_range(lo_pos.int + 1..hi_int);
                prefix.push(Position::new(int, site.cloned()));
                return Self(prefix);
            }

            // No integer room at this depth: keep the low coordinate and
            // descend. Once the bounds diverge, everything below the low
            // coordinate is inside the interval, so the upper bound becomes
            // virtual-maximum for the rest of the walk.
            if !hi_unbounded {
                match hi_pos {
                    Some(p) if *p == lo_pos => {}
                    Some(_) => hi_unbounded = true,
                    None => panic!("between: no tag exists between the given bounds"),
                }
            }
            prefix.push(lo_pos);
            depth += 1;
        }
    }

    /// Encodes the tag into its canonical byte form.
    ///
    /// Lexicographic byte comparison of two encodings matches the tag
    /// order exactly. Each coordinate is a `0x01` marker, the integer in
    /// big-endian, and the site (`0x00` when absent, else `0x01` plus the
    /// site bytes with `0x00` escaped as `0x00 0xFF`, closed by `0x00`).
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.0.len() * 10);
        for pos in &self.0 {
            out.push(POSITION_MARKER);
            out.extend_from_slice(&pos.int.to_be_bytes());
            match &pos.site {
                None => out.push(SITE_ABSENT),
                Some(site) => {
                    out.push(SITE_PRESENT);
                    for &b in site.as_str().as_bytes() {
                        out.push(b);
                        if b == SITE_TERMINATOR {
                            out.push(SITE_ESCAPE);
                        }
                    }
                    out.push(SITE_TERMINATOR);
                }
            }
        }
        out
    }

    /// Decodes a tag from its canonical byte form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut positions = Vec::new();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] != POSITION_MARKER {
                return Err(Error::InvalidEncoding(format!(
                    "expected position marker at byte {i}, found {:#04x}",
                    bytes[i]
                )));
            }
            i += 1;
            let int_bytes = bytes
                .get(i..i + 8)
                .ok_or_else(|| Error::InvalidEncoding("truncated integer".into()))?;
            let int = u64::from_be_bytes(int_bytes.try_into().expect("slice is 8 bytes"));
            i += 8;
            let flag = *bytes
                .get(i)
                .ok_or_else(|| Error::InvalidEncoding("missing site flag".into()))?;
            i += 1;
            let site = match flag {
                SITE_ABSENT => None,
                SITE_PRESENT => {
                    let mut raw = Vec::new();
                    loop {
                        let b = *bytes
                            .get(i)
                            .ok_or_else(|| Error::InvalidEncoding("unterminated site".into()))?;
                        i += 1;
                        if b != SITE_TERMINATOR {
                            raw.push(b);
                        } else if bytes.get(i) == Some(&SITE_ESCAPE) {
                            raw.push(SITE_TERMINATOR);
                            i += 1;
                        } else {
                            break;
                        }
                    }
                    let s = String::from_utf8(raw)
                        .map_err(|e| Error::InvalidEncoding(e.to_string()))?;
                    Some(SiteId::new(s))
                }
                other => {
                    return Err(Error::InvalidEncoding(format!(
                        "invalid site flag {other:#04x}"
                    )));
                }
            };
            positions.push(Position::new(int, site));
        }
        Ok(Self(positions))
    }
}

impl fmt::Display for PositionalTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, pos) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            write!(f, "{pos}")?;
        }
        Ok(())
    }
}

impl From<Vec<Position>> for PositionalTag {
    fn from(positions: Vec<Position>) -> Self {
        Self(positions)
    }
}
