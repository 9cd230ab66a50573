use crate::error::{KeyvolveError, KvResult};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

pub const ROWS: usize = 3;
pub const COLS: usize = 10;
pub const KEY_COUNT: usize = ROWS * COLS;

/// The fixed 30-symbol alphabet every layout is a permutation of.
/// Row-major QWERTY ordering of the standard 3x10 block.
pub const ALPHABET: &[u8; KEY_COUNT] = b"QWERTYUIOPASDFGHJKL;ZXCVBNM,./";

/// A full assignment of the alphabet to the 3x10 grid, stored row-major.
///
/// Invariant: `keys` is a permutation of [`ALPHABET`] at every lifecycle
/// point. Constructors enforce it; operators that rearrange bytes in place
/// preserve it by only ever swapping or moving existing entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Layout {
    keys: [u8; KEY_COUNT],
}

impl Layout {
    /// QWERTY reference layout.
    pub fn qwerty() -> Self {
        Self { keys: *ALPHABET }
    }

    /// Uniformly random permutation of the alphabet.
    pub fn random(rng: &mut fastrand::Rng) -> Self {
        let mut keys = *ALPHABET;
        rng.shuffle(&mut keys);
        Self { keys }
    }

    /// Builds a layout from exactly 30 bytes that must be a permutation of
    /// the alphabet. Used by operators that rebuild the flattened sequence.
    pub fn from_flat(keys: [u8; KEY_COUNT]) -> KvResult<Self> {
        let mut seen = [false; 256];
        for &b in &keys {
            if seen[b as usize] {
                return Err(KeyvolveError::Argument(format!(
                    "duplicate symbol '{}' in layout",
                    b as char
                )));
            }
            seen[b as usize] = true;
        }
        for &b in ALPHABET {
            if !seen[b as usize] {
                return Err(KeyvolveError::Argument(format!(
                    "layout is missing symbol '{}'",
                    b as char
                )));
            }
        }
        Ok(Self { keys })
    }

    /// Parses a 30-character layout string (row-major, case-insensitive).
    /// Only ASCII symbols can sit on the grid; anything else is rejected
    /// rather than truncated to a look-alike byte.
    pub fn parse(s: &str) -> KvResult<Self> {
        let mut bytes = Vec::with_capacity(KEY_COUNT);
        for c in s.chars().filter(|c| !c.is_whitespace()) {
            if !c.is_ascii() {
                return Err(KeyvolveError::Argument(format!(
                    "layout contains non-ASCII symbol '{c}'"
                )));
            }
            bytes.push(c.to_ascii_uppercase() as u8);
        }
        if bytes.len() != KEY_COUNT {
            return Err(KeyvolveError::Argument(format!(
                "layout must contain {} symbols, got {}",
                KEY_COUNT,
                bytes.len()
            )));
        }
        let mut keys = [0u8; KEY_COUNT];
        keys.copy_from_slice(&bytes);
        Self::from_flat(keys)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; KEY_COUNT] {
        &self.keys
    }

    #[inline]
    pub fn symbol_at(&self, row: usize, col: usize) -> u8 {
        self.keys[row * COLS + col]
    }

    /// Flat index of `symbol`, or None if it is not on the grid.
    pub fn position_of(&self, symbol: u8) -> Option<usize> {
        let p = self.pos_map()[symbol as usize];
        if p == 255 {
            None
        } else {
            Some(p as usize)
        }
    }

    /// symbol -> flat index table, 255 marking symbols not on the grid.
    /// Case-folded so corpus lookups hit regardless of letter case.
    pub fn pos_map(&self) -> [u8; 256] {
        let mut map = [255u8; 256];
        for (i, &byte) in self.keys.iter().enumerate() {
            map[byte as usize] = i as u8;
            if byte.is_ascii_uppercase() {
                map[byte.to_ascii_lowercase() as usize] = i as u8;
            }
        }
        map
    }

    /// Applies `f` to the flattened sequence and revalidates the result.
    /// Operator helpers go through this so a buggy rearrangement cannot
    /// silently break the permutation invariant in debug builds.
    pub fn map_flat(&self, f: impl FnOnce(&mut [u8; KEY_COUNT])) -> Self {
        let mut keys = self.keys;
        f(&mut keys);
        debug_assert!(Self::from_flat(keys).is_ok());
        Self { keys }
    }

    pub fn swap(&mut self, a: usize, b: usize) {
        self.keys.swap(a, b);
    }

    /// Row slices for display and reports.
    pub fn rows(&self) -> [&[u8]; ROWS] {
        [
            &self.keys[0..COLS],
            &self.keys[COLS..2 * COLS],
            &self.keys[2 * COLS..],
        ]
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.keys {
            write!(f, "{}", b as char)?;
        }
        Ok(())
    }
}

// Layouts serialize as their 30-char string; stable content-derived form,
// also usable as a cache key where one is needed.
impl Serialize for Layout {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Layout {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Layout::parse(&s).map_err(D::Error::custom)
    }
}
