use crate::error::{KeyvolveError, KvResult};
use crate::layout::{Layout, ALPHABET, KEY_COUNT};

/// A set of pinned grid positions. Repairing a layout swaps each pinned
/// symbol into its position, which keeps the permutation intact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockMask {
    pins: Vec<(usize, u8)>,
}

impl LockMask {
    /// Builds a mask from `(flat position, symbol)` pairs. Positions must be
    /// in range, symbols must belong to the layout alphabet, and no position
    /// or symbol may appear twice.
    pub fn from_pairs(pairs: Vec<(usize, u8)>) -> KvResult<Self> {
        let mut pins: Vec<(usize, u8)> = Vec::with_capacity(pairs.len());
        for (pos, symbol) in pairs {
            if pos >= KEY_COUNT {
                return Err(KeyvolveError::Argument(format!(
                    "locked position {pos} is outside the {KEY_COUNT}-key grid"
                )));
            }
            if !ALPHABET.contains(&symbol) {
                return Err(KeyvolveError::Argument(format!(
                    "locked symbol '{}' is not in the layout alphabet",
                    symbol as char
                )));
            }
            if pins.iter().any(|&(p, _)| p == pos) {
                return Err(KeyvolveError::Argument(format!(
                    "position {pos} is locked more than once"
                )));
            }
            if pins.iter().any(|&(_, s)| s == symbol) {
                return Err(KeyvolveError::Argument(format!(
                    "symbol '{}' is locked to more than one position",
                    symbol as char
                )));
            }
            pins.push((pos, symbol));
        }
        pins.sort_unstable_by_key(|&(p, _)| p);
        Ok(Self { pins })
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    /// True when every pin already holds its symbol.
    pub fn is_satisfied(&self, layout: &Layout) -> bool {
        self.pins.iter().all(|&(pos, s)| layout.as_bytes()[pos] == s)
    }

    /// Swaps each pinned symbol into place. A position repaired earlier in
    /// the pass holds a symbol no later pin wants, so later swaps never
    /// disturb it and a second pass is a no-op.
    pub fn repair(&self, layout: &mut Layout) {
        for &(pos, symbol) in &self.pins {
            if layout.as_bytes()[pos] == symbol {
                continue;
            }
            if let Some(current) = layout.position_of(symbol) {
                layout.swap(pos, current);
            }
        }
    }
}
