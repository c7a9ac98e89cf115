// nt_sbi/src/trap/ds/hartmask.rs

//! # Hart Mask
//!
//! A fixed-capacity bitset over hart indices. Devices and extensions use it to
//! describe which harts they apply to.

use crate::config::MAX_HARTS;
use core::fmt;

type Word = usize;

const BITS_PER_WORD: usize = Word::BITS as usize;
const WORDS: usize = MAX_HARTS.div_ceil(BITS_PER_WORD);

const fn word_idx(hart: usize) -> usize {
    hart / BITS_PER_WORD
}

const fn bit_idx(hart: usize) -> usize {
    hart % BITS_PER_WORD
}

/// A set of hart indices in `[0, MAX_HARTS)`.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct HartMask {
    bits: [Word; WORDS],
}

impl HartMask {
    /// Creates an empty mask.
    pub const fn new() -> Self {
        Self { bits: [0; WORDS] }
    }

    /// Creates a mask holding a single hart. Out-of-range indices give an empty mask.
    pub fn single(hart: usize) -> Self {
        let mut mask = Self::new();
        mask.set(hart);
        mask
    }

    /// Creates a mask holding the harts `[first, first + count)`, truncated to capacity.
    pub fn from_range(first: usize, count: usize) -> Self {
        let mut mask = Self::new();
        for hart in first..first.saturating_add(count).min(MAX_HARTS) {
            mask.set(hart);
        }
        mask
    }

    /// Adds a hart. Returns `false` if the index exceeds the mask capacity.
    pub fn set(&mut self, hart: usize) -> bool {
        if hart >= MAX_HARTS {
            return false;
        }
        self.bits[word_idx(hart)] |= 1 << bit_idx(hart);
        true
    }

    /// Removes a hart.
    pub fn clear(&mut self, hart: usize) {
        if hart < MAX_HARTS {
            self.bits[word_idx(hart)] &= !(1 << bit_idx(hart));
        }
    }

    /// Returns `true` if the hart is in the mask.
    #[inline]
    pub fn test(&self, hart: usize) -> bool {
        hart < MAX_HARTS && self.bits[word_idx(hart)] & (1 << bit_idx(hart)) != 0
    }

    /// Set intersection.
    pub fn and(&self, other: &HartMask) -> HartMask {
        let mut out = HartMask::new();
        for (i, word) in out.bits.iter_mut().enumerate() {
            *word = self.bits[i] & other.bits[i];
        }
        out
    }

    /// Set union.
    pub fn or(&self, other: &HartMask) -> HartMask {
        let mut out = HartMask::new();
        for (i, word) in out.bits.iter_mut().enumerate() {
            *word = self.bits[i] | other.bits[i];
        }
        out
    }

    /// Population count.
    pub fn weight(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|w| *w == 0)
    }

    /// Returns `true` if the two masks share at least one hart.
    pub fn intersects(&self, other: &HartMask) -> bool {
        self.bits.iter().zip(other.bits.iter()).any(|(a, b)| a & b != 0)
    }

    /// Iterates over the harts in the mask in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.iter().enumerate().flat_map(|(w, &word)| {
            (0..BITS_PER_WORD)
                .filter(move |b| word & (1 << b) != 0)
                .map(move |b| w * BITS_PER_WORD + b)
        })
    }
}

impl fmt::Debug for HartMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
