// SPDX-License-Identifier: AGPL-3.0-or-later
// VAST - Distributed Network Forensics and Security Analytics
// Copyright (C) 2026 Sushanth Reddy Vanagala (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! The compressed bitmap
//!
//! A [`Bitmap`] is an ordered sequence of [`Bits`] blocks whose
//! concatenated lengths equal its size. Appends coalesce adjacent
//! homogeneous runs into fills and pack literal bits into partial words,
//! maintaining these invariants:
//!
//! 1. Adjacent fills of the same value are merged.
//! 2. A fill is at least one word wide.
//! 3. Literal blocks are at most one word wide.
//! 4. `size()` equals the sum of all block sizes.

use serde::{Deserialize, Serialize};

use crate::bits::Bits;
use crate::word;

/// A compressed bitvector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bitmap {
    blocks: Vec<Bits>,
    size: u64,
}

impl Bitmap {
    pub fn new() -> Self {
        Bitmap::default()
    }

    /// Builds a bitmap from individual bit values. Convenience for tests
    /// and small literals.
    pub fn from_bits<I: IntoIterator<Item = bool>>(bits: I) -> Self {
        let mut bm = Bitmap::new();
        for bit in bits {
            bm.append_bits(bit, 1);
        }
        bm
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// The blocks of this bitmap, in order. This is the restartable block
    /// range the bitwise algorithms iterate.
    pub fn blocks(&self) -> &[Bits] {
        &self.blocks
    }

    /// The number of *bit*-valued positions.
    pub fn count(&self, bit: bool) -> u64 {
        self.blocks.iter().map(|b| b.count_bit(bit)).sum()
    }

    /// Accesses the bit at position *i*.
    ///
    /// Pre: `i < size`.
    pub fn get(&self, i: u64) -> bool {
        assert!(i < self.size, "bitmap position out of range");
        let mut n = 0;
        for b in &self.blocks {
            if i < n + b.size() {
                return b.get(i - n);
            }
            n += b.size();
        }
        unreachable!()
    }

    /// Appends *n* copies of *bit*.
    pub fn append_bits(&mut self, bit: bool, n: u64) {
        if n == 0 {
            return;
        }
        self.size += n;
        if let Some(last) = self.blocks.last_mut() {
            if last.homogeneous() && last.value() == bit {
                *last = Bits::repeat(bit, last.size() + n);
                return;
            }
            if last.size() < word::WIDTH {
                // Pack into the trailing partial word.
                let take = n.min(word::WIDTH - last.size());
                let data = if bit {
                    last.data() | (word::lsb_fill(take) << last.size())
                } else {
                    last.data()
                };
                *last = Bits::new(data, last.size() + take);
                let rest = n - take;
                if rest > 0 {
                    self.blocks.push(Bits::repeat(bit, rest));
                }
                return;
            }
        }
        self.blocks.push(Bits::repeat(bit, n));
    }

    /// Appends a literal block of *n* bits taken from the low end of *x*.
    ///
    /// Pre: `1 <= n <= WIDTH`.
    pub fn append_block(&mut self, x: u64, n: u64) {
        assert!(n >= 1 && n <= word::WIDTH, "literal block exceeds word width");
        let x = if n < word::WIDTH {
            x & word::lsb_mask(n)
        } else {
            x
        };
        if word::all_or_none_n(x, n) {
            // Homogeneous literals take the append_bits path so fills keep
            // coalescing.
            self.append_bits(x != word::NONE, n);
            return;
        }
        self.size += n;
        if let Some(last) = self.blocks.last_mut() {
            if last.size() < word::WIDTH {
                let take = n.min(word::WIDTH - last.size());
                let merged = last.data() | ((x & word::lsb_fill(take)) << last.size());
                *last = Bits::new(merged, last.size() + take);
                let rest = n - take;
                if rest > 0 {
                    self.blocks.push(Bits::new(x >> take, rest));
                }
                return;
            }
        }
        self.blocks.push(Bits::new(x, n));
    }

    /// Appends a whole [`Bits`] block, preserving the invariants.
    pub fn append(&mut self, bits: Bits) {
        if bits.homogeneous() {
            self.append_bits(bits.value(), bits.size());
        } else {
            self.append_block(bits.data(), bits.size());
        }
    }

    /// An iterator over the positions of all *set* bits, in order.
    pub fn ones(&self) -> Ones<'_> {
        Ones {
            blocks: &self.blocks,
            index: 0,
            base: 0,
            word: 0,
            word_base: 0,
            fill_next: 0,
            fill_end: 0,
        }
    }
}

/// Iterator over set-bit positions of a [`Bitmap`].
pub struct Ones<'a> {
    blocks: &'a [Bits],
    index: usize,
    base: u64,
    word: u64,
    word_base: u64,
    fill_next: u64,
    fill_end: u64,
}

impl Iterator for Ones<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        loop {
            if self.fill_next < self.fill_end {
                let pos = self.fill_next;
                self.fill_next += 1;
                return Some(pos);
            }
            if self.word != 0 {
                let pos = self.word_base + word::count_trailing_zeros(self.word);
                self.word &= self.word - 1;
                return Some(pos);
            }
            let block = self.blocks.get(self.index)?;
            self.index += 1;
            let base = self.base;
            self.base += block.size();
            if block.homogeneous() {
                if block.value() {
                    self.fill_next = base;
                    self.fill_end = base + block.size();
                }
            } else {
                self.word = block.data();
                self.word_base = base;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_coalesces_fills() {
        let mut bm = Bitmap::new();
        bm.append_bits(true, 64);
        bm.append_bits(true, 100);
        assert_eq!(bm.blocks().len(), 1);
        assert_eq!(bm.size(), 164);
        assert_eq!(bm.count(true), 164);
    }

    #[test]
    fn test_append_grows_literal_into_fill() {
        let mut bm = Bitmap::new();
        bm.append_bits(false, 10);
        bm.append_bits(false, 100);
        assert_eq!(bm.blocks().len(), 1);
        assert!(bm.blocks()[0].is_fill());
        assert_eq!(bm.count(false), 110);
    }

    #[test]
    fn test_append_packs_partial_words() {
        let mut bm = Bitmap::new();
        bm.append_block(0b1010, 4);
        bm.append_block(0b0110, 4);
        assert_eq!(bm.blocks().len(), 1);
        assert_eq!(bm.size(), 8);
        assert_eq!(bm.blocks()[0].data(), 0b0110_1010);
    }

    #[test]
    fn test_append_block_spills() {
        let mut bm = Bitmap::new();
        bm.append_block(0b01, 2);
        bm.append_block(word::ALL >> 1, 63);
        assert_eq!(bm.size(), 65);
        assert_eq!(bm.count(true), 64);
        // First word is full, one bit spilled into a second block.
        assert_eq!(bm.blocks().len(), 2);
    }

    #[test]
    fn test_scenario_mixed_bits() {
        // [1,1,0,0,0,0,0,0,1]
        let bm = Bitmap::from_bits([
            true, true, false, false, false, false, false, false, true,
        ]);
        assert_eq!(bm.size(), 9);
        assert_eq!(bm.count(true), 3);
        assert_eq!(bm.count(false), 6);
        assert_eq!(bm.get(0), true);
        assert_eq!(bm.get(2), false);
        assert_eq!(bm.get(8), true);
    }

    #[test]
    fn test_count_partition() {
        let mut bm = Bitmap::new();
        bm.append_bits(true, 70);
        bm.append_block(0b101, 3);
        bm.append_bits(false, 200);
        assert_eq!(bm.count(true) + bm.count(false), bm.size());
    }

    #[test]
    fn test_ones_iteration() {
        let mut bm = Bitmap::new();
        bm.append_block(0b101, 3);
        bm.append_bits(false, 64);
        bm.append_bits(true, 64);
        let ones: Vec<u64> = bm.ones().collect();
        let mut expected = vec![0, 2];
        expected.extend(67..131);
        assert_eq!(ones, expected);
    }

    #[test]
    fn test_ones_on_empty() {
        assert_eq!(Bitmap::new().ones().count(), 0);
    }
}
