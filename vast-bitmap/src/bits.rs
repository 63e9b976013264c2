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

//! Bit sequences backed by a single word
//!
//! A [`Bits`] block encodes up to N bit positions in one machine word. If
//! N is at most the word width, the N least significant bits carry data
//! and the rest are zero. If N exceeds the word width, the word must be
//! all 0s or all 1s and the block represents a homogeneous *fill* of
//! length N.

use serde::{Deserialize, Serialize};

use crate::word;

/// A sequence of bits represented by a single word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bits {
    data: u64,
    size: u64,
}

impl Bits {
    /// Constructs a bit sequence of *n* bits from a word.
    ///
    /// Pre: `n > 0`, and `all_or_none(x)` whenever `n > WIDTH`.
    pub fn new(x: u64, n: u64) -> Self {
        debug_assert!(n > 0);
        debug_assert!(n <= word::WIDTH || word::all_or_none(x));
        let data = if n < word::WIDTH {
            x & word::lsb_mask(n)
        } else {
            x
        };
        Bits { data, size: n }
    }

    /// Constructs a homogeneous sequence of *n* copies of *bit*.
    pub fn repeat(bit: bool, n: u64) -> Self {
        debug_assert!(n > 0);
        let data = if !bit {
            word::NONE
        } else if n >= word::WIDTH {
            word::ALL
        } else {
            word::lsb_mask(n)
        };
        Bits { data, size: n }
    }

    pub fn data(&self) -> u64 {
        self.data
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Whether this block is a fill: homogeneous and at least a word wide.
    pub fn is_fill(&self) -> bool {
        self.size >= word::WIDTH && word::all_or_none(self.data)
    }

    /// Accesses the *i*-th bit.
    ///
    /// Pre: `i < size`.
    pub fn get(&self, i: u64) -> bool {
        debug_assert!(i < self.size);
        if self.size > word::WIDTH {
            self.data != word::NONE
        } else {
            word::test(self.data, i)
        }
    }

    /// Whether all bits have the same value.
    pub fn homogeneous(&self) -> bool {
        if self.size >= word::WIDTH {
            word::all_or_none(self.data)
        } else {
            word::all_or_none_n(self.data, self.size)
        }
    }

    /// The value of a homogeneous block.
    pub fn value(&self) -> bool {
        debug_assert!(self.homogeneous());
        self.data != word::NONE
    }

    /// The number of 1-bits in this sequence.
    pub fn count(&self) -> u64 {
        if self.size <= word::WIDTH {
            word::popcount(self.data)
        } else if self.data == word::ALL {
            self.size
        } else {
            0
        }
    }

    /// The number of *bit*-valued positions.
    pub fn count_bit(&self, bit: bool) -> u64 {
        if bit {
            self.count()
        } else {
            self.size - self.count()
        }
    }

    /// Position of the first *bit*-valued position, or `NPOS`.
    pub fn find_first(&self, bit: bool) -> u64 {
        let data = if bit { self.data } else { !self.data };
        if self.size > word::WIDTH {
            return if data == word::ALL { 0 } else { word::NPOS };
        }
        let data = data & word::lsb_fill(self.size);
        if data == word::NONE {
            word::NPOS
        } else {
            word::count_trailing_zeros(data)
        }
    }

    /// Position of the next *bit*-valued position strictly after *i*, or
    /// `NPOS`.
    pub fn find_next(&self, bit: bool, i: u64) -> u64 {
        if i + 1 >= self.size {
            return word::NPOS;
        }
        let data = if bit { self.data } else { !self.data };
        if self.size > word::WIDTH {
            return if data == word::ALL { i + 1 } else { word::NPOS };
        }
        let data = data & word::lsb_fill(self.size) & !word::lsb_fill(i + 1);
        if data == word::NONE {
            word::NPOS
        } else {
            word::count_trailing_zeros(data)
        }
    }

    /// Position of the last *bit*-valued position, or `NPOS`.
    pub fn find_last(&self, bit: bool) -> u64 {
        let data = if bit { self.data } else { !self.data };
        if self.size > word::WIDTH {
            return if data == word::ALL {
                self.size - 1
            } else {
                word::NPOS
            };
        }
        let data = data & word::lsb_fill(self.size);
        if data == word::NONE {
            word::NPOS
        } else {
            word::WIDTH - word::count_leading_zeros(data) - 1
        }
    }

    /// Number of *bit*-valued positions in `[0, i]`.
    ///
    /// Pre: `i < size`.
    pub fn rank(&self, bit: bool, i: u64) -> u64 {
        debug_assert!(i < self.size);
        if self.size > word::WIDTH {
            let matches = (self.data == word::ALL) == bit;
            return if matches { i + 1 } else { 0 };
        }
        let data = if bit { self.data } else { !self.data & word::lsb_fill(self.size) };
        word::rank(data, i)
    }

    /// Position of the *i*-th *bit*-valued position (1-based), or `NPOS`.
    ///
    /// Pre: `i > 0 && i <= size`.
    pub fn select(&self, bit: bool, i: u64) -> u64 {
        debug_assert!(i > 0);
        debug_assert!(i <= self.size);
        if self.size > word::WIDTH {
            let matches = (self.data == word::ALL) == bit;
            return if matches { i - 1 } else { word::NPOS };
        }
        let data = if bit { self.data } else { !self.data & word::lsb_fill(self.size) };
        word::select(data, i)
    }
}
