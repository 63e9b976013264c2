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

//! The uniform index interface
//!
//! Every typed index maps `(operator, value)` lookups to a bitmap over
//! event positions. Pushing `None` records "no value here" while still
//! advancing the position, so lookups stay aligned with the event ID
//! space, and the universe bitmap keeps complements well-defined.

use vast_bitmap::{ops, Bitmap};
use vast_core::{RelOp, Result, Value};

/// A typed index over one field.
pub trait ValueIndex: Send {
    /// Records the value at *position*. `None` marks an absent value.
    ///
    /// Pre: `position >= len()`; positions in between are marked absent.
    fn push(&mut self, position: u64, value: Option<&Value>) -> Result<()>;

    /// Evaluates `field op value` to a bitmap of length [`len`](Self::len).
    fn lookup(&self, op: RelOp, value: &Value) -> Result<Bitmap>;

    /// One past the highest position this index has seen.
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Universe tracking shared by all index implementations.
#[derive(Debug, Clone, Default)]
pub(crate) struct IndexBase {
    universe: Bitmap,
}

impl IndexBase {
    pub fn new() -> Self {
        IndexBase::default()
    }

    /// Advances to *position*, marking it present or absent. Skipped
    /// positions are absent.
    pub fn occupy(&mut self, position: u64, present: bool) {
        debug_assert!(position >= self.universe.size(), "index positions must advance");
        self.universe
            .append_bits(false, position - self.universe.size());
        self.universe.append_bits(present, 1);
    }

    pub fn len(&self) -> u64 {
        self.universe.size()
    }

    pub fn universe(&self) -> &Bitmap {
        &self.universe
    }

    /// `universe AND NOT bm`: the complement of a partial result within
    /// the positions that actually carry a value.
    pub fn complement(&self, bm: &Bitmap) -> Bitmap {
        ops::nand(&self.universe, &self.pad(bm.clone()))
    }

    /// Zero-extends a lazily grown posting bitmap to the index length.
    pub fn pad(&self, mut bm: Bitmap) -> Bitmap {
        debug_assert!(bm.size() <= self.len());
        bm.append_bits(false, self.len() - bm.size());
        bm
    }

    /// An all-false bitmap of the index length.
    pub fn none(&self) -> Bitmap {
        let mut bm = Bitmap::new();
        bm.append_bits(false, self.len());
        bm
    }
}

/// Sets *position* in a lazily grown posting bitmap.
///
/// Posting bitmaps only grow when their key occurs, so they are padded
/// with zeros up to the position first. Setting an already present
/// position is a no-op (containers may hold duplicate elements).
pub(crate) fn mark(bm: &mut Bitmap, position: u64) {
    if bm.size() > position {
        return;
    }
    bm.append_bits(false, position - bm.size());
    bm.append_bits(true, 1);
}
