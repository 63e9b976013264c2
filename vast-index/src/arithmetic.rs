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

//! Bit-sliced arithmetic index
//!
//! Indexes `bool`, `int`, `uint`, `double`, `duration`, and `time_point`
//! fields. Equality keeps one posting bitmap per distinct key; ranges use
//! the binary-coded layout with one bitmap per bit of the
//! order-preserving key, so an inequality decomposes into at most
//! `2 * 64` bitmap operations.

use std::collections::HashMap;

use vast_bitmap::{ops, Bitmap};
use vast_core::{RelOp, Result, Value, ValueKind, VastError};

use crate::key;
use crate::value_index::{mark, IndexBase, ValueIndex};

const KEY_BITS: usize = 64;

/// Index over one arithmetic field.
#[derive(Debug, Clone)]
pub struct ArithmeticIndex {
    kind: ValueKind,
    base: IndexBase,
    equality: HashMap<u64, Bitmap>,
    slices: Vec<Bitmap>,
}

impl ArithmeticIndex {
    pub fn new(kind: ValueKind) -> Self {
        assert!(key::encodable(kind), "not an arithmetic kind: {}", kind);
        ArithmeticIndex {
            kind,
            base: IndexBase::new(),
            equality: HashMap::new(),
            slices: vec![Bitmap::new(); KEY_BITS],
        }
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    fn encode_checked(&self, value: &Value) -> Result<u64> {
        if value.kind() != self.kind {
            return Err(VastError::validation(format!(
                "arithmetic index over {} cannot hold {}",
                self.kind,
                value.kind()
            )));
        }
        key::encode(value).ok_or_else(|| {
            VastError::validation(format!("value {} has no arithmetic key", value))
        })
    }

    /// Positions whose key is strictly less than *k*, and positions whose
    /// key equals *k*, via one walk over the bit slices from MSB down.
    fn decompose(&self, k: u64) -> (Bitmap, Bitmap) {
        let mut less = self.base.none();
        let mut equal = self.base.universe().clone();
        for bit in (0..KEY_BITS).rev() {
            let slice = self.base.pad(self.slices[bit].clone());
            if k & (1 << bit) != 0 {
                less = ops::or(&less, &ops::nand(&equal, &slice));
                equal = ops::and(&equal, &slice);
            } else {
                equal = ops::nand(&equal, &slice);
            }
        }
        (less, equal)
    }
}

impl ValueIndex for ArithmeticIndex {
    fn push(&mut self, position: u64, value: Option<&Value>) -> Result<()> {
        let Some(value) = value else {
            self.base.occupy(position, false);
            return Ok(());
        };
        let k = self.encode_checked(value)?;
        self.base.occupy(position, true);
        mark(self.equality.entry(k).or_default(), position);
        for (bit, slice) in self.slices.iter_mut().enumerate() {
            if k & (1 << bit) != 0 {
                mark(slice, position);
            }
        }
        Ok(())
    }

    fn lookup(&self, op: RelOp, value: &Value) -> Result<Bitmap> {
        let k = self.encode_checked(value)?;
        let result = match op {
            RelOp::Equal => self
                .equality
                .get(&k)
                .map(|bm| self.base.pad(bm.clone()))
                .unwrap_or_else(|| self.base.none()),
            RelOp::NotEqual => {
                let eq = self
                    .equality
                    .get(&k)
                    .cloned()
                    .unwrap_or_default();
                self.base.complement(&eq)
            }
            RelOp::Less => self.decompose(k).0,
            RelOp::LessEqual => {
                let (less, equal) = self.decompose(k);
                ops::or(&less, &equal)
            }
            RelOp::Greater => {
                let (less, equal) = self.decompose(k);
                self.base.complement(&ops::or(&less, &equal))
            }
            RelOp::GreaterEqual => {
                let (less, _) = self.decompose(k);
                self.base.complement(&less)
            }
            other => {
                return Err(VastError::validation(format!(
                    "operator {} not supported on {} fields",
                    other, self.kind
                )))
            }
        };
        Ok(result)
    }

    fn len(&self) -> u64 {
        self.base.len()
    }
}
