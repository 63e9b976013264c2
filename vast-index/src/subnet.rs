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

//! Subnet index
//!
//! Fields whose values are subnets, keyed by `(network, prefix length)`
//! in the IPv4-mapped space. Supports equality, plus `in` with an
//! address constant: the positions whose subnet contains the address.

use std::collections::HashMap;

use vast_bitmap::{ops, Bitmap};
use vast_core::{address_bits, RelOp, Result, Value, VastError};

use crate::value_index::{mark, IndexBase, ValueIndex};

#[derive(Debug, Clone, Default)]
pub struct SubnetIndex {
    base: IndexBase,
    keys: HashMap<(u128, u8), Bitmap>,
}

impl SubnetIndex {
    pub fn new() -> Self {
        SubnetIndex::default()
    }

    fn containing(&self, addr: u128) -> Bitmap {
        let mut result = self.base.none();
        for (&(network, length), bm) in &self.keys {
            let matches = length == 0 || (addr >> (128 - length as u32)) == (network >> (128 - length as u32));
            if matches {
                result = ops::or(&result, &self.base.pad(bm.clone()));
            }
        }
        result
    }
}

impl ValueIndex for SubnetIndex {
    fn push(&mut self, position: u64, value: Option<&Value>) -> Result<()> {
        let Some(value) = value else {
            self.base.occupy(position, false);
            return Ok(());
        };
        let Value::Subnet(s) = value else {
            return Err(VastError::validation(format!(
                "subnet index cannot hold {}",
                value.kind()
            )));
        };
        self.base.occupy(position, true);
        let key = (address_bits(s.network()), s.mapped_length());
        mark(self.keys.entry(key).or_default(), position);
        Ok(())
    }

    fn lookup(&self, op: RelOp, value: &Value) -> Result<Bitmap> {
        match (op, value) {
            (RelOp::Equal | RelOp::NotEqual, Value::Subnet(s)) => {
                let key = (address_bits(s.network()), s.mapped_length());
                let eq = self.keys.get(&key).cloned().unwrap_or_default();
                if op == RelOp::Equal {
                    Ok(self.base.pad(eq))
                } else {
                    Ok(self.base.complement(&eq))
                }
            }
            (RelOp::In | RelOp::NotIn, Value::Address(a)) => {
                let hits = self.containing(address_bits(*a));
                if op == RelOp::In {
                    Ok(hits)
                } else {
                    Ok(self.base.complement(&hits))
                }
            }
            (op, rhs) => Err(VastError::validation(format!(
                "subnet index does not support {} {}",
                op,
                rhs.kind()
            ))),
        }
    }

    fn len(&self) -> u64 {
        self.base.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vast_core::Subnet;

    #[test]
    fn test_equality_and_containment() {
        let mut idx = SubnetIndex::new();
        let a = Value::Subnet(Subnet::new("192.168.0.0".parse().unwrap(), 16).unwrap());
        let b = Value::Subnet(Subnet::new("10.0.0.0".parse().unwrap(), 8).unwrap());
        idx.push(0, Some(&a)).unwrap();
        idx.push(1, Some(&b)).unwrap();
        let hits = idx.lookup(RelOp::Equal, &a).unwrap();
        assert_eq!(hits.ones().collect::<Vec<_>>(), vec![0]);
        let containing = idx
            .lookup(RelOp::In, &Value::Address("10.1.2.3".parse().unwrap()))
            .unwrap();
        assert_eq!(containing.ones().collect::<Vec<_>>(), vec![1]);
    }
}
