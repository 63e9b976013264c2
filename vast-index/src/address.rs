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

//! Address index
//!
//! IPv4 and IPv6 addresses share one bit-sliced layout over 128 bits,
//! with IPv4 stored as IPv4-mapped IPv6. A subnet membership test ANDs
//! exactly the slices covered by the prefix, so `in 10.0.0.0/8`
//! costs eight bitmap operations, not a key scan.

use vast_bitmap::{ops, Bitmap};
use vast_core::{address_bits, RelOp, Result, Subnet, Value, VastError};

use crate::value_index::{mark, IndexBase, ValueIndex};

const ADDR_BITS: usize = 128;

#[derive(Debug, Clone)]
pub struct AddressIndex {
    base: IndexBase,
    slices: Vec<Bitmap>,
}

impl AddressIndex {
    pub fn new() -> Self {
        AddressIndex {
            base: IndexBase::new(),
            slices: vec![Bitmap::new(); ADDR_BITS],
        }
    }

    /// Positions whose address shares the top *length* bits of *bits*.
    fn match_prefix(&self, bits: u128, length: u8) -> Bitmap {
        let mut result = self.base.universe().clone();
        for bit in (ADDR_BITS - length as usize..ADDR_BITS).rev() {
            let slice = self.base.pad(self.slices[bit].clone());
            if bits & (1u128 << bit) != 0 {
                result = ops::and(&result, &slice);
            } else {
                result = ops::nand(&result, &slice);
            }
        }
        result
    }
}

impl Default for AddressIndex {
    fn default() -> Self {
        AddressIndex::new()
    }
}

impl ValueIndex for AddressIndex {
    fn push(&mut self, position: u64, value: Option<&Value>) -> Result<()> {
        let Some(value) = value else {
            self.base.occupy(position, false);
            return Ok(());
        };
        let Value::Address(addr) = value else {
            return Err(VastError::validation(format!(
                "address index cannot hold {}",
                value.kind()
            )));
        };
        let bits = address_bits(*addr);
        self.base.occupy(position, true);
        for (bit, slice) in self.slices.iter_mut().enumerate() {
            if bits & (1u128 << bit) != 0 {
                mark(slice, position);
            }
        }
        Ok(())
    }

    fn lookup(&self, op: RelOp, value: &Value) -> Result<Bitmap> {
        match (op, value) {
            (RelOp::Equal, Value::Address(addr)) => {
                Ok(self.match_prefix(address_bits(*addr), 128))
            }
            (RelOp::NotEqual, Value::Address(addr)) => {
                let eq = self.match_prefix(address_bits(*addr), 128);
                Ok(self.base.complement(&eq))
            }
            (RelOp::In, Value::Subnet(subnet)) => Ok(self.match_subnet(subnet)),
            (RelOp::NotIn, Value::Subnet(subnet)) => {
                let hits = self.match_subnet(subnet);
                Ok(self.base.complement(&hits))
            }
            (op, rhs) => Err(VastError::validation(format!(
                "address index does not support {} {}",
                op,
                rhs.kind()
            ))),
        }
    }

    fn len(&self) -> u64 {
        self.base.len()
    }
}

impl AddressIndex {
    fn match_subnet(&self, subnet: &Subnet) -> Bitmap {
        self.match_prefix(address_bits(subnet.network()), subnet.mapped_length())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::IpAddr;

    fn index_of(addrs: &[&str]) -> AddressIndex {
        let mut idx = AddressIndex::new();
        for (i, a) in addrs.iter().enumerate() {
            let addr = Value::Address(a.parse::<IpAddr>().unwrap());
            idx.push(i as u64, Some(&addr)).unwrap();
        }
        idx
    }

    #[test]
    fn test_equality() {
        let idx = index_of(&["192.168.1.5", "10.0.0.1", "192.168.1.5"]);
        let addr = Value::Address("192.168.1.5".parse().unwrap());
        let hits = idx.lookup(RelOp::Equal, &addr).unwrap();
        assert_eq!(hits.ones().collect::<Vec<_>>(), vec![0, 2]);
        let miss = idx.lookup(RelOp::NotEqual, &addr).unwrap();
        assert_eq!(miss.ones().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_subnet_membership() {
        let idx = index_of(&["192.168.1.5", "192.168.200.7", "10.0.0.1"]);
        let subnet = Subnet::new("192.168.0.0".parse().unwrap(), 16).unwrap();
        let hits = idx.lookup(RelOp::In, &Value::Subnet(subnet)).unwrap();
        assert_eq!(hits.ones().collect::<Vec<_>>(), vec![0, 1]);
        let miss = idx.lookup(RelOp::NotIn, &Value::Subnet(subnet)).unwrap();
        assert_eq!(miss.ones().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_v6_alongside_v4() {
        let idx = index_of(&["2001:db8::1", "192.168.1.5", "2001:db8::2"]);
        let subnet = Subnet::new("2001:db8::".parse().unwrap(), 32).unwrap();
        let hits = idx.lookup(RelOp::In, &Value::Subnet(subnet)).unwrap();
        assert_eq!(hits.ones().collect::<Vec<_>>(), vec![0, 2]);
    }
}
