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

//! Port index
//!
//! The port number is bit-sliced over 16 bits for range queries; the
//! protocol is categorical. A query with an unknown protocol matches any
//! protocol, so `80/?` finds both `80/tcp` and `80/udp`.

use std::collections::HashMap;

use vast_bitmap::{ops, Bitmap};
use vast_core::{Port, PortProto, RelOp, Result, Value, VastError};

use crate::value_index::{mark, IndexBase, ValueIndex};

const PORT_BITS: usize = 16;

#[derive(Debug, Clone)]
pub struct PortIndex {
    base: IndexBase,
    slices: Vec<Bitmap>,
    protos: HashMap<PortProto, Bitmap>,
}

impl PortIndex {
    pub fn new() -> Self {
        PortIndex {
            base: IndexBase::new(),
            slices: vec![Bitmap::new(); PORT_BITS],
            protos: HashMap::new(),
        }
    }

    fn decompose(&self, number: u16) -> (Bitmap, Bitmap) {
        let mut less = self.base.none();
        let mut equal = self.base.universe().clone();
        for bit in (0..PORT_BITS).rev() {
            let slice = self.base.pad(self.slices[bit].clone());
            if number & (1 << bit) != 0 {
                less = ops::or(&less, &ops::nand(&equal, &slice));
                equal = ops::and(&equal, &slice);
            } else {
                equal = ops::nand(&equal, &slice);
            }
        }
        (less, equal)
    }

    /// Restricts a number match to the queried protocol, unless it is
    /// unknown.
    fn filter_proto(&self, bm: Bitmap, proto: PortProto) -> Bitmap {
        if proto == PortProto::Unknown {
            return bm;
        }
        let protos = self
            .protos
            .get(&proto)
            .map(|p| self.base.pad(p.clone()))
            .unwrap_or_else(|| self.base.none());
        ops::and(&bm, &protos)
    }
}

impl Default for PortIndex {
    fn default() -> Self {
        PortIndex::new()
    }
}

impl ValueIndex for PortIndex {
    fn push(&mut self, position: u64, value: Option<&Value>) -> Result<()> {
        let Some(value) = value else {
            self.base.occupy(position, false);
            return Ok(());
        };
        let Value::Port(port) = value else {
            return Err(VastError::validation(format!(
                "port index cannot hold {}",
                value.kind()
            )));
        };
        self.base.occupy(position, true);
        for (bit, slice) in self.slices.iter_mut().enumerate() {
            if port.number & (1 << bit) != 0 {
                mark(slice, position);
            }
        }
        mark(self.protos.entry(port.proto).or_default(), position);
        Ok(())
    }

    fn lookup(&self, op: RelOp, value: &Value) -> Result<Bitmap> {
        let Value::Port(Port { number, proto }) = value else {
            return Err(VastError::validation(format!(
                "port index expects a port, got {}",
                value.kind()
            )));
        };
        let (less, equal) = self.decompose(*number);
        let result = match op {
            RelOp::Equal => self.filter_proto(equal, *proto),
            RelOp::NotEqual => {
                let eq = self.filter_proto(equal, *proto);
                self.base.complement(&eq)
            }
            RelOp::Less => less,
            RelOp::LessEqual => ops::or(&less, &equal),
            RelOp::Greater => self.base.complement(&ops::or(&less, &equal)),
            RelOp::GreaterEqual => self.base.complement(&less),
            other => {
                return Err(VastError::validation(format!(
                    "port index does not support {}",
                    other
                )))
            }
        };
        Ok(result)
    }

    fn len(&self) -> u64 {
        self.base.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port(number: u16, proto: PortProto) -> Value {
        Value::Port(Port::new(number, proto))
    }

    fn index_of(ports: &[(u16, PortProto)]) -> PortIndex {
        let mut idx = PortIndex::new();
        for (i, &(n, p)) in ports.iter().enumerate() {
            idx.push(i as u64, Some(&port(n, p))).unwrap();
        }
        idx
    }

    #[test]
    fn test_equality_with_proto() {
        let idx = index_of(&[
            (80, PortProto::Tcp),
            (80, PortProto::Udp),
            (443, PortProto::Tcp),
        ]);
        let hits = idx
            .lookup(RelOp::Equal, &port(80, PortProto::Tcp))
            .unwrap();
        assert_eq!(hits.ones().collect::<Vec<_>>(), vec![0]);
        // Unknown protocol matches any.
        let hits = idx
            .lookup(RelOp::Equal, &port(80, PortProto::Unknown))
            .unwrap();
        assert_eq!(hits.ones().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn test_number_range() {
        let idx = index_of(&[
            (22, PortProto::Tcp),
            (80, PortProto::Tcp),
            (8080, PortProto::Tcp),
            (53, PortProto::Udp),
        ]);
        let hits = idx
            .lookup(RelOp::Less, &port(1024, PortProto::Unknown))
            .unwrap();
        assert_eq!(hits.ones().collect::<Vec<_>>(), vec![0, 1, 3]);
        let hits = idx
            .lookup(RelOp::GreaterEqual, &port(80, PortProto::Unknown))
            .unwrap();
        assert_eq!(hits.ones().collect::<Vec<_>>(), vec![1, 2]);
    }
}
