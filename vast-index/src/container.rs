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

//! Container indexes
//!
//! Vectors, sets, and tables index their elements into one keyed posting
//! map; a position matches when *any* element satisfies the predicate.
//! Negated operators are the complement of their positive form within
//! the universe, so `xs != 5` selects containers in which no element
//! equals 5. Nested containers flatten recursively; tables contribute
//! both keys and values.

use std::collections::HashMap;

use vast_bitmap::Bitmap;
use vast_core::{PortProto, RelOp, Result, Subnet, Value, ValueKind, VastError};

use crate::key;
use crate::value_index::{mark, IndexBase, ValueIndex};

/// Canonical, hashable form of an indexed element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ElementKey {
    /// Order-encoded arithmetic value, tagged with its kind.
    Numeric(ValueKind, u64),
    Str(String),
    Pattern(String),
    Addr(u128),
    Port(u16, PortProto),
    Subnet(u128, u8),
}

impl ElementKey {
    fn from_value(value: &Value) -> Option<ElementKey> {
        let k = match value {
            Value::Str(s) => ElementKey::Str(s.clone()),
            Value::Pattern(p) => ElementKey::Pattern(p.as_str().to_string()),
            Value::Address(a) => ElementKey::Addr(vast_core::address_bits(*a)),
            Value::Port(p) => ElementKey::Port(p.number, p.proto),
            Value::Subnet(s) => {
                ElementKey::Subnet(vast_core::address_bits(s.network()), s.mapped_length())
            }
            other => ElementKey::Numeric(other.kind(), key::encode(other)?),
        };
        Some(k)
    }

    /// Evaluates a positive operator against the query constant.
    fn matches(&self, op: RelOp, rhs: &Value) -> bool {
        use std::cmp::Ordering::*;
        match (self, rhs) {
            (ElementKey::Numeric(kind, k), rhs) if *kind == rhs.kind() => {
                let Some(rk) = key::encode(rhs) else {
                    return false;
                };
                match op {
                    RelOp::Equal => *k == rk,
                    RelOp::Less => *k < rk,
                    RelOp::LessEqual => *k <= rk,
                    RelOp::Greater => *k > rk,
                    RelOp::GreaterEqual => *k >= rk,
                    _ => false,
                }
            }
            (ElementKey::Str(s), Value::Str(q)) => match op {
                RelOp::Equal => s == q,
                RelOp::Less => s.cmp(q) == Less,
                RelOp::LessEqual => s.cmp(q) != Greater,
                RelOp::Greater => s.cmp(q) == Greater,
                RelOp::GreaterEqual => s.cmp(q) != Less,
                RelOp::In => q.contains(s.as_str()),
                _ => false,
            },
            (ElementKey::Str(s), Value::Pattern(p)) => {
                matches!(op, RelOp::Match | RelOp::In) && p.matches(s)
            }
            (ElementKey::Pattern(s), Value::Pattern(p)) => {
                matches!(op, RelOp::Equal | RelOp::Match) && s == p.as_str()
            }
            (ElementKey::Addr(bits), Value::Address(a)) => {
                op == RelOp::Equal && *bits == vast_core::address_bits(*a)
            }
            (ElementKey::Addr(bits), Value::Subnet(subnet)) => {
                op == RelOp::In && subnet_contains(subnet, *bits)
            }
            (ElementKey::Port(number, proto), Value::Port(q)) => {
                let proto_ok = q.proto == PortProto::Unknown || q.proto == *proto;
                match op {
                    RelOp::Equal => *number == q.number && proto_ok,
                    RelOp::Less => *number < q.number,
                    RelOp::LessEqual => *number <= q.number,
                    RelOp::Greater => *number > q.number,
                    RelOp::GreaterEqual => *number >= q.number,
                    _ => false,
                }
            }
            (ElementKey::Subnet(bits, length), Value::Subnet(q)) => {
                op == RelOp::Equal
                    && *bits == vast_core::address_bits(q.network())
                    && *length == q.mapped_length()
            }
            _ => false,
        }
    }
}

fn subnet_contains(subnet: &Subnet, addr_bits: u128) -> bool {
    let len = subnet.mapped_length() as u32;
    if len == 0 {
        return true;
    }
    let prefix = vast_core::address_bits(subnet.network()) >> (128 - len);
    addr_bits >> (128 - len) == prefix
}

/// Index over one container field.
#[derive(Debug, Clone, Default)]
pub struct ContainerIndex {
    base: IndexBase,
    elements: HashMap<ElementKey, Bitmap>,
}

impl ContainerIndex {
    pub fn new() -> Self {
        ContainerIndex::default()
    }

    fn index_elements(&mut self, position: u64, value: &Value) {
        match value {
            Value::Vector(xs) | Value::Set(xs) | Value::Record(xs) => {
                for x in xs {
                    self.index_elements(position, x);
                }
            }
            Value::Table(entries) => {
                for (k, v) in entries {
                    self.index_elements(position, k);
                    self.index_elements(position, v);
                }
            }
            Value::None | Value::Invalid => {}
            scalar => {
                if let Some(key) = ElementKey::from_value(scalar) {
                    mark(self.elements.entry(key).or_default(), position);
                }
            }
        }
    }

    fn union_matching(&self, op: RelOp, rhs: &Value) -> Bitmap {
        let mut result = self.base.none();
        for (key, bm) in &self.elements {
            if key.matches(op, rhs) {
                result = vast_bitmap::ops::or(&result, &self.base.pad(bm.clone()));
            }
        }
        result
    }
}

impl ValueIndex for ContainerIndex {
    fn push(&mut self, position: u64, value: Option<&Value>) -> Result<()> {
        let Some(value) = value else {
            self.base.occupy(position, false);
            return Ok(());
        };
        match value.kind() {
            ValueKind::Vector | ValueKind::Set | ValueKind::Table => {}
            other => {
                return Err(VastError::validation(format!(
                    "container index cannot hold {}",
                    other
                )))
            }
        }
        self.base.occupy(position, true);
        self.index_elements(position, value);
        Ok(())
    }

    fn lookup(&self, op: RelOp, value: &Value) -> Result<Bitmap> {
        if op.is_negative() {
            let hits = self.union_matching(op.negate(), value);
            Ok(self.base.complement(&hits))
        } else {
            Ok(self.union_matching(op, value))
        }
    }

    fn len(&self) -> u64 {
        self.base.len()
    }
}
