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

//! Per-event-type indexing
//!
//! An [`EventIndexer`] holds one value index per leaf field of its
//! schema, addressed by record offset path. The [`IndexSet`] aggregates
//! all event types plus the meta indexes over event name, time, and ID,
//! and is the lookup surface the predicate engine dispatches to. Bitmap
//! positions are event IDs throughout.

use std::collections::HashMap;

use tracing::debug;

use vast_bitmap::{ops, Bitmap};
use vast_core::{
    Event, EventSchema, OffsetPath, RelOp, Result, SchemaRegistry, TypeSpec, Value, ValueKind,
    VastError,
};

use crate::address::AddressIndex;
use crate::arithmetic::ArithmeticIndex;
use crate::container::ContainerIndex;
use crate::pattern::PatternIndex;
use crate::port::PortIndex;
use crate::string::StringIndex;
use crate::subnet::SubnetIndex;
use crate::value_index::{IndexBase, ValueIndex};

/// Creates the value index matching a field type.
pub fn index_for(spec: &TypeSpec) -> Box<dyn ValueIndex> {
    match spec {
        TypeSpec::Bool
        | TypeSpec::Int
        | TypeSpec::UInt
        | TypeSpec::Double
        | TypeSpec::Duration
        | TypeSpec::Time => Box::new(ArithmeticIndex::new(spec.kind())),
        TypeSpec::String => Box::new(StringIndex::new()),
        TypeSpec::Pattern => Box::new(PatternIndex::new()),
        TypeSpec::Address => Box::new(AddressIndex::new()),
        TypeSpec::Subnet => Box::new(SubnetIndex::new()),
        TypeSpec::Port => Box::new(PortIndex::new()),
        TypeSpec::Vector(_) | TypeSpec::Set(_) | TypeSpec::Table(..) => {
            Box::new(ContainerIndex::new())
        }
        TypeSpec::Record(_) => unreachable!("records flatten into leaf fields"),
    }
}

struct FieldIndexer {
    path: OffsetPath,
    spec: TypeSpec,
    index: Box<dyn ValueIndex>,
}

/// All field indexes of one event type.
pub struct EventIndexer {
    schema: EventSchema,
    fields: Vec<FieldIndexer>,
}

impl EventIndexer {
    pub fn new(schema: EventSchema) -> Self {
        let mut fields = Vec::new();
        let mut path = OffsetPath::new();
        for (i, field) in schema.fields().iter().enumerate() {
            path.push(i);
            flatten(&field.spec, &mut path, &mut fields);
            path.pop();
        }
        debug!(event = schema.name(), fields = fields.len(), "created indexer");
        EventIndexer { schema, fields }
    }

    pub fn schema(&self) -> &EventSchema {
        &self.schema
    }

    /// Indexes all leaf fields of one event at its ID.
    pub fn push(&mut self, event: &Event) -> Result<()> {
        debug_assert_eq!(event.name(), self.schema.name());
        for field in &mut self.fields {
            let value = match event.data().at(&field.path) {
                Some(Value::None) | None => None,
                Some(v) => Some(v),
            };
            field.index.push(event.id(), value)?;
        }
        Ok(())
    }

    /// Looks up a predicate against the field at *path*.
    pub fn lookup(&self, path: &[usize], op: RelOp, value: &Value) -> Result<Bitmap> {
        let field = self
            .fields
            .iter()
            .find(|f| f.path.as_slice() == path)
            .ok_or_else(|| {
                VastError::validation(format!(
                    "event type {} has no indexed field at offset {:?}",
                    self.schema.name(),
                    path
                ))
            })?;
        field.index.lookup(op, value)
    }

    /// ORs the lookup across all fields of the given type.
    pub fn lookup_type(&self, kind: ValueKind, op: RelOp, value: &Value) -> Result<Bitmap> {
        let mut result = Bitmap::new();
        for field in &self.fields {
            if field.spec.kind() != kind {
                continue;
            }
            let partial = field.index.lookup(op, value)?;
            result = ops::or(&result, &partial);
        }
        Ok(result)
    }
}

fn flatten(spec: &TypeSpec, path: &mut OffsetPath, out: &mut Vec<FieldIndexer>) {
    match spec {
        TypeSpec::Record(fields) => {
            for (i, field) in fields.iter().enumerate() {
                path.push(i);
                flatten(&field.spec, path, out);
                path.pop();
            }
        }
        leaf => out.push(FieldIndexer {
            path: path.clone(),
            spec: leaf.clone(),
            index: index_for(leaf),
        }),
    }
}

/// Meta index over event IDs. IDs are the bitmap positions themselves,
/// so every lookup is computed from the universe instead of stored.
#[derive(Debug, Clone, Default)]
struct IdIndex {
    base: IndexBase,
}

impl IdIndex {
    fn occupy(&mut self, id: u64) {
        self.base.occupy(id, true);
    }

    fn lookup(&self, op: RelOp, value: &Value) -> Result<Bitmap> {
        let Value::UInt(k) = value else {
            return Err(VastError::validation(format!(
                "id lookup expects uint, got {}",
                value.kind()
            )));
        };
        let len = self.base.len();
        let prefix = |n: u64| {
            // Ones in [0, n), clipped to the index length.
            let n = n.min(len);
            let mut bm = Bitmap::new();
            bm.append_bits(true, n);
            bm.append_bits(false, len - n);
            bm
        };
        let result = match op {
            RelOp::Equal => {
                let mut bm = Bitmap::new();
                if *k < len {
                    bm.append_bits(false, *k);
                    bm.append_bits(true, 1);
                    bm.append_bits(false, len - k - 1);
                } else {
                    bm.append_bits(false, len);
                }
                ops::and(&bm, self.base.universe())
            }
            RelOp::NotEqual => {
                let eq = self.lookup(RelOp::Equal, value)?;
                self.base.complement(&eq)
            }
            RelOp::Less => ops::and(&prefix(*k), self.base.universe()),
            RelOp::LessEqual => ops::and(&prefix(k.saturating_add(1)), self.base.universe()),
            RelOp::Greater => {
                let le = ops::and(&prefix(k.saturating_add(1)), self.base.universe());
                self.base.complement(&le)
            }
            RelOp::GreaterEqual => {
                let lt = ops::and(&prefix(*k), self.base.universe());
                self.base.complement(&lt)
            }
            other => {
                return Err(VastError::validation(format!(
                    "operator {} not supported on event IDs",
                    other
                )))
            }
        };
        Ok(result)
    }
}

/// Meta indexes over the event envelope: name, time, and ID.
pub struct TagIndexer {
    name: StringIndex,
    time: ArithmeticIndex,
    id: IdIndex,
}

impl TagIndexer {
    pub fn new() -> Self {
        TagIndexer {
            name: StringIndex::new(),
            time: ArithmeticIndex::new(ValueKind::Time),
            id: IdIndex::default(),
        }
    }

    pub fn push(&mut self, event: &Event) -> Result<()> {
        let name = Value::Str(event.name().to_string());
        self.name.push(event.id(), Some(&name))?;
        let time = Value::Time(event.timestamp());
        self.time.push(event.id(), Some(&time))?;
        self.id.occupy(event.id());
        Ok(())
    }
}

impl Default for TagIndexer {
    fn default() -> Self {
        TagIndexer::new()
    }
}

/// What a predicate leaf addresses.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupTarget {
    /// A concrete field of one event type, by resolved offset path.
    Field { event: String, path: OffsetPath },
    /// All fields of a given type, across all event types.
    Type(ValueKind),
    /// The event name.
    Name,
    /// The event timestamp.
    Time,
    /// The event ID.
    Id,
}

/// The full index state of a node: every event type plus the meta
/// indexes, aligned on the event-ID position space.
pub struct IndexSet {
    registry: SchemaRegistry,
    indexers: HashMap<String, EventIndexer>,
    tags: TagIndexer,
    size: u64,
}

impl IndexSet {
    pub fn new(registry: SchemaRegistry) -> Self {
        IndexSet {
            registry,
            indexers: HashMap::new(),
            tags: TagIndexer::new(),
            size: 0,
        }
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// The number of positions in the event-ID space covered so far.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Indexes one stamped event.
    pub fn push(&mut self, event: &Event) -> Result<()> {
        let schema = self
            .registry
            .get(event.name())
            .ok_or_else(|| {
                VastError::validation(format!("no schema for event type {}", event.name()))
            })?
            .clone();
        self.tags.push(event)?;
        self.indexers
            .entry(event.name().to_string())
            .or_insert_with(|| EventIndexer::new(schema))
            .push(event)?;
        self.size = self.size.max(event.id() + 1);
        Ok(())
    }

    /// Evaluates one predicate leaf to a bitmap of length [`size`](Self::size).
    pub fn lookup(&self, target: &LookupTarget, op: RelOp, value: &Value) -> Result<Bitmap> {
        let result = match target {
            LookupTarget::Field { event, path } => match self.indexers.get(event) {
                Some(indexer) => indexer.lookup(path, op, value)?,
                None => Bitmap::new(),
            },
            LookupTarget::Type(kind) => {
                let mut result = Bitmap::new();
                for indexer in self.indexers.values() {
                    let partial = indexer.lookup_type(*kind, op, value)?;
                    result = ops::or(&result, &partial);
                }
                result
            }
            LookupTarget::Name => self.tags.name.lookup(op, value)?,
            LookupTarget::Time => self.tags.time.lookup(op, value)?,
            LookupTarget::Id => self.tags.id.lookup(op, value)?,
        };
        Ok(self.align(result))
    }

    fn align(&self, mut bm: Bitmap) -> Bitmap {
        debug_assert!(bm.size() <= self.size);
        bm.append_bits(false, self.size - bm.size());
        bm
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vast_core::{Duration, FieldSpec, Pattern, Timestamp};

    fn registry() -> SchemaRegistry {
        let mut registry = SchemaRegistry::new();
        registry.register(
            EventSchema::new("conn")
                .field("duration", TypeSpec::Duration)
                .field(
                    "id",
                    TypeSpec::Record(vec![
                        FieldSpec::new("orig_h", TypeSpec::Address),
                        FieldSpec::new("resp_h", TypeSpec::Address),
                    ]),
                ),
        );
        registry.register(EventSchema::new("dns").field("query", TypeSpec::String));
        registry
    }

    fn conn(id: u64, secs: f64, resp_h: &str) -> Event {
        let mut e = Event::new(
            "conn",
            Timestamp::from_secs(id as i64),
            Value::Record(vec![
                Value::Duration(Duration::from_secs_f64(secs)),
                Value::Record(vec![
                    Value::Address("10.0.0.1".parse().unwrap()),
                    Value::Address(resp_h.parse().unwrap()),
                ]),
            ]),
        );
        e.set_id(id);
        e
    }

    #[test]
    fn test_field_lookup() {
        let mut set = IndexSet::new(registry());
        set.push(&conn(0, 1.5, "192.168.1.5")).unwrap();
        set.push(&conn(1, 0.5, "192.168.1.5")).unwrap();
        set.push(&conn(2, 2.0, "10.0.0.1")).unwrap();
        let target = LookupTarget::Field {
            event: "conn".into(),
            path: OffsetPath::from_slice(&[0]),
        };
        let hits = set
            .lookup(
                &target,
                RelOp::Greater,
                &Value::Duration(Duration::from_secs(1)),
            )
            .unwrap();
        assert_eq!(hits.ones().collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn test_name_tag_lookup() {
        let mut set = IndexSet::new(registry());
        let mut e = Event::new(
            "dns",
            Timestamp::from_secs(0),
            Value::Record(vec![Value::Str("example.com".into())]),
        );
        e.set_id(0);
        set.push(&e).unwrap();
        set.push(&conn(1, 1.0, "10.0.0.1")).unwrap();
        let p = Value::Pattern(Pattern::new("co.*").unwrap());
        let hits = set.lookup(&LookupTarget::Name, RelOp::Match, &p).unwrap();
        assert_eq!(hits.ones().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_id_lookup() {
        let mut set = IndexSet::new(registry());
        for i in 0..5 {
            set.push(&conn(i, 1.0, "10.0.0.1")).unwrap();
        }
        let hits = set
            .lookup(&LookupTarget::Id, RelOp::GreaterEqual, &Value::UInt(3))
            .unwrap();
        assert_eq!(hits.ones().collect::<Vec<_>>(), vec![3, 4]);
    }

    #[test]
    fn test_type_lookup_spans_event_types() {
        let mut set = IndexSet::new(registry());
        set.push(&conn(0, 1.0, "192.168.1.5")).unwrap();
        let mut e = Event::new(
            "dns",
            Timestamp::from_secs(1),
            Value::Record(vec![Value::Str("example.com".into())]),
        );
        e.set_id(1);
        set.push(&e).unwrap();
        let hits = set
            .lookup(
                &LookupTarget::Type(ValueKind::String),
                RelOp::Equal,
                &Value::Str("example.com".into()),
            )
            .unwrap();
        assert_eq!(hits.ones().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_lookup_aligns_to_size() {
        let mut set = IndexSet::new(registry());
        set.push(&conn(0, 1.0, "10.0.0.1")).unwrap();
        let mut e = Event::new(
            "dns",
            Timestamp::from_secs(1),
            Value::Record(vec![Value::Str("x".into())]),
        );
        e.set_id(1);
        set.push(&e).unwrap();
        let target = LookupTarget::Field {
            event: "conn".into(),
            path: OffsetPath::from_slice(&[0]),
        };
        let hits = set
            .lookup(
                &target,
                RelOp::Equal,
                &Value::Duration(Duration::from_secs(1)),
            )
            .unwrap();
        assert_eq!(hits.size(), 2);
    }
}
