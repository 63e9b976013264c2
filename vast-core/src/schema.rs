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

//! Event schemas
//!
//! A schema names an event type and describes its record structure. Query
//! validation resolves dotted field references against the registry into
//! record offset paths, so that execution never touches field names again.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{Result, VastError};
use crate::value::ValueKind;

/// Offsets into nested records, outermost first.
pub type OffsetPath = SmallVec<[usize; 4]>;

/// The type of a single field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeSpec {
    Bool,
    Int,
    UInt,
    Double,
    Duration,
    Time,
    String,
    Pattern,
    Address,
    Subnet,
    Port,
    Vector(Box<TypeSpec>),
    Set(Box<TypeSpec>),
    Table(Box<TypeSpec>, Box<TypeSpec>),
    Record(Vec<FieldSpec>),
}

impl TypeSpec {
    pub fn kind(&self) -> ValueKind {
        match self {
            TypeSpec::Bool => ValueKind::Bool,
            TypeSpec::Int => ValueKind::Int,
            TypeSpec::UInt => ValueKind::UInt,
            TypeSpec::Double => ValueKind::Double,
            TypeSpec::Duration => ValueKind::Duration,
            TypeSpec::Time => ValueKind::Time,
            TypeSpec::String => ValueKind::String,
            TypeSpec::Pattern => ValueKind::Pattern,
            TypeSpec::Address => ValueKind::Address,
            TypeSpec::Subnet => ValueKind::Subnet,
            TypeSpec::Port => ValueKind::Port,
            TypeSpec::Vector(_) => ValueKind::Vector,
            TypeSpec::Set(_) => ValueKind::Set,
            TypeSpec::Table(..) => ValueKind::Table,
            TypeSpec::Record(_) => ValueKind::Record,
        }
    }

    /// The scalar kinds a predicate on this field ultimately relates to.
    ///
    /// Containers contribute their element kinds (tables both key and
    /// value), matching the any-element lookup semantics of container
    /// indexes.
    pub fn scalar_kinds(&self) -> Vec<ValueKind> {
        match self {
            TypeSpec::Vector(elem) | TypeSpec::Set(elem) => elem.scalar_kinds(),
            TypeSpec::Table(key, value) => {
                let mut kinds = key.scalar_kinds();
                kinds.extend(value.scalar_kinds());
                kinds.dedup();
                kinds
            }
            TypeSpec::Record(_) => Vec::new(),
            other => vec![other.kind()],
        }
    }
}

/// A named field inside a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub spec: TypeSpec,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, spec: TypeSpec) -> Self {
        FieldSpec {
            name: name.into(),
            spec,
        }
    }
}

/// Schema of one event type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSchema {
    name: String,
    fields: Vec<FieldSpec>,
}

impl EventSchema {
    pub fn new(name: impl Into<String>) -> Self {
        EventSchema {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, spec: TypeSpec) -> Self {
        self.fields.push(FieldSpec::new(name, spec));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Resolves a dotted field path to a record offset path and the type
    /// of the addressed field.
    pub fn resolve(&self, path: &[impl AsRef<str>]) -> Result<(OffsetPath, &TypeSpec)> {
        if path.is_empty() {
            return Err(VastError::validation(format!(
                "empty field path for event type {}",
                self.name
            )));
        }
        let mut offsets = OffsetPath::new();
        let mut fields = &self.fields;
        let mut spec = None;
        for (depth, segment) in path.iter().enumerate() {
            let segment = segment.as_ref();
            let pos = fields
                .iter()
                .position(|f| f.name == segment)
                .ok_or_else(|| {
                    VastError::validation(format!(
                        "event type {} has no field {}",
                        self.name,
                        path[..=depth]
                            .iter()
                            .map(|s| s.as_ref())
                            .collect::<Vec<_>>()
                            .join(".")
                    ))
                })?;
            offsets.push(pos);
            spec = Some(&fields[pos].spec);
            match &fields[pos].spec {
                TypeSpec::Record(inner) => fields = inner,
                _ if depth + 1 < path.len() => {
                    return Err(VastError::validation(format!(
                        "field {} of event type {} is not a record",
                        segment, self.name
                    )));
                }
                _ => {}
            }
        }
        Ok((offsets, spec.unwrap()))
    }
}

/// Registry of all known event schemas.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, EventSchema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        SchemaRegistry::default()
    }

    pub fn register(&mut self, schema: EventSchema) {
        self.schemas.insert(schema.name().to_string(), schema);
    }

    pub fn get(&self, name: &str) -> Option<&EventSchema> {
        self.schemas.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EventSchema> {
        self.schemas.values()
    }

    /// Resolves `event.field[.field…]` against a registered schema.
    pub fn resolve(
        &self,
        event: &str,
        path: &[impl AsRef<str>],
    ) -> Result<(OffsetPath, &TypeSpec)> {
        let schema = self
            .schemas
            .get(event)
            .ok_or_else(|| VastError::validation(format!("unknown event type: {}", event)))?;
        schema.resolve(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn_schema() -> EventSchema {
        EventSchema::new("conn")
            .field("duration", TypeSpec::Duration)
            .field(
                "id",
                TypeSpec::Record(vec![
                    FieldSpec::new("orig_h", TypeSpec::Address),
                    FieldSpec::new("resp_h", TypeSpec::Address),
                    FieldSpec::new("resp_p", TypeSpec::Port),
                ]),
            )
    }

    #[test]
    fn test_resolve_top_level_field() {
        let schema = conn_schema();
        let (path, spec) = schema.resolve(&["duration"]).unwrap();
        assert_eq!(path.as_slice(), &[0]);
        assert_eq!(spec.kind(), ValueKind::Duration);
    }

    #[test]
    fn test_resolve_nested_field() {
        let schema = conn_schema();
        let (path, spec) = schema.resolve(&["id", "resp_h"]).unwrap();
        assert_eq!(path.as_slice(), &[1, 1]);
        assert_eq!(spec.kind(), ValueKind::Address);
    }

    #[test]
    fn test_resolve_unknown_field() {
        let schema = conn_schema();
        assert!(schema.resolve(&["nonexistent"]).is_err());
        assert!(schema.resolve(&["duration", "too_deep"]).is_err());
    }

    #[test]
    fn test_registry_unknown_event() {
        let mut registry = SchemaRegistry::new();
        registry.register(conn_schema());
        assert!(registry.resolve("conn", &["duration"]).is_ok());
        assert!(registry.resolve("dns", &["duration"]).is_err());
    }

    #[test]
    fn test_container_scalar_kinds() {
        let spec = TypeSpec::Set(Box::new(TypeSpec::Address));
        assert_eq!(spec.scalar_kinds(), vec![ValueKind::Address]);
        let spec = TypeSpec::Table(Box::new(TypeSpec::String), Box::new(TypeSpec::UInt));
        assert_eq!(spec.scalar_kinds(), vec![ValueKind::String, ValueKind::UInt]);
    }
}
