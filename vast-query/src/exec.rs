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

//! Plan execution
//!
//! Evaluates a validated plan bottom-up: each leaf becomes an index
//! lookup, inner nodes combine partial bitmaps with `AND`/`OR`. Leaf
//! evaluation is pluggable so the node layer can dispatch leaves to
//! indexer actors and combine the partial bitmaps as they stream back;
//! ordering does not matter because the combinators are commutative and
//! associative.

use vast_bitmap::{ops, Bitmap};
use vast_core::{EventId, Result};
use vast_index::IndexSet;

use crate::validate::{Plan, ResolvedPredicate};

/// Evaluates a plan with a caller-supplied leaf evaluator.
pub fn evaluate_with<F>(plan: &Plan, lookup: &mut F) -> Result<Bitmap>
where
    F: FnMut(&ResolvedPredicate) -> Result<Bitmap>,
{
    match plan {
        Plan::Leaf(p) => lookup(p),
        Plan::And(a, b) => {
            let lhs = evaluate_with(a, lookup)?;
            let rhs = evaluate_with(b, lookup)?;
            Ok(ops::and(&lhs, &rhs))
        }
        Plan::Or(a, b) => {
            let lhs = evaluate_with(a, lookup)?;
            let rhs = evaluate_with(b, lookup)?;
            Ok(ops::or(&lhs, &rhs))
        }
    }
}

/// Executes a plan directly against an index set.
pub fn execute(plan: &Plan, index: &IndexSet) -> Result<Bitmap> {
    let mut result = evaluate_with(plan, &mut |p: &ResolvedPredicate| {
        index.lookup(&p.target, p.op, &p.value)
    })?;
    // Align to the full event count; positions no leaf covered are
    // non-matches.
    debug_assert!(result.size() <= index.size());
    result.append_bits(false, index.size() - result.size());
    Ok(result)
}

/// Enumerates the IDs of matching events.
pub fn matching_ids(bitmap: &Bitmap) -> Vec<EventId> {
    bitmap.ones().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile;
    use vast_core::{
        Duration, Event, EventSchema, FieldSpec, SchemaRegistry, Timestamp, TypeSpec, Value,
    };

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
        registry.register(EventSchema::new("http_req").field("uri", TypeSpec::String));
        registry.register(EventSchema::new("dns").field("query", TypeSpec::String));
        registry.register(EventSchema::new("http_resp").field("code", TypeSpec::UInt));
        registry
    }

    fn conn(id: u64, secs: f64, resp_h: &str) -> Event {
        let mut e = Event::new(
            "conn",
            Timestamp::from_secs(id as i64),
            Value::Record(vec![
                Value::Duration(Duration::from_secs_f64(secs)),
                Value::Record(vec![
                    Value::Address("10.0.0.99".parse().unwrap()),
                    Value::Address(resp_h.parse().unwrap()),
                ]),
            ]),
        );
        e.set_id(id);
        e
    }

    fn indexed_conns() -> IndexSet {
        let mut set = IndexSet::new(registry());
        set.push(&conn(0, 1.5, "192.168.1.5")).unwrap();
        set.push(&conn(1, 0.5, "192.168.1.5")).unwrap();
        set.push(&conn(2, 2.0, "10.0.0.1")).unwrap();
        set
    }

    #[test]
    fn test_conjunctive_query() {
        let set = indexed_conns();
        let plan = compile(
            "conn.id.resp_h in 192.168.0.0/16 && conn.duration > 1s",
            set.registry(),
        )
        .unwrap();
        let result = execute(&plan, &set).unwrap();
        assert_eq!(result.size(), 3);
        assert_eq!(matching_ids(&result), vec![0]);
    }

    #[test]
    fn test_disjunctive_query() {
        let set = indexed_conns();
        let plan = compile(
            "conn.duration < 1s || conn.id.resp_h == 10.0.0.1",
            set.registry(),
        )
        .unwrap();
        let result = execute(&plan, &set).unwrap();
        assert_eq!(matching_ids(&result), vec![1, 2]);
    }

    #[test]
    fn test_negated_conjunction() {
        let set = indexed_conns();
        let plan = compile(
            "!(conn.id.resp_h in 192.168.0.0/16 && conn.duration > 1s)",
            set.registry(),
        )
        .unwrap();
        let result = execute(&plan, &set).unwrap();
        assert_eq!(matching_ids(&result), vec![1, 2]);
    }

    #[test]
    fn test_name_tag_query() {
        let mut set = IndexSet::new(registry());
        for (id, name) in [(0u64, "http_req"), (1, "dns"), (2, "http_resp")] {
            let data = match name {
                "http_req" => Value::Record(vec![Value::Str("/index".into())]),
                "dns" => Value::Record(vec![Value::Str("example.com".into())]),
                _ => Value::Record(vec![Value::UInt(200)]),
            };
            let mut e = Event::new(name, Timestamp::from_secs(id as i64), data);
            e.set_id(id);
            set.push(&e).unwrap();
        }
        let plan = compile("&name ~ /http.*/", set.registry()).unwrap();
        let result = execute(&plan, &set).unwrap();
        assert_eq!(matching_ids(&result), vec![0, 2]);
    }

    #[test]
    fn test_time_tag_query() {
        let set = indexed_conns();
        let plan = compile("&time >= 1970-01-01T00:00:01", set.registry()).unwrap();
        let result = execute(&plan, &set).unwrap();
        assert_eq!(matching_ids(&result), vec![1, 2]);
    }

    #[test]
    fn test_missing_values_are_false() {
        // dns events lack conn fields entirely; a conn predicate must not
        // select them, nor must its negation.
        let mut set = indexed_conns();
        let mut e = Event::new(
            "dns",
            Timestamp::from_secs(3),
            Value::Record(vec![Value::Str("example.com".into())]),
        );
        e.set_id(3);
        set.push(&e).unwrap();
        let plan = compile("conn.duration != 99s", set.registry()).unwrap();
        let result = execute(&plan, &set).unwrap();
        assert_eq!(result.size(), 4);
        assert_eq!(matching_ids(&result), vec![0, 1, 2]);
    }
}
