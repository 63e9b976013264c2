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

//! Property-based tests for the arithmetic index against a naive model:
//! every range operator must agree with a direct scan, and a negated
//! operator must select exactly the complement of its positive form
//! within the universe.

use proptest::prelude::*;
use vast_core::{RelOp, Value, ValueKind};
use vast_index::{ArithmeticIndex, ValueIndex};

fn values() -> impl Strategy<Value = Vec<Option<i64>>> {
    prop::collection::vec(prop::option::of(-1000i64..1000), 0..100)
}

fn build(values: &[Option<i64>]) -> ArithmeticIndex {
    let mut index = ArithmeticIndex::new(ValueKind::Int);
    for (i, v) in values.iter().enumerate() {
        index.push(i as u64, v.map(Value::Int).as_ref()).unwrap();
    }
    index
}

fn model(values: &[Option<i64>], op: RelOp, c: i64) -> Vec<u64> {
    values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| {
            let v = (*v)?;
            let hit = match op {
                RelOp::Equal => v == c,
                RelOp::NotEqual => v != c,
                RelOp::Less => v < c,
                RelOp::LessEqual => v <= c,
                RelOp::Greater => v > c,
                RelOp::GreaterEqual => v >= c,
                _ => unreachable!(),
            };
            hit.then_some(i as u64)
        })
        .collect()
}

proptest! {
    #[test]
    fn prop_range_lookups_match_scan(
        values in values(),
        c in -1100i64..1100,
    ) {
        let index = build(&values);
        let ops = [
            RelOp::Equal,
            RelOp::NotEqual,
            RelOp::Less,
            RelOp::LessEqual,
            RelOp::Greater,
            RelOp::GreaterEqual,
        ];
        for op in ops {
            let hits = index.lookup(op, &Value::Int(c)).unwrap();
            prop_assert_eq!(hits.size(), values.len() as u64);
            prop_assert_eq!(
                hits.ones().collect::<Vec<_>>(),
                model(&values, op, c),
                "operator {}",
                op
            );
        }
    }

    #[test]
    fn prop_negation_is_complement_within_universe(
        values in values(),
        c in -1100i64..1100,
    ) {
        let index = build(&values);
        let ops = [RelOp::Equal, RelOp::Less, RelOp::GreaterEqual];
        for op in ops {
            let positive = index.lookup(op, &Value::Int(c)).unwrap();
            let negative = index.lookup(op.negate(), &Value::Int(c)).unwrap();
            for (i, v) in values.iter().enumerate() {
                let i = i as u64;
                if v.is_none() {
                    // Absent positions match neither polarity.
                    prop_assert!(!positive.get(i) && !negative.get(i));
                } else {
                    prop_assert_ne!(positive.get(i), negative.get(i));
                }
            }
        }
    }
}
