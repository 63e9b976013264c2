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

//! Query normalization
//!
//! Rewrites the parsed AST into a negation-free tree: constant
//! expressions fold to values, `!` pushes inward through `&&`/`||` by
//! De Morgan, and a negation landing on a leaf flips the leaf's operator
//! via `negate(op)` instead of wrapping the leaf. The result contains
//! only `And`, `Or`, and predicate leaves.

use vast_core::{RelOp, Result, Value, ValueKind};

use crate::ast::{Clause, Query, Tag};
use crate::expr;

/// What a predicate's left-hand side names, before schema resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum Subject {
    Field { event: String, path: Vec<String> },
    Type(ValueKind),
    Tag(Tag),
}

/// A normalized predicate leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub subject: Subject,
    pub op: RelOp,
    pub value: Value,
}

/// A negation-free query tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    Leaf(Predicate),
    And(Box<Normalized>, Box<Normalized>),
    Or(Box<Normalized>, Box<Normalized>),
}

impl Normalized {
    /// All predicate leaves, left to right.
    pub fn leaves(&self) -> Vec<&Predicate> {
        let mut out = Vec::new();
        self.collect(&mut out);
        out
    }

    fn collect<'a>(&'a self, out: &mut Vec<&'a Predicate>) {
        match self {
            Normalized::Leaf(p) => out.push(p),
            Normalized::And(a, b) | Normalized::Or(a, b) => {
                a.collect(out);
                b.collect(out);
            }
        }
    }
}

/// Normalizes a parsed query.
pub fn normalize(query: &Query) -> Result<Normalized> {
    walk(query, false)
}

fn walk(query: &Query, negated: bool) -> Result<Normalized> {
    match query {
        Query::Not(inner) => walk(inner, !negated),
        Query::And(a, b) if negated => Ok(Normalized::Or(
            Box::new(walk(a, true)?),
            Box::new(walk(b, true)?),
        )),
        Query::And(a, b) => Ok(Normalized::And(
            Box::new(walk(a, false)?),
            Box::new(walk(b, false)?),
        )),
        Query::Or(a, b) if negated => Ok(Normalized::And(
            Box::new(walk(a, true)?),
            Box::new(walk(b, true)?),
        )),
        Query::Or(a, b) => Ok(Normalized::Or(
            Box::new(walk(a, false)?),
            Box::new(walk(b, false)?),
        )),
        Query::Clause(clause) => Ok(Normalized::Leaf(fold_clause(clause, negated)?)),
    }
}

fn fold_clause(clause: &Clause, negated: bool) -> Result<Predicate> {
    let (subject, op, rhs) = match clause {
        Clause::Event {
            event,
            path,
            op,
            rhs,
        } => (
            Subject::Field {
                event: event.clone(),
                path: path.clone(),
            },
            *op,
            rhs,
        ),
        Clause::Type { kind, op, rhs } => (Subject::Type(*kind), *op, rhs),
        Clause::Tag { tag, op, rhs } => (Subject::Tag(*tag), *op, rhs),
    };
    let op = if negated { op.negate() } else { op };
    Ok(Predicate {
        subject,
        op,
        value: expr::fold(rhs)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn normalized(input: &str) -> Normalized {
        normalize(&Parser::parse(input).unwrap()).unwrap()
    }

    #[test]
    fn test_negation_flips_leaf_operator() {
        let n = normalized("!conn.duration > 1s");
        let Normalized::Leaf(p) = n else {
            panic!("expected a leaf");
        };
        assert_eq!(p.op, RelOp::LessEqual);
    }

    #[test]
    fn test_double_negation_cancels() {
        let n = normalized("!!conn.duration > 1s");
        let Normalized::Leaf(p) = n else {
            panic!("expected a leaf");
        };
        assert_eq!(p.op, RelOp::Greater);
    }

    #[test]
    fn test_demorgan_push_down() {
        let n = normalized("!(&id == 1 && &name == \"x\")");
        let Normalized::Or(a, b) = n else {
            panic!("expected disjunction after De Morgan");
        };
        let (Normalized::Leaf(a), Normalized::Leaf(b)) = (*a, *b) else {
            panic!("expected leaves");
        };
        assert_eq!(a.op, RelOp::NotEqual);
        assert_eq!(b.op, RelOp::NotEqual);
    }

    #[test]
    fn test_constants_fold() {
        let n = normalized("&id == 2 * 21");
        let Normalized::Leaf(p) = n else {
            panic!("expected a leaf");
        };
        assert_eq!(p.value, Value::UInt(42));
    }

    #[test]
    fn test_leaves_in_order() {
        let n = normalized("&id == 1 && (&id == 2 || &id == 3)");
        let values: Vec<_> = n.leaves().iter().map(|p| p.value.clone()).collect();
        assert_eq!(
            values,
            vec![Value::UInt(1), Value::UInt(2), Value::UInt(3)]
        );
    }
}
