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

//! Typed validation
//!
//! Checks every normalized leaf against the operator legality table and
//! resolves event field references to record offset paths via the schema
//! registry. After this pass a query plan carries no names that need
//! re-interpretation at execution time.

use vast_core::{RelOp, Result, SchemaRegistry, TypeSpec, Value, ValueKind, VastError};
use vast_index::LookupTarget;

use crate::ast::Tag;
use crate::normalize::{Normalized, Predicate, Subject};

/// A fully resolved predicate leaf, ready for index dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPredicate {
    pub target: LookupTarget,
    pub op: RelOp,
    pub value: Value,
}

/// A validated query plan.
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    Leaf(ResolvedPredicate),
    And(Box<Plan>, Box<Plan>),
    Or(Box<Plan>, Box<Plan>),
}

impl Plan {
    /// All resolved leaves, left to right.
    pub fn leaves(&self) -> Vec<&ResolvedPredicate> {
        let mut out = Vec::new();
        self.collect(&mut out);
        out
    }

    fn collect<'a>(&'a self, out: &mut Vec<&'a ResolvedPredicate>) {
        match self {
            Plan::Leaf(p) => out.push(p),
            Plan::And(a, b) | Plan::Or(a, b) => {
                a.collect(out);
                b.collect(out);
            }
        }
    }
}

/// Validates a normalized query against the schema registry.
pub fn validate(query: &Normalized, registry: &SchemaRegistry) -> Result<Plan> {
    let plan = match query {
        Normalized::Leaf(p) => Plan::Leaf(validate_leaf(p, registry)?),
        Normalized::And(a, b) => Plan::And(
            Box::new(validate(a, registry)?),
            Box::new(validate(b, registry)?),
        ),
        Normalized::Or(a, b) => Plan::Or(
            Box::new(validate(a, registry)?),
            Box::new(validate(b, registry)?),
        ),
    };
    Ok(plan)
}

fn validate_leaf(p: &Predicate, registry: &SchemaRegistry) -> Result<ResolvedPredicate> {
    let rhs_kind = p.value.kind();
    let target = match &p.subject {
        Subject::Tag(Tag::Name) => {
            check_legal(ValueKind::String, p.op, rhs_kind, "&name")?;
            LookupTarget::Name
        }
        Subject::Tag(Tag::Time) => {
            check_legal(ValueKind::Time, p.op, rhs_kind, "&time")?;
            LookupTarget::Time
        }
        Subject::Tag(Tag::Id) => {
            check_legal(ValueKind::UInt, p.op, rhs_kind, "&id")?;
            LookupTarget::Id
        }
        Subject::Type(kind) => {
            check_legal(*kind, p.op, rhs_kind, &format!("@{}", kind))?;
            LookupTarget::Type(*kind)
        }
        Subject::Field { event, path } => {
            let (offsets, spec) = registry.resolve(event, path)?;
            let display = format!("{}.{}", event, path.join("."));
            check_field_legal(spec, p.op, rhs_kind, &display)?;
            LookupTarget::Field {
                event: event.clone(),
                path: offsets,
            }
        }
    };
    Ok(ResolvedPredicate {
        target,
        op: p.op,
        value: p.value.clone(),
    })
}

fn check_legal(lhs: ValueKind, op: RelOp, rhs: ValueKind, what: &str) -> Result<()> {
    if op.compatible(lhs, rhs) {
        Ok(())
    } else {
        Err(VastError::validation(format!(
            "illegal predicate: {} {} {}",
            what, op, rhs
        )))
    }
}

fn check_field_legal(spec: &TypeSpec, op: RelOp, rhs: ValueKind, what: &str) -> Result<()> {
    match spec {
        TypeSpec::Record(_) => Err(VastError::validation(format!(
            "{} is a record and cannot be compared directly",
            what
        ))),
        TypeSpec::Vector(_) | TypeSpec::Set(_) | TypeSpec::Table(..) => {
            // Containers relate through their element kinds.
            if spec
                .scalar_kinds()
                .iter()
                .any(|&kind| op.compatible(kind, rhs))
            {
                Ok(())
            } else {
                Err(VastError::validation(format!(
                    "illegal predicate: {} {} {}",
                    what, op, rhs
                )))
            }
        }
        leaf => check_legal(leaf.kind(), op, rhs, what),
    }
}
