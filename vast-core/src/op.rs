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

//! Relational operators and their legality table
//!
//! A predicate leaf relates a field to a constant via one of these
//! operators. `negate` maps each operator to its complement so that query
//! normalization can push `!` into the leaves instead of materializing
//! complement bitmaps.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::ValueKind;

/// Clause-level relational operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelOp {
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Match,
    NotMatch,
    In,
    NotIn,
}

impl RelOp {
    /// The complementary operator: `negate(op)` selects exactly the
    /// positions `op` rejects (within the index universe).
    pub fn negate(self) -> RelOp {
        match self {
            RelOp::Equal => RelOp::NotEqual,
            RelOp::NotEqual => RelOp::Equal,
            RelOp::Less => RelOp::GreaterEqual,
            RelOp::LessEqual => RelOp::Greater,
            RelOp::Greater => RelOp::LessEqual,
            RelOp::GreaterEqual => RelOp::Less,
            RelOp::Match => RelOp::NotMatch,
            RelOp::NotMatch => RelOp::Match,
            RelOp::In => RelOp::NotIn,
            RelOp::NotIn => RelOp::In,
        }
    }

    /// Whether this operator selects the complement of its positive form.
    pub fn is_negative(self) -> bool {
        matches!(self, RelOp::NotEqual | RelOp::NotMatch | RelOp::NotIn)
    }

    /// Checks operator legality for a (lhs type, op, rhs type) triple.
    ///
    /// Same-type comparisons are always legal. Strings additionally relate
    /// to patterns via `~ !~ in !in`, and addresses to subnets via
    /// `in`/`!in`. Everything else fails validation.
    pub fn compatible(self, lhs: ValueKind, rhs: ValueKind) -> bool {
        if lhs == rhs {
            return true;
        }
        match (lhs, self, rhs) {
            (
                ValueKind::String,
                RelOp::Match | RelOp::NotMatch | RelOp::In | RelOp::NotIn,
                ValueKind::Pattern,
            ) => true,
            (ValueKind::Address, RelOp::In | RelOp::NotIn, ValueKind::Subnet) => true,
            _ => false,
        }
    }
}

impl fmt::Display for RelOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RelOp::Equal => "==",
            RelOp::NotEqual => "!=",
            RelOp::Less => "<",
            RelOp::LessEqual => "<=",
            RelOp::Greater => ">",
            RelOp::GreaterEqual => ">=",
            RelOp::Match => "~",
            RelOp::NotMatch => "!~",
            RelOp::In => "in",
            RelOp::NotIn => "!in",
        };
        f.write_str(s)
    }
}
