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

//! Query abstract syntax tree
//!
//! The parser produces owned AST nodes; later passes traverse them by
//! exhaustive match. Clause right-hand sides are constant expression
//! trees, folded to values during normalization.

use vast_core::{RelOp, Value, ValueKind};

/// A parsed query: clauses combined with `&&`, `||`, and `!`.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Clause(Clause),
    Not(Box<Query>),
    And(Box<Query>, Box<Query>),
    Or(Box<Query>, Box<Query>),
}

/// A single predicate clause.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// `event.field[.field…] op expr`
    Event {
        event: String,
        path: Vec<String>,
        op: RelOp,
        rhs: Expr,
    },
    /// `@type op expr`
    Type {
        kind: ValueKind,
        op: RelOp,
        rhs: Expr,
    },
    /// `&name / &time / &id op expr`
    Tag { tag: Tag, op: RelOp, rhs: Expr },
}

/// Event envelope tags addressable in queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Name,
    Time,
    Id,
}

/// A constant-foldable arithmetic expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Unary {
        op: UnaryExprOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryExprOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryExprOp {
    Plus,
    Minus,
    BitNot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryExprOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitAnd,
    BitOr,
    BitXor,
}
