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

//! VAST Query
//!
//! The predicate engine: lexer and recursive-descent parser for the
//! query language, constant folding, normalization into negation-free
//! trees, typed validation with schema resolution, and bitmap execution
//! against the value indexes.
//!
//! ```text
//! text ──parse──> Query ──normalize──> Normalized ──validate──> Plan
//!                                                                 │
//!                                 index lookups + AND/OR  <──execute
//! ```

pub mod ast;
pub mod exec;
pub mod expr;
pub mod lexer;
pub mod normalize;
pub mod parser;
pub mod token;
pub mod validate;

pub use ast::{Clause, Expr, Query, Tag};
pub use exec::{evaluate_with, execute, matching_ids};
pub use normalize::{normalize, Normalized, Predicate, Subject};
pub use parser::Parser;
pub use validate::{validate, Plan, ResolvedPredicate};

use tracing::debug;
use vast_core::{Result, SchemaRegistry};

/// Compiles query text into an executable plan.
pub fn compile(input: &str, registry: &SchemaRegistry) -> Result<Plan> {
    let query = Parser::parse(input)?;
    let normalized = normalize(&query)?;
    let plan = validate(&normalized, registry)?;
    debug!(leaves = plan.leaves().len(), "compiled query");
    Ok(plan)
}
