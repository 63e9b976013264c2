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

//! VAST Core
//!
//! Fundamental types shared across the platform: the polymorphic value,
//! typed events, event schemas with offset resolution, relational
//! operators, and the error taxonomy.

pub mod error;
pub mod event;
pub mod op;
pub mod schema;
pub mod value;

pub use error::{Result, VastError};
pub use event::{Event, EventId, INVALID_EVENT_ID, MAX_EVENT_ID};
pub use op::RelOp;
pub use schema::{EventSchema, FieldSpec, OffsetPath, SchemaRegistry, TypeSpec};
pub use value::{
    address_bits, Duration, Pattern, Port, PortProto, Subnet, Timestamp, Value, ValueKind,
};
