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

//! VAST Index
//!
//! Per-type value indexes mapping `(operator, constant)` lookups to
//! bitmaps over event positions. Every index maintains a universe bitmap
//! of positions that actually carry a value, which keeps negated
//! operators well-defined.

pub mod address;
pub mod arithmetic;
pub mod container;
pub mod event_index;
pub mod key;
pub mod pattern;
pub mod port;
pub mod string;
pub mod subnet;
pub mod value_index;

pub use address::AddressIndex;
pub use arithmetic::ArithmeticIndex;
pub use container::ContainerIndex;
pub use event_index::{index_for, EventIndexer, IndexSet, LookupTarget, TagIndexer};
pub use pattern::PatternIndex;
pub use port::PortIndex;
pub use string::StringIndex;
pub use subnet::SubnetIndex;
pub use value_index::ValueIndex;
