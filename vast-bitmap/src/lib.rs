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

//! VAST Bitmap
//!
//! The compressed bitvector underlying all value indexes: sequences of
//! homogeneous fills and literal words with append, bitwise combination,
//! rank, and select.
//!
//! # Layers
//!
//! - [`word`]: pure bit operations on a single 64-bit word
//! - [`Bits`]: one block, either a literal word or a fill
//! - [`Bitmap`]: a coalescing sequence of blocks
//! - [`ops`]: non-mutating combination, rank, and select over bitmaps

pub mod bitmap;
pub mod bits;
pub mod ops;
pub mod word;

pub use bitmap::{Bitmap, Ones};
pub use bits::Bits;
pub use word::NPOS;
