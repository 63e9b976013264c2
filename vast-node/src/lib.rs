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

//! VAST Node
//!
//! The actor-based ingest and query pipeline: a meta store owning the
//! global ID counter, importers that reserve ID ranges and stamp
//! batches, archive and index pools with round-robin routing, and the
//! tracker registry tying the components together.

pub mod actor;
pub mod archive;
pub mod importer;
pub mod indexer;
pub mod meta_store;
pub mod node;
pub mod tracker;

pub use actor::{ask, spawn, ActorRef, Handler, Pool};
pub use archive::{Archive, ArchiveMsg};
pub use importer::{Importer, ImporterMsg};
pub use indexer::{Indexer, IndexerMsg};
pub use meta_store::{MetaStore, MetaStoreMsg, ID_KEY};
pub use node::{Node, NodeConfig};
pub use tracker::{ComponentKind, Tracker, TrackerMsg};
