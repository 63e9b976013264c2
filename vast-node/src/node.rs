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

//! Node
//!
//! Wires one VAST node together: tracker, meta store, archive and index
//! pools, and an importer lane. Ingest is fire-and-forget into the
//! importer; queries compile against the schema registry, dispatch each
//! predicate leaf to every index shard, OR the partial bitmaps as they
//! come back, and rehydrate matching events from the archive.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::bounded;
use tracing::debug;

use vast_bitmap::{ops, Bitmap};
use vast_core::{Event, EventId, Result, SchemaRegistry, VastError};
use vast_query::{evaluate_with, matching_ids, ResolvedPredicate};

use crate::actor::{ask, spawn, ActorRef, Pool, ASK_TIMEOUT};
use crate::archive::{Archive, ArchiveMsg};
use crate::importer::{Importer, ImporterMsg};
use crate::indexer::{Indexer, IndexerMsg};
use crate::meta_store::{MetaStore, MetaStoreMsg};
use crate::tracker::{ComponentKind, Tracker, TrackerMsg};

/// Node tuning knobs.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Initial importer ID reservation size.
    pub batch_size: u64,
    /// Number of archive pool members.
    pub archive_members: usize,
    /// Number of index pool members.
    pub index_members: usize,
    /// Actor mailbox capacity.
    pub mailbox: usize,
}

impl Default for NodeConfig {
    fn default() -> Self {
        NodeConfig {
            batch_size: 4096,
            archive_members: 2,
            index_members: 2,
            mailbox: 512,
        }
    }
}

/// One running VAST node.
pub struct Node {
    registry: SchemaRegistry,
    tracker: ActorRef<TrackerMsg>,
    tracker_thread: Option<JoinHandle<()>>,
    meta_store: ActorRef<MetaStoreMsg>,
    meta_thread: Option<JoinHandle<()>>,
    archive: Arc<Pool<ArchiveMsg>>,
    index: Arc<Pool<IndexerMsg>>,
    importer: ActorRef<ImporterMsg>,
    importer_thread: Option<JoinHandle<()>>,
}

impl Node {
    /// Starts a node rooted at *dir* with the given schemas.
    pub fn start(
        dir: impl Into<PathBuf>,
        registry: SchemaRegistry,
        config: NodeConfig,
    ) -> Result<Node> {
        let dir = dir.into();
        let (tracker, tracker_thread) = spawn("tracker", Tracker::new(), config.mailbox);
        let meta = MetaStore::open(dir.join("meta"))?;
        let (meta_store, meta_thread) = spawn("meta-store", meta, config.mailbox);
        let mut archives = Vec::with_capacity(config.archive_members);
        for i in 0..config.archive_members {
            archives.push(Archive::open(dir.join("archive").join(i.to_string()))?);
        }
        let archive = Arc::new(Pool::from_handlers("archive", config.mailbox, archives));
        let index_registry = registry.clone();
        let index = Arc::new(Pool::new(
            "index",
            config.index_members,
            config.mailbox,
            move |_| Indexer::new(index_registry.clone()),
        ));
        // Indexes are rebuilt from the archive on every start: each
        // member replays its segments into one index shard.
        for member in archive.members() {
            let (tx, rx) = bounded(1);
            member.tell(ArchiveMsg::All { reply: tx })?;
            let events = rx
                .recv_timeout(ASK_TIMEOUT)
                .map_err(|_| VastError::unspecified("archive member unresponsive"))?;
            if !events.is_empty() {
                debug!(count = events.len(), "replaying archived events");
                index.tell(IndexerMsg::Index(events))?;
            }
        }
        let importer_state = Importer::new(
            dir.join("importer"),
            config.batch_size,
            meta_store.clone(),
            Arc::clone(&archive),
            Arc::clone(&index),
        )?;
        let (importer, importer_thread) = spawn("importer", importer_state, config.mailbox);
        let node = Node {
            registry,
            tracker,
            tracker_thread: Some(tracker_thread),
            meta_store,
            meta_thread: Some(meta_thread),
            archive,
            index,
            importer,
            importer_thread: Some(importer_thread),
        };
        node.register_components()?;
        Ok(node)
    }

    fn register_components(&self) -> Result<()> {
        let puts = [
            (ComponentKind::Importer, "importer"),
            (ComponentKind::Archive, "archive"),
            (ComponentKind::Index, "index"),
        ];
        for (kind, name) in puts {
            ask(&self.tracker, |reply| TrackerMsg::Put {
                kind,
                name: name.to_string(),
                reply,
            })??;
        }
        for sink in ["archive", "index"] {
            ask(&self.tracker, |reply| TrackerMsg::Link {
                source: "importer".to_string(),
                sink: sink.to_string(),
                reply,
            })??;
        }
        Ok(())
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn tracker(&self) -> &ActorRef<TrackerMsg> {
        &self.tracker
    }

    /// Hands a batch of unstamped events to the importer.
    pub fn ingest(&self, events: Vec<Event>) -> Result<()> {
        self.importer.tell(ImporterMsg::Batch(events))
    }

    /// Waits until everything ingested so far is archived and indexed.
    pub fn flush(&self) -> Result<()> {
        ask(&self.importer, |reply| ImporterMsg::Flush { reply })?;
        for member in self.archive.members() {
            let (tx, rx) = bounded(1);
            member.tell(ArchiveMsg::Extract {
                ids: Vec::new(),
                reply: tx,
            })?;
            rx.recv_timeout(ASK_TIMEOUT)
                .map_err(|_| VastError::unspecified("archive member unresponsive"))?;
        }
        for member in self.index.members() {
            let (tx, rx) = bounded(1);
            member.tell(IndexerMsg::Size { reply: tx })?;
            rx.recv_timeout(ASK_TIMEOUT)
                .map_err(|_| VastError::unspecified("index member unresponsive"))?;
        }
        Ok(())
    }

    /// Compiles and executes a query, returning matching events in ID
    /// order.
    pub fn query(&self, text: &str) -> Result<Vec<Event>> {
        let plan = vast_query::compile(text, &self.registry)?;
        let bitmap = evaluate_with(&plan, &mut |leaf| self.lookup_leaf(leaf))?;
        let ids = matching_ids(&bitmap);
        debug!(matches = ids.len(), "query evaluated");
        self.extract(&ids)
    }

    /// Dispatches one predicate leaf to all index shards and ORs the
    /// partial bitmaps. Shards own disjoint positions, so combination
    /// order does not matter.
    fn lookup_leaf(&self, leaf: &ResolvedPredicate) -> Result<Bitmap> {
        let mut pending = Vec::with_capacity(self.index.size());
        for member in self.index.members() {
            let (tx, rx) = bounded(1);
            member.tell(IndexerMsg::Lookup {
                predicate: leaf.clone(),
                reply: tx,
            })?;
            pending.push(rx);
        }
        let mut result = Bitmap::new();
        for rx in pending {
            let partial = rx
                .recv_timeout(ASK_TIMEOUT)
                .map_err(|_| VastError::unspecified("index member unresponsive"))??;
            result = ops::or(&result, &partial);
        }
        Ok(result)
    }

    /// Rehydrates events by ID from all archive members.
    fn extract(&self, ids: &[EventId]) -> Result<Vec<Event>> {
        let mut pending = Vec::with_capacity(self.archive.size());
        for member in self.archive.members() {
            let (tx, rx) = bounded(1);
            member.tell(ArchiveMsg::Extract {
                ids: ids.to_vec(),
                reply: tx,
            })?;
            pending.push(rx);
        }
        let mut events = Vec::with_capacity(ids.len());
        for rx in pending {
            let found = rx
                .recv_timeout(ASK_TIMEOUT)
                .map_err(|_| VastError::unspecified("archive member unresponsive"))?;
            events.extend(found);
        }
        events.sort_by_key(Event::id);
        Ok(events)
    }

    /// Stops all actors, persisting importer and meta-store state.
    pub fn shutdown(mut self) {
        self.stop_all();
    }

    fn stop_all(&mut self) {
        self.importer.stop();
        if let Some(thread) = self.importer_thread.take() {
            let _ = thread.join();
        }
        self.archive.shutdown();
        self.index.shutdown();
        self.meta_store.stop();
        if let Some(thread) = self.meta_thread.take() {
            let _ = thread.join();
        }
        self.tracker.stop();
        if let Some(thread) = self.tracker_thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        self.stop_all();
    }
}
