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

//! Indexer actor
//!
//! Owns one [`IndexSet`] shard. Batches routed to this member update its
//! indexes; predicate leaves evaluate to partial bitmaps over the
//! positions this shard has seen. Shards own disjoint ID subsets, so the
//! query path ORs the partial bitmaps of all members.

use crossbeam_channel::Sender;
use tracing::debug;

use vast_bitmap::Bitmap;
use vast_core::{Event, Result, SchemaRegistry};
use vast_index::IndexSet;
use vast_query::ResolvedPredicate;

use crate::actor::Handler;

/// Requests understood by an indexer actor.
pub enum IndexerMsg {
    /// Indexes one shipped batch.
    Index(Vec<Event>),
    /// Evaluates a predicate leaf, replying with the partial bitmap.
    Lookup {
        predicate: ResolvedPredicate,
        reply: Sender<Result<Bitmap>>,
    },
    /// Replies with the number of positions this shard covers. Also
    /// serves as an ingest barrier.
    Size { reply: Sender<u64> },
}

/// One index shard.
pub struct Indexer {
    indexes: IndexSet,
}

impl Indexer {
    pub fn new(registry: SchemaRegistry) -> Self {
        Indexer {
            indexes: IndexSet::new(registry),
        }
    }
}

impl Handler for Indexer {
    type Message = IndexerMsg;

    fn handle(&mut self, message: IndexerMsg) -> Result<()> {
        match message {
            IndexerMsg::Index(events) => {
                debug!(count = events.len(), "indexing batch");
                for event in &events {
                    self.indexes.push(event)?;
                }
            }
            IndexerMsg::Lookup { predicate, reply } => {
                let result =
                    self.indexes
                        .lookup(&predicate.target, predicate.op, &predicate.value);
                // A dropped receiver means the query was cancelled; the
                // late reply is discarded silently.
                let _ = reply.send(result);
            }
            IndexerMsg::Size { reply } => {
                let _ = reply.send(self.indexes.size());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vast_core::{EventSchema, RelOp, Timestamp, TypeSpec, Value};
    use vast_index::LookupTarget;

    fn registry() -> SchemaRegistry {
        let mut registry = SchemaRegistry::new();
        registry.register(EventSchema::new("dns").field("query", TypeSpec::String));
        registry
    }

    #[test]
    fn test_index_and_lookup() {
        let mut indexer = Indexer::new(registry());
        let mut e = Event::new(
            "dns",
            Timestamp::from_secs(0),
            Value::Record(vec![Value::Str("example.com".into())]),
        );
        e.set_id(0);
        indexer
            .handle(IndexerMsg::Index(vec![e]))
            .unwrap();
        let (tx, rx) = crossbeam_channel::bounded(1);
        indexer
            .handle(IndexerMsg::Lookup {
                predicate: ResolvedPredicate {
                    target: LookupTarget::Field {
                        event: "dns".into(),
                        path: vast_core::OffsetPath::from_slice(&[0]),
                    },
                    op: RelOp::Equal,
                    value: Value::Str("example.com".into()),
                },
                reply: tx,
            })
            .unwrap();
        let bitmap = rx.recv().unwrap().unwrap();
        assert_eq!(bitmap.ones().collect::<Vec<_>>(), vec![0]);
    }
}
