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

//! Archive
//!
//! Stores stamped events by ID and rehydrates them for query results.
//! Each shipped batch arrives with contiguous IDs, so a segment is just
//! a base ID plus the batch; extraction is a binary search over segment
//! bases and an offset into the batch. A directory-backed archive writes
//! each segment as one JSON file and reloads them on open, which is what
//! lets a restarted node replay its history into fresh indexes.

use std::fs;
use std::path::PathBuf;

use crossbeam_channel::Sender;
use tracing::debug;

use vast_core::{Event, EventId, Result, VastError};

use crate::actor::Handler;

/// Requests understood by an archive actor.
pub enum ArchiveMsg {
    /// Stores one shipped batch. Pre: IDs are contiguous and ascending.
    Store(Vec<Event>),
    /// Replies with the events matching the requested IDs, in ID order.
    /// Unknown IDs are skipped silently.
    Extract {
        ids: Vec<EventId>,
        reply: Sender<Vec<Event>>,
    },
    /// Replies with every stored event in ID order, for replay.
    All { reply: Sender<Vec<Event>> },
}

/// One stored batch with a contiguous ID range.
struct Segment {
    base: EventId,
    events: Vec<Event>,
}

impl Segment {
    fn contains(&self, id: EventId) -> bool {
        id >= self.base && id < self.base + self.events.len() as u64
    }
}

/// Segmented event store, optionally backed by a directory.
#[derive(Default)]
pub struct Archive {
    dir: Option<PathBuf>,
    /// Segments ordered by base ID.
    segments: Vec<Segment>,
}

impl Archive {
    /// An ephemeral in-memory archive.
    pub fn new() -> Self {
        Archive::default()
    }

    /// Opens a directory-backed archive, loading all persisted segments.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(fs_err)?;
        let mut segments = Vec::new();
        for entry in fs::read_dir(&dir).map_err(fs_err)? {
            let path = entry.map_err(fs_err)?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let bytes = fs::read(&path).map_err(fs_err)?;
            let events: Vec<Event> = serde_json::from_slice(&bytes).map_err(|e| {
                VastError::filesystem(format!("malformed segment {}: {}", path.display(), e))
            })?;
            if events.is_empty() {
                continue;
            }
            segments.push(Segment {
                base: events[0].id(),
                events,
            });
        }
        segments.sort_by_key(|s| s.base);
        debug!(segments = segments.len(), "opened archive");
        Ok(Archive {
            dir: Some(dir),
            segments,
        })
    }

    fn store(&mut self, events: Vec<Event>) -> Result<()> {
        if events.is_empty() {
            return Ok(());
        }
        debug_assert!(events
            .windows(2)
            .all(|w| w[1].id() == w[0].id() + 1));
        if let Some(dir) = &self.dir {
            let path = dir.join(format!("{}.json", events[0].id()));
            let bytes = serde_json::to_vec(&events)
                .map_err(|e| VastError::unspecified(e.to_string()))?;
            fs::write(path, bytes).map_err(fs_err)?;
        }
        let segment = Segment {
            base: events[0].id(),
            events,
        };
        let at = self
            .segments
            .partition_point(|s| s.base < segment.base);
        self.segments.insert(at, segment);
        Ok(())
    }

    fn extract(&self, ids: &[EventId]) -> Vec<Event> {
        let mut out = Vec::with_capacity(ids.len());
        for &id in ids {
            let i = self.segments.partition_point(|s| s.base <= id);
            if i == 0 {
                continue;
            }
            let segment = &self.segments[i - 1];
            if segment.contains(id) {
                out.push(segment.events[(id - segment.base) as usize].clone());
            }
        }
        out
    }
}

impl Handler for Archive {
    type Message = ArchiveMsg;

    fn handle(&mut self, message: ArchiveMsg) -> Result<()> {
        match message {
            ArchiveMsg::Store(events) => {
                debug!(count = events.len(), "archiving batch");
                self.store(events)?;
            }
            ArchiveMsg::Extract { ids, reply } => {
                let _ = reply.send(self.extract(&ids));
            }
            ArchiveMsg::All { reply } => {
                let events = self
                    .segments
                    .iter()
                    .flat_map(|s| s.events.iter().cloned())
                    .collect();
                let _ = reply.send(events);
            }
        }
        Ok(())
    }
}

fn fs_err(e: std::io::Error) -> VastError {
    VastError::filesystem(e.to_string())
}
