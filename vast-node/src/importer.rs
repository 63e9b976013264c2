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

//! Importer
//!
//! One ingest lane. The importer pre-reserves contiguous ID ranges from
//! the meta store, stamps arriving events, and fans each shipped batch
//! out to the archive and index pools. Its `(next, available)` state
//! persists under its directory after every shipped batch, after every
//! replenish, and on shutdown, so a restarted importer resumes stamping
//! exactly where it stopped and never reuses an ID.
//!
//! Batch sizing adapts: two replenishes within ten seconds double the
//! reservation, and a buffered remainder larger than the reservation
//! grows it to match.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use vast_core::{Event, Result, VastError, MAX_EVENT_ID};

use crate::actor::{ask, ActorRef, Handler, Pool};
use crate::archive::ArchiveMsg;
use crate::indexer::IndexerMsg;
use crate::meta_store::{MetaStoreMsg, ID_KEY};

/// Two replenishes within this window double the batch size.
const REPLENISH_WINDOW: Duration = Duration::from_secs(10);

/// Requests understood by an importer.
pub enum ImporterMsg {
    /// A batch of unstamped events from a parser.
    Batch(Vec<Event>),
    /// Barrier: replies once every prior batch has been processed.
    Flush { reply: crossbeam_channel::Sender<()> },
}

/// Persistent and transient importer state.
pub struct Importer {
    dir: PathBuf,
    batch_size: u64,
    next: u64,
    available: u64,
    remainder: Vec<Event>,
    last_replenish: Instant,
    meta_store: ActorRef<MetaStoreMsg>,
    archive: Arc<Pool<ArchiveMsg>>,
    index: Arc<Pool<IndexerMsg>>,
}

impl Importer {
    /// Creates an importer, restoring `(next, available)` from *dir*.
    ///
    /// A missing directory means a fresh start; unreadable or malformed
    /// state files are fatal.
    pub fn new(
        dir: impl Into<PathBuf>,
        batch_size: u64,
        meta_store: ActorRef<MetaStoreMsg>,
        archive: Arc<Pool<ArchiveMsg>>,
        index: Arc<Pool<IndexerMsg>>,
    ) -> Result<Self> {
        assert!(batch_size > 0);
        let dir = dir.into();
        let (next, available) = read_state(&dir)?;
        if available > 0 {
            debug!(available, next, "restored importer state");
        }
        Ok(Importer {
            dir,
            batch_size,
            next,
            available,
            remainder: Vec::new(),
            last_replenish: Instant::now() - REPLENISH_WINDOW,
            meta_store,
            archive,
            index,
        })
    }

    pub fn next(&self) -> u64 {
        self.next
    }

    pub fn available(&self) -> u64 {
        self.available
    }

    pub fn batch_size(&self) -> u64 {
        self.batch_size
    }

    /// Stamps IDs onto a batch and fans it out to archive and index.
    ///
    /// Pre: `batch.len() <= available`.
    fn ship(&mut self, mut batch: Vec<Event>) -> Result<()> {
        debug_assert!(batch.len() as u64 <= self.available);
        for event in &mut batch {
            event.set_id(self.next);
            self.next += 1;
        }
        self.available -= batch.len() as u64;
        debug!(count = batch.len(), "shipping events");
        self.archive.tell(ArchiveMsg::Store(batch.clone()))?;
        self.index.tell(IndexerMsg::Index(batch))?;
        // Persisting after every ship keeps a crashed importer from
        // restamping IDs it already handed out.
        self.write_state()
    }

    /// Reserves a fresh ID range from the meta store, flushing any
    /// buffered remainder, then persists the new state.
    fn replenish(&mut self) -> Result<()> {
        let now = Instant::now();
        if now.duration_since(self.last_replenish) < REPLENISH_WINDOW {
            debug!(
                from = self.batch_size,
                to = self.batch_size * 2,
                "second replenish within window, doubling batch size"
            );
            self.batch_size = self.batch_size.saturating_mul(2);
        }
        if self.remainder.len() as u64 > self.batch_size {
            debug!(
                from = self.batch_size,
                to = self.remainder.len(),
                "growing batch size to buffered events"
            );
            self.batch_size = self.remainder.len() as u64;
        }
        self.last_replenish = now;
        let n = self.batch_size;
        debug!(n, "replenishing IDs");
        assert!(MAX_EVENT_ID - self.next >= n, "event ID space exhausted");
        let prior = ask(&self.meta_store, |reply| MetaStoreMsg::Add {
            key: ID_KEY.to_string(),
            n,
            reply,
        })?;
        debug!(n, start = prior, "got new ID range");
        self.next = prior;
        self.available = n;
        if !self.remainder.is_empty() {
            let remainder = std::mem::take(&mut self.remainder);
            self.ship(remainder)?;
        }
        self.write_state()
    }

    fn write_state(&self) -> Result<()> {
        if self.next == 0 && self.available == 0 {
            return Ok(());
        }
        fs::create_dir_all(&self.dir).map_err(fs_err)?;
        fs::write(self.dir.join("next"), format!("{}\n", self.next)).map_err(fs_err)?;
        fs::write(self.dir.join("available"), format!("{}\n", self.available)).map_err(fs_err)?;
        debug!(next = self.next, available = self.available, "saved state");
        Ok(())
    }
}

impl Handler for Importer {
    type Message = ImporterMsg;

    fn handle(&mut self, message: ImporterMsg) -> Result<()> {
        let mut events = match message {
            ImporterMsg::Batch(events) => events,
            ImporterMsg::Flush { reply } => {
                let _ = reply.send(());
                return Ok(());
            }
        };
        if events.is_empty() {
            return Ok(());
        }
        if !self.meta_store.is_running() {
            return Err(VastError::unspecified("no meta store configured"));
        }
        debug!(count = events.len(), "got events");
        debug_assert!(self.remainder.is_empty());
        if events.len() as u64 <= self.available {
            self.ship(events)?;
        } else if self.available > 0 {
            let remainder = events.split_off(self.available as usize);
            self.ship(events)?;
            self.remainder = remainder;
        } else {
            self.remainder = events;
        }
        let running_low = self.available * 10 < self.batch_size;
        if running_low || !self.remainder.is_empty() {
            self.replenish()?;
        }
        Ok(())
    }

    fn on_exit(&mut self) {
        if let Err(reason) = self.write_state() {
            warn!(%reason, "failed to save importer state on shutdown");
        }
    }
}

fn read_state(dir: &PathBuf) -> Result<(u64, u64)> {
    if !dir.exists() {
        return Ok((0, 0));
    }
    let next = read_counter(&dir.join("next"))?;
    let available = read_counter(&dir.join("available"))?;
    Ok((next, available))
}

fn read_counter(path: &std::path::Path) -> Result<u64> {
    let text = fs::read_to_string(path).map_err(fs_err)?;
    text.trim()
        .parse()
        .map_err(|_| VastError::filesystem(format!("malformed state file {}", path.display())))
}

fn fs_err(e: std::io::Error) -> VastError {
    VastError::filesystem(e.to_string())
}
