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

//! Meta store
//!
//! The single authoritative service for durable global counters, most
//! importantly the event-ID counter. `add` replies with the counter
//! value *before* the increment, which is exactly what an importer needs
//! to stamp a freshly reserved ID range. Every successful add persists
//! before the reply is sent.
//!
//! The ID counter starts at 1: event ID 0 is reserved for unstamped
//! events.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use crossbeam_channel::Sender;
use tracing::debug;

use vast_core::{Result, VastError};

use crate::actor::Handler;

/// The counter key importers reserve event IDs from.
pub const ID_KEY: &str = "id";

/// Requests understood by the meta store.
pub enum MetaStoreMsg {
    /// Adds *n* to a counter and replies with the prior value.
    Add {
        key: String,
        n: u64,
        reply: Sender<u64>,
    },
    /// Replies with the current value of a counter.
    Get { key: String, reply: Sender<u64> },
}

/// Durable counter store backed by one ASCII file per key.
pub struct MetaStore {
    dir: PathBuf,
    counters: HashMap<String, u64>,
}

impl MetaStore {
    /// Opens the store, reading any persisted counters from *dir*.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        let mut counters = HashMap::new();
        if dir.exists() {
            for entry in fs::read_dir(&dir).map_err(fs_err)? {
                let entry = entry.map_err(fs_err)?;
                if !entry.file_type().map_err(fs_err)?.is_file() {
                    continue;
                }
                let Ok(key) = entry.file_name().into_string() else {
                    continue;
                };
                let value = read_counter(&entry.path())?;
                debug!(key, value, "restored counter");
                counters.insert(key, value);
            }
        }
        Ok(MetaStore { dir, counters })
    }

    fn initial(key: &str) -> u64 {
        // ID 0 is reserved; the ID counter never hands it out.
        if key == ID_KEY {
            1
        } else {
            0
        }
    }

    fn add(&mut self, key: &str, n: u64) -> Result<u64> {
        let current = *self
            .counters
            .entry(key.to_string())
            .or_insert_with(|| Self::initial(key));
        let next = current
            .checked_add(n)
            .ok_or_else(|| VastError::unspecified(format!("counter {} exhausted", key)))?;
        self.counters.insert(key.to_string(), next);
        self.persist(key, next)?;
        Ok(current)
    }

    fn get(&self, key: &str) -> u64 {
        self.counters
            .get(key)
            .copied()
            .unwrap_or_else(|| Self::initial(key))
    }

    fn persist(&self, key: &str, value: u64) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(fs_err)?;
        fs::write(self.dir.join(key), format!("{}\n", value)).map_err(fs_err)
    }
}

impl Handler for MetaStore {
    type Message = MetaStoreMsg;

    fn handle(&mut self, message: MetaStoreMsg) -> Result<()> {
        match message {
            MetaStoreMsg::Add { key, n, reply } => {
                let prior = self.add(&key, n)?;
                debug!(key, n, prior, "reserved counter range");
                let _ = reply.send(prior);
            }
            MetaStoreMsg::Get { key, reply } => {
                let _ = reply.send(self.get(&key));
            }
        }
        Ok(())
    }
}

fn read_counter(path: &std::path::Path) -> Result<u64> {
    let text = fs::read_to_string(path).map_err(fs_err)?;
    text.trim()
        .parse()
        .map_err(|_| VastError::filesystem(format!("malformed counter file {}", path.display())))
}

fn fs_err(e: std::io::Error) -> VastError {
    VastError::filesystem(e.to_string())
}
