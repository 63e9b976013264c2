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

//! Typed events
//!
//! An event is an immutable `(id, timestamp, record)` triple plus the name
//! of its schema. IDs are stamped once by the importer and never change;
//! parsers emit events with [`INVALID_EVENT_ID`].

use serde::{Deserialize, Serialize};

use crate::value::{Timestamp, Value};

/// Globally unique, monotonically increasing event identifier.
pub type EventId = u64;

/// The reserved ID carried by events before the importer stamps them.
pub const INVALID_EVENT_ID: EventId = 0;

/// The largest assignable ID; reaching it means the ID space is exhausted.
pub const MAX_EVENT_ID: EventId = u64::MAX;

/// A single typed event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    id: EventId,
    name: String,
    timestamp: Timestamp,
    data: Value,
}

impl Event {
    /// Creates an unstamped event from a schema name, a timestamp, and a
    /// record value.
    pub fn new(name: impl Into<String>, timestamp: Timestamp, data: Value) -> Self {
        debug_assert!(matches!(data, Value::Record(_)));
        Event {
            id: INVALID_EVENT_ID,
            name: name.into(),
            timestamp,
            data,
        }
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    /// Stamps the event ID. Called exactly once, by the importer.
    pub fn set_id(&mut self, id: EventId) {
        debug_assert_eq!(self.id, INVALID_EVENT_ID);
        self.id = id;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn data(&self) -> &Value {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_starts_unstamped() {
        let e = Event::new("conn", Timestamp::from_secs(1), Value::Record(vec![]));
        assert_eq!(e.id(), INVALID_EVENT_ID);
    }

    #[test]
    fn test_stamping() {
        let mut e = Event::new("conn", Timestamp::from_secs(1), Value::Record(vec![]));
        e.set_id(42);
        assert_eq!(e.id(), 42);
    }
}
