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

//! Component tracker
//!
//! Registry of named pipeline components and the topology links between
//! them. Registration rejects kind mismatches and duplicate live names.
//! When a component goes down, its entry and every link incident to it
//! are removed, so the topology never retains stale edges.

use std::collections::HashMap;

use crossbeam_channel::Sender;
use tracing::{info, warn};

use vast_core::{Result, VastError};

use crate::actor::Handler;

/// Kinds of components a node runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    Importer,
    Exporter,
    Receiver,
    Archive,
    Index,
    Search,
}

impl ComponentKind {
    pub fn parse(kind: &str) -> Option<ComponentKind> {
        let kind = match kind {
            "importer" => ComponentKind::Importer,
            "exporter" => ComponentKind::Exporter,
            "receiver" => ComponentKind::Receiver,
            "archive" => ComponentKind::Archive,
            "index" => ComponentKind::Index,
            "search" => ComponentKind::Search,
            _ => return None,
        };
        Some(kind)
    }
}

/// Requests understood by the tracker.
pub enum TrackerMsg {
    /// Registers a component under a unique name.
    Put {
        kind: ComponentKind,
        name: String,
        reply: Sender<Result<()>>,
    },
    /// Records a topology link between two registered components.
    Link {
        source: String,
        sink: String,
        reply: Sender<Result<()>>,
    },
    /// Reports a component as down.
    Down { name: String },
    /// Replies with the registered component names, sorted.
    List { reply: Sender<Vec<String>> },
    /// Replies with the current topology edges, sorted.
    Topology {
        reply: Sender<Vec<(String, String)>>,
    },
}

/// Component registry with topology edges.
#[derive(Default)]
pub struct Tracker {
    components: HashMap<String, ComponentKind>,
    topology: Vec<(String, String)>,
}

impl Tracker {
    pub fn new() -> Self {
        Tracker::default()
    }

    fn put(&mut self, kind: ComponentKind, name: String) -> Result<()> {
        if let Some(&existing) = self.components.get(&name) {
            if existing != kind {
                warn!(name, "component exists with different kind");
                return Err(VastError::unspecified(format!(
                    "kind mismatch for component {}",
                    name
                )));
            }
            warn!(name, "duplicate component");
            return Err(VastError::unspecified(format!(
                "duplicate component: {}",
                name
            )));
        }
        info!(name, ?kind, "registered component");
        self.components.insert(name, kind);
        Ok(())
    }

    fn link(&mut self, source: String, sink: String) -> Result<()> {
        for name in [&source, &sink] {
            if !self.components.contains_key(name) {
                return Err(VastError::unspecified(format!(
                    "cannot link unknown component {}",
                    name
                )));
            }
        }
        if !self.topology.contains(&(source.clone(), sink.clone())) {
            self.topology.push((source, sink));
        }
        Ok(())
    }

    fn down(&mut self, name: &str) {
        if self.components.remove(name).is_none() {
            return;
        }
        info!(name, "component down");
        self.topology
            .retain(|(source, sink)| source != name && sink != name);
    }
}

impl Handler for Tracker {
    type Message = TrackerMsg;

    fn handle(&mut self, message: TrackerMsg) -> Result<()> {
        match message {
            TrackerMsg::Put { kind, name, reply } => {
                let _ = reply.send(self.put(kind, name));
            }
            TrackerMsg::Link {
                source,
                sink,
                reply,
            } => {
                let _ = reply.send(self.link(source, sink));
            }
            TrackerMsg::Down { name } => self.down(&name),
            TrackerMsg::List { reply } => {
                let mut names: Vec<String> = self.components.keys().cloned().collect();
                names.sort();
                let _ = reply.send(names);
            }
            TrackerMsg::Topology { reply } => {
                let mut edges = self.topology.clone();
                edges.sort();
                let _ = reply.send(edges);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_rejects_duplicates_and_mismatches() {
        let mut tracker = Tracker::new();
        tracker
            .put(ComponentKind::Importer, "importer0".into())
            .unwrap();
        assert!(tracker
            .put(ComponentKind::Importer, "importer0".into())
            .is_err());
        assert!(tracker
            .put(ComponentKind::Archive, "importer0".into())
            .is_err());
    }

    #[test]
    fn test_down_removes_entry_and_incident_edges() {
        let mut tracker = Tracker::new();
        tracker
            .put(ComponentKind::Importer, "importer0".into())
            .unwrap();
        tracker
            .put(ComponentKind::Archive, "archive0".into())
            .unwrap();
        tracker.put(ComponentKind::Index, "index0".into()).unwrap();
        tracker.link("importer0".into(), "archive0".into()).unwrap();
        tracker.link("importer0".into(), "index0".into()).unwrap();
        tracker.link("archive0".into(), "index0".into()).unwrap();
        tracker.down("importer0");
        assert!(!tracker.components.contains_key("importer0"));
        assert_eq!(
            tracker.topology,
            vec![("archive0".to_string(), "index0".to_string())]
        );
        // A fresh registration under the same name is allowed again.
        assert!(tracker
            .put(ComponentKind::Importer, "importer0".into())
            .is_ok());
    }

    #[test]
    fn test_link_requires_registered_endpoints() {
        let mut tracker = Tracker::new();
        tracker
            .put(ComponentKind::Importer, "importer0".into())
            .unwrap();
        assert!(tracker.link("importer0".into(), "ghost".into()).is_err());
    }
}
