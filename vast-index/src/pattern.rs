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

//! Pattern index
//!
//! Indexes fields whose values are themselves regular expressions, keyed
//! by pattern source. `~` returns the posting bitmap of the key equal to
//! the queried pattern; `!~` its complement within the universe.

use std::collections::HashMap;

use vast_bitmap::Bitmap;
use vast_core::{RelOp, Result, Value, VastError};

use crate::value_index::{mark, IndexBase, ValueIndex};

#[derive(Debug, Clone, Default)]
pub struct PatternIndex {
    base: IndexBase,
    keys: HashMap<String, Bitmap>,
}

impl PatternIndex {
    pub fn new() -> Self {
        PatternIndex::default()
    }
}

impl ValueIndex for PatternIndex {
    fn push(&mut self, position: u64, value: Option<&Value>) -> Result<()> {
        let Some(value) = value else {
            self.base.occupy(position, false);
            return Ok(());
        };
        let Value::Pattern(p) = value else {
            return Err(VastError::validation(format!(
                "pattern index cannot hold {}",
                value.kind()
            )));
        };
        self.base.occupy(position, true);
        mark(self.keys.entry(p.as_str().to_string()).or_default(), position);
        Ok(())
    }

    fn lookup(&self, op: RelOp, value: &Value) -> Result<Bitmap> {
        let Value::Pattern(p) = value else {
            return Err(VastError::validation(format!(
                "pattern index expects a pattern, got {}",
                value.kind()
            )));
        };
        let hits = self.keys.get(p.as_str()).cloned().unwrap_or_default();
        match op {
            RelOp::Equal | RelOp::Match => Ok(self.base.pad(hits)),
            RelOp::NotEqual | RelOp::NotMatch => Ok(self.base.complement(&hits)),
            other => Err(VastError::validation(format!(
                "pattern index does not support {}",
                other
            ))),
        }
    }

    fn len(&self) -> u64 {
        self.base.len()
    }
}
