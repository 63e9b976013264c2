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

//! String index
//!
//! Equality is a hash lookup into per-key posting bitmaps. Pattern
//! operators scan the key set linearly, applying the regex to each
//! distinct key and ORing the bitmaps of the keys that match; the key
//! set is orders of magnitude smaller than the position space.

use std::collections::HashMap;

use vast_bitmap::{ops, Bitmap};
use vast_core::{RelOp, Result, Value, VastError};

use crate::value_index::{mark, IndexBase, ValueIndex};

#[derive(Debug, Clone, Default)]
pub struct StringIndex {
    base: IndexBase,
    keys: HashMap<String, Bitmap>,
}

impl StringIndex {
    pub fn new() -> Self {
        StringIndex::default()
    }

    fn union_matching<F: Fn(&str) -> bool>(&self, matches: F) -> Bitmap {
        let mut result = self.base.none();
        for (key, bm) in &self.keys {
            if matches(key) {
                result = ops::or(&result, &self.base.pad(bm.clone()));
            }
        }
        result
    }
}

impl ValueIndex for StringIndex {
    fn push(&mut self, position: u64, value: Option<&Value>) -> Result<()> {
        let Some(value) = value else {
            self.base.occupy(position, false);
            return Ok(());
        };
        let Value::Str(s) = value else {
            return Err(VastError::validation(format!(
                "string index cannot hold {}",
                value.kind()
            )));
        };
        self.base.occupy(position, true);
        mark(self.keys.entry(s.clone()).or_default(), position);
        Ok(())
    }

    fn lookup(&self, op: RelOp, value: &Value) -> Result<Bitmap> {
        match (op, value) {
            (RelOp::Equal, Value::Str(s)) => Ok(self
                .keys
                .get(s)
                .map(|bm| self.base.pad(bm.clone()))
                .unwrap_or_else(|| self.base.none())),
            (RelOp::NotEqual, Value::Str(s)) => {
                let eq = self.keys.get(s).cloned().unwrap_or_default();
                Ok(self.base.complement(&eq))
            }
            (RelOp::Match | RelOp::In, Value::Pattern(p)) => {
                Ok(self.union_matching(|key| p.matches(key)))
            }
            (RelOp::NotMatch | RelOp::NotIn, Value::Pattern(p)) => {
                let hits = self.union_matching(|key| p.matches(key));
                Ok(self.base.complement(&hits))
            }
            // `field in "haystack"`: the field value occurs within the
            // given string.
            (RelOp::In, Value::Str(s)) => Ok(self.union_matching(|key| s.contains(key))),
            (RelOp::NotIn, Value::Str(s)) => {
                let hits = self.union_matching(|key| s.contains(key));
                Ok(self.base.complement(&hits))
            }
            (op, rhs) => Err(VastError::validation(format!(
                "string index does not support {} {}",
                op,
                rhs.kind()
            ))),
        }
    }

    fn len(&self) -> u64 {
        self.base.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vast_core::Pattern;

    fn index_of(values: &[Option<&str>]) -> StringIndex {
        let mut idx = StringIndex::new();
        for (i, v) in values.iter().enumerate() {
            let value = v.map(|s| Value::Str(s.to_string()));
            idx.push(i as u64, value.as_ref()).unwrap();
        }
        idx
    }

    #[test]
    fn test_equality() {
        let idx = index_of(&[Some("http"), Some("dns"), Some("http"), None]);
        let hits = idx
            .lookup(RelOp::Equal, &Value::Str("http".into()))
            .unwrap();
        assert_eq!(hits.ones().collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn test_pattern_scan() {
        let idx = index_of(&[Some("http_req"), Some("dns"), Some("http_resp")]);
        let p = Value::Pattern(Pattern::new("http.*").unwrap());
        let hits = idx.lookup(RelOp::Match, &p).unwrap();
        assert_eq!(hits.ones().collect::<Vec<_>>(), vec![0, 2]);
        let miss = idx.lookup(RelOp::NotMatch, &p).unwrap();
        assert_eq!(miss.ones().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_not_match_excludes_absent() {
        let idx = index_of(&[Some("a"), None, Some("b")]);
        let p = Value::Pattern(Pattern::new("a").unwrap());
        let miss = idx.lookup(RelOp::NotMatch, &p).unwrap();
        assert_eq!(miss.ones().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_substring_membership() {
        let idx = index_of(&[Some("den"), Some("deny"), Some("allow")]);
        let hits = idx
            .lookup(RelOp::In, &Value::Str("hidden entrance".into()))
            .unwrap();
        assert_eq!(hits.ones().collect::<Vec<_>>(), vec![0]);
    }
}
