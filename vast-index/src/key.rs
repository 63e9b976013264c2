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

//! Order-preserving key encodings
//!
//! The bit-sliced indexes operate on unsigned keys whose numeric order
//! matches the value order. Signed integers shift by the sign bit;
//! floating-point values use the usual sign-flip transform (flip all bits
//! for negatives, set the sign bit for positives).

use vast_core::{Value, ValueKind};

/// Encodes an arithmetic value as an order-preserving `u64` key.
pub fn encode(value: &Value) -> Option<u64> {
    let key = match value {
        Value::Bool(b) => *b as u64,
        Value::Int(i) => flip_sign(*i),
        Value::UInt(u) => *u,
        Value::Double(d) => encode_f64(*d),
        Value::Duration(d) => flip_sign(d.as_nanos()),
        Value::Time(t) => flip_sign(t.as_nanos()),
        _ => return None,
    };
    Some(key)
}

/// The kinds [`encode`] accepts.
pub fn encodable(kind: ValueKind) -> bool {
    matches!(
        kind,
        ValueKind::Bool
            | ValueKind::Int
            | ValueKind::UInt
            | ValueKind::Double
            | ValueKind::Duration
            | ValueKind::Time
    )
}

#[inline]
fn flip_sign(i: i64) -> u64 {
    (i as u64) ^ (1 << 63)
}

#[inline]
fn encode_f64(d: f64) -> u64 {
    let bits = d.to_bits();
    if bits >> 63 == 1 {
        !bits
    } else {
        bits | (1 << 63)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vast_core::Duration;

    #[test]
    fn test_int_encoding_preserves_order() {
        let xs = [i64::MIN, -5, -1, 0, 1, 5, i64::MAX];
        let keys: Vec<u64> = xs.iter().map(|&i| encode(&Value::Int(i)).unwrap()).collect();
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_double_encoding_preserves_order() {
        let xs = [-1e300, -1.5, -0.0, 0.5, 1.5, 1e300];
        let keys: Vec<u64> = xs
            .iter()
            .map(|&d| encode(&Value::Double(d)).unwrap())
            .collect();
        assert!(keys.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_duration_encoding_preserves_order() {
        let a = encode(&Value::Duration(Duration::from_secs_f64(0.5))).unwrap();
        let b = encode(&Value::Duration(Duration::from_secs_f64(1.5))).unwrap();
        let c = encode(&Value::Duration(Duration::from_secs_f64(-2.0))).unwrap();
        assert!(c < a && a < b);
    }

    #[test]
    fn test_non_arithmetic_rejected() {
        assert!(encode(&Value::Str("x".into())).is_none());
        assert!(encode(&Value::None).is_none());
    }
}
