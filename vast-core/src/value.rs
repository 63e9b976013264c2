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

//! The polymorphic value model
//!
//! `Value` is the tagged union over all primitive and container types an
//! event field can hold. Equality and ordering are only meaningful within
//! compatible type pairs; `RelOp::compatible` encodes the legality table
//! used by query validation.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, VastError};

/// A signed duration with nanosecond resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Duration(pub i64);

impl Duration {
    pub const fn from_nanos(ns: i64) -> Self {
        Duration(ns)
    }

    pub const fn from_secs(secs: i64) -> Self {
        Duration(secs * 1_000_000_000)
    }

    pub fn from_secs_f64(secs: f64) -> Self {
        Duration((secs * 1e9) as i64)
    }

    pub const fn as_nanos(self) -> i64 {
        self.0
    }

    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1e9
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.as_secs_f64())
    }
}

/// A point in time, as nanoseconds since the UNIX epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub const fn from_nanos(ns: i64) -> Self {
        Timestamp(ns)
    }

    pub const fn from_secs(secs: i64) -> Self {
        Timestamp(secs * 1_000_000_000)
    }

    pub const fn as_nanos(self) -> i64 {
        self.0
    }
}

impl std::ops::Add<Duration> for Timestamp {
    type Output = Timestamp;
    fn add(self, rhs: Duration) -> Timestamp {
        Timestamp(self.0 + rhs.0)
    }
}

impl std::ops::Sub<Duration> for Timestamp {
    type Output = Timestamp;
    fn sub(self, rhs: Duration) -> Timestamp {
        Timestamp(self.0 - rhs.0)
    }
}

impl std::ops::Sub for Timestamp {
    type Output = Duration;
    fn sub(self, rhs: Timestamp) -> Duration {
        Duration(self.0 - rhs.0)
    }
}

/// A compiled regular expression with its source text.
///
/// Matching is anchored: the pattern must cover the entire subject, which is
/// what the query operators `~` and `!~` expect.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let regex = Regex::new(&format!("^(?:{})$", source))
            .map_err(|e| VastError::validation(format!("invalid pattern /{}/: {}", source, e)))?;
        Ok(Pattern { source, regex })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, subject: &str) -> bool {
        self.regex.is_match(subject)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.source)
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Pattern::new(source).map_err(serde::de::Error::custom)
    }
}

/// Transport protocol of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PortProto {
    #[default]
    Unknown,
    Tcp,
    Udp,
    Icmp,
}

impl fmt::Display for PortProto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PortProto::Unknown => "?",
            PortProto::Tcp => "tcp",
            PortProto::Udp => "udp",
            PortProto::Icmp => "icmp",
        };
        f.write_str(s)
    }
}

/// A transport-layer port: a 16-bit number plus its protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Port {
    pub number: u16,
    pub proto: PortProto,
}

impl Port {
    pub const fn new(number: u16, proto: PortProto) -> Self {
        Port { number, proto }
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.number, self.proto)
    }
}

/// An IP subnet in CIDR notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subnet {
    network: IpAddr,
    length: u8,
}

impl Subnet {
    /// Creates a subnet, normalizing the network address to its prefix.
    ///
    /// The prefix length counts from the left of the address; for IPv4 it
    /// must be at most 32, for IPv6 at most 128.
    pub fn new(network: IpAddr, length: u8) -> Result<Self> {
        let max = match network {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        };
        if length > max {
            return Err(VastError::validation(format!(
                "prefix length {} exceeds maximum {} for {}",
                length, max, network
            )));
        }
        let network = mask_address(network, length);
        Ok(Subnet { network, length })
    }

    pub fn network(&self) -> IpAddr {
        self.network
    }

    pub fn length(&self) -> u8 {
        self.length
    }

    /// The prefix length in the 128-bit IPv4-mapped address space.
    pub fn mapped_length(&self) -> u8 {
        match self.network {
            IpAddr::V4(_) => self.length + 96,
            IpAddr::V6(_) => self.length,
        }
    }

    pub fn contains(&self, addr: IpAddr) -> bool {
        let len = self.mapped_length() as u32;
        if len == 0 {
            return true;
        }
        let prefix = address_bits(self.network) >> (128 - len);
        let bits = address_bits(addr) >> (128 - len);
        prefix == bits
    }
}

impl fmt::Display for Subnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.length)
    }
}

/// Maps an address into the 128-bit IPv4-mapped space (RFC 4291 §2.5.5.2).
pub fn address_bits(addr: IpAddr) -> u128 {
    match addr {
        IpAddr::V4(v4) => u128::from(v4.to_ipv6_mapped()),
        IpAddr::V6(v6) => u128::from(v6),
    }
}

fn mask_address(addr: IpAddr, length: u8) -> IpAddr {
    match addr {
        IpAddr::V4(v4) => {
            let bits = u32::from(v4);
            let masked = if length == 0 {
                0
            } else {
                bits & (u32::MAX << (32 - length as u32))
            };
            IpAddr::V4(Ipv4Addr::from(masked))
        }
        IpAddr::V6(v6) => {
            let bits = u128::from(v6);
            let masked = if length == 0 {
                0
            } else {
                bits & (u128::MAX << (128 - length as u32))
            };
            IpAddr::V6(Ipv6Addr::from(masked))
        }
    }
}

/// The type tag of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    None,
    Invalid,
    Bool,
    Int,
    UInt,
    Double,
    Duration,
    Time,
    String,
    Pattern,
    Address,
    Subnet,
    Port,
    Vector,
    Set,
    Table,
    Record,
}

impl ValueKind {
    /// Resolves a type name as it appears in a `@type` clause.
    pub fn from_type_name(name: &str) -> Option<ValueKind> {
        let kind = match name {
            "bool" => ValueKind::Bool,
            "int" => ValueKind::Int,
            "uint" => ValueKind::UInt,
            "double" => ValueKind::Double,
            "duration" => ValueKind::Duration,
            "timepoint" => ValueKind::Time,
            "string" => ValueKind::String,
            "vector" => ValueKind::Vector,
            "set" => ValueKind::Set,
            "table" => ValueKind::Table,
            "record" => ValueKind::Record,
            "address" => ValueKind::Address,
            "prefix" => ValueKind::Subnet,
            "port" => ValueKind::Port,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValueKind::None => "none",
            ValueKind::Invalid => "invalid",
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::UInt => "uint",
            ValueKind::Double => "double",
            ValueKind::Duration => "duration",
            ValueKind::Time => "timepoint",
            ValueKind::String => "string",
            ValueKind::Pattern => "pattern",
            ValueKind::Address => "address",
            ValueKind::Subnet => "prefix",
            ValueKind::Port => "port",
            ValueKind::Vector => "vector",
            ValueKind::Set => "set",
            ValueKind::Table => "table",
            ValueKind::Record => "record",
        };
        f.write_str(s)
    }
}

/// The polymorphic value: a tagged union over all field types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    None,
    Invalid,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Double(f64),
    Duration(Duration),
    Time(Timestamp),
    Str(String),
    Pattern(Pattern),
    Address(IpAddr),
    Subnet(Subnet),
    Port(Port),
    Vector(Vec<Value>),
    Set(Vec<Value>),
    Table(Vec<(Value, Value)>),
    Record(Vec<Value>),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::None => ValueKind::None,
            Value::Invalid => ValueKind::Invalid,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::UInt(_) => ValueKind::UInt,
            Value::Double(_) => ValueKind::Double,
            Value::Duration(_) => ValueKind::Duration,
            Value::Time(_) => ValueKind::Time,
            Value::Str(_) => ValueKind::String,
            Value::Pattern(_) => ValueKind::Pattern,
            Value::Address(_) => ValueKind::Address,
            Value::Subnet(_) => ValueKind::Subnet,
            Value::Port(_) => ValueKind::Port,
            Value::Vector(_) => ValueKind::Vector,
            Value::Set(_) => ValueKind::Set,
            Value::Table(_) => ValueKind::Table,
            Value::Record(_) => ValueKind::Record,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Follows a record offset path into nested records.
    ///
    /// Returns `None` if the path leaves the value or crosses a non-record.
    pub fn at<'a>(&'a self, path: &[usize]) -> Option<&'a Value> {
        let mut current = self;
        for &i in path {
            match current {
                Value::Record(fields) => current = fields.get(i)?,
                _ => return None,
            }
        }
        Some(current)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => f.write_str("nil"),
            Value::Invalid => f.write_str("<invalid>"),
            Value::Bool(b) => write!(f, "{}", if *b { 'T' } else { 'F' }),
            Value::Int(i) => {
                if *i >= 0 {
                    write!(f, "+{}", i)
                } else {
                    write!(f, "{}", i)
                }
            }
            Value::UInt(u) => write!(f, "{}", u),
            Value::Double(d) => write!(f, "{}", d),
            Value::Duration(d) => write!(f, "{}", d),
            Value::Time(t) => write!(f, "@{}", t.as_nanos()),
            Value::Str(s) => write!(f, "\"{}\"", s),
            Value::Pattern(p) => write!(f, "{}", p),
            Value::Address(a) => write!(f, "{}", a),
            Value::Subnet(s) => write!(f, "{}", s),
            Value::Port(p) => write!(f, "{}", p),
            Value::Vector(xs) => {
                f.write_str("[")?;
                for (i, x) in xs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", x)?;
                }
                f.write_str("]")
            }
            Value::Set(xs) => {
                f.write_str("{")?;
                for (i, x) in xs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", x)?;
                }
                f.write_str("}")
            }
            Value::Table(entries) => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{} -> {}", k, v)?;
                }
                f.write_str("}")
            }
            Value::Record(fields) => {
                f.write_str("(")?;
                for (i, x) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", x)?;
                }
                f.write_str(")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_is_anchored() {
        let p = Pattern::new("http.*").unwrap();
        assert!(p.matches("http_req"));
        assert!(p.matches("http"));
        assert!(!p.matches("xhttp"));
        assert!(!p.matches("dns"));
    }

    #[test]
    fn test_subnet_normalizes_network() {
        let s = Subnet::new("192.168.1.5".parse().unwrap(), 16).unwrap();
        assert_eq!(s.network(), "192.168.0.0".parse::<IpAddr>().unwrap());
        assert!(s.contains("192.168.255.1".parse().unwrap()));
        assert!(!s.contains("10.0.0.1".parse().unwrap()));
    }

    #[test]
    fn test_subnet_contains_mapped_v4() {
        let s = Subnet::new("10.0.0.0".parse().unwrap(), 8).unwrap();
        assert!(s.contains("10.1.2.3".parse().unwrap()));
        assert!(!s.contains("11.0.0.1".parse().unwrap()));
    }

    #[test]
    fn test_record_offset_path() {
        let v = Value::Record(vec![
            Value::UInt(1),
            Value::Record(vec![Value::Str("inner".into()), Value::Bool(true)]),
        ]);
        assert_eq!(v.at(&[0]), Some(&Value::UInt(1)));
        assert_eq!(v.at(&[1, 0]), Some(&Value::Str("inner".into())));
        assert_eq!(v.at(&[1, 2]), None);
        assert_eq!(v.at(&[0, 0]), None);
    }

    #[test]
    fn test_time_arithmetic() {
        let t = Timestamp::from_secs(100);
        let d = Duration::from_secs(1);
        assert_eq!(t + d, Timestamp::from_secs(101));
        assert_eq!(t - Timestamp::from_secs(99), Duration::from_secs(1));
    }
}
