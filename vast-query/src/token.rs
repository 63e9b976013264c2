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

//! Query tokens
//!
//! Tokens carry typed literal payloads: the lexer already classifies
//! addresses, subnets, ports, durations, and time points, so the parser
//! never re-interprets raw text.

use std::fmt;
use std::net::IpAddr;

use vast_core::PortProto;

/// Source location for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize, column: usize) -> Self {
        Span {
            start,
            end,
            line,
            column,
        }
    }
}

impl Default for Span {
    fn default() -> Self {
        Span {
            start: 0,
            end: 0,
            line: 1,
            column: 1,
        }
    }
}

/// A token with its source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }
}

/// Token classification.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    True,
    False,
    UInt(u64),
    Double(f64),
    /// Duration literal, in nanoseconds.
    Duration(i64),
    /// Time point literal, in nanoseconds since the epoch.
    Time(i64),
    Str(String),
    /// Pattern literal source, without the enclosing slashes.
    Pattern(String),
    Address(IpAddr),
    Subnet(IpAddr, u8),
    Port(u16, PortProto),

    Identifier(String),

    // Tags
    TagName,
    TagTime,
    TagId,

    // Query operators
    AndAnd,
    OrOr,
    Bang,

    // Clause operators
    EqEq,
    BangEq,
    Lt,
    Le,
    Gt,
    Ge,
    Tilde,
    BangTilde,
    In,
    NotIn,

    // Expression operators and punctuation
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    BitAnd,
    BitOr,
    Caret,
    At,
    Dot,
    LParen,
    RParen,

    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::True => f.write_str("true"),
            TokenKind::False => f.write_str("false"),
            TokenKind::UInt(v) => write!(f, "{}", v),
            TokenKind::Double(v) => write!(f, "{}", v),
            TokenKind::Duration(ns) => write!(f, "{}ns", ns),
            TokenKind::Time(ns) => write!(f, "@{}", ns),
            TokenKind::Str(s) => write!(f, "\"{}\"", s),
            TokenKind::Pattern(p) => write!(f, "/{}/", p),
            TokenKind::Address(a) => write!(f, "{}", a),
            TokenKind::Subnet(a, l) => write!(f, "{}/{}", a, l),
            TokenKind::Port(n, p) => write!(f, "{}/{}", n, p),
            TokenKind::Identifier(s) => f.write_str(s),
            TokenKind::TagName => f.write_str("&name"),
            TokenKind::TagTime => f.write_str("&time"),
            TokenKind::TagId => f.write_str("&id"),
            TokenKind::AndAnd => f.write_str("&&"),
            TokenKind::OrOr => f.write_str("||"),
            TokenKind::Bang => f.write_str("!"),
            TokenKind::EqEq => f.write_str("=="),
            TokenKind::BangEq => f.write_str("!="),
            TokenKind::Lt => f.write_str("<"),
            TokenKind::Le => f.write_str("<="),
            TokenKind::Gt => f.write_str(">"),
            TokenKind::Ge => f.write_str(">="),
            TokenKind::Tilde => f.write_str("~"),
            TokenKind::BangTilde => f.write_str("!~"),
            TokenKind::In => f.write_str("in"),
            TokenKind::NotIn => f.write_str("!in"),
            TokenKind::Plus => f.write_str("+"),
            TokenKind::Minus => f.write_str("-"),
            TokenKind::Star => f.write_str("*"),
            TokenKind::Slash => f.write_str("/"),
            TokenKind::Percent => f.write_str("%"),
            TokenKind::BitAnd => f.write_str("&"),
            TokenKind::BitOr => f.write_str("|"),
            TokenKind::Caret => f.write_str("^"),
            TokenKind::At => f.write_str("@"),
            TokenKind::Dot => f.write_str("."),
            TokenKind::LParen => f.write_str("("),
            TokenKind::RParen => f.write_str(")"),
            TokenKind::Eof => f.write_str("<eof>"),
        }
    }
}
