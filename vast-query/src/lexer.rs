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

//! Query lexer
//!
//! Converts query text into a token stream. Typed literals are
//! classified here: `10.0.0.0/8` is one subnet token, `80/tcp` a port,
//! `1.5s` a duration, `2014-01-01` a time point. A `/` opens a pattern
//! literal unless the previous token could end an operand, in which case
//! it is division.

use std::net::IpAddr;

use vast_core::{PortProto, Result, VastError};

use crate::token::{Span, Token, TokenKind};

pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
    /// Whether the previous token could end an operand; decides between
    /// division and a pattern literal for `/`.
    after_operand: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            pos: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
            after_operand: false,
        }
    }

    /// Tokenizes the entire input.
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        while !self.is_at_end() {
            self.skip_whitespace();
            if self.is_at_end() {
                break;
            }
            self.scan_token()?;
        }
        let span = Span::new(self.pos, self.pos, self.line, self.column);
        self.tokens.push(Token::new(TokenKind::Eof, span));
        Ok(self.tokens)
    }

    // ---- low-level cursor ------------------------------------------------

    fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(n)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.input[self.pos..].chars().next()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.advance();
        }
    }

    fn error(&self, message: impl Into<String>) -> VastError {
        VastError::parse(message, self.line, self.column)
    }

    fn span_from(&self, start: usize, line: usize, column: usize) -> Span {
        Span::new(start, self.pos, line, column)
    }

    fn push(&mut self, kind: TokenKind, span: Span) {
        self.after_operand = matches!(
            kind,
            TokenKind::True
                | TokenKind::False
                | TokenKind::UInt(_)
                | TokenKind::Double(_)
                | TokenKind::Duration(_)
                | TokenKind::Time(_)
                | TokenKind::Str(_)
                | TokenKind::Pattern(_)
                | TokenKind::Address(_)
                | TokenKind::Subnet(..)
                | TokenKind::Port(..)
                | TokenKind::Identifier(_)
                | TokenKind::RParen
        );
        self.tokens.push(Token::new(kind, span));
    }

    // ---- scanning --------------------------------------------------------

    fn scan_token(&mut self) -> Result<()> {
        let start = self.pos;
        let (line, column) = (self.line, self.column);
        let c = self.peek().ok_or_else(|| self.error("unexpected end of input"))?;
        let kind = match c {
            '(' => {
                self.advance();
                TokenKind::LParen
            }
            ')' => {
                self.advance();
                TokenKind::RParen
            }
            '@' => {
                self.advance();
                TokenKind::At
            }
            '.' => {
                self.advance();
                TokenKind::Dot
            }
            '+' => {
                self.advance();
                TokenKind::Plus
            }
            '-' => {
                self.advance();
                TokenKind::Minus
            }
            '*' => {
                self.advance();
                TokenKind::Star
            }
            '%' => {
                self.advance();
                TokenKind::Percent
            }
            '^' => {
                self.advance();
                TokenKind::Caret
            }
            '~' => {
                self.advance();
                TokenKind::Tilde
            }
            '=' => {
                self.advance();
                if self.eat('=') {
                    TokenKind::EqEq
                } else {
                    return Err(self.error("expected == (single = is not an operator)"));
                }
            }
            '<' => {
                self.advance();
                if self.eat('=') {
                    TokenKind::Le
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                self.advance();
                if self.eat('=') {
                    TokenKind::Ge
                } else {
                    TokenKind::Gt
                }
            }
            '!' => {
                self.advance();
                if self.eat('=') {
                    TokenKind::BangEq
                } else if self.eat('~') {
                    TokenKind::BangTilde
                } else if self.peek() == Some('i')
                    && self.peek_nth(1) == Some('n')
                    && !matches!(self.peek_nth(2), Some(c) if c.is_alphanumeric() || c == '_')
                {
                    self.advance();
                    self.advance();
                    TokenKind::NotIn
                } else {
                    TokenKind::Bang
                }
            }
            '|' => {
                self.advance();
                if self.eat('|') {
                    TokenKind::OrOr
                } else {
                    TokenKind::BitOr
                }
            }
            '&' => {
                self.advance();
                if self.eat('&') {
                    TokenKind::AndAnd
                } else if matches!(self.peek(), Some(c) if c.is_ascii_alphabetic()) {
                    let word = self.scan_word();
                    match word.as_str() {
                        "name" => TokenKind::TagName,
                        "time" => TokenKind::TagTime,
                        "id" => TokenKind::TagId,
                        other => {
                            return Err(self.error(format!("unknown tag: &{}", other)));
                        }
                    }
                } else {
                    TokenKind::BitAnd
                }
            }
            '"' => self.scan_string()?,
            '/' => {
                if self.after_operand {
                    self.advance();
                    TokenKind::Slash
                } else {
                    self.scan_pattern()?
                }
            }
            c if c.is_ascii_digit() => self.scan_numberish()?,
            c if c.is_ascii_alphabetic() || c == '_' || c == ':' => self.scan_wordish()?,
            other => return Err(self.error(format!("unexpected character: {:?}", other))),
        };
        let span = self.span_from(start, line, column);
        self.push(kind, span);
        Ok(())
    }

    fn scan_word(&mut self) -> String {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            self.advance();
        }
        self.input[start..self.pos].to_string()
    }

    /// Identifiers, keywords, and IPv6 literals that start with hex
    /// letters (e.g. `fe80::1`) or `::`.
    fn scan_wordish(&mut self) -> Result<TokenKind> {
        if self.peek() == Some(':') {
            return self.scan_address_chars(self.pos);
        }
        let start = self.pos;
        let word = self.scan_word();
        if self.peek() == Some(':') && word.chars().all(|c| c.is_ascii_hexdigit()) {
            return self.scan_address_chars(start);
        }
        let kind = match word.as_str() {
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "in" => TokenKind::In,
            _ => TokenKind::Identifier(word),
        };
        Ok(kind)
    }

    /// Consumes the remainder of an address starting at *start* and
    /// parses it, with an optional `/len` suffix forming a subnet.
    fn scan_address_chars(&mut self, start: usize) -> Result<TokenKind> {
        while matches!(self.peek(), Some(c) if c.is_ascii_hexdigit() || c == ':' || c == '.') {
            self.advance();
        }
        let text = &self.input[start..self.pos];
        let addr: IpAddr = text
            .parse()
            .map_err(|_| self.error(format!("invalid address: {}", text)))?;
        self.maybe_subnet(addr)
    }

    fn maybe_subnet(&mut self, addr: IpAddr) -> Result<TokenKind> {
        if self.peek() == Some('/') && matches!(self.peek_nth(1), Some(c) if c.is_ascii_digit()) {
            self.advance();
            let digits = self.scan_digits();
            let length: u8 = digits
                .parse()
                .map_err(|_| self.error(format!("invalid prefix length: {}", digits)))?;
            Ok(TokenKind::Subnet(addr, length))
        } else {
            Ok(TokenKind::Address(addr))
        }
    }

    fn scan_digits(&mut self) -> String {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }
        self.input[start..self.pos].to_string()
    }

    /// Everything that starts with a digit: unsigned integers, doubles,
    /// durations, time points, addresses, subnets, and ports.
    fn scan_numberish(&mut self) -> Result<TokenKind> {
        let start = self.pos;
        // Maximal run of characters that can appear in a numeric or
        // address literal. A dot joins the run only when followed by
        // another literal character, so `conn.duration` never lexes as a
        // number even if an identifier starts with a digit upstream.
        loop {
            match self.peek() {
                Some(c) if c.is_ascii_hexdigit() || c == ':' => {
                    self.advance();
                }
                Some('.')
                    if matches!(self.peek_nth(1), Some(c) if c.is_ascii_hexdigit() || c == ':') =>
                {
                    self.advance();
                }
                _ => break,
            }
        }
        let text = &self.input[start..self.pos];
        if text.contains(':') {
            let addr: IpAddr = text
                .parse()
                .map_err(|_| self.error(format!("invalid address: {}", text)))?;
            return self.maybe_subnet(addr);
        }
        let dots = text.matches('.').count();
        if dots >= 2 {
            let addr: IpAddr = text
                .parse()
                .map_err(|_| self.error(format!("invalid address: {}", text)))?;
            return self.maybe_subnet(addr);
        }
        if text.chars().any(|c| c.is_ascii_alphabetic()) {
            return Err(self.error(format!("invalid number: {}", text)));
        }
        if dots == 1 {
            let value: f64 = text
                .parse()
                .map_err(|_| self.error(format!("invalid number: {}", text)))?;
            if let Some(unit) = self.try_duration_unit() {
                return Ok(TokenKind::Duration((value * unit as f64) as i64));
            }
            return Ok(TokenKind::Double(value));
        }
        // Pure digits: date, duration, port, or uint.
        if text.len() == 4
            && self.peek() == Some('-')
            && matches!(self.peek_nth(1), Some(c) if c.is_ascii_digit())
        {
            let year: i64 = text.parse().unwrap();
            return self.scan_time(year);
        }
        let value: u64 = text
            .parse()
            .map_err(|_| self.error(format!("number too large: {}", text)))?;
        if let Some(unit) = self.try_duration_unit() {
            return Ok(TokenKind::Duration(value as i64 * unit));
        }
        if self.peek() == Some('/')
            && matches!(self.peek_nth(1), Some(c) if c.is_ascii_alphabetic() || c == '?')
        {
            self.advance();
            let proto = if self.eat('?') {
                PortProto::Unknown
            } else {
                match self.scan_word().as_str() {
                    "tcp" => PortProto::Tcp,
                    "udp" => PortProto::Udp,
                    "icmp" => PortProto::Icmp,
                    other => {
                        return Err(self.error(format!("unknown port protocol: {}", other)));
                    }
                }
            };
            let number = u16::try_from(value)
                .map_err(|_| self.error(format!("port number out of range: {}", value)))?;
            return Ok(TokenKind::Port(number, proto));
        }
        Ok(TokenKind::UInt(value))
    }

    /// Nanoseconds per unit if a duration suffix follows.
    fn try_duration_unit(&mut self) -> Option<i64> {
        let rest = &self.input[self.pos..];
        let word_len = rest
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(rest.len());
        let unit = match &rest[..word_len] {
            "ns" => 1,
            "us" => 1_000,
            "ms" => 1_000_000,
            "s" | "sec" | "secs" => 1_000_000_000,
            "min" | "mins" => 60 * 1_000_000_000,
            "h" | "hrs" => 3_600 * 1_000_000_000,
            "d" | "days" => 86_400 * 1_000_000_000,
            _ => return None,
        };
        for _ in 0..word_len {
            self.advance();
        }
        Some(unit)
    }

    /// `YYYY-MM-DD` with optional `THH:MM:SS`, as epoch nanoseconds.
    fn scan_time(&mut self, year: i64) -> Result<TokenKind> {
        self.advance(); // '-'
        let month: u32 = self
            .scan_digits()
            .parse()
            .map_err(|_| self.error("invalid month"))?;
        if !self.eat('-') {
            return Err(self.error("expected - in time point"));
        }
        let day: u32 = self
            .scan_digits()
            .parse()
            .map_err(|_| self.error("invalid day"))?;
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return Err(self.error("time point out of range"));
        }
        let mut secs_of_day: i64 = 0;
        if self.eat('T') {
            let hour: i64 = self
                .scan_digits()
                .parse()
                .map_err(|_| self.error("invalid hour"))?;
            let mut minute: i64 = 0;
            let mut second: i64 = 0;
            if self.eat(':') {
                minute = self
                    .scan_digits()
                    .parse()
                    .map_err(|_| self.error("invalid minute"))?;
                if self.eat(':') {
                    second = self
                        .scan_digits()
                        .parse()
                        .map_err(|_| self.error("invalid second"))?;
                }
            }
            if hour > 23 || minute > 59 || second > 60 {
                return Err(self.error("time point out of range"));
            }
            secs_of_day = hour * 3_600 + minute * 60 + second;
        }
        let days = days_from_civil(year, month, day);
        let ns = (days * 86_400 + secs_of_day) * 1_000_000_000;
        Ok(TokenKind::Time(ns))
    }

    fn scan_string(&mut self) -> Result<TokenKind> {
        self.advance(); // opening quote
        let mut out = String::new();
        loop {
            match self.advance() {
                None => return Err(self.error("unterminated string literal")),
                Some('"') => break,
                Some('\\') => match self.advance() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some('0') => out.push('\0'),
                    Some(c @ ('"' | '\\')) => out.push(c),
                    Some(c) => {
                        return Err(self.error(format!("unknown escape: \\{}", c)));
                    }
                    None => return Err(self.error("unterminated string literal")),
                },
                Some(c) => out.push(c),
            }
        }
        Ok(TokenKind::Str(out))
    }

    /// `/regex/` with `\/` escaping the delimiter; all other escapes
    /// pass through to the regex engine untouched.
    fn scan_pattern(&mut self) -> Result<TokenKind> {
        self.advance(); // opening slash
        let mut out = String::new();
        loop {
            match self.advance() {
                None => return Err(self.error("unterminated pattern literal")),
                Some('/') => break,
                Some('\\') => match self.advance() {
                    Some('/') => out.push('/'),
                    Some(c) => {
                        out.push('\\');
                        out.push(c);
                    }
                    None => return Err(self.error("unterminated pattern literal")),
                },
                Some(c) => out.push(c),
            }
        }
        Ok(TokenKind::Pattern(out))
    }
}

/// Days since 1970-01-01 for a proleptic Gregorian date.
fn days_from_civil(y: i64, m: u32, d: u32) -> i64 {
    let y = if m <= 2 { y - 1 } else { y };
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = y - era * 400;
    let mp = (m as i64 + 9) % 12;
    let doy = (153 * mp + 2) / 5 + d as i64 - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        let mut tokens: Vec<TokenKind> = Lexer::new(input)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect();
        assert_eq!(tokens.pop(), Some(TokenKind::Eof));
        tokens
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("== != < <= > >= ~ !~ in !in && || !"),
            vec![
                TokenKind::EqEq,
                TokenKind::BangEq,
                TokenKind::Lt,
                TokenKind::Le,
                TokenKind::Gt,
                TokenKind::Ge,
                TokenKind::Tilde,
                TokenKind::BangTilde,
                TokenKind::In,
                TokenKind::NotIn,
                TokenKind::AndAnd,
                TokenKind::OrOr,
                TokenKind::Bang,
            ]
        );
    }

    #[test]
    fn test_event_clause_tokens() {
        assert_eq!(
            kinds("conn.duration > 1s"),
            vec![
                TokenKind::Identifier("conn".into()),
                TokenKind::Dot,
                TokenKind::Identifier("duration".into()),
                TokenKind::Gt,
                TokenKind::Duration(1_000_000_000),
            ]
        );
    }

    #[test]
    fn test_fractional_duration() {
        assert_eq!(kinds("1.5s"), vec![TokenKind::Duration(1_500_000_000)]);
        assert_eq!(kinds("100ms"), vec![TokenKind::Duration(100_000_000)]);
    }

    #[test]
    fn test_addresses_and_subnets() {
        assert_eq!(
            kinds("192.168.0.1"),
            vec![TokenKind::Address("192.168.0.1".parse().unwrap())]
        );
        assert_eq!(
            kinds("192.168.0.0/16"),
            vec![TokenKind::Subnet("192.168.0.0".parse().unwrap(), 16)]
        );
        assert_eq!(
            kinds("fe80::1"),
            vec![TokenKind::Address("fe80::1".parse().unwrap())]
        );
        assert_eq!(
            kinds("::1"),
            vec![TokenKind::Address("::1".parse().unwrap())]
        );
    }

    #[test]
    fn test_ports() {
        assert_eq!(kinds("80/tcp"), vec![TokenKind::Port(80, PortProto::Tcp)]);
        assert_eq!(
            kinds("53/udp 8/icmp 1234/?"),
            vec![
                TokenKind::Port(53, PortProto::Udp),
                TokenKind::Port(8, PortProto::Icmp),
                TokenKind::Port(1234, PortProto::Unknown),
            ]
        );
    }

    #[test]
    fn test_pattern_vs_division() {
        assert_eq!(
            kinds("&name ~ /http.*/"),
            vec![
                TokenKind::TagName,
                TokenKind::Tilde,
                TokenKind::Pattern("http.*".into()),
            ]
        );
        assert_eq!(
            kinds("10 / 2"),
            vec![
                TokenKind::UInt(10),
                TokenKind::Slash,
                TokenKind::UInt(2),
            ]
        );
    }

    #[test]
    fn test_pattern_escaped_delimiter() {
        assert_eq!(
            kinds(r"/a\/b\d+/"),
            vec![TokenKind::Pattern(r"a/b\d+".into())]
        );
    }

    #[test]
    fn test_time_points() {
        // 2014-01-01 is 16071 days past the epoch.
        assert_eq!(
            kinds("2014-01-01"),
            vec![TokenKind::Time(16_071 * 86_400 * 1_000_000_000)]
        );
        assert_eq!(
            kinds("1970-01-02T00:00:01"),
            vec![TokenKind::Time(86_401 * 1_000_000_000)]
        );
    }

    #[test]
    fn test_strings() {
        assert_eq!(
            kinds(r#""hello \"world\"\n""#),
            vec![TokenKind::Str("hello \"world\"\n".into())]
        );
    }

    #[test]
    fn test_tags() {
        assert_eq!(
            kinds("&name &time &id"),
            vec![TokenKind::TagName, TokenKind::TagTime, TokenKind::TagId]
        );
        assert!(Lexer::new("&bogus").tokenize().is_err());
    }

    #[test]
    fn test_type_clause_tokens() {
        assert_eq!(
            kinds("@string == \"x\""),
            vec![
                TokenKind::At,
                TokenKind::Identifier("string".into()),
                TokenKind::EqEq,
                TokenKind::Str("x".into()),
            ]
        );
    }

    #[test]
    fn test_error_reports_location() {
        let err = Lexer::new("conn.duration > $").tokenize().unwrap_err();
        match err {
            VastError::Parse { line, column, .. } => {
                assert_eq!(line, 1);
                assert_eq!(column, 17);
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_days_from_civil() {
        assert_eq!(days_from_civil(1970, 1, 1), 0);
        assert_eq!(days_from_civil(1970, 1, 2), 1);
        assert_eq!(days_from_civil(1969, 12, 31), -1);
        assert_eq!(days_from_civil(2000, 3, 1), 11_017);
        assert_eq!(days_from_civil(2014, 1, 1), 16_071);
    }
}
