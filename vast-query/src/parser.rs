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

//! Query parser
//!
//! Recursive descent over the token stream:
//!
//! ```text
//! query   := or
//! or      := and ( "||" and )*
//! and     := unary ( "&&" unary )*
//! unary   := "!" unary | "(" query ")" | clause
//! clause  := tag_clause | type_clause | event_clause
//! expr    := precedence-climbing arithmetic over typed literals
//! ```

use vast_core::{Duration, Pattern, Port, Result, Subnet, Timestamp, Value, ValueKind, VastError};

use crate::ast::{BinaryExprOp, Clause, Expr, Query, Tag, UnaryExprOp};
use crate::lexer::Lexer;
use crate::token::{Span, Token, TokenKind};

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Parses a query string into an AST.
    pub fn parse(input: &str) -> Result<Query> {
        let tokens = Lexer::new(input).tokenize()?;
        let mut parser = Parser { tokens, pos: 0 };
        let query = parser.parse_query()?;
        parser.expect_eof()?;
        Ok(query)
    }

    // ---- helpers ---------------------------------------------------------

    fn peek(&self) -> &Token {
        self.tokens
            .get(self.pos)
            .unwrap_or(&self.tokens[self.tokens.len() - 1])
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !matches!(token.kind, TokenKind::Eof) {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if &self.peek().kind == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn error_at(&self, span: Span, message: impl Into<String>) -> VastError {
        VastError::parse(message, span.line, span.column)
    }

    fn error_here(&self, message: impl Into<String>) -> VastError {
        self.error_at(self.peek().span, message)
    }

    fn expect_eof(&mut self) -> Result<()> {
        if matches!(self.peek().kind, TokenKind::Eof) {
            Ok(())
        } else {
            Err(self.error_here(format!("unexpected trailing input: {}", self.peek().kind)))
        }
    }

    fn expect_identifier(&mut self, what: &str) -> Result<String> {
        match &self.peek().kind {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            other => Err(self.error_here(format!("expected {}, found {}", what, other))),
        }
    }

    // ---- query level -----------------------------------------------------

    fn parse_query(&mut self) -> Result<Query> {
        let mut lhs = self.parse_conjunction()?;
        while self.eat(&TokenKind::OrOr) {
            let rhs = self.parse_conjunction()?;
            lhs = Query::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_conjunction(&mut self) -> Result<Query> {
        let mut lhs = self.parse_unary()?;
        while self.eat(&TokenKind::AndAnd) {
            let rhs = self.parse_unary()?;
            lhs = Query::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Query> {
        if self.eat(&TokenKind::Bang) {
            let operand = self.parse_unary()?;
            return Ok(Query::Not(Box::new(operand)));
        }
        if self.eat(&TokenKind::LParen) {
            let query = self.parse_query()?;
            if !self.eat(&TokenKind::RParen) {
                return Err(self.error_here("expected ) to close query group"));
            }
            return Ok(query);
        }
        Ok(Query::Clause(self.parse_clause()?))
    }

    // ---- clause level ----------------------------------------------------

    fn parse_clause(&mut self) -> Result<Clause> {
        match &self.peek().kind {
            TokenKind::TagName | TokenKind::TagTime | TokenKind::TagId => self.parse_tag_clause(),
            TokenKind::At => self.parse_type_clause(),
            TokenKind::Identifier(_) => self.parse_event_clause(),
            other => Err(self.error_here(format!("expected a clause, found {}", other))),
        }
    }

    fn parse_tag_clause(&mut self) -> Result<Clause> {
        let tag = match self.advance().kind {
            TokenKind::TagName => Tag::Name,
            TokenKind::TagTime => Tag::Time,
            TokenKind::TagId => Tag::Id,
            _ => unreachable!("caller checked the tag token"),
        };
        let op = self.parse_rel_op()?;
        let rhs = self.parse_expr()?;
        Ok(Clause::Tag { tag, op, rhs })
    }

    fn parse_type_clause(&mut self) -> Result<Clause> {
        let at_span = self.advance().span; // '@'
        let name = self.expect_identifier("a type name after @")?;
        let kind = ValueKind::from_type_name(&name)
            .ok_or_else(|| self.error_at(at_span, format!("unknown type: @{}", name)))?;
        let op = self.parse_rel_op()?;
        let rhs = self.parse_expr()?;
        Ok(Clause::Type { kind, op, rhs })
    }

    fn parse_event_clause(&mut self) -> Result<Clause> {
        let event = self.expect_identifier("an event type")?;
        if !self.eat(&TokenKind::Dot) {
            return Err(self.error_here("expected . after event type"));
        }
        let mut path = vec![self.expect_identifier("a field name")?];
        while self.eat(&TokenKind::Dot) {
            path.push(self.expect_identifier("a field name")?);
        }
        let op = self.parse_rel_op()?;
        let rhs = self.parse_expr()?;
        Ok(Clause::Event {
            event,
            path,
            op,
            rhs,
        })
    }

    fn parse_rel_op(&mut self) -> Result<vast_core::RelOp> {
        use vast_core::RelOp;
        let op = match self.peek().kind {
            TokenKind::EqEq => RelOp::Equal,
            TokenKind::BangEq => RelOp::NotEqual,
            TokenKind::Lt => RelOp::Less,
            TokenKind::Le => RelOp::LessEqual,
            TokenKind::Gt => RelOp::Greater,
            TokenKind::Ge => RelOp::GreaterEqual,
            TokenKind::Tilde => RelOp::Match,
            TokenKind::BangTilde => RelOp::NotMatch,
            TokenKind::In => RelOp::In,
            TokenKind::NotIn => RelOp::NotIn,
            ref other => {
                return Err(self.error_here(format!(
                    "expected a relational operator, found {}",
                    other
                )))
            }
        };
        self.advance();
        Ok(op)
    }

    // ---- expression level ------------------------------------------------

    fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_bit_or()
    }

    fn parse_bit_or(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_bit_xor()?;
        while self.eat(&TokenKind::BitOr) {
            let rhs = self.parse_bit_xor()?;
            lhs = binary(BinaryExprOp::BitOr, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_bit_xor(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_bit_and()?;
        while self.eat(&TokenKind::Caret) {
            let rhs = self.parse_bit_and()?;
            lhs = binary(BinaryExprOp::BitXor, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_bit_and(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_additive()?;
        while self.eat(&TokenKind::BitAnd) {
            let rhs = self.parse_additive()?;
            lhs = binary(BinaryExprOp::BitAnd, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_term()?;
        loop {
            if self.eat(&TokenKind::Plus) {
                let rhs = self.parse_term()?;
                lhs = binary(BinaryExprOp::Add, lhs, rhs);
            } else if self.eat(&TokenKind::Minus) {
                let rhs = self.parse_term()?;
                lhs = binary(BinaryExprOp::Sub, lhs, rhs);
            } else {
                break;
            }
        }
        Ok(lhs)
    }

    fn parse_term(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_factor()?;
        loop {
            if self.eat(&TokenKind::Star) {
                let rhs = self.parse_factor()?;
                lhs = binary(BinaryExprOp::Mul, lhs, rhs);
            } else if self.eat(&TokenKind::Slash) {
                let rhs = self.parse_factor()?;
                lhs = binary(BinaryExprOp::Div, lhs, rhs);
            } else if self.eat(&TokenKind::Percent) {
                let rhs = self.parse_factor()?;
                lhs = binary(BinaryExprOp::Mod, lhs, rhs);
            } else {
                break;
            }
        }
        Ok(lhs)
    }

    fn parse_factor(&mut self) -> Result<Expr> {
        if self.eat(&TokenKind::Plus) {
            return Ok(unary(UnaryExprOp::Plus, self.parse_factor()?));
        }
        if self.eat(&TokenKind::Minus) {
            return Ok(unary(UnaryExprOp::Minus, self.parse_factor()?));
        }
        if self.eat(&TokenKind::Tilde) {
            return Ok(unary(UnaryExprOp::BitNot, self.parse_factor()?));
        }
        if self.eat(&TokenKind::LParen) {
            let expr = self.parse_expr()?;
            if !self.eat(&TokenKind::RParen) {
                return Err(self.error_here("expected ) to close expression"));
            }
            return Ok(expr);
        }
        self.parse_literal()
    }

    fn parse_literal(&mut self) -> Result<Expr> {
        let token = self.advance();
        let value = match token.kind {
            TokenKind::True => Value::Bool(true),
            TokenKind::False => Value::Bool(false),
            TokenKind::UInt(v) => Value::UInt(v),
            TokenKind::Double(v) => Value::Double(v),
            TokenKind::Duration(ns) => Value::Duration(Duration::from_nanos(ns)),
            TokenKind::Time(ns) => Value::Time(Timestamp::from_nanos(ns)),
            TokenKind::Str(s) => Value::Str(s),
            TokenKind::Pattern(source) => Value::Pattern(Pattern::new(source).map_err(|e| {
                self.error_at(token.span, e.to_string())
            })?),
            TokenKind::Address(a) => Value::Address(a),
            TokenKind::Subnet(a, length) => {
                let subnet = Subnet::new(a, length)
                    .map_err(|e| self.error_at(token.span, e.to_string()))?;
                Value::Subnet(subnet)
            }
            TokenKind::Port(number, proto) => Value::Port(Port::new(number, proto)),
            other => {
                return Err(self.error_at(token.span, format!("expected a literal, found {}", other)))
            }
        };
        Ok(Expr::Literal(value))
    }
}

fn binary(op: BinaryExprOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

fn unary(op: UnaryExprOp, operand: Expr) -> Expr {
    Expr::Unary {
        op,
        operand: Box::new(operand),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vast_core::RelOp;

    #[test]
    fn test_event_clause() {
        let q = Parser::parse("conn.duration > 1s").unwrap();
        let Query::Clause(Clause::Event {
            event, path, op, ..
        }) = q
        else {
            panic!("expected event clause");
        };
        assert_eq!(event, "conn");
        assert_eq!(path, vec!["duration"]);
        assert_eq!(op, RelOp::Greater);
    }

    #[test]
    fn test_nested_field_path() {
        let q = Parser::parse("conn.id.resp_h in 192.168.0.0/16").unwrap();
        let Query::Clause(Clause::Event { path, op, .. }) = q else {
            panic!("expected event clause");
        };
        assert_eq!(path, vec!["id", "resp_h"]);
        assert_eq!(op, RelOp::In);
    }

    #[test]
    fn test_conjunction_binds_tighter_than_disjunction() {
        let q = Parser::parse("&id == 1 || &id == 2 && &id == 3").unwrap();
        let Query::Or(_, rhs) = q else {
            panic!("expected || at the root");
        };
        assert!(matches!(*rhs, Query::And(..)));
    }

    #[test]
    fn test_negation_and_grouping() {
        let q = Parser::parse("! (&id == 1 || &id == 2)").unwrap();
        let Query::Not(inner) = q else {
            panic!("expected negation at the root");
        };
        assert!(matches!(*inner, Query::Or(..)));
    }

    #[test]
    fn test_tag_clause_with_pattern() {
        let q = Parser::parse("&name ~ /http.*/").unwrap();
        let Query::Clause(Clause::Tag { tag, op, .. }) = q else {
            panic!("expected tag clause");
        };
        assert_eq!(tag, Tag::Name);
        assert_eq!(op, RelOp::Match);
    }

    #[test]
    fn test_type_clause() {
        let q = Parser::parse("@address in 10.0.0.0/8").unwrap();
        let Query::Clause(Clause::Type { kind, op, .. }) = q else {
            panic!("expected type clause");
        };
        assert_eq!(kind, ValueKind::Address);
        assert_eq!(op, RelOp::In);
    }

    #[test]
    fn test_arithmetic_rhs() {
        let q = Parser::parse("&id < 2 * (10 + 1)").unwrap();
        let Query::Clause(Clause::Tag { rhs, .. }) = q else {
            panic!("expected tag clause");
        };
        assert_eq!(crate::expr::fold(&rhs).unwrap(), Value::UInt(22));
    }

    #[test]
    fn test_parse_errors() {
        assert!(Parser::parse("").is_err());
        assert!(Parser::parse("conn.").is_err());
        assert!(Parser::parse("conn.duration >").is_err());
        assert!(Parser::parse("conn.duration 1s").is_err());
        assert!(Parser::parse("@bogus == 1").is_err());
        assert!(Parser::parse("conn.duration > 1s extra").is_err());
    }

    #[test]
    fn test_double_negation() {
        let q = Parser::parse("!!&id == 1").unwrap();
        assert!(matches!(q, Query::Not(_)));
    }
}
