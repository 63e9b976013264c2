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

//! Built-in event schemas
//!
//! The default registry covers the connection and application-layer
//! events the bundled network parsers emit. A custom schema file passed
//! via `--schemas` replaces all of these.

use vast_core::{EventSchema, FieldSpec, SchemaRegistry, TypeSpec};

pub fn default_registry() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();
    registry.register(
        EventSchema::new("conn")
            .field("duration", TypeSpec::Duration)
            .field(
                "id",
                TypeSpec::Record(vec![
                    FieldSpec::new("orig_h", TypeSpec::Address),
                    FieldSpec::new("orig_p", TypeSpec::Port),
                    FieldSpec::new("resp_h", TypeSpec::Address),
                    FieldSpec::new("resp_p", TypeSpec::Port),
                ]),
            )
            .field("proto", TypeSpec::String)
            .field("orig_bytes", TypeSpec::UInt)
            .field("resp_bytes", TypeSpec::UInt),
    );
    registry.register(
        EventSchema::new("dns")
            .field("query", TypeSpec::String)
            .field("qtype", TypeSpec::UInt)
            .field("answers", TypeSpec::Vector(Box::new(TypeSpec::Address))),
    );
    registry.register(
        EventSchema::new("http_req")
            .field("method", TypeSpec::String)
            .field("uri", TypeSpec::String)
            .field("host", TypeSpec::String),
    );
    registry.register(
        EventSchema::new("http_resp")
            .field("code", TypeSpec::UInt)
            .field("mime_type", TypeSpec::String)
            .field("body_len", TypeSpec::UInt),
    );
    registry
}
