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

//! Error types for VAST

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VastError {
    #[error("parse error at line {line}, column {column}: {message}")]
    Parse {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("unspecified error: {0}")]
    Unspecified(String),
}

impl VastError {
    pub fn parse(message: impl Into<String>, line: usize, column: usize) -> Self {
        VastError::Parse {
            message: message.into(),
            line,
            column,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        VastError::Validation(message.into())
    }

    pub fn filesystem(message: impl Into<String>) -> Self {
        VastError::Filesystem(message.into())
    }

    pub fn unspecified(message: impl Into<String>) -> Self {
        VastError::Unspecified(message.into())
    }
}

pub type Result<T> = std::result::Result<T, VastError>;
