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

//! VAST CLI
//!
//! Engine entry points: ingest event batches, run queries, and start or
//! stop a node. The state root comes from `--dir`, or the `VAST_DIR`
//! environment variable, or `./vast.db`.
//!
//! ## Usage
//!
//! ```bash
//! # Ingest newline-delimited JSON events from a file or stdin
//! vast ingest events.ndjson
//! cat events.ndjson | vast ingest -
//!
//! # Query; results print as JSON lines
//! vast query 'conn.duration > 1s && conn.id.resp_h in 192.168.0.0/16'
//!
//! # Run a node until `vast stop` is invoked from another shell
//! vast start
//! ```
//!
//! Exit codes: 0 success, 1 validation error, 2 runtime error,
//! 3 filesystem error.

use std::fs;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vast_core::{Event, SchemaRegistry, Timestamp, Value, VastError};
use vast_node::{Node, NodeConfig};

mod schemas;

/// VAST - network forensics and security event analytics
#[derive(Parser)]
#[command(name = "vast")]
#[command(about = "Network forensics and security event analytics")]
#[command(version)]
struct Cli {
    /// State root directory (overrides VAST_DIR)
    #[arg(short, long, global = true)]
    dir: Option<PathBuf>,

    /// Schema definition file (JSON); defaults to the built-in schemas
    #[arg(short, long, global = true)]
    schemas: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest newline-delimited JSON events from a file, or `-` for stdin
    Ingest {
        /// Event source path
        source: String,
    },
    /// Execute a query and print matching events as JSON lines
    Query {
        /// Query expression
        expression: String,
    },
    /// Run a node until `vast stop` is invoked
    Start,
    /// Stop a node started with `vast start`
    Stop,
}

/// One event on the ingest wire.
#[derive(Deserialize)]
struct RawEvent {
    name: String,
    /// Nanoseconds since the epoch.
    timestamp: i64,
    data: Value,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(exit_code(&e))
        }
    }
}

fn run(cli: Cli) -> Result<(), VastError> {
    let dir = state_dir(&cli);
    let registry = load_registry(cli.schemas.as_deref())?;
    match cli.command {
        Commands::Ingest { source } => ingest(&dir, registry, &source),
        Commands::Query { expression } => query(&dir, registry, &expression),
        Commands::Start => start(&dir, registry),
        Commands::Stop => stop(&dir),
    }
}

fn state_dir(cli: &Cli) -> PathBuf {
    cli.dir
        .clone()
        .or_else(|| std::env::var_os("VAST_DIR").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("vast.db"))
}

fn load_registry(path: Option<&Path>) -> Result<SchemaRegistry, VastError> {
    let Some(path) = path else {
        return Ok(schemas::default_registry());
    };
    let bytes = fs::read(path).map_err(|e| VastError::filesystem(e.to_string()))?;
    let schemas: Vec<vast_core::EventSchema> = serde_json::from_slice(&bytes)
        .map_err(|e| VastError::validation(format!("malformed schema file: {}", e)))?;
    let mut registry = SchemaRegistry::new();
    for schema in schemas {
        registry.register(schema);
    }
    Ok(registry)
}

fn ingest(dir: &Path, registry: SchemaRegistry, source: &str) -> Result<(), VastError> {
    let reader: Box<dyn Read> = if source == "-" {
        Box::new(std::io::stdin())
    } else {
        Box::new(fs::File::open(source).map_err(|e| VastError::filesystem(e.to_string()))?)
    };
    let node = Node::start(dir, registry, NodeConfig::default())?;
    let mut batch = Vec::new();
    let mut total = 0u64;
    for line in BufReader::new(reader).lines() {
        let line = line.map_err(|e| VastError::filesystem(e.to_string()))?;
        if line.trim().is_empty() {
            continue;
        }
        let raw: RawEvent = serde_json::from_str(&line)
            .map_err(|e| VastError::validation(format!("malformed event: {}", e)))?;
        if node.registry().get(&raw.name).is_none() {
            return Err(VastError::validation(format!(
                "unknown event type: {}",
                raw.name
            )));
        }
        batch.push(Event::new(
            raw.name,
            Timestamp::from_nanos(raw.timestamp),
            raw.data,
        ));
        if batch.len() == 1024 {
            total += batch.len() as u64;
            node.ingest(std::mem::take(&mut batch))?;
        }
    }
    if !batch.is_empty() {
        total += batch.len() as u64;
        node.ingest(batch)?;
    }
    node.flush()?;
    node.shutdown();
    info!(total, "ingestion finished");
    println!("ingested {} events", total);
    Ok(())
}

fn query(dir: &Path, registry: SchemaRegistry, expression: &str) -> Result<(), VastError> {
    let node = Node::start(dir, registry, NodeConfig::default())?;
    let events = node.query(expression)?;
    for event in &events {
        let line = serde_json::to_string(event)
            .map_err(|e| VastError::unspecified(e.to_string()))?;
        println!("{}", line);
    }
    node.shutdown();
    Ok(())
}

fn start(dir: &Path, registry: SchemaRegistry) -> Result<(), VastError> {
    let node = Node::start(dir, registry, NodeConfig::default())?;
    let marker = dir.join("stop");
    info!(dir = %dir.display(), "node running");
    println!("node running; invoke `vast stop` to shut down");
    while !marker.exists() {
        std::thread::sleep(Duration::from_millis(500));
    }
    let _ = fs::remove_file(&marker);
    node.shutdown();
    info!("node stopped");
    Ok(())
}

fn stop(dir: &Path) -> Result<(), VastError> {
    if !dir.exists() {
        return Err(VastError::unspecified(format!(
            "no node state at {}",
            dir.display()
        )));
    }
    fs::write(dir.join("stop"), b"")
        .map_err(|e| VastError::filesystem(e.to_string()))?;
    Ok(())
}

fn exit_code(e: &VastError) -> u8 {
    match e {
        VastError::Parse { .. } | VastError::Validation(_) => 1,
        VastError::Filesystem(_) | VastError::Io(_) => 3,
        VastError::Unspecified(_) => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(&VastError::parse("x", 1, 1)), 1);
        assert_eq!(exit_code(&VastError::validation("x")), 1);
        assert_eq!(exit_code(&VastError::filesystem("x")), 3);
        assert_eq!(exit_code(&VastError::unspecified("x")), 2);
    }

    #[test]
    fn test_state_dir_precedence() {
        let cli = Cli {
            dir: Some(PathBuf::from("/tmp/explicit")),
            schemas: None,
            verbose: false,
            command: Commands::Stop,
        };
        assert_eq!(state_dir(&cli), PathBuf::from("/tmp/explicit"));
    }

    #[test]
    fn test_raw_event_shape() {
        let raw: RawEvent = serde_json::from_str(
            r#"{"name":"dns","timestamp":12,"data":{"Record":[{"Str":"example.com"}]}}"#,
        )
        .unwrap();
        assert_eq!(raw.name, "dns");
        assert_eq!(raw.timestamp, 12);
    }
}
