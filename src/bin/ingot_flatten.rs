//! ingot-flatten: Flatten a nested JSON document into a typed table
//!
//! Usage:
//!   # Print the resolved schema
//!   ingot-flatten response.json
//!
//!   # Read from stdin, emit typed rows as JSON Lines
//!   curl -s https://api.example.com/users | ingot-flatten --emit rows
//!
//!   # Records live under a wrapper other than `data`
//!   ingot-flatten --record-path results.items page.json

// Use MiMalloc allocator for better performance (recommended by simd-json)
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use ingot::{ingest, FlattenConfig, IngestConfig, ResolveConfig, TypedTable};
use serde_json::Value;
use std::fs::File;
use std::io::{stdin, BufReader, BufWriter, Read, Write};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Emit {
    /// Column names, resolved types, and null counts
    Schema,
    /// One JSON object per typed row
    Rows,
}

#[derive(Parser, Debug)]
#[command(name = "ingot-flatten", version)]
#[command(about = "Flatten nested JSON into a typed table", long_about = None)]
struct Args {
    /// Input file (use stdin if omitted)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// What to write to stdout
    #[arg(long, value_enum, default_value_t = Emit::Schema)]
    emit: Emit,

    /// Separator for flattened column names
    #[arg(long, env = "INGOT_SEPARATOR", default_value = ".")]
    separator: String,

    /// Path to the records, skipping shape detection (dotted or JSON Pointer)
    #[arg(long, env = "INGOT_RECORD_PATH")]
    record_path: Option<String>,

    /// Flatten and resolve on a single thread
    #[arg(long)]
    sequential: bool,

    /// Compact schema output (no pretty-printing)
    #[arg(long)]
    compact: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = IngestConfig {
        flatten: FlattenConfig {
            separator: args.separator.clone(),
            parallel: !args.sequential,
            ..FlattenConfig::default()
        },
        resolve: ResolveConfig {
            parallel: !args.sequential,
            ..ResolveConfig::default()
        },
        record_path: args.record_path.clone(),
    };

    let reader: Box<dyn Read> = if let Some(path) = &args.input {
        let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        Box::new(BufReader::new(file))
    } else {
        Box::new(BufReader::new(stdin()))
    };

    let root = read_document(reader)?;
    let table = ingest(root, &config)?;

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    match args.emit {
        Emit::Schema => write_schema(&mut out, &table, args.compact)?,
        Emit::Rows => write_rows(&mut out, &table)?,
    }
    out.flush().context("Failed to flush output")?;

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Parse one document, SIMD-accelerated when possible
fn read_document(mut reader: Box<dyn Read>) -> Result<Value> {
    let mut content = Vec::new();
    reader
        .read_to_end(&mut content)
        .context("Failed to read input")?;

    // simd-json parses in place, so keep the original bytes for the fallback
    let mut scratch = content.clone();
    match simd_json::serde::from_slice::<Value>(&mut scratch) {
        Ok(value) => Ok(value),
        Err(err) => {
            debug!(error = %err, "simd-json rejected input, retrying with serde_json");
            serde_json::from_slice(&content).context("Failed to parse JSON")
        }
    }
}

fn write_schema<W: Write>(out: &mut W, table: &TypedTable, compact: bool) -> Result<()> {
    let schema = table.schema();
    let json = if compact {
        serde_json::to_string(&schema)?
    } else {
        serde_json::to_string_pretty(&schema)?
    };
    writeln!(out, "{}", json).context("Failed to write schema")?;
    Ok(())
}

fn write_rows<W: Write>(out: &mut W, table: &TypedTable) -> Result<()> {
    for row in table.rows() {
        let line = serde_json::to_string(&row).context("Failed to serialize row")?;
        writeln!(out, "{}", line).context("Failed to write row")?;
    }
    Ok(())
}
