// Copyright 2025 Loglens Contributors
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

//! Command line interface for the log parsing and semantic search pipeline.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use loglens_core::{parse_log_file, summarize};
use loglens_index::{
    FlatIndex, HashEmbeddingProvider, IndexConfig, IndexManager, LoadOutcome, DEFAULT_DIMENSION,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::Level;

/// How many entries the parse report previews.
const SAMPLE_ENTRIES: usize = 5;

#[derive(Parser, Debug)]
#[command(author, version, about = "Parse log files and search them by meaning", long_about = None)]
struct Cli {
    /// Directory holding the index artifact pair
    #[arg(long, env = "LOGLENS_DATA_DIR", default_value = "loglens_data")]
    data_dir: PathBuf,

    /// Embedding dimension of the hashing backend
    #[arg(long, default_value_t = DEFAULT_DIMENSION)]
    dimension: usize,

    /// Emit machine-readable JSON instead of text
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse a log file and print its summary
    Parse {
        /// Log file to parse
        file: PathBuf,
    },
    /// Parse a log file and build the persisted semantic index from it
    Index {
        /// Log file to index
        file: PathBuf,
    },
    /// Query the persisted index for semantically similar entries
    Search {
        /// Natural language query
        query: String,

        /// Number of results
        #[arg(short = 'k', long, default_value_t = 10)]
        top_k: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt().with_max_level(level).init();

    match &cli.command {
        Commands::Parse { file } => run_parse(file, cli.json),
        Commands::Index { file } => run_index(file, &cli),
        Commands::Search { query, top_k } => run_search(query, *top_k, &cli),
    }
}

fn open_manager(cli: &Cli) -> Result<IndexManager<HashEmbeddingProvider, FlatIndex>> {
    IndexManager::new(
        Arc::new(HashEmbeddingProvider::with_dimension(cli.dimension)),
        IndexConfig::new(cli.data_dir.clone()),
    )
    .with_context(|| format!("failed to prepare data directory {:?}", cli.data_dir))
}

fn run_parse(file: &Path, json: bool) -> Result<()> {
    let entries = parse_log_file(file);
    let summary = summarize(&entries);
    let file_size = std::fs::metadata(file).map(|m| m.len()).unwrap_or(0);
    let sample = &entries[..entries.len().min(SAMPLE_ENTRIES)];

    if json {
        let report = serde_json::json!({
            "filename": file,
            "file_size": file_size,
            "parsed_entries": entries.len(),
            "summary": summary,
            "sample_entries": sample,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    // "0 entries" is a normal outcome, not a failure.
    println!("✓ Parsed {} entries from {file:?} ({file_size} bytes)", entries.len());
    println!("  Timestamps detected: {}", summary.has_timestamps);
    for (level, count) in &summary.levels {
        println!("  {level}: {count}");
    }
    if !sample.is_empty() {
        println!("  Sample:");
        for entry in sample {
            println!("    #{} {}", entry.line_number, entry.raw_text);
        }
    }
    Ok(())
}

fn run_index(file: &Path, cli: &Cli) -> Result<()> {
    let entries = parse_log_file(file);
    let parsed = entries.len();

    let mut manager = open_manager(cli)?;
    let indexed = manager
        .build(entries)
        .context("failed to build the semantic index")?;
    manager.save().context("failed to save index artifacts")?;

    if cli.json {
        let report = serde_json::json!({
            "filename": file,
            "parsed_entries": parsed,
            "indexed_entries": indexed,
            "data_dir": cli.data_dir,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("✓ Indexed {indexed} entries from {file:?} into {:?}", cli.data_dir);
    }
    Ok(())
}

fn run_search(query: &str, top_k: usize, cli: &Cli) -> Result<()> {
    let mut manager = open_manager(cli)?;

    match manager.load() {
        LoadOutcome::Loaded => {}
        LoadOutcome::NotFound => {
            println!("No index found in {:?} — run `loglens index <file>` first.", cli.data_dir);
            return Ok(());
        }
        LoadOutcome::Failed => {
            println!("Index artifacts in {:?} could not be read; no results.", cli.data_dir);
            return Ok(());
        }
    }

    let hits = manager.search(query, top_k).context("search failed")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
        return Ok(());
    }

    if hits.is_empty() {
        println!("No results.");
        return Ok(());
    }
    println!("✓ {} results for {query:?}", hits.len());
    for hit in &hits {
        println!(
            "{:>3}. (distance {:.4}) #{} {}",
            hit.rank, hit.distance, hit.entry.line_number, hit.entry.raw_text
        );
    }
    Ok(())
}
