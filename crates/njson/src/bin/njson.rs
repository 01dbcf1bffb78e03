//! `njson`: query and edit JSON documents with path expressions.
//!
//! Usage:
//!   njson get    '<path>'           < doc.json
//!   njson set    '<path>' '<value>' < doc.json
//!   njson delete '<path>'           < doc.json
//!
//! The document is read from stdin unless `--file` is given. Log output goes
//! to stderr; the filter comes from `NJSON_LOG` or `RUST_LOG`.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use njson::json_cli::{Engine, EngineConfig};
use njson::path::RegexMatch;

#[derive(Parser)]
#[command(name = "njson", about = "Query and edit JSON documents with path expressions")]
struct Cli {
    /// Read the document from this file instead of stdin
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    /// How `=~` filters match their pattern
    #[arg(long, value_enum, default_value_t = MatchMode::Search, global = true)]
    regex_match: MatchMode,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the value(s) at a path
    Get {
        path: String,
        /// Print only the value instead of the full response record
        #[arg(long)]
        raw: bool,
        #[arg(long)]
        pretty: bool,
    },
    /// Store a JSON value at a path and print the new document
    Set {
        path: String,
        /// The value, as JSON text
        value: String,
        #[arg(long)]
        pretty: bool,
    },
    /// Remove the value at a path and print the new document
    Delete {
        path: String,
        #[arg(long)]
        pretty: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum MatchMode {
    Search,
    Full,
}

impl From<MatchMode> for RegexMatch {
    fn from(mode: MatchMode) -> Self {
        match mode {
            MatchMode::Search => RegexMatch::Search,
            MatchMode::Full => RegexMatch::Full,
        }
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_env("NJSON_LOG")
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn read_document(file: Option<&PathBuf>) -> Result<String> {
    match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("cannot read '{}'", path.display())),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("cannot read document from stdin")?;
            Ok(buf)
        }
    }
}

fn render(value: &Value, pretty: bool) -> Result<String> {
    Ok(if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let engine = Engine::new(EngineConfig {
        regex_match: cli.regex_match.into(),
        ..EngineConfig::default()
    });
    let document = read_document(cli.file.as_ref())?;

    let output = match cli.command {
        Commands::Get { path, raw, pretty } => {
            let resp = engine.get(&document, &path);
            if !resp.is_ok() {
                anyhow::bail!(resp.error);
            }
            if raw {
                render(resp.value.as_ref().unwrap_or(&Value::Null), pretty)?
            } else {
                render(&serde_json::to_value(&resp)?, pretty)?
            }
        }
        Commands::Set { path, value, pretty } => {
            let doc = engine.try_set(&document, &path, &value)?;
            reformat(doc, pretty)?
        }
        Commands::Delete { path, pretty } => {
            let doc = engine.try_delete(&document, &path)?;
            reformat(doc, pretty)?
        }
    };

    let mut stdout = io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    stdout.write_all(b"\n")?;
    Ok(())
}

/// Compact text from the engine, pretty-printed on request.
fn reformat(doc: String, pretty: bool) -> Result<String> {
    if !pretty {
        return Ok(doc);
    }
    let value: Value = serde_json::from_str(&doc)?;
    render(&value, true)
}
