//! skiptable Shell Binary
//!
//! Drives a single in-memory table from a script or stdin, one command per line:
//!
//! ```text
//! put <key> <value>    insert a value, prints the sequence number
//! del <key>            write a tombstone, prints the sequence number
//! get <key>            print the latest value or (nil)
//! has <key>            print true / false
//! stats                print table counters
//! ping                 print PONG
//! ```

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use clap::Parser;
use skiptable::{Config, MemTable};
use tracing_subscriber::{fmt, EnvFilter};

/// skiptable Shell
#[derive(Parser, Debug)]
#[command(name = "skiptable-shell")]
#[command(about = "Interactive driver for an arena-backed memtable")]
#[command(version)]
struct Args {
    /// Sequence number of the first mutation
    #[arg(short, long, default_value = "1")]
    first_entry_id: u64,

    /// Arena block size in bytes
    #[arg(short, long, default_value = "4096")]
    block_size: usize,

    /// Maximum key size in bytes
    #[arg(short = 'k', long, default_value = "65536")]
    max_key_size: usize,

    /// Read commands from this file instead of stdin
    #[arg(short, long)]
    script: Option<PathBuf>,
}

/// A parsed shell command
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Get { key: String },
    Has { key: String },
    Put { key: String, value: String },
    Delete { key: String },
    Stats,
    Ping,
}

impl Command {
    fn parse(line: &str) -> Result<Self, String> {
        let mut parts = line.splitn(3, char::is_whitespace);
        let verb = parts.next().unwrap_or_default().to_ascii_lowercase();
        let key = parts.next().map(str::to_string);
        let rest = parts.next().map(|v| v.trim_start().to_string());

        match (verb.as_str(), key, rest) {
            ("get", Some(key), None) => Ok(Command::Get { key }),
            ("has", Some(key), None) => Ok(Command::Has { key }),
            ("put" | "set", Some(key), Some(value)) => Ok(Command::Put { key, value }),
            ("del" | "delete", Some(key), None) => Ok(Command::Delete { key }),
            ("stats", None, None) => Ok(Command::Stats),
            ("ping", None, None) => Ok(Command::Ping),
            _ => Err(format!("cannot parse command: {}", line)),
        }
    }
}

fn execute(table: &MemTable, command: Command) -> String {
    let outcome = match command {
        Command::Get { key } => table.get(key.as_bytes()).map(|value| match value {
            Some(value) => String::from_utf8_lossy(&value).into_owned(),
            None => "(nil)".to_string(),
        }),
        Command::Has { key } => table.contains_key(key.as_bytes()).map(|found| found.to_string()),
        Command::Put { key, value } => table
            .insert(key.as_bytes(), value.as_bytes())
            .map(|seq| format!("OK {}", seq)),
        Command::Delete { key } => table.delete(key.as_bytes()).map(|seq| format!("OK {}", seq)),
        Command::Stats => Ok(format!("{:?}", table.stats())),
        Command::Ping => Ok("PONG".to_string()),
    };

    outcome.unwrap_or_else(|e| format!("ERR {}", e))
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,skiptable=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    tracing::info!("skiptable shell v{}", skiptable::VERSION);

    let config = Config::builder()
        .arena_block_size(args.block_size)
        .max_key_size(args.max_key_size)
        .build();

    let table = match MemTable::with_config(config, args.first_entry_id) {
        Ok(table) => table,
        Err(e) => {
            tracing::error!("Failed to create memtable: {}", e);
            std::process::exit(1);
        }
    };

    let input: Box<dyn BufRead> = match &args.script {
        Some(path) => match File::open(path) {
            Ok(file) => Box::new(BufReader::new(file)),
            Err(e) => {
                tracing::error!("Failed to open script {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => Box::new(BufReader::new(io::stdin())),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();

    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::error!("Failed to read input: {}", e);
                std::process::exit(1);
            }
        };

        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let reply = match Command::parse(line) {
            Ok(command) => {
                tracing::trace!(?command, "executing");
                execute(&table, command)
            }
            Err(e) => format!("ERR {}", e),
        };

        if writeln!(out, "{}", reply).is_err() {
            break;
        }
    }

    tracing::info!(entries = table.len(), "shell finished");
}
