//! DiskDB CLI
//!
//! Command-line interface for a local DiskDB store.

use std::process;

use clap::{Parser, Subcommand};
use diskdb::config::{Config, RecoveryMode, SyncStrategy};
use diskdb::Store;
use tracing_subscriber::{fmt, EnvFilter};

/// DiskDB CLI
#[derive(Parser, Debug)]
#[command(name = "diskdb-cli")]
#[command(about = "CLI for the DiskDB append-only key-value store")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./diskdb_data")]
    data_dir: String,

    /// fsync the log after every write
    #[arg(long)]
    sync: bool,

    /// Drop an incomplete trailing record instead of refusing to open
    #[arg(long)]
    truncate_tail: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Put {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },

    /// Show store statistics
    Stats,
}

fn main() {
    // Logs go to stderr so stdout carries only command output
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,diskdb=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> diskdb::Result<()> {
    let config = Config::builder()
        .data_dir(&args.data_dir)
        .sync_strategy(if args.sync {
            SyncStrategy::EveryWrite
        } else {
            SyncStrategy::Never
        })
        .recovery_mode(if args.truncate_tail {
            RecoveryMode::TruncateTail
        } else {
            RecoveryMode::Strict
        })
        .build();

    let store = Store::open_with_config(config)?;

    match args.command {
        Commands::Get { key } => match store.get(key.as_bytes())? {
            Some(value) => println!("{}", String::from_utf8_lossy(&value)),
            None => println!("(nil)"),
        },
        Commands::Put { key, value } => {
            store.put(key.as_bytes(), value.as_bytes())?;
            println!("OK");
        }
        Commands::Del { key } => {
            store.delete(key.as_bytes())?;
            println!("OK");
        }
        Commands::Stats => {
            let recovery = store.recovery_result();
            println!("log file:        {}", store.log_path().display());
            println!("log size:        {} bytes", store.log_size());
            println!("live keys:       {}", store.len());
            println!("records:         {}", recovery.records_replayed);
            println!("  puts:          {}", recovery.puts);
            println!("  deletes:       {}", recovery.deletes);
            println!("truncated bytes: {}", recovery.truncated_bytes);
        }
    }

    store.close()
}
