//! cmdlog CLI
//!
//! Runs one operation against a store and prints the payload.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use cmdlog::config::{EnvelopeMode, StoreSyncStrategy};
use cmdlog::protocol::{Batch, OperationKind, Status};
use cmdlog::{Config, Engine};
use tracing_subscriber::{fmt, EnvFilter};

/// cmdlog CLI
#[derive(Parser, Debug)]
#[command(name = "cmdlog")]
#[command(about = "Append-only command log with offset-based sync")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./cmdlog_data")]
    data_dir: String,

    /// Use a throwaway in-memory store instead of the data directory
    #[arg(long)]
    in_memory: bool,

    /// Reject batches not wrapped in the full envelope
    #[arg(long)]
    strict_envelope: bool,

    /// fsync the store every N puts (0 = every put)
    #[arg(long, default_value = "100")]
    fsync_every: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a state-changing function (init, write, append, sync)
    Invoke {
        function: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Run a read-only function (read)
    Query {
        function: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Append commands to a log and print everything since a position
    Sync {
        /// Key holding the log's cursor
        #[arg(long)]
        count_key: String,

        /// Prefix of the log's entry keys
        #[arg(long)]
        prefix: String,

        /// Last known read position
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        position: String,

        /// Commands to append
        commands: Vec<String>,
    },
}

fn main() -> ExitCode {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,cmdlog=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .store_sync_strategy(match args.fsync_every {
            0 => StoreSyncStrategy::EveryWrite,
            count => StoreSyncStrategy::EveryNEntries { count },
        })
        .envelope_mode(if args.strict_envelope {
            EnvelopeMode::Strict
        } else {
            EnvelopeMode::Lenient
        })
        .build();

    let (kind, function, op_args) = match args.command {
        Commands::Invoke { function, args } => (OperationKind::Invoke, function, args),
        Commands::Query { function, args } => (OperationKind::Query, function, args),
        Commands::Sync {
            count_key,
            prefix,
            position,
            commands,
        } => {
            let batch = Batch::new(commands).encode();
            (
                OperationKind::Invoke,
                "sync".to_string(),
                vec![count_key, prefix, position, batch],
            )
        }
    };

    let response = if args.in_memory {
        Engine::in_memory(config).handle(kind, &function, &op_args)
    } else {
        tracing::debug!("Data directory: {}", args.data_dir);
        let engine = match Engine::open(config) {
            Ok(engine) => engine,
            Err(e) => {
                tracing::error!("Failed to open store: {}", e);
                return ExitCode::FAILURE;
            }
        };
        let response = engine.handle(kind, &function, &op_args);
        if let Err(e) = engine.close() {
            tracing::error!("Failed to sync store: {}", e);
            return ExitCode::FAILURE;
        }
        response
    };

    match response.status {
        Status::Ok => {
            if let Some(payload) = response.payload_str() {
                println!("{}", payload);
            }
            ExitCode::SUCCESS
        }
        Status::NotFound | Status::Error => {
            eprintln!("{}", response.payload_str().unwrap_or_default());
            ExitCode::FAILURE
        }
    }
}
