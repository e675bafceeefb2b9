use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "census")]
#[command(about = "Reconcile observed resource snapshots into a document store")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Store endpoint: local path, :memory:, or a libsql:// URL
    #[arg(long, global = true, value_name = "URI")]
    pub uri: Option<String>,

    /// Logical database namespace collections live under
    #[arg(long, global = true, value_name = "NAME")]
    pub database: Option<String>,

    /// Credential for remote endpoints
    #[arg(long, global = true, value_name = "TOKEN")]
    pub auth_token: Option<String>,

    /// Connect timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Upper bound on concurrent store operations
    #[arg(long, global = true, value_name = "N")]
    pub max_pool_size: Option<u32>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reconcile a batch of resource snapshots from an envelope file
    Reconcile {
        /// Envelope JSON path, or '-' for stdin
        file: PathBuf,
    },
    /// Mark records missed by a pass as deleted
    Sweep {
        /// Envelope JSON path, or '-' for stdin
        file: PathBuf,
    },
    /// Create or advance a sync job record
    Job {
        /// Envelope JSON path, or '-' for stdin
        file: PathBuf,
    },
}
