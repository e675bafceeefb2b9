//! Census CLI - drives sync passes against the document store
//!
//! Thin glue around census-core: parse an envelope, run one operation,
//! print the reply. Business logic lives in the library.

mod cli;
mod error;

use std::io::Read;
use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use census_core::db::Store;
use census_core::{JobRequest, ReconcileRequest, Reply, StoreConfig, SweepRequest, SyncService};
use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("census_core=info".parse().unwrap()),
        )
        .init();

    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("Error: {error}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, CliError> {
    let config = store_config(&cli);
    let store = Store::connect(&config).await?;
    let service = SyncService::new(store);

    match cli.command {
        Commands::Reconcile { file } => {
            let request: ReconcileRequest = read_envelope(&file)?;
            print_reply(&service.reconcile(&request).await)
        }
        Commands::Sweep { file } => {
            let request: SweepRequest = read_envelope(&file)?;
            print_reply(&service.sweep(&request).await)
        }
        Commands::Job { file } => {
            let request: JobRequest = read_envelope(&file)?;
            let index = service.upsert_job(&request).await?;
            println!("{index}");
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn store_config(cli: &Cli) -> StoreConfig {
    let mut config = StoreConfig::default();
    if let Some(uri) = &cli.uri {
        config.connect_uri = uri.clone();
    }
    if let Some(database) = &cli.database {
        config.database = database.clone();
    }
    if let Some(token) = &cli.auth_token {
        config.auth_token = Some(token.clone());
    }
    if let Some(secs) = cli.timeout {
        config.timeout = Duration::from_secs(secs);
    }
    if let Some(size) = cli.max_pool_size {
        config.max_pool_size = size;
    }
    config
}

fn read_envelope<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let payload = if path == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        std::fs::read_to_string(path)?
    };
    Ok(serde_json::from_str(&payload)?)
}

fn print_reply(reply: &Reply) -> Result<ExitCode, CliError> {
    println!("{}", serde_json::to_string_pretty(reply)?);
    Ok(if reply.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
