use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::*;

mod audit;
mod commands;
mod config;
mod formatting;
mod ledger_file;

use crate::config::CodConfig;

#[derive(Parser, Debug)]
#[command(version = "0.1.0", about = "Order status reconciliation and fraud scoring for cash-on-delivery shops")]
pub struct Arguments {
    /// The ledger file to use instead of COD_LEDGER_PATH
    #[arg(short = 'l', long = "ledger")]
    ledger: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Pull delivery statuses into the ledger
    #[command(subcommand)]
    Sync(SyncCommand),
    /// List orders that are still waiting on a delivery status
    Pending,
    #[command(subcommand)]
    Fraud(FraudCommand),
    /// Delivery performance across the ledger
    Stats,
    /// Print the effective configuration
    Config,
    #[command(subcommand)]
    Dropea(DropeaCommand),
}

#[derive(Debug, Subcommand)]
pub enum SyncCommand {
    /// Query the Dropea API
    Dropea,
    /// Read a worksheet export (a JSON array of `formatted_id`, `status` rows)
    Worksheet {
        /// Defaults to COD_WORKSHEET_PATH
        path: Option<PathBuf>,
    },
}

#[derive(Debug, Subcommand)]
pub enum FraudCommand {
    /// Score orders and write their risk labels
    Scan {
        /// Rescore orders that already have a label
        #[arg(short = 'a', long = "all")]
        all: bool,
        /// Add the long lookback same-IP bonus
        #[arg(long = "history")]
        history: bool,
    },
    /// Risk band counts across the ledger
    Stats,
    /// Rank the IPs behind suspicious orders
    Ips,
}

#[derive(Debug, Subcommand)]
pub enum DropeaCommand {
    /// Check that the API key is accepted
    Ping,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();
    let cli = Arguments::parse();
    let mut config = CodConfig::from_env_or_default();
    if let Some(ledger) = cli.ledger {
        config.ledger_path = ledger;
    }
    if let Err(e) = run(cli.command, &config).await {
        error!("{e:#}");
        eprintln!("❌️ {e:#}");
        std::process::exit(1);
    }
}

async fn run(command: Command, config: &CodConfig) -> anyhow::Result<()> {
    match command {
        Command::Sync(SyncCommand::Dropea) => commands::sync_dropea(config).await,
        Command::Sync(SyncCommand::Worksheet { path }) => commands::sync_worksheet(config, path.as_deref()).await,
        Command::Pending => commands::pending(config).await,
        Command::Fraud(FraudCommand::Scan { all, history }) => commands::fraud_scan(config, all, history).await,
        Command::Fraud(FraudCommand::Stats) => commands::fraud_stats(config),
        Command::Fraud(FraudCommand::Ips) => commands::fraud_ips(config),
        Command::Stats => commands::stats(config),
        Command::Config => {
            commands::show_config(config);
            Ok(())
        },
        Command::Dropea(DropeaCommand::Ping) => commands::dropea_ping(config).await,
    }
}
