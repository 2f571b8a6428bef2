//! CLI interface for pricewatch
//!
//! Provides subcommands for:
//! - `run`: Start the monitor loop (and the chat front end when enabled)
//! - `watch` / `unwatch`: Manage the watch set
//! - `list`: Show watched tokens and their baselines
//! - `check`: Show current market data for a token
//! - `config`: Show effective configuration

mod check;
mod context;
mod run;
mod watch;

pub use check::CheckArgs;
pub use context::AppContext;
pub use run::RunArgs;
pub use watch::{UnwatchArgs, WatchArgs};

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "pricewatch")]
#[command(about = "Watches token prices and alerts subscribers on threshold moves")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start monitoring
    Run(RunArgs),
    /// Start watching a token for a subscriber
    Watch(WatchArgs),
    /// Stop watching a token
    Unwatch(UnwatchArgs),
    /// List watched tokens
    List,
    /// Show current market data for a token
    Check(CheckArgs),
    /// Show configuration
    Config,
}

/// Print every watch entry with its baseline
pub async fn list(ctx: &AppContext) -> anyhow::Result<()> {
    let watched = ctx.service.list().await?;
    if watched.is_empty() {
        println!("No tokens are being watched");
        return Ok(());
    }

    println!("{:<24} {:<16} {}", "TOKEN", "SUBSCRIBER", "BASELINE");
    for entry in watched {
        let baseline = entry
            .baseline
            .map(crate::alert::format_price)
            .unwrap_or_else(|| "-".to_string());
        println!("{:<24} {:<16} {}", entry.id, entry.subscriber, baseline);
    }
    Ok(())
}
