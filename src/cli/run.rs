//! Run command implementation

use super::AppContext;
use crate::bot::{Bot, CommandHandler};
use crate::monitor::Monitor;
use clap::Args;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Run a single sweep, print its report and exit
    #[arg(long)]
    pub once: bool,

    /// Do not start the chat front end even if enabled in config
    #[arg(long)]
    pub no_frontend: bool,
}

impl RunArgs {
    pub async fn execute(&self, ctx: &AppContext) -> anyhow::Result<()> {
        let monitor = Monitor::new(
            ctx.config.monitor_config(),
            ctx.service.clone(),
            ctx.prices.clone(),
            ctx.notifier()?,
        );

        if self.once {
            let report = monitor.sweep().await?;
            report.log();
            for (id, delta) in &report.alerts {
                println!("{} {}%", id, crate::alert::format_percent(*delta));
            }
            println!(
                "checked={} alerts={} seeded={} unchanged={} not_found={} failures={}",
                report.checked,
                report.alert_count(),
                report.seeded,
                report.unchanged,
                report.not_found,
                report.failures()
            );
            return Ok(());
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let bot = if ctx.config.frontend.enabled && !self.no_frontend {
            let handler = CommandHandler::new(ctx.service.clone(), ctx.prices.clone());
            Some(Bot::new(
                ctx.telegram()?,
                handler,
                Duration::from_secs(ctx.config.frontend.poll_timeout_secs),
            ))
        } else {
            None
        };

        let monitor = Arc::new(monitor);
        let monitor_task = {
            let monitor = monitor.clone();
            let shutdown = shutdown_rx.clone();
            tokio::spawn(async move { monitor.run(shutdown).await })
        };

        let bot_task = bot.map(|bot| {
            let shutdown = shutdown_rx.clone();
            tokio::spawn(async move { bot.run(shutdown).await })
        });

        tokio::signal::ctrl_c().await?;
        tracing::info!("Shutdown requested, finishing current sweep");
        let _ = shutdown_tx.send(true);

        monitor_task.await?;
        if let Some(task) = bot_task {
            task.await?;
        }

        Ok(())
    }
}
