//! Watch-set management commands

use super::AppContext;
use crate::alert::format_subscribed;
use crate::watch::{AssetId, Subscriber};
use clap::Args;

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Token id as known to the price source (e.g. "shiba-inu")
    pub token: AssetId,

    /// Subscriber handle that receives alerts (Telegram chat id)
    #[arg(long)]
    pub chat: String,
}

impl WatchArgs {
    pub async fn execute(&self, ctx: &AppContext) -> anyhow::Result<()> {
        let snapshot = ctx
            .service
            .subscribe(&self.token, Subscriber::new(self.chat.clone()))
            .await?;

        println!("{}", format_subscribed(&snapshot));
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct UnwatchArgs {
    /// Token id to stop watching
    pub token: AssetId,
}

impl UnwatchArgs {
    pub async fn execute(&self, ctx: &AppContext) -> anyhow::Result<()> {
        if ctx.service.unsubscribe(&self.token).await? {
            println!("Stopped watching {}", self.token);
        } else {
            println!("{} was not being watched", self.token);
        }
        Ok(())
    }
}
