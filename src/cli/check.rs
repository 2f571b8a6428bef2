//! Check command implementation

use super::AppContext;
use crate::alert::format_snapshot;
use crate::price::PriceSource;
use crate::watch::AssetId;
use clap::Args;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Token id to look up
    pub token: AssetId,
}

impl CheckArgs {
    pub async fn execute(&self, ctx: &AppContext) -> anyhow::Result<()> {
        let snapshot = ctx.prices.fetch(&self.token).await?;
        println!("{}", format_snapshot(&snapshot));
        Ok(())
    }
}
