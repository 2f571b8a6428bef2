use clap::Parser;
use pricewatch::cli::{self, AppContext, Cli, Commands};
use pricewatch::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration; only a missing file falls back to the example
    let config = match Config::load_if_present(&cli.config)? {
        Some(config) => config,
        None => {
            eprintln!("Warning: {} not found, using default configuration", cli.config);
            Config::example()?
        }
    };

    // Initialize telemetry
    let _telemetry = pricewatch::telemetry::init_telemetry(&config.telemetry)?;

    if let Commands::Config = cli.command {
        println!("Current configuration:");
        println!(
            "  Monitor: every {}s, threshold {}%, {} concurrent fetches",
            config.monitor.interval_secs,
            config.monitor.threshold_pct,
            config.monitor.max_concurrent_fetches
        );
        println!(
            "  Provider: {} ({}), timeout {}s",
            config.provider.base_url, config.provider.vs_currency, config.provider.timeout_secs
        );
        println!(
            "  Store: {} / {}",
            config.store.watchlist_path.display(),
            config.store.baselines_path.display()
        );
        println!(
            "  Notifier: {:?} (token {})",
            config.notifier.kind,
            if config.notifier.bot_token.is_some() { "set" } else { "missing" }
        );
        println!("  Front end: {}", if config.frontend.enabled { "on" } else { "off" });
        return Ok(());
    }

    // Stores are validated here, before any polling starts
    let ctx = AppContext::open(config).await?;

    match cli.command {
        Commands::Run(args) => {
            tracing::info!("Starting price monitor");
            args.execute(&ctx).await?;
        }
        Commands::Watch(args) => args.execute(&ctx).await?,
        Commands::Unwatch(args) => args.execute(&ctx).await?,
        Commands::List => cli::list(&ctx).await?,
        Commands::Check(args) => args.execute(&ctx).await?,
        Commands::Config => {}
    }

    Ok(())
}
