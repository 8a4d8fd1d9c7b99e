use std::sync::Arc;

use anyhow::Context;
use nutrition_tracker::config::{AppConfig, log_filter_with};
use nutrition_tracker::{CommandServer, FoodProvider, LocalCatalog, SystemClock};
use tokio::io::BufReader;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // `NUTRITION_LOG_LEVEL`, then `RUST_LOG`, default `info`; logs go to stderr.
    let (level, directives) = log_filter_with(|k| std::env::var(k).ok());
    let env_filter = tracing_subscriber::EnvFilter::try_new(&directives)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,sqlx=warn,reqwest=warn"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
    tracing::info!("nutrition-tracker: log filter: {}", level);

    let config = AppConfig::from_env().context("reading configuration")?;
    let store = config.open_store().await.context("opening state store")?;
    let catalog = LocalCatalog::open(config.foods_file())
        .await
        .context("loading local food catalogue")?;
    let client = config.fdc.build_client().context("building FDC client")?;
    let foods = FoodProvider::new(Arc::new(client), catalog).with_page_size(config.fdc.page_size);

    let (handle, server) = CommandServer::spawn(store, Arc::new(foods), Arc::new(SystemClock));

    let input = BufReader::new(tokio::io::stdin());
    nutrition_tracker::frontend::run(&handle, input, tokio::io::stdout()).await?;

    drop(handle);
    server.await.context("command server task failed")?;
    Ok(())
}
