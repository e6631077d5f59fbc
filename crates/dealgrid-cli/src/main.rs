use std::sync::Arc;

use clap::{Parser, Subcommand};

use dealgrid_ingest::{sweep_expired, Orchestrator, PgDealStore};
use dealgrid_scraper::{default_scrapers, PageClient};

#[derive(Debug, Parser)]
#[command(name = "dealgrid")]
#[command(about = "Dealgrid ingestion command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the scrape-and-reconcile pipeline once.
    Scrape {
        /// Only run the named source (e.g. "AppSumo").
        #[arg(long)]
        source: Option<String>,
    },
    /// Retire active deals whose expiry has passed.
    Expire,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Scrape { source } => scrape(source).await,
        Commands::Expire => expire().await,
    }
}

async fn connect() -> anyhow::Result<(Arc<dealgrid_core::AppConfig>, sqlx::PgPool)> {
    let config = Arc::new(dealgrid_core::load_app_config()?);
    let pool_config = dealgrid_db::PoolConfig::from_app_config(&config);
    let pool = dealgrid_db::connect_pool(&config.database_url, pool_config).await?;
    Ok((config, pool))
}

async fn scrape(source: Option<String>) -> anyhow::Result<()> {
    let (config, pool) = connect().await?;

    let mut scrapers = default_scrapers(&config);
    if let Some(name) = source {
        scrapers.retain(|s| s.name().eq_ignore_ascii_case(&name));
        if scrapers.is_empty() {
            anyhow::bail!("unknown source '{name}'");
        }
    }

    let client = PageClient::from_config(&config)?;
    let orchestrator = Orchestrator::new(
        scrapers,
        Arc::new(client),
        Arc::new(PgDealStore::new(pool)),
        config.scraper_max_concurrent_sources,
    );

    let summary = orchestrator.run().await;

    println!(
        "scraped {} deals in {}ms: {} inserted, {} updated, {} skipped",
        summary.total_deals,
        summary.duration_ms,
        summary.upsert.inserted,
        summary.upsert.updated,
        summary.upsert.skipped,
    );
    for report in &summary.scrapers {
        println!("  {}: {} deals", report.name, report.deal_count);
        for error in &report.errors {
            println!("    error: {error}");
        }
    }
    for error in &summary.upsert.errors {
        println!("  reconcile error: {error}");
    }

    if summary.success {
        Ok(())
    } else {
        anyhow::bail!("scrape run finished with errors")
    }
}

async fn expire() -> anyhow::Result<()> {
    let (_config, pool) = connect().await?;

    let store = PgDealStore::new(pool);
    let outcome = sweep_expired(&store).await;

    match outcome.error {
        None => {
            println!("expired {} deals", outcome.expired);
            Ok(())
        }
        Some(error) => anyhow::bail!("expiry sweep failed: {error}"),
    }
}
