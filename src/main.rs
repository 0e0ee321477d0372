mod config;
mod loader;
mod models;
mod pipeline;
mod scraper;
mod storage;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::AppConfig;
use crate::pipeline::Pipeline;

#[derive(Parser)]
#[command(
    name = "storefront-catalog",
    about = "Scrape storefront categories into a point-of-sale catalog CSV",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Merge the supplementary file, scrape every category and write the catalog
    Run,

    /// List the configured category URLs
    Categories,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "storefront_catalog=info,warn",
        1 => "storefront_catalog=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::new(filter))
        .init();

    let config = AppConfig::load()?;

    match cli.command {
        Command::Run => {
            let _t = utils::Timer::start("Catalog run");
            let stats = Pipeline::new(config).run().await?;
            info!(
                "Scraped {} items across all categories and saved to {:?}.",
                stats.supplementary_items + stats.scraped_items,
                stats.output_path
            );
        }

        Command::Categories => {
            println!("{} categories:", config.scraper.categories.len());
            for url in &config.scraper.categories {
                println!("  {}", url);
            }
            if let Some(path) = &config.catalog.supplementary_path {
                println!("Supplementary file: {:?}", path);
            }
            println!("Output: {:?}", config.catalog.output_path);
        }
    }

    Ok(())
}
