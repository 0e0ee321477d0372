//! Pipeline orchestrator: supplementary file → storefront categories → catalog CSV.
//!
//! One run, strictly in order:
//!   1. Load the supplementary item list (if configured). Its titles claim their
//!      hashes first, so a scraped product with the same title is dropped.
//!   2. Scrape every configured category URL in order, sharing the same seen set.
//!   3. Write every collected item to the output CSV in one go.

use crate::config::AppConfig;
use crate::loader::load_supplementary;
use crate::models::{CatalogItem, SeenTitles};
use crate::scraper::http_client::HttpClient;
use crate::scraper::parsers::Selectors;
use crate::scraper::{CategoryScraper, PageFetcher};
use crate::storage::write_catalog;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{debug, error, info};

pub struct Pipeline {
    config: AppConfig,
}

impl Pipeline {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub async fn run(&self) -> Result<PipelineStats> {
        let client = HttpClient::new(&self.config.scraper)
            .context("Failed to build scraper")?;
        self.run_with(&client).await
    }

    /// Full run against any page source; writes the output file.
    pub async fn run_with<F: PageFetcher + ?Sized>(&self, fetcher: &F) -> Result<PipelineStats> {
        let (items, mut stats) = self.collect(fetcher).await?;

        let path = &self.config.catalog.output_path;
        write_catalog(path, &items)
            .with_context(|| format!("Failed to write catalog to {:?}", path))?;
        stats.output_path = path.clone();

        info!(
            "=== Done: {} items ({} supplementary, {} scraped) across {} categories, {} failed ===",
            items.len(),
            stats.supplementary_items,
            stats.scraped_items,
            stats.categories,
            stats.failed_categories,
        );
        info!("Catalog saved to {:?}", stats.output_path);
        Ok(stats)
    }

    /// Gather the ordered, deduplicated catalog without writing it.
    pub async fn collect<F: PageFetcher + ?Sized>(
        &self,
        fetcher: &F,
    ) -> Result<(Vec<CatalogItem>, PipelineStats)> {
        let catalog = &self.config.catalog;
        let scraper_cfg = &self.config.scraper;
        let selectors = Selectors::compile(&self.config.selectors)?;

        let mut seen = SeenTitles::new();
        let mut all_items = Vec::new();
        let mut stats = PipelineStats::default();

        // ── 1. Supplementary items ────────────────────────────────────────────
        if let Some(path) = &catalog.supplementary_path {
            info!("=== Step 1: Merging supplementary items from {:?} ===", path);
            let items = load_supplementary(
                path,
                &catalog.supplementary_category,
                catalog.sku_prefix,
                &mut seen,
            )?;
            stats.supplementary_items = items.len();
            all_items.extend(items);
        }

        // ── 2. Storefront categories ──────────────────────────────────────────
        info!("=== Step 2: Scraping {} categories ===", scraper_cfg.categories.len());
        let scraper = CategoryScraper::new(
            fetcher,
            &selectors,
            catalog.sku_prefix,
            scraper_cfg.detail_pages,
        );

        for url in &scraper_cfg.categories {
            info!("Scraping category: {}", url);
            let scrape = scraper
                .scrape_category(url, scraper_cfg.max_items_per_category, &mut seen)
                .await;

            let label = scrape.category.as_deref().unwrap_or("?");
            if let Some(err) = scrape.stop.failure() {
                error!(
                    "{} ({}): stopped early after {} items from {} page(s): {}",
                    url,
                    label,
                    scrape.items.len(),
                    scrape.pages,
                    err
                );
                stats.failed_categories += 1;
            } else {
                info!(
                    "{} ({}): {} items from {} page(s)",
                    url,
                    label,
                    scrape.items.len(),
                    scrape.pages
                );
            }
            stats.categories += 1;
            stats.scraped_items += scrape.items.len();
            all_items.extend(scrape.items);
        }

        debug!("{} unique titles seen", seen.len());
        Ok((all_items, stats))
    }
}

#[derive(Debug, Default)]
pub struct PipelineStats {
    pub supplementary_items: usize,
    pub scraped_items: usize,
    pub categories: usize,
    /// Categories cut short by a failed request or unexpected markup.
    pub failed_categories: usize,
    pub output_path: PathBuf,
}
