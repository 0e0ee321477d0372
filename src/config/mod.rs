use anyhow::{Context, Result, bail};
use scraper::Selector;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
}

/// Scraper configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScraperConfig {
    /// Category listing URLs, scraped in this order.
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,

    #[serde(default = "default_max_items")]
    pub max_items_per_category: usize,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Follow each card to its product page instead of reading the card.
    #[serde(default)]
    pub detail_pages: bool,
}

/// Output catalog configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    #[serde(default)]
    pub supplementary_path: Option<PathBuf>,

    #[serde(default = "default_supplementary_category")]
    pub supplementary_category: String,

    #[serde(default = "default_sku_prefix")]
    pub sku_prefix: char,
}

/// CSS selectors for the storefront markup
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SelectorConfig {
    #[serde(default = "default_collection_heading")]
    pub collection_heading: String,

    #[serde(default = "default_listing_heading")]
    pub listing_heading: String,

    #[serde(default = "default_product_card")]
    pub product_card: String,

    #[serde(default = "default_card_title")]
    pub card_title: String,

    #[serde(default = "default_price")]
    pub card_price: String,

    #[serde(default = "default_card_link")]
    pub card_link: String,

    #[serde(default = "default_detail_title")]
    pub detail_title: String,

    #[serde(default = "default_price")]
    pub detail_price: String,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_categories() -> Vec<String> {
    vec![
        "https://store.marxist.ca/collections/books".to_string(),
        "https://store.marxist.ca/collections/booklets".to_string(),
        "https://store.marxist.ca/collections/papers".to_string(),
    ]
}
fn default_max_items() -> usize {
    3500
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36"
        .to_string()
}
fn default_output_path() -> PathBuf {
    PathBuf::from("marxist_store_items.csv")
}
fn default_supplementary_category() -> String {
    "Supplementary".to_string()
}
fn default_sku_prefix() -> char {
    'M'
}
fn default_collection_heading() -> String {
    "h1.collection-hero__title".to_string()
}
fn default_listing_heading() -> String {
    "h1.main-page-title".to_string()
}
fn default_product_card() -> String {
    "li.grid__item".to_string()
}
fn default_card_title() -> String {
    "h3.card__heading".to_string()
}
fn default_card_link() -> String {
    "a[href]".to_string()
}
fn default_detail_title() -> String {
    "h1".to_string()
}
fn default_price() -> String {
    "span.price-item--regular".to_string()
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            max_items_per_category: default_max_items(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            detail_pages: false,
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            output_path: default_output_path(),
            supplementary_path: None,
            supplementary_category: default_supplementary_category(),
            sku_prefix: default_sku_prefix(),
        }
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            collection_heading: default_collection_heading(),
            listing_heading: default_listing_heading(),
            product_card: default_product_card(),
            card_title: default_card_title(),
            card_price: default_price(),
            card_link: default_card_link(),
            detail_title: default_detail_title(),
            detail_price: default_price(),
        }
    }
}

// ── Loader ───────────────────────────────────────────────────────────────────

/// `CATALOG__SECTION__KEY` overrides; `CATALOG__SCRAPER__CATEGORIES` is comma-separated.
fn environment() -> config::Environment {
    config::Environment::with_prefix("CATALOG")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("scraper.categories")
}

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(environment())
            .build()?;

        let app_cfg: AppConfig = cfg
            .try_deserialize()
            .context("Invalid configuration")?;
        app_cfg.validate()?;
        Ok(app_cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.scraper.categories.is_empty() {
            bail!("No category URLs configured");
        }
        for raw in &self.scraper.categories {
            let url = Url::parse(raw).with_context(|| format!("Bad category URL {:?}", raw))?;
            if url.scheme() != "http" && url.scheme() != "https" {
                bail!("Category URL {:?} is not http(s)", raw);
            }
        }
        if self.scraper.max_items_per_category == 0 {
            bail!("max_items_per_category must be at least 1");
        }
        self.selectors.validate()
    }
}

impl SelectorConfig {
    fn validate(&self) -> Result<()> {
        let all = [
            ("collection_heading", &self.collection_heading),
            ("listing_heading", &self.listing_heading),
            ("product_card", &self.product_card),
            ("card_title", &self.card_title),
            ("card_price", &self.card_price),
            ("card_link", &self.card_link),
            ("detail_title", &self.detail_title),
            ("detail_price", &self.detail_price),
        ];
        for (name, css) in all {
            if Selector::parse(css).is_err() {
                bail!("Selector {} is not valid CSS: {:?}", name, css);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = AppConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.scraper.categories.len(), 3);
        assert_eq!(cfg.scraper.max_items_per_category, 3500);
        assert_eq!(cfg.catalog.sku_prefix, 'M');
        assert!(!cfg.scraper.detail_pages);
    }

    #[test]
    fn test_rejects_relative_category_url() {
        let mut cfg = AppConfig::default();
        cfg.scraper.categories = vec!["/collections/books".to_string()];
        assert!(cfg.validate().is_err());

        cfg.scraper.categories = vec!["ftp://store.example/collections/books".to_string()];
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_empty_categories_and_zero_cap() {
        let mut cfg = AppConfig::default();
        cfg.scraper.categories.clear();
        assert!(cfg.validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.scraper.max_items_per_category = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_selector() {
        let mut cfg = AppConfig::default();
        cfg.selectors.card_title = "h3[".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_environment_overrides() {
        let vars: config::Map<String, String> = [
            (
                "CATALOG__SCRAPER__CATEGORIES",
                "https://store.example/collections/a,https://store.example/collections/b",
            ),
            ("CATALOG__SCRAPER__MAX_ITEMS_PER_CATEGORY", "25"),
            ("CATALOG__CATALOG__OUTPUT_PATH", "out/catalog.csv"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let cfg: AppConfig = config::Config::builder()
            .add_source(environment().source(Some(vars)))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(
            cfg.scraper.categories,
            [
                "https://store.example/collections/a",
                "https://store.example/collections/b"
            ]
        );
        assert_eq!(cfg.scraper.max_items_per_category, 25);
        assert_eq!(cfg.catalog.output_path, PathBuf::from("out/catalog.csv"));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let cfg: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(
                "[scraper]\ndetail_pages = true\n\n[catalog]\nsku_prefix = \"B\"\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert!(cfg.scraper.detail_pages);
        assert_eq!(cfg.scraper.timeout_secs, 30);
        assert_eq!(cfg.catalog.sku_prefix, 'B');
        assert_eq!(cfg.selectors.product_card, "li.grid__item");
    }
}
