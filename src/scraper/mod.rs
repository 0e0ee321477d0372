pub mod cleaner;
pub mod error;
pub mod http_client;
pub mod parsers;

use crate::models::{CatalogItem, SeenTitles};
use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use self::cleaner::{category_label, normalise_product};
use self::error::{FetchError, ParseError};
use self::parsers::{ListingPage, Selectors, parse_listing_page, parse_product_page};

// ── Source trait ──────────────────────────────────────────────────────────────

/// Anything that can hand back the HTML of a URL.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError>;
}

// ── Category result ───────────────────────────────────────────────────────────

/// Why pagination of a category ended.
#[derive(Debug)]
pub enum StopReason {
    CapReached,
    EmptyPage,
    /// Generic listing page; it does not paginate.
    SinglePage,
    Transport(FetchError),
    Markup(ParseError),
}

impl StopReason {
    /// The error that cut pagination short, if any.
    pub fn failure(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StopReason::Transport(e) => Some(e),
            StopReason::Markup(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct CategoryScrape {
    /// Label from the first page's heading, if one was read.
    pub category: Option<String>,
    pub items: Vec<CatalogItem>,
    /// Listing pages successfully fetched.
    pub pages: u32,
    pub stop: StopReason,
}

// ── Storefront scraper ────────────────────────────────────────────────────────

pub struct CategoryScraper<'a, F: PageFetcher + ?Sized> {
    fetcher: &'a F,
    selectors: &'a Selectors,
    sku_prefix: char,
    detail_pages: bool,
}

impl<'a, F: PageFetcher + ?Sized> CategoryScraper<'a, F> {
    pub fn new(
        fetcher: &'a F,
        selectors: &'a Selectors,
        sku_prefix: char,
        detail_pages: bool,
    ) -> Self {
        Self {
            fetcher,
            selectors,
            sku_prefix,
            detail_pages,
        }
    }

    /// URL for a listing page: `{base}?page={n}`.
    fn listing_url(base: &str, page: u32) -> String {
        format!("{}?page={}", base, page)
    }

    /// URL for a product page: the card's relative link appended to the category URL.
    fn product_url(base: &str, link: &str) -> String {
        format!("{}{}", base, link)
    }

    /// Walk `{url}?page=1, 2, …` until a page is empty, a request fails,
    /// a listing page is hit, or `max_items` new items were collected.
    pub async fn scrape_category(
        &self,
        url: &str,
        max_items: usize,
        seen: &mut SeenTitles,
    ) -> CategoryScrape {
        let mut items = Vec::new();
        let mut category: Option<String> = None;
        let mut page = 1u32;
        let mut pages = 0u32;

        let stop = loop {
            if items.len() >= max_items {
                break StopReason::CapReached;
            }

            let page_url = Self::listing_url(url, page);
            let html = match self.fetcher.fetch_page(&page_url).await {
                Ok(html) => html,
                Err(e) => {
                    error!("Failed to retrieve {}: {}", page_url, e);
                    break StopReason::Transport(e);
                }
            };
            pages += 1;

            let ListingPage { heading, cards } = match parse_listing_page(&html, self.selectors) {
                Ok(p) => p,
                Err(e) => {
                    error!("{}: {}", page_url, e);
                    break StopReason::Markup(e);
                }
            };

            let label = category
                .get_or_insert_with(|| category_label(heading.text()))
                .clone();

            if cards.is_empty() {
                debug!("Empty page {} — stopping pagination", page);
                break StopReason::EmptyPage;
            }

            let before = items.len();
            for (index, card) in cards.iter().enumerate() {
                if items.len() >= max_items {
                    break;
                }

                let raw = if self.detail_pages {
                    let link = match card.require_link(index) {
                        Ok(l) => l,
                        Err(e) => {
                            warn!("{}: {}", page_url, e);
                            continue;
                        }
                    };
                    let product_url = Self::product_url(url, link);
                    let html = match self.fetcher.fetch_page(&product_url).await {
                        Ok(html) => html,
                        Err(e) => {
                            error!("Failed to retrieve {}: {}", product_url, e);
                            break;
                        }
                    };
                    match parse_product_page(&html, self.selectors) {
                        Ok(raw) => raw,
                        Err(e) => {
                            warn!("{}: {}", product_url, e);
                            continue;
                        }
                    }
                } else {
                    match card.to_raw(index) {
                        Ok(raw) => raw,
                        Err(e) => {
                            warn!("{}: {}", page_url, e);
                            continue;
                        }
                    }
                };

                if let Some(item) = normalise_product(&raw, &label, self.sku_prefix, seen) {
                    items.push(item);
                }
            }
            debug!(
                "  Page {}: {} cards, {} new items",
                page,
                cards.len(),
                items.len() - before
            );

            if heading.is_single_page() {
                break StopReason::SinglePage;
            }
            page += 1;
        };

        debug!("{}: {} items from {} page(s), stopped: {:?}", url, items.len(), pages, stop);

        CategoryScrape {
            category,
            items,
            pages,
            stop,
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Serves fixed HTML per URL; unknown URLs answer 404.
    #[derive(Default)]
    pub struct StaticPages {
        pages: HashMap<String, String>,
        requested: Mutex<Vec<String>>,
    }

    impl StaticPages {
        pub fn with(mut self, url: &str, html: impl Into<String>) -> Self {
            self.pages.insert(url.to_string(), html.into());
            self
        }

        pub fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageFetcher for StaticPages {
        async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
            self.requested.lock().unwrap().push(url.to_string());
            self.pages.get(url).cloned().ok_or(FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
        }
    }

    pub fn listing(heading: &str, titles: &[(&str, &str)]) -> String {
        let cards: String = titles
            .iter()
            .map(|(title, price)| {
                let slug = title.to_lowercase().replace(' ', "-");
                format!(
                    r#"<li class="grid__item">
                         <h3 class="card__heading"><a href="/products/{slug}">{title}</a></h3>
                         <span class="price-item--regular">{price}</span>
                       </li>"#
                )
            })
            .collect();
        format!(
            r#"<html><body>
                 <h1 class="collection-hero__title">{heading}</h1>
                 <ul>{cards}</ul>
               </body></html>"#
        )
    }
}
