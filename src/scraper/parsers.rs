use crate::config::SelectorConfig;
use crate::models::RawProduct;
use scraper::{ElementRef, Html, Selector};

use super::error::ParseError;

// ── Selectors ─────────────────────────────────────────────────────────────────

/// Compiled form of [`SelectorConfig`].
#[derive(Debug, Clone)]
pub struct Selectors {
    collection_heading: Selector,
    listing_heading: Selector,
    product_card: Selector,
    card_title: Selector,
    card_price: Selector,
    card_link: Selector,
    detail_title: Selector,
    detail_price: Selector,
}

fn compile(css: &str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|_| ParseError::InvalidSelector {
        selector: css.to_string(),
    })
}

impl Selectors {
    pub fn compile(cfg: &SelectorConfig) -> Result<Self, ParseError> {
        Ok(Self {
            collection_heading: compile(&cfg.collection_heading)?,
            listing_heading: compile(&cfg.listing_heading)?,
            product_card: compile(&cfg.product_card)?,
            card_title: compile(&cfg.card_title)?,
            card_price: compile(&cfg.card_price)?,
            card_link: compile(&cfg.card_link)?,
            detail_title: compile(&cfg.detail_title)?,
            detail_price: compile(&cfg.detail_price)?,
        })
    }
}

/// Each text node trimmed, empty ones dropped, the rest joined with no separator.
/// Titles are hashed into SKUs, so this must stay stable across releases.
fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

fn first_text(scope: ElementRef<'_>, sel: &Selector) -> Option<String> {
    scope.select(sel).next().map(element_text)
}

// ── Listing page ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Heading {
    /// Dedicated collection page; paginates.
    Collection(String),
    /// Generic listing page; only the first page is read.
    Listing(String),
}

impl Heading {
    pub fn text(&self) -> &str {
        match self {
            Heading::Collection(t) | Heading::Listing(t) => t,
        }
    }

    pub fn is_single_page(&self) -> bool {
        matches!(self, Heading::Listing(_))
    }
}

/// One product card as found on a listing page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductCard {
    pub title: Option<String>,
    pub price_text: Option<String>,
    pub link: Option<String>,
}

impl ProductCard {
    /// Title is required; a missing price reads as empty text.
    pub fn to_raw(&self, index: usize) -> Result<RawProduct, ParseError> {
        let title = self
            .title
            .clone()
            .ok_or(ParseError::MissingCardField { index, field: "title" })?;
        Ok(RawProduct {
            title,
            price_text: self.price_text.clone().unwrap_or_default(),
        })
    }

    pub fn require_link(&self, index: usize) -> Result<&str, ParseError> {
        self.link
            .as_deref()
            .ok_or(ParseError::MissingCardField { index, field: "link" })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListingPage {
    pub heading: Heading,
    pub cards: Vec<ProductCard>,
}

/// Collection heading first, then the generic listing heading.
pub fn locate_heading(doc: &Html, sel: &Selectors) -> Result<Heading, ParseError> {
    if let Some(el) = doc.select(&sel.collection_heading).next() {
        return Ok(Heading::Collection(element_text(el)));
    }
    if let Some(el) = doc.select(&sel.listing_heading).next() {
        return Ok(Heading::Listing(element_text(el)));
    }
    Err(ParseError::HeadingNotFound)
}

pub fn parse_listing_page(html: &str, sel: &Selectors) -> Result<ListingPage, ParseError> {
    let doc = Html::parse_document(html);
    let heading = locate_heading(&doc, sel)?;

    let cards = doc
        .select(&sel.product_card)
        .map(|card| ProductCard {
            title: first_text(card, &sel.card_title),
            price_text: first_text(card, &sel.card_price),
            link: card
                .select(&sel.card_link)
                .next()
                .and_then(|a| a.value().attr("href"))
                .map(|h| h.to_string()),
        })
        .collect();

    Ok(ListingPage { heading, cards })
}

// ── Product page ──────────────────────────────────────────────────────────────

pub fn parse_product_page(html: &str, sel: &Selectors) -> Result<RawProduct, ParseError> {
    let doc = Html::parse_document(html);
    let root = doc.root_element();

    let title = first_text(root, &sel.detail_title)
        .ok_or(ParseError::MissingPageField { field: "title" })?;
    let price_text = first_text(root, &sel.detail_price)
        .ok_or(ParseError::MissingPageField { field: "price" })?;

    Ok(RawProduct { title, price_text })
}
