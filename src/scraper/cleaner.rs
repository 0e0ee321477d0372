use crate::models::{
    CatalogItem, ITEM_TYPE, Price, RawProduct, SELLABLE, SeenTitles, TitleHash, VARIATION_NAME,
};
use tracing::warn;

/// Display width of the `Item Name` column.
pub const ITEM_NAME_WIDTH: usize = 36;

const ELLIPSIS: &str = "...";

// ── Text ──────────────────────────────────────────────────────────────────────

/// Drop the characters that break the downstream import: `"` and `,`.
pub fn clean_title(s: &str) -> String {
    s.chars().filter(|c| *c != '"' && *c != ',').collect()
}

/// Shorten to `max_len` characters by cutting out the middle.
/// "The Origin of the Family Private Property and the State"
/// → "The Origin of the...ty and the State"
pub fn truncate_with_ellipsis(s: &str, max_len: usize) -> String {
    let len = s.chars().count();
    if len <= max_len || max_len <= ELLIPSIS.len() {
        return s.to_string();
    }
    let keep = max_len - ELLIPSIS.len();
    let head = keep - keep / 2;
    let tail = keep / 2;

    let mut out: String = s.chars().take(head).collect();
    out.push_str(ELLIPSIS);
    out.extend(s.chars().skip(len - tail));
    out
}

/// Strip the "Collection:" marker the storefront puts in front of headings.
pub fn category_label(heading: &str) -> String {
    heading.replace("Collection:", "").trim().to_string()
}

// ── Price ─────────────────────────────────────────────────────────────────────

/// Keep digits and dots, then parse.
/// "$12.50" → 12.5 | "1,234.00" → 1234.0 | "Free" → Unparsable
pub fn parse_price(s: &str) -> Price {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    match cleaned.parse::<f64>() {
        Ok(p) => Price::Parsed(p),
        Err(_) => Price::Unparsable(s.to_string()),
    }
}

// ── Raw product → CatalogItem ─────────────────────────────────────────────────

/// Build the catalog row for a product, or `None` if its title was already seen.
pub fn normalise_product(
    raw: &RawProduct,
    category: &str,
    sku_prefix: char,
    seen: &mut SeenTitles,
) -> Option<CatalogItem> {
    let title = clean_title(&raw.title);
    let hash = TitleHash::of(&title);
    if !seen.insert(hash) {
        return None;
    }

    let price = parse_price(&raw.price_text);
    if let Price::Unparsable(text) = &price {
        warn!("Could not parse price for {:?}: ({})", title, text);
    }

    Some(CatalogItem {
        item_name: truncate_with_ellipsis(&title, ITEM_NAME_WIDTH),
        description: title,
        reporting_category: category.to_string(),
        price: price.amount(),
        sku: hash.sku(sku_prefix),
        sellable: SELLABLE,
        variation_name: VARIATION_NAME,
        item_type: ITEM_TYPE,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
