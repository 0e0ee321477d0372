use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::collections::HashSet;

/// Modulus applied to the title hash to get the numeric part of a SKU.
pub const SKU_MODULUS: u64 = 10_000_000;

// ── Catalog item ──────────────────────────────────────────────────────────────

/// One row of the point-of-sale import file. Field order is the column order.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CatalogItem {
    #[serde(rename = "Item Name")]
    pub item_name: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Reporting Category")]
    pub reporting_category: String,
    #[serde(rename = "Price", serialize_with = "serialize_price")]
    pub price: Option<f64>,
    #[serde(rename = "SKU")]
    pub sku: String,
    #[serde(rename = "Sellable")]
    pub sellable: &'static str,
    #[serde(rename = "Variation Name")]
    pub variation_name: &'static str,
    #[serde(rename = "Item Type")]
    pub item_type: &'static str,
}

pub const SELLABLE: &str = "Y";
pub const VARIATION_NAME: &str = " ";
pub const ITEM_TYPE: &str = "Physical";

fn serialize_price<S: Serializer>(price: &Option<f64>, s: S) -> Result<S::Ok, S::Error> {
    match price {
        Some(p) => s.serialize_str(&format!("{:.2}", p)),
        None => s.serialize_str(""),
    }
}

// ── Price ─────────────────────────────────────────────────────────────────────

/// Outcome of reading a price string.
#[derive(Debug, Clone, PartialEq)]
pub enum Price {
    Parsed(f64),
    /// Keeps the original text so the warning can show it.
    Unparsable(String),
}

impl Price {
    pub fn amount(&self) -> Option<f64> {
        match self {
            Price::Parsed(p) => Some(*p),
            Price::Unparsable(_) => None,
        }
    }
}

// ── Raw scraped product ──────────────────────────────────────────────────────

/// Title and price text as they appear in the markup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawProduct {
    pub title: String,
    pub price_text: String,
}

// ── Dedup ─────────────────────────────────────────────────────────────────────

/// Full SHA-256 digest of a cleaned title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TitleHash([u8; 32]);

impl TitleHash {
    pub fn of(title: &str) -> Self {
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&Sha256::digest(title.as_bytes()));
        Self(digest)
    }

    /// The digest read as a big-endian integer, reduced mod [`SKU_MODULUS`].
    pub fn short(&self) -> u64 {
        self.0
            .iter()
            .fold(0u64, |acc, &b| (acc * 256 + u64::from(b)) % SKU_MODULUS)
    }

    /// "M1234567" style identifier. Two titles may share one; dedup uses the full digest.
    pub fn sku(&self, prefix: char) -> String {
        format!("{}{}", prefix, self.short())
    }
}

/// Title hashes already emitted during this run.
#[derive(Debug, Default)]
pub struct SeenTitles {
    hashes: HashSet<TitleHash>,
}

impl SeenTitles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the hash was already registered.
    pub fn insert(&mut self, hash: TitleHash) -> bool {
        self.hashes.insert(hash)
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sku_is_deterministic_and_bounded() {
        let a = TitleHash::of("The Communist Manifesto");
        let b = TitleHash::of("The Communist Manifesto");
        assert_eq!(a, b);
        assert_eq!(a.sku('M'), b.sku('M'));

        for title in ["", "a", "Reform or Revolution", "État et révolution"] {
            let h = TitleHash::of(title);
            assert!(h.short() < SKU_MODULUS);
            let sku = h.sku('M');
            assert!(sku.starts_with('M'));
            assert!(sku[1..].parse::<u64>().is_ok());
        }
    }

    #[test]
    fn test_short_matches_big_integer_modulo() {
        // sha256("abc") = ba7816bf...15ad, reduced mod 10^7 is 7089965
        let h = TitleHash::of("abc");
        assert_eq!(h.short(), 7089965);
        assert_eq!(h.sku('M'), "M7089965");
    }

    #[test]
    fn test_seen_titles() {
        let mut seen = SeenTitles::new();
        let h = TitleHash::of("Wage Labour and Capital");
        assert_eq!(seen.len(), 0);
        assert!(seen.insert(h));
        assert!(!seen.insert(h));
        assert_eq!(seen.len(), 1);
    }

    #[test]
    fn test_price_amount() {
        assert_eq!(Price::Parsed(12.5).amount(), Some(12.5));
        assert_eq!(Price::Unparsable("Free".into()).amount(), None);
    }
}
