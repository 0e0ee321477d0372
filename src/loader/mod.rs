//! Loader for the supplementary item list (name, description, price).

use crate::models::{CatalogItem, RawProduct, SeenTitles};
use crate::scraper::cleaner::{clean_title, normalise_product};
use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// Read the supplementary CSV at `path`. Items whose title is already in
/// `seen` are dropped; new titles are registered.
pub fn load_supplementary(
    path: &Path,
    category: &str,
    sku_prefix: char,
    seen: &mut SeenTitles,
) -> Result<Vec<CatalogItem>> {
    debug!("Loading supplementary items from {:?}", path);
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open supplementary file {:?}", path))?;
    let items = read_supplementary(file, category, sku_prefix, seen)?;
    info!("{:?}: {} supplementary items loaded", path, items.len());
    Ok(items)
}

pub fn read_supplementary<R: Read>(
    input: R,
    category: &str,
    sku_prefix: char,
    seen: &mut SeenTitles,
) -> Result<Vec<CatalogItem>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input);

    let mut items = Vec::new();

    for (i, result) in reader.records().enumerate() {
        // +2: one for the header, one for 1-based numbering
        let line = i + 2;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("Supplementary row {}: {}", line, e);
                continue;
            }
        };

        let name = record.get(0).map(str::trim).unwrap_or_default();
        if name.is_empty() {
            warn!("Supplementary row {}: no item name, skipped", line);
            continue;
        }

        let raw = RawProduct {
            title: name.to_string(),
            price_text: record.get(2).unwrap_or_default().to_string(),
        };

        let Some(mut item) = normalise_product(&raw, category, sku_prefix, seen) else {
            debug!("Supplementary row {}: duplicate {:?}", line, name);
            continue;
        };

        let description = clean_title(record.get(1).map(str::trim).unwrap_or_default());
        if !description.is_empty() {
            item.description = description;
        }
        items.push(item);
    }

    Ok(items)
}
