use crate::models::CatalogItem;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Column names of the import file, in order.
pub const CATALOG_HEADER: [&str; 8] = [
    "Item Name",
    "Description",
    "Reporting Category",
    "Price",
    "SKU",
    "Sellable",
    "Variation Name",
    "Item Type",
];

/// Write the whole catalog to `path`, replacing any existing file.
pub fn write_catalog(path: &Path, items: &[CatalogItem]) -> Result<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Could not create dir {:?}", parent))?;
    }
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {:?}", path))?;
    let n = write_catalog_to(file, items)?;
    info!("Wrote {} items to {:?}", n, path);
    Ok(n)
}

/// The header row is always written, even with no items.
pub fn write_catalog_to<W: Write>(out: W, items: &[CatalogItem]) -> Result<usize> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(out);

    writer.write_record(CATALOG_HEADER)?;
    for item in items {
        writer
            .serialize(item)
            .with_context(|| format!("write item {}", item.sku))?;
    }
    writer.flush()?;
    Ok(items.len())
}
