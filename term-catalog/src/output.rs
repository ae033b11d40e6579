//! Writing formatted catalogs to disk.

use std::path::PathBuf;

use tracing::info;

use crate::catalog::Catalog;
use crate::config::OutputConfig;
use crate::error::{ErrorContext, Result};
use crate::formatters::{formatter_for, FormatterConfig};

/// File name for a catalog, e.g. `final_data_dictionary_20240131_235959.json`.
pub fn catalog_file_name(catalog: &Catalog, output: &OutputConfig) -> String {
    format!(
        "{}_{}.{}",
        output.file_prefix,
        catalog.generated_at.format("%Y%m%d_%H%M%S"),
        output.format.extension()
    )
}

/// Formats `catalog` and writes it into the output directory, creating the
/// directory if needed. Returns the path written.
pub fn write_catalog(
    catalog: &Catalog,
    output: &OutputConfig,
    formatter_config: FormatterConfig,
) -> Result<PathBuf> {
    let rendered = formatter_for(output.format, formatter_config).format(catalog)?;

    std::fs::create_dir_all(&output.directory).with_context(|| {
        format!(
            "Failed to create output directory {}",
            output.directory.display()
        )
    })?;

    let path = output.directory.join(catalog_file_name(catalog, output));
    std::fs::write(&path, rendered)
        .with_context(|| format!("Failed to write catalog to {}", path.display()))?;

    info!(
        path = %path.display(),
        format = %output.format,
        entries = catalog.entries.len(),
        "Catalog written"
    );
    Ok(path)
}
