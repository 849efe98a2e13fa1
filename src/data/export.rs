use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use super::filter::FilteredView;

/// Write the view's rows (every listing column plus `year`) as CSV.
/// Returns the number of rows written.
pub fn write_csv(view: &FilteredView<'_>, path: &Path) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for listing in view.iter() {
        writer.serialize(listing).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(view.len())
}

/// Write any serializable value as pretty-printed JSON.
pub fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).context("writing JSON")?;
    writer.flush().context("flushing JSON")?;
    Ok(())
}
