use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::error::{NetworkError, Result};
use crate::layout::Layout;
use crate::node_identification::Hub;

/// Writes the hub ranking as `id,degree` rows, best first.
pub fn write_hubs_csv(hubs: &[Hub], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for hub in hubs {
        writer.serialize(hub)?;
    }
    writer.flush().map_err(|e| NetworkError::io(path, e))?;
    info!(path = %path.display(), hubs = hubs.len(), "wrote hub ranking");
    Ok(())
}

pub fn write_layout_json(layout: &Layout, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| NetworkError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, layout)?;
    writer.flush().map_err(|e| NetworkError::io(path, e))?;
    info!(path = %path.display(), nodes = layout.len(), "wrote layout");
    Ok(())
}
