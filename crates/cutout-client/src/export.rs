//! Persisting exports to disk.

use std::path::{Path, PathBuf};

use cutout_core::ExportedImage;
use tracing::info;

use crate::error::ExportError;

/// Write `image` into `dir` under its canonical file name, creating the
/// directory if needed. An existing file of the same name is overwritten.
pub async fn write_export(dir: &Path, image: &ExportedImage) -> Result<PathBuf, ExportError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| ExportError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

    let path = dir.join(image.file_name());
    tokio::fs::write(&path, image.payload.as_bytes())
        .await
        .map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;

    info!(path = %path.display(), bytes = image.payload.len(), "Exported image");
    Ok(path)
}
