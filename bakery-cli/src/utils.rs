//! Common utility functions shared across CLI commands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bakery_core::png::has_png_signature;
use bakery_core::{extract, WrappedDocument};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

/// Build the default output path for a baked image.
///
/// Transforms `photo.png` into `photo.baked.png`.
pub fn build_baked_path(image: &Path) -> PathBuf {
    let stem = image
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");
    image.with_file_name(format!("{stem}.baked.png"))
}

/// Read a whole input file, tagging failures for exit code 66.
pub fn read_input(path: &Path, what: &str) -> Result<Vec<u8>> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {what}: {}", path.display()))?;
    info!(path = %path.display(), bytes = bytes.len(), "Read {what}");
    Ok(bytes)
}

/// Write an output file, tagging failures for exit code 74.
pub fn write_output(path: &Path, bytes: &[u8], what: &str) -> Result<()> {
    std::fs::write(path, bytes)
        .with_context(|| format!("Failed to write {what}: {}", path.display()))?;
    info!(path = %path.display(), bytes = bytes.len(), "Wrote {what}");
    Ok(())
}

/// Load a document from either a baked PNG or a bare JSON file.
pub fn load_document(path: &Path) -> Result<WrappedDocument> {
    let bytes = read_input(path, "file")?;
    if has_png_signature(&bytes) {
        debug!(source = "png", "Loading document");
        extract(&bytes).context("Failed to extract document from image")
    } else {
        debug!(source = "json", "Loading document");
        WrappedDocument::from_json_slice(&bytes).context("Failed to parse document")
    }
}

/// Format a timestamp as a human-readable UTC string.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_build_baked_path() {
        assert_eq!(
            build_baked_path(Path::new("photo.png")),
            PathBuf::from("photo.baked.png")
        );
        assert_eq!(
            build_baked_path(Path::new("dir/cert.PNG")),
            PathBuf::from("dir/cert.baked.png")
        );
        assert_eq!(
            build_baked_path(Path::new("noext")),
            PathBuf::from("noext.baked.png")
        );
    }

    #[test]
    fn test_format_timestamp() {
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 12, 30, 45).unwrap();
        assert_eq!(format_timestamp(at), "2024-01-15 12:30:45 UTC");
    }
}
