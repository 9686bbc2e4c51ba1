//! Extract command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use bakery_core::extract;
use colored::Colorize;

use crate::utils::{read_input, write_output};

/// Execute the extract command.
pub fn execute(image: PathBuf, output: Option<PathBuf>, quiet: bool) -> Result<()> {
    let bytes = read_input(&image, "image")?;
    let document = extract(&bytes).context("Failed to extract document")?;
    let json = serde_json::to_string_pretty(&document).context("Failed to serialize document")?;

    match output {
        Some(path) => {
            write_output(&path, json.as_bytes(), "document")?;
            if !quiet {
                println!(
                    "{} {}",
                    "Document extracted to".green(),
                    path.display()
                );
            }
        }
        // The document itself is the output, so quiet does not suppress it
        None => println!("{json}"),
    }
    Ok(())
}
