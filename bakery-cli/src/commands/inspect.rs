//! Inspect command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use bakery_core::png::{text_entries, PngBuffer};
use bakery_core::KEYWORD;
use colored::Colorize;

use crate::utils::read_input;

/// Longest text preview shown per entry.
const PREVIEW_CHARS: usize = 48;

/// Execute the inspect command.
pub fn execute(image: PathBuf, quiet: bool) -> Result<()> {
    let bytes = read_input(&image, "image")?;
    let png = PngBuffer::parse(&bytes).context("Failed to parse PNG")?;
    let entries = text_entries(&png).context("Failed to decode iTXt chunks")?;

    if quiet {
        return Ok(());
    }

    println!("{}", "Chunks".bold());
    for chunk in png.chunks() {
        println!(
            "   {:<4}  {:>10} bytes  crc {:08x}",
            chunk.chunk_type(),
            chunk.length(),
            chunk.crc()
        );
    }
    if !png.trailer().is_empty() {
        println!(
            "   {}",
            format!("{} bytes after IEND", png.trailer().len()).yellow()
        );
    }

    println!();
    println!("{}", "Text entries (iTXt)".bold());
    if entries.is_empty() {
        println!("   {}", "none".dimmed());
    }
    for entry in &entries {
        let preview: String = entry.text.chars().take(PREVIEW_CHARS).collect();
        let ellipsis = if entry.text.chars().count() > PREVIEW_CHARS {
            "..."
        } else {
            ""
        };
        let keyword = if entry.keyword == KEYWORD {
            entry.keyword.green().to_string()
        } else {
            entry.keyword.clone()
        };
        println!(
            "   {keyword}{}  {}{ellipsis}",
            if entry.compressed { " (zlib)" } else { "" },
            preview.dimmed()
        );
    }

    Ok(())
}
