//! Bake command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use bakery_core::{BakeMode, BakeSession, Upload};
use colored::Colorize;
use tracing::{info, warn};

use crate::utils::{build_baked_path, read_input, write_output};

pub struct BakeArgs {
    pub image: PathBuf,
    pub document: PathBuf,
    pub output: Option<PathBuf>,
    pub data_url: bool,
    pub append: bool,
    pub dry_run: bool,
}

/// Execute the bake command.
pub fn execute(args: BakeArgs, quiet: bool) -> Result<()> {
    let mut session = BakeSession::new();

    let image = read_input(&args.image, "image")?;
    session
        .select_image(vec![Upload::new(args.image.display().to_string(), image)])
        .context("Cannot bake into this image")?;

    let document = read_input(&args.document, "document")?;
    let id = session
        .select_document(vec![Upload::new(
            args.document.display().to_string(),
            document,
        )])
        .context("Invalid document")?;

    let mode = if args.append {
        BakeMode::Append
    } else {
        BakeMode::Replace
    };
    // The data URL goes to stdout unless an explicit output path is given
    let output = match (&args.output, args.data_url) {
        (Some(path), _) => Some(path.clone()),
        (None, true) => None,
        (None, false) => Some(build_baked_path(&args.image)),
    };

    if args.dry_run {
        println!("{}", "[DRY RUN] No files will be written".yellow().bold());
        println!();
        println!("   {} {}", "Image:".dimmed(), args.image.display());
        println!("   {} {}", "Document:".dimmed(), args.document.display());
        if let Some(document) = session.document() {
            println!("   {} {}", "Format:".dimmed(), document.format());
        }
        println!("   {} {}", "Document id:".dimmed(), id.short());
        println!("   {} {:?}", "Mode:".dimmed(), mode);
        match &output {
            Some(path) => println!("   {} {}", "Output:".dimmed(), path.display()),
            None => println!("   {} data URL on stdout", "Output:".dimmed()),
        }
        return Ok(());
    }

    let baked = session.bake(mode).context("Failed to bake document")?.clone();
    if baked.replaced > 0 {
        warn!(replaced = baked.replaced, "Replaced previously baked document");
    }

    if let Some(path) = &output {
        write_output(path, &baked.bytes, "baked image")?;
    }
    if args.data_url {
        println!("{}", baked.to_data_url());
    }

    info!(document_id = id.short(), "Bake complete");

    if !quiet && !args.data_url {
        println!();
        println!("{}", "Image baked successfully!".green().bold());
        println!();
        if let Some(path) = &output {
            println!("   {} {}", "Saved to:".dimmed(), path.display());
        }
        if let Some(document) = session.document() {
            println!("   {} {}", "Format:".dimmed(), document.format());
        }
        println!("   {} {}", "Document id:".dimmed(), id.short());
        println!("   {} {} bytes", "Size:".dimmed(), baked.bytes.len());
        if baked.replaced > 0 {
            println!(
                "   {} {}",
                "Replaced:".dimmed(),
                format!("{} earlier document(s)", baked.replaced).yellow()
            );
        }
    }

    Ok(())
}
