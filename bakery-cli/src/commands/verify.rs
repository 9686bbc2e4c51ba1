//! Verify command implementation.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use bakery_core::{
    Verdict, VerifierConfig, VerifierFactory, VerifyOptions, VerifySession,
};
use colored::Colorize;
use tracing::{error, info, warn};

use crate::utils::{format_timestamp, load_document};
use crate::MockMode;

/// Execute the verify command.
pub async fn execute(
    file: PathBuf,
    network: String,
    mock: Option<MockMode>,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let document = load_document(&file)?;

    let mut session = VerifySession::new();
    let id = session
        .load_document(document)
        .context("Failed to identify document")?
        .clone();

    let config = match mock {
        Some(mode) => {
            warn!("Using MOCK verifier (results are canned!)");
            if !quiet {
                eprintln!("{}", "Using MOCK verifier (results are canned!)".yellow());
            }
            VerifierConfig::Mock(mode.into())
        }
        None => VerifierConfig::Auto,
    };
    let verifier = VerifierFactory::create(config).context("Verifier unavailable")?;
    let options = VerifyOptions::new(network);

    let verdict = session
        .verify_with(verifier.as_ref(), &options)
        .await
        .context("Verifier unavailable")?;

    if json {
        let out = serde_json::to_string_pretty(session.fragments())
            .context("Failed to serialize fragments")?;
        println!("{out}");
    }

    let checked_at = session
        .checked_at()
        .map(format_timestamp)
        .unwrap_or_default();

    match verdict {
        Verdict::Valid => {
            info!(
                document_id = id.short(),
                network = %options.network,
                verifier = verifier.name(),
                "Verification successful"
            );

            if !quiet && !json {
                println!();
                println!("{}", "╔════════════════════════════════════════╗".green());
                println!(
                    "{}",
                    "║                VALID                   ║".green().bold()
                );
                println!("{}", "╚════════════════════════════════════════╝".green());
                println!();
                println!("   {} {}", "Document id:".dimmed(), id.short());
                println!("   {} {}", "Network:".dimmed(), options.network);
                for fragment in session.fragments() {
                    println!("   {} {}", "✓".green(), fragment.name);
                }
                println!("   {} {}", "Checked at:".dimmed(), checked_at);
            }
            Ok(())
        }
        Verdict::Invalid { failed } => {
            error!(
                document_id = id.short(),
                failed = ?failed,
                "Document is not valid"
            );

            if !quiet && !json {
                println!();
                println!("{}", "╔════════════════════════════════════════╗".red());
                println!(
                    "{}",
                    "║               INVALID                  ║".red().bold()
                );
                println!("{}", "╚════════════════════════════════════════╝".red());
                println!();
                println!("   {} {}", "Document id:".dimmed(), id.short());
                println!("   {} {}", "Network:".dimmed(), options.network);
                for fragment in session.fragments() {
                    if fragment.is_success() {
                        println!("   {} {}", "✓".green(), fragment.name);
                    } else if !fragment.is_failure() {
                        println!("   {} {} (skipped)", "-".dimmed(), fragment.name);
                    } else {
                        println!(
                            "   {} {} ({:?})",
                            "✗".red(),
                            fragment.name,
                            fragment.status
                        );
                    }
                }
                println!("   {} {}", "Checked at:".dimmed(), checked_at);
            }
            bail!("Verification failed: {}", failed.join(", "))
        }
        // verify_with only returns once fragments are applied
        Verdict::Pending => bail!("Verification failed: no result"),
    }
}
