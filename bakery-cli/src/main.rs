//! Bakery CLI - bake attestation documents into PNG images.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use bakery_core::{MockOutcome, DEFAULT_NETWORK};

mod commands;
mod exit_codes;
mod utils;

use exit_codes::ExitCode;

const EXIT_CODES_HELP: &str = "\
Exit codes:
  0   Success
  1   General error
  65  Data error (not a PNG, corrupt chunk, missing/malformed document, verification failed)
  66  Input file could not be read
  69  Verifier unavailable
  74  Output file could not be written";

#[derive(Parser)]
#[command(name = "bakery")]
#[command(author, version, about = "Bake attestation documents into PNG images", long_about = None)]
#[command(after_help = EXIT_CODES_HELP)]
struct Cli {
    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// When to use colored output
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

/// Canned outcome for the mock verifier.
#[derive(Clone, Copy, ValueEnum)]
pub enum MockMode {
    Valid,
    Invalid,
    Unreachable,
}

impl From<MockMode> for MockOutcome {
    fn from(mode: MockMode) -> Self {
        match mode {
            MockMode::Valid => MockOutcome::Valid,
            MockMode::Invalid => MockOutcome::Invalid,
            MockMode::Unreachable => MockOutcome::Unreachable,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Embed a document into a PNG image
    Bake {
        /// PNG image to bake into
        #[arg(value_name = "IMAGE")]
        image: PathBuf,

        /// Wrapped document (JSON)
        #[arg(value_name = "DOCUMENT")]
        document: PathBuf,

        /// Output path (defaults to <IMAGE stem>.baked.png)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the baked image as a data URL instead of writing a file
        #[arg(long)]
        data_url: bool,

        /// Keep previously baked documents instead of replacing them
        #[arg(long)]
        append: bool,

        /// Show what would be done without writing anything
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Print the document baked into a PNG image
    Extract {
        /// Baked PNG image
        #[arg(value_name = "IMAGE")]
        image: PathBuf,

        /// Write the document to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Verify a baked image (or a bare document) with the verifier service
    Verify {
        /// Baked PNG image or document JSON
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Network the document is anchored on
        #[arg(long, env = "BAKERY_VERIFIER_NETWORK", default_value = DEFAULT_NETWORK)]
        network: String,

        /// Use the mock verifier instead of BAKERY_VERIFIER_URL (for testing)
        #[arg(long, value_enum)]
        mock: Option<MockMode>,

        /// Print fragments as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the chunks and text entries of a PNG image
    Inspect {
        /// PNG image
        #[arg(value_name = "IMAGE")]
        image: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    match cli.color {
        ColorChoice::Always => colored::control::set_override(true),
        ColorChoice::Never => colored::control::set_override(false),
        ColorChoice::Auto => {}
    }
    init_tracing(cli.verbose);

    let quiet = cli.quiet;
    let result = match cli.command {
        Commands::Bake {
            image,
            document,
            output,
            data_url,
            append,
            dry_run,
        } => {
            let args = commands::bake::BakeArgs {
                image,
                document,
                output,
                data_url,
                append,
                dry_run,
            };
            commands::bake::execute(args, quiet)
        }
        Commands::Extract { image, output } => commands::extract::execute(image, output, quiet),
        Commands::Verify {
            file,
            network,
            mock,
            json,
        } => commands::verify::execute(file, network, mock, json, quiet).await,
        Commands::Inspect { image } => commands::inspect::execute(image, quiet),
    };

    let exit = match result {
        Ok(()) => ExitCode::success(),
        Err(err) => ExitCode::from_anyhow(&err),
    };
    if let Some(message) = exit.message {
        eprintln!("Error: {message}");
    }
    std::process::ExitCode::from(exit.code as u8)
}
