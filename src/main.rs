mod config;
mod embed;
mod error;
mod html;
mod navigation;
mod profile;
mod sections;
mod serve;
mod web_assets;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use config::{DocumentKind, DocumentOverrides, DocumentSet};
use error::{AppError, Result};
use profile::{ProfileContent, ProfileSource};

/// Profile and document options shared by every subcommand.
#[derive(Args)]
struct SiteArgs {
    /// Profile file (YAML, or JSON with a .json extension); defaults to the built-in profile
    #[arg(long)]
    profile: Option<PathBuf>,
    /// Resume document, overriding the profile's path
    #[arg(long)]
    resume: Option<PathBuf>,
    /// Code-practice document, overriding the profile's path
    #[arg(long = "code-practice")]
    code_practice: Option<PathBuf>,
}

/// Explicit subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Serve the portfolio over HTTP
    Serve {
        #[command(flatten)]
        site: SiteArgs,
        /// Interface address to bind to
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
        /// Starting port number for the HTTP server
        #[arg(long, default_value = "3333")]
        port: u16,
    },
    /// Load the profile and report whether each document can be embedded
    Check {
        #[command(flatten)]
        site: SiteArgs,
    },
}

#[derive(Parser)]
#[command(name = "folio", version, about = "A single-person portfolio site served over HTTP")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Install the stderr log subscriber. `FOLIO_LOG` takes an `EnvFilter`
/// directive; the default is `info`.
fn init_logging() {
    let filter = EnvFilter::try_from_env("FOLIO_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_site(site: SiteArgs) -> Result<(serve::AppState, ProfileSource)> {
    let (profile, source) = ProfileContent::load(site.profile.as_deref())?;
    let overrides = DocumentOverrides {
        resume: site.resume,
        code_practice: site.code_practice,
    };
    let documents = DocumentSet::resolve(&profile.documents, &overrides);
    Ok((serve::AppState { profile, documents }, source))
}

fn run_check(state: &serve::AppState, source: &ProfileSource) {
    println!("profile: {source} ({})", state.profile.name);
    for kind in DocumentKind::ALL {
        let status = match state.documents.get(kind) {
            None => "not configured".to_owned(),
            Some(reference) => match embed::embed(reference) {
                Ok(doc) => format!("ok, {} bytes ({})", doc.byte_len(), reference.path().display()),
                Err(err) => err.to_string(),
            },
        };
        println!("{}: {status}", kind.slug());
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve { site, bind, port } => {
            let (state, source) = load_site(site)?;
            let rt = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .map_err(|e| AppError::Runtime(e.to_string()))?;
            rt.block_on(serve::run_serve(state, source, bind, port))
        }
        Commands::Check { site } => {
            let (state, source) = load_site(site)?;
            run_check(&state, &source);
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "fatal");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
