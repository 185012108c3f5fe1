//! Presentation adapter for the built-in treatment crew.
//!
//! One zero-argument run action: execute the crew, print the final
//! treatment, and export it byte-identical to a plain-text file. Failures
//! are reported with the failing stage's role and cause; the process
//! never panics on them.

#![forbid(unsafe_code)]

use anyhow::Context as _;
use clap::Parser;
use crewline::prelude::*;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "crewline", version, about = "Generate a brand treatment with the built-in crew")]
struct Cli {
    /// Bearer token for the completion gateway.
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Completion gateway base address.
    #[arg(long, env = "CREWLINE_BASE_URL", default_value = crewline::completion::DEFAULT_BASE_URL)]
    base_url: String,

    /// Target model identifier.
    #[arg(long, env = "CREWLINE_MODEL", default_value = crewline::completion::DEFAULT_MODEL)]
    model: String,

    /// Where to write the exported treatment.
    #[arg(long, default_value = crew::EXPORT_FILENAME)]
    out: PathBuf,

    /// Skip live search grounding and use the built-in fallback framing.
    #[arg(long)]
    offline: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let api_key = cli
        .api_key
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| PreconditionError::new("OPENROUTER_API_KEY"))?;

    let config = CompletionConfig::new(api_key.trim())
        .with_base_url(cli.base_url)
        .with_model(cli.model);
    let client = Arc::new(HttpCompletionClient::new(config)?);

    let lookup: Arc<dyn InsightLookup> = if cli.offline {
        Arc::new(StaticLookup::new("offline", crew::LOOKUP_FALLBACK))
    } else {
        Arc::new(InsightScout::new(crew::LOOKUP_FALLBACK))
    };

    let pipeline = crew::treatment_builder(lookup)
        .observer(Arc::new(LoggingObserver))
        .build(client)?;

    let result = pipeline.execute().await?;

    println!("{}", result.final_text);

    result
        .export_to(&cli.out)
        .with_context(|| format!("writing export to {}", cli.out.display()))?;
    tracing::info!(path = %cli.out.display(), bytes = result.final_text.len(), "treatment exported");

    Ok(())
}
