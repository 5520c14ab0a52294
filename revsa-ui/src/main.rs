//! revsa-ui - review sentiment analyzer client
//!
//! `revsa-ui <URL>` analyzes one product page and exits non-zero on failure.
//! Without a URL it reads one URL per line from stdin until EOF or `quit`.

use anyhow::{Context, Result};
use clap::Parser;
use revsa_common::config::load_config;
use revsa_common::{AnalysisRequest, HttpClassifier, ValidationMode};
use revsa_ui::{render_state, JsonReport, Orchestrator, RequestState};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};

/// Command-line arguments for revsa-ui
#[derive(Parser, Debug)]
#[command(name = "revsa-ui")]
#[command(about = "Analyze the sentiment of product reviews")]
#[command(version)]
struct Args {
    /// Product page URL; omit for interactive mode
    url: Option<String>,

    /// Config file (TOML)
    #[arg(short, long, env = "REVSA_CONFIG")]
    config: Option<PathBuf>,

    /// Classifier predict URL
    #[arg(short, long, env = "REVSA_CLASSIFIER_URL")]
    endpoint: Option<String>,

    /// Classifier request timeout in seconds
    #[arg(long, env = "REVSA_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Response validation: strict or minimal
    #[arg(long, env = "REVSA_VALIDATION", value_parser = parse_validation_mode)]
    validation: Option<ValidationMode>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

fn parse_validation_mode(s: &str) -> Result<ValidationMode, String> {
    match s.to_ascii_lowercase().as_str() {
        "strict" => Ok(ValidationMode::Strict),
        "minimal" => Ok(ValidationMode::Minimal),
        other => Err(format!("unknown validation mode '{}' (expected strict or minimal)", other)),
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref()).context("Failed to load configuration")?;

    // stdout carries results only
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.clone().into()),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting revsa-ui v{}", env!("CARGO_PKG_VERSION"));

    let settings = config.classifier;
    let endpoint = args.endpoint.unwrap_or(settings.endpoint);
    let timeout = Duration::from_secs(args.timeout_secs.unwrap_or(settings.timeout_secs));
    let validation = args.validation.unwrap_or(settings.validation);

    let classifier = HttpClassifier::new(endpoint, timeout).context("Failed to build classifier client")?;
    info!(endpoint = %classifier.endpoint(), timeout = ?timeout, validation = ?validation, "Classifier client ready");

    let orchestrator = Arc::new(Orchestrator::new(Arc::new(classifier), validation, timeout));
    tokio::spawn(cancel_on_ctrl_c(orchestrator.clone()));

    match args.url {
        Some(url) => {
            let state = analyze(&orchestrator, &url).await?;
            print_state(&state, args.json)?;
            Ok(match state {
                RequestState::Success(_) => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            })
        }
        None => {
            interactive(&orchestrator, args.json).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Validate the URL locally, then run it through the orchestrator
async fn analyze(orchestrator: &Orchestrator, url: &str) -> Result<RequestState> {
    let request = AnalysisRequest::new(url)?;
    Ok(orchestrator.submit(request).await?)
}

async fn interactive(orchestrator: &Orchestrator, json: bool) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"Product URL> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.eq_ignore_ascii_case("quit") {
            break;
        }
        if line.is_empty() {
            continue;
        }

        match analyze(orchestrator, line).await {
            Ok(state) => print_state(&state, json)?,
            Err(e) => eprintln!("{}", e),
        }
    }

    Ok(())
}

fn print_state(state: &RequestState, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&JsonReport::from_state(state))?);
    } else {
        print!("{}", render_state(state));
    }
    Ok(())
}

/// Ctrl+C cancels the pending analysis instead of killing the process
async fn cancel_on_ctrl_c(orchestrator: Arc<Orchestrator>) {
    loop {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        if !orchestrator.cancel() {
            info!("Interrupted");
            std::process::exit(130);
        }
    }
}
