mod analysis_client;
mod config;
mod errors;
mod models;
mod navigation;
mod results;
mod upload;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis_client::HttpAnalysisService;
use crate::config::Config;
use crate::models::FilePicker;
use crate::navigation::ChannelNavigator;
use crate::results::{ResultBoard, Style};
use crate::upload::{NarrationStage, SubmissionOutcome, SubmitStatus, UploadSession};

/// Command-line arguments for predictor
#[derive(Parser, Debug)]
#[command(name = "predictor")]
#[command(about = "Upload a resume and see how it fits each company role")]
#[command(version)]
struct Args {
    /// Resume to analyze (.pdf or .docx)
    file: PathBuf,

    /// Analysis service endpoint; overrides ANALYSIS_SERVICE_URL
    #[arg(long)]
    endpoint: Option<String>,

    /// Declared MIME type to send instead of the one implied by the extension
    #[arg(long)]
    content_type: Option<String>,

    /// Show every card expanded
    #[arg(long)]
    details: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::from_env(args.endpoint.clone())?;

    // Logs go to stderr; stdout carries the rendered results
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting predictor v{}", env!("CARGO_PKG_VERSION"));
    info!("Analysis service: {}", config.analysis_service_url);

    let service = Arc::new(HttpAnalysisService::new(
        config.analysis_service_url.clone(),
        config.analysis_timeout,
    )?);
    let (navigator, mut results_rx) = ChannelNavigator::new();
    let session = UploadSession::new(service, Arc::new(navigator));

    let file = FilePicker::with_content_type(args.content_type.clone())
        .pick(&args.file)
        .await?;
    eprintln!("📄 {} ({})", file.name, file.size_label());

    if let Err(err) = session.select_file(file) {
        bail!(err.user_message());
    }

    let mut narration = session.narration();
    let handle = match session.submit() {
        Ok(SubmitStatus::Started(handle)) => handle,
        Ok(SubmitStatus::AlreadyInFlight(_)) => bail!("A submission is already in flight"),
        Err(err) => bail!(err.user_message()),
    };

    eprintln!("Analyzing your resume. This may take up to a minute...");
    let finished = handle.finished();
    tokio::pin!(finished);

    let outcome = loop {
        tokio::select! {
            outcome = &mut finished => break outcome,
            Ok(()) = narration.changed() => {
                if let Some(stage) = *narration.borrow_and_update() {
                    print_stage(stage);
                }
            }
        }
    };

    match outcome {
        Some(SubmissionOutcome::Success(_)) => {
            let Some(result) = results_rx.recv().await else {
                bail!("The results view was never handed a payload");
            };
            let mut board = ResultBoard::new(result);
            if args.details {
                board.expand_all();
            }
            let style = if std::io::stdout().is_terminal() {
                Style::Ansi
            } else {
                Style::Plain
            };
            print!("{}", board.render(style));
            Ok(())
        }
        Some(SubmissionOutcome::Failure(message)) => bail!(message),
        Some(SubmissionOutcome::Pending) | None => bail!("The analysis did not complete"),
    }
}

fn print_stage(stage: NarrationStage) {
    const WIDTH: usize = 28;
    let filled = (stage.progress() * WIDTH as f64).round() as usize;
    eprintln!(
        "[{}{}] {:>3}%  {}",
        "=".repeat(filled),
        " ".repeat(WIDTH - filled),
        stage.percent(),
        stage.message()
    );
}
