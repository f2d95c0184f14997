//! Stock analysis CLI
//!
//! # Usage
//!
//! ```bash
//! export GROQ_API_KEY=... FINNHUB_API_KEY=... NEWS_API_KEY=...
//! stockwise "Compare Tesla and Microsoft"
//! stockwise --json --days 30 "How is NVDA doing?"
//! ```

use anyhow::Context as _;
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use stockwise::{FormatterFactory, OutputFormat, StockConfig, StockError, StockPipeline};
use stockwise_core::{CancellationSource, Context};
use stockwise_utils::{LogFormat, init_tracing_with};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "stockwise")]
#[command(about = "Analyze the stocks named in a question", long_about = None)]
struct Args {
    /// Question naming one or more companies or tickers
    #[arg(required = true)]
    query: Vec<String>,

    /// Days of daily history to fetch
    #[arg(long)]
    days: Option<u32>,

    /// Timeout for each outbound call, in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Print the run as JSON
    #[arg(long)]
    json: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

fn load_config(args: &Args) -> anyhow::Result<StockConfig> {
    let mut config =
        StockConfig::from_env().context("Failed to read configuration from the environment")?;
    if let Some(days) = args.days {
        config.history_days = days;
    }
    if let Some(secs) = args.timeout_secs {
        config.request_timeout = Duration::from_secs(secs);
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    init_tracing_with(if args.log_json {
        LogFormat::Json
    } else {
        LogFormat::Text
    });

    let formatter = FormatterFactory::create(if args.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    });

    let config = load_config(&args)?;
    let pipeline = StockPipeline::from_config(Arc::new(config))
        .context("Failed to initialize the analysis pipeline")?;

    let query = args.query.join(" ");
    let request_id = uuid::Uuid::new_v4().to_string();
    let cancel = CancellationSource::new();
    let ctx = Context::new()
        .with_request_id(request_id.clone())
        .with_cancellation(cancel.token());

    info!(%request_id, %query, "Starting analysis");

    let run = pipeline.run(&query, &ctx);
    tokio::pin!(run);

    let result = loop {
        tokio::select! {
            result = &mut run => break result,
            signal = tokio::signal::ctrl_c(), if !cancel.is_cancelled() => {
                if let Err(e) = signal {
                    warn!(error = %e, "Could not listen for Ctrl-C");
                }
                warn!("Interrupted, cancelling outstanding calls");
                cancel.cancel();
            }
        }
    };

    match result {
        Ok(run) => {
            let text = formatter
                .format_run(&run)
                .context("Failed to render the analysis")?;
            println!("{text}");
            Ok(ExitCode::SUCCESS)
        }
        Err(e @ StockError::NoTickers(_)) => {
            eprintln!("{}", formatter.format_error(&e));
            eprintln!("No stock ticker could be identified. Try naming the company or its symbol.");
            Ok(ExitCode::FAILURE)
        }
        Err(e) => {
            eprintln!("{}", formatter.format_error(&e));
            Ok(ExitCode::FAILURE)
        }
    }
}
