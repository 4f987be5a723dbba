// src/main.rs
// vibescore - conversation vibe analysis service

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use vibescore::config::log_level_from_env;
use vibescore::pipeline::{AnalysisRequest, VibePipeline};
use vibescore::{VibeConfig, web};

/// Rate-limit key for one-shot CLI analyses
const CLI_CLIENT_KEY: &str = "cli";

#[derive(Parser)]
#[command(name = "vibescore")]
#[command(about = "Score the vibe of a conversation")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API (default)
    Serve {
        /// Interface to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Analyze one conversation and print the report as JSON
    Analyze {
        /// File holding the conversation text (default: stdin)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

async fn run_server(
    mut config: VibeConfig,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }

    let pipeline = VibePipeline::from_config(&config)?;
    let mode = if pipeline.is_live() { "live" } else { "mock" };
    info!(
        mode,
        rate_limit = config.rate_limit,
        window_secs = config.rate_window_secs,
        "Pipeline ready"
    );

    let app = web::create_router(web::AppState::new(pipeline));

    let bind_address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {}", bind_address))?;
    info!("vibescore listening on http://{}", bind_address);

    // ConnectInfo supplies the peer address used as a fallback rate-limit key
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}

async fn run_analyze(config: VibeConfig, file: Option<PathBuf>) -> Result<()> {
    let text = match file {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };

    let pipeline = VibePipeline::from_config(&config)?;
    let analysis = pipeline
        .analyze(AnalysisRequest::new(text, CLI_CLIENT_KEY))
        .await?;

    info!(source = analysis.source.as_str(), "Analysis complete");
    println!("{}", serde_json::to_string_pretty(&analysis.report)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Logs go to stderr so `analyze` output stays pipeable
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level_from_env())
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = VibeConfig::from_env();
    config.log_status();

    match cli.command {
        Some(Commands::Serve { host, port }) => run_server(config, host, port).await,
        None => run_server(config, None, None).await,
        Some(Commands::Analyze { file }) => run_analyze(config, file).await,
    }
}
