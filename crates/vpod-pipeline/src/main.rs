//! Analysis pipeline binary.

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vpod_models::ViewMode;
use vpod_pipeline::{render_report, Pipeline, PipelineConfig};

fn print_usage() {
    eprintln!("Usage: vpod-pipeline <url> [--view creative|technical]");
}

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("vpod=info".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    let mut url = None;
    let mut view: Option<ViewMode> = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--view" => match args.next().map(|v| v.parse()) {
                Some(Ok(mode)) => view = Some(mode),
                _ => {
                    print_usage();
                    std::process::exit(2);
                }
            },
            _ if url.is_none() => url = Some(arg),
            _ => {
                print_usage();
                std::process::exit(2);
            }
        }
    }
    let Some(url) = url else {
        print_usage();
        std::process::exit(2);
    };

    let mut config = PipelineConfig::from_env();
    match config.resolve_api_key() {
        Some(key) => config.gemini.api_key = key,
        None => {
            error!("No API credential found (secret store, GEMINI_API_KEY, or prompt)");
            std::process::exit(1);
        }
    }

    let pipeline = match Pipeline::new(config) {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to create pipeline: {}", e);
            std::process::exit(1);
        }
    };

    info!(url = url.as_str(), "Starting analysis pipeline");

    let report = match pipeline.run_url(&url).await {
        Ok(report) => report,
        Err(e) => {
            error!("Execution halted: {}", e);
            std::process::exit(1);
        }
    };

    println!("{}", render_report(&report, view));
}
