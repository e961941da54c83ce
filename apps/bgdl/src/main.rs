//! bgdl - Background download session adapter
//!
//! Command line front end: `fetch` drives a single download through the
//! session, `serve` exposes the callback bridge over JSON lines.

mod cli;
mod display;
mod error;
mod events;
mod logging;
mod serve;

use crate::cli::{Cli, Commands};
use crate::display::ProgressRenderer;
use crate::error::CliError;
use crate::events::EventHandler;
use bgdl_config::Config;
use bgdl_events::{EventReceiver, TransferEvent};
use bgdl_host::AppStorageResolver;
use bgdl_net::HttpTransferService;
use bgdl_session::{Bridge, DownloadSession, SessionBuilder, StartRequest, UriMatcher};
use clap::Parser;
use std::future::Future;
use std::path::Path;
use std::process;
use std::sync::Arc;
use tokio::select;
use tracing::{error, info};
use url::Url;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    // Configuration decides where debug logs go, so it loads first
    let config = match load_config(&cli).await {
        Ok(config) => config,
        Err(e) => {
            if !json_mode {
                eprintln!("Error: {e}");
            }
            process::exit(1);
        }
    };

    init_tracing(json_mode, cli.global.debug, &config.logs_path());

    if let Err(e) = run(cli, config).await {
        error!("Application error: {}", e);
        if !json_mode {
            eprintln!("Error: {e}");
        }
        process::exit(1);
    }
}

/// Load configuration with precedence file < environment < CLI flags
async fn load_config(cli: &Cli) -> Result<Config, CliError> {
    let mut config = Config::load_or_default(cli.global.config.as_deref()).await?;
    config.merge_env()?;
    apply_cli_config(&mut config, &cli.global);
    Ok(config)
}

fn apply_cli_config(config: &mut Config, global: &cli::GlobalArgs) {
    if let Some(app_data) = &global.app_data {
        config.paths.app_data = Some(app_data.clone());
    }
}

/// Main application logic
async fn run(cli: Cli, config: Config) -> Result<(), CliError> {
    info!("Starting bgdl v{}", env!("CARGO_PKG_VERSION"));

    let (event_sender, event_receiver) = bgdl_events::channel();
    let service = Arc::new(HttpTransferService::from_config(&config)?);
    let resolver = Arc::new(AppStorageResolver::new(config.app_data_path()));
    let uri_matcher = UriMatcher::from_option(config.session.uri_matcher.as_deref())?;

    let session = SessionBuilder::new(service, resolver)
        .event_sender(event_sender)
        .uri_matcher(uri_matcher)
        .build()
        .await?;
    let session = Arc::new(session);

    let colors_enabled = console::Term::stderr().features().colors_supported();
    let event_handler = EventHandler::new(colors_enabled, cli.global.json);

    match cli.command {
        Commands::Fetch {
            source,
            dest,
            user_agent,
            headers,
            uri_matcher,
        } => {
            let mut request = StartRequest::new(source, destination_uri(&dest)?);
            request.user_agent = user_agent;
            request.headers = headers;
            request.uri_matcher = uri_matcher
                .as_deref()
                .map(UriMatcher::pattern)
                .transpose()?;

            let renderer = ProgressRenderer::new(cli.global.json, colors_enabled);
            with_events(
                fetch(&session, request, &renderer),
                event_receiver,
                &event_handler,
            )
            .await?;
        }
        Commands::Serve => {
            let bridge = Bridge::new(Arc::clone(&session));
            with_events(serve::serve(bridge), event_receiver, &event_handler).await?;
        }
    }

    info!("Command completed successfully");
    Ok(())
}

/// Drive `command` while handling session events as they arrive
async fn with_events<F>(
    command: F,
    mut event_receiver: EventReceiver,
    event_handler: &EventHandler,
) -> Result<(), CliError>
where
    F: Future<Output = Result<(), CliError>>,
{
    let mut command = Box::pin(command);

    loop {
        select! {
            result = &mut command => {
                // Drain any remaining events
                while let Ok(event) = event_receiver.try_recv() {
                    event_handler.handle_event(&event);
                }
                return result;
            }

            event = event_receiver.recv() => {
                if let Some(event) = event {
                    event_handler.handle_event(&event);
                }
            }
        }
    }
}

/// Start one download and render it until it ends; Ctrl-C stops it
async fn fetch(
    session: &DownloadSession,
    request: StartRequest,
    renderer: &ProgressRenderer,
) -> Result<(), CliError> {
    let source = request.source_uri.clone();
    let destination = request.destination_uri.clone();
    let mut stream = session.start(request).await;
    let mut stopping = false;

    loop {
        select! {
            event = stream.next_event() => match event {
                Some(TransferEvent::Progress(progress)) => renderer.progress(&progress)?,
                Some(TransferEvent::Completed) => {
                    renderer.completed(&source, &destination)?;
                    return Ok(());
                }
                Some(TransferEvent::Failed { error, .. }) => {
                    renderer.interrupt()?;
                    return Err(error.into());
                }
                None => {
                    return Err(bgdl_errors::Error::internal("download ended without a result").into());
                }
            },

            _ = tokio::signal::ctrl_c(), if !stopping => {
                stopping = true;
                info!(uri = %source, "interrupted, stopping download");
                session.stop(&source).await?;
            }
        }
    }
}

/// Accept URIs as given and turn plain paths into `file://` URIs
fn destination_uri(dest: &str) -> Result<String, CliError> {
    if dest.contains("://") || dest.starts_with("app-data:") || dest.starts_with("file:") {
        return Ok(dest.to_string());
    }

    let path = Path::new(dest);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    Url::from_file_path(&absolute)
        .map(String::from)
        .map_err(|()| {
            CliError::InvalidArguments(format!("cannot use {} as a destination", absolute.display()))
        })
}

/// Initialize tracing/logging
fn init_tracing(json_mode: bool, debug_enabled_flag: bool, log_dir: &Path) {
    // Check if debug logging is enabled
    let debug_enabled = std::env::var("RUST_LOG").is_ok() || debug_enabled_flag;
    let debug_filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,bgdl=debug"))
    };

    if debug_enabled {
        // Debug mode: structured JSON logs to file
        if let Err(e) = std::fs::create_dir_all(log_dir) {
            if !json_mode {
                eprintln!("Warning: Failed to create log directory: {e}");
            }
        }

        let log_file = log_dir.join(format!(
            "bgdl-{}.log",
            chrono::Utc::now().format("%Y%m%d-%H%M%S")
        ));

        match std::fs::File::create(&log_file) {
            Ok(file) => {
                tracing_subscriber::fmt()
                    .json()
                    .with_writer(file)
                    .with_env_filter(debug_filter())
                    .init();

                if !json_mode {
                    eprintln!("Debug logging enabled: {}", log_file.display());
                }
                return;
            }
            Err(e) => {
                if !json_mode {
                    eprintln!("Warning: Failed to create log file: {e}");
                }
            }
        }
    }

    if json_mode {
        // JSON mode: suppress all console output to avoid contaminating JSON
        tracing_subscriber::fmt()
            .with_writer(std::io::sink)
            .with_env_filter("off")
            .init();
    } else {
        // Normal mode: minimal logging to stderr
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .init();
    }
}
