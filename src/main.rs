use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::sync::mpsc::{self, Receiver};
use tracing::{debug, info};

use lightclick::config as cfg;
use lightclick::dispatch::Dispatcher;
use lightclick::discovery;
use lightclick::light::{DryRunLightService, LifxHttpClient, LightService, http};
use lightclick::sources::{self, ButtonEvent};

/// Lightclick CLI
#[derive(Debug, Parser)]
#[command(
    name = lightclick::PKG_NAME,
    version = lightclick::PKG_VERSION,
    about = "Maps physical button presses to smart-light actions declared in a config file"
)]
struct Args {
    /// Path to the button actions config file
    #[arg(default_value = "button_actions.cfg")]
    config: PathBuf,

    /// Run in config mode: print light data and button addresses to help
    /// write the config file
    #[arg(short = 'C', long = "config-mode")]
    config_mode: bool,

    /// Log light commands instead of calling the API
    #[arg(long = "dry-run")]
    dry_run: bool,

    /// Accept button events as newline-delimited JSON over TCP at this
    /// address instead of reading stdin
    #[arg(long = "listen")]
    listen: Option<String>,

    /// Base URL of the light API
    #[arg(long = "api-url", default_value = http::DEFAULT_BASE_URL)]
    api_url: String,

    /// Set log level (e.g., trace, debug, info, warn, error). Overrides RUST_LOG.
    #[arg(long = "log-level")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Honor --log-level by initializing the subscriber directly.
    if let Some(level) = &args.log_level {
        let level = match level.to_lowercase().as_str() {
            "trace" => tracing::Level::TRACE,
            "debug" => tracing::Level::DEBUG,
            "info" => tracing::Level::INFO,
            "warn" | "warning" => tracing::Level::WARN,
            "error" => tracing::Level::ERROR,
            _ => tracing::Level::INFO,
        };
        let _ = tracing_subscriber::fmt().with_max_level(level).try_init();
    }
    if args.log_level.is_none() {
        lightclick::init_tracing();
    }

    info!(
        version = lightclick::PKG_VERSION,
        config = %args.config.display(),
        config_mode = args.config_mode,
        dry_run = args.dry_run,
        "Starting Lightclick"
    );

    // Channel for events produced by the button source
    let (tx, rx) = mpsc::channel::<ButtonEvent>(256);
    let source = sources::build_source(args.listen.as_deref());
    let _handle = sources::spawn_source(source.as_ref(), tx);

    if args.config_mode {
        // Config mode never touches the config file.
        if args.dry_run {
            run_discovery(&DryRunLightService::new(), rx).await;
        } else {
            run_discovery(&light_client(&args)?, rx).await;
        }
        return Ok(());
    }

    // Normal mode: a missing or section-less config is fatal.
    let config = cfg::load_from_path(&args.config)?;
    debug!(
        target: "lightclick",
        actions = config.actions.len(),
        buttons = config.buttons.len(),
        states = config.states.len(),
        "Configuration loaded"
    );

    println!("Now listening for button events. Press a button to test it out!");
    if args.dry_run {
        run_dispatch(Dispatcher::new(config, DryRunLightService::new()), rx).await;
    } else {
        run_dispatch(Dispatcher::new(config, light_client(&args)?), rx).await;
    }

    info!("Lightclick exited");
    Ok(())
}

/// Build the HTTP light client. The API token is threaded in explicitly
/// rather than read ambiently by the client itself.
fn light_client(args: &Args) -> anyhow::Result<LifxHttpClient> {
    let token = std::env::var("LIFX_TOKEN")
        .context("LIFX_TOKEN environment variable is not set (or pass --dry-run)")?;
    Ok(LifxHttpClient::new(&args.api_url, token))
}

/// Main loop: handle button events serially until the source ends or Ctrl+C.
async fn run_dispatch<S: LightService>(dispatcher: Dispatcher<S>, mut rx: Receiver<ButtonEvent>) {
    tokio::select! {
        _ = async {
            while let Some(event) = rx.recv().await {
                dispatcher.handle_event(&event).await;
            }
        } => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }
}

async fn run_discovery<S: LightService>(service: &S, mut rx: Receiver<ButtonEvent>) {
    tokio::select! {
        _ = discovery::run(service, &mut rx) => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }
}
