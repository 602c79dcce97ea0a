mod backend_bridge;
mod controller;
mod media;
mod ui;

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use client_core::{load_client_config, ClientConfig};
use crossbeam_channel::bounded;

use backend_bridge::commands::BackendCommand;
use controller::events::UiEvent;
use ui::{DesktopGuiApp, StartupConfig};

#[derive(Debug, Parser)]
#[command(name = "desktop_gui", about = "Combine two images on a remote server")]
struct Args {
    /// Base URL of the combine API, e.g. http://127.0.0.1:5001/api
    #[arg(long)]
    backend_url: Option<String>,
    #[arg(long)]
    request_timeout_secs: Option<u64>,
}

fn resolve_config(args: &Args) -> anyhow::Result<ClientConfig> {
    let mut config = load_client_config().context("failed to load client configuration")?;
    if let Some(url) = args.backend_url.as_deref() {
        config = config
            .with_base_url(url)
            .with_context(|| format!("invalid --backend-url '{url}'"))?;
    }
    if let Some(secs) = args.request_timeout_secs {
        config.request_timeout = Duration::from_secs(secs.max(1));
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let args = Args::parse();
    let config = resolve_config(&args)?;
    tracing::info!(
        endpoint = %config.combine_endpoint(),
        timeout_secs = config.request_timeout.as_secs(),
        "starting desktop client"
    );
    let startup = StartupConfig {
        endpoint: config.combine_endpoint().to_string(),
    };

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    backend_bridge::runtime::launch(config, cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Image Combiner")
            .with_inner_size([1100.0, 820.0])
            .with_min_inner_size([720.0, 560.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Image Combiner",
        options,
        Box::new(|_cc| Ok(Box::new(DesktopGuiApp::new(cmd_tx, ui_rx, startup)))),
    )
    .map_err(|err| anyhow::anyhow!("desktop window failed: {err}"))
}
