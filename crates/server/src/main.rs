use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use tracing::info;

mod api;
mod app_state;
mod combine;
mod config;

use api::build_router;
use app_state::AppState;
use config::load_settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_settings();
    tokio::fs::create_dir_all(&settings.output_dir)
        .await
        .with_context(|| {
            format!(
                "failed to create output directory '{}'",
                settings.output_dir.display()
            )
        })?;

    let state = AppState {
        output_dir: settings.output_dir.clone(),
        public_url: settings.public_url(),
        retained_requests: settings.retained_requests,
    };
    let public_url = state.public_url.clone();
    let app = build_router(Arc::new(state), settings.max_upload_bytes);

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(
        %addr,
        %public_url,
        output_dir = %settings.output_dir.display(),
        "combine server listening"
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
