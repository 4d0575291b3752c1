mod api;
mod app;
mod camera;
mod config;
mod encoding;
mod fetch;
mod layout;
mod papers;
mod util;

use std::sync::Arc;

use anyhow::anyhow;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::api::HttpPaperApi;
use crate::config::Args;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&args.log_filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = args.into_config()?;
    tracing::info!(
        api = %config.api_url,
        dataset = ?config.dataset,
        seed = ?config.layout_seed,
        "starting paper atlas"
    );

    let api = Arc::new(HttpPaperApi::new(config.api_url.as_str(), config.request_timeout)?);
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Paper Atlas",
        options,
        Box::new(move |cc| Ok(Box::new(app::PaperAtlasApp::new(cc, config, api)))),
    )
    .map_err(|error| anyhow!("failed to run the viewer: {error}"))
}
