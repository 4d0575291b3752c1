use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail, ensure};
use clap::Parser;
use reqwest::Url;

use crate::api::{StaticToken, TokenFile, TokenSource};
use crate::camera::CameraLimits;
use crate::encoding::EncodingConfig;
use crate::fetch::DEFAULT_FOR_YOU_COUNT;
use crate::layout::LayoutConfig;

#[derive(Clone, Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Paper dataset (JSON with `papers` and `citations`). Uses the bundled
    /// sample when omitted.
    #[arg(long, env = "PAPER_ATLAS_DATASET")]
    pub dataset: Option<PathBuf>,

    #[arg(long, env = "PAPER_ATLAS_API_URL", default_value = "http://localhost:8000")]
    pub api_url: String,

    #[arg(long, env = "PAPER_ATLAS_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// File holding the access token; read on every request.
    #[arg(long, env = "PAPER_ATLAS_API_TOKEN_FILE", conflicts_with = "api_token")]
    pub api_token_file: Option<PathBuf>,

    #[arg(long, env = "PAPER_ATLAS_REQUEST_TIMEOUT_SECS", default_value_t = 10)]
    pub request_timeout_secs: u64,

    #[arg(long, env = "PAPER_ATLAS_FOR_YOU_COUNT", default_value_t = DEFAULT_FOR_YOU_COUNT)]
    pub for_you_count: usize,

    /// Fixed layout seed. A fresh seed is drawn from the OS when omitted.
    #[arg(long, env = "PAPER_ATLAS_LAYOUT_SEED")]
    pub layout_seed: Option<u64>,

    #[arg(long, default_value_t = 500.0)]
    pub base_radius: f32,

    #[arg(long, default_value_t = 200.0)]
    pub cluster_spread: f32,

    #[arg(long, default_value_t = 0.1)]
    pub min_zoom: f32,

    #[arg(long, default_value_t = 10.0)]
    pub max_zoom: f32,

    #[arg(long, default_value_t = 1.5)]
    pub label_zoom_threshold: f32,

    #[arg(long, env = "RUST_LOG", default_value = "info,paper_atlas=debug")]
    pub log_filter: String,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub dataset: Option<PathBuf>,
    pub api_url: Url,
    pub api_token: Option<String>,
    pub api_token_file: Option<PathBuf>,
    pub request_timeout: Duration,
    pub for_you_count: usize,
    pub layout_seed: Option<u64>,
    pub layout: LayoutConfig,
    pub limits: CameraLimits,
    pub encoding: EncodingConfig,
}

impl Args {
    pub fn into_config(self) -> Result<AppConfig> {
        let api_url = Url::parse(&self.api_url)
            .with_context(|| format!("invalid --api-url {:?}", self.api_url))?;
        if !matches!(api_url.scheme(), "http" | "https") {
            bail!("--api-url must use http or https, got {}", api_url.scheme());
        }

        ensure!(self.request_timeout_secs > 0, "--request-timeout-secs must be positive");
        ensure!(self.for_you_count > 0, "--for-you-count must be positive");

        ensure!(
            self.min_zoom.is_finite() && self.min_zoom > 0.0,
            "--min-zoom must be a positive number"
        );
        ensure!(
            self.max_zoom.is_finite() && self.max_zoom >= self.min_zoom,
            "--max-zoom must be at least --min-zoom"
        );
        ensure!(
            self.label_zoom_threshold.is_finite(),
            "--label-zoom-threshold must be a number"
        );

        let layout = LayoutConfig {
            base_radius: self.base_radius,
            cluster_spread: self.cluster_spread,
            ..LayoutConfig::default()
        };
        layout.validate().context("invalid layout settings")?;

        Ok(AppConfig {
            dataset: self.dataset,
            api_url,
            api_token: self.api_token,
            api_token_file: self.api_token_file,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            for_you_count: self.for_you_count,
            layout_seed: self.layout_seed,
            layout,
            limits: CameraLimits {
                min_zoom: self.min_zoom,
                max_zoom: self.max_zoom,
            },
            encoding: EncodingConfig {
                label_zoom_threshold: self.label_zoom_threshold,
                ..EncodingConfig::default()
            },
        })
    }
}

impl AppConfig {
    /// Token file wins over an inline token; neither means anonymous requests.
    pub fn token_source(&self) -> Arc<dyn TokenSource> {
        match &self.api_token_file {
            Some(path) => Arc::new(TokenFile(path.clone())),
            None => Arc::new(StaticToken(self.api_token.clone())),
        }
    }
}
