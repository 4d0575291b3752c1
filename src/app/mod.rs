use std::collections::VecDeque;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use anyhow::Context as _;
use eframe::egui::{self, Context};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::api::PaperApi;
use crate::config::AppConfig;
use crate::encoding::EncodingConfig;
use crate::fetch::{DetailController, FetchContext, ForYouController, ThreadRunner};
use crate::layout::{Layout, LayoutConfig, cluster_layout};
use crate::papers::{PaperGraph, load_paper_graph};

mod graph;
mod render_utils;
mod ui;

use graph::{GraphCanvas, SurfaceRegistry};

/// Graph and positions produced by the background loader.
struct LoadedAtlas {
    graph: PaperGraph,
    layout: Layout,
    seed: u64,
}

pub struct PaperAtlasApp {
    config: AppConfig,
    fetch: FetchContext,
    surfaces: SurfaceRegistry,
    state: AppState,
}

enum AppState {
    Loading {
        rx: Receiver<Result<LoadedAtlas, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

enum Transition {
    Loaded(LoadedAtlas),
    Failed(String),
    Retry,
}

struct ViewModel {
    canvas: GraphCanvas,
    detail: DetailController,
    for_you: ForYouController,
    layout_config: LayoutConfig,
    layout_seed: u64,
    encoding: EncodingConfig,
    search: String,
    hovered: Option<String>,
    show_for_you: bool,
    show_fps_bar: bool,
    fps_current: f32,
    fps_samples: VecDeque<f32>,
}

fn draw_layout_seed() -> u64 {
    StdRng::from_entropy().r#gen()
}

fn load_atlas(dataset: Option<PathBuf>, layout: LayoutConfig, seed: u64) -> anyhow::Result<LoadedAtlas> {
    let graph = load_paper_graph(dataset.as_deref())?;
    let positions = cluster_layout(&graph, &layout, &mut StdRng::seed_from_u64(seed))
        .context("failed to lay out paper graph")?;
    tracing::info!(seed, clusters = positions.centroids().len(), "computed cluster layout");

    Ok(LoadedAtlas {
        graph,
        layout: positions,
        seed,
    })
}

impl PaperAtlasApp {
    const GRAPH_SURFACE: &'static str = "paper_graph";

    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig, api: Arc<dyn PaperApi>) -> Self {
        let fetch = FetchContext {
            api,
            tokens: config.token_source(),
            runner: Rc::new(ThreadRunner::new(cc.egui_ctx.clone())),
        };
        let state = Self::start_load(&config, &cc.egui_ctx);

        Self {
            config,
            fetch,
            surfaces: SurfaceRegistry::default(),
            state,
        }
    }

    fn spawn_load(config: &AppConfig, ctx: &Context) -> Receiver<Result<LoadedAtlas, String>> {
        let (tx, rx) = mpsc::channel();
        let dataset = config.dataset.clone();
        let layout = config.layout;
        let seed = config.layout_seed.unwrap_or_else(draw_layout_seed);
        let ctx = ctx.clone();

        thread::spawn(move || {
            let result = load_atlas(dataset, layout, seed).map_err(|error| {
                tracing::error!("failed to load paper atlas: {error:#}");
                format!("{error:#}")
            });
            let _ = tx.send(result);
            ctx.request_repaint();
        });

        rx
    }

    fn start_load(config: &AppConfig, ctx: &Context) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(config, ctx),
        }
    }

    fn ready(&self, atlas: LoadedAtlas) -> AppState {
        let canvas = GraphCanvas::mount(
            &self.surfaces,
            egui::Id::new(Self::GRAPH_SURFACE),
            Arc::new(atlas.graph),
            atlas.layout,
            self.config.encoding,
            self.config.limits,
        );

        match canvas {
            Ok(canvas) => AppState::Ready(Box::new(ViewModel::new(
                canvas,
                &self.fetch,
                &self.config,
                atlas.seed,
            ))),
            Err(error) => AppState::Error(error.to_string()),
        }
    }
}

impl eframe::App for PaperAtlasApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(Ok(atlas)) => transition = Some(Transition::Loaded(atlas)),
                    Ok(Err(error)) => transition = Some(Transition::Failed(error)),
                    Err(TryRecvError::Empty) => {}
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(Transition::Failed(
                            "Background load worker disconnected".to_owned(),
                        ));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading paper graph...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load paper graph");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Transition::Retry);
                    }
                });
            }
            AppState::Ready(model) => model.show(ctx),
        }

        match transition {
            Some(Transition::Loaded(atlas)) => self.state = self.ready(atlas),
            Some(Transition::Failed(error)) => self.state = AppState::Error(error),
            Some(Transition::Retry) => self.state = Self::start_load(&self.config, ctx),
            None => {}
        }
    }
}
