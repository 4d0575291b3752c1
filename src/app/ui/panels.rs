use std::collections::VecDeque;

use eframe::egui::{self, Align, Context, Layout};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::AppConfig;
use crate::fetch::{DetailController, FetchContext, ForYouController};
use crate::layout::cluster_layout;

use super::super::graph::{CanvasEvent, GraphCanvas};
use super::super::{ViewModel, draw_layout_seed};

impl ViewModel {
    pub(in crate::app) fn new(
        canvas: GraphCanvas,
        fetch: &FetchContext,
        config: &AppConfig,
        layout_seed: u64,
    ) -> Self {
        Self {
            detail: DetailController::new(fetch.clone()),
            for_you: ForYouController::new(fetch.clone(), config.for_you_count),
            layout_config: config.layout,
            layout_seed,
            encoding: *canvas.encoding().config(),
            canvas,
            search: String::new(),
            hovered: None,
            show_for_you: false,
            show_fps_bar: true,
            fps_current: 0.0,
            fps_samples: VecDeque::new(),
        }
    }

    pub(in crate::app) fn show(&mut self, ctx: &Context) {
        self.update_fps_counter(ctx);
        self.detail.poll();
        self.for_you.poll();
        self.canvas.set_encoding(self.encoding);

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("Paper Atlas");
                    ui.separator();
                    ui.label(format!("papers: {}", self.canvas.node_count()));
                    ui.label(format!("citations: {}", self.canvas.edge_count()));
                    ui.label(format!("layout seed: {}", self.layout_seed));
                    if ui.button("Reset view").clicked() {
                        self.canvas.reset_camera();
                    }
                    if ui.button("Re-run layout").clicked() {
                        self.rerun_layout(draw_layout_seed());
                    }
                    ui.toggle_value(&mut self.show_for_you, "For You");
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(format!("in view: {}", self.canvas.visible_count()));
                        if let Some(fps_text) = self.fps_display_text() {
                            ui.label(fps_text);
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui));

        if self.show_for_you {
            self.for_you.mount();
            egui::SidePanel::right("for_you")
                .resizable(true)
                .default_width(320.0)
                .show(ctx, |ui| self.draw_for_you(ui));
        } else if self.for_you.is_mounted() {
            self.for_you.unmount();
        }

        if self.detail.selected().is_some() {
            egui::SidePanel::right("details")
                .resizable(true)
                .default_width(360.0)
                .show(ctx, |ui| self.draw_details(ui));
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let events = self.canvas.show(ui, self.detail.selected(), &self.search);
                for event in events {
                    self.apply_canvas_event(event);
                }
            });
    }

    fn apply_canvas_event(&mut self, event: CanvasEvent) {
        match event {
            CanvasEvent::Hovered(id) => self.hovered = id,
            CanvasEvent::Selected(id) => self.detail.select(id),
            CanvasEvent::Cleared => self.detail.close(),
        }
    }

    pub(in crate::app) fn rerun_layout(&mut self, seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        match cluster_layout(self.canvas.graph(), &self.layout_config, &mut rng) {
            Ok(layout) => {
                tracing::info!(seed, "re-ran cluster layout");
                self.layout_seed = seed;
                self.canvas.replace_layout(layout);
                self.canvas.reset_camera();
            }
            Err(error) => tracing::warn!(seed, error = %error, "layout failed; keeping previous positions"),
        }
    }
}
