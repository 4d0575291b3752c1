use eframe::egui::{self, RichText, Ui};

use crate::fetch::FetchState;
use crate::util::truncate_label;

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_for_you(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.heading("For You");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let loading = self.for_you.state().is_loading();
                if ui.add_enabled(!loading, egui::Button::new("Refresh")).clicked() {
                    self.for_you.refresh();
                }
            });
        });
        ui.add_space(6.0);

        let mut picked = None;
        let mut retry = false;
        match self.for_you.state() {
            FetchState::Idle => {}
            FetchState::Loading => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Loading recommendations...");
                });
            }
            FetchState::Failure(error) => {
                ui.colored_label(ui.visuals().error_fg_color, "Failed to load recommendations");
                ui.small(error.to_string());
                retry = ui.button("Retry").clicked();
            }
            FetchState::Success(papers) if papers.is_empty() => {
                ui.weak("No recommendations yet");
            }
            FetchState::Success(papers) => {
                let selected = self.detail.selected();
                egui::ScrollArea::vertical()
                    .id_salt("for_you_scroll")
                    .auto_shrink([false, false])
                    .show_rows(ui, 22.0, papers.len(), |ui, rows| {
                        for paper in &papers[rows] {
                            let title = if paper.title.trim().is_empty() {
                                paper.id.as_str()
                            } else {
                                paper.title.as_str()
                            };
                            let mut text = RichText::new(truncate_label(title, 56));
                            if selected == Some(paper.id.as_str()) {
                                text = text.strong();
                            }

                            let response = ui.link(text);
                            let response = match paper.score {
                                Some(score) => response.on_hover_text(format!("score {score:.3}")),
                                None => response,
                            };
                            if response.clicked() {
                                picked = Some(paper.id.clone());
                            }
                        }
                    });
            }
        }

        if retry {
            self.for_you.refresh();
        }
        if let Some(id) = picked {
            self.for_you.select(&id, &mut self.detail);
        }
    }
}
