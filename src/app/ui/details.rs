use eframe::egui::{self, RichText, Ui};

use crate::fetch::FetchState;
use crate::util::{format_count, truncate_label};

use super::super::ViewModel;

const NEIGHBOR_ROWS: usize = 12;

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        let Some(selected_id) = self.detail.selected().map(str::to_owned) else {
            return;
        };

        ui.horizontal(|ui| {
            ui.heading("Paper Details");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Close").clicked() {
                    self.detail.close();
                }
            });
        });
        ui.small(selected_id.as_str());
        ui.add_space(6.0);

        self.draw_local_paper(ui, &selected_id);
        ui.separator();

        let mut retry = false;
        let mut open_link = None;
        match self.detail.state() {
            FetchState::Idle => {}
            FetchState::Loading => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Loading paper details...");
                });
            }
            FetchState::Failure(error) => {
                ui.colored_label(ui.visuals().error_fg_color, error.user_message());
                if error.is_retryable() {
                    retry = ui.button("Retry").clicked();
                }
            }
            FetchState::Success(detail) => {
                ui.label(
                    RichText::new(detail.title.as_deref().unwrap_or("Untitled paper")).strong(),
                );
                ui.add_space(4.0);

                match detail.abstract_text.as_deref() {
                    Some(text) => {
                        egui::ScrollArea::vertical()
                            .id_salt("abstract_scroll")
                            .max_height(320.0)
                            .show(ui, |ui| ui.label(text));
                    }
                    None => {
                        ui.weak("No abstract available.");
                    }
                }

                ui.add_space(6.0);
                if detail.link.is_some() && ui.button("Open paper").clicked() {
                    open_link = self.detail.follow_link();
                }
            }
        }

        if retry {
            self.detail.retry();
        }
        if let Some(url) = open_link {
            ui.ctx().open_url(egui::OpenUrl::new_tab(url));
        }
    }

    /// What the local dataset knows about the paper, shown while the remote
    /// detail loads.
    fn draw_local_paper(&self, ui: &mut Ui, id: &str) {
        let graph = self.canvas.graph();
        let Some(node) = graph.node(id) else {
            ui.weak("Not part of the loaded graph.");
            return;
        };

        ui.label(RichText::new(node.label.as_str()).strong());
        if let Some(authors) = &node.authors {
            ui.label(authors.as_str());
        }
        ui.label(format!(
            "Year: {}",
            node.year
                .map(|year| year.to_string())
                .unwrap_or_else(|| "unknown".to_owned())
        ));
        ui.label(format!("Citations: {}", format_count(node.citations)));
        ui.label(format!("Importance: {:.2}", node.importance));
        ui.label(format!("Cluster: {}", node.cluster_key));

        let references = graph.references_of(id);
        let cited_by = graph.cited_by(id);
        ui.add_space(4.0);
        ui.label(RichText::new(format!("References in graph ({})", references.len())).strong());
        for other in references.iter().take(NEIGHBOR_ROWS) {
            if let Some(other) = graph.node(other) {
                ui.small(truncate_label(&other.label, 60));
            }
        }
        ui.label(RichText::new(format!("Cited by in graph ({})", cited_by.len())).strong());
        for other in cited_by.iter().take(NEIGHBOR_ROWS) {
            if let Some(other) = graph.node(other) {
                ui.small(truncate_label(&other.label, 60));
            }
        }
    }
}
