use eframe::egui::{self, RichText, Ui};

use crate::encoding::{ColorMode, SizeMode};
use crate::util::truncate_label;

use super::super::ViewModel;

const LEGEND_SWATCH: f32 = 12.0;

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Controls");
        ui.add_space(6.0);

        ui.label(RichText::new("Search").strong());
        ui.horizontal(|ui| {
            ui.add(
                egui::TextEdit::singleline(&mut self.search)
                    .hint_text("Fuzzy match on titles")
                    .desired_width(200.0),
            );
            if ui.small_button("Clear").clicked() {
                self.search.clear();
            }
        });
        if let Some(matches) = self.canvas.search_matches(&self.search) {
            ui.small(format!("{} matching papers", matches.len()));
        }

        ui.separator();
        ui.label(RichText::new("Encoding").strong());

        egui::ComboBox::from_label("Node size")
            .selected_text(self.encoding.size_mode.label())
            .show_ui(ui, |ui| {
                for mode in [SizeMode::Importance, SizeMode::Citations] {
                    ui.selectable_value(&mut self.encoding.size_mode, mode, mode.label());
                }
            });

        egui::ComboBox::from_label("Node color")
            .selected_text(self.encoding.color_mode.label())
            .show_ui(ui, |ui| {
                for mode in [ColorMode::Cluster, ColorMode::Year] {
                    ui.selectable_value(&mut self.encoding.color_mode, mode, mode.label());
                }
            });

        ui.add(
            egui::Slider::new(&mut self.encoding.label_zoom_threshold, 0.1..=10.0)
                .logarithmic(true)
                .text("Label zoom"),
        );
        ui.small(format!("current zoom: {:.2}", self.canvas.camera().zoom));

        ui.separator();
        ui.checkbox(&mut self.show_fps_bar, "Show FPS");

        if let Some(hovered) = self
            .hovered
            .as_deref()
            .and_then(|id| self.canvas.graph().node(id))
        {
            ui.separator();
            ui.label(RichText::new("Hovered").strong());
            ui.label(truncate_label(&hovered.label, 80));
        }

        ui.separator();
        self.draw_legend(ui);
    }

    fn draw_legend(&self, ui: &mut Ui) {
        let encoding = self.canvas.encoding();
        let title = match encoding.config().color_mode {
            ColorMode::Cluster => "Clusters",
            ColorMode::Year => "Years",
        };
        ui.label(RichText::new(title).strong());

        let entries = match encoding.config().color_mode {
            ColorMode::Cluster => encoding
                .legend(self.canvas.graph())
                .into_iter()
                .map(|(key, color)| (key.to_owned(), color))
                .collect::<Vec<_>>(),
            ColorMode::Year => encoding.year_legend(),
        };

        if entries.is_empty() {
            ui.small("Nothing to show.");
            return;
        }

        egui::ScrollArea::vertical()
            .id_salt("legend_scroll")
            .max_height(260.0)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                for (label, color) in entries {
                    ui.horizontal(|ui| {
                        let (rect, _) = ui.allocate_exact_size(
                            egui::vec2(LEGEND_SWATCH, LEGEND_SWATCH),
                            egui::Sense::hover(),
                        );
                        ui.painter().circle_filled(rect.center(), LEGEND_SWATCH * 0.5, color);
                        ui.label(label);
                    });
                }
            });
    }
}
