use std::collections::HashSet;
use std::sync::Arc;

use eframe::egui::{self, Align2, Color32, FontId, Sense, Stroke, Ui, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::encoding::{edge_style, labels_visible};
use crate::util::{format_count, truncate_label};

use super::super::render_utils::{blend_color, dim_color, draw_background, edge_visible};
use super::{CanvasEvent, GraphCanvas, SearchMatchCache};

const SELECTED_COLOR: Color32 = Color32::from_rgb(245, 206, 93);
const NEIGHBOR_EDGE_COLOR: Color32 = Color32::from_rgb(241, 146, 94);
const SEARCH_COLOR: Color32 = Color32::from_rgb(103, 196, 255);
const LABEL_MAX_CHARS: usize = 48;

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_lowercase(), &query.to_lowercase()))
}

impl GraphCanvas {
    /// Indices of nodes whose label fuzzily matches `query`, cached per query
    /// and data revision.
    pub(crate) fn search_matches(&mut self, query: &str) -> Option<Arc<HashSet<usize>>> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_cache
            && cached.data_revision == self.data_revision
            && cached.query == query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let matcher = SkimMatcherV2::default();
        let matches = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| fuzzy_match_score(&matcher, &node.label, query).is_some())
            .map(|(index, _)| index)
            .collect::<HashSet<_>>();
        let matches = Arc::new(matches);

        self.search_cache = Some(SearchMatchCache {
            query: query.to_owned(),
            data_revision: self.data_revision,
            matches: Arc::clone(&matches),
        });
        Some(matches)
    }

    fn tooltip_line(&self, index: usize) -> Option<String> {
        let node = self.graph.node(&self.nodes.get(index)?.id)?;
        let year = node
            .year
            .map(|year| year.to_string())
            .unwrap_or_else(|| "n.d.".to_owned());

        Some(format!(
            "{}  |  {}  |  {} citations  |  refs {}  |  cited by {}",
            truncate_label(&node.label, 64),
            year,
            format_count(node.citations),
            self.outgoing[index].len(),
            self.incoming[index].len(),
        ))
    }

    /// Draws one frame into the remaining space of `ui` and returns the
    /// pointer events it produced.
    pub fn show(&mut self, ui: &mut Ui, selected: Option<&str>, search: &str) -> Vec<CanvasEvent> {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        if !self.is_mounted() {
            painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));
            return Vec::new();
        }

        self.handle_gestures(ui, rect, &response);
        self.ensure_projection(rect);
        draw_background(&painter, rect, self.camera.pan, self.camera.zoom);

        let pointer = if response.hovered() {
            ui.input(|input| input.pointer.hover_pos())
        } else {
            None
        };
        let events = self.pointer_events(pointer, response.clicked_by(egui::PointerButton::Primary));
        if self.hovered.is_some() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        }

        let search_matches = self.search_matches(search);
        let search_active = search_matches.as_ref().is_some_and(|matches| !matches.is_empty());
        let selected_index = selected.and_then(|id| self.node_index(id));
        let neighbors = selected_index
            .map(|index| self.neighbors(index).collect::<HashSet<_>>())
            .unwrap_or_default();

        let zoom = self.camera.zoom;
        let style = edge_style(zoom);
        let projection = &self.projection;
        for &(source, target) in &self.edges {
            let start = projection.screen_positions[source];
            let end = projection.screen_positions[target];
            if !projection.visible_mask[source]
                && !projection.visible_mask[target]
                && !edge_visible(rect, start, end, 2.5)
            {
                continue;
            }

            let touches_selected =
                selected_index.is_some_and(|index| index == source || index == target);
            let stroke = if touches_selected {
                Stroke::new(style.width * 1.8, NEIGHBOR_EDGE_COLOR)
            } else if selected_index.is_some() {
                Stroke::new(style.width, dim_color(style.color, 0.45))
            } else {
                Stroke::new(style.width, style.color)
            };
            painter.line_segment([start, end], stroke);
        }

        let show_labels = labels_visible(zoom, self.encoding.config().label_zoom_threshold);
        for &index in &self.draw_order {
            if !projection.visible_mask[index] {
                continue;
            }

            let node = &self.nodes[index];
            let position = projection.screen_positions[index];
            let radius = projection.screen_radii[index];
            let is_selected = selected_index == Some(index);
            let is_neighbor = neighbors.contains(&index);
            let is_match = search_matches
                .as_ref()
                .is_some_and(|matches| matches.contains(&index));

            let color = if is_selected {
                SELECTED_COLOR
            } else if is_match {
                blend_color(node.color, SEARCH_COLOR, 0.6)
            } else if is_neighbor {
                node.color
            } else if selected_index.is_some() || search_active {
                dim_color(node.color, 0.45)
            } else {
                node.color
            };

            painter.circle_filled(position, radius, color);
            let outline = if self.hovered == Some(index) {
                Stroke::new(2.0, Color32::WHITE)
            } else if is_selected {
                Stroke::new(2.2, SELECTED_COLOR)
            } else {
                Stroke::new(1.0, Color32::from_rgba_unmultiplied(15, 15, 15, 190))
            };
            painter.circle_stroke(position, radius, outline);

            if show_labels {
                painter.text(
                    position + vec2(radius + 5.0, 0.0),
                    Align2::LEFT_CENTER,
                    truncate_label(&node.label, LABEL_MAX_CHARS),
                    FontId::proportional(12.0),
                    Color32::from_gray(238),
                );
            }
        }

        if let Some(line) = self.hovered.and_then(|index| self.tooltip_line(index)) {
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                line,
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use eframe::egui::Id;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::app::graph::SurfaceRegistry;
    use crate::camera::CameraLimits;
    use crate::encoding::EncodingConfig;
    use crate::layout::{LayoutConfig, cluster_layout};
    use crate::papers::{PaperRecord, build_graph};
    use crate::papers::fixtures::{cite, paper};

    fn labelled(id: &str, label: &str) -> PaperRecord {
        let mut record = paper(id, "a");
        record.label = label.to_owned();
        record
    }

    fn canvas(registry: &SurfaceRegistry) -> GraphCanvas {
        let graph = build_graph(
            vec![
                labelled("p1", "Attention Is All You Need"),
                labelled("p2", "Deep Residual Learning"),
                labelled("p3", "Graph Attention Networks"),
            ],
            vec![cite("p3", "p1")],
        )
        .unwrap();
        let layout = cluster_layout(&graph, &LayoutConfig::default(), &mut StdRng::seed_from_u64(2))
            .unwrap();
        GraphCanvas::mount(
            registry,
            Id::new("view"),
            Arc::new(graph),
            layout,
            EncodingConfig::default(),
            CameraLimits::default(),
        )
        .unwrap()
    }

    #[test]
    fn search_matches_labels_case_insensitively() {
        let registry = SurfaceRegistry::default();
        let mut canvas = canvas(&registry);

        let matches = canvas.search_matches("attention").unwrap();
        let mut matches = matches.iter().copied().collect::<Vec<_>>();
        matches.sort_unstable();
        assert_eq!(matches, vec![0, 2]);

        assert!(canvas.search_matches("   ").is_none());
        assert!(canvas.search_matches("zzzzqqq").unwrap().is_empty());
    }

    #[test]
    fn search_results_are_cached_per_query() {
        let registry = SurfaceRegistry::default();
        let mut canvas = canvas(&registry);

        let first = canvas.search_matches("residual").unwrap();
        let second = canvas.search_matches("residual").unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        canvas.set_encoding(EncodingConfig {
            min_size: 4.0,
            ..EncodingConfig::default()
        });
        let third = canvas.search_matches("residual").unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
    }

    #[test]
    fn tooltip_line_describes_the_paper() {
        let registry = SurfaceRegistry::default();
        let canvas = canvas(&registry);

        let line = canvas.tooltip_line(0).unwrap();
        assert!(line.starts_with("Attention Is All You Need  |  2020"));
        assert!(line.contains("10 citations"));
        assert!(line.ends_with("refs 0  |  cited by 1"));
        assert_eq!(canvas.tooltip_line(99), None);
    }
}
