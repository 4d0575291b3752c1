use eframe::egui::{self, Rect, Ui};

use super::GraphCanvas;

/// Scroll wheel to zoom factor, bounded per event so a fast wheel stays
/// controllable.
pub(super) fn scroll_zoom_factor(scroll: f32) -> f32 {
    (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15)
}

impl GraphCanvas {
    /// Applies wheel, pinch and drag gestures to the camera. Returns whether
    /// the camera moved.
    pub(super) fn handle_gestures(&mut self, ui: &Ui, rect: Rect, response: &egui::Response) -> bool {
        let mut moved = false;

        if response.hovered() {
            let (scroll, pinch, pointer) = ui.input(|input| {
                (
                    input.raw_scroll_delta.y,
                    input.zoom_delta(),
                    input.pointer.hover_pos(),
                )
            });
            let anchor = pointer.unwrap_or_else(|| rect.center());

            if scroll.abs() > f32::EPSILON {
                moved |= self.apply_zoom(rect, anchor, scroll_zoom_factor(scroll));
            }
            if (pinch - 1.0).abs() > f32::EPSILON {
                moved |= self.apply_zoom(rect, anchor, pinch);
            }
        }

        if response.dragged() {
            moved |= self.apply_pan(response.drag_delta());
        }

        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wheel_factor_is_bounded() {
        assert_eq!(scroll_zoom_factor(0.0), 1.0);
        assert_eq!(scroll_zoom_factor(10_000.0), 1.15);
        assert_eq!(scroll_zoom_factor(-10_000.0), 0.85);
        assert!(scroll_zoom_factor(50.0) > 1.0);
        assert!(scroll_zoom_factor(-50.0) < 1.0);
    }
}
