use eframe::egui::{Color32, Painter, Pos2, Rangef, Rect, Stroke, Vec2};

const BACKDROP_COLOR: Color32 = Color32::from_rgb(19, 23, 29);
const GRID_COLOR: Color32 = Color32::from_rgba_premultiplied(14, 16, 19, 60);

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    base.lerp_to_gamma(overlay, amount.clamp(0.0, 1.0))
}

/// Darkens the color and fades it, keeping at least 45% of its opacity.
pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    let scale = |channel: u8, by: f32| (channel as f32 * by).round() as u8;
    let [r, g, b, a] = color.to_srgba_unmultiplied();

    Color32::from_rgba_unmultiplied(
        scale(r, factor),
        scale(g, factor),
        scale(b, factor),
        scale(a, 0.45 + factor * 0.55),
    )
}

/// Dark backdrop with a grid that follows the camera.
pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, BACKDROP_COLOR);

    let step = (64.0 * zoom.clamp(0.5, 2.0)).max(24.0);
    let origin = rect.center() + pan;
    let stroke = Stroke::new(1.0, GRID_COLOR);

    for x in grid_lines(origin.x, rect.x_range(), step) {
        painter.vline(x, rect.y_range(), stroke);
    }
    for y in grid_lines(origin.y, rect.y_range(), step) {
        painter.hline(rect.x_range(), y, stroke);
    }
}

/// Grid line offsets inside `span`, aligned so one line would pass through `origin`.
fn grid_lines(origin: f32, span: Rangef, step: f32) -> impl Iterator<Item = f32> {
    let first = span.min + (origin - span.min).rem_euclid(step);
    (0..)
        .map(move |index| first + index as f32 * step)
        .take_while(move |&at| at <= span.max)
}

/// Whether any part of the circle's bounding box falls inside `rect`.
pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    rect.intersects(Rect::from_center_size(position, Vec2::splat(radius * 2.0)))
}

pub(super) fn edge_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    let bounds = rect.expand(padding);
    if !bounds.intersects(Rect::from_two_pos(start, end)) {
        return false;
    }
    if bounds.contains(start) || bounds.contains(end) {
        return true;
    }

    clip_segment(bounds, start, end).is_some()
}

/// Parametric range `(enter, exit)` of `start..end` that lies inside `bounds`.
fn clip_segment(bounds: Rect, start: Pos2, end: Pos2) -> Option<(f32, f32)> {
    let delta = end - start;
    let mut enter = 0.0_f32;
    let mut exit = 1.0_f32;

    for (direction, distance) in [
        (-delta.x, start.x - bounds.left()),
        (delta.x, bounds.right() - start.x),
        (-delta.y, start.y - bounds.top()),
        (delta.y, bounds.bottom() - start.y),
    ] {
        if direction == 0.0 {
            if distance < 0.0 {
                return None;
            }
            continue;
        }

        let t = distance / direction;
        if direction < 0.0 {
            enter = enter.max(t);
        } else {
            exit = exit.min(t);
        }
        if enter > exit {
            return None;
        }
    }

    Some((enter, exit))
}
