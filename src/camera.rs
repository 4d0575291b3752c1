use eframe::egui::{Pos2, Rect, Vec2};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraLimits {
    pub min_zoom: f32,
    pub max_zoom: f32,
}

impl Default for CameraLimits {
    fn default() -> Self {
        Self {
            min_zoom: 0.1,
            max_zoom: 10.0,
        }
    }
}

impl CameraLimits {
    pub fn clamp(&self, zoom: f32) -> f32 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }
}

/// Pan and zoom applied to world coordinates. `pan` is in screen pixels
/// relative to the centre of the drawing surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraState {
    pub zoom: f32,
    pub pan: Vec2,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Vec2::ZERO,
        }
    }
}

impl CameraState {
    pub fn world_to_screen(&self, rect: Rect, world: Vec2) -> Pos2 {
        rect.center() + self.pan + world * self.zoom
    }

    pub fn screen_to_world(&self, rect: Rect, screen: Pos2) -> Vec2 {
        (screen - rect.center() - self.pan) / self.zoom
    }

    /// Multiplies the zoom by `factor`, keeping the world point under
    /// `anchor` fixed. Returns whether the camera moved.
    pub fn zoom_at(&mut self, rect: Rect, anchor: Pos2, factor: f32, limits: &CameraLimits) -> bool {
        if !factor.is_finite() || factor <= 0.0 {
            return false;
        }

        let world_before = self.screen_to_world(rect, anchor);
        let zoom = limits.clamp(self.zoom * factor);
        if (zoom - self.zoom).abs() <= f32::EPSILON {
            return false;
        }

        self.zoom = zoom;
        self.pan = anchor - rect.center() - (world_before * self.zoom);
        true
    }

    pub fn pan_by(&mut self, delta: Vec2) -> bool {
        if delta == Vec2::ZERO || !delta.is_finite() {
            return false;
        }
        self.pan += delta;
        true
    }

    /// Camera that fits the world box `min..max` into `viewport` with a margin.
    pub fn fit(min: Vec2, max: Vec2, viewport: Vec2, limits: &CameraLimits) -> Self {
        let extent = (max - min).max(Vec2::splat(1.0));
        let scale = ((viewport.x / extent.x).min(viewport.y / extent.y)) * 0.85;
        let zoom = limits.clamp(if scale.is_finite() && scale > 0.0 { scale } else { 1.0 });
        let center = (min + max) * 0.5;

        Self {
            zoom,
            pan: -center * zoom,
        }
    }
}

/// Index of the node under `pointer`, closest centre first.
pub fn hit_test(
    candidates: impl IntoIterator<Item = usize>,
    screen_positions: &[Pos2],
    screen_radii: &[f32],
    pointer: Pos2,
) -> Option<usize> {
    candidates
        .into_iter()
        .filter_map(|index| {
            let distance = screen_positions.get(index)?.distance(pointer);
            (distance <= *screen_radii.get(index)?).then_some((index, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| index)
}
