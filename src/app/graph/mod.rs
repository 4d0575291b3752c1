use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use eframe::egui::{Color32, Id, Pos2, Rect, Vec2};

use crate::camera::{CameraLimits, CameraState, hit_test};
use crate::encoding::{EncodingConfig, EncodingResolver, screen_radius};
use crate::layout::Layout;
use crate::papers::PaperGraph;

use super::render_utils::circle_visible;

mod build;
mod interaction;
mod surface;
mod view;

pub use surface::{CanvasError, SurfaceRegistry};
use surface::SurfaceLease;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CanvasEvent {
    Hovered(Option<String>),
    Selected(String),
    Cleared,
}

struct CanvasNode {
    id: String,
    label: String,
    world_pos: Vec2,
    radius: f32,
    color: Color32,
}

#[derive(Clone, Copy, PartialEq)]
struct ProjectionKey {
    camera_revision: u64,
    data_revision: u64,
    rect: Rect,
}

#[derive(Default)]
struct Projection {
    key: Option<ProjectionKey>,
    screen_positions: Vec<Pos2>,
    screen_radii: Vec<f32>,
    visible: Vec<usize>,
    visible_mask: Vec<bool>,
}

struct SearchMatchCache {
    query: String,
    data_revision: u64,
    matches: Arc<HashSet<usize>>,
}

/// The graph renderer bound to one drawing surface.
///
/// Screen-space data is derived from the camera and the styled nodes and is
/// only recomputed when one of them changes; nothing here schedules repaints
/// on its own.
pub struct GraphCanvas {
    lease: Option<SurfaceLease>,
    graph: Arc<PaperGraph>,
    layout: Layout,
    encoding: EncodingResolver,
    limits: CameraLimits,
    camera: CameraState,
    camera_fitted: bool,
    camera_revision: u64,
    data_revision: u64,
    nodes: Vec<CanvasNode>,
    edges: Vec<(usize, usize)>,
    outgoing: Vec<Vec<usize>>,
    incoming: Vec<Vec<usize>>,
    draw_order: Vec<usize>,
    index_by_id: HashMap<String, usize>,
    projection: Projection,
    search_cache: Option<SearchMatchCache>,
    hovered: Option<usize>,
}

impl GraphCanvas {
    pub fn mount(
        registry: &SurfaceRegistry,
        surface: Id,
        graph: Arc<PaperGraph>,
        layout: Layout,
        encoding: EncodingConfig,
        limits: CameraLimits,
    ) -> Result<Self, CanvasError> {
        let lease = registry.acquire(surface)?;
        let encoding = EncodingResolver::new(&graph, encoding);

        let mut canvas = Self {
            lease: Some(lease),
            graph,
            layout,
            encoding,
            limits,
            camera: CameraState::default(),
            camera_fitted: false,
            camera_revision: 0,
            data_revision: 0,
            nodes: Vec::new(),
            edges: Vec::new(),
            outgoing: Vec::new(),
            incoming: Vec::new(),
            draw_order: Vec::new(),
            index_by_id: HashMap::new(),
            projection: Projection::default(),
            search_cache: None,
            hovered: None,
        };
        canvas.rebuild_nodes();

        tracing::info!(
            ?surface,
            nodes = canvas.nodes.len(),
            edges = canvas.edges.len(),
            "mounted graph canvas"
        );
        Ok(canvas)
    }

    pub fn unmount(&mut self) {
        let Some(mut lease) = self.lease.take() else {
            return;
        };
        lease.release();
        self.hovered = None;
        self.projection = Projection::default();
        tracing::info!(surface = ?lease.surface(), "unmounted graph canvas");
    }

    pub fn is_mounted(&self) -> bool {
        self.lease.is_some()
    }

    pub fn graph(&self) -> &PaperGraph {
        &self.graph
    }

    pub fn camera(&self) -> CameraState {
        self.camera
    }

    pub fn encoding(&self) -> &EncodingResolver {
        &self.encoding
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn visible_count(&self) -> usize {
        self.projection.visible.len()
    }

    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn set_encoding(&mut self, config: EncodingConfig) {
        if *self.encoding.config() == config {
            return;
        }
        *self.encoding.config_mut() = config;
        self.rebuild_nodes();
    }

    pub fn replace_layout(&mut self, layout: Layout) {
        self.layout = layout;
        self.rebuild_nodes();
    }

    pub fn reset_camera(&mut self) {
        self.camera_fitted = false;
        self.camera_revision = self.camera_revision.wrapping_add(1);
    }

    pub(crate) fn apply_zoom(&mut self, rect: Rect, anchor: Pos2, factor: f32) -> bool {
        let moved = self.camera.zoom_at(rect, anchor, factor, &self.limits);
        if moved {
            self.camera_revision = self.camera_revision.wrapping_add(1);
        }
        moved
    }

    pub(crate) fn apply_pan(&mut self, delta: Vec2) -> bool {
        let moved = self.camera.pan_by(delta);
        if moved {
            self.camera_revision = self.camera_revision.wrapping_add(1);
        }
        moved
    }

    fn fit_camera(&mut self, rect: Rect) {
        if self.camera_fitted || rect.width() <= 0.0 || rect.height() <= 0.0 {
            return;
        }

        self.camera = match self.layout.bounds() {
            Some((min, max)) => CameraState::fit(min, max, rect.size(), &self.limits),
            None => CameraState::default(),
        };
        self.camera_fitted = true;
        self.camera_revision = self.camera_revision.wrapping_add(1);
    }

    /// Brings screen-space positions up to date. Returns whether any work was
    /// done.
    pub(crate) fn ensure_projection(&mut self, rect: Rect) -> bool {
        self.fit_camera(rect);

        let key = ProjectionKey {
            camera_revision: self.camera_revision,
            data_revision: self.data_revision,
            rect,
        };
        if self.projection.key == Some(key) {
            return false;
        }

        let projection = &mut self.projection;
        projection.screen_positions.clear();
        projection.screen_radii.clear();
        projection.visible.clear();
        projection.visible_mask.clear();
        for (index, node) in self.nodes.iter().enumerate() {
            let position = self.camera.world_to_screen(rect, node.world_pos);
            let radius = screen_radius(node.radius, self.camera.zoom);
            let visible = circle_visible(rect, position, radius);
            if visible {
                projection.visible.push(index);
            }
            projection.visible_mask.push(visible);
            projection.screen_positions.push(position);
            projection.screen_radii.push(radius);
        }
        projection.key = Some(key);
        true
    }

    /// Translates the pointer state of one frame into canvas events.
    pub(crate) fn pointer_events(&mut self, pointer: Option<Pos2>, clicked: bool) -> Vec<CanvasEvent> {
        if !self.is_mounted() {
            return Vec::new();
        }

        let hovered = pointer.and_then(|pointer| {
            hit_test(
                self.projection.visible.iter().copied(),
                &self.projection.screen_positions,
                &self.projection.screen_radii,
                pointer,
            )
        });

        let mut events = Vec::new();
        if hovered != self.hovered {
            self.hovered = hovered;
            events.push(CanvasEvent::Hovered(
                hovered.map(|index| self.nodes[index].id.clone()),
            ));
        }

        if clicked {
            events.push(match hovered {
                Some(index) => CanvasEvent::Selected(self.nodes[index].id.clone()),
                None => CanvasEvent::Cleared,
            });
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::layout::{LayoutConfig, cluster_layout};
    use crate::papers::build_graph;
    use crate::papers::fixtures::{cite, paper};

    fn surface_rect() -> Rect {
        Rect::from_min_size(Pos2::ZERO, vec2(1000.0, 800.0))
    }

    fn mounted(registry: &SurfaceRegistry) -> GraphCanvas {
        let graph = build_graph(
            vec![paper("p1", "a"), paper("p2", "a"), paper("p3", "b")],
            vec![cite("p2", "p1"), cite("p3", "p1")],
        )
        .unwrap();
        let layout = cluster_layout(&graph, &LayoutConfig::default(), &mut StdRng::seed_from_u64(5))
            .unwrap();
        GraphCanvas::mount(
            registry,
            Id::new("graph"),
            Arc::new(graph),
            layout,
            EncodingConfig::default(),
            CameraLimits::default(),
        )
        .unwrap()
    }

    #[test]
    fn mount_binds_surface_and_unmount_is_idempotent() {
        let registry = SurfaceRegistry::default();
        let mut canvas = mounted(&registry);

        assert!(canvas.is_mounted());
        assert_eq!(canvas.node_count(), 3);
        assert_eq!(canvas.edge_count(), 2);
        assert!(matches!(
            GraphCanvas::mount(
                &registry,
                Id::new("graph"),
                Arc::new(PaperGraph::default()),
                Layout::default(),
                EncodingConfig::default(),
                CameraLimits::default(),
            ),
            Err(CanvasError::SurfaceBusy(_))
        ));

        canvas.unmount();
        canvas.unmount();
        assert!(!canvas.is_mounted());
        assert!(!registry.is_bound(Id::new("graph")));

        let remounted = mounted(&registry);
        assert!(remounted.is_mounted());
    }

    #[test]
    fn dropping_a_canvas_frees_its_surface() {
        let registry = SurfaceRegistry::default();
        drop(mounted(&registry));
        assert!(!registry.is_bound(Id::new("graph")));
    }

    #[test]
    fn idle_frames_do_no_projection_work() {
        let registry = SurfaceRegistry::default();
        let mut canvas = mounted(&registry);
        let rect = surface_rect();

        assert!(canvas.ensure_projection(rect));
        assert!(!canvas.ensure_projection(rect));
        assert!(!canvas.ensure_projection(rect));

        assert!(canvas.apply_pan(vec2(10.0, 0.0)));
        assert!(canvas.ensure_projection(rect));
        assert!(!canvas.ensure_projection(rect));

        canvas.set_encoding(EncodingConfig::default());
        assert!(!canvas.ensure_projection(rect));
        canvas.set_encoding(EncodingConfig {
            max_size: 30.0,
            ..EncodingConfig::default()
        });
        assert!(canvas.ensure_projection(rect));
    }

    #[test]
    fn zoom_gestures_respect_limits() {
        let registry = SurfaceRegistry::default();
        let mut canvas = mounted(&registry);
        let rect = surface_rect();
        canvas.ensure_projection(rect);

        for _ in 0..200 {
            canvas.apply_zoom(rect, rect.center(), 1.15);
        }
        assert_eq!(canvas.camera().zoom, CameraLimits::default().max_zoom);
        for _ in 0..400 {
            canvas.apply_zoom(rect, rect.center(), 0.85);
        }
        assert_eq!(canvas.camera().zoom, CameraLimits::default().min_zoom);
    }

    #[test]
    fn hover_and_click_surface_node_ids() {
        let registry = SurfaceRegistry::default();
        let mut canvas = mounted(&registry);
        let rect = surface_rect();
        canvas.ensure_projection(rect);

        let index = canvas.node_index("p3").unwrap();
        let over_p3 = canvas.projection.screen_positions[index];

        assert_eq!(
            canvas.pointer_events(Some(over_p3), false),
            vec![CanvasEvent::Hovered(Some("p3".into()))]
        );
        assert_eq!(canvas.pointer_events(Some(over_p3), false), vec![]);
        assert_eq!(
            canvas.pointer_events(Some(over_p3), true),
            vec![CanvasEvent::Selected("p3".into())]
        );
        assert_eq!(
            canvas.pointer_events(Some(Pos2::new(-500.0, -500.0)), true),
            vec![CanvasEvent::Hovered(None), CanvasEvent::Cleared]
        );
    }

    #[test]
    fn unmounted_canvas_ignores_pointer() {
        let registry = SurfaceRegistry::default();
        let mut canvas = mounted(&registry);
        let rect = surface_rect();
        canvas.ensure_projection(rect);
        let position = canvas.projection.screen_positions[0];

        canvas.unmount();
        assert!(canvas.pointer_events(Some(position), true).is_empty());
    }
}
