use std::collections::HashMap;
use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};
use rand::Rng;
use thiserror::Error;

use crate::papers::PaperGraph;

#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    #[error("{name} must be a positive finite number, got {value}")]
    InvalidRadius { name: &'static str, value: f32 },
    #[error("jitter range {min}..{max} must satisfy 0 <= min <= max <= 1")]
    InvalidJitter { min: f32, max: f32 },
}

/// Geometry of the clustered layout. Distances are in world units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutConfig {
    pub base_radius: f32,
    pub cluster_spread: f32,
    pub jitter_min: f32,
    pub jitter_max: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            base_radius: 500.0,
            cluster_spread: 200.0,
            jitter_min: 0.3,
            jitter_max: 0.8,
        }
    }
}

impl LayoutConfig {
    pub fn validate(&self) -> Result<(), LayoutError> {
        for (name, value) in [
            ("base radius", self.base_radius),
            ("cluster spread", self.cluster_spread),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(LayoutError::InvalidRadius { name, value });
            }
        }

        let jitter_ok = self.jitter_min.is_finite()
            && self.jitter_max.is_finite()
            && 0.0 <= self.jitter_min
            && self.jitter_min <= self.jitter_max
            && self.jitter_max <= 1.0;
        if !jitter_ok {
            return Err(LayoutError::InvalidJitter {
                min: self.jitter_min,
                max: self.jitter_max,
            });
        }

        Ok(())
    }
}

#[derive(Clone, Debug, Default)]
pub struct Layout {
    ids: Vec<String>,
    positions: Vec<Vec2>,
    index_by_id: HashMap<String, usize>,
    centroids: Vec<(String, Vec2)>,
}

impl Layout {
    pub fn position(&self, id: &str) -> Option<Vec2> {
        self.index_by_id.get(id).map(|&index| self.positions[index])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Vec2)> {
        self.ids
            .iter()
            .map(String::as_str)
            .zip(self.positions.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Cluster keys with their centroid, in group order.
    pub fn centroids(&self) -> &[(String, Vec2)] {
        &self.centroids
    }

    pub fn bounds(&self) -> Option<(Vec2, Vec2)> {
        let first = *self.positions.first()?;
        Some(self.positions.iter().fold((first, first), |(min, max), p| {
            (min.min(*p), max.max(*p))
        }))
    }
}

/// Places every node of `graph` around its cluster centroid.
///
/// Groups follow the order in which their cluster key first appears in the
/// graph, so centroid placement only depends on that order. The radius of
/// each member is drawn from `rng`; pass a seeded generator for reproducible
/// output.
pub fn cluster_layout<R: Rng + ?Sized>(
    graph: &PaperGraph,
    config: &LayoutConfig,
    rng: &mut R,
) -> Result<Layout, LayoutError> {
    config.validate()?;

    let mut groups: Vec<(&str, Vec<&str>)> = Vec::new();
    let mut group_index: HashMap<&str, usize> = HashMap::new();
    for node in graph.nodes() {
        let index = *group_index
            .entry(node.cluster_key.as_str())
            .or_insert_with(|| {
                groups.push((node.cluster_key.as_str(), Vec::new()));
                groups.len() - 1
            });
        groups[index].1.push(node.id.as_str());
    }

    let group_count = groups.len();
    let mut layout = Layout {
        ids: Vec::with_capacity(graph.node_count()),
        positions: Vec::with_capacity(graph.node_count()),
        index_by_id: HashMap::with_capacity(graph.node_count()),
        centroids: Vec::with_capacity(group_count),
    };

    for (group_position, (key, members)) in groups.into_iter().enumerate() {
        let angle = (group_position as f32 / group_count as f32) * TAU;
        let centroid = vec2(angle.cos(), angle.sin()) * config.base_radius;
        layout.centroids.push((key.to_owned(), centroid));

        let size = members.len();
        for (member_position, id) in members.into_iter().enumerate() {
            let position = if size == 1 {
                centroid
            } else {
                let angle = (member_position as f32 / size as f32) * TAU;
                let distance =
                    rng.gen_range(config.jitter_min..=config.jitter_max) * config.cluster_spread;
                centroid + vec2(angle.cos(), angle.sin()) * distance
            };

            layout.index_by_id.insert(id.to_owned(), layout.ids.len());
            layout.ids.push(id.to_owned());
            layout.positions.push(position);
        }
    }

    Ok(layout)
}
