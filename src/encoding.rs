use std::collections::HashMap;

use eframe::egui::Color32;

use crate::papers::{PaperGraph, PaperNode};

pub const NEUTRAL_COLOR: Color32 = Color32::from_rgb(148, 163, 184);
pub const EDGE_COLOR: Color32 = Color32::from_rgb(209, 213, 219);

const PALETTE: [Color32; 11] = [
    Color32::from_rgb(20, 184, 166),
    Color32::from_rgb(6, 182, 212),
    Color32::from_rgb(239, 68, 68),
    Color32::from_rgb(124, 58, 237),
    Color32::from_rgb(34, 197, 94),
    Color32::from_rgb(234, 179, 8),
    Color32::from_rgb(249, 115, 22),
    Color32::from_rgb(133, 77, 14),
    Color32::from_rgb(132, 204, 22),
    Color32::from_rgb(168, 85, 247),
    Color32::from_rgb(236, 72, 153),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SizeMode {
    Importance,
    Citations,
}

impl SizeMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Importance => "Importance",
            Self::Citations => "Citations",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Cluster,
    Year,
}

impl ColorMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Cluster => "Cluster",
            Self::Year => "Year",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EncodingConfig {
    pub min_size: f32,
    pub max_size: f32,
    pub label_zoom_threshold: f32,
    pub size_mode: SizeMode,
    pub color_mode: ColorMode,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            min_size: 6.0,
            max_size: 18.0,
            label_zoom_threshold: 1.5,
            size_mode: SizeMode::Importance,
            color_mode: ColorMode::Cluster,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeStyle {
    pub radius: f32,
    pub color: Color32,
    pub show_label: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeStyle {
    pub width: f32,
    pub color: Color32,
}

pub fn radius_by_importance(importance: f32, min_size: f32, max_size: f32) -> f32 {
    let t = if importance.is_finite() {
        importance.clamp(0.0, 1.0)
    } else {
        0.0
    };
    min_size + t * (max_size - min_size)
}

pub fn radius_by_citations(citations: u64, min: u64, max: u64, min_size: f32, max_size: f32) -> f32 {
    if max <= min {
        return min_size;
    }

    let t = (citations.clamp(min, max) - min) as f64 / (max - min) as f64;
    min_size + (t as f32) * (max_size - min_size)
}

pub fn labels_visible(zoom: f32, threshold: f32) -> bool {
    zoom > threshold
}

/// Screen-space radius for a world radius at the given zoom.
pub fn screen_radius(radius: f32, zoom: f32) -> f32 {
    (radius * zoom.sqrt()).clamp(2.5, 46.0)
}

pub fn edge_style(zoom: f32) -> EdgeStyle {
    EdgeStyle {
        width: zoom.sqrt().clamp(0.6, 2.4),
        color: EDGE_COLOR,
    }
}

/// `#rrggbb` (or `rrggbb`) to a color.
pub fn parse_hex_color(value: &str) -> Option<Color32> {
    let hex = value.trim().strip_prefix('#').unwrap_or(value.trim());
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some(Color32::from_rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Resolves render attributes for the nodes and edges of one graph.
///
/// Colors per cluster and per year are assigned once from the graph; every
/// lookup afterwards is a pure function of the node, the config and the zoom.
#[derive(Clone, Debug)]
pub struct EncodingResolver {
    config: EncodingConfig,
    cluster_colors: HashMap<String, Color32>,
    year_range: Option<(i32, i32)>,
    citation_range: (u64, u64),
}

impl EncodingResolver {
    pub fn new(graph: &PaperGraph, config: EncodingConfig) -> Self {
        let mut cluster_colors = HashMap::new();
        let mut palette_index = 0usize;
        for key in graph.cluster_keys() {
            let color = parse_hex_color(key).unwrap_or_else(|| {
                let color = PALETTE[palette_index % PALETTE.len()];
                palette_index += 1;
                color
            });
            cluster_colors.insert(key.to_owned(), color);
        }

        let year_range = graph
            .nodes()
            .filter_map(|node| node.year)
            .fold(None, |range, year| match range {
                None => Some((year, year)),
                Some((min, max)) => Some((year.min(min), year.max(max))),
            });

        Self {
            config,
            cluster_colors,
            year_range,
            citation_range: graph.citation_range().unwrap_or((0, 0)),
        }
    }

    pub fn config(&self) -> &EncodingConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut EncodingConfig {
        &mut self.config
    }

    pub fn node_radius(&self, node: &PaperNode) -> f32 {
        let EncodingConfig {
            min_size, max_size, ..
        } = self.config;
        match self.config.size_mode {
            SizeMode::Importance => radius_by_importance(node.importance, min_size, max_size),
            SizeMode::Citations => {
                let (min, max) = self.citation_range;
                radius_by_citations(node.citations, min, max, min_size, max_size)
            }
        }
    }

    pub fn cluster_color(&self, key: &str) -> Color32 {
        self.cluster_colors.get(key).copied().unwrap_or(NEUTRAL_COLOR)
    }

    pub fn year_color(&self, year: Option<i32>) -> Color32 {
        let (Some(year), Some((min, max))) = (year, self.year_range) else {
            return NEUTRAL_COLOR;
        };
        if year < min || year > max {
            return NEUTRAL_COLOR;
        }

        PALETTE[year_bucket(year, min, max)]
    }

    pub fn node_color(&self, node: &PaperNode) -> Color32 {
        match self.config.color_mode {
            ColorMode::Cluster => self.cluster_color(&node.cluster_key),
            ColorMode::Year => self.year_color(node.year),
        }
    }

    pub fn node_style(&self, node: &PaperNode, zoom: f32) -> NodeStyle {
        NodeStyle {
            radius: self.node_radius(node),
            color: self.node_color(node),
            show_label: labels_visible(zoom, self.config.label_zoom_threshold),
        }
    }

    /// Clusters with their colors, in palette assignment order.
    pub fn legend<'a>(&'a self, graph: &'a PaperGraph) -> Vec<(&'a str, Color32)> {
        graph
            .cluster_keys()
            .into_iter()
            .map(|key| (key, self.cluster_color(key)))
            .collect()
    }

    /// Year spans sharing a color, oldest first.
    pub fn year_legend(&self) -> Vec<(String, Color32)> {
        let Some((min, max)) = self.year_range else {
            return Vec::new();
        };

        let starts: Vec<i64> = (0..=PALETTE.len())
            .map(|bucket| first_year_in_bucket(bucket, min, max))
            .collect();

        starts
            .windows(2)
            .zip(PALETTE)
            .filter(|(span, _)| span[0] < span[1])
            .map(|(span, color)| {
                let (start, end) = (span[0], span[1] - 1);
                let label = if start == end {
                    start.to_string()
                } else {
                    format!("{start}-{end}")
                };
                (label, color)
            })
            .collect()
    }
}

/// Palette slot of `year` within `min..=max`, oldest at 0.
fn year_bucket(year: i32, min: i32, max: i32) -> usize {
    if max == min {
        return 0;
    }

    let t = (f64::from(year) - f64::from(min)) / (f64::from(max) - f64::from(min));
    ((t * (PALETTE.len() - 1) as f64).round() as usize).min(PALETTE.len() - 1)
}

/// Oldest year whose bucket is at least `bucket`, or `max + 1` when none is.
fn first_year_in_bucket(bucket: usize, min: i32, max: i32) -> i64 {
    let (mut low, mut high) = (i64::from(min), i64::from(max) + 1);
    while low < high {
        let mid = low + (high - low) / 2;
        // mid < high <= max + 1, so it is a valid i32.
        if year_bucket(mid as i32, min, max) >= bucket {
            high = mid;
        } else {
            low = mid + 1;
        }
    }
    low
}
