use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use super::graph::{CitationPair, PaperGraph, PaperRecord, build_graph};

const SAMPLE_DATASET: &str = include_str!("../../assets/papers.json");

#[derive(Debug, Deserialize)]
struct RawDataset {
    papers: Vec<PaperRecord>,
    #[serde(default)]
    citations: Vec<CitationPair>,
}

pub fn load_paper_graph(path: Option<&Path>) -> Result<PaperGraph> {
    let (origin, raw) = match path {
        Some(path) => (
            path.display().to_string(),
            fs::read_to_string(path)
                .with_context(|| format!("failed to read dataset {}", path.display()))?,
        ),
        None => ("bundled sample".to_owned(), SAMPLE_DATASET.to_owned()),
    };

    let graph = parse_dataset(&raw).with_context(|| format!("invalid dataset from {origin}"))?;
    tracing::info!(
        %origin,
        papers = graph.node_count(),
        citations = graph.edge_count(),
        "loaded paper graph"
    );
    Ok(graph)
}

pub(super) fn parse_dataset(raw: &str) -> Result<PaperGraph> {
    let dataset: RawDataset = serde_json::from_str(raw).context("dataset is not valid JSON")?;
    let graph = build_graph(dataset.papers, dataset.citations)?;
    Ok(graph)
}
