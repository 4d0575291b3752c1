use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("paper id `{0}` appears more than once")]
    DuplicatePaper(String),
    #[error("citation {source_id} -> {target_id} references unknown paper `{missing}`")]
    UnknownPaper {
        source_id: String,
        target_id: String,
        missing: String,
    },
    #[error("paper `{0}` cites itself")]
    SelfCitation(String),
    #[error("paper `{id}` has a non-finite importance score")]
    InvalidImportance { id: String },
}

/// A paper as it appears in the dataset file.
#[derive(Clone, Debug, Deserialize)]
pub struct PaperRecord {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub authors: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub importance: f32,
    #[serde(default)]
    pub citations: u64,
    #[serde(alias = "color")]
    pub cluster: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct CitationPair {
    pub source: String,
    pub target: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PaperNode {
    pub id: String,
    pub label: String,
    pub authors: Option<String>,
    pub year: Option<i32>,
    pub importance: f32,
    pub citations: u64,
    pub cluster_key: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CitationEdge {
    pub source: String,
    pub target: String,
}

impl CitationEdge {
    pub fn key(&self) -> String {
        edge_key(&self.source, &self.target)
    }
}

fn edge_key(source: &str, target: &str) -> String {
    format!("{source}->{target}")
}

#[derive(Clone, Debug, Default)]
pub struct PaperGraph {
    nodes: HashMap<String, PaperNode>,
    order: Vec<String>,
    edges: Vec<CitationEdge>,
}

impl PaperGraph {
    pub fn node(&self, id: &str) -> Option<&PaperNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Nodes in the order they were loaded.
    pub fn nodes(&self) -> impl Iterator<Item = &PaperNode> {
        self.order.iter().filter_map(|id| self.nodes.get(id))
    }

    pub fn edges(&self) -> &[CitationEdge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.order.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn citation_range(&self) -> Option<(u64, u64)> {
        self.nodes().fold(None, |range, node| match range {
            None => Some((node.citations, node.citations)),
            Some((min, max)) => Some((min.min(node.citations), max.max(node.citations))),
        })
    }

    /// Cluster keys in order of first appearance.
    pub fn cluster_keys(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.nodes()
            .filter(|node| seen.insert(node.cluster_key.as_str()))
            .map(|node| node.cluster_key.as_str())
            .collect()
    }

    pub fn references_of(&self, id: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|edge| edge.source == id)
            .map(|edge| edge.target.as_str())
            .collect()
    }

    pub fn cited_by(&self, id: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|edge| edge.target == id)
            .map(|edge| edge.source.as_str())
            .collect()
    }
}

pub fn build_graph(
    papers: impl IntoIterator<Item = PaperRecord>,
    citations: impl IntoIterator<Item = CitationPair>,
) -> Result<PaperGraph, GraphError> {
    let mut nodes = HashMap::new();
    let mut order = Vec::new();

    for record in papers {
        if !record.importance.is_finite() {
            return Err(GraphError::InvalidImportance { id: record.id });
        }
        if nodes.contains_key(&record.id) {
            return Err(GraphError::DuplicatePaper(record.id));
        }

        order.push(record.id.clone());
        nodes.insert(
            record.id.clone(),
            PaperNode {
                id: record.id,
                label: record.label,
                authors: record.authors,
                year: record.year,
                importance: record.importance,
                citations: record.citations,
                cluster_key: record.cluster,
            },
        );
    }

    let mut seen_edges = HashSet::new();
    let mut edges = Vec::new();

    for pair in citations {
        for endpoint in [&pair.source, &pair.target] {
            if !nodes.contains_key(endpoint) {
                return Err(GraphError::UnknownPaper {
                    missing: endpoint.clone(),
                    source_id: pair.source.clone(),
                    target_id: pair.target.clone(),
                });
            }
        }
        if pair.source == pair.target {
            return Err(GraphError::SelfCitation(pair.source));
        }

        if !seen_edges.insert(edge_key(&pair.source, &pair.target)) {
            tracing::debug!(source = %pair.source, target = %pair.target, "skipping duplicate citation");
            continue;
        }

        edges.push(CitationEdge {
            source: pair.source,
            target: pair.target,
        });
    }

    Ok(PaperGraph {
        nodes,
        order,
        edges,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn paper(id: &str, cluster: &str) -> PaperRecord {
        PaperRecord {
            id: id.to_string(),
            label: format!("Paper {id}"),
            authors: None,
            year: Some(2020),
            importance: 0.5,
            citations: 10,
            cluster: cluster.to_string(),
        }
    }

    pub(crate) fn cite(source: &str, target: &str) -> CitationPair {
        CitationPair {
            source: source.to_string(),
            target: target.to_string(),
        }
    }

    #[test]
    fn two_papers_one_citation() {
        let graph = build_graph(
            vec![paper("p1", "a"), paper("p2", "a")],
            vec![cite("p2", "p1")],
        )
        .unwrap();

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edges()[0].key(), "p2->p1");
        assert_eq!(graph.references_of("p2"), vec!["p1"]);
        assert_eq!(graph.cited_by("p1"), vec!["p2"]);
    }

    #[test]
    fn rejects_unknown_endpoint() {
        let err = build_graph(vec![paper("p1", "a")], vec![cite("p1", "ghost")]).unwrap_err();
        assert_eq!(
            err,
            GraphError::UnknownPaper {
                source_id: "p1".into(),
                target_id: "ghost".into(),
                missing: "ghost".into(),
            }
        );
    }

    #[test]
    fn rejects_duplicate_paper() {
        let err = build_graph(vec![paper("p1", "a"), paper("p1", "b")], vec![]).unwrap_err();
        assert_eq!(err, GraphError::DuplicatePaper("p1".into()));
    }

    #[test]
    fn rejects_self_citation() {
        let err = build_graph(vec![paper("p1", "a")], vec![cite("p1", "p1")]).unwrap_err();
        assert_eq!(err, GraphError::SelfCitation("p1".into()));
    }

    #[test]
    fn rejects_nan_importance() {
        let mut record = paper("p1", "a");
        record.importance = f32::NAN;
        let err = build_graph(vec![record], vec![]).unwrap_err();
        assert_eq!(err, GraphError::InvalidImportance { id: "p1".into() });
    }

    #[test]
    fn duplicate_citations_collapse() {
        let graph = build_graph(
            vec![paper("p1", "a"), paper("p2", "a")],
            vec![cite("p2", "p1"), cite("p2", "p1"), cite("p1", "p2")],
        )
        .unwrap();

        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn every_edge_endpoint_exists() {
        let ids = ["a", "b", "c", "d", "e"];
        let papers = ids.iter().map(|id| paper(id, "x")).collect::<Vec<_>>();
        let mut citations = Vec::new();
        for (i, source) in ids.iter().enumerate() {
            for target in ids.iter().skip(i + 1) {
                citations.push(cite(source, target));
            }
        }

        let graph = build_graph(papers, citations).unwrap();
        assert_eq!(graph.edge_count(), 10);
        for edge in graph.edges() {
            assert!(graph.contains(&edge.source));
            assert!(graph.contains(&edge.target));
        }
    }

    #[test]
    fn keeps_load_order_and_cluster_order() {
        let graph = build_graph(
            vec![paper("z", "red"), paper("a", "blue"), paper("m", "red")],
            vec![],
        )
        .unwrap();

        let ids = graph.nodes().map(|node| node.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["z", "a", "m"]);
        assert_eq!(graph.cluster_keys(), vec!["red", "blue"]);
    }

    #[test]
    fn citation_range_spans_all_nodes() {
        let mut low = paper("low", "a");
        low.citations = 3;
        let mut high = paper("high", "a");
        high.citations = 900;
        let graph = build_graph(vec![low, high, paper("mid", "a")], vec![]).unwrap();

        assert_eq!(graph.citation_range(), Some((3, 900)));
        assert_eq!(PaperGraph::default().citation_range(), None);
    }
}
