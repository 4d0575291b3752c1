mod graph;
mod load;

pub use graph::{CitationEdge, CitationPair, GraphError, PaperGraph, PaperNode, PaperRecord, build_graph};
pub use load::load_paper_graph;

#[cfg(test)]
pub(crate) use graph::tests as fixtures;
