use std::collections::HashMap;

use eframe::egui::Vec2;

use super::{CanvasNode, GraphCanvas};

impl GraphCanvas {
    /// Re-resolves every node from the graph, the layout and the encoding.
    /// Invalidates the projection.
    pub(super) fn rebuild_nodes(&mut self) {
        self.data_revision = self.data_revision.wrapping_add(1);

        let mut nodes = Vec::with_capacity(self.graph.node_count());
        let mut index_by_id = HashMap::with_capacity(self.graph.node_count());
        for node in self.graph.nodes() {
            let world_pos = match self.layout.position(&node.id) {
                Some(position) => position,
                None => {
                    tracing::warn!(paper = %node.id, "paper has no layout position");
                    Vec2::ZERO
                }
            };

            index_by_id.insert(node.id.clone(), nodes.len());
            nodes.push(CanvasNode {
                id: node.id.clone(),
                label: node.label.clone(),
                world_pos,
                radius: self.encoding.node_radius(node),
                color: self.encoding.node_color(node),
            });
        }

        let mut edges = Vec::with_capacity(self.graph.edge_count());
        let mut outgoing = vec![Vec::new(); nodes.len()];
        let mut incoming = vec![Vec::new(); nodes.len()];
        for edge in self.graph.edges() {
            let (Some(&source), Some(&target)) =
                (index_by_id.get(&edge.source), index_by_id.get(&edge.target))
            else {
                continue;
            };
            edges.push((source, target));
            outgoing[source].push(target);
            incoming[target].push(source);
        }

        let mut draw_order = (0..nodes.len()).collect::<Vec<_>>();
        draw_order.sort_by(|a, b| nodes[*a].radius.total_cmp(&nodes[*b].radius));

        self.nodes = nodes;
        self.edges = edges;
        self.outgoing = outgoing;
        self.incoming = incoming;
        self.draw_order = draw_order;
        self.index_by_id = index_by_id;
        self.hovered = None;
    }

    /// Indices of the papers directly cited by, or citing, `index`.
    pub(super) fn neighbors(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        let outgoing = self.outgoing.get(index).into_iter().flatten();
        let incoming = self.incoming.get(index).into_iter().flatten();
        outgoing.chain(incoming).copied()
    }
}
