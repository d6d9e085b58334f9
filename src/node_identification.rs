use petgraph::Direction;
use serde::Serialize;

use crate::graph_builder::MentionGraph;

/// A user and its total degree (in + out).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hub {
    pub id: String,
    pub degree: usize,
}

/// Total degree of every node, in node insertion order.
///
/// A self-loop counts once as incoming and once as outgoing.
pub fn degrees(graph: &MentionGraph) -> Vec<Hub> {
    let g = &graph.graph;
    g.node_indices()
        .map(|idx| {
            let out_d = g.edges_directed(idx, Direction::Outgoing).count();
            let in_d = g.edges_directed(idx, Direction::Incoming).count();
            Hub {
                id: g[idx].clone(),
                degree: in_d + out_d,
            }
        })
        .collect()
}

/// Returns the `top_n_hubs` most connected users, highest degree first.
///
/// Equal degrees keep insertion order. Asking for more hubs than there are
/// nodes returns every node; asking for zero returns nothing.
pub fn get_hub_nodes(graph: &MentionGraph, top_n_hubs: usize) -> Vec<Hub> {
    let mut ranked = degrees(graph);
    // sort_by is stable
    ranked.sort_by(|a, b| b.degree.cmp(&a.degree));
    ranked.truncate(top_n_hubs);
    ranked
}
