//! Force-directed (spring model) node placement.
//!
//! Fruchterman–Reingold with a linearly cooling temperature. Edge direction
//! is ignored for attraction. The result is centred on the origin and scaled
//! so the furthest coordinate sits at ±1.

use std::collections::{BTreeMap, BTreeSet};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::LayoutConfig;
use crate::error::{NetworkError, Result};
use crate::graph_builder::MentionGraph;

const MIN_DISTANCE: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Node id → 2D coordinate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub positions: BTreeMap<String, Position>,
}

impl Layout {
    pub fn get(&self, id: &str) -> Option<Position> {
        self.positions.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

pub fn spring_layout(graph: &MentionGraph, config: &LayoutConfig) -> Result<Layout> {
    let g = &graph.graph;
    let n = g.node_count();
    if n == 0 {
        return Err(NetworkError::InvalidArgument(
            "graph has no nodes".to_string(),
        ));
    }

    let ids: Vec<&String> = g.node_weights().collect();
    if n == 1 {
        let mut positions = BTreeMap::new();
        positions.insert(ids[0].clone(), Position { x: 0.0, y: 0.0 });
        return Ok(Layout { positions });
    }

    // undirected neighbour pairs, each once; self-loops exert no force
    let springs: BTreeSet<(usize, usize)> = g
        .edge_indices()
        .filter_map(|e| g.edge_endpoints(e))
        .map(|(s, t)| (s.index().min(t.index()), s.index().max(t.index())))
        .filter(|(a, b)| a != b)
        .collect();

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut pos: Vec<[f64; 2]> = (0..n).map(|_| [rng.gen::<f64>(), rng.gen::<f64>()]).collect();

    let k = (1.0 / n as f64).sqrt();
    let mut temperature = 0.1 * extent(&pos);
    let cooling = temperature / (config.iterations as f64 + 1.0);

    for _ in 0..config.iterations {
        let mut displacement = vec![[0.0_f64; 2]; n];
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let dx = pos[i][0] - pos[j][0];
                let dy = pos[i][1] - pos[j][1];
                let distance = (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE);
                let repulsion = k * k / (distance * distance);
                displacement[i][0] += dx * repulsion;
                displacement[i][1] += dy * repulsion;
            }
        }
        for &(i, j) in &springs {
            let dx = pos[i][0] - pos[j][0];
            let dy = pos[i][1] - pos[j][1];
            let distance = (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE);
            let attraction = distance / k;
            displacement[i][0] -= dx * attraction;
            displacement[i][1] -= dy * attraction;
            displacement[j][0] += dx * attraction;
            displacement[j][1] += dy * attraction;
        }
        for (p, d) in pos.iter_mut().zip(&displacement) {
            let length = (d[0] * d[0] + d[1] * d[1]).sqrt().max(MIN_DISTANCE);
            p[0] += d[0] * temperature / length;
            p[1] += d[1] * temperature / length;
        }
        temperature -= cooling;
    }

    rescale(&mut pos);
    debug!(nodes = n, iterations = config.iterations, "spring layout done");

    let positions = ids
        .into_iter()
        .zip(pos)
        .map(|(id, [x, y])| (id.clone(), Position { x, y }))
        .collect();
    Ok(Layout { positions })
}

fn extent(pos: &[[f64; 2]]) -> f64 {
    let span = |axis: usize| {
        let (lo, hi) = pos.iter().fold((f64::MAX, f64::MIN), |(lo, hi), p| {
            (lo.min(p[axis]), hi.max(p[axis]))
        });
        hi - lo
    };
    span(0).max(span(1))
}

fn rescale(pos: &mut [[f64; 2]]) {
    let n = pos.len() as f64;
    let mean_x = pos.iter().map(|p| p[0]).sum::<f64>() / n;
    let mean_y = pos.iter().map(|p| p[1]).sum::<f64>() / n;
    for p in pos.iter_mut() {
        p[0] -= mean_x;
        p[1] -= mean_y;
    }
    let limit = pos
        .iter()
        .flat_map(|p| [p[0].abs(), p[1].abs()])
        .fold(0.0_f64, f64::max);
    if limit > 0.0 {
        for p in pos.iter_mut() {
            p[0] /= limit;
            p[1] /= limit;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> MentionGraph {
        let mut graph = MentionGraph::new();
        graph.add_edge("alice", "bob");
        graph.add_edge("carol", "alice");
        graph.add_edge("bob", "alice");
        graph
    }

    #[test]
    fn test_empty_graph_rejected() {
        let err = spring_layout(&MentionGraph::new(), &LayoutConfig::default()).unwrap_err();
        match err {
            NetworkError::InvalidArgument(msg) => assert!(msg.contains("no nodes")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_single_node_at_origin() {
        let mut graph = MentionGraph::new();
        graph.add_edge("alice", "alice");
        let layout = spring_layout(&graph, &LayoutConfig::default()).unwrap();
        assert_eq!(layout.get("alice"), Some(Position { x: 0.0, y: 0.0 }));
    }

    #[test]
    fn test_every_node_placed_within_bounds() {
        let layout = spring_layout(&triangle(), &LayoutConfig::default()).unwrap();
        assert_eq!(layout.len(), 3);
        for p in layout.positions.values() {
            assert!(p.x.is_finite() && p.y.is_finite());
            assert!(p.x.abs() <= 1.0 + 1e-9 && p.y.abs() <= 1.0 + 1e-9);
        }
    }

    #[test]
    fn test_same_seed_same_layout() {
        let config = LayoutConfig { iterations: 30, seed: 7 };
        let a = spring_layout(&triangle(), &config).unwrap();
        let b = spring_layout(&triangle(), &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_reciprocal_mentions_pull_like_one_edge() {
        let mut one_way = MentionGraph::new();
        one_way.add_edge("alice", "bob");
        one_way.add_edge("bob", "carol");
        let mut both_ways = one_way.clone();
        both_ways.add_edge("bob", "alice");

        let config = LayoutConfig { iterations: 20, seed: 11 };
        assert_eq!(
            spring_layout(&one_way, &config).unwrap(),
            spring_layout(&both_ways, &config).unwrap()
        );
    }

    #[test]
    fn test_connected_nodes_end_closer() {
        let mut graph = MentionGraph::new();
        graph.add_edge("a", "b");
        graph.add_edge("c", "d");
        graph.add_edge("a", "c");
        let layout = spring_layout(&graph, &LayoutConfig::default()).unwrap();
        let dist = |u: &str, v: &str| {
            let (p, q) = (layout.get(u).unwrap(), layout.get(v).unwrap());
            ((p.x - q.x).powi(2) + (p.y - q.y).powi(2)).sqrt()
        };
        assert!(dist("a", "b") < dist("b", "d"));
    }

    #[test]
    fn test_large_sparse_graph_without_iterations() {
        // a dense n×n structure at this size would need ~10 GB
        let mut graph = MentionGraph::new();
        for i in 0..100_000 {
            graph.add_edge(&format!("u{i}"), &format!("u{}", i + 1));
        }
        let config = LayoutConfig { iterations: 0, seed: 5 };
        let layout = spring_layout(&graph, &config).unwrap();
        assert_eq!(layout.len(), 100_001);
    }

    #[test]
    fn test_zero_iterations_still_rescaled() {
        let config = LayoutConfig { iterations: 0, seed: 1 };
        let layout = spring_layout(&triangle(), &config).unwrap();
        let max = layout
            .positions
            .values()
            .flat_map(|p| [p.x.abs(), p.y.abs()])
            .fold(0.0_f64, f64::max);
        assert!((max - 1.0).abs() < 1e-9);
    }
}
