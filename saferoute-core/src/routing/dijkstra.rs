//! Weighted shortest-path search over the routing subgraph.

use std::{cmp::Ordering, collections::BinaryHeap};

use hashbrown::HashMap;
use petgraph::{graph::NodeIndex, visit::EdgeRef};

use crate::Error;
use crate::model::RouteGraph;
use crate::routing::Weight;

#[derive(Copy, Clone)]
struct State {
    cost: f64,
    node: NodeIndex,
}

// Min-heap by cost (reversed from standard Rust BinaryHeap); f64
// ordering via total_cmp, infinite-cost states never enter the heap.
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other.cost.total_cmp(&self.cost)
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost
    }
}

impl Eq for State {}

/// Dijkstra from `start` to `goal` under the selected weight.
///
/// Every outgoing edge is relaxed individually, so among parallel
/// edges the minimum-cost one determines the distance, the same
/// reduction [`RouteGraph::min_cost_edge`] applies when the summarizer
/// re-walks the path. Edges with infinite cost are unusable.
///
/// Returns the node sequence from `start` to `goal` inclusive; a
/// single node when they coincide.
///
/// # Errors
///
/// [`Error::NoRouteFound`] when `goal` is unreachable. Never returns a
/// partial route.
pub fn shortest_path(
    graph: &RouteGraph,
    start: NodeIndex,
    goal: NodeIndex,
    weight: Weight,
) -> Result<Vec<NodeIndex>, Error> {
    if start == goal {
        return Ok(vec![start]);
    }

    let estimated_nodes = graph.node_count().min(1000);
    let mut distances: HashMap<NodeIndex, f64> = HashMap::with_capacity(estimated_nodes);
    let mut predecessors: HashMap<NodeIndex, NodeIndex> = HashMap::with_capacity(estimated_nodes);
    let mut heap = BinaryHeap::with_capacity(estimated_nodes / 4);

    heap.push(State {
        cost: 0.0,
        node: start,
    });
    distances.insert(start, 0.0);

    while let Some(State { cost, node }) = heap.pop() {
        if node == goal {
            break;
        }

        // Skip if we've already found a better path
        if let Some(&best) = distances.get(&node) {
            if cost > best {
                continue;
            }
        }

        for edge in graph.edges(node) {
            let next = edge.target();
            let edge_cost = weight.edge_cost(edge.weight());
            if edge_cost.is_infinite() {
                continue;
            }
            let next_cost = cost + edge_cost;

            match distances.entry(next) {
                hashbrown::hash_map::Entry::Vacant(entry) => {
                    entry.insert(next_cost);
                    heap.push(State {
                        cost: next_cost,
                        node: next,
                    });
                    predecessors.insert(next, node);
                }
                hashbrown::hash_map::Entry::Occupied(mut entry) => {
                    if next_cost < *entry.get() {
                        *entry.get_mut() = next_cost;
                        heap.push(State {
                            cost: next_cost,
                            node: next,
                        });
                        predecessors.insert(next, node);
                    }
                }
            }
        }
    }

    if !predecessors.contains_key(&goal) {
        return Err(Error::NoRouteFound);
    }

    // Follow predecessors backward from goal to start
    let mut path = Vec::new();
    let mut current = goal;
    while current != start {
        path.push(current);
        match predecessors.get(&current) {
            Some(&prev) => current = prev,
            None => return Err(Error::NoRouteFound),
        }
    }
    path.push(start);
    path.reverse();
    Ok(path)
}
