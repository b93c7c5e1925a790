//! In-memory routing subgraph with a spatial index over its nodes.

use petgraph::Directed;
use petgraph::graph::{Edges, Graph, NodeIndex};
use rstar::{AABB, PointDistance, RTree, RTreeObject};

use super::components::{RoadEdge, RoadNode};
use crate::model::TimeBucket;
use crate::routing::Weight;
use crate::store::BoundingBox;

/// Graph node reference stored in the R-tree.
#[derive(Debug, Clone, Copy)]
pub struct IndexedPoint {
    /// (lon, lat), matching the `x`/`y` of the node geometry
    pub point: [f64; 2],
    pub node: NodeIndex,
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for IndexedPoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

/// Directed multigraph over a bounded window of the road network,
/// materialized for one time bucket.
///
/// Once published to the subgraph cache an instance is shared
/// read-only and must not be mutated.
#[derive(Debug, Clone)]
pub struct RouteGraph {
    pub graph: Graph<RoadNode, RoadEdge, Directed>,
    index: RTree<IndexedPoint>,
    bucket: TimeBucket,
    bbox: BoundingBox,
}

impl RouteGraph {
    pub fn new(bucket: TimeBucket, bbox: BoundingBox) -> Self {
        Self {
            graph: Graph::default(),
            index: RTree::new(),
            bucket,
            bbox,
        }
    }

    /// The time bucket whose risk values this subgraph carries.
    pub fn bucket(&self) -> TimeBucket {
        self.bucket
    }

    /// The geographic window this subgraph was extracted for.
    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn add_node(&mut self, node: RoadNode) -> NodeIndex {
        self.graph.add_node(node)
    }

    pub fn add_edge(&mut self, source: NodeIndex, target: NodeIndex, edge: RoadEdge) {
        self.graph.add_edge(source, target, edge);
    }

    /// Bulk-loads the spatial index from the current node set. Called
    /// once by the extractor after all nodes are inserted.
    pub fn build_index(&mut self) {
        let points: Vec<IndexedPoint> = self
            .graph
            .node_indices()
            .map(|idx| IndexedPoint {
                point: [self.graph[idx].geometry.x(), self.graph[idx].geometry.y()],
                node: idx,
            })
            .collect();
        self.index = RTree::bulk_load(points);
    }

    pub fn node(&self, index: NodeIndex) -> Option<&RoadNode> {
        self.graph.node_weight(index)
    }

    /// Outgoing edges of a node, parallels included.
    pub fn edges(&self, node: NodeIndex) -> Edges<'_, RoadEdge, Directed> {
        self.graph.edges(node)
    }

    /// Node closest to the query point by planar (lat, lon) Euclidean
    /// distance. Not geodesic: acceptable for the small windows this
    /// engine extracts, and matches the nearest-node semantics routes
    /// were historically computed with. Tie-break is whatever the
    /// R-tree returns first.
    pub fn nearest_node(&self, lat: f64, lon: f64) -> Option<NodeIndex> {
        self.index.nearest_neighbor(&[lon, lat]).map(|p| p.node)
    }

    /// Minimum-cost edge among the parallels from `source` to `target`
    /// under `weight`.
    ///
    /// Both the path search and the route summarizer reduce parallels
    /// through this single helper so reported metrics always describe
    /// the edges the search actually used.
    pub fn min_cost_edge(
        &self,
        source: NodeIndex,
        target: NodeIndex,
        weight: Weight,
    ) -> Option<&RoadEdge> {
        self.graph
            .edges_connecting(source, target)
            .map(|e| e.weight())
            .min_by(|a, b| weight.edge_cost(a).total_cmp(&weight.edge_cost(b)))
    }
}
