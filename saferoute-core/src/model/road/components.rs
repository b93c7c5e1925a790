//! Road network components - intersections and directed road segments

use geo::{LineString, Point};

/// Store-assigned node identifier (OSM id in the reference dataset).
pub type NodeId = i64;

/// Road graph node (an intersection).
#[derive(Debug, Clone)]
pub struct RoadNode {
    /// Store-assigned id of the node
    pub id: NodeId,
    /// Node coordinates, (x, y) = (lon, lat)
    pub geometry: Point<f64>,
}

/// Directed road segment. Parallel segments between the same endpoint
/// pair are legal and kept as distinct edges.
#[derive(Debug, Clone)]
pub struct RoadEdge {
    /// Segment length in meters, never negative
    pub length: f64,
    /// Risk score for the bucket the owning subgraph was built for.
    /// Larger is safer; missing store values default to 0.0.
    pub risk: f64,
    /// Physical shape of the segment; `None` implies a straight line
    /// between the endpoints
    pub geometry: Option<LineString<f64>>,
}
