//! In-memory [`GraphStore`] used by tests and offline development.

use hashbrown::HashMap;

use super::{BoundingBox, EdgeRow, GraphStore, NodeRow};
use crate::Error;
use crate::model::TimeBucket;

/// Stored edge: endpoints, length, per-bucket risks and optional
/// flattened (lon, lat) geometry.
#[derive(Debug, Clone)]
struct StoredEdge {
    source: i64,
    target: i64,
    length: Option<f64>,
    risks: HashMap<TimeBucket, f64>,
    geometry: Option<Vec<f64>>,
}

/// Linear-scan property-graph store. Not optimized, but shaped exactly
/// like the persistent store's query surface, so tests exercise the
/// same extraction path production does.
#[derive(Debug, Default)]
pub struct MemoryStore {
    nodes: Vec<NodeRow>,
    edges: Vec<StoredEdge>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_node(&mut self, id: i64, lat: f64, lon: f64) -> &mut Self {
        self.nodes.push(NodeRow { id, lat, lon });
        self
    }

    /// Inserts a directed edge with a risk value for a single bucket.
    pub fn insert_edge(
        &mut self,
        source: i64,
        target: i64,
        length: f64,
        bucket: TimeBucket,
        risk: f64,
    ) -> &mut Self {
        self.insert_edge_full(source, target, Some(length), [(bucket, risk)], None)
    }

    /// Full-control insert for fixtures: sparse length, any number of
    /// bucket risks and an optional flattened geometry.
    pub fn insert_edge_full(
        &mut self,
        source: i64,
        target: i64,
        length: Option<f64>,
        risks: impl IntoIterator<Item = (TimeBucket, f64)>,
        geometry: Option<Vec<f64>>,
    ) -> &mut Self {
        self.edges.push(StoredEdge {
            source,
            target,
            length,
            risks: risks.into_iter().collect(),
            geometry,
        });
        self
    }
}

impl GraphStore for MemoryStore {
    fn nodes_in_bbox(&self, bbox: &BoundingBox) -> Result<Vec<NodeRow>, Error> {
        Ok(self
            .nodes
            .iter()
            .filter(|n| bbox.contains(n.lat, n.lon))
            .copied()
            .collect())
    }

    fn edges_between(&self, node_ids: &[i64], bucket: TimeBucket) -> Result<Vec<EdgeRow>, Error> {
        let ids: hashbrown::HashSet<i64> = node_ids.iter().copied().collect();
        Ok(self
            .edges
            .iter()
            .filter(|e| ids.contains(&e.source) && ids.contains(&e.target))
            .map(|e| EdgeRow {
                source: e.source,
                target: e.target,
                length: e.length,
                risk: e.risks.get(&bucket).copied(),
                geometry: e.geometry.clone(),
            })
            .collect())
    }
}
