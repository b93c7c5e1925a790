//! Boundary to the persistent property-graph store.
//!
//! The engine never talks to a database directly; it consumes rows
//! through [`GraphStore`], injected by reference into every extraction
//! call. The process owns the concrete client and its lifecycle: it is
//! opened once at startup (connectivity failure there is fatal) and
//! closed on shutdown.

pub mod memory;

use serde::{Deserialize, Serialize};

use crate::Error;
use crate::model::TimeBucket;

pub use memory::MemoryStore;

/// Inclusive geographic window used for node retrieval and as part of
/// the subgraph cache key.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Envelope of the source/destination pair expanded by
    /// `buffer_degrees` on every side.
    pub fn around(source: (f64, f64), dest: (f64, f64), buffer_degrees: f64) -> Self {
        let (src_lat, src_lon) = source;
        let (dst_lat, dst_lon) = dest;
        Self {
            min_lat: src_lat.min(dst_lat) - buffer_degrees,
            max_lat: src_lat.max(dst_lat) + buffer_degrees,
            min_lon: src_lon.min(dst_lon) - buffer_degrees,
            max_lon: src_lon.max(dst_lon) + buffer_degrees,
        }
    }

    /// Inclusive containment check, matching the store-side predicate.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }
}

/// Node row as returned by the store.
#[derive(Debug, Clone, Copy)]
pub struct NodeRow {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,
}

/// Directed edge row as returned by the store. Optional fields mirror
/// sparse store properties; the extractor applies the default rules.
#[derive(Debug, Clone)]
pub struct EdgeRow {
    pub source: i64,
    pub target: i64,
    /// Segment length in meters
    pub length: Option<f64>,
    /// Value of the bucket-qualified risk attribute requested with the
    /// query; `None` when the property is absent for that bucket
    pub risk: Option<f64>,
    /// Flattened (lon, lat) vertex list of the segment shape
    pub geometry: Option<Vec<f64>>,
}

/// Read access to the persistent road graph.
///
/// Implementations must be safe to share across request threads and
/// should bound each round-trip with a timeout so one slow query
/// cannot stall unrelated requests.
pub trait GraphStore: Send + Sync {
    /// All nodes whose coordinates fall within `bbox` (inclusive).
    fn nodes_in_bbox(&self, bbox: &BoundingBox) -> Result<Vec<NodeRow>, Error>;

    /// All directed edges with *both* endpoints in `node_ids`, with the
    /// risk value read from the attribute qualified by `bucket`.
    fn edges_between(&self, node_ids: &[i64], bucket: TimeBucket) -> Result<Vec<EdgeRow>, Error>;
}
