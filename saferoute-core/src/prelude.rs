// Re-export key components
pub use crate::cache::SubgraphCache;
pub use crate::config::EngineConfig;
pub use crate::error::Error;
pub use crate::extract::extract_subgraph;
pub use crate::routing::{Route, RouteMetrics, RouteMode, RouteRequest, SafetyLevel, compute_route};

// Core types for the road network
pub use crate::model::{NodeId, RoadEdge, RoadNode, RouteGraph, TimeBucket};

// Store boundary
pub use crate::store::{BoundingBox, EdgeRow, GraphStore, MemoryStore, NodeRow};
