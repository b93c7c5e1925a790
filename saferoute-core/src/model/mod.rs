//! Data model for time-aware road routing
//!
//! Contains the time-bucket partition of the day and the in-memory
//! road subgraph types.

pub mod road;
pub mod time;

pub use road::{IndexedPoint, NodeId, RoadEdge, RoadNode, RouteGraph};
pub use time::TimeBucket;
