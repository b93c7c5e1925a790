//! Core routing engine for time-aware safe-route computation.
//!
//! Answers "what is the safest/fastest route between two points at a
//! given time of day" over a road network whose segments carry
//! per-time-bucket risk scores:
//!
//! 1. the query time is floored to a [`model::TimeBucket`];
//! 2. a bounded window of the persistent graph ([`store::GraphStore`])
//!    is materialized as an in-memory [`model::RouteGraph`], memoized
//!    by the [`cache::SubgraphCache`];
//! 3. a [`routing::Weight`] selected from the routing mode drives a
//!    shortest-path search;
//! 4. the resulting node walk is summarized into a [`routing::Route`]
//!    with geometry, distance, duration estimate and a safety
//!    classification.
//!
//! The HTTP surface and the concrete store client live outside this
//! crate; see `saferoute-server`.

pub mod cache;
pub mod config;
pub mod error;
pub mod extract;
pub mod model;
pub mod prelude;
pub mod routing;
pub mod store;

pub use cache::SubgraphCache;
pub use config::EngineConfig;
pub use error::Error;
pub use extract::extract_subgraph;
pub use model::{RouteGraph, TimeBucket};
pub use routing::{Route, RouteMetrics, RouteMode, RouteRequest, SafetyLevel, compute_route};
pub use store::{BoundingBox, GraphStore};
