//! Route computation: weight selection, shortest-path search and
//! summarization, tied together by [`compute_route`].

pub mod dijkstra;
pub mod summary;
pub mod weight;

pub use dijkstra::shortest_path;
pub use summary::{Route, RouteMetrics, SafetyLevel, summarize};
pub use weight::{RouteMode, Weight};

use log::debug;

use crate::Error;
use crate::cache::SubgraphCache;
use crate::config::EngineConfig;
use crate::model::TimeBucket;
use crate::store::{BoundingBox, GraphStore};

/// One routing query as handed over by the boundary layer. Time and
/// mode stay raw strings so their validation errors carry the engine's
/// taxonomy, not the transport's.
#[derive(Debug, Clone)]
pub struct RouteRequest {
    /// (lat, lon) of the trip start
    pub source: (f64, f64),
    /// (lat, lon) of the trip end
    pub dest: (f64, f64),
    /// Time of day, `HH:MM:SS`
    pub time: String,
    /// Routing mode token: `fastest`, `safest` or `safest_fastest`
    pub mode: String,
}

/// Computes the best route for `request`.
///
/// Pipeline: validate → bin the time → select the weight → fetch the
/// subgraph through the cache → resolve nearest nodes → shortest path
/// → summarize.
///
/// # Errors
///
/// Any kind of the engine taxonomy; see [`Error`].
pub fn compute_route(
    store: &dyn GraphStore,
    cache: &SubgraphCache,
    config: &EngineConfig,
    request: &RouteRequest,
) -> Result<Route, Error> {
    validate_coordinate("source", request.source)?;
    validate_coordinate("destination", request.dest)?;
    let bucket = TimeBucket::from_time_str(&request.time)?;
    let mode: RouteMode = request.mode.parse()?;
    let weight = mode.weight();

    let bbox = BoundingBox::around(request.source, request.dest, config.buffer_degrees);
    let graph = cache.get_or_extract(store, &bbox, bucket)?;

    // Extraction guarantees a non-empty node set, so resolution only
    // fails if the index is out of sync with the graph.
    let start = graph
        .nearest_node(request.source.0, request.source.1)
        .ok_or(Error::NoDataInRegion)?;
    let goal = graph
        .nearest_node(request.dest.0, request.dest.1)
        .ok_or(Error::NoDataInRegion)?;
    debug!("Routing {mode} in bucket {bucket}: {start:?} -> {goal:?}");

    let path = shortest_path(&graph, start, goal, weight)?;
    summarize(&graph, &path, weight, config)
}

fn validate_coordinate(field: &str, (lat, lon): (f64, f64)) -> Result<(), Error> {
    if !lat.is_finite() || !lon.is_finite() {
        return Err(Error::InvalidInput(format!(
            "{field} coordinates must be finite"
        )));
    }
    if !(-90.0..=90.0).contains(&lat) {
        return Err(Error::InvalidInput(format!(
            "{field} latitude {lat} out of range"
        )));
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(Error::InvalidInput(format!(
            "{field} longitude {lon} out of range"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_coordinates() {
        assert!(validate_coordinate("source", (91.0, 0.0)).is_err());
        assert!(validate_coordinate("source", (0.0, -181.0)).is_err());
        assert!(validate_coordinate("source", (f64::NAN, 0.0)).is_err());
        assert!(validate_coordinate("source", (90.0, 180.0)).is_ok());
    }
}
