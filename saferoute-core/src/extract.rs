//! Subgraph extraction: materializes a bounded window of the
//! persistent road graph as an in-memory [`RouteGraph`] for one time
//! bucket.

use geo::{Coord, LineString, Point};
use hashbrown::HashMap;
use log::{debug, info, warn};

use crate::Error;
use crate::model::{NodeId, RoadEdge, RoadNode, RouteGraph, TimeBucket};
use crate::store::{BoundingBox, EdgeRow, GraphStore};

/// Builds a fresh subgraph for `bbox` and `bucket` from the store.
///
/// A failed node query is fatal; a failed edge query is not. The
/// nodes-only graph is still returned so the caller degrades to "no
/// route" instead of an outage. Edge rows referencing nodes outside
/// the window are skipped, so every materialized edge has both
/// endpoints in the subgraph.
///
/// # Errors
///
/// [`Error::NoDataInRegion`] when the window contains no nodes,
/// [`Error::StoreUnavailable`] when the node query fails.
pub fn extract_subgraph(
    store: &dyn GraphStore,
    bbox: &BoundingBox,
    bucket: TimeBucket,
) -> Result<RouteGraph, Error> {
    let nodes = store.nodes_in_bbox(bbox)?;
    if nodes.is_empty() {
        return Err(Error::NoDataInRegion);
    }
    debug!("Fetched {} nodes for {bbox:?}", nodes.len());

    let mut graph = RouteGraph::new(bucket, *bbox);
    let mut by_id = HashMap::with_capacity(nodes.len());
    for row in &nodes {
        let index = graph.add_node(RoadNode {
            id: row.id,
            geometry: Point::new(row.lon, row.lat),
        });
        by_id.insert(row.id, index);
    }

    let ids: Vec<NodeId> = nodes.iter().map(|n| n.id).collect();
    match store.edges_between(&ids, bucket) {
        Ok(edge_rows) => {
            for row in edge_rows {
                let (Some(&source), Some(&target)) = (by_id.get(&row.source), by_id.get(&row.target))
                else {
                    // Far endpoint fell outside the window
                    continue;
                };
                graph.add_edge(source, target, materialize_edge(row));
            }
        }
        Err(e) => {
            // Best effort: a nodes-only graph is still a valid (if
            // useless) subgraph and must not fail the whole request.
            warn!("Edge fetch failed for {bbox:?}, continuing with nodes only: {e}");
        }
    }

    graph.build_index();
    info!(
        "Subgraph built for {}: {} nodes, {} edges",
        bucket,
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}

/// Applies the default/coercion rules to one store row: missing or
/// non-finite length/risk become 0.0, negatives are clamped to 0.0,
/// and a malformed (odd-length) coordinate list means "no geometry".
fn materialize_edge(row: EdgeRow) -> RoadEdge {
    RoadEdge {
        length: coerce_non_negative(row.length),
        risk: coerce_non_negative(row.risk),
        geometry: row.geometry.and_then(parse_flat_geometry),
    }
}

fn coerce_non_negative(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => v.max(0.0),
        _ => 0.0,
    }
}

/// Rebuilds a linestring from the store's flattened (lon, lat) list.
fn parse_flat_geometry(flat: Vec<f64>) -> Option<LineString<f64>> {
    if flat.is_empty() || flat.len() % 2 != 0 {
        return None;
    }
    Some(LineString::from_iter(
        flat.chunks_exact(2).map(|c| Coord { x: c[0], y: c[1] }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn odd_length_geometry_is_dropped() {
        assert!(parse_flat_geometry(vec![1.0, 2.0, 3.0]).is_none());
        assert!(parse_flat_geometry(vec![]).is_none());
        let line = parse_flat_geometry(vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(line.0.len(), 2);
        assert_eq!(line.0[1], Coord { x: 3.0, y: 4.0 });
    }

    #[test]
    fn missing_values_default_to_zero() {
        let edge = materialize_edge(EdgeRow {
            source: 1,
            target: 2,
            length: None,
            risk: Some(f64::NAN),
            geometry: None,
        });
        assert_eq!(edge.length, 0.0);
        assert_eq!(edge.risk, 0.0);
    }

    #[test]
    fn negative_values_are_clamped() {
        let edge = materialize_edge(EdgeRow {
            source: 1,
            target: 2,
            length: Some(-5.0),
            risk: Some(-1.0),
            geometry: None,
        });
        assert_eq!(edge.length, 0.0);
        assert_eq!(edge.risk, 0.0);
    }
}
