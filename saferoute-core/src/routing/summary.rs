//! Route summarization: metrics and geometry derived from a node path.

use std::fmt;

use geo::{Coord, LineString};
use geojson::{Feature, Geometry, JsonObject, Value as GeoJsonValue};
use itertools::Itertools;
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::Error;
use crate::config::EngineConfig;
use crate::model::RouteGraph;
use crate::routing::Weight;

/// Average-risk score at or above which a route is classified as
/// low-danger. The score is a *safety* score: larger is safer.
pub const LOW_DANGER_SCORE: f64 = 7.0;
/// Score at or above which (but below [`LOW_DANGER_SCORE`]) a route is
/// classified as medium-danger.
pub const MEDIUM_DANGER_SCORE: f64 = 4.0;

/// Danger classification of a route. `Low` sits at the *high* end of
/// the numeric safety scale; that polarity is the source dataset's
/// convention and is preserved exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SafetyLevel {
    Low,
    Medium,
    High,
}

impl SafetyLevel {
    pub fn classify(safety_score: f64) -> Self {
        if safety_score >= LOW_DANGER_SCORE {
            SafetyLevel::Low
        } else if safety_score >= MEDIUM_DANGER_SCORE {
            SafetyLevel::Medium
        } else {
            SafetyLevel::High
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SafetyLevel::Low => "Low",
            SafetyLevel::Medium => "Medium",
            SafetyLevel::High => "High",
        }
    }
}

impl fmt::Display for SafetyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate metrics of a computed route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteMetrics {
    pub distance_km: f64,
    pub duration_minutes: f64,
    pub safety_level: SafetyLevel,
    /// Average per-edge risk score, larger is safer
    pub safety_score: f64,
}

/// A computed route: its physical geometry as (lat, lon) pairs plus
/// the aggregate metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub coordinates: Vec<(f64, f64)>,
    pub metrics: RouteMetrics,
}

impl Route {
    /// Renders the route as a `GeoJSON` LineString feature with the
    /// metrics attached as properties.
    pub fn to_geojson(&self) -> Feature {
        let coords: Vec<Coord<f64>> = self
            .coordinates
            .iter()
            .map(|&(lat, lon)| Coord { x: lon, y: lat })
            .collect();
        let line = LineString::new(coords);

        let mut properties = JsonObject::new();
        properties.insert("distance_km".into(), json!(self.metrics.distance_km));
        properties.insert(
            "duration_minutes".into(),
            json!(self.metrics.duration_minutes),
        );
        properties.insert(
            "safety_level".into(),
            json!(self.metrics.safety_level.as_str()),
        );
        properties.insert("safety_score".into(), json!(self.metrics.safety_score));

        Feature {
            bbox: None,
            geometry: Some(Geometry::new(GeoJsonValue::from(&line))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        }
    }
}

/// Walks `path` and derives geometry and metrics.
///
/// For every consecutive node pair the minimum-cost parallel edge
/// under the *same* weight the search ran with is selected, so the
/// reported metrics describe the path the search actually chose.
///
/// # Errors
///
/// [`Error::Internal`] when a consecutive pair has no connecting edge,
/// which a path produced by the search cannot exhibit.
pub fn summarize(
    graph: &RouteGraph,
    path: &[NodeIndex],
    weight: Weight,
    config: &EngineConfig,
) -> Result<Route, Error> {
    let mut total_length = 0.0;
    let mut total_risk = 0.0;
    let mut edges_traversed = 0usize;
    let mut coordinates: Vec<(f64, f64)> = Vec::with_capacity(path.len());

    if let [only] = path {
        if let Some(node) = graph.node(*only) {
            coordinates.push((node.geometry.y(), node.geometry.x()));
        }
    }

    for (&u, &v) in path.iter().tuple_windows() {
        let edge = graph.min_cost_edge(u, v, weight).ok_or_else(|| {
            Error::Internal(format!(
                "path step {:?} -> {:?} has no edge in the subgraph",
                u, v
            ))
        })?;

        total_length += edge.length;
        total_risk += edge.risk;
        edges_traversed += 1;

        match &edge.geometry {
            Some(line) => {
                for coord in &line.0 {
                    push_coord(&mut coordinates, (coord.y, coord.x));
                }
            }
            None => {
                // Straight segment between the endpoints
                for index in [u, v] {
                    if let Some(node) = graph.node(index) {
                        push_coord(&mut coordinates, (node.geometry.y(), node.geometry.x()));
                    }
                }
            }
        }
    }

    let safety_score = if edges_traversed > 0 {
        total_risk / edges_traversed as f64
    } else {
        0.0
    };
    let distance_km = total_length / 1000.0;
    let duration_minutes = distance_km / config.average_speed_kmh * 60.0;

    Ok(Route {
        coordinates,
        metrics: RouteMetrics {
            distance_km: round2(distance_km),
            duration_minutes: round2(duration_minutes),
            safety_level: SafetyLevel::classify(safety_score),
            safety_score: round2(safety_score),
        },
    })
}

/// Appends a coordinate, suppressing an exact repeat of the previous
/// one (consecutive segments share their junction vertex).
fn push_coord(coordinates: &mut Vec<(f64, f64)>, coord: (f64, f64)) {
    if coordinates.last() != Some(&coord) {
        coordinates.push(coord);
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_boundaries() {
        assert_eq!(SafetyLevel::classify(7.0), SafetyLevel::Low);
        assert_eq!(SafetyLevel::classify(6.99), SafetyLevel::Medium);
        assert_eq!(SafetyLevel::classify(4.0), SafetyLevel::Medium);
        assert_eq!(SafetyLevel::classify(3.99), SafetyLevel::High);
        assert_eq!(SafetyLevel::classify(0.0), SafetyLevel::High);
    }

    #[test]
    fn junction_vertices_are_not_repeated() {
        let mut coords = Vec::new();
        push_coord(&mut coords, (0.0, 0.0));
        push_coord(&mut coords, (0.0, 1.0));
        push_coord(&mut coords, (0.0, 1.0));
        push_coord(&mut coords, (0.0, 2.0));
        assert_eq!(coords, vec![(0.0, 0.0), (0.0, 1.0), (0.0, 2.0)]);
    }
}
