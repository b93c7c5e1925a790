//! End-to-end tests of the route computation pipeline over the
//! in-memory store.

use saferoute_core::prelude::*;

fn request(source: (f64, f64), dest: (f64, f64), time: &str, mode: &str) -> RouteRequest {
    RouteRequest {
        source,
        dest,
        time: time.to_string(),
        mode: mode.to_string(),
    }
}

fn engine() -> (EngineConfig, SubgraphCache) {
    let config = EngineConfig::default();
    let cache = SubgraphCache::new(config.cache_capacity);
    (config, cache)
}

/// Two nodes, one edge, risk tagged for the 09:00 bucket.
fn single_edge_store() -> MemoryStore {
    let mut store = MemoryStore::new();
    store
        .insert_node(1, 0.0, 0.0)
        .insert_node(2, 0.0, 1.0)
        .insert_edge(1, 2, 1000.0, TimeBucket::H09, 5.0);
    store
}

/// A risky direct edge and a safer two-hop detour:
///
/// ```text
/// A(0,0) ──risk 10, 100 m──────────────> B(0,0.01)
///   └─risk 2, 150 m─> C(0.005,0.005) ──risk 3, 150 m──┘
/// ```
fn detour_store(bucket: TimeBucket) -> MemoryStore {
    let mut store = MemoryStore::new();
    store
        .insert_node(1, 0.0, 0.0)
        .insert_node(2, 0.0, 0.01)
        .insert_node(3, 0.005, 0.005)
        .insert_edge(1, 2, 100.0, bucket, 10.0)
        .insert_edge(1, 3, 150.0, bucket, 2.0)
        .insert_edge(3, 2, 150.0, bucket, 3.0);
    store
}

#[test]
fn reference_scenario_fastest() {
    let store = single_edge_store();
    let (config, cache) = engine();

    let route = compute_route(
        &store,
        &cache,
        &config,
        &request((0.0, 0.0), (0.0, 1.0), "10:00:00", "fastest"),
    )
    .unwrap();

    assert_eq!(route.coordinates, vec![(0.0, 0.0), (0.0, 1.0)]);
    assert_eq!(route.metrics.distance_km, 1.0);
    assert_eq!(route.metrics.safety_score, 5.0);
    assert_eq!(route.metrics.safety_level, SafetyLevel::Medium);
    // 1 km at 30 km/h
    assert_eq!(route.metrics.duration_minutes, 2.0);
}

#[test]
fn safest_mode_takes_the_low_risk_detour() {
    let store = detour_store(TimeBucket::H21);
    let (config, cache) = engine();

    let safest = compute_route(
        &store,
        &cache,
        &config,
        &request((0.0, 0.0), (0.0, 0.01), "22:30:00", "safest"),
    )
    .unwrap();

    // Detour through C: 300 m, risk (2 + 3) / 2
    assert_eq!(safest.metrics.distance_km, 0.3);
    assert_eq!(safest.metrics.safety_score, 2.5);
    assert_eq!(safest.metrics.safety_level, SafetyLevel::High);
    assert_eq!(
        safest.coordinates,
        vec![(0.0, 0.0), (0.005, 0.005), (0.0, 0.01)]
    );
}

#[test]
fn fastest_mode_takes_the_direct_edge() {
    let store = detour_store(TimeBucket::H21);
    let (config, cache) = engine();

    let fastest = compute_route(
        &store,
        &cache,
        &config,
        &request((0.0, 0.0), (0.0, 0.01), "22:30:00", "fastest"),
    )
    .unwrap();

    assert_eq!(fastest.metrics.distance_km, 0.1);
    assert_eq!(fastest.metrics.safety_score, 10.0);
    assert_eq!(fastest.metrics.safety_level, SafetyLevel::Low);
    assert_eq!(fastest.coordinates, vec![(0.0, 0.0), (0.0, 0.01)]);
}

#[test]
fn balanced_mode_mixes_length_and_risk() {
    // Direct: 0.5*10 + 0.5*100 = 55; detour: 0.5*2 + 0.5*150 = 76
    // plus 0.5*3 + 0.5*150 = 76.5, so the direct edge wins even though
    // it is riskier.
    let store = detour_store(TimeBucket::H21);
    let (config, cache) = engine();

    let route = compute_route(
        &store,
        &cache,
        &config,
        &request((0.0, 0.0), (0.0, 0.01), "21:00:00", "safest_fastest"),
    )
    .unwrap();
    assert_eq!(route.metrics.distance_km, 0.1);
}

#[test]
fn parallel_edges_use_the_cheapest_and_metrics_agree() {
    let mut store = MemoryStore::new();
    store
        .insert_node(1, 0.0, 0.0)
        .insert_node(2, 0.0, 0.01)
        // Two parallel segments; the search must use the short one and
        // the metrics must describe the same edge.
        .insert_edge(1, 2, 800.0, TimeBucket::H00, 1.0)
        .insert_edge(1, 2, 200.0, TimeBucket::H00, 9.0);
    let (config, cache) = engine();

    let route = compute_route(
        &store,
        &cache,
        &config,
        &request((0.0, 0.0), (0.0, 0.01), "01:30:00", "fastest"),
    )
    .unwrap();

    assert_eq!(route.metrics.distance_km, 0.2);
    assert_eq!(route.metrics.safety_score, 9.0);
}

#[test]
fn degenerate_same_node_route_is_all_zeros() {
    let store = single_edge_store();
    let (config, cache) = engine();

    let route = compute_route(
        &store,
        &cache,
        &config,
        // Both points resolve to node 1.
        &request((0.0, 0.0), (0.001, 0.0), "09:00:00", "safest"),
    )
    .unwrap();

    assert_eq!(route.coordinates.len(), 1);
    assert_eq!(route.metrics.distance_km, 0.0);
    assert_eq!(route.metrics.safety_score, 0.0);
    assert_eq!(route.metrics.duration_minutes, 0.0);
}

#[test]
fn disconnected_components_report_no_route() {
    let mut store = MemoryStore::new();
    store
        .insert_node(1, 0.0, 0.0)
        .insert_node(2, 0.0, 0.01)
        .insert_node(3, 0.02, 0.0)
        .insert_node(4, 0.02, 0.01)
        .insert_edge(1, 2, 100.0, TimeBucket::H00, 1.0)
        .insert_edge(3, 4, 100.0, TimeBucket::H00, 1.0);
    let (config, cache) = engine();

    let result = compute_route(
        &store,
        &cache,
        &config,
        &request((0.0, 0.0), (0.02, 0.01), "00:00:00", "fastest"),
    );
    assert!(matches!(result, Err(Error::NoRouteFound)));
}

#[test]
fn directed_edges_are_not_traversed_backwards() {
    let store = single_edge_store();
    let (config, cache) = engine();

    let result = compute_route(
        &store,
        &cache,
        &config,
        &request((0.0, 1.0), (0.0, 0.0), "09:00:00", "fastest"),
    );
    assert!(matches!(result, Err(Error::NoRouteFound)));
}

#[test]
fn empty_region_reports_no_data() {
    let store = single_edge_store();
    let (config, cache) = engine();

    let result = compute_route(
        &store,
        &cache,
        &config,
        &request((50.0, 50.0), (50.0, 50.1), "09:00:00", "fastest"),
    );
    assert!(matches!(result, Err(Error::NoDataInRegion)));
}

#[test]
fn invalid_inputs_are_rejected_up_front() {
    let store = single_edge_store();
    let (config, cache) = engine();

    let bad_time = compute_route(
        &store,
        &cache,
        &config,
        &request((0.0, 0.0), (0.0, 1.0), "59:00:00", "fastest"),
    );
    assert!(matches!(bad_time, Err(Error::InvalidInput(_))));

    let bad_mode = compute_route(
        &store,
        &cache,
        &config,
        &request((0.0, 0.0), (0.0, 1.0), "09:00:00", "shortest"),
    );
    assert!(matches!(bad_mode, Err(Error::InvalidRouteType(_))));

    let bad_coord = compute_route(
        &store,
        &cache,
        &config,
        &request((95.0, 0.0), (0.0, 1.0), "09:00:00", "fastest"),
    );
    assert!(matches!(bad_coord, Err(Error::InvalidInput(_))));
}

#[test]
fn risk_defaults_to_zero_outside_the_tagged_bucket() {
    let store = single_edge_store();
    let (config, cache) = engine();

    // The edge's risk is tagged for 09:00 only; at 15:30 it defaults
    // to 0.0, which classifies as high danger.
    let route = compute_route(
        &store,
        &cache,
        &config,
        &request((0.0, 0.0), (0.0, 1.0), "15:30:00", "safest"),
    )
    .unwrap();
    assert_eq!(route.metrics.safety_score, 0.0);
    assert_eq!(route.metrics.safety_level, SafetyLevel::High);
}

#[test]
fn edge_geometry_flows_into_route_coordinates() {
    let mut store = MemoryStore::new();
    store.insert_node(1, 0.0, 0.0).insert_node(2, 0.0, 0.01);
    // Flattened (lon, lat) list with an intermediate bend.
    store.insert_edge_full(
        1,
        2,
        Some(1200.0),
        [(TimeBucket::H00, 8.0)],
        Some(vec![0.0, 0.0, 0.005, 0.002, 0.01, 0.0]),
    );
    let (config, cache) = engine();

    let route = compute_route(
        &store,
        &cache,
        &config,
        &request((0.0, 0.0), (0.0, 0.01), "00:30:00", "safest"),
    )
    .unwrap();

    // Output is (lat, lon)
    assert_eq!(
        route.coordinates,
        vec![(0.0, 0.0), (0.002, 0.005), (0.0, 0.01)]
    );
    assert_eq!(route.metrics.safety_level, SafetyLevel::Low);

    let feature = route.to_geojson();
    let geometry = feature.geometry.unwrap();
    match geometry.value {
        geojson::Value::LineString { coordinates } => {
            // GeoJSON positions are (lon, lat) again
            assert_eq!(coordinates[1].as_slice(), &[0.005, 0.002]);
        }
        other => panic!("expected LineString, got {other:?}"),
    }
}

#[test]
fn malformed_geometry_falls_back_to_endpoints() {
    let mut store = MemoryStore::new();
    store.insert_node(1, 0.0, 0.0).insert_node(2, 0.0, 0.01);
    store.insert_edge_full(
        1,
        2,
        Some(500.0),
        [(TimeBucket::H00, 5.0)],
        // Odd element count: treated as "no geometry"
        Some(vec![0.0, 0.0, 0.005]),
    );
    let (config, cache) = engine();

    let route = compute_route(
        &store,
        &cache,
        &config,
        &request((0.0, 0.0), (0.0, 0.01), "00:00:00", "fastest"),
    )
    .unwrap();
    assert_eq!(route.coordinates, vec![(0.0, 0.0), (0.0, 0.01)]);
}

#[test]
fn failed_edge_fetch_degrades_to_nodes_only() {
    struct FlakyEdges(MemoryStore);

    impl GraphStore for FlakyEdges {
        fn nodes_in_bbox(&self, bbox: &BoundingBox) -> Result<Vec<NodeRow>, Error> {
            self.0.nodes_in_bbox(bbox)
        }

        fn edges_between(&self, _: &[i64], _: TimeBucket) -> Result<Vec<EdgeRow>, Error> {
            Err(Error::StoreUnavailable("edge query timed out".into()))
        }
    }

    let store = FlakyEdges(single_edge_store());
    let bbox = BoundingBox::around((0.0, 0.0), (0.0, 1.0), 0.06);
    let graph = extract_subgraph(&store, &bbox, TimeBucket::H09).unwrap();
    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.edge_count(), 0);

    // Best-effort subgraph still answers degenerate queries but can
    // never produce a crossing route.
    let (config, cache) = engine();
    let result = compute_route(
        &store,
        &cache,
        &config,
        &request((0.0, 0.0), (0.0, 1.0), "09:00:00", "fastest"),
    );
    assert!(matches!(result, Err(Error::NoRouteFound)));
}

#[test]
fn node_fetch_failure_is_fatal_to_the_call() {
    struct DownStore;

    impl GraphStore for DownStore {
        fn nodes_in_bbox(&self, _: &BoundingBox) -> Result<Vec<NodeRow>, Error> {
            Err(Error::StoreUnavailable("connection refused".into()))
        }

        fn edges_between(&self, _: &[i64], _: TimeBucket) -> Result<Vec<EdgeRow>, Error> {
            Ok(Vec::new())
        }
    }

    let bbox = BoundingBox::around((0.0, 0.0), (0.0, 1.0), 0.06);
    let result = extract_subgraph(&DownStore, &bbox, TimeBucket::H09);
    assert!(matches!(result, Err(Error::StoreUnavailable(_))));
}

#[test]
fn edges_crossing_the_window_boundary_are_not_materialized() {
    let mut store = MemoryStore::new();
    store
        .insert_node(1, 0.0, 0.0)
        .insert_node(2, 0.0, 0.01)
        // Far outside any window around the pair below.
        .insert_node(3, 10.0, 10.0)
        .insert_edge(1, 2, 100.0, TimeBucket::H00, 1.0)
        .insert_edge(2, 3, 100.0, TimeBucket::H00, 1.0);

    let bbox = BoundingBox::around((0.0, 0.0), (0.0, 0.01), 0.06);
    let graph = extract_subgraph(&store, &bbox, TimeBucket::H00).unwrap();
    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.edge_count(), 1);
}
