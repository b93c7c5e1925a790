//! PostgreSQL-backed [`GraphStore`].
//!
//! Expected schema, populated by the offline import pipeline:
//!
//! ```sql
//! CREATE TABLE road_nodes (
//!     id  BIGINT PRIMARY KEY,
//!     lat DOUBLE PRECISION NOT NULL,
//!     lon DOUBLE PRECISION NOT NULL
//! );
//! CREATE TABLE road_edges (
//!     source_id BIGINT NOT NULL REFERENCES road_nodes (id),
//!     target_id BIGINT NOT NULL REFERENCES road_nodes (id),
//!     length_m  DOUBLE PRECISION,
//!     -- risk scores keyed by the bucket-qualified attribute name,
//!     -- e.g. {"risk_09:00:00": 5.0}
//!     risks     JSONB NOT NULL DEFAULT '{}',
//!     -- flattened (lon, lat) vertex list
//!     geometry  DOUBLE PRECISION[]
//! );
//! ```

use std::time::Duration;

use postgres::NoTls;
use r2d2_postgres::PostgresConnectionManager;
use tracing::info;

use saferoute_core::store::{BoundingBox, EdgeRow, GraphStore, NodeRow};
use saferoute_core::{Error, TimeBucket};

use crate::config::DatabaseConfig;

type Pool = r2d2::Pool<PostgresConnectionManager<NoTls>>;

pub struct PgStore {
    pool: Pool,
}

impl PgStore {
    /// Opens the connection pool and verifies connectivity with one
    /// round-trip. The caller treats a failure here as fatal: the
    /// process must not come up without its store.
    ///
    /// # Errors
    ///
    /// [`Error::StoreUnavailable`] on any connection or query failure.
    pub fn connect(config: &DatabaseConfig) -> Result<Self, Error> {
        let mut pg_config: postgres::Config = config
            .url
            .parse()
            .map_err(|e| Error::StoreUnavailable(format!("bad database url: {e}")))?;
        pg_config.options(&format!(
            "-c statement_timeout={}",
            config.statement_timeout_ms
        ));

        let manager = PostgresConnectionManager::new(pg_config, NoTls);
        let pool = r2d2::Pool::builder()
            .max_size(config.pool_size)
            .connection_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build(manager)
            .map_err(store_error)?;

        pool.get()
            .map_err(store_error)?
            .query_one("SELECT 1", &[])
            .map_err(store_error)?;
        info!("Connected to road graph store");
        Ok(Self { pool })
    }
}

impl GraphStore for PgStore {
    fn nodes_in_bbox(&self, bbox: &BoundingBox) -> Result<Vec<NodeRow>, Error> {
        let mut conn = self.pool.get().map_err(store_error)?;
        let rows = conn
            .query(
                "SELECT id, lat, lon FROM road_nodes \
                 WHERE lat BETWEEN $1 AND $2 AND lon BETWEEN $3 AND $4",
                &[&bbox.min_lat, &bbox.max_lat, &bbox.min_lon, &bbox.max_lon],
            )
            .map_err(store_error)?;

        Ok(rows
            .iter()
            .map(|row| NodeRow {
                id: row.get(0),
                lat: row.get(1),
                lon: row.get(2),
            })
            .collect())
    }

    fn edges_between(&self, node_ids: &[i64], bucket: TimeBucket) -> Result<Vec<EdgeRow>, Error> {
        let mut conn = self.pool.get().map_err(store_error)?;
        let rows = conn
            .query(
                "SELECT source_id, target_id, length_m, risks ->> $2, geometry \
                 FROM road_edges \
                 WHERE source_id = ANY($1) AND target_id = ANY($1)",
                &[&node_ids, &bucket.risk_attr()],
            )
            .map_err(store_error)?;

        Ok(rows
            .iter()
            .map(|row| EdgeRow {
                source: row.get(0),
                target: row.get(1),
                length: row.get(2),
                // Non-numeric risk values are treated as absent; the
                // extractor defaults them to 0.0.
                risk: row
                    .get::<_, Option<String>>(3)
                    .and_then(|raw| raw.parse().ok()),
                geometry: row.get(4),
            })
            .collect())
    }
}

fn store_error(e: impl std::fmt::Display) -> Error {
    Error::StoreUnavailable(e.to_string())
}
