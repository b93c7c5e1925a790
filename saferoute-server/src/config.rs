//! Server configuration, deserialized from a TOML file.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use saferoute_core::EngineConfig;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address the HTTP listener binds to.
    pub bind: String,
    pub database: DatabaseConfig,
    pub http: HttpConfig,
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `postgres://` connection string of the road graph store.
    pub url: String,
    pub pool_size: u32,
    /// Budget for acquiring a pooled connection.
    pub connect_timeout_secs: u64,
    /// Per-query budget enforced server-side; one slow store query
    /// must not stall unrelated requests.
    pub statement_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Exact origins allowed by CORS; empty means any origin.
    pub allowed_origins: Vec<String>,
    /// Overall budget for one request, enforced at the boundary.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:5000".to_string(),
            database: DatabaseConfig::default(),
            http: HttpConfig::default(),
            engine: EngineConfig::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://saferoute@localhost/saferoute".to_string(),
            pool_size: 8,
            connect_timeout_secs: 10,
            statement_timeout_ms: 5_000,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            request_timeout_secs: 30,
        }
    }
}

impl ServerConfig {
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read config {}: {e}", path.display()))?;
        Ok(toml::from_str(&raw)?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.http.request_timeout_secs)
    }
}
