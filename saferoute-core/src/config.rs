//! Engine configuration constants.

use serde::{Deserialize, Serialize};

/// Tunables of the routing engine. All fields have defaults, so a
/// config file only needs the values it overrides.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Degrees added on every side of the source/destination envelope
    /// when extracting the working subgraph. 0.06° keeps the window
    /// small enough for the planar nearest-node approximation.
    pub buffer_degrees: f64,
    /// Assumed travel speed for the duration estimate, km/h.
    pub average_speed_kmh: f64,
    /// Maximum number of cached subgraphs; `None` disables eviction.
    pub cache_capacity: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            buffer_degrees: 0.06,
            average_speed_kmh: 30.0,
            cache_capacity: Some(64),
        }
    }
}
