//! Weight selection: maps a routing-mode token to the edge cost the
//! path search minimizes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;
use crate::model::RoadEdge;

/// Requested routing mode, parsed from the wire token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteMode {
    Fastest,
    Safest,
    SafestFastest,
}

impl RouteMode {
    pub fn weight(self) -> Weight {
        match self {
            RouteMode::Fastest => Weight::Length,
            RouteMode::Safest => Weight::Risk,
            RouteMode::SafestFastest => Weight::Balanced,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RouteMode::Fastest => "fastest",
            RouteMode::Safest => "safest",
            RouteMode::SafestFastest => "safest_fastest",
        }
    }
}

impl FromStr for RouteMode {
    type Err = Error;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "fastest" => Ok(RouteMode::Fastest),
            "safest" => Ok(RouteMode::Safest),
            "safest_fastest" => Ok(RouteMode::SafestFastest),
            other => Err(Error::InvalidRouteType(other.to_string())),
        }
    }
}

impl fmt::Display for RouteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Edge cost strategy, dispatched explicitly by `match`: either a
/// single attribute or the balanced composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weight {
    /// Cost = segment length in meters
    Length,
    /// Cost = bucket-qualified risk score
    Risk,
    /// Cost = 0.5 * risk + 0.5 * length
    Balanced,
}

impl Weight {
    /// Cost of one edge. A non-finite component makes the edge
    /// infinitely expensive, which the search treats as unusable.
    pub fn edge_cost(self, edge: &RoadEdge) -> f64 {
        let cost = match self {
            Weight::Length => edge.length,
            Weight::Risk => edge.risk,
            Weight::Balanced => {
                if edge.risk.is_finite() && edge.length.is_finite() {
                    0.5 * edge.risk + 0.5 * edge.length
                } else {
                    f64::INFINITY
                }
            }
        };
        if cost.is_finite() { cost } else { f64::INFINITY }
    }
}
