use thiserror::Error;

/// Error taxonomy of the routing engine.
///
/// The boundary layer translates these into transport-level responses;
/// the engine itself never panics on bad input or missing data.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed coordinates, time string or request field.
    /// Caller error, not retryable.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// The bounding region contains no nodes. The caller may retry
    /// with a larger region.
    #[error("No road data in the requested region")]
    NoDataInRegion,
    /// Both endpoints resolved but no path connects them.
    #[error("No route found between source and destination")]
    NoRouteFound,
    /// The persistent graph store could not be reached or a query
    /// failed. Retryable at the boundary's discretion; fatal at
    /// process startup.
    #[error("Graph store unavailable: {0}")]
    StoreUnavailable(String),
    /// Unrecognized routing mode token.
    #[error("Invalid route type: {0}")]
    InvalidRouteType(String),
    /// Anything that should not happen given the engine's invariants.
    #[error("Internal error: {0}")]
    Internal(String),
}
