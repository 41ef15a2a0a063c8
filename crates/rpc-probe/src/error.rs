//! Probe error taxonomy.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    /// The probe window closed with an empty result set.
    #[error("all known rpc urls are failing. Try searching for one manually or increase the timeout")]
    AllEndpointsFailing,
}
