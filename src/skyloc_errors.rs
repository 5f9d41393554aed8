use thiserror::Error;

#[derive(Error, Debug)]
pub enum SkyLocError {
    #[error("pixel count {0} is not of the form 12 N^2")]
    InvalidPixelCount(usize),

    #[error("invalid distance bounds: require 0 < min < max, got [{0}, {1}]")]
    InvalidDistanceBounds(f64, f64),

    #[error("unrecognized distance prior: {0}")]
    UnrecognizedPrior(String),

    #[error("adaptive quadrature did not converge: {0}")]
    IntegrationDidNotConverge(String),

    #[error("invalid sky map parameter: {0}")]
    InvalidParameter(String),

    #[error("degenerate amplitude likelihood: {0}")]
    DegenerateAmplitude(String),

    #[error("allocation failure: {0}")]
    AllocationFailed(#[from] std::collections::TryReserveError),

    #[error("no detector triggers supplied")]
    NoDetectors,
}
