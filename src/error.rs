use thiserror::Error;

/// Why the detection boundary could not produce a vehicle count.
#[derive(Error, Debug)]
pub enum DetectionError {
    #[error("detector output is malformed: {0}")]
    MalformedOutput(#[from] serde_json::Error),

    #[error("model error: {0}")]
    Model(String),
}

/// Errors reported to the caller of a single request. None of them touch a running scheduler.
#[derive(Error, Debug)]
pub enum SignalError {
    #[error("unknown road: {0}")]
    UnknownRoad(String),

    #[error("invalid configuration: road count must be positive, got {0}")]
    InvalidConfiguration(i64),

    #[error("vehicle detection failed: {0}")]
    DetectionFailure(#[source] DetectionError),
}
