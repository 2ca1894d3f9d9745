use reqwest::StatusCode;

/// Errors returned by the Safe Transaction Service client.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The request failed at the transport level.
    #[error("transaction service request failed")]
    Http(#[from] reqwest::Error),
    /// The service answered with a non-2xx status.
    #[error("transaction service responded with {status}: {body}")]
    Status {
        /// The HTTP status code.
        status: StatusCode,
        /// The response body, for the operator.
        body: String,
    },
    /// A proposal never collected enough confirmations within the polling budget.
    #[error("threshold not reached: {have} of {want} confirmations")]
    ThresholdNotReached {
        /// Confirmations present when the wait was abandoned.
        have: usize,
        /// The Safe's confirmation threshold.
        want: usize,
    },
}
