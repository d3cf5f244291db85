//! Service error types.

use thiserror::Error;

/// Errors returned by an [`AnalysisService`](crate::service::AnalysisService).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// A parse request was rejected.
    #[error("parse failed: {0}")]
    Parse(String),

    /// An evaluate request was rejected.
    #[error("evaluation failed: {0}")]
    Evaluate(String),

    /// The host answered with a response that does not fit the request.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The request was cancelled before it completed.
    #[error("request cancelled")]
    Cancelled,

    /// The host stopped before answering.
    #[error("host closed")]
    HostClosed,
}
