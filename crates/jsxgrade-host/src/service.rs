//! The analysis service seam: the same operations in process or through the
//! host.

use async_trait::async_trait;

use jsxgrade_core::checker::evaluate;
use jsxgrade_core::extract::analyze_source_with_depth;
use jsxgrade_core::syntax::DEFAULT_MAX_DEPTH;
use jsxgrade_core::FeatureContext;

use crate::client::OffloadClient;
use crate::error::ServiceError;
use crate::protocol::{RequestType, Response, ResponseType, INVALID_REQUEST};

/// Parsing and checker evaluation, wherever they run.
///
/// A source that fails to parse is not an error here: `parse_code` returns
/// its context with `parse_error` set, and `evaluate_checker` returns
/// `false` for it.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    async fn parse_code(&self, code: &str) -> Result<FeatureContext, ServiceError>;

    async fn evaluate_checker(&self, code: &str, checker: &str) -> Result<bool, ServiceError>;
}

/// Runs everything on the calling task.
#[derive(Debug, Clone)]
pub struct InlineService {
    max_depth: usize,
}

impl InlineService {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }
}

impl Default for InlineService {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

#[async_trait]
impl AnalysisService for InlineService {
    async fn parse_code(&self, code: &str) -> Result<FeatureContext, ServiceError> {
        if code.is_empty() {
            return Err(ServiceError::Parse(INVALID_REQUEST.to_string()));
        }
        Ok(analyze_source_with_depth(code, self.max_depth))
    }

    async fn evaluate_checker(&self, code: &str, checker: &str) -> Result<bool, ServiceError> {
        if code.is_empty() || checker.is_empty() {
            return Err(ServiceError::Evaluate(INVALID_REQUEST.to_string()));
        }
        let context = analyze_source_with_depth(code, self.max_depth);
        Ok(evaluate(&context, checker))
    }
}

/// Map an error response onto the service error for `kind`.
fn response_error(kind: RequestType, response: Response) -> ServiceError {
    if response.is_cancelled() {
        return ServiceError::Cancelled;
    }
    let message = response.error.unwrap_or_default();
    match kind {
        RequestType::Parse => ServiceError::Parse(message),
        RequestType::Evaluate => ServiceError::Evaluate(message),
    }
}

#[async_trait]
impl AnalysisService for OffloadClient {
    async fn parse_code(&self, code: &str) -> Result<FeatureContext, ServiceError> {
        let response = self.request(RequestType::Parse, code, None).await?;
        match response.kind {
            ResponseType::Error => Err(response_error(RequestType::Parse, response)),
            ResponseType::Success => response
                .result
                .ok_or_else(|| ServiceError::Protocol("parse response without result".into())),
        }
    }

    async fn evaluate_checker(&self, code: &str, checker: &str) -> Result<bool, ServiceError> {
        let response = self
            .request(RequestType::Evaluate, code, Some(checker))
            .await?;
        match response.kind {
            ResponseType::Error => Err(response_error(RequestType::Evaluate, response)),
            ResponseType::Success => response
                .passed
                .ok_or_else(|| ServiceError::Protocol("evaluate response without verdict".into())),
        }
    }
}
