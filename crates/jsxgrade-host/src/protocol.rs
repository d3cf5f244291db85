//! Wire protocol between callers and the host.
//!
//! Requests are `{ type: "parse"|"evaluate", id, code?, checker? }` and
//! responses are `{ type: "success"|"error", id, result?, passed?, error? }`.

use serde::{Deserialize, Serialize};

use jsxgrade_core::checker::evaluate;
use jsxgrade_core::extract::analyze_source_with_depth;
use jsxgrade_core::syntax::DEFAULT_MAX_DEPTH;
use jsxgrade_core::FeatureContext;

/// Error text for an unknown request type or a missing field.
pub const INVALID_REQUEST: &str = "Invalid request type or missing parameters";

/// Error text for a request cancelled before it completed.
pub const CANCELLED: &str = "request cancelled";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    Parse,
    Evaluate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    #[serde(rename = "type")]
    pub kind: RequestType,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checker: Option<String>,
}

impl Request {
    pub fn parse(id: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            kind: RequestType::Parse,
            id: id.into(),
            code: Some(code.into()),
            checker: None,
        }
    }

    pub fn evaluate(
        id: impl Into<String>,
        code: impl Into<String>,
        checker: impl Into<String>,
    ) -> Self {
        Self {
            kind: RequestType::Evaluate,
            id: id.into(),
            code: Some(code.into()),
            checker: Some(checker.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    #[serde(rename = "type")]
    pub kind: ResponseType,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<FeatureContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    pub fn parsed(id: impl Into<String>, context: FeatureContext) -> Self {
        Self {
            kind: ResponseType::Success,
            id: id.into(),
            result: Some(context),
            passed: None,
            error: None,
        }
    }

    pub fn evaluated(id: impl Into<String>, passed: bool) -> Self {
        Self {
            kind: ResponseType::Success,
            id: id.into(),
            result: None,
            passed: Some(passed),
            error: None,
        }
    }

    pub fn error(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: ResponseType::Error,
            id: id.into(),
            result: None,
            passed: None,
            error: Some(message.into()),
        }
    }

    pub fn cancelled(id: impl Into<String>) -> Self {
        Self::error(id, CANCELLED)
    }

    pub fn is_success(&self) -> bool {
        self.kind == ResponseType::Success
    }

    pub fn is_cancelled(&self) -> bool {
        self.kind == ResponseType::Error && self.error.as_deref() == Some(CANCELLED)
    }
}

/// Decode one request. Failures become the error response to send back,
/// carrying the request id when it can be recovered and an empty id
/// otherwise.
pub fn decode_request(text: &str) -> Result<Request, Response> {
    serde_json::from_str::<Request>(text).map_err(|err| {
        match serde_json::from_str::<serde_json::Value>(text) {
            Ok(value) => {
                let id = value
                    .get("id")
                    .and_then(|id| id.as_str())
                    .unwrap_or_default();
                Response::error(id, INVALID_REQUEST)
            }
            Err(_) => Response::error("", format!("Malformed request: {err}")),
        }
    })
}

/// Answer one request. Stateless and pure.
pub fn handle_request(request: &Request) -> Response {
    handle_request_with_depth(request, DEFAULT_MAX_DEPTH)
}

pub fn handle_request_with_depth(request: &Request, max_depth: usize) -> Response {
    let code = request.code.as_deref().filter(|code| !code.is_empty());
    match (request.kind, code, request.checker.as_deref()) {
        (RequestType::Parse, Some(code), _) => {
            Response::parsed(&request.id, analyze_source_with_depth(code, max_depth))
        }
        (RequestType::Evaluate, Some(code), Some(checker)) if !checker.is_empty() => {
            let context = analyze_source_with_depth(code, max_depth);
            Response::evaluated(&request.id, evaluate(&context, checker))
        }
        _ => Response::error(&request.id, INVALID_REQUEST),
    }
}
