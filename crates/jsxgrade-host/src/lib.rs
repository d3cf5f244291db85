//! jsxgrade-host: runs parsing and checker evaluation off the caller's
//! thread, with id-correlated responses and per-request cancellation.

pub mod client;
pub mod error;
pub mod host;
pub mod protocol;
pub mod serve;
pub mod service;

pub use client::{OffloadClient, Ticket};
pub use error::ServiceError;
pub use host::{Envelope, Host, HostConfig, HostHandle};
pub use protocol::{handle_request, Request, RequestType, Response, ResponseType};
pub use serve::serve_lines;
pub use service::{AnalysisService, InlineService};
