//! The offload host: a tokio task that answers requests on blocking workers.
//!
//! Requests arrive on one channel and responses leave on another. Work runs
//! concurrently, so responses may come back in any order; callers correlate
//! them by id.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use jsxgrade_core::syntax::DEFAULT_MAX_DEPTH;

use crate::error::ServiceError;
use crate::protocol::{handle_request_with_depth, Request, Response};

/// Configuration for the host.
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Capacity of the request and response channels.
    pub queue_capacity: usize,
    /// Parser nesting limit applied to every request.
    pub max_nesting_depth: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 64,
            max_nesting_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// A request together with its cancellation token.
#[derive(Debug)]
pub struct Envelope {
    pub request: Request,
    pub token: CancellationToken,
}

/// Handle to a running host.
pub struct HostHandle {
    requests: mpsc::Sender<Envelope>,
    responses: mpsc::Receiver<Response>,
    shutdown: CancellationToken,
    task: JoinHandle<()>,
}

pub struct Host;

impl Host {
    /// Start the host task on the current tokio runtime.
    pub fn spawn(config: HostConfig) -> HostHandle {
        let capacity = config.queue_capacity.max(1);
        let (request_tx, request_rx) = mpsc::channel(capacity);
        let (response_tx, response_rx) = mpsc::channel(capacity);
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(run(
            request_rx,
            response_tx,
            shutdown.clone(),
            config.max_nesting_depth,
        ));
        HostHandle {
            requests: request_tx,
            responses: response_rx,
            shutdown,
            task,
        }
    }
}

impl HostHandle {
    pub async fn send(&self, request: Request, token: CancellationToken) -> Result<(), ServiceError> {
        self.requests
            .send(Envelope { request, token })
            .await
            .map_err(|_| ServiceError::HostClosed)
    }

    /// Next response, in completion order. `None` once the host has stopped
    /// and every in-flight request has been answered.
    pub async fn recv(&mut self) -> Option<Response> {
        self.responses.recv().await
    }

    /// Split into the raw request sender and response receiver.
    pub fn into_channels(self) -> (mpsc::Sender<Envelope>, mpsc::Receiver<Response>) {
        (self.requests, self.responses)
    }

    /// Stop accepting requests and wait for the host task to exit.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        drop(self.requests);
        if let Err(e) = self.task.await {
            error!("host task failed: {e}");
        }
    }
}

async fn run(
    mut requests: mpsc::Receiver<Envelope>,
    responses: mpsc::Sender<Response>,
    shutdown: CancellationToken,
    max_depth: usize,
) {
    info!("offload host started");
    loop {
        let envelope = tokio::select! {
            _ = shutdown.cancelled() => break,
            envelope = requests.recv() => match envelope {
                Some(envelope) => envelope,
                None => break,
            },
        };
        let responses = responses.clone();
        tokio::spawn(async move {
            let id = envelope.request.id.clone();
            let response = process(envelope, max_depth).await;
            if responses.send(response).await.is_err() {
                debug!(id = %id, "response dropped, receiver closed");
            }
        });
    }
    info!("offload host stopped");
}

async fn process(envelope: Envelope, max_depth: usize) -> Response {
    let Envelope { request, token } = envelope;
    let id = request.id.clone();
    if token.is_cancelled() {
        debug!(id = %id, "request cancelled before start");
        return Response::cancelled(id);
    }

    let work = tokio::task::spawn_blocking(move || handle_request_with_depth(&request, max_depth));
    tokio::select! {
        _ = token.cancelled() => {
            debug!(id = %id, "request cancelled while running");
            Response::cancelled(id)
        }
        joined = work => match joined {
            Ok(response) => response,
            Err(e) => {
                error!(id = %id, "worker failed: {e}");
                Response::error(id, format!("worker failed: {e}"))
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::INVALID_REQUEST;

    #[tokio::test]
    async fn answers_requests() {
        let mut host = Host::spawn(HostConfig::default());
        host.send(
            Request::evaluate("a", "const A = () => <div />", "hasJSX"),
            CancellationToken::new(),
        )
        .await
        .unwrap();
        let response = host.recv().await.unwrap();
        assert_eq!(response, Response::evaluated("a", true));
        host.shutdown().await;
    }

    #[tokio::test]
    async fn precancelled_request_is_reported() {
        let mut host = Host::spawn(HostConfig::default());
        let token = CancellationToken::new();
        token.cancel();
        host.send(Request::parse("c", "let x = 1"), token).await.unwrap();
        let response = host.recv().await.unwrap();
        assert!(response.is_cancelled());
        assert_eq!(response.id, "c");
        host.shutdown().await;
    }

    #[tokio::test]
    async fn invalid_requests_get_error_responses() {
        let mut host = Host::spawn(HostConfig::default());
        host.send(Request::parse("empty", ""), CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(
            host.recv().await.unwrap(),
            Response::error("empty", INVALID_REQUEST)
        );
        host.shutdown().await;
    }

    #[tokio::test]
    async fn closes_after_requests_drain() {
        let host = Host::spawn(HostConfig::default());
        let (requests, mut responses) = host.into_channels();
        for i in 0..5 {
            requests
                .send(Envelope {
                    request: Request::parse(i.to_string(), "<a />"),
                    token: CancellationToken::new(),
                })
                .await
                .unwrap();
        }
        drop(requests);
        let mut ids = Vec::new();
        while let Some(response) = responses.recv().await {
            ids.push(response.id);
        }
        ids.sort();
        assert_eq!(ids, vec!["0", "1", "2", "3", "4"]);
    }
}
