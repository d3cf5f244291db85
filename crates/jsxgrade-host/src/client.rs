//! Client side of the offload host: issues ids, routes responses by id, and
//! cancels individual requests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::ServiceError;
use crate::host::{Envelope, HostHandle};
use crate::protocol::{Request, RequestType, Response};

struct Pending {
    reply: oneshot::Sender<Response>,
    token: CancellationToken,
}

type PendingMap = Arc<Mutex<HashMap<String, Pending>>>;

fn lock(pending: &PendingMap) -> MutexGuard<'_, HashMap<String, Pending>> {
    pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A submitted request awaiting its response.
#[derive(Debug)]
pub struct Ticket {
    pub id: String,
    reply: oneshot::Receiver<Response>,
}

impl Ticket {
    pub async fn wait(self) -> Result<Response, ServiceError> {
        self.reply.await.map_err(|_| ServiceError::HostClosed)
    }
}

/// Correlating client for a host.
pub struct OffloadClient {
    requests: mpsc::Sender<Envelope>,
    pending: PendingMap,
    router: JoinHandle<()>,
}

impl OffloadClient {
    pub fn new(host: HostHandle) -> Self {
        let (requests, responses) = host.into_channels();
        Self::with_channels(requests, responses)
    }

    /// Build a client over raw channels, for hosts running elsewhere.
    pub fn with_channels(
        requests: mpsc::Sender<Envelope>,
        responses: mpsc::Receiver<Response>,
    ) -> Self {
        let pending: PendingMap = Arc::default();
        let router = tokio::spawn(route(responses, Arc::clone(&pending)));
        Self {
            requests,
            pending,
            router,
        }
    }

    /// Send a request under a fresh id.
    pub async fn submit(
        &self,
        kind: RequestType,
        code: &str,
        checker: Option<&str>,
    ) -> Result<Ticket, ServiceError> {
        let id = Uuid::new_v4().to_string();
        let request = Request {
            kind,
            id: id.clone(),
            code: Some(code.to_string()),
            checker: checker.map(str::to_string),
        };
        let token = CancellationToken::new();
        let (reply_tx, reply_rx) = oneshot::channel();
        lock(&self.pending).insert(
            id.clone(),
            Pending {
                reply: reply_tx,
                token: token.clone(),
            },
        );

        if self.requests.send(Envelope { request, token }).await.is_err() {
            lock(&self.pending).remove(&id);
            return Err(ServiceError::HostClosed);
        }
        debug!(id = %id, ?kind, "request submitted");
        Ok(Ticket {
            id,
            reply: reply_rx,
        })
    }

    /// Send a request and wait for its response.
    pub async fn request(
        &self,
        kind: RequestType,
        code: &str,
        checker: Option<&str>,
    ) -> Result<Response, ServiceError> {
        self.submit(kind, code, checker).await?.wait().await
    }

    /// Cancel a pending request. Returns `false` if `id` is not pending.
    pub fn cancel(&self, id: &str) -> bool {
        match lock(&self.pending).get(id) {
            Some(pending) => {
                pending.token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn pending_count(&self) -> usize {
        lock(&self.pending).len()
    }
}

impl Drop for OffloadClient {
    fn drop(&mut self) {
        self.router.abort();
    }
}

async fn route(mut responses: mpsc::Receiver<Response>, pending: PendingMap) {
    while let Some(response) = responses.recv().await {
        let entry = lock(&pending).remove(&response.id);
        match entry {
            Some(entry) => {
                if entry.reply.send(response).is_err() {
                    debug!("response arrived after its ticket was dropped");
                }
            }
            None => warn!(id = %response.id, "response for unknown request id"),
        }
    }
    // Host gone: dropping the senders tells every waiter.
    lock(&pending).clear();
}
