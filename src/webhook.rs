//! HTTP endpoint receiving playback webhooks

use std::io::Read;
use std::net::SocketAddr;
use std::sync::Arc;
use std::thread;

use tiny_http::{Request, Response, Server};

use crate::playback::{self, PayloadError};
use crate::presence::{PresenceSession, SessionPublisher};

/// Default address the webhook listener binds to
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:9843";

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to start webhook server on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to get server address")]
    NoAddress,
}

pub struct WebhookServer {
    server: Arc<Server>,
    pub addr: SocketAddr,
}

/// Stops a running [`WebhookServer`] from another thread
#[derive(Clone)]
pub struct ShutdownHandle {
    server: Arc<Server>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.server.unblock();
    }
}

impl WebhookServer {
    pub fn bind(addr: &str) -> Result<Self, ServerError> {
        let server = Server::http(addr).map_err(|source| ServerError::Bind {
            addr: addr.to_string(),
            source,
        })?;

        let addr = server.server_addr().to_ip().ok_or(ServerError::NoAddress)?;

        tracing::info!("Webhook server listening on {}", addr);

        Ok(Self {
            server: Arc::new(server),
            addr,
        })
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            server: Arc::clone(&self.server),
        }
    }

    /// Accept requests until [`ShutdownHandle::shutdown`] is called.
    ///
    /// Every request is handled on its own thread; all paths and methods are
    /// treated as the webhook.
    pub fn run<S>(self, publisher: Arc<SessionPublisher<S>>)
    where
        S: PresenceSession + 'static,
    {
        for request in self.server.incoming_requests() {
            let publisher = Arc::clone(&publisher);
            let spawned = thread::Builder::new()
                .name("webhook-request".to_string())
                .spawn(move || respond(request, &publisher));

            if let Err(e) = spawned {
                tracing::error!("Failed to spawn request handler: {}", e);
            }
        }

        tracing::info!("Webhook server stopped");
    }
}

fn respond<S: PresenceSession>(mut request: Request, publisher: &SessionPublisher<S>) {
    tracing::debug!("Webhook received {} {}", request.method(), request.url());

    let status = handle_webhook(request.as_reader(), publisher);

    if let Err(e) = request.respond(Response::empty(status)) {
        tracing::debug!("Failed to send webhook response: {}", e);
    }
}

/// Turn a webhook body into a presence update, returning the HTTP status to reply with
pub fn handle_webhook<S: PresenceSession>(
    mut body: impl Read,
    publisher: &SessionPublisher<S>,
) -> u16 {
    let mut body_bytes = Vec::new();
    if let Err(e) = body.read_to_end(&mut body_bytes) {
        tracing::error!("Failed to read body: {}", e);
        return 500;
    }

    tracing::debug!("Request body bytes = {}", String::from_utf8_lossy(&body_bytes));

    let event = match playback::normalize(&body_bytes) {
        Ok(event) => event,
        Err(PayloadError::Empty) => {
            tracing::warn!("Request body was empty; no presence status change will happen");
            return 400;
        }
        Err(e) => {
            tracing::error!("{}", e);
            return 500;
        }
    };

    let activity = playback::format(&event);

    if let Err(e) = publisher.publish(&activity) {
        tracing::error!("Failed to set presence status: {}", e);
        return 500;
    }

    200
}
