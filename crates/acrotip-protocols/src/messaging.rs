//! Request/response message bus between the page runtime and the
//! background lookup service.
//!
//! Every message carries a `type` discriminator on the wire. Each request is
//! answered exactly once: the reply handle is consumed by
//! [`Envelope::respond`], and [`MessageReceiver::serve`] answers with a
//! generic error if a handler panics.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error};

use crate::error::MessagingError;
use crate::lookup::{LookupResult, PageContext};

#[cfg(test)]
#[path = "messaging_tests.rs"]
mod tests;

/// Messages understood by the background service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Request {
    /// Hover lookup from a page, with optional page context for the AI tier.
    ResolveLookup {
        term: String,
        #[serde(default)]
        context: PageContext,
    },
    /// Lookup typed into the popup search box.
    ManualLookup { term: String },
    /// Drop every cached definition.
    ClearCache,
    /// Record a term in the recent-lookups list.
    TrackRecent { term: String },
    /// List recent lookups, most recent first.
    RecentLookups,
}

impl Request {
    pub fn kind(&self) -> &'static str {
        match self {
            Request::ResolveLookup { .. } => "resolveLookup",
            Request::ManualLookup { .. } => "manualLookup",
            Request::ClearCache => "clearCache",
            Request::TrackRecent { .. } => "trackRecent",
            Request::RecentLookups => "recentLookups",
        }
    }
}

/// Replies sent by the background service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Response {
    Lookup { result: LookupResult },
    Cleared,
    Recent { terms: Vec<String> },
    Ack,
    Error { message: String },
}

/// Handler on the service side of the bus.
#[async_trait]
pub trait RequestHandler: Send + Sync + 'static {
    async fn handle(&self, request: Request) -> Response;
}

/// A request paired with its one-shot reply handle.
#[derive(Debug)]
pub struct Envelope {
    pub request: Request,
    reply: oneshot::Sender<Response>,
}

impl Envelope {
    /// Split into the request and its responder.
    pub fn into_parts(self) -> (Request, Responder) {
        (self.request, Responder { reply: self.reply })
    }

    /// Answer the request. Consumes the envelope so it cannot answer twice.
    pub fn respond(self, response: Response) {
        let _ = self.reply.send(response);
    }
}

/// One-shot reply handle.
#[derive(Debug)]
pub struct Responder {
    reply: oneshot::Sender<Response>,
}

impl Responder {
    pub fn respond(self, response: Response) {
        if self.reply.send(response).is_err() {
            debug!("Requester went away before the response was delivered");
        }
    }
}

/// Constructor for connected sender/receiver pairs.
pub struct MessageBus;

impl MessageBus {
    pub fn channel(capacity: usize) -> (MessageSender, MessageReceiver) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (MessageSender { tx }, MessageReceiver { rx })
    }
}

/// Requesting side of the bus. Cheap to clone.
#[derive(Debug, Clone)]
pub struct MessageSender {
    tx: mpsc::Sender<Envelope>,
}

impl MessageSender {
    /// Send a request and wait for its response.
    pub async fn request(&self, request: Request) -> Result<Response, MessagingError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Envelope { request, reply })
            .await
            .map_err(|_| MessagingError::ChannelClosed)?;

        match rx.await {
            Ok(Response::Error { message }) => Err(MessagingError::Handler(message)),
            Ok(response) => Ok(response),
            Err(_) => Err(MessagingError::NoResponse),
        }
    }

    /// Fire-and-forget send; the response is discarded.
    pub fn notify(&self, request: Request) {
        let (reply, _rx) = oneshot::channel();
        if self.tx.try_send(Envelope { request, reply }).is_err() {
            debug!("Dropped notification: bus full or closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Serving side of the bus.
#[derive(Debug)]
pub struct MessageReceiver {
    rx: mpsc::Receiver<Envelope>,
}

impl MessageReceiver {
    /// Receive the next envelope, or `None` once every sender is dropped.
    pub async fn recv(&mut self) -> Option<Envelope> {
        self.rx.recv().await
    }

    /// Serve requests until every sender is dropped. Each request runs on
    /// its own task.
    pub async fn serve<H: RequestHandler>(mut self, handler: Arc<H>) {
        while let Some(envelope) = self.rx.recv().await {
            let (request, responder) = envelope.into_parts();
            let handler = handler.clone();
            tokio::spawn(async move {
                let kind = request.kind();
                let outcome = tokio::spawn(async move { handler.handle(request).await }).await;
                let response = match outcome {
                    Ok(response) => response,
                    Err(e) => {
                        error!("Handler for {} failed: {}", kind, e);
                        Response::Error {
                            message: "Extension error".to_string(),
                        }
                    }
                };
                responder.respond(response);
            });
        }
        debug!("Message bus closed");
    }
}
