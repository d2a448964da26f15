//! Content script event loop.
//!
//! One task owns the [`PageSession`]. Host events arrive on a bounded
//! channel; tooltip timers and lookups run on spawned tasks and report back
//! on an internal channel. The mutation debounce is a deadline polled with
//! `sleep_until`, so a burst of host mutations becomes one scan.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use acrotip_detector::{Caret, Document, DomError};
use acrotip_protocols::{MessageSender, PageContext, Request, Response};
use acrotip_tooltip::{Effect, LookupOutcome, Rect, TimerKind, TooltipEvent};

use crate::error::{RuntimeError, RuntimeResult};
use crate::session::{PageSession, PageSnapshot};

/// A change the host applies to the page.
pub type Mutation = Box<dyn FnOnce(&mut Document) -> Result<(), DomError> + Send>;

/// Events sent by the host page.
pub enum PageEvent {
    Mutate(Mutation),
    PointerOver { caret: Caret, rect: Rect },
    PointerOut,
    TooltipEnter,
    TooltipLeave,
    DismissClicked,
    ReEnable(String),
    /// Stored preferences changed.
    PreferencesChanged,
    Snapshot(oneshot::Sender<PageSnapshot>),
    Shutdown,
}

enum Internal {
    TimerFired { kind: TimerKind, token: u64 },
    LookupFinished { term: String, outcome: LookupOutcome },
}

/// Host-side handle to a running content script.
#[derive(Clone)]
pub struct PageHandle {
    tx: mpsc::Sender<PageEvent>,
}

impl PageHandle {
    pub async fn send(&self, event: PageEvent) -> RuntimeResult<()> {
        self.tx.send(event).await.map_err(|_| RuntimeError::Stopped)
    }

    pub async fn mutate<F>(&self, change: F) -> RuntimeResult<()>
    where
        F: FnOnce(&mut Document) -> Result<(), DomError> + Send + 'static,
    {
        self.send(PageEvent::Mutate(Box::new(change))).await
    }

    pub async fn pointer_over(&self, caret: Caret, rect: Rect) -> RuntimeResult<()> {
        self.send(PageEvent::PointerOver { caret, rect }).await
    }

    pub async fn pointer_out(&self) -> RuntimeResult<()> {
        self.send(PageEvent::PointerOut).await
    }

    pub async fn snapshot(&self) -> RuntimeResult<PageSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.send(PageEvent::Snapshot(reply)).await?;
        rx.await.map_err(|_| RuntimeError::Stopped)
    }

    pub async fn shutdown(&self) -> RuntimeResult<()> {
        self.send(PageEvent::Shutdown).await
    }
}

pub struct ContentScript {
    session: PageSession,
    events: mpsc::Receiver<PageEvent>,
    internal_tx: mpsc::UnboundedSender<Internal>,
    internal_rx: mpsc::UnboundedReceiver<Internal>,
    tasks: JoinSet<()>,
}

impl ContentScript {
    pub fn new(session: PageSession, capacity: usize) -> (Self, PageHandle) {
        let (tx, events) = mpsc::channel(capacity.max(1));
        let (internal_tx, internal_rx) = mpsc::unbounded_channel();
        let script = Self {
            session,
            events,
            internal_tx,
            internal_rx,
            tasks: JoinSet::new(),
        };
        (script, PageHandle { tx })
    }

    /// Drive the session until the host shuts it down or drops every
    /// handle. Highlights are torn down on exit.
    pub async fn run(mut self) -> PageSession {
        info!("Content script started");
        loop {
            let deadline = self.session.debounce_deadline();
            tokio::select! {
                event = self.events.recv() => match event {
                    Some(PageEvent::Shutdown) | None => break,
                    Some(event) => self.on_page_event(event).await,
                },
                Some(internal) = self.internal_rx.recv() => self.on_internal(internal).await,
                _ = wait_until(deadline) => {
                    self.session.flush(Instant::now());
                }
                Some(_) = self.tasks.join_next(), if !self.tasks.is_empty() => {}
            }
        }

        self.tasks.abort_all();
        self.session.deactivate();
        info!("Content script stopped");
        self.session
    }

    async fn on_page_event(&mut self, event: PageEvent) {
        let effects = match event {
            PageEvent::Mutate(change) => {
                if let Err(e) = self.session.mutate(change, Instant::now()) {
                    warn!("Host mutation failed: {}", e);
                }
                return;
            }
            PageEvent::PointerOver { caret, rect } => self.session.pointer_over(caret, rect),
            PageEvent::PointerOut => self.session.pointer_out(),
            PageEvent::TooltipEnter => self.session.tooltip_event(TooltipEvent::TooltipEnter),
            PageEvent::TooltipLeave => self.session.tooltip_event(TooltipEvent::TooltipLeave),
            PageEvent::DismissClicked => self.session.tooltip_event(TooltipEvent::DismissClicked),
            PageEvent::ReEnable(term) => {
                self.session.re_enable(&term).await;
                return;
            }
            PageEvent::PreferencesChanged => {
                self.session.reload_preferences().await;
                return;
            }
            PageEvent::Snapshot(reply) => {
                let _ = reply.send(self.session.snapshot());
                return;
            }
            PageEvent::Shutdown => return,
        };
        self.apply(effects).await;
    }

    async fn on_internal(&mut self, internal: Internal) {
        let event = match internal {
            Internal::TimerFired { kind, token } => TooltipEvent::TimerFired { kind, token },
            Internal::LookupFinished { term, outcome } => {
                TooltipEvent::LookupFinished { term, outcome }
            }
        };
        let effects = self.session.tooltip_event(event);
        self.apply(effects).await;
    }

    async fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartTimer { kind, token, after } => {
                    let tx = self.internal_tx.clone();
                    self.tasks.spawn(async move {
                        tokio::time::sleep(after).await;
                        let _ = tx.send(Internal::TimerFired { kind, token });
                    });
                }
                Effect::StartLookup { term } => {
                    let context = self.session.lookup_context(&term);
                    let sender = self.session.sender().clone();
                    let tx = self.internal_tx.clone();
                    self.tasks.spawn(async move {
                        let outcome = request_lookup(&sender, &term, context).await;
                        let _ = tx.send(Internal::LookupFinished { term, outcome });
                    });
                }
                Effect::Render(view) => self.session.show(&view),
                Effect::Position(rect) => {
                    self.session.position(rect);
                }
                Effect::Hide => self.session.hide_tooltip(),
                Effect::Dismiss { term } => {
                    self.session.dismiss(&term).await;
                }
            }
        }
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

async fn request_lookup(sender: &MessageSender, term: &str, context: PageContext) -> LookupOutcome {
    let request = Request::ResolveLookup {
        term: term.to_string(),
        context,
    };
    match sender.request(request).await {
        Ok(Response::Lookup { result }) => {
            debug!("Lookup for {} answered from {}", term, result.source.as_str());
            LookupOutcome::Resolved(result)
        }
        Ok(other) => {
            warn!("Unexpected reply to lookup for {}: {:?}", term, other);
            LookupOutcome::Failed
        }
        Err(e) => {
            warn!("Lookup for {} failed: {}", term, e);
            LookupOutcome::Failed
        }
    }
}

#[cfg(test)]
#[path = "content_script_tests.rs"]
mod tests;
