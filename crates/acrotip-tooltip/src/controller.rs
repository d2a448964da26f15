//! Tooltip lifecycle.
//!
//! ```text
//! Idle --(show timer)--> Loading --(lookup done)--> Shown
//!   ^                       |                         |
//!   |                 (leave anchor/tooltip)    (leave anchor/tooltip)
//!   |                       v                         v
//!   +-----(hide timer)--- Hiding <--------------------+
//! ```
//!
//! Re-entering the anchor or the tooltip while `Hiding` returns to the
//! previous phase. Timers carry tokens and a fired timer whose token is no
//! longer current is ignored. Lookup results are matched against the
//! session's term, so a lookup for an abandoned term is dropped.

use std::time::Duration;

use tracing::debug;

use acrotip_protocols::LookupResult;

use crate::position::Rect;
use crate::view::{TooltipLinks, TooltipView};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Shown,
    Hiding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    Show,
    Hide,
}

/// A hovered acronym occurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    pub term: String,
    pub rect: Rect,
}

impl Anchor {
    pub fn new(term: impl Into<String>, rect: Rect) -> Self {
        Self {
            term: term.into(),
            rect,
        }
    }
}

/// How a lookup ended.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Resolved(LookupResult),
    /// The background channel broke. Rendered as the generic error view.
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TooltipEvent {
    AnchorEnter(Anchor),
    AnchorLeave,
    TooltipEnter,
    TooltipLeave,
    TimerFired { kind: TimerKind, token: u64 },
    LookupFinished { term: String, outcome: LookupOutcome },
    DismissClicked,
    /// Force the tooltip closed (term dismissed elsewhere, page teardown).
    Close,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    StartTimer {
        kind: TimerKind,
        token: u64,
        after: Duration,
    },
    StartLookup {
        term: String,
    },
    Render(TooltipView),
    /// Recompute placement against the anchor after a content change.
    Position(Rect),
    Hide,
    Dismiss {
        term: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TooltipTiming {
    pub show_delay: Duration,
    pub hide_delay: Duration,
    pub max_others: usize,
}

impl Default for TooltipTiming {
    fn default() -> Self {
        Self {
            show_delay: Duration::from_millis(200),
            hide_delay: Duration::from_millis(300),
            max_others: 3,
        }
    }
}

#[derive(Debug, Clone)]
struct Session {
    anchor: Anchor,
    resolved: bool,
}

pub struct TooltipController {
    timing: TooltipTiming,
    links: TooltipLinks,
    phase: Phase,
    session: Option<Session>,
    pending: Option<Anchor>,
    show_token: Option<u64>,
    hide_token: Option<u64>,
    next_token: u64,
    view: Option<TooltipView>,
}

impl TooltipController {
    pub fn new(timing: TooltipTiming, links: TooltipLinks) -> Self {
        Self {
            timing,
            links,
            phase: Phase::Idle,
            session: None,
            pending: None,
            show_token: None,
            hide_token: None,
            next_token: 0,
            view: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Term of the open session, if any.
    pub fn current_term(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.anchor.term.as_str())
    }

    /// Term waiting for the show timer.
    pub fn pending_term(&self) -> Option<&str> {
        self.pending.as_ref().map(|a| a.term.as_str())
    }

    pub fn view(&self) -> Option<&TooltipView> {
        self.view.as_ref()
    }

    pub fn timing(&self) -> TooltipTiming {
        self.timing
    }

    pub fn set_show_delay(&mut self, delay: Duration) {
        self.timing.show_delay = delay;
    }

    pub fn handle(&mut self, event: TooltipEvent) -> Vec<Effect> {
        match event {
            TooltipEvent::AnchorEnter(anchor) => self.on_anchor_enter(anchor),
            TooltipEvent::AnchorLeave => self.on_anchor_leave(),
            TooltipEvent::TooltipEnter => {
                self.cancel_hide();
                Vec::new()
            }
            TooltipEvent::TooltipLeave => self.schedule_hide(),
            TooltipEvent::TimerFired { kind, token } => self.on_timer(kind, token),
            TooltipEvent::LookupFinished { term, outcome } => self.on_lookup(term, outcome),
            TooltipEvent::DismissClicked => self.on_dismiss(),
            TooltipEvent::Close => self.close(),
        }
    }

    fn on_anchor_enter(&mut self, anchor: Anchor) -> Vec<Effect> {
        if self.current_term() == Some(anchor.term.as_str()) {
            self.cancel_hide();
            return Vec::new();
        }

        self.cancel_hide();
        let token = self.issue_token();
        self.show_token = Some(token);
        self.pending = Some(anchor);
        vec![Effect::StartTimer {
            kind: TimerKind::Show,
            token,
            after: self.timing.show_delay,
        }]
    }

    fn on_anchor_leave(&mut self) -> Vec<Effect> {
        self.show_token = None;
        self.pending = None;
        self.schedule_hide()
    }

    fn schedule_hide(&mut self) -> Vec<Effect> {
        if !matches!(self.phase, Phase::Loading | Phase::Shown | Phase::Hiding) {
            return Vec::new();
        }
        let token = self.issue_token();
        self.hide_token = Some(token);
        self.phase = Phase::Hiding;
        vec![Effect::StartTimer {
            kind: TimerKind::Hide,
            token,
            after: self.timing.hide_delay,
        }]
    }

    fn cancel_hide(&mut self) {
        self.hide_token = None;
        if self.phase == Phase::Hiding {
            self.phase = match &self.session {
                Some(session) if session.resolved => Phase::Shown,
                Some(_) => Phase::Loading,
                None => Phase::Idle,
            };
        }
    }

    fn on_timer(&mut self, kind: TimerKind, token: u64) -> Vec<Effect> {
        let current = match kind {
            TimerKind::Show => self.show_token,
            TimerKind::Hide => self.hide_token,
        };
        if current != Some(token) {
            debug!("Ignoring stale {:?} timer #{}", kind, token);
            return Vec::new();
        }

        match kind {
            TimerKind::Show => {
                self.show_token = None;
                let Some(anchor) = self.pending.take() else {
                    return Vec::new();
                };
                self.open(anchor)
            }
            TimerKind::Hide => {
                self.hide_token = None;
                self.close()
            }
        }
    }

    fn open(&mut self, anchor: Anchor) -> Vec<Effect> {
        let term = anchor.term.clone();
        let view = TooltipView::loading(&term, &self.links);
        let rect = anchor.rect;
        self.hide_token = None;
        self.session = Some(Session {
            anchor,
            resolved: false,
        });
        self.phase = Phase::Loading;
        self.view = Some(view.clone());
        vec![
            Effect::Render(view),
            Effect::Position(rect),
            Effect::StartLookup { term },
        ]
    }

    fn on_lookup(&mut self, term: String, outcome: LookupOutcome) -> Vec<Effect> {
        let Some(session) = self.session.as_mut() else {
            debug!("Dropping lookup for {}: tooltip closed", term);
            return Vec::new();
        };
        if session.anchor.term != term || session.resolved {
            debug!("Dropping stale lookup for {}", term);
            return Vec::new();
        }

        session.resolved = true;
        let rect = session.anchor.rect;
        let view = match outcome {
            LookupOutcome::Resolved(result) => {
                TooltipView::from_result(&result, &self.links, self.timing.max_others)
            }
            LookupOutcome::Failed => TooltipView::extension_error(&term, &self.links),
        };
        if self.phase == Phase::Loading {
            self.phase = Phase::Shown;
        }
        self.view = Some(view.clone());
        vec![Effect::Render(view), Effect::Position(rect)]
    }

    fn on_dismiss(&mut self) -> Vec<Effect> {
        let Some(term) = self.current_term().map(str::to_string) else {
            return Vec::new();
        };
        let mut effects = vec![Effect::Dismiss { term }];
        effects.extend(self.close());
        effects
    }

    fn close(&mut self) -> Vec<Effect> {
        let was_open = self.phase != Phase::Idle;
        self.phase = Phase::Idle;
        self.session = None;
        self.pending = None;
        self.show_token = None;
        self.hide_token = None;
        self.view = None;
        if was_open { vec![Effect::Hide] } else { Vec::new() }
    }

    fn issue_token(&mut self) -> u64 {
        self.next_token += 1;
        self.next_token
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
