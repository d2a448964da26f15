//! # acrotip tooltip
//!
//! The hover tooltip as a pure state machine. Host events go in, effects
//! come out; timers and lookups are run by whoever drives the controller.
//! Also holds the view model rendered into the tooltip and the placement
//! math relative to the hovered anchor.

pub mod controller;
pub mod position;
pub mod view;

pub use controller::{
    Anchor, Effect, LookupOutcome, Phase, TimerKind, TooltipController, TooltipEvent,
    TooltipTiming,
};
pub use position::{place, Placement, Rect, Side, Size, Viewport, EDGE_MARGIN_LEFT, EDGE_MARGIN_RIGHT, GAP};
pub use view::{
    escape_html, render_html, Badge, LinkError, TooltipLinks, TooltipView, EXTENSION_ERROR_MESSAGE,
    NOT_FOUND_MESSAGE,
};
