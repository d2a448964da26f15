//! Tooltip placement.
//!
//! Anchor rectangles are in viewport coordinates, placements in document
//! coordinates (viewport plus scroll offset).

use serde::{Deserialize, Serialize};

/// Vertical distance between anchor and tooltip.
pub const GAP: f64 = 8.0;
/// Minimum distance from the left edge of the viewport.
pub const EDGE_MARGIN_LEFT: f64 = 8.0;
/// Minimum distance from the right edge of the viewport.
pub const EDGE_MARGIN_RIGHT: f64 = 16.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn left(&self) -> f64 {
        self.x
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub scroll_x: f64,
    pub scroll_y: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            scroll_x: 0.0,
            scroll_y: 0.0,
        }
    }

    pub fn scrolled(mut self, scroll_x: f64, scroll_y: f64) -> Self {
        self.scroll_x = scroll_x;
        self.scroll_y = scroll_y;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Above,
    Below,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub left: f64,
    pub top: f64,
    pub side: Side,
}

/// Place a tooltip of `tooltip` size next to `anchor`.
///
/// Above the anchor when it fits below the top of the viewport, otherwise
/// below. Horizontally aligned with the anchor's left edge, then clamped so
/// it keeps [`EDGE_MARGIN_RIGHT`] from the right edge and
/// [`EDGE_MARGIN_LEFT`] from the left edge; the left margin wins when the
/// viewport is too narrow for both.
pub fn place(anchor: Rect, tooltip: Size, viewport: Viewport) -> Placement {
    let above = anchor.top() + viewport.scroll_y - tooltip.height - GAP;
    let (top, side) = if above < viewport.scroll_y {
        (anchor.bottom() + viewport.scroll_y + GAP, Side::Below)
    } else {
        (above, Side::Above)
    };

    let max_left = viewport.width + viewport.scroll_x - tooltip.width - EDGE_MARGIN_RIGHT;
    let min_left = viewport.scroll_x + EDGE_MARGIN_LEFT;
    let left = (anchor.left() + viewport.scroll_x).min(max_left).max(min_left);

    Placement { left, top, side }
}
