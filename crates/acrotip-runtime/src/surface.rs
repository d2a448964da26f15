//! Where the tooltip is drawn.

use std::sync::Arc;

use parking_lot::Mutex;

use acrotip_tooltip::{render_html, Placement, Size, TooltipView, Viewport};

/// Host-side tooltip element.
///
/// The session renders content first, then asks for the rendered size and
/// the viewport to compute a placement.
pub trait TooltipSurface: Send {
    fn render(&mut self, view: &TooltipView);

    /// Size of the currently rendered content.
    fn measure(&self) -> Size;

    fn viewport(&self) -> Viewport;

    fn place(&mut self, placement: Placement);

    fn hide(&mut self);
}

/// What a [`HeadlessSurface`] has been asked to show.
#[derive(Debug, Clone, Default)]
pub struct SurfaceLog {
    pub html: Option<String>,
    pub view: Option<TooltipView>,
    pub placement: Option<Placement>,
    pub visible: bool,
    pub renders: usize,
}

/// Surface without a display. Records renders and placements behind a
/// shared handle so they can be read from outside the session task.
#[derive(Clone)]
pub struct HeadlessSurface {
    size: Size,
    viewport: Viewport,
    log: Arc<Mutex<SurfaceLog>>,
}

impl HeadlessSurface {
    pub fn new(size: Size, viewport: Viewport) -> Self {
        Self {
            size,
            viewport,
            log: Arc::new(Mutex::new(SurfaceLog::default())),
        }
    }

    pub fn log(&self) -> SurfaceLog {
        self.log.lock().clone()
    }
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new(Size::new(320.0, 120.0), Viewport::new(1280.0, 800.0))
    }
}

impl TooltipSurface for HeadlessSurface {
    fn render(&mut self, view: &TooltipView) {
        let mut log = self.log.lock();
        log.html = Some(render_html(view));
        log.view = Some(view.clone());
        log.visible = true;
        log.renders += 1;
    }

    fn measure(&self) -> Size {
        self.size
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn place(&mut self, placement: Placement) {
        self.log.lock().placement = Some(placement);
    }

    fn hide(&mut self) {
        let mut log = self.log.lock();
        log.visible = false;
        log.view = None;
        log.html = None;
    }
}
