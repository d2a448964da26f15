//! # acrotip runtime
//!
//! Runs the detector and the tooltip against one page. A [`PageSession`] is
//! built from explicit [`PageDeps`] and driven by a [`ContentScript`] event
//! loop that the host feeds through a [`PageHandle`].

pub mod content_script;
pub mod error;
pub mod session;
pub mod surface;

pub use content_script::{ContentScript, Mutation, PageEvent, PageHandle};
pub use error::{RuntimeError, RuntimeResult};
pub use session::{classifier_for, highlighter_for, PageDeps, PageSession, PageSnapshot};
pub use surface::{HeadlessSurface, SurfaceLog, TooltipSurface};
