//! Drag-and-drop of task cards between board columns.
//!
//! Native drags and long-press touch drags feed the same
//! [`DragController`] through [`PointerInput`]. The controller talks to the
//! display only through the [`Surface`] trait and reports how each drag
//! ended as a [`DropOutcome`]; writing the status change and reloading the
//! board is the host's job, after the session has already been cleared.
//!
//! Nothing in here can fail. Ambiguous gestures are dropped silently and a
//! release outside every column is a no-op.

mod commit;
mod controller;
mod gate;
mod geometry;
mod pointer;
mod proxy;
mod recording;
mod resolver;
mod scroll;
mod session;
mod surface;

use std::time::Duration;

pub use commit::{DropOutcome, StatusChange};
pub use controller::{DragController, Phase};
pub use gate::{GateCancel, GateConfig, LongPressGate};
pub use geometry::{Point, Rect};
pub use pointer::{ActivationMode, CommitTarget, DragSignal, PointerInput, PointerNormalizer};
pub use proxy::VisualProxy;
pub use recording::{RecordingSurface, SurfaceOp};
pub use resolver::DropZoneResolver;
pub use scroll::{AutoScroll, ScrollConfig, scroll_speed};
pub use session::DragSession;
pub use surface::{
    CardRef, DRAGGED_CLASS, FrameHandle, HIGHLIGHT_CLASS, PROXY_CLASS, ProxyId, Surface,
    TOUCH_ORIGINAL_CLASS,
};

/// Tunables of the drag engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragConfig {
    /// Long-press recognition.
    pub gate: GateConfig,
    /// Edge auto-scroll.
    pub scroll: ScrollConfig,
    /// Length of the haptic pulse when a touch drag starts (default: 50ms).
    pub haptic: Duration,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            gate: GateConfig::default(),
            scroll: ScrollConfig::default(),
            haptic: Duration::from_millis(50),
        }
    }
}
