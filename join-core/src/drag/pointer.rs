//! Folds native drag events and touch events into one signal shape.

use crate::task::TaskStatus;

use super::geometry::Point;
use super::surface::CardRef;

/// How a drag was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivationMode {
    /// Platform drag-and-drop; the platform draws its own ghost image.
    Native,
    /// Long-press emulation with a floating proxy.
    Touch,
}

/// Raw input as a host receives it.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerInput {
    /// `dragstart` on a card.
    DragStart {
        /// The card being dragged.
        card: CardRef,
        /// Pointer position.
        at: Point,
    },
    /// `dragover` anywhere on the board.
    DragOver {
        /// Pointer position.
        at: Point,
    },
    /// `drop` on a column, or outside every column.
    Drop {
        /// Column the platform dropped on.
        target: Option<TaskStatus>,
    },
    /// `dragend`; arrives after `drop` or alone when released elsewhere.
    DragEnd,
    /// `touchstart` on a card.
    TouchStart {
        /// The card touched.
        card: CardRef,
        /// First contact point.
        at: Point,
        /// Contacts currently on the screen.
        touches: usize,
    },
    /// `touchmove`.
    TouchMove {
        /// First contact point.
        at: Point,
        /// Contacts currently on the screen.
        touches: usize,
    },
    /// `touchend`.
    TouchEnd {
        /// Contacts still on the screen.
        remaining: usize,
    },
    /// `touchcancel`.
    TouchCancel,
}

/// Where a release should drop the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitTarget {
    /// Whatever column the resolver is hovering.
    Hovered,
    /// A column named by the host (native `drop`, keyboard move).
    Explicit(Option<TaskStatus>),
}

/// Device-independent drag intent.
#[derive(Debug, Clone, PartialEq)]
pub enum DragSignal {
    /// Pointer went down on a card.
    Press {
        /// The card under the pointer.
        card: CardRef,
        /// Pointer position.
        at: Point,
        /// Which path recognised it.
        mode: ActivationMode,
    },
    /// Pointer moved.
    Move {
        /// Pointer position.
        at: Point,
    },
    /// Pointer went up.
    Release {
        /// Drop target.
        target: CommitTarget,
    },
    /// The gesture is ambiguous; drop everything silently.
    Abort,
}

/// Stateful normalizer.
///
/// Once a gesture turns multi-touch it stays suppressed until every finger
/// has left the screen.
#[derive(Debug, Default)]
pub struct PointerNormalizer {
    suppressed: bool,
}

impl PointerNormalizer {
    /// Creates a normalizer with no gesture in progress.
    #[must_use]
    pub const fn new() -> Self {
        Self { suppressed: false }
    }

    /// Whether the current touch gesture was aborted by a second contact.
    #[must_use]
    pub const fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    /// Translates one input. `None` means the input carries no drag intent.
    pub fn normalize(&mut self, input: PointerInput) -> Option<DragSignal> {
        match input {
            PointerInput::DragStart { card, at } => Some(DragSignal::Press {
                card,
                at,
                mode: ActivationMode::Native,
            }),
            PointerInput::DragOver { at } => Some(DragSignal::Move { at }),
            PointerInput::Drop { target } => Some(DragSignal::Release {
                target: CommitTarget::Explicit(target),
            }),
            PointerInput::DragEnd => Some(DragSignal::Release {
                target: CommitTarget::Explicit(None),
            }),
            PointerInput::TouchStart { card, at, touches } => {
                if touches > 1 {
                    return self.suppress();
                }
                self.suppressed = false;
                Some(DragSignal::Press {
                    card,
                    at,
                    mode: ActivationMode::Touch,
                })
            }
            PointerInput::TouchMove { at, touches } => {
                if self.suppressed {
                    None
                } else if touches > 1 {
                    self.suppress()
                } else {
                    Some(DragSignal::Move { at })
                }
            }
            PointerInput::TouchEnd { remaining } => {
                if self.suppressed {
                    if remaining == 0 {
                        self.suppressed = false;
                    }
                    None
                } else if remaining == 0 {
                    Some(DragSignal::Release {
                        target: CommitTarget::Hovered,
                    })
                } else {
                    None
                }
            }
            PointerInput::TouchCancel => {
                self.suppressed = false;
                Some(DragSignal::Abort)
            }
        }
    }

    fn suppress(&mut self) -> Option<DragSignal> {
        if self.suppressed {
            return None;
        }
        self.suppressed = true;
        Some(DragSignal::Abort)
    }
}
