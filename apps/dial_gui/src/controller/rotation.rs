//! Drag state machine for the rotation dial.
//!
//! Pure logic: pointer transitions come in, host-facing effects come out.
//! The shell owns the actual dispatch, so every property here is testable
//! without a UI or a host.

use std::time::{Duration, Instant};

use shared::domain::{ItemId, Point};

pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_millis(200);

/// How in-progress rotation reaches the host while a drag is running.
/// The final commit on release is issued under every strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStrategy {
    /// Every pointer-move pushes an item update.
    Immediate,
    /// At most one push per debounce window.
    Debounced,
    /// Moves stream through an exclusive interaction session when one is
    /// open; otherwise this behaves like `Debounced`.
    Session,
}

impl UpdateStrategy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "immediate" => Some(Self::Immediate),
            "debounced" | "debounce" => Some(Self::Debounced),
            "session" => Some(Self::Session),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Immediate => "immediate",
            Self::Debounced => "debounced",
            Self::Session => "session",
        }
    }
}

/// Host-facing actions requested by a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum DialEffect {
    OpenSession {
        items: Vec<ItemId>,
    },
    PushRotation {
        items: Vec<ItemId>,
        rotation: f64,
        via_session: bool,
    },
    Commit {
        items: Vec<ItemId>,
        rotation: f64,
        close_session: bool,
    },
}

#[derive(Debug, Clone, Copy)]
enum DragPhase {
    Idle,
    Dragging { start_angle: f64, center: Point },
}

/// Angle of `pointer` around `center`, in degrees. Unbounded by design:
/// downstream rendering accepts any degree value, so no wrapping happens
/// anywhere in the pipeline.
pub fn pointer_angle_degrees(pointer: Point, center: Point) -> f64 {
    (pointer.y - center.y).atan2(pointer.x - center.x).to_degrees()
}

pub struct DialController {
    strategy: UpdateStrategy,
    debounce_window: Duration,
    selection: Vec<ItemId>,
    /// Committed baseline, i.e. the rotation before the active drag.
    angle: f64,
    /// Live value shown by the dial.
    rotation: f64,
    phase: DragPhase,
    session_requested: bool,
    session_open: bool,
    last_push: Option<Instant>,
}

impl DialController {
    pub fn new(strategy: UpdateStrategy, debounce_window: Duration) -> Self {
        Self {
            strategy,
            debounce_window,
            selection: Vec::new(),
            angle: 0.0,
            rotation: 0.0,
            phase: DragPhase::Idle,
            session_requested: false,
            session_open: false,
            last_push: None,
        }
    }

    pub fn strategy(&self) -> UpdateStrategy {
        self.strategy
    }

    pub fn selection(&self) -> &[ItemId] {
        &self.selection
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, DragPhase::Dragging { .. })
    }

    /// Store the new selection. Returns true when the caller should read the
    /// item's rotation from the host and feed it back via [`sync_rotation`]:
    /// only a single-item selection resets the baseline.
    ///
    /// [`sync_rotation`]: Self::sync_rotation
    pub fn set_selection(&mut self, selection: Vec<ItemId>) -> bool {
        self.selection = selection;
        self.selection.len() == 1
    }

    /// Adopt the host-reported rotation as both baseline and live value.
    /// Ignored mid-drag so an in-flight gesture is never yanked around.
    pub fn sync_rotation(&mut self, rotation: f64) {
        if self.is_dragging() {
            return;
        }
        self.angle = rotation;
        self.rotation = rotation;
    }

    /// Idle → Dragging. A pointer-down while a drag is already active is
    /// ignored: one DragState at a time, enforced here rather than assumed.
    pub fn pointer_down(&mut self, pointer: Point, center: Point) -> Option<DialEffect> {
        if self.is_dragging() || self.selection.is_empty() {
            return None;
        }

        self.phase = DragPhase::Dragging {
            start_angle: pointer_angle_degrees(pointer, center),
            center,
        };
        self.last_push = None;

        // A session is only worth opening for a single item; multi-item
        // drags propagate through the debounced fallback instead.
        if self.strategy == UpdateStrategy::Session && self.selection.len() == 1 {
            self.session_requested = true;
            return Some(DialEffect::OpenSession {
                items: self.selection.clone(),
            });
        }
        None
    }

    /// Dragging → Dragging. Recomputes the live rotation and decides whether
    /// this move propagates, per the update strategy.
    pub fn pointer_move(&mut self, pointer: Point, now: Instant) -> Option<DialEffect> {
        let DragPhase::Dragging {
            start_angle,
            center,
        } = self.phase
        else {
            return None;
        };

        let current = pointer_angle_degrees(pointer, center);
        self.rotation = self.angle + (current - start_angle);

        let window_elapsed = self
            .last_push
            .map_or(true, |last| now.duration_since(last) >= self.debounce_window);
        let push = match self.strategy {
            UpdateStrategy::Immediate => true,
            UpdateStrategy::Debounced => window_elapsed,
            // Stream through the open session; without one, fall back to
            // the debounced direct path so moves still reach the host.
            UpdateStrategy::Session => self.session_open || window_elapsed,
        };
        if !push {
            return None;
        }

        self.last_push = Some(now);
        Some(DialEffect::PushRotation {
            items: self.selection.clone(),
            rotation: self.rotation,
            via_session: self.session_open,
        })
    }

    /// Dragging → Idle. Commits `angle := rotation` and always emits exactly
    /// one final unconditional write, debounce state notwithstanding.
    pub fn pointer_up(&mut self) -> Option<DialEffect> {
        if !self.is_dragging() {
            return None;
        }

        self.phase = DragPhase::Idle;
        self.angle = self.rotation;
        self.last_push = None;

        // Close whenever a session was requested, even if the open
        // confirmation never arrived; the bridge processes commands in
        // order, so the close lands after the open.
        let close_session = self.session_requested;
        self.session_requested = false;
        self.session_open = false;

        Some(DialEffect::Commit {
            items: self.selection.clone(),
            rotation: self.rotation,
            close_session,
        })
    }

    /// The bridge confirmed an interaction session is live. Confirmations
    /// that straggle in after the drag ended are ignored.
    pub fn session_opened(&mut self) {
        if self.is_dragging() {
            self.session_open = true;
        }
    }

    /// The session ended (commit path or host-side failure).
    pub fn session_closed(&mut self) {
        self.session_open = false;
    }
}
