/// Direction a committed gesture resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    /// Drag to the right: accept the candidate
    Accept,
    /// Drag to the left: reject the candidate
    Reject,
}

/// Gesture phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SwipePhase {
    Idle,
    Dragging { dx: f32, dy: f32 },
}

/// Swipe gesture state machine
///
/// Turns continuous pointer samples into at most one discrete decision per
/// gesture. A gesture that ends past `commit_threshold` commits in the
/// direction of the horizontal offset; anything under the threshold cancels
/// and emits nothing.
///
/// The `in_flight` latch is the re-entrancy guard: once a decision commits,
/// no new gesture or discrete action is admitted until the coordinator has
/// resolved the cycle's side effects. This is what keeps a fast swiper from
/// double-submitting the same candidate while the backend is slow.
#[derive(Debug, Clone)]
pub struct SwipeController {
    phase: SwipePhase,
    commit_threshold: f32,
    in_flight: bool,
}

impl SwipeController {
    pub fn new(commit_threshold: f32) -> Self {
        Self {
            phase: SwipePhase::Idle,
            commit_threshold,
            in_flight: false,
        }
    }

    pub fn phase(&self) -> SwipePhase {
        self.phase
    }

    /// Live drag offset for rendering, None outside a drag
    pub fn offset(&self) -> Option<(f32, f32)> {
        match self.phase {
            SwipePhase::Dragging { dx, dy } => Some((dx, dy)),
            SwipePhase::Idle => None,
        }
    }

    /// True while a committed decision is still being processed
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Start a drag. Refused while a prior decision is unresolved or a
    /// drag is already active.
    pub fn begin_gesture(&mut self) -> bool {
        if self.in_flight || !matches!(self.phase, SwipePhase::Idle) {
            return false;
        }
        self.phase = SwipePhase::Dragging { dx: 0.0, dy: 0.0 };
        true
    }

    /// Update the cumulative offset; ignored outside a drag
    pub fn sample(&mut self, dx: f32, dy: f32) {
        if matches!(self.phase, SwipePhase::Dragging { .. }) {
            self.phase = SwipePhase::Dragging { dx, dy };
        }
    }

    /// End the gesture: commit past the threshold, cancel under it.
    ///
    /// Emits at most one direction per gesture. A commit latches
    /// `in_flight` until `resolve` is called.
    pub fn end_gesture(&mut self) -> Option<SwipeDirection> {
        let SwipePhase::Dragging { dx, .. } = self.phase else {
            return None;
        };
        self.phase = SwipePhase::Idle;

        if dx.abs() > self.commit_threshold {
            self.in_flight = true;
            Some(if dx > 0.0 {
                SwipeDirection::Accept
            } else {
                SwipeDirection::Reject
            })
        } else {
            None
        }
    }

    /// Latch a decision from a discrete button action, bypassing the drag.
    ///
    /// Refused while dragging or while a prior decision is unresolved.
    pub fn try_latch(&mut self) -> bool {
        if self.in_flight || !matches!(self.phase, SwipePhase::Idle) {
            return false;
        }
        self.in_flight = true;
        true
    }

    /// Release the latch once the decision cycle's side effects finished
    pub fn resolve(&mut self) {
        self.in_flight = false;
    }
}
