//! Frame tick
//!
//! Applies queued input, then advances whichever task the current phase runs.

use super::geometry::OrientationSample;
use super::state::{GameSession, PointerInput};
use crate::consts::MAX_FRAME_DT;

/// Input gathered between two ticks
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer events in arrival order
    pub pointer: Vec<PointerInput>,
    /// Most recent orientation sample, if one arrived
    pub orientation: Option<OrientationSample>,
}

impl TickInput {
    /// Forget everything already handed to a tick
    pub fn clear(&mut self) {
        self.pointer.clear();
        self.orientation = None;
    }
}

/// Advance the session by one frame
///
/// Input is applied before the task update, so a winning or losing hit is
/// resolved in the same frame it was made.
pub fn tick(session: &mut GameSession, input: &TickInput, dt: f32) {
    let dt = if dt.is_finite() { dt.clamp(0.0, MAX_FRAME_DT) } else { 0.0 };

    if let Some(sample) = &input.orientation {
        session.orientation_sample(sample);
    }
    for event in &input.pointer {
        session.dispatch_pointer(*event);
    }

    session.step(dt);
}
