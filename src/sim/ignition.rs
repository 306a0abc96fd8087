//! Fire task: keep every wood piece inside the ring long enough to light it
//!
//! Containment is re-tested every frame. Time only accumulates while all
//! pieces are strictly inside the ring; a single frame with a piece outside
//! throws the progress away.

use glam::Vec3;

use super::drag::{DragController, WoodPiece};
use super::geometry::{GroundPlane, Ray, horizontal_distance};
use super::state::GameEvent;
use crate::consts::*;
use crate::lerp;

/// Circular target area on the floor around the anchor
#[derive(Debug, Clone, PartialEq)]
pub struct FireRing {
    pub center: Vec3,
    pub radius: f32,
    pub opacity: f32,
    pub color: u32,
    pub lit: bool,
}

impl FireRing {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            center,
            radius,
            opacity: RING_OPACITY_MIN,
            color: RING_COLOR,
            lit: false,
        }
    }

    /// Brighten the ring with stability progress (0-1)
    pub fn show_progress(&mut self, progress: f32) {
        if self.lit {
            return;
        }
        self.opacity = lerp(RING_OPACITY_MIN, RING_OPACITY_MAX, progress.clamp(0.0, 1.0));
    }

    fn light(&mut self) {
        self.lit = true;
        self.color = RING_LIT_COLOR;
        self.opacity = RING_OPACITY_MAX;
    }
}

/// Flame marker shown once the fire is lit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flame {
    pub position: Vec3,
}

/// Seconds of continuous containment, capped at the requirement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StabilityTimer {
    pub elapsed: f32,
    pub required: f32,
}

impl StabilityTimer {
    pub fn new(required: f32) -> Self {
        Self {
            elapsed: 0.0,
            required,
        }
    }

    /// Advance or reset. Returns true once the requirement is met.
    pub fn update(&mut self, contained: bool, dt: f32) -> bool {
        if contained {
            self.elapsed = (self.elapsed + dt).min(self.required);
        } else {
            self.elapsed = 0.0;
        }
        self.is_complete()
    }

    pub fn is_complete(&self) -> bool {
        self.elapsed >= self.required
    }

    pub fn progress(&self) -> f32 {
        if self.required <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.required).min(1.0)
    }
}

/// Strict containment: a piece exactly on the rim is outside
#[inline]
pub fn is_contained(position: Vec3, center: Vec3, radius: f32) -> bool {
    horizontal_distance(position, center) < radius
}

/// Whether every piece is inside the ring (false for an empty set)
pub fn all_contained(pieces: &[WoodPiece], center: Vec3, radius: f32) -> bool {
    !pieces.is_empty() && pieces.iter().all(|p| is_contained(p.position, center, radius))
}

/// What the last status report said, to avoid repeating it every frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StabilityReport {
    contained: bool,
    percent: u32,
}

/// Result of one fire-task frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireStep {
    /// Still building, or waiting out the post-ignition delay
    Running,
    /// The post-ignition delay has elapsed; hand over to the hunt
    HandoffDue,
}

/// All state owned by the fire task
#[derive(Debug, Clone)]
pub struct FireTask {
    pub anchor: Vec3,
    pub ring: FireRing,
    pub pieces: Vec<WoodPiece>,
    pub drag: DragController,
    pub timer: StabilityTimer,
    pub flame: Option<Flame>,
    /// Seconds until the hunt starts, set on ignition
    pub handoff: Option<f32>,
    handoff_delay: f32,
    last_report: Option<StabilityReport>,
}

impl FireTask {
    /// Lay out the ring and the wood pieces around a locked anchor
    pub fn new(anchor: Vec3, fire_radius: f32, stable_seconds: f32, handoff_delay: f32) -> Self {
        let pieces = WOOD_LAYOUT
            .iter()
            .enumerate()
            .map(|(i, &(dx, dz, yaw))| {
                WoodPiece::new(i as u32 + 1, Vec3::new(anchor.x + dx, anchor.y, anchor.z + dz), yaw)
            })
            .collect();

        Self {
            anchor,
            ring: FireRing::new(anchor, fire_radius),
            pieces,
            drag: DragController::default(),
            timer: StabilityTimer::new(stable_seconds),
            flame: None,
            handoff: None,
            handoff_delay,
            last_report: None,
        }
    }

    pub fn is_ignited(&self) -> bool {
        self.flame.is_some()
    }

    pub fn pointer_down(&mut self, ray: &Ray) -> Option<u32> {
        if self.is_ignited() {
            return None;
        }
        self.drag.pointer_down(ray, &self.pieces)
    }

    pub fn pointer_move(&mut self, ray: &Ray, ground: &GroundPlane) -> bool {
        if self.is_ignited() {
            return false;
        }
        self.drag.pointer_move(ray, ground, &mut self.pieces)
    }

    pub fn pointer_up(&mut self) {
        self.drag.pointer_up();
    }

    /// Light the fire. Returns false if it was already lit.
    pub fn ignite(&mut self) -> bool {
        if self.is_ignited() {
            return false;
        }
        self.ring.light();
        self.flame = Some(Flame {
            position: self.anchor + Vec3::Y * FLAME_HEIGHT,
        });
        self.handoff = Some(self.handoff_delay);
        self.drag.pointer_up();
        log::info!("Fire lit at ({:.2}, {:.2})", self.anchor.x, self.anchor.z);
        true
    }

    /// Advance the task by one frame
    pub fn update(&mut self, dt: f32, events: &mut Vec<GameEvent>) -> FireStep {
        if let Some(remaining) = self.handoff.as_mut() {
            *remaining -= dt;
            return if *remaining <= 0.0 {
                FireStep::HandoffDue
            } else {
                FireStep::Running
            };
        }

        let contained = all_contained(&self.pieces, self.ring.center, self.ring.radius);
        let complete = self.timer.update(contained, dt);
        let progress = self.timer.progress();
        self.ring.show_progress(progress);

        let report = StabilityReport {
            contained,
            percent: (progress * 100.0).round() as u32,
        };
        if self.last_report != Some(report) {
            self.last_report = Some(report);
            events.push(GameEvent::Stability {
                contained,
                percent: report.percent,
            });
        }

        if complete && self.ignite() {
            events.push(GameEvent::Ignited);
        }
        FireStep::Running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> FireTask {
        FireTask::new(
            Vec3::new(0.0, GROUND_Y, 0.0),
            FIRE_RADIUS,
            STABLE_SECONDS,
            IGNITION_HANDOFF_SECONDS,
        )
    }

    fn gather(task: &mut FireTask) {
        for (i, piece) in task.pieces.iter_mut().enumerate() {
            piece.position = Vec3::new(0.1 * i as f32, GROUND_Y, 0.0);
        }
    }

    #[test]
    fn test_initial_layout_is_outside() {
        let t = task();
        assert_eq!(t.pieces.len(), 3);
        assert!(!all_contained(&t.pieces, t.anchor, FIRE_RADIUS));
        assert!(t.pieces.iter().all(|p| p.position.y == GROUND_Y));
        assert_eq!(t.ring.opacity, RING_OPACITY_MIN);
    }

    #[test]
    fn test_containment_is_strict() {
        let c = Vec3::ZERO;
        assert!(is_contained(Vec3::new(0.59, 0.0, 0.0), c, 0.6));
        assert!(!is_contained(Vec3::new(0.6, 0.0, 0.0), c, 0.6));
        assert!(!all_contained(&[], c, 0.6));
    }

    #[test]
    fn test_timer_resets_on_break() {
        let mut timer = StabilityTimer::new(2.5);
        timer.update(true, 1.0);
        timer.update(true, 1.0);
        assert_eq!(timer.elapsed, 2.0);
        timer.update(false, 0.1);
        assert_eq!(timer.elapsed, 0.0);
        assert!(timer.update(true, 3.0));
        assert_eq!(timer.elapsed, 2.5);
    }

    #[test]
    fn test_ring_opacity_tracks_progress() {
        let mut t = task();
        gather(&mut t);
        let mut events = Vec::new();
        t.update(1.25, &mut events);
        assert!((t.ring.opacity - 0.7).abs() < 1e-5);
        assert_eq!(
            events.last(),
            Some(&GameEvent::Stability {
                contained: true,
                percent: 50
            })
        );
    }

    #[test]
    fn test_ignites_once_then_hands_off() {
        let mut t = task();
        gather(&mut t);
        let mut events = Vec::new();

        assert_eq!(t.update(STABLE_SECONDS, &mut events), FireStep::Running);
        assert!(t.is_ignited());
        assert!(t.ring.lit);
        assert_eq!(t.ring.color, RING_LIT_COLOR);
        assert_eq!(events.iter().filter(|e| **e == GameEvent::Ignited).count(), 1);

        // Repeated triggers do nothing
        assert!(!t.ignite());
        assert_eq!(t.update(0.5, &mut events), FireStep::Running);
        assert_eq!(events.iter().filter(|e| **e == GameEvent::Ignited).count(), 1);

        assert_eq!(t.update(0.31, &mut events), FireStep::HandoffDue);
    }

    #[test]
    fn test_dragging_disabled_after_ignition() {
        let mut t = task();
        let ray = Ray::new(t.pieces[0].position + Vec3::Y, Vec3::NEG_Y);
        assert_eq!(t.pointer_down(&ray), Some(1));
        t.pointer_up();

        gather(&mut t);
        t.update(STABLE_SECONDS, &mut Vec::new());
        let ray = Ray::new(t.pieces[0].position + Vec3::Y, Vec3::NEG_Y);
        assert_eq!(t.pointer_down(&ray), None);
        assert!(!t.pointer_move(&ray, &GroundPlane::default()));
    }

    #[test]
    fn test_status_only_on_change() {
        let mut t = task();
        let mut events = Vec::new();
        for _ in 0..10 {
            t.update(SIM_DT, &mut events);
        }
        assert_eq!(events.len(), 1);
    }
}
