//! Deterministic game engine
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Frame time comes in as an argument, never from a clock
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod autoplay;
pub mod drag;
pub mod geometry;
pub mod hunt;
pub mod ignition;
pub mod placement;
pub mod state;
pub mod tick;

pub use autoplay::Autopilot;
pub use drag::{DragController, WoodPiece};
pub use geometry::{
    CameraRig, GroundPlane, OrientationSample, Ray, horizontal_distance, intersect_ground_ray,
    ndc_to_screen, screen_to_ndc,
};
pub use hunt::{HuntTarget, HuntTask, Outcome, TargetKind, TargetState};
pub use ignition::{FireRing, FireStep, FireTask, Flame, StabilityTimer, all_contained, is_contained};
pub use placement::{Placement, PlacementError, PlacementStage, ScanIndicator};
pub use state::{GameEvent, GamePhase, GameSession, HuntSummary, PhaseKind, PointerInput};
pub use tick::{TickInput, tick};
