//! Floor scanning and anchor placement
//!
//! Flow: `Scanning` (indicator follows the camera's view of the floor) →
//! `Ready` (player pressed "prepare placement", taps now place) → `Locked`.
//! There is no real plane detection: the floor is a fixed-height plane and
//! "floor ready" is a device-tilt heuristic that only changes messaging.

use std::fmt;

use glam::{Vec2, Vec3};

use super::geometry::{CameraRig, GroundPlane, horizontal_distance, intersect_ground_ray};
use crate::consts::*;

/// Where the placement flow currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementStage {
    Scanning,
    Ready,
    Locked,
}

/// Why a placement tap was refused
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlacementError {
    /// Tap arrived before "prepare placement"
    NotArmed,
    /// The pointer ray never reaches the floor
    RayMissedGround,
    /// Tap landed too far from the scan indicator
    TooFarFromIndicator { distance: f32, limit: f32 },
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementError::NotArmed => write!(f, "placement is not armed yet"),
            PlacementError::RayMissedGround => write!(f, "tap did not land on the floor"),
            PlacementError::TooFarFromIndicator { distance, limit } => write!(
                f,
                "tap is {:.2} units from the scan marker (limit {:.2})",
                distance, limit
            ),
        }
    }
}

impl std::error::Error for PlacementError {}

/// Marker on the floor where the camera is pointing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanIndicator {
    pub position: Vec3,
    pub opacity: f32,
    /// Whether the last center ray reached the floor
    pub on_floor: bool,
}

impl ScanIndicator {
    fn new(ground_y: f32) -> Self {
        Self {
            position: Vec3::new(0.0, ground_y, 0.0),
            opacity: SCAN_OPACITY_SEARCHING,
            on_floor: false,
        }
    }
}

/// Pre-game placement state
#[derive(Debug, Clone)]
pub struct Placement {
    pub stage: PlacementStage,
    pub indicator: ScanIndicator,
    /// Tentative anchor, follows the indicator until locked
    pub anchor: Vec3,
    pub max_radius: f32,
}

impl Placement {
    pub fn new(ground: &GroundPlane, max_radius: f32) -> Self {
        let indicator = ScanIndicator::new(ground.height);
        Self {
            stage: PlacementStage::Scanning,
            indicator,
            anchor: indicator.position,
            max_radius,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.stage == PlacementStage::Ready
    }

    /// Follow the camera's center ray across the floor
    pub fn update(&mut self, camera: &CameraRig, ground: &GroundPlane, floor_ready: bool, dt: f32) {
        if self.stage == PlacementStage::Locked {
            return;
        }

        match intersect_ground_ray(ground, &camera.center_ray()) {
            Some(hit) => {
                self.indicator.position = hit;
                self.indicator.on_floor = true;
                self.indicator.opacity = if floor_ready {
                    SCAN_OPACITY_READY
                } else {
                    SCAN_OPACITY_SEARCHING
                };
                self.anchor = hit;
            }
            None => {
                self.indicator.on_floor = false;
                self.indicator.opacity =
                    (self.indicator.opacity - SCAN_FADE_PER_SECOND * dt).max(SCAN_OPACITY_MIN);
            }
        }
    }

    /// Arm tap-to-place. Returns true if this call changed anything.
    pub fn arm(&mut self) -> bool {
        if self.stage == PlacementStage::Scanning {
            self.stage = PlacementStage::Ready;
            true
        } else {
            false
        }
    }

    /// Resolve a tap to a floor point and lock the anchor there
    pub fn try_place(
        &mut self,
        ndc: Vec2,
        camera: &CameraRig,
        ground: &GroundPlane,
    ) -> Result<Vec3, PlacementError> {
        if self.stage != PlacementStage::Ready {
            return Err(PlacementError::NotArmed);
        }
        let point = intersect_ground_ray(ground, &camera.unproject(ndc))
            .ok_or(PlacementError::RayMissedGround)?;
        self.lock_at(point)
    }

    /// Lock onto an already-resolved floor point, enforcing the radius limit
    pub fn lock_at(&mut self, point: Vec3) -> Result<Vec3, PlacementError> {
        if self.stage != PlacementStage::Ready {
            return Err(PlacementError::NotArmed);
        }
        let distance = horizontal_distance(point, self.indicator.position);
        if distance > self.max_radius {
            return Err(PlacementError::TooFarFromIndicator {
                distance,
                limit: self.max_radius,
            });
        }
        self.anchor = Vec3::new(point.x, self.indicator.position.y, point.z);
        self.stage = PlacementStage::Locked;
        Ok(self.anchor)
    }
}

/// Whether a tilt reading means the phone is looking at the floor
#[inline]
pub fn is_floor_pitch(pitch_deg: f32, threshold_deg: f32) -> bool {
    pitch_deg > threshold_deg
}

#[cfg(test)]
mod tests {
    use super::*;

    fn looking_down() -> CameraRig {
        CameraRig {
            position: Vec3::new(0.0, 1.0, 0.0),
            rotation: glam::Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2),
            ..Default::default()
        }
    }

    fn looking_up() -> CameraRig {
        CameraRig {
            rotation: glam::Quat::from_rotation_x(0.5),
            ..Default::default()
        }
    }

    #[test]
    fn test_indicator_tracks_center_ray() {
        let ground = GroundPlane::default();
        let mut p = Placement::new(&ground, MAX_PLACE_RADIUS);
        p.update(&looking_down(), &ground, true, SIM_DT);
        assert!(p.indicator.on_floor);
        assert!(p.indicator.position.abs_diff_eq(Vec3::new(0.0, GROUND_Y, 0.0), 1e-4));
        assert_eq!(p.indicator.opacity, SCAN_OPACITY_READY);
        assert_eq!(p.anchor, p.indicator.position);

        p.update(&looking_down(), &ground, false, SIM_DT);
        assert_eq!(p.indicator.opacity, SCAN_OPACITY_SEARCHING);
    }

    #[test]
    fn test_indicator_fades_on_miss() {
        let ground = GroundPlane::default();
        let mut p = Placement::new(&ground, MAX_PLACE_RADIUS);
        p.update(&looking_down(), &ground, true, SIM_DT);
        let last = p.indicator.position;

        p.update(&looking_up(), &ground, true, 0.05);
        assert!(!p.indicator.on_floor);
        assert!(p.indicator.opacity < SCAN_OPACITY_READY);
        assert!(p.indicator.opacity > SCAN_OPACITY_MIN);
        assert_eq!(p.indicator.position, last);

        for _ in 0..100 {
            p.update(&looking_up(), &ground, true, 0.05);
        }
        assert_eq!(p.indicator.opacity, SCAN_OPACITY_MIN);
    }

    #[test]
    fn test_tap_before_arming_is_refused() {
        let ground = GroundPlane::default();
        let mut p = Placement::new(&ground, MAX_PLACE_RADIUS);
        let err = p.try_place(Vec2::ZERO, &looking_down(), &ground).unwrap_err();
        assert_eq!(err, PlacementError::NotArmed);
        assert_eq!(p.stage, PlacementStage::Scanning);
    }

    #[test]
    fn test_tap_that_misses_floor_keeps_state() {
        let ground = GroundPlane::default();
        let mut p = Placement::new(&ground, MAX_PLACE_RADIUS);
        assert!(p.arm());
        let err = p.try_place(Vec2::ZERO, &looking_up(), &ground).unwrap_err();
        assert_eq!(err, PlacementError::RayMissedGround);
        assert_eq!(p.stage, PlacementStage::Ready);
    }

    #[test]
    fn test_place_locks_anchor() {
        let ground = GroundPlane::default();
        let cam = looking_down();
        let mut p = Placement::new(&ground, MAX_PLACE_RADIUS);
        p.update(&cam, &ground, true, SIM_DT);
        p.arm();
        let anchor = p.try_place(Vec2::new(0.1, 0.1), &cam, &ground).unwrap();
        assert_eq!(p.stage, PlacementStage::Locked);
        assert_eq!(anchor.y, GROUND_Y);
        assert!(!p.arm());
    }

    #[test]
    fn test_radius_limit() {
        let ground = GroundPlane::default();
        let mut p = Placement::new(&ground, MAX_PLACE_RADIUS);
        p.arm();
        let far = Vec3::new(MAX_PLACE_RADIUS + 0.01, GROUND_Y, 0.0);
        match p.lock_at(far) {
            Err(PlacementError::TooFarFromIndicator { distance, .. }) => {
                assert!(distance > MAX_PLACE_RADIUS)
            }
            other => panic!("expected rejection, got {:?}", other),
        }
        let near = Vec3::new(MAX_PLACE_RADIUS - 0.01, GROUND_Y, 0.0);
        assert!(p.lock_at(near).is_ok());
    }

    #[test]
    fn test_floor_pitch_threshold_is_strict() {
        assert!(!is_floor_pitch(55.0, FLOOR_PITCH_THRESHOLD_DEG));
        assert!(is_floor_pitch(55.1, FLOOR_PITCH_THRESHOLD_DEG));
    }
}
