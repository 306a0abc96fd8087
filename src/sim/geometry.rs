//! Rays, the virtual floor, and the camera model
//!
//! Everything that turns a 2D pointer into a 3D position lives here. The
//! rendering side only needs `CameraRig::project` to go the other way.

use glam::{EulerRot, Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// A half-line with a normalized direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Point at distance `t` along the ray
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Distance to the nearest intersection with a sphere, if any
    pub fn hit_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let oc = self.origin - center;
        let b = oc.dot(self.direction);
        let c = oc.length_squared() - radius * radius;
        let disc = b * b - c;
        if disc < 0.0 {
            return None;
        }
        let root = disc.sqrt();
        let near = -b - root;
        let far = -b + root;
        if far < 0.0 {
            return None;
        }
        // Origin inside the sphere counts as a hit at the exit point
        Some(if near >= 0.0 { near } else { far })
    }

    /// Distance to the nearest intersection with a box rotated about the vertical axis
    ///
    /// Slab method in the box's local frame.
    pub fn hit_oriented_box(&self, center: Vec3, half_extents: Vec3, yaw: f32) -> Option<f32> {
        let inv = Quat::from_rotation_y(-yaw);
        let origin = inv * (self.origin - center);
        let dir = inv * self.direction;

        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;

        for axis in 0..3 {
            let o = origin[axis];
            let d = dir[axis];
            let h = half_extents[axis];
            if d.abs() < PARALLEL_EPSILON {
                // Parallel to this slab: must already be inside it
                if o < -h || o > h {
                    return None;
                }
                continue;
            }
            let mut t0 = (-h - o) / d;
            let mut t1 = (h - o) / d;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }

        if t_max < 0.0 {
            return None;
        }
        Some(if t_min >= 0.0 { t_min } else { t_max })
    }
}

/// Infinite horizontal plane with an upward normal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundPlane {
    pub height: f32,
}

impl Default for GroundPlane {
    fn default() -> Self {
        Self { height: GROUND_Y }
    }
}

impl GroundPlane {
    pub fn new(height: f32) -> Self {
        Self { height }
    }

    /// Where the ray meets the plane, or `None` if it runs parallel or away from it
    pub fn intersect(&self, ray: &Ray) -> Option<Vec3> {
        let denom = ray.direction.y;
        if denom.abs() < PARALLEL_EPSILON {
            return None;
        }
        let t = (self.height - ray.origin.y) / denom;
        if t < 0.0 || !t.is_finite() {
            return None;
        }
        let mut hit = ray.at(t);
        // Snap exactly onto the plane to avoid drift in later comparisons
        hit.y = self.height;
        Some(hit)
    }
}

/// Shorthand used by placement and dragging
#[inline]
pub fn intersect_ground_ray(plane: &GroundPlane, ray: &Ray) -> Option<Vec3> {
    plane.intersect(ray)
}

/// Euclidean distance on the XZ plane
#[inline]
pub fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    Vec2::new(a.x - b.x, a.z - b.z).length()
}

/// Index and distance of the closest item the ray hits
///
/// Ties keep the earlier item so picking is stable across frames.
pub fn nearest_hit<T>(
    items: &[T],
    mut hit: impl FnMut(&T) -> Option<f32>,
) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (i, item) in items.iter().enumerate() {
        if let Some(t) = hit(item) {
            if best.is_none_or(|(_, best_t)| t < best_t) {
                best = Some((i, t));
            }
        }
    }
    best
}

/// Convert CSS pixel coordinates to normalized device coordinates
///
/// Origin at the viewport center, y up. Points outside the viewport map
/// outside [-1, 1] and are still valid.
pub fn screen_to_ndc(x: f32, y: f32, width: f32, height: f32) -> Vec2 {
    let w = width.max(1.0);
    let h = height.max(1.0);
    Vec2::new((x / w) * 2.0 - 1.0, -(y / h) * 2.0 + 1.0)
}

/// Inverse of `screen_to_ndc`
pub fn ndc_to_screen(ndc: Vec2, width: f32, height: f32) -> Vec2 {
    Vec2::new((ndc.x + 1.0) * 0.5 * width, (1.0 - ndc.y) * 0.5 * height)
}

/// Three-axis device orientation in degrees, as delivered by the browser
///
/// `beta` is the front/back tilt: 90 with the phone upright, smaller as the
/// rear camera turns toward the floor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OrientationSample {
    pub alpha: Option<f32>,
    pub beta: Option<f32>,
    pub gamma: Option<f32>,
}

impl OrientationSample {
    pub fn new(alpha: f32, beta: f32, gamma: f32) -> Self {
        Self {
            alpha: Some(alpha),
            beta: Some(beta),
            gamma: Some(gamma),
        }
    }

    /// Front/back tilt, if the sensor reported a usable value
    pub fn pitch(&self) -> Option<f32> {
        self.beta.filter(|b| b.is_finite())
    }
}

/// Perspective camera looking down its local -Z axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    pub position: Vec3,
    pub rotation: Quat,
    /// Vertical field of view in radians
    pub fov_y: f32,
    /// Width / height
    pub aspect: f32,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, CAMERA_START_HEIGHT, CAMERA_START_DISTANCE),
            rotation: Quat::from_rotation_x(CAMERA_DEFAULT_PITCH_DEG.to_radians()),
            fov_y: CAMERA_FOV_Y_DEG.to_radians(),
            aspect: 1.0,
        }
    }
}

impl CameraRig {
    pub fn set_aspect(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Ray from the camera through a point in normalized device coordinates
    pub fn unproject(&self, ndc: Vec2) -> Ray {
        let half_h = (self.fov_y * 0.5).tan();
        let half_w = half_h * self.aspect;
        let local = Vec3::new(ndc.x * half_w, ndc.y * half_h, -1.0);
        Ray::new(self.position, self.rotation * local)
    }

    /// Viewing direction flattened onto the floor (-Z when looking straight down)
    pub fn horizontal_forward(&self) -> Vec3 {
        let f = self.forward();
        Vec3::new(f.x, 0.0, f.z).normalize_or(Vec3::NEG_Z)
    }

    /// Ray through the viewport center
    pub fn center_ray(&self) -> Ray {
        self.unproject(Vec2::ZERO)
    }

    /// World point to normalized device coordinates, `None` when behind the camera
    pub fn project(&self, world: Vec3) -> Option<Vec2> {
        let local = self.rotation.inverse() * (world - self.position);
        if local.z >= -PARALLEL_EPSILON {
            return None;
        }
        let depth = -local.z;
        let half_h = (self.fov_y * 0.5).tan();
        let half_w = half_h * self.aspect;
        Some(Vec2::new(
            local.x / (depth * half_w),
            local.y / (depth * half_h),
        ))
    }

    /// Distance from the camera along its view axis
    pub fn view_depth(&self, world: Vec3) -> f32 {
        -(self.rotation.inverse() * (world - self.position)).z
    }

    /// Point the camera the way the device is facing
    ///
    /// Missing components keep their neutral value (upright, no yaw, no roll).
    pub fn apply_orientation(&mut self, sample: &OrientationSample) {
        let Some(beta) = sample.pitch() else {
            return;
        };
        let yaw = sample.alpha.filter(|a| a.is_finite()).unwrap_or(0.0);
        let roll = sample.gamma.filter(|g| g.is_finite()).unwrap_or(0.0);
        let pitch = (beta.clamp(-180.0, 180.0) - 90.0).to_radians();
        self.rotation = Quat::from_euler(
            EulerRot::YXZ,
            yaw.to_radians(),
            pitch,
            -roll.to_radians(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_ground_hit_straight_down() {
        let plane = GroundPlane::new(-0.6);
        let ray = Ray::new(Vec3::new(1.0, 2.0, -3.0), Vec3::NEG_Y);
        let hit = plane.intersect(&ray).expect("should hit");
        assert!(approx(hit.x, 1.0));
        assert!(approx(hit.y, -0.6));
        assert!(approx(hit.z, -3.0));
    }

    #[test]
    fn test_ground_miss_when_parallel_or_skyward() {
        let plane = GroundPlane::new(-0.6);
        let flat = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        assert!(plane.intersect(&flat).is_none());

        let nearly_flat = Ray::new(Vec3::ZERO, Vec3::new(0.0, -1e-8, -1.0));
        assert!(plane.intersect(&nearly_flat).is_none());

        let up = Ray::new(Vec3::ZERO, Vec3::new(0.0, 1.0, -1.0));
        assert!(plane.intersect(&up).is_none());
    }

    #[test]
    fn test_horizontal_distance_ignores_height() {
        let a = Vec3::new(0.0, 5.0, 0.0);
        let b = Vec3::new(3.0, -2.0, 4.0);
        assert!(approx(horizontal_distance(a, b), 5.0));
    }

    #[test]
    fn test_screen_to_ndc_corners() {
        let center = screen_to_ndc(400.0, 300.0, 800.0, 600.0);
        assert!(approx(center.x, 0.0) && approx(center.y, 0.0));

        let top_left = screen_to_ndc(0.0, 0.0, 800.0, 600.0);
        assert!(approx(top_left.x, -1.0) && approx(top_left.y, 1.0));

        // Off-screen and zero-sized viewports must not blow up
        let off = screen_to_ndc(-400.0, 900.0, 800.0, 600.0);
        assert!(off.x < -1.0 && off.y < -1.0);
        let degenerate = screen_to_ndc(10.0, 10.0, 0.0, 0.0);
        assert!(degenerate.is_finite());
    }

    #[test]
    fn test_unproject_center_matches_forward() {
        let cam = CameraRig::default();
        let ray = cam.center_ray();
        assert!(ray.direction.abs_diff_eq(cam.forward(), 1e-5));
        assert_eq!(ray.origin, cam.position);
    }

    #[test]
    fn test_project_roundtrips_unproject() {
        let mut cam = CameraRig::default();
        cam.set_aspect(16.0, 9.0);
        let ndc = Vec2::new(0.3, -0.4);
        let ray = cam.unproject(ndc);
        let back = cam.project(ray.at(2.5)).expect("in front of camera");
        assert!(back.abs_diff_eq(ndc, 1e-4));
    }

    #[test]
    fn test_project_behind_camera() {
        let cam = CameraRig::default();
        let behind = cam.position - cam.forward();
        assert!(cam.project(behind).is_none());
    }

    #[test]
    fn test_orientation_upright_looks_at_horizon() {
        let mut cam = CameraRig::default();
        cam.apply_orientation(&OrientationSample::new(0.0, 90.0, 0.0));
        assert!(cam.forward().abs_diff_eq(Vec3::NEG_Z, 1e-5));
        let plane = GroundPlane::default();
        assert!(plane.intersect(&cam.center_ray()).is_none());
    }

    #[test]
    fn test_orientation_tilted_sees_floor() {
        let mut cam = CameraRig::default();
        cam.apply_orientation(&OrientationSample::new(0.0, 45.0, 0.0));
        assert!(cam.forward().y < 0.0);
        let plane = GroundPlane::default();
        assert!(plane.intersect(&cam.center_ray()).is_some());
    }

    #[test]
    fn test_orientation_without_beta_is_ignored() {
        let mut cam = CameraRig::default();
        let before = cam.rotation;
        cam.apply_orientation(&OrientationSample {
            alpha: Some(10.0),
            beta: None,
            gamma: Some(5.0),
        });
        assert_eq!(cam.rotation, before);
    }

    #[test]
    fn test_sphere_hit_nearest_surface() {
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let t = ray.hit_sphere(Vec3::new(0.0, 0.0, -5.0), 1.0).unwrap();
        assert!(approx(t, 4.0));
        assert!(ray.hit_sphere(Vec3::new(3.0, 0.0, -5.0), 1.0).is_none());
        assert!(ray.hit_sphere(Vec3::new(0.0, 0.0, 5.0), 1.0).is_none());
    }

    #[test]
    fn test_nearest_hit_prefers_closest() {
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let spheres = [
            Vec3::new(0.0, 0.0, -6.0),
            Vec3::new(0.0, 0.0, -3.0),
            Vec3::new(5.0, 0.0, -1.0),
        ];
        let (idx, t) = nearest_hit(&spheres, |c| ray.hit_sphere(*c, 0.5)).unwrap();
        assert_eq!(idx, 1);
        assert!(approx(t, 2.5));

        let empty: [Vec3; 0] = [];
        assert!(nearest_hit(&empty, |c| ray.hit_sphere(*c, 0.5)).is_none());
    }

    #[test]
    fn test_oriented_box_respects_yaw() {
        let half = Vec3::new(0.5, 0.05, 0.05);
        let down = |x: f32, z: f32| Ray::new(Vec3::new(x, 1.0, z), Vec3::NEG_Y);

        // Unrotated: long along X
        assert!(down(0.4, 0.0).hit_oriented_box(Vec3::ZERO, half, 0.0).is_some());
        assert!(down(0.0, 0.4).hit_oriented_box(Vec3::ZERO, half, 0.0).is_none());

        // Quarter turn: long along Z
        let yaw = std::f32::consts::FRAC_PI_2;
        assert!(down(0.4, 0.0).hit_oriented_box(Vec3::ZERO, half, yaw).is_none());
        assert!(down(0.0, 0.4).hit_oriented_box(Vec3::ZERO, half, yaw).is_some());

        let t = down(0.0, 0.0).hit_oriented_box(Vec3::ZERO, half, 0.0).unwrap();
        assert!(approx(t, 0.95));
    }
}
