//! Shape generation for the overlay
//!
//! Everything here maps world-space geometry to screen pixels through the
//! session camera. Points behind the camera are dropped.

use glam::{Vec2, Vec3};
use std::f32::consts::PI;

use crate::sim::{CameraRig, ndc_to_screen};
use crate::unpack_rgb;

/// Output surface size in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// World point to screen pixels, `None` behind the camera
    pub fn project(&self, camera: &CameraRig, world: Vec3) -> Option<Vec2> {
        camera
            .project(world)
            .map(|ndc| ndc_to_screen(ndc, self.width, self.height))
    }
}

/// Packed 0xRRGGBB plus alpha to a canvas-ready RGBA array
pub fn rgba(color: u32, alpha: f32) -> [f32; 4] {
    let [r, g, b] = unpack_rgb(color);
    [r, g, b, alpha.clamp(0.0, 1.0)]
}

/// Horizontal circle on the floor, as a closed polyline
///
/// Returns an empty list if any part of the circle is behind the camera.
pub fn floor_circle(
    camera: &CameraRig,
    viewport: &Viewport,
    center: Vec3,
    radius: f32,
    segments: u32,
) -> Vec<Vec2> {
    let mut points = Vec::with_capacity(segments as usize);

    for i in 0..segments {
        let theta = (i as f32 / segments as f32) * 2.0 * PI;
        let world = center + Vec3::new(radius * theta.cos(), 0.0, radius * theta.sin());
        match viewport.project(camera, world) {
            Some(p) => points.push(p),
            None => return Vec::new(),
        }
    }

    points
}

/// Square floor grid centered on `center`, as line segments
pub fn floor_grid(
    camera: &CameraRig,
    viewport: &Viewport,
    center: Vec3,
    size: f32,
    divisions: u32,
) -> Vec<[Vec2; 2]> {
    let half = size * 0.5;
    let step = size / divisions.max(1) as f32;
    let mut lines = Vec::with_capacity(((divisions + 1) * 2) as usize);

    for i in 0..=divisions {
        let offset = -half + i as f32 * step;
        let pairs = [
            (Vec3::new(offset, 0.0, -half), Vec3::new(offset, 0.0, half)),
            (Vec3::new(-half, 0.0, offset), Vec3::new(half, 0.0, offset)),
        ];
        for (a, b) in pairs {
            if let (Some(a), Some(b)) = (
                viewport.project(camera, center + a),
                viewport.project(camera, center + b),
            ) {
                lines.push([a, b]);
            }
        }
    }

    lines
}

/// Screen silhouette of a box rotated about the vertical axis
pub fn box_silhouette(
    camera: &CameraRig,
    viewport: &Viewport,
    center: Vec3,
    half_extents: Vec3,
    yaw: f32,
) -> Option<Vec<Vec2>> {
    let (sin, cos) = yaw.sin_cos();
    let mut corners = Vec::with_capacity(8);

    for sx in [-1.0, 1.0] {
        for sy in [-1.0, 1.0] {
            for sz in [-1.0, 1.0] {
                let local = half_extents * Vec3::new(sx, sy, sz);
                // Same handedness as a Y rotation by `yaw`
                let rotated = Vec3::new(
                    local.x * cos + local.z * sin,
                    local.y,
                    -local.x * sin + local.z * cos,
                );
                corners.push(viewport.project(camera, center + rotated)?);
            }
        }
    }

    Some(convex_hull(corners))
}

/// Sphere as a screen disc: (center, pixel radius)
pub fn sphere_disc(
    camera: &CameraRig,
    viewport: &Viewport,
    center: Vec3,
    radius: f32,
) -> Option<(Vec2, f32)> {
    let screen = viewport.project(camera, center)?;
    let depth = camera.view_depth(center);
    let half_h = (camera.fov_y * 0.5).tan();
    let pixels = radius / (depth * half_h) * viewport.height * 0.5;
    Some((screen, pixels))
}

/// Upright cone standing on `base`, drawn as a triangle facing the camera
pub fn cone_triangle(
    camera: &CameraRig,
    viewport: &Viewport,
    base: Vec3,
    radius: f32,
    height: f32,
) -> Option<[Vec2; 3]> {
    let right = camera.rotation * Vec3::X;
    let right = Vec3::new(right.x, 0.0, right.z).normalize_or(Vec3::X);
    Some([
        viewport.project(camera, base - right * radius)?,
        viewport.project(camera, base + right * radius)?,
        viewport.project(camera, base + Vec3::Y * height)?,
    ])
}

/// Convex hull (monotone chain), counter-clockwise in screen space
pub fn convex_hull(mut points: Vec<Vec2>) -> Vec<Vec2> {
    if points.len() < 3 {
        return points;
    }
    points.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));

    let mut lower = half_hull(points.iter().copied());
    let mut upper = half_hull(points.iter().rev().copied());
    // Each half ends where the other begins
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

fn half_hull(points: impl Iterator<Item = Vec2>) -> Vec<Vec2> {
    let cross = |o: Vec2, a: Vec2, b: Vec2| (a - o).perp_dot(b - o);
    let mut chain: Vec<Vec2> = Vec::new();
    for p in points {
        while chain.len() >= 2 && cross(chain[chain.len() - 2], chain[chain.len() - 1], p) <= 0.0 {
            chain.pop();
        }
        chain.push(p);
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::GROUND_Y;

    fn viewport() -> Viewport {
        Viewport::new(800.0, 600.0)
    }

    fn looking_at_floor() -> (CameraRig, Vec3) {
        let mut camera = CameraRig::default();
        camera.set_aspect(800.0, 600.0);
        let target = crate::sim::GroundPlane::default()
            .intersect(&camera.center_ray())
            .unwrap();
        (camera, target)
    }

    #[test]
    fn test_rgba_unpacks_channels() {
        assert_eq!(rgba(0xff0000, 0.5), [1.0, 0.0, 0.0, 0.5]);
        assert_eq!(rgba(0x000000, 3.0)[3], 1.0);
    }

    #[test]
    fn test_floor_circle_surrounds_its_center() {
        let (camera, target) = looking_at_floor();
        let points = floor_circle(&camera, &viewport(), target, 0.6, 32);
        assert_eq!(points.len(), 32);

        let center = viewport().project(&camera, target).unwrap();
        let min = points.iter().fold(Vec2::splat(f32::MAX), |m, p| m.min(*p));
        let max = points.iter().fold(Vec2::splat(f32::MIN), |m, p| m.max(*p));
        assert!(min.x < center.x && center.x < max.x);
        assert!(min.y < center.y && center.y < max.y);
    }

    #[test]
    fn test_circle_behind_camera_is_empty() {
        let camera = CameraRig::default();
        let behind = camera.position - camera.forward() * 3.0;
        assert!(floor_circle(&camera, &viewport(), behind, 0.6, 16).is_empty());
    }

    #[test]
    fn test_sphere_disc_shrinks_with_distance() {
        let (camera, target) = looking_at_floor();
        let near = target + Vec3::new(0.0, 0.3, 0.5);
        let far = target + Vec3::new(0.0, 0.3, -1.5);
        let (_, r_near) = sphere_disc(&camera, &viewport(), near, 0.1).unwrap();
        let (_, r_far) = sphere_disc(&camera, &viewport(), far, 0.1).unwrap();
        assert!(r_near > r_far);
        assert!(r_far > 0.0);
    }

    #[test]
    fn test_box_silhouette_contains_center() {
        let (camera, target) = looking_at_floor();
        let hull = box_silhouette(&camera, &viewport(), target, Vec3::new(0.125, 0.04, 0.04), 0.7)
            .unwrap();
        assert!(hull.len() >= 4);

        let center = viewport().project(&camera, target).unwrap();
        // Counter-clockwise hull: the center is left of every edge
        for i in 0..hull.len() {
            let a = hull[i];
            let b = hull[(i + 1) % hull.len()];
            assert!((b - a).perp_dot(center - a) >= 0.0);
        }
    }

    #[test]
    fn test_grid_has_lines_when_visible() {
        let (camera, _) = looking_at_floor();
        let center = Vec3::new(0.0, GROUND_Y, 0.0);
        let lines = floor_grid(&camera, &viewport(), center, 4.0, 20);
        assert!(!lines.is_empty());
        assert!(lines.len() <= 42);
    }

    #[test]
    fn test_hull_of_square_drops_interior_point() {
        let hull = convex_hull(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.5, 0.5),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ]);
        assert_eq!(hull.len(), 4);
        assert!(!hull.contains(&Vec2::new(0.5, 0.5)));
    }
}
