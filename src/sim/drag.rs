//! Pointer-driven dragging of wood pieces across the floor

use glam::Vec3;

use super::geometry::{GroundPlane, Ray, intersect_ground_ray, nearest_hit};
use crate::consts::*;

/// A wood piece lying on the floor
#[derive(Debug, Clone, PartialEq)]
pub struct WoodPiece {
    pub id: u32,
    pub position: Vec3,
    /// Rotation about the vertical axis (radians)
    pub yaw: f32,
}

impl WoodPiece {
    pub fn new(id: u32, position: Vec3, yaw: f32) -> Self {
        Self { id, position, yaw }
    }

    /// Half-size of the box in its local frame (long along X)
    pub fn half_extents() -> Vec3 {
        Vec3::new(WOOD_LENGTH, WOOD_THICKNESS, WOOD_THICKNESS) * 0.5
    }

    /// Distance along `ray` to this piece, if it is hit
    pub fn hit(&self, ray: &Ray) -> Option<f32> {
        ray.hit_oriented_box(self.position, Self::half_extents(), self.yaw)
    }
}

/// Tracks which piece, if any, follows the pointer
#[derive(Debug, Clone, Default)]
pub struct DragController {
    dragging: Option<u32>,
}

impl DragController {
    pub fn dragging(&self) -> Option<u32> {
        self.dragging
    }

    /// Grab the nearest piece under the pointer. Returns its id.
    pub fn pointer_down(&mut self, ray: &Ray, pieces: &[WoodPiece]) -> Option<u32> {
        let (idx, _) = nearest_hit(pieces, |piece| piece.hit(ray))?;
        let id = pieces[idx].id;
        self.dragging = Some(id);
        log::debug!("Grabbed wood {}", id);
        Some(id)
    }

    /// Slide the grabbed piece to where the pointer meets the floor
    ///
    /// Returns true if a piece moved. A pointer ray that misses the floor
    /// leaves the piece where it was.
    pub fn pointer_move(&self, ray: &Ray, ground: &GroundPlane, pieces: &mut [WoodPiece]) -> bool {
        let Some(id) = self.dragging else {
            return false;
        };
        let Some(hit) = intersect_ground_ray(ground, ray) else {
            return false;
        };
        match pieces.iter_mut().find(|p| p.id == id) {
            Some(piece) => {
                piece.position = Vec3::new(hit.x, ground.height, hit.z);
                true
            }
            None => false,
        }
    }

    /// Let go of whatever is held (no-op if nothing is)
    pub fn pointer_up(&mut self) -> Option<u32> {
        self.dragging.take()
    }
}
