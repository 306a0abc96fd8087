//! Overlay rendering
//!
//! `build_frame` turns a session into a flat list of 2D draw commands in
//! screen pixels. The browser overlay replays that list onto a canvas that
//! sits on top of the camera video; tests inspect it directly.

pub mod shapes;

#[cfg(target_arch = "wasm32")]
pub mod overlay;

#[cfg(target_arch = "wasm32")]
pub use overlay::CanvasOverlay;

use glam::Vec2;

use crate::consts::*;
use crate::sim::{GamePhase, GameSession, WoodPiece};
use shapes::{Viewport, box_silhouette, cone_triangle, floor_circle, floor_grid, rgba, sphere_disc};

/// Colors for overlay elements
pub mod colors {
    pub const SCAN_GRID: u32 = 0x00ffaa;
    pub const WOOD: u32 = 0x8b5a2b;
    pub const WOOD_DRAGGED: u32 = 0xc47f3d;
    pub const FLAME: u32 = 0xff5522;
}

const RING_SEGMENTS: u32 = 48;
const RING_STROKE_PX: f32 = 4.0;
const GRID_SIZE: f32 = 4.0;
const GRID_DIVISIONS: u32 = 20;
const FLAME_RADIUS: f32 = 0.2;
const FLAME_CONE_HEIGHT: f32 = 0.5;

/// One 2D draw operation in screen pixels
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Lines {
        segments: Vec<[Vec2; 2]>,
        width: f32,
        color: [f32; 4],
    },
    Outline {
        points: Vec<Vec2>,
        width: f32,
        color: [f32; 4],
    },
    Fill {
        points: Vec<Vec2>,
        color: [f32; 4],
    },
    Disc {
        center: Vec2,
        radius: f32,
        color: [f32; 4],
    },
}

/// Commands for one frame, back to front
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    pub commands: Vec<DrawCmd>,
}

impl DrawList {
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    fn push(&mut self, cmd: DrawCmd) {
        self.commands.push(cmd);
    }
}

/// Build the overlay for the current session state
pub fn build_frame(session: &GameSession, width: f32, height: f32) -> DrawList {
    let viewport = Viewport::new(width, height);
    let camera = &session.camera;
    let mut list = DrawList::default();

    match &session.phase {
        GamePhase::Idle | GamePhase::Done(_) => {}
        GamePhase::Scanning(placement) => {
            let indicator = &placement.indicator;
            let segments = floor_grid(camera, &viewport, indicator.position, GRID_SIZE, GRID_DIVISIONS);
            if !segments.is_empty() {
                list.push(DrawCmd::Lines {
                    segments,
                    width: 1.0,
                    color: rgba(colors::SCAN_GRID, indicator.opacity),
                });
            }
        }
        GamePhase::Fire(task) => {
            let ring = floor_circle(camera, &viewport, task.ring.center, task.ring.radius, RING_SEGMENTS);
            if !ring.is_empty() {
                list.push(DrawCmd::Outline {
                    points: ring,
                    width: RING_STROKE_PX,
                    color: rgba(task.ring.color, task.ring.opacity),
                });
            }

            let mut pieces: Vec<&WoodPiece> = task.pieces.iter().collect();
            pieces.sort_by(|a, b| {
                camera
                    .view_depth(b.position)
                    .total_cmp(&camera.view_depth(a.position))
            });
            for piece in pieces {
                let color = if task.drag.dragging() == Some(piece.id) {
                    colors::WOOD_DRAGGED
                } else {
                    colors::WOOD
                };
                if let Some(points) =
                    box_silhouette(camera, &viewport, piece.position, WoodPiece::half_extents(), piece.yaw)
                {
                    list.push(DrawCmd::Fill {
                        points,
                        color: rgba(color, 1.0),
                    });
                }
            }

            if let Some(flame) = &task.flame {
                let base = flame.position - glam::Vec3::Y * (FLAME_CONE_HEIGHT * 0.5);
                if let Some(tri) = cone_triangle(camera, &viewport, base, FLAME_RADIUS, FLAME_CONE_HEIGHT) {
                    list.push(DrawCmd::Fill {
                        points: tri.to_vec(),
                        color: rgba(colors::FLAME, 1.0),
                    });
                }
            }
        }
        GamePhase::Hunt(task) => {
            let mut targets: Vec<_> = task.targets.iter().collect();
            targets.sort_by(|a, b| {
                camera
                    .view_depth(b.position)
                    .total_cmp(&camera.view_depth(a.position))
            });
            for target in targets {
                let radius = target.kind.radius() * target.scale();
                if radius <= 0.0 {
                    continue;
                }
                if let Some((center, pixels)) = sphere_disc(camera, &viewport, target.position, radius) {
                    list.push(DrawCmd::Disc {
                        center,
                        radius: pixels,
                        color: rgba(target.kind.color(), 1.0),
                    });
                }
            }
        }
    }

    list
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{PointerInput, TickInput, tick};

    fn placed_session() -> GameSession {
        let mut session = GameSession::new(5);
        session.set_viewport(800.0, 600.0);
        session.start_feed();
        tick(&mut session, &TickInput::default(), SIM_DT);
        session.prepare_placement();
        let input = TickInput {
            pointer: vec![PointerInput::Down(Vec2::ZERO)],
            ..Default::default()
        };
        tick(&mut session, &input, SIM_DT);
        session
    }

    #[test]
    fn test_idle_draws_nothing() {
        let session = GameSession::new(1);
        assert!(build_frame(&session, 800.0, 600.0).is_empty());
    }

    #[test]
    fn test_scanning_draws_grid_at_indicator_opacity() {
        let mut session = GameSession::new(1);
        session.start_feed();
        tick(&mut session, &TickInput::default(), SIM_DT);
        let list = build_frame(&session, 800.0, 600.0);
        let GamePhase::Scanning(placement) = &session.phase else {
            unreachable!()
        };
        match &list.commands[..] {
            [DrawCmd::Lines { color, .. }] => assert_eq!(color[3], placement.indicator.opacity),
            other => panic!("unexpected commands: {:?}", other),
        }
    }

    #[test]
    fn test_fire_draws_ring_and_three_pieces() {
        let session = placed_session();
        let list = build_frame(&session, 800.0, 600.0);
        let outlines = list
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCmd::Outline { .. }))
            .count();
        let fills = list
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCmd::Fill { .. }))
            .count();
        assert_eq!(outlines, 1);
        assert_eq!(fills, 3);
    }

    #[test]
    fn test_lit_fire_adds_flame() {
        let mut session = placed_session();
        if let GamePhase::Fire(task) = &mut session.phase {
            task.ignite();
        }
        let list = build_frame(&session, 800.0, 600.0);
        let fills = list
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCmd::Fill { .. }))
            .count();
        assert_eq!(fills, 4);
    }
}
