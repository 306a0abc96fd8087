//! Demo bot that plays the game through the same inputs a player would use
//!
//! It only ever produces pointer events and calls the external actions
//! (start feed, prepare placement), so a run exercises the full input path.

use glam::{Vec2, Vec3};

use super::geometry::nearest_hit;
use super::hunt::TargetKind;
use super::ignition::is_contained;
use super::state::{GamePhase, GameSession, PointerInput};
use super::tick::TickInput;

/// Frames the bot waits between deliberate actions
const DEFAULT_REACTION_FRAMES: u32 = 8;

/// Scripted player
#[derive(Debug, Clone)]
pub struct Autopilot {
    /// Frames between actions (higher is slower)
    pub reaction_frames: u32,
    /// Shoot restricted targets too (used to drive a losing run)
    pub reckless: bool,
    cooldown: u32,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self {
            reaction_frames: DEFAULT_REACTION_FRAMES,
            reckless: false,
            cooldown: 0,
        }
    }
}

impl Autopilot {
    pub fn reckless() -> Self {
        Self {
            reckless: true,
            ..Default::default()
        }
    }

    /// Decide this frame's input, triggering external actions as needed
    pub fn next_input(&mut self, session: &mut GameSession) -> TickInput {
        let mut input = TickInput::default();

        if self.cooldown > 0 {
            self.cooldown -= 1;
            return input;
        }

        match &session.phase {
            GamePhase::Idle => {
                if !session.feed_active {
                    session.start_feed();
                }
            }
            GamePhase::Scanning(placement) => {
                if !placement.indicator.on_floor {
                    return input;
                }
                if !placement.is_armed() {
                    session.prepare_placement();
                }
                input.pointer.push(PointerInput::Down(Vec2::ZERO));
                input.pointer.push(PointerInput::Up);
                self.cooldown = self.reaction_frames;
            }
            GamePhase::Fire(task) => {
                if task.is_ignited() {
                    return input;
                }
                let stray = task
                    .pieces
                    .iter()
                    .enumerate()
                    .find(|(_, p)| !is_contained(p.position, task.anchor, task.ring.radius * 0.5));
                if let Some((i, piece)) = stray {
                    // Fan the pieces out a little around the center
                    let angle = i as f32 * std::f32::consts::TAU / task.pieces.len() as f32;
                    let spot = task.anchor
                        + Vec3::new(angle.cos(), 0.0, angle.sin()) * task.ring.radius * 0.2;
                    if let (Some(from), Some(to)) =
                        (session.camera.project(piece.position), session.camera.project(spot))
                    {
                        input.pointer.push(PointerInput::Down(from));
                        input.pointer.push(PointerInput::Move(from.lerp(to, 0.5)));
                        input.pointer.push(PointerInput::Move(to));
                        input.pointer.push(PointerInput::Up);
                        self.cooldown = self.reaction_frames;
                    }
                }
            }
            GamePhase::Hunt(task) => {
                let reckless = self.reckless;
                let wanted = |kind: TargetKind| reckless || kind == TargetKind::Primary;
                // Closest on-screen wanted target whose line of fire is clear
                let pick = task
                    .live_targets()
                    .filter(|t| wanted(t.kind))
                    .filter_map(|t| session.camera.project(t.position))
                    .filter(|ndc| ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0)
                    .filter(|ndc| {
                        let ray = session.camera.unproject(*ndc);
                        nearest_hit(&task.targets, |t| t.hit(&ray))
                            .is_some_and(|(idx, _)| wanted(task.targets[idx].kind))
                    })
                    .min_by(|a, b| a.length().total_cmp(&b.length()));
                if let Some(ndc) = pick {
                    input.pointer.push(PointerInput::Down(ndc));
                    input.pointer.push(PointerInput::Up);
                    self.cooldown = self.reaction_frames;
                }
            }
            GamePhase::Done(_) => {}
        }

        input
    }
}
