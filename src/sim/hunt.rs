//! Hunt task: targets run across a band behind the fire and must be shot selectively
//!
//! Only primary targets score. Hitting a juvenile or a decoy costs a point.
//! Targets that run out of time simply leave and cost nothing.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geometry::{Ray, nearest_hit};
use super::state::GameEvent;
use crate::consts::*;

/// Target types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetKind {
    /// The only kind worth shooting
    Primary,
    /// Restricted: young animal
    Juvenile,
    /// Restricted: lookalike decoy
    Decoy,
}

impl TargetKind {
    /// Map a uniform draw in [0, 1) to a kind (55% / 25% / 20%)
    pub fn classify(r: f32) -> Self {
        if r < PRIMARY_CHANCE {
            TargetKind::Primary
        } else if r < JUVENILE_CUTOFF {
            TargetKind::Juvenile
        } else {
            TargetKind::Decoy
        }
    }

    pub fn is_restricted(&self) -> bool {
        !matches!(self, TargetKind::Primary)
    }

    /// Score change when this kind is hit
    pub fn score_delta(&self) -> i32 {
        if self.is_restricted() { -1 } else { 1 }
    }

    /// Horizontal speed (units/s)
    pub fn speed(&self) -> f32 {
        match self {
            TargetKind::Primary => 0.9,
            TargetKind::Juvenile => 1.2,
            TargetKind::Decoy => 1.1,
        }
    }

    /// Seconds on screen before it escapes
    pub fn lifetime(&self) -> f32 {
        match self {
            TargetKind::Primary => 1.6,
            TargetKind::Juvenile => 1.4,
            TargetKind::Decoy => 1.5,
        }
    }

    /// Hit sphere radius
    pub fn radius(&self) -> f32 {
        match self {
            TargetKind::Primary => 0.12,
            TargetKind::Juvenile => 0.08,
            TargetKind::Decoy => 0.10,
        }
    }

    pub fn color(&self) -> u32 {
        match self {
            TargetKind::Primary => 0x8b5a2b,
            TargetKind::Juvenile => 0xf0c987,
            TargetKind::Decoy => 0x6c8ebf,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Primary => "Primary",
            TargetKind::Juvenile => "Juvenile",
            TargetKind::Decoy => "Decoy",
        }
    }
}

/// Target lifecycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetState {
    Alive,
    /// Hit; plays the shrink cue, then disappears
    Shrinking { timer: f32 },
}

/// A running target
#[derive(Debug, Clone, PartialEq)]
pub struct HuntTarget {
    pub id: u32,
    pub kind: TargetKind,
    pub position: Vec3,
    /// Seconds left before it escapes
    pub lifetime: f32,
    pub speed: f32,
    /// +1 runs toward the band's right edge, -1 toward its left
    pub direction: f32,
    pub state: TargetState,
}

impl HuntTarget {
    pub fn is_alive(&self) -> bool {
        self.state == TargetState::Alive
    }

    /// Render scale: 1 while alive, shrinking to 0 after a hit
    pub fn scale(&self) -> f32 {
        match self.state {
            TargetState::Alive => 1.0,
            TargetState::Shrinking { timer } => (timer / HIT_SHRINK_SECONDS).clamp(0.0, 1.0),
        }
    }

    pub fn hit(&self, ray: &Ray) -> Option<f32> {
        if !self.is_alive() {
            return None;
        }
        ray.hit_sphere(self.position, self.kind.radius())
    }
}

/// How a finished hunt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Won,
    Lost,
}

/// All state owned by the hunt task
#[derive(Debug, Clone)]
pub struct HuntTask {
    /// Fire position the hunting band is laid out around
    pub origin: Vec3,
    /// Horizontal unit vector from the player through the fire; the band lies beyond it
    pub forward: Vec3,
    /// Targets sorted by id
    pub targets: Vec<HuntTarget>,
    /// Seconds until the next spawn
    pub spawn_timer: f32,
    pub score: i32,
    pub primary_hits: u32,
    pub restricted_hits: u32,
    pub escaped: u32,
    pub target_score: i32,
    pub loss_score: i32,
    next_id: u32,
}

impl HuntTask {
    pub fn new(origin: Vec3, target_score: i32, loss_score: i32) -> Self {
        Self {
            origin,
            forward: Vec3::NEG_Z,
            targets: Vec::new(),
            spawn_timer: FIRST_SPAWN_DELAY,
            score: 0,
            primary_hits: 0,
            restricted_hits: 0,
            escaped: 0,
            target_score,
            loss_score,
            next_id: 1,
        }
    }

    /// Lay the band out across `forward` (flattened onto the floor)
    pub fn facing(mut self, forward: Vec3) -> Self {
        self.forward = Vec3::new(forward.x, 0.0, forward.z).normalize_or(Vec3::NEG_Z);
        self
    }

    /// Horizontal unit vector along the band, left to right as seen by the player
    pub fn right(&self) -> Vec3 {
        self.forward.cross(Vec3::Y)
    }

    /// Create one target at the edge of the band
    pub fn spawn<R: Rng>(&mut self, rng: &mut R) -> &HuntTarget {
        let kind = TargetKind::classify(rng.random::<f32>());
        let from_left = rng.random_bool(0.5);
        let height = rng.random_range(HUNT_MIN_HEIGHT..HUNT_MAX_HEIGHT);

        let (edge, direction) = if from_left {
            (-HUNT_BAND_HALF_WIDTH, 1.0)
        } else {
            (HUNT_BAND_HALF_WIDTH, -1.0)
        };

        let id = self.next_id;
        self.next_id += 1;

        let target = HuntTarget {
            id,
            kind,
            position: self.origin
                + self.forward * HUNT_DEPTH
                + self.right() * edge
                + Vec3::Y * height,
            lifetime: kind.lifetime(),
            speed: kind.speed(),
            direction,
            state: TargetState::Alive,
        };
        log::debug!("Spawned {} #{} from the {}", kind.as_str(), id, if from_left { "left" } else { "right" });
        self.targets.push(target);
        &self.targets[self.targets.len() - 1]
    }

    /// Spawn, move, age, and clean up targets
    pub fn update<R: Rng>(&mut self, dt: f32, rng: &mut R, events: &mut Vec<GameEvent>) {
        self.spawn_timer -= dt;
        if self.spawn_timer <= 0.0 {
            self.spawn(rng);
            self.spawn_timer = rng.random_range(SPAWN_INTERVAL_MIN..SPAWN_INTERVAL_MAX);
        }

        let right = self.right();
        for target in &mut self.targets {
            match target.state {
                TargetState::Alive => {
                    target.position += right * (target.speed * target.direction * dt);
                    target.lifetime -= dt;
                }
                TargetState::Shrinking { ref mut timer } => {
                    *timer -= dt;
                }
            }
        }

        let mut escaped = 0;
        self.targets.retain(|t| match t.state {
            TargetState::Alive if t.lifetime <= 0.0 => {
                log::debug!("{} #{} escaped", t.kind.as_str(), t.id);
                events.push(GameEvent::TargetEscaped { kind: t.kind });
                escaped += 1;
                false
            }
            TargetState::Shrinking { timer } if timer <= 0.0 => false,
            _ => true,
        });
        self.escaped += escaped;
    }

    /// Resolve a shot. Returns the kind hit, if any.
    pub fn pointer_down(&mut self, ray: &Ray, events: &mut Vec<GameEvent>) -> Option<TargetKind> {
        let (idx, _) = nearest_hit(&self.targets, |t| t.hit(ray))?;
        let target = &mut self.targets[idx];
        let kind = target.kind;
        target.state = TargetState::Shrinking {
            timer: HIT_SHRINK_SECONDS,
        };

        self.score += kind.score_delta();
        if kind.is_restricted() {
            self.restricted_hits += 1;
        } else {
            self.primary_hits += 1;
        }
        log::debug!("Hit {} #{} (score {})", kind.as_str(), target.id, self.score);
        events.push(GameEvent::TargetHit {
            kind,
            score: self.score,
        });
        Some(kind)
    }

    /// Targets that can still be shot
    pub fn live_targets(&self) -> impl Iterator<Item = &HuntTarget> {
        self.targets.iter().filter(|t| t.is_alive())
    }

    /// Win/loss check; the win threshold is tested first
    pub fn outcome(&self) -> Option<Outcome> {
        if self.score >= self.target_score {
            Some(Outcome::Won)
        } else if self.score <= self.loss_score {
            Some(Outcome::Lost)
        } else {
            None
        }
    }
}
