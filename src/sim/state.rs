//! The game session and its top-level state machine
//!
//! One `GameSession` owns everything that changes during play. Each phase
//! variant carries the state of the task running in it, so leaving a phase
//! drops that task's objects (wood, ring, flame, targets, pending handoff)
//! in one move.

use glam::{Vec2, Vec3};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::geometry::{CameraRig, GroundPlane, OrientationSample};
use super::hunt::{HuntTask, Outcome, TargetKind};
use super::ignition::{FireStep, FireTask};
use super::placement::{Placement, PlacementError, is_floor_pitch};
use crate::settings::Settings;

/// Fieldless mirror of `GamePhase`, handy for comparisons and logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseKind {
    Idle,
    Scanning,
    Fire,
    Hunt,
    Done,
}

/// Final result kept after the hunt's objects are gone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HuntSummary {
    pub outcome: Outcome,
    pub score: i32,
    pub primary_hits: u32,
    pub restricted_hits: u32,
    pub escaped: u32,
}

/// Current top-level phase with the state of the task running in it
#[derive(Debug, Clone)]
pub enum GamePhase {
    /// No feed or freshly reset; nothing in the scene
    Idle,
    /// Feed running, looking for the floor and waiting for a placement tap
    Scanning(Placement),
    /// Building the fire
    Fire(FireTask),
    /// Shooting targets
    Hunt(HuntTask),
    /// Terminal until an external reset
    Done(HuntSummary),
}

impl GamePhase {
    pub fn kind(&self) -> PhaseKind {
        match self {
            GamePhase::Idle => PhaseKind::Idle,
            GamePhase::Scanning(_) => PhaseKind::Scanning,
            GamePhase::Fire(_) => PhaseKind::Fire,
            GamePhase::Hunt(_) => PhaseKind::Hunt,
            GamePhase::Done(_) => PhaseKind::Done,
        }
    }
}

/// Pointer event in normalized device coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerInput {
    Down(Vec2),
    Move(Vec2),
    Up,
    Cancel,
}

/// Something the status surface (and the log) should hear about
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    FeedStarted,
    FeedStopped,
    FeedFailed { reason: String },
    /// Device tilted toward the floor
    FloorReady,
    /// No orientation sensor or permission refused; placement stays open
    OrientationUnavailable,
    PlacementArmed { floor_ready: bool },
    PlacementRejected(PlacementError),
    Placed { anchor: Vec3 },
    Stability { contained: bool, percent: u32 },
    Ignited,
    HuntStarted,
    TargetHit { kind: TargetKind, score: i32 },
    TargetEscaped { kind: TargetKind },
    Finished(HuntSummary),
    Reset,
}

/// Complete game session
#[derive(Debug, Clone)]
pub struct GameSession {
    pub settings: Settings,
    pub ground: GroundPlane,
    pub camera: CameraRig,
    pub phase: GamePhase,
    /// A video feed is confirmed running
    pub feed_active: bool,
    /// Device tilt says the camera sees the floor (messaging only)
    pub floor_ready: bool,
    /// Cleared once the sensor is known to be missing or denied
    pub sensor_available: bool,
    /// Seconds simulated since the session was created
    pub time: f32,
    /// Frames simulated since the session was created
    pub frame: u64,
    pub seed: u64,
    pub(crate) rng: Pcg32,
    events: Vec<GameEvent>,
}

impl GameSession {
    pub fn new(seed: u64) -> Self {
        Self::with_settings(seed, Settings::default())
    }

    /// Build a session from tuning values; `settings.seed` wins over `seed`
    pub fn with_settings(seed: u64, settings: Settings) -> Self {
        let seed = settings.seed.unwrap_or(seed);
        Self {
            ground: GroundPlane::new(settings.ground_y),
            camera: CameraRig::default(),
            phase: GamePhase::Idle,
            feed_active: false,
            floor_ready: false,
            sensor_available: true,
            time: 0.0,
            frame: 0,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
            settings,
        }
    }

    pub fn kind(&self) -> PhaseKind {
        self.phase.kind()
    }

    /// Events produced since the last drain, oldest first
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Fire/hunt center, once placed
    pub fn anchor(&self) -> Option<Vec3> {
        match &self.phase {
            GamePhase::Fire(task) => Some(task.anchor),
            GamePhase::Hunt(task) => Some(task.origin),
            _ => None,
        }
    }

    /// Live score during the hunt, final score afterwards
    pub fn score(&self) -> Option<i32> {
        match &self.phase {
            GamePhase::Hunt(task) => Some(task.score),
            GamePhase::Done(summary) => Some(summary.score),
            _ => None,
        }
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.camera.set_aspect(width, height);
    }

    fn set_phase(&mut self, phase: GamePhase) {
        let from = self.phase.kind();
        let to = phase.kind();
        if from != to {
            log::info!("Phase {:?} -> {:?}", from, to);
        }
        self.phase = phase;
    }

    // === Feed control ===

    /// A video feed is confirmed running: start looking for the floor
    ///
    /// No-op unless the session is idle.
    pub fn start_feed(&mut self) -> bool {
        if !matches!(self.phase, GamePhase::Idle) {
            log::debug!("start_feed ignored in {:?}", self.kind());
            return false;
        }
        self.feed_active = true;
        // Without a sensor nothing would ever flip readiness
        self.floor_ready = !self.sensor_available;
        let placement = Placement::new(&self.ground, self.settings.max_place_radius);
        self.set_phase(GamePhase::Scanning(placement));
        self.emit(GameEvent::FeedStarted);
        true
    }

    /// Feed acquisition failed; stay idle
    pub fn feed_failed(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        log::warn!("Camera feed failed: {}", reason);
        self.feed_active = false;
        self.set_phase(GamePhase::Idle);
        self.emit(GameEvent::FeedFailed { reason });
    }

    /// Feed stopped: drop everything and go idle. Safe to call repeatedly.
    pub fn stop_feed(&mut self) -> bool {
        if !self.feed_active && matches!(self.phase, GamePhase::Idle) {
            return false;
        }
        self.feed_active = false;
        self.floor_ready = false;
        self.set_phase(GamePhase::Idle);
        self.emit(GameEvent::FeedStopped);
        true
    }

    /// Return to idle, discarding task objects and any pending handoff
    pub fn reset(&mut self) -> bool {
        if matches!(self.phase, GamePhase::Idle) {
            return false;
        }
        self.floor_ready = false;
        self.set_phase(GamePhase::Idle);
        self.emit(GameEvent::Reset);
        true
    }

    // === Placement ===

    /// Arm tap-to-place. Works before the floor is ready; readiness only changes the hint.
    pub fn prepare_placement(&mut self) -> bool {
        let floor_ready = self.floor_ready;
        let GamePhase::Scanning(placement) = &mut self.phase else {
            return false;
        };
        if !placement.arm() {
            return false;
        }
        log::info!("Placement armed (floor ready: {})", floor_ready);
        self.emit(GameEvent::PlacementArmed { floor_ready });
        true
    }

    /// Feed an orientation sample: drives the camera and floor readiness
    pub fn orientation_sample(&mut self, sample: &OrientationSample) {
        if self.settings.use_orientation {
            self.camera.apply_orientation(sample);
        }
        if self.floor_ready || !matches!(self.phase, GamePhase::Scanning(_)) {
            return;
        }
        if let Some(pitch) = sample.pitch() {
            if is_floor_pitch(pitch, self.settings.floor_pitch_threshold_deg) {
                self.floor_ready = true;
                log::info!("Floor ready (pitch {:.1})", pitch);
                self.emit(GameEvent::FloorReady);
            }
        }
    }

    /// The sensor is missing or its permission was refused
    pub fn orientation_unavailable(&mut self) {
        if !self.sensor_available {
            return;
        }
        self.sensor_available = false;
        log::warn!("Orientation sensor unavailable; placement stays open");
        if self.feed_active && !self.floor_ready {
            self.floor_ready = true;
        }
        self.emit(GameEvent::OrientationUnavailable);
    }

    // === Pointer routing ===

    /// Route a pointer event to whichever task owns pointer input right now
    pub fn dispatch_pointer(&mut self, input: PointerInput) {
        match input {
            PointerInput::Down(ndc) => self.pointer_down(ndc),
            PointerInput::Move(ndc) => {
                let ray = self.camera.unproject(ndc);
                if let GamePhase::Fire(task) = &mut self.phase {
                    task.pointer_move(&ray, &self.ground);
                }
            }
            PointerInput::Up | PointerInput::Cancel => {
                if let GamePhase::Fire(task) = &mut self.phase {
                    task.pointer_up();
                }
            }
        }
    }

    fn pointer_down(&mut self, ndc: Vec2) {
        let ray = self.camera.unproject(ndc);
        match &mut self.phase {
            GamePhase::Scanning(placement) => {
                if !placement.is_armed() {
                    return;
                }
                match placement.try_place(ndc, &self.camera, &self.ground) {
                    Ok(anchor) => self.begin_fire(anchor),
                    Err(err) => {
                        log::warn!("Placement rejected: {}", err);
                        self.emit(GameEvent::PlacementRejected(err));
                    }
                }
            }
            GamePhase::Fire(task) => {
                task.pointer_down(&ray);
            }
            GamePhase::Hunt(task) => {
                task.pointer_down(&ray, &mut self.events);
            }
            GamePhase::Idle | GamePhase::Done(_) => {}
        }
    }

    // === Task handoffs ===

    fn begin_fire(&mut self, anchor: Vec3) {
        let task = FireTask::new(
            anchor,
            self.settings.fire_radius,
            self.settings.stable_seconds,
            self.settings.ignition_handoff_seconds,
        );
        log::info!("Fire placed at ({:.2}, {:.2}, {:.2})", anchor.x, anchor.y, anchor.z);
        self.set_phase(GamePhase::Fire(task));
        self.emit(GameEvent::Placed { anchor });
    }

    fn begin_hunt(&mut self, origin: Vec3) {
        let task = HuntTask::new(origin, self.settings.target_score, self.settings.loss_score)
            .facing(self.camera.horizontal_forward());
        self.set_phase(GamePhase::Hunt(task));
        self.emit(GameEvent::HuntStarted);
    }

    fn finish(&mut self, summary: HuntSummary) {
        log::info!("Hunt finished: {:?} with score {}", summary.outcome, summary.score);
        self.set_phase(GamePhase::Done(summary));
        self.emit(GameEvent::Finished(summary));
    }

    /// Per-phase frame update; `tick` wraps this with input handling
    pub(crate) fn step(&mut self, dt: f32) {
        self.time += dt;
        self.frame += 1;

        match &mut self.phase {
            GamePhase::Idle | GamePhase::Done(_) => {}
            GamePhase::Scanning(placement) => {
                placement.update(&self.camera, &self.ground, self.floor_ready, dt);
            }
            GamePhase::Fire(task) => {
                if task.update(dt, &mut self.events) == FireStep::HandoffDue {
                    let origin = task.anchor;
                    self.begin_hunt(origin);
                }
            }
            GamePhase::Hunt(task) => {
                task.update(dt, &mut self.rng, &mut self.events);
                if let Some(outcome) = task.outcome() {
                    let summary = HuntSummary {
                        outcome,
                        score: task.score,
                        primary_hits: task.primary_hits,
                        restricted_hits: task.restricted_hits,
                        escaped: task.escaped,
                    };
                    self.finish(summary);
                }
            }
        }
    }
}
