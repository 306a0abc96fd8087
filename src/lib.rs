//! Ember Hunt - a camera-overlay campfire and hunting mini-game
//!
//! Core modules:
//! - `sim`: Deterministic game engine (placement, dragging, ignition, hunting, state machine)
//! - `renderer`: Screen-space projection of the session and the browser overlay
//! - `status`: Human-readable status lines derived from game events
//! - `settings`: Data-driven tuning, persisted in LocalStorage on the web

pub mod renderer;
pub mod settings;
pub mod sim;
pub mod status;

pub use settings::{Settings, SettingsError};
pub use sim::{GameSession, PhaseKind, TickInput, tick};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one tick per display refresh on most phones)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest frame delta the engine will accept (tab switches, debugger pauses)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Height of the virtual floor in world units
    pub const GROUND_Y: f32 = -0.6;
    /// Ray/plane denominators smaller than this count as parallel
    pub const PARALLEL_EPSILON: f32 = 1e-6;

    /// Camera defaults (matches a typical phone's rear camera)
    pub const CAMERA_FOV_Y_DEG: f32 = 60.0;
    pub const CAMERA_START_HEIGHT: f32 = 0.0;
    pub const CAMERA_START_DISTANCE: f32 = 2.0;
    /// Downward tilt used until an orientation sample arrives
    pub const CAMERA_DEFAULT_PITCH_DEG: f32 = -25.0;

    /// Placement
    pub const MAX_PLACE_RADIUS: f32 = 1.2;
    pub const FLOOR_PITCH_THRESHOLD_DEG: f32 = 55.0;
    pub const SCAN_OPACITY_READY: f32 = 0.5;
    pub const SCAN_OPACITY_SEARCHING: f32 = 0.2;
    pub const SCAN_OPACITY_MIN: f32 = 0.1;
    /// Opacity lost per second while the camera ray misses the floor
    pub const SCAN_FADE_PER_SECOND: f32 = 1.5;

    /// Fire task
    pub const FIRE_RADIUS: f32 = 0.6;
    pub const STABLE_SECONDS: f32 = 2.5;
    pub const RING_OPACITY_MIN: f32 = 0.4;
    pub const RING_OPACITY_MAX: f32 = 1.0;
    pub const RING_COLOR: u32 = 0xffaa33;
    pub const RING_LIT_COLOR: u32 = 0xff3300;
    /// Delay between ignition and the hunt starting
    pub const IGNITION_HANDOFF_SECONDS: f32 = 0.8;
    pub const FLAME_HEIGHT: f32 = 0.25;

    /// Wood pieces are boxes lying on the floor
    pub const WOOD_LENGTH: f32 = 0.25;
    pub const WOOD_THICKNESS: f32 = 0.08;
    /// Anchor-relative (x, z, yaw) of each wood piece when the fire task starts
    pub const WOOD_LAYOUT: [(f32, f32, f32); 3] = [(-0.6, 0.3, 0.2), (0.6, 0.2, -0.4), (0.2, -0.6, 0.9)];

    /// Hunt task
    pub const TARGET_SCORE: i32 = 5;
    pub const LOSS_SCORE: i32 = -3;
    pub const FIRST_SPAWN_DELAY: f32 = 0.3;
    pub const SPAWN_INTERVAL_MIN: f32 = 0.35;
    pub const SPAWN_INTERVAL_MAX: f32 = 0.8;
    /// Classification thresholds on a uniform draw in [0, 1)
    pub const PRIMARY_CHANCE: f32 = 0.55;
    pub const JUVENILE_CUTOFF: f32 = 0.80;
    /// Half-width of the horizontal band targets cross
    pub const HUNT_BAND_HALF_WIDTH: f32 = 1.4;
    /// Distance behind the anchor at which targets run
    pub const HUNT_DEPTH: f32 = 0.9;
    pub const HUNT_MIN_HEIGHT: f32 = 0.15;
    pub const HUNT_MAX_HEIGHT: f32 = 0.75;
    /// Length of the shrink cue after a hit
    pub const HIT_SHRINK_SECONDS: f32 = 0.15;
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Split a packed 0xRRGGBB colour into normalized channels
#[inline]
pub fn unpack_rgb(color: u32) -> [f32; 3] {
    [
        ((color >> 16) & 0xff) as f32 / 255.0,
        ((color >> 8) & 0xff) as f32 / 255.0,
        (color & 0xff) as f32 / 255.0,
    ]
}
