//! Tiltball - a ball rolling on a tiltable platform
//!
//! Core modules:
//! - `sim`: Fixed-step integrator (slope forces, friction, collisions)
//! - `provider`: Per-tick environment snapshots for live-tunable constants
//! - `input`: Keyboard and device-orientation tilt mapping
//! - `settings`: Mode presets and the JSON settings document

pub mod input;
pub mod provider;
pub mod settings;
pub mod sim;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use provider::{ConfigurationProvider, SharedEnvironment, StaticEnvironment};
pub use settings::{Mode, Settings, SettingsError};

use glam::Vec2;

/// Simulation configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one animation frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Environment defaults
    pub const DEFAULT_MASS: f32 = 0.5;
    pub const DEFAULT_FRICTION: f32 = 0.15;
    pub const DEFAULT_GRAVITY: f32 = 9.81;

    /// Platform tilt is clamped to ±25 degrees
    pub const TILT_LIMIT_DEG: f32 = 25.0;

    /// Half-extent of the platform for the bounce policy (meters)
    pub const BOUNCE_LIMIT: f32 = 10.5;
    /// Half-extent for the wrap policy (the full 22 m platform edge)
    pub const WRAP_LIMIT: f32 = 11.0;
    pub const WALL_RESTITUTION: f32 = -0.5;

    /// Racing pillar at the platform center
    pub const PILLAR_RADIUS: f32 = 3.0;
    pub const PILLAR_RESTITUTION: f32 = -0.3;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 0.5;

    /// Velocity multiplier applied per tick while static friction holds
    pub const STATIC_DAMPING: f32 = 0.92;
    /// Below this speed a held axis snaps to exactly zero (m/s)
    pub const REST_EPSILON: f32 = 1.0e-6;
}

/// Sign with `sign(0) == 0`, unlike `f32::signum`
#[inline]
pub fn sign(x: f32) -> f32 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Convert polar (r, theta) to cartesian (x, z)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Convert cartesian (x, z) to polar (r, theta)
#[inline]
pub fn cartesian_to_polar(pos: Vec2) -> (f32, f32) {
    (pos.length(), pos.y.atan2(pos.x))
}
