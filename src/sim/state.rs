//! Simulation state owned by the host
//!
//! Positions are platform-local meters. `Vec2::x` is the platform x axis and
//! `Vec2::y` carries the platform z axis; height is not simulated.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// The rolling ball as a point mass
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    /// Meters per tick once integrated (see `tick`)
    pub vel: Vec2,
}

impl Body {
    pub fn at_rest(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
        }
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.pos.is_finite() && self.vel.is_finite()
    }
}

/// Everything the integrator mutates between ticks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationState {
    pub body: Body,
    /// Where `reset` puts the body back
    pub spawn: Vec2,
    /// Visual roll of the ball (radians about x and z)
    pub roll: Vec2,
    pub time_ticks: u64,
}

impl Default for SimulationState {
    fn default() -> Self {
        Self::new(Vec2::ZERO)
    }
}

impl SimulationState {
    pub fn new(spawn: Vec2) -> Self {
        Self {
            body: Body::at_rest(spawn),
            spawn,
            roll: Vec2::ZERO,
            time_ticks: 0,
        }
    }

    /// Put the body back at its spawn point, at rest
    pub fn reset(&mut self) {
        self.body = Body::at_rest(self.spawn);
        self.roll = Vec2::ZERO;
        self.time_ticks = 0;
        log::info!("Simulation reset to spawn ({:.2}, {:.2})", self.spawn.x, self.spawn.y);
    }

    /// Choose a new spawn uniformly in `[-extent, extent]²` and reset to it
    ///
    /// A non-finite extent spawns at the center.
    pub fn spawn_random<R: Rng>(&mut self, rng: &mut R, extent: f32) {
        // The sampled span must stay finite
        let extent = if extent.is_finite() {
            extent.abs().min(f32::MAX / 4.0)
        } else {
            log::warn!("Non-finite spawn extent {extent}, spawning at the center");
            0.0
        };
        self.spawn = if extent > 0.0 {
            Vec2::new(
                rng.random_range(-extent..=extent),
                rng.random_range(-extent..=extent),
            )
        } else {
            Vec2::ZERO
        };
        self.reset();
    }

    /// Seconds of simulated time for a given fixed step
    pub fn elapsed_secs(&self, dt: f32) -> f32 {
        self.time_ticks as f32 * dt
    }
}
