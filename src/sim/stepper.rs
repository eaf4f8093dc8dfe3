//! Fixed-timestep accumulator
//!
//! Converts variable frame times into whole simulation ticks. The host owns
//! the stepper and decides what each tick does; the integrator never sees
//! frame timing.

use super::config::{ConfigError, validate_dt};
use crate::consts::{MAX_SUBSTEPS, SIM_DT};

/// Frame deltas above this are treated as a stall (tab hidden, debugger)
const MAX_FRAME_DT: f32 = 0.1;

#[derive(Debug, Clone)]
pub struct FixedStepper {
    dt: f32,
    max_substeps: u32,
    accumulator: f32,
}

impl Default for FixedStepper {
    fn default() -> Self {
        Self {
            dt: SIM_DT,
            max_substeps: MAX_SUBSTEPS,
            accumulator: 0.0,
        }
    }
}

impl FixedStepper {
    pub fn new(dt: f32, max_substeps: u32) -> Result<Self, ConfigError> {
        Ok(Self {
            dt: validate_dt(dt)?,
            max_substeps: max_substeps.max(1),
            accumulator: 0.0,
        })
    }

    #[inline]
    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Fraction of a tick left in the accumulator, for render interpolation
    #[inline]
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.dt
    }

    /// Feed one frame's elapsed time and run as many ticks as it covers
    ///
    /// Returns the number of ticks run. Time beyond `max_substeps` ticks is
    /// dropped rather than carried, so a long stall cannot snowball.
    pub fn advance<F: FnMut(f32)>(&mut self, frame_dt: f32, mut step: F) -> u32 {
        let frame_dt = if frame_dt.is_finite() {
            frame_dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        self.accumulator += frame_dt;

        let mut substeps = 0;
        while self.accumulator >= self.dt && substeps < self.max_substeps {
            step(self.dt);
            self.accumulator -= self.dt;
            substeps += 1;
        }

        if self.accumulator >= self.dt {
            log::warn!(
                "Dropping {:.1} ticks of backlog after {} substeps",
                self.accumulator / self.dt,
                substeps
            );
            self.accumulator %= self.dt;
        }

        substeps
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
