//! Force decomposition on the tilted plane
//!
//! Both horizontal axes share a single normal force computed from the
//! combined tilt magnitude, so a diagonal tilt lowers the friction ceiling
//! on both axes at once.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::config::Environment;
use crate::sign;

/// Friction regime of one axis for the current tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AxisMode {
    /// Static friction holds; velocity only decays
    #[default]
    Stuck,
    /// Driving force beats friction; the body accelerates
    Sliding,
}

/// Forces acting on the body for one tilt (newtons)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SlopeForces {
    /// Gravity component along the slope, per axis
    pub gravity: Vec2,
    /// Normal force (shared by both axes)
    pub normal: f32,
    /// Largest force friction can oppose
    pub friction_max: f32,
    /// Gravity minus friction on sliding axes, zero on stuck ones
    pub net: Vec2,
    pub modes: [AxisMode; 2],
}

impl SlopeForces {
    /// Decompose gravity for an already-clamped tilt (radians)
    pub fn compute(env: &Environment, tilt: Vec2) -> Self {
        let weight = env.mass() * env.gravity();

        let gravity = Vec2::new(weight * tilt.x.sin(), weight * tilt.y.sin());
        let normal = weight * tilt.length().cos();
        let friction_max = env.friction() * normal;

        let (net_x, mode_x) = net_along_axis(gravity.x, friction_max);
        let (net_z, mode_z) = net_along_axis(gravity.y, friction_max);

        Self {
            gravity,
            normal,
            friction_max,
            net: Vec2::new(net_x, net_z),
            modes: [mode_x, mode_z],
        }
    }

    /// Acceleration produced by the net force (m/s²)
    #[inline]
    pub fn acceleration(&self, env: &Environment) -> Vec2 {
        self.net / env.mass()
    }
}

fn net_along_axis(driving: f32, friction_max: f32) -> (f32, AxisMode) {
    if driving.abs() > friction_max {
        (driving - sign(driving) * friction_max, AxisMode::Sliding)
    } else {
        (0.0, AxisMode::Stuck)
    }
}
