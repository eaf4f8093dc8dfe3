//! Tilt input mapping
//!
//! Turns keyboard state or device-orientation readings into platform tilt
//! angles in degrees. The integrator clamps again, so these only shape how
//! the tilt feels.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::TILT_LIMIT_DEG;
use crate::sim::TickInput;

/// Degrees added per frame while a direction key is held
pub const KEY_SENSITIVITY: f32 = 1.3;
/// Per-frame decay of an axis with no key held
pub const KEY_RETURN: f32 = 0.90;

/// Direction keys held this frame (arrows or WASD)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TiltKeys {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl TiltKeys {
    /// Map a DOM-style key name to a direction and set it
    ///
    /// Returns `false` for keys that do not steer.
    pub fn set_key(&mut self, key: &str, pressed: bool) -> bool {
        let slot = match key {
            "ArrowLeft" | "a" | "A" => &mut self.left,
            "ArrowRight" | "d" | "D" => &mut self.right,
            "ArrowUp" | "w" | "W" => &mut self.up,
            "ArrowDown" | "s" | "S" => &mut self.down,
            _ => return false,
        };
        *slot = pressed;
        true
    }
}

/// Keyboard-driven tilt that springs back when released
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyboardTilt {
    /// Current tilt (degrees, x axis / z axis)
    pub tilt: Vec2,
}

impl KeyboardTilt {
    /// Advance one frame of key input
    pub fn update(&mut self, keys: &TiltKeys) -> Vec2 {
        if keys.left {
            self.tilt.x -= KEY_SENSITIVITY;
        }
        if keys.right {
            self.tilt.x += KEY_SENSITIVITY;
        }
        if keys.up {
            self.tilt.y -= KEY_SENSITIVITY;
        }
        if keys.down {
            self.tilt.y += KEY_SENSITIVITY;
        }

        if !keys.left && !keys.right {
            self.tilt.x *= KEY_RETURN;
        }
        if !keys.up && !keys.down {
            self.tilt.y *= KEY_RETURN;
        }

        self.tilt = self.tilt.clamp(
            Vec2::splat(-TILT_LIMIT_DEG),
            Vec2::splat(TILT_LIMIT_DEG),
        );
        self.tilt
    }

    pub fn input(&self) -> TickInput {
        TickInput::from_degrees(self.tilt.x, self.tilt.y)
    }
}

/// Zeroes device orientation against the first reading
///
/// `beta` is front-back pitch and `gamma` left-right roll, both in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OrientationCalibration {
    reference: Option<(f32, f32)>,
}

impl OrientationCalibration {
    pub fn is_calibrated(&self) -> bool {
        self.reference.is_some()
    }

    /// Feed a reading; the first one becomes the reference and yields `None`
    pub fn reading(&mut self, beta: f32, gamma: f32) -> Option<Vec2> {
        if !beta.is_finite() || !gamma.is_finite() {
            log::warn!("Ignoring non-finite orientation reading ({beta}, {gamma})");
            return None;
        }

        match self.reference {
            None => {
                self.reference = Some((beta, gamma));
                log::info!("Orientation calibrated at beta={beta:.1} gamma={gamma:.1}");
                None
            }
            Some((beta0, gamma0)) => Some(Vec2::new(gamma - gamma0, beta - beta0)),
        }
    }

    /// Forget the reference; the next reading recalibrates
    pub fn recalibrate(&mut self) {
        self.reference = None;
    }
}
