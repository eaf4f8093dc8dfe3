//! Browser bindings
//!
//! The page owns rendering, HUD and sensors. It creates a `TiltTable`, feeds
//! it frame times and tilt readings, and reads back position, velocity and
//! force vectors for display.

use wasm_bindgen::prelude::*;

use crate::input::{KeyboardTilt, OrientationCalibration, TiltKeys};
use crate::provider::{ConfigurationProvider, SharedEnvironment};
use crate::settings::{Mode, Settings};
use crate::sim::{FixedStepper, SimulationState, TickInput, TickReport, tick};

#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Tiltball (wasm) ready");
}

/// Where the tilt comes from each frame
enum TiltSource {
    Keyboard(KeyboardTilt, TiltKeys),
    Orientation(OrientationCalibration, TickInput),
}

#[wasm_bindgen]
pub struct TiltTable {
    settings: Settings,
    environment: SharedEnvironment,
    state: SimulationState,
    stepper: FixedStepper,
    source: TiltSource,
    last_report: TickReport,
}

#[wasm_bindgen]
impl TiltTable {
    /// `mode` is "sandbox", "challenge" or "racing"; unknown names fall back to sandbox
    #[wasm_bindgen(constructor)]
    pub fn new(mode: &str, use_orientation: bool) -> TiltTable {
        let mode = Mode::from_str(mode).unwrap_or_default();
        let settings = Settings::from_mode(mode);
        let source = if use_orientation {
            TiltSource::Orientation(OrientationCalibration::default(), TickInput::default())
        } else {
            TiltSource::Keyboard(KeyboardTilt::default(), TiltKeys::default())
        };

        TiltTable {
            environment: SharedEnvironment::new(settings.environment),
            settings,
            state: SimulationState::default(),
            stepper: FixedStepper::default(),
            source,
            last_report: TickReport::default(),
        }
    }

    /// Load a JSON settings document, keeping the current ball state
    pub fn load_settings(&mut self, json: &str) -> Result<(), JsValue> {
        let settings =
            Settings::from_json_str(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.environment.set(settings.environment);
        self.settings = settings;
        Ok(())
    }

    pub fn set_mode(&mut self, mode: &str) -> Result<(), JsValue> {
        let mode = Mode::from_str(mode)
            .ok_or_else(|| JsValue::from_str(&format!("unknown mode '{mode}'")))?;
        self.settings.apply_mode(mode);
        self.reset();
        Ok(())
    }

    /// Live slider edits; rejected values leave the environment unchanged
    pub fn set_mass(&self, mass: f32) -> Result<(), JsValue> {
        self.environment
            .set_mass(mass)
            .map(drop)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn set_friction(&self, friction: f32) -> Result<(), JsValue> {
        self.environment
            .set_friction(friction)
            .map(drop)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn set_gravity(&self, gravity: f32) -> Result<(), JsValue> {
        self.environment
            .set_gravity(gravity)
            .map(drop)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Keyboard event passthrough (`KeyboardEvent.key`)
    pub fn key(&mut self, key: &str, pressed: bool) -> bool {
        match &mut self.source {
            TiltSource::Keyboard(_, keys) => keys.set_key(key, pressed),
            TiltSource::Orientation(..) => false,
        }
    }

    /// `deviceorientation` passthrough (degrees)
    pub fn orientation(&mut self, beta: f32, gamma: f32) {
        if let TiltSource::Orientation(calibration, input) = &mut self.source {
            if let Some(tilt) = calibration.reading(beta, gamma) {
                *input = TickInput::from_degrees(tilt.x, tilt.y);
            }
        }
    }

    pub fn recalibrate(&mut self) {
        if let TiltSource::Orientation(calibration, input) = &mut self.source {
            calibration.recalibrate();
            *input = TickInput::default();
        }
    }

    /// Advance by one animation frame; returns the number of ticks run
    pub fn frame(&mut self, frame_dt: f32) -> u32 {
        let Self {
            settings,
            environment,
            state,
            stepper,
            source,
            last_report,
        } = self;

        last_report.collisions.clear();
        last_report.sanitized = false;

        stepper.advance(frame_dt, |dt| {
            let input = match &mut *source {
                TiltSource::Keyboard(kb, keys) => {
                    kb.update(keys);
                    kb.input()
                }
                TiltSource::Orientation(_, input) => *input,
            };
            let env = environment.environment();
            last_report.accumulate(tick(state, &env, &settings.physics, &input, dt));
        })
    }

    pub fn reset(&mut self) {
        self.state.reset();
        self.stepper.reset();
        self.last_report = TickReport::default();
    }

    pub fn x(&self) -> f32 {
        self.state.body.pos.x
    }

    pub fn z(&self) -> f32 {
        self.state.body.pos.y
    }

    pub fn vx(&self) -> f32 {
        self.state.body.vel.x
    }

    pub fn vz(&self) -> f32 {
        self.state.body.vel.y
    }

    pub fn roll_x(&self) -> f32 {
        self.state.roll.x
    }

    pub fn roll_z(&self) -> f32 {
        self.state.roll.y
    }

    /// Tilt used by the last tick (degrees)
    pub fn tilt_x_deg(&self) -> f32 {
        self.last_report.tilt.x.to_degrees()
    }

    pub fn tilt_z_deg(&self) -> f32 {
        self.last_report.tilt.y.to_degrees()
    }

    pub fn speed(&self) -> f32 {
        self.last_report.speed
    }

    pub fn acceleration(&self) -> f32 {
        self.last_report.acceleration
    }

    pub fn normal_force(&self) -> f32 {
        self.last_report.normal_force()
    }

    /// `[gx, gz, nx, nz]`: gravity and net force vectors for the arrows
    pub fn force_vectors(&self) -> Vec<f32> {
        let g = self.last_report.gravity_force();
        let n = self.last_report.net_force();
        vec![g.x, g.y, n.x, n.y]
    }

    /// Any wall or pillar contact during the last frame
    pub fn collided(&self) -> bool {
        !self.last_report.collisions.is_empty()
    }
}
