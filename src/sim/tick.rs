//! Fixed timestep simulation tick
//!
//! Advances the body one step on the tilted platform:
//! slope forces, friction branch, position update, then collisions.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Collision, resolve_boundary, resolve_pillars};
use super::config::{Environment, PhysicsConfig};
use super::forces::{AxisMode, SlopeForces};
use super::state::SimulationState;

/// Input for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    /// Platform tilt in radians (x axis, z axis); clamped before use
    pub tilt: Vec2,
}

impl TickInput {
    pub fn from_radians(x: f32, z: f32) -> Self {
        Self {
            tilt: Vec2::new(x, z),
        }
    }

    pub fn from_degrees(x: f32, z: f32) -> Self {
        Self::from_radians(x.to_radians(), z.to_radians())
    }
}

/// Diagnostics for display and graphing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// Tilt actually used (radians, after sanitizing and clamping)
    pub tilt: Vec2,
    pub forces: SlopeForces,
    /// |velocity| after the tick
    pub speed: f32,
    /// |net force| / mass
    pub acceleration: f32,
    pub collisions: Vec<Collision>,
    /// Non-finite input or a non-finite result was replaced this tick
    pub sanitized: bool,
}

impl TickReport {
    #[inline]
    pub fn gravity_force(&self) -> Vec2 {
        self.forces.gravity
    }

    #[inline]
    pub fn net_force(&self) -> Vec2 {
        self.forces.net
    }

    #[inline]
    pub fn normal_force(&self) -> f32 {
        self.forces.normal
    }

    #[inline]
    pub fn modes(&self) -> [AxisMode; 2] {
        self.forces.modes
    }

    /// Fold a later tick into this one
    ///
    /// Diagnostics come from `later`; collisions and the sanitized flag
    /// accumulate, so a frame that runs several ticks reports all of them.
    pub fn accumulate(&mut self, later: TickReport) {
        let mut collisions = std::mem::take(&mut self.collisions);
        collisions.extend(later.collisions.iter().copied());
        let sanitized = self.sanitized || later.sanitized;
        *self = TickReport {
            collisions,
            sanitized,
            ..later
        };
    }
}

/// Advance the simulation by one fixed timestep
///
/// Velocity gains `Fnet / m * dt` on sliding axes and is damped on stuck
/// axes; position then advances by the raw velocity, so velocity is
/// effectively meters per tick. `env` is the snapshot for this tick and is
/// used unchanged throughout.
pub fn tick(
    state: &mut SimulationState,
    env: &Environment,
    config: &PhysicsConfig,
    input: &TickInput,
    dt: f32,
) -> TickReport {
    let mut sanitized = false;

    let raw_tilt = Vec2::new(finite_or_zero(input.tilt.x), finite_or_zero(input.tilt.y));
    if raw_tilt != input.tilt {
        log::warn!("Non-finite tilt {:?} replaced with zero", input.tilt);
        sanitized = true;
    }

    let dt = if dt.is_finite() && dt >= 0.0 {
        dt
    } else {
        log::warn!("Invalid timestep {dt}, tick runs with dt = 0");
        sanitized = true;
        0.0
    };

    let tilt = config.clamp_tilt(raw_tilt);
    let forces = SlopeForces::compute(env, tilt);
    let accel = forces.acceleration(env);

    let previous = state.body;
    let mut body = previous;

    for axis in 0..2 {
        match forces.modes[axis] {
            AxisMode::Sliding => body.vel[axis] += accel[axis] * dt,
            AxisMode::Stuck => {
                let damped = body.vel[axis] * config.static_damping();
                body.vel[axis] = if damped.abs() < config.rest_epsilon() {
                    0.0
                } else {
                    damped
                };
            }
        }
    }

    body.pos += body.vel;

    if !body.is_finite() {
        log::warn!(
            "Tick {} produced a non-finite body, holding position",
            state.time_ticks
        );
        body.pos = if previous.pos.is_finite() {
            previous.pos
        } else {
            state.spawn
        };
        body.vel = Vec2::ZERO;
        sanitized = true;
    }

    let mut collisions = Vec::new();
    resolve_boundary(
        &mut body,
        config.policy(),
        config.limit(),
        config.wall_restitution(),
        &mut collisions,
    );
    resolve_pillars(&mut body, config.pillars(), config.body_radius(), &mut collisions);

    state.body = body;
    state.time_ticks += 1;

    let radius = config.body_radius();
    if radius > 0.0 {
        state.roll.x += body.vel.y / radius;
        state.roll.y -= body.vel.x / radius;
    }

    let acceleration = forces.net.length() / env.mass();

    TickReport {
        tilt,
        forces,
        speed: body.speed(),
        acceleration: if acceleration.is_finite() { acceleration } else { 0.0 },
        collisions,
        sanitized,
    }
}

#[inline]
fn finite_or_zero(x: f32) -> f32 {
    if x.is_finite() { x } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::{BoundaryPolicy, Pillar};

    fn bounce() -> PhysicsConfig {
        PhysicsConfig::default()
    }

    #[test]
    fn test_report_accumulates_collisions_across_ticks() {
        let config = bounce();
        let env = Environment::default();
        let mut state = SimulationState::new(Vec2::new(10.4, 0.0));
        state.body.vel = Vec2::new(0.3, 0.0);

        let mut frame = TickReport::default();
        frame.accumulate(tick(&mut state, &env, &config, &TickInput::default(), SIM_DT));
        assert_eq!(frame.collisions.len(), 1);

        let quiet = tick(&mut state, &env, &config, &TickInput::default(), SIM_DT);
        assert!(quiet.collisions.is_empty());
        let quiet_speed = quiet.speed;
        frame.accumulate(quiet);

        assert!(matches!(
            frame.collisions.as_slice(),
            [Collision::Wall(crate::sim::BoundaryHit::PosX)]
        ));
        assert_eq!(frame.speed, quiet_speed);
        assert!(!frame.sanitized);

        frame.accumulate(tick(
            &mut state,
            &env,
            &config,
            &TickInput::from_radians(f32::NAN, 0.0),
            SIM_DT,
        ));
        assert!(frame.sanitized);
    }

    #[test]
    fn test_tick_flat_at_rest_stays_put() {
        let mut state = SimulationState::default();
        let env = Environment::default();
        let report = tick(&mut state, &env, &bounce(), &TickInput::default(), SIM_DT);

        assert_eq!(state.body.pos, Vec2::ZERO);
        assert_eq!(state.body.vel, Vec2::ZERO);
        assert_eq!(state.time_ticks, 1);
        assert_eq!(report.speed, 0.0);
        assert_eq!(report.acceleration, 0.0);
        assert_eq!(report.modes(), [AxisMode::Stuck, AxisMode::Stuck]);
        assert!(!report.sanitized);
    }

    #[test]
    fn test_tick_sliding_integrates_velocity_then_position() {
        let mut state = SimulationState::default();
        let env = Environment::default();
        let input = TickInput::from_degrees(15.0, 0.0);
        let report = tick(&mut state, &env, &bounce(), &input, SIM_DT);

        let expected_v = report.net_force().x / env.mass() * SIM_DT;
        assert!(expected_v > 0.0);
        assert!((state.body.vel.x - expected_v).abs() < 1e-7);
        // position advances by the raw velocity, not velocity * dt
        assert!((state.body.pos.x - expected_v).abs() < 1e-7);
        assert_eq!(state.body.vel.y, 0.0);
    }

    #[test]
    fn test_tick_stuck_axis_damps() {
        let mut state = SimulationState::default();
        state.body.vel = Vec2::new(0.5, -0.25);
        let env = Environment::default();
        tick(&mut state, &env, &bounce(), &TickInput::default(), SIM_DT);

        assert!((state.body.vel.x - 0.5 * STATIC_DAMPING).abs() < 1e-7);
        assert!((state.body.vel.y + 0.25 * STATIC_DAMPING).abs() < 1e-7);
    }

    #[test]
    fn test_tick_tilt_is_clamped() {
        let env = Environment::default();
        let mut a = SimulationState::default();
        let mut b = SimulationState::default();
        let ra = tick(&mut a, &env, &bounce(), &TickInput::from_degrees(80.0, -80.0), SIM_DT);
        let rb = tick(&mut b, &env, &bounce(), &TickInput::from_degrees(25.0, -25.0), SIM_DT);

        assert_eq!(a.body, b.body);
        assert!((ra.tilt.x - TILT_LIMIT_DEG.to_radians()).abs() < 1e-6);
        assert!((ra.tilt.y + TILT_LIMIT_DEG.to_radians()).abs() < 1e-6);
        assert_eq!(ra.forces, rb.forces);
    }

    #[test]
    fn test_tick_nan_tilt_is_zeroed() {
        let mut state = SimulationState::default();
        state.body.vel = Vec2::new(0.1, 0.0);
        let env = Environment::default();
        let input = TickInput::from_radians(f32::NAN, f32::INFINITY);
        let report = tick(&mut state, &env, &bounce(), &input, SIM_DT);

        assert!(report.sanitized);
        assert_eq!(report.tilt, Vec2::ZERO);
        assert!(state.body.is_finite());
        assert!((state.body.vel.x - 0.1 * STATIC_DAMPING).abs() < 1e-7);
    }

    #[test]
    fn test_tick_bad_dt_is_ignored() {
        let mut state = SimulationState::default();
        let env = Environment::default();
        let input = TickInput::from_degrees(20.0, 0.0);
        let report = tick(&mut state, &env, &bounce(), &input, f32::NAN);

        assert!(report.sanitized);
        assert_eq!(state.body.vel, Vec2::ZERO);
    }

    #[test]
    fn test_tick_recovers_corrupted_velocity() {
        let mut state = SimulationState::new(Vec2::new(1.0, 2.0));
        state.body.vel = Vec2::new(f32::NAN, 0.3);
        let env = Environment::default();
        let report = tick(&mut state, &env, &bounce(), &TickInput::default(), SIM_DT);

        assert!(report.sanitized);
        assert!(state.body.is_finite());
        assert_eq!(state.body.pos, Vec2::new(1.0, 2.0));
        assert_eq!(state.body.vel, Vec2::ZERO);
    }

    #[test]
    fn test_tick_recovers_corrupted_position_to_spawn() {
        let mut state = SimulationState::new(Vec2::new(-2.0, 0.5));
        state.body.pos = Vec2::new(f32::INFINITY, 0.0);
        let env = Environment::default();
        let report = tick(&mut state, &env, &bounce(), &TickInput::default(), SIM_DT);

        assert!(report.sanitized);
        assert_eq!(state.body.pos, Vec2::new(-2.0, 0.5));
    }

    #[test]
    fn test_tick_reports_wall_collision() {
        let mut state = SimulationState::new(Vec2::new(10.4, 0.0));
        state.body.vel = Vec2::new(0.5, 0.0);
        let env = Environment::default();
        let report = tick(&mut state, &env, &bounce(), &TickInput::default(), SIM_DT);

        assert_eq!(state.body.pos.x, BOUNCE_LIMIT);
        assert!(state.body.vel.x < 0.0);
        assert_eq!(report.collisions.len(), 1);
    }

    #[test]
    fn test_tick_wrap_policy() {
        let config = PhysicsConfig::builder()
            .policy(BoundaryPolicy::Wrap)
            .limit(WRAP_LIMIT)
            .build()
            .unwrap();
        let mut state = SimulationState::new(Vec2::new(10.9, 0.0));
        state.body.vel = Vec2::new(0.5, 0.0);
        let env = Environment::default();
        tick(&mut state, &env, &config, &TickInput::default(), SIM_DT);

        assert_eq!(state.body.pos.x, -WRAP_LIMIT);
        assert!((state.body.vel.x - 0.5 * STATIC_DAMPING).abs() < 1e-7);
    }

    #[test]
    fn test_tick_pillar_blocks_body() {
        let config = PhysicsConfig::builder()
            .pillar(Pillar::centered())
            .build()
            .unwrap();
        let mut state = SimulationState::new(Vec2::new(-3.6, 0.0));
        state.body.vel = Vec2::new(0.5, 0.0);
        let env = Environment::default();
        let report = tick(&mut state, &env, &config, &TickInput::default(), SIM_DT);

        assert!(state.body.pos.length() >= PILLAR_RADIUS + BALL_RADIUS - 1e-4);
        assert!(state.body.vel.x < 0.0);
        assert!(matches!(report.collisions.as_slice(), [Collision::Pillar { .. }]));
    }

    #[test]
    fn test_tick_rolls_ball() {
        let mut state = SimulationState::default();
        state.body.vel = Vec2::new(0.5, 0.25);
        let env = Environment::default();
        tick(&mut state, &env, &bounce(), &TickInput::default(), SIM_DT);

        let v = state.body.vel;
        assert!((state.roll.x - v.y / BALL_RADIUS).abs() < 1e-6);
        assert!((state.roll.y + v.x / BALL_RADIUS).abs() < 1e-6);
    }

    #[test]
    fn test_determinism() {
        let env = Environment::default();
        let config = PhysicsConfig::builder()
            .pillar(Pillar::centered())
            .build()
            .unwrap();
        let mut state1 = SimulationState::new(Vec2::new(6.0, -6.0));
        let mut state2 = SimulationState::new(Vec2::new(6.0, -6.0));

        let inputs = [
            TickInput::from_degrees(-20.0, 12.0),
            TickInput::from_degrees(-25.0, 25.0),
            TickInput::from_degrees(3.0, -1.0),
            TickInput::default(),
        ];

        for _ in 0..50 {
            for input in &inputs {
                tick(&mut state1, &env, &config, input, SIM_DT);
                tick(&mut state2, &env, &config, input, SIM_DT);
            }
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.body, state2.body);
    }
}
