//! Validated simulation configuration
//!
//! `Environment` holds the physical constants a control panel may change
//! between ticks; `PhysicsConfig` holds the table geometry and integration
//! constants. Both are only obtainable through validating constructors, and
//! deserialization goes through the same checks.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Rejected configuration value
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("mass must be positive, got {0}")]
    NonPositiveMass(f32),
    #[error("gravity must not be negative, got {0}")]
    NegativeGravity(f32),
    #[error("friction coefficient must not be negative, got {0}")]
    NegativeFriction(f32),
    #[error("{field} must be finite")]
    NonFinite { field: &'static str },
    #[error("tilt limit must lie in (0, 90) degrees, got {0}")]
    InvalidTiltLimit(f32),
    #[error("boundary half-extent must be positive, got {0}")]
    InvalidBoundary(f32),
    #[error("restitution for {field} must lie in [-1, 0], got {value}")]
    InvalidRestitution { field: &'static str, value: f32 },
    #[error("pillar radius must be positive, got {0}")]
    InvalidPillar(f32),
    #[error("pillar {index} reaches {reach} from the center, past the boundary at {limit}")]
    PillarOffTable { index: usize, reach: f32, limit: f32 },
    #[error("body radius must not be negative, got {0}")]
    InvalidBodyRadius(f32),
    #[error("static damping must lie in [0, 1), got {0}")]
    InvalidDamping(f32),
    #[error("rest epsilon must not be negative, got {0}")]
    InvalidRestEpsilon(f32),
    #[error("timestep must be positive, got {0}")]
    InvalidTimestep(f32),
}

fn finite(field: &'static str, value: f32) -> Result<f32, ConfigError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NonFinite { field })
    }
}

fn restitution(field: &'static str, value: f32) -> Result<f32, ConfigError> {
    let value = finite(field, value)?;
    if (-1.0..=0.0).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::InvalidRestitution { field, value })
    }
}

/// Validate a fixed timestep (seconds)
pub fn validate_dt(dt: f32) -> Result<f32, ConfigError> {
    let dt = finite("dt", dt)?;
    if dt > 0.0 {
        Ok(dt)
    } else {
        Err(ConfigError::InvalidTimestep(dt))
    }
}

/// Physical constants, re-read by the integrator every tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EnvironmentDef", into = "EnvironmentDef")]
pub struct Environment {
    mass: f32,
    gravity: f32,
    friction: f32,
}

impl Environment {
    pub fn new(mass: f32, gravity: f32, friction: f32) -> Result<Self, ConfigError> {
        let mass = finite("mass", mass)?;
        let gravity = finite("gravity", gravity)?;
        let friction = finite("friction", friction)?;

        if mass <= 0.0 {
            return Err(ConfigError::NonPositiveMass(mass));
        }
        if gravity < 0.0 {
            return Err(ConfigError::NegativeGravity(gravity));
        }
        if friction < 0.0 {
            return Err(ConfigError::NegativeFriction(friction));
        }

        // Weight and the friction ceiling feed the force decomposition directly
        let weight = mass * gravity;
        if !weight.is_finite() {
            return Err(ConfigError::NonFinite { field: "weight" });
        }
        if !(friction * weight).is_finite() {
            return Err(ConfigError::NonFinite {
                field: "friction force",
            });
        }

        Ok(Self {
            mass,
            gravity,
            friction,
        })
    }

    /// Body mass (kg)
    #[inline]
    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Gravitational acceleration (m/s²)
    #[inline]
    pub fn gravity(&self) -> f32 {
        self.gravity
    }

    /// Friction coefficient (dimensionless)
    #[inline]
    pub fn friction(&self) -> f32 {
        self.friction
    }

    pub fn with_mass(self, mass: f32) -> Result<Self, ConfigError> {
        Self::new(mass, self.gravity, self.friction)
    }

    pub fn with_gravity(self, gravity: f32) -> Result<Self, ConfigError> {
        Self::new(self.mass, gravity, self.friction)
    }

    pub fn with_friction(self, friction: f32) -> Result<Self, ConfigError> {
        Self::new(self.mass, self.gravity, friction)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            mass: DEFAULT_MASS,
            gravity: DEFAULT_GRAVITY,
            friction: DEFAULT_FRICTION,
        }
    }
}

/// Serde shape of `Environment`; missing fields take the defaults
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
struct EnvironmentDef {
    mass: f32,
    gravity: f32,
    friction: f32,
}

impl Default for EnvironmentDef {
    fn default() -> Self {
        Environment::default().into()
    }
}

impl From<Environment> for EnvironmentDef {
    fn from(env: Environment) -> Self {
        Self {
            mass: env.mass,
            gravity: env.gravity,
            friction: env.friction,
        }
    }
}

impl TryFrom<EnvironmentDef> for Environment {
    type Error = ConfigError;

    fn try_from(def: EnvironmentDef) -> Result<Self, Self::Error> {
        Environment::new(def.mass, def.gravity, def.friction)
    }
}

/// What happens when the body crosses the platform edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryPolicy {
    /// Teleport to the opposite edge, velocity unchanged
    Wrap,
    /// Clamp to the edge and scale that axis' velocity by the wall restitution
    #[default]
    Bounce,
}

impl BoundaryPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoundaryPolicy::Wrap => "wrap",
            BoundaryPolicy::Bounce => "bounce",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "wrap" => Some(BoundaryPolicy::Wrap),
            "bounce" => Some(BoundaryPolicy::Bounce),
            _ => None,
        }
    }
}

/// A circular obstacle standing on the platform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pillar {
    pub center: Vec2,
    pub radius: f32,
    #[serde(default = "default_pillar_restitution")]
    pub restitution: f32,
}

fn default_pillar_restitution() -> f32 {
    PILLAR_RESTITUTION
}

impl Pillar {
    /// The racing pillar at the platform center
    pub fn centered() -> Self {
        Self {
            center: Vec2::ZERO,
            radius: PILLAR_RADIUS,
            restitution: PILLAR_RESTITUTION,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        finite("pillar.center.x", self.center.x)?;
        finite("pillar.center.y", self.center.y)?;
        let radius = finite("pillar.radius", self.radius)?;
        if radius <= 0.0 {
            return Err(ConfigError::InvalidPillar(radius));
        }
        restitution("pillar.restitution", self.restitution)?;
        Ok(())
    }
}

/// Table geometry and integration constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PhysicsConfigBuilder", into = "PhysicsConfigBuilder")]
pub struct PhysicsConfig {
    tilt_limit: f32,
    policy: BoundaryPolicy,
    limit: f32,
    wall_restitution: f32,
    pillars: Vec<Pillar>,
    body_radius: f32,
    static_damping: f32,
    rest_epsilon: f32,
}

impl PhysicsConfig {
    pub fn builder() -> PhysicsConfigBuilder {
        PhysicsConfigBuilder::default()
    }

    /// Tilt clamp (radians, symmetric)
    #[inline]
    pub fn tilt_limit(&self) -> f32 {
        self.tilt_limit
    }

    #[inline]
    pub fn policy(&self) -> BoundaryPolicy {
        self.policy
    }

    /// Platform half-extent (meters)
    #[inline]
    pub fn limit(&self) -> f32 {
        self.limit
    }

    #[inline]
    pub fn wall_restitution(&self) -> f32 {
        self.wall_restitution
    }

    #[inline]
    pub fn pillars(&self) -> &[Pillar] {
        &self.pillars
    }

    #[inline]
    pub fn body_radius(&self) -> f32 {
        self.body_radius
    }

    #[inline]
    pub fn static_damping(&self) -> f32 {
        self.static_damping
    }

    #[inline]
    pub fn rest_epsilon(&self) -> f32 {
        self.rest_epsilon
    }

    /// Clamp a tilt vector to the configured range
    #[inline]
    pub fn clamp_tilt(&self, tilt: Vec2) -> Vec2 {
        tilt.clamp(Vec2::splat(-self.tilt_limit), Vec2::splat(self.tilt_limit))
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        PhysicsConfigBuilder::default().into_config()
    }
}

/// Unvalidated `PhysicsConfig` fields; also the serde shape of the config
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfigBuilder {
    pub tilt_limit_deg: f32,
    pub policy: BoundaryPolicy,
    pub limit: f32,
    pub wall_restitution: f32,
    pub pillars: Vec<Pillar>,
    pub body_radius: f32,
    pub static_damping: f32,
    pub rest_epsilon: f32,
}

impl Default for PhysicsConfigBuilder {
    fn default() -> Self {
        Self {
            tilt_limit_deg: TILT_LIMIT_DEG,
            policy: BoundaryPolicy::Bounce,
            limit: BOUNCE_LIMIT,
            wall_restitution: WALL_RESTITUTION,
            pillars: Vec::new(),
            body_radius: BALL_RADIUS,
            static_damping: STATIC_DAMPING,
            rest_epsilon: REST_EPSILON,
        }
    }
}

impl PhysicsConfigBuilder {
    pub fn tilt_limit_deg(mut self, degrees: f32) -> Self {
        self.tilt_limit_deg = degrees;
        self
    }

    pub fn policy(mut self, policy: BoundaryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn limit(mut self, limit: f32) -> Self {
        self.limit = limit;
        self
    }

    pub fn wall_restitution(mut self, restitution: f32) -> Self {
        self.wall_restitution = restitution;
        self
    }

    pub fn pillar(mut self, pillar: Pillar) -> Self {
        self.pillars.push(pillar);
        self
    }

    pub fn body_radius(mut self, radius: f32) -> Self {
        self.body_radius = radius;
        self
    }

    pub fn static_damping(mut self, damping: f32) -> Self {
        self.static_damping = damping;
        self
    }

    pub fn rest_epsilon(mut self, epsilon: f32) -> Self {
        self.rest_epsilon = epsilon;
        self
    }

    pub fn build(self) -> Result<PhysicsConfig, ConfigError> {
        let tilt = finite("tilt_limit_deg", self.tilt_limit_deg)?;
        if tilt <= 0.0 || tilt >= 90.0 {
            return Err(ConfigError::InvalidTiltLimit(tilt));
        }

        let limit = finite("limit", self.limit)?;
        if limit <= 0.0 {
            return Err(ConfigError::InvalidBoundary(limit));
        }

        restitution("wall_restitution", self.wall_restitution)?;

        let body_radius = finite("body_radius", self.body_radius)?;
        if body_radius < 0.0 {
            return Err(ConfigError::InvalidBodyRadius(body_radius));
        }

        // Pillars resolve after the edge, so their contact circle must stay on the table
        for (index, pillar) in self.pillars.iter().enumerate() {
            pillar.validate()?;
            let reach = pillar.center.abs().max_element() + pillar.radius + body_radius;
            if reach > limit {
                return Err(ConfigError::PillarOffTable {
                    index,
                    reach,
                    limit,
                });
            }
        }

        let damping = finite("static_damping", self.static_damping)?;
        if !(0.0..1.0).contains(&damping) {
            return Err(ConfigError::InvalidDamping(damping));
        }

        let epsilon = finite("rest_epsilon", self.rest_epsilon)?;
        if epsilon < 0.0 {
            return Err(ConfigError::InvalidRestEpsilon(epsilon));
        }

        Ok(self.into_config())
    }

    fn into_config(self) -> PhysicsConfig {
        PhysicsConfig {
            tilt_limit: self.tilt_limit_deg.to_radians(),
            policy: self.policy,
            limit: self.limit,
            wall_restitution: self.wall_restitution,
            pillars: self.pillars,
            body_radius: self.body_radius,
            static_damping: self.static_damping,
            rest_epsilon: self.rest_epsilon,
        }
    }
}

impl From<PhysicsConfig> for PhysicsConfigBuilder {
    fn from(config: PhysicsConfig) -> Self {
        Self {
            tilt_limit_deg: config.tilt_limit.to_degrees(),
            policy: config.policy,
            limit: config.limit,
            wall_restitution: config.wall_restitution,
            pillars: config.pillars,
            body_radius: config.body_radius,
            static_damping: config.static_damping,
            rest_epsilon: config.rest_epsilon,
        }
    }
}

impl TryFrom<PhysicsConfigBuilder> for PhysicsConfig {
    type Error = ConfigError;

    fn try_from(builder: PhysicsConfigBuilder) -> Result<Self, Self::Error> {
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_rejects_bad_values() {
        assert_eq!(
            Environment::new(0.0, 9.81, 0.1),
            Err(ConfigError::NonPositiveMass(0.0))
        );
        assert_eq!(
            Environment::new(-1.0, 9.81, 0.1),
            Err(ConfigError::NonPositiveMass(-1.0))
        );
        assert_eq!(
            Environment::new(0.5, -9.81, 0.1),
            Err(ConfigError::NegativeGravity(-9.81))
        );
        assert_eq!(
            Environment::new(0.5, 9.81, -0.1),
            Err(ConfigError::NegativeFriction(-0.1))
        );
        assert_eq!(
            Environment::new(f32::NAN, 9.81, 0.1),
            Err(ConfigError::NonFinite { field: "mass" })
        );
    }

    #[test]
    fn test_environment_rejects_overflowing_weight() {
        assert_eq!(
            Environment::new(1e38, 9.81, 0.0),
            Err(ConfigError::NonFinite { field: "weight" })
        );
        assert_eq!(
            Environment::new(1e30, 9.81, 1e9),
            Err(ConfigError::NonFinite {
                field: "friction force"
            })
        );
        assert!(Environment::default().with_mass(f32::MAX).is_err());
    }

    #[test]
    fn test_environment_accepts_zero_friction_and_gravity() {
        let env = Environment::new(2.0, 0.0, 0.0).unwrap();
        assert_eq!(env.mass(), 2.0);
        assert_eq!(env.gravity(), 0.0);
        assert_eq!(env.friction(), 0.0);
    }

    #[test]
    fn test_environment_with_setters_validate() {
        let env = Environment::default();
        assert!(env.with_mass(-0.5).is_err());
        let heavier = env.with_mass(1.5).unwrap();
        assert_eq!(heavier.mass(), 1.5);
        assert_eq!(heavier.friction(), env.friction());
    }

    #[test]
    fn test_default_physics_config() {
        let config = PhysicsConfig::default();
        assert_eq!(config.policy(), BoundaryPolicy::Bounce);
        assert_eq!(config.limit(), BOUNCE_LIMIT);
        assert!((config.tilt_limit() - 25f32.to_radians()).abs() < 1e-6);
        assert!(config.pillars().is_empty());
    }

    #[test]
    fn test_builder_rejects_bad_geometry() {
        assert_eq!(
            PhysicsConfig::builder().limit(0.0).build(),
            Err(ConfigError::InvalidBoundary(0.0))
        );
        assert_eq!(
            PhysicsConfig::builder().tilt_limit_deg(95.0).build(),
            Err(ConfigError::InvalidTiltLimit(95.0))
        );
        assert_eq!(
            PhysicsConfig::builder().static_damping(1.0).build(),
            Err(ConfigError::InvalidDamping(1.0))
        );
        assert_eq!(
            PhysicsConfig::builder().wall_restitution(0.5).build(),
            Err(ConfigError::InvalidRestitution {
                field: "wall_restitution",
                value: 0.5
            })
        );

        let bad_pillar = Pillar {
            radius: -3.0,
            ..Pillar::centered()
        };
        assert_eq!(
            PhysicsConfig::builder().pillar(bad_pillar).build(),
            Err(ConfigError::InvalidPillar(-3.0))
        );
    }

    #[test]
    fn test_builder_rejects_pillar_past_the_edge() {
        let near_edge = Pillar {
            center: Vec2::new(9.0, 0.0),
            ..Pillar::centered()
        };
        assert_eq!(
            PhysicsConfig::builder().pillar(near_edge).build(),
            Err(ConfigError::PillarOffTable {
                index: 0,
                reach: 12.5,
                limit: BOUNCE_LIMIT
            })
        );

        let second = Pillar {
            center: Vec2::new(-2.0, -8.0),
            radius: 2.5,
            ..Pillar::centered()
        };
        assert!(matches!(
            PhysicsConfig::builder()
                .pillar(Pillar::centered())
                .pillar(second)
                .build(),
            Err(ConfigError::PillarOffTable { index: 1, .. })
        ));

        // Touching the edge exactly is allowed
        let flush = Pillar {
            center: Vec2::new(0.0, 7.0),
            ..Pillar::centered()
        };
        assert!(PhysicsConfig::builder().pillar(flush).build().is_ok());
    }

    #[test]
    fn test_clamp_tilt() {
        let config = PhysicsConfig::default();
        let limit = config.tilt_limit();
        let clamped = config.clamp_tilt(Vec2::new(1.0, -1.0));
        assert_eq!(clamped, Vec2::new(limit, -limit));
        let inside = Vec2::new(0.1, -0.2);
        assert_eq!(config.clamp_tilt(inside), inside);
    }

    #[test]
    fn test_deserialize_validates() {
        let env: Environment = serde_json::from_str(r#"{"mass": 1.0}"#).unwrap();
        assert_eq!(env.mass(), 1.0);
        assert_eq!(env.gravity(), DEFAULT_GRAVITY);

        assert!(serde_json::from_str::<Environment>(r#"{"mass": -1.0}"#).is_err());
        assert!(serde_json::from_str::<PhysicsConfig>(r#"{"limit": -2.0}"#).is_err());

        let config: PhysicsConfig =
            serde_json::from_str(r#"{"policy": "wrap", "limit": 11.0}"#).unwrap();
        assert_eq!(config.policy(), BoundaryPolicy::Wrap);
        assert_eq!(config.limit(), 11.0);
    }

    #[test]
    fn test_policy_names() {
        assert_eq!(BoundaryPolicy::from_str("WRAP"), Some(BoundaryPolicy::Wrap));
        assert_eq!(BoundaryPolicy::from_str("bounce"), Some(BoundaryPolicy::Bounce));
        assert_eq!(BoundaryPolicy::from_str("sticky"), None);
        assert_eq!(BoundaryPolicy::Wrap.as_str(), "wrap");
    }
}
