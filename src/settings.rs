//! Mode presets and the JSON settings document
//!
//! A settings file picks a mode and may override any environment or physics
//! value. Every field is optional:
//!
//! ```json
//! {
//!   "mode": "racing",
//!   "environment": { "mass": 0.5, "gravity": 9.81, "friction": 0.15 },
//!   "physics": { "tilt_limit_deg": 25.0, "static_damping": 0.92 }
//! }
//! ```
//!
//! Omitted physics fields come from the mode preset, not the global
//! defaults, so `{"mode": "sandbox"}` yields the wrapping 11 m table.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::{
    BoundaryPolicy, ConfigError, Environment, PhysicsConfig, PhysicsConfigBuilder, Pillar,
};

/// Play mode; each one implies a table layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Free play, edges wrap around
    #[default]
    Sandbox,
    /// Walled table
    Challenge,
    /// Walled table with a pillar in the middle
    Racing,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Sandbox => "sandbox",
            Mode::Challenge => "challenge",
            Mode::Racing => "racing",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "sandbox" | "free" => Some(Mode::Sandbox),
            "challenge" => Some(Mode::Challenge),
            "racing" | "race" => Some(Mode::Racing),
            _ => None,
        }
    }

    pub fn boundary_policy(&self) -> BoundaryPolicy {
        match self {
            Mode::Sandbox => BoundaryPolicy::Wrap,
            Mode::Challenge | Mode::Racing => BoundaryPolicy::Bounce,
        }
    }

    /// Builder preloaded with this mode's table layout
    pub fn preset(&self) -> PhysicsConfigBuilder {
        let builder = PhysicsConfig::builder().policy(self.boundary_policy());
        match self {
            Mode::Sandbox => builder.limit(WRAP_LIMIT),
            Mode::Challenge => builder.limit(BOUNCE_LIMIT),
            Mode::Racing => builder.limit(BOUNCE_LIMIT).pillar(Pillar::centered()),
        }
    }

    /// Validated physics config for this mode
    pub fn physics(&self) -> PhysicsConfig {
        // Presets only use the validated defaults in `consts`
        self.preset()
            .build()
            .unwrap_or_else(|_| PhysicsConfig::default())
    }
}

/// Failure to load a settings document
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed settings JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid settings: {0}")]
    Invalid(#[from] ConfigError),
}

/// Loaded, validated settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub mode: Mode,
    pub environment: Environment,
    pub physics: PhysicsConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_mode(Mode::default())
    }
}

/// Physics overrides; `None` keeps the mode preset value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct PhysicsOverrides {
    tilt_limit_deg: Option<f32>,
    policy: Option<BoundaryPolicy>,
    limit: Option<f32>,
    wall_restitution: Option<f32>,
    pillars: Option<Vec<Pillar>>,
    body_radius: Option<f32>,
    static_damping: Option<f32>,
    rest_epsilon: Option<f32>,
}

impl PhysicsOverrides {
    fn apply(self, mut builder: PhysicsConfigBuilder) -> PhysicsConfigBuilder {
        if let Some(v) = self.tilt_limit_deg {
            builder.tilt_limit_deg = v;
        }
        if let Some(v) = self.policy {
            builder.policy = v;
        }
        if let Some(v) = self.limit {
            builder.limit = v;
        }
        if let Some(v) = self.wall_restitution {
            builder.wall_restitution = v;
        }
        if let Some(v) = self.pillars {
            builder.pillars = v;
        }
        if let Some(v) = self.body_radius {
            builder.body_radius = v;
        }
        if let Some(v) = self.static_damping {
            builder.static_damping = v;
        }
        if let Some(v) = self.rest_epsilon {
            builder.rest_epsilon = v;
        }
        builder
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SettingsFile {
    mode: Mode,
    environment: Option<Environment>,
    physics: PhysicsOverrides,
}

impl Settings {
    /// Settings for a mode with default environment values
    pub fn from_mode(mode: Mode) -> Self {
        Self {
            mode,
            environment: Environment::default(),
            physics: mode.physics(),
        }
    }

    /// Switch mode, replacing the table layout but keeping the environment
    pub fn apply_mode(&mut self, mode: Mode) {
        self.mode = mode;
        self.physics = mode.physics();
        log::info!("Mode set to {}", mode.as_str());
    }

    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        let file: SettingsFile = serde_json::from_str(json)?;
        let physics = file.physics.apply(file.mode.preset()).build()?;
        Ok(Self {
            mode: file.mode,
            environment: file.environment.unwrap_or_default(),
            physics,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let settings = Self::from_json_str(&json)?;
        log::info!(
            "Loaded settings from {} (mode {})",
            path.display(),
            settings.mode.as_str()
        );
        Ok(settings)
    }

    /// Serialize as a complete settings document
    pub fn to_json(&self) -> Result<String, SettingsError> {
        let physics = PhysicsConfigBuilder::from(self.physics.clone());
        let file = SettingsFile {
            mode: self.mode,
            environment: Some(self.environment),
            physics: PhysicsOverrides {
                tilt_limit_deg: Some(physics.tilt_limit_deg),
                policy: Some(physics.policy),
                limit: Some(physics.limit),
                wall_restitution: Some(physics.wall_restitution),
                pillars: Some(physics.pillars),
                body_radius: Some(physics.body_radius),
                static_damping: Some(physics.static_damping),
                rest_epsilon: Some(physics.rest_epsilon),
            },
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }
}
