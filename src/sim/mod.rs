//! Deterministic tilt-table simulation
//!
//! Everything in here is pure and synchronous: no I/O, no globals.
//! The host owns `SimulationState` and calls `tick` once per fixed step.

pub mod collision;
pub mod config;
pub mod forces;
pub mod state;
pub mod stepper;
pub mod tick;

pub use collision::{
    BoundaryHit, Collision, pillar_clearance, resolve_boundary, resolve_pillar, resolve_pillars,
};
pub use config::{
    BoundaryPolicy, ConfigError, Environment, PhysicsConfig, PhysicsConfigBuilder, Pillar,
};
pub use forces::{AxisMode, SlopeForces};
pub use state::{Body, SimulationState};
pub use stepper::FixedStepper;
pub use tick::{TickInput, TickReport, tick};
