//! Environment snapshots for the tick loop
//!
//! A control panel may change mass, friction or gravity at any time. The
//! loop asks its provider for one `Environment` at the start of each tick and
//! uses that value for the whole tick, so a tick never mixes old and new
//! constants.

use std::sync::{Arc, PoisonError, RwLock};

use crate::sim::{ConfigError, Environment};

/// Source of the environment for the next tick
pub trait ConfigurationProvider {
    fn environment(&self) -> Environment;
}

/// Fixed environment that never changes
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticEnvironment(pub Environment);

impl ConfigurationProvider for StaticEnvironment {
    fn environment(&self) -> Environment {
        self.0
    }
}

impl ConfigurationProvider for Environment {
    fn environment(&self) -> Environment {
        *self
    }
}

/// Environment shared with a live control surface on another thread
///
/// Cloning yields another handle to the same value. Writers validate before
/// publishing, so readers only ever see a valid `Environment`.
#[derive(Debug, Clone, Default)]
pub struct SharedEnvironment {
    inner: Arc<RwLock<Environment>>,
}

impl SharedEnvironment {
    pub fn new(env: Environment) -> Self {
        Self {
            inner: Arc::new(RwLock::new(env)),
        }
    }

    /// Replace the whole environment
    pub fn set(&self, env: Environment) {
        // A poisoned lock still holds a whole Environment
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = env;
    }

    /// Apply a validated edit, leaving the current value in place on error
    pub fn update<F>(&self, edit: F) -> Result<Environment, ConfigError>
    where
        F: FnOnce(Environment) -> Result<Environment, ConfigError>,
    {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let next = edit(*guard)?;
        *guard = next;
        log::debug!(
            "Environment updated: mass={} gravity={} friction={}",
            next.mass(),
            next.gravity(),
            next.friction()
        );
        Ok(next)
    }

    pub fn set_mass(&self, mass: f32) -> Result<Environment, ConfigError> {
        self.update(|env| env.with_mass(mass))
    }

    pub fn set_gravity(&self, gravity: f32) -> Result<Environment, ConfigError> {
        self.update(|env| env.with_gravity(gravity))
    }

    pub fn set_friction(&self, friction: f32) -> Result<Environment, ConfigError> {
        self.update(|env| env.with_friction(friction))
    }
}

impl ConfigurationProvider for SharedEnvironment {
    fn environment(&self) -> Environment {
        *self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }
}
