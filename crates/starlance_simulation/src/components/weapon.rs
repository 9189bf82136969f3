//! Beam weapon components
//!
//! Architecture:
//! - `BeamWeapon`: config + fire-rate counter (game state)
//! - `TargetLock`: written by the external tracker (camera/AI), read each tick
//! - `FireTrigger`: written by input/AI
//! - `BeamVisual` / `BeamParts`: presentation only, no gameplay effect
//!
//! Rules (aim, gate, resolve) live in `combat::beam`.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{check_non_negative, check_positive, ConfigError};

/// Max weapon slew per tick while aligned on a target (degrees).
pub const AIM_SLEW_DEGREES_PER_TICK: f32 = 2.0;

/// Blend factor towards rest orientation per tick when not aiming.
pub const REST_BLEND_PER_TICK: f32 = 0.2;

/// Particles per impact effect request.
pub const IMPACT_PARTICLE_BURST: u32 = 50;

/// Bitmask of collision layers a beam can hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Reflect)]
pub struct CollisionLayers(pub u32);

impl CollisionLayers {
    pub const ALL: Self = Self(u32::MAX);
}

/// Tunable beam parameters (immutable per instance).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Reflect)]
pub struct BeamConfig {
    /// Ray length (meters)
    pub max_range: f32,
    /// Damage per hit, before target armor
    pub damage: f32,
    /// Seconds between shots
    pub fire_interval: f32,
    pub impact_layers: CollisionLayers,
}

impl Default for BeamConfig {
    fn default() -> Self {
        Self::cannon()
    }
}

impl BeamConfig {
    /// Ship-mounted main cannon
    pub fn cannon() -> Self {
        Self {
            max_range: 150.0,
            damage: 12.0,
            fire_interval: 0.5,
            impact_layers: CollisionLayers::ALL,
        }
    }

    /// Short-range rapid beam
    pub fn point_defense() -> Self {
        Self {
            max_range: 40.0,
            damage: 3.0,
            fire_interval: 0.1,
            impact_layers: CollisionLayers::ALL,
        }
    }

    /// `max_range == 0` is allowed (always a no-hit), a zero interval is not.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_non_negative("max_range", self.max_range)?;
        check_non_negative("damage", self.damage)?;
        check_positive("fire_interval", self.fire_interval)?;
        Ok(())
    }
}

/// Beam weapon controller state.
///
/// Инвариант: 0 ≤ counter ≤ fire_interval; выстрел только при
/// counter == fire_interval, сразу после: counter = 0.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
#[require(TargetLock, FireTrigger, BeamVisual, Transform)]
pub struct BeamWeapon {
    config: BeamConfig,
    /// Seconds accumulated since the last shot (clamped)
    counter: f32,
    /// Target resolved on the last tick (None if lost/invalid)
    pub target: Option<Entity>,
}

impl BeamWeapon {
    /// Weapon spawns ready: the first trigger pull fires.
    pub fn from_config(config: BeamConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            counter: config.fire_interval,
            target: None,
        })
    }

    pub fn config(&self) -> &BeamConfig {
        &self.config
    }

    pub fn counter(&self) -> f32 {
        self.counter
    }

    /// Advances the fire-rate counter, never past `fire_interval`.
    pub fn advance_cooldown(&mut self, delta_secs: f32) {
        if self.counter < self.config.fire_interval {
            self.counter += delta_secs.max(0.0);
            if self.counter > self.config.fire_interval {
                self.counter = self.config.fire_interval;
            }
        }
    }

    /// Ready exactly when the counter has reached the interval.
    pub fn is_ready(&self) -> bool {
        self.counter == self.config.fire_interval
    }

    pub fn reset_cooldown(&mut self) {
        self.counter = 0.0;
    }
}

/// Output of the external target tracker.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct TargetLock {
    pub target: Option<Entity>,
    /// Tracker reports the view is on the target
    pub aligned: bool,
}

impl TargetLock {
    pub fn on(target: Entity) -> Self {
        Self {
            target: Some(target),
            aligned: true,
        }
    }
}

/// Fire input (held = wants to fire this tick).
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct FireTrigger {
    pub held: bool,
}

/// Presentation state of the beam.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct BeamVisual {
    pub active: bool,
    /// Visible length (meters), ≤ max_range
    pub length: f32,
}

/// Child entities that render the beam and its impact marker.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct BeamParts {
    pub beam: Entity,
    pub impact_marker: Entity,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawns_ready() {
        let weapon = BeamWeapon::from_config(BeamConfig::cannon()).unwrap();
        assert!(weapon.is_ready());
        assert_eq!(weapon.counter(), 0.5);
    }

    #[test]
    fn test_counter_clamped() {
        let mut weapon = BeamWeapon::from_config(BeamConfig::cannon()).unwrap();
        weapon.reset_cooldown();
        assert!(!weapon.is_ready());

        weapon.advance_cooldown(0.3);
        assert!(!weapon.is_ready());
        weapon.advance_cooldown(0.3);
        assert_eq!(weapon.counter(), 0.5);
        assert!(weapon.is_ready());

        weapon.advance_cooldown(10.0);
        assert_eq!(weapon.counter(), 0.5);
    }

    #[test]
    fn test_invalid_beam_config() {
        let config = BeamConfig {
            fire_interval: 0.0,
            ..BeamConfig::cannon()
        };
        assert!(matches!(
            BeamWeapon::from_config(config),
            Err(ConfigError::NotPositive { field: "fire_interval", .. })
        ));

        let config = BeamConfig {
            max_range: 0.0,
            ..BeamConfig::cannon()
        };
        assert!(BeamWeapon::from_config(config).is_ok());
    }
}
