//! Debris: the simplest Damageable (integrity only)
//!
//! Нет брони, энергии и детонации: при integrity = 0 удаляется сразу.

use bevy::prelude::*;

use crate::combat::damageable::{DamageOutcome, Damageable};
use crate::error::{check_positive, ConfigError};

#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
#[require(Transform)]
pub struct Debris {
    integrity: f32,
    max_integrity: f32,
    destroyed: bool,
}

impl Debris {
    pub fn new(max_integrity: f32) -> Result<Self, ConfigError> {
        check_positive("max_integrity", max_integrity)?;
        Ok(Self {
            integrity: max_integrity,
            max_integrity,
            destroyed: false,
        })
    }
}

impl Damageable for Debris {
    fn take_damage(&mut self, amount: f32) -> DamageOutcome {
        if self.destroyed || !(amount > 0.0) {
            return DamageOutcome::absorbed(self.integrity);
        }

        let before = self.integrity;
        self.integrity = (self.integrity - amount).max(0.0);
        let destroyed_now = self.integrity == 0.0;
        self.destroyed = destroyed_now;

        DamageOutcome {
            applied: before - self.integrity,
            remaining: self.integrity,
            destroyed_now,
        }
    }

    fn integrity(&self) -> f32 {
        self.integrity
    }

    fn max_integrity(&self) -> f32 {
        self.max_integrity
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

/// System: remove debris the instant it breaks.
pub fn despawn_destroyed_debris(mut commands: Commands, debris: Query<(Entity, &Debris)>) {
    for (entity, debris) in debris.iter() {
        if debris.is_destroyed() {
            commands.entity(entity).despawn();
        }
    }
}
