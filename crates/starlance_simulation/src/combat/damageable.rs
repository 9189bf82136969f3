//! Damageable capability
//!
//! Любая сущность, которую можно повредить, реализует `Damageable`.
//! In the ECS the capability lookup is "does the hit entity carry a
//! component implementing the trait": `apply_beam_hits::<T>` is registered
//! once per damageable component type.

use std::collections::HashMap;

use bevy::ecs::component::Mutable;
use bevy::prelude::*;

use crate::combat::beam::BeamHit;
use crate::logger;

/// Result of a single damage intake.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageOutcome {
    /// Integrity actually removed
    pub applied: f32,
    /// Integrity left after the hit
    pub remaining: f32,
    /// This hit started the destruction sequence
    pub destroyed_now: bool,
}

impl DamageOutcome {
    /// Nothing changed (armor absorbed the hit, or target already destroyed).
    pub fn absorbed(remaining: f32) -> Self {
        Self {
            applied: 0.0,
            remaining,
            destroyed_now: false,
        }
    }

    pub fn landed(&self) -> bool {
        self.applied > 0.0
    }
}

pub trait Damageable {
    /// Damage intake. Must be idempotent once destroyed.
    fn take_damage(&mut self, amount: f32) -> DamageOutcome;

    fn integrity(&self) -> f32;

    fn max_integrity(&self) -> f32;

    fn is_destroyed(&self) -> bool;
}

/// Capability lookup by entity, for hosts outside the ECS.
pub trait DamageableLookup {
    fn damageable_mut(&mut self, entity: Entity) -> Option<&mut dyn Damageable>;
}

impl<D: Damageable> DamageableLookup for HashMap<Entity, D> {
    fn damageable_mut(&mut self, entity: Entity) -> Option<&mut dyn Damageable> {
        self.get_mut(&entity).map(|d| d as &mut dyn Damageable)
    }
}

/// Event: integrity changed (UI display hook).
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct IntegrityChanged {
    pub entity: Entity,
    pub current: f32,
    pub max: f32,
}

/// Event: entity entered its destruction sequence.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct EntityDestroyed {
    pub entity: Entity,
    pub killer: Option<Entity>,
}

/// System: BeamHit → `Damageable::take_damage` for component type `T`.
///
/// Hits on entities without `T` are skipped silently (another registration
/// may own them, or the entity is simply not damageable).
pub fn apply_beam_hits<T>(
    mut hits: EventReader<BeamHit>,
    mut targets: Query<&mut T>,
    mut integrity_events: EventWriter<IntegrityChanged>,
    mut destroyed_events: EventWriter<EntityDestroyed>,
) where
    T: Damageable + Component<Mutability = Mutable>,
{
    for hit in hits.read() {
        let Ok(mut target) = targets.get_mut(hit.target) else {
            continue;
        };

        let outcome = target.take_damage(hit.damage);
        if !outcome.landed() {
            continue;
        }

        logger::log(&format!(
            "Beam hit {:?} → {:?}: {:.1} damage ({:.1}/{:.1} left)",
            hit.shooter,
            hit.target,
            outcome.applied,
            outcome.remaining,
            target.max_integrity()
        ));

        integrity_events.write(IntegrityChanged {
            entity: hit.target,
            current: outcome.remaining,
            max: target.max_integrity(),
        });

        if outcome.destroyed_now {
            logger::log_info(&format!(
                "Entity {:?} destroyed by {:?}",
                hit.target, hit.shooter
            ));
            destroyed_events.write(EntityDestroyed {
                entity: hit.target,
                killer: Some(hit.shooter),
            });
        }
    }
}
