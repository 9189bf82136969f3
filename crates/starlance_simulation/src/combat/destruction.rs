//! Destruction sequence: Intact → Detonating → Removed
//!
//! Entry (integrity hits 0) is handled by `Damageable::take_damage`; this
//! module reacts to it:
//! - `lock_motion_on_destruction`: EntityDestroyed → MotionControl::interrupt(true)
//! - `tick_detonations`: elapsed += dt; at the delay → ExplosionRequested + despawn

use bevy::prelude::*;

use crate::combat::damageable::EntityDestroyed;
use crate::components::{MotionControl, MotionLock, ShipStats};
use crate::logger;

/// Event: explosion effect at the removed entity's final pose.
#[derive(Event, Debug, Clone, Copy)]
pub struct ExplosionRequested {
    pub entity: Entity,
    pub transform: GlobalTransform,
}

/// System: stop independent motion of entities that just entered destruction.
pub fn lock_motion_on_destruction(
    mut destroyed: EventReader<EntityDestroyed>,
    mut motion: Query<&mut MotionControl>,
) {
    for event in destroyed.read() {
        if let Ok(mut control) = motion.get_mut(event.entity) {
            control.interrupt(true);
            logger::log(&format!("Motion locked for {:?}", event.entity));
        }
    }
}

/// System: advance detonation countdowns; remove ships whose delay elapsed.
///
/// `advance_detonation` reports completion exactly once, so one explosion per
/// ship even if the despawn were deferred.
pub fn tick_detonations(
    mut commands: Commands,
    mut ships: Query<(Entity, &mut ShipStats, &GlobalTransform)>,
    mut explosions: EventWriter<ExplosionRequested>,
    time: Res<Time>,
) {
    let delta = time.delta_secs();

    for (entity, mut stats, transform) in ships.iter_mut() {
        if !stats.advance_detonation(delta) {
            continue;
        }

        logger::log_info(&format!(
            "Ship {:?} detonated at {:?}, removing",
            entity,
            transform.translation()
        ));

        explosions.write(ExplosionRequested {
            entity,
            transform: *transform,
        });
        commands.entity(entity).despawn();
    }
}
