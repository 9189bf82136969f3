//! Repair requests from other systems (repair drones, docking, scripts).

use bevy::prelude::*;

use crate::combat::damageable::{Damageable, IntegrityChanged};
use crate::components::ShipStats;
use crate::logger;

/// Event: restore `amount` integrity on `entity`.
#[derive(Event, Debug, Clone, Copy)]
pub struct RepairRequested {
    pub entity: Entity,
    pub amount: f32,
}

/// System: RepairRequested → `ShipStats::repair_damage`.
///
/// Destroyed ships accept repair but stay destroyed; the detonation
/// continues.
pub fn process_repair_requests(
    mut requests: EventReader<RepairRequested>,
    mut ships: Query<&mut ShipStats>,
    mut integrity_events: EventWriter<IntegrityChanged>,
) {
    for request in requests.read() {
        let Ok(mut stats) = ships.get_mut(request.entity) else {
            continue;
        };

        let before = stats.integrity();
        let restored = stats.repair_damage(request.amount) - before;
        if restored <= 0.0 {
            continue;
        }

        logger::log(&format!(
            "Repaired {:?}: +{:.1} ({:.1}/{:.1})",
            request.entity,
            restored,
            stats.integrity(),
            stats.max_integrity()
        ));

        integrity_events.write(IntegrityChanged {
            entity: request.entity,
            current: stats.integrity(),
            max: stats.max_integrity(),
        });
    }
}
