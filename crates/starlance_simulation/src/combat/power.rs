//! Power regeneration
//!
//! Overheat clears inside `ShipStats::regenerate_power` once power climbs
//! above `POWER_RECOVERY_FRACTION × max_power`.

use bevy::prelude::*;

use crate::components::ShipStats;

/// System: regenerate power for every ship (FixedUpdate).
pub fn regenerate_power(mut ships: Query<&mut ShipStats>, time: Res<Time>) {
    let delta = time.delta_secs();

    for mut stats in ships.iter_mut() {
        stats.regenerate_power(delta);
    }
}
