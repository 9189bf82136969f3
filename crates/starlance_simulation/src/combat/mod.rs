//! Combat module: beam weapons + damageable lifecycle
//!
//! ECS ответственность:
//! - Weapon rules: aim, fire-rate gate, fire intent
//! - Damage intake: armor, integrity, destruction sequence
//! - Power budget: regen, overheat
//! - Events: BeamFireIntent, BeamFired, BeamHit, IntegrityChanged, EntityDestroyed
//!
//! Hit resolution (world ray query) lives in `physics`; it turns
//! BeamFireIntent into BeamFired/BeamHit between phases 1 and 2.

use bevy::prelude::*;

pub mod aim;
pub mod beam;
pub mod damageable;
pub mod destruction;
pub mod power;
pub mod repair;
pub mod targeting;


pub use beam::{
    dispatch_damage, resolve_fire, BeamFireIntent, BeamFired, BeamHit, BeamRay, BeamTick,
    FireResolution, FireResolutionWriters, ImpactEffectRequested, OwnGeometry, RayCaster, RayHit,
};
pub use damageable::{
    apply_beam_hits, DamageOutcome, Damageable, DamageableLookup, EntityDestroyed,
    IntegrityChanged,
};
pub use destruction::ExplosionRequested;
pub use repair::RepairRequested;
pub use targeting::{TargetHandle, Targeting, TrackedTarget};

use crate::components::{despawn_destroyed_debris, integrate_ship_motion, Debris, ShipStats};

/// Combat Plugin
///
/// Регистрирует combat системы в FixedUpdate.
///
/// Порядок выполнения:
/// 0. integrate_ship_motion: velocity → Transform (locked ships stay put)
/// 1. tick_beam_weapons: aim + fire gate → BeamFireIntent
///    (physics: BeamFireIntent → BeamFired + BeamHit)
/// 2. update_beam_visuals: BeamFired → BeamVisual
/// 3. apply_beam_hits: BeamHit → Damageable (ShipStats, Debris)
/// 4. process_repair_requests: RepairRequested → integrity
/// 5. lock_motion_on_destruction: EntityDestroyed → MotionControl
/// 6. regenerate_power: regen + overheat release
/// 7. tick_detonations: countdown → ExplosionRequested + despawn
/// 8. despawn_destroyed_debris
/// 9. sync_beam_parts: beam/marker child transforms
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        // Регистрация событий
        app.add_event::<BeamFireIntent>()
            .add_event::<BeamFired>()
            .add_event::<BeamHit>()
            .add_event::<ImpactEffectRequested>()
            .add_event::<IntegrityChanged>()
            .add_event::<EntityDestroyed>()
            .add_event::<RepairRequested>()
            .add_event::<ExplosionRequested>();

        app.register_type::<ShipStats>()
            .register_type::<Debris>()
            .register_type::<crate::components::BeamWeapon>()
            .register_type::<crate::components::MotionControl>();

        app.add_systems(
            FixedUpdate,
            (
                // Фаза 0: Motion (до прицеливания)
                integrate_ship_motion,

                // Фаза 1: Weapons
                beam::tick_beam_weapons,
                beam::update_beam_visuals,

                // Фаза 2: Damage + repair
                apply_beam_hits::<ShipStats>,
                apply_beam_hits::<Debris>,
                repair::process_repair_requests,

                // Фаза 3: Lifecycle
                destruction::lock_motion_on_destruction,
                power::regenerate_power,
                destruction::tick_detonations,
                despawn_destroyed_debris,

                // Фаза 4: Presentation
                beam::sync_beam_parts,
            )
                .chain(),
        );
    }
}
