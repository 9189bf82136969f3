//! Starlance Simulation Core
//!
//! ECS-симуляция космического боя на Bevy 0.16 (headless)
//!
//! - Beam weapons: aim, fire-rate gate, hit resolution, damage dispatch
//! - Ships: integrity/armor, power budget с overheat, destruction sequence
//! - Physics: world ray queries через Rapier
//!
//! Всё per-tick поведение в FixedUpdate (60Hz) для детерминизма.

use bevy::prelude::*;
use bevy::transform::TransformPlugin;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod combat;
pub mod components;
pub mod error;
pub mod logger;
pub mod physics;
pub mod spawn;

// Re-export базовых типов для удобства
pub use combat::{
    dispatch_damage, resolve_fire, BeamFireIntent, BeamFired, BeamHit, BeamRay, BeamTick,
    CombatPlugin, DamageOutcome, Damageable, DamageableLookup, EntityDestroyed,
    ExplosionRequested, FireResolution, ImpactEffectRequested, IntegrityChanged, OwnGeometry, RayCaster,
    RayHit, RepairRequested, TargetHandle, Targeting, TrackedTarget,
};
pub use components::*;
pub use error::{ConfigError, SimulationError};
pub use logger::init_logger;
pub use physics::{check_physics_context, BeamPhysicsPlugin};
pub use spawn::{spawn_beam_weapon, spawn_debris, spawn_ship, SHIP_COLLIDER_RADIUS};

/// Fixed simulation rate
pub const SIMULATION_HZ: f64 = 60.0;

/// Главный plugin симуляции (объединяет все подсистемы)
///
/// Rapier plugin добавляет вызывающий (`RapierPhysicsPlugin::in_fixed_schedule`).
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(SIMULATION_HZ))
            .init_resource::<DeterministicRng>()
            .add_plugins((CombatPlugin, BeamPhysicsPlugin));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Без combat плагинов: вызывающий добавляет `SimulationPlugin` (с Rapier)
/// или `CombatPlugin` + свой resolver (тесты).
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins((MinimalPlugins, TransformPlugin))
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(SIMULATION_HZ));

    app
}

/// Snapshot мира для сравнения детерминизма
///
/// Сортировка по Entity index, сериализация через Debug.
pub fn world_snapshot<T>(world: &mut World) -> Vec<u8>
where
    T: Component + std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
