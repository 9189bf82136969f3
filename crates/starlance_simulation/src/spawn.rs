//! Spawn helpers
//!
//! Создают entity с полным набором компонентов (ECS + Rapier collider).
//! Конфиг валидируется до spawn: невалидный конфиг = ошибка на старте.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::components::{BeamConfig, BeamParts, BeamWeapon, Debris, ShipConfig, ShipStats};
use crate::error::ConfigError;
use crate::physics::collision;

/// Ship hull radius (m)
pub const SHIP_COLLIDER_RADIUS: f32 = 2.0;

/// Spawns a ship: stats + motion control + kinematic collider.
pub fn spawn_ship(
    commands: &mut Commands,
    config: ShipConfig,
    transform: Transform,
) -> Result<Entity, ConfigError> {
    let stats = ShipStats::from_config(config)?;

    Ok(commands
        .spawn((
            Name::new("ship"),
            transform,
            // Валиден до первого transform propagation
            GlobalTransform::from(transform),
            stats,
            // Rapier physics (motion интегрируем сами)
            RigidBody::KinematicPositionBased,
            Collider::ball(SHIP_COLLIDER_RADIUS),
            collision::ship_groups(),
        ))
        .id())
}

/// Mounts a beam weapon on `ship` at local pose `mount`.
///
/// Also spawns the beam and impact-marker children posed by `sync_beam_parts`.
pub fn spawn_beam_weapon(
    commands: &mut Commands,
    ship: Entity,
    config: BeamConfig,
    mount: Transform,
) -> Result<Entity, ConfigError> {
    let weapon = BeamWeapon::from_config(config)?;

    let weapon_entity = commands
        .spawn((Name::new("beam_weapon"), mount, weapon, ChildOf(ship)))
        .id();

    let beam = commands
        .spawn((Name::new("beam"), Transform::IDENTITY, ChildOf(weapon_entity)))
        .id();
    let impact_marker = commands
        .spawn((Name::new("impact_marker"), Transform::IDENTITY, ChildOf(weapon_entity)))
        .id();

    commands
        .entity(weapon_entity)
        .insert(BeamParts { beam, impact_marker });

    Ok(weapon_entity)
}

/// Spawns a debris chunk (breaks instantly, no detonation).
pub fn spawn_debris(
    commands: &mut Commands,
    max_integrity: f32,
    transform: Transform,
    radius: f32,
) -> Result<Entity, ConfigError> {
    let debris = Debris::new(max_integrity)?;

    Ok(commands
        .spawn((
            Name::new("debris"),
            transform,
            GlobalTransform::from(transform),
            debris,
            RigidBody::Fixed,
            Collider::ball(radius),
            collision::debris_groups(),
        ))
        .id())
}
