//! Physics module: world-intersection queries через Rapier
//!
//! Rapier владеет коллайдерами и query pipeline; ECS combat только
//! спрашивает "что на луче" через `RayCaster`.
//!
//! BeamPhysicsPlugin: BeamFireIntent → intersect_ray → resolve_fire
//! → BeamFired + ImpactEffectRequested + BeamHit

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::combat::beam::{
    self, resolve_fire, BeamFireIntent, FireResolutionWriters, OwnGeometry, RayCaster, RayHit,
};
use crate::components::{CollisionLayers, ShipStats};
use crate::error::ConfigError;
use crate::logger;

/// Collision layers (bit = Rapier group)
pub mod collision {
    use super::*;

    pub const SHIPS: CollisionLayers = CollisionLayers(1 << 0);
    pub const DEBRIS: CollisionLayers = CollisionLayers(1 << 1);
    pub const ENVIRONMENT: CollisionLayers = CollisionLayers(1 << 2);
    /// Everything a beam can stop on
    pub const BEAM_TARGETS: CollisionLayers = CollisionLayers((1 << 0) | (1 << 1) | (1 << 2));

    pub fn group(layers: CollisionLayers) -> Group {
        Group::from_bits_truncate(layers.0)
    }

    /// Collider membership in `layers`, collides with everything.
    pub fn member_of(layers: CollisionLayers) -> CollisionGroups {
        CollisionGroups::new(group(layers), Group::ALL)
    }

    pub fn ship_groups() -> CollisionGroups {
        member_of(SHIPS)
    }

    pub fn debris_groups() -> CollisionGroups {
        member_of(DEBRIS)
    }

    /// Ray filter: hit only colliders that are members of `layers`.
    pub fn beam_filter(layers: CollisionLayers) -> QueryFilter<'static> {
        QueryFilter::new().groups(CollisionGroups::new(Group::ALL, group(layers)))
    }
}

impl RayCaster for RapierContext<'_> {
    fn intersections(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        layers: CollisionLayers,
    ) -> Vec<RayHit> {
        let mut hits = Vec::new();

        self.intersect_ray(
            origin,
            direction,
            max_distance,
            true,
            collision::beam_filter(layers),
            |entity, intersection| {
                hits.push(RayHit {
                    entity,
                    point: intersection.point,
                    distance: intersection.time_of_impact,
                });
                true // все пересечения, не только ближайшее
            },
        );

        hits
    }
}

/// System: resolve pending beam intents against the Rapier world.
///
/// The firer's own geometry (`OwnGeometry`) never qualifies.
/// Without a Rapier context the intents of this tick are dropped.
pub fn resolve_beam_intents(
    mut intents: EventReader<BeamFireIntent>,
    rapier: ReadRapierContext,
    parents: Query<&ChildOf>,
    ships: Query<(), With<ShipStats>>,
    mut writers: FireResolutionWriters,
) {
    if intents.is_empty() {
        return;
    }

    let context = match rapier.single() {
        Ok(context) => context,
        Err(_) => {
            logger::log_error(&format!(
                "{} ({} beam intents dropped)",
                ConfigError::MissingCollaborator {
                    component: "BeamPhysicsPlugin",
                    collaborator: "RapierContext",
                },
                intents.len()
            ));
            intents.clear();
            return;
        }
    };

    for intent in intents.read() {
        let own = OwnGeometry::of_weapon(intent.weapon, &parents, &ships);
        let hits = intent.ray.cast(&context);
        let resolution = resolve_fire(&intent.ray, hits, |entity| own.contains_in(entity, &parents));
        writers.emit(intent.weapon, resolution);
    }
}

/// Startup check: beam resolution needs the Rapier plugin.
pub fn check_physics_context(app: &App) -> Result<(), ConfigError> {
    if app.is_plugin_added::<RapierPhysicsPlugin<NoUserData>>() {
        Ok(())
    } else {
        Err(ConfigError::MissingCollaborator {
            component: "BeamPhysicsPlugin",
            collaborator: "RapierPhysicsPlugin",
        })
    }
}

/// Plugin: beam hit resolution через Rapier.
///
/// Отдельно от CombatPlugin: headless тесты подставляют свой resolver
/// поверх `resolve_fire`.
pub struct BeamPhysicsPlugin;

impl Plugin for BeamPhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            resolve_beam_intents
                .after(beam::tick_beam_weapons)
                .before(beam::update_beam_visuals),
        );
    }
}
