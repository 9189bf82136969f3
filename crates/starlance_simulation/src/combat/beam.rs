//! Beam weapon rules: aim, fire-rate gate, hit resolution, damage dispatch
//!
//! Per tick (`BeamWeapon::prepare`):
//! 1. Fetch the target from `Targeting`
//! 2. Aligned on a live target → capped slew; otherwise relax to rest
//! 3. Advance the fire-rate counter (clamped)
//! 4. Trigger held && counter == interval → `BeamRay`, counter = 0
//!
//! Resolution (`resolve_fire`) is split out because the world query lives in
//! the physics layer. ECS flow:
//! `tick_beam_weapons` → BeamFireIntent → (physics) → BeamFired + BeamHit + ImpactEffectRequested

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::combat::aim::{relax_towards_rest, slew_towards};
use crate::combat::damageable::{DamageOutcome, Damageable, DamageableLookup};
use crate::combat::targeting::{TrackedTarget, Targeting};
use crate::components::{
    BeamParts, BeamVisual, BeamWeapon, CollisionLayers, FireTrigger, ShipStats, TargetLock,
    AIM_SLEW_DEGREES_PER_TICK, IMPACT_PARTICLE_BURST, REST_BLEND_PER_TICK,
};
use crate::logger;

/// A beam about to be resolved: world-space ray + payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeamRay {
    pub origin: Vec3,
    /// Unit vector
    pub direction: Vec3,
    pub max_range: f32,
    pub damage: f32,
    pub layers: CollisionLayers,
}

impl BeamRay {
    /// All hits along the ray; a zero-length beam queries nothing.
    pub fn cast(&self, caster: &impl RayCaster) -> Vec<RayHit> {
        if self.max_range.is_nan() || self.max_range <= 0.0 {
            return Vec::new();
        }
        caster.intersections(self.origin, self.direction, self.max_range, self.layers)
    }
}

/// One ray/collider intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub entity: Entity,
    pub point: Vec3,
    /// Distance along the ray from its origin
    pub distance: f32,
}

/// World-intersection query: ALL hits along the ray, not just the nearest.
pub trait RayCaster {
    fn intersections(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        layers: CollisionLayers,
    ) -> Vec<RayHit>;
}

/// Outcome of one fire event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FireResolution {
    /// Visible beam length, ≤ max_range
    pub beam_length: f32,
    /// Closest qualifying hit, if any
    pub impact: Option<RayHit>,
    pub damage: f32,
}

impl FireResolution {
    pub fn miss(beam_length: f32, damage: f32) -> Self {
        Self {
            beam_length,
            impact: None,
            damage,
        }
    }

    /// The single entity that receives damage for this fire event.
    pub fn damage_target(&self) -> Option<(Entity, f32)> {
        self.impact.map(|hit| (hit.entity, self.damage))
    }
}

/// Result of a full weapon tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BeamTick {
    /// Gate closed or trigger released: beam visual off
    Idle,
    Fired(FireResolution),
}

/// Picks the closest qualifying hit.
///
/// `is_own` marks the firer's own geometry (excluded). Ties on exactly
/// equal distance keep the first hit encountered. A ray with
/// `max_range <= 0` is an immediate miss of length 0.
pub fn resolve_fire(
    ray: &BeamRay,
    hits: impl IntoIterator<Item = RayHit>,
    is_own: impl Fn(Entity) -> bool,
) -> FireResolution {
    if ray.max_range.is_nan() || ray.max_range <= 0.0 {
        return FireResolution::miss(0.0, ray.damage);
    }

    let closest = hits
        .into_iter()
        .filter(|hit| hit.distance.is_finite() && hit.distance >= 0.0)
        .filter(|hit| !is_own(hit.entity))
        .fold(None::<RayHit>, |best, hit| match best {
            Some(best) if best.distance <= hit.distance => Some(best),
            _ => Some(hit),
        });

    match closest {
        Some(hit) => FireResolution {
            beam_length: hit.distance.min(ray.max_range),
            impact: Some(hit),
            damage: ray.damage,
        },
        None => FireResolution::miss(ray.max_range, ray.damage),
    }
}

/// Applies the resolution's damage to the struck entity, if it is damageable.
pub fn dispatch_damage(
    resolution: &FireResolution,
    lookup: &mut impl DamageableLookup,
) -> Option<DamageOutcome> {
    let (entity, damage) = resolution.damage_target()?;
    let target = lookup.damageable_mut(entity)?;
    Some(target.take_damage(damage))
}

impl BeamWeapon {
    /// Steps 1–4 of a tick. Returns the ray to resolve when the weapon fires.
    ///
    /// `mount` is the weapon's local transform, `parent` its parent's global
    /// transform (`GlobalTransform::IDENTITY` for a root weapon).
    pub fn prepare(
        &mut self,
        delta_secs: f32,
        mount: &mut Transform,
        parent: &GlobalTransform,
        targeting: &impl Targeting,
        trigger_held: bool,
    ) -> Option<BeamRay> {
        let target = targeting.current_target();
        self.target = target.map(|t| t.entity);

        let (_, parent_rotation, _) = parent.to_scale_rotation_translation();
        let origin = parent.transform_point(mount.translation);

        match target {
            Some(target) if targeting.is_aligned() => {
                let world_rotation = parent_rotation * mount.rotation;
                let aimed = slew_towards(
                    world_rotation,
                    origin,
                    target.position,
                    AIM_SLEW_DEGREES_PER_TICK.to_radians(),
                );
                mount.rotation = (parent_rotation.inverse() * aimed).normalize();
            }
            _ => {
                mount.rotation = relax_towards_rest(mount.rotation, REST_BLEND_PER_TICK);
            }
        }

        self.advance_cooldown(delta_secs);

        if !(trigger_held && self.is_ready()) {
            return None;
        }
        self.reset_cooldown();

        let direction = (parent_rotation * mount.rotation * Vec3::NEG_Z).normalize();
        Some(BeamRay {
            origin,
            direction,
            max_range: self.config().max_range,
            damage: self.config().damage,
            layers: self.config().impact_layers,
        })
    }

    /// Complete tick against injected collaborators.
    ///
    /// Damage is not applied here: pass the resolution to `dispatch_damage`
    /// (or, in the ECS, the BeamHit event does it).
    #[allow(clippy::too_many_arguments)]
    pub fn tick(
        &mut self,
        delta_secs: f32,
        mount: &mut Transform,
        parent: &GlobalTransform,
        targeting: &impl Targeting,
        trigger_held: bool,
        caster: &impl RayCaster,
        is_own: impl Fn(Entity) -> bool,
    ) -> BeamTick {
        let Some(ray) = self.prepare(delta_secs, mount, parent, targeting, trigger_held) else {
            return BeamTick::Idle;
        };

        BeamTick::Fired(resolve_fire(&ray, ray.cast(caster), is_own))
    }
}

// ============================================================================
// Events
// ============================================================================

/// Event: weapon passed the fire gate this tick (ECS → physics layer).
#[derive(Event, Debug, Clone, Copy)]
pub struct BeamFireIntent {
    pub weapon: Entity,
    pub ray: BeamRay,
}

/// Event: beam resolved (presentation: length + pose).
#[derive(Event, Debug, Clone, Copy)]
pub struct BeamFired {
    pub weapon: Entity,
    pub resolution: FireResolution,
}

/// Event: impact effect at a world point (fire-and-forget).
#[derive(Event, Debug, Clone, Copy)]
pub struct ImpactEffectRequested {
    pub weapon: Entity,
    pub point: Vec3,
    pub particles: u32,
}

/// Event: the single closest qualifying hit of a fire event.
#[derive(Event, Debug, Clone, Copy)]
pub struct BeamHit {
    pub shooter: Entity,
    pub target: Entity,
    pub damage: f32,
}

/// Writers for everything a resolved beam produces.
#[derive(SystemParam)]
pub struct FireResolutionWriters<'w> {
    fired: EventWriter<'w, BeamFired>,
    impacts: EventWriter<'w, ImpactEffectRequested>,
    hits: EventWriter<'w, BeamHit>,
}

impl FireResolutionWriters<'_> {
    pub fn emit(&mut self, weapon: Entity, resolution: FireResolution) {
        self.fired.write(BeamFired { weapon, resolution });

        let Some(impact) = resolution.impact else {
            logger::log(&format!(
                "Beam {:?} fired: no impact (length {:.1})",
                weapon, resolution.beam_length
            ));
            return;
        };

        logger::log(&format!(
            "Beam {:?} fired: impact {:?} at {:.1}m",
            weapon, impact.entity, impact.distance
        ));

        self.impacts.write(ImpactEffectRequested {
            weapon,
            point: impact.point,
            particles: IMPACT_PARTICLE_BURST,
        });
        self.hits.write(BeamHit {
            shooter: weapon,
            target: impact.entity,
            damage: resolution.damage,
        });
    }
}

/// Geometry a beam never stops on: the weapon, its ancestors, and everything
/// under its owning ship (nearest ancestor with `ShipStats`). A weapon with no
/// owning ship only owns its own subtree.
///
/// Siblings under a shared scene/formation parent are NOT own geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct OwnGeometry {
    weapon: Entity,
    ancestors: Vec<Entity>,
    owner: Entity,
}

impl OwnGeometry {
    pub fn collect(
        weapon: Entity,
        parent_of: impl Fn(Entity) -> Option<Entity>,
        is_ship: impl Fn(Entity) -> bool,
    ) -> Self {
        let mut ancestors = Vec::new();
        let mut current = weapon;
        while let Some(parent) = parent_of(current) {
            ancestors.push(parent);
            current = parent;
        }

        let owner = ancestors
            .iter()
            .copied()
            .find(|&e| is_ship(e))
            .unwrap_or(weapon);

        Self {
            weapon,
            ancestors,
            owner,
        }
    }

    /// Builds the set from live hierarchy + ship queries.
    pub fn of_weapon(
        weapon: Entity,
        parents: &Query<&ChildOf>,
        ships: &Query<(), With<ShipStats>>,
    ) -> Self {
        Self::collect(
            weapon,
            |e| parents.get(e).ok().map(ChildOf::parent),
            |e| ships.contains(e),
        )
    }

    pub fn owner(&self) -> Entity {
        self.owner
    }

    pub fn contains(&self, entity: Entity, parent_of: impl Fn(Entity) -> Option<Entity>) -> bool {
        if entity == self.weapon || self.ancestors.contains(&entity) {
            return true;
        }

        let mut current = entity;
        while let Some(parent) = parent_of(current) {
            if parent == self.owner {
                return true;
            }
            current = parent;
        }
        false
    }

    /// `contains` against the live hierarchy.
    pub fn contains_in(&self, entity: Entity, parents: &Query<&ChildOf>) -> bool {
        self.contains(entity, |e| parents.get(e).ok().map(ChildOf::parent))
    }
}

// ============================================================================
// Systems
// ============================================================================

/// System: aim + fire gate for every beam weapon.
///
/// Gate open → BeamFireIntent; otherwise the beam visual is switched off.
pub fn tick_beam_weapons(
    mut weapons: Query<(
        Entity,
        &mut BeamWeapon,
        &mut Transform,
        &TargetLock,
        &FireTrigger,
        &mut BeamVisual,
        Option<&ChildOf>,
    )>,
    globals: Query<&GlobalTransform>,
    mut intents: EventWriter<BeamFireIntent>,
    time: Res<Time>,
) {
    let delta = time.delta_secs();

    for (entity, mut weapon, mut mount, lock, trigger, mut visual, child_of) in weapons.iter_mut() {
        let targeting = TrackedTarget::resolve(lock, |target| {
            globals.get(target).ok().map(|g| g.translation())
        });
        let parent = child_of
            .and_then(|c| globals.get(c.parent()).ok())
            .copied()
            .unwrap_or(GlobalTransform::IDENTITY);

        match weapon.prepare(delta, &mut mount, &parent, &targeting, trigger.held) {
            Some(ray) => {
                intents.write(BeamFireIntent { weapon: entity, ray });
            }
            None => {
                if visual.active {
                    visual.active = false;
                }
            }
        }
    }
}

/// System: BeamFired → BeamVisual.
///
/// Length is always updated; the beam is shown only when it struck something.
pub fn update_beam_visuals(
    mut fired: EventReader<BeamFired>,
    mut visuals: Query<&mut BeamVisual>,
) {
    for event in fired.read() {
        if let Ok(mut visual) = visuals.get_mut(event.weapon) {
            visual.active = event.resolution.impact.is_some();
            visual.length = event.resolution.beam_length;
        }
    }
}

/// System: pose the beam and impact marker children from `BeamVisual`.
///
/// Beam is centred at half length and scaled to it; the marker sits at the
/// beam's end. Bevy forward = -Z.
pub fn sync_beam_parts(
    weapons: Query<(&BeamVisual, &BeamParts), Changed<BeamVisual>>,
    mut parts: Query<&mut Transform, Without<BeamWeapon>>,
) {
    for (visual, beam_parts) in weapons.iter() {
        let length = visual.length;

        if let Ok(mut beam) = parts.get_mut(beam_parts.beam) {
            beam.translation = Vec3::new(0.0, 0.0, -length / 2.0);
            beam.scale.y = length / 2.0;
        }
        if let Ok(mut marker) = parts.get_mut(beam_parts.impact_marker) {
            marker.translation = Vec3::new(0.0, 0.0, -length);
        }
    }
}
