//! Тесты детерминизма
//!
//! Одинаковый seed → идентичный snapshot мира. Позиции целей берутся из
//! DeterministicRng, бой решается pure resolver'ом (без Rapier).

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::Rng;
use starlance_simulation::combat::beam::{tick_beam_weapons, update_beam_visuals, FireResolutionWriters};
use starlance_simulation::*;

/// Collider stand-in: every target is a point at its position, hit when
/// the ray passes within 3m.
#[derive(Component)]
struct Hull;

struct PointWorld(Vec<(Entity, Vec3)>);

impl RayCaster for PointWorld {
    fn intersections(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        _layers: CollisionLayers,
    ) -> Vec<RayHit> {
        self.0
            .iter()
            .filter_map(|&(entity, position)| {
                let distance = (position - origin).dot(direction);
                let closest = origin + direction * distance;
                (distance >= 0.0 && distance <= max_distance && closest.distance(position) <= 3.0)
                    .then_some(RayHit {
                        entity,
                        point: closest,
                        distance,
                    })
            })
            .collect()
    }
}

fn resolve_against_points(
    mut intents: EventReader<BeamFireIntent>,
    hulls: Query<(Entity, &GlobalTransform), With<Hull>>,
    mut writers: FireResolutionWriters,
) {
    let world = PointWorld(hulls.iter().map(|(e, g)| (e, g.translation())).collect());

    for intent in intents.read() {
        let resolution = resolve_fire(&intent.ray, intent.ray.cast(&world), |_| false);
        writers.emit(intent.weapon, resolution);
    }
}

/// Запускает бой и возвращает snapshot ShipStats
fn run_simulation(seed: u64, target_count: usize, tick_count: usize) -> Vec<u8> {
    let mut app = create_headless_app(seed);
    app.add_plugins(CombatPlugin)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
            1.0 / SIMULATION_HZ,
        )))
        .add_systems(
            FixedUpdate,
            resolve_against_points
                .after(tick_beam_weapons)
                .before(update_beam_visuals),
        );

    let positions: Vec<Vec3> = {
        let mut rng = app.world_mut().resource_mut::<DeterministicRng>();
        (0..target_count)
            .map(|_| {
                Vec3::new(
                    rng.rng.gen_range(-20.0..20.0),
                    rng.rng.gen_range(-5.0..5.0),
                    -rng.rng.gen_range(20.0..100.0),
                )
            })
            .collect()
    };

    {
        let world = app.world_mut();
        let mut commands = world.commands();

        let shooter = spawn_ship(&mut commands, ShipConfig::frigate(), Transform::IDENTITY).unwrap();
        let mut weapons = Vec::new();
        for _ in 0..2 {
            let weapon = spawn_beam_weapon(
                &mut commands,
                shooter,
                BeamConfig::point_defense(),
                Transform::IDENTITY,
            )
            .unwrap();
            weapons.push(weapon);
        }

        for (i, position) in positions.into_iter().enumerate() {
            let target = spawn_ship(
                &mut commands,
                ShipConfig::interceptor(),
                Transform::from_translation(position),
            )
            .unwrap();
            commands.entity(target).insert((
                Hull,
                MotionControl::moving(Vec3::new(0.0, 0.0, 2.0)),
            ));
            if i < weapons.len() {
                commands
                    .entity(weapons[i])
                    .insert((TargetLock::on(target), FireTrigger { held: true }));
            }
        }

        world.flush();
    }

    for _ in 0..tick_count {
        app.update();
    }

    world_snapshot::<ShipStats>(app.world_mut())
}

#[test]
fn test_determinism_same_seed() {
    const SEED: u64 = 12345;

    let snapshot1 = run_simulation(SEED, 6, 600);
    let snapshot2 = run_simulation(SEED, 6, 600);

    assert_eq!(
        snapshot1, snapshot2,
        "Симуляция с одинаковым seed ({}) дала разные результаты!",
        SEED
    );
}

#[test]
fn test_determinism_multiple_runs() {
    const SEED: u64 = 42;

    let snapshots: Vec<_> = (0..3).map(|_| run_simulation(SEED, 4, 300)).collect();

    for (i, snapshot) in snapshots.iter().enumerate().skip(1) {
        assert_eq!(
            snapshots[0], *snapshot,
            "Прогон {} дал результат отличный от прогона 0",
            i
        );
    }
}
