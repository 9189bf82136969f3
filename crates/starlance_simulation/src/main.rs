//! Headless симуляция Starlance
//!
//! Frigate с beam cannon против группы interceptor'ов (seeded позиции).
//! Запускает Bevy App без рендера, фиксированный шаг 60Hz.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use bevy_rapier3d::prelude::*;
use rand::Rng;

use starlance_simulation::logger;
use starlance_simulation::{
    check_physics_context, create_headless_app, spawn_beam_weapon, spawn_ship, BeamConfig,
    DeterministicRng, FireTrigger, MotionControl, ShipConfig, ShipStats, SimulationError,
    SimulationPlugin, TargetLock, SIMULATION_HZ,
};

const TARGET_COUNT: usize = 3;
const MAX_TICKS: u32 = 60 * 60;

fn main() -> Result<(), SimulationError> {
    let seed = 42;
    let mut app = create_headless_app(seed);
    logger::log_info(&format!(
        "Starting Starlance headless simulation (seed: {})",
        seed
    ));

    app.add_plugins((
        RapierPhysicsPlugin::<NoUserData>::default().in_fixed_schedule(),
        SimulationPlugin,
    ))
    .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
        1.0 / SIMULATION_HZ,
    )));

    check_physics_context(&app)?;

    let (weapon, targets) = spawn_scenario(app.world_mut())?;
    app.world_mut().flush();

    for tick in 0..MAX_TICKS {
        app.update();

        let alive = retarget(app.world_mut(), weapon, &targets);
        if tick % 60 == 0 {
            report(app.world_mut(), tick);
        }
        if alive == 0 {
            logger::log_info(&format!("All targets removed after {} ticks", tick + 1));
            break;
        }
    }

    logger::log_info("Simulation complete!");
    Ok(())
}

/// Frigate at the origin facing -Z, interceptors scattered ahead of it.
fn spawn_scenario(world: &mut World) -> Result<(Entity, Vec<Entity>), SimulationError> {
    let positions: Vec<Vec3> = {
        let mut rng = world.resource_mut::<DeterministicRng>();
        (0..TARGET_COUNT)
            .map(|_| {
                Vec3::new(
                    rng.rng.gen_range(-30.0..30.0),
                    rng.rng.gen_range(-10.0..10.0),
                    -rng.rng.gen_range(40.0..120.0),
                )
            })
            .collect()
    };

    let mut commands = world.commands();

    let frigate = spawn_ship(&mut commands, ShipConfig::frigate(), Transform::IDENTITY)?;
    let weapon = spawn_beam_weapon(
        &mut commands,
        frigate,
        BeamConfig::cannon(),
        Transform::from_xyz(0.0, 0.0, -3.0),
    )?;

    let mut targets = Vec::with_capacity(TARGET_COUNT);
    for position in positions {
        let target = spawn_ship(
            &mut commands,
            ShipConfig::interceptor(),
            Transform::from_translation(position),
        )?;
        commands
            .entity(target)
            .insert(MotionControl::moving(Vec3::new(1.5, 0.0, 0.0)));
        targets.push(target);
    }

    commands
        .entity(weapon)
        .insert((TargetLock::on(targets[0]), FireTrigger { held: true }));

    Ok((weapon, targets))
}

/// Keeps the lock on the first live, intact target. Returns the live count.
fn retarget(world: &mut World, weapon: Entity, targets: &[Entity]) -> usize {
    let alive: Vec<Entity> = targets
        .iter()
        .copied()
        .filter(|t| world.get::<ShipStats>(*t).is_some())
        .collect();
    let intact = alive
        .iter()
        .copied()
        .find(|t| world.get::<ShipStats>(*t).is_some_and(|s| !s.status().destroyed));

    if let Some(mut lock) = world.get_mut::<TargetLock>(weapon) {
        if lock.target != intact {
            logger::log(&format!("Weapon {:?} retargets to {:?}", weapon, intact));
            lock.target = intact;
            lock.aligned = intact.is_some();
        }
    }

    alive.len()
}

fn report(world: &mut World, tick: u32) {
    let mut query = world.query::<(Entity, &ShipStats)>();
    for (entity, stats) in query.iter(world) {
        logger::log_info(&format!("Tick {}: {:?} {:?}", tick, entity, stats.status()));
    }
}
