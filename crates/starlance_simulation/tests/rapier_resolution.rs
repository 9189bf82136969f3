//! Beam resolution через Rapier
//!
//! Полный стек: RapierPhysicsPlugin (fixed schedule) + SimulationPlugin.
//! Оружие стоит внутри собственного корпуса: ray из коллайдера попадает в
//! свой hull на toi = 0, он должен отсеиваться.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use bevy_rapier3d::prelude::*;
use starlance_simulation::*;

const TARGET_DISTANCE: f32 = 30.0;

fn create_rapier_app() -> App {
    let mut app = create_headless_app(42);
    app.add_plugins((
        RapierPhysicsPlugin::<NoUserData>::default().in_fixed_schedule(),
        SimulationPlugin,
    ))
    .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
        1.0 / SIMULATION_HZ,
    )));

    check_physics_context(&app).unwrap();
    app
}

/// Frigate + cannon at the origin, interceptor straight ahead.
/// With `fleet`, both ships are parented to a shared formation entity.
fn spawn_duel(app: &mut App, fleet: Option<Entity>) -> (Entity, Entity, Entity) {
    let world = app.world_mut();
    let mut commands = world.commands();

    let ship = spawn_ship(&mut commands, ShipConfig::frigate(), Transform::IDENTITY).unwrap();
    let weapon =
        spawn_beam_weapon(&mut commands, ship, BeamConfig::cannon(), Transform::IDENTITY).unwrap();
    let target = spawn_ship(
        &mut commands,
        ShipConfig::interceptor(),
        Transform::from_xyz(0.0, 0.0, -TARGET_DISTANCE),
    )
    .unwrap();

    if let Some(fleet) = fleet {
        commands.entity(ship).insert(ChildOf(fleet));
        commands.entity(target).insert(ChildOf(fleet));
    }
    commands
        .entity(weapon)
        .insert((TargetLock::on(target), FireTrigger { held: true }));

    world.flush();
    (ship, weapon, target)
}

fn run(app: &mut App, updates: usize) {
    for _ in 0..updates {
        app.update();
    }
}

fn assert_target_struck(app: &App, ship: Entity, weapon: Entity, target: Entity) {
    let visual = *app.world().get::<BeamVisual>(weapon).unwrap();
    let expected = TARGET_DISTANCE - SHIP_COLLIDER_RADIUS;
    assert!(
        (visual.length - expected).abs() < 0.01,
        "beam length {} (expected {})",
        visual.length,
        expected
    );

    let target_integrity = app.world().get::<ShipStats>(target).unwrap().integrity();
    assert!(
        target_integrity <= 40.0 - 2.0 * 12.0,
        "target integrity {}",
        target_integrity
    );

    // Own hull never takes the shot
    assert_eq!(
        app.world().get::<ShipStats>(ship).unwrap().integrity(),
        ShipConfig::frigate().max_integrity
    );
}

/// Test: Rapier ray находит цель, свой корпус исключён
#[test]
fn test_rapier_beam_hits_target() {
    let mut app = create_rapier_app();
    let (ship, weapon, target) = spawn_duel(&mut app, None);

    run(&mut app, 120);

    assert_target_struck(&app, ship, weapon, target);
}

/// Test: общий formation parent не прячет врага
#[test]
fn test_rapier_shared_parent_still_hits() {
    let mut app = create_rapier_app();
    let fleet = app
        .world_mut()
        .spawn((Name::new("fleet"), Transform::IDENTITY))
        .id();
    let (ship, weapon, target) = spawn_duel(&mut app, Some(fleet));

    run(&mut app, 120);

    assert_target_struck(&app, ship, weapon, target);
}
