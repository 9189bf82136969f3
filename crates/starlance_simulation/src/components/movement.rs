//! Movement/control collaborator
//!
//! Движение кораблей: внешняя система; симуляция боя только
//! блокирует её при уничтожении (`MotionLock::interrupt`).

use bevy::prelude::*;

/// Request to suspend (or resume) a ship's independent motion.
pub trait MotionLock {
    fn interrupt(&mut self, locked: bool);
}

/// Ship motion state: velocity applied each tick unless interrupted.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct MotionControl {
    /// World-space velocity (m/s)
    pub velocity: Vec3,
    /// Locked by the destruction sequence (or any other caller)
    pub interrupted: bool,
}

impl MotionControl {
    pub fn moving(velocity: Vec3) -> Self {
        Self {
            velocity,
            interrupted: false,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.interrupted
    }
}

impl MotionLock for MotionControl {
    fn interrupt(&mut self, locked: bool) {
        self.interrupted = locked;
        if locked {
            self.velocity = Vec3::ZERO;
        }
    }
}

/// System: velocity → translation for ships that are not locked.
pub fn integrate_ship_motion(
    mut ships: Query<(&MotionControl, &mut Transform)>,
    time: Res<Time>,
) {
    let delta = time.delta_secs();

    for (motion, mut transform) in ships.iter_mut() {
        if motion.interrupted {
            continue;
        }
        transform.translation += motion.velocity * delta;
    }
}
