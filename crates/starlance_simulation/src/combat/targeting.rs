//! Targeting collaborator
//!
//! Target acquisition is a black box (camera tracker, AI, scripted test).
//! The weapon only asks two questions per tick: which target, and is the
//! tracker aligned on it.

use bevy::prelude::*;

use crate::components::TargetLock;

/// Live target reference: entity + world position at query time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetHandle {
    pub entity: Entity,
    pub position: Vec3,
}

pub trait Targeting {
    fn current_target(&self) -> Option<TargetHandle>;

    fn is_aligned(&self) -> bool;
}

/// `TargetLock` resolved against the live world for one tick.
///
/// A locked entity that no longer resolves (despawned, no transform)
/// reads as "no target": aiming relaxes instead of failing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedTarget {
    handle: Option<TargetHandle>,
    aligned: bool,
}

impl TrackedTarget {
    pub fn new(handle: Option<TargetHandle>, aligned: bool) -> Self {
        Self { handle, aligned }
    }

    pub fn none() -> Self {
        Self::new(None, false)
    }

    pub fn resolve(lock: &TargetLock, position_of: impl Fn(Entity) -> Option<Vec3>) -> Self {
        let handle = lock.target.and_then(|entity| {
            position_of(entity).map(|position| TargetHandle { entity, position })
        });

        Self {
            handle,
            aligned: lock.aligned,
        }
    }
}

impl Targeting for TrackedTarget {
    fn current_target(&self) -> Option<TargetHandle> {
        self.handle
    }

    fn is_aligned(&self) -> bool {
        self.aligned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_live_target() {
        let target = Entity::from_raw(7);
        let lock = TargetLock::on(target);

        let tracked = TrackedTarget::resolve(&lock, |_| Some(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(
            tracked.current_target(),
            Some(TargetHandle {
                entity: target,
                position: Vec3::new(1.0, 2.0, 3.0)
            })
        );
        assert!(tracked.is_aligned());
    }

    #[test]
    fn test_stale_target_reads_as_none() {
        let lock = TargetLock::on(Entity::from_raw(7));
        let tracked = TrackedTarget::resolve(&lock, |_| None);
        assert_eq!(tracked.current_target(), None);
    }
}
