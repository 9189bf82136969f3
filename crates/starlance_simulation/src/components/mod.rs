//! ECS components
//!
//! - ship: ShipStats (integrity, armor, power, destruction phase)
//! - weapon: BeamWeapon + tracker/trigger/presentation components
//! - movement: MotionControl (motion lock collaborator)
//! - debris: Debris (integrity-only damageable)

pub mod debris;
pub mod movement;
pub mod ship;
pub mod weapon;

pub use debris::*;
pub use movement::*;
pub use ship::*;
pub use weapon::*;
