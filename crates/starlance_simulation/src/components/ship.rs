//! Ship stats: integrity, armor, power budget, destruction sequence
//!
//! Инварианты:
//! - 0 ≤ integrity ≤ max_integrity
//! - 0 ≤ power ≤ max_power
//! - `destroyed` монотонен: Intact → Detonating → Removed, без отката
//!
//! Power overheat: a failed `has_power` check sets `cooling_down`, which
//! blocks every power check until power climbs back above
//! `POWER_RECOVERY_FRACTION × max_power`.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::combat::damageable::{DamageOutcome, Damageable};
use crate::components::MotionControl;
use crate::error::{check_non_negative, check_positive, ConfigError};
use crate::logger;

/// Fraction of max power a ship must exceed before an overheat clears.
pub const POWER_RECOVERY_FRACTION: f32 = 0.1;

/// Tunable ship parameters (immutable per instance).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Reflect)]
pub struct ShipConfig {
    /// Flat reduction applied to every incoming hit
    pub armor: f32,
    pub max_integrity: f32,
    pub max_power: f32,
    /// Power regained per second (0 = no passive regen)
    pub power_regen_rate: f32,
    /// Seconds between integrity reaching 0 and removal
    pub detonation_delay: f32,
}

impl Default for ShipConfig {
    fn default() -> Self {
        Self::frigate()
    }
}

impl ShipConfig {
    /// Line ship: medium armor, slow regen
    pub fn frigate() -> Self {
        Self {
            armor: 2.0,
            max_integrity: 100.0,
            max_power: 100.0,
            power_regen_rate: 10.0,
            detonation_delay: 1.5,
        }
    }

    /// Light and fast: no armor, quick regen, short fuse
    pub fn interceptor() -> Self {
        Self {
            armor: 0.0,
            max_integrity: 40.0,
            max_power: 60.0,
            power_regen_rate: 20.0,
            detonation_delay: 0.5,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_non_negative("armor", self.armor)?;
        check_positive("max_integrity", self.max_integrity)?;
        check_positive("max_power", self.max_power)?;
        check_non_negative("power_regen_rate", self.power_regen_rate)?;
        check_non_negative("detonation_delay", self.detonation_delay)?;
        Ok(())
    }
}

/// Destruction state machine.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum DestructionPhase {
    Intact,
    /// Countdown running; `elapsed` grows once per tick
    Detonating { elapsed: f32 },
    /// Explosion requested, entity despawned
    Removed,
}

/// Damageable ship (integrity + armor + power).
///
/// Поля приватные: все мутации идут через методы, чтобы clamp-инварианты
/// держались при любой последовательности вызовов.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
#[require(MotionControl, Transform)]
pub struct ShipStats {
    config: ShipConfig,
    integrity: f32,
    power: f32,
    cooling_down: bool,
    destroyed: bool,
    phase: DestructionPhase,
}

impl ShipStats {
    /// Spawn-time constructor: integrity and power start at their maxima.
    pub fn from_config(config: ShipConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            integrity: config.max_integrity,
            power: config.max_power,
            cooling_down: false,
            destroyed: false,
            phase: DestructionPhase::Intact,
        })
    }

    pub fn config(&self) -> &ShipConfig {
        &self.config
    }

    pub fn armor(&self) -> f32 {
        self.config.armor
    }

    pub fn power(&self) -> f32 {
        self.power
    }

    pub fn max_power(&self) -> f32 {
        self.config.max_power
    }

    pub fn is_cooling_down(&self) -> bool {
        self.cooling_down
    }

    pub fn phase(&self) -> DestructionPhase {
        self.phase
    }

    /// Adds integrity, capped at max.
    ///
    /// Repair does not touch the destruction state: a detonating ship keeps
    /// counting down even if patched up. Non-positive amounts are ignored.
    pub fn repair_damage(&mut self, amount: f32) -> f32 {
        if amount > 0.0 {
            self.integrity = (self.integrity + amount).min(self.config.max_integrity);
        }
        self.integrity
    }

    /// Spends power, floored at 0. Over-draw is clamped, not rejected.
    pub fn use_power(&mut self, amount: f32) {
        if amount.is_nan() {
            return;
        }
        self.power = (self.power - amount).clamp(0.0, self.config.max_power);
    }

    /// Adds power, capped at max.
    pub fn restore_power(&mut self, amount: f32) {
        if amount.is_nan() {
            return;
        }
        self.power = (self.power + amount).clamp(0.0, self.config.max_power);
    }

    /// `true` only if `needed <= power` and the ship is not cooling down.
    ///
    /// NOT a pure query: every `false` answer (re)arms the overheat
    /// cooldown, which then blocks all checks, even for smaller amounts.
    pub fn has_power(&mut self, needed: f32) -> bool {
        if needed <= self.power && !self.cooling_down {
            return true;
        }

        if !self.cooling_down {
            logger::log_info(&format!(
                "Power overheat: needed {:.1}, available {:.1}/{:.1}",
                needed, self.power, self.config.max_power
            ));
        }
        self.cooling_down = true;
        false
    }

    /// Power threshold the ship must exceed to leave overheat.
    pub fn recovery_threshold(&self) -> f32 {
        self.config.max_power * POWER_RECOVERY_FRACTION
    }

    /// Per-tick regen + overheat release. Destroyed ships only count down.
    pub fn regenerate_power(&mut self, delta_secs: f32) {
        if self.destroyed {
            return;
        }

        if self.power < self.config.max_power && delta_secs > 0.0 {
            let gained = self.config.power_regen_rate * delta_secs;
            self.power = (self.power + gained).min(self.config.max_power);
        }

        if self.cooling_down && self.power > self.recovery_threshold() {
            self.cooling_down = false;
            logger::log_info(&format!(
                "Power overheat cleared at {:.1}/{:.1}",
                self.power, self.config.max_power
            ));
        }
    }

    /// Advances the detonation countdown.
    ///
    /// Returns `true` exactly once: on the tick the accumulated time reaches
    /// `detonation_delay` (the phase moves to `Removed`).
    pub fn advance_detonation(&mut self, delta_secs: f32) -> bool {
        let DestructionPhase::Detonating { elapsed } = self.phase else {
            return false;
        };

        let elapsed = elapsed + delta_secs.max(0.0);
        if elapsed >= self.config.detonation_delay {
            self.phase = DestructionPhase::Removed;
            true
        } else {
            self.phase = DestructionPhase::Detonating { elapsed };
            false
        }
    }

    /// Serializable snapshot for UI/debug surfaces.
    pub fn status(&self) -> ShipStatus {
        ShipStatus {
            integrity: self.integrity,
            max_integrity: self.config.max_integrity,
            power: self.power,
            max_power: self.config.max_power,
            cooling_down: self.cooling_down,
            destroyed: self.destroyed,
        }
    }
}

impl Damageable for ShipStats {
    /// Reduces integrity by `max(amount - armor, 0)`.
    ///
    /// Armor-absorbed hits and hits on an already destroyed ship change
    /// nothing. Reaching 0 starts the detonation countdown (once).
    fn take_damage(&mut self, amount: f32) -> DamageOutcome {
        if self.destroyed {
            return DamageOutcome::absorbed(self.integrity);
        }

        let effective = amount - self.config.armor;
        // `!(x > 0)` also rejects NaN
        if !(effective > 0.0) {
            return DamageOutcome::absorbed(self.integrity);
        }

        let before = self.integrity;
        self.integrity -= effective;

        let mut destroyed_now = false;
        if self.integrity <= 0.0 {
            self.integrity = 0.0;
            self.destroyed = true;
            self.phase = DestructionPhase::Detonating { elapsed: 0.0 };
            destroyed_now = true;
        }

        DamageOutcome {
            applied: before - self.integrity,
            remaining: self.integrity,
            destroyed_now,
        }
    }

    fn integrity(&self) -> f32 {
        self.integrity
    }

    fn max_integrity(&self) -> f32 {
        self.config.max_integrity
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

/// Snapshot of a ship's resource model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShipStatus {
    pub integrity: f32,
    pub max_integrity: f32,
    pub power: f32,
    pub max_power: f32,
    pub cooling_down: bool,
    pub destroyed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ship(armor: f32, integrity: f32) -> ShipStats {
        ShipStats::from_config(ShipConfig {
            armor,
            max_integrity: integrity,
            max_power: 100.0,
            power_regen_rate: 0.0,
            detonation_delay: 1.0,
        })
        .unwrap()
    }

    #[test]
    fn test_spawn_at_maxima() {
        let stats = ShipStats::from_config(ShipConfig::frigate()).unwrap();
        assert_eq!(stats.integrity(), 100.0);
        assert_eq!(stats.power(), 100.0);
        assert!(!stats.is_cooling_down());
        assert!(!stats.is_destroyed());
        assert_eq!(stats.phase(), DestructionPhase::Intact);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ShipConfig {
            max_integrity: 0.0,
            ..ShipConfig::frigate()
        };
        assert!(matches!(
            ShipStats::from_config(config),
            Err(ConfigError::NotPositive { field: "max_integrity", .. })
        ));

        let config = ShipConfig {
            armor: -1.0,
            ..ShipConfig::frigate()
        };
        assert!(ShipStats::from_config(config).is_err());
    }

    #[test]
    fn test_armor_scenario() {
        let mut stats = ship(2.0, 10.0);

        let outcome = stats.take_damage(5.0);
        assert_eq!(stats.integrity(), 7.0);
        assert_eq!(outcome.applied, 3.0);
        assert!(!stats.is_destroyed());

        // Armor applies to every hit: 7 lands as 5
        stats.take_damage(7.0);
        assert_eq!(stats.integrity(), 2.0);
        assert!(!stats.is_destroyed());

        let outcome = stats.take_damage(9.0);
        assert_eq!(stats.integrity(), 0.0);
        assert!(outcome.destroyed_now);
        assert!(stats.is_destroyed());
        assert_eq!(stats.phase(), DestructionPhase::Detonating { elapsed: 0.0 });
    }

    #[test]
    fn test_armor_absorbs_small_hits() {
        let mut stats = ship(5.0, 10.0);

        for amount in [0.0, 1.0, 4.99, 5.0, -3.0, f32::NAN] {
            let outcome = stats.take_damage(amount);
            assert_eq!(outcome.applied, 0.0);
            assert!(!outcome.destroyed_now);
        }
        assert_eq!(stats.integrity(), 10.0);
        assert!(!stats.is_destroyed());
    }

    #[test]
    fn test_destruction_triggers_once() {
        let mut stats = ship(0.0, 10.0);

        assert!(stats.take_damage(50.0).destroyed_now);
        for _ in 0..5 {
            let outcome = stats.take_damage(50.0);
            assert!(!outcome.destroyed_now);
            assert_eq!(outcome.applied, 0.0);
        }
        assert_eq!(stats.integrity(), 0.0);
    }

    #[test]
    fn test_detonation_countdown() {
        let mut stats = ship(0.0, 10.0);
        assert!(!stats.advance_detonation(1.0)); // Intact: nothing to count

        stats.take_damage(10.0);
        assert!(!stats.advance_detonation(0.4));
        assert!(!stats.advance_detonation(0.4));
        assert!(stats.advance_detonation(0.4)); // 1.2 >= 1.0
        assert_eq!(stats.phase(), DestructionPhase::Removed);

        // Removal fires exactly once
        assert!(!stats.advance_detonation(10.0));
        assert!(stats.is_destroyed());
    }

    #[test]
    fn test_repair_capped_and_unguarded() {
        let mut stats = ship(0.0, 10.0);
        stats.take_damage(6.0);
        assert_eq!(stats.repair_damage(2.0), 6.0);
        assert_eq!(stats.repair_damage(100.0), 10.0);
        assert_eq!(stats.repair_damage(-5.0), 10.0);

        stats.take_damage(10.0);
        stats.repair_damage(3.0);
        assert_eq!(stats.integrity(), 3.0);
        assert!(stats.is_destroyed(), "repair never revives");
    }

    #[test]
    fn test_power_clamped() {
        let mut stats = ship(0.0, 10.0);

        stats.use_power(30.0);
        assert_eq!(stats.power(), 70.0);
        stats.use_power(500.0);
        assert_eq!(stats.power(), 0.0);
        stats.restore_power(40.0);
        assert_eq!(stats.power(), 40.0);
        stats.restore_power(500.0);
        assert_eq!(stats.power(), 100.0);

        stats.use_power(-50.0);
        assert_eq!(stats.power(), 100.0);
        stats.restore_power(-500.0);
        assert_eq!(stats.power(), 0.0);
        stats.use_power(f32::NAN);
        assert_eq!(stats.power(), 0.0);
    }

    #[test]
    fn test_overheat_blocks_smaller_requests() {
        let mut stats = ship(0.0, 10.0);
        stats.use_power(95.0); // 5 left, threshold 10

        assert!(!stats.has_power(20.0));
        assert!(stats.is_cooling_down());

        // Enough power for 1.0, but cooldown blocks it
        assert!(!stats.has_power(1.0));

        stats.restore_power(5.0); // 10.0: not above threshold
        stats.regenerate_power(0.1);
        assert!(stats.is_cooling_down());
        assert!(!stats.has_power(1.0));

        stats.restore_power(0.5);
        stats.regenerate_power(0.1);
        assert!(!stats.is_cooling_down());
        assert!(stats.has_power(1.0));
    }

    #[test]
    fn test_overheat_clears_at_full_power() {
        let mut stats = ship(0.0, 10.0);
        assert!(!stats.has_power(150.0)); // more than max
        assert!(stats.is_cooling_down());

        stats.regenerate_power(1.0 / 60.0);
        assert!(!stats.is_cooling_down());
    }

    #[test]
    fn test_regen() {
        let mut stats = ShipStats::from_config(ShipConfig::frigate()).unwrap();
        stats.use_power(50.0);
        stats.regenerate_power(2.0); // 2 sec × 10/sec
        assert_eq!(stats.power(), 70.0);
        stats.regenerate_power(100.0);
        assert_eq!(stats.power(), 100.0);
    }

    #[test]
    fn test_status_snapshot() {
        let mut stats = ship(0.0, 10.0);
        stats.take_damage(4.0);
        let status = stats.status();
        assert_eq!(status.integrity, 6.0);
        assert_eq!(status.max_integrity, 10.0);
        assert!(!status.destroyed);
    }
}
