//! Weapon and armor data: damage types, armor classes, resistance-based damage,
//! and the projectile weapon types of the rule catalog (§4.1/§4.9).

use serde::{Deserialize, Serialize};

use crate::math::Fixed;

/// Weapon size class affects tracking vs target size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum WeaponSize {
    /// Small weapons - track fast, low damage, poor vs heavy armor.
    Light,
    /// Medium weapons - balanced tracking and damage.
    #[default]
    Medium,
    /// Heavy weapons - slow tracking, high damage, poor vs light targets.
    Heavy,
}

impl WeaponSize {
    /// Get the damage modifier when this weapon size attacks a target armor class.
    #[must_use]
    pub fn tracking_modifier_vs(self, target_armor: ArmorClass) -> Fixed {
        let percent = match (self, target_armor) {
            (WeaponSize::Light, ArmorClass::Light) => 100,
            (WeaponSize::Light, ArmorClass::Medium) => 75,
            (WeaponSize::Light, ArmorClass::Heavy) => 50,
            (WeaponSize::Light, ArmorClass::Air) => 100,
            (WeaponSize::Light, ArmorClass::Building) => 25,

            (WeaponSize::Medium, ArmorClass::Light) => 75,
            (WeaponSize::Medium, ArmorClass::Medium) => 100,
            (WeaponSize::Medium, ArmorClass::Heavy) => 100,
            (WeaponSize::Medium, ArmorClass::Air) => 75,
            (WeaponSize::Medium, ArmorClass::Building) => 75,

            (WeaponSize::Heavy, ArmorClass::Light) => 25,
            (WeaponSize::Heavy, ArmorClass::Medium) => 75,
            (WeaponSize::Heavy, ArmorClass::Heavy) => 100,
            (WeaponSize::Heavy, ArmorClass::Air) => 25,
            (WeaponSize::Heavy, ArmorClass::Building) => 150,
        };

        Fixed::from_num(percent) / Fixed::from_num(100)
    }
}

/// Armor class for targets, per the rule catalog (§4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ArmorClass {
    /// Light armor - infantry, scouts.
    #[default]
    Light,
    /// Medium armor - vehicles, standard units.
    Medium,
    /// Heavy armor - tanks, mechs, heavy units.
    Heavy,
    /// Air units - aircraft, harriers.
    Air,
    /// Buildings and structures.
    Building,
}

impl ArmorClass {
    /// Resistance cap for this armor class (percent, 0-75).
    #[must_use]
    pub const fn resistance_cap(self) -> u8 {
        match self {
            ArmorClass::Light => 50,
            ArmorClass::Medium => 65,
            ArmorClass::Heavy => 75,
            ArmorClass::Air => 50,
            ArmorClass::Building => 75,
        }
    }
}

/// Weapon projectile type, per the rule catalog (§4.1). Determines base
/// projectile speed and whether it re-aims toward a moving target (§4.9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum WeaponType {
    /// Fast, hitscan-like projectile.
    #[default]
    Bullet,
    /// Cannon shell.
    Cannon,
    /// Slow ballistic rocket.
    Rocket,
    /// Heavy, slow cannon shell.
    HeavyCannon,
    /// Homing missile — the only weapon type that re-aims mid-flight.
    Missile,
    /// Instantaneous area detonation (no travel phase).
    Explosion,
}

impl WeaponType {
    /// Base projectile speed in world units per tick (§4.9).
    #[must_use]
    pub const fn projectile_speed(self) -> Fixed {
        match self {
            WeaponType::Rocket | WeaponType::HeavyCannon => Fixed::lit("9"),
            WeaponType::Missile => Fixed::lit("28"),
            WeaponType::Bullet | WeaponType::Cannon | WeaponType::Explosion => Fixed::lit("18"),
        }
    }

    /// Whether this weapon type re-aims its projectile toward the target each tick.
    ///
    /// Only missiles truly home; every other weapon type keeps the velocity it
    /// launched with (§4.9, Scenario 1 vs Scenario 2).
    #[must_use]
    pub const fn is_homing(self) -> bool {
        matches!(self, WeaponType::Missile)
    }
}

/// Damage type classification for weapons, matched against [`ArmorClass`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DamageType {
    /// Kinetic damage - bullets, shells. Good vs light, poor vs heavy.
    #[default]
    Kinetic,
    /// Explosive damage - missiles, bombs. Good vs heavy and buildings.
    Explosive,
    /// Energy damage - lasers, plasma. Consistent damage, ignores some resistance.
    Energy,
    /// Bio-Acid damage. Strong vs light, useless vs buildings.
    BioAcid,
    /// Fire damage - incendiary weapons. Strong vs bio, poor vs mechanical.
    Fire,
}

impl DamageType {
    /// Get the damage modifier for this damage type vs an armor class.
    #[must_use]
    pub fn effectiveness_vs(self, armor_class: ArmorClass) -> Fixed {
        let percent = match (self, armor_class) {
            (Self::Kinetic, ArmorClass::Light) => 100,
            (Self::Kinetic, ArmorClass::Medium) => 75,
            (Self::Kinetic, ArmorClass::Heavy) => 50,
            (Self::Kinetic, ArmorClass::Air) => 75,
            (Self::Kinetic, ArmorClass::Building) => 50,

            (Self::Explosive, ArmorClass::Light) => 75,
            (Self::Explosive, ArmorClass::Medium) => 100,
            (Self::Explosive, ArmorClass::Heavy) => 125,
            (Self::Explosive, ArmorClass::Air) => 50,
            (Self::Explosive, ArmorClass::Building) => 150,

            (Self::Energy, ArmorClass::Light) => 100,
            (Self::Energy, ArmorClass::Medium) => 100,
            (Self::Energy, ArmorClass::Heavy) => 100,
            (Self::Energy, ArmorClass::Air) => 100,
            (Self::Energy, ArmorClass::Building) => 75,

            (Self::BioAcid, ArmorClass::Light) => 125,
            (Self::BioAcid, ArmorClass::Medium) => 100,
            (Self::BioAcid, ArmorClass::Heavy) => 75,
            (Self::BioAcid, ArmorClass::Air) => 100,
            (Self::BioAcid, ArmorClass::Building) => 0,

            (Self::Fire, ArmorClass::Light) => 125,
            (Self::Fire, ArmorClass::Medium) => 100,
            (Self::Fire, ArmorClass::Heavy) => 75,
            (Self::Fire, ArmorClass::Air) => 100,
            (Self::Fire, ArmorClass::Building) => 125,
        };

        Fixed::from_num(percent) / Fixed::from_num(100)
    }
}

/// Maximum resistance cap (75% damage reduction), per §4.1/§4.9.
pub const MAX_RESISTANCE: u8 = 75;

/// Minimum damage floor - attacks always deal at least 1 damage (unless immune).
pub const MIN_DAMAGE: u32 = 1;

/// Combat stats for resistance-based damage calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResistanceStats {
    /// Armor class of this unit.
    pub armor_class: ArmorClass,
    /// Base resistance percentage (0-75).
    pub resistance: u8,
    /// Additional resistance from buffs/abilities.
    pub bonus_resistance: u8,
}

impl ResistanceStats {
    /// Create new resistance stats.
    #[must_use]
    pub const fn new(armor_class: ArmorClass, resistance: u8) -> Self {
        Self {
            armor_class,
            resistance,
            bonus_resistance: 0,
        }
    }

    /// Get effective resistance (capped).
    #[must_use]
    pub fn effective_resistance(&self) -> u8 {
        let total = self.resistance.saturating_add(self.bonus_resistance);
        total
            .min(self.armor_class.resistance_cap())
            .min(MAX_RESISTANCE)
    }

    /// Get resistance as a fixed-point fraction (0.0 to 0.75).
    #[must_use]
    pub fn resistance_fraction(&self) -> Fixed {
        Fixed::from_num(self.effective_resistance()) / Fixed::from_num(100)
    }
}

impl Default for ResistanceStats {
    fn default() -> Self {
        Self::new(ArmorClass::Light, 0)
    }
}

/// Weapon stats for armor penetration and damage-type resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponStats {
    /// Base damage of the weapon.
    pub damage: u32,
    /// Type of damage dealt.
    pub damage_type: DamageType,
    /// Projectile type (speed, homing behavior).
    pub weapon_type: WeaponType,
    /// Size class of the weapon.
    pub weapon_size: WeaponSize,
    /// Armor penetration percentage (0-100).
    pub armor_penetration: u8,
    /// Cooldown between shots, in ticks.
    pub rate: u32,
    /// Maximum engagement range.
    pub range: Fixed,
    /// Splash radius (zero for non-splash weapons).
    pub splash_radius: Fixed,
}

impl WeaponStats {
    /// Create new weapon stats.
    #[must_use]
    pub const fn new(damage: u32, damage_type: DamageType, weapon_type: WeaponType) -> Self {
        Self {
            damage,
            damage_type,
            weapon_type,
            weapon_size: WeaponSize::Medium,
            armor_penetration: 0,
            rate: 30,
            range: Fixed::lit("150"),
            splash_radius: Fixed::ZERO,
        }
    }

    /// Builder method to set weapon size.
    #[must_use]
    pub const fn with_size(mut self, size: WeaponSize) -> Self {
        self.weapon_size = size;
        self
    }

    /// Builder method to set armor penetration.
    #[must_use]
    pub const fn with_penetration(mut self, penetration: u8) -> Self {
        self.armor_penetration = if penetration > 100 { 100 } else { penetration };
        self
    }

    /// Builder method to set cooldown rate in ticks.
    #[must_use]
    pub const fn with_rate(mut self, rate: u32) -> Self {
        self.rate = rate;
        self
    }

    /// Builder method to set engagement range.
    #[must_use]
    pub const fn with_range(mut self, range: Fixed) -> Self {
        self.range = range;
        self
    }

    /// Builder method to set splash radius.
    #[must_use]
    pub const fn with_splash_radius(mut self, radius: Fixed) -> Self {
        self.splash_radius = radius;
        self
    }

    /// Get armor penetration as a fixed-point fraction.
    #[must_use]
    pub fn penetration_fraction(&self) -> Fixed {
        Fixed::from_num(self.armor_penetration) / Fixed::from_num(100)
    }

    /// Whether this weapon deals splash damage.
    #[must_use]
    pub fn has_splash(&self) -> bool {
        self.splash_radius > Fixed::ZERO
    }
}

impl Default for WeaponStats {
    fn default() -> Self {
        Self::new(10, DamageType::Kinetic, WeaponType::Bullet)
    }
}

/// Calculate damage using the resistance-based formula (§4.1):
///
/// ```text
/// Effective Resistance = Resistance × (1 - Armor Penetration), capped at 75%
/// Final Damage = Base Damage × Damage Type Modifier × Size Modifier × (1 - Effective Resistance)
/// Minimum Damage = 1 (unless the damage type is immune, i.e. 0% effectiveness)
/// ```
#[must_use]
pub fn calculate_resistance_damage(weapon: &WeaponStats, target: &ResistanceStats) -> u32 {
    let type_modifier = weapon.damage_type.effectiveness_vs(target.armor_class);
    if type_modifier == Fixed::ZERO {
        return 0;
    }

    let size_modifier = weapon.weapon_size.tracking_modifier_vs(target.armor_class);

    let base_resistance = target.resistance_fraction();
    let penetration = weapon.penetration_fraction();
    let effective_resistance = base_resistance * (Fixed::ONE - penetration);
    let capped_resistance =
        effective_resistance.min(Fixed::from_num(MAX_RESISTANCE) / Fixed::from_num(100));
    let damage_multiplier = Fixed::ONE - capped_resistance;

    let base_damage = Fixed::from_num(weapon.damage);
    let final_damage = base_damage * type_modifier * size_modifier * damage_multiplier;

    let damage_int: u32 = final_damage.to_num::<i32>().max(0) as u32;
    if damage_int == 0 && type_modifier > Fixed::ZERO {
        MIN_DAMAGE
    } else {
        damage_int
    }
}

/// Apply splash falloff: `round(baseDamage * (1 - dist/effectiveRadius) * armorMod)`, per §4.10.
#[must_use]
pub fn splash_damage(weapon: &WeaponStats, target: &ResistanceStats, distance: Fixed) -> u32 {
    if weapon.splash_radius <= Fixed::ZERO || distance >= weapon.splash_radius {
        return 0;
    }
    let falloff = Fixed::ONE - (distance / weapon.splash_radius);
    let full = calculate_resistance_damage(weapon, target);
    (Fixed::from_num(full) * falloff).to_num::<i32>().max(0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weapon_size_tracking() {
        let light_vs_light = WeaponSize::Light.tracking_modifier_vs(ArmorClass::Light);
        assert_eq!(light_vs_light, Fixed::ONE);

        let heavy_vs_building = WeaponSize::Heavy.tracking_modifier_vs(ArmorClass::Building);
        assert_eq!(
            heavy_vs_building,
            Fixed::from_num(150) / Fixed::from_num(100)
        );
    }

    #[test]
    fn test_damage_type_effectiveness() {
        let kinetic_vs_light = DamageType::Kinetic.effectiveness_vs(ArmorClass::Light);
        assert_eq!(kinetic_vs_light, Fixed::ONE);

        let bio_vs_building = DamageType::BioAcid.effectiveness_vs(ArmorClass::Building);
        assert_eq!(bio_vs_building, Fixed::ZERO);
    }

    #[test]
    fn test_weapon_type_speeds() {
        assert_eq!(WeaponType::Bullet.projectile_speed(), Fixed::from_num(18));
        assert_eq!(WeaponType::Rocket.projectile_speed(), Fixed::from_num(9));
        assert_eq!(WeaponType::Missile.projectile_speed(), Fixed::from_num(28));
        assert!(WeaponType::Missile.is_homing());
        assert!(!WeaponType::Bullet.is_homing());
        assert!(!WeaponType::Rocket.is_homing());
    }

    #[test]
    fn test_resistance_stats_capping() {
        let over_cap = ResistanceStats::new(ArmorClass::Light, 80);
        assert_eq!(over_cap.effective_resistance(), 50);
    }

    #[test]
    fn test_calculate_damage_with_resistance() {
        let weapon = WeaponStats::new(100, DamageType::Energy, WeaponType::Bullet);
        let target = ResistanceStats::new(ArmorClass::Medium, 50);
        assert_eq!(calculate_resistance_damage(&weapon, &target), 50);
    }

    #[test]
    fn test_calculate_damage_with_penetration() {
        let weapon =
            WeaponStats::new(100, DamageType::Energy, WeaponType::Bullet).with_penetration(50);
        let target = ResistanceStats::new(ArmorClass::Medium, 50);
        assert_eq!(calculate_resistance_damage(&weapon, &target), 75);
    }

    #[test]
    fn test_calculate_damage_immunity() {
        let weapon = WeaponStats::new(100, DamageType::BioAcid, WeaponType::Bullet);
        let target = ResistanceStats::new(ArmorClass::Building, 0);
        assert_eq!(calculate_resistance_damage(&weapon, &target), 0);
    }

    #[test]
    fn test_calculate_damage_minimum() {
        let weapon =
            WeaponStats::new(1, DamageType::Kinetic, WeaponType::Bullet).with_size(WeaponSize::Light);
        let target = ResistanceStats::new(ArmorClass::Heavy, 75);
        assert_eq!(calculate_resistance_damage(&weapon, &target), MIN_DAMAGE);
    }

    #[test]
    fn test_splash_falloff_decreases_with_distance() {
        let weapon = WeaponStats::new(100, DamageType::Explosive, WeaponType::Rocket)
            .with_splash_radius(Fixed::from_num(50));
        let target = ResistanceStats::new(ArmorClass::Medium, 0);
        let near = splash_damage(&weapon, &target, Fixed::from_num(10));
        let far = splash_damage(&weapon, &target, Fixed::from_num(40));
        assert!(near > far);
        assert_eq!(splash_damage(&weapon, &target, Fixed::from_num(60)), 0);
    }

    #[test]
    fn test_determinism() {
        let weapon = WeaponStats::new(77, DamageType::Explosive, WeaponType::Rocket)
            .with_size(WeaponSize::Heavy)
            .with_penetration(33);
        let target = ResistanceStats::new(ArmorClass::Heavy, 45);

        for _ in 0..100 {
            assert_eq!(
                calculate_resistance_damage(&weapon, &target),
                calculate_resistance_damage(&weapon, &target)
            );
        }
    }
}
