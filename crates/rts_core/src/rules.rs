//! Read-only rule catalog (§4.1): per-key cost, hp, weapon, production, and
//! prerequisite data for every unit and building kind.
//!
//! The catalog is a static, data-only collaborator — it holds no simulation
//! state and performs no mutation. Entities reference a [`RuleKey`]; the
//! simulation kernel looks up stats from here rather than duplicating them
//! per entity.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::combat::{ArmorClass, DamageType, WeaponSize, WeaponType};
use crate::math::Fixed;

/// Production category, matching the per-player queue categories (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Structures.
    Building,
    /// Foot soldiers.
    Infantry,
    /// Ground vehicles.
    Vehicle,
    /// Aircraft.
    Air,
}

/// A stable key identifying a unit or building kind in the rule catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct RuleKey(pub &'static str);

/// One entry in the rule catalog (§4.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleEntry {
    /// Credits cost.
    pub cost: u32,
    /// Maximum hit points.
    pub hp: u32,
    /// Ticks required to build.
    pub build_time: u32,
    /// Production category this entry belongs to.
    pub category: Category,
    /// Base weapon damage, `0` for non-combat entries.
    pub damage: u32,
    /// Weapon projectile type.
    pub weapon_type: WeaponType,
    /// Weapon size class (tracking modifier).
    pub weapon_size: WeaponSize,
    /// Damage type dealt.
    pub damage_type: DamageType,
    /// Attack cooldown, in ticks.
    pub rate: u32,
    /// Engagement range.
    pub range: Fixed,
    /// Splash radius, zero for single-target weapons.
    pub splash_radius: Fixed,
    /// Target armor class (for units; buildings are always `Building`).
    pub armor_class: ArmorClass,
    /// Base resistance percentage (0-75).
    pub resistance: u8,
    /// Movement speed in units per tick, zero for stationary entities.
    pub speed: Fixed,
    /// Whether this entity flies (ignores ground pathing/terrain).
    pub flies: bool,
    /// Whether this is an anti-air-only weapon (SAM-style turret).
    pub is_defense: bool,
    /// Keys this rule entry can produce (buildings only).
    pub produces: &'static [RuleKey],
    /// Prerequisite building keys required before this can be produced.
    pub prerequisites: &'static [RuleKey],
    /// Maximum number of this kind a single player may own at once, `None` = unlimited.
    pub max_count: Option<u32>,
}

impl RuleEntry {
    const fn base(category: Category, cost: u32, hp: u32, build_time: u32) -> Self {
        Self {
            cost,
            hp,
            build_time,
            category,
            damage: 0,
            weapon_type: WeaponType::Bullet,
            weapon_size: WeaponSize::Medium,
            damage_type: DamageType::Kinetic,
            rate: 30,
            range: Fixed::ZERO,
            splash_radius: Fixed::ZERO,
            armor_class: ArmorClass::Light,
            resistance: 0,
            speed: Fixed::ZERO,
            flies: false,
            is_defense: false,
            produces: &[],
            prerequisites: &[],
            max_count: None,
        }
    }
}

/// The full, read-only rule catalog.
#[derive(Debug, Clone, Default)]
pub struct RuleCatalog {
    entries: HashMap<RuleKey, RuleEntry>,
}

impl RuleCatalog {
    /// Build the standard catalog shipped with the simulation.
    #[must_use]
    pub fn standard() -> Self {
        let mut entries = HashMap::new();

        entries.insert(
            RuleKey("conyard"),
            RuleEntry {
                produces: &[RuleKey("refinery"), RuleKey("barracks"), RuleKey("factory")],
                max_count: Some(1),
                ..RuleEntry::base(Category::Building, 0, 1000, 1)
            },
        );
        entries.insert(
            RuleKey("refinery"),
            RuleEntry {
                prerequisites: &[RuleKey("conyard")],
                ..RuleEntry::base(Category::Building, 2000, 600, 300)
            },
        );
        entries.insert(
            RuleKey("barracks"),
            RuleEntry {
                produces: &[RuleKey("rifleman"), RuleKey("engineer")],
                prerequisites: &[RuleKey("conyard")],
                ..RuleEntry::base(Category::Building, 500, 400, 150)
            },
        );
        entries.insert(
            RuleKey("factory"),
            RuleEntry {
                produces: &[RuleKey("harvester"), RuleKey("tank")],
                prerequisites: &[RuleKey("conyard")],
                ..RuleEntry::base(Category::Building, 1500, 500, 240)
            },
        );
        entries.insert(
            RuleKey("turret"),
            RuleEntry {
                damage: 30,
                weapon_type: WeaponType::Cannon,
                weapon_size: WeaponSize::Medium,
                damage_type: DamageType::Kinetic,
                rate: 20,
                range: Fixed::from_num(120),
                armor_class: ArmorClass::Building,
                resistance: 30,
                prerequisites: &[RuleKey("conyard")],
                ..RuleEntry::base(Category::Building, 800, 300, 180)
            },
        );
        entries.insert(
            RuleKey("sam_site"),
            RuleEntry {
                damage: 40,
                weapon_type: WeaponType::Missile,
                weapon_size: WeaponSize::Light,
                damage_type: DamageType::Explosive,
                rate: 40,
                range: Fixed::from_num(150),
                armor_class: ArmorClass::Building,
                resistance: 30,
                is_defense: true,
                prerequisites: &[RuleKey("conyard")],
                ..RuleEntry::base(Category::Building, 900, 250, 180)
            },
        );
        entries.insert(
            RuleKey("service_depot"),
            RuleEntry {
                prerequisites: &[RuleKey("conyard")],
                ..RuleEntry::base(Category::Building, 700, 400, 180)
            },
        );
        entries.insert(
            RuleKey("air_base"),
            RuleEntry {
                produces: &[RuleKey("harrier")],
                prerequisites: &[RuleKey("conyard")],
                ..RuleEntry::base(Category::Building, 1800, 500, 300)
            },
        );

        entries.insert(
            RuleKey("rifleman"),
            RuleEntry {
                damage: 8,
                weapon_type: WeaponType::Bullet,
                weapon_size: WeaponSize::Light,
                damage_type: DamageType::Kinetic,
                rate: 15,
                range: Fixed::from_num(40),
                armor_class: ArmorClass::Light,
                speed: Fixed::from_num(1),
                ..RuleEntry::base(Category::Infantry, 100, 50, 40)
            },
        );
        entries.insert(
            RuleKey("engineer"),
            RuleEntry {
                armor_class: ArmorClass::Light,
                speed: Fixed::from_num(1),
                ..RuleEntry::base(Category::Infantry, 200, 25, 50)
            },
        );
        entries.insert(
            RuleKey("demo_truck"),
            RuleEntry {
                damage: 400,
                weapon_type: WeaponType::Explosion,
                damage_type: DamageType::Explosive,
                splash_radius: Fixed::from_num(40),
                armor_class: ArmorClass::Medium,
                speed: Fixed::from_num(2),
                ..RuleEntry::base(Category::Vehicle, 600, 80, 120)
            },
        );
        entries.insert(
            RuleKey("harvester"),
            RuleEntry {
                armor_class: ArmorClass::Medium,
                speed: Fixed::from_num(2),
                ..RuleEntry::base(Category::Vehicle, 800, 200, 150)
            },
        );
        entries.insert(
            RuleKey("tank"),
            RuleEntry {
                damage: 45,
                weapon_type: WeaponType::Cannon,
                weapon_size: WeaponSize::Heavy,
                damage_type: DamageType::Kinetic,
                rate: 30,
                range: Fixed::from_num(80),
                armor_class: ArmorClass::Heavy,
                resistance: 25,
                speed: Fixed::from_num(3),
                ..RuleEntry::base(Category::Vehicle, 900, 400, 200)
            },
        );
        entries.insert(
            RuleKey("rocket_buggy"),
            RuleEntry {
                damage: 35,
                weapon_type: WeaponType::Rocket,
                weapon_size: WeaponSize::Medium,
                damage_type: DamageType::Explosive,
                rate: 45,
                range: Fixed::from_num(100),
                splash_radius: Fixed::from_num(15),
                armor_class: ArmorClass::Medium,
                speed: Fixed::from_num(3),
                ..RuleEntry::base(Category::Vehicle, 700, 220, 160)
            },
        );
        entries.insert(
            RuleKey("harrier"),
            RuleEntry {
                damage: 50,
                weapon_type: WeaponType::Missile,
                weapon_size: WeaponSize::Medium,
                damage_type: DamageType::Explosive,
                rate: 40,
                range: Fixed::from_num(60),
                armor_class: ArmorClass::Air,
                speed: Fixed::from_num(6),
                flies: true,
                ..RuleEntry::base(Category::Air, 1200, 150, 200)
            },
        );

        Self { entries }
    }

    /// Look up a rule entry by key.
    #[must_use]
    pub fn get(&self, key: RuleKey) -> Option<&RuleEntry> {
        self.entries.get(&key)
    }

    /// All entries whose `prerequisites` are satisfied by `owned` building keys.
    pub fn available_from(&self, owned: &[RuleKey]) -> impl Iterator<Item = (&RuleKey, &RuleEntry)> {
        self.entries.iter().filter(move |(_, entry)| {
            entry
                .prerequisites
                .iter()
                .all(|req| owned.contains(req))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_has_conyard() {
        let catalog = RuleCatalog::standard();
        let conyard = catalog.get(RuleKey("conyard")).unwrap();
        assert_eq!(conyard.max_count, Some(1));
    }

    #[test]
    fn prerequisite_filtering() {
        let catalog = RuleCatalog::standard();
        let without_conyard: Vec<_> = catalog.available_from(&[]).collect();
        assert!(without_conyard
            .iter()
            .any(|(k, _)| **k == RuleKey("conyard")));
        assert!(!without_conyard.iter().any(|(k, _)| **k == RuleKey("refinery")));

        let with_conyard: Vec<_> = catalog.available_from(&[RuleKey("conyard")]).collect();
        assert!(with_conyard.iter().any(|(k, _)| **k == RuleKey("refinery")));
    }
}
