//! Tagged-union entity model and storage.
//!
//! Replaces an optional-component-per-field record with a `kind` enum that
//! only carries the fields relevant to that entity's role. Shared fields
//! (position, health, owner) live at the top level; role-specific data lives
//! in [`EntityKind`].

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::combat::ArmorClass;
use crate::components::{
    AttackTarget, Building, CombatStats, CommandQueue, DemoCharge, Engineer, Harvester, Health,
    Movement, Owned, PatrolState, Position, Projectile, UnitPath, UnitType, Velocity,
};
use crate::math::{Fixed, Vec2Fixed};

/// Unique identifier for entities.
pub type EntityId = u64;

/// Role-specific data for an entity, per the Data Model (§3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    /// A mobile or stationary combat/utility unit.
    Unit {
        /// Unit role (infantry/vehicle/mech/aircraft).
        unit_type: UnitType,
        /// Combat capability, if any.
        combat: Option<CombatStats>,
        /// Current attack target tracking.
        attack_target: AttackTarget,
        /// Movement capability.
        movement: Movement,
        /// Patrol state, if executing a patrol command.
        patrol: Option<PatrolState>,
        /// Ground-unit waypoint path, if one has been computed (§4.3/§4.4).
        /// Always `None` for airborne units, which steer directly.
        path: Option<UnitPath>,
        /// Harvester cargo/assignment state, if this unit is a harvester.
        harvester: Option<Harvester>,
        /// Engineer ability state, if this unit is an engineer.
        engineer: Option<Engineer>,
        /// Demolition charge payload, if this unit is a demo truck.
        demo_charge: Option<DemoCharge>,
        /// Air base dock slot index, if this is a docked/launched harrier.
        air_slot: Option<u8>,
        /// Whether this unit counts as a Mobile Construction Vehicle for the
        /// purposes of the alive-player check (§4.12).
        is_mcv: bool,
    },
    /// A player-owned structure.
    Building {
        /// Footprint and construction progress.
        building: Building,
        /// Combat capability (turrets), if any.
        combat: Option<CombatStats>,
        /// Current attack target, if this building can attack.
        attack_target: AttackTarget,
        /// Construction progress in ticks, counting up to completion.
        construction_ticks: u32,
        /// Ticks required to finish construction.
        construction_ticks_total: u32,
        /// Whether this is a primary building (conyard/MCV-derived).
        is_primary: bool,
    },
    /// An ore deposit that can be harvested and regrows over time.
    Resource {
        /// Remaining ore units.
        remaining: u32,
        /// Maximum ore capacity (regrowth ceiling).
        capacity: u32,
    },
    /// Impassable terrain obstruction.
    Rock,
    /// A deployed induction rig producing passive income.
    Well {
        /// Owning player id.
        owner: u8,
        /// Credits produced per tick.
        income_rate: u32,
    },
    /// A projectile in flight.
    Projectile(Projectile),
}

impl EntityKind {
    /// Whether this entity kind counts toward a player's "alive" check (§4.12):
    /// buildings and MCV-capable units keep a player alive.
    #[must_use]
    pub fn counts_for_survival(&self) -> bool {
        match self {
            EntityKind::Building { .. } => true,
            EntityKind::Unit { is_mcv, .. } => *is_mcv,
            _ => false,
        }
    }

    /// Default collision radius for this kind, used unless overridden via
    /// [`Entity::with_radius`] (e.g. a rule catalog entry with a custom size).
    #[must_use]
    pub fn default_radius(&self) -> Fixed {
        match self {
            EntityKind::Unit { unit_type, .. } => match unit_type {
                UnitType::Infantry => Fixed::from_num(8),
                UnitType::Vehicle | UnitType::Mech => Fixed::from_num(14),
                UnitType::Aircraft => Fixed::from_num(12),
                UnitType::Structure => Fixed::from_num(40),
            },
            EntityKind::Building { .. } => Fixed::from_num(45),
            EntityKind::Resource { .. } | EntityKind::Rock => Fixed::from_num(10),
            EntityKind::Well { .. } => Fixed::from_num(20),
            EntityKind::Projectile(_) => Fixed::from_num(2),
        }
    }
}

/// An entity in the simulation world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Unique identifier for this entity.
    pub id: EntityId,
    /// World position.
    pub position: Position,
    /// Velocity, zero for immobile entities.
    pub velocity: Velocity,
    /// Health, `None` for entities that cannot take damage (e.g. rocks).
    pub health: Option<Health>,
    /// Ownership, `None` for neutral entities (resources, rocks).
    pub owner: Option<Owned>,
    /// Command queue, only meaningful for player-controlled units.
    pub commands: CommandQueue,
    /// Collision/footprint radius in world units, used by steering,
    /// collision resolution, and splash-damage falloff (§4.4/§4.5/§4.10).
    #[serde(with = "crate::math::fixed_serde")]
    pub radius: Fixed,
    /// Role-specific data.
    pub kind: EntityKind,
}

impl Entity {
    /// Create a new entity of the given kind at `position`, with id `0`
    /// (assigned by [`EntityStorage::insert`]).
    #[must_use]
    pub fn new(position: Vec2Fixed, kind: EntityKind) -> Self {
        let radius = kind.default_radius();
        Self {
            id: 0,
            position: Position::new(position),
            velocity: Velocity::ZERO,
            health: None,
            owner: None,
            commands: CommandQueue::new(),
            radius,
            kind,
        }
    }

    /// Builder method to set owner.
    #[must_use]
    pub const fn with_owner(mut self, owner: Owned) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Builder method to override the default collision radius.
    #[must_use]
    pub const fn with_radius(mut self, radius: Fixed) -> Self {
        self.radius = radius;
        self
    }

    /// Builder method to set health.
    #[must_use]
    pub const fn with_health(mut self, health: Health) -> Self {
        self.health = Some(health);
        self
    }

    /// Whether this entity is dead (has health and it is zero).
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.health.is_some_and(|h| h.is_dead())
    }

    /// Armor class for combat resolution, derived from the entity kind.
    #[must_use]
    pub fn armor_class(&self) -> ArmorClass {
        match &self.kind {
            EntityKind::Unit { unit_type, .. } => unit_type.default_armor_class(),
            EntityKind::Building { .. } => ArmorClass::Building,
            _ => ArmorClass::Light,
        }
    }

    /// Combat stats for this entity, if it can attack.
    #[must_use]
    pub fn combat_stats(&self) -> Option<&CombatStats> {
        match &self.kind {
            EntityKind::Unit { combat, .. } | EntityKind::Building { combat, .. } => {
                combat.as_ref()
            }
            _ => None,
        }
    }

    /// Mutable combat stats for this entity, if it can attack.
    pub fn combat_stats_mut(&mut self) -> Option<&mut CombatStats> {
        match &mut self.kind {
            EntityKind::Unit { combat, .. } | EntityKind::Building { combat, .. } => {
                combat.as_mut()
            }
            _ => None,
        }
    }

    /// Attack target tracking, if this entity can attack.
    #[must_use]
    pub fn attack_target(&self) -> Option<&AttackTarget> {
        match &self.kind {
            EntityKind::Unit { attack_target, .. }
            | EntityKind::Building { attack_target, .. } => Some(attack_target),
            _ => None,
        }
    }

    /// Mutable attack target tracking, if this entity can attack.
    pub fn attack_target_mut(&mut self) -> Option<&mut AttackTarget> {
        match &mut self.kind {
            EntityKind::Unit { attack_target, .. }
            | EntityKind::Building { attack_target, .. } => Some(attack_target),
            _ => None,
        }
    }

    /// Whether this entity is a flying unit.
    #[must_use]
    pub fn is_airborne(&self) -> bool {
        matches!(
            &self.kind,
            EntityKind::Unit {
                unit_type: UnitType::Aircraft,
                ..
            }
        )
    }

    /// Whether this entity is a projectile.
    #[must_use]
    pub fn is_projectile(&self) -> bool {
        matches!(&self.kind, EntityKind::Projectile(_))
    }
}

/// Storage for all entities in the simulation.
///
/// Uses a `HashMap` for O(1) entity lookup by ID, with deterministic
/// iteration via sorted keys when processing systems (§9 Design Notes).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityStorage {
    entities: HashMap<EntityId, Entity>,
    next_id: EntityId,
}

impl EntityStorage {
    /// Create empty entity storage.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entities: HashMap::new(),
            next_id: 1,
        }
    }

    /// Insert a new entity and return its assigned ID.
    pub fn insert(&mut self, mut entity: Entity) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        entity.id = id;
        self.entities.insert(id, entity);
        id
    }

    /// Remove an entity by ID.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    /// Get an entity by ID.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Get a mutable reference to an entity by ID.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Check if an entity exists.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Number of entities currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether storage is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Sorted entity IDs for deterministic iteration.
    #[must_use]
    pub fn sorted_ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<_> = self.entities.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Iterate over all entities (unordered).
    pub fn iter(&self) -> impl Iterator<Item = (&EntityId, &Entity)> {
        self.entities.iter()
    }

    /// Iterate mutably over all entities (unordered).
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&EntityId, &mut Entity)> {
        self.entities.iter_mut()
    }

    /// Fold a deterministic hash of all entity state, keyed by sorted ids.
    ///
    /// Logged only under `#[cfg(debug_assertions)]` by the simulation tick
    /// loop; used by determinism tests to compare two simulation runs.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        for id in self.sorted_ids() {
            let entity = &self.entities[&id];
            id.hash(&mut hasher);
            entity.position.value.x.to_bits().hash(&mut hasher);
            entity.position.value.y.to_bits().hash(&mut hasher);
            if let Some(health) = entity.health {
                health.current.hash(&mut hasher);
            }
        }
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_assigns_sequential_ids() {
        let mut storage = EntityStorage::new();
        let a = storage.insert(Entity::new(Vec2Fixed::ZERO, EntityKind::Rock));
        let b = storage.insert(Entity::new(Vec2Fixed::ZERO, EntityKind::Rock));
        assert_eq!(a, 1);
        assert_eq!(b, 2);
    }

    #[test]
    fn sorted_ids_are_ordered() {
        let mut storage = EntityStorage::new();
        for _ in 0..5 {
            storage.insert(Entity::new(Vec2Fixed::ZERO, EntityKind::Rock));
        }
        let ids = storage.sorted_ids();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn state_hash_deterministic() {
        let mut a = EntityStorage::new();
        let mut b = EntityStorage::new();
        for storage in [&mut a, &mut b] {
            storage.insert(
                Entity::new(Vec2Fixed::new(Default::default(), Default::default()), EntityKind::Rock)
                    .with_health(Health::new(100)),
            );
        }
        assert_eq!(a.state_hash(), b.state_hash());
    }
}
