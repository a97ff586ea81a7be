//! Shared value types used by entity records.
//!
//! These are pure data with no behavior beyond small helper methods. The
//! tagged-union [`crate::entities::Entity`] variants are built out of these.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::combat::{ArmorClass, DamageType, ResistanceStats, WeaponSize, WeaponStats, WeaponType};
use crate::factions::FactionId;
use crate::math::{fixed_serde, Fixed, Vec2Fixed};

/// Unique identifier for entities.
pub type EntityId = u64;

/// Position component in world space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// World position.
    pub value: Vec2Fixed,
}

impl Position {
    /// Create a new position at the given coordinates.
    #[must_use]
    pub const fn new(value: Vec2Fixed) -> Self {
        Self { value }
    }

    /// Create a position at the origin.
    pub const ORIGIN: Self = Self {
        value: Vec2Fixed::ZERO,
    };
}

/// Velocity component for moving entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Velocity {
    /// Velocity vector (units per tick).
    pub value: Vec2Fixed,
}

impl Velocity {
    /// Create a new velocity.
    #[must_use]
    pub const fn new(value: Vec2Fixed) -> Self {
        Self { value }
    }

    /// Zero velocity (stationary).
    pub const ZERO: Self = Self {
        value: Vec2Fixed::ZERO,
    };

    /// Check if the entity is stationary.
    #[must_use]
    pub fn is_stationary(&self) -> bool {
        self.value.x == Fixed::ZERO && self.value.y == Fixed::ZERO
    }
}

/// Type classification for units.
///
/// Determines movement capabilities, terrain interaction, and
/// what weapons can target this unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitType {
    /// Ground infantry units - slow, can traverse rough terrain.
    Infantry,
    /// Ground vehicles - faster, restricted to roads/open terrain.
    Vehicle,
    /// Mechs - versatile bipedal units, can traverse most terrain.
    Mech,
    /// Aircraft - ignore ground terrain, require anti-air to counter.
    Aircraft,
    /// Stationary structures - buildings, turrets, walls.
    Structure,
}

impl UnitType {
    /// Check if this unit type can fly.
    #[must_use]
    pub const fn is_airborne(&self) -> bool {
        matches!(self, Self::Aircraft)
    }

    /// Check if this unit type is mobile.
    #[must_use]
    pub const fn is_mobile(&self) -> bool {
        !matches!(self, Self::Structure)
    }

    /// Check if this is a ground unit.
    #[must_use]
    pub const fn is_ground(&self) -> bool {
        matches!(self, Self::Infantry | Self::Vehicle | Self::Mech)
    }

    /// Default armor class for this unit type, used when a rule entry
    /// doesn't override it (§4.1).
    #[must_use]
    pub const fn default_armor_class(&self) -> ArmorClass {
        match self {
            Self::Infantry => ArmorClass::Light,
            Self::Vehicle => ArmorClass::Medium,
            Self::Mech => ArmorClass::Heavy,
            Self::Aircraft => ArmorClass::Air,
            Self::Structure => ArmorClass::Building,
        }
    }
}

/// Marker component for entities that can be selected by the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Selectable;

/// Marker component for entities currently selected by the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Selected;

/// A command that can be issued to a unit, per §6's external interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Move to a target position.
    MoveTo(Vec2Fixed),
    /// Attack a specific entity.
    Attack(EntityId),
    /// Attack-move to a position (engage enemies along the way).
    AttackMove(Vec2Fixed),
    /// Hold position and engage nearby enemies.
    HoldPosition,
    /// Stop all actions.
    Stop,
    /// Patrol between current position and target.
    Patrol(Vec2Fixed),
    /// Follow another unit.
    Follow(EntityId),
    /// Guard another unit (attack anything that attacks it).
    Guard(EntityId),
    /// Harvest a specific resource entity.
    Harvest(EntityId),
    /// Capture a specific building (engineer-only).
    Capture(EntityId),
    /// Repair a specific building (engineer-only).
    RepairTarget(EntityId),
}

/// Queue of commands for a unit to execute.
///
/// Commands are executed in order. Units process the front command
/// until complete, then move to the next.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommandQueue {
    /// The queue of pending commands.
    pub commands: VecDeque<Command>,
}

impl CommandQueue {
    /// Create an empty command queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            commands: VecDeque::new(),
        }
    }

    /// Add a command to the back of the queue.
    pub fn push(&mut self, command: Command) {
        self.commands.push_back(command);
    }

    /// Replace all commands with a single new command.
    pub fn set(&mut self, command: Command) {
        self.commands.clear();
        self.commands.push_back(command);
    }

    /// Get the current command being executed.
    #[must_use]
    pub fn current(&self) -> Option<&Command> {
        self.commands.front()
    }

    /// Remove and return the current command (when completed).
    pub fn pop(&mut self) -> Option<Command> {
        self.commands.pop_front()
    }

    /// Clear all commands.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Check if the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Get the number of queued commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }
}

/// Component for tracking the current attack target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackTarget {
    /// The entity being targeted for attack.
    pub target: Option<EntityId>,
    /// Ticks until the unit can attack again.
    pub cooldown: u32,
}

impl AttackTarget {
    /// Create a new attack target component with no target.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            target: None,
            cooldown: 0,
        }
    }

    /// Create with a specific target.
    #[must_use]
    pub const fn with_target(target: EntityId) -> Self {
        Self {
            target: Some(target),
            cooldown: 0,
        }
    }

    /// Check if ready to attack.
    #[must_use]
    pub const fn can_attack(&self) -> bool {
        self.cooldown == 0
    }

    /// Tick down the cooldown.
    pub fn tick(&mut self) {
        if self.cooldown > 0 {
            self.cooldown -= 1;
        }
    }

    /// Clear the current target.
    pub fn clear(&mut self) {
        self.target = None;
    }
}

impl Default for AttackTarget {
    fn default() -> Self {
        Self::new()
    }
}

/// Movement component for mobile units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    /// Movement speed in units per tick.
    #[serde(with = "fixed_serde")]
    pub speed: Fixed,
    /// Current movement target (if any).
    pub target: Option<Vec2Fixed>,
    /// Exponential moving average of recent velocity, used by the stuck
    /// detector in the steering system (§4.4).
    pub avg_velocity: Vec2Fixed,
    /// Ticks spent with near-zero displacement while a target is set.
    pub stuck_ticks: u32,
    /// Whether the unit is currently in unstuck (random-walk) mode.
    pub unstuck_mode: bool,
}

impl Default for Movement {
    fn default() -> Self {
        Self {
            speed: Fixed::from_num(2),
            target: None,
            avg_velocity: Vec2Fixed::ZERO,
            stuck_ticks: 0,
            unstuck_mode: false,
        }
    }
}

/// Ground-unit path state: a waypoint polyline from the pathfinding grid
/// (§4.3), the index of the next unconsumed waypoint, and the tick of the
/// last repath (staggers expensive recomputation per §4.3/§4.4).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UnitPath {
    /// Waypoints from current position toward the move target.
    pub waypoints: Vec<Vec2Fixed>,
    /// Index of the next waypoint not yet consumed.
    pub index: usize,
    /// Tick at which this path was last (re)computed.
    pub last_repath_tick: u64,
}

impl UnitPath {
    /// An empty path.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index >= self.waypoints.len()
    }

    /// The next waypoint to steer toward, if any remain.
    #[must_use]
    pub fn current_waypoint(&self) -> Option<Vec2Fixed> {
        self.waypoints.get(self.index).copied()
    }

    /// Advance past the current waypoint.
    pub fn advance(&mut self) {
        self.index += 1;
    }

    /// Clear the path entirely.
    pub fn clear(&mut self) {
        self.waypoints.clear();
        self.index = 0;
    }
}

/// Component tracking patrol behavior between two points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatrolState {
    /// Patrol origin (starting point).
    pub origin: Vec2Fixed,
    /// Patrol target (destination point).
    pub target: Vec2Fixed,
    /// Whether the unit is heading toward the target.
    pub heading_to_target: bool,
}

/// Health component for damageable entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    /// Current health points.
    pub current: u32,
    /// Maximum health points.
    pub max: u32,
    /// Remaining ticks of "flash" (recently-hit) visual state (§4.10).
    pub flash: u8,
    /// Entity id that last damaged this entity, if any.
    pub last_attacker: Option<EntityId>,
    /// Tick of the last damage event applied to this entity.
    pub last_damage_tick: Option<u64>,
}

impl Health {
    /// Create new health component at full health.
    #[must_use]
    pub const fn new(max: u32) -> Self {
        Self {
            current: max,
            max,
            flash: 0,
            last_attacker: None,
            last_damage_tick: None,
        }
    }

    /// Check if entity is dead (health == 0).
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.current == 0
    }

    /// Check if entity is at full health.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.current >= self.max
    }

    /// Apply damage, returning actual damage dealt. Records flash state,
    /// last attacker, and last damage tick (§4.10).
    pub fn apply_damage(&mut self, amount: u32, attacker: EntityId, tick: u64) -> u32 {
        let actual = amount.min(self.current);
        self.current = self.current.saturating_sub(actual);
        self.flash = 5;
        self.last_attacker = Some(attacker);
        self.last_damage_tick = Some(tick);
        actual
    }

    /// Heal the entity, returning actual amount healed.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let headroom = self.max.saturating_sub(self.current);
        let actual = amount.min(headroom);
        self.current = self.current.saturating_add(actual);
        actual
    }

    /// Tick down the flash timer.
    pub fn tick_flash(&mut self) {
        if self.flash > 0 {
            self.flash -= 1;
        }
    }

    /// Get health as a percentage (0-100).
    #[must_use]
    pub fn percentage(&self) -> u32 {
        if self.max == 0 {
            0
        } else {
            (self.current * 100) / self.max
        }
    }
}

/// Faction/player ownership component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owned {
    /// Owning faction (flavor/display only).
    pub faction: FactionId,
    /// Owning player id.
    pub player: u8,
}

/// Combat stats component: weapon + armor data attached to an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatStats {
    /// Base attack damage.
    pub damage: u32,
    /// Type of damage this unit deals.
    pub damage_type: DamageType,
    /// Projectile kind fired by this weapon (§4.9).
    pub weapon_type: WeaponType,
    /// Attack range in world units.
    #[serde(with = "fixed_serde")]
    pub range: Fixed,
    /// Attack cooldown in ticks.
    pub attack_cooldown: u32,
    /// Current cooldown remaining.
    pub cooldown_remaining: u32,
    /// Armor class for resistance-based damage.
    pub armor_class: ArmorClass,
    /// Resistance percentage (0-75) for damage reduction.
    pub resistance: u8,
    /// Armor penetration percentage (0-100), ignores target resistance.
    pub armor_penetration: u8,
    /// Weapon size class affects tracking vs different armor classes.
    pub weapon_size: WeaponSize,
    /// Splash damage radius (0 = single-target).
    #[serde(with = "fixed_serde")]
    pub splash_radius: Fixed,
    /// Whether this weapon only engages airborne targets (SAM-style).
    pub air_only: bool,
}

impl CombatStats {
    /// Create new combat stats with default types.
    #[must_use]
    pub fn new(damage: u32, range: Fixed, attack_cooldown: u32) -> Self {
        Self {
            damage,
            damage_type: DamageType::Kinetic,
            weapon_type: WeaponType::Bullet,
            range,
            attack_cooldown,
            cooldown_remaining: 0,
            armor_class: ArmorClass::Light,
            resistance: 0,
            armor_penetration: 0,
            weapon_size: WeaponSize::Medium,
            splash_radius: Fixed::ZERO,
            air_only: false,
        }
    }

    /// Builder method to set damage type.
    #[must_use]
    pub const fn with_damage_type(mut self, damage_type: DamageType) -> Self {
        self.damage_type = damage_type;
        self
    }

    /// Builder method to set weapon type.
    #[must_use]
    pub const fn with_weapon_type(mut self, weapon_type: WeaponType) -> Self {
        self.weapon_type = weapon_type;
        self
    }

    /// Builder method to set splash damage radius.
    #[must_use]
    pub fn with_splash_radius(mut self, radius: Fixed) -> Self {
        self.splash_radius = radius;
        self
    }

    /// Builder method to set armor class and resistance.
    #[must_use]
    pub const fn with_resistance(mut self, armor_class: ArmorClass, resistance: u8) -> Self {
        self.armor_class = armor_class;
        self.resistance = if resistance > 75 { 75 } else { resistance };
        self
    }

    /// Builder method to set armor penetration.
    #[must_use]
    pub const fn with_armor_penetration(mut self, penetration: u8) -> Self {
        self.armor_penetration = if penetration > 100 { 100 } else { penetration };
        self
    }

    /// Builder method to set weapon size.
    #[must_use]
    pub const fn with_weapon_size(mut self, size: WeaponSize) -> Self {
        self.weapon_size = size;
        self
    }

    /// Builder method to mark this weapon as anti-air only.
    #[must_use]
    pub const fn with_air_only(mut self, air_only: bool) -> Self {
        self.air_only = air_only;
        self
    }

    /// Whether this weapon uses a traveling projectile (as opposed to instant hit).
    #[must_use]
    pub fn uses_projectiles(&self) -> bool {
        !matches!(self.weapon_type, WeaponType::Explosion)
    }

    /// Check if ready to attack.
    #[must_use]
    pub const fn can_attack(&self) -> bool {
        self.cooldown_remaining == 0
    }

    /// Reset cooldown after attacking.
    pub fn reset_cooldown(&mut self) {
        self.cooldown_remaining = self.attack_cooldown;
    }

    /// Tick down the cooldown by one.
    pub fn tick_cooldown(&mut self) {
        if self.cooldown_remaining > 0 {
            self.cooldown_remaining -= 1;
        }
    }

    /// Convert to [`WeaponStats`] for resistance-based damage calculation.
    #[must_use]
    pub fn to_weapon_stats(&self) -> WeaponStats {
        WeaponStats::new(self.damage, self.damage_type, self.weapon_type)
            .with_size(self.weapon_size)
            .with_penetration(self.armor_penetration)
            .with_range(self.range)
            .with_rate(self.attack_cooldown)
            .with_splash_radius(self.splash_radius)
    }

    /// Convert to [`ResistanceStats`] for resistance-based damage calculation.
    #[must_use]
    pub fn to_resistance_stats(&self) -> ResistanceStats {
        ResistanceStats::new(self.armor_class, self.resistance)
    }
}

impl Default for CombatStats {
    fn default() -> Self {
        Self::new(10, Fixed::from_num(5), 30)
    }
}

/// A projectile in flight toward a target.
///
/// Only [`WeaponType::Missile`] projectiles re-aim toward a live `target`
/// entity every tick; every other weapon type keeps the velocity it
/// launched with toward `target_position` (§4.9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projectile {
    /// Entity that fired this projectile.
    pub source: EntityId,
    /// Entity the projectile is chasing, if it homes.
    pub target: Option<EntityId>,
    /// Position the projectile is traveling toward (updated each tick for homing).
    pub target_position: Vec2Fixed,
    /// Damage to deal on impact.
    pub damage: u32,
    /// Type of damage.
    pub damage_type: DamageType,
    /// Projectile kind (determines homing behavior and speed).
    pub weapon_type: WeaponType,
    /// Travel speed per tick.
    #[serde(with = "fixed_serde")]
    pub speed: Fixed,
    /// Splash damage radius (0 = single target).
    #[serde(with = "fixed_serde")]
    pub splash_radius: Fixed,
    /// Owning player, for friendly-fire exclusion on splash.
    pub owner: u8,
}

impl Projectile {
    /// Create a new projectile.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source: EntityId,
        target: Option<EntityId>,
        target_position: Vec2Fixed,
        damage: u32,
        damage_type: DamageType,
        weapon_type: WeaponType,
        splash_radius: Fixed,
        owner: u8,
    ) -> Self {
        Self {
            source,
            target,
            target_position,
            damage,
            damage_type,
            weapon_type,
            speed: weapon_type.projectile_speed(),
            splash_radius,
            owner,
        }
    }

    /// Whether this projectile re-aims toward its target entity each tick.
    #[must_use]
    pub const fn is_homing(&self) -> bool {
        self.weapon_type.is_homing() && self.target.is_some()
    }
}

/// Marker component for buildings (footprint in grid cells).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    /// Building footprint width.
    pub width: u8,
    /// Building footprint height.
    pub height: u8,
}

/// Harvester cargo and assignment state (§4.8, §4.15).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Harvester {
    /// Current ore carried, `0..=500`.
    pub cargo: u32,
    /// Resource entity currently targeted, if any.
    pub resource_target: Option<EntityId>,
    /// Refinery/base entity currently targeted for unloading, if any.
    pub base_target: Option<EntityId>,
}

impl Harvester {
    /// Maximum cargo capacity.
    pub const MAX_CARGO: u32 = 500;

    /// Create an empty harvester with no assignment.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cargo: 0,
            resource_target: None,
            base_target: None,
        }
    }

    /// Whether the harvester is full and should return to base.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.cargo >= Self::MAX_CARGO
    }
}

impl Default for Harvester {
    fn default() -> Self {
        Self::new()
    }
}

/// Engineer ability state (§4.11).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Engineer {
    /// Building currently queued to capture or repair, if any.
    pub target: Option<EntityId>,
    /// Whether `target` is a capture (true) or repair (false) order.
    pub capturing: bool,
}

/// Demolition truck payload: a timed self-detonation that can only fire once
/// (§4.10).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoCharge {
    /// Blast radius.
    #[serde(with = "fixed_serde")]
    pub radius: Fixed,
    /// Damage dealt at the charge's center, falling off with distance.
    pub damage: u32,
    /// Whether the charge has already detonated.
    pub detonated: bool,
}
