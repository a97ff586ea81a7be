//! Core simulation loop (§2, §9): the deterministic per-tick kernel that
//! owns all world state and drives every subsystem in a fixed phase order.
//!
//! ```
//! use rts_core::prelude::*;
//! use rts_core::simulation::EntitySpawnParams;
//!
//! let mut sim = Simulation::new();
//! let owner = Owned { faction: FactionId::Continuity, player: 0 };
//! sim.add_player(PlayerState::new(0, FactionId::Continuity, 5000));
//!
//! let mcv = sim.spawn_mcv(owner, Vec2Fixed::ZERO);
//! sim.apply_command(mcv, Command::MoveTo(Vec2Fixed::new(Fixed::from_num(50), Fixed::ZERO))).unwrap();
//! let _events = sim.tick();
//! assert_eq!(sim.get_tick(), 1);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::ai::actions::{self, AiContext};
use crate::ai::investment::{self, InvestmentCandidate};
use crate::ai::strategy::{self, StrategyInputs};
use crate::ai::threat;
use crate::ai::{Action, ActionError, AIWorld, Personality};
use crate::buildings::{self, BuildingFootprint, PlacementGrid, TurretCandidate};
use crate::collision::{self, Body};
use crate::combat::{
    calculate_resistance_damage, ArmorClass, CombatStats, DamageType, ResistanceStats, WeaponStats,
    WeaponType,
};
use crate::components::{
    AttackTarget, Command, DemoCharge, Engineer, Harvester, Health, Movement, Owned, PatrolState,
    Position, Projectile, UnitType, Velocity,
};
use crate::damage::{self, DamageEvent};
use crate::engineer::{self, EngineerOutcome};
use crate::entities::{Entity, EntityId, EntityKind, EntityStorage};
use crate::error::{GameError, Result};
use crate::math::{Fixed, Vec2Fixed};
use crate::pathfinding::NavGrid;
use crate::players::PlayerState;
use crate::production;
use crate::projectiles::{self, ProjectileOutcome};
use crate::reducers::{self, ReducerState};
use crate::rules::{Category, RuleCatalog, RuleEntry, RuleKey};
use crate::spatial::SpatialGrid;
use crate::steering::{self, Neighbor};
use crate::victory::{self, VictoryState};

/// Simulation ticks per second (§2).
pub const TICK_RATE: u32 = 20;

/// Milliseconds per tick, derived from [`TICK_RATE`].
pub const TICK_DURATION_MS: u32 = 1000 / TICK_RATE;

const WORLD_WIDTH_CELLS: u32 = 300;
const WORLD_HEIGHT_CELLS: u32 = 300;
const WORLD_CELL_SIZE: i32 = 10;

/// Squared distance under which a unit counts as "arrived" for
/// patrol/move-to-waypoint proximity checks.
const ARRIVAL_THRESHOLD_SQ: Fixed = Fixed::from_bits(4 << 32);

/// How far the steering avoidance pass looks for neighbors to avoid.
const NEIGHBOR_QUERY_RADIUS: Fixed = Fixed::from_bits(60 << 32);

/// Harvesters/engineers close enough to their work target count as arrived.
const WORK_RANGE: Fixed = Fixed::from_bits(15 << 32);

/// Harvester unload proximity to a primary building.
const UNLOAD_RANGE: Fixed = Fixed::from_bits(20 << 32);

/// Harvesters a player's economy score treats as "fully staffed" (§4.14).
const DESIRED_HARVESTERS: u32 = 4;

/// Ore patch size when a depleted-to-capacity well spawns a fresh patch (§4.8).
const RESOURCE_PATCH_CAPACITY: u32 = 1000;

/// Roughly 1-in-this-many chance per tick that a capped well spawns a new patch.
const PATCH_SPAWN_CHANCE: u64 = 500;

/// Parameters for [`Simulation::spawn_entity`]: the minimum needed to build
/// an [`Entity`] of a given [`EntityKind`], with optional owner/health/radius
/// overrides applied the same way [`Entity`]'s own builder methods would.
#[derive(Debug, Clone)]
pub struct EntitySpawnParams {
    /// World position to spawn at.
    pub position: Vec2Fixed,
    /// Role-specific entity data.
    pub kind: EntityKind,
    /// Owning player, if any.
    pub owner: Option<Owned>,
    /// Starting health, if any.
    pub health: Option<Health>,
    /// Collision radius override, if any (defaults to [`EntityKind::default_radius`]).
    pub radius: Option<Fixed>,
}

impl EntitySpawnParams {
    /// Create spawn parameters for `kind` at `position` with no overrides.
    #[must_use]
    pub fn new(position: Vec2Fixed, kind: EntityKind) -> Self {
        Self {
            position,
            kind,
            owner: None,
            health: None,
            radius: None,
        }
    }

    /// Builder method to set the owner.
    #[must_use]
    pub fn with_owner(mut self, owner: Owned) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Builder method to set starting health.
    #[must_use]
    pub fn with_health(mut self, health: Health) -> Self {
        self.health = Some(health);
        self
    }

    /// Builder method to override the collision radius.
    #[must_use]
    pub fn with_radius(mut self, radius: Fixed) -> Self {
        self.radius = Some(radius);
        self
    }
}

impl Default for EntitySpawnParams {
    fn default() -> Self {
        Self::new(Vec2Fixed::ZERO, EntityKind::Rock)
    }
}

/// Everything that happened during one [`Simulation::tick`] call, for
/// replay/UI consumption.
#[derive(Debug, Clone)]
pub struct TickEvents {
    /// Entities removed this tick (combat deaths, chain-reaction kills,
    /// elimination cleanup). Does not include despawned projectiles.
    pub deaths: Vec<EntityId>,
    /// Entities spawned this tick by completed unit/aircraft production.
    pub spawned: Vec<EntityId>,
    /// `(player, category, key)` for every production item that finished.
    pub completed_production: Vec<(u8, Category, RuleKey)>,
    /// Buildings whose construction just finished this tick.
    pub construction_complete: Vec<EntityId>,
    /// Match outcome as of the end of this tick (§4.12).
    pub victory: VictoryState,
}

impl Default for TickEvents {
    fn default() -> Self {
        Self {
            deaths: Vec::new(),
            spawned: Vec::new(),
            completed_production: Vec::new(),
            construction_complete: Vec::new(),
            victory: VictoryState::Ongoing,
        }
    }
}

/// The deterministic game simulation: all world state, advanced one fixed
/// phase order per [`Simulation::tick`] call (§2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Simulation {
    tick: u64,
    entities: EntityStorage,
    players: HashMap<u8, PlayerState>,
    #[serde(skip, default = "RuleCatalog::standard")]
    catalog: RuleCatalog,
    placement_grid: PlacementGrid,
    nav_grid: NavGrid,
    #[serde(skip)]
    spatial: SpatialGrid,
    ai_world: AIWorld,
}

impl Simulation {
    /// Create an empty simulation with no players or entities.
    #[must_use]
    pub fn new() -> Self {
        let cell_size = Fixed::from_num(WORLD_CELL_SIZE);
        Self {
            tick: 0,
            entities: EntityStorage::new(),
            players: HashMap::new(),
            catalog: RuleCatalog::standard(),
            placement_grid: PlacementGrid::new(WORLD_WIDTH_CELLS, WORLD_HEIGHT_CELLS, cell_size),
            nav_grid: NavGrid::new(WORLD_WIDTH_CELLS, WORLD_HEIGHT_CELLS, cell_size),
            spatial: SpatialGrid::new(),
            ai_world: AIWorld::new(),
        }
    }

    /// Register a player for the match.
    pub fn add_player(&mut self, player: PlayerState) {
        self.players.insert(player.id, player);
    }

    /// Look up a player's state.
    #[must_use]
    pub fn player(&self, id: u8) -> Option<&PlayerState> {
        self.players.get(&id)
    }

    /// Mutably look up a player's state.
    pub fn player_mut(&mut self, id: u8) -> Option<&mut PlayerState> {
        self.players.get_mut(&id)
    }

    /// Current tick count.
    #[must_use]
    pub const fn get_tick(&self) -> u64 {
        self.tick
    }

    /// Read-only access to all entities.
    #[must_use]
    pub fn entities(&self) -> &EntityStorage {
        &self.entities
    }

    /// Look up a single entity.
    #[must_use]
    pub fn get_entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Spawn a new entity, returning its assigned id.
    pub fn spawn_entity(&mut self, params: EntitySpawnParams) -> EntityId {
        let mut entity = Entity::new(params.position, params.kind);
        if let Some(owner) = params.owner {
            entity = entity.with_owner(owner);
        }
        if let Some(health) = params.health {
            entity = entity.with_health(health);
        }
        if let Some(radius) = params.radius {
            entity = entity.with_radius(radius);
        }
        self.entities.insert(entity)
    }

    /// Spawn a Mobile Construction Vehicle for `owner` at `position`, the
    /// usual starting asset for a new player (§4.12: MCVs count toward the
    /// alive-player check the same as buildings do).
    pub fn spawn_mcv(&mut self, owner: Owned, position: Vec2Fixed) -> EntityId {
        let kind = EntityKind::Unit {
            unit_type: UnitType::Vehicle,
            combat: None,
            attack_target: AttackTarget::new(),
            movement: Movement::default(),
            patrol: None,
            path: None,
            harvester: None,
            engineer: None,
            demo_charge: None,
            air_slot: None,
            is_mcv: true,
        };
        let entity = Entity::new(position, kind)
            .with_owner(owner)
            .with_health(Health::new(600));
        self.entities.insert(entity)
    }

    /// Remove an entity.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::EntityNotFound`] if `id` does not exist.
    pub fn despawn_entity(&mut self, id: EntityId) -> Result<()> {
        self.entities
            .remove(id)
            .map(|_| ())
            .ok_or(GameError::EntityNotFound(id))
    }

    /// Replace `entity`'s command queue with a single command.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::EntityNotFound`] if `entity` does not exist.
    pub fn apply_command(&mut self, entity: EntityId, command: Command) -> Result<()> {
        let e = self
            .entities
            .get_mut(entity)
            .ok_or(GameError::EntityNotFound(entity))?;
        e.commands.set(command);
        Ok(())
    }

    /// Append a command to the back of `entity`'s queue.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::EntityNotFound`] if `entity` does not exist.
    pub fn queue_command(&mut self, entity: EntityId, command: Command) -> Result<()> {
        let e = self
            .entities
            .get_mut(entity)
            .ok_or(GameError::EntityNotFound(entity))?;
        e.commands.push(command);
        Ok(())
    }

    /// Set `entity`'s current attack target directly, bypassing the command queue.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::EntityNotFound`] if `entity` does not exist, or
    /// [`GameError::InvalidState`] if it has no attack-target tracking.
    pub fn set_attack_target(&mut self, entity: EntityId, target: EntityId) -> Result<()> {
        let e = self
            .entities
            .get_mut(entity)
            .ok_or(GameError::EntityNotFound(entity))?;
        let at = e
            .attack_target_mut()
            .ok_or_else(|| GameError::InvalidState(format!("entity {entity} cannot attack")))?;
        at.target = Some(target);
        Ok(())
    }

    /// Submit an action through the same external interface an AI or a human
    /// player uses (§6), delegating to [`reducers::apply_action`].
    ///
    /// # Errors
    ///
    /// Returns [`ActionError`] if the action's preconditions are not met.
    pub fn submit_action(&mut self, action: Action) -> std::result::Result<(), ActionError> {
        let mut state = ReducerState {
            entities: &mut self.entities,
            players: &mut self.players,
            catalog: &self.catalog,
            placement_grid: &mut self.placement_grid,
            nav_grid: &mut self.nav_grid,
        };
        reducers::apply_action(&mut state, action)
    }

    /// Deterministic hash of the full simulation state, combining the tick
    /// counter with [`EntityStorage::state_hash`] (§9: used to detect desyncs).
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.tick.hash(&mut hasher);
        self.entities.state_hash().hash(&mut hasher);
        hasher.finish()
    }

    /// Serialize the full simulation state.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::DataParseError`] if encoding fails.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| GameError::DataParseError {
            path: "simulation".into(),
            message: e.to_string(),
        })
    }

    /// Deserialize a simulation previously produced by [`Simulation::serialize`].
    ///
    /// # Errors
    ///
    /// Returns [`GameError::DataParseError`] if decoding fails.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        let mut sim: Self = bincode::deserialize(data).map_err(|e| GameError::DataParseError {
            path: "simulation".into(),
            message: e.to_string(),
        })?;
        sim.spatial.rebuild(&sim.entities);
        Ok(sim)
    }

    /// Advance the simulation by one tick, in the fixed phase order (§2):
    ///
    /// 1. Rebuild the spatial index from last tick's final state.
    /// 2. Production: advance queues, spawn completed units.
    /// 3. Rebuild the spatial index again so freshly spawned units are visible.
    /// 4. Wells: ore regrowth/patch spawning, induction rig income.
    /// 5. AI think pass for each AI player.
    /// 6. Command resolution: movement, harvesting, engineer actions.
    /// 7. Position integration from resolved velocities.
    /// 8. Combat: target acquisition and attack resolution (incl. turrets).
    /// 9. Collision relaxation.
    /// 10. Projectile flight and impact damage.
    /// 11. Damage application and demo-charge chain reactions.
    /// 12. Construction progress.
    /// 13. Rebuild the spatial index, elimination cleanup, victory check.
    pub fn tick(&mut self) -> TickEvents {
        let mut events = TickEvents::default();

        self.spatial.rebuild(&self.entities);
        self.tick_production(&mut events);
        self.spatial.rebuild(&self.entities);

        self.tick_wells();
        self.think_ai();
        self.resolve_commands();
        self.integrate_positions();

        let mut damage_events = self.resolve_combat();
        self.resolve_collision();
        damage_events.extend(self.advance_projectiles());
        self.apply_damage_events(damage_events);

        self.advance_construction(&mut events);

        self.spatial.rebuild(&self.entities);
        self.cleanup_deaths(&mut events);
        self.check_victory(&mut events);

        self.tick += 1;
        events
    }

    fn tick_production(&mut self, events: &mut TickEvents) {
        let player_ids: Vec<u8> = self.players.keys().copied().collect();
        for player_id in player_ids {
            let Some(speed_percent) = self.players.get(&player_id).map(PlayerState::production_speed_percent) else {
                continue;
            };
            let completed = {
                let Some(player) = self.players.get_mut(&player_id) else { continue };
                player.production.tick(speed_percent, &mut player.credits)
            };
            for (category, key) in completed {
                events.completed_production.push((player_id, category, key));
                if let Some(id) = self.spawn_from_rule(player_id, key) {
                    events.spawned.push(id);
                }
            }
        }
    }

    fn spawn_from_rule(&mut self, player_id: u8, key: RuleKey) -> Option<EntityId> {
        let entry: RuleEntry = self.catalog.get(key)?.clone();
        let player = self.players.get(&player_id)?;
        let faction = player.faction;

        let spawn_position = player
            .primary_buildings
            .first()
            .and_then(|&id| self.entities.get(id))
            .map_or(Vec2Fixed::ZERO, |building| {
                production::spawn_position(building.position.value, None)
            });

        let unit_type = match entry.category {
            Category::Infantry => UnitType::Infantry,
            Category::Vehicle => UnitType::Vehicle,
            Category::Air => UnitType::Aircraft,
            Category::Building => return None, // waits for an explicit PlaceBuilding action
        };

        let is_demo_truck = key == RuleKey("demo_truck");
        let combat = (!is_demo_truck && entry.damage > 0).then(|| {
            CombatStats::new(entry.damage, entry.range, entry.rate)
                .with_damage_type(entry.damage_type)
                .with_weapon_type(entry.weapon_type)
                .with_weapon_size(entry.weapon_size)
                .with_resistance(entry.armor_class, entry.resistance)
                .with_splash_radius(entry.splash_radius)
        });

        let kind = EntityKind::Unit {
            unit_type,
            combat,
            attack_target: AttackTarget::new(),
            movement: Movement {
                speed: entry.speed,
                ..Movement::default()
            },
            patrol: None,
            path: None,
            harvester: (key == RuleKey("harvester")).then(Harvester::new),
            engineer: (key == RuleKey("engineer")).then(Engineer::default),
            demo_charge: is_demo_truck.then(|| DemoCharge {
                radius: entry.splash_radius,
                damage: entry.damage,
                detonated: false,
            }),
            air_slot: None,
            is_mcv: false,
        };

        let entity = Entity::new(spawn_position, kind)
            .with_owner(Owned { faction, player: player_id })
            .with_health(Health::new(entry.hp));
        Some(self.entities.insert(entity))
    }

    fn tick_wells(&mut self) {
        let ids = self.entities.sorted_ids();
        let mut spawn_requests: Vec<(EntityId, Vec2Fixed)> = Vec::new();

        for id in &ids {
            let Some(entity) = self.entities.get_mut(*id) else { continue };
            match &mut entity.kind {
                EntityKind::Resource { remaining, capacity } => {
                    crate::wells::tick_regrowth(remaining, *capacity);
                    if crate::wells::should_spawn_patch(*remaining, *capacity, *id, self.tick, PATCH_SPAWN_CHANCE) {
                        spawn_requests.push((*id, entity.position.value));
                    }
                }
                EntityKind::Well { owner, .. } => {
                    let owner = *owner;
                    if let Some(player) = self.players.get_mut(&owner) {
                        let active = player.has_power_headroom();
                        player.credits += crate::wells::induction_rig_tick(active);
                    }
                }
                _ => {}
            }
        }

        for (well_id, center) in spawn_requests {
            for attempt in 0..crate::wells::SPAWN_CANDIDATE_COUNT {
                let candidate = crate::wells::spawn_candidate(center, well_id, self.tick, attempt);
                if self.placement_grid.world_to_grid(candidate).is_some() {
                    self.entities.insert(Entity::new(
                        candidate,
                        EntityKind::Resource {
                            remaining: RESOURCE_PATCH_CAPACITY,
                            capacity: RESOURCE_PATCH_CAPACITY,
                        },
                    ));
                    break;
                }
            }
        }
    }

    fn investment_candidates(&self, player_id: u8) -> Vec<InvestmentCandidate> {
        let Some(player) = self.players.get(&player_id) else { return Vec::new() };
        self.catalog
            .available_from(&player.owned_buildings)
            .map(|(&key, entry)| InvestmentCandidate {
                key,
                cost: entry.cost,
                weight: Self::investment_weight(key, entry),
            })
            .collect()
    }

    /// Heuristic investment priority: core economy first, then production
    /// buildings, then static defense, falling back to cost order. Not a
    /// strict requirement, just a tuning choice recorded here.
    fn investment_weight(key: RuleKey, entry: &RuleEntry) -> u32 {
        match key {
            RuleKey("harvester") => 100,
            RuleKey("conyard") | RuleKey("refinery") | RuleKey("barracks") | RuleKey("factory") | RuleKey("air_base") => 80,
            RuleKey("turret") | RuleKey("sam_site") => 60,
            _ => entry.cost / 10,
        }
    }

    fn think_ai(&mut self) {
        let ai_player_ids: Vec<u8> = self
            .players
            .iter()
            .filter(|(_, p)| p.is_ai)
            .map(|(&id, _)| id)
            .collect();

        for player_id in ai_player_ids {
            let Some(player) = self.players.get(&player_id) else { continue };
            let personality = Personality::for_difficulty(player.difficulty);
            let last_think = self.ai_world.player(player_id).map_or(0, |s| s.last_think_tick);
            if self.tick.saturating_sub(last_think) < u64::from(personality.think_interval_ticks) {
                continue;
            }

            let enemy = self
                .players
                .keys()
                .copied()
                .find(|&id| id != player_id)
                .unwrap_or(player_id);

            let idle_credits = player.credits;
            let harvester_count = investment::count_owned(&self.entities, player_id, |k| {
                matches!(k, EntityKind::Unit { harvester: Some(_), .. })
            });
            let economy = investment::economy_score(
                harvester_count,
                DESIRED_HARVESTERS,
                player.credits,
                idle_credits,
                player.has_power_headroom(),
            );

            let primary_positions: Vec<Vec2Fixed> = player
                .primary_buildings
                .iter()
                .filter_map(|&id| self.entities.get(id))
                .map(|e| e.position.value)
                .collect();

            let sightings = threat::detect_threats(&self.entities, player_id, &primary_positions);
            let threat_score = threat::threat_score(&sightings);

            let offensive_group: Vec<EntityId> = self
                .entities
                .iter()
                .filter(|(_, e)| {
                    e.owner.is_some_and(|o| o.player == player_id)
                        && matches!(
                            &e.kind,
                            EntityKind::Unit { combat: Some(_), harvester: None, engineer: None, .. }
                        )
                })
                .map(|(&id, _)| id)
                .collect();

            {
                let Some(ai_state) = self.ai_world.player(player_id) else { continue };
                let previous_strategy = ai_state.strategy;
                let ticks_in_current = self.tick.saturating_sub(ai_state.strategy_entered_tick);
                let inputs = StrategyInputs {
                    threat_score,
                    economy,
                    has_offensive_group: !offensive_group.is_empty(),
                };
                let next_strategy = strategy::choose_strategy(previous_strategy, ticks_in_current, inputs, &personality);

                let ai_state = self.ai_world.player_mut(player_id);
                if next_strategy != previous_strategy {
                    ai_state.strategy = next_strategy;
                    ai_state.strategy_entered_tick = self.tick;
                }
                ai_state.last_think_tick = self.tick;
            }

            let build_candidates = self.investment_candidates(player_id);
            let investment_ceiling = personality.investment_ceiling(idle_credits);
            let harvesters_in_danger = actions::harvesters_under_threat(&self.entities, player_id, &sightings);

            let actions_to_apply = {
                let Some(ai_state) = self.ai_world.player(player_id) else { continue };
                let ctx = AiContext {
                    player: player_id,
                    enemy,
                    tick: self.tick,
                    entities: &self.entities,
                    idle_credits,
                    primary_positions: &primary_positions,
                };
                actions::compute_actions(
                    &ctx,
                    ai_state,
                    economy,
                    &harvesters_in_danger,
                    &build_candidates,
                    investment_ceiling,
                    &offensive_group,
                )
            };

            for action in actions_to_apply {
                let _ = self.submit_action(action);
            }
        }
    }

    fn resolve_commands(&mut self) {
        let ids = self.entities.sorted_ids();
        for id in ids {
            self.resolve_one_command(id);
        }
    }

    fn resolve_one_command(&mut self, id: EntityId) {
        let Some(entity) = self.entities.get(id) else { return };
        let position = entity.position.value;
        let command = entity.commands.current().cloned();

        let neighbor_ids = self.spatial.query_radius(position, NEIGHBOR_QUERY_RADIUS);
        let neighbors: Vec<Neighbor> = neighbor_ids
            .into_iter()
            .filter(|&nid| nid != id)
            .filter_map(|nid| self.entities.get(nid))
            .map(|e| Neighbor { position: e.position.value, radius: e.radius })
            .collect();

        match command {
            Some(Command::MoveTo(target) | Command::AttackMove(target)) => {
                self.move_unit_toward(id, position, target, &neighbors);
            }
            Some(Command::Patrol(target)) => {
                self.patrol_unit(id, position, target, &neighbors);
            }
            Some(Command::Follow(follow_id)) => {
                if let Some(target) = self.entities.get(follow_id).map(|e| e.position.value) {
                    self.move_unit_toward(id, position, target, &neighbors);
                }
            }
            Some(Command::Attack(target_id)) => {
                if let Some(entity) = self.entities.get_mut(id) {
                    if let Some(at) = entity.attack_target_mut() {
                        at.target = Some(target_id);
                    }
                }
                if let Some(target_position) = self.entities.get(target_id).map(|e| e.position.value) {
                    let range = self.entities.get(id).and_then(|e| e.combat_stats()).map(|c| c.range);
                    let in_range = range.is_some_and(|r| position.distance(target_position) <= r);
                    if in_range {
                        if let Some(entity) = self.entities.get_mut(id) {
                            entity.velocity = Velocity::ZERO;
                        }
                    } else {
                        self.move_unit_toward(id, position, target_position, &neighbors);
                    }
                }
            }
            Some(Command::Harvest(resource_id)) => self.harvester_tick(id, position, resource_id, &neighbors),
            Some(Command::Capture(target_id)) => self.engineer_tick(id, position, target_id, true, &neighbors),
            Some(Command::RepairTarget(target_id)) => self.engineer_tick(id, position, target_id, false, &neighbors),
            Some(Command::HoldPosition | Command::Guard(_)) => {
                if let Some(entity) = self.entities.get_mut(id) {
                    entity.velocity = Velocity::ZERO;
                }
            }
            Some(Command::Stop) => {
                if let Some(entity) = self.entities.get_mut(id) {
                    entity.velocity = Velocity::ZERO;
                    entity.commands.clear();
                }
            }
            None => {
                if let Some(entity) = self.entities.get_mut(id) {
                    entity.velocity = Velocity::ZERO;
                }
            }
        }
    }

    fn move_unit_toward(&mut self, id: EntityId, position: Vec2Fixed, target: Vec2Fixed, neighbors: &[Neighbor]) {
        let tick = self.tick;
        let arrived = position.distance_squared(target) <= ARRIVAL_THRESHOLD_SQ;
        let nav_grid = &self.nav_grid;
        let Some(entity) = self.entities.get_mut(id) else { return };
        if let EntityKind::Unit { unit_type, movement, path, .. } = &mut entity.kind {
            let is_airborne = matches!(unit_type, UnitType::Aircraft);
            let velocity = steering::move_toward(position, is_airborne, movement, path, target, nav_grid, neighbors, id, tick);
            entity.velocity = Velocity::new(velocity);
            if arrived {
                entity.commands.pop();
            }
        }
    }

    fn patrol_unit(&mut self, id: EntityId, position: Vec2Fixed, target: Vec2Fixed, neighbors: &[Neighbor]) {
        let destination = {
            let Some(entity) = self.entities.get_mut(id) else { return };
            let EntityKind::Unit { patrol, .. } = &mut entity.kind else { return };
            let state = patrol.get_or_insert(PatrolState {
                origin: position,
                target,
                heading_to_target: true,
            });
            let current_target = if state.heading_to_target { state.target } else { state.origin };
            if position.distance_squared(current_target) <= ARRIVAL_THRESHOLD_SQ {
                state.heading_to_target = !state.heading_to_target;
            }
            if state.heading_to_target { state.target } else { state.origin }
        };
        self.move_unit_toward(id, position, destination, neighbors);
    }

    fn nearest_primary_building(&self, unit_id: EntityId) -> Option<EntityId> {
        let owner = self.entities.get(unit_id)?.owner?;
        let player = self.players.get(&owner.player)?;
        player.primary_buildings.first().copied()
    }

    fn harvester_tick(&mut self, id: EntityId, position: Vec2Fixed, resource_id: EntityId, neighbors: &[Neighbor]) {
        let is_full = match self.entities.get(id).map(|e| &e.kind) {
            Some(EntityKind::Unit { harvester: Some(h), .. }) => h.is_full(),
            _ => return,
        };

        if is_full {
            let base_id = match self.entities.get(id).map(|e| &e.kind) {
                Some(EntityKind::Unit { harvester: Some(h), .. }) => h.base_target,
                _ => None,
            }
            .or_else(|| self.nearest_primary_building(id));

            let Some(base_id) = base_id else { return };
            let Some(base_position) = self.entities.get(base_id).map(|e| e.position.value) else { return };

            if position.distance(base_position) <= UNLOAD_RANGE {
                let owner = self.entities.get(id).and_then(|e| e.owner);
                let cargo = if let Some(entity) = self.entities.get_mut(id) {
                    if let EntityKind::Unit { harvester: Some(h), .. } = &mut entity.kind {
                        let cargo = h.cargo;
                        h.cargo = 0;
                        h.base_target = None;
                        cargo
                    } else {
                        0
                    }
                } else {
                    0
                };
                if let Some(owner) = owner {
                    if let Some(player) = self.players.get_mut(&owner.player) {
                        player.credits += cargo;
                    }
                }
            } else {
                if let Some(entity) = self.entities.get_mut(id) {
                    if let EntityKind::Unit { harvester: Some(h), .. } = &mut entity.kind {
                        h.base_target = Some(base_id);
                    }
                }
                self.move_unit_toward(id, position, base_position, neighbors);
            }
            return;
        }

        let Some(resource_position) = self.entities.get(resource_id).map(|e| e.position.value) else { return };
        if position.distance(resource_position) <= WORK_RANGE {
            let taken = match self.entities.get_mut(resource_id).map(|e| &mut e.kind) {
                Some(EntityKind::Resource { remaining, .. }) => crate::wells::harvest(remaining),
                _ => 0,
            };
            if let Some(entity) = self.entities.get_mut(id) {
                if let EntityKind::Unit { harvester: Some(h), .. } = &mut entity.kind {
                    h.cargo = (h.cargo + taken).min(Harvester::MAX_CARGO);
                    h.resource_target = Some(resource_id);
                }
            }
        } else {
            self.move_unit_toward(id, position, resource_position, neighbors);
        }
    }

    fn engineer_tick(&mut self, id: EntityId, position: Vec2Fixed, target_id: EntityId, capturing: bool, neighbors: &[Neighbor]) {
        let Some(engineer_owner) = self.entities.get(id).and_then(|e| e.owner) else { return };
        let Some(target_position) = self.entities.get(target_id).map(|e| e.position.value) else { return };

        if position.distance(target_position) > WORK_RANGE {
            self.move_unit_toward(id, position, target_position, neighbors);
            return;
        }

        let target_owner = self.entities.get(target_id).and_then(|e| e.owner);

        if capturing {
            if !engineer::can_capture(engineer_owner, target_owner) {
                return;
            }
            if let EngineerOutcome::Captured { new_owner } = engineer::capture(engineer_owner) {
                if let Some(target) = self.entities.get_mut(target_id) {
                    target.owner = Some(new_owner);
                }
            }
        } else {
            let Some((current, max)) = self.entities.get(target_id).and_then(|e| e.health).map(|h| (h.current, h.max)) else {
                return;
            };
            if !engineer::can_repair(engineer_owner, target_owner, current, max) {
                return;
            }
            if let Some(target) = self.entities.get_mut(target_id) {
                if let Some(health) = &mut target.health {
                    engineer::repair(&mut health.current, health.max);
                }
            }
        }

        // The engineer unit is consumed on completion (§4.11).
        self.entities.remove(id);
    }

    fn integrate_positions(&mut self) {
        for (_, entity) in self.entities.iter_mut() {
            if entity.is_projectile() {
                continue; // projectiles integrate in advance_projectiles
            }
            if !entity.velocity.is_stationary() {
                entity.position = Position::new(entity.position.value + entity.velocity.value);
            }
        }
    }

    fn resolve_combat(&mut self) -> Vec<DamageEvent> {
        struct Candidate {
            id: EntityId,
            position: Vec2Fixed,
            owner: Option<Owned>,
            armor_class: ArmorClass,
            resistance: u8,
        }

        let snapshot: Vec<Candidate> = self
            .entities
            .iter()
            .map(|(&id, e)| Candidate {
                id,
                position: e.position.value,
                owner: e.owner,
                armor_class: e.armor_class(),
                resistance: e.combat_stats().map_or(0, |c| c.resistance),
            })
            .collect();

        let mut damage_events = Vec::new();
        let ids = self.entities.sorted_ids();

        for id in ids {
            let Some(entity) = self.entities.get(id) else { continue };
            let Some(owner) = entity.owner else { continue };
            let Some(combat) = entity.combat_stats().copied() else { continue };
            if !combat.can_attack() {
                continue;
            }
            let position = entity.position.value;
            let is_turret = matches!(entity.kind, EntityKind::Building { .. });

            let target_id = if is_turret {
                let candidates: Vec<TurretCandidate> = snapshot
                    .iter()
                    .filter(|c| c.owner.is_some_and(|o| o.player != owner.player))
                    .map(|c| TurretCandidate { id: c.id, position: c.position, armor_class: c.armor_class })
                    .collect();
                buildings::select_turret_target(position, combat.range, &candidates, combat.air_only)
            } else {
                entity.attack_target().and_then(|at| at.target)
            };

            let Some(target_id) = target_id else { continue };
            let Some(target) = snapshot.iter().find(|c| c.id == target_id) else { continue };
            if position.distance(target.position) > combat.range {
                continue;
            }

            if combat.uses_projectiles() {
                let projectile = Projectile::new(
                    id,
                    Some(target_id),
                    target.position,
                    combat.damage,
                    combat.damage_type,
                    combat.weapon_type,
                    combat.splash_radius,
                    owner.player,
                );
                self.entities.insert(Entity::new(position, EntityKind::Projectile(projectile)));
            } else {
                let resistance = ResistanceStats::new(target.armor_class, target.resistance);
                let amount = calculate_resistance_damage(&combat.to_weapon_stats(), &resistance);
                damage_events.push(DamageEvent { attacker: id, target: target_id, amount });
            }

            if let Some(entity) = self.entities.get_mut(id) {
                if let Some(at) = entity.attack_target_mut() {
                    at.target = Some(target_id);
                }
                if let Some(c) = entity.combat_stats_mut() {
                    c.reset_cooldown();
                }
            }
        }

        for (_, entity) in self.entities.iter_mut() {
            if let Some(c) = entity.combat_stats_mut() {
                c.tick_cooldown();
            }
            if let Some(at) = entity.attack_target_mut() {
                at.tick();
            }
        }

        damage_events
    }

    fn resolve_collision(&mut self) {
        let ids = self.entities.sorted_ids();
        let mut bodies: Vec<Body> = Vec::with_capacity(ids.len());
        for &id in &ids {
            let Some(entity) = self.entities.get(id) else { continue };
            bodies.push(Body {
                position: entity.position.value,
                radius: entity.radius,
                moving: !entity.velocity.is_stationary(),
            });
        }
        collision::resolve(&mut bodies);
        for (index, &id) in ids.iter().enumerate() {
            if let Some(entity) = self.entities.get_mut(id) {
                entity.position = Position::new(bodies[index].position);
            }
        }
    }

    fn advance_projectiles(&mut self) -> Vec<DamageEvent> {
        let mut damage_events = Vec::new();
        let world_bounds = Vec2Fixed::new(
            Fixed::from_num(WORLD_WIDTH_CELLS as i32 * WORLD_CELL_SIZE),
            Fixed::from_num(WORLD_HEIGHT_CELLS as i32 * WORLD_CELL_SIZE),
        );
        let ids = self.entities.sorted_ids();
        let mut to_remove = Vec::new();

        for id in ids {
            let Some(entity) = self.entities.get(id) else { continue };
            let EntityKind::Projectile(mut projectile) = entity.kind.clone() else { continue };
            let position = entity.position.value;
            let live_target_position = projectile.target.and_then(|t| self.entities.get(t)).map(|e| e.position.value);

            let outcome = projectiles::tick_projectile(&mut projectile, position, live_target_position, world_bounds);

            match outcome {
                ProjectileOutcome::Flying(new_position) => {
                    if let Some(entity) = self.entities.get_mut(id) {
                        entity.position = Position::new(new_position);
                        entity.kind = EntityKind::Projectile(projectile);
                    }
                }
                ProjectileOutcome::Impact(impact_position) => {
                    let weapon = WeaponStats::new(projectile.damage, projectile.damage_type, projectile.weapon_type)
                        .with_splash_radius(projectile.splash_radius);

                    if let Some(target_id) = projectile.target {
                        if let Some(target) = self.entities.get(target_id) {
                            let resistance = target
                                .combat_stats()
                                .map_or_else(|| ResistanceStats::new(target.armor_class(), 0), CombatStats::to_resistance_stats);
                            let amount = calculate_resistance_damage(&weapon, &resistance);
                            damage_events.push(DamageEvent { attacker: projectile.source, target: target_id, amount });
                        }
                    }

                    if projectile.splash_radius > Fixed::ZERO {
                        let candidates: Vec<(EntityId, Vec2Fixed, ResistanceStats)> = self
                            .spatial
                            .query_radius(impact_position, projectile.splash_radius)
                            .into_iter()
                            .filter(|&cid| Some(cid) != projectile.target)
                            .filter_map(|cid| {
                                self.entities.get(cid).map(|e| {
                                    let resistance = e
                                        .combat_stats()
                                        .map_or_else(|| ResistanceStats::new(e.armor_class(), 0), CombatStats::to_resistance_stats);
                                    (cid, e.position.value, resistance)
                                })
                            })
                            .collect();
                        damage_events.extend(damage::splash_damage_events(projectile.source, impact_position, &weapon, &candidates));
                    }

                    to_remove.push(id);
                }
                ProjectileOutcome::Expired => {
                    to_remove.push(id);
                }
            }
        }

        for id in to_remove {
            self.entities.remove(id);
        }

        damage_events
    }

    fn apply_damage_events(&mut self, damage_events: Vec<DamageEvent>) {
        let tick = self.tick;
        for event in damage_events {
            if let Some(target) = self.entities.get_mut(event.target) {
                if let Some(health) = &mut target.health {
                    health.apply_damage(event.amount, event.attacker, tick);
                }
            }
        }

        self.run_demo_chain_reactions();

        for (_, entity) in self.entities.iter_mut() {
            if let Some(health) = &mut entity.health {
                health.tick_flash();
            }
        }
    }

    /// Demo-truck chain reactions (§4.10): any demo charge whose carrier just
    /// died detonates, chaining into every other un-detonated charge within
    /// blast range.
    fn run_demo_chain_reactions(&mut self) {
        let origins: Vec<(EntityId, Vec2Fixed, Fixed)> = self
            .entities
            .iter()
            .filter_map(|(&id, e)| {
                if let EntityKind::Unit { demo_charge: Some(charge), .. } = &e.kind {
                    (e.is_dead() && !charge.detonated).then_some((id, e.position.value, charge.radius))
                } else {
                    None
                }
            })
            .collect();

        if origins.is_empty() {
            return;
        }

        let candidates: Vec<damage::ChainCandidate> = self
            .entities
            .iter()
            .filter_map(|(&id, e)| {
                if let EntityKind::Unit { demo_charge: Some(charge), .. } = &e.kind {
                    (!charge.detonated).then_some(damage::ChainCandidate { id, position: e.position.value, radius: charge.radius })
                } else {
                    None
                }
            })
            .collect();

        let detonated = damage::run_explosions(&origins, &candidates);
        let tick = self.tick;

        for id in detonated {
            let Some((damage_amount, radius, origin_position)) = self.entities.get_mut(id).and_then(|entity| {
                let position = entity.position.value;
                if let EntityKind::Unit { demo_charge: Some(charge), .. } = &mut entity.kind {
                    if charge.detonated {
                        return None;
                    }
                    charge.detonated = true;
                    Some((charge.damage, charge.radius, position))
                } else {
                    None
                }
            }) else {
                continue;
            };

            let weapon = WeaponStats::new(damage_amount, DamageType::Explosive, WeaponType::Explosion).with_splash_radius(radius);
            let splash_candidates: Vec<(EntityId, Vec2Fixed, ResistanceStats)> = self
                .entities
                .iter()
                .filter(|&(&cid, _)| cid != id)
                .map(|(&cid, e)| {
                    let resistance = e
                        .combat_stats()
                        .map_or_else(|| ResistanceStats::new(e.armor_class(), 0), CombatStats::to_resistance_stats);
                    (cid, e.position.value, resistance)
                })
                .collect();

            let splash_events = damage::splash_damage_events(id, origin_position, &weapon, &splash_candidates);
            for ev in splash_events {
                if let Some(target) = self.entities.get_mut(ev.target) {
                    if let Some(health) = &mut target.health {
                        health.apply_damage(ev.amount, ev.attacker, tick);
                    }
                }
            }

            if let Some(entity) = self.entities.get_mut(id) {
                if let Some(health) = &mut entity.health {
                    *health = Health::new(0);
                }
            }
        }
    }

    fn advance_construction(&mut self, events: &mut TickEvents) {
        for (&id, entity) in self.entities.iter_mut() {
            if let EntityKind::Building { construction_ticks, construction_ticks_total, .. } = &mut entity.kind {
                if buildings::advance_construction(construction_ticks, *construction_ticks_total) {
                    events.construction_complete.push(id);
                }
            }
        }
    }

    fn cleanup_deaths(&mut self, events: &mut TickEvents) {
        let dead: Vec<EntityId> = self
            .entities
            .iter()
            .filter(|(_, e)| e.is_dead())
            .map(|(&id, _)| id)
            .collect();

        for id in dead {
            if let Some(entity) = self.entities.get(id) {
                if let EntityKind::Building { building, .. } = &entity.kind {
                    let footprint = BuildingFootprint::new(u32::from(building.width), u32::from(building.height));
                    buildings::remove_building(&mut self.placement_grid, &mut self.nav_grid, entity.position.value, &footprint);
                }
            }
            self.entities.remove(id);
            events.deaths.push(id);
        }
    }

    fn check_victory(&mut self, events: &mut TickEvents) {
        let roster: Vec<u8> = self.players.keys().copied().collect();
        let alive = victory::alive_players(&self.entities, &roster);
        let removed = victory::clean_up_eliminated(&mut self.entities, &alive, &roster);
        events.deaths.extend(removed);
        events.victory = victory::resolve(&alive);
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factions::FactionId;

    fn combat_unit(owner: Owned, position: Vec2Fixed) -> EntitySpawnParams {
        EntitySpawnParams::new(
            position,
            EntityKind::Unit {
                unit_type: UnitType::Infantry,
                combat: Some(CombatStats::new(10, Fixed::from_num(30), 5).with_weapon_type(WeaponType::Bullet)),
                attack_target: AttackTarget::new(),
                movement: Movement::default(),
                patrol: None,
                path: None,
                harvester: None,
                engineer: None,
                demo_charge: None,
                air_slot: None,
                is_mcv: false,
            },
        )
        .with_owner(owner)
        .with_health(Health::new(50))
    }

    fn mover(owner: Owned, position: Vec2Fixed) -> EntitySpawnParams {
        EntitySpawnParams::new(
            position,
            EntityKind::Unit {
                unit_type: UnitType::Vehicle,
                combat: None,
                attack_target: AttackTarget::new(),
                movement: Movement::default(),
                patrol: None,
                path: None,
                harvester: None,
                engineer: None,
                demo_charge: None,
                air_slot: None,
                is_mcv: false,
            },
        )
        .with_owner(owner)
        .with_health(Health::new(100))
    }

    #[test]
    fn test_simulation_new() {
        let sim = Simulation::new();
        assert_eq!(sim.get_tick(), 0);
        assert!(sim.entities().is_empty());
    }

    #[test]
    fn test_spawn_entity() {
        let mut sim = Simulation::new();
        let owner = Owned { faction: FactionId::Continuity, player: 0 };
        let id = sim.spawn_entity(mover(owner, Vec2Fixed::ZERO));
        assert_eq!(sim.entities().len(), 1);
        assert!(sim.get_entity(id).is_some());
    }

    #[test]
    fn test_despawn_entity() {
        let mut sim = Simulation::new();
        let owner = Owned { faction: FactionId::Continuity, player: 0 };
        let id = sim.spawn_entity(mover(owner, Vec2Fixed::ZERO));
        sim.despawn_entity(id).unwrap();
        assert!(sim.get_entity(id).is_none());
        assert!(sim.despawn_entity(id).is_err());
    }

    #[test]
    fn test_tick_increments() {
        let mut sim = Simulation::new();
        sim.tick();
        sim.tick();
        assert_eq!(sim.get_tick(), 2);
    }

    #[test]
    fn test_movement_integration() {
        let mut sim = Simulation::new();
        let owner = Owned { faction: FactionId::Continuity, player: 0 };
        let id = sim.spawn_entity(mover(owner, Vec2Fixed::ZERO));
        let target = Vec2Fixed::new(Fixed::from_num(50), Fixed::ZERO);
        sim.apply_command(id, Command::MoveTo(target)).unwrap();

        for _ in 0..10 {
            sim.tick();
        }

        let position = sim.get_entity(id).unwrap().position.value;
        assert!(position.x > Fixed::ZERO);
    }

    #[test]
    fn test_patrol_toggles_heading() {
        let mut sim = Simulation::new();
        let owner = Owned { faction: FactionId::Continuity, player: 0 };
        let id = sim.spawn_entity(mover(owner, Vec2Fixed::ZERO));
        let target = Vec2Fixed::new(Fixed::from_num(4), Fixed::ZERO);
        sim.apply_command(id, Command::Patrol(target)).unwrap();

        for _ in 0..50 {
            sim.tick();
        }

        let EntityKind::Unit { patrol, .. } = &sim.get_entity(id).unwrap().kind else {
            panic!("expected unit");
        };
        assert!(patrol.is_some());
    }

    #[test]
    fn test_attack_command_chases_target() {
        let mut sim = Simulation::new();
        let attacker_owner = Owned { faction: FactionId::Continuity, player: 0 };
        let target_owner = Owned { faction: FactionId::Collegium, player: 1 };
        let attacker = sim.spawn_entity(combat_unit(attacker_owner, Vec2Fixed::ZERO));
        let target = sim.spawn_entity(combat_unit(target_owner, Vec2Fixed::new(Fixed::from_num(200), Fixed::ZERO)));

        sim.apply_command(attacker, Command::Attack(target)).unwrap();
        let start = sim.get_entity(attacker).unwrap().position.value;
        for _ in 0..10 {
            sim.tick();
        }
        let moved = sim.get_entity(attacker).unwrap().position.value;
        assert!(moved.x > start.x);
    }

    #[test]
    fn test_deterministic_hash() {
        let mut a = Simulation::new();
        let mut b = Simulation::new();
        let owner = Owned { faction: FactionId::Continuity, player: 0 };
        for sim in [&mut a, &mut b] {
            sim.spawn_entity(mover(owner, Vec2Fixed::ZERO));
        }
        for _ in 0..5 {
            a.tick();
            b.tick();
        }
        assert_eq!(a.state_hash(), b.state_hash());
    }

    #[test]
    fn test_projectile_hits_target() {
        let mut sim = Simulation::new();
        let attacker_owner = Owned { faction: FactionId::Continuity, player: 0 };
        let target_owner = Owned { faction: FactionId::Collegium, player: 1 };
        let attacker_id = sim.spawn_entity(
            EntitySpawnParams::new(
                Vec2Fixed::ZERO,
                EntityKind::Unit {
                    unit_type: UnitType::Vehicle,
                    combat: Some(CombatStats::new(40, Fixed::from_num(100), 20).with_weapon_type(WeaponType::Missile)),
                    attack_target: AttackTarget::new(),
                    movement: Movement::default(),
                    patrol: None,
                    path: None,
                    harvester: None,
                    engineer: None,
                    demo_charge: None,
                    air_slot: None,
                    is_mcv: false,
                },
            )
            .with_owner(attacker_owner)
            .with_health(Health::new(100)),
        );
        let target_id = sim.spawn_entity(combat_unit(target_owner, Vec2Fixed::new(Fixed::from_num(20), Fixed::ZERO)));
        sim.set_attack_target(attacker_id, target_id).unwrap();

        let mut target_hp = sim.get_entity(target_id).unwrap().health.unwrap().current;
        for _ in 0..40 {
            sim.tick();
            if let Some(target) = sim.get_entity(target_id) {
                target_hp = target.health.map_or(0, |h| h.current);
            } else {
                break;
            }
        }
        assert!(target_hp < 50);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let mut sim = Simulation::new();
        let owner = Owned { faction: FactionId::Continuity, player: 0 };
        sim.add_player(PlayerState::new(0, FactionId::Continuity, 5000));
        sim.spawn_entity(mover(owner, Vec2Fixed::ZERO));
        sim.tick();

        let bytes = sim.serialize().unwrap();
        let restored = Simulation::deserialize(&bytes).unwrap();

        assert_eq!(restored.get_tick(), sim.get_tick());
        assert_eq!(restored.entities().len(), sim.entities().len());
    }

    #[test]
    fn test_health_system_removes_dead() {
        let mut sim = Simulation::new();
        let attacker_owner = Owned { faction: FactionId::Continuity, player: 0 };
        let target_owner = Owned { faction: FactionId::Collegium, player: 1 };
        let attacker = sim.spawn_entity(combat_unit(attacker_owner, Vec2Fixed::ZERO));
        let target = sim.spawn_entity(
            EntitySpawnParams::new(
                Vec2Fixed::new(Fixed::from_num(10), Fixed::ZERO),
                EntityKind::Unit {
                    unit_type: UnitType::Infantry,
                    combat: None,
                    attack_target: AttackTarget::new(),
                    movement: Movement::default(),
                    patrol: None,
                    path: None,
                    harvester: None,
                    engineer: None,
                    demo_charge: None,
                    air_slot: None,
                    is_mcv: false,
                },
            )
            .with_owner(target_owner)
            .with_health(Health::new(1)),
        );
        sim.set_attack_target(attacker, target).unwrap();

        for _ in 0..20 {
            sim.tick();
            if sim.get_entity(target).is_none() {
                break;
            }
        }
        assert!(sim.get_entity(target).is_none());
    }
}
