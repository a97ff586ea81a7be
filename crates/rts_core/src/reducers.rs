//! Pure `State -> State` action application (§4.16, §6).
//!
//! Every reducer validates its preconditions and either mutates state or
//! returns an [`ActionError`] describing why the action was rejected — a
//! rejected action is a notification, never a panic (§7).

use std::collections::HashMap;

use crate::ai::{Action, ActionError};
use crate::buildings::{self, BuildingFootprint, PlacementGrid};
use crate::components::{AttackTarget, Building, Command, Engineer, Owned};
use crate::entities::{Entity, EntityId, EntityKind, EntityStorage};
use crate::pathfinding::NavGrid;
use crate::players::PlayerState;
use crate::production;
use crate::rules::RuleCatalog;

/// Mutable state a reducer needs. Borrowed, not owned, so
/// [`crate::simulation::Simulation`] can pass its own fields in directly.
pub struct ReducerState<'a> {
    /// All entities.
    pub entities: &'a mut EntityStorage,
    /// All players, keyed by id.
    pub players: &'a mut HashMap<u8, PlayerState>,
    /// Read-only rule catalog.
    pub catalog: &'a RuleCatalog,
    /// Building placement grid.
    pub placement_grid: &'a mut PlacementGrid,
    /// Navigation grid, kept in sync with building placement.
    pub nav_grid: &'a mut NavGrid,
}

/// Apply one action, mutating `state` in place.
///
/// # Errors
///
/// Returns [`ActionError`] if the action's preconditions are not met; state
/// is left unchanged on error.
pub fn apply_action(state: &mut ReducerState<'_>, action: Action) -> Result<(), ActionError> {
    match action {
        Action::StartBuild { player, key } => start_build(state, player, key),
        Action::CancelBuild { player, key } => cancel_build(state, player, key),
        Action::PlaceBuilding { player, position } => place_building(state, player, position),
        Action::CommandMove { unit, target } => command_move(state, unit, target),
        Action::CommandAttack { unit, target } => command_attack(state, unit, target),
        Action::SellBuilding { building } => sell_building(state, building),
        Action::DeployMcv { unit } => deploy_mcv(state, unit),
        Action::StartRepair { engineer, building } => start_repair(state, engineer, building),
    }
}

fn player_mut<'a>(
    players: &'a mut HashMap<u8, PlayerState>,
    id: u8,
) -> Result<&'a mut PlayerState, ActionError> {
    players
        .get_mut(&id)
        .ok_or_else(|| ActionError::Rejected(format!("unknown player {id}")))
}

fn start_build(state: &mut ReducerState<'_>, player_id: u8, key: crate::rules::RuleKey) -> Result<(), ActionError> {
    let player = player_mut(state.players, player_id)?;
    let current_count = state
        .entities
        .iter()
        .filter(|(_, e)| e.owner.is_some_and(|o| o.player == player_id))
        .count() as u32;

    production::queue_production(
        &mut player.production,
        &player.owned_buildings,
        key,
        state.catalog,
        player.credits,
        current_count,
    )
    .map_err(|e| ActionError::Rejected(format!("{e:?}")))
}

fn cancel_build(state: &mut ReducerState<'_>, player_id: u8, key: crate::rules::RuleKey) -> Result<(), ActionError> {
    let entry = state
        .catalog
        .get(key)
        .ok_or_else(|| ActionError::Rejected("unknown rule key".into()))?;
    let category = entry.category;
    let player = player_mut(state.players, player_id)?;
    production::cancel_production(&mut player.production, category, &mut player.credits)
        .map(|_| ())
        .ok_or_else(|| ActionError::Rejected("nothing queued in category".into()))
}

fn place_building(
    state: &mut ReducerState<'_>,
    player_id: u8,
    position: crate::math::Vec2Fixed,
) -> Result<(), ActionError> {
    let player = player_mut(state.players, player_id)?;
    let key = player
        .production
        .ready_to_place
        .ok_or_else(|| ActionError::Rejected("nothing ready to place".into()))?;
    let entry = state
        .catalog
        .get(key)
        .ok_or_else(|| ActionError::Rejected("unknown rule key".into()))?;

    let footprint = BuildingFootprint::default();
    let friendly_positions: Vec<_> = state
        .entities
        .iter()
        .filter(|(_, e)| {
            e.owner.is_some_and(|o| o.player == player_id)
                && matches!(&e.kind, EntityKind::Building { combat: None, .. })
        })
        .map(|(_, e)| e.position.value)
        .collect();

    let placement = buildings::can_place_building_full(
        state.placement_grid,
        position,
        &footprint,
        &[],
        &friendly_positions,
    );
    if !placement.is_valid() {
        return Err(ActionError::Rejected(format!("{placement:?}")));
    }

    player.production.ready_to_place = None;
    player.owned_buildings.push(key);

    let mut entity = Entity::new(
        position,
        EntityKind::Building {
            building: Building {
                width: footprint.width as u8,
                height: footprint.height as u8,
            },
            combat: (entry.damage > 0).then(|| {
                crate::components::CombatStats::new(entry.damage, entry.range, entry.rate)
                    .with_damage_type(entry.damage_type)
                    .with_weapon_type(entry.weapon_type)
                    .with_resistance(entry.armor_class, entry.resistance)
                    .with_air_only(entry.is_defense)
            }),
            attack_target: AttackTarget::new(),
            construction_ticks: 0,
            construction_ticks_total: entry.build_time,
            is_primary: false,
        },
    )
    .with_health(crate::components::Health::new(entry.hp))
    .with_owner(Owned {
        faction: player.faction,
        player: player_id,
    });
    entity.id = 0;

    let id = state.entities.insert(entity);
    buildings::place_building(state.placement_grid, state.nav_grid, position, &footprint, id);

    Ok(())
}

fn command_move(state: &mut ReducerState<'_>, unit: EntityId, target: crate::math::Vec2Fixed) -> Result<(), ActionError> {
    let entity = state
        .entities
        .get_mut(unit)
        .ok_or(ActionError::EntityNotFound(unit))?;
    entity.commands.set(Command::MoveTo(target));
    Ok(())
}

fn command_attack(state: &mut ReducerState<'_>, unit: EntityId, target: EntityId) -> Result<(), ActionError> {
    if !state.entities.contains(target) {
        return Err(ActionError::EntityNotFound(target));
    }
    let entity = state
        .entities
        .get_mut(unit)
        .ok_or(ActionError::EntityNotFound(unit))?;
    entity.commands.set(Command::Attack(target));
    Ok(())
}

fn sell_building(state: &mut ReducerState<'_>, building_id: EntityId) -> Result<(), ActionError> {
    let entity = state
        .entities
        .get(building_id)
        .ok_or(ActionError::EntityNotFound(building_id))?;
    let owner = entity
        .owner
        .ok_or_else(|| ActionError::Rejected("building has no owner".into()))?;
    let health = entity
        .health
        .ok_or_else(|| ActionError::Rejected("building has no health".into()))?;

    let refund = buildings::sell_refund(200, health.current, health.max);
    let footprint = BuildingFootprint::default();
    buildings::remove_building(state.placement_grid, state.nav_grid, entity.position.value, &footprint);

    state.entities.remove(building_id);
    let player = player_mut(state.players, owner.player)?;
    player.credits += refund;
    Ok(())
}

fn deploy_mcv(state: &mut ReducerState<'_>, unit: EntityId) -> Result<(), ActionError> {
    let entity = state
        .entities
        .get(unit)
        .ok_or(ActionError::EntityNotFound(unit))?;
    let owner = entity
        .owner
        .ok_or_else(|| ActionError::Rejected("MCV has no owner".into()))?;
    let is_mcv = matches!(&entity.kind, EntityKind::Unit { is_mcv: true, .. });
    if !is_mcv {
        return Err(ActionError::Rejected("unit is not an MCV".into()));
    }
    let position = entity.position.value;

    state.entities.remove(unit);

    let mut building_entity = Entity::new(
        position,
        EntityKind::Building {
            building: Building { width: 3, height: 3 },
            combat: None,
            attack_target: AttackTarget::new(),
            construction_ticks: 1,
            construction_ticks_total: 1,
            is_primary: true,
        },
    )
    .with_health(crate::components::Health::new(1000))
    .with_owner(owner);
    building_entity.id = 0;
    let id = state.entities.insert(building_entity);

    let player = player_mut(state.players, owner.player)?;
    player.primary_buildings.push(id);
    Ok(())
}

fn start_repair(state: &mut ReducerState<'_>, engineer_id: EntityId, building_id: EntityId) -> Result<(), ActionError> {
    let engineer_owner = state
        .entities
        .get(engineer_id)
        .ok_or(ActionError::EntityNotFound(engineer_id))?
        .owner
        .ok_or_else(|| ActionError::Rejected("engineer has no owner".into()))?;

    let building = state
        .entities
        .get(building_id)
        .ok_or(ActionError::EntityNotFound(building_id))?;
    let (current, max) = building
        .health
        .map(|h| (h.current, h.max))
        .ok_or_else(|| ActionError::Rejected("building has no health".into()))?;

    if !crate::engineer::can_repair(engineer_owner, building.owner, current, max) {
        return Err(ActionError::Rejected("invalid repair target".into()));
    }

    let Some(entity) = state.entities.get_mut(engineer_id) else {
        return Err(ActionError::EntityNotFound(engineer_id));
    };
    if let EntityKind::Unit { engineer, .. } = &mut entity.kind {
        *engineer = Some(Engineer {
            target: Some(building_id),
            capturing: false,
        });
        Ok(())
    } else {
        Err(ActionError::Rejected("unit is not an engineer".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factions::FactionId;
    use crate::math::{Fixed, Vec2Fixed};

    fn setup() -> (EntityStorage, HashMap<u8, PlayerState>, RuleCatalog, PlacementGrid, NavGrid) {
        let entities = EntityStorage::new();
        let mut players = HashMap::new();
        players.insert(0, PlayerState::new(0, FactionId::Continuity, 5000));
        let catalog = RuleCatalog::standard();
        let grid = PlacementGrid::new(100, 100, Fixed::from_num(10));
        let nav = NavGrid::new(100, 100, Fixed::from_num(10));
        (entities, players, catalog, grid, nav)
    }

    #[test]
    fn command_move_sets_unit_command() {
        let (mut entities, mut players, catalog, mut grid, mut nav) = setup();
        let unit = entities.insert(Entity::new(Vec2Fixed::ZERO, EntityKind::Rock));
        let mut state = ReducerState {
            entities: &mut entities,
            players: &mut players,
            catalog: &catalog,
            placement_grid: &mut grid,
            nav_grid: &mut nav,
        };
        let target = Vec2Fixed::new(Fixed::from_num(10), Fixed::ZERO);
        apply_action(&mut state, Action::CommandMove { unit, target }).unwrap();
        assert_eq!(
            entities.get(unit).unwrap().commands.current(),
            Some(&Command::MoveTo(target))
        );
    }

    #[test]
    fn command_move_rejects_missing_entity() {
        let (mut entities, mut players, catalog, mut grid, mut nav) = setup();
        let mut state = ReducerState {
            entities: &mut entities,
            players: &mut players,
            catalog: &catalog,
            placement_grid: &mut grid,
            nav_grid: &mut nav,
        };
        let result = apply_action(
            &mut state,
            Action::CommandMove { unit: 999, target: Vec2Fixed::ZERO },
        );
        assert_eq!(result, Err(ActionError::EntityNotFound(999)));
    }
}
