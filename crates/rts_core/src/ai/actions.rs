//! Ordered AI action-emission pipeline (§4.15) and the external action
//! schema consumed by [`crate::reducers::apply_action`] (§6).

use serde::{Deserialize, Serialize};

use crate::components::EntityId;
use crate::entities::{EntityKind, EntityStorage};
use crate::math::Vec2Fixed;
use crate::rules::RuleKey;

use super::investment::{self, EconomySnapshot};
use super::state::AIPlayerState;
use super::strategy::Strategy;
use super::threat::{self, ThreatSighting};

/// One action the AI (or a human player, via the same external interface)
/// can submit to [`crate::reducers::apply_action`] (§6).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Begin producing `key` in its category's queue.
    StartBuild { player: u8, key: RuleKey },
    /// Place a finished building at `position`.
    PlaceBuilding { player: u8, position: Vec2Fixed },
    /// Cancel the in-progress item in `key`'s category.
    CancelBuild { player: u8, key: RuleKey },
    /// Order a unit to move.
    CommandMove { unit: EntityId, target: Vec2Fixed },
    /// Order a unit to attack a target entity.
    CommandAttack { unit: EntityId, target: EntityId },
    /// Sell a building for a partial refund.
    SellBuilding { building: EntityId },
    /// Deploy an MCV unit into a primary building.
    DeployMcv { unit: EntityId },
    /// Order an engineer to begin repairing a building.
    StartRepair { engineer: EntityId, building: EntityId },
}

/// Why an [`Action`] could not be applied (§7: gameplay failures are
/// notifications, not hard errors).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// Referenced entity does not exist.
    EntityNotFound(EntityId),
    /// The action's preconditions were not met (insufficient credits,
    /// invalid placement, wrong unit role, etc).
    Rejected(String),
}

/// Read-only view of one player's world state relevant to the AI think pass.
#[derive(Debug, Clone, Copy)]
pub struct AiContext<'a> {
    /// This AI's player id.
    pub player: u8,
    /// Enemy player id (1v1 only; see Non-goals).
    pub enemy: u8,
    /// Current simulation tick.
    pub tick: u64,
    /// All entities.
    pub entities: &'a EntityStorage,
    /// This player's idle (unqueued) credits.
    pub idle_credits: u32,
    /// This player's primary building positions (defense anchors).
    pub primary_positions: &'a [Vec2Fixed],
}

/// Run one AI think pass, emitting actions in priority order:
///
/// 1. Harvester safety: flee any harvester under threat back toward base.
/// 2. Strategy-driven production (economy/buildup/desperation spending).
/// 3. Offensive group commands, if in [`Strategy::Offensive`].
/// 4. Defensive regrouping, if in [`Strategy::Defensive`].
#[must_use]
pub fn compute_actions(
    ctx: &AiContext<'_>,
    player_state: &AIPlayerState,
    economy: EconomySnapshot,
    harvesters_in_danger: &[(EntityId, Vec2Fixed)],
    build_candidates: &[investment::InvestmentCandidate],
    investment_ceiling: u32,
    offensive_group: &[EntityId],
) -> Vec<Action> {
    let mut actions = Vec::new();

    // Step 1: harvester safety flee takes priority over everything else (§4.6/§4.15).
    if let Some(base) = ctx.primary_positions.first() {
        for &(harvester, _position) in harvesters_in_danger {
            actions.push(Action::CommandMove {
                unit: harvester,
                target: *base,
            });
        }
    }

    match player_state.strategy {
        Strategy::Desperation => {
            if let Some(key) = investment::choose_investment(build_candidates, ctx.idle_credits) {
                actions.push(Action::StartBuild {
                    player: ctx.player,
                    key,
                });
            }
        }
        Strategy::Economy | Strategy::Buildup => {
            if let Some(key) = investment::choose_investment(build_candidates, investment_ceiling) {
                actions.push(Action::StartBuild {
                    player: ctx.player,
                    key,
                });
            }
        }
        Strategy::Offensive => {
            if let Some(target) = nearest_enemy_building(ctx.entities, ctx.enemy) {
                for &unit in offensive_group {
                    actions.push(Action::CommandAttack { unit, target });
                }
            }
        }
        Strategy::Defensive => {
            if let Some(base) = ctx.primary_positions.first() {
                for &unit in offensive_group {
                    actions.push(Action::CommandMove {
                        unit,
                        target: *base,
                    });
                }
            }
        }
    }

    actions
}

fn nearest_enemy_building(entities: &EntityStorage, enemy: u8) -> Option<EntityId> {
    entities
        .iter()
        .find(|(_, e)| {
            e.owner.is_some_and(|o| o.player == enemy) && matches!(e.kind, EntityKind::Building { .. })
        })
        .map(|(&id, _)| id)
}

/// Identify harvesters belonging to `player` currently within threat range,
/// for the step-1 safety-flee check (§4.6, §4.15).
#[must_use]
pub fn harvesters_under_threat(
    entities: &EntityStorage,
    player: u8,
    sightings: &[ThreatSighting],
) -> Vec<(EntityId, Vec2Fixed)> {
    entities
        .iter()
        .filter_map(|(&id, entity)| {
            let is_own_harvester = entity.owner.is_some_and(|o| o.player == player)
                && matches!(&entity.kind, EntityKind::Unit { harvester: Some(_), .. });
            if !is_own_harvester {
                return None;
            }
            let in_danger = sightings
                .iter()
                .any(|s| s.position.distance(entity.position.value) <= threat::THREAT_DETECTION_RADIUS);
            in_danger.then_some((id, entity.position.value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn harvester_flee_action_emitted_first() {
        let entities = EntityStorage::new();
        let player_state = AIPlayerState::new();
        let economy = EconomySnapshot {
            score: 70,
            idle_credits: 100,
        };
        let ctx = AiContext {
            player: 0,
            enemy: 1,
            tick: 0,
            entities: &entities,
            idle_credits: 100,
            primary_positions: &[Vec2Fixed::ZERO],
        };
        let danger = vec![(5, Vec2Fixed::new(crate::math::Fixed::from_num(10), crate::math::Fixed::ZERO))];
        let actions = compute_actions(&ctx, &player_state, economy, &danger, &[], 0, &[]);
        assert_eq!(actions[0], Action::CommandMove { unit: 5, target: Vec2Fixed::ZERO });
    }
}
