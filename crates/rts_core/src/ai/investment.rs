//! Economy scoring, investment priority, and enemy intelligence (§4.14).

use crate::components::EntityId;
use crate::entities::{EntityKind, EntityStorage};
use crate::math::Vec2Fixed;
use crate::rules::RuleKey;

/// A snapshot of one player's economic health, scored 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EconomySnapshot {
    /// Overall economy score, 0-100.
    pub score: u32,
    /// Credits not currently committed to a production queue.
    pub idle_credits: u32,
}

/// Compute an economy score from harvester count, credits, and power headroom.
#[must_use]
pub fn economy_score(
    harvester_count: u32,
    desired_harvesters: u32,
    credits: u32,
    idle_credits: u32,
    has_power_headroom: bool,
) -> EconomySnapshot {
    let harvester_ratio = if desired_harvesters == 0 {
        100
    } else {
        (harvester_count * 100 / desired_harvesters).min(100)
    };
    let credit_health = (credits / 20).min(40);
    let power_bonus = if has_power_headroom { 10 } else { 0 };

    let score = (harvester_ratio.min(60)) + credit_health.min(30) + power_bonus;
    EconomySnapshot {
        score: score.min(100),
        idle_credits,
    }
}

/// One candidate the AI could spend its next investment on.
#[derive(Debug, Clone, Copy)]
pub struct InvestmentCandidate {
    /// The production key under consideration.
    pub key: RuleKey,
    /// Credits required.
    pub cost: u32,
    /// Priority weight: higher wins when multiple candidates are affordable.
    pub weight: u32,
}

/// Pick the highest-weighted affordable candidate within the investment
/// ceiling, or `None` if nothing qualifies this pass.
#[must_use]
pub fn choose_investment(
    candidates: &[InvestmentCandidate],
    ceiling: u32,
) -> Option<RuleKey> {
    candidates
        .iter()
        .filter(|c| c.cost <= ceiling)
        .max_by_key(|c| c.weight)
        .map(|c| c.key)
}

/// A known enemy asset observed by scouting or combat, used to size up the
/// opponent's strength before committing to an offensive.
#[derive(Debug, Clone, Copy)]
pub struct EnemyIntel {
    /// The enemy entity.
    pub entity: EntityId,
    /// Last known position.
    pub position: Vec2Fixed,
    /// Rough combat value, as in [`super::threat::ThreatSighting`].
    pub combat_value: u32,
}

/// Build an enemy intelligence snapshot for `enemy_player` from currently
/// visible entities (no fog-of-war in this port — see Non-goals).
#[must_use]
pub fn scout_enemy(entities: &EntityStorage, enemy_player: u8) -> Vec<EnemyIntel> {
    entities
        .iter()
        .filter_map(|(&id, entity)| {
            let owner = entity.owner?;
            if owner.player != enemy_player {
                return None;
            }
            let combat_value = entity.combat_stats().map_or(0, |c| c.damage);
            Some(EnemyIntel {
                entity: id,
                position: entity.position.value,
                combat_value,
            })
        })
        .collect()
}

/// Total enemy combat value, used to decide whether an offensive group is
/// strong enough to commit (§4.13/§4.15).
#[must_use]
pub fn enemy_strength(intel: &[EnemyIntel]) -> u32 {
    intel.iter().map(|e| e.combat_value).sum()
}

/// Whether `own_strength` is enough to justify committing an offensive,
/// given the scouted `enemy_strength`: requires at least parity plus a
/// margin (difficulty-independent; personality gates *when* to check, not
/// the margin itself).
#[must_use]
pub fn offensive_is_viable(own_strength: u32, enemy_strength: u32) -> bool {
    own_strength > 0 && own_strength >= enemy_strength + enemy_strength / 4
}

/// Count entities of a given kind predicate owned by `player`, used for e.g.
/// counting harvesters when building an [`EconomySnapshot`].
#[must_use]
pub fn count_owned(entities: &EntityStorage, player: u8, predicate: impl Fn(&EntityKind) -> bool) -> u32 {
    entities
        .iter()
        .filter(|(_, e)| e.owner.is_some_and(|o| o.player == player) && predicate(&e.kind))
        .count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn economy_score_rewards_full_harvester_ratio() {
        let full = economy_score(4, 4, 1000, 500, true);
        let half = economy_score(2, 4, 1000, 500, true);
        assert!(full.score >= half.score);
    }

    #[test]
    fn choose_investment_respects_ceiling() {
        let candidates = vec![
            InvestmentCandidate { key: RuleKey("cheap"), cost: 100, weight: 1 },
            InvestmentCandidate { key: RuleKey("expensive"), cost: 10_000, weight: 100 },
        ];
        assert_eq!(choose_investment(&candidates, 500), Some(RuleKey("cheap")));
    }

    #[test]
    fn offensive_requires_margin_over_enemy() {
        assert!(!offensive_is_viable(100, 100));
        assert!(offensive_is_viable(130, 100));
    }
}
