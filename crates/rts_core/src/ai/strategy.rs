//! Strategy FSM, abort conditions, and desperation (§4.13).
//!
//! Strategies are evaluated in priority order each think pass: a
//! higher-priority strategy's entry condition, if met, always pre-empts a
//! lower one, and a sufficiently severe threat aborts whatever the AI was
//! doing regardless of priority.

use serde::{Deserialize, Serialize};

use super::investment::EconomySnapshot;
use super::personality::Personality;

/// The AI's current high-level behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    /// Building up economy: harvesters, power, production buildings.
    Economy,
    /// Building a military force before committing to an attack.
    Buildup,
    /// Actively pushing an offensive group toward the enemy.
    Offensive,
    /// Pulling units back to defend a threatened asset.
    Defensive,
    /// Economy has collapsed; spend everything on cheap units immediately (§4.13).
    Desperation,
}

impl Default for Strategy {
    fn default() -> Self {
        Self::Economy
    }
}

/// Priority order, highest first: a strategy earlier in this list always
/// wins over one later when both conditions are met simultaneously.
const PRIORITY: [Strategy; 5] = [
    Strategy::Desperation,
    Strategy::Defensive,
    Strategy::Offensive,
    Strategy::Buildup,
    Strategy::Economy,
];

/// Inputs consulted when choosing the next strategy.
#[derive(Debug, Clone, Copy)]
pub struct StrategyInputs {
    /// Current aggregate threat score (see [`super::threat::threat_score`]).
    pub threat_score: u32,
    /// Economy health snapshot.
    pub economy: EconomySnapshot,
    /// Whether the AI currently has a viable offensive group assembled.
    pub has_offensive_group: bool,
}

/// Choose the next strategy for this think pass, honoring priority order and
/// a minimum dwell time before non-emergency strategies can change again.
#[must_use]
pub fn choose_strategy(
    current: Strategy,
    ticks_in_current: u64,
    inputs: StrategyInputs,
    personality: &Personality,
) -> Strategy {
    // Emergency transitions always apply immediately, bypassing dwell time.
    if inputs.economy.score < personality.desperation_threshold {
        return Strategy::Desperation;
    }
    if inputs.threat_score >= personality.threat_abort_threshold {
        return Strategy::Defensive;
    }

    const MIN_DWELL_TICKS: u64 = 100;
    if ticks_in_current < MIN_DWELL_TICKS && current != Strategy::Desperation && current != Strategy::Defensive {
        return current;
    }

    for &candidate in &PRIORITY {
        if entry_condition(candidate, inputs) {
            return candidate;
        }
    }
    current
}

fn entry_condition(strategy: Strategy, inputs: StrategyInputs) -> bool {
    match strategy {
        Strategy::Desperation | Strategy::Defensive => false, // handled as emergencies above
        Strategy::Offensive => inputs.has_offensive_group,
        Strategy::Buildup => inputs.economy.score >= 60,
        Strategy::Economy => true,
    }
}

/// Whether a strategy change counts as an "abort" of the previous strategy
/// (used for logging/telemetry, and to decide whether in-flight orders like
/// an offensive push should be canceled).
#[must_use]
pub fn is_abort(previous: Strategy, next: Strategy) -> bool {
    previous != next && matches!(next, Strategy::Defensive | Strategy::Desperation)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(threat: u32, economy_score: u32, has_group: bool) -> StrategyInputs {
        StrategyInputs {
            threat_score: threat,
            economy: EconomySnapshot {
                score: economy_score,
                idle_credits: 0,
            },
            has_offensive_group: has_group,
        }
    }

    #[test]
    fn high_threat_forces_defensive_regardless_of_dwell() {
        let personality = Personality::for_difficulty(crate::players::Difficulty::Normal);
        let next = choose_strategy(Strategy::Buildup, 0, inputs(100, 70, false), &personality);
        assert_eq!(next, Strategy::Defensive);
    }

    #[test]
    fn low_economy_forces_desperation() {
        let personality = Personality::for_difficulty(crate::players::Difficulty::Normal);
        let next = choose_strategy(Strategy::Economy, 500, inputs(0, 5, false), &personality);
        assert_eq!(next, Strategy::Desperation);
    }

    #[test]
    fn dwell_time_holds_current_strategy() {
        let personality = Personality::for_difficulty(crate::players::Difficulty::Normal);
        let next = choose_strategy(Strategy::Buildup, 10, inputs(0, 70, true), &personality);
        assert_eq!(next, Strategy::Buildup);
    }

    #[test]
    fn offensive_group_promotes_to_offensive_after_dwell() {
        let personality = Personality::for_difficulty(crate::players::Difficulty::Normal);
        let next = choose_strategy(Strategy::Buildup, 200, inputs(0, 70, true), &personality);
        assert_eq!(next, Strategy::Offensive);
    }
}
