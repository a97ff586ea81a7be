//! Per-player state (§3): credits, power budget, production queues, and
//! primary-building tracking.

use serde::{Deserialize, Serialize};

use crate::factions::FactionId;
use crate::production::PlayerProduction;
use crate::rules::RuleKey;

/// AI difficulty tier, driving [`crate::ai::personality`] tuning (§10.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    /// Easy: slower reactions, lower investment ceiling.
    Easy,
    /// Normal: baseline tuning.
    Normal,
    /// Hard: faster reactions, more aggressive investment.
    Hard,
    /// Brutal: maximum aggression and reaction speed.
    Brutal,
}

/// Full per-player record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Player slot id (0-based, stable for the match).
    pub id: u8,
    /// Faction, for flavor/unit-roster purposes.
    pub faction: FactionId,
    /// Whether this player is AI-controlled.
    pub is_ai: bool,
    /// AI difficulty, meaningful only when `is_ai`.
    pub difficulty: Difficulty,
    /// Spendable credits.
    pub credits: u32,
    /// Total power generated by owned structures.
    pub max_power: u32,
    /// Power currently drawn by owned structures.
    pub used_power: u32,
    /// Per-category production queues.
    pub production: PlayerProduction,
    /// Building keys owned, used to gate prerequisite-based production.
    pub owned_buildings: Vec<RuleKey>,
    /// Primary building entity ids (conyard / MCV-deployed), used for rally
    /// points and as the spawn anchor for AI action emission (§4.15).
    pub primary_buildings: Vec<u64>,
}

impl PlayerState {
    /// Create a new player in the default (non-AI) state with starting credits.
    #[must_use]
    pub fn new(id: u8, faction: FactionId, starting_credits: u32) -> Self {
        Self {
            id,
            faction,
            is_ai: false,
            difficulty: Difficulty::Normal,
            credits: starting_credits,
            max_power: 0,
            used_power: 0,
            production: PlayerProduction::default(),
            owned_buildings: Vec::new(),
            primary_buildings: Vec::new(),
        }
    }

    /// Mark this player as AI-controlled at the given difficulty.
    #[must_use]
    pub const fn as_ai(mut self, difficulty: Difficulty) -> Self {
        self.is_ai = true;
        self.difficulty = difficulty;
        self
    }

    /// Power throttle percentage applied to production speed (§4.6): full
    /// speed unless power is starved (`used > max`), per the resolved Open
    /// Question that `used == max` is NOT starved.
    #[must_use]
    pub fn production_speed_percent(&self) -> u32 {
        if self.used_power > self.max_power {
            crate::production::POWER_STARVATION_PERCENT
        } else {
            100
        }
    }

    /// Whether this player still has power headroom for another structure.
    #[must_use]
    pub const fn has_power_headroom(&self) -> bool {
        self.used_power <= self.max_power
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_starvation_throttles_production_speed() {
        let mut player = PlayerState::new(0, FactionId::Continuity, 1000);
        player.max_power = 10;
        player.used_power = 5;
        assert_eq!(player.production_speed_percent(), 100);

        player.used_power = 11;
        assert_eq!(
            player.production_speed_percent(),
            crate::production::POWER_STARVATION_PERCENT
        );
    }

    #[test]
    fn used_equal_max_is_not_starved() {
        let mut player = PlayerState::new(0, FactionId::Continuity, 1000);
        player.max_power = 10;
        player.used_power = 10;
        assert_eq!(player.production_speed_percent(), 100);
    }

    #[test]
    fn ai_player_carries_difficulty() {
        let player = PlayerState::new(1, FactionId::Tinkers, 1000).as_ai(Difficulty::Brutal);
        assert!(player.is_ai);
        assert_eq!(player.difficulty, Difficulty::Brutal);
    }
}
