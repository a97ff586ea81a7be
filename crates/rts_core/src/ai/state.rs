//! Explicit, serializable AI memory (§9 Design Notes: "AIWorld, not a
//! singleton"). Keyed by player id so a headless runner can drive many
//! concurrent matches without shared mutable global state.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::strategy::Strategy;
use super::threat::VengeanceTarget;
use crate::rules::RuleKey;

/// One AI-controlled player's persistent memory across ticks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AIPlayerState {
    /// Current strategy FSM state.
    pub strategy: Strategy,
    /// Tick the current strategy was entered, for minimum-dwell checks.
    pub strategy_entered_tick: u64,
    /// Remembered attackers pending vengeance.
    pub vengeance_targets: Vec<VengeanceTarget>,
    /// Whether desperation measures are currently active (§4.13).
    pub desperate: bool,
    /// Last tick this player's AI ran a full think pass.
    pub last_think_tick: u64,
    /// Production keys the AI currently intends to build, in priority order.
    pub build_intent: Vec<RuleKey>,
}

impl AIPlayerState {
    /// Fresh AI memory for a new match.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// All AI players' memory, keyed by player id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AIWorld {
    players: HashMap<u8, AIPlayerState>,
}

impl AIWorld {
    /// Empty AI world with no registered players.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get (creating if absent) the memory for `player`.
    pub fn player_mut(&mut self, player: u8) -> &mut AIPlayerState {
        self.players.entry(player).or_default()
    }

    /// Get the memory for `player`, if it has been initialized.
    #[must_use]
    pub fn player(&self, player: u8) -> Option<&AIPlayerState> {
        self.players.get(&player)
    }

    /// Reset one player's AI memory to a fresh state (§6 `resetAIState`),
    /// e.g. when a player's MCV is destroyed and they redeploy.
    pub fn reset_player(&mut self, player: u8) {
        self.players.insert(player, AIPlayerState::new());
    }

    /// Reset every registered player's AI memory.
    pub fn reset_all(&mut self) {
        self.players.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_mut_creates_fresh_entry() {
        let mut world = AIWorld::new();
        let state = world.player_mut(0);
        assert_eq!(state.strategy, Strategy::default());
    }

    #[test]
    fn reset_player_clears_memory() {
        let mut world = AIWorld::new();
        world.player_mut(0).desperate = true;
        world.reset_player(0);
        assert!(!world.player(0).unwrap().desperate);
    }
}
