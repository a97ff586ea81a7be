//! Per-difficulty AI tuning table (§10.6).
//!
//! A read-only data catalog, same shape as [`crate::rules::RuleCatalog`]:
//! no simulation state, looked up by [`crate::players::Difficulty`].

use crate::math::Fixed;
use crate::players::Difficulty;

/// Tuning constants for one difficulty tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Personality {
    /// Ticks between AI decision passes (lower = reacts faster).
    pub think_interval_ticks: u32,
    /// Minimum ticks a vengeance target is remembered before decaying (§4.13).
    pub vengeance_decay_ticks: u32,
    /// Fraction of idle credits the AI is willing to commit to a single
    /// investment-priority action (§4.14), as a percent (0-100).
    pub max_investment_percent: u32,
    /// Threat-score threshold above which the AI abandons its current
    /// strategy and reacts defensively (§4.13).
    pub threat_abort_threshold: u32,
    /// Economy-score threshold below which desperation measures kick in (§4.13).
    pub desperation_threshold: u32,
}

impl Personality {
    /// Look up tuning for a difficulty tier.
    #[must_use]
    pub const fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self {
                think_interval_ticks: 60,
                vengeance_decay_ticks: 200,
                max_investment_percent: 30,
                threat_abort_threshold: 80,
                desperation_threshold: 20,
            },
            Difficulty::Normal => Self {
                think_interval_ticks: 40,
                vengeance_decay_ticks: 300,
                max_investment_percent: 50,
                threat_abort_threshold: 60,
                desperation_threshold: 30,
            },
            Difficulty::Hard => Self {
                think_interval_ticks: 20,
                vengeance_decay_ticks: 400,
                max_investment_percent: 70,
                threat_abort_threshold: 45,
                desperation_threshold: 35,
            },
            Difficulty::Brutal => Self {
                think_interval_ticks: 10,
                vengeance_decay_ticks: 500,
                max_investment_percent: 90,
                threat_abort_threshold: 30,
                desperation_threshold: 40,
            },
        }
    }

    /// Investment ceiling in credits for a given idle-credit pool.
    #[must_use]
    pub fn investment_ceiling(&self, idle_credits: u32) -> u32 {
        idle_credits * self.max_investment_percent / 100
    }
}

/// Fixed-point convenience wrapper for percent thresholds used by scoring math.
#[must_use]
pub fn percent_to_fixed(percent: u32) -> Fixed {
    Fixed::from_num(percent) / Fixed::from_num(100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brutal_reacts_faster_than_easy() {
        let easy = Personality::for_difficulty(Difficulty::Easy);
        let brutal = Personality::for_difficulty(Difficulty::Brutal);
        assert!(brutal.think_interval_ticks < easy.think_interval_ticks);
        assert!(brutal.max_investment_percent > easy.max_investment_percent);
    }

    #[test]
    fn investment_ceiling_scales_with_pool() {
        let normal = Personality::for_difficulty(Difficulty::Normal);
        assert_eq!(normal.investment_ceiling(1000), 500);
    }
}
