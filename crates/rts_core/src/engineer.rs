//! Engineer capture and repair resolution (§4.11).
//!
//! Both abilities consume the engineer unit on completion: capture transfers
//! ownership of the target building, repair fully heals it. Neither can
//! target a building mid-construction or one already at full health (for
//! repair) — callers check that before invoking these.

use crate::components::Owned;

/// Result of an engineer finishing its action against a building.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineerOutcome {
    /// Ownership transferred to `new_owner`; engineer is consumed.
    Captured { new_owner: Owned },
    /// Building healed to full; engineer is consumed.
    Repaired,
}

/// Resolve a capture: the building becomes owned by `engineer_owner`, flashes,
/// and the engineer unit is despawned by the caller.
#[must_use]
pub const fn capture(engineer_owner: Owned) -> EngineerOutcome {
    EngineerOutcome::Captured {
        new_owner: engineer_owner,
    }
}

/// Resolve a repair: the building's health is set to `max`, and the engineer
/// unit is despawned by the caller.
#[must_use]
pub fn repair(health: &mut u32, max: u32) -> EngineerOutcome {
    *health = max;
    EngineerOutcome::Repaired
}

/// Whether an engineer may begin capturing `target_owner` (must be a live
/// enemy building; friendly or neutral buildings cannot be captured).
#[must_use]
pub fn can_capture(engineer_owner: Owned, target_owner: Option<Owned>) -> bool {
    match target_owner {
        Some(owner) => owner.player != engineer_owner.player,
        None => false,
    }
}

/// Whether an engineer may begin repairing `target_owner` (must be friendly
/// and not already at full health).
#[must_use]
pub fn can_repair(engineer_owner: Owned, target_owner: Option<Owned>, current: u32, max: u32) -> bool {
    current < max && target_owner.is_some_and(|o| o.player == engineer_owner.player)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factions::FactionId;

    fn owned(player: u8) -> Owned {
        Owned {
            faction: FactionId::Continuity,
            player,
        }
    }

    #[test]
    fn capture_requires_enemy_target() {
        assert!(can_capture(owned(0), Some(owned(1))));
        assert!(!can_capture(owned(0), Some(owned(0))));
        assert!(!can_capture(owned(0), None));
    }

    #[test]
    fn repair_requires_friendly_damaged_target() {
        assert!(can_repair(owned(0), Some(owned(0)), 50, 100));
        assert!(!can_repair(owned(0), Some(owned(0)), 100, 100));
        assert!(!can_repair(owned(0), Some(owned(1)), 50, 100));
    }

    #[test]
    fn repair_heals_to_max() {
        let mut hp = 30;
        repair(&mut hp, 100);
        assert_eq!(hp, 100);
    }
}
