//! Alive-player check, elimination cleanup, and win/draw resolution (§4.12).
//!
//! Checked once at the end of each tick (not mid-tick inside individual
//! reducers), per the resolved Open Question on victory-check timing.

use crate::entities::{EntityKind, EntityStorage};

/// Outcome of a victory check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VictoryState {
    /// The match continues; more than one player still has surviving entities.
    Ongoing,
    /// Exactly one player remains alive.
    Winner(u8),
    /// No players remain alive (mutual elimination).
    Draw,
}

/// Players that still have at least one entity counting toward survival
/// ([`EntityKind::counts_for_survival`]), out of the given roster.
#[must_use]
pub fn alive_players(entities: &EntityStorage, roster: &[u8]) -> Vec<u8> {
    roster
        .iter()
        .copied()
        .filter(|&player| {
            entities.iter().any(|(_, entity)| {
                entity.kind.counts_for_survival() && entity.owner.is_some_and(|o| o.player == player)
            })
        })
        .collect()
}

/// Determine the match outcome from the set of still-alive players.
#[must_use]
pub fn resolve(alive: &[u8]) -> VictoryState {
    match alive {
        [] => VictoryState::Draw,
        [single] => VictoryState::Winner(*single),
        _ => VictoryState::Ongoing,
    }
}

/// Remove all remaining entities belonging to eliminated players and cancel
/// their production. Called once a player drops out of `alive_players`.
pub fn clean_up_eliminated(entities: &mut EntityStorage, alive: &[u8], roster: &[u8]) -> Vec<u64> {
    let eliminated: Vec<u8> = roster.iter().copied().filter(|p| !alive.contains(p)).collect();
    if eliminated.is_empty() {
        return Vec::new();
    }

    let dead: Vec<u64> = entities
        .iter()
        .filter(|(_, e)| e.owner.is_some_and(|o| eliminated.contains(&o.player)))
        .map(|(&id, _)| id)
        .collect();

    for id in &dead {
        entities.remove(*id);
    }

    dead
}

/// Whether the kind is excluded from elimination cleanup timing concerns
/// (neutral entities, like ore patches and rocks, are never "eliminated").
#[must_use]
pub fn is_neutral(kind: &EntityKind) -> bool {
    matches!(kind, EntityKind::Resource { .. } | EntityKind::Rock)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Entity;
    use crate::components::Owned;
    use crate::factions::FactionId;
    use crate::math::Vec2Fixed;

    fn building(player: u8) -> Entity {
        Entity::new(
            Vec2Fixed::ZERO,
            EntityKind::Building {
                building: crate::components::Building { width: 2, height: 2 },
                combat: None,
                attack_target: Default::default(),
                construction_ticks: 1,
                construction_ticks_total: 1,
                is_primary: true,
            },
        )
        .with_owner(Owned {
            faction: FactionId::Continuity,
            player,
        })
    }

    #[test]
    fn single_survivor_wins() {
        let mut storage = EntityStorage::new();
        storage.insert(building(0));
        let alive = alive_players(&storage, &[0, 1]);
        assert_eq!(resolve(&alive), VictoryState::Winner(0));
    }

    #[test]
    fn two_survivors_ongoing() {
        let mut storage = EntityStorage::new();
        storage.insert(building(0));
        storage.insert(building(1));
        let alive = alive_players(&storage, &[0, 1]);
        assert_eq!(resolve(&alive), VictoryState::Ongoing);
    }

    #[test]
    fn no_survivors_draw() {
        let storage = EntityStorage::new();
        let alive = alive_players(&storage, &[0, 1]);
        assert_eq!(resolve(&alive), VictoryState::Draw);
    }

    #[test]
    fn cleanup_removes_eliminated_owner_entities() {
        let mut storage = EntityStorage::new();
        storage.insert(building(0));
        let loser_unit = storage.insert(building(1));
        let dead = clean_up_eliminated(&mut storage, &[0], &[0, 1]);
        assert!(dead.contains(&loser_unit));
        assert!(storage.get(loser_unit).is_none());
    }
}
