//! Threat detection and vengeance tracking (§4.13).

use crate::components::EntityId;
use crate::entities::EntityStorage;
use crate::math::{Fixed, Vec2Fixed};

/// An enemy unit or building observed near one of the AI's own assets.
#[derive(Debug, Clone, Copy)]
pub struct ThreatSighting {
    /// The enemy entity.
    pub entity: EntityId,
    /// Its position.
    pub position: Vec2Fixed,
    /// Distance from the threatened asset.
    pub distance: Fixed,
    /// Rough combat value: damage potential, used to weight the threat score.
    pub combat_value: u32,
}

/// Radius within which an enemy near a primary building counts as a threat.
pub const THREAT_DETECTION_RADIUS: Fixed = Fixed::from_bits(250 << 32);

/// Scan for enemy units/buildings within [`THREAT_DETECTION_RADIUS`] of any of
/// `own_assets` (typically primary buildings and harvesters).
#[must_use]
pub fn detect_threats(
    entities: &EntityStorage,
    own_player: u8,
    own_assets: &[Vec2Fixed],
) -> Vec<ThreatSighting> {
    let mut sightings = Vec::new();
    for (&id, entity) in entities.iter() {
        let Some(owner) = entity.owner else { continue };
        if owner.player == own_player {
            continue;
        }
        let Some(combat) = entity.combat_stats() else {
            continue;
        };

        for &asset in own_assets {
            let distance = entity.position.value.distance(asset);
            if distance <= THREAT_DETECTION_RADIUS {
                sightings.push(ThreatSighting {
                    entity: id,
                    position: entity.position.value,
                    distance,
                    combat_value: combat.damage,
                });
                break;
            }
        }
    }
    sightings
}

/// Aggregate threat score from a set of sightings: closer and harder-hitting
/// threats weigh more. Used against
/// [`crate::ai::personality::Personality::threat_abort_threshold`].
#[must_use]
pub fn threat_score(sightings: &[ThreatSighting]) -> u32 {
    sightings
        .iter()
        .map(|s| {
            let proximity_weight = if s.distance < Fixed::from_num(50) { 3 } else { 1 };
            s.combat_value * proximity_weight
        })
        .sum()
}

/// One remembered grudge: an enemy entity that damaged the AI and hasn't
/// been avenged or allowed to decay yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VengeanceTarget {
    /// The entity that wronged the AI.
    pub entity: EntityId,
    /// Tick the grudge was recorded (or last refreshed by a repeat offense).
    pub recorded_tick: u64,
}

/// Record or refresh a vengeance target after taking damage from `attacker`.
pub fn remember_attacker(targets: &mut Vec<VengeanceTarget>, attacker: EntityId, tick: u64) {
    if let Some(existing) = targets.iter_mut().find(|t| t.entity == attacker) {
        existing.recorded_tick = tick;
    } else {
        targets.push(VengeanceTarget {
            entity: attacker,
            recorded_tick: tick,
        });
    }
}

/// Drop vengeance targets older than `decay_ticks`, or that no longer exist.
pub fn decay_vengeance(
    targets: &mut Vec<VengeanceTarget>,
    entities: &EntityStorage,
    tick: u64,
    decay_ticks: u32,
) {
    targets.retain(|t| {
        entities.contains(t.entity) && tick.saturating_sub(t.recorded_tick) < u64::from(decay_ticks)
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remember_attacker_adds_new_target() {
        let mut targets = Vec::new();
        remember_attacker(&mut targets, 5, 10);
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].entity, 5);
    }

    #[test]
    fn remember_attacker_refreshes_existing() {
        let mut targets = vec![VengeanceTarget {
            entity: 5,
            recorded_tick: 10,
        }];
        remember_attacker(&mut targets, 5, 50);
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].recorded_tick, 50);
    }

    #[test]
    fn decay_drops_stale_targets() {
        let entities = EntityStorage::new();
        let mut targets = vec![VengeanceTarget {
            entity: 5,
            recorded_tick: 0,
        }];
        decay_vengeance(&mut targets, &entities, 1000, 300);
        assert!(targets.is_empty());
    }

    #[test]
    fn threat_score_weights_close_threats_higher() {
        let close = ThreatSighting {
            entity: 1,
            position: Vec2Fixed::ZERO,
            distance: Fixed::from_num(10),
            combat_value: 10,
        };
        let far = ThreatSighting {
            entity: 2,
            position: Vec2Fixed::ZERO,
            distance: Fixed::from_num(200),
            combat_value: 10,
        };
        assert!(threat_score(&[close]) > threat_score(&[far]));
    }
}
